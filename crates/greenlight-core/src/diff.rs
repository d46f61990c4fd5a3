//! Unified diff parsing.
//!
//! Turns the text GitHub returns for `Accept: application/vnd.github.v3.diff`
//! into per-file hunks, and extracts the lines a pull request adds together
//! with their line numbers in the new file.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::types::AddedLine;

/// Kind of a line inside a hunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeKind {
    Added,
    Deleted,
    Context,
}

/// One line of a hunk, without its leading marker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Change {
    pub kind: ChangeKind,
    pub content: String,
}

/// A contiguous block of changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hunk {
    pub old_start: u32,
    pub old_lines: u32,
    /// First line of the hunk in the new file
    pub new_start: u32,
    pub new_lines: u32,
    pub changes: Vec<Change>,
}

/// One file section of a unified diff.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileDiff {
    /// Path before the change; `None` for `/dev/null`
    pub from: Option<String>,
    /// Path after the change; `None` for `/dev/null`
    pub to: Option<String>,
    pub deleted: bool,
    pub new_file: bool,
    pub hunks: Vec<Hunk>,
}

/// Lines still expected by the hunk being read.
#[derive(Debug, Clone, Copy)]
struct Remaining {
    old: u32,
    new: u32,
}

impl Remaining {
    fn is_done(&self) -> bool {
        self.old == 0 && self.new == 0
    }
}

/// Parse a unified diff into its file sections.
///
/// A diff without any file sections is valid and yields an empty list.
pub fn parse_pr_diff(text: &str) -> Result<Vec<FileDiff>> {
    if text.trim().is_empty() {
        return Err(Error::parse("Diff content is empty", 0));
    }

    DiffParser::default()
        .run(text)
        .map_err(|message| Error::parse(format!("Failed to parse diff: {message}"), text.len()))
}

/// Added lines of a file, numbered as in the new file.
pub fn added_lines(file: &FileDiff) -> Vec<AddedLine> {
    let mut lines = Vec::new();

    for hunk in &file.hunks {
        let mut line = hunk.new_start;
        for change in &hunk.changes {
            match change.kind {
                ChangeKind::Added => {
                    lines.push(AddedLine {
                        line,
                        content: change.content.clone(),
                    });
                    line = line.saturating_add(1);
                }
                ChangeKind::Deleted => {}
                ChangeKind::Context => line = line.saturating_add(1),
            }
        }
    }

    lines
}

#[derive(Default)]
struct DiffParser {
    files: Vec<FileDiff>,
    current: Option<FileDiff>,
    /// Set when the current section was opened by a `diff --git` line
    git_header: bool,
    remaining: Option<Remaining>,
}

impl DiffParser {
    fn run(mut self, text: &str) -> std::result::Result<Vec<FileDiff>, String> {
        for (index, raw) in text.lines().enumerate() {
            self.line(raw)
                .map_err(|message| format!("line {}: {message}", index + 1))?;
        }
        self.flush();
        Ok(self.files)
    }

    fn line(&mut self, raw: &str) -> std::result::Result<(), String> {
        if let Some(remaining) = self.remaining.filter(|r| !r.is_done()) {
            if self.change(raw, remaining) {
                return Ok(());
            }
        }
        self.remaining = None;

        if let Some((from, to)) = raw
            .strip_prefix("diff --git a/")
            .and_then(|paths| paths.split_once(" b/"))
        {
            self.start(true);
            let file = self.file_mut();
            file.from = Some(from.to_string());
            file.to = Some(to.to_string());
        } else if raw.starts_with("diff ") {
            self.start(true);
        } else if raw.starts_with("new file mode") {
            self.file_mut().new_file = true;
        } else if raw.starts_with("deleted file mode") {
            self.file_mut().deleted = true;
        } else if let Some(path) = raw.strip_prefix("rename from ") {
            self.file_mut().from = Some(path.to_string());
        } else if let Some(path) = raw.strip_prefix("rename to ") {
            self.file_mut().to = Some(path.to_string());
        } else if let Some(path) = raw.strip_prefix("--- ") {
            let reuse = self.git_header
                && self.current.as_ref().is_some_and(|f| f.hunks.is_empty());
            if !reuse {
                self.start(false);
            }
            let file = self.file_mut();
            file.from = header_path(path);
            if file.from.is_none() {
                file.new_file = true;
            }
        } else if let Some(path) = raw.strip_prefix("+++ ") {
            let file = self.file_mut();
            file.to = header_path(path);
            if file.to.is_none() {
                file.deleted = true;
            }
        } else if raw.starts_with("@@") {
            self.hunk(raw)?;
        }
        // Index lines, binary markers, "\ No newline at end of file" and
        // anything else outside a hunk carry nothing we need.

        Ok(())
    }

    /// Record one hunk body line. Returns false if `raw` is not a change line.
    fn change(&mut self, raw: &str, mut remaining: Remaining) -> bool {
        let (kind, content) = match raw.chars().next() {
            Some('+') => (ChangeKind::Added, &raw[1..]),
            Some('-') => (ChangeKind::Deleted, &raw[1..]),
            Some(' ') => (ChangeKind::Context, &raw[1..]),
            // Some tools strip the space from empty context lines
            None => (ChangeKind::Context, ""),
            Some('\\') => return true,
            Some(_) => return false,
        };

        match kind {
            ChangeKind::Added => remaining.new = remaining.new.saturating_sub(1),
            ChangeKind::Deleted => remaining.old = remaining.old.saturating_sub(1),
            ChangeKind::Context => {
                remaining.old = remaining.old.saturating_sub(1);
                remaining.new = remaining.new.saturating_sub(1);
            }
        }
        self.remaining = Some(remaining);

        if let Some(hunk) = self
            .current
            .as_mut()
            .and_then(|file| file.hunks.last_mut())
        {
            hunk.changes.push(Change {
                kind,
                content: content.to_string(),
            });
        }
        true
    }

    fn hunk(&mut self, raw: &str) -> std::result::Result<(), String> {
        let hunk = parse_hunk_header(raw).ok_or_else(|| format!("malformed hunk header `{raw}`"))?;

        let file = self
            .current
            .as_mut()
            .ok_or_else(|| "hunk header before any file header".to_string())?;

        self.remaining = Some(Remaining {
            old: hunk.old_lines,
            new: hunk.new_lines,
        });
        file.hunks.push(hunk);
        Ok(())
    }

    fn start(&mut self, git_header: bool) {
        self.flush();
        self.current = Some(FileDiff::default());
        self.git_header = git_header;
    }

    fn flush(&mut self) {
        if let Some(file) = self.current.take() {
            self.files.push(file);
        }
    }

    fn file_mut(&mut self) -> &mut FileDiff {
        if self.current.is_none() {
            self.start(false);
        }
        self.current.get_or_insert_with(FileDiff::default)
    }
}

/// Parse `@@ -old_start[,old_lines] +new_start[,new_lines] @@ ...`.
fn parse_hunk_header(raw: &str) -> Option<Hunk> {
    let ranges = raw.strip_prefix("@@ -")?;
    let (ranges, _section) = ranges.split_once(" @@")?;
    let (old, new) = ranges.split_once(" +")?;
    let (old_start, old_lines) = parse_range(old)?;
    let (new_start, new_lines) = parse_range(new)?;
    // Line numbers are counted up from new_start
    new_start.checked_add(new_lines)?;

    Some(Hunk {
        old_start,
        old_lines,
        new_start,
        new_lines,
        changes: Vec::new(),
    })
}

/// A `start[,count]` range; the count defaults to 1.
fn parse_range(range: &str) -> Option<(u32, u32)> {
    match range.split_once(',') {
        Some((start, count)) => Some((start.parse().ok()?, count.parse().ok()?)),
        None => Some((range.parse().ok()?, 1)),
    }
}

/// Path from a `---`/`+++` header, without the `a/`/`b/` prefix or timestamp.
fn header_path(raw: &str) -> Option<String> {
    let path = raw.split('\t').next().unwrap_or(raw).trim_end();
    if path == "/dev/null" {
        return None;
    }
    let path = path
        .strip_prefix("a/")
        .or_else(|| path.strip_prefix("b/"))
        .unwrap_or(path);
    Some(path.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    const MODIFIED: &str = "\
diff --git a/src/styles.css b/src/styles.css
index 83db48f..bf269f4 100644
--- a/src/styles.css
+++ b/src/styles.css
@@ -1,3 +1,4 @@
 .card {
-  display: block;
+  display: grid;
+  container-type: inline-size;
 }
";

    #[test]
    fn test_empty_diff_is_parse_error() {
        let err = parse_pr_diff("").unwrap_err();
        match err {
            Error::Parse { content_length, .. } => assert_eq!(content_length, 0),
            other => panic!("expected parse error, got {other:?}"),
        }

        assert!(matches!(
            parse_pr_diff("  \n\t\n"),
            Err(Error::Parse { content_length: 0, .. })
        ));
    }

    #[test]
    fn test_text_without_files_is_empty() {
        let files = parse_pr_diff("just some text\nwith no headers\n").unwrap();
        assert!(files.is_empty());
    }

    #[test]
    fn test_parse_modified_file() {
        let files = parse_pr_diff(MODIFIED).unwrap();
        assert_eq!(files.len(), 1);

        let file = &files[0];
        assert_eq!(file.from.as_deref(), Some("src/styles.css"));
        assert_eq!(file.to.as_deref(), Some("src/styles.css"));
        assert!(!file.deleted);
        assert!(!file.new_file);
        assert_eq!(file.hunks.len(), 1);

        let hunk = &file.hunks[0];
        assert_eq!((hunk.old_start, hunk.old_lines), (1, 3));
        assert_eq!((hunk.new_start, hunk.new_lines), (1, 4));
        assert_eq!(hunk.changes.len(), 5);
        assert_eq!(hunk.changes[1].kind, ChangeKind::Deleted);
        assert_eq!(hunk.changes[2].content, "  display: grid;");
    }

    #[test]
    fn test_added_lines_numbering() {
        let files = parse_pr_diff(MODIFIED).unwrap();
        let lines = added_lines(&files[0]);
        assert_eq!(
            lines,
            vec![
                AddedLine {
                    line: 2,
                    content: "  display: grid;".to_string()
                },
                AddedLine {
                    line: 3,
                    content: "  container-type: inline-size;".to_string()
                },
            ]
        );
    }

    #[test]
    fn test_delete_does_not_advance_counter() {
        let file = FileDiff {
            hunks: vec![Hunk {
                old_start: 10,
                old_lines: 2,
                new_start: 10,
                new_lines: 4,
                changes: vec![
                    Change { kind: ChangeKind::Context, content: "a".into() },
                    Change { kind: ChangeKind::Added, content: "b".into() },
                    Change { kind: ChangeKind::Added, content: "c".into() },
                    Change { kind: ChangeKind::Deleted, content: "d".into() },
                    Change { kind: ChangeKind::Added, content: "e".into() },
                ],
            }],
            ..FileDiff::default()
        };

        let numbers: Vec<u32> = added_lines(&file).iter().map(|l| l.line).collect();
        assert_eq!(numbers, vec![11, 12, 13]);
    }

    #[test]
    fn test_file_without_hunks_has_no_added_lines() {
        assert!(added_lines(&FileDiff::default()).is_empty());
    }

    #[test]
    fn test_new_and_deleted_files() {
        let diff = "\
diff --git a/new.js b/new.js
new file mode 100644
index 0000000..e69de29
--- /dev/null
+++ b/new.js
@@ -0,0 +1,2 @@
+const data = await fetch(url);
+export default data;
diff --git a/old.css b/old.css
deleted file mode 100644
index e69de29..0000000
--- a/old.css
+++ /dev/null
@@ -1 +0,0 @@
-.old { color: red; }
";
        let files = parse_pr_diff(diff).unwrap();
        assert_eq!(files.len(), 2);

        assert!(files[0].new_file);
        assert_eq!(files[0].from, None);
        assert_eq!(files[0].to.as_deref(), Some("new.js"));
        assert_eq!(added_lines(&files[0]).len(), 2);

        assert!(files[1].deleted);
        assert_eq!(files[1].to, None);
        assert_eq!(files[1].hunks[0].old_lines, 1);
        assert!(added_lines(&files[1]).is_empty());
    }

    #[test]
    fn test_body_lines_that_look_like_headers() {
        // A removed "-- x" line and an added "++ y" line inside a hunk.
        let diff = "\
--- a/notes.scss
+++ b/notes.scss
@@ -1,1 +1,1 @@
--- x
+++ y
";
        let files = parse_pr_diff(diff).unwrap();
        assert_eq!(files.len(), 1);
        let changes = &files[0].hunks[0].changes;
        assert_eq!(changes[0].kind, ChangeKind::Deleted);
        assert_eq!(changes[0].content, "-- x");
        assert_eq!(changes[1].kind, ChangeKind::Added);
        assert_eq!(changes[1].content, "++ y");
    }

    #[test]
    fn test_binary_and_no_newline_markers_are_skipped() {
        let diff = "\
diff --git a/logo.png b/logo.png
index 1111111..2222222 100644
Binary files a/logo.png and b/logo.png differ
diff --git a/app.ts b/app.ts
--- a/app.ts
+++ b/app.ts
@@ -1 +1 @@
-let x = 1
\\ No newline at end of file
+let x = 2
\\ No newline at end of file
";
        let files = parse_pr_diff(diff).unwrap();
        assert_eq!(files.len(), 2);
        assert!(files[0].hunks.is_empty());
        assert_eq!(files[1].hunks[0].changes.len(), 2);
        assert_eq!(added_lines(&files[1])[0].content, "let x = 2");
    }

    #[test]
    fn test_multiple_hunks_restart_numbering() {
        let diff = "\
--- a/a.css
+++ b/a.css
@@ -1,2 +1,3 @@
 a {}
+b {}
 c {}
@@ -20,1 +21,2 @@
 d {}
+e {}
";
        let files = parse_pr_diff(diff).unwrap();
        let numbers: Vec<u32> = added_lines(&files[0]).iter().map(|l| l.line).collect();
        assert_eq!(numbers, vec![2, 22]);
    }

    #[test]
    fn test_malformed_hunk_header_reports_length() {
        let diff = "--- a/x.css\n+++ b/x.css\n@@ nonsense @@\n+a\n";
        match parse_pr_diff(diff) {
            Err(Error::Parse {
                message,
                content_length,
                ..
            }) => {
                assert_eq!(content_length, diff.len());
                assert!(message.contains("malformed hunk header"));
            }
            other => panic!("expected parse error, got {other:?}"),
        }
    }

    #[test]
    fn test_hunk_header_ranges() {
        let hunk = parse_hunk_header("@@ -3 +4,0 @@ fn main() {").unwrap();
        assert_eq!((hunk.old_start, hunk.old_lines), (3, 1));
        assert_eq!((hunk.new_start, hunk.new_lines), (4, 0));
        assert!(parse_hunk_header("@@ -a,1 +1 @@").is_none());
        assert!(parse_hunk_header("@@ -1 +1").is_none());
    }

    #[test]
    fn test_hunk_past_u32_line_numbers_is_error() {
        let diff = "--- a/x.css\n+++ b/x.css\n@@ -4294967294,2 +4294967295,2 @@\n+a\n+b\n";
        match parse_pr_diff(diff) {
            Err(Error::Parse { message, .. }) => assert!(message.contains("malformed hunk header")),
            other => panic!("expected parse error, got {other:?}"),
        }

        let hunk = parse_hunk_header("@@ -1 +4294967294,1 @@").unwrap();
        assert_eq!(hunk.new_start, u32::MAX - 1);
    }

    #[test]
    fn test_hunk_before_file_header_is_error() {
        let diff = "@@ -1 +1 @@\n+a\n";
        assert!(matches!(parse_pr_diff(diff), Err(Error::Parse { .. })));
    }
}
