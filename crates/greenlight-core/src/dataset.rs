//! Loading the web-features dataset.
//!
//! The dataset can come from a `data.json` on disk, from a URL, or from the
//! snapshot embedded in this crate. [`DatasetLoader`] tries its sources in
//! order, memoizes the first one that succeeds, and falls back to an empty
//! dataset when none does.

use serde::Deserialize;
use serde_json::{Map, Value};
use std::collections::{BTreeMap, HashMap};
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::OnceCell;

use crate::error::{Error, Result};

/// Snapshot of the web-features entries for the detector catalog.
const EMBEDDED_SNAPSHOT: &str = include_str!("../data/web-features-snapshot.json");

/// Timeout for fetching the dataset over HTTP
const FETCH_TIMEOUT: Duration = Duration::from_secs(30);

/// One feature entry as it appears in web-features.
///
/// Every field is optional: the dataset also contains entries for moved or
/// split features that carry no status at all.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FeatureRecord {
    pub name: Option<String>,
    pub description: Option<String>,
    /// A spec URL or a list of spec URLs
    pub spec: Option<Value>,
    pub mdn_url: Option<String>,
    pub status: Option<RecordStatus>,
}

impl FeatureRecord {
    /// First spec URL, if any
    pub fn spec_url(&self) -> Option<String> {
        match self.spec.as_ref()? {
            Value::String(url) => Some(url.clone()),
            Value::Array(urls) => urls.iter().find_map(|u| u.as_str()).map(String::from),
            _ => None,
        }
    }
}

/// The `status` block of a feature entry.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RecordStatus {
    /// `"high"`, `"low"` or `false` in current data
    pub baseline: Option<Value>,
    pub baseline_low_date: Option<String>,
    pub baseline_high_date: Option<String>,
    /// Minimum version per browser key
    #[serde(default)]
    pub support: BTreeMap<String, Value>,
}

/// Feature records keyed by feature id.
#[derive(Debug, Clone, Default)]
pub struct FeatureDataset {
    features: HashMap<String, FeatureRecord>,
}

impl FeatureDataset {
    /// Build a dataset from a parsed document.
    ///
    /// Accepts the current layout (`{"features": {...}}`), a module-style
    /// wrapper (`{"default": {...}}`), or a bare map of feature records.
    pub fn from_document(document: Value) -> Result<Self> {
        let Value::Object(mut root) = document else {
            return Err(Error::compatibility(
                "Feature dataset must be a JSON object",
            ));
        };

        let map = if matches!(root.get("features"), Some(Value::Object(_))) {
            take_object(&mut root, "features")
        } else if matches!(root.get("default"), Some(Value::Object(_))) {
            take_object(&mut root, "default")
        } else {
            root
        };

        let mut features = HashMap::with_capacity(map.len());
        for (id, raw) in map {
            match serde_json::from_value::<FeatureRecord>(raw) {
                Ok(record) => {
                    features.insert(id, record);
                }
                Err(e) => {
                    tracing::debug!(feature_id = %id, error = %e, "skipping malformed feature record");
                }
            }
        }

        Ok(Self { features })
    }

    /// Parse a dataset from JSON text
    pub fn from_json(text: &str) -> Result<Self> {
        let document: Value = serde_json::from_str(text).map_err(|e| {
            Error::compatibility(format!("Feature dataset is not valid JSON: {e}"))
                .with_detail("contentLength", text.len())
        })?;
        Self::from_document(document)
    }

    pub fn get(&self, id: &str) -> Option<&FeatureRecord> {
        self.features.get(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &FeatureRecord)> {
        self.features.iter()
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }
}

fn take_object(root: &mut Map<String, Value>, key: &str) -> Map<String, Value> {
    match root.remove(key) {
        Some(Value::Object(map)) => map,
        _ => Map::new(),
    }
}

/// Where to read the dataset from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DatasetSource {
    /// A web-features `data.json` on disk
    File(PathBuf),
    /// A web-features `data.json` served over HTTP
    Url(String),
    /// JSON text supplied by the caller
    Inline(String),
    /// The snapshot embedded in this crate
    Snapshot,
}

impl DatasetSource {
    fn describe(&self) -> String {
        match self {
            DatasetSource::File(path) => format!("file {}", path.display()),
            DatasetSource::Url(url) => format!("url {url}"),
            DatasetSource::Inline(_) => "inline json".to_string(),
            DatasetSource::Snapshot => "embedded snapshot".to_string(),
        }
    }

    async fn load(&self) -> Result<FeatureDataset> {
        match self {
            DatasetSource::File(path) => {
                let text = tokio::fs::read_to_string(path).await.map_err(|e| {
                    Error::compatibility(format!(
                        "Failed to read feature dataset {}: {e}",
                        path.display()
                    ))
                })?;
                FeatureDataset::from_json(&text)
            }
            DatasetSource::Url(url) => {
                let text = fetch_text(url).await?;
                FeatureDataset::from_json(&text)
            }
            DatasetSource::Inline(text) => FeatureDataset::from_json(text),
            DatasetSource::Snapshot => FeatureDataset::from_json(EMBEDDED_SNAPSHOT),
        }
    }
}

async fn fetch_text(url: &str) -> Result<String> {
    let fetch_error =
        |e: reqwest::Error| Error::compatibility(format!("Failed to fetch feature dataset from {url}: {e}"));

    let client = reqwest::Client::builder()
        .user_agent(format!("greenlight/{}", env!("CARGO_PKG_VERSION")))
        .timeout(FETCH_TIMEOUT)
        .build()
        .map_err(fetch_error)?;

    let response = client.get(url).send().await.map_err(fetch_error)?;
    if !response.status().is_success() {
        return Err(Error::compatibility(format!(
            "Failed to fetch feature dataset from {url}: HTTP {}",
            response.status()
        )));
    }

    response.text().await.map_err(fetch_error)
}

/// Loads the dataset once from the first working source.
#[derive(Debug)]
pub struct DatasetLoader {
    sources: Vec<DatasetSource>,
    loaded: OnceCell<Arc<FeatureDataset>>,
    attempts: AtomicUsize,
}

impl DatasetLoader {
    /// Create a loader that tries `sources` in order
    pub fn new(sources: Vec<DatasetSource>) -> Self {
        Self {
            sources,
            loaded: OnceCell::new(),
            attempts: AtomicUsize::new(0),
        }
    }

    /// Loader backed only by the embedded snapshot
    pub fn snapshot() -> Self {
        Self::new(vec![DatasetSource::Snapshot])
    }

    /// Loader with the standard precedence: file, then URL, then snapshot
    pub fn with_fallbacks(path: Option<PathBuf>, url: Option<String>) -> Self {
        let mut sources = Vec::with_capacity(3);
        if let Some(path) = path {
            sources.push(DatasetSource::File(path));
        }
        if let Some(url) = url {
            sources.push(DatasetSource::Url(url));
        }
        sources.push(DatasetSource::Snapshot);
        Self::new(sources)
    }

    pub fn sources(&self) -> &[DatasetSource] {
        &self.sources
    }

    /// Number of times the sources were actually walked
    pub fn load_attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }

    /// Get the dataset, loading it on first use.
    ///
    /// Concurrent first callers share one in-flight load.
    pub async fn load(&self) -> Arc<FeatureDataset> {
        self.loaded
            .get_or_init(|| self.load_from_sources())
            .await
            .clone()
    }

    async fn load_from_sources(&self) -> Arc<FeatureDataset> {
        self.attempts.fetch_add(1, Ordering::SeqCst);

        for source in &self.sources {
            match source.load().await {
                Ok(dataset) => {
                    tracing::info!(
                        source = %source.describe(),
                        features = dataset.len(),
                        "loaded web-features dataset"
                    );
                    return Arc::new(dataset);
                }
                Err(e) => {
                    tracing::warn!(
                        source = %source.describe(),
                        error = %e,
                        "feature dataset source failed, trying next"
                    );
                }
            }
        }

        tracing::error!("failed to load web-features from every source; continuing with an empty dataset");
        Arc::new(FeatureDataset::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_snapshot_parses() {
        let dataset = FeatureDataset::from_json(EMBEDDED_SNAPSHOT).unwrap();
        for id in [
            "container-queries",
            "has",
            "grid",
            "subgrid",
            "nesting",
            "custom-properties",
            "logical-properties",
            "top-level-await",
        ] {
            assert!(dataset.get(id).is_some(), "snapshot is missing {id}");
        }
    }

    #[test]
    fn test_document_layouts() {
        let current = FeatureDataset::from_json(r#"{"features": {"grid": {"name": "Grid"}}, "browsers": {}}"#).unwrap();
        assert_eq!(current.len(), 1);

        let wrapped = FeatureDataset::from_json(r#"{"default": {"grid": {"name": "Grid"}}}"#).unwrap();
        assert_eq!(wrapped.len(), 1);
        assert!(wrapped.get("grid").is_some());

        let bare = FeatureDataset::from_json(r#"{"grid": {"name": "Grid"}, "has": {}}"#).unwrap();
        assert_eq!(bare.len(), 2);
    }

    #[test]
    fn test_malformed_records_are_skipped() {
        let dataset =
            FeatureDataset::from_json(r#"{"grid": {"name": "Grid"}, "broken": {"name": 5}}"#).unwrap();
        assert_eq!(dataset.len(), 1);
        assert!(dataset.get("broken").is_none());
    }

    #[test]
    fn test_non_object_document_is_rejected() {
        assert!(FeatureDataset::from_json("[1, 2]").is_err());
        assert!(FeatureDataset::from_json("not json").is_err());
    }

    #[test]
    fn test_spec_url_accepts_lists() {
        let record: FeatureRecord =
            serde_json::from_str(r#"{"spec": ["https://a.example", "https://b.example"]}"#).unwrap();
        assert_eq!(record.spec_url().as_deref(), Some("https://a.example"));
    }

    #[tokio::test]
    async fn test_falls_back_to_next_source() {
        let loader = DatasetLoader::new(vec![
            DatasetSource::File(PathBuf::from("/nonexistent/web-features/data.json")),
            DatasetSource::Inline(r#"{"features": {"grid": {}}}"#.to_string()),
        ]);
        let dataset = loader.load().await;
        assert_eq!(dataset.len(), 1);
    }

    #[tokio::test]
    async fn test_file_source_takes_precedence() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"features": {{"from-file": {{}}}}}}"#).unwrap();

        let loader = DatasetLoader::with_fallbacks(Some(file.path().to_path_buf()), None);
        let dataset = loader.load().await;
        assert!(dataset.get("from-file").is_some());
        assert!(dataset.get("grid").is_none());
    }

    #[tokio::test]
    async fn test_every_source_failing_yields_empty_dataset() {
        let loader = DatasetLoader::new(vec![
            DatasetSource::File(PathBuf::from("/nonexistent/data.json")),
            DatasetSource::Inline("{not json".to_string()),
        ]);
        let dataset = loader.load().await;
        assert!(dataset.is_empty());
    }

    #[tokio::test]
    async fn test_concurrent_first_callers_share_one_load() {
        let loader = DatasetLoader::snapshot();
        let (a, b) = tokio::join!(loader.load(), loader.load());

        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(loader.load_attempts(), 1);

        let _ = loader.load().await;
        assert_eq!(loader.load_attempts(), 1);
    }
}
