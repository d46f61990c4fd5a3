//! Polyfill and fallback suggestions for detected features.

use serde::Serialize;

/// How to keep a feature working where it is unsupported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PolyfillSuggestion {
    /// Feature id the suggestion applies to
    pub feature_id: &'static str,
    /// Display name used in reports
    pub feature: &'static str,
    pub polyfills: &'static [&'static str],
    pub fallback_strategy: &'static str,
    pub npm_packages: &'static [&'static str],
    pub cdn_links: &'static [&'static str],
}

impl PolyfillSuggestion {
    /// Whether there is anything to install
    pub fn has_packages(&self) -> bool {
        !self.npm_packages.is_empty() || !self.cdn_links.is_empty()
    }
}

pub const SUGGESTIONS: &[PolyfillSuggestion] = &[
    PolyfillSuggestion {
        feature_id: "container-queries",
        feature: "Container Queries",
        polyfills: &["container-query-polyfill"],
        fallback_strategy: "Use media queries as fallback or feature detection with ResizeObserver",
        npm_packages: &["container-query-polyfill"],
        cdn_links: &[
            "https://unpkg.com/container-query-polyfill@1.0.2/dist/container-query-polyfill.modern.js",
        ],
    },
    PolyfillSuggestion {
        feature_id: "has",
        feature: ":has() selector",
        polyfills: &[],
        fallback_strategy: "Use JavaScript for dynamic class toggling based on child presence",
        npm_packages: &[],
        cdn_links: &[],
    },
    PolyfillSuggestion {
        feature_id: "grid",
        feature: "CSS Grid",
        polyfills: &[],
        fallback_strategy: "Use Flexbox or floats for older browsers. Grid is widely supported.",
        npm_packages: &[],
        cdn_links: &[],
    },
    PolyfillSuggestion {
        feature_id: "subgrid",
        feature: "CSS Subgrid",
        polyfills: &[],
        fallback_strategy: "Use nested grids or define columns explicitly on child elements",
        npm_packages: &[],
        cdn_links: &[],
    },
    PolyfillSuggestion {
        feature_id: "nesting",
        feature: "CSS Nesting",
        polyfills: &["postcss-nesting"],
        fallback_strategy: "Use a PostCSS plugin to compile nested CSS to flat CSS",
        npm_packages: &["postcss-nesting", "postcss-preset-env"],
        cdn_links: &[],
    },
    PolyfillSuggestion {
        feature_id: "custom-properties",
        feature: "CSS Custom Properties",
        polyfills: &["css-vars-ponyfill"],
        fallback_strategy: "Provide static fallback values before custom property usage",
        npm_packages: &["css-vars-ponyfill"],
        cdn_links: &["https://unpkg.com/css-vars-ponyfill@2.4.8/dist/css-vars-ponyfill.min.js"],
    },
    PolyfillSuggestion {
        feature_id: "logical-properties",
        feature: "CSS Logical Properties",
        polyfills: &["postcss-logical"],
        fallback_strategy: "Use PostCSS to convert logical properties to physical ones",
        npm_packages: &["postcss-logical"],
        cdn_links: &[],
    },
    PolyfillSuggestion {
        feature_id: "top-level-await",
        feature: "Top-level Await",
        polyfills: &["@babel/plugin-syntax-top-level-await"],
        fallback_strategy: "Wrap in async IIFE: (async () => { await ... })()",
        npm_packages: &["@babel/plugin-syntax-top-level-await"],
        cdn_links: &[],
    },
];

/// Suggestion for a feature id, if one exists
pub fn suggestion_for(feature_id: &str) -> Option<&'static PolyfillSuggestion> {
    SUGGESTIONS.iter().find(|s| s.feature_id == feature_id)
}
