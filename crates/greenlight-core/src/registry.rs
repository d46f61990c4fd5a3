//! Feature lookup over the web-features dataset.

use chrono::{Datelike, NaiveDate};
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::cache::{feature_key, Cache, FEATURE_TTL};
use crate::dataset::{DatasetLoader, FeatureRecord};
use crate::types::{BaselineFeature, BaselineStatus, Browser, BrowserSupport};

/// Map a dataset record's `status.baseline` to a [`BaselineStatus`].
pub fn baseline_status(record: Option<&FeatureRecord>) -> BaselineStatus {
    let Some(record) = record else {
        return BaselineStatus::Unknown;
    };

    let baseline = record.status.as_ref().and_then(|s| s.baseline.as_ref());
    match baseline {
        Some(Value::String(s)) if s == "high" || s == "widely" => BaselineStatus::WidelyAvailable,
        Some(Value::String(s)) if s == "low" || s == "newly" => BaselineStatus::NewlyAvailable,
        Some(Value::Bool(false)) => BaselineStatus::NotBaseline,
        _ => BaselineStatus::Limited,
    }
}

/// Year the feature reached Baseline, preferring the "widely available" date.
pub fn baseline_year(record: &FeatureRecord) -> Option<String> {
    let status = record.status.as_ref()?;
    let date = status
        .baseline_high_date
        .as_deref()
        .filter(|d| !d.is_empty())
        .or_else(|| status.baseline_low_date.as_deref().filter(|d| !d.is_empty()))?;

    // Ranged dates look like "≤2020-03-24"
    let date = date.trim_start_matches('≤').trim();
    NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .ok()
        .map(|d| d.year().to_string())
}

/// Minimum versions for the tracked browsers.
pub fn browser_support(record: &FeatureRecord) -> BrowserSupport {
    let mut support = BrowserSupport::new();
    let Some(status) = record.status.as_ref() else {
        return support;
    };

    for browser in Browser::all() {
        let version = match status.support.get(browser.key()) {
            Some(Value::String(s)) if !s.is_empty() => s.clone(),
            Some(Value::Number(n)) => n.to_string(),
            _ => continue,
        };
        support.insert(*browser, version);
    }
    support
}

/// Build a [`BaselineFeature`] from a dataset record.
pub fn build_feature(id: &str, record: &FeatureRecord) -> BaselineFeature {
    BaselineFeature {
        id: id.to_string(),
        name: record
            .name
            .clone()
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| id.to_string()),
        description: record.description.clone(),
        status: baseline_status(Some(record)),
        baseline_year: baseline_year(record),
        support: browser_support(record),
        mdn_url: record.mdn_url.clone(),
        spec_url: record.spec_url(),
    }
}

/// Resolves feature ids to [`BaselineFeature`]s, caching each lookup.
#[derive(Debug, Clone)]
pub struct FeatureRegistry {
    loader: Arc<DatasetLoader>,
    cache: Arc<Cache<BaselineFeature>>,
}

impl FeatureRegistry {
    pub fn new(loader: Arc<DatasetLoader>, cache: Arc<Cache<BaselineFeature>>) -> Self {
        Self { loader, cache }
    }

    /// Look up a feature by id.
    ///
    /// Unknown ids are common and return `None`.
    pub async fn feature_by_id(&self, feature_id: &str) -> Option<BaselineFeature> {
        if feature_id.is_empty() {
            tracing::warn!("ignoring lookup for an empty feature id");
            return None;
        }

        let key = feature_key(feature_id);
        if let Some(cached) = self.cache.get(&key) {
            return Some(cached);
        }

        let dataset = self.loader.load().await;
        if dataset.is_empty() {
            tracing::warn!(feature_id, "feature dataset is empty or not loaded");
            return None;
        }

        let record = dataset.get(feature_id)?;
        let feature = build_feature(feature_id, record);
        self.cache.set_with_ttl(key, feature.clone(), FEATURE_TTL);

        Some(feature)
    }

    /// Every feature in the dataset, keyed by id
    pub async fn all_features(&self) -> BTreeMap<String, BaselineFeature> {
        let dataset = self.loader.load().await;
        dataset
            .iter()
            .map(|(id, record)| (id.clone(), build_feature(id, record)))
            .collect()
    }
}
