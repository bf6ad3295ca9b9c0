//! Public sample listing shown on the playground's landing page.
//!
//! The listing maps every named shared project to its name:
//!
//! ```json
//! { "s_1": { "n": "Hello world" }, "s_2": { "n": "Drag and drop", "j": "...", "h": "..." } }
//! ```
//!
//! When the visitor has a shared project selected, that entry also carries
//! its code, so the selection is part of the cache key: `samples:index`
//! without one, `samples:<id>` with one.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;

use crate::cache::{Cache, CacheKey, Namespace};
use crate::store::{ProjectId, ProjectStore};

const INDEX_KEY: &str = "index";

#[derive(Debug, Serialize)]
struct SampleEntry<'a> {
    n: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    j: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    h: Option<&'a str>,
}

/// Builds and caches the listing.
#[derive(Debug, Clone)]
pub struct SampleIndex {
    store: Arc<dyn ProjectStore>,
    ttl: Duration,
}

impl SampleIndex {
    pub fn new(store: Arc<dyn ProjectStore>, ttl: Duration) -> Self {
        Self {
            store,
            ttl,
        }
    }

    /// Cache key for a listing with `selected` expanded.
    ///
    /// Private selections never expand, so they share the plain index.
    pub fn cache_key(selected: Option<ProjectId>) -> CacheKey {
        match selected.filter(|id| id.is_public()) {
            Some(id) => CacheKey::new(Namespace::Samples, id.to_string()),
            None => CacheKey::new(Namespace::Samples, INDEX_KEY),
        }
    }

    /// Render the listing straight from the store.
    pub fn render(&self, selected: Option<ProjectId>) -> String {
        tracing::info!("Fetch all public projects.");
        let projects = self.store.public_projects();

        let listing: serde_json::Map<String, serde_json::Value> = projects
            .iter()
            .map(|project| {
                let expanded = selected == Some(project.id);
                let entry = SampleEntry {
                    n: &project.name,
                    j: expanded.then_some(project.js_code.as_str()),
                    h: expanded.then_some(project.html_code.as_str()),
                };
                let value = serde_json::to_value(entry).unwrap_or(serde_json::Value::Null);
                (project.id.to_string(), value)
            })
            .collect();

        serde_json::Value::Object(listing).to_string()
    }

    /// Listing JSON through the shared cache.
    pub async fn listing(&self, cache: &Cache, selected: Option<ProjectId>) -> Arc<String> {
        let outcome = cache
            .get_or_compute(Self::cache_key(selected), Some(self.ttl), || async {
                Ok::<_, std::convert::Infallible>(self.render(selected))
            })
            .await;

        match outcome {
            Ok(listing) => listing,
            Err(never) => match never {},
        }
    }
}
