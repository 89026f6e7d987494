use std::collections::HashSet;
use std::sync::Arc;

use futures_util::future::join_all;
use serde_json::Value;
use tracing::{debug, warn};

use crate::domain::{Post, RawPost};
use crate::error::ServiceResult;
use crate::origins::PostOrigin;

/// Merges the configured origins into a single ordered feed
///
/// Origins are fetched concurrently and fail independently: a failed origin
/// contributes zero records and is never surfaced as a load error. Records
/// are deduplicated by id (first origin wins), filtered to public,
/// normalized, and sorted by `updated_at` descending.
pub struct FeedAggregator {
    origins: Vec<Arc<dyn PostOrigin>>,
}

impl FeedAggregator {
    /// Origin order matters: earlier origins win duplicate-id collisions.
    pub fn new(origins: Vec<Arc<dyn PostOrigin>>) -> Self {
        Self { origins }
    }

    /// Dedup runs on the concatenated list before the visibility filter:
    /// the first record carrying an id claims it even when that record is
    /// private, so a private record from an earlier origin shadows a public
    /// one with the same id from a later origin.
    pub async fn load_feed(&self) -> ServiceResult<Vec<Post>> {
        let fetches = self.origins.iter().map(|origin| async move {
            (origin.name().to_string(), origin.fetch().await)
        });
        let results = join_all(fetches).await;

        let mut seen: HashSet<String> = HashSet::new();
        let mut posts: Vec<Post> = Vec::new();

        for (origin, result) in results {
            let records = match result {
                Ok(payload) => collect_records(&origin, payload),
                Err(err) => {
                    warn!(origin = %origin, error = %err, "origin fetch failed, contributing no posts");
                    Vec::new()
                }
            };

            for raw in records {
                if !seen.insert(raw.id.clone()) {
                    debug!(origin = %origin, post_id = %raw.id, "dropping duplicate id from later origin");
                    continue;
                }
                if !raw.is_public() {
                    continue;
                }
                posts.push(raw.normalize());
            }
        }

        posts.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        Ok(posts)
    }
}

/// Decode an origin payload into raw records
///
/// A non-array payload contributes nothing; malformed records are dropped
/// individually rather than failing the whole origin.
fn collect_records(origin: &str, payload: Value) -> Vec<RawPost> {
    let Value::Array(items) = payload else {
        warn!(origin = %origin, "origin returned a non-array payload, contributing no posts");
        return Vec::new();
    };

    items
        .into_iter()
        .filter_map(|item| match serde_json::from_value::<RawPost>(item) {
            Ok(raw) => Some(raw),
            Err(err) => {
                debug!(origin = %origin, error = %err, "dropping malformed post record");
                None
            }
        })
        .collect()
}
