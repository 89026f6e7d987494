//! Reaction Reconciler
//!
//! Applies an exclusive like/dislike toggle to one Feed Store entry,
//! computing the new counters purely from the immediately-prior local state,
//! then commits the write to the platform API without blocking the caller.
//! The remote write is fire-and-forget: its failure never rolls back the
//! local counters.

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;
use tracing::{debug, warn};

use crate::domain::{Post, ReactionKind};
use crate::feed::FeedStore;

/// Why a remote reaction commit was rejected
#[derive(Debug, Error)]
pub enum CommitError {
    #[error("viewer is not logged in")]
    Unauthorized,

    #[error("reaction commit failed: {0}")]
    Other(String),
}

/// Remote endpoint accepting reaction writes
#[async_trait]
pub trait ReactionGateway: Send + Sync {
    async fn submit(&self, post_id: &str, kind: ReactionKind) -> Result<(), CommitError>;
}

/// HTTP gateway posting reactions to the platform API
pub struct HttpReactionGateway {
    endpoint: String,
    client: reqwest::Client,
}

impl HttpReactionGateway {
    pub fn new(endpoint: impl Into<String>, client: reqwest::Client) -> Self {
        Self {
            endpoint: endpoint.into(),
            client,
        }
    }
}

#[async_trait]
impl ReactionGateway for HttpReactionGateway {
    async fn submit(&self, post_id: &str, kind: ReactionKind) -> Result<(), CommitError> {
        let url = format!("{}/posts/{}/reactions", self.endpoint, post_id);
        let response = self
            .client
            .post(&url)
            .json(&serde_json::json!({ "kind": kind }))
            .send()
            .await
            .map_err(|e| CommitError::Other(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            Ok(())
        } else if status == reqwest::StatusCode::UNAUTHORIZED
            || status == reqwest::StatusCode::FORBIDDEN
        {
            Err(CommitError::Unauthorized)
        } else {
            Err(CommitError::Other(format!("unexpected status {status}")))
        }
    }
}

/// Applies optimistic toggles to the store and commits them remotely
pub struct ReactionService {
    store: Arc<FeedStore>,
    gateway: Arc<dyn ReactionGateway>,
}

impl ReactionService {
    pub fn new(store: Arc<FeedStore>, gateway: Arc<dyn ReactionGateway>) -> Self {
        Self { store, gateway }
    }

    /// Toggle a reaction on one post
    ///
    /// The local patch lands before the remote write is even issued, and the
    /// derive-and-write runs as one critical section inside the store, so
    /// parallel toggles on the same post serialize. Returns the patched
    /// entry, or `None` when the post is no longer in the store (e.g.
    /// removed by a concurrent `deleted` event).
    pub fn toggle(&self, post_id: &str, kind: ReactionKind) -> Option<Post> {
        let patched = self.store.toggle_reaction(post_id, kind)?;

        let gateway = Arc::clone(&self.gateway);
        let id = post_id.to_string();
        tokio::spawn(async move {
            match gateway.submit(&id, kind).await {
                Ok(()) => debug!(post_id = %id, "reaction committed"),
                Err(CommitError::Unauthorized) => {
                    // surfaced to the viewer as a log-in prompt; local state stands
                    warn!(post_id = %id, "reaction rejected: viewer must be logged in");
                }
                Err(err) => {
                    debug!(post_id = %id, error = %err, "reaction commit dropped");
                }
            }
        });

        Some(patched)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Visibility;
    use chrono::{TimeZone, Utc};
    use std::sync::Mutex;

    fn post(id: &str, likes: i64, dislikes: i64, reaction: Option<ReactionKind>) -> Post {
        Post {
            id: id.to_string(),
            title: "title".to_string(),
            content: "content".to_string(),
            tags: vec![],
            visibility: Visibility::Public,
            likes,
            dislikes,
            user_reaction: reaction,
            created_at: "Jan 1, 2024".to_string(),
            updated_at: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
        }
    }

    #[derive(Default)]
    struct RecordingGateway {
        submitted: Mutex<Vec<(String, ReactionKind)>>,
        reject_with: Option<fn() -> CommitError>,
    }

    #[async_trait]
    impl ReactionGateway for RecordingGateway {
        async fn submit(&self, post_id: &str, kind: ReactionKind) -> Result<(), CommitError> {
            self.submitted
                .lock()
                .unwrap()
                .push((post_id.to_string(), kind));
            match self.reject_with {
                Some(make) => Err(make()),
                None => Ok(()),
            }
        }
    }

    #[tokio::test]
    async fn toggle_patches_locally_before_commit_settles() {
        let store = Arc::new(FeedStore::new());
        store.replace_all(vec![post("a", 5, 2, None)]);
        let gateway = Arc::new(RecordingGateway::default());
        let service = ReactionService::new(Arc::clone(&store), gateway.clone());

        let patched = service.toggle("a", ReactionKind::Like).unwrap();
        assert_eq!(patched.likes, 6);
        assert_eq!(patched.user_reaction, Some(ReactionKind::Like));

        // second toggle derives from local state, not from a server reply
        let patched = service.toggle("a", ReactionKind::Dislike).unwrap();
        assert_eq!(patched.likes, 5);
        assert_eq!(patched.dislikes, 3);
        assert_eq!(patched.user_reaction, Some(ReactionKind::Dislike));

        tokio::task::yield_now().await;
        let submitted = gateway.submitted.lock().unwrap();
        assert_eq!(submitted.len(), 2);
        assert_eq!(submitted[0], ("a".to_string(), ReactionKind::Like));
    }

    #[tokio::test]
    async fn unauthorized_commit_keeps_local_state() {
        let store = Arc::new(FeedStore::new());
        store.replace_all(vec![post("a", 5, 2, None)]);
        let gateway = Arc::new(RecordingGateway {
            submitted: Mutex::new(vec![]),
            reject_with: Some(|| CommitError::Unauthorized),
        });
        let service = ReactionService::new(Arc::clone(&store), gateway);

        service.toggle("a", ReactionKind::Like).unwrap();
        tokio::task::yield_now().await;

        let stored = store.get("a").unwrap();
        assert_eq!(stored.likes, 6);
        assert_eq!(stored.user_reaction, Some(ReactionKind::Like));
    }

    #[tokio::test]
    async fn toggle_on_a_removed_post_is_none() {
        let store = Arc::new(FeedStore::new());
        store.replace_all(vec![post("a", 0, 0, None)]);
        store.remove("a");
        let service = ReactionService::new(Arc::clone(&store), Arc::new(RecordingGateway::default()));

        assert!(service.toggle("a", ReactionKind::Like).is_none());
        assert!(store.get("a").is_none());
    }
}
