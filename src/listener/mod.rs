//! Live Delta Listener
//!
//! A long-lived Redis pub/sub subscription that keeps the Feed Store
//! consistent as `created` / `updated` / `deleted` events arrive out of
//! band. A malformed message is ignored; it never terminates the
//! subscription.

use std::sync::Arc;

use futures_util::StreamExt;
use redis::Client;
use serde::Deserialize;
use serde_json::Value;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::domain::RawPost;
use crate::error::ServiceResult;
use crate::feed::FeedStore;

/// Wire envelope for a feed delta event
///
/// `created`/`updated` carry a full post record; `deleted` carries a bare
/// id. All fields beyond `event` are optional so that a malformed message
/// decodes far enough to be rejected per field instead of crashing the
/// subscription.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeltaEnvelope {
    pub event: String,
    #[serde(default)]
    pub post: Option<Value>,
    #[serde(default)]
    pub id: Option<String>,
}

/// Subscriber for feed delta events
pub struct DeltaListener {
    client: Client,
    channel: String,
}

/// Handle for an active subscription; abort to unsubscribe
pub struct ListenerHandle {
    task: JoinHandle<()>,
}

impl ListenerHandle {
    pub fn unsubscribe(self) {
        self.task.abort();
    }
}

impl DeltaListener {
    pub fn new(redis_url: &str, channel: String) -> ServiceResult<Self> {
        let client = Client::open(redis_url)?;
        Ok(Self { client, channel })
    }

    /// Subscribe and apply incoming deltas to the store in a background task
    pub async fn spawn(&self, store: Arc<FeedStore>) -> ServiceResult<ListenerHandle> {
        let mut pubsub = self.client.get_async_pubsub().await?;
        pubsub.subscribe(&self.channel).await?;

        info!(channel = %self.channel, "subscribed to feed delta events");

        let task = tokio::spawn(async move {
            let mut stream = pubsub.on_message();

            while let Some(msg) = stream.next().await {
                let payload = match msg.get_payload::<String>() {
                    Ok(p) => p,
                    Err(e) => {
                        error!(error = ?e, "failed to read delta message payload");
                        continue;
                    }
                };

                let envelope: DeltaEnvelope = match serde_json::from_str(&payload) {
                    Ok(envelope) => envelope,
                    Err(e) => {
                        warn!(error = ?e, "ignoring malformed delta message");
                        continue;
                    }
                };

                apply_delta(&store, envelope);
            }

            warn!("feed delta subscription ended");
        });

        Ok(ListenerHandle { task })
    }
}

/// Route one delta event into the Feed Store
///
/// Missing or unparsable payload fields make the event a no-op.
pub fn apply_delta(store: &FeedStore, envelope: DeltaEnvelope) {
    match envelope.event.as_str() {
        "created" => {
            let Some(raw) = decode_post(envelope.post) else {
                return;
            };
            if !raw.is_public() {
                debug!(post_id = %raw.id, "ignoring created event for non-public post");
                return;
            }
            store.prepend(raw.normalize());
        }
        "updated" => {
            // patch_or_prepend handles public->private removal,
            // private->public insertion and in-place edits uniformly
            let Some(raw) = decode_post(envelope.post) else {
                return;
            };
            store.patch_or_prepend(raw.normalize());
        }
        "deleted" => match envelope.id {
            Some(id) => store.remove(&id),
            None => warn!("ignoring deleted event without an id"),
        },
        other => debug!(event = %other, "ignoring unknown delta event kind"),
    }
}

fn decode_post(payload: Option<Value>) -> Option<RawPost> {
    let value = match payload {
        Some(value) => value,
        None => {
            warn!("ignoring delta event without a post payload");
            return None;
        }
    };
    match serde_json::from_value::<RawPost>(value) {
        Ok(raw) => Some(raw),
        Err(err) => {
            warn!(error = %err, "ignoring delta event with a malformed post payload");
            None
        }
    }
}
