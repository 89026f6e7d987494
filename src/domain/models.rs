use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Post visibility - only public posts ever enter the feed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    Public,
    Private,
}

/// A viewer's reaction to a post - at most one of the two is active
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReactionKind {
    Like,
    Dislike,
}

/// Canonical feed entity held by the Feed Store
///
/// `created_at` is rendered into its display form once at normalization and
/// is never reformatted by later patches; `updated_at` is the feed sort key.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: String,
    pub title: String,
    pub content: String,
    pub tags: Vec<String>,
    pub visibility: Visibility,
    pub likes: i64,
    pub dislikes: i64,
    pub user_reaction: Option<ReactionKind>,
    pub created_at: String,
    pub updated_at: DateTime<Utc>,
}

/// Raw post record as delivered by an origin or a delta event
///
/// `id`, `title` and `content` are required; a record missing any of them
/// fails deserialization and is dropped by the caller. Counters and tags
/// default when absent.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawPost {
    pub id: String,
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub visibility: Option<Visibility>,
    #[serde(default)]
    pub likes: i64,
    #[serde(default)]
    pub dislikes: i64,
    #[serde(default)]
    pub user_reaction: Option<ReactionKind>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl RawPost {
    pub fn is_public(&self) -> bool {
        self.visibility == Some(Visibility::Public)
    }

    /// Convert into the canonical in-memory shape
    ///
    /// Pure: fills counter/reaction defaults (already applied by serde) and
    /// renders the created date into its fixed display form.
    pub fn normalize(self) -> Post {
        let visibility = self.visibility.unwrap_or(Visibility::Private);
        Post {
            id: self.id,
            title: self.title,
            content: self.content,
            tags: self.tags,
            visibility,
            likes: self.likes,
            dislikes: self.dislikes,
            user_reaction: self.user_reaction,
            created_at: format_display_date(self.created_at),
            updated_at: self.updated_at,
        }
    }
}

/// Fixed locale-independent display format, e.g. "Jan 5, 2024"
pub fn format_display_date(ts: DateTime<Utc>) -> String {
    ts.format("%b %-d, %Y").to_string()
}

/// Exclusive reaction toggle math
///
/// Repeating the active reaction clears it; switching kinds adjusts both
/// counters so a viewer never holds a like and a dislike at once. Derived
/// purely from the prior local state, so rapid successive toggles stay
/// correct before any remote write settles. Counters floor at zero.
pub fn apply_toggle(
    likes: i64,
    dislikes: i64,
    prev: Option<ReactionKind>,
    kind: ReactionKind,
) -> (i64, i64, Option<ReactionKind>) {
    if prev == Some(kind) {
        return match kind {
            ReactionKind::Like => ((likes - 1).max(0), dislikes, None),
            ReactionKind::Dislike => (likes, (dislikes - 1).max(0), None),
        };
    }

    let (mut likes, mut dislikes) = (likes, dislikes);
    match kind {
        ReactionKind::Like => likes += 1,
        ReactionKind::Dislike => dislikes += 1,
    }
    match prev {
        Some(ReactionKind::Like) => likes = (likes - 1).max(0),
        Some(ReactionKind::Dislike) => dislikes = (dislikes - 1).max(0),
        None => {}
    }
    (likes, dislikes, Some(kind))
}
