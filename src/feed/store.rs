use std::sync::{Mutex, MutexGuard};

use crate::domain::{apply_toggle, Post, ReactionKind, Visibility};

/// The ordered, id-keyed collection backing the displayed feed
///
/// This is the single shared mutable structure of the service. All mutations
/// go through it; a mutex preserves the single-writer-at-a-time discipline
/// (the lock is never held across an await point).
///
/// Invariants: at most one entry per id; only public posts; fully sorted by
/// `updated_at` descending after a `replace_all`. Incremental inserts from
/// delta events go to the front without a re-sort.
#[derive(Default)]
pub struct FeedStore {
    inner: Mutex<Vec<Post>>,
}

impl FeedStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<Post>> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Discard prior contents and install a freshly aggregated feed
    pub fn replace_all(&self, posts: Vec<Post>) {
        *self.lock() = posts;
    }

    /// Insert at the front; no-op unless the post is public
    pub fn prepend(&self, post: Post) {
        if post.visibility != Visibility::Public {
            return;
        }
        self.lock().insert(0, post);
    }

    /// Apply an `updated` record
    ///
    /// A non-public record removes any existing entry with that id. An
    /// existing public entry is replaced in place, keeping its stored
    /// `created_at` display value (a post's "posted on" date never changes
    /// due to an edit). An unknown public id is prepended as a new entry.
    pub fn patch_or_prepend(&self, post: Post) {
        let mut feed = self.lock();
        if post.visibility != Visibility::Public {
            feed.retain(|p| p.id != post.id);
            return;
        }
        match feed.iter_mut().find(|p| p.id == post.id) {
            Some(existing) => {
                let created_at = existing.created_at.clone();
                *existing = post;
                existing.created_at = created_at;
            }
            None => feed.insert(0, post),
        }
    }

    /// Delete the entry with that id; no-op if absent
    pub fn remove(&self, id: &str) {
        self.lock().retain(|p| p.id != id);
    }

    /// In-place counter/reaction update on the matching entry
    ///
    /// A missing id is a safe no-op: the post may have been removed by a
    /// concurrent `deleted` event.
    pub fn patch_reaction(
        &self,
        id: &str,
        likes: i64,
        dislikes: i64,
        user_reaction: Option<ReactionKind>,
    ) {
        let mut feed = self.lock();
        if let Some(post) = feed.iter_mut().find(|p| p.id == id) {
            post.likes = likes;
            post.dislikes = dislikes;
            post.user_reaction = user_reaction;
        }
    }

    /// Atomic reaction toggle on the matching entry
    ///
    /// The derivation from the prior state and the write happen under one
    /// guard, so concurrent toggles on the same post serialize and each one
    /// sees the immediately-prior reaction state. Returns the patched entry,
    /// or `None` if the id is absent (removed by a concurrent `deleted`
    /// event).
    pub fn toggle_reaction(&self, id: &str, kind: ReactionKind) -> Option<Post> {
        let mut feed = self.lock();
        let post = feed.iter_mut().find(|p| p.id == id)?;
        let (likes, dislikes, user_reaction) =
            apply_toggle(post.likes, post.dislikes, post.user_reaction, kind);
        post.likes = likes;
        post.dislikes = dislikes;
        post.user_reaction = user_reaction;
        Some(post.clone())
    }

    pub fn get(&self, id: &str) -> Option<Post> {
        self.lock().iter().find(|p| p.id == id).cloned()
    }

    pub fn snapshot(&self) -> Vec<Post> {
        self.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn post(id: &str) -> Post {
        Post {
            id: id.to_string(),
            title: format!("title-{id}"),
            content: "content".to_string(),
            tags: vec![],
            visibility: Visibility::Public,
            likes: 0,
            dislikes: 0,
            user_reaction: None,
            created_at: "Jan 1, 2024".to_string(),
            updated_at: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
        }
    }

    fn ids(store: &FeedStore) -> Vec<String> {
        store.snapshot().into_iter().map(|p| p.id).collect()
    }

    #[test]
    fn prepend_inserts_at_front() {
        let store = FeedStore::new();
        store.replace_all(vec![post("a"), post("b")]);
        store.prepend(post("c"));
        assert_eq!(ids(&store), ["c", "a", "b"]);
    }

    #[test]
    fn prepend_ignores_private_posts() {
        let store = FeedStore::new();
        let mut p = post("a");
        p.visibility = Visibility::Private;
        store.prepend(p);
        assert!(store.is_empty());
    }

    #[test]
    fn patch_preserves_created_date() {
        let store = FeedStore::new();
        store.replace_all(vec![post("a")]);

        let mut edited = post("a");
        edited.content = "edited".to_string();
        edited.created_at = "Feb 2, 2024".to_string();
        store.patch_or_prepend(edited);

        let stored = store.get("a").unwrap();
        assert_eq!(stored.content, "edited");
        assert_eq!(stored.created_at, "Jan 1, 2024");
    }

    #[test]
    fn patch_with_private_visibility_removes_entry() {
        let store = FeedStore::new();
        store.replace_all(vec![post("a"), post("b")]);

        let mut hidden = post("a");
        hidden.visibility = Visibility::Private;
        store.patch_or_prepend(hidden);

        assert_eq!(ids(&store), ["b"]);
    }

    #[test]
    fn patch_of_unknown_id_prepends() {
        let store = FeedStore::new();
        store.replace_all(vec![post("a")]);
        store.patch_or_prepend(post("b"));
        assert_eq!(ids(&store), ["b", "a"]);
    }

    #[test]
    fn remove_deletes_exactly_that_id() {
        let store = FeedStore::new();
        store.replace_all(vec![post("a"), post("b")]);
        store.remove("b");
        assert_eq!(ids(&store), ["a"]);
        // no-op on absent id
        store.remove("b");
        assert_eq!(ids(&store), ["a"]);
    }

    #[test]
    fn patch_reaction_after_remove_is_a_noop() {
        let store = FeedStore::new();
        store.replace_all(vec![post("a")]);
        store.remove("a");
        store.patch_reaction("a", 1, 0, Some(ReactionKind::Like));
        assert!(store.get("a").is_none());
    }

    #[test]
    fn toggle_reaction_derives_from_stored_state() {
        let store = FeedStore::new();
        store.replace_all(vec![post("a")]);

        let patched = store.toggle_reaction("a", ReactionKind::Like).unwrap();
        assert_eq!(patched.likes, 1);
        assert_eq!(patched.user_reaction, Some(ReactionKind::Like));

        let patched = store.toggle_reaction("a", ReactionKind::Like).unwrap();
        assert_eq!(patched.likes, 0);
        assert_eq!(patched.user_reaction, None);

        assert!(store.toggle_reaction("gone", ReactionKind::Like).is_none());
    }

    #[test]
    fn concurrent_toggles_on_one_post_serialize() {
        use std::sync::{Arc, Barrier};

        // two simultaneous toggles of the same kind must round-trip:
        // one turns the reaction on, the other sees it and turns it off
        for _ in 0..1000 {
            let store = Arc::new(FeedStore::new());
            store.replace_all(vec![post("a")]);
            let barrier = Arc::new(Barrier::new(2));

            let handles: Vec<_> = (0..2)
                .map(|_| {
                    let store = Arc::clone(&store);
                    let barrier = Arc::clone(&barrier);
                    std::thread::spawn(move || {
                        barrier.wait();
                        store.toggle_reaction("a", ReactionKind::Like);
                    })
                })
                .collect();
            for handle in handles {
                handle.join().unwrap();
            }

            let stored = store.get("a").unwrap();
            assert_eq!(
                (stored.likes, stored.user_reaction),
                (0, None),
                "concurrent toggles lost an update"
            );
        }
    }

    #[test]
    fn patch_reaction_updates_counters_in_place() {
        let store = FeedStore::new();
        store.replace_all(vec![post("a")]);
        store.patch_reaction("a", 5, 2, Some(ReactionKind::Dislike));
        let stored = store.get("a").unwrap();
        assert_eq!(stored.likes, 5);
        assert_eq!(stored.dislikes, 2);
        assert_eq!(stored.user_reaction, Some(ReactionKind::Dislike));
    }
}
