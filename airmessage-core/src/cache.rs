//! Local Message Cache
//!
//! In-memory store of locally-held conversation items, keyed by the
//! conversation's local id. It is owned by the [`AppContext`](crate::AppContext)
//! rather than living in a global, is created empty at startup and cleared at
//! teardown.
//!
//! ## Semantics
//!
//! - `get` returns `None` for conversations that were never cached. `None`
//!   means "not cached yet", which is different from an empty thread.
//! - `set` replaces the whole sequence for a conversation. There is no merge
//!   or append; callers read, modify and write back.
//! - Concurrent writers to the same id race: the last write wins.
//! - No persistence, size bound or eviction.

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use tracing::debug;

use crate::data::ConversationItem;

/// Conversation id used as the cache key
pub type ConversationId = i64;

/// Map from conversation id to its ordered items
#[derive(Debug)]
pub struct LocalMessageCache<I = ConversationItem> {
    conversations: RwLock<HashMap<ConversationId, Vec<I>>>,
}

impl<I> LocalMessageCache<I> {
    /// Create an empty cache
    pub fn new() -> Self {
        Self {
            conversations: RwLock::new(HashMap::new()),
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, HashMap<ConversationId, Vec<I>>> {
        self.conversations
            .read()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<ConversationId, Vec<I>>> {
        self.conversations
            .write()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Replace the items cached for `conversation_id`
    pub fn set(&self, conversation_id: ConversationId, items: Vec<I>) {
        debug!(
            "Caching {} items for conversation {}",
            items.len(),
            conversation_id
        );
        self.write().insert(conversation_id, items);
    }

    /// Drop the items cached for `conversation_id`, returning them
    pub fn remove(&self, conversation_id: ConversationId) -> Option<Vec<I>> {
        self.write().remove(&conversation_id)
    }

    /// Whether `conversation_id` has been cached (possibly as empty)
    pub fn contains(&self, conversation_id: ConversationId) -> bool {
        self.read().contains_key(&conversation_id)
    }

    /// Number of cached conversations
    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    /// Remove every cached conversation
    pub fn clear(&self) {
        let mut conversations = self.write();
        debug!("Clearing {} cached conversations", conversations.len());
        conversations.clear();
    }
}

impl<I: Clone> LocalMessageCache<I> {
    /// Items cached for `conversation_id`, or `None` if never cached
    pub fn get(&self, conversation_id: ConversationId) -> Option<Vec<I>> {
        self.read().get(&conversation_id).cloned()
    }
}

impl<I> Default for LocalMessageCache<I> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::MessageItem;
    use chrono::Utc;

    fn text_item(text: &str) -> ConversationItem {
        ConversationItem::message(
            "chat",
            Utc::now(),
            MessageItem {
                text: Some(text.to_string()),
                ..MessageItem::default()
            },
        )
    }

    #[test]
    fn test_get_unset_is_none() {
        let cache = LocalMessageCache::<ConversationItem>::new();
        assert!(cache.get(1).is_none());
        assert!(!cache.contains(1));
        assert!(cache.is_empty());
    }

    #[test]
    fn test_set_replaces_wholesale() {
        let cache = LocalMessageCache::new();
        let (a, b, c) = (text_item("a"), text_item("b"), text_item("c"));

        assert_eq!(cache.get(42), None);

        cache.set(42, vec![a.clone(), b.clone()]);
        assert_eq!(cache.get(42), Some(vec![a, b]));

        cache.set(42, vec![c.clone()]);
        assert_eq!(cache.get(42), Some(vec![c]));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_empty_is_distinct_from_absent() {
        let cache = LocalMessageCache::<u32>::new();
        cache.set(7, Vec::new());

        assert_eq!(cache.get(7), Some(Vec::new()));
        assert_eq!(cache.get(8), None);
    }

    #[test]
    fn test_preserves_order_and_duplicates() {
        let cache = LocalMessageCache::<u32>::new();
        cache.set(1, vec![3, 1, 3, 2]);
        assert_eq!(cache.get(1), Some(vec![3, 1, 3, 2]));
    }

    #[test]
    fn test_remove_and_clear() {
        let cache = LocalMessageCache::<u32>::new();
        cache.set(1, vec![1]);
        cache.set(2, vec![2]);

        assert_eq!(cache.remove(1), Some(vec![1]));
        assert_eq!(cache.remove(1), None);
        assert!(cache.contains(2));

        cache.clear();
        assert!(cache.is_empty());
        assert_eq!(cache.get(2), None);
    }

    #[test]
    fn test_last_write_wins() {
        use std::sync::Arc;

        let cache = Arc::new(LocalMessageCache::<u32>::new());
        let writers: Vec<_> = (0..4)
            .map(|n| {
                let cache = Arc::clone(&cache);
                std::thread::spawn(move || cache.set(9, vec![n]))
            })
            .collect();
        for writer in writers {
            writer.join().unwrap();
        }

        let stored = cache.get(9).unwrap();
        assert_eq!(stored.len(), 1);
        assert!(stored[0] < 4);
    }
}
