//! Ordered in-memory collection of work items.
//!
//! Most recently added items come first. Every mutation goes through
//! [`crate::reconcile`], so entries other than the one being changed keep
//! their `Arc` identity.

use std::sync::Arc;

use tracing::debug;

use crate::error::{PromptifyError, Result};
use crate::reconcile::{patch_items, reconcile};
use crate::types::item::{ItemId, ItemPatch, WorkItem};
use crate::types::outcome::Outcome;

/// In-memory work item store.
///
/// Not synchronized; the controller wraps it in a lock. Nothing here
/// persists across restarts.
#[derive(Debug, Default, Clone)]
pub struct WorkItemStore {
    items: Vec<Arc<WorkItem>>,
}

impl WorkItemStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Track a new URL at the front of the list.
    ///
    /// Rejects blank input and URLs already present.
    pub fn add(&mut self, url: &str) -> Result<ItemId> {
        let url = url.trim();
        if url.is_empty() {
            return Err(PromptifyError::EmptyUrl);
        }
        if self.contains_url(url) {
            return Err(PromptifyError::DuplicateUrl {
                url: url.to_string(),
            });
        }

        let item = WorkItem::new(url);
        let id = item.id;
        self.items.insert(0, Arc::new(item));
        debug!(item_id = %id, url, "Work item added");
        Ok(id)
    }

    /// Delete an item unconditionally. Returns the removed item, if any.
    pub fn remove(&mut self, id: ItemId) -> Option<Arc<WorkItem>> {
        let index = self.items.iter().position(|item| item.id == id)?;
        let removed = self.items.remove(index);
        debug!(item_id = %id, "Work item removed");
        Some(removed)
    }

    /// Mark an item's image as failed to load. Idempotent.
    ///
    /// Returns true when the item changed.
    pub fn mark_invalid(&mut self, id: ItemId) -> bool {
        self.update(id, &ItemPatch::invalidate())
    }

    /// Apply a partial mutation to the item matching `id`.
    ///
    /// Returns true when the item exists and changed.
    pub fn update(&mut self, id: ItemId, patch: &ItemPatch) -> bool {
        match patch_items(&self.items, id, patch) {
            Some(next) => {
                self.items = next;
                true
            }
            None => false,
        }
    }

    /// Merge a generation outcome. Returns false when the id is gone.
    pub fn apply_outcome(&mut self, outcome: &Outcome) -> bool {
        if !self.contains(outcome.id) {
            debug!(item_id = %outcome.id, "Dropping outcome for removed item");
            return false;
        }
        self.items = reconcile(&self.items, outcome);
        true
    }

    pub fn get(&self, id: ItemId) -> Option<Arc<WorkItem>> {
        self.items.iter().find(|item| item.id == id).cloned()
    }

    pub fn contains(&self, id: ItemId) -> bool {
        self.items.iter().any(|item| item.id == id)
    }

    pub fn contains_url(&self, url: &str) -> bool {
        self.items.iter().any(|item| item.url == url)
    }

    /// Items in display order.
    pub fn items(&self) -> &[Arc<WorkItem>] {
        &self.items
    }

    /// Owned copy of the current ordering.
    pub fn snapshot(&self) -> Vec<Arc<WorkItem>> {
        self.items.clone()
    }

    /// Ids a batch run launched now would process, in display order.
    pub fn batch_targets(&self) -> Vec<ItemId> {
        self.items
            .iter()
            .filter(|item| item.is_batch_eligible())
            .map(|item| item.id)
            .collect()
    }

    /// Prompts of all items that have one, in display order.
    pub fn prompts(&self) -> impl Iterator<Item = &str> {
        self.items.iter().filter_map(|item| item.prompt.as_deref())
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::item::Validity;
    use crate::types::outcome::GeneratedPrompt;

    #[test]
    fn test_add_places_newest_first() {
        let mut store = WorkItemStore::new();
        let a = store.add("https://example.com/a.png").unwrap();
        let b = store.add("https://example.com/b.png").unwrap();

        assert_eq!(store.len(), 2);
        assert_eq!(store.items()[0].id, b);
        assert_eq!(store.items()[1].id, a);
    }

    #[test]
    fn test_add_rejects_blank() {
        let mut store = WorkItemStore::new();
        assert!(matches!(store.add(""), Err(PromptifyError::EmptyUrl)));
        assert!(matches!(store.add("   \t"), Err(PromptifyError::EmptyUrl)));
        assert!(store.is_empty());
    }

    #[test]
    fn test_add_rejects_duplicate() {
        let mut store = WorkItemStore::new();
        store.add("https://example.com/a.png").unwrap();

        let err = store.add(" https://example.com/a.png ").unwrap_err();
        assert!(matches!(err, PromptifyError::DuplicateUrl { ref url } if url == "https://example.com/a.png"));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_readd_after_remove_gets_new_id() {
        let mut store = WorkItemStore::new();
        let first = store.add("https://example.com/a.png").unwrap();
        store.remove(first).unwrap();

        let second = store.add("https://example.com/a.png").unwrap();
        assert_ne!(first, second);
        assert!(!store.contains(first));
    }

    #[test]
    fn test_mark_invalid_idempotent() {
        let mut store = WorkItemStore::new();
        let id = store.add("https://example.com/a.png").unwrap();

        assert!(store.mark_invalid(id));
        assert!(!store.mark_invalid(id));
        assert_eq!(store.get(id).unwrap().validity, Validity::Invalid);
        assert!(!store.mark_invalid(ItemId::new()));
    }

    #[test]
    fn test_update_preserves_other_items() {
        let mut store = WorkItemStore::new();
        let a = store.add("https://example.com/a.png").unwrap();
        store.add("https://example.com/b.png").unwrap();
        let before = store.snapshot();

        assert!(store.update(a, &ItemPatch::start_generation()));

        let after = store.snapshot();
        assert!(Arc::ptr_eq(&before[0], &after[0]));
        assert!(!Arc::ptr_eq(&before[1], &after[1]));
        assert!(after[1].generating);
    }

    #[test]
    fn test_outcome_for_removed_item_is_dropped() {
        let mut store = WorkItemStore::new();
        let id = store.add("https://example.com/a.png").unwrap();
        store.remove(id);

        let applied = store.apply_outcome(&Outcome::succeeded(
            id,
            GeneratedPrompt::new("late", ["x"]),
        ));
        assert!(!applied);
        assert!(store.is_empty());
    }

    #[test]
    fn test_batch_targets_filter() {
        let mut store = WorkItemStore::new();
        let c = store.add("https://example.com/c.png").unwrap();
        let b = store.add("https://example.com/b.png").unwrap();
        let a = store.add("https://example.com/a.png").unwrap();

        store.mark_invalid(b);
        store.apply_outcome(&Outcome::succeeded(c, GeneratedPrompt::new("done", ["x"])));

        assert_eq!(store.batch_targets(), vec![a]);
    }

    #[test]
    fn test_prompts_in_store_order() {
        let mut store = WorkItemStore::new();
        let second = store.add("https://example.com/2.png").unwrap();
        store.add("https://example.com/none.png").unwrap();
        let first = store.add("https://example.com/1.png").unwrap();

        store.apply_outcome(&Outcome::succeeded(first, GeneratedPrompt::new("P1", ["a"])));
        store.apply_outcome(&Outcome::succeeded(second, GeneratedPrompt::new("P2", ["b"])));

        assert_eq!(store.prompts().collect::<Vec<_>>(), vec!["P1", "P2"]);
    }
}
