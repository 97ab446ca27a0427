//! Merging generation outcomes back into item state.
//!
//! Reconciliation is a pure function over the ordered item list: it replaces
//! the one item whose id matches and hands back every other entry as the same
//! `Arc`, so observers can skip re-rendering untouched items by pointer
//! comparison. An outcome for an id that is no longer present is dropped.

use std::sync::Arc;

use crate::types::item::{ItemId, ItemPatch, WorkItem};
use crate::types::outcome::Outcome;

/// Next state after merging `outcome` into `items`.
///
/// Only `generating`, `prompt`, `tags` and `error` of the matching item are
/// written. When no item matches, the returned list equals the input.
pub fn reconcile(items: &[Arc<WorkItem>], outcome: &Outcome) -> Vec<Arc<WorkItem>> {
    patch_items(items, outcome.id, &outcome.to_patch()).unwrap_or_else(|| items.to_vec())
}

/// Apply `patch` to the item matching `id`.
///
/// Returns `None` when the id is absent or the patch changes nothing.
pub(crate) fn patch_items(
    items: &[Arc<WorkItem>],
    id: ItemId,
    patch: &ItemPatch,
) -> Option<Vec<Arc<WorkItem>>> {
    let index = items.iter().position(|item| item.id == id)?;
    let current = &items[index];
    if patch.is_noop_for(current) {
        return None;
    }

    let mut next = items.to_vec();
    next[index] = Arc::new(patch.apply(current));
    Some(next)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::outcome::GeneratedPrompt;

    fn items(urls: &[&str]) -> Vec<Arc<WorkItem>> {
        urls.iter().map(|u| Arc::new(WorkItem::new(*u))).collect()
    }

    #[test]
    fn test_success_touches_only_target() {
        let before = items(&["https://a", "https://b", "https://c"]);
        let target = before[1].id;

        let after = reconcile(
            &before,
            &Outcome::succeeded(target, GeneratedPrompt::new("a cat", ["cat", "photo"])),
        );

        assert_eq!(after.len(), 3);
        assert!(Arc::ptr_eq(&before[0], &after[0]));
        assert!(Arc::ptr_eq(&before[2], &after[2]));
        assert_eq!(after[1].prompt.as_deref(), Some("a cat"));
        assert_eq!(after[1].tags.as_deref(), Some(&["cat".to_string(), "photo".to_string()][..]));
        assert!(!after[1].generating);
        assert_eq!(after[1].url, "https://b");
    }

    #[test]
    fn test_failure_keeps_prior_prompt() {
        let mut item = WorkItem::new("https://a");
        item.prompt = Some("first".into());
        item.tags = Some(vec!["x".into()]);
        item.generating = true;
        let before = vec![Arc::new(item)];

        let after = reconcile(
            &before,
            &Outcome::failed(before[0].id, "Failed to generate prompt.", "quota exceeded"),
        );

        assert_eq!(after[0].prompt.as_deref(), Some("first"));
        assert_eq!(after[0].tags.as_ref().map(Vec::len), Some(1));
        assert_eq!(after[0].error.as_deref(), Some("Failed to generate prompt."));
        assert!(!after[0].generating);
    }

    #[test]
    fn test_missing_id_is_noop() {
        let before = items(&["https://a", "https://b"]);
        let after = reconcile(
            &before,
            &Outcome::succeeded(ItemId::new(), GeneratedPrompt::new("ghost", Vec::<String>::new())),
        );

        assert_eq!(after.len(), 2);
        assert!(after.iter().zip(&before).all(|(a, b)| Arc::ptr_eq(a, b)));
        assert!(after.iter().all(|i| i.prompt.is_none()));
    }

    #[test]
    fn test_empty_tags_allowed() {
        let before = items(&["https://a"]);
        let after = reconcile(
            &before,
            &Outcome::succeeded(before[0].id, GeneratedPrompt::new("plain", Vec::<String>::new())),
        );
        assert_eq!(after[0].tags, Some(vec![]));
    }
}
