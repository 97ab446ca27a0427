//! Work item types: one tracked image URL and its generation state.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Identifier of a work item.
///
/// Identity is per insertion: removing a URL and adding it again yields a
/// new id, so a late outcome for the old id can never land on the new item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(Uuid);

impl ItemId {
    /// Generate a fresh random id.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ItemId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl FromStr for ItemId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

/// Whether the item's image could be loaded.
///
/// `Invalid` is terminal: there is no transition back to `Valid`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Validity {
    #[default]
    Valid,
    Invalid,
}

/// One submitted image URL plus its generation state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkItem {
    /// Stable for the item's lifetime
    pub id: ItemId,

    /// Source image location; immutable after creation
    pub url: String,

    /// Image load status
    pub validity: Validity,

    /// Generated prompt, set only by a successful remote call for this id
    pub prompt: Option<String>,

    /// Generated tags, set together with `prompt`
    pub tags: Option<Vec<String>>,

    /// True only while a request for this item is in flight
    pub generating: bool,

    /// Last failure message; cleared when a new attempt starts
    pub error: Option<String>,
}

impl WorkItem {
    /// Create a fresh item: valid, idle, no prompt.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            id: ItemId::new(),
            url: url.into(),
            validity: Validity::Valid,
            prompt: None,
            tags: None,
            generating: false,
            error: None,
        }
    }

    pub fn is_valid(&self) -> bool {
        self.validity == Validity::Valid
    }

    pub fn has_prompt(&self) -> bool {
        self.prompt.is_some()
    }

    /// Included in a batch run launched now: valid, no prompt, not in flight.
    pub fn is_batch_eligible(&self) -> bool {
        self.is_valid() && !self.has_prompt() && !self.generating
    }
}

/// Partial mutation of one work item.
///
/// `url` and `id` are not patchable. A patch can only move validity to
/// `Invalid`, and can set but never clear `prompt` and `tags`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ItemPatch {
    pub invalidate: bool,
    pub generating: Option<bool>,
    pub prompt: Option<String>,
    pub tags: Option<Vec<String>>,
    /// `Some(None)` clears the error, `Some(Some(msg))` sets it.
    pub error: Option<Option<String>>,
}

impl ItemPatch {
    /// Mark the item in flight and clear its last error.
    pub fn start_generation() -> Self {
        Self {
            generating: Some(true),
            error: Some(None),
            ..Default::default()
        }
    }

    /// Clear the in-flight flag only.
    pub fn stop_generation() -> Self {
        Self {
            generating: Some(false),
            ..Default::default()
        }
    }

    /// Permanently mark the image as failed to load.
    pub fn invalidate() -> Self {
        Self {
            invalidate: true,
            ..Default::default()
        }
    }

    /// True when applying this patch to `item` would change nothing.
    pub fn is_noop_for(&self, item: &WorkItem) -> bool {
        self.apply(item) == *item
    }

    /// Produce the patched copy of `item`.
    pub fn apply(&self, item: &WorkItem) -> WorkItem {
        let mut next = item.clone();
        if self.invalidate {
            next.validity = Validity::Invalid;
        }
        if let Some(generating) = self.generating {
            next.generating = generating;
        }
        if let Some(prompt) = &self.prompt {
            next.prompt = Some(prompt.clone());
        }
        if let Some(tags) = &self.tags {
            next.tags = Some(tags.clone());
        }
        if let Some(error) = &self.error {
            next.error = error.clone();
        }
        next
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_item_defaults() {
        let item = WorkItem::new("https://example.com/a.png");
        assert!(item.is_valid());
        assert!(!item.generating);
        assert!(item.prompt.is_none());
        assert!(item.tags.is_none());
        assert!(item.error.is_none());
        assert!(item.is_batch_eligible());
    }

    #[test]
    fn test_ids_are_per_insertion() {
        let a = WorkItem::new("https://example.com/a.png");
        let b = WorkItem::new("https://example.com/a.png");
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn test_item_id_parse_display() {
        let id = ItemId::new();
        let parsed: ItemId = id.to_string().parse().unwrap();
        assert_eq!(parsed, id);
    }

    #[test]
    fn test_start_generation_clears_error_keeps_prompt() {
        let mut item = WorkItem::new("https://example.com/a.png");
        item.prompt = Some("old".into());
        item.error = Some("boom".into());

        let next = ItemPatch::start_generation().apply(&item);
        assert!(next.generating);
        assert!(next.error.is_none());
        assert_eq!(next.prompt.as_deref(), Some("old"));
    }

    #[test]
    fn test_invalidate_is_idempotent() {
        let item = WorkItem::new("https://example.com/a.png");
        let once = ItemPatch::invalidate().apply(&item);
        assert_eq!(once.validity, Validity::Invalid);
        assert!(ItemPatch::invalidate().is_noop_for(&once));
    }

    #[test]
    fn test_eligibility() {
        let mut item = WorkItem::new("https://example.com/a.png");
        item.generating = true;
        assert!(!item.is_batch_eligible());

        item.generating = false;
        item.prompt = Some("done".into());
        assert!(!item.is_batch_eligible());

        let invalid = ItemPatch::invalidate().apply(&WorkItem::new("https://example.com/b.png"));
        assert!(!invalid.is_batch_eligible());
    }
}
