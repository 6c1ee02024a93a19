//! Reference & example filter
//!
//! Cross-references and untranslated example fragments end up in the
//! phrase lists like any other text. They are dropped here so that only
//! translations reach the editor.

use crate::data::TranslationGroup;
use regex::Regex;
use rueo_markup::text::has_letters;
use std::sync::LazyLock;

static PURE_REFERENCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^\s*(?:(?:см|ср|see|compare)\.?|=)?[\s:]*(?:<[^<>]*>[\s,;.]*)+$")
        .expect("reference regex is valid")
});

/// True for `<target>` items, optionally labelled with `см.`, `ср.` or `=`
pub fn is_pure_reference(item: &str) -> bool {
    PURE_REFERENCE.is_match(item)
}

/// True when the item reads as translation text
pub fn is_translation_item(item: &str) -> bool {
    !is_pure_reference(item) && !item.contains('~') && has_letters(item)
}

/// Keep only translation items in `items` and `base_items`
///
/// # Returns
/// `None` when no item is left
pub fn filter(mut group: TranslationGroup) -> Option<TranslationGroup> {
    group.items.retain(|item| is_translation_item(item));
    group.base_items.retain(|item| is_translation_item(item));
    if group.items.is_empty() {
        tracing::debug!(key = %group.stable_key, "group has no translation items, dropping");
        return None;
    }
    Some(group)
}
