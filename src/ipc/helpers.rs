use serde::Serialize;
use serde_json::json;

/// Combo option rows: the entity's fields plus the label the selector
/// renders (full name for people, plain name for groups and subjects).
pub fn options<T, F>(items: &[T], label: F) -> Vec<serde_json::Value>
where
    T: Serialize,
    F: Fn(&T) -> String,
{
    items
        .iter()
        .map(|item| {
            let mut row = serde_json::to_value(item).unwrap_or_default();
            row["label"] = json!(label(item));
            row
        })
        .collect()
}
