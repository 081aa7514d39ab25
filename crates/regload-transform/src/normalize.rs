//! Row normalization: prune null markers, coerce localized yes/no tokens.

use regload_model::{FieldValue, NormalizedRow, TransformSet};

/// Literal the source system writes for absent values.
pub const NULL_MARKER: &str = "(null)";

/// Prunes empty and null-marker values, then coerces `j`/`n`
/// (case-insensitive) to booleans for every field that is not covered by a
/// transformation rule. Rule-covered fields keep their raw text; the engine
/// interprets them itself.
pub fn normalize(row: NormalizedRow, transforms: &TransformSet) -> NormalizedRow {
    row.into_inner()
        .into_iter()
        .filter_map(|(field, value)| {
            let text = match value {
                FieldValue::Text(text) => text,
                other => return Some((field, other)),
            };
            if text.is_empty() || text == NULL_MARKER {
                return None;
            }
            if !transforms.contains(&field) {
                if text.eq_ignore_ascii_case("j") {
                    return Some((field, FieldValue::Bool(true)));
                }
                if text.eq_ignore_ascii_case("n") {
                    return Some((field, FieldValue::Bool(false)));
                }
            }
            Some((field, FieldValue::Text(text)))
        })
        .collect()
}
