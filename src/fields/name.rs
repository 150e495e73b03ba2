//! Field name normalization.
//!
//! Labels such as `"Brick Color"` and `"brick_color"` must resolve to the same
//! identifier, so every name is normalized before it is stored or looked up.

use std::sync::LazyLock;

use regex::Regex;

static SEPARATOR_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^a-z0-9]+").expect("separator pattern compiles"));

/// Lowercases `label`, collapses every run of non-alphanumeric characters into
/// one underscore, and trims underscores from both ends.
///
/// The result may be empty (e.g. for `"  "` or `"--"`); callers treat that as
/// a missing name. Normalizing an already-normalized name is a no-op.
pub fn normalize_field_name(label: &str) -> String {
    let lowered = label.to_lowercase();
    SEPARATOR_RUN
        .replace_all(&lowered, "_")
        .trim_matches('_')
        .to_string()
}
