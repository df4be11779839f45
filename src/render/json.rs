//! JSON rendering for emitted page trees.

use super::emit::PageTree;
use crate::error::{Error, Result};

/// JSON output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JsonFormat {
    /// Pretty-printed JSON with indentation
    #[default]
    Pretty,
    /// Compact JSON without extra whitespace
    Compact,
}

/// Convert a page tree to JSON.
pub fn to_json(tree: &PageTree, format: JsonFormat) -> Result<String> {
    let result = match format {
        JsonFormat::Pretty => serde_json::to_string_pretty(tree),
        JsonFormat::Compact => serde_json::to_string(tree),
    };

    result.map_err(|e| Error::Render(format!("JSON serialization error: {}", e)))
}
