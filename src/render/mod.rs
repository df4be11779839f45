//! Rendering module for converting page hierarchies to output markup.

pub mod emit;
mod json;
mod options;
mod xml;

pub use emit::{emit, LayoutNode, NodeKind, PageTree};
pub use json::{to_json, JsonFormat};
pub use options::{OutputFormat, RenderOptions, DEFAULT_CREATOR};
pub use xml::{to_page_xml, write_page_xml, PAGE_NAMESPACE};

use crate::error::Result;
use crate::model::Page;

/// Render a page in the format selected by `options`.
pub fn render(page: &Page, options: &RenderOptions) -> Result<String> {
    let tree = emit(page);
    match options.format {
        OutputFormat::PageXml => to_page_xml(&tree, options),
        OutputFormat::Json => to_json(&tree, options.json_format),
    }
}
