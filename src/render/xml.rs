//! PAGE-XML serialization.
//!
//! Produces documents against the 2019-07-15 PAGE content schema:
//!
//! ```text
//! PcGts
//! ├── Metadata (Creator, Created, LastChange)
//! └── Page (imageFilename, imageWidth, imageHeight)
//!     ├── <opaque regions>
//!     └── TextRegion
//!         ├── Coords
//!         ├── TextRegion ...
//!         └── TextLine
//!             └── Coords
//! ```

use std::io::Write;

use chrono::SecondsFormat;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;

use super::emit::{LayoutNode, NodeKind, PageTree};
use super::options::RenderOptions;
use crate::error::{Error, Result};

/// PAGE content schema namespace.
pub const PAGE_NAMESPACE: &str =
    "http://schema.primaresearch.org/PAGE/gts/pagecontent/2019-07-15";

const XSI_NAMESPACE: &str = "http://www.w3.org/2001/XMLSchema-instance";

/// Serialize a page tree to a PAGE-XML string.
pub fn to_page_xml(tree: &PageTree, options: &RenderOptions) -> Result<String> {
    let mut buffer = Vec::new();
    write_page_xml(tree, options, &mut buffer)?;
    String::from_utf8(buffer).map_err(xml_error)
}

/// Serialize a page tree as PAGE-XML into `out`.
pub fn write_page_xml<W: Write>(tree: &PageTree, options: &RenderOptions, out: W) -> Result<()> {
    let mut writer = if options.indent > 0 {
        Writer::new_with_indent(out, b' ', options.indent)
    } else {
        Writer::new(out)
    };

    emit_event(
        &mut writer,
        Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)),
    )?;

    let schema_location = format!("{} {}/pagecontent.xsd", PAGE_NAMESPACE, PAGE_NAMESPACE);
    let root = BytesStart::new("PcGts").with_attributes([
        ("xmlns", PAGE_NAMESPACE),
        ("xmlns:xsi", XSI_NAMESPACE),
        ("xsi:schemaLocation", schema_location.as_str()),
    ]);
    emit_event(&mut writer, Event::Start(root))?;

    write_metadata(&mut writer, options)?;

    let width = tree.image.width.to_string();
    let height = tree.image.height.to_string();
    let page = BytesStart::new("Page").with_attributes([
        ("imageFilename", tree.image.filename.as_str()),
        ("imageWidth", width.as_str()),
        ("imageHeight", height.as_str()),
    ]);
    if tree.nodes.is_empty() {
        emit_event(&mut writer, Event::Empty(page))?;
    } else {
        emit_event(&mut writer, Event::Start(page))?;
        for node in &tree.nodes {
            write_node(&mut writer, node)?;
        }
        emit_event(&mut writer, Event::End(BytesEnd::new("Page")))?;
    }

    emit_event(&mut writer, Event::End(BytesEnd::new("PcGts")))?;
    writer.into_inner().flush()?;
    Ok(())
}

fn write_metadata<W: Write>(writer: &mut Writer<W>, options: &RenderOptions) -> Result<()> {
    let timestamp = options
        .timestamp()
        .to_rfc3339_opts(SecondsFormat::Secs, true);

    emit_event(writer, Event::Start(BytesStart::new("Metadata")))?;
    write_text_element(writer, "Creator", &options.creator)?;
    write_text_element(writer, "Created", &timestamp)?;
    write_text_element(writer, "LastChange", &timestamp)?;
    emit_event(writer, Event::End(BytesEnd::new("Metadata")))
}

fn write_text_element<W: Write>(writer: &mut Writer<W>, name: &str, text: &str) -> Result<()> {
    emit_event(writer, Event::Start(BytesStart::new(name)))?;
    emit_event(writer, Event::Text(BytesText::new(text)))?;
    emit_event(writer, Event::End(BytesEnd::new(name)))
}

fn write_node<W: Write>(writer: &mut Writer<W>, node: &LayoutNode) -> Result<()> {
    let name = node.kind.element_name();
    let mut start = BytesStart::new(name);
    start.push_attribute(("id", node.id.as_str()));
    if let (NodeKind::TextRegion, Some(region_type)) = (node.kind, node.region_type.as_deref()) {
        start.push_attribute(("type", region_type));
    }
    emit_event(writer, Event::Start(start))?;

    let points = node.points_string();
    let coords = BytesStart::new("Coords").with_attributes([("points", points.as_str())]);
    emit_event(writer, Event::Empty(coords))?;

    for child in &node.children {
        write_node(writer, child)?;
    }

    emit_event(writer, Event::End(BytesEnd::new(name)))
}

fn emit_event<W: Write>(writer: &mut Writer<W>, event: Event<'_>) -> Result<()> {
    writer.write_event(event).map_err(xml_error)
}

fn xml_error<E: std::fmt::Display>(err: E) -> Error {
    Error::Render(format!("XML serialization error: {}", err))
}
