//! Integration tests for PAGE-XML output.

use chrono::{TimeZone, Utc};
use quick_xml::events::Event;
use quick_xml::Reader;
use yolo2page::model::ImageInfo;
use yolo2page::parser::{layout_page, ClassMapping, LayoutOptions, NullObserver};
use yolo2page::render::{render, to_page_xml, emit, OutputFormat, RenderOptions, PAGE_NAMESPACE};

const MAPPING: &str = r#"{
    "0": {"element": "TextLine"},
    "1": {"element": "TextRegion", "type": "paragraph"},
    "2": {"element": "TextRegion", "parent": "TextRegion", "type": "caption"},
    "3": {"element": "ImageRegion"}
}"#;

const LABELS: &str = "1 0 0 0.6 0 0.6 0.6 0 0.6\n\
                      3 0.7 0.7 0.9 0.7 0.9 0.9 0.7 0.9\n\
                      2 0.1 0.1 0.4 0.1 0.4 0.3 0.1 0.3\n\
                      0 0.15 0.15 0.35 0.15 0.35 0.2 0.15 0.2\n\
                      0 0.1 0.45 0.5 0.45 0.5 0.5 0.1 0.5\n";

fn options() -> RenderOptions {
    RenderOptions::new().with_created(Utc.with_ymd_and_hms(2024, 3, 4, 5, 6, 7).unwrap())
}

fn render_sample() -> String {
    let page = layout_page(
        LABELS,
        ImageInfo::new("scan.jpg", 1000, 1000),
        &ClassMapping::from_json_str(MAPPING).unwrap(),
        &LayoutOptions::default(),
        &mut NullObserver,
    );
    render(&page, &options()).unwrap()
}

/// Element names with their depth and `id`, in document order.
fn outline(xml: &str) -> Vec<(usize, String, Option<String>)> {
    let mut reader = Reader::from_str(xml);
    reader.trim_text(true);

    let mut depth = 0;
    let mut out = Vec::new();
    loop {
        match reader.read_event().unwrap() {
            Event::Start(e) => {
                let name = String::from_utf8(e.name().as_ref().to_vec()).unwrap();
                let id = e
                    .try_get_attribute("id")
                    .unwrap()
                    .map(|a| a.unescape_value().unwrap().into_owned());
                out.push((depth, name, id));
                depth += 1;
            }
            Event::Empty(e) => {
                let name = String::from_utf8(e.name().as_ref().to_vec()).unwrap();
                out.push((depth, name, None));
            }
            Event::End(_) => depth -= 1,
            Event::Eof => break,
            _ => {}
        }
    }
    out
}

fn element(depth: usize, name: &str, id: Option<&str>) -> (usize, String, Option<String>) {
    (depth, name.to_string(), id.map(str::to_string))
}

#[test]
fn test_document_outline() {
    let xml = render_sample();
    let outline = outline(&xml);

    let expected = vec![
        element(0, "PcGts", None),
        element(1, "Metadata", None),
        element(2, "Creator", None),
        element(2, "Created", None),
        element(2, "LastChange", None),
        element(1, "Page", None),
        element(2, "ImageRegion", Some("r0001")),
        element(3, "Coords", None),
        element(2, "TextRegion", Some("r0000")),
        element(3, "Coords", None),
        element(3, "TextRegion", Some("r0002")),
        element(4, "Coords", None),
        element(4, "TextLine", Some("l0003")),
        element(5, "Coords", None),
        element(3, "TextLine", Some("l0004")),
        element(4, "Coords", None),
    ];
    assert_eq!(outline, expected);
}

#[test]
fn test_header_and_metadata() {
    let xml = render_sample();

    assert!(xml.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>"));
    assert!(xml.contains(&format!(
        "xsi:schemaLocation=\"{} {}/pagecontent.xsd\"",
        PAGE_NAMESPACE, PAGE_NAMESPACE
    )));
    assert!(xml.contains("<Created>2024-03-04T05:06:07Z</Created>"));
    assert!(xml.contains("imageFilename=\"scan.jpg\""));
}

#[test]
fn test_region_types() {
    let xml = render_sample();
    assert!(xml.contains("<TextRegion id=\"r0000\" type=\"paragraph\">"));
    assert!(xml.contains("<TextRegion id=\"r0002\" type=\"caption\">"));
    assert!(xml.contains("<ImageRegion id=\"r0001\">"));
}

#[test]
fn test_coords_in_pixels() {
    let xml = render_sample();
    assert!(xml.contains("<Coords points=\"0,0 600,0 600,600 0,600\"/>"));
    assert!(xml.contains("<Coords points=\"700,700 900,700 900,900 700,900\"/>"));
}

#[test]
fn test_json_matches_tree() {
    let page = layout_page(
        LABELS,
        ImageInfo::new("scan.jpg", 1000, 1000),
        &ClassMapping::from_json_str(MAPPING).unwrap(),
        &LayoutOptions::default(),
        &mut NullObserver,
    );
    let json = render(&page, &options().with_format(OutputFormat::Json)).unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();

    assert_eq!(value["nodes"][0]["kind"], "ImageRegion");
    assert_eq!(value["nodes"][1]["kind"], "TextRegion");
    assert_eq!(value["nodes"][1]["children"][0]["id"], "r0002");

    // Same markup whether rendered from the page or its tree
    let xml = to_page_xml(&emit(&page), &options()).unwrap();
    assert_eq!(xml, render(&page, &options()).unwrap());
}
