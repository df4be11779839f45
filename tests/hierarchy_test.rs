//! Integration tests for region nesting and line assignment.

use yolo2page::model::{ImageInfo, Page, RegionOrigin};
use yolo2page::parser::{layout_page, ClassMapping, EventCollector, LayoutOptions, NullObserver};
use yolo2page::render::emit;

const MAPPING: &str = r#"{
    "0": {"element": "TextLine", "parent": "TextRegion"},
    "1": {"element": "TextRegion", "type": "paragraph"},
    "2": {"element": "TextRegion", "parent": "TextRegion", "type": "marginalia"},
    "3": {"element": "SeparatorRegion"},
    "4": {"element": "TextLine", "parent_type": "heading"}
}"#;

fn mapping() -> ClassMapping {
    ClassMapping::from_json_str(MAPPING).unwrap()
}

fn image() -> ImageInfo {
    ImageInfo::new("page.png", 1000, 1000)
}

fn layout(text: &str) -> Page {
    layout_page(text, image(), &mapping(), &LayoutOptions::default(), &mut NullObserver)
}

// ==================== End-to-end scenarios ====================

#[test]
fn test_line_inside_region() {
    let page = layout(
        "1 0 0 0.5 0 0.5 0.5 0 0.5\n\
         0 0.1 0.1 0.3 0.1 0.3 0.2 0.1 0.2\n",
    );

    assert_eq!(page.top_level().len(), 1);
    let region = page.find_region("r0000").unwrap();
    assert_eq!(region.lines.len(), 1);
    assert_eq!(page.container_of_line("l0001").unwrap().id, "r0000");

    let stats = page.stats();
    assert_eq!(stats.manufactured_regions, 0);
    assert_eq!(stats.orphan_lines, 0);
}

#[test]
fn test_line_outside_any_region() {
    let page = layout(
        "1 0 0 0.5 0 0.5 0.5 0 0.5\n\
         0 0.6 0.6 0.8 0.6 0.8 0.7 0.6 0.7\n",
    );

    assert_eq!(page.top_level().len(), 2);
    assert!(page.find_region("r0000").unwrap().lines.is_empty());

    let container = page.container_of_line("l0001").unwrap();
    assert_eq!(container.origin, RegionOrigin::Manufactured);
    assert_eq!(container.subtype.as_deref(), Some("paragraph"));
    assert_eq!(container.lines.len(), 1);
}

// ==================== Placement ====================

const MIXED_PAGE: &str = "3 0.05 0.9 0.95 0.9 0.95 0.92 0.05 0.92\n\
                          1 0 0 0.6 0 0.6 0.6 0 0.6\n\
                          2 0.1 0.1 0.4 0.1 0.4 0.3 0.1 0.3\n\
                          2 0.7 0.1 0.9 0.1 0.9 0.3 0.7 0.3\n\
                          0 0.15 0.15 0.35 0.15 0.35 0.2 0.15 0.2\n\
                          0 0.72 0.15 0.88 0.15 0.88 0.2 0.72 0.2\n\
                          4 0.7 0.7 0.9 0.7 0.9 0.75 0.7 0.75\n\
                          9 0.1 0.1 0.2 0.1 0.2 0.2\n\
                          garbage\n";

#[test]
fn test_mixed_page_placement() {
    let mut events = EventCollector::new();
    let page = layout_page(
        MIXED_PAGE,
        image(),
        &mapping(),
        &LayoutOptions::default(),
        &mut events,
    );

    // Opaque separator
    assert_eq!(page.opaque().len(), 1);
    assert_eq!(page.opaque()[0].id, "r0000");

    // Nested and promoted regions
    let nested = page.find_region("r0002").unwrap();
    assert_eq!(nested.origin, RegionOrigin::Nested);
    assert_eq!(page[nested.parent.unwrap()].id, "r0001");
    assert_eq!(nested.subtype.as_deref(), Some("marginalia"));
    assert_eq!(
        page.find_region("r0003").unwrap().origin,
        RegionOrigin::Promoted
    );

    // Lines go to the innermost region
    assert_eq!(page.container_of_line("l0004").unwrap().id, "r0002");
    assert_eq!(page.container_of_line("l0005").unwrap().id, "r0003");

    // Orphan line keeps its class's container type
    let orphan = page.container_of_line("l0006").unwrap();
    assert_eq!(orphan.id, "r_orphan0000");
    assert_eq!(orphan.subtype.as_deref(), Some("heading"));

    assert_eq!(events.unmapped_count(), 1);
    assert_eq!(events.malformed_count(), 1);
}

#[test]
fn test_no_data_loss() {
    let page = layout(MIXED_PAGE);
    let tree = emit(&page);

    // 7 mapped labels plus one manufactured container
    assert_eq!(tree.node_count(), 8);
    assert_eq!(page.node_count(), 8);

    let mut ids = Vec::new();
    tree.walk(|node, _| ids.push(node.id.clone()));
    for id in ["r0000", "r0001", "r0002", "r0003", "l0004", "l0005", "l0006"] {
        assert!(ids.iter().any(|i| i == id), "missing {}", id);
    }
}

#[test]
fn test_most_specific_container_in_any_order() {
    let inner = "1 0.2 0.2 0.4 0.2 0.4 0.4 0.2 0.4";
    let outer = "1 0 0 0.8 0 0.8 0.8 0 0.8";
    let line = "0 0.25 0.25 0.35 0.25 0.35 0.3 0.25 0.3";

    let page = layout(&format!("{}\n{}\n{}\n", inner, outer, line));
    assert_eq!(page.container_of_line("l0002").unwrap().id, "r0000");

    let page = layout(&format!("{}\n{}\n{}\n", outer, inner, line));
    assert_eq!(page.container_of_line("l0002").unwrap().id, "r0001");
}

#[test]
fn test_equal_area_containers_first_wins() {
    let page = layout(
        "1 0 0 0.5 0 0.5 0.5 0 0.5\n\
         1 0 0 0.5 0 0.5 0.5 0 0.5\n\
         0 0.1 0.1 0.3 0.1 0.3 0.2 0.1 0.2\n",
    );
    assert_eq!(page.container_of_line("l0002").unwrap().id, "r0000");
}

#[test]
fn test_nested_regions_without_top_level() {
    let mut events = EventCollector::new();
    let page = layout_page(
        "2 0.1 0.1 0.4 0.1 0.4 0.3 0.1 0.3\n\
         2 0.5 0.1 0.9 0.1 0.9 0.3 0.5 0.3\n",
        image(),
        &mapping(),
        &LayoutOptions::default(),
        &mut events,
    );

    assert_eq!(page.top_level().len(), 2);
    assert_eq!(page.stats().promoted_regions, 2);
    assert_eq!(events.orphan_count(), 2);
}

#[test]
fn test_skewed_polygons_on_small_image() {
    let text = "1 1.0 0.9 0.0 0.5 0.8 0.8 0.4 0.5\n0 0.2 0.2 0.4 1.0 1.0 0.7\n";

    for options in [LayoutOptions::default(), LayoutOptions::default().sequential()] {
        let page = layout_page(
            text,
            ImageInfo::new("small.png", 10, 10),
            &mapping(),
            &options,
            &mut NullObserver,
        );

        assert!(page.find_region("r0000").is_some());
        assert_eq!(page.lines().len(), 1);
        assert!(page.container_of_line("l0001").is_some());
    }
}

#[test]
fn test_empty_mapping_entry_drops_labels() {
    let mapping = ClassMapping::from_json_str(r#"{"0": {"element": "TextLine"}, "5": {}}"#).unwrap();
    let mut events = EventCollector::new();
    let page = layout_page(
        "5 0.1 0.1 0.3 0.1 0.3 0.2\n",
        image(),
        &mapping,
        &LayoutOptions::default(),
        &mut events,
    );

    assert!(page.lines().is_empty());
    assert!(page.is_empty());
    assert_eq!(events.unmapped_count(), 1);
}

#[test]
fn test_empty_label_file() {
    let page = layout("");
    assert!(page.is_empty());
    assert_eq!(emit(&page).node_count(), 0);
}

#[test]
fn test_blank_lines_keep_line_numbers() {
    let page = layout("\n\n0 0.6 0.6 0.8 0.6 0.8 0.7 0.6 0.7\n");
    assert!(page.container_of_line("l0002").is_some());
}

// ==================== Determinism ====================

#[test]
fn test_rerun_is_identical() {
    let first = emit(&layout(MIXED_PAGE));
    let second = emit(&layout(MIXED_PAGE));
    assert_eq!(first, second);
}

#[test]
fn test_parallel_matches_sequential() {
    let mut text = String::from("1 0 0 0.5 0 0.5 1 0 1\n1 0.5 0 1 0 1 1 0.5 1\n");
    for i in 0..50 {
        let x = 0.02 * (i % 25) as f64 + 0.01;
        let y = if i < 25 { 0.2 } else { 0.7 };
        text.push_str(&format!(
            "0 {x:.3} {y:.3} {x1:.3} {y:.3} {x1:.3} {y1:.3} {x:.3} {y1:.3}\n",
            x = x,
            y = y,
            x1 = x + 0.015,
            y1 = y + 0.02
        ));
    }

    let parallel = layout_page(
        &text,
        image(),
        &mapping(),
        &LayoutOptions::default(),
        &mut NullObserver,
    );
    let sequential = layout_page(
        &text,
        image(),
        &mapping(),
        &LayoutOptions::default().sequential(),
        &mut NullObserver,
    );

    assert_eq!(emit(&parallel), emit(&sequential));
}
