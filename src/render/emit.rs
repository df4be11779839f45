//! Page hierarchy to generic node tree.
//!
//! [`emit`] walks a finished [`Page`] and produces the ordered node tree the
//! serializers consume: opaque regions first in encounter order, then the
//! top-level text regions in attachment order. Each text region lists its
//! nested regions before its lines.

use serde::{Serialize, Serializer};

use crate::model::geometry::format_points;
use crate::model::{ImageInfo, OpaqueKind, Page, Point, RegionId};

/// What a [`LayoutNode`] represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    /// `TextRegion`
    TextRegion,
    /// `TextLine`
    TextLine,
    /// Non-text region
    Opaque(OpaqueKind),
}

impl NodeKind {
    /// PAGE-XML element name.
    pub fn element_name(&self) -> &'static str {
        match self {
            NodeKind::TextRegion => "TextRegion",
            NodeKind::TextLine => "TextLine",
            NodeKind::Opaque(kind) => kind.element_name(),
        }
    }
}

impl Serialize for NodeKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.element_name())
    }
}

/// One element of the emitted tree.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LayoutNode {
    /// Element kind
    pub kind: NodeKind,

    /// Identifier
    pub id: String,

    /// Region `type`, only set on text regions
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub region_type: Option<String>,

    /// Pixel coordinates in polygon order
    pub points: Vec<Point>,

    /// Nested regions followed by lines
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<LayoutNode>,
}

impl LayoutNode {
    /// Coordinates formatted as `"x1,y1 x2,y2 ..."`.
    pub fn points_string(&self) -> String {
        format_points(&self.points)
    }

    /// Number of nodes in this subtree, including this one.
    pub fn subtree_size(&self) -> usize {
        1 + self.children.iter().map(LayoutNode::subtree_size).sum::<usize>()
    }
}

/// Emitted tree for one page.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PageTree {
    /// Image the page annotates
    pub image: ImageInfo,

    /// Page-level nodes
    pub nodes: Vec<LayoutNode>,
}

impl PageTree {
    /// Total number of nodes at any depth.
    pub fn node_count(&self) -> usize {
        self.nodes.iter().map(LayoutNode::subtree_size).sum()
    }

    /// Visit every node depth-first in document order, with its depth
    /// (page-level nodes have depth 0).
    pub fn walk<F: FnMut(&LayoutNode, usize)>(&self, mut f: F) {
        fn visit<F: FnMut(&LayoutNode, usize)>(node: &LayoutNode, depth: usize, f: &mut F) {
            f(node, depth);
            for child in &node.children {
                visit(child, depth + 1, f);
            }
        }
        for node in &self.nodes {
            visit(node, 0, &mut f);
        }
    }
}

/// Build the node tree for `page`.
pub fn emit(page: &Page) -> PageTree {
    let mut nodes = Vec::with_capacity(page.opaque().len() + page.top_level().len());

    nodes.extend(page.opaque().iter().map(|region| LayoutNode {
        kind: NodeKind::Opaque(region.kind),
        id: region.id.clone(),
        region_type: None,
        points: region.polygon.points().to_vec(),
        children: Vec::new(),
    }));
    nodes.extend(page.top_level().iter().map(|&id| region_node(page, id)));

    PageTree {
        image: page.image.clone(),
        nodes,
    }
}

fn region_node(page: &Page, id: RegionId) -> LayoutNode {
    let region = &page[id];
    let children = region
        .children
        .iter()
        .map(|&child| region_node(page, child))
        .chain(region.lines.iter().map(|&line| {
            let line = &page[line];
            LayoutNode {
                kind: NodeKind::TextLine,
                id: line.id.clone(),
                region_type: None,
                points: line.polygon.points().to_vec(),
                children: Vec::new(),
            }
        }))
        .collect();

    LayoutNode {
        kind: NodeKind::TextRegion,
        id: region.id.clone(),
        region_type: region.subtype.clone(),
        points: region.polygon.points().to_vec(),
        children,
    }
}
