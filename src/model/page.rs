//! Page-level layout hierarchy.
//!
//! Regions and lines live in arenas owned by the [`Page`] and refer to each
//! other through [`RegionId`] and [`LineId`] indices. Nodes are only ever
//! appended; nothing is removed once placed.

use super::{OpaqueKind, Polygon};
use serde::{Deserialize, Serialize};
use std::ops::Index;

/// Image the page annotates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageInfo {
    /// File name without directories
    pub filename: String,

    /// Width in pixels
    pub width: u32,

    /// Height in pixels
    pub height: u32,
}

impl ImageInfo {
    /// Create image metadata.
    pub fn new(filename: impl Into<String>, width: u32, height: u32) -> Self {
        Self {
            filename: filename.into(),
            width,
            height,
        }
    }
}

/// Index of a region in its page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RegionId(pub usize);

/// Index of a line in its page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LineId(pub usize);

/// How a text region came to be where it is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RegionOrigin {
    /// Declared top-level region
    Declared,
    /// Nestable region placed inside a top-level region
    Nested,
    /// Nestable region without a qualifying parent, promoted to the page
    Promoted,
    /// Container created for a line that overlapped no region
    Manufactured,
}

/// A text region and its contents.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegionNode {
    /// Unique identifier within the page
    pub id: String,

    /// Pixel-space outline
    pub polygon: Polygon,

    /// PAGE `type` attribute (e.g. "paragraph", "heading")
    pub subtype: Option<String>,

    /// Class id of the source label (`None` for manufactured containers)
    pub class_id: Option<i64>,

    /// Placement origin
    pub origin: RegionOrigin,

    /// Owning region, `None` when attached to the page
    pub parent: Option<RegionId>,

    /// Nested regions in placement order
    pub children: Vec<RegionId>,

    /// Lines in label-file order
    pub lines: Vec<LineId>,
}

impl RegionNode {
    /// Create an empty region.
    pub fn new(
        id: impl Into<String>,
        polygon: Polygon,
        subtype: Option<String>,
        class_id: Option<i64>,
        origin: RegionOrigin,
    ) -> Self {
        Self {
            id: id.into(),
            polygon,
            subtype,
            class_id,
            origin,
            parent: None,
            children: Vec::new(),
            lines: Vec::new(),
        }
    }
}

/// A text line.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeafNode {
    /// Unique identifier within the page
    pub id: String,

    /// Pixel-space outline
    pub polygon: Polygon,

    /// Class id of the source label
    pub class_id: i64,

    /// Owning region
    pub region: RegionId,
}

/// A non-text region attached directly to the page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpaqueRegion {
    /// Unique identifier within the page
    pub id: String,

    /// PAGE region kind
    pub kind: OpaqueKind,

    /// Pixel-space outline
    pub polygon: Polygon,

    /// Class id of the source label
    pub class_id: i64,
}

/// Counts describing how the hierarchy was assembled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayoutStats {
    /// Opaque regions on the page
    pub opaque_regions: usize,
    /// Declared top-level text regions
    pub declared_regions: usize,
    /// Nestable regions placed inside a parent
    pub nested_regions: usize,
    /// Nestable regions promoted to the page
    pub promoted_regions: usize,
    /// Containers created for unplaced lines
    pub manufactured_regions: usize,
    /// Lines assigned to an existing region
    pub placed_lines: usize,
    /// Lines placed in a manufactured container
    pub orphan_lines: usize,
}

impl LayoutStats {
    /// Total number of text regions.
    pub fn text_regions(&self) -> usize {
        self.declared_regions
            + self.nested_regions
            + self.promoted_regions
            + self.manufactured_regions
    }

    /// Total number of lines.
    pub fn lines(&self) -> usize {
        self.placed_lines + self.orphan_lines
    }
}

/// Root of the layout hierarchy for one image.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page {
    /// Image metadata
    pub image: ImageInfo,

    opaque: Vec<OpaqueRegion>,
    regions: Vec<RegionNode>,
    lines: Vec<LeafNode>,
    top_level: Vec<RegionId>,
}

impl Page {
    /// Create an empty page.
    pub fn new(image: ImageInfo) -> Self {
        Self {
            image,
            opaque: Vec::new(),
            regions: Vec::new(),
            lines: Vec::new(),
            top_level: Vec::new(),
        }
    }

    /// Attach an opaque region to the page.
    pub fn add_opaque(&mut self, region: OpaqueRegion) {
        self.opaque.push(region);
    }

    /// Attach a text region directly to the page.
    pub fn add_top_region(&mut self, mut node: RegionNode) -> RegionId {
        node.parent = None;
        let id = RegionId(self.regions.len());
        self.regions.push(node);
        self.top_level.push(id);
        id
    }

    /// Nest a text region inside `parent`.
    ///
    /// # Panics
    ///
    /// Panics if `parent` does not belong to this page.
    pub fn add_child_region(&mut self, parent: RegionId, mut node: RegionNode) -> RegionId {
        node.parent = Some(parent);
        let id = RegionId(self.regions.len());
        self.regions.push(node);
        self.regions[parent.0].children.push(id);
        id
    }

    /// Append a line to `region`.
    ///
    /// # Panics
    ///
    /// Panics if `region` does not belong to this page.
    pub fn add_line(
        &mut self,
        region: RegionId,
        id: impl Into<String>,
        polygon: Polygon,
        class_id: i64,
    ) -> LineId {
        let line_id = LineId(self.lines.len());
        self.lines.push(LeafNode {
            id: id.into(),
            polygon,
            class_id,
            region,
        });
        self.regions[region.0].lines.push(line_id);
        line_id
    }

    /// Get a region by index.
    pub fn region(&self, id: RegionId) -> Option<&RegionNode> {
        self.regions.get(id.0)
    }

    /// Get a line by index.
    pub fn line(&self, id: LineId) -> Option<&LeafNode> {
        self.lines.get(id.0)
    }

    /// All text regions in creation order, paired with their index.
    pub fn regions(&self) -> impl Iterator<Item = (RegionId, &RegionNode)> {
        self.regions
            .iter()
            .enumerate()
            .map(|(i, node)| (RegionId(i), node))
    }

    /// All lines in creation order.
    pub fn lines(&self) -> &[LeafNode] {
        &self.lines
    }

    /// Text regions attached directly to the page, in attachment order.
    pub fn top_level(&self) -> &[RegionId] {
        &self.top_level
    }

    /// Opaque regions in encounter order.
    pub fn opaque(&self) -> &[OpaqueRegion] {
        &self.opaque
    }

    /// Find a text region by its identifier.
    pub fn find_region(&self, id: &str) -> Option<&RegionNode> {
        self.regions.iter().find(|r| r.id == id)
    }

    /// Region that owns the line with identifier `id`.
    pub fn container_of_line(&self, id: &str) -> Option<&RegionNode> {
        let line = self.lines.iter().find(|l| l.id == id)?;
        self.region(line.region)
    }

    /// Total number of nodes (opaque regions, text regions, lines).
    pub fn node_count(&self) -> usize {
        self.opaque.len() + self.regions.len() + self.lines.len()
    }

    /// Check if the page holds no nodes.
    pub fn is_empty(&self) -> bool {
        self.node_count() == 0
    }

    /// Summarize how the hierarchy was assembled.
    pub fn stats(&self) -> LayoutStats {
        let mut stats = LayoutStats {
            opaque_regions: self.opaque.len(),
            ..Default::default()
        };
        for region in &self.regions {
            match region.origin {
                RegionOrigin::Declared => stats.declared_regions += 1,
                RegionOrigin::Nested => stats.nested_regions += 1,
                RegionOrigin::Promoted => stats.promoted_regions += 1,
                RegionOrigin::Manufactured => {
                    stats.manufactured_regions += 1;
                    stats.orphan_lines += region.lines.len();
                }
            }
        }
        stats.placed_lines = self.lines.len() - stats.orphan_lines;
        stats
    }
}

impl Index<RegionId> for Page {
    type Output = RegionNode;

    fn index(&self, id: RegionId) -> &RegionNode {
        &self.regions[id.0]
    }
}

impl Index<LineId> for Page {
    type Output = LeafNode;

    fn index(&self, id: LineId) -> &LeafNode {
        &self.lines[id.0]
    }
}
