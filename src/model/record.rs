//! Classified label records.

use super::Polygon;
use serde::{Deserialize, Serialize};
use std::fmt;

/// PAGE region types that are attached to the page as-is and never take
/// part in containment or overlap decisions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OpaqueKind {
    /// `TableRegion`
    Table,
    /// `ImageRegion`
    Image,
    /// `GraphicRegion`
    Graphic,
    /// `SeparatorRegion`
    Separator,
    /// `NoiseRegion`
    Noise,
    /// `ChartRegion`
    Chart,
    /// `MathsRegion`
    Maths,
    /// `LineDrawingRegion`
    LineDrawing,
    /// `UnknownRegion`
    Unknown,
}

impl OpaqueKind {
    /// All opaque kinds, in declaration order.
    pub const ALL: [OpaqueKind; 9] = [
        OpaqueKind::Table,
        OpaqueKind::Image,
        OpaqueKind::Graphic,
        OpaqueKind::Separator,
        OpaqueKind::Noise,
        OpaqueKind::Chart,
        OpaqueKind::Maths,
        OpaqueKind::LineDrawing,
        OpaqueKind::Unknown,
    ];

    /// PAGE-XML element name.
    pub fn element_name(self) -> &'static str {
        match self {
            OpaqueKind::Table => "TableRegion",
            OpaqueKind::Image => "ImageRegion",
            OpaqueKind::Graphic => "GraphicRegion",
            OpaqueKind::Separator => "SeparatorRegion",
            OpaqueKind::Noise => "NoiseRegion",
            OpaqueKind::Chart => "ChartRegion",
            OpaqueKind::Maths => "MathsRegion",
            OpaqueKind::LineDrawing => "LineDrawingRegion",
            OpaqueKind::Unknown => "UnknownRegion",
        }
    }

    /// Look up an opaque kind by its PAGE-XML element name.
    pub fn from_element_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.element_name() == name)
    }
}

impl fmt::Display for OpaqueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.element_name())
    }
}

/// The part a record plays in the layout hierarchy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "role", content = "kind", rename_all = "snake_case")]
pub enum Role {
    /// A text line; placed inside the most specific overlapping region.
    Leaf,
    /// A text region that wants to live inside a top-level region.
    NestableRegion,
    /// A text region attached directly to the page.
    TopRegion,
    /// A non-text region attached directly to the page.
    Opaque(OpaqueKind),
}

impl Role {
    /// Check if this role produces a text region.
    pub fn is_text_region(&self) -> bool {
        matches!(self, Role::NestableRegion | Role::TopRegion)
    }
}

/// A label after denormalization and classification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    /// Stable identifier derived from the label line position
    pub id: String,

    /// Pixel-space outline
    pub polygon: Polygon,

    /// Placement role
    pub role: Role,

    /// Region `type` for text regions, or the container type a leaf asks
    /// for when it has to be given its own region
    pub subtype: Option<String>,

    /// Class id as written in the label file
    pub class_id: i64,

    /// Zero-based line number in the label file
    pub line_index: usize,
}

impl Record {
    /// Identifier for a record created from label line `line_index`.
    pub fn id_for(role: Role, line_index: usize) -> String {
        match role {
            Role::Leaf => format!("l{:04}", line_index),
            _ => format!("r{:04}", line_index),
        }
    }
}
