//! Layout model types.
//!
//! This module defines the intermediate representation between label parsing
//! and markup rendering: pixel-space polygons, classified records and the
//! page hierarchy the placement passes build.

pub mod geometry;
mod page;
mod record;

pub use geometry::{containment_ratio, intersection_area, Bounds, Point, Polygon};
pub use page::{
    ImageInfo, LayoutStats, LeafNode, LineId, OpaqueRegion, Page, RegionId, RegionNode,
    RegionOrigin,
};
pub use record::{OpaqueKind, Record, Role};
