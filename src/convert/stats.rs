//! Per-document and aggregate conversion statistics.

use serde::{Deserialize, Serialize};

use crate::model::LayoutStats;
use crate::parser::{LayoutEvent, LayoutObserver};

/// Statistics collected while converting label files.
///
/// Implements [`LayoutObserver`], so it can be chained into the layout
/// passes and filled as events arrive.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversionStats {
    /// Number of documents converted
    pub documents: u32,

    /// Label lines that were skipped as malformed
    pub malformed_lines: u32,

    /// Labels dropped because their class is not mapped
    pub unmapped_labels: u32,

    /// Records whose polygon is degenerate
    pub invalid_polygons: u32,

    /// Opaque regions written
    pub opaque_regions: u32,

    /// Declared top-level text regions
    pub top_regions: u32,

    /// Nestable regions placed inside a parent
    pub nested_regions: u32,

    /// Nestable regions promoted to the page
    pub promoted_regions: u32,

    /// Lines assigned to an existing region
    pub placed_lines: u32,

    /// Lines given their own container
    pub orphan_lines: u32,
}

impl ConversionStats {
    /// Create new empty statistics.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the layout summary of one finished document.
    pub fn add_layout(&mut self, layout: &LayoutStats) {
        self.documents += 1;
        self.opaque_regions += layout.opaque_regions as u32;
        self.top_regions += layout.declared_regions as u32;
        self.nested_regions += layout.nested_regions as u32;
        self.promoted_regions += layout.promoted_regions as u32;
        self.placed_lines += layout.placed_lines as u32;
        self.orphan_lines += layout.orphan_lines as u32;
    }

    /// Total number of labels that made it into the output.
    pub fn written_labels(&self) -> u32 {
        self.opaque_regions
            + self.top_regions
            + self.nested_regions
            + self.promoted_regions
            + self.placed_lines
            + self.orphan_lines
    }

    /// Total number of labels that were skipped.
    pub fn skipped_labels(&self) -> u32 {
        self.malformed_lines + self.unmapped_labels
    }

    /// Merge another stats instance into this one.
    pub fn merge(&mut self, other: &ConversionStats) {
        self.documents += other.documents;
        self.malformed_lines += other.malformed_lines;
        self.unmapped_labels += other.unmapped_labels;
        self.invalid_polygons += other.invalid_polygons;
        self.opaque_regions += other.opaque_regions;
        self.top_regions += other.top_regions;
        self.nested_regions += other.nested_regions;
        self.promoted_regions += other.promoted_regions;
        self.placed_lines += other.placed_lines;
        self.orphan_lines += other.orphan_lines;
    }
}

impl LayoutObserver for ConversionStats {
    fn on_event(&mut self, event: &LayoutEvent) {
        match event {
            LayoutEvent::MalformedLine { .. } => self.malformed_lines += 1,
            LayoutEvent::UnmappedClass { .. } => self.unmapped_labels += 1,
            LayoutEvent::InvalidPolygon { .. } => self.invalid_polygons += 1,
            LayoutEvent::Finished { stats } => self.add_layout(stats),
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stats_from_events() {
        let mut stats = ConversionStats::new();
        stats.on_event(&LayoutEvent::MalformedLine {
            line_index: 0,
            reason: "too short".into(),
        });
        stats.on_event(&LayoutEvent::UnmappedClass {
            line_index: 1,
            class_id: 4,
        });
        stats.on_event(&LayoutEvent::Finished {
            stats: LayoutStats {
                declared_regions: 1,
                placed_lines: 3,
                orphan_lines: 1,
                manufactured_regions: 1,
                ..Default::default()
            },
        });

        assert_eq!(stats.documents, 1);
        assert_eq!(stats.malformed_lines, 1);
        assert_eq!(stats.unmapped_labels, 1);
        assert_eq!(stats.skipped_labels(), 2);
        assert_eq!(stats.written_labels(), 5);
    }

    #[test]
    fn test_stats_merge() {
        let mut stats1 = ConversionStats {
            documents: 1,
            placed_lines: 5,
            ..Default::default()
        };
        let stats2 = ConversionStats {
            documents: 2,
            placed_lines: 3,
            orphan_lines: 4,
            ..Default::default()
        };

        stats1.merge(&stats2);

        assert_eq!(stats1.documents, 3);
        assert_eq!(stats1.placed_lines, 8);
        assert_eq!(stats1.orphan_lines, 4);
    }
}
