//! Structured events emitted while building the layout hierarchy.
//!
//! The placement passes never log directly. They report what they skip,
//! promote and assign to a [`LayoutObserver`] supplied by the caller, which
//! decides whether to log, count or ignore each event.
//!
//! # Example
//!
//! ```
//! use yolo2page::parser::{EventCollector, LayoutEvent, LayoutObserver};
//!
//! let mut collector = EventCollector::new();
//! collector.on_event(&LayoutEvent::UnmappedClass { line_index: 4, class_id: 9 });
//! assert_eq!(collector.unmapped_count(), 1);
//! ```

use crate::model::LayoutStats;

/// Placement pass a [`LayoutEvent::PassStarted`] refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pass {
    /// Materialize top-level text regions
    TopRegions,
    /// Place nestable text regions
    NestedRegions,
    /// Place text lines
    Lines,
}

/// Something noteworthy that happened during conversion.
#[derive(Debug, Clone, PartialEq)]
pub enum LayoutEvent {
    /// A label line could not be parsed and was skipped.
    MalformedLine {
        /// Zero-based line number
        line_index: usize,
        /// Why it was skipped
        reason: String,
    },

    /// A label's class id has no mapping and was dropped.
    UnmappedClass {
        /// Zero-based line number
        line_index: usize,
        /// The unmapped class id
        class_id: i64,
    },

    /// A record's polygon is degenerate; it scores zero in every comparison.
    InvalidPolygon {
        /// Record id
        id: String,
    },

    /// A placement pass is starting.
    PassStarted {
        /// Which pass
        pass: Pass,
        /// Number of records the pass handles
        count: usize,
    },

    /// A nestable region was attached to a top-level region.
    RegionNested {
        /// Nested region id
        id: String,
        /// Parent region id
        parent: String,
        /// Containment ratio of the nested region in its parent
        ratio: f64,
    },

    /// A nestable region found no parent and was attached to the page.
    RegionPromoted {
        /// Region id
        id: String,
        /// Best containment ratio seen, `0.0` when there were no candidates
        best_ratio: f64,
    },

    /// A line was assigned to an existing region.
    LinePlaced {
        /// Line id
        id: String,
        /// Container region id
        region: String,
        /// Share of the line's area covered by the container
        coverage: f64,
    },

    /// A line overlapped no region and was given its own container.
    LineOrphaned {
        /// Line id
        id: String,
        /// Id of the manufactured container
        container: String,
    },

    /// The hierarchy is complete.
    Finished {
        /// Summary of the finished page
        stats: LayoutStats,
    },
}

impl LayoutEvent {
    /// Check if this event reports input that was dropped or degraded.
    pub fn is_skip(&self) -> bool {
        matches!(
            self,
            LayoutEvent::MalformedLine { .. }
                | LayoutEvent::UnmappedClass { .. }
                | LayoutEvent::InvalidPolygon { .. }
        )
    }

    /// Check if this event reports an orphan (promoted region or line given
    /// its own container).
    pub fn is_orphan(&self) -> bool {
        matches!(
            self,
            LayoutEvent::RegionPromoted { .. } | LayoutEvent::LineOrphaned { .. }
        )
    }
}

/// Receiver for [`LayoutEvent`]s.
pub trait LayoutObserver {
    /// Called for every event, in the order the events occur.
    fn on_event(&mut self, event: &LayoutEvent);
}

/// Observer that discards all events.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullObserver;

impl LayoutObserver for NullObserver {
    fn on_event(&mut self, _event: &LayoutEvent) {}
}

/// Observer that forwards events to the `log` facade.
#[derive(Debug, Clone, Default)]
pub struct LogObserver {
    source: Option<String>,
}

impl LogObserver {
    /// Create a log observer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Prefix messages with the name of the document being converted.
    pub fn for_source(source: impl Into<String>) -> Self {
        Self {
            source: Some(source.into()),
        }
    }

    fn prefix(&self) -> String {
        self.source
            .as_deref()
            .map(|s| format!("{}: ", s))
            .unwrap_or_default()
    }
}

impl LayoutObserver for LogObserver {
    fn on_event(&mut self, event: &LayoutEvent) {
        let prefix = self.prefix();
        match event {
            LayoutEvent::MalformedLine { line_index, reason } => {
                log::warn!("{}Skipping malformed line {}: {}", prefix, line_index + 1, reason);
            }
            LayoutEvent::UnmappedClass {
                line_index,
                class_id,
            } => {
                log::warn!(
                    "{}No mapping found for class ID {} (line {}), skipping",
                    prefix,
                    class_id,
                    line_index + 1
                );
            }
            LayoutEvent::InvalidPolygon { id } => {
                log::debug!("{}Polygon of {} is invalid, scoring it as zero", prefix, id);
            }
            LayoutEvent::PassStarted { pass, count } => {
                let what = match pass {
                    Pass::TopRegions => "parent TextRegions",
                    Pass::NestedRegions => "child TextRegions",
                    Pass::Lines => "TextLines",
                };
                log::info!("{}Processing {} {}", prefix, count, what);
            }
            LayoutEvent::RegionNested { id, parent, ratio } => {
                log::debug!(
                    "{}Nested TextRegion {} in {} ({:.1}% containment)",
                    prefix,
                    id,
                    parent,
                    ratio * 100.0
                );
            }
            LayoutEvent::RegionPromoted { id, best_ratio } => {
                log::debug!(
                    "{}Added TextRegion {} to page level (best containment {:.1}%)",
                    prefix,
                    id,
                    best_ratio * 100.0
                );
            }
            LayoutEvent::LinePlaced {
                id,
                region,
                coverage,
            } => {
                log::trace!(
                    "{}Line {} assigned to {} ({:.1}% overlap)",
                    prefix,
                    id,
                    region,
                    coverage * 100.0
                );
            }
            LayoutEvent::LineOrphaned { id, container } => {
                log::debug!("{}Line {} placed in new region {}", prefix, id, container);
            }
            LayoutEvent::Finished { stats } => {
                if stats.promoted_regions > 0 {
                    log::info!(
                        "{}{} child TextRegions added to page level",
                        prefix,
                        stats.promoted_regions
                    );
                }
                if stats.lines() > 0 {
                    log::info!(
                        "{}TextLine assignment: {} to existing regions, {} in new regions",
                        prefix,
                        stats.placed_lines,
                        stats.orphan_lines
                    );
                }
            }
        }
    }
}

/// Observer that records every event.
#[derive(Debug, Clone, Default)]
pub struct EventCollector {
    /// Events in arrival order
    pub events: Vec<LayoutEvent>,
}

impl EventCollector {
    /// Create an empty collector.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of malformed lines reported.
    pub fn malformed_count(&self) -> usize {
        self.count(|e| matches!(e, LayoutEvent::MalformedLine { .. }))
    }

    /// Number of unmapped labels reported.
    pub fn unmapped_count(&self) -> usize {
        self.count(|e| matches!(e, LayoutEvent::UnmappedClass { .. }))
    }

    /// Number of orphan events (promoted regions and orphaned lines).
    pub fn orphan_count(&self) -> usize {
        self.count(LayoutEvent::is_orphan)
    }

    /// Count events matching a predicate.
    pub fn count(&self, predicate: impl Fn(&LayoutEvent) -> bool) -> usize {
        self.events.iter().filter(|e| predicate(*e)).count()
    }
}

impl LayoutObserver for EventCollector {
    fn on_event(&mut self, event: &LayoutEvent) {
        self.events.push(event.clone());
    }
}

/// Observer that forwards each event to several observers in order.
#[derive(Default)]
pub struct CompositeObserver<'a> {
    observers: Vec<&'a mut dyn LayoutObserver>,
}

impl<'a> CompositeObserver<'a> {
    /// Create an empty composite.
    pub fn new() -> Self {
        Self {
            observers: Vec::new(),
        }
    }

    /// Add an observer to the chain.
    pub fn with_observer(mut self, observer: &'a mut dyn LayoutObserver) -> Self {
        self.observers.push(observer);
        self
    }
}

impl LayoutObserver for CompositeObserver<'_> {
    fn on_event(&mut self, event: &LayoutEvent) {
        for observer in &mut self.observers {
            observer.on_event(event);
        }
    }
}
