//! Label parsing and layout assembly.
//!
//! The pipeline for one label file is:
//!
//! 1. [`parse_labels`] tokenizes the text into [`RawLabel`]s.
//! 2. [`Classifier`] denormalizes each label and assigns its [`Role`](crate::model::Role)
//!    from the [`ClassMapping`].
//! 3. [`HierarchyBuilder`] places the records on a [`Page`].
//!
//! [`layout_page`] runs all three steps.

mod classify;
mod hierarchy;
mod label;
mod mapping;
mod observer;
mod options;

pub use classify::Classifier;
pub use hierarchy::{
    best_container, best_parent, ContainerMatch, HierarchyBuilder, ParentMatch,
    ORPHAN_REGION_PREFIX,
};
pub use label::{
    parse_label_line, parse_labels, LabelSet, MalformedLine, MalformedReason, RawLabel,
    MIN_LABEL_TOKENS,
};
pub use mapping::{ClassMapping, ClassRule, ElementKind};
pub use observer::{
    CompositeObserver, EventCollector, LayoutEvent, LayoutObserver, LogObserver, NullObserver,
    Pass,
};
pub use options::{
    LayoutOptions, DEFAULT_CONTAINER_TYPE, DEFAULT_LINE_OVERLAP_FRACTION,
    DEFAULT_REGION_THRESHOLD,
};

use crate::model::{ImageInfo, Page};

/// Build the page hierarchy for the contents of one label file.
///
/// Malformed lines and unmapped classes are reported to `observer` and
/// skipped; everything else ends up on the returned page.
pub fn layout_page(
    text: &str,
    image: ImageInfo,
    mapping: &ClassMapping,
    options: &LayoutOptions,
    observer: &mut dyn LayoutObserver,
) -> Page {
    let labels = parse_labels(text);
    for skipped in &labels.malformed {
        observer.on_event(&LayoutEvent::MalformedLine {
            line_index: skipped.line_index,
            reason: skipped.reason.to_string(),
        });
    }

    let records = Classifier::new(mapping, options).classify_all(&labels.labels, &image, observer);
    HierarchyBuilder::new(options.clone()).build(image, records, observer)
}
