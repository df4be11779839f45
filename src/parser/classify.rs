//! Assign a placement role to each label.

use crate::model::{ImageInfo, Record, Role};

use super::label::RawLabel;
use super::mapping::ClassMapping;
use super::observer::{LayoutEvent, LayoutObserver};
use super::options::LayoutOptions;

/// Turns raw labels into immutable [`Record`]s using a [`ClassMapping`].
#[derive(Debug, Clone)]
pub struct Classifier<'a> {
    mapping: &'a ClassMapping,
    default_container_type: &'a str,
}

impl<'a> Classifier<'a> {
    /// Create a classifier.
    pub fn new(mapping: &'a ClassMapping, options: &'a LayoutOptions) -> Self {
        Self {
            mapping,
            default_container_type: &options.default_container_type,
        }
    }

    /// Classify one label.
    ///
    /// Returns `None` when the class id is not mapped; the label is then
    /// excluded from all further processing.
    pub fn classify(
        &self,
        label: &RawLabel,
        image: &ImageInfo,
        observer: &mut dyn LayoutObserver,
    ) -> Option<Record> {
        let Some(rule) = self.mapping.get(label.class_id) else {
            observer.on_event(&LayoutEvent::UnmappedClass {
                line_index: label.line_index,
                class_id: label.class_id,
            });
            return None;
        };

        let subtype = match rule.role {
            Role::Leaf => Some(
                rule.subtype
                    .clone()
                    .unwrap_or_else(|| self.default_container_type.to_string()),
            ),
            Role::NestableRegion | Role::TopRegion => rule.subtype.clone(),
            Role::Opaque(_) => None,
        };

        let record = Record {
            id: Record::id_for(rule.role, label.line_index),
            polygon: label.denormalize(image),
            role: rule.role,
            subtype,
            class_id: label.class_id,
            line_index: label.line_index,
        };

        if !record.polygon.is_valid() {
            observer.on_event(&LayoutEvent::InvalidPolygon {
                id: record.id.clone(),
            });
        }

        Some(record)
    }

    /// Classify labels in order, dropping unmapped ones.
    pub fn classify_all(
        &self,
        labels: &[RawLabel],
        image: &ImageInfo,
        observer: &mut dyn LayoutObserver,
    ) -> Vec<Record> {
        labels
            .iter()
            .filter_map(|label| self.classify(label, image, &mut *observer))
            .collect()
    }
}
