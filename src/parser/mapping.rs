//! Class-id to PAGE element mapping.
//!
//! The mapping file is a JSON object keyed by stringified class id:
//!
//! ```json
//! {
//!   "0": { "element": "TextLine", "parent": "TextRegion", "parent_type": "paragraph" },
//!   "1": { "element": "TextRegion", "type": "heading" },
//!   "2": { "element": "TextRegion", "parent": "TextRegion", "type": "marginalia" },
//!   "3": { "element": "TableRegion" }
//! }
//! ```
//!
//! Entries are validated when the mapping is loaded; lookups never fail
//! except for class ids that are absent. Keys must be written exactly as
//! the class id prints (`"1"`, not `"01"`). An entry with no settings at all
//! (`"5": {}`) leaves the class unmapped.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::error::{Error, Result};
use crate::model::{OpaqueKind, Role};

const TEXT_LINE: &str = "TextLine";
const TEXT_REGION: &str = "TextRegion";

/// PAGE element a class maps to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementKind {
    /// `TextLine`
    TextLine,
    /// `TextRegion`
    TextRegion,
    /// Any non-text region
    Opaque(OpaqueKind),
}

impl ElementKind {
    /// Parse a PAGE element name.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            TEXT_LINE => Some(ElementKind::TextLine),
            TEXT_REGION => Some(ElementKind::TextRegion),
            other => OpaqueKind::from_element_name(other).map(ElementKind::Opaque),
        }
    }

    /// PAGE element name.
    pub fn name(&self) -> &'static str {
        match self {
            ElementKind::TextLine => TEXT_LINE,
            ElementKind::TextRegion => TEXT_REGION,
            ElementKind::Opaque(kind) => kind.element_name(),
        }
    }
}

/// Validated mapping entry for one class id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassRule {
    /// Mapped element
    pub element: ElementKind,

    /// Placement role derived from the element and its nesting declaration
    pub role: Role,

    /// Region `type` for text regions; container type for text lines
    pub subtype: Option<String>,

    /// Whether a text region asks to be nested inside another text region
    pub nests_in_region: bool,
}

impl ClassRule {
    /// A text line whose fallback container gets `container_type`.
    pub fn line(container_type: Option<&str>) -> Self {
        Self {
            element: ElementKind::TextLine,
            role: Role::Leaf,
            subtype: container_type.map(str::to_string),
            nests_in_region: false,
        }
    }

    /// A top-level text region.
    pub fn region(region_type: Option<&str>) -> Self {
        Self {
            element: ElementKind::TextRegion,
            role: Role::TopRegion,
            subtype: region_type.map(str::to_string),
            nests_in_region: false,
        }
    }

    /// A text region that nests inside a top-level region.
    pub fn nested_region(region_type: Option<&str>) -> Self {
        Self {
            element: ElementKind::TextRegion,
            role: Role::NestableRegion,
            subtype: region_type.map(str::to_string),
            nests_in_region: true,
        }
    }

    /// A region excluded from containment logic.
    pub fn opaque(kind: OpaqueKind) -> Self {
        Self {
            element: ElementKind::Opaque(kind),
            role: Role::Opaque(kind),
            subtype: None,
            nests_in_region: false,
        }
    }

    fn from_raw(class_key: &str, raw: RawRule) -> Result<Self> {
        let name = raw.element.as_deref().unwrap_or(TEXT_LINE);
        let element = ElementKind::from_name(name).ok_or_else(|| {
            Error::Mapping(format!("class {}: unknown element '{}'", class_key, name))
        })?;

        let rule = match element {
            ElementKind::TextLine => ClassRule::line(raw.parent_type.as_deref()),
            ElementKind::TextRegion if raw.parent.as_deref() == Some(TEXT_REGION) => {
                ClassRule::nested_region(raw.region_type.as_deref())
            }
            ElementKind::TextRegion => {
                if let Some(parent) = raw.parent.as_deref() {
                    log::debug!(
                        "class {}: parent '{}' is not a region, treating as top-level",
                        class_key,
                        parent
                    );
                }
                ClassRule::region(raw.region_type.as_deref())
            }
            ElementKind::Opaque(kind) => ClassRule::opaque(kind),
        };
        Ok(rule)
    }
}

#[derive(Debug, Deserialize)]
struct RawRule {
    #[serde(default)]
    element: Option<String>,
    #[serde(default)]
    parent: Option<String>,
    #[serde(default, rename = "type")]
    region_type: Option<String>,
    #[serde(default)]
    parent_type: Option<String>,
}

impl RawRule {
    fn is_empty(&self) -> bool {
        self.element.is_none()
            && self.parent.is_none()
            && self.region_type.is_none()
            && self.parent_type.is_none()
    }
}

/// Lookup table from class id to [`ClassRule`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassMapping {
    rules: BTreeMap<i64, ClassRule>,
}

impl ClassMapping {
    /// Create an empty mapping.
    pub fn empty() -> Self {
        Self {
            rules: BTreeMap::new(),
        }
    }

    /// Parse and validate a JSON mapping.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let raw: BTreeMap<String, RawRule> = serde_json::from_str(json)?;
        let mut mapping = Self::empty();
        for (key, raw_rule) in raw {
            let class_id = key
                .parse::<i64>()
                .ok()
                .filter(|id| id.to_string() == key)
                .ok_or_else(|| {
                    Error::Mapping(format!("class key '{}' is not a canonical integer", key))
                })?;
            if raw_rule.is_empty() {
                log::warn!("class {}: empty mapping entry, its labels will be dropped", key);
                continue;
            }
            let rule = ClassRule::from_raw(&key, raw_rule)?;
            mapping.rules.insert(class_id, rule);
        }
        Ok(mapping)
    }

    /// Load a mapping file.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let json = fs::read_to_string(path.as_ref())?;
        let mapping = Self::from_json_str(&json)?;
        log::info!("Loaded mapping from {}", path.as_ref().display());
        for (class_id, rule) in &mapping.rules {
            log::info!(
                "  Class {}: {} ({:?})",
                class_id,
                rule.element.name(),
                rule.role
            );
        }
        Ok(mapping)
    }

    /// Load `path` if given and present, otherwise fall back to the default
    /// mapping.
    ///
    /// A mapping file that exists but fails validation is still an error.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(p) if p.exists() => Self::from_path(p),
            Some(p) => {
                log::warn!("Mapping file not found: {}. Using defaults.", p.display());
                Ok(Self::default())
            }
            None => {
                log::info!("Using default mapping for TextLine elements");
                Ok(Self::default())
            }
        }
    }

    /// Add or replace the rule for a class id.
    pub fn with_rule(mut self, class_id: i64, rule: ClassRule) -> Self {
        self.rules.insert(class_id, rule);
        self
    }

    /// Rule for `class_id`, if mapped.
    pub fn get(&self, class_id: i64) -> Option<&ClassRule> {
        self.rules.get(&class_id)
    }

    /// Rules ordered by class id.
    pub fn iter(&self) -> impl Iterator<Item = (i64, &ClassRule)> {
        self.rules.iter().map(|(id, rule)| (*id, rule))
    }

    /// Number of mapped classes.
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Check if no class is mapped.
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

impl Default for ClassMapping {
    /// Class `0` maps to text lines grouped into paragraphs.
    fn default() -> Self {
        Self::empty().with_rule(0, ClassRule::line(Some("paragraph")))
    }
}
