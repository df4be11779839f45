//! Layout assignment options.

/// Default minimum containment for nesting a region inside another.
pub const DEFAULT_REGION_THRESHOLD: f64 = 0.5;

/// Default minimum share of a line's area a region must cover.
pub const DEFAULT_LINE_OVERLAP_FRACTION: f64 = 0.1;

/// Default `type` for containers created around unplaced lines.
pub const DEFAULT_CONTAINER_TYPE: &str = "paragraph";

/// Options for building the region hierarchy.
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutOptions {
    /// A nestable region is attached to its best parent only when its
    /// containment ratio is strictly greater than this value
    pub region_threshold: f64,

    /// A region qualifies as a line's container only when the overlap is
    /// strictly greater than this fraction of the line's area
    pub line_overlap_fraction: f64,

    /// Container type for unplaced lines whose class names none
    pub default_container_type: String,

    /// Whether to run per-record candidate searches in parallel
    pub parallel: bool,
}

impl LayoutOptions {
    /// Create new layout options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the nesting threshold.
    pub fn with_region_threshold(mut self, threshold: f64) -> Self {
        self.region_threshold = threshold.clamp(0.0, 1.0);
        self
    }

    /// Set the line overlap fraction.
    pub fn with_line_overlap_fraction(mut self, fraction: f64) -> Self {
        self.line_overlap_fraction = fraction.clamp(0.0, 1.0);
        self
    }

    /// Set the default container type.
    pub fn with_default_container_type(mut self, container_type: impl Into<String>) -> Self {
        self.default_container_type = container_type.into();
        self
    }

    /// Enable or disable parallel candidate search.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Disable parallel candidate search.
    pub fn sequential(mut self) -> Self {
        self.parallel = false;
        self
    }
}

impl Default for LayoutOptions {
    fn default() -> Self {
        Self {
            region_threshold: DEFAULT_REGION_THRESHOLD,
            line_overlap_fraction: DEFAULT_LINE_OVERLAP_FRACTION,
            default_container_type: DEFAULT_CONTAINER_TYPE.to_string(),
            parallel: true,
        }
    }
}
