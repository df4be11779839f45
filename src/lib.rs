//! # yolo2page
//!
//! Convert YOLO polygon segmentation labels into nested PAGE-XML.
//!
//! Each label line (`<class> x1 y1 x2 y2 ...`, coordinates normalized to the
//! unit square) becomes a text line, a text region or an opaque region
//! according to a class mapping. Regions are nested by geometric
//! containment and lines are assigned to the most specific region that
//! covers them.
//!
//! ## Quick Start
//!
//! ```no_run
//! use yolo2page::{convert_file, ClassMapping};
//!
//! fn main() -> yolo2page::Result<()> {
//!     let xml = convert_file("labels/page_01.txt", "images/page_01.jpg", &ClassMapping::default())?;
//!     println!("{}", xml);
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - **Nested regions**: regions declared with a `TextRegion` parent are
//!   placed inside the region that contains most of them
//! - **Most-specific assignment**: lines go to the smallest overlapping region
//! - **No data loss**: unplaced lines get their own container
//! - **Observable**: skips, promotions and assignments are reported as
//!   structured events
//! - **Parallel processing**: uses Rayon for per-line search and batch runs

pub mod convert;
pub mod discover;
pub mod error;
pub mod model;
pub mod parser;
pub mod render;

// Re-export commonly used types
pub use convert::{
    BatchConverter, BatchReport, ConversionStats, ConvertResult, FixedSizeProvider,
    ImageHeaderProvider, ImageInfoProvider, PageConverter,
};
pub use error::{Error, Result};
pub use model::{ImageInfo, Page, Polygon, Record, Role};
pub use parser::{
    layout_page, ClassMapping, ClassRule, EventCollector, LayoutEvent, LayoutObserver,
    LayoutOptions, LogObserver, NullObserver,
};
pub use render::{JsonFormat, OutputFormat, RenderOptions};

use std::path::Path;

/// Convert a label file to a PAGE-XML string.
///
/// # Arguments
///
/// * `labels` - Path to the label file
/// * `image` - Path to the image the labels annotate
/// * `mapping` - Class mapping
///
/// # Example
///
/// ```no_run
/// use yolo2page::{convert_file, ClassMapping};
///
/// let xml = convert_file("page.txt", "page.png", &ClassMapping::default()).unwrap();
/// assert!(xml.contains("<PcGts"));
/// ```
pub fn convert_file<P: AsRef<Path>, Q: AsRef<Path>>(
    labels: P,
    image: Q,
    mapping: &ClassMapping,
) -> Result<String> {
    let converter = PageConverter::new(mapping.clone());
    Ok(converter.convert_file(labels, image)?.content)
}

/// Convert label text for an image of known size to a PAGE-XML string.
///
/// # Example
///
/// ```
/// use yolo2page::{convert_str, ClassMapping, ImageInfo};
///
/// let image = ImageInfo::new("page.png", 1000, 1000);
/// let xml = convert_str("0 0.1 0.1 0.3 0.1 0.3 0.2 0.1 0.2", image, &ClassMapping::default()).unwrap();
/// assert!(xml.contains("<TextLine id=\"l0000\">"));
/// ```
pub fn convert_str(text: &str, image: ImageInfo, mapping: &ClassMapping) -> Result<String> {
    let converter = PageConverter::new(mapping.clone());
    Ok(converter.convert_str(text, image, &mut LogObserver::new())?.content)
}

/// Convert every label file in `labels_dir` into `<labels_dir>/page_xml`.
///
/// # Example
///
/// ```no_run
/// use yolo2page::{convert_dir, ClassMapping};
///
/// let report = convert_dir("labels", "images", &ClassMapping::default()).unwrap();
/// println!("{} converted, {} failed", report.converted, report.failed());
/// ```
pub fn convert_dir<P: AsRef<Path>, Q: AsRef<Path>>(
    labels_dir: P,
    images_dir: Q,
    mapping: &ClassMapping,
) -> Result<BatchReport> {
    BatchConverter::new(PageConverter::new(mapping.clone())).run(labels_dir, images_dir)
}
