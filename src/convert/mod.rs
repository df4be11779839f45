//! Document conversion: label file plus image in, markup out.
//!
//! [`PageConverter`] bundles a class mapping with layout and render options
//! and converts one label file at a time. [`BatchConverter`] drives it over
//! a directory of label files.
//!
//! # Example
//!
//! ```no_run
//! use yolo2page::convert::PageConverter;
//! use yolo2page::parser::ClassMapping;
//!
//! fn main() -> yolo2page::Result<()> {
//!     let converter = PageConverter::new(ClassMapping::default());
//!     let result = converter.convert_file("labels/page_01.txt", "images/page_01.jpg")?;
//!     println!("{}", result.content);
//!     Ok(())
//! }
//! ```

mod batch;
mod stats;

pub use batch::{BatchConverter, BatchFailure, BatchReport, DEFAULT_OUTPUT_DIR};
pub use stats::ConversionStats;

use crate::error::{Error, Result};
use crate::model::{ImageInfo, Page};
use crate::parser::{
    layout_page, ClassMapping, CompositeObserver, LayoutObserver, LayoutOptions, LogObserver,
};
use crate::render::{render, OutputFormat, RenderOptions};
use std::fs;
use std::io::Write;
use std::path::Path;
use std::sync::Arc;

/// Source of image dimensions.
///
/// Implement this trait to supply dimensions without decoding image files,
/// e.g. from a dataset manifest.
pub trait ImageInfoProvider: Send + Sync {
    /// Get the metadata of the image at `path`.
    fn image_info(&self, path: &Path) -> Result<ImageInfo>;
}

/// Reads dimensions from the image file header.
#[derive(Debug, Clone, Copy, Default)]
pub struct ImageHeaderProvider;

impl ImageInfoProvider for ImageHeaderProvider {
    fn image_info(&self, path: &Path) -> Result<ImageInfo> {
        if !path.is_file() {
            return Err(Error::ImageNotFound(path.to_path_buf()));
        }
        let (width, height) = image::image_dimensions(path).map_err(|e| Error::ImageRead {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        if width == 0 || height == 0 {
            return Err(Error::InvalidImageSize { width, height });
        }
        Ok(ImageInfo::new(file_name(path), width, height))
    }
}

/// Reports the same dimensions for every image without reading it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedSizeProvider {
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
}

impl FixedSizeProvider {
    /// Create a provider for images of `width` x `height` pixels.
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

impl ImageInfoProvider for FixedSizeProvider {
    fn image_info(&self, path: &Path) -> Result<ImageInfo> {
        if self.width == 0 || self.height == 0 {
            return Err(Error::InvalidImageSize {
                width: self.width,
                height: self.height,
            });
        }
        Ok(ImageInfo::new(file_name(path), self.width, self.height))
    }
}

/// Result of converting one document.
#[derive(Debug, Clone)]
pub struct ConvertResult {
    /// Rendered markup
    pub content: String,

    /// Layout hierarchy the markup was rendered from
    pub page: Page,

    /// Statistics for this document
    pub stats: ConversionStats,

    /// Format of `content`
    pub format: OutputFormat,
}

/// Converts label files into PAGE-XML (or JSON) documents.
#[derive(Clone)]
pub struct PageConverter {
    mapping: ClassMapping,
    layout: LayoutOptions,
    render: RenderOptions,
    images: Arc<dyn ImageInfoProvider>,
}

impl PageConverter {
    /// Create a converter that reads image headers for dimensions.
    pub fn new(mapping: ClassMapping) -> Self {
        Self {
            mapping,
            layout: LayoutOptions::default(),
            render: RenderOptions::default(),
            images: Arc::new(ImageHeaderProvider),
        }
    }

    /// Set layout options.
    pub fn with_layout_options(mut self, options: LayoutOptions) -> Self {
        self.layout = options;
        self
    }

    /// Set render options.
    pub fn with_render_options(mut self, options: RenderOptions) -> Self {
        self.render = options;
        self
    }

    /// Set the source of image dimensions.
    pub fn with_image_provider<P: ImageInfoProvider + 'static>(mut self, provider: P) -> Self {
        self.images = Arc::new(provider);
        self
    }

    /// Class mapping in use.
    pub fn mapping(&self) -> &ClassMapping {
        &self.mapping
    }

    /// Layout options in use.
    pub fn layout_options(&self) -> &LayoutOptions {
        &self.layout
    }

    /// Render options in use.
    pub fn render_options(&self) -> &RenderOptions {
        &self.render
    }

    /// Convert a label file, logging layout events.
    ///
    /// # Errors
    ///
    /// Returns [`Error::LabelNotFound`] or [`Error::ImageNotFound`] when an
    /// input is missing, and the image provider's error when the image
    /// cannot be read.
    pub fn convert_file<P: AsRef<Path>, Q: AsRef<Path>>(
        &self,
        labels: P,
        image: Q,
    ) -> Result<ConvertResult> {
        let source = file_name(labels.as_ref());
        self.convert_file_with(labels, image, &mut LogObserver::for_source(source))
    }

    /// Convert a label file, reporting layout events to `observer`.
    pub fn convert_file_with<P: AsRef<Path>, Q: AsRef<Path>>(
        &self,
        labels: P,
        image: Q,
        observer: &mut dyn LayoutObserver,
    ) -> Result<ConvertResult> {
        let labels = labels.as_ref();
        let image = image.as_ref();
        if !labels.is_file() {
            return Err(Error::LabelNotFound(labels.to_path_buf()));
        }
        if !image.is_file() {
            return Err(Error::ImageNotFound(image.to_path_buf()));
        }

        let info = self.images.image_info(image)?;
        log::debug!(
            "Converting {} ({}x{} image {})",
            labels.display(),
            info.width,
            info.height,
            info.filename
        );
        let bytes = fs::read(labels)?;
        let text = String::from_utf8_lossy(&bytes);
        self.convert_str(&text, info, observer)
    }

    /// Convert label text already in memory.
    pub fn convert_str(
        &self,
        text: &str,
        image: ImageInfo,
        observer: &mut dyn LayoutObserver,
    ) -> Result<ConvertResult> {
        let mut stats = ConversionStats::new();
        let page = {
            let mut observers = CompositeObserver::new()
                .with_observer(observer)
                .with_observer(&mut stats);
            layout_page(text, image, &self.mapping, &self.layout, &mut observers)
        };
        let content = render(&page, &self.render)?;

        Ok(ConvertResult {
            content,
            page,
            stats,
            format: self.render.format,
        })
    }

    /// Convert a label file and write the markup to `output`.
    ///
    /// Nothing is written when conversion fails.
    pub fn convert_to_path<P: AsRef<Path>, Q: AsRef<Path>, R: AsRef<Path>>(
        &self,
        labels: P,
        image: Q,
        output: R,
    ) -> Result<ConvertResult> {
        let result = self.convert_file(labels, image)?;
        write_output(output.as_ref(), &result.content)?;
        log::info!("Created {}: {}", output_kind(result.format), output.as_ref().display());
        Ok(result)
    }
}

impl Default for PageConverter {
    fn default() -> Self {
        Self::new(ClassMapping::default())
    }
}

impl std::fmt::Debug for PageConverter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PageConverter")
            .field("mapping", &self.mapping)
            .field("layout", &self.layout)
            .field("render", &self.render)
            .finish_non_exhaustive()
    }
}

/// Write `content` to `path`, creating parent directories.
///
/// The content goes to a temporary sibling file first and is renamed into
/// place, so `path` never holds a partial document.
pub fn write_output(path: &Path, content: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    let tmp = path.with_file_name(format!(".{}.tmp", file_name(path)));
    let written = fs::File::create(&tmp).and_then(|mut file| {
        file.write_all(content.as_bytes())?;
        file.sync_all()
    });
    if let Err(e) = written.and_then(|_| fs::rename(&tmp, path)) {
        let _ = fs::remove_file(&tmp);
        return Err(e.into());
    }
    Ok(())
}

fn output_kind(format: OutputFormat) -> &'static str {
    match format {
        OutputFormat::PageXml => "PAGE-XML",
        OutputFormat::Json => "JSON",
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::{EventCollector, NullObserver};
    use tempfile::TempDir;

    #[test]
    fn test_convert_str_single_line() {
        let converter = PageConverter::default();
        let result = converter
            .convert_str(
                "0 0.1 0.1 0.3 0.1 0.3 0.2 0.1 0.2\n",
                ImageInfo::new("page.png", 1000, 1000),
                &mut NullObserver,
            )
            .unwrap();

        assert_eq!(result.stats.orphan_lines, 1);
        assert_eq!(result.stats.documents, 1);
        assert!(result.content.contains("<TextLine id=\"l0000\">"));
        assert!(result.content.contains("id=\"r_orphan0000\" type=\"paragraph\""));
    }

    #[test]
    fn test_convert_str_forwards_events() {
        let converter = PageConverter::default();
        let mut events = EventCollector::new();
        let result = converter
            .convert_str(
                "bad line\n5 0.1 0.1 0.3 0.1 0.3 0.2\n",
                ImageInfo::new("page.png", 100, 100),
                &mut events,
            )
            .unwrap();

        assert_eq!(events.malformed_count(), 1);
        assert_eq!(events.unmapped_count(), 1);
        assert_eq!(result.stats.skipped_labels(), 2);
        assert!(result.page.is_empty());
    }

    #[test]
    fn test_missing_inputs() {
        let dir = TempDir::new().unwrap();
        let labels = dir.path().join("page.txt");
        let image = dir.path().join("page.png");
        let converter = PageConverter::default().with_image_provider(FixedSizeProvider::new(10, 10));

        assert!(matches!(
            converter.convert_file(&labels, &image),
            Err(Error::LabelNotFound(_))
        ));

        fs::write(&labels, "").unwrap();
        assert!(matches!(
            converter.convert_file(&labels, &image),
            Err(Error::ImageNotFound(_))
        ));
    }

    #[test]
    fn test_fixed_size_provider() {
        let info = FixedSizeProvider::new(640, 480)
            .image_info(Path::new("imgs/scan.jpg"))
            .unwrap();
        assert_eq!(info, ImageInfo::new("scan.jpg", 640, 480));

        assert!(matches!(
            FixedSizeProvider::new(0, 480).image_info(Path::new("scan.jpg")),
            Err(Error::InvalidImageSize { width: 0, .. })
        ));
    }

    #[test]
    fn test_image_header_provider_rejects_non_image() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("fake.png");
        fs::write(&path, b"not an image").unwrap();
        assert!(matches!(
            ImageHeaderProvider.image_info(&path),
            Err(Error::ImageRead { .. })
        ));
    }

    #[test]
    fn test_write_output_creates_dirs() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("out.xml");
        write_output(&path, "<PcGts/>").unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "<PcGts/>");
        let leftovers: Vec<_> = fs::read_dir(path.parent().unwrap())
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(leftovers.len(), 1);
    }
}
