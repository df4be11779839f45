//! Directory-level conversion.
//!
//! Every `*.txt` file in the labels directory is paired with the image of
//! the same stem and converted independently. A document that fails is
//! recorded in the [`BatchReport`] and does not stop the others.

use rayon::prelude::*;
use std::any::Any;
use std::fs;
use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};

use super::{ConversionStats, PageConverter};
use crate::discover::{find_image_for_label, list_label_files, output_path_for};
use crate::error::{Error, Result};

/// Output directory name used when none is given, relative to the labels
/// directory.
pub const DEFAULT_OUTPUT_DIR: &str = "page_xml";

/// A document that could not be converted.
#[derive(Debug)]
pub struct BatchFailure {
    /// Label file
    pub label: PathBuf,
    /// Why it failed
    pub error: Error,
}

/// Outcome of a batch run.
#[derive(Debug, Default)]
pub struct BatchReport {
    /// Number of documents written
    pub converted: usize,

    /// Documents that failed, in label file order
    pub failures: Vec<BatchFailure>,

    /// Written files, in label file order
    pub outputs: Vec<PathBuf>,

    /// Statistics summed over converted documents
    pub stats: ConversionStats,
}

impl BatchReport {
    /// Number of failed documents.
    pub fn failed(&self) -> usize {
        self.failures.len()
    }

    /// Number of label files processed.
    pub fn total(&self) -> usize {
        self.converted + self.failed()
    }

    /// Check if every document was converted.
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Converts all label files in a directory.
#[derive(Debug, Clone)]
pub struct BatchConverter {
    converter: PageConverter,
    output_dir: Option<PathBuf>,
    parallel: bool,
}

impl BatchConverter {
    /// Create a batch converter around a configured [`PageConverter`].
    pub fn new(converter: PageConverter) -> Self {
        Self {
            converter,
            output_dir: None,
            parallel: true,
        }
    }

    /// Write outputs to `dir` instead of `<labels>/page_xml`.
    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = Some(dir.into());
        self
    }

    /// Enable or disable converting documents in parallel.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Output directory used for `labels_dir`.
    pub fn output_dir_for(&self, labels_dir: &Path) -> PathBuf {
        self.output_dir
            .clone()
            .unwrap_or_else(|| labels_dir.join(DEFAULT_OUTPUT_DIR))
    }

    /// Number of label files a run over `labels_dir` would process.
    pub fn count_labels<P: AsRef<Path>>(&self, labels_dir: P) -> Result<usize> {
        Ok(list_label_files(labels_dir)?.len())
    }

    /// Convert every label file in `labels_dir`.
    pub fn run<P: AsRef<Path>, Q: AsRef<Path>>(
        &self,
        labels_dir: P,
        images_dir: Q,
    ) -> Result<BatchReport> {
        self.run_with_progress(labels_dir, images_dir, |_| {})
    }

    /// Convert every label file in `labels_dir`, calling `progress` with
    /// each label file once it is done.
    ///
    /// # Errors
    ///
    /// Only directory-level problems are returned as errors. Per-document
    /// failures are collected in the report.
    pub fn run_with_progress<P, Q, F>(
        &self,
        labels_dir: P,
        images_dir: Q,
        progress: F,
    ) -> Result<BatchReport>
    where
        P: AsRef<Path>,
        Q: AsRef<Path>,
        F: Fn(&Path) + Sync,
    {
        let labels_dir = labels_dir.as_ref();
        let images_dir = images_dir.as_ref();
        if !images_dir.is_dir() {
            return Err(Error::NotADirectory(images_dir.to_path_buf()));
        }

        let labels = list_label_files(labels_dir)?;
        let output_dir = self.output_dir_for(labels_dir);
        fs::create_dir_all(&output_dir)?;

        if labels.is_empty() {
            log::warn!("No txt files found in {}", labels_dir.display());
            return Ok(BatchReport::default());
        }
        log::info!("Found {} txt files to convert", labels.len());

        let convert = |label: &PathBuf| {
            let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
                self.convert_one(label, images_dir, &output_dir)
            }))
            .unwrap_or_else(|payload| {
                let message = panic_message(payload.as_ref());
                log::error!("Conversion of {} panicked: {}", label.display(), message);
                Err(Error::Panicked(message))
            });
            progress(label);
            outcome
        };
        let outcomes: Vec<Result<(PathBuf, ConversionStats)>> = if self.parallel {
            labels.par_iter().map(convert).collect()
        } else {
            labels.iter().map(convert).collect()
        };

        let mut report = BatchReport::default();
        for (label, outcome) in labels.into_iter().zip(outcomes) {
            match outcome {
                Ok((output, stats)) => {
                    report.converted += 1;
                    report.outputs.push(output);
                    report.stats.merge(&stats);
                }
                Err(error) => report.failures.push(BatchFailure { label, error }),
            }
        }

        log::info!(
            "Conversion complete: {} successful, {} failed",
            report.converted,
            report.failed()
        );
        Ok(report)
    }

    fn convert_one(
        &self,
        label: &Path,
        images_dir: &Path,
        output_dir: &Path,
    ) -> Result<(PathBuf, ConversionStats)> {
        let name = label.display();
        let Some(image) = find_image_for_label(label, images_dir) else {
            log::warn!("No image found for label: {}", name);
            let stem = label.file_stem().unwrap_or_default();
            return Err(Error::ImageNotFound(images_dir.join(stem)));
        };

        let extension = self.converter.render_options().format.extension();
        let output = output_path_for(label, output_dir, extension);
        match self.converter.convert_to_path(label, &image, &output) {
            Ok(result) => Ok((output, result.stats)),
            Err(e) => {
                log::error!("Failed to convert {}: {}", name, e);
                Err(e)
            }
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::convert::{FixedSizeProvider, ImageInfoProvider};
    use crate::model::ImageInfo;
    use tempfile::TempDir;

    /// Panics for images whose stem is `bad`.
    struct FragileProvider;

    impl ImageInfoProvider for FragileProvider {
        fn image_info(&self, path: &Path) -> Result<ImageInfo> {
            if path.file_stem().is_some_and(|stem| stem == "bad") {
                panic!("cannot decode {}", path.display());
            }
            FixedSizeProvider::new(100, 100).image_info(path)
        }
    }

    fn converter() -> PageConverter {
        PageConverter::default().with_image_provider(FixedSizeProvider::new(100, 100))
    }

    #[test]
    fn test_default_output_dir() {
        let batch = BatchConverter::new(converter());
        assert_eq!(
            batch.output_dir_for(Path::new("labels")),
            Path::new("labels").join("page_xml")
        );
        let batch = batch.with_output_dir("out");
        assert_eq!(batch.output_dir_for(Path::new("labels")), Path::new("out"));
    }

    #[test]
    fn test_missing_image_is_counted() {
        let labels = TempDir::new().unwrap();
        let images = TempDir::new().unwrap();
        fs::write(labels.path().join("a.txt"), "0 0.1 0.1 0.3 0.1 0.3 0.2\n").unwrap();
        fs::write(labels.path().join("b.txt"), "0 0.1 0.1 0.3 0.1 0.3 0.2\n").unwrap();
        fs::write(images.path().join("a.png"), "").unwrap();

        let report = BatchConverter::new(converter())
            .with_parallel(false)
            .run(labels.path(), images.path())
            .unwrap();

        assert_eq!(report.converted, 1);
        assert_eq!(report.failed(), 1);
        assert!(matches!(report.failures[0].error, Error::ImageNotFound(_)));
        assert!(labels.path().join("page_xml").join("a.xml").is_file());
        assert!(!labels.path().join("page_xml").join("b.xml").exists());
    }

    #[test]
    fn test_panicking_document_is_counted() {
        let labels = TempDir::new().unwrap();
        let images = TempDir::new().unwrap();
        for name in ["a", "bad", "c"] {
            fs::write(
                labels.path().join(format!("{}.txt", name)),
                "0 0.1 0.1 0.3 0.1 0.3 0.2\n",
            )
            .unwrap();
            fs::write(images.path().join(format!("{}.png", name)), "").unwrap();
        }

        for parallel in [true, false] {
            let report = BatchConverter::new(
                PageConverter::default().with_image_provider(FragileProvider),
            )
            .with_parallel(parallel)
            .run(labels.path(), images.path())
            .unwrap();

            assert_eq!(report.converted, 2);
            assert_eq!(report.failed(), 1);
            assert!(report.failures[0].label.ends_with("bad.txt"));
            match &report.failures[0].error {
                Error::Panicked(message) => assert!(message.starts_with("cannot decode")),
                other => panic!("unexpected error: {}", other),
            }
        }
    }

    #[test]
    fn test_empty_labels_dir() {
        let labels = TempDir::new().unwrap();
        let images = TempDir::new().unwrap();
        let report = BatchConverter::new(converter())
            .run(labels.path(), images.path())
            .unwrap();
        assert_eq!(report.total(), 0);
        assert!(report.is_success());
    }

    #[test]
    fn test_images_dir_must_exist() {
        let labels = TempDir::new().unwrap();
        let result = BatchConverter::new(converter()).run(labels.path(), labels.path().join("x"));
        assert!(matches!(result, Err(Error::NotADirectory(_))));
    }
}
