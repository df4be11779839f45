//! Label and image file discovery.
//!
//! Label files and images are paired by identical file stem: `page_01.txt`
//! pairs with `page_01.jpg`, `page_01.png` and so on.

use crate::error::{Error, Result};
use std::path::{Path, PathBuf};

/// Image extensions tried when pairing a label file, in lookup order.
pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "tif", "tiff", "bmp", "webp"];

/// Extension of label files.
pub const LABEL_EXTENSION: &str = "txt";

/// Check if `path` has the label file extension.
pub fn is_label_file<P: AsRef<Path>>(path: P) -> bool {
    path.as_ref()
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e == LABEL_EXTENSION)
}

/// List the label files directly inside `dir`, sorted by file name.
///
/// # Errors
///
/// Returns [`Error::NotADirectory`] if `dir` does not exist or is not a
/// directory.
pub fn list_label_files<P: AsRef<Path>>(dir: P) -> Result<Vec<PathBuf>> {
    let dir = dir.as_ref();
    if !dir.is_dir() {
        return Err(Error::NotADirectory(dir.to_path_buf()));
    }

    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_file() && is_label_file(&path) {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// Find the image in `images_dir` that pairs with `label`.
///
/// Extensions are tried in [`IMAGE_EXTENSIONS`] order; the first existing
/// file wins.
pub fn find_image_for_label<P: AsRef<Path>, Q: AsRef<Path>>(
    label: P,
    images_dir: Q,
) -> Option<PathBuf> {
    let stem = label.as_ref().file_stem()?.to_str()?;
    IMAGE_EXTENSIONS
        .iter()
        .map(|ext| images_dir.as_ref().join(format!("{}.{}", stem, ext)))
        .find(|candidate| candidate.is_file())
}

/// Output path for `label` in `output_dir` with the given extension.
pub fn output_path_for<P: AsRef<Path>, Q: AsRef<Path>>(
    label: P,
    output_dir: Q,
    extension: &str,
) -> PathBuf {
    let stem = label
        .as_ref()
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    output_dir.as_ref().join(format!("{}.{}", stem, extension))
}
