//! YOLO segmentation label parsing.
//!
//! Each non-empty line reads `<class_id> <x1> <y1> <x2> <y2> ... <xn> <yn>`
//! with coordinates normalized to the unit square.

use std::fmt;

use crate::model::{ImageInfo, Polygon};

/// Minimum tokens on a label line: a class id plus three coordinate pairs.
pub const MIN_LABEL_TOKENS: usize = 7;

/// One parsed label line, still in normalized coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct RawLabel {
    /// Zero-based line number in the label file
    pub line_index: usize,

    /// Class id
    pub class_id: i64,

    /// Normalized `(x, y)` vertices
    pub points: Vec<(f64, f64)>,
}

impl RawLabel {
    /// Scale the vertices to the pixel space of `image`.
    pub fn denormalize(&self, image: &ImageInfo) -> Polygon {
        Polygon::from_normalized(&self.points, image.width, image.height)
    }
}

/// Why a label line was skipped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MalformedReason {
    /// Fewer than three coordinate pairs
    TooFewPoints(usize),
    /// The class id is not an integer
    InvalidClassId(String),
    /// A coordinate is not a number
    InvalidCoordinate(String),
}

impl fmt::Display for MalformedReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MalformedReason::TooFewPoints(tokens) => {
                write!(f, "expected at least {} tokens, found {}", MIN_LABEL_TOKENS, tokens)
            }
            MalformedReason::InvalidClassId(token) => write!(f, "invalid class id '{}'", token),
            MalformedReason::InvalidCoordinate(token) => {
                write!(f, "invalid coordinate '{}'", token)
            }
        }
    }
}

/// A label line that could not be used.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MalformedLine {
    /// Zero-based line number in the label file
    pub line_index: usize,
    /// Why it was skipped
    pub reason: MalformedReason,
}

/// All labels of one file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LabelSet {
    /// Usable labels in file order
    pub labels: Vec<RawLabel>,

    /// Lines that were skipped
    pub malformed: Vec<MalformedLine>,
}

impl LabelSet {
    /// Check if no usable labels were found.
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

/// Parse a single label line.
///
/// Returns `Ok(None)` for blank lines. A trailing unpaired coordinate is
/// ignored.
pub fn parse_label_line(
    line_index: usize,
    line: &str,
) -> std::result::Result<Option<RawLabel>, MalformedReason> {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    if tokens.is_empty() {
        return Ok(None);
    }
    if tokens.len() < MIN_LABEL_TOKENS {
        return Err(MalformedReason::TooFewPoints(tokens.len()));
    }

    let class_id = tokens[0]
        .parse::<i64>()
        .map_err(|_| MalformedReason::InvalidClassId(tokens[0].to_string()))?;

    let points = tokens[1..]
        .chunks_exact(2)
        .map(|pair| Ok((parse_coordinate(pair[0])?, parse_coordinate(pair[1])?)))
        .collect::<std::result::Result<Vec<_>, MalformedReason>>()?;

    Ok(Some(RawLabel {
        line_index,
        class_id,
        points,
    }))
}

fn parse_coordinate(token: &str) -> std::result::Result<f64, MalformedReason> {
    token
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| MalformedReason::InvalidCoordinate(token.to_string()))
}

/// Parse the full contents of a label file.
pub fn parse_labels(text: &str) -> LabelSet {
    let mut set = LabelSet::default();
    for (line_index, line) in text.lines().enumerate() {
        match parse_label_line(line_index, line) {
            Ok(Some(label)) => set.labels.push(label),
            Ok(None) => {}
            Err(reason) => set.malformed.push(MalformedLine { line_index, reason }),
        }
    }
    set
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_label_line() {
        let label = parse_label_line(3, "2 0.1 0.1 0.3 0.1 0.3 0.2 0.1 0.2")
            .unwrap()
            .unwrap();
        assert_eq!(label.line_index, 3);
        assert_eq!(label.class_id, 2);
        assert_eq!(label.points.len(), 4);
        assert_eq!(label.points[1], (0.3, 0.1));
    }

    #[test]
    fn test_blank_line_is_not_malformed() {
        assert_eq!(parse_label_line(0, "   \t"), Ok(None));
        assert_eq!(parse_label_line(0, ""), Ok(None));
    }

    #[test]
    fn test_too_few_points() {
        assert_eq!(
            parse_label_line(0, "0 0.1 0.1 0.2 0.2"),
            Err(MalformedReason::TooFewPoints(5))
        );
    }

    #[test]
    fn test_trailing_coordinate_ignored() {
        let label = parse_label_line(0, "0 0.1 0.1 0.2 0.1 0.2 0.2 0.9")
            .unwrap()
            .unwrap();
        assert_eq!(label.points.len(), 3);
    }

    #[test]
    fn test_invalid_tokens() {
        assert!(matches!(
            parse_label_line(0, "x 0.1 0.1 0.2 0.1 0.2 0.2"),
            Err(MalformedReason::InvalidClassId(_))
        ));
        assert!(matches!(
            parse_label_line(0, "0 0.1 abc 0.2 0.1 0.2 0.2"),
            Err(MalformedReason::InvalidCoordinate(_))
        ));
        assert!(matches!(
            parse_label_line(0, "0 0.1 NaN 0.2 0.1 0.2 0.2"),
            Err(MalformedReason::InvalidCoordinate(_))
        ));
    }

    #[test]
    fn test_parse_labels_keeps_file_line_numbers() {
        let text = "0 0.1 0.1 0.2 0.1 0.2 0.2\n\n1 0.5\n0 0.3 0.3 0.4 0.3 0.4 0.4\n";
        let set = parse_labels(text);
        assert_eq!(set.labels.len(), 2);
        assert_eq!(set.labels[0].line_index, 0);
        assert_eq!(set.labels[1].line_index, 3);
        assert_eq!(set.malformed.len(), 1);
        assert_eq!(set.malformed[0].line_index, 2);
    }

    #[test]
    fn test_denormalize() {
        let label = parse_label_line(0, "0 0 0 0.5 0 0.5 0.5 0 0.5")
            .unwrap()
            .unwrap();
        let polygon = label.denormalize(&ImageInfo::new("page.png", 1000, 800));
        assert_eq!(polygon.to_points_string(), "0,0 500,0 500,400 0,400");
    }
}
