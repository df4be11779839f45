//! Pixel-space polygons and the overlap measures used for layout assignment.
//!
//! Every measure in this module is total: an invalid polygon (fewer than three
//! distinct vertices, zero area, or a self-intersecting ring) scores `0.0` in
//! all comparisons instead of producing an error. The same holds when the
//! underlying boolean operation fails on valid input.

use std::panic::{self, AssertUnwindSafe};

use geo::algorithm::line_intersection::{line_intersection, LineIntersection};
use geo::{Area, BooleanOps, Coord, Line, LineString};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A vertex in image pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Point {
    /// Horizontal offset from the left edge
    pub x: i32,
    /// Vertical offset from the top edge
    pub y: i32,
}

impl Point {
    /// Create a new point.
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    fn to_coord(self) -> Coord<f64> {
        Coord {
            x: f64::from(self.x),
            y: f64::from(self.y),
        }
    }
}

impl From<(i32, i32)> for Point {
    fn from((x, y): (i32, i32)) -> Self {
        Self { x, y }
    }
}

/// Axis-aligned bounding box of a polygon.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bounds {
    /// Smallest x
    pub min_x: i32,
    /// Smallest y
    pub min_y: i32,
    /// Largest x
    pub max_x: i32,
    /// Largest y
    pub max_y: i32,
}

impl Bounds {
    fn of(points: &[Point]) -> Option<Self> {
        let first = points.first()?;
        let mut bounds = Bounds {
            min_x: first.x,
            min_y: first.y,
            max_x: first.x,
            max_y: first.y,
        };
        for p in &points[1..] {
            bounds.min_x = bounds.min_x.min(p.x);
            bounds.min_y = bounds.min_y.min(p.y);
            bounds.max_x = bounds.max_x.max(p.x);
            bounds.max_y = bounds.max_y.max(p.y);
        }
        Some(bounds)
    }

    /// Whether the interiors of two boxes can overlap.
    pub fn overlaps(&self, other: &Bounds) -> bool {
        self.min_x < other.max_x
            && other.min_x < self.max_x
            && self.min_y < other.max_y
            && other.min_y < self.max_y
    }
}

/// An ordered ring of pixel-space vertices.
///
/// Validity, area and bounds are computed once at construction; the polygon
/// is immutable afterwards.
#[derive(Debug, Clone)]
pub struct Polygon {
    points: Vec<Point>,
    shape: Option<geo::Polygon<f64>>,
    area: f64,
    bounds: Option<Bounds>,
}

impl Polygon {
    /// Create a polygon from its vertices in drawing order.
    pub fn new(points: Vec<Point>) -> Self {
        let bounds = Bounds::of(&points);
        let shape = simple_shape(&points);
        let area = shape.as_ref().map_or(0.0, |s| s.unsigned_area());
        Self {
            points,
            shape,
            area,
            bounds,
        }
    }

    /// Create a polygon from unit-square coordinates scaled to an image.
    ///
    /// Coordinates are truncated toward zero, so `0.999` on a 1000px axis
    /// maps to pixel 999.
    pub fn from_normalized(points: &[(f64, f64)], width: u32, height: u32) -> Self {
        let w = f64::from(width);
        let h = f64::from(height);
        Self::new(
            points
                .iter()
                .map(|&(x, y)| Point::new((x * w) as i32, (y * h) as i32))
                .collect(),
        )
    }

    /// Create an axis-aligned rectangle.
    pub fn rect(x0: i32, y0: i32, x1: i32, y1: i32) -> Self {
        Self::new(vec![
            Point::new(x0, y0),
            Point::new(x1, y0),
            Point::new(x1, y1),
            Point::new(x0, y1),
        ])
    }

    /// Vertices as given at construction.
    pub fn points(&self) -> &[Point] {
        &self.points
    }

    /// Whether the polygon is a simple ring with positive area.
    pub fn is_valid(&self) -> bool {
        self.shape.is_some()
    }

    /// Area in square pixels, `0.0` when invalid.
    pub fn area(&self) -> f64 {
        self.area
    }

    /// Bounding box of the vertices, `None` for an empty polygon.
    pub fn bounds(&self) -> Option<Bounds> {
        self.bounds
    }

    /// Format as a PAGE-XML `points` attribute (`"x1,y1 x2,y2 ..."`).
    pub fn to_points_string(&self) -> String {
        format_points(&self.points)
    }
}

impl PartialEq for Polygon {
    fn eq(&self, other: &Self) -> bool {
        self.points == other.points
    }
}

impl Serialize for Polygon {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_seq(&self.points)
    }
}

impl<'de> Deserialize<'de> for Polygon {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        Vec::<Point>::deserialize(deserializer).map(Polygon::new)
    }
}

/// Format vertices as `"x1,y1 x2,y2 ..."`.
pub fn format_points(points: &[Point]) -> String {
    points
        .iter()
        .map(|p| format!("{},{}", p.x, p.y))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Whether the polygon can take part in overlap scoring.
pub fn is_valid(polygon: &Polygon) -> bool {
    polygon.is_valid()
}

/// Area of the intersection of two polygon interiors.
///
/// Returns `0.0` when either polygon is invalid, and also when the boolean
/// operation itself fails (panics or yields a non-finite area). A failure
/// never propagates to the caller.
pub fn intersection_area(a: &Polygon, b: &Polygon) -> f64 {
    let (Some(shape_a), Some(shape_b)) = (&a.shape, &b.shape) else {
        return 0.0;
    };
    match (a.bounds, b.bounds) {
        (Some(ba), Some(bb)) if ba.overlaps(&bb) => {}
        _ => return 0.0,
    }

    let area = panic::catch_unwind(AssertUnwindSafe(|| {
        shape_a.intersection(shape_b).unsigned_area()
    }));
    match area {
        Ok(area) if area.is_finite() => area,
        Ok(_) => 0.0,
        Err(_) => {
            log::warn!(
                "Polygon intersection failed for [{}] and [{}]; scoring 0",
                a.to_points_string(),
                b.to_points_string()
            );
            0.0
        }
    }
}

/// Fraction of `child`'s area covered by `parent`, in `[0, 1]`.
///
/// Returns `0.0` when either polygon is invalid.
pub fn containment_ratio(child: &Polygon, parent: &Polygon) -> f64 {
    if child.area <= 0.0 {
        return 0.0;
    }
    (intersection_area(child, parent) / child.area).clamp(0.0, 1.0)
}

/// Build a `geo` polygon if the ring is simple and encloses positive area.
fn simple_shape(points: &[Point]) -> Option<geo::Polygon<f64>> {
    let mut ring: Vec<Point> = points.to_vec();
    ring.dedup();
    if ring.len() > 1 && ring.first() == ring.last() {
        ring.pop();
    }
    if ring.len() < 3 {
        return None;
    }

    let coords: Vec<Coord<f64>> = ring.iter().map(|p| p.to_coord()).collect();
    if !is_simple_ring(&coords) {
        return None;
    }

    let shape = geo::Polygon::new(LineString::from(coords), vec![]);
    if shape.unsigned_area() > 0.0 {
        Some(shape)
    } else {
        None
    }
}

/// Edges may only meet their two neighbours, and only at the shared vertex.
fn is_simple_ring(coords: &[Coord<f64>]) -> bool {
    let n = coords.len();
    let edges: Vec<Line<f64>> = (0..n)
        .map(|i| Line::new(coords[i], coords[(i + 1) % n]))
        .collect();

    for i in 0..n {
        for j in (i + 1)..n {
            let adjacent = j == i + 1 || (i == 0 && j == n - 1);
            match line_intersection(edges[i], edges[j]) {
                None => {}
                Some(LineIntersection::SinglePoint { .. }) if adjacent => {}
                Some(_) => return false,
            }
        }
    }
    true
}
