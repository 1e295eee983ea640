//! Polygon predicates: segment containment, rasterization, simplicity

use geo::{BoundingRect, Contains, EuclideanDistance, Intersects, LineString, Polygon};

use super::segment::intersection_params;
use crate::core::types::{Position, Segment};

/// Boundary slack absorbing rounding in computed crossing points
const BOUNDARY_EPS: f64 = 1e-9;

/// Build a closed geo polygon from an implicitly closed vertex list
pub fn to_geo_polygon(vertices: &[Position]) -> Polygon<f64> {
    let mut coords: Vec<(f64, f64)> = vertices.iter().map(|p| (p.x, p.y)).collect();
    // Close the polygon
    if let Some(first) = coords.first().cloned() {
        coords.push(first);
    }
    Polygon::new(LineString::from(coords), vec![])
}

/// True iff `point` is inside the polygon or on its boundary
pub fn covers_point(polygon: &Polygon<f64>, point: Position) -> bool {
    let pt: geo::Point<f64> = point.into();
    if polygon.intersects(&pt) {
        return true;
    }
    pt.euclidean_distance(polygon.exterior()) <= BOUNDARY_EPS
}

/// True iff `point` is strictly inside the polygon
pub fn contains_point(polygon: &Polygon<f64>, point: Position) -> bool {
    polygon.contains(&geo::Point::from(point))
}

/// True iff every point of `segment` lies inside or on the polygon
///
/// The segment is split at every place it meets a polygon edge; each
/// piece then lies entirely on one side of the boundary, so testing its
/// midpoint decides it. Zero-length segments are always admissible.
pub fn segment_in_polygon(segment: &Segment, polygon: &Polygon<f64>) -> bool {
    if segment.is_degenerate() {
        return true;
    }

    let mut params = vec![0.0, 1.0];
    for ring in std::iter::once(polygon.exterior()).chain(polygon.interiors()) {
        for line in ring.lines() {
            let edge = Segment::new(line.start.into(), line.end.into());
            params.extend(intersection_params(segment, &edge));
        }
    }
    params.sort_by(f64::total_cmp);
    params.dedup_by(|a, b| (*a - *b).abs() < 1e-12);

    if !covers_point(polygon, segment.start) || !covers_point(polygon, segment.end) {
        return false;
    }
    params
        .windows(2)
        .all(|w| covers_point(polygon, segment.at((w[0] + w[1]) / 2.0)))
}

/// Lattice points strictly inside the polygon
///
/// Points are laid out at `step` spacing from the bounding box minimum
/// (exclusive) to its maximum (exclusive), rows of constant y in
/// increasing order, increasing x within a row.
pub fn rasterize_interior(polygon: &Polygon<f64>, step: f64) -> Vec<Position> {
    let Some(bounds) = polygon.bounding_rect() else {
        return Vec::new();
    };
    if !(step > 0.0) {
        return Vec::new();
    }
    let (min, max) = (bounds.min(), bounds.max());

    let axis = |lo: f64, hi: f64| {
        (1u64..)
            .map(move |k| lo + step * k as f64)
            .take_while(move |v| *v < hi)
    };

    axis(min.y, max.y)
        .flat_map(|y| axis(min.x, max.x).map(move |x| Position::new(x, y)))
        .filter(|p| contains_point(polygon, *p))
        .collect()
}

/// True iff no two non-adjacent edges of the closed vertex ring meet
///
/// Touching counts: a vertex lying on a non-adjacent edge, or two edges
/// overlapping along a line, makes the ring non-simple.
pub fn is_simple(vertices: &[Position]) -> bool {
    let n = vertices.len();
    if n < 4 {
        return true;
    }
    let edge = |i: usize| Segment::new(vertices[i], vertices[(i + 1) % n]);

    (0..n).all(|i| {
        ((i + 2)..n)
            // Edge n-1 closes the ring and shares vertex 0 with edge 0
            .filter(|&j| !(i == 0 && j == n - 1))
            .all(|j| intersection_params(&edge(i), &edge(j)).is_empty())
    })
}
