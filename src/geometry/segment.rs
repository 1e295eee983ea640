//! Point/segment primitives used for target capture

use geo::EuclideanDistance;

use crate::core::types::{Position, Segment};

/// Closest point to `point` on `segment`
///
/// Degenerate segments project everything onto their single point.
pub fn project_point_onto_segment(point: Position, segment: &Segment) -> Position {
    let d = segment.end - segment.start;
    let len_sq = d.x * d.x + d.y * d.y;
    if len_sq == 0.0 {
        return segment.start;
    }
    let w = point - segment.start;
    let t = ((w.x * d.x + w.y * d.y) / len_sq).clamp(0.0, 1.0);
    segment.at(t)
}

/// Shortest distance from `point` to any point of `segment`
pub fn point_segment_distance(point: Position, segment: &Segment) -> f64 {
    let closest: geo::Point<f64> = project_point_onto_segment(point, segment).into();
    closest.euclidean_distance(&geo::Point::from(point))
}

/// Parameters along `seg` where it meets the segment `other`
///
/// Returns the single crossing/touching parameter, both ends of a
/// collinear overlap, or nothing when the segments are disjoint.
pub(crate) fn intersection_params(seg: &Segment, other: &Segment) -> Vec<f64> {
    let p = seg.start;
    let r = seg.end - seg.start;
    let q = other.start;
    let s = other.end - other.start;

    let denom = r.x * s.y - r.y * s.x;
    let qp = q - p;
    let eps = 1e-12;

    if denom.abs() > eps {
        let t = (qp.x * s.y - qp.y * s.x) / denom;
        let u = (qp.x * r.y - qp.y * r.x) / denom;
        if (-eps..=1.0 + eps).contains(&t) && (-eps..=1.0 + eps).contains(&u) {
            return vec![t.clamp(0.0, 1.0)];
        }
        return Vec::new();
    }

    // Parallel: only collinear segments can meet
    if (qp.x * r.y - qp.y * r.x).abs() > eps {
        return Vec::new();
    }
    let rr = r.x * r.x + r.y * r.y;
    if rr == 0.0 {
        return Vec::new();
    }
    let t0 = (qp.x * r.x + qp.y * r.y) / rr;
    let t1 = t0 + (s.x * r.x + s.y * r.y) / rr;
    let (lo, hi) = if t0 <= t1 { (t0, t1) } else { (t1, t0) };
    if hi < 0.0 || lo > 1.0 {
        return Vec::new();
    }
    vec![lo.max(0.0), hi.min(1.0)]
}
