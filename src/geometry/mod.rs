//! Course geometry: point/segment/polygon primitives
//!
//! The engine's admissibility check and the planner's splash-zone check
//! both go through [`segment_in_polygon`], so they agree on what "inside
//! the course" means.

mod polygon;
mod segment;

pub use polygon::{
    contains_point, covers_point, is_simple, rasterize_interior, segment_in_polygon,
    to_geo_polygon,
};
pub use segment::{point_segment_distance, project_point_onto_segment};
