//! The course: an immutable polygon with a start and a target

mod loader;

pub use loader::{load_or_default, CourseDefinition, CourseLayout, DEFAULT_COURSE};

use geo::Polygon;

use crate::core::error::{FairwayError, Result};
use crate::core::types::Position;
use crate::geometry::{covers_point, is_simple, to_geo_polygon};

/// A validated course
///
/// Built once before the game starts and shared read-only by the engine
/// and every agent.
#[derive(Debug, Clone)]
pub struct Course {
    vertices: Vec<Position>,
    polygon: Polygon<f64>,
    start: Position,
    target: Position,
}

impl Course {
    /// Validate and build a course
    ///
    /// The polygon needs at least three finite vertices and must be
    /// simple; start and target must be inside or on it.
    pub fn new(vertices: Vec<Position>, start: Position, target: Position) -> Result<Self> {
        if vertices.len() < 3 {
            return Err(FairwayError::InvalidCourse(format!(
                "polygon needs at least 3 vertices, got {}",
                vertices.len()
            )));
        }
        if !vertices.iter().chain([&start, &target]).all(Position::is_finite) {
            return Err(FairwayError::InvalidCourse("non-finite coordinate".into()));
        }
        if !is_simple(&vertices) {
            return Err(FairwayError::InvalidCourse("polygon edges cross each other".into()));
        }

        let polygon = to_geo_polygon(&vertices);
        if !covers_point(&polygon, start) {
            return Err(FairwayError::InvalidCourse(format!(
                "start ({}, {}) lies outside the course",
                start.x, start.y
            )));
        }
        if !covers_point(&polygon, target) {
            return Err(FairwayError::InvalidCourse(format!(
                "target ({}, {}) lies outside the course",
                target.x, target.y
            )));
        }

        Ok(Self {
            vertices,
            polygon,
            start,
            target,
        })
    }

    pub fn polygon(&self) -> &Polygon<f64> {
        &self.polygon
    }

    pub fn vertices(&self) -> &[Position] {
        &self.vertices
    }

    pub fn start(&self) -> Position {
        self.start
    }

    pub fn target(&self) -> Position {
        self.target
    }

    /// Axis-aligned rectangle course, handy for tests and demos
    pub fn rectangle(width: f64, height: f64, start: Position, target: Position) -> Result<Self> {
        Self::new(
            vec![
                Position::new(0.0, 0.0),
                Position::new(0.0, height),
                Position::new(width, height),
                Position::new(width, 0.0),
            ],
            start,
            target,
        )
    }
}
