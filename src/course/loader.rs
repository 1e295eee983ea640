//! Load courses from JSON definition files
//!
//! A definition names the start, the target and the ordered polygon
//! vertices. Anything unreadable or invalid falls back to the built-in
//! default course rather than aborting the game.

use std::path::Path;

use serde::{Deserialize, Serialize};

use super::Course;
use crate::core::error::Result;
use crate::core::types::Position;
use crate::geometry::to_geo_polygon;

/// Built-in dogleg course used when no usable definition is given
pub const DEFAULT_COURSE: CourseLayout = CourseLayout {
    start: [30.0, 50.0],
    target: [300.0, 270.0],
    map: &[
        [0.0, 0.0],
        [0.0, 100.0],
        [250.0, 100.0],
        [250.0, 300.0],
        [350.0, 300.0],
        [350.0, 0.0],
    ],
};

/// Compile-time course layout
#[derive(Debug, Clone, Copy)]
pub struct CourseLayout {
    pub start: [f64; 2],
    pub target: [f64; 2],
    pub map: &'static [[f64; 2]],
}

/// On-disk course format
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CourseDefinition {
    pub start: [f64; 2],
    pub target: [f64; 2],
    pub map: Vec<[f64; 2]>,
}

impl CourseDefinition {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Validate into a playable course
    pub fn into_course(self) -> Result<Course> {
        Course::new(
            self.map.into_iter().map(Position::from).collect(),
            self.start.into(),
            self.target.into(),
        )
    }
}

impl Course {
    /// Parse and validate a JSON course definition
    pub fn from_json(json: &str) -> Result<Self> {
        CourseDefinition::from_json(json)?.into_course()
    }

    /// Read, parse and validate a course file
    pub fn from_file(path: &Path) -> Result<Self> {
        CourseDefinition::from_file(path)?.into_course()
    }

    /// The built-in default course
    pub fn default_course() -> Self {
        let vertices: Vec<Position> = DEFAULT_COURSE.map.iter().copied().map(Position::from).collect();
        Self {
            polygon: to_geo_polygon(&vertices),
            vertices,
            start: DEFAULT_COURSE.start.into(),
            target: DEFAULT_COURSE.target.into(),
        }
    }
}

/// Load the course at `path`, falling back to the default course
pub fn load_or_default(path: Option<&Path>) -> Course {
    let Some(path) = path else {
        tracing::info!("No course file given, using default course");
        return Course::default_course();
    };

    match Course::from_file(path) {
        Ok(course) => {
            tracing::info!("Course loaded: {}", path.display());
            course
        }
        Err(e) => {
            tracing::error!("Using default course as {} could not be loaded: {}", path.display(), e);
            Course::default_course()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::FairwayError;

    #[test]
    fn test_default_course_is_valid() {
        let course = Course::default_course();
        let validated = Course::new(course.vertices().to_vec(), course.start(), course.target());
        assert!(validated.is_ok());
        assert_eq!(course.start(), Position::new(30.0, 50.0));
        assert_eq!(course.target(), Position::new(300.0, 270.0));
        assert_eq!(course.vertices().len(), 6);
    }

    #[test]
    fn test_parse_definition() {
        let course = Course::from_json(
            r#"{"start": [1, 1], "target": [9, 9], "map": [[0,0],[0,10],[10,10],[10,0]]}"#,
        )
        .unwrap();
        assert_eq!(course.target(), Position::new(9.0, 9.0));
    }

    #[test]
    fn test_malformed_json_is_error() {
        let result = Course::from_json(r#"{"start": [1, 1], "map": []}"#);
        assert!(matches!(result, Err(FairwayError::SerdeError(_))));
    }

    #[test]
    fn test_missing_file_falls_back_to_default() {
        let course = load_or_default(Some(Path::new("definitely/not/here.json")));
        assert_eq!(course.target(), Course::default_course().target());
    }

    #[test]
    fn test_invalid_course_falls_back_to_default() {
        let dir = std::env::temp_dir().join(format!("fairway-course-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("outside.json");
        std::fs::write(
            &path,
            r#"{"start": [50, 50], "target": [9, 9], "map": [[0,0],[0,10],[10,10],[10,0]]}"#,
        )
        .unwrap();

        let course = load_or_default(Some(&path));
        assert_eq!(course.start(), Course::default_course().start());

        std::fs::remove_dir_all(&dir).ok();
    }
}
