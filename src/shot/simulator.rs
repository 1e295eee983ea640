//! Stochastic shot resolution
//!
//! One shot draws exactly two normal samples from the game generator,
//! distance first then angle, whatever kind of shot results.

use rand::Rng;
use rand_distr::StandardNormal;

use super::{Shot, ShotKind, ShotRequest};
use crate::core::config::GameConfig;
use crate::core::types::{Position, Segment};
use crate::course::Course;
use crate::geometry::{point_segment_distance, project_point_onto_segment, segment_in_polygon};

/// The subset of the game rules shot resolution depends on
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShotRules {
    pub max_distance: f64,
    pub min_putter_distance: f64,
    pub extra_roll: f64,
    pub target_radius: f64,
}

impl ShotRules {
    /// Longest legal full shot for a player of `skill`
    pub fn max_full_shot(&self, skill: u32) -> f64 {
        self.max_distance + skill as f64
    }

    /// Classify a request by its distance
    pub fn kind_of(&self, distance: f64, skill: u32) -> ShotKind {
        if distance < self.min_putter_distance {
            ShotKind::Putt
        } else if distance <= self.max_full_shot(skill) {
            ShotKind::Full
        } else {
            ShotKind::Void
        }
    }
}

impl Default for ShotRules {
    fn default() -> Self {
        Self::from(&GameConfig::default())
    }
}

impl From<&GameConfig> for ShotRules {
    fn from(config: &GameConfig) -> Self {
        Self {
            max_distance: config.max_distance,
            min_putter_distance: config.min_putter_distance,
            extra_roll: config.extra_roll,
            target_radius: config.target_radius,
        }
    }
}

/// Resolve a requested shot from `from` for a player of `skill`
///
/// The request must already be valid (see [`ShotRequest::is_valid`]) and
/// `skill` positive. Never touches player state: moving the player is up
/// to the caller, and only when the shot is admissible.
pub fn simulate<R: Rng + ?Sized>(
    request: ShotRequest,
    skill: u32,
    from: Position,
    course: &Course,
    rules: &ShotRules,
    rng: &mut R,
) -> Shot {
    let skill_f = skill.max(1) as f64;
    let actual_distance = sample_normal(rng, request.distance, request.distance / skill_f);
    let actual_angle = sample_normal(rng, request.angle, 1.0 / (2.0 * skill_f));

    tracing::debug!(
        "Requested distance {:.3}, angle {:.4}; observed distance {:.3}, angle {:.4}",
        request.distance,
        request.angle,
        actual_distance,
        actual_angle
    );

    let kind = rules.kind_of(request.distance, skill);
    let (landing, mut final_point) = match kind {
        ShotKind::Full => (
            from.travel(actual_distance, actual_angle),
            from.travel((1.0 + rules.extra_roll) * actual_distance, actual_angle),
        ),
        ShotKind::Putt => {
            tracing::debug!(
                "Using putter as requested distance {:.3} is below {}",
                request.distance,
                rules.min_putter_distance
            );
            (from, from.travel(actual_distance, actual_angle))
        }
        ShotKind::Void => {
            tracing::debug!(
                "Void shot: requested distance {:.3} exceeds {}",
                request.distance,
                rules.max_full_shot(skill)
            );
            (from, from)
        }
    };

    let air = Segment::new(from, landing);
    let mut roll = Segment::new(landing, final_point);

    let target = course.target();
    let mut reached_target = false;
    if point_segment_distance(target, &roll) <= rules.target_radius {
        reached_target = true;
        final_point = project_point_onto_segment(target, &roll);
        roll = Segment::new(landing, final_point);
    }

    let admissible = segment_in_polygon(&roll, course.polygon());
    let reached_target = reached_target && admissible;

    Shot {
        requested: request,
        actual_distance,
        actual_angle,
        kind,
        air,
        roll,
        final_point,
        admissible,
        reached_target,
    }
}

/// One normal draw as `mean + std_dev * z`
///
/// Every call consumes exactly one standard-normal sample, so a zero
/// spread returns the mean without shifting the rest of the stream.
fn sample_normal<R: Rng + ?Sized>(rng: &mut R, mean: f64, std_dev: f64) -> f64 {
    let z: f64 = rng.sample(StandardNormal);
    mean + std_dev * z
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn square_course(target: Position) -> Course {
        Course::rectangle(100.0, 100.0, Position::new(10.0, 10.0), target).unwrap()
    }

    fn rng() -> ChaCha8Rng {
        ChaCha8Rng::seed_from_u64(2021)
    }

    #[test]
    fn test_kind_boundaries() {
        let rules = ShotRules::default();
        assert_eq!(rules.kind_of(19.99, 10), ShotKind::Putt);
        assert_eq!(rules.kind_of(20.0, 10), ShotKind::Full);
        assert_eq!(rules.kind_of(210.0, 10), ShotKind::Full);
        assert_eq!(rules.kind_of(210.01, 10), ShotKind::Void);
    }

    #[test]
    fn test_precise_full_shot_rolls_past_landing() {
        let course = square_course(Position::new(95.0, 95.0));
        let from = Position::new(10.0, 50.0);
        let shot = simulate(
            ShotRequest::new(50.0, 0.0),
            u32::MAX,
            from,
            &course,
            &ShotRules::default(),
            &mut rng(),
        );

        assert_eq!(shot.kind, ShotKind::Full);
        assert!((shot.air.end.x - 60.0).abs() < 1e-3);
        assert!((shot.final_point.x - 65.0).abs() < 1e-3);
        assert!(shot.admissible);
        assert!(!shot.reached_target);
    }

    #[test]
    fn test_putt_has_no_air_phase() {
        let course = square_course(Position::new(95.0, 95.0));
        let from = Position::new(10.0, 50.0);
        let shot = simulate(
            ShotRequest::new(10.0, 0.0),
            u32::MAX,
            from,
            &course,
            &ShotRules::default(),
            &mut rng(),
        );

        assert_eq!(shot.kind, ShotKind::Putt);
        assert!(shot.air.is_degenerate());
        assert_eq!(shot.roll.start, from);
        assert!((shot.final_point.x - 20.0).abs() < 1e-3);
    }

    #[test]
    fn test_void_shot_does_not_move() {
        let course = square_course(Position::new(95.0, 95.0));
        let from = Position::new(10.0, 50.0);
        let shot = simulate(
            ShotRequest::new(500.0, 0.0),
            10,
            from,
            &course,
            &ShotRules::default(),
            &mut rng(),
        );

        assert_eq!(shot.kind, ShotKind::Void);
        assert_eq!(shot.final_point, from);
        assert!(shot.admissible);
        assert!(!shot.reached_target);
    }

    #[test]
    fn test_capture_snaps_to_target_projection() {
        let target = Position::new(50.0, 50.0);
        let course = square_course(target);
        let from = Position::new(40.0, 50.0);
        let shot = simulate(
            ShotRequest::new(15.0, 0.0),
            u32::MAX,
            from,
            &course,
            &ShotRules::default(),
            &mut rng(),
        );

        assert!(shot.reached_target);
        assert!(shot.final_point.distance(&target) < 1e-3);
        assert_eq!(shot.roll.end, shot.final_point);
    }

    #[test]
    fn test_shot_leaving_course_is_inadmissible() {
        let target = Position::new(95.0, 50.0);
        let course = square_course(target);
        let from = Position::new(80.0, 10.0);
        // Rolls out through the bottom edge
        let shot = simulate(
            ShotRequest::new(30.0, -std::f64::consts::FRAC_PI_2),
            u32::MAX,
            from,
            &course,
            &ShotRules::default(),
            &mut rng(),
        );

        assert!(!shot.admissible);
        assert!(!shot.reached_target);
    }

    #[test]
    fn test_capture_snap_keeps_roll_inside() {
        // Target on the boundary: the unsnapped roll would leave the course
        let target = Position::new(100.0, 50.0);
        let course = square_course(target);
        let from = Position::new(85.0, 50.0);
        let shot = simulate(
            ShotRequest::new(19.0, 0.0),
            u32::MAX,
            from,
            &course,
            &ShotRules::default(),
            &mut rng(),
        );

        assert!(shot.admissible);
        assert!(shot.reached_target);
        assert!((shot.final_point.x - 100.0).abs() < 1e-3);
    }

    #[test]
    fn test_same_seed_same_shot() {
        let course = square_course(Position::new(95.0, 95.0));
        let from = Position::new(10.0, 10.0);
        let rules = ShotRules::default();
        let a = simulate(ShotRequest::new(80.0, 0.7), 20, from, &course, &rules, &mut rng());
        let b = simulate(ShotRequest::new(80.0, 0.7), 20, from, &course, &rules, &mut rng());
        assert_eq!(a.actual_distance, b.actual_distance);
        assert_eq!(a.actual_angle, b.actual_angle);
        assert_eq!(a.final_point, b.final_point);
    }

    #[test]
    fn test_zero_spread_returns_mean_and_keeps_stream_aligned() {
        let mut a = rng();
        let mut b = rng();
        assert_eq!(sample_normal(&mut a, 5.0, 0.0), 5.0);
        let _ = sample_normal(&mut b, 5.0, 2.0);
        assert_eq!(a.gen::<u64>(), b.gen::<u64>());
    }
}
