//! Thin-lens ray tracing through the autocollimator train.
//!
//! This module maps a mirror tilt angle and a lateral source offset onto the
//! polyline of ray segments the beam follows through the optical train, the
//! signed height of the focused return spot at the focal plane, and whether
//! that spot clears the aperture gap.
//!
//! The tracer provides:
//! - A full two-marginal-ray path for the eyepiece configurations
//! - A single chief-ray path for the sensor configurations
//! - Two selectable outgoing-ray conventions for the sensor path
//! - Inclusive aperture gating with early path truncation on a miss
//!
//! # Conventions
//!
//! All angles are handled in radians internally; tilt angles arrive in
//! degrees and are converted at the entry point. A mirror tilted by `alpha`
//! deflects the reflected ray by `2 * alpha` relative to the incoming ray,
//! and a thin lens focuses a collimated beam arriving at angle `theta` to a
//! transverse height `f * tan(theta)` at its focal plane.

use serde::{Deserialize, Serialize};

use crate::geom::{Point, TrainGeometry};

#[cfg(test)]
mod tests {

    use super::*;

    fn train() -> TrainGeometry {
        TrainGeometry::default()
    }

    #[test]
    fn on_axis_untilted_is_aligned() {
        for path in [RayPath::Eyepiece, RayPath::SensorCentered, RayPath::SensorDirect] {
            let result = trace(0.0, 0.0, &train(), path);
            assert_eq!(result.focus_height, 0.0, "path: {:?}", path);
            assert!(result.aperture_hit, "path: {:?}", path);
        }
    }

    #[test]
    fn five_degree_tilt_misses_aperture() {
        // f = 380, reflected angle = 10 deg, focus = 380 * tan(10 deg)
        let expected = 380.0 * (10.0_f32).to_radians().tan();
        let result = trace(5.0, 0.0, &train(), RayPath::SensorDirect);
        assert!((result.focus_height - expected).abs() < 1e-3);
        assert!(!result.aperture_hit);
    }

    #[test]
    fn sensor_sub_modes_agree_on_axis() {
        let centered = trace(2.0, 0.0, &train(), RayPath::SensorCentered);
        let direct = trace(2.0, 0.0, &train(), RayPath::SensorDirect);
        assert_eq!(centered.focus_height, direct.focus_height);
    }

    #[test]
    fn sensor_sub_modes_differ_off_axis() {
        let centered = trace(1.0, 10.0, &train(), RayPath::SensorCentered);
        let direct = trace(1.0, 10.0, &train(), RayPath::SensorDirect);
        assert!((centered.focus_height - direct.focus_height).abs() > 1e-3);
    }

    #[test]
    fn miss_truncates_at_focal_plane() {
        let train = train();
        let result = trace(5.0, 0.0, &train, RayPath::SensorDirect);
        assert!(!result.aperture_hit);
        let last = result.segments.last().unwrap();
        assert_eq!(last.to.x, train.focal_plane);
    }

    #[test]
    fn hit_continues_to_sensor() {
        let train = train();
        let result = trace(0.0, 0.0, &train, RayPath::SensorCentered);
        assert!(result.aperture_hit);
        let last = result.segments.last().unwrap();
        assert_eq!(last.to.x, train.sensor);
    }

    #[test]
    fn eyepiece_path_always_reaches_the_eye() {
        let train = train();
        // far out of alignment, but the eyepiece diagram never truncates
        let result = trace(5.0, 0.0, &train, RayPath::Eyepiece);
        assert!(!result.aperture_hit);
        let last = result.segments.last().unwrap();
        assert_eq!(last.to.x, train.sensor);
        assert_eq!(result.segments.len(), 14);
    }

    #[test]
    fn off_axis_source_shifts_the_eyepiece_focus() {
        let train = train();
        let tilt: f32 = 1.0;
        let offset: f32 = 10.0;
        let result = trace(tilt, offset, &train, RayPath::Eyepiece);
        // thin lens: f * tan(2a - atan(-x / f))
        let incoming = (-offset / train.focal_length()).atan();
        let expected = train.focal_length() * (2.0 * tilt.to_radians() - incoming).tan();
        assert!((result.focus_height - expected).abs() < 1e-3);
        // both return rays converge on the same spot at the focal plane
        for segment in &result.segments[8..10] {
            assert_eq!(segment.to.x, train.focal_plane);
            assert!((segment.to.y - expected).abs() < 1e-3);
        }
    }

    #[test]
    fn beamsplitter_hit_lies_on_the_fold_line() {
        let train = train();
        let result = trace(0.0, 10.0, &train, RayPath::Eyepiece);
        // lower marginal ray: (300, 10) toward (680, -35) meets y = x - 450
        // at t = 160/425, hand-solved
        let hit = result.segments[0].to;
        assert!((hit.x - 443.0588).abs() < 1e-3);
        assert!((hit.y + 6.9412).abs() < 1e-3);
        assert!((hit.y - (hit.x - train.beamsplitter)).abs() < 1e-3);
    }

    #[test]
    fn focus_height_monotone_in_tilt() {
        let train = train();
        let mut previous = f32::NEG_INFINITY;
        for tilt in [-2.0, -1.0, -0.5, 0.0, 0.5, 1.0, 2.0] {
            let result = trace(tilt, 5.0, &train, RayPath::SensorDirect);
            assert!(result.focus_height > previous, "tilt: {}", tilt);
            previous = result.focus_height;
        }
    }

    #[test]
    fn aperture_boundary_is_inclusive() {
        assert!(passes_aperture(1.0, 1.0));
        assert!(passes_aperture(-1.0, 1.0));
        assert!(!passes_aperture(1.0 + 1e-4, 1.0));
        assert!(!passes_aperture(-1.0 - 1e-4, 1.0));
    }

    #[test]
    fn legs_are_split_at_the_mirror() {
        let result = trace(0.5, 3.0, &train(), RayPath::SensorDirect);
        let outgoing = result
            .segments
            .iter()
            .take_while(|s| s.leg == Leg::Outgoing)
            .count();
        assert_eq!(outgoing, 3);
        assert!(result.segments[outgoing..]
            .iter()
            .all(|s| s.leg == Leg::Return));
    }
}

/// Which half of the round trip a segment belongs to. The renderer colors
/// outgoing segments white and return segments green.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Leg {
    Outgoing,
    Return,
}

/// A straight piece of the traced beam in train coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct RaySegment {
    pub from: Point,
    pub to: Point,
    pub leg: Leg,
}

impl RaySegment {
    fn new(x0: f32, y0: f32, x1: f32, y1: f32, leg: Leg) -> Self {
        Self {
            from: Point::new(x0, y0),
            to: Point::new(x1, y1),
            leg,
        }
    }
}

/// Outcome of a single trace. Purely derived from the inputs; recomputed from
/// scratch on every call.
#[derive(Debug, Clone, PartialEq)]
pub struct TraceResult {
    pub segments: Vec<RaySegment>,
    /// True iff the focused return spot clears the aperture gap (inclusive).
    pub aperture_hit: bool,
    /// Signed transverse height of the focused return spot at the focal plane.
    pub focus_height: f32,
}

/// Selects which lens-train path is simulated.
///
/// The two sensor sub-modes encode different simplifying assumptions about
/// where the outgoing chief ray crosses the objective-mirror gap and are
/// deliberately kept separate:
/// - `SensorCentered` pivots the outgoing ray at the objective so that it
///   strikes the geometric center of the mirror.
/// - `SensorDirect` derives the outgoing angle from the source offset via the
///   thin-lens relation, measuring the mirror hit height from the objective
///   center.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RayPath {
    Eyepiece,
    SensorCentered,
    SensorDirect,
}

/// Whether a focused spot at the given signed height clears the aperture.
/// The boundary is inclusive: a spot landing exactly on the gap edge passes.
pub fn passes_aperture(focus_height: f32, aperture_half_gap: f32) -> bool {
    focus_height.abs() <= aperture_half_gap
}

/// Traces the beam through the train for the given mirror tilt (degrees) and
/// lateral source offset (train units). Pure and total over the UI-clamped
/// input range; the only "failure" outcome is an aperture miss, reported as a
/// first-class flag rather than an error.
pub fn trace(
    tilt_deg: f32,
    source_offset: f32,
    train: &TrainGeometry,
    path: RayPath,
) -> TraceResult {
    let tilt_rad = tilt_deg.to_radians();
    match path {
        RayPath::Eyepiece => trace_eyepiece(tilt_rad, source_offset, train),
        RayPath::SensorCentered => trace_sensor(tilt_rad, source_offset, train, path),
        RayPath::SensorDirect => trace_sensor(tilt_rad, source_offset, train, path),
    }
}

/// Full eyepiece train: two marginal rays spanning the objective aperture,
/// focused back through the reticle and expanded into the eye pupil. The
/// diagram always shows the complete path; the aperture flag is still
/// reported so callers can display the alignment state.
fn trace_eyepiece(tilt_rad: f32, source_offset: f32, train: &TrainGeometry) -> TraceResult {
    let focal_length = train.focal_length();
    let obj_to_mirror = train.objective_to_mirror();

    // A lateral source shift x displaces the virtual source at the focal
    // plane by x, so the collimated beam leaves the objective at
    // atan(-x / f) relative to the axis.
    let ray_angle = (-source_offset / focal_length).atan();
    let reflected = 2.0 * tilt_rad - ray_angle;

    let source = Point::new(train.beamsplitter + source_offset, -train.source_arm);
    let virtual_source = Point::new(train.focal_plane, source_offset);

    let margins = [-train.beam_half_width, train.beam_half_width];
    let mut segments = Vec::with_capacity(14);

    // Outgoing: source -> beamsplitter -> objective, one pair of segments per
    // marginal ray.
    let hits: Vec<Point> = margins
        .iter()
        .map(|&m| beamsplitter_intersection(&virtual_source, train.objective, m, train))
        .collect();
    for hit in &hits {
        segments.push(RaySegment::new(
            source.x,
            source.y,
            hit.x,
            hit.y,
            Leg::Outgoing,
        ));
    }
    for (hit, &m) in hits.iter().zip(margins.iter()) {
        segments.push(RaySegment::new(
            hit.x,
            hit.y,
            train.objective,
            m,
            Leg::Outgoing,
        ));
    }

    // Objective -> mirror: the beam is collimated, tilted by ray_angle when
    // the source sits off axis.
    let mirror_heights: Vec<f32> = margins
        .iter()
        .map(|&m| m + obj_to_mirror * ray_angle.tan())
        .collect();
    for (&m, &mh) in margins.iter().zip(mirror_heights.iter()) {
        segments.push(RaySegment::new(
            train.objective,
            m,
            train.mirror,
            mh,
            Leg::Outgoing,
        ));
    }

    // Return: mirror -> objective, still parallel but deflected by twice the
    // tilt, then focused to a single spot at the focal plane.
    let focus_height = focal_length * reflected.tan();
    let return_heights: Vec<f32> = mirror_heights
        .iter()
        .map(|&mh| mh + (train.objective - train.mirror) * reflected.tan())
        .collect();
    for (&mh, &rh) in mirror_heights.iter().zip(return_heights.iter()) {
        segments.push(RaySegment::new(
            train.mirror,
            mh,
            train.objective,
            rh,
            Leg::Return,
        ));
    }
    for &rh in &return_heights {
        segments.push(RaySegment::new(
            train.objective,
            rh,
            train.focal_plane,
            focus_height,
            Leg::Return,
        ));
    }

    // Through the focus and out to the eyepiece along the same slopes.
    let eyepiece_heights: Vec<f32> = return_heights
        .iter()
        .map(|&rh| {
            let slope = (focus_height - rh) / (train.focal_plane - train.objective);
            focus_height + slope * (train.eyepiece - train.focal_plane)
        })
        .collect();
    for &eh in &eyepiece_heights {
        segments.push(RaySegment::new(
            train.focal_plane,
            focus_height,
            train.eyepiece,
            eh,
            Leg::Return,
        ));
    }

    // The eyepiece collimates the beam into the pupil at a fixed spread; the
    // ray pair crosses over at the intermediate focus.
    let pupils = [train.pupil_half_width, -train.pupil_half_width];
    for (&eh, &p) in eyepiece_heights.iter().zip(pupils.iter()) {
        segments.push(RaySegment::new(
            train.eyepiece,
            eh,
            train.sensor,
            p,
            Leg::Return,
        ));
    }

    TraceResult {
        segments,
        aperture_hit: passes_aperture(focus_height, train.aperture_half_gap),
        focus_height,
    }
}

/// Chief-ray sensor train: a single ray from the movable display pixel,
/// folded by the beamsplitter, bounced off the mirror and focused onto the
/// aperture. On a miss the path is truncated at the focal plane; on a hit it
/// continues at constant slope through the eyepiece to the sensor.
fn trace_sensor(
    tilt_rad: f32,
    source_offset: f32,
    train: &TrainGeometry,
    path: RayPath,
) -> TraceResult {
    let focal_length = train.focal_length();
    let obj_to_mirror = train.objective_to_mirror();

    // The display pixel drops straight onto the 45-degree beamsplitter, which
    // folds the ray onto the axis at transverse height equal to the offset.
    let pixel_x = train.beamsplitter + source_offset;
    let bs_height = source_offset;

    let (incoming, mirror_hit) = match path {
        // Pivot at the objective so the outgoing ray strikes the mirror
        // center regardless of the offset.
        RayPath::SensorCentered => ((-source_offset / obj_to_mirror).atan(), 0.0),
        // Thin-lens relation: the lens bends the ray by atan(-x / f); the
        // mirror hit height is measured from the objective center.
        RayPath::SensorDirect => {
            let angle = (-source_offset / focal_length).atan();
            (angle, obj_to_mirror * angle.tan())
        }
        RayPath::Eyepiece => unreachable!("eyepiece path has its own tracer"),
    };

    let reflected = 2.0 * tilt_rad - incoming;
    let return_height = mirror_hit + (train.objective - train.mirror) * reflected.tan();
    let focus_height = focal_length * reflected.tan();
    let aperture_hit = passes_aperture(focus_height, train.aperture_half_gap);

    let mut segments = vec![
        RaySegment::new(pixel_x, -train.source_arm, pixel_x, bs_height, Leg::Outgoing),
        RaySegment::new(pixel_x, bs_height, train.objective, bs_height, Leg::Outgoing),
        RaySegment::new(
            train.objective,
            bs_height,
            train.mirror,
            mirror_hit,
            Leg::Outgoing,
        ),
        RaySegment::new(
            train.mirror,
            mirror_hit,
            train.objective,
            return_height,
            Leg::Return,
        ),
        RaySegment::new(
            train.objective,
            return_height,
            train.focal_plane,
            focus_height,
            Leg::Return,
        ),
    ];

    if aperture_hit {
        let slope = (focus_height - return_height) / (train.focal_plane - train.objective);
        let eyepiece_height = focus_height + slope * (train.eyepiece - train.focal_plane);
        let sensor_height = eyepiece_height + slope * (train.sensor - train.eyepiece);
        segments.push(RaySegment::new(
            train.focal_plane,
            focus_height,
            train.eyepiece,
            eyepiece_height,
            Leg::Return,
        ));
        segments.push(RaySegment::new(
            train.eyepiece,
            eyepiece_height,
            train.sensor,
            sensor_height,
            Leg::Return,
        ));
    }

    TraceResult {
        segments,
        aperture_hit,
        focus_height,
    }
}

/// Intersection of the ray from the virtual source toward a point on the
/// objective with the 45-degree beamsplitter line `y = x - beamsplitter`.
fn beamsplitter_intersection(
    virtual_source: &Point,
    target_x: f32,
    target_y: f32,
    train: &TrainGeometry,
) -> Point {
    let dx = target_x - virtual_source.x;
    let dy = target_y - virtual_source.y;

    // Parallel to the splitter; cannot happen for rays aimed at the
    // objective, but fall back to the splitter center rather than divide.
    if (dy - dx).abs() < 1e-3 {
        return Point::new(train.beamsplitter, 0.0);
    }

    let t = (virtual_source.x - train.beamsplitter - virtual_source.y) / (dy - dx);
    Point::new(virtual_source.x + t * dx, virtual_source.y + t * dy)
}
