//! Closed-form inverses for the auto-align coupling.
//!
//! When auto-align is enabled, changing one control recomputes the other so
//! the return ray is nulled at the focal plane. Setting the reflected angle
//! to zero in the forward model gives `incoming = 2 * tilt` at alignment, so
//! each direction of the coupling is a one-line inversion. Both functions are
//! stateless and idempotent; clamping to the target control's range is the
//! caller's job and lives with the input state.

use serde::Deserialize;

use crate::geom::TrainGeometry;


/// Scaling constant of the alignment inverse. The eyepiece-style variants
/// null the return spot through the thin-lens relation and use the focal
/// length; the forced-center sensor variant couples through the mirror pivot
/// and uses the objective-mirror gap instead. Kept selectable per variant
/// rather than silently unified.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum AlignScale {
    FocalLength,
    ObjectiveToMirror,
}

impl AlignScale {
    /// The train length this scale resolves to.
    pub fn length(&self, train: &TrainGeometry) -> f32 {
        match self {
            AlignScale::FocalLength => train.focal_length(),
            AlignScale::ObjectiveToMirror => train.objective_to_mirror(),
        }
    }
}

/// Source offset that nulls the return spot for the given mirror tilt:
/// `scale * tan(-2 * tilt)`.
pub fn offset_from_tilt(tilt_deg: f32, scale_length: f32) -> f32 {
    scale_length * (-2.0 * tilt_deg.to_radians()).tan()
}

/// Mirror tilt (degrees) that nulls the return spot for the given source
/// offset: `0.5 * atan(-offset / scale)`.
pub fn tilt_from_offset(source_offset: f32, scale_length: f32) -> f32 {
    (0.5 * (-source_offset / scale_length).atan()).to_degrees()
}
