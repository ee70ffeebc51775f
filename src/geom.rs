use anyhow::{anyhow, Result};
use nalgebra::Point2;
use serde::Deserialize;


/// A point in train coordinates: `x` is the axial position along the optical
/// axis, `y` the transverse displacement from the centerline.
pub type Point = Point2<f32>;

/// Fixed axial layout of the optical train plus its transverse constants.
///
/// **Context**: Every autocollimator variant shares the same bench: a sensor
/// (or eye), an eyepiece, a focal plane carrying the reticle or aperture, a
/// beamsplitter folding in the source arm, an objective, and the mirror under
/// test. Variants differ only in which ray path is traced through this train,
/// so the layout is plain data rather than per-variant code.
///
/// **How it Works**: Positions are 1D coordinates along the optical axis and
/// must be strictly increasing in the physical ordering. The objective focal
/// length and the objective-mirror gap fall out as differences and are
/// guaranteed positive once `validate` has passed. The transverse centerline
/// is `y = 0`; positive `y` is the direction a positive source offset pushes
/// the beamsplitter hit point.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TrainGeometry {
    pub sensor: f32,
    pub eyepiece: f32,
    pub focal_plane: f32,
    pub beamsplitter: f32,
    pub objective: f32,
    pub mirror: f32,
    /// Half-height of the aperture opening at the focal plane.
    pub aperture_half_gap: f32,
    /// Transverse distance of the source/display arm from the axis.
    pub source_arm: f32,
    /// Marginal-ray height at the objective (eyepiece configurations).
    pub beam_half_width: f32,
    /// Fixed ray spread where the beam enters the eye pupil.
    pub pupil_half_width: f32,
}

impl Default for TrainGeometry {
    fn default() -> Self {
        Self {
            sensor: 100.0,
            eyepiece: 220.0,
            focal_plane: 300.0,
            beamsplitter: 450.0,
            objective: 680.0,
            mirror: 900.0,
            aperture_half_gap: 1.0,
            source_arm: 150.0,
            beam_half_width: 35.0,
            pupil_half_width: 7.0,
        }
    }
}

impl TrainGeometry {
    /// Focal length of the objective, set by the focal-plane spacing.
    pub fn focal_length(&self) -> f32 {
        self.objective - self.focal_plane
    }

    /// Axial gap between the objective and the mirror under test.
    pub fn objective_to_mirror(&self) -> f32 {
        self.mirror - self.objective
    }

    /// Checks the physical ordering of the train before any tracing happens.
    /// Configuration mistakes are rejected here with a descriptive error so
    /// the tracer itself never has to guard a division.
    pub fn validate(&self) -> Result<()> {
        let positions = [
            ("sensor", self.sensor),
            ("eyepiece", self.eyepiece),
            ("focal_plane", self.focal_plane),
            ("beamsplitter", self.beamsplitter),
            ("objective", self.objective),
            ("mirror", self.mirror),
        ];
        for pair in positions.windows(2) {
            let (name_a, a) = pair[0];
            let (name_b, b) = pair[1];
            if a >= b {
                return Err(anyhow!(
                    "optical train out of order: {} ({}) must sit before {} ({})",
                    name_a,
                    a,
                    name_b,
                    b
                ));
            }
        }
        if self.aperture_half_gap <= 0.0 {
            return Err(anyhow!(
                "aperture half gap must be positive, got {}",
                self.aperture_half_gap
            ));
        }
        if self.source_arm <= 0.0 {
            return Err(anyhow!(
                "source arm distance must be positive, got {}",
                self.source_arm
            ));
        }
        Ok(())
    }
}
