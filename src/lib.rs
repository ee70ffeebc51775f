//! Autocollimator ray-geometry simulation.
//!
//! Maps a mirror tilt angle and a lateral source offset onto the thin-lens
//! ray path through a fixed optical train: the traced segments, the signed
//! focus height at the focal plane, and whether the return beam clears the
//! aperture. Closed-form auto-alignment couples the two controls. Four
//! documented bench variants share one parameterized tracer.

pub mod align;
pub mod geom;
#[cfg(feature = "macroquad")]
pub mod helpers;
pub mod output;
pub mod problem;
pub mod settings;
pub mod state;
pub mod sweep;
pub mod trace;
pub mod variant;
