//! User-facing input state and the auto-align coupling operations.
//!
//! The two bounded controls (mirror tilt, source offset) and the auto-align
//! flag are the only mutable state in the simulation. The UI layer owns the
//! mutation; the operations here are pure and return the updated state, so
//! the tracer never touches a control directly.

use serde::Deserialize;

use crate::align;

#[cfg(test)]
mod tests {

    use super::*;

    const FOCAL_LENGTH: f32 = 380.0;

    fn offset_limits() -> Limits {
        Limits {
            min: -23.1,
            max: 23.1,
        }
    }

    fn tilt_limits() -> Limits {
        Limits {
            min: -8.0,
            max: 8.0,
        }
    }

    #[test]
    fn clamp_saturates_without_wraparound() {
        let limits = offset_limits();
        assert_eq!(limits.clamp(-67.0), -23.1);
        assert_eq!(limits.clamp(67.0), 23.1);
        assert_eq!(limits.clamp(5.0), 5.0);
        assert_eq!(limits.clamp(-23.1), -23.1);
    }

    #[test]
    fn tilt_change_solves_offset_when_aligned() {
        let state = InputState {
            tilt_deg: 1.0,
            source_offset: 0.0,
            auto_align: true,
        };
        let updated = state.update_from_tilt(FOCAL_LENGTH, &offset_limits());
        let expected = align::offset_from_tilt(1.0, FOCAL_LENGTH);
        assert!((updated.source_offset - expected).abs() < 1e-4);
        assert_eq!(updated.tilt_deg, 1.0);
    }

    #[test]
    fn solved_offset_clamps_at_travel_limit() {
        let state = InputState {
            tilt_deg: 5.0,
            source_offset: 0.0,
            auto_align: true,
        };
        // theoretical solution is about -67, far beyond the slider travel
        let updated = state.update_from_tilt(FOCAL_LENGTH, &offset_limits());
        assert_eq!(updated.source_offset, -23.1);
    }

    #[test]
    fn offset_change_solves_tilt() {
        let state = InputState {
            tilt_deg: 0.0,
            source_offset: 10.0,
            auto_align: true,
        };
        let updated = state.update_from_source(FOCAL_LENGTH, &tilt_limits());
        let expected = align::tilt_from_offset(10.0, FOCAL_LENGTH);
        assert!((updated.tilt_deg - expected).abs() < 1e-4);
        assert_eq!(updated.source_offset, 10.0);
    }

    #[test]
    fn coupling_is_inert_when_disabled() {
        let state = InputState {
            tilt_deg: 3.0,
            source_offset: 7.0,
            auto_align: false,
        };
        assert_eq!(state.update_from_tilt(FOCAL_LENGTH, &offset_limits()), state);
        assert_eq!(state.update_from_source(FOCAL_LENGTH, &tilt_limits()), state);
    }

    #[test]
    fn coupling_is_idempotent() {
        let state = InputState {
            tilt_deg: 1.5,
            source_offset: 0.0,
            auto_align: true,
        };
        let once = state.update_from_tilt(FOCAL_LENGTH, &offset_limits());
        let twice = once.update_from_tilt(FOCAL_LENGTH, &offset_limits());
        assert_eq!(once, twice);
    }
}

/// Valid range of a bounded control. The clamp is a pure saturating clamp.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct Limits {
    pub min: f32,
    pub max: f32,
}

impl Limits {
    pub fn clamp(&self, value: f32) -> f32 {
        value.clamp(self.min, self.max)
    }
}

/// The two scalar controls plus the coupling flag. Mutated only by user input
/// or by the clamped solver output; never by the tracer.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct InputState {
    pub tilt_deg: f32,
    pub source_offset: f32,
    pub auto_align: bool,
}

impl InputState {
    /// The tilt control changed: when auto-align is on, overwrite the offset
    /// with the clamped solution that nulls the return spot.
    pub fn update_from_tilt(&self, scale_length: f32, offset_limits: &Limits) -> InputState {
        let mut state = *self;
        if state.auto_align {
            state.source_offset =
                offset_limits.clamp(align::offset_from_tilt(state.tilt_deg, scale_length));
        }
        state
    }

    /// The offset control changed: symmetric to [`Self::update_from_tilt`],
    /// overwriting the tilt.
    pub fn update_from_source(&self, scale_length: f32, tilt_limits: &Limits) -> InputState {
        let mut state = *self;
        if state.auto_align {
            state.tilt_deg =
                tilt_limits.clamp(align::tilt_from_offset(state.source_offset, scale_length));
        }
        state
    }
}
