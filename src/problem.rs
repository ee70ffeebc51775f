use crate::{
    output,
    settings::Settings,
    state::InputState,
    trace::{self, TraceResult},
};

#[cfg(test)]
mod tests {

    use super::*;
    use crate::geom::TrainGeometry;
    use crate::state::Limits;
    use crate::variant::{Variant, VariantConfig};

    fn settings(variant: Variant) -> Settings {
        Settings {
            variant: VariantConfig::new(variant),
            train: TrainGeometry::default(),
            tilt_deg: 0.0,
            source_offset: 0.0,
            auto_align: false,
            tilt_limits: Limits {
                min: -8.0,
                max: 8.0,
            },
            offset_limits: Limits {
                min: -23.1,
                max: 23.1,
            },
            sweep_steps: None,
        }
    }

    #[test]
    fn tilt_event_retraces_with_coupling() {
        let mut settings = settings(Variant::SensorDirect);
        settings.auto_align = true;
        let mut problem = Problem::new(settings);

        problem.set_tilt(1.0);
        let result = problem.result.as_ref().unwrap();
        // the solved offset nulls the return spot
        assert!(result.focus_height.abs() < 1e-3);
        assert!(result.aperture_hit);
    }

    #[test]
    fn offset_event_solves_tilt() {
        let mut settings = settings(Variant::Source);
        settings.auto_align = true;
        let mut problem = Problem::new(settings);

        problem.set_offset(10.0);
        let result = problem.result.as_ref().unwrap();
        assert!(result.focus_height.abs() < 1e-3);
        assert!(problem.input.tilt_deg != 0.0);
    }

    #[test]
    fn offset_event_survives_tilt_saturation() {
        let mut settings = settings(Variant::SensorDirect);
        settings.auto_align = true;
        settings.tilt_limits = Limits {
            min: -1.0,
            max: 1.0,
        };
        let mut problem = Problem::new(settings);

        // the solving tilt (about -1.73 deg) clamps to the range edge; the
        // offset the user set must not be re-derived from the clamped tilt
        problem.set_offset(23.0);
        assert_eq!(problem.input.tilt_deg, -1.0);
        assert_eq!(problem.input.source_offset, 23.0);
        // with the tilt saturated the spot cannot be nulled
        assert!(!problem.result.as_ref().unwrap().aperture_hit);
    }

    #[test]
    fn events_clamp_to_control_limits() {
        let mut problem = Problem::new(settings(Variant::SensorCentered));
        problem.set_tilt(45.0);
        assert_eq!(problem.input.tilt_deg, 8.0);
        problem.set_offset(-100.0);
        assert_eq!(problem.input.source_offset, -23.1);
    }

    #[test]
    fn baseline_variant_ignores_the_source_control() {
        let mut problem = Problem::new(settings(Variant::Eyepiece));
        problem.set_offset(15.0);
        assert_eq!(problem.input.source_offset, 0.0);
    }

    #[test]
    fn reset_recenters_both_controls() {
        let mut problem = Problem::new(settings(Variant::Source));
        problem.set_tilt(3.0);
        problem.set_offset(-5.0);
        problem.reset();
        assert_eq!(problem.input.tilt_deg, 0.0);
        assert_eq!(problem.input.source_offset, 0.0);
        assert!(problem.result.as_ref().unwrap().aperture_hit);
    }
}

/// A single autocollimator trace: one variant, one train, one input state.
///
/// Control flow follows the interactive viewer: an input event updates one
/// control, optionally overwrites the other through the auto-align solver,
/// and retraces. Everything is synchronous call-and-return, so the stored
/// result always belongs to the most recently applied input.
#[derive(Debug, Clone)]
pub struct Problem {
    pub settings: Settings,
    pub input: InputState,
    pub result: Option<TraceResult>,
}

impl Problem {
    /// Builds the problem from the configured inputs. The configured tilt is
    /// treated as the most recently touched control, so a batch run with
    /// auto-align enabled solves the offset once here.
    pub fn new(settings: Settings) -> Self {
        let align_length = settings.variant.align_scale().length(&settings.train);
        let input = settings
            .input()
            .update_from_tilt(align_length, &settings.offset_limits);
        Self {
            settings,
            input,
            result: None,
        }
    }

    /// Recenters both controls and retraces.
    pub fn reset(&mut self) {
        self.input.tilt_deg = 0.0;
        self.input.source_offset = 0.0;
        self.solve();
    }

    /// The tilt control changed: clamp, couple, retrace.
    pub fn set_tilt(&mut self, tilt_deg: f32) {
        self.input.tilt_deg = self.settings.tilt_limits.clamp(tilt_deg);
        self.input = self
            .input
            .update_from_tilt(self.align_length(), &self.settings.offset_limits);
        self.solve();
    }

    /// The source control changed: clamp, couple, retrace. Ignored for
    /// variants without a source control.
    pub fn set_offset(&mut self, source_offset: f32) {
        if !self.settings.variant.scheme.has_source_control() {
            self.solve();
            return;
        }
        self.input.source_offset = self.settings.offset_limits.clamp(source_offset);
        self.input = self
            .input
            .update_from_source(self.align_length(), &self.settings.tilt_limits);
        self.solve();
    }

    /// Toggling auto-align re-solves from the tilt control, so enabling it
    /// immediately nulls the spot for the current tilt.
    pub fn set_auto_align(&mut self, auto_align: bool) {
        self.input.auto_align = auto_align;
        self.input = self
            .input
            .update_from_tilt(self.align_length(), &self.settings.offset_limits);
        self.solve();
    }

    /// Traces the current input. Coupling belongs to the event entry points:
    /// each applies its own direction of the solver exactly once, so solving
    /// never overwrites a control the user just set.
    pub fn solve(&mut self) {
        self.result = Some(trace::trace(
            self.input.tilt_deg,
            self.input.source_offset,
            &self.settings.train,
            self.settings.variant.scheme.ray_path(),
        ));
    }

    fn align_length(&self) -> f32 {
        self.settings.variant.align_scale().length(&self.settings.train)
    }

    /// Prints a summary and writes the trace record to `trace.json`.
    pub fn writeup(&self) {
        let result = self
            .result
            .as_ref()
            .expect("writeup called before solve");
        println!("{}", self.settings);
        println!(
            "focus height: {:+.4}  aperture: {}",
            result.focus_height,
            if result.aperture_hit { "HIT" } else { "MISS" }
        );
        output::write_trace_json("trace.json", &self.settings, &self.input, result)
            .expect("Failed to write trace record");
    }
}
