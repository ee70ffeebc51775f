use serde::Deserialize;

use crate::align::AlignScale;
use crate::trace::RayPath;


/// The documented optical configurations. One parameterized tracer serves all
/// of them; a variant only fixes which ray path is traced, which alignment
/// constant the coupling uses, and whether the source control participates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, clap::ValueEnum)]
pub enum Variant {
    /// Baseline eyepiece diagram: tilt control only, marginal-ray pair.
    Eyepiece,
    /// Eyepiece diagram with a movable source point.
    Source,
    /// Sensor diagram, outgoing chief ray forced to the mirror center.
    SensorCentered,
    /// Sensor diagram, outgoing angle taken from the thin-lens relation.
    SensorDirect,
}

impl Variant {
    pub fn ray_path(&self) -> RayPath {
        match self {
            Variant::Eyepiece | Variant::Source => RayPath::Eyepiece,
            Variant::SensorCentered => RayPath::SensorCentered,
            Variant::SensorDirect => RayPath::SensorDirect,
        }
    }

    /// Default alignment constant for the variant. The forced-center sensor
    /// diagram couples through the mirror pivot and therefore scales by the
    /// objective-mirror gap; the others null the thin-lens relation directly.
    pub fn align_scale(&self) -> AlignScale {
        match self {
            Variant::SensorCentered => AlignScale::ObjectiveToMirror,
            _ => AlignScale::FocalLength,
        }
    }

    /// The baseline diagram has no source slider; its offset is pinned to 0.
    pub fn has_source_control(&self) -> bool {
        !matches!(self, Variant::Eyepiece)
    }
}

/// Variant selection as it appears in the configuration file, with an
/// optional override of the alignment constant so a configuration can pick
/// either convention without forking the tracer.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct VariantConfig {
    pub scheme: Variant,
    pub align: Option<AlignScale>,
}

impl VariantConfig {
    pub fn new(scheme: Variant) -> Self {
        Self {
            scheme,
            align: None,
        }
    }

    pub fn align_scale(&self) -> AlignScale {
        self.align.unwrap_or_else(|| self.scheme.align_scale())
    }
}
