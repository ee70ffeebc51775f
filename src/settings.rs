use anyhow::Result;
use clap::Parser;
use config::{Config, Environment, File};
use serde::Deserialize;
use std::env;
use std::fmt;

use crate::geom::TrainGeometry;
use crate::state::{InputState, Limits};
use crate::variant::{Variant, VariantConfig};

/// Canonical lateral travel of the source/display control, in train units.
pub const DEFAULT_OFFSET_LIMIT: f32 = 23.1;
/// Default mirror tilt control range in degrees.
pub const DEFAULT_TILT_LIMIT_DEG: f32 = 8.0;
/// Default number of samples for tilt sweeps.
pub const DEFAULT_SWEEP_STEPS: usize = 181;

/// Runtime configuration for the application.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct Settings {
    pub variant: VariantConfig,
    pub train: TrainGeometry,
    pub tilt_deg: f32,
    pub source_offset: f32,
    pub auto_align: bool,
    #[serde(default = "default_tilt_limits")]
    pub tilt_limits: Limits,
    #[serde(default = "default_offset_limits")]
    pub offset_limits: Limits,
    pub sweep_steps: Option<usize>,
}

fn default_tilt_limits() -> Limits {
    Limits {
        min: -DEFAULT_TILT_LIMIT_DEG,
        max: DEFAULT_TILT_LIMIT_DEG,
    }
}

fn default_offset_limits() -> Limits {
    Limits {
        min: -DEFAULT_OFFSET_LIMIT,
        max: DEFAULT_OFFSET_LIMIT,
    }
}

impl Settings {
    /// Initial input state, with the offset pinned to the axis for variants
    /// without a source control.
    pub fn input(&self) -> InputState {
        let source_offset = if self.variant.scheme.has_source_control() {
            self.offset_limits.clamp(self.source_offset)
        } else {
            0.0
        };
        InputState {
            tilt_deg: self.tilt_limits.clamp(self.tilt_deg),
            source_offset,
            auto_align: self.auto_align,
        }
    }
}

pub fn load_default_config() -> Result<Settings> {
    let root_dir = retrieve_project_root();
    let default_config_file = root_dir.join("config/default.toml");

    let settings: Config = Config::builder()
        .add_source(File::from(default_config_file).required(true))
        .build()
        .unwrap_or_else(|err| {
            eprintln!("Error loading configuration: {}", err);
            std::process::exit(1);
        });

    let config: Settings = settings.try_deserialize().unwrap_or_else(|err| {
        eprintln!("Error deserializing configuration: {}", err);
        std::process::exit(1);
    });

    validate_config(&config);

    Ok(config)
}

pub fn load_config() -> Result<Settings> {
    // Try to find the project directory in different ways
    let root_dir = retrieve_project_root();

    let default_config_file = root_dir.join("config/default.toml");
    let local_config = root_dir.join("config/local.toml");

    // Check if local config exists, if not use default
    let config_file = if local_config.exists() {
        println!("Using local configuration: {:?}", local_config);
        local_config
    } else {
        println!("Using default configuration: {:?}", default_config_file);
        default_config_file
    };

    let settings: Config = Config::builder()
        .add_source(File::from(config_file).required(true))
        .add_source(Environment::with_prefix("autocol"))
        .build()
        .unwrap_or_else(|err| {
            eprintln!("Error loading configuration: {}", err);
            std::process::exit(1);
        });

    let mut config: Settings = settings.try_deserialize().unwrap_or_else(|err| {
        eprintln!("Error deserializing configuration: {}", err);
        std::process::exit(1);
    });

    // Parse command-line arguments and override values
    let args = CliArgs::parse();

    if let Some(variant) = args.variant {
        config.variant = VariantConfig::new(variant);
    }
    if let Some(tilt) = args.tilt {
        config.tilt_deg = tilt;
    }
    if let Some(offset) = args.offset {
        config.source_offset = offset;
    }
    if let Some(auto_align) = args.auto_align {
        config.auto_align = auto_align;
    }
    if let Some(gap) = args.gap {
        config.train.aperture_half_gap = gap;
    }
    if args.sweep {
        config.sweep_steps = Some(args.steps.unwrap_or(DEFAULT_SWEEP_STEPS));
    }

    validate_config(&config);

    println!("{:#?}", config);

    Ok(config)
}

/// Retrieve the project root directory.
/// This function tries to find the project root directory in different ways:
/// 1. If the CARGO_MANIFEST_DIR environment variable is set, use it.
/// 2. If the AUTOCOL_ROOT_DIR environment variable is set, use it.
/// 3. If the "config" subdirectory is found in the executable directory or any of its parents, use it.
/// If none of these methods work, the function will panic.
fn retrieve_project_root() -> std::path::PathBuf {
    if let Ok(manifest_dir) = env::var("CARGO_MANIFEST_DIR") {
        // When running through cargo (e.g. cargo run, cargo test)
        std::path::PathBuf::from(manifest_dir)
    } else if let Ok(path) = env::var("AUTOCOL_ROOT_DIR") {
        // Allow explicit configuration via environment variable
        std::path::PathBuf::from(path)
    } else {
        // Fallback: try to find the nearest directory containing a "config" subdirectory
        // Start from the executable directory and walk upward
        let exe_path = env::current_exe().expect("Failed to get current executable path");
        let mut current_dir = exe_path
            .parent()
            .expect("Failed to get executable directory")
            .to_path_buf();
        let mut found = false;

        while !found && current_dir.parent().is_some() {
            if current_dir.join("config").is_dir() {
                found = true;
            } else {
                current_dir = current_dir.parent().unwrap().to_path_buf();
            }
        }

        if found {
            current_dir
        } else {
            panic!("Could not find project root directory");
        }
    }
}

fn validate_config(config: &Settings) {
    assert!(
        config.tilt_limits.min < config.tilt_limits.max,
        "Tilt limits must satisfy min < max"
    );
    assert!(
        config.offset_limits.min < config.offset_limits.max,
        "Offset limits must satisfy min < max"
    );
    if let Some(steps) = config.sweep_steps {
        assert!(steps >= 2, "A sweep needs at least two samples");
    }
    config.train.validate().unwrap_or_else(|err| {
        eprintln!("Invalid optical train: {}", err);
        std::process::exit(1);
    });
}

#[derive(Parser, Debug)]
#[command(version, about = "AUTOCOL - Autocollimator Ray Geometry Simulator")]
pub struct CliArgs {
    /// Optical variant to simulate.
    #[arg(short, long)]
    variant: Option<Variant>,

    /// Mirror tilt angle in degrees.
    #[arg(short, long)]
    tilt: Option<f32>,

    /// Lateral source/display offset in train units.
    #[arg(short, long)]
    offset: Option<f32>,

    /// Couple the two controls so the return spot stays nulled.
    /// Pass `true` or `false` to override the configured value.
    #[arg(short, long)]
    auto_align: Option<bool>,

    /// Override the aperture half gap at the focal plane.
    #[arg(long)]
    gap: Option<f32>,

    /// Sweep the tilt range instead of tracing a single configuration.
    #[arg(long)]
    sweep: bool,

    /// Number of tilt samples for the sweep.
    #[arg(long, requires = "sweep")]
    steps: Option<usize>,
}

impl fmt::Display for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Settings:
  - Variant: {:?}
  - Tilt: {:.3} deg in [{:.1}, {:.1}]
  - Source Offset: {:.3} in [{:.1}, {:.1}]
  - Auto Align: {}
  - Focal Length: {:.1}
  - Objective-Mirror Gap: {:.1}
  - Aperture Half Gap: {:.2}
  ",
            self.variant.scheme,
            self.tilt_deg,
            self.tilt_limits.min,
            self.tilt_limits.max,
            self.source_offset,
            self.offset_limits.min,
            self.offset_limits.max,
            self.auto_align,
            self.train.focal_length(),
            self.train.objective_to_mirror(),
            self.train.aperture_half_gap,
        )
    }
}
