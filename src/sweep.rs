//! Tilt-range sweeps and alignment-window extraction.
//!
//! This module samples the full travel of the tilt control and traces each
//! sample, characterizing how the focused return spot walks across the
//! aperture as the mirror rotates. It provides parallel computation,
//! progress tracking, and post-processing of the sampled grid.
//!
//! The sweep system provides:
//! - Parallel per-sample tracing with rayon
//! - Progress tracking for fine-grained sweeps
//! - Auto-align coupling applied per sample (including clamp saturation)
//! - Extraction of contiguous aperture-hit windows
//! - A whitespace-separated `focus_scan` output file

use std::time::Instant;

use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use itertools::Itertools;
use ndarray::Array1;
use rayon::prelude::*;

use crate::{
    output::{self, ScanRow},
    settings::{Settings, DEFAULT_SWEEP_STEPS},
    trace,
};


/// A tilt sweep across the configured control range.
///
/// **Context**: A single trace answers one "what does the diagram show now"
/// question. Characterizing a variant needs the whole travel of the tilt
/// control: where the return spot clears the aperture, and how far the
/// auto-align coupling can keep it nulled before the offset control
/// saturates.
///
/// **How it Works**: Samples the tilt limits on a uniform grid, applies the
/// per-sample coupling exactly as an interactive tilt event would, and traces
/// every sample in parallel. Post-processing groups adjacent samples by their
/// hit flag to report contiguous alignment windows.
#[derive(Debug)]
pub struct Sweep {
    pub settings: Settings,
    pub tilts: Array1<f32>,
    pub rows: Vec<ScanRow>,
}

impl Sweep {
    pub fn new(settings: Settings) -> Self {
        let steps = settings.sweep_steps.unwrap_or(DEFAULT_SWEEP_STEPS);
        let tilts = Array1::linspace(
            settings.tilt_limits.min,
            settings.tilt_limits.max,
            steps,
        );
        Self {
            settings,
            tilts,
            rows: Vec::new(),
        }
    }

    /// Traces every sample of the grid in parallel with a progress bar.
    pub fn solve(&mut self) {
        let start = Instant::now();
        println!("Sweeping tilt range...");

        let m = MultiProgress::new();
        let n = self.tilts.len();
        let pb = m.add(ProgressBar::new(n as u64));
        pb.set_style(
            ProgressStyle::with_template(
            "{spinner:.green} [{elapsed_precise}] {bar:40.green/blue} {pos:>5}/{len:5} {msg} ETA: {eta_precise}",
            )
            .unwrap()
            .progress_chars("█▇▆▅▄▃▂▁")
        );
        pb.set_message("tilt sample".to_string());

        let settings = &self.settings;
        let align_length = settings.variant.align_scale().length(&settings.train);
        let base_input = settings.input();

        self.rows = self
            .tilts
            .to_vec()
            .par_iter()
            .map(|&tilt_deg| {
                let mut input = base_input;
                input.tilt_deg = tilt_deg;
                let input = input.update_from_tilt(align_length, &settings.offset_limits);
                let result = trace::trace(
                    input.tilt_deg,
                    input.source_offset,
                    &settings.train,
                    settings.variant.scheme.ray_path(),
                );
                pb.inc(1);
                ScanRow {
                    tilt_deg: input.tilt_deg,
                    source_offset: input.source_offset,
                    focus_height: result.focus_height,
                    aperture_hit: result.aperture_hit,
                }
            })
            .collect();

        pb.finish_with_message("done");
        println!("Sweep finished in {:.2?}", start.elapsed());
    }

    /// Contiguous tilt intervals over which the return beam clears the
    /// aperture, as `(first, last)` sample tilts per interval.
    pub fn hit_windows(&self) -> Vec<(f32, f32)> {
        let groups = self.rows.iter().chunk_by(|row| row.aperture_hit);
        groups
            .into_iter()
            .filter(|(hit, _)| *hit)
            .map(|(_, group)| {
                let tilts: Vec<f32> = group.map(|row| row.tilt_deg).collect();
                (tilts[0], *tilts.last().unwrap())
            })
            .collect()
    }

    /// Writes the `focus_scan` file and prints the alignment windows.
    pub fn writeup(&self) {
        output::write_focus_scan("focus_scan", &self.rows).expect("Failed to write focus scan");

        let windows = self.hit_windows();
        if windows.is_empty() {
            println!("No aperture hits across the tilt range.");
        } else {
            for (lo, hi) in windows {
                println!("Aperture hit window: [{:.3}, {:.3}] deg", lo, hi);
            }
        }
    }
}
