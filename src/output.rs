use std::{fs::File, io::BufWriter, path::Path};

use anyhow::Result;
use chrono::Local;
use serde::Serialize;
use std::io::Write;

use crate::settings::Settings;
use crate::state::InputState;
use crate::trace::{Leg, TraceResult};

#[cfg(test)]
mod tests {

    use super::*;
    use crate::geom::TrainGeometry;
    use crate::trace::{self, RayPath};

    #[test]
    fn record_mirrors_the_trace() {
        let train = TrainGeometry::default();
        let result = trace::trace(0.0, 0.0, &train, RayPath::SensorDirect);
        let input = InputState {
            tilt_deg: 0.0,
            source_offset: 0.0,
            auto_align: false,
        };
        let record = TraceRecord::new(&input, &result);
        assert_eq!(record.segments.len(), result.segments.len());
        assert!(record.aperture_hit);
        assert_eq!(record.focus_height, 0.0);
    }

    #[test]
    fn focus_scan_rows_roundtrip_through_the_file() {
        let rows = vec![
            ScanRow {
                tilt_deg: -1.0,
                source_offset: 0.0,
                focus_height: -13.3,
                aperture_hit: false,
            },
            ScanRow {
                tilt_deg: 0.0,
                source_offset: 0.0,
                focus_height: 0.0,
                aperture_hit: true,
            },
        ];
        let path = std::env::temp_dir().join("autocol_focus_scan_test");
        write_focus_scan(&path, &rows).unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        let data_lines: Vec<&str> = contents
            .lines()
            .filter(|l| !l.starts_with('#') && !l.trim().is_empty())
            .collect();
        assert_eq!(data_lines.len(), rows.len());
        assert!(data_lines[1].ends_with('1'));
        std::fs::remove_file(&path).ok();
    }
}

/// Flat serializable form of a segment; keeps the output files free of any
/// linear-algebra type layout.
#[derive(Debug, Serialize)]
pub struct SegmentRecord {
    pub from: [f32; 2],
    pub to: [f32; 2],
    pub leg: Leg,
}

/// One trace as written to `trace.json`: the inputs that produced it plus
/// the derived geometry.
#[derive(Debug, Serialize)]
pub struct TraceRecord {
    pub tilt_deg: f32,
    pub source_offset: f32,
    pub auto_align: bool,
    pub focus_height: f32,
    pub aperture_hit: bool,
    pub segments: Vec<SegmentRecord>,
}

impl TraceRecord {
    pub fn new(input: &InputState, result: &TraceResult) -> Self {
        let segments = result
            .segments
            .iter()
            .map(|s| SegmentRecord {
                from: [s.from.x, s.from.y],
                to: [s.to.x, s.to.y],
                leg: s.leg,
            })
            .collect();
        Self {
            tilt_deg: input.tilt_deg,
            source_offset: input.source_offset,
            auto_align: input.auto_align,
            focus_height: result.focus_height,
            aperture_hit: result.aperture_hit,
            segments,
        }
    }
}

/// One sample of a tilt sweep.
#[derive(Debug, Clone, Serialize)]
pub struct ScanRow {
    pub tilt_deg: f32,
    pub source_offset: f32,
    pub focus_height: f32,
    pub aperture_hit: bool,
}

/// Write the trace record as pretty JSON.
pub fn write_trace_json<P: AsRef<Path>>(
    path: P,
    settings: &Settings,
    input: &InputState,
    result: &TraceResult,
) -> Result<()> {
    let record = TraceRecord::new(input, result);
    let file = File::create(path.as_ref())?;
    let writer = BufWriter::new(file);
    serde_json::to_writer_pretty(writer, &record)?;
    println!(
        "Wrote trace record for variant {:?} to {:?}",
        settings.variant.scheme,
        path.as_ref()
    );
    Ok(())
}

/// Write the sweep samples against the tilt grid, one row per sample:
/// `tilt source_offset focus_height hit`.
pub fn write_focus_scan<P: AsRef<Path>>(path: P, rows: &[ScanRow]) -> Result<()> {
    let file = File::create(path.as_ref())?;
    let mut writer = BufWriter::new(file);

    writeln!(writer, "# autocol focus scan {}", Local::now().to_rfc3339())?;
    for row in rows {
        writeln!(
            writer,
            "{} {} {} {}",
            row.tilt_deg,
            row.source_offset,
            row.focus_height,
            u8::from(row.aperture_hit)
        )?;
    }

    Ok(())
}
