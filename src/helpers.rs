//! Rendering helpers for the interactive visualization.
//!
//! This module is the external consumer of [`TraceResult`](crate::trace::TraceResult):
//! the core hands over structured segments and a hit flag, and everything
//! pixel-shaped happens here. It includes the train-to-screen coordinate
//! mapping, the static bench furniture, the traced beam, and the
//! filled-vs-empty sensor indicator.
//!
//! The helper system provides:
//! - World-to-screen mapping for train coordinates
//! - Color-coded outgoing/return beam rendering
//! - Static optical-element rendering (lenses, beamsplitter, aperture, mirror)
//! - A binary hit/miss indicator rectangle

use crate::geom::TrainGeometry;
use crate::trace::{Leg, TraceResult};
use macroquad::prelude::*;

const SCALE: f32 = 0.8; // modify this depending on window size
const OFFSET_X: f32 = 40.0;
const OFFSET_Y: f32 = 300.0;

const C_OUTGOING: Color = WHITE;
const C_RETURN: Color = GREEN;
const C_ELEMENT: Color = SKYBLUE;

fn to_screen(x: f32, y: f32) -> (f32, f32) {
    (x * SCALE + OFFSET_X, y * SCALE + OFFSET_Y)
}

/// Draws the traced beam, outgoing legs white and return legs green.
pub fn draw_segments(result: &TraceResult) {
    for segment in &result.segments {
        let (x1, y1) = to_screen(segment.from.x, segment.from.y);
        let (x2, y2) = to_screen(segment.to.x, segment.to.y);
        let color = match segment.leg {
            Leg::Outgoing => C_OUTGOING,
            Leg::Return => C_RETURN,
        };
        draw_line(x1, y1, x2, y2, 1.5, color);
    }
}

/// Draws the static bench: axis, lenses, aperture blocks, beamsplitter and
/// the tilted mirror.
pub fn draw_train(train: &TrainGeometry, tilt_deg: f32) {
    // optical axis
    let (x1, y) = to_screen(train.sensor, 0.0);
    let (x2, _) = to_screen(train.mirror, 0.0);
    draw_line(x1, y, x2, y, 1.0, DARKGRAY);

    draw_lens(train.eyepiece, 75.0);
    draw_lens(train.objective, 100.0);

    // aperture: two blocks with the gap between them
    let gap = train.aperture_half_gap;
    let (ax, a_top) = to_screen(train.focal_plane, -gap - 50.0);
    let (_, a_gap_top) = to_screen(train.focal_plane, -gap);
    let (_, a_gap_bot) = to_screen(train.focal_plane, gap);
    let (_, a_bot) = to_screen(train.focal_plane, gap + 50.0);
    draw_line(ax, a_top, ax, a_gap_top, 3.0, C_ELEMENT);
    draw_line(ax, a_gap_bot, ax, a_bot, 3.0, C_ELEMENT);

    // beamsplitter diagonal
    let (bx1, by1) = to_screen(train.beamsplitter - 40.0, -40.0);
    let (bx2, by2) = to_screen(train.beamsplitter + 40.0, 40.0);
    draw_line(bx1, by1, bx2, by2, 2.0, GRAY);

    // mirror, rotated about its axis pivot
    let tilt = tilt_deg.to_radians();
    let half = 80.0;
    let (mx, my) = to_screen(train.mirror, 0.0);
    let dx = half * SCALE * tilt.sin();
    let dy = half * SCALE * tilt.cos();
    draw_line(mx - dx, my - dy, mx + dx, my + dy, 4.0, C_OUTGOING);

    // sensor
    let (sx, s_top) = to_screen(train.sensor, -30.0);
    let (_, s_bot) = to_screen(train.sensor, 30.0);
    draw_line(sx, s_top, sx, s_bot, 3.0, C_OUTGOING);
}

fn draw_lens(position: f32, half_height: f32) {
    let (x, top) = to_screen(position, -half_height);
    let (_, bot) = to_screen(position, half_height);
    draw_line(x, top, x, bot, 2.0, C_ELEMENT);
}

/// The sensor-view overlay: a filled rectangle when the beam lands on the
/// sensor, an empty one otherwise.
pub fn draw_indicator(hit: bool, x: f32, y: f32) {
    let (w, h) = (64.0, 48.0);
    if hit {
        draw_rectangle(x, y, w, h, C_OUTGOING);
    }
    draw_rectangle_lines(x, y, w, h, 2.0, C_OUTGOING);
}
