use autocol::helpers;
use autocol::problem::Problem;
use autocol::settings;
use macroquad::prelude::*;

#[macroquad::main("autocol viewer")]
async fn main() {
    let settings = settings::load_default_config().unwrap();
    let mut problem = Problem::new(settings);
    problem.solve();

    loop {
        clear_background(BLACK);

        if is_key_down(KeyCode::Left) {
            problem.set_tilt(problem.input.tilt_deg - 0.02);
        }
        if is_key_down(KeyCode::Right) {
            problem.set_tilt(problem.input.tilt_deg + 0.02);
        }
        if is_key_down(KeyCode::Down) {
            problem.set_offset(problem.input.source_offset - 0.2);
        }
        if is_key_down(KeyCode::Up) {
            problem.set_offset(problem.input.source_offset + 0.2);
        }
        if is_key_pressed(KeyCode::A) {
            problem.set_auto_align(!problem.input.auto_align);
        }
        if is_key_pressed(KeyCode::R) {
            problem.reset();
        }

        helpers::draw_train(&problem.settings.train, problem.input.tilt_deg);
        if let Some(result) = &problem.result {
            helpers::draw_segments(result);
            helpers::draw_indicator(result.aperture_hit, 650.0, 40.0);
            draw_text(
                &format!(
                    "tilt {:+.2} deg  offset {:+.1}  auto-align {}  focus {:+.2}",
                    problem.input.tilt_deg,
                    problem.input.source_offset,
                    if problem.input.auto_align { "on" } else { "off" },
                    result.focus_height,
                ),
                20.0,
                30.0,
                20.0,
                WHITE,
            );
        }
        draw_text(
            "arrows: tilt/offset  A: auto-align  R: reset",
            20.0,
            55.0,
            18.0,
            GRAY,
        );

        next_frame().await
    }
}
