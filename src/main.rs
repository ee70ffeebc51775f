use autocol::problem::Problem;
use autocol::settings::{self};
use autocol::sweep::Sweep;

fn main() {
    let settings = settings::load_config().unwrap();

    if settings.sweep_steps.is_some() {
        let mut sweep = Sweep::new(settings);
        sweep.solve();
        sweep.writeup();
    } else {
        let mut problem = Problem::new(settings);
        problem.solve();
        problem.writeup();
    }
}
