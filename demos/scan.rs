use autocol::settings;
use autocol::sweep::Sweep;
use autocol::variant::{Variant, VariantConfig};

fn main() {
    let mut settings = settings::load_default_config().unwrap();

    settings.variant = VariantConfig::new(Variant::SensorCentered);
    settings.auto_align = true;
    settings.sweep_steps = Some(721);

    let mut sweep = Sweep::new(settings);
    sweep.solve();
    sweep.writeup();
}
