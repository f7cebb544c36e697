// Plots the array factor against angle for one configuration.
//
// usage: pattern_cut OUT.png [ELEMENTS] [SPACING_WAVELENGTHS] [STEER_DEG]

use std::{f64::consts::TAU, path::PathBuf};

use log::{error, info, warn};
use phased_array_lib::{
    antenna::UniformLinearArray,
    config::{SpacingUnit, MAX_SPACING, MIN_POSITIVE},
    guard::ArrayConfiguration,
    pattern_chart::PatternChart,
};

fn parse_or(args: &[String], index: usize, default: f64) -> f64 {
    match args.get(index).map(|x| x.parse::<f64>()) {
        Some(Ok(x)) => x,
        Some(Err(e)) => {
            warn!("Argument {}: {}, using {}", index, e, default);
            default
        }
        None => default,
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let out = match args.first() {
        Some(path) => PathBuf::from(path),
        None => {
            error!("usage: pattern_cut OUT.png [ELEMENTS] [SPACING_WAVELENGTHS] [STEER_DEG]");
            std::process::exit(2);
        }
    };

    let num_elements = parse_or(&args, 1, 16.).max(1.) as u32;
    let spacing = parse_or(&args, 2, 0.5).clamp(MIN_POSITIVE, MAX_SPACING);
    let steer = parse_or(&args, 3, 0.).to_radians();

    let ula = UniformLinearArray::new(
        &ArrayConfiguration {
            num_elements,
            spacing,
            frequency: 3e9,
            phase: TAU * spacing * steer.sin(),
            zoom: 1.,
            time: 0.,
        },
        SpacingUnit::Wavelengths,
    );
    if !ula.is_grating_lobe_free() {
        warn!(
            "{} visible maxima, first at {:?} rad",
            ula.lobe_count(),
            ula.lobe_angles().iter().take(8).collect::<Vec<_>>()
        );
    }

    let caption = format!("{} elements, d = {} λ", num_elements, spacing);
    let chart = PatternChart::from_pattern(&ula, 1441, -60., caption);
    match chart.save(&out, (1024, 640)) {
        Ok(()) => info!("Wrote {}", out.display()),
        Err(e) => {
            error!("Could not write {}: {}", out.display(), e);
            std::process::exit(1);
        }
    }
}
