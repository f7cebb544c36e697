// Renders a single frame headlessly and writes it to an image file.
//
// usage: render_frame OUT.png [SIZE] [ELEMENTS] [SPACING] [FREQUENCY] [PHASE] [ZOOM] [TIME]

use std::{fmt::Display, path::PathBuf, str::FromStr};

use log::{error, info, warn};
use phased_array_lib::{
    engine::{create_app, initialise},
    pattern_chart::save_frame_png,
    surface::HeadlessSurface,
};

fn parse_or<T: FromStr + Display>(args: &[String], index: usize, default: T) -> T {
    match args.get(index) {
        Some(text) => text.parse().unwrap_or_else(|_| {
            warn!("Could not parse argument {} ('{}'), using {}", index, text, default);
            default
        }),
        None => default,
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_micros()
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let out = match args.first() {
        Some(path) => PathBuf::from(path),
        None => {
            error!(
                "usage: render_frame OUT.png [SIZE] [ELEMENTS] [SPACING] [FREQUENCY] [PHASE] \
                 [ZOOM] [TIME]"
            );
            std::process::exit(2);
        }
    };

    let size: u32 = parse_or(&args, 1, 512);
    let num_elements: u32 = parse_or(&args, 2, 25);
    let spacing: f64 = parse_or(&args, 3, 0.25);
    let frequency: f64 = parse_or(&args, 4, 3e9);
    let phase: f64 = parse_or(&args, 5, 0.);
    let zoom: f64 = parse_or(&args, 6, 0.5);
    let time: f64 = parse_or(&args, 7, 0.);

    initialise();
    let mut app = match create_app(HeadlessSurface::new(), size, size) {
        Ok(app) => app,
        Err(e) => {
            error!("Could not create app: {}", e);
            std::process::exit(1);
        }
    };

    let status = app.draw(time, num_elements, spacing, frequency, phase, zoom);
    info!("Frame status: {:?}", status);

    match save_frame_png(app.image(), &out) {
        Ok(()) => info!("Wrote {}", out.display()),
        Err(e) => {
            error!("Could not write {}: {}", out.display(), e);
            std::process::exit(1);
        }
    }
}
