use std::f64::consts::PI;

use nalgebra::Vector2;

pub const SPEED_OF_LIGHT: f64 = 299_792_458.0;

// Given a vector in the array frame, compute the angle from broadside.
// x is taken as broadside, y as along the array. Positive angles go from x to y.
pub fn vec_to_angle(vec: Vector2<f64>) -> f64 {
    f64::atan2(vec[1], vec[0])
}

pub fn wavelength(f: f64) -> f64 {
    SPEED_OF_LIGHT / f
}

// Amplitude to dB, substituting `or` for non-positive input (nulls).
pub fn decibels_or_else(x: f64, or: f64) -> f64 {
    if x <= 0. {
        or
    } else {
        20. * x.log10()
    }
}

// Host-side steering transform: converts a pointer position in normalized surface
// coordinates (origin bottom-left) into the progressive phase that steers the
// main lobe towards the pointer, as seen from the default array anchor.
pub fn steering_phase(spacing: f64, pointer_x: f64, pointer_y: f64) -> f64 {
    let steering = f64::atan2(pointer_y - 0.5, pointer_x - 0.1);
    2. * PI * spacing * steering.sin()
}
