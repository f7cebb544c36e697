use std::{f64::consts::FRAC_PI_2, fmt::Display, path::Path};

use ndarray::{Array1, Array3};
use plotters::{
    prelude::{BitMapBackend, ChartBuilder, IntoDrawingArea, LabelAreaPosition, LineSeries},
    style::{AsRelative, IntoFont, RGBColor, RED, WHITE},
};

use crate::{error::ExportError, helper::decibels_or_else, helper_traits::AngularPatternHelper};

fn backend_error<E: Display>(e: E) -> ExportError {
    ExportError::Backend(e.to_string())
}

// A cut through an angular pattern: amplitude in dB against angle in degrees.
pub struct PatternChart {
    x: Array1<f64>,
    y: Array1<f64>,
    border_x: f64,
    border_y: f64,
    caption: String,
}

impl PatternChart {
    pub fn new(x: Array1<f64>, y: Array1<f64>, caption: impl Into<String>) -> PatternChart {
        PatternChart {
            x,
            y,
            border_x: 0.02,
            border_y: 0.1,
            caption: caption.into(),
        }
    }

    // Samples the visible half space, -90 to 90 degrees, flooring nulls at `floor_db`.
    pub fn from_pattern(
        pattern: &impl AngularPatternHelper,
        samples: usize,
        floor_db: f64,
        caption: impl Into<String>,
    ) -> PatternChart {
        let samples = samples.max(2);
        let theta = Array1::linspace(-FRAC_PI_2, FRAC_PI_2, samples);
        let amplitude = pattern.amplitude_many(theta.iter().copied());
        let y = amplitude
            .into_iter()
            .map(|x| decibels_or_else(x, floor_db).max(floor_db))
            .collect();

        PatternChart::new(theta.mapv(f64::to_degrees), y, caption)
    }

    pub fn bounds(&self) -> (f64, f64, f64, f64) {
        let fold = |values: &Array1<f64>| {
            values
                .iter()
                .copied()
                .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| (lo.min(v), hi.max(v)))
        };
        let (min_x, max_x) = fold(&self.x);
        let (min_y, max_y) = fold(&self.y);
        let dist_x = (max_x - min_x).clamp(1e-6, f64::MAX);
        let dist_y = (max_y - min_y).clamp(1e-6, f64::MAX);

        (
            min_x - dist_x * self.border_x / 2.,
            max_x + dist_x * self.border_x / 2.,
            min_y - dist_y * self.border_y / 2.,
            max_y + dist_y * self.border_y / 2.,
        )
    }

    pub fn save(&self, path: &Path, size: (u32, u32)) -> Result<(), ExportError> {
        if self.x.is_empty() {
            return Err(ExportError::EmptyFrame);
        }
        let (bottom_x, top_x, bottom_y, top_y) = self.bounds();

        let root = BitMapBackend::new(path, size).into_drawing_area();
        root.fill(&WHITE).map_err(backend_error)?;

        let mut chart = ChartBuilder::on(&root)
            .caption(&self.caption, ("sans-serif", 30).into_font())
            .set_label_area_size(LabelAreaPosition::Left, (8i32).percent_width())
            .set_label_area_size(LabelAreaPosition::Bottom, (8i32).percent_height())
            .build_cartesian_2d(bottom_x..top_x, bottom_y..top_y)
            .map_err(backend_error)?;

        chart
            .configure_mesh()
            .x_desc("Angle from broadside (deg)")
            .y_desc("Array factor (dB)")
            .draw()
            .map_err(backend_error)?;

        chart
            .draw_series(LineSeries::new(
                self.x.iter().copied().zip(self.y.iter().copied()),
                &RED,
            ))
            .map_err(backend_error)?;

        root.present().map_err(backend_error)
    }
}

// Writes a rendered (height, width, 4) RGBA frame as an image file; the format follows
// the file extension.
pub fn save_frame_png(image: &Array3<u8>, path: &Path) -> Result<(), ExportError> {
    let (h, w, _) = image.dim();
    if h == 0 || w == 0 {
        return Err(ExportError::EmptyFrame);
    }

    let root = BitMapBackend::new(path, (w as u32, h as u32)).into_drawing_area();
    for row in 0..h {
        for col in 0..w {
            let color = RGBColor(image[[row, col, 0]], image[[row, col, 1]], image[[row, col, 2]]);
            root.draw_pixel((col as i32, row as i32), &color)
                .map_err(backend_error)?;
        }
    }

    root.present().map_err(backend_error)
}
