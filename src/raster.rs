// Per-pixel evaluation of the array factor. The whole grid is recomputed every frame
// into caller-owned buffers: amplitudes as f64, colours as RGBA8.

use std::f64::consts::TAU;

use nalgebra::Vector2;
use ndarray::{Array2, Array3, Axis, Zip};

use crate::{
    antenna::UniformLinearArray,
    colormap::ColorTable,
    config::{EngineConfig, MIN_WAVEFRONT_PIXELS},
    guard::ArrayConfiguration,
    helper::wavelength,
    mapping::PolarMapping,
};

const MARKER_COLOR: [u8; 3] = [255, 255, 255];

pub struct FrameBuffers {
    // (height, width), row 0 at the top.
    amplitudes: Array2<f64>,
    // (height, width, 4), RGBA8.
    rgba: Array3<u8>,
}

impl FrameBuffers {
    pub fn new(width: u32, height: u32) -> FrameBuffers {
        let (w, h) = (width as usize, height as usize);
        FrameBuffers {
            amplitudes: Array2::zeros((h, w)),
            rgba: Array3::zeros((h, w, 4)),
        }
    }

    pub fn width(&self) -> u32 {
        self.amplitudes.ncols() as u32
    }

    pub fn height(&self) -> u32 {
        self.amplitudes.nrows() as u32
    }

    pub fn amplitudes(&self) -> &Array2<f64> {
        &self.amplitudes
    }

    pub fn image(&self) -> &Array3<u8> {
        &self.rgba
    }

    // Row-major RGBA bytes, top row first.
    pub fn rgba_bytes(&self) -> Option<&[u8]> {
        self.rgba.as_slice()
    }
}

pub struct FieldRasterizer<'a> {
    config: EngineConfig,
    colors: &'a ColorTable,
}

impl<'a> FieldRasterizer<'a> {
    pub fn new(config: EngineConfig, colors: &'a ColorTable) -> FieldRasterizer<'a> {
        FieldRasterizer { config, colors }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn render(&self, frame: &ArrayConfiguration, buffers: &mut FrameBuffers) {
        let mapping =
            PolarMapping::new(buffers.width(), buffers.height(), &self.config, frame.zoom);
        let ula = UniformLinearArray::new(frame, self.config.spacing_unit);
        let wavefront = Wavefront::new(&self.config, frame, mapping.meters_per_pixel());
        let colors = self.colors;

        let FrameBuffers { amplitudes, rgba } = buffers;
        Zip::indexed(amplitudes)
            .and(rgba.lanes_mut(Axis(2)))
            .for_each(|(row, col), amplitude, mut px| {
                let (sin_theta, r) = mapping.sin_and_range(PolarMapping::pixel_centre(col, row));
                *amplitude = ula.amplitude_sin(sin_theta);

                let intensity = match &wavefront {
                    Some(w) => *amplitude * w.modulation(r),
                    None => *amplitude,
                };
                let [red, green, blue] = colors.lookup(intensity);
                px[0] = red;
                px[1] = green;
                px[2] = blue;
                px[3] = 255;
            });

        if self.config.markers.enabled {
            self.draw_markers(frame, &mapping, rgba);
        }
    }

    // Discs at the element positions. Geometry is computed relative to the anchor so
    // that the overlay is exactly mirror symmetric about broadside.
    fn draw_markers(
        &self,
        frame: &ArrayConfiguration,
        mapping: &PolarMapping,
        rgba: &mut Array3<u8>,
    ) {
        let (h, w, _) = rgba.dim();
        let radius = self.config.markers.radius_px.max(0.);
        let d = UniformLinearArray::element_spacing_m(frame, self.config.spacing_unit);
        let anchor = mapping.anchor();
        let centre = (frame.num_elements as f64 - 1.) / 2.;

        for n in 0..frame.num_elements {
            let along = d * (n as f64 - centre);
            let pos = mapping.array_to_physical(Vector2::new(0., along));
            let m = Vector2::new(pos.x, -pos.y) / mapping.meters_per_pixel();

            let (cx, cy) = (anchor.x + m.x, anchor.y + m.y);
            if cx + radius < 0.
                || cy + radius < 0.
                || cx - radius > w as f64
                || cy - radius > h as f64
            {
                continue;
            }

            let col_lo = (cx - radius - 1.).floor().max(0.) as usize;
            let col_hi = ((cx + radius + 1.).ceil().max(0.) as usize).min(w);
            let row_lo = (cy - radius - 1.).floor().max(0.) as usize;
            let row_hi = ((cy + radius + 1.).ceil().max(0.) as usize).min(h);

            for row in row_lo..row_hi {
                for col in col_lo..col_hi {
                    let offset = mapping.pixel_offset(PolarMapping::pixel_centre(col, row)) - m;
                    if offset.norm_squared() <= radius * radius {
                        rgba[[row, col, 0]] = MARKER_COLOR[0];
                        rgba[[row, col, 1]] = MARKER_COLOR[1];
                        rgba[[row, col, 2]] = MARKER_COLOR[2];
                    }
                }
            }
        }
    }
}

// Rings one carrier wavelength apart, moving outward at `rate` rings per second.
struct Wavefront {
    depth: f64,
    λ: f64,
    offset: f64,
}

impl Wavefront {
    fn new(
        config: &EngineConfig,
        frame: &ArrayConfiguration,
        meters_per_pixel: f64,
    ) -> Option<Wavefront> {
        if !config.wavefront.enabled || config.wavefront.depth <= 0. {
            return None;
        }

        let λ = wavelength(frame.frequency);
        let pixels_per_wavelength = λ / meters_per_pixel;
        let fade =
            ((pixels_per_wavelength - MIN_WAVEFRONT_PIXELS) / MIN_WAVEFRONT_PIXELS).clamp(0., 1.);
        if !(fade > 0.) {
            return None;
        }

        Some(Wavefront {
            depth: config.wavefront.depth * fade,
            λ,
            // Only the fractional part matters.
            offset: (config.wavefront.rate * frame.time).fract(),
        })
    }

    fn modulation(&self, r: f64) -> f64 {
        let cycles = r / self.λ - self.offset;
        1. - self.depth * (0.5 - 0.5 * (TAU * cycles).cos())
    }
}
