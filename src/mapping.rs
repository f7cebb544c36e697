use nalgebra::{Point2, Rotation2, Vector2};

use crate::{config::EngineConfig, helper::vec_to_angle};

// Maps the pixel grid of a surface onto the physical plane around the array.
//
// Pixel coordinates are continuous (column, row) with row 0 at the top edge; pixel
// (i, j) covers [i, i+1) x [j, j+1). Physical coordinates are metres relative to the
// array centre with +y up. The array frame is the physical frame rotated so that +x is
// broadside and +y runs along the array.
//
// Zoom only changes the metres-per-pixel scale. The same physical point always gets the
// same (θ, r), whatever the zoom.
#[derive(Debug, Clone)]
pub struct PolarMapping {
    anchor: Point2<f64>,
    meters_per_pixel: f64,
    to_array: Rotation2<f64>,
}

impl PolarMapping {
    pub fn new(width: u32, height: u32, config: &EngineConfig, zoom: f64) -> PolarMapping {
        let w = width as f64;
        let h = height as f64;
        let shorter = w.min(h).max(1.);

        PolarMapping {
            anchor: Point2::new(config.anchor[0] * w, (1. - config.anchor[1]) * h),
            meters_per_pixel: zoom * config.view_extent_m / shorter,
            to_array: Rotation2::new(-config.orientation),
        }
    }

    pub fn meters_per_pixel(&self) -> f64 {
        self.meters_per_pixel
    }

    pub fn anchor(&self) -> Point2<f64> {
        self.anchor
    }

    pub fn pixel_centre(col: usize, row: usize) -> Point2<f64> {
        Point2::new(col as f64 + 0.5, row as f64 + 0.5)
    }

    // Offset in pixels from the anchor, screen axes (rows grow downward).
    pub fn pixel_offset(&self, px: Point2<f64>) -> Vector2<f64> {
        px - self.anchor
    }

    pub fn pixel_to_physical(&self, px: Point2<f64>) -> Vector2<f64> {
        let offset = self.pixel_offset(px);
        Vector2::new(offset.x, -offset.y) * self.meters_per_pixel
    }

    pub fn physical_to_pixel(&self, pos: Vector2<f64>) -> Point2<f64> {
        let offset = pos / self.meters_per_pixel;
        self.anchor + Vector2::new(offset.x, -offset.y)
    }

    pub fn physical_to_array(&self, pos: Vector2<f64>) -> Vector2<f64> {
        self.to_array * pos
    }

    pub fn array_to_physical(&self, pos: Vector2<f64>) -> Vector2<f64> {
        self.to_array.inverse() * pos
    }

    // sin θ and r for a pixel. At the array centre itself sin θ is taken as 0.
    pub fn sin_and_range(&self, px: Point2<f64>) -> (f64, f64) {
        let v = self.physical_to_array(self.pixel_to_physical(px));
        let r = v.norm();
        if r > 0. {
            (v.y / r, r)
        } else {
            (0., 0.)
        }
    }

    pub fn polar(&self, px: Point2<f64>) -> (f64, f64) {
        let v = self.physical_to_array(self.pixel_to_physical(px));
        (vec_to_angle(v), v.norm())
    }
}
