// Settings fixed for the lifetime of an App. Per-frame values arrive through `draw`.
// Every field has a default, so JSON input only needs the fields it changes.

use serde::{Deserialize, Serialize};

use crate::error::EngineError;

// Substitute for non-positive `spacing`, `frequency` and `zoom`.
pub const MIN_POSITIVE: f64 = 1e-9;

// Ceiling on `spacing`, in whichever unit it is given. Keeps k·d finite for every
// representable frequency.
pub const MAX_SPACING: f64 = 1e6;

// Marker radii above this are rejected. Each marker scans a square of this half-width.
pub const MAX_MARKER_RADIUS: f64 = 64.0;

// Default ceiling on the element count. Markers and the reference sum cost O(N).
pub const DEFAULT_MAX_ELEMENTS: u32 = 4096;

// Below this many pixels per wavelength the wavefront rings alias and are faded out.
pub const MIN_WAVEFRONT_PIXELS: f64 = 4.0;

// How `spacing` passed to `draw` is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpacingUnit {
    // Fraction of the carrier wavelength. The pattern shape is independent of
    // frequency, which only sets the physical scale.
    Wavelengths,
    // Physical metres. Lobe and null positions move with frequency.
    Meters,
}

impl Default for SpacingUnit {
    fn default() -> Self {
        SpacingUnit::Wavelengths
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Colormap {
    // Black through red and orange to pale yellow.
    Heat,
    // Red for weak field to green for strong field.
    RedGreen,
    Grayscale,
}

impl Default for Colormap {
    fn default() -> Self {
        Colormap::Heat
    }
}

// Outward travelling rings drawn over the field. Cosmetic only.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WavefrontConfig {
    pub enabled: bool,
    // Fraction of intensity removed in the troughs, in [0, 1].
    pub depth: f64,
    // Rings emitted per second of `time`.
    pub rate: f64,
}

impl Default for WavefrontConfig {
    fn default() -> Self {
        WavefrontConfig {
            enabled: true,
            depth: 0.35,
            rate: 1.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MarkerConfig {
    pub enabled: bool,
    pub radius_px: f64,
}

impl Default for MarkerConfig {
    fn default() -> Self {
        MarkerConfig {
            enabled: true,
            radius_px: 2.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub spacing_unit: SpacingUnit,
    pub max_elements: u32,
    // Physical extent in metres of the shorter surface side at zoom 1.
    pub view_extent_m: f64,
    // Array centre as fractions of surface width and height, measured from the
    // left and bottom edges.
    pub anchor: [f64; 2],
    // Direction of broadside, in radians counter-clockwise from the +x screen axis.
    pub orientation: f64,
    pub colormap: Colormap,
    pub wavefront: WavefrontConfig,
    pub markers: MarkerConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            spacing_unit: SpacingUnit::default(),
            max_elements: DEFAULT_MAX_ELEMENTS,
            view_extent_m: 1.0,
            anchor: [0.1, 0.5],
            orientation: 0.0,
            colormap: Colormap::default(),
            wavefront: WavefrontConfig::default(),
            markers: MarkerConfig::default(),
        }
    }
}

impl EngineConfig {
    pub fn from_json(text: &str) -> Result<EngineConfig, EngineError> {
        let config: EngineConfig = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    // Checked once at creation. Per-frame parameters are clamped instead.
    pub fn validate(&self) -> Result<(), EngineError> {
        if !(self.view_extent_m.is_finite() && self.view_extent_m > 0.) {
            return Err(EngineError::InvalidConfig(format!(
                "view_extent_m must be positive, got {}",
                self.view_extent_m
            )));
        }
        if self.max_elements == 0 {
            return Err(EngineError::InvalidConfig(
                "max_elements must be at least 1".to_owned(),
            ));
        }
        if !self.anchor.iter().all(|x| x.is_finite()) || !self.orientation.is_finite() {
            return Err(EngineError::InvalidConfig(
                "anchor and orientation must be finite".to_owned(),
            ));
        }
        if !(0.0..=MAX_MARKER_RADIUS).contains(&self.markers.radius_px) {
            return Err(EngineError::InvalidConfig(format!(
                "markers.radius_px must be in [0, {}], got {}",
                MAX_MARKER_RADIUS, self.markers.radius_px
            )));
        }
        if !(0.0..=1.0).contains(&self.wavefront.depth) || !self.wavefront.rate.is_finite() {
            return Err(EngineError::InvalidConfig(format!(
                "wavefront depth must be in [0, 1], got {}",
                self.wavefront.depth
            )));
        }
        Ok(())
    }

    // A configuration with all cosmetic layers turned off, leaving only the field.
    pub fn plain() -> EngineConfig {
        EngineConfig {
            wavefront: WavefrontConfig {
                enabled: false,
                ..WavefrontConfig::default()
            },
            markers: MarkerConfig {
                enabled: false,
                ..MarkerConfig::default()
            },
            ..EngineConfig::default()
        }
    }
}
