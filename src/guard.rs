// Slider values reach `draw` unvalidated. Every out-of-domain scalar is replaced by a
// fixed substitute instead of failing the frame.

use bitflags::bitflags;
use log::debug;

use crate::config::{MAX_SPACING, MIN_POSITIVE};

// Scalars exactly as the host handed them over.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RawParameters {
    pub time: f64,
    pub num_elements: i64,
    pub spacing: f64,
    pub frequency: f64,
    pub phase: f64,
    pub zoom: f64,
}

// Validated parameters for one frame. Built fresh on every draw.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArrayConfiguration {
    pub num_elements: u32,
    pub spacing: f64,
    pub frequency: f64,
    // Progressive phase between neighbouring elements, radians.
    pub phase: f64,
    pub zoom: f64,
    pub time: f64,
}

bitflags! {
    // Which parameters were substituted.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct Adjustments: u8 {
        const ELEMENTS_RAISED = 1 << 0;
        const ELEMENTS_CAPPED = 1 << 1;
        const SPACING = 1 << 2;
        const FREQUENCY = 1 << 3;
        const ZOOM = 1 << 4;
        const PHASE = 1 << 5;
        const TIME = 1 << 6;
    }
}

pub struct ParameterGuard {
    max_elements: u32,
}

impl ParameterGuard {
    pub fn new(max_elements: u32) -> ParameterGuard {
        ParameterGuard {
            max_elements: max_elements.max(1),
        }
    }

    pub fn sanitize(&self, raw: RawParameters) -> (ArrayConfiguration, Adjustments) {
        let mut adjusted = Adjustments::empty();

        let num_elements = if raw.num_elements < 1 {
            adjusted |= Adjustments::ELEMENTS_RAISED;
            1
        } else if raw.num_elements > self.max_elements as i64 {
            adjusted |= Adjustments::ELEMENTS_CAPPED;
            self.max_elements
        } else {
            raw.num_elements as u32
        };

        let config = ArrayConfiguration {
            num_elements,
            spacing: bounded_spacing(raw.spacing, &mut adjusted),
            frequency: positive_or_min(raw.frequency, Adjustments::FREQUENCY, &mut adjusted),
            phase: finite_or_zero(raw.phase, Adjustments::PHASE, &mut adjusted),
            zoom: positive_or_min(raw.zoom, Adjustments::ZOOM, &mut adjusted),
            time: finite_or_zero(raw.time, Adjustments::TIME, &mut adjusted),
        };

        if !adjusted.is_empty() {
            debug!("Clamped frame parameters {:?}: {:?} -> {:?}", adjusted, raw, config);
        }

        (config, adjusted)
    }
}

// Positive infinity is treated like any other unusable value: it would turn every
// trigonometric argument downstream into NaN.
fn positive_or_min(x: f64, flag: Adjustments, adjusted: &mut Adjustments) -> f64 {
    if x.is_finite() && x > 0. {
        x
    } else {
        *adjusted |= flag;
        MIN_POSITIVE
    }
}

fn bounded_spacing(x: f64, adjusted: &mut Adjustments) -> f64 {
    let spacing = positive_or_min(x, Adjustments::SPACING, adjusted);
    if spacing > MAX_SPACING {
        *adjusted |= Adjustments::SPACING;
        MAX_SPACING
    } else {
        spacing
    }
}

fn finite_or_zero(x: f64, flag: Adjustments, adjusted: &mut Adjustments) -> f64 {
    if x.is_finite() {
        x
    } else {
        *adjusted |= flag;
        0.
    }
}

#[cfg(test)]
mod test {
    use super::{Adjustments, ParameterGuard, RawParameters};
    use crate::config::{MAX_SPACING, MIN_POSITIVE};

    fn raw() -> RawParameters {
        RawParameters {
            time: 1.5,
            num_elements: 25,
            spacing: 0.25,
            frequency: 3e9,
            phase: 0.3,
            zoom: 0.5,
        }
    }

    #[test]
    fn valid_input_passes_through() {
        let (config, adjusted) = ParameterGuard::new(4096).sanitize(raw());
        assert!(adjusted.is_empty());
        assert_eq!(config.num_elements, 25);
        assert_eq!(config.spacing, 0.25);
        assert_eq!(config.frequency, 3e9);
        assert_eq!(config.phase, 0.3);
        assert_eq!(config.zoom, 0.5);
        assert_eq!(config.time, 1.5);
    }

    #[test]
    fn element_count_clamped_both_ways() {
        let guard = ParameterGuard::new(64);
        let (config, adjusted) = guard.sanitize(RawParameters {
            num_elements: 0,
            ..raw()
        });
        assert_eq!(config.num_elements, 1);
        assert_eq!(adjusted, Adjustments::ELEMENTS_RAISED);

        let (config, _) = guard.sanitize(RawParameters {
            num_elements: -7,
            ..raw()
        });
        assert_eq!(config.num_elements, 1);

        let (config, adjusted) = guard.sanitize(RawParameters {
            num_elements: 65,
            ..raw()
        });
        assert_eq!(config.num_elements, 64);
        assert_eq!(adjusted, Adjustments::ELEMENTS_CAPPED);
    }

    #[test]
    fn non_positive_scalars_become_epsilon() {
        let (config, adjusted) = ParameterGuard::new(4096).sanitize(RawParameters {
            spacing: 0.,
            frequency: -3e9,
            zoom: f64::NAN,
            ..raw()
        });
        assert_eq!(config.spacing, MIN_POSITIVE);
        assert_eq!(config.frequency, MIN_POSITIVE);
        assert_eq!(config.zoom, MIN_POSITIVE);
        assert_eq!(
            adjusted,
            Adjustments::SPACING | Adjustments::FREQUENCY | Adjustments::ZOOM
        );
    }

    #[test]
    fn huge_spacing_is_capped() {
        let guard = ParameterGuard::new(4096);
        for spacing in [1e308, f64::MAX, MAX_SPACING * 2.] {
            let (config, adjusted) = guard.sanitize(RawParameters { spacing, ..raw() });
            assert_eq!(config.spacing, MAX_SPACING);
            assert_eq!(adjusted, Adjustments::SPACING);
        }

        let (config, adjusted) = guard.sanitize(RawParameters {
            spacing: MAX_SPACING,
            ..raw()
        });
        assert_eq!(config.spacing, MAX_SPACING);
        assert!(adjusted.is_empty());
    }

    #[test]
    fn phase_is_not_wrapped() {
        let (config, adjusted) = ParameterGuard::new(4096).sanitize(RawParameters {
            phase: -123.4,
            ..raw()
        });
        assert_eq!(config.phase, -123.4);
        assert!(adjusted.is_empty());

        let (config, adjusted) = ParameterGuard::new(4096).sanitize(RawParameters {
            phase: f64::INFINITY,
            time: f64::NAN,
            ..raw()
        });
        assert_eq!(config.phase, 0.);
        assert_eq!(config.time, 0.);
        assert_eq!(adjusted, Adjustments::PHASE | Adjustments::TIME);
    }
}
