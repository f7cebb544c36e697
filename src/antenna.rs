use std::f64::consts::{PI, TAU};

use num::complex::Complex64;

use crate::{
    config::SpacingUnit, guard::ArrayConfiguration, helper::SPEED_OF_LIGHT,
    helper_traits::AngularPattern,
};

const c: f64 = SPEED_OF_LIGHT;

// Below this |sin(ψ/2)| the closed form is replaced by its limit.
pub const SINGULARITY_EPSILON: f64 = 1e-12;

// Upper bound on the number of angles `lobe_angles` returns.
pub const MAX_LISTED_LOBES: usize = 1024;

// Represents the array factor of N isotropic elements on a line, spaced d apart, with each
// element fed a progressive phase shift relative to its neighbour. The far field in the
// direction θ (from broadside) is the coherent sum of N unit phasors advancing by
//     ψ = k·d·sin θ − phase
// per element. Normalizing by N bounds the peak to 1.
// Sources:
// [1] C. A. Balanis, Antenna Theory: Analysis and Design, 3rd ed., section 6.3.
#[derive(Debug, Clone, PartialEq)]
pub struct UniformLinearArray {
    pub num_elements: u32,
    // Electrical spacing k·d in radians.
    pub kd: f64,
    pub phase: f64,
}

impl UniformLinearArray {
    pub fn new(config: &ArrayConfiguration, unit: SpacingUnit) -> UniformLinearArray {
        let kd = match unit {
            SpacingUnit::Wavelengths => TAU * config.spacing,
            SpacingUnit::Meters => {
                // Wavelength
                let λ = c / config.frequency;
                TAU * config.spacing / λ
            }
        };

        UniformLinearArray {
            num_elements: config.num_elements.max(1),
            kd,
            phase: config.phase,
        }
    }

    // Physical distance between neighbouring elements.
    pub fn element_spacing_m(config: &ArrayConfiguration, unit: SpacingUnit) -> f64 {
        match unit {
            SpacingUnit::Wavelengths => config.spacing * c / config.frequency,
            SpacingUnit::Meters => config.spacing,
        }
    }

    pub fn psi(&self, sin_theta: f64) -> f64 {
        self.kd * sin_theta - self.phase
    }

    // Closed form |sin(Nψ/2) / (N·sin(ψ/2))|, eq. 6-10c in [1].
    // The magnitude is even and 2π-periodic in ψ, so ψ is folded into [0, π] first. This
    // keeps both sines well conditioned and makes the result exactly symmetric in ψ.
    // A non-finite ψ has no direction to point at and is drawn as a null.
    pub fn amplitude_psi(&self, psi: f64) -> f64 {
        if !psi.is_finite() {
            return 0.;
        }
        if self.num_elements <= 1 {
            return 1.;
        }

        let N = self.num_elements as f64;
        let mut ψ = psi.abs() % TAU;
        if ψ > PI {
            ψ = TAU - ψ;
        }

        let denom = (ψ / 2.).sin();
        if denom < SINGULARITY_EPSILON {
            return 1.;
        }

        ((N * ψ / 2.).sin() / (N * denom)).abs().min(1.)
    }

    pub fn amplitude_sin(&self, sin_theta: f64) -> f64 {
        self.amplitude_psi(self.psi(sin_theta))
    }

    // Direct evaluation of (1/N)·|Σ exp(i·n·ψ)|. O(N), used as a reference.
    pub fn coherent_sum(&self, theta: f64) -> f64 {
        const i: Complex64 = Complex64::new(0., 1.);

        let ψ = self.psi(theta.sin());
        let acc: Complex64 = (0..self.num_elements)
            .map(|n| (i * (n as f64 * ψ)).exp())
            .sum();

        acc.norm() / self.num_elements as f64
    }

    // Direction of the main lobe selected by the (unwrapped) phase, if it is visible.
    pub fn steering_angle(&self) -> Option<f64> {
        let s = self.phase / self.kd;
        if s.abs() <= 1. {
            Some(s.asin())
        } else {
            None
        }
    }

    // Orders m with a visible maximum ψ = 2πm, as the inclusive float range [lo, hi].
    // Floats keep huge spacings from overflowing an integer range.
    fn lobe_orders(&self) -> Option<(f64, f64)> {
        if self.num_elements <= 1 || !(self.kd > 0.) || !self.kd.is_finite() {
            return None;
        }

        let lo = ((-self.kd - self.phase) / TAU).ceil();
        let hi = ((self.kd - self.phase) / TAU).floor();
        Some((lo, hi))
    }

    // Number of visible maxima. Infinite when the electrical spacing is.
    pub fn lobe_count(&self) -> f64 {
        if self.num_elements > 1 && self.kd == f64::INFINITY {
            return f64::INFINITY;
        }

        match self.lobe_orders() {
            Some((lo, hi)) if hi >= lo => hi - lo + 1.,
            _ => 0.,
        }
    }

    // Visible maxima, lowest order first, at most MAX_LISTED_LOBES of them. More than
    // one means grating lobes.
    pub fn lobe_angles(&self) -> Vec<f64> {
        let Some((lo, _)) = self.lobe_orders() else {
            return Vec::new();
        };

        let count = self.lobe_count().min(MAX_LISTED_LOBES as f64) as usize;
        (0..count)
            .map(|k| {
                let m = lo + k as f64;
                ((self.phase + TAU * m) / self.kd).clamp(-1., 1.).asin()
            })
            .collect()
    }

    pub fn is_grating_lobe_free(&self) -> bool {
        self.lobe_count() <= 1.
    }

    // Distance in sin θ between the main lobe and its first null, λ/(N·d).
    pub fn first_null_offset(&self) -> Option<f64> {
        if self.num_elements <= 1 {
            None
        } else {
            Some(TAU / (self.num_elements as f64 * self.kd))
        }
    }
}

impl AngularPattern for UniformLinearArray {
    fn amplitude(&self, theta: f64) -> f64 {
        self.amplitude_sin(theta.sin())
    }
}

#[cfg(test)]
mod test {
    use std::f64::consts::{FRAC_PI_2, PI, TAU};

    use approx::assert_relative_eq;
    use rand::{prelude::StdRng, Rng, SeedableRng};
    use rand_distr::{Distribution, Uniform};

    use super::{UniformLinearArray, MAX_LISTED_LOBES};
    use crate::{
        config::SpacingUnit,
        guard::{ArrayConfiguration, ParameterGuard, RawParameters},
        helper_traits::{AngularPattern, AngularPatternHelper},
    };

    fn config(num_elements: u32, spacing: f64, frequency: f64, phase: f64) -> ArrayConfiguration {
        ArrayConfiguration {
            num_elements,
            spacing,
            frequency,
            phase,
            zoom: 1.,
            time: 0.,
        }
    }

    fn angles(count: usize) -> impl Iterator<Item = f64> {
        (0..count).map(move |k| -FRAC_PI_2 + PI * k as f64 / (count - 1) as f64)
    }

    #[test]
    fn broadside_peak_is_one() {
        let mut rng = StdRng::seed_from_u64(7);
        for unit in [SpacingUnit::Wavelengths, SpacingUnit::Meters] {
            for _ in 0..200 {
                let ula = UniformLinearArray::new(
                    &config(
                        rng.gen_range(1..512),
                        rng.gen_range(1e-3..4.),
                        rng.gen_range(1e6..1e11),
                        0.,
                    ),
                    unit,
                );
                assert_eq!(ula.amplitude(0.), 1.);
            }
        }
    }

    #[test]
    fn amplitude_bounded() {
        let mut rng = StdRng::seed_from_u64(11);
        let phase = Uniform::new(-50., 50.);
        for _ in 0..200 {
            let ula = UniformLinearArray::new(
                &config(
                    rng.gen_range(1..2048),
                    rng.gen_range(1e-3..8.),
                    3e9,
                    phase.sample(&mut rng),
                ),
                SpacingUnit::Wavelengths,
            );
            for x in ula.amplitude_many(angles(721)) {
                assert!((0. ..=1.).contains(&x), "amplitude {} out of range", x);
            }
        }
    }

    #[test]
    fn closed_form_matches_coherent_sum() {
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..50 {
            let ula = UniformLinearArray::new(
                &config(
                    rng.gen_range(1..64),
                    rng.gen_range(0.05..2.),
                    3e9,
                    rng.gen_range(-TAU..TAU),
                ),
                SpacingUnit::Wavelengths,
            );
            for theta in angles(181) {
                assert_relative_eq!(ula.amplitude(theta), ula.coherent_sum(theta), epsilon = 1e-9);
            }
        }
    }

    #[test]
    fn zero_elements_is_defined() {
        let (clamped, _) = ParameterGuard::new(4096).sanitize(RawParameters {
            time: 0.,
            num_elements: 0,
            spacing: 0.5,
            frequency: 3e9,
            phase: 1.,
            zoom: 1.,
        });
        let ula = UniformLinearArray::new(&clamped, SpacingUnit::Wavelengths);
        for theta in angles(91) {
            assert_eq!(ula.amplitude(theta), 1.);
            assert_relative_eq!(ula.coherent_sum(theta), 1.);
        }
    }

    #[test]
    fn singularity_is_removable() {
        let ula = UniformLinearArray::new(&config(16, 0.5, 3e9, 0.), SpacingUnit::Wavelengths);
        assert_eq!(ula.amplitude_psi(0.), 1.);
        assert_eq!(ula.amplitude_psi(TAU), 1.);
        assert_eq!(ula.amplitude_psi(-4. * PI), 1.);
        let near = ula.amplitude_psi(1e-7);
        assert!(near <= 1. && near > 0.999_999);
    }

    #[test]
    fn nulls_scale_inversely_with_frequency() {
        // 0.1 m spacing, 8 elements. Only visible in metres mode.
        let f1 = 1e9;
        let first_null = |f: f64| {
            let ula = UniformLinearArray::new(&config(8, 0.1, f, 0.), SpacingUnit::Meters);
            // Scan outward from broadside for the first local minimum.
            let steps = 200_000;
            let mut prev = ula.amplitude(0.);
            for k in 1..steps {
                let theta = FRAC_PI_2 * k as f64 / steps as f64;
                let x = ula.amplitude(theta);
                if x > prev {
                    return (FRAC_PI_2 * (k - 1) as f64 / steps as f64, ula);
                }
                prev = x;
            }
            panic!("no null found");
        };

        let (null1, ula1) = first_null(f1);
        let (null2, ula2) = first_null(2. * f1);
        assert_relative_eq!(null2.sin() / null1.sin(), 0.5, epsilon = 1e-3);
        assert_relative_eq!(null1.sin(), ula1.first_null_offset().unwrap(), epsilon = 1e-4);
        assert_relative_eq!(null2.sin(), ula2.first_null_offset().unwrap(), epsilon = 1e-4);
    }

    #[test]
    fn steering_moves_peak() {
        let mut rng = StdRng::seed_from_u64(5);
        for _ in 0..100 {
            let spacing = rng.gen_range(0.1..1.5);
            let θ_s = rng.gen_range(-1.5..1.5);
            let phase = TAU * spacing * f64::sin(θ_s);
            let ula = UniformLinearArray::new(
                &config(rng.gen_range(2..256), spacing, 3e9, phase),
                SpacingUnit::Wavelengths,
            );
            assert_relative_eq!(ula.amplitude(θ_s), 1., epsilon = 1e-9);
            assert_relative_eq!(ula.steering_angle().unwrap(), θ_s, epsilon = 1e-9);
        }
    }

    #[test]
    fn grating_lobes_appear_above_one_wavelength() {
        let half = UniformLinearArray::new(&config(8, 0.5, 3e9, 0.), SpacingUnit::Wavelengths);
        assert!(half.is_grating_lobe_free());
        assert_eq!(half.lobe_angles(), vec![0.]);

        let wide = UniformLinearArray::new(&config(8, 1.5, 3e9, 0.), SpacingUnit::Wavelengths);
        let lobes = wide.lobe_angles();
        assert_eq!(lobes.len(), 3);
        for lobe in lobes {
            assert_relative_eq!(wide.amplitude(lobe), 1., epsilon = 1e-9);
        }
    }

    #[test]
    fn huge_spacing_keeps_lobe_list_bounded() {
        let wide = UniformLinearArray::new(&config(8, 1e6, 3e9, 0.), SpacingUnit::Wavelengths);
        assert!((wide.lobe_count() - 2e6).abs() <= 1.);
        assert_eq!(wide.lobe_angles().len(), MAX_LISTED_LOBES);
        assert!(!wide.is_grating_lobe_free());

        let overflowed =
            UniformLinearArray::new(&config(16, 1e308, 3e9, 0.), SpacingUnit::Wavelengths);
        assert_eq!(overflowed.kd, f64::INFINITY);
        assert!(overflowed.lobe_angles().is_empty());
        assert!(!overflowed.is_grating_lobe_free());
        assert_eq!(overflowed.steering_angle(), Some(0.));
    }

    #[test]
    fn non_finite_psi_is_a_null() {
        let ula = UniformLinearArray::new(&config(16, 0.5, 3e9, 0.), SpacingUnit::Wavelengths);
        assert_eq!(ula.amplitude_psi(f64::NAN), 0.);
        assert_eq!(ula.amplitude_psi(f64::INFINITY), 0.);

        let overflowed =
            UniformLinearArray::new(&config(16, 1e308, 3e9, 0.), SpacingUnit::Wavelengths);
        assert_eq!(overflowed.amplitude_sin(0.3), 0.);
    }
}
