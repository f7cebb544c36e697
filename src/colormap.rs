use crate::config::Colormap;

pub const LUT_SIZE: usize = 256;

// Control points (position, rgb) for the heat map, linearly interpolated.
const HEAT_STOPS: [(f64, [f64; 3]); 6] = [
    (0.0, [0.0, 0.0, 0.0]),
    (0.2, [0.16, 0.04, 0.35]),
    (0.45, [0.6, 0.12, 0.38]),
    (0.7, [0.93, 0.36, 0.12]),
    (0.9, [0.98, 0.72, 0.2]),
    (1.0, [0.99, 0.99, 0.75]),
];

// Amplitude to colour lookup table.
#[derive(Clone)]
pub struct ColorTable {
    entries: [[u8; 3]; LUT_SIZE],
}

impl ColorTable {
    pub fn build(map: Colormap) -> ColorTable {
        let mut entries = [[0u8; 3]; LUT_SIZE];
        for (k, entry) in entries.iter_mut().enumerate() {
            let x = k as f64 / (LUT_SIZE - 1) as f64;
            let rgb = match map {
                Colormap::Heat => interpolate(&HEAT_STOPS, x),
                Colormap::RedGreen => [1. - x, x, 0.],
                Colormap::Grayscale => [x, x, x],
            };
            *entry = rgb.map(to_byte);
        }
        ColorTable { entries }
    }

    // `x` outside [0, 1] (or NaN) saturates to the ends of the table.
    pub fn lookup(&self, x: f64) -> [u8; 3] {
        let k = (x.clamp(0., 1.) * (LUT_SIZE - 1) as f64).round() as usize;
        self.entries[k.min(LUT_SIZE - 1)]
    }
}

// One table per colormap, built once by `initialise`.
pub struct ColorTables {
    heat: ColorTable,
    red_green: ColorTable,
    grayscale: ColorTable,
}

impl ColorTables {
    pub fn build() -> ColorTables {
        ColorTables {
            heat: ColorTable::build(Colormap::Heat),
            red_green: ColorTable::build(Colormap::RedGreen),
            grayscale: ColorTable::build(Colormap::Grayscale),
        }
    }

    pub fn get(&self, map: Colormap) -> &ColorTable {
        match map {
            Colormap::Heat => &self.heat,
            Colormap::RedGreen => &self.red_green,
            Colormap::Grayscale => &self.grayscale,
        }
    }
}

fn interpolate(stops: &[(f64, [f64; 3])], x: f64) -> [f64; 3] {
    for pair in stops.windows(2) {
        let (x0, c0) = pair[0];
        let (x1, c1) = pair[1];
        if x <= x1 {
            let t = ((x - x0) / (x1 - x0)).clamp(0., 1.);
            return [
                c0[0] + t * (c1[0] - c0[0]),
                c0[1] + t * (c1[1] - c0[1]),
                c0[2] + t * (c1[2] - c0[2]),
            ];
        }
    }
    stops[stops.len() - 1].1
}

fn to_byte(x: f64) -> u8 {
    (x.clamp(0., 1.) * 255.).round() as u8
}

#[cfg(test)]
mod test {
    use super::ColorTable;
    use crate::config::Colormap;

    #[test]
    fn ends_of_heat_map() {
        let table = ColorTable::build(Colormap::Heat);
        assert_eq!(table.lookup(0.), [0, 0, 0]);
        assert_eq!(table.lookup(1.), [252, 252, 191]);
        assert_eq!(table.lookup(-3.), table.lookup(0.));
        assert_eq!(table.lookup(f64::NAN), table.lookup(0.));
        assert_eq!(table.lookup(7.), table.lookup(1.));
    }

    #[test]
    fn heat_brightens_monotonically() {
        let table = ColorTable::build(Colormap::Heat);
        let luma = |rgb: [u8; 3]| rgb.iter().map(|&x| x as u32).sum::<u32>();
        let mut prev = 0;
        for k in 0..=20 {
            let current = luma(table.lookup(k as f64 / 20.));
            assert!(current >= prev);
            prev = current;
        }
    }

    #[test]
    fn red_green_ends() {
        let table = ColorTable::build(Colormap::RedGreen);
        assert_eq!(table.lookup(0.), [255, 0, 0]);
        assert_eq!(table.lookup(1.), [0, 255, 0]);
    }
}
