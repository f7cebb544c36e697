// A radiation pattern of a planar array, looked up by the angle from broadside.
pub trait AngularPattern {
    fn amplitude(&self, theta: f64) -> f64;
}

pub trait AngularPatternHelper {
    fn amplitude_many(&self, items: impl Iterator<Item = f64>) -> Vec<f64>;
}

impl<T: AngularPattern> AngularPatternHelper for T {
    fn amplitude_many(&self, items: impl Iterator<Item = f64>) -> Vec<f64> {
        items.map(|x| self.amplitude(x)).collect()
    }
}
