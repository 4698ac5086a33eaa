/// Scores how likely rain is from one set of physical readings.
///
/// Implementations must be total and free of side effects: the same inputs
/// always produce the same score, and every input (including non-finite
/// values) produces one. Scores are percentages in `[0, 100]`; callers clamp
/// anything outside that range.
pub trait RainClassifier {
    /// Temperature in °C, pressure in hPa, relative humidity in %.
    fn rain_probability(&self, temperature: f32, pressure: f32, humidity: f32) -> f32;
}

impl<F> RainClassifier for F
where
    F: Fn(f32, f32, f32) -> f32,
{
    fn rain_probability(&self, temperature: f32, pressure: f32, humidity: f32) -> f32 {
        self(temperature, pressure, humidity)
    }
}
