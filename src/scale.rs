//! Feet-per-pixel scale model.

use std::fmt;

/// Feet per image pixel. Always finite and strictly positive.
#[derive(Clone, Copy, Debug, PartialEq, PartialOrd)]
pub struct ScaleFactor(f64);

impl ScaleFactor {
    /// Returns `None` unless `feet_per_pixel` is finite and `> 0`.
    pub fn new(feet_per_pixel: f64) -> Option<Self> {
        (feet_per_pixel.is_finite() && feet_per_pixel > 0.0).then_some(Self(feet_per_pixel))
    }

    /// Derive a scale from a known real distance over a measured pixel span.
    pub fn from_reference(real_feet: f64, pixel_distance: f64) -> Option<Self> {
        if pixel_distance <= 0.0 || real_feet <= 0.0 {
            return None;
        }
        Self::new(real_feet / pixel_distance)
    }

    pub fn feet_per_pixel(self) -> f64 {
        self.0
    }
}

impl fmt::Display for ScaleFactor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "1 pixel = {:.4} feet", self.0)
    }
}

/// Whether a scale has been set, either by calibration or from a project file.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum Calibration {
    #[default]
    Uncalibrated,
    Calibrated(ScaleFactor),
}

impl Calibration {
    /// Value used while nothing has been calibrated.
    pub const UNCALIBRATED_FEET_PER_PIXEL: f64 = 1.0;

    /// Current feet per pixel, falling back to the 1.0 sentinel.
    pub fn feet_per_pixel(&self) -> f64 {
        match self {
            Calibration::Uncalibrated => Self::UNCALIBRATED_FEET_PER_PIXEL,
            Calibration::Calibrated(s) => s.feet_per_pixel(),
        }
    }

    pub fn factor(&self) -> Option<ScaleFactor> {
        match self {
            Calibration::Uncalibrated => None,
            Calibration::Calibrated(s) => Some(*s),
        }
    }

    pub fn is_calibrated(&self) -> bool {
        matches!(self, Calibration::Calibrated(_))
    }

    pub fn pixels_to_feet(&self, pixels: f64) -> f64 {
        pixels * self.feet_per_pixel()
    }

    pub fn feet_to_pixels(&self, feet: f64) -> f64 {
        feet / self.feet_per_pixel()
    }

    /// Reads a stored scale value. Anything non-positive counts as never
    /// calibrated.
    pub fn from_stored(value: Option<f64>) -> Self {
        value
            .and_then(ScaleFactor::new)
            .map_or(Calibration::Uncalibrated, Calibration::Calibrated)
    }
}

impl From<ScaleFactor> for Calibration {
    fn from(s: ScaleFactor) -> Self {
        Calibration::Calibrated(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_non_positive() {
        assert!(ScaleFactor::new(0.0).is_none());
        assert!(ScaleFactor::new(-1.0).is_none());
        assert!(ScaleFactor::new(f64::NAN).is_none());
        assert!(ScaleFactor::new(f64::INFINITY).is_none());
        assert!(ScaleFactor::new(0.25).is_some());
    }

    #[test]
    fn reference_with_zero_span_is_none() {
        assert!(ScaleFactor::from_reference(100.0, 0.0).is_none());
        assert!(ScaleFactor::from_reference(0.0, 10.0).is_none());
        let s = ScaleFactor::from_reference(100.0, 400.0).unwrap();
        assert_eq!(s.feet_per_pixel(), 0.25);
    }

    #[test]
    fn uncalibrated_differs_from_one() {
        let one = Calibration::Calibrated(ScaleFactor::new(1.0).unwrap());
        assert_ne!(Calibration::Uncalibrated, one);
        assert_eq!(Calibration::Uncalibrated.feet_per_pixel(), one.feet_per_pixel());
        assert!(!Calibration::Uncalibrated.is_calibrated());
    }

    #[test]
    fn stored_values() {
        assert_eq!(Calibration::from_stored(None), Calibration::Uncalibrated);
        assert_eq!(Calibration::from_stored(Some(0.0)), Calibration::Uncalibrated);
        assert_eq!(
            Calibration::from_stored(Some(0.5)).feet_per_pixel(),
            0.5
        );
    }

    #[test]
    fn conversions() {
        let c = Calibration::Calibrated(ScaleFactor::new(0.5).unwrap());
        assert_eq!(c.feet_to_pixels(40.0), 80.0);
        assert_eq!(c.pixels_to_feet(80.0), 40.0);
    }
}
