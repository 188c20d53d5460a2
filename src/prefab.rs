//! Rectangular prefab objects placed on the site image.

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{PlannerError, Result};
use crate::geometry::Point;
use crate::scale::Calibration;

/// Degrees added by one rotate action.
pub const ROTATION_STEP_DEG: f64 = 15.0;

/// A placeable object with real-world dimensions.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PrefabTemplate {
    pub label: String,
    pub width_ft: f64,
    pub height_ft: f64,
}

impl PrefabTemplate {
    pub fn new(label: impl Into<String>, width_ft: f64, height_ft: f64) -> Self {
        Self {
            label: label.into(),
            width_ft,
            height_ft,
        }
    }

    /// The toolbar catalog.
    pub fn default_catalog() -> Vec<PrefabTemplate> {
        vec![
            PrefabTemplate::new("Container 40'", 40.0, 8.0),
            PrefabTemplate::new("Pickup Truck", 18.0, 6.5),
            PrefabTemplate::new("Solar Panel", 4.0, 2.0),
            PrefabTemplate::new("Planter Box", 6.0, 2.0),
        ]
    }
}

/// A prefab on the canvas. Sizes are in image pixels; the rectangle is
/// anchored at its top-left corner and rotated about that corner.
#[derive(Clone, Debug, PartialEq)]
pub struct PlacedObject {
    pub label: String,
    pub width_px: f64,
    pub height_px: f64,
    pub position: Point,
    pub rotation_deg: f64,
}

impl PlacedObject {
    /// Size the template at the current scale and drop it at the origin.
    pub fn place(template: &PrefabTemplate, scale: &Calibration) -> Result<Self> {
        if !scale.is_calibrated() {
            return Err(PlannerError::ScaleNotCalibrated);
        }
        let object = Self {
            label: template.label.clone(),
            width_px: scale.feet_to_pixels(template.width_ft),
            height_px: scale.feet_to_pixels(template.height_ft),
            position: Point::ORIGIN,
            rotation_deg: 0.0,
        };
        info!(
            label = %object.label,
            width_px = object.width_px,
            height_px = object.height_px,
            "Placed prefab"
        );
        Ok(object)
    }

    pub fn move_by(&mut self, delta: Point) {
        self.position = self.position + delta;
    }

    /// Add `step` degrees, keeping the angle in `[0, 360)`.
    pub fn rotate_by(&mut self, step: f64) {
        self.rotation_deg = (self.rotation_deg + step).rem_euclid(360.0);
        info!(label = %self.label, rotation = self.rotation_deg, "Rotated prefab");
    }

    /// Corners in image space, clockwise from the anchor.
    pub fn corners(&self) -> [Point; 4] {
        let o = self.position;
        [
            o,
            Point::new(o.x + self.width_px, o.y),
            Point::new(o.x + self.width_px, o.y + self.height_px),
            Point::new(o.x, o.y + self.height_px),
        ]
        .map(|p| p.rotated_about(o, self.rotation_deg))
    }

    /// Hit test in image space, honoring rotation.
    pub fn contains(&self, point: Point) -> bool {
        let local = point.rotated_about(self.position, -self.rotation_deg) - self.position;
        (0.0..=self.width_px).contains(&local.x) && (0.0..=self.height_px).contains(&local.y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scale::ScaleFactor;

    fn scale(fpp: f64) -> Calibration {
        Calibration::Calibrated(ScaleFactor::new(fpp).unwrap())
    }

    #[test]
    fn uncalibrated_placement_fails() {
        let t = PrefabTemplate::new("Solar Panel", 4.0, 2.0);
        let err = PlacedObject::place(&t, &Calibration::Uncalibrated).unwrap_err();
        assert!(matches!(err, PlannerError::ScaleNotCalibrated));
    }

    #[test]
    fn rotation_wraps() {
        let t = PrefabTemplate::new("Planter Box", 6.0, 2.0);
        let mut obj = PlacedObject::place(&t, &scale(1.0)).unwrap();
        for _ in 0..25 {
            obj.rotate_by(ROTATION_STEP_DEG);
        }
        assert!((obj.rotation_deg - 15.0).abs() < 1e-9);
    }

    #[test]
    fn contains_honors_rotation() {
        let t = PrefabTemplate::new("Container 40'", 40.0, 8.0);
        let mut obj = PlacedObject::place(&t, &scale(1.0)).unwrap();
        obj.move_by(Point::new(100.0, 100.0));
        assert!(obj.contains(Point::new(130.0, 104.0)));
        assert!(!obj.contains(Point::new(104.0, 130.0)));

        obj.rotation_deg = 90.0;
        assert!(obj.contains(Point::new(96.0, 130.0)));
        assert!(!obj.contains(Point::new(130.0, 104.0)));
    }

    #[test]
    fn corners_start_at_anchor() {
        let t = PrefabTemplate::new("Solar Panel", 4.0, 2.0);
        let obj = PlacedObject::place(&t, &scale(0.5)).unwrap();
        let c = obj.corners();
        assert_eq!(c[0], Point::ORIGIN);
        assert_eq!(c[2], Point::new(8.0, 4.0));
    }
}
