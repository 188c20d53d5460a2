//! Freehand path drawing.
//!
//! Points are accumulated click by click under the armed label. Finishing a
//! path measures it by summing city-block segment lengths and scaling them
//! to feet.

use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, info};

use crate::color::Color4;
use crate::geometry::{polyline_manhattan_length, Point};
use crate::scale::Calibration;

/// Default brush width in feet.
pub const DEFAULT_BRUSH_WIDTH_FT: f64 = 8.0;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum PathLabel {
    GravelDriveway,
    WaterLine,
    PowerLine,
    Fence,
    FluorescentRed,
    FluorescentGreen,
    FluorescentYellow,
    FluorescentBlue,
    FluorescentOrange,
    FluorescentPurple,
    Eraser,
    #[default]
    Unnamed,
}

impl PathLabel {
    /// Labels offered by the paint tool, in menu order.
    pub const PAINTABLE: [PathLabel; 11] = [
        PathLabel::GravelDriveway,
        PathLabel::WaterLine,
        PathLabel::PowerLine,
        PathLabel::Fence,
        PathLabel::FluorescentRed,
        PathLabel::FluorescentGreen,
        PathLabel::FluorescentYellow,
        PathLabel::FluorescentBlue,
        PathLabel::FluorescentOrange,
        PathLabel::FluorescentPurple,
        PathLabel::Eraser,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            PathLabel::GravelDriveway => "Gravel Driveway",
            PathLabel::WaterLine => "Water Line",
            PathLabel::PowerLine => "Power Line",
            PathLabel::Fence => "Fence",
            PathLabel::FluorescentRed => "Fluorescent Red",
            PathLabel::FluorescentGreen => "Fluorescent Green",
            PathLabel::FluorescentYellow => "Fluorescent Yellow",
            PathLabel::FluorescentBlue => "Fluorescent Blue",
            PathLabel::FluorescentOrange => "Fluorescent Orange",
            PathLabel::FluorescentPurple => "Fluorescent Purple",
            PathLabel::Eraser => "Eraser",
            PathLabel::Unnamed => "Unnamed",
        }
    }

    pub fn color(&self) -> Color4 {
        match self {
            PathLabel::GravelDriveway => Color4::rgb(0xa0, 0xa0, 0xa4),
            PathLabel::WaterLine => Color4::rgb(0x00, 0x00, 0xff),
            PathLabel::PowerLine => Color4::rgb(0xff, 0xff, 0x00),
            PathLabel::Fence => Color4::BLACK,
            PathLabel::FluorescentRed => Color4::rgb(0xff, 0x00, 0x00),
            PathLabel::FluorescentGreen => Color4::rgb(0x00, 0xff, 0x00),
            PathLabel::FluorescentYellow => Color4::rgb(0xff, 0xff, 0x00),
            PathLabel::FluorescentBlue => Color4::rgb(0x00, 0xff, 0xff),
            PathLabel::FluorescentOrange => Color4::rgb(0x80, 0x80, 0x00),
            PathLabel::FluorescentPurple => Color4::rgb(0xff, 0x00, 0xff),
            PathLabel::Eraser => Color4::TRANSPARENT,
            PathLabel::Unnamed => Color4::rgb(0x80, 0x80, 0x80),
        }
    }
}

impl fmt::Display for PathLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl From<&str> for PathLabel {
    /// Unknown names map to `Unnamed`.
    fn from(s: &str) -> Self {
        PathLabel::PAINTABLE
            .into_iter()
            .find(|l| l.name() == s)
            .unwrap_or(PathLabel::Unnamed)
    }
}

impl From<String> for PathLabel {
    fn from(s: String) -> Self {
        PathLabel::from(s.as_str())
    }
}

impl From<PathLabel> for String {
    fn from(l: PathLabel) -> Self {
        l.name().to_string()
    }
}

/// A finished, labeled polyline.
#[derive(Clone, Debug, PartialEq)]
pub struct PathRecord {
    pub label: PathLabel,
    pub color: Color4,
    pub width_ft: f64,
    pub points: Vec<Point>,
}

impl PathRecord {
    pub fn pixel_length(&self) -> f64 {
        polyline_manhattan_length(&self.points)
    }

    /// Length in feet at the given scale.
    pub fn length_feet(&self, scale: &Calibration) -> f64 {
        scale.pixels_to_feet(self.pixel_length())
    }

    pub fn stroke_width_px(&self, scale: &Calibration) -> f64 {
        scale.feet_to_pixels(self.width_ft)
    }
}

/// Geometry and style of the path being drawn.
#[derive(Clone, Debug, PartialEq)]
pub struct PathPreview {
    pub points: Vec<Point>,
    pub color: Color4,
    pub width_px: f64,
}

/// Returned by [`PathAccumulator::finish`] for status reporting.
#[derive(Clone, Debug, PartialEq)]
pub struct FinishedPath {
    pub record: PathRecord,
    pub length_ft: f64,
}

impl FinishedPath {
    pub fn summary(&self) -> String {
        format!("{} added {:.1}ft", self.record.label, self.length_ft)
    }
}

#[derive(Debug)]
pub struct PathAccumulator {
    active_label: Option<PathLabel>,
    brush_width_ft: f64,
    // label and width are captured when the first point lands
    current: Option<PathRecord>,
    preview: Option<PathPreview>,
}

impl Default for PathAccumulator {
    fn default() -> Self {
        Self::new(DEFAULT_BRUSH_WIDTH_FT)
    }
}

impl PathAccumulator {
    pub fn new(brush_width_ft: f64) -> Self {
        Self {
            active_label: None,
            brush_width_ft,
            current: None,
            preview: None,
        }
    }

    pub fn active_label(&self) -> Option<PathLabel> {
        self.active_label
    }

    pub fn is_armed(&self) -> bool {
        self.active_label.is_some()
    }

    pub fn brush_width(&self) -> f64 {
        self.brush_width_ft
    }

    pub fn point_count(&self) -> usize {
        self.current.as_ref().map_or(0, |p| p.points.len())
    }

    pub fn preview(&self) -> Option<&PathPreview> {
        self.preview.as_ref()
    }

    /// Arm drawing with `label`, or disarm with `None`. Disarming drops any
    /// unfinished path.
    pub fn set_label(&mut self, label: Option<PathLabel>) {
        info!("Paint mode set to: {}", label.map_or("none", |l| l.name()));
        if label.is_none() {
            self.clear();
        }
        self.active_label = label;
    }

    pub fn set_brush_width(&mut self, width_ft: f64) {
        info!("Brush width set to: {width_ft} ft");
        self.brush_width_ft = width_ft;
    }

    /// Append a point to the current path. Returns `false` when no label is armed.
    pub fn add_point(&mut self, point: Point, scale: &Calibration) -> bool {
        let Some(label) = self.active_label else {
            return false;
        };

        let brush_width_ft = self.brush_width_ft;
        let path = self.current.get_or_insert_with(|| {
            info!("Started new path: {label}");
            PathRecord {
                label,
                color: label.color(),
                width_ft: brush_width_ft,
                points: Vec::new(),
            }
        });
        path.points.push(point);
        debug!(x = point.x, y = point.y, "Adding point");

        self.preview = Some(PathPreview {
            points: path.points.clone(),
            color: path.color,
            width_px: path.stroke_width_px(scale),
        });
        true
    }

    /// Finalize the current path. Paths with fewer than two points are
    /// dropped and `None` is returned.
    pub fn finish(&mut self, scale: &Calibration) -> Option<FinishedPath> {
        let current = self.current.take();
        self.preview = None;

        let record = match current {
            Some(record) if record.points.len() >= 2 => record,
            _ => {
                info!("Invalid or incomplete path, removing");
                return None;
            }
        };

        let length_ft = record.length_feet(scale);
        info!(label = %record.label, length_ft, "Path finished");
        Some(FinishedPath { record, length_ft })
    }

    fn clear(&mut self) {
        self.current = None;
        self.preview = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scale::ScaleFactor;

    fn half_foot() -> Calibration {
        Calibration::Calibrated(ScaleFactor::new(0.5).unwrap())
    }

    #[test]
    fn label_names_round_trip() {
        for label in PathLabel::PAINTABLE {
            assert_eq!(PathLabel::from(label.name()), label);
        }
        assert_eq!(PathLabel::from("Sewer"), PathLabel::Unnamed);
    }

    #[test]
    fn preview_width_follows_scale() {
        let mut acc = PathAccumulator::new(4.0);
        acc.set_label(Some(PathLabel::Fence));
        acc.add_point(Point::ORIGIN, &half_foot());
        let preview = acc.preview().unwrap();
        assert_eq!(preview.width_px, 8.0);
        assert_eq!(preview.points.len(), 1);
        assert_eq!(preview.color, Color4::BLACK);
    }

    #[test]
    fn disarming_drops_current_path() {
        let mut acc = PathAccumulator::default();
        acc.set_label(Some(PathLabel::WaterLine));
        acc.add_point(Point::ORIGIN, &half_foot());
        acc.set_label(None);
        assert_eq!(acc.point_count(), 0);
        assert!(acc.preview().is_none());
        assert!(!acc.add_point(Point::new(1.0, 1.0), &half_foot()));
    }

    #[test]
    fn summary_matches_status_format() {
        let mut acc = PathAccumulator::default();
        acc.set_label(Some(PathLabel::WaterLine));
        acc.add_point(Point::new(0.0, 0.0), &half_foot());
        acc.add_point(Point::new(30.0, 52.0), &half_foot());
        let done = acc.finish(&half_foot()).unwrap();
        assert_eq!(done.summary(), "Water Line added 41.0ft");
    }
}
