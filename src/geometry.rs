//! Image-space points and the distance used by every measurement.

use serde::{Deserialize, Serialize};
use std::ops::{Add, Sub};

/// A point in image pixel coordinates.
///
/// Serialized as a two-element array `[x, y]`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 2]", into = "[f64; 2]")]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const ORIGIN: Point = Point { x: 0.0, y: 0.0 };

    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// City-block length of the vector `(x, y)`.
    pub fn manhattan_length(&self) -> f64 {
        self.x.abs() + self.y.abs()
    }

    /// City-block distance to `other`. All measurements use this metric,
    /// not the Euclidean one.
    pub fn manhattan_distance(&self, other: Point) -> f64 {
        (other - *self).manhattan_length()
    }

    /// Rotate around `origin` by `degrees` (clockwise on screen, y down).
    pub fn rotated_about(&self, origin: Point, degrees: f64) -> Point {
        let (sin, cos) = degrees.to_radians().sin_cos();
        let d = *self - origin;
        Point::new(
            origin.x + d.x * cos - d.y * sin,
            origin.y + d.x * sin + d.y * cos,
        )
    }
}

impl Add for Point {
    type Output = Point;

    fn add(self, rhs: Point) -> Point {
        Point::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Point {
    type Output = Point;

    fn sub(self, rhs: Point) -> Point {
        Point::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl From<[f64; 2]> for Point {
    fn from(p: [f64; 2]) -> Self {
        Point::new(p[0], p[1])
    }
}

impl From<Point> for [f64; 2] {
    fn from(p: Point) -> Self {
        [p.x, p.y]
    }
}

impl From<egui::Pos2> for Point {
    fn from(p: egui::Pos2) -> Self {
        Point::new(p.x as f64, p.y as f64)
    }
}

impl From<Point> for egui::Pos2 {
    fn from(p: Point) -> Self {
        egui::pos2(p.x as f32, p.y as f32)
    }
}

/// Sum of the city-block distances between consecutive points, in pixels.
pub fn polyline_manhattan_length(points: &[Point]) -> f64 {
    points
        .windows(2)
        .map(|w| w[0].manhattan_distance(w[1]))
        .sum()
}
