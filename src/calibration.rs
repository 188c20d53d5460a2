//! Two-click scale calibration.
//!
//! The user clicks the two ends of a feature of known length, then enters
//! that length in feet. The pixel span between the clicks is measured with
//! the city-block metric, same as path lengths.

use tracing::{debug, info};

use crate::geometry::Point;
use crate::scale::ScaleFactor;

/// Answer from the real-world distance prompt.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DistanceReply {
    pub feet: f64,
    pub confirmed: bool,
}

impl DistanceReply {
    pub fn confirmed(feet: f64) -> Self {
        Self {
            feet,
            confirmed: true,
        }
    }

    pub fn cancelled() -> Self {
        Self {
            feet: 0.0,
            confirmed: false,
        }
    }
}

/// Asks the user for the real-world length of the reference line.
pub trait DistancePrompt {
    fn request_distance(&mut self) -> DistanceReply;
}

impl<F> DistancePrompt for F
where
    F: FnMut() -> DistanceReply,
{
    fn request_distance(&mut self) -> DistanceReply {
        self()
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum CalibrationState {
    #[default]
    Idle,
    AwaitingStart,
    AwaitingEnd {
        start: Point,
    },
}

/// A measured reference line waiting for its real-world length.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PendingMeasurement {
    pub start: Point,
    pub end: Point,
    pub pixel_distance: f64,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum CalibrationOutcome {
    /// No session is running; the click was not consumed.
    Ignored,
    StartCaptured(Point),
    Calibrated(ScaleFactor),
    /// Cancelled or invalid; the scale is unchanged and a new start point is expected.
    Abandoned,
}

#[derive(Debug, Default)]
pub struct CalibrationSession {
    state: CalibrationState,
    reference_line: Option<(Point, Point)>,
}

impl CalibrationSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> CalibrationState {
        self.state
    }

    pub fn is_active(&self) -> bool {
        self.state != CalibrationState::Idle
    }

    /// Last measured reference line, kept for display until the next `begin`.
    pub fn reference_line(&self) -> Option<(Point, Point)> {
        self.reference_line
    }

    pub fn begin(&mut self) {
        info!("Scale calibration started");
        self.state = CalibrationState::AwaitingStart;
        self.reference_line = None;
    }

    pub fn cancel(&mut self) {
        if self.is_active() {
            info!("Scale calibration cancelled");
        }
        self.state = CalibrationState::Idle;
    }

    /// Handle a click with a synchronous distance prompt.
    pub fn capture(&mut self, point: Point, prompt: &mut dyn DistancePrompt) -> CalibrationOutcome {
        match self.state {
            CalibrationState::Idle => CalibrationOutcome::Ignored,
            CalibrationState::AwaitingStart => self.capture_start(point),
            CalibrationState::AwaitingEnd { .. } => match self.capture_end(point) {
                Some(pending) => {
                    let reply = prompt.request_distance();
                    self.resolve(pending, reply)
                }
                None => CalibrationOutcome::Ignored,
            },
        }
    }

    /// Store the start point. Only meaningful in `AwaitingStart`.
    pub fn capture_start(&mut self, point: Point) -> CalibrationOutcome {
        if self.state != CalibrationState::AwaitingStart {
            return CalibrationOutcome::Ignored;
        }
        debug!(x = point.x, y = point.y, "Calibration start point");
        self.state = CalibrationState::AwaitingEnd { start: point };
        CalibrationOutcome::StartCaptured(point)
    }

    /// Measure the reference line ending at `point`. The session stays in
    /// `AwaitingEnd` until the measurement is resolved.
    pub fn capture_end(&mut self, point: Point) -> Option<PendingMeasurement> {
        let CalibrationState::AwaitingEnd { start } = self.state else {
            return None;
        };
        let pixel_distance = start.manhattan_distance(point);
        debug!(x = point.x, y = point.y, pixel_distance, "Calibration end point");
        self.reference_line = Some((start, point));
        Some(PendingMeasurement {
            start,
            end: point,
            pixel_distance,
        })
    }

    /// Turn a measurement and the user's answer into a scale, or abandon.
    pub fn resolve(
        &mut self,
        pending: PendingMeasurement,
        reply: DistanceReply,
    ) -> CalibrationOutcome {
        let scale = if reply.confirmed {
            ScaleFactor::from_reference(reply.feet, pending.pixel_distance)
        } else {
            None
        };

        match scale {
            Some(scale) => {
                info!(
                    "{:.2} feet over {:.2} pixels = {:.4} feet/pixel",
                    reply.feet,
                    pending.pixel_distance,
                    scale.feet_per_pixel()
                );
                self.state = CalibrationState::Idle;
                CalibrationOutcome::Calibrated(scale)
            }
            None => {
                info!("Calibration canceled or invalid distance");
                self.state = CalibrationState::AwaitingStart;
                CalibrationOutcome::Abandoned
            }
        }
    }
}
