//! Error types for the planner.
//!
//! None of these are fatal: the editor reports them through the status bar
//! and keeps running.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PlannerError {
    /// A prefab was placed before the scale was calibrated
    #[error("Please calibrate the scale before placing objects.")]
    ScaleNotCalibrated,

    /// The reference distance was cancelled, zero or non-positive
    #[error("Calibration canceled or invalid distance")]
    CalibrationAbandoned,

    /// The project file does not match the expected schema
    #[error("Malformed project file: {0}")]
    MalformedProject(#[from] serde_json::Error),

    /// The settings file exists but is not valid settings JSON
    #[error("Malformed settings file {}: {source}", path.display())]
    MalformedSettings {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// The background image is missing or cannot be decoded
    #[error("Cannot read image {}: {source}", path.display())]
    ImageUnreadable {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("Cannot write image {}: {source}", path.display())]
    ExportFailed {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A stored color is not of the form `#RRGGBB`
    #[error("Invalid color: {0}")]
    InvalidColor(String),
}

pub type Result<T> = std::result::Result<T, PlannerError>;
