//! Property Planner
//!
//! Annotate a site image with scaled prefabs and measured utility paths.
//! Everything except [`app`] is independent of the GUI toolkit.

pub mod app;
pub mod calibration;
pub mod color;
pub mod config;
pub mod editor;
pub mod error;
pub mod geometry;
pub mod paint;
pub mod prefab;
pub mod project;
pub mod raster;
pub mod scale;

pub use calibration::{CalibrationOutcome, CalibrationSession, DistancePrompt, DistanceReply};
pub use config::Settings;
pub use editor::Editor;
pub use error::{PlannerError, Result};
pub use geometry::Point;
pub use paint::{FinishedPath, PathAccumulator, PathLabel, PathRecord};
pub use prefab::{PlacedObject, PrefabTemplate};
pub use project::Project;
pub use scale::{Calibration, ScaleFactor};

/// Initialize logging.
///
/// `RUST_LOG` wins over `default_filter` when set.
pub fn init_logging(default_filter: &str) -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::EnvFilter;

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_filter))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_level(true)
        .with_line_number(true);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()?;

    Ok(())
}
