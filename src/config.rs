//! User settings, persisted as JSON in the platform config directory.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::error::{PlannerError, Result};
use crate::paint::DEFAULT_BRUSH_WIDTH_FT;
use crate::prefab::{PrefabTemplate, ROTATION_STEP_DEG};

const APP_DIR: &str = "property-planner";
const SETTINGS_FILE: &str = "settings.json";

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Brush width selected at startup, in feet
    pub brush_width_ft: f64,
    /// Widths offered in the toolbar, in feet
    pub brush_widths_ft: Vec<f64>,
    pub rotation_step_deg: f64,
    pub prefabs: Vec<PrefabTemplate>,
    /// `EnvFilter` directive used when `RUST_LOG` is unset
    pub log_filter: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            brush_width_ft: DEFAULT_BRUSH_WIDTH_FT,
            brush_widths_ft: (1..=10).map(|i| f64::from(i * 2)).collect(),
            rotation_step_deg: ROTATION_STEP_DEG,
            prefabs: PrefabTemplate::default_catalog(),
            log_filter: "info".to_string(),
        }
    }
}

impl Settings {
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join(APP_DIR).join(SETTINGS_FILE))
    }

    /// Load from the default location. An unreadable or malformed file yields
    /// defaults plus the error, so the caller can report it once logging is up.
    pub fn load_or_default() -> (Self, Option<PlannerError>) {
        let Some(path) = Self::default_path() else {
            return (Self::default(), None);
        };
        match Self::load_from(&path) {
            Ok(settings) => (settings, None),
            Err(e) => (Self::default(), Some(e)),
        }
    }

    /// A missing file is not an error and gives defaults.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let data = std::fs::read_to_string(path).map_err(|source| PlannerError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&data).map_err(|source| PlannerError::MalformedSettings {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Write to the default location.
    pub fn save(&self) -> Result<()> {
        match Self::default_path() {
            Some(path) => self.save_to(&path),
            None => {
                warn!("No config directory; settings not saved");
                Ok(())
            }
        }
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        let io_err = |source| PlannerError::Io {
            path: path.to_path_buf(),
            source,
        };
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir).map_err(io_err)?;
        }
        let data = serde_json::to_string_pretty(self)?;
        std::fs::write(path, data).map_err(io_err)?;
        info!(path = %path.display(), "Settings saved");
        Ok(())
    }
}
