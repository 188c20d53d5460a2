//! Project files (`*.pproj`).
//!
//! A project is the image reference, the scale and the two ordered record
//! collections. The on-disk form is pretty-printed JSON:
//!
//! ```json
//! {
//!   "image_path": "site.png",
//!   "scale": 0.25,
//!   "prefabs": [{"label": "Solar Panel", "width": 16.0, "height": 8.0,
//!                "x": 0.0, "y": 0.0, "rotation": 15.0}],
//!   "paths": [{"label": "Fence", "color": "#000000",
//!              "points": [[0.0, 0.0], [10.0, 0.0]], "width": 8.0}]
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::color::Color4;
use crate::error::{PlannerError, Result};
use crate::geometry::Point;
use crate::paint::{PathLabel, PathRecord, DEFAULT_BRUSH_WIDTH_FT};
use crate::prefab::PlacedObject;
use crate::scale::{Calibration, ScaleFactor};

pub const PROJECT_EXTENSION: &str = "pproj";

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Project {
    pub image_path: Option<PathBuf>,
    pub scale: Calibration,
    pub prefabs: Vec<PlacedObject>,
    pub paths: Vec<PathRecord>,
}

// ── File Schema ─────────────────────────────────────────────────────────────

#[derive(Clone, Debug, Serialize, Deserialize)]
struct ProjectFile {
    #[serde(default)]
    image_path: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    scale: Option<f64>,
    #[serde(default)]
    prefabs: Vec<PrefabEntry>,
    #[serde(default)]
    paths: Vec<PathEntry>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
struct PrefabEntry {
    #[serde(default = "default_prefab_label")]
    label: String,
    width: f64,
    height: f64,
    x: f64,
    y: f64,
    #[serde(default)]
    rotation: f64,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
struct PathEntry {
    #[serde(default)]
    label: PathLabel,
    #[serde(default)]
    color: Color4,
    points: Vec<Point>,
    #[serde(default = "default_path_width")]
    width: f64,
}

fn default_prefab_label() -> String {
    "Prefab".to_string()
}

fn default_path_width() -> f64 {
    DEFAULT_BRUSH_WIDTH_FT
}

impl From<&PlacedObject> for PrefabEntry {
    fn from(obj: &PlacedObject) -> Self {
        Self {
            label: obj.label.clone(),
            width: obj.width_px,
            height: obj.height_px,
            x: obj.position.x,
            y: obj.position.y,
            rotation: obj.rotation_deg,
        }
    }
}

impl From<PrefabEntry> for PlacedObject {
    fn from(e: PrefabEntry) -> Self {
        Self {
            label: e.label,
            width_px: e.width,
            height_px: e.height,
            position: Point::new(e.x, e.y),
            rotation_deg: e.rotation,
        }
    }
}

impl From<&PathRecord> for PathEntry {
    fn from(p: &PathRecord) -> Self {
        Self {
            label: p.label,
            color: p.color,
            points: p.points.clone(),
            width: p.width_ft,
        }
    }
}

impl From<PathEntry> for PathRecord {
    fn from(e: PathEntry) -> Self {
        // the stored hex has no alpha
        let color = match e.label {
            PathLabel::Eraser => PathLabel::Eraser.color(),
            _ => e.color,
        };
        Self {
            label: e.label,
            color,
            width_ft: e.width,
            points: e.points,
        }
    }
}

// ── Save / Load ─────────────────────────────────────────────────────────────

impl Project {
    pub fn new(image_path: Option<PathBuf>) -> Self {
        Self {
            image_path,
            ..Default::default()
        }
    }

    /// Serialize to pretty JSON. An uncalibrated project has no `scale` key.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let file = ProjectFile {
            image_path: self.image_path.clone(),
            scale: self.scale.factor().map(ScaleFactor::feet_per_pixel),
            prefabs: self.prefabs.iter().map(PrefabEntry::from).collect(),
            paths: self.paths.iter().map(PathEntry::from).collect(),
        };
        Ok(serde_json::to_vec_pretty(&file)?)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let file: ProjectFile = serde_json::from_slice(bytes)?;

        let mut paths = Vec::with_capacity(file.paths.len());
        for entry in file.paths {
            if entry.points.len() < 2 {
                warn!(
                    label = %entry.label,
                    points = entry.points.len(),
                    "Skipping path with fewer than two points"
                );
                continue;
            }
            paths.push(PathRecord::from(entry));
        }

        Ok(Self {
            image_path: file.image_path,
            scale: Calibration::from_stored(file.scale),
            prefabs: file.prefabs.into_iter().map(PlacedObject::from).collect(),
            paths,
        })
    }

    pub fn save_to_file(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let bytes = self.to_bytes()?;
        std::fs::write(path, bytes).map_err(|source| PlannerError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        info!(
            path = %path.display(),
            prefabs = self.prefabs.len(),
            paths = self.paths.len(),
            "Project saved"
        );
        Ok(())
    }

    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path).map_err(|source| PlannerError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let project = Self::from_bytes(&bytes)?;
        info!(
            path = %path.display(),
            prefabs = project.prefabs.len(),
            paths = project.paths.len(),
            "Project loaded"
        );
        Ok(project)
    }

    /// Image path resolved against the project file's directory when relative.
    pub fn resolved_image_path(&self, project_file: &Path) -> Option<PathBuf> {
        let image = self.image_path.as_ref()?;
        if image.is_absolute() {
            return Some(image.clone());
        }
        let base = project_file.parent().unwrap_or_else(|| Path::new(""));
        let candidate = base.join(image);
        Some(if candidate.exists() {
            candidate
        } else {
            image.clone()
        })
    }
}
