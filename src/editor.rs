//! The editor owns the project and every piece of interaction state.
//!
//! It is rendering-agnostic: the GUI forwards input here, then draws what the
//! editor exposes.

use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::calibration::{
    CalibrationOutcome, CalibrationSession, CalibrationState, DistanceReply, PendingMeasurement,
};
use crate::config::Settings;
use crate::error::{PlannerError, Result};
use crate::geometry::Point;
use crate::paint::{FinishedPath, PathAccumulator, PathLabel, PathRecord};
use crate::prefab::{PlacedObject, PrefabTemplate};
use crate::project::Project;
use crate::raster::{self, SiteImage, DEFAULT_CANVAS_SIZE};

#[derive(Clone, Debug, PartialEq)]
struct Snapshot {
    prefabs: Vec<PlacedObject>,
    paths: Vec<PathRecord>,
}

pub struct Editor {
    project: Project,
    site_image: Option<SiteImage>,
    /// Bumped whenever the background image changes
    image_generation: u64,
    project_path: Option<PathBuf>,

    calibration: CalibrationSession,
    pending_measurement: Option<PendingMeasurement>,
    paint: PathAccumulator,
    selected: Option<usize>,
    rotation_step_deg: f64,

    undo_stack: Vec<Snapshot>,
    redo_stack: Vec<Snapshot>,

    status: String,
}

impl Editor {
    pub fn new(settings: &Settings) -> Self {
        Self {
            project: Project::default(),
            site_image: None,
            image_generation: 0,
            project_path: None,
            calibration: CalibrationSession::new(),
            pending_measurement: None,
            paint: PathAccumulator::new(settings.brush_width_ft),
            selected: None,
            rotation_step_deg: settings.rotation_step_deg,
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
            status: "Welcome To Property Planner".to_string(),
        }
    }

    // ── Accessors ───────────────────────────────────────────────────────────

    pub fn project(&self) -> &Project {
        &self.project
    }

    pub fn site_image(&self) -> Option<&SiteImage> {
        self.site_image.as_ref()
    }

    pub fn image_generation(&self) -> u64 {
        self.image_generation
    }

    pub fn project_path(&self) -> Option<&Path> {
        self.project_path.as_deref()
    }

    pub fn canvas_size(&self) -> (f64, f64) {
        self.site_image
            .as_ref()
            .map_or(DEFAULT_CANVAS_SIZE, SiteImage::size)
    }

    pub fn status(&self) -> &str {
        &self.status
    }

    pub fn calibration(&self) -> &CalibrationSession {
        &self.calibration
    }

    pub fn pending_measurement(&self) -> Option<&PendingMeasurement> {
        self.pending_measurement.as_ref()
    }

    pub fn paint(&self) -> &PathAccumulator {
        &self.paint
    }

    pub fn selected(&self) -> Option<usize> {
        self.selected
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    fn set_status(&mut self, msg: impl Into<String>) {
        self.status = msg.into();
    }

    // ── Files ───────────────────────────────────────────────────────────────

    /// Replace the background image and start calibrating it. Existing
    /// objects are kept.
    pub fn open_image(&mut self, path: &Path) -> Result<()> {
        match SiteImage::load(path) {
            Ok(img) => {
                self.project.image_path = Some(path.to_path_buf());
                self.site_image = Some(img);
                self.image_generation += 1;
                info!("Loaded {}", path.display());
                self.begin_calibration();
                Ok(())
            }
            Err(e) => {
                self.set_status(e.to_string());
                Err(e)
            }
        }
    }

    /// Load a project. On a malformed file the current state is untouched;
    /// an unreadable image only drops the background.
    pub fn load_project(&mut self, path: &Path) -> Result<()> {
        let project = match Project::load_from_file(path) {
            Ok(p) => p,
            Err(e) => {
                warn!("Failed to load project: {e}");
                self.set_status(format!("Failed to load project: {e}"));
                return Err(e);
            }
        };

        let image_path = project.resolved_image_path(path);
        self.site_image = SiteImage::load_optional(image_path.as_deref());
        self.image_generation += 1;

        self.project = project;
        self.project_path = Some(path.to_path_buf());
        self.reset_interaction();
        self.undo_stack.clear();
        self.redo_stack.clear();

        self.set_status(match (&self.site_image, &self.project.image_path) {
            (None, Some(img)) => format!(
                "Loaded {} (image {} unavailable)",
                path.display(),
                img.display()
            ),
            _ => format!("Loaded {}", path.display()),
        });
        if let Some(scale) = self.project.scale.factor() {
            info!("{scale}");
        }
        Ok(())
    }

    pub fn save_project(&mut self, path: &Path) -> Result<()> {
        match self.project.save_to_file(path) {
            Ok(()) => {
                self.project_path = Some(path.to_path_buf());
                self.set_status("Project saved successfully.");
                Ok(())
            }
            Err(e) => {
                self.set_status(format!("Failed to save project: {e}"));
                Err(e)
            }
        }
    }

    /// Write `<stem>_annotated.png` next to the project or image.
    pub fn export_annotated(&mut self) -> Result<Option<PathBuf>> {
        let Some(site) = self.site_image.as_ref() else {
            self.set_status("No image to export");
            return Ok(None);
        };
        let source = self.project_path.as_deref().unwrap_or(&site.path);
        let out = raster::annotated_path(source);
        raster::export_annotated(&self.project, site, &out)?;
        self.set_status(format!("Exported to {}", out.display()));
        Ok(Some(out))
    }

    // ── Calibration ─────────────────────────────────────────────────────────

    pub fn begin_calibration(&mut self) {
        self.paint.set_label(None);
        self.pending_measurement = None;
        self.calibration.begin();
        self.set_status("Calibration: click the start of a known distance");
    }

    pub fn cancel_calibration(&mut self) {
        self.calibration.cancel();
        self.pending_measurement = None;
        self.set_status("Calibration cancelled");
    }

    pub fn is_calibrating(&self) -> bool {
        self.calibration.is_active()
    }

    /// Feed a click to the calibration session. When the end point lands, the
    /// measurement is parked until [`Editor::resolve_calibration`].
    pub fn calibration_click(&mut self, point: Point) -> bool {
        if self.pending_measurement.is_some() {
            return true;
        }
        match self.calibration.state() {
            CalibrationState::Idle => false,
            CalibrationState::AwaitingStart => {
                self.calibration.capture_start(point);
                self.set_status("Calibration: click the end of the known distance");
                true
            }
            CalibrationState::AwaitingEnd { .. } => {
                self.pending_measurement = self.calibration.capture_end(point);
                true
            }
        }
    }

    /// Apply the distance the user entered for the parked measurement.
    pub fn resolve_calibration(&mut self, reply: DistanceReply) -> CalibrationOutcome {
        let Some(pending) = self.pending_measurement.take() else {
            return CalibrationOutcome::Ignored;
        };
        let outcome = self.calibration.resolve(pending, reply);
        match outcome {
            CalibrationOutcome::Calibrated(scale) => {
                self.project.scale = scale.into();
                info!("{scale}");
                self.set_status(format!("Scale set: {scale}"));
            }
            CalibrationOutcome::Abandoned => {
                self.set_status(PlannerError::CalibrationAbandoned.to_string());
            }
            _ => {}
        }
        outcome
    }

    // ── Prefabs ─────────────────────────────────────────────────────────────

    pub fn place_prefab(&mut self, template: &PrefabTemplate) -> Result<usize> {
        let object = match PlacedObject::place(template, &self.project.scale) {
            Ok(o) => o,
            Err(e) => {
                warn!("{e}");
                self.set_status(e.to_string());
                return Err(e);
            }
        };
        self.push_undo();
        self.project.prefabs.push(object);
        let index = self.project.prefabs.len() - 1;
        self.selected = Some(index);
        self.set_status(format!("Placed {}", template.label));
        Ok(index)
    }

    /// Select the topmost prefab under `point`.
    /// Topmost prefab under `point`.
    pub fn prefab_at(&self, point: Point) -> Option<usize> {
        self.project.prefabs.iter().rposition(|p| p.contains(point))
    }

    pub fn select_at(&mut self, point: Point) -> Option<usize> {
        self.selected = self.prefab_at(point);
        self.selected
    }

    /// Rotate the prefab under `point`, but only when it is the selected one.
    pub fn rotate_at(&mut self, point: Point) -> bool {
        match self.selected {
            Some(index) if self.prefab_at(point) == Some(index) => self.rotate_selected(),
            _ => false,
        }
    }

    pub fn clear_selection(&mut self) {
        self.selected = None;
    }

    /// Record an undo point before a drag begins.
    pub fn begin_drag(&mut self) {
        if self.selected.is_some() {
            self.push_undo();
        }
    }

    pub fn drag_selected(&mut self, delta: Point) {
        if let Some(obj) = self.selected.and_then(|i| self.project.prefabs.get_mut(i)) {
            obj.move_by(delta);
        }
    }

    pub fn rotate_selected(&mut self) -> bool {
        let Some(index) = self.selected else {
            return false;
        };
        if index >= self.project.prefabs.len() {
            return false;
        }
        self.push_undo();
        let step = self.rotation_step_deg;
        let obj = &mut self.project.prefabs[index];
        obj.rotate_by(step);
        let msg = format!("Rotated {} to {}°", obj.label, obj.rotation_deg);
        self.set_status(msg);
        true
    }

    pub fn delete_selected(&mut self) -> bool {
        let Some(index) = self.selected.take() else {
            return false;
        };
        if index >= self.project.prefabs.len() {
            return false;
        }
        self.push_undo();
        let removed = self.project.prefabs.remove(index);
        info!(label = %removed.label, "Deleted prefab");
        self.set_status(format!("Removed {}", removed.label));
        true
    }

    // ── Paint ───────────────────────────────────────────────────────────────

    pub fn set_paint_label(&mut self, label: Option<PathLabel>) {
        if label.is_some() && self.calibration.is_active() {
            self.cancel_calibration();
        }
        self.paint.set_label(label);
        self.selected = None;
    }

    pub fn set_brush_width(&mut self, width_ft: f64) {
        self.paint.set_brush_width(width_ft);
    }

    pub fn paint_point(&mut self, point: Point) -> bool {
        self.paint.add_point(point, &self.project.scale)
    }

    /// Finish the current path, record it and report its length.
    pub fn finish_path(&mut self) -> Option<FinishedPath> {
        let finished = self.paint.finish(&self.project.scale)?;
        self.push_undo();
        self.project.paths.push(finished.record.clone());
        let mut msg = finished.summary();
        if !self.project.scale.is_calibrated() {
            msg.push_str(" (scale not calibrated)");
        }
        self.set_status(msg);
        Some(finished)
    }

    // ── Undo / Redo ─────────────────────────────────────────────────────────

    fn snapshot(&self) -> Snapshot {
        Snapshot {
            prefabs: self.project.prefabs.clone(),
            paths: self.project.paths.clone(),
        }
    }

    fn restore(&mut self, snap: Snapshot) {
        self.project.prefabs = snap.prefabs;
        self.project.paths = snap.paths;
        self.selected = None;
    }

    fn push_undo(&mut self) {
        self.undo_stack.push(self.snapshot());
        self.redo_stack.clear();
    }

    pub fn undo(&mut self) {
        if let Some(prev) = self.undo_stack.pop() {
            self.redo_stack.push(self.snapshot());
            self.restore(prev);
        }
    }

    pub fn redo(&mut self) {
        if let Some(next) = self.redo_stack.pop() {
            self.undo_stack.push(self.snapshot());
            self.restore(next);
        }
    }

    fn reset_interaction(&mut self) {
        self.calibration = CalibrationSession::new();
        self.pending_measurement = None;
        self.paint.set_label(None);
        self.selected = None;
    }
}

impl Default for Editor {
    fn default() -> Self {
        Self::new(&Settings::default())
    }
}
