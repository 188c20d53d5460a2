use property_planner::calibration::{CalibrationOutcome, DistanceReply};
use property_planner::{Editor, PathLabel, PlannerError, Point, PrefabTemplate, Project};

fn calibrated_editor(feet_per_pixel: f64) -> Editor {
    let mut ed = Editor::default();
    ed.begin_calibration();
    assert!(ed.calibration_click(Point::new(0.0, 0.0)));
    assert!(ed.calibration_click(Point::new(100.0, 0.0)));
    let outcome = ed.resolve_calibration(DistanceReply::confirmed(100.0 * feet_per_pixel));
    assert!(matches!(outcome, CalibrationOutcome::Calibrated(_)));
    ed
}

#[test]
fn test_place_before_calibration_warns() {
    let mut ed = Editor::default();
    let err = ed
        .place_prefab(&PrefabTemplate::new("Container 40'", 40.0, 8.0))
        .unwrap_err();
    assert!(matches!(err, PlannerError::ScaleNotCalibrated));
    assert!(ed.project().prefabs.is_empty());
    assert_eq!(ed.status(), "Please calibrate the scale before placing objects.");
}

#[test]
fn test_place_sizes_by_scale() {
    let mut ed = calibrated_editor(0.5);
    let i = ed
        .place_prefab(&PrefabTemplate::new("Container 40'", 40.0, 8.0))
        .unwrap();
    let obj = &ed.project().prefabs[i];
    assert!((obj.width_px - 80.0).abs() < 1e-9);
    assert!((obj.height_px - 16.0).abs() < 1e-9);
    assert_eq!(obj.position, Point::ORIGIN);
}

#[test]
fn test_abandoned_calibration_keeps_scale() {
    let mut ed = calibrated_editor(0.5);
    let before = ed.project().scale;
    ed.begin_calibration();
    ed.calibration_click(Point::new(7.0, 7.0));
    ed.calibration_click(Point::new(7.0, 7.0));
    assert_eq!(
        ed.resolve_calibration(DistanceReply::confirmed(10.0)),
        CalibrationOutcome::Abandoned
    );
    assert_eq!(ed.project().scale, before);
    assert!(ed.is_calibrating());
}

#[test]
fn test_paint_and_finish_records_path() {
    let mut ed = calibrated_editor(0.25);
    ed.set_paint_label(Some(PathLabel::Fence));
    ed.paint_point(Point::new(0.0, 0.0));
    ed.paint_point(Point::new(40.0, 0.0));
    ed.paint_point(Point::new(40.0, 40.0));
    let done = ed.finish_path().unwrap();
    assert!((done.length_ft - 20.0).abs() < 1e-9);
    assert_eq!(ed.project().paths.len(), 1);
    assert_eq!(ed.status(), "Fence added 20.0ft");
}

#[test]
fn test_finish_with_one_point_records_nothing() {
    let mut ed = calibrated_editor(1.0);
    ed.set_paint_label(Some(PathLabel::WaterLine));
    ed.paint_point(Point::new(3.0, 3.0));
    assert!(ed.finish_path().is_none());
    assert!(ed.project().paths.is_empty());
}

#[test]
fn test_select_drag_rotate_delete() {
    let mut ed = calibrated_editor(1.0);
    ed.place_prefab(&PrefabTemplate::new("Planter Box", 6.0, 2.0))
        .unwrap();
    ed.clear_selection();

    assert_eq!(ed.select_at(Point::new(3.0, 1.0)), Some(0));
    ed.begin_drag();
    ed.drag_selected(Point::new(10.0, 20.0));
    assert_eq!(ed.project().prefabs[0].position, Point::new(10.0, 20.0));

    assert!(ed.rotate_selected());
    assert_eq!(ed.project().prefabs[0].rotation_deg, 15.0);
    assert!(ed.status().starts_with("Rotated Planter Box"));

    assert!(ed.delete_selected());
    assert!(ed.project().prefabs.is_empty());
    assert!(!ed.delete_selected());

    ed.undo();
    assert_eq!(ed.project().prefabs.len(), 1);
    assert_eq!(ed.project().prefabs[0].rotation_deg, 15.0);
}

#[test]
fn test_rotate_at_needs_selected_hit() {
    let mut ed = calibrated_editor(1.0);
    ed.place_prefab(&PrefabTemplate::new("Planter Box", 6.0, 2.0))
        .unwrap();
    ed.place_prefab(&PrefabTemplate::new("Planter Box", 6.0, 2.0))
        .unwrap();
    ed.select_at(Point::new(3.0, 1.0));
    ed.begin_drag();
    ed.drag_selected(Point::new(100.0, 100.0));
    assert_eq!(ed.selected(), Some(1));

    // right-click on an unselected prefab rotates nothing
    assert!(!ed.rotate_at(Point::new(3.0, 1.0)));
    assert_eq!(ed.selected(), Some(1));
    assert_eq!(ed.project().prefabs[0].rotation_deg, 0.0);
    assert_eq!(ed.project().prefabs[1].rotation_deg, 0.0);

    assert!(!ed.rotate_at(Point::new(50.0, 50.0)));
    assert_eq!(ed.selected(), Some(1));

    assert!(ed.rotate_at(Point::new(103.0, 101.0)));
    assert_eq!(ed.project().prefabs[1].rotation_deg, 15.0);
    assert_eq!(ed.project().prefabs[0].rotation_deg, 0.0);
}

#[test]
fn test_uncalibrated_project_stays_uncalibrated_after_reload() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("plan.pproj");

    let mut ed = Editor::default();
    ed.save_project(&path).unwrap();

    let mut reloaded = Editor::default();
    reloaded.load_project(&path).unwrap();
    assert!(!reloaded.project().scale.is_calibrated());
    let err = reloaded
        .place_prefab(&PrefabTemplate::new("Container 40'", 40.0, 8.0))
        .unwrap_err();
    assert!(matches!(err, PlannerError::ScaleNotCalibrated));
}

#[test]
fn test_save_and_load_through_editor() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("plan.pproj");

    let mut ed = calibrated_editor(0.5);
    ed.place_prefab(&PrefabTemplate::new("Solar Panel", 4.0, 2.0))
        .unwrap();
    ed.save_project(&path).unwrap();

    let mut other = Editor::default();
    other.load_project(&path).unwrap();
    assert_eq!(other.project(), ed.project());
    assert_eq!(other.project_path(), Some(path.as_path()));
}

#[test]
fn test_missing_image_still_loads_project() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("plan.pproj");
    std::fs::write(
        &path,
        r#"{"image_path": "gone.png", "scale": 0.5, "prefabs": [], "paths": []}"#,
    )
    .unwrap();

    let mut ed = Editor::default();
    ed.load_project(&path).unwrap();
    assert!(ed.site_image().is_none());
    assert_eq!(ed.canvas_size(), (800.0, 600.0));
    assert!(ed.project().scale.is_calibrated());
    assert!(ed.status().contains("unavailable"));
}

#[test]
fn test_malformed_load_leaves_canvas_untouched() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bad.pproj");
    std::fs::write(&path, r#"{"prefabs": 5}"#).unwrap();

    let mut ed = calibrated_editor(0.5);
    ed.place_prefab(&PrefabTemplate::new("Solar Panel", 4.0, 2.0))
        .unwrap();
    let before: Project = ed.project().clone();
    let err = ed.load_project(&path).unwrap_err();
    assert!(matches!(err, PlannerError::MalformedProject(_)));
    assert_eq!(ed.project(), &before);
}

#[test]
fn test_export_writes_png() {
    let dir = tempfile::tempdir().unwrap();
    let image_path = dir.path().join("site.png");
    image::RgbaImage::from_pixel(64, 48, image::Rgba([255, 255, 255, 255]))
        .save(&image_path)
        .unwrap();

    let mut ed = Editor::default();
    ed.open_image(&image_path).unwrap();
    assert_eq!(ed.canvas_size(), (64.0, 48.0));
    assert!(ed.is_calibrating());
    ed.set_paint_label(Some(PathLabel::FluorescentRed));
    ed.paint_point(Point::new(5.0, 5.0));
    ed.paint_point(Point::new(50.0, 5.0));
    ed.finish_path();

    let out = ed.export_annotated().unwrap().unwrap();
    assert_eq!(out, dir.path().join("site_annotated.png"));
    let written = image::open(&out).unwrap().to_rgba8();
    assert_eq!(written.get_pixel(20, 5).0, [255, 0, 0, 255]);
}
