//! eframe front end. Translates input into [`Editor`] calls and draws the
//! editor's state; it never owns project data itself.

use eframe::egui;
use std::path::PathBuf;
use tracing::warn;

use crate::calibration::{CalibrationState, DistanceReply};
use crate::config::Settings;
use crate::editor::Editor;
use crate::error::PlannerError;
use crate::geometry::Point;
use crate::paint::PathLabel;
use crate::project::PROJECT_EXTENSION;

const PREFAB_FILL: egui::Color32 = egui::Color32::from_rgba_premultiplied(94, 94, 120, 120);
const SELECTION: egui::Color32 = egui::Color32::from_rgb(0, 120, 255);

pub struct PlannerApp {
    editor: Editor,
    settings: Settings,

    texture: Option<egui::TextureHandle>,
    texture_generation: Option<u64>,

    // distance prompt state
    distance_buf: String,
    warning: Option<(String, String)>,

    // pan & zoom
    pan: egui::Vec2,
    zoom: f32,
    panning: bool,
}

impl PlannerApp {
    pub fn new(editor: Editor, settings: Settings) -> Self {
        Self {
            editor,
            settings,
            texture: None,
            texture_generation: None,
            distance_buf: String::new(),
            warning: None,
            pan: egui::Vec2::ZERO,
            zoom: 1.0,
            panning: false,
        }
    }

    fn image_size(&self) -> egui::Vec2 {
        let (w, h) = self.editor.canvas_size();
        egui::vec2(w as f32, h as f32)
    }

    /// Convert image-space coords to screen-space
    fn image_to_screen(&self, canvas_rect: egui::Rect, img_pos: Point) -> egui::Pos2 {
        let img_pos: egui::Pos2 = img_pos.into();
        canvas_rect.center() + self.pan + (img_pos.to_vec2() - self.image_size() * 0.5) * self.zoom
    }

    /// Convert screen-space coords to image-space
    fn screen_to_image(&self, canvas_rect: egui::Rect, screen_pos: egui::Pos2) -> Point {
        let rel = screen_pos - canvas_rect.center() - self.pan;
        let size = self.image_size();
        Point::from(egui::pos2(
            rel.x / self.zoom + size.x * 0.5,
            rel.y / self.zoom + size.y * 0.5,
        ))
    }

    fn ensure_texture(&mut self, ctx: &egui::Context) {
        let generation = self.editor.image_generation();
        if self.texture_generation == Some(generation) {
            return;
        }
        self.texture_generation = Some(generation);
        self.texture = self.editor.site_image().map(|site| {
            let rgba = site.image.to_rgba8();
            let size = [rgba.width() as usize, rgba.height() as usize];
            let pixels = rgba.as_flat_samples();
            let color_image = egui::ColorImage::from_rgba_unmultiplied(size, pixels.as_slice());
            ctx.load_texture("site-image", color_image, egui::TextureOptions::LINEAR)
        });
    }

    fn warn_user(&mut self, title: &str, err: &PlannerError) {
        warn!("{title}: {err}");
        self.warning = Some((title.to_string(), err.to_string()));
    }

    // ── File actions ────────────────────────────────────────────────────────

    fn open_image_dialog(&mut self) {
        if let Some(path) = rfd::FileDialog::new()
            .add_filter("Images", &["png", "jpg", "jpeg", "bmp", "tif", "tiff"])
            .pick_file()
        {
            if let Err(e) = self.editor.open_image(&path) {
                self.warn_user("Error", &e);
            }
        }
    }

    fn save_project_dialog(&mut self) {
        let mut dialog =
            rfd::FileDialog::new().add_filter("Property Project", &[PROJECT_EXTENSION]);
        if let Some(current) = self.editor.project_path() {
            if let Some(name) = current.file_name() {
                dialog = dialog.set_file_name(name.to_string_lossy());
            }
        }
        if let Some(path) = dialog.save_file() {
            self.save_project_to(path);
        }
    }

    fn save_project_to(&mut self, path: PathBuf) {
        if let Err(e) = self.editor.save_project(&path) {
            self.warn_user("Error", &e);
        }
    }

    fn load_project_dialog(&mut self) {
        if let Some(path) = rfd::FileDialog::new()
            .add_filter("Property Project", &[PROJECT_EXTENSION])
            .pick_file()
        {
            if let Err(e) = self.editor.load_project(&path) {
                self.warn_user("Error", &e);
            } else {
                self.pan = egui::Vec2::ZERO;
                self.zoom = 1.0;
            }
        }
    }

    fn export(&mut self) {
        if let Err(e) = self.editor.export_annotated() {
            self.warn_user("Error", &e);
        }
    }

    // ── Drawing ─────────────────────────────────────────────────────────────

    fn draw_paths(&self, painter: &egui::Painter, canvas_rect: egui::Rect) {
        let scale = &self.editor.project().scale;
        for path in &self.editor.project().paths {
            let pts: Vec<egui::Pos2> = path
                .points
                .iter()
                .map(|p| self.image_to_screen(canvas_rect, *p))
                .collect();
            let width = path.stroke_width_px(scale) as f32 * self.zoom;
            painter.add(egui::Shape::line(
                pts,
                egui::Stroke::new(width, path.color.to_egui()),
            ));
        }

        if let Some(preview) = self.editor.paint().preview() {
            let pts: Vec<egui::Pos2> = preview
                .points
                .iter()
                .map(|p| self.image_to_screen(canvas_rect, *p))
                .collect();
            let color = preview.color.to_egui();
            let width = preview.width_px as f32 * self.zoom;
            if pts.len() == 1 {
                painter.circle_filled(pts[0], (width * 0.5).max(2.0), color);
            } else {
                painter.add(egui::Shape::line(pts, egui::Stroke::new(width, color)));
            }
        }
    }

    fn draw_prefabs(&self, painter: &egui::Painter, canvas_rect: egui::Rect) {
        for (i, prefab) in self.editor.project().prefabs.iter().enumerate() {
            let corners: Vec<egui::Pos2> = prefab
                .corners()
                .iter()
                .map(|p| self.image_to_screen(canvas_rect, *p))
                .collect();
            let stroke = if self.editor.selected() == Some(i) {
                egui::Stroke::new(2.0, SELECTION)
            } else {
                egui::Stroke::new(1.0, egui::Color32::BLACK)
            };
            let anchor = corners[0];
            painter.add(egui::Shape::convex_polygon(corners, PREFAB_FILL, stroke));
            painter.text(
                anchor + egui::vec2(3.0, 2.0),
                egui::Align2::LEFT_TOP,
                &prefab.label,
                egui::FontId::proportional(12.0),
                egui::Color32::BLACK,
            );
        }
    }

    fn draw_calibration(
        &self,
        painter: &egui::Painter,
        canvas_rect: egui::Rect,
        hover: Option<egui::Pos2>,
    ) {
        let stroke = egui::Stroke::new(2.0, egui::Color32::GREEN);
        let line = match (self.editor.calibration().state(), hover) {
            (CalibrationState::AwaitingEnd { start }, Some(hover)) => {
                Some([self.image_to_screen(canvas_rect, start), hover])
            }
            _ => self
                .editor
                .calibration()
                .reference_line()
                .map(|(a, b)| {
                    [
                        self.image_to_screen(canvas_rect, a),
                        self.image_to_screen(canvas_rect, b),
                    ]
                }),
        };
        if let Some(line) = line {
            painter.extend(egui::Shape::dashed_line(&line, stroke, 8.0, 4.0));
            painter.circle_filled(line[0], 3.0, egui::Color32::GREEN);
        }
    }

    // ── Panels ──────────────────────────────────────────────────────────────

    fn menu_bar(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::top("menu").show(ctx, |ui| {
            egui::menu::bar(ui, |ui| {
                ui.menu_button("File", |ui| {
                    if ui.button("Open Image").clicked() {
                        ui.close_menu();
                        self.open_image_dialog();
                    }
                    if ui.button("Save Project").clicked() {
                        ui.close_menu();
                        self.save_project_dialog();
                    }
                    if ui.button("Load Project").clicked() {
                        ui.close_menu();
                        self.load_project_dialog();
                    }
                    if ui.button("Export PNG").clicked() {
                        ui.close_menu();
                        self.export();
                    }
                    ui.separator();
                    if ui.button("Exit").clicked() {
                        ctx.send_viewport_cmd(egui::ViewportCommand::Close);
                    }
                });
            });
        });
    }

    fn toolbar(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::top("toolbar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                for template in self.settings.prefabs.clone() {
                    if ui.button(template.label.as_str()).clicked() {
                        if let Err(e) = self.editor.place_prefab(&template) {
                            self.warn_user("Scale Error", &e);
                        }
                    }
                }
                ui.separator();

                let mut label = self.editor.paint().active_label();
                egui::ComboBox::from_id_salt("paint_tool")
                    .selected_text(label.map_or("Select Paint Tool", |l| l.name()))
                    .show_ui(ui, |ui| {
                        ui.selectable_value(&mut label, None, "Select Paint Tool");
                        for l in PathLabel::PAINTABLE {
                            ui.selectable_value(&mut label, Some(l), l.name());
                        }
                    });
                if label != self.editor.paint().active_label() {
                    self.editor.set_paint_label(label);
                }

                let mut width = self.editor.paint().brush_width();
                egui::ComboBox::from_id_salt("brush_width")
                    .selected_text(format!("{width}'"))
                    .show_ui(ui, |ui| {
                        for w in &self.settings.brush_widths_ft {
                            ui.selectable_value(&mut width, *w, format!("{w}'"));
                        }
                    });
                if width != self.editor.paint().brush_width() {
                    self.editor.set_brush_width(width);
                    self.settings.brush_width_ft = width;
                    if let Err(e) = self.settings.save() {
                        warn!("Could not save settings: {e}");
                    }
                }
                ui.separator();

                if ui.button("Calibrate Scale").clicked() {
                    self.editor.begin_calibration();
                }
                ui.separator();
                if ui
                    .add_enabled(self.editor.can_undo(), egui::Button::new("Undo"))
                    .clicked()
                {
                    self.editor.undo();
                }
                if ui
                    .add_enabled(self.editor.can_redo(), egui::Button::new("Redo"))
                    .clicked()
                {
                    self.editor.redo();
                }
                ui.separator();
                ui.label(format!("Zoom: {:.0}%", self.zoom * 100.0));
            });
        });
    }

    fn status_bar(&self, ctx: &egui::Context) {
        egui::TopBottomPanel::bottom("status").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.label(self.editor.status());
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    match self.editor.project().scale.factor() {
                        Some(s) => ui.label(s.to_string()),
                        None => ui.label("Scale not calibrated"),
                    };
                });
            });
        });
    }

    fn distance_prompt(&mut self, ctx: &egui::Context) {
        let Some(pending) = self.editor.pending_measurement().copied() else {
            return;
        };
        let mut reply = None;
        egui::Window::new("Enter Real Distance")
            .collapsible(false)
            .resizable(false)
            .anchor(egui::Align2::CENTER_CENTER, egui::Vec2::ZERO)
            .show(ctx, |ui| {
                ui.label(format!("Pixel distance: {:.2}", pending.pixel_distance));
                ui.label("Enter real-world distance (in feet):");
                let te = ui.text_edit_singleline(&mut self.distance_buf);
                te.request_focus();
                let submitted = te.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));
                ui.horizontal(|ui| {
                    if ui.button("OK").clicked() || submitted {
                        reply = Some(match self.distance_buf.trim().parse::<f64>() {
                            Ok(feet) => DistanceReply::confirmed(feet),
                            Err(_) => DistanceReply::cancelled(),
                        });
                    }
                    if ui.button("Cancel").clicked() {
                        reply = Some(DistanceReply::cancelled());
                    }
                });
            });
        if let Some(reply) = reply {
            self.distance_buf.clear();
            self.editor.resolve_calibration(reply);
        }
    }

    fn warning_window(&mut self, ctx: &egui::Context) {
        let Some((title, message)) = self.warning.clone() else {
            return;
        };
        egui::Window::new(title)
            .collapsible(false)
            .resizable(false)
            .anchor(egui::Align2::CENTER_CENTER, egui::Vec2::ZERO)
            .show(ctx, |ui| {
                ui.label(message);
                if ui.button("OK").clicked() {
                    self.warning = None;
                }
            });
    }

    fn handle_shortcuts(&mut self, ctx: &egui::Context) {
        if ctx.wants_keyboard_input() {
            return;
        }
        let (undo, redo, save, delete, rotate, escape) = ctx.input(|i| {
            let ctrl = i.modifiers.command;
            (
                ctrl && !i.modifiers.shift && i.key_pressed(egui::Key::Z),
                ctrl && i.modifiers.shift && i.key_pressed(egui::Key::Z),
                ctrl && i.key_pressed(egui::Key::S),
                i.key_pressed(egui::Key::Delete),
                !ctrl && i.key_pressed(egui::Key::R),
                i.key_pressed(egui::Key::Escape),
            )
        });

        if undo {
            self.editor.undo();
        }
        if redo {
            self.editor.redo();
        }
        if save {
            match self.editor.project_path().map(PathBuf::from) {
                Some(path) => self.save_project_to(path),
                None => self.save_project_dialog(),
            }
        }
        if delete {
            self.editor.delete_selected();
        }
        if rotate {
            self.editor.rotate_selected();
        }
        if escape {
            if self.editor.is_calibrating() {
                self.editor.cancel_calibration();
            } else if self.editor.paint().is_armed() {
                self.editor.set_paint_label(None);
            }
        }
    }

    fn canvas(&mut self, ctx: &egui::Context) {
        egui::CentralPanel::default().show(ctx, |ui| {
            let (response, painter) =
                ui.allocate_painter(ui.available_size(), egui::Sense::click_and_drag());
            let canvas_rect = response.rect;

            painter.rect_filled(canvas_rect, 0.0, egui::Color32::from_gray(40));

            let img_rect = egui::Rect::from_min_max(
                self.image_to_screen(canvas_rect, Point::ORIGIN),
                self.image_to_screen(canvas_rect, Point::from(self.image_size().to_pos2())),
            );
            match &self.texture {
                Some(tex) => painter.image(
                    tex.id(),
                    img_rect,
                    egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0)),
                    egui::Color32::WHITE,
                ),
                None => painter.rect_filled(img_rect, 0.0, egui::Color32::from_gray(230)),
            };

            self.draw_paths(&painter, canvas_rect);
            self.draw_prefabs(&painter, canvas_rect);
            self.draw_calibration(&painter, canvas_rect, response.hover_pos());

            // Handle pan (middle mouse button)
            if ctx.input(|i| i.pointer.middle_down()) {
                self.pan += ctx.input(|i| i.pointer.delta());
                self.panning = true;
            } else {
                self.panning = false;
            }

            // Handle zoom (ctrl + scroll or pinch)
            let zoom_delta = ctx.input(|i| i.zoom_delta());
            if zoom_delta != 1.0 && response.hovered() {
                let new_zoom = (self.zoom * zoom_delta).clamp(0.1, 10.0);
                if let Some(cursor) = response.hover_pos() {
                    let cursor_rel = cursor - canvas_rect.center() - self.pan;
                    self.pan -= cursor_rel * (new_zoom / self.zoom - 1.0);
                }
                self.zoom = new_zoom;
            }

            if self.panning || self.editor.pending_measurement().is_some() {
                return;
            }
            let Some(pos) = response.interact_pointer_pos().or(response.hover_pos()) else {
                return;
            };
            let img_pos = self.screen_to_image(canvas_rect, pos);

            if response.clicked_by(egui::PointerButton::Primary) {
                if self.editor.is_calibrating() {
                    self.editor.calibration_click(img_pos);
                } else if self.editor.paint().is_armed() {
                    self.editor.paint_point(img_pos);
                } else {
                    self.editor.select_at(img_pos);
                }
            }

            if response.clicked_by(egui::PointerButton::Secondary) {
                if self.editor.paint().is_armed() {
                    self.editor.finish_path();
                } else {
                    self.editor.rotate_at(img_pos);
                }
            }

            let free = !self.editor.is_calibrating() && !self.editor.paint().is_armed();
            if free && response.drag_started_by(egui::PointerButton::Primary) {
                if let Some(start) = ctx.input(|i| i.pointer.press_origin()) {
                    let at = self.screen_to_image(canvas_rect, start);
                    if self.editor.select_at(at).is_some() {
                        self.editor.begin_drag();
                    }
                }
            }
            if free && response.dragged_by(egui::PointerButton::Primary) {
                let delta = response.drag_delta() / self.zoom;
                self.editor
                    .drag_selected(Point::new(delta.x as f64, delta.y as f64));
            }
        });
    }
}

impl eframe::App for PlannerApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.ensure_texture(ctx);
        self.handle_shortcuts(ctx);

        self.menu_bar(ctx);
        self.toolbar(ctx);
        self.status_bar(ctx);
        self.canvas(ctx);

        self.distance_prompt(ctx);
        self.warning_window(ctx);
    }
}
