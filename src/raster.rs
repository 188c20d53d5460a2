//! Background image loading and annotated PNG export.

use image::{DynamicImage, RgbaImage};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::error::{PlannerError, Result};
use crate::geometry::Point;
use crate::project::Project;

/// Canvas size used when no image is loaded.
pub const DEFAULT_CANVAS_SIZE: (f64, f64) = (800.0, 600.0);

/// A decoded site image.
pub struct SiteImage {
    pub path: PathBuf,
    pub image: DynamicImage,
}

impl SiteImage {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let image = image::open(path).map_err(|source| PlannerError::ImageUnreadable {
            path: path.to_path_buf(),
            source,
        })?;
        info!(
            path = %path.display(),
            width = image.width(),
            height = image.height(),
            "Image loaded"
        );
        Ok(Self {
            path: path.to_path_buf(),
            image,
        })
    }

    /// Like [`SiteImage::load`], but logs and drops the failure. Used on
    /// project load where a missing image just leaves the canvas empty.
    pub fn load_optional(path: Option<&Path>) -> Option<Self> {
        let path = path?;
        match Self::load(path) {
            Ok(img) => Some(img),
            Err(e) => {
                warn!("{e}; continuing without background image");
                None
            }
        }
    }

    pub fn size(&self) -> (f64, f64) {
        (self.image.width() as f64, self.image.height() as f64)
    }
}

/// Path of the PNG written by [`export_annotated`] for `source`.
pub fn annotated_path(source: &Path) -> PathBuf {
    source.with_file_name(format!(
        "{}_annotated.png",
        source
            .file_stem()
            .unwrap_or_default()
            .to_str()
            .unwrap_or("out")
    ))
}

/// Burn paths and prefab outlines into a copy of the image and write a PNG.
pub fn export_annotated(project: &Project, site: &SiteImage, out_path: &Path) -> Result<()> {
    let mut img: RgbaImage = site.image.to_rgba8();
    render_project(&mut img, project);
    img.save(out_path)
        .map_err(|source| PlannerError::ExportFailed {
            path: out_path.to_path_buf(),
            source,
        })?;
    info!(path = %out_path.display(), "Exported annotated image");
    Ok(())
}

pub fn render_project(img: &mut RgbaImage, project: &Project) {
    for path in &project.paths {
        let color = path.color.to_rgba();
        if color[3] == 0 {
            continue;
        }
        let thickness = path.stroke_width_px(&project.scale) as f32;
        for w in path.points.windows(2) {
            draw_line_on_image(img, w[0], w[1], thickness, color);
        }
    }

    const OUTLINE: [u8; 4] = [0, 0, 0, 255];
    for prefab in &project.prefabs {
        let c = prefab.corners();
        for i in 0..4 {
            draw_line_on_image(img, c[i], c[(i + 1) % 4], 1.0, OUTLINE);
        }
    }
}

fn draw_line_on_image(img: &mut RgbaImage, from: Point, to: Point, thickness: f32, color: [u8; 4]) {
    let (x0, y0) = (from.x as f32, from.y as f32);
    let dx = to.x as f32 - x0;
    let dy = to.y as f32 - y0;
    let len = (dx * dx + dy * dy).sqrt();
    let steps = (len * 2.0) as i32;
    let half_t = (thickness / 2.0).max(0.5) as i32;
    let (w, h) = (img.width() as i32, img.height() as i32);

    for i in 0..=steps {
        let t = i as f32 / steps.max(1) as f32;
        let cx = (x0 + dx * t) as i32;
        let cy = (y0 + dy * t) as i32;
        for oy in -half_t..=half_t {
            for ox in -half_t..=half_t {
                let px = cx + ox;
                let py = cy + oy;
                if px >= 0 && px < w && py >= 0 && py < h {
                    img.put_pixel(px as u32, py as u32, image::Rgba(color));
                }
            }
        }
    }
}
