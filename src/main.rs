use clap::Parser;
use eframe::egui;
use std::path::PathBuf;
use tracing::{info, warn};

use property_planner::app::PlannerApp;
use property_planner::project::PROJECT_EXTENSION;
use property_planner::{Editor, Settings};

#[derive(Parser, Debug)]
#[command(name = "property-planner", version, about = "Plan a property on top of a site image")]
struct Args {
    /// Site image or `.pproj` project to open
    file: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let (settings, settings_err) = Settings::load_or_default();
    property_planner::init_logging(&settings.log_filter)?;
    info!("Property Planner {}", env!("CARGO_PKG_VERSION"));
    if let Some(e) = settings_err {
        warn!("Using default settings: {e}");
    }

    let mut editor = Editor::new(&settings);
    if let Some(path) = &args.file {
        let is_project = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case(PROJECT_EXTENSION));
        let opened = if is_project {
            editor.load_project(path)
        } else {
            editor.open_image(path)
        };
        if let Err(e) = opened {
            warn!("Could not open {}: {e}", path.display());
        }
    }

    let title = match &args.file {
        Some(path) => format!(
            "Property Planner — {}",
            path.file_name().unwrap_or_default().to_string_lossy()
        ),
        None => "Property Planner".to_string(),
    };

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1200.0, 800.0])
            .with_title(&title),
        ..Default::default()
    };

    eframe::run_native(
        &title,
        options,
        Box::new(move |_cc| Ok(Box::new(PlannerApp::new(editor, settings)))),
    )
    .map_err(|e| anyhow::anyhow!("Failed to run eframe: {e}"))
}
