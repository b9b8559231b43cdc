//! Plotline: an interactive GPU graphing calculator. Every visible
//! graph is lowered into a single fragment shader evaluated per pixel
//! over a pannable, zoomable grid.

use std::process::ExitCode;
use std::sync::{Arc, Mutex};

use app::{AppError, PlotApp};

mod app;
mod scene;
mod ui;

fn main() -> ExitCode {
    env_logger::init();

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            log::error!("{err}");
            eprintln!("plotline: {err}");
            ExitCode::from(err.exit_code() as u8)
        }
    }
}

fn run() -> Result<(), AppError> {
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("Plotline")
            .with_inner_size([800.0, 800.0])
            .with_min_inner_size([320.0, 240.0]),
        ..Default::default()
    };

    // `run_native` flattens creation failures into its own error type;
    // this slot carries the typed error back out so each startup
    // failure keeps its distinct exit code.
    let startup_error: Arc<Mutex<Option<AppError>>> = Arc::default();
    let slot = startup_error.clone();

    let outcome = eframe::run_native(
        "Plotline",
        options,
        Box::new(move |cc| match PlotApp::new(cc) {
            Ok(app) => Ok(Box::new(app) as Box<dyn eframe::App>),
            Err(err) => {
                if let Ok(mut guard) = slot.lock() {
                    *guard = Some(err.clone());
                }
                Err(Box::new(err) as Box<dyn std::error::Error + Send + Sync>)
            }
        }),
    );

    match outcome {
        Ok(()) => Ok(()),
        Err(run_err) => {
            let stored = startup_error.lock().ok().and_then(|mut guard| guard.take());
            Err(stored.unwrap_or_else(|| AppError::WindowCreation(run_err.to_string())))
        }
    }
}
