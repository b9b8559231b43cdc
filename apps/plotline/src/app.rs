//! Application state and the per-frame update: input handling, graph
//! mutations with their shader rebuilds, session persistence and the
//! plot paint callback.

use std::sync::{Arc, Mutex};

use eframe::egui_glow;
use thiserror::Error;

use plotline_core::{Graph, GraphSet};
use plotline_io::SaveStore;
use plotline_render::{compose, Viewport};

use crate::scene::ScenePainter;
use crate::ui::{GraphForm, UiState};

/// Wheel delta, in points, that counts as one tick.
const SCROLL_POINTS_PER_TICK: f32 = 50.0;

const VIEWPORT_KEY: &str = "viewport";
const GRAPHS_KEY: &str = "graphs";

/// Startup failures, each with its own process exit code.
#[derive(Error, Debug, Clone)]
pub enum AppError {
    #[error("unexpected error: {0}")]
    Unknown(String),

    #[error("failed to create window: {0}")]
    WindowCreation(String),

    #[error("windowing backend provided no GL context")]
    GlLoader,

    #[error("initial shader program failed to build: {0}")]
    InitialProgram(String),
}

impl AppError {
    pub fn exit_code(&self) -> i32 {
        match self {
            AppError::Unknown(_) => 1,
            AppError::WindowCreation(_) => 2,
            AppError::GlLoader => 3,
            AppError::InitialProgram(_) => 4,
        }
    }
}

pub struct PlotApp {
    pub(crate) graphs: GraphSet,
    pub(crate) viewport: Viewport,
    pub(crate) store: SaveStore,
    pub(crate) scene: Arc<Mutex<ScenePainter>>,
    pub(crate) ui: UiState,
    /// Screen rect the plot occupied last frame; cursor positions are
    /// mapped into it before any viewport math.
    pub(crate) plot_rect: egui::Rect,
}

impl PlotApp {
    pub fn new(cc: &eframe::CreationContext<'_>) -> Result<Self, AppError> {
        let gl = cc.gl.clone().ok_or(AppError::GlLoader)?;
        let scene = ScenePainter::new(gl).map_err(|err| AppError::Unknown(err.to_string()))?;

        let mut app = Self {
            graphs: GraphSet::new(),
            viewport: Viewport::default(),
            store: SaveStore::default(),
            scene: Arc::new(Mutex::new(scene)),
            ui: UiState::default(),
            plot_rect: egui::Rect::ZERO,
        };

        if let Some(storage) = cc.storage {
            if let Some(viewport) = eframe::get_value::<Viewport>(storage, VIEWPORT_KEY) {
                app.viewport = viewport;
            }
            if let Some(graphs) = eframe::get_value::<GraphSet>(storage, GRAPHS_KEY) {
                app.graphs = graphs;
            }
        }

        let compiled = app.rebuild_program();
        app.graphs.set_all_compiled(compiled);
        if !compiled {
            // A restored set may no longer compile; the grid-only
            // program is fixed text and must.
            log::warn!("restored graph set failed to compile, starting with the bare grid");
            let empty = compose(&GraphSet::new());
            if !app.scene().rebuild(&empty) {
                return Err(AppError::InitialProgram(
                    "the grid program was rejected by the GL driver".to_string(),
                ));
            }
        }

        Ok(app)
    }

    pub(crate) fn scene(&self) -> std::sync::MutexGuard<'_, ScenePainter> {
        self.scene.lock().expect("scene painter lock")
    }

    /// Recompose the shader from the current set and swap it in.
    /// Returns whether the build succeeded; on failure the previous
    /// program keeps drawing.
    pub(crate) fn rebuild_program(&mut self) -> bool {
        let source = compose(&self.graphs);
        self.scene().rebuild(&source)
    }

    pub(crate) fn add_graph(&mut self, graph: Graph) {
        match self.graphs.add(graph) {
            Ok(()) => {
                let compiled = self.rebuild_program();
                let last = self.graphs.len() - 1;
                if let Some(graph) = self.graphs.get_mut(last) {
                    graph.compiled = compiled;
                }
            }
            Err(err) => self.ui.error = Some(err.to_string()),
        }
    }

    pub(crate) fn apply_edit(&mut self, index: usize, form: &GraphForm) {
        let Some(graph) = self.graphs.get_mut(index) else {
            return;
        };
        graph.kind = form.kind();
        graph.body = form.body.clone();
        graph.color = form.color;
        graph.thickness = form.thickness;
        let compiled = self.rebuild_program();
        if let Some(graph) = self.graphs.get_mut(index) {
            graph.compiled = compiled;
        }
    }

    pub(crate) fn toggle_graph(&mut self, index: usize) {
        self.graphs.toggle_visibility(index);
        let compiled = self.rebuild_program();
        if let Some(graph) = self.graphs.get_mut(index) {
            graph.compiled = compiled;
        }
    }

    pub(crate) fn delete_graph(&mut self, index: usize) {
        if self.graphs.remove(index).is_some() {
            self.rebuild_program();
        }
    }

    pub(crate) fn save_graphs(&mut self, name: &str) {
        if let Err(err) = self.store.save(name, &self.graphs) {
            self.ui.error = Some(err.to_string());
        }
    }

    pub(crate) fn load_graphs(&mut self, name: &str) {
        match self.store.load(name) {
            Ok(graphs) => {
                self.graphs.replace_all(graphs);
                let compiled = self.rebuild_program();
                self.graphs.set_all_compiled(compiled);
            }
            Err(err) => self.ui.error = Some(err.to_string()),
        }
    }

    /// Cursor position in plot-rect pixels, if it is over the plot.
    pub(crate) fn plot_cursor(&self, ctx: &egui::Context) -> Option<(f32, f32)> {
        let pos = ctx.input(|i| i.pointer.hover_pos())?;
        if !self.plot_rect.contains(pos) {
            return None;
        }
        let local = pos - self.plot_rect.min;
        Some((local.x, local.y))
    }

    fn process_input(&mut self, ctx: &egui::Context) {
        let wants_keyboard = ctx.wants_keyboard_input();
        let wants_pointer = ctx.wants_pointer_input();

        let (pan, zoom_held, shift, ctrl, scroll, escape) = ctx.input(|i| {
            let mut pan = (0.0f32, 0.0f32);
            if i.key_down(egui::Key::ArrowUp) {
                pan.1 += 1.0;
            }
            if i.key_down(egui::Key::ArrowDown) {
                pan.1 -= 1.0;
            }
            if i.key_down(egui::Key::ArrowRight) {
                pan.0 += 1.0;
            }
            if i.key_down(egui::Key::ArrowLeft) {
                pan.0 -= 1.0;
            }
            (
                pan,
                i.key_down(egui::Key::Z),
                i.modifiers.shift,
                i.modifiers.ctrl,
                i.raw_scroll_delta / SCROLL_POINTS_PER_TICK,
                i.key_pressed(egui::Key::Escape),
            )
        });

        if !wants_keyboard {
            if pan != (0.0, 0.0) {
                self.viewport.pan_step(pan.0, pan.1);
            }
            if zoom_held {
                self.viewport.zoom_step(shift);
            }
            if escape {
                ctx.send_viewport_cmd(egui::ViewportCommand::Close);
            }
        }

        if !wants_pointer && scroll != egui::Vec2::ZERO {
            if ctrl {
                if let Some((x, y)) = self.plot_cursor(ctx) {
                    self.viewport.zoom_at(x, y, scroll.y);
                }
                // The horizontal wheel axis still pans while zooming.
                self.viewport.wheel_pan(scroll.x, 0.0, false);
            } else {
                self.viewport.wheel_pan(scroll.x, scroll.y, shift);
            }
        }
    }
}

impl eframe::App for PlotApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.process_input(ctx);
        self.draw_menu_bar(ctx);
        self.draw_windows(ctx);

        egui::CentralPanel::default().frame(egui::Frame::none()).show(ctx, |ui| {
            let rect = ui.max_rect();
            self.plot_rect = rect;
            self.viewport.set_window_size(
                rect.width().max(1.0) as u32,
                rect.height().max(1.0) as u32,
            );

            let time = ui.input(|i| i.time) as f32;
            let uniforms = self.viewport.frame_uniforms(time);
            let scene = self.scene.clone();
            scene.lock().expect("scene painter lock").set_uniforms(uniforms);

            ui.painter().add(egui::PaintCallback {
                rect,
                callback: Arc::new(egui_glow::CallbackFn::new(move |_info, _painter| {
                    scene.lock().expect("scene painter lock").paint();
                })),
            });
        });

        // The shader animates through its time uniform.
        ctx.request_repaint();
    }

    fn save(&mut self, storage: &mut dyn eframe::Storage) {
        eframe::set_value(storage, VIEWPORT_KEY, &self.viewport);
        eframe::set_value(storage, GRAPHS_KEY, &self.graphs);
    }

    fn on_exit(&mut self, _gl: Option<&eframe::glow::Context>) {
        self.scene().destroy();
    }
}
