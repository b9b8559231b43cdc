//! Menu bar, tool windows and popups. Every popup owns its own form
//! state so half-typed input never touches the live graph set.

use plotline_core::{Graph, GraphKind, DEFAULT_THICKNESS};

use crate::app::PlotApp;

/// Input length caps; the fields stay editable up to these limits.
pub const MAX_NAME_LEN: usize = 32;
pub const MAX_BODY_LEN: usize = 128;

const THICKNESS_RANGE: std::ops::RangeInclusive<f32> = 0.2..=10.0;

pub struct UiState {
    pub info_open: bool,
    pub graphs_open: bool,
    /// Most recent non-fatal error, shown until dismissed.
    pub error: Option<String>,
    pub teleport: Option<TeleportForm>,
    pub add_graph: Option<GraphForm>,
    pub edit_graph: Option<(usize, GraphForm)>,
    pub save_dialog: Option<SaveForm>,
    pub load_dialog: Option<LoadDialog>,
}

impl Default for UiState {
    fn default() -> Self {
        Self {
            info_open: false,
            graphs_open: true,
            error: None,
            teleport: None,
            add_graph: None,
            edit_graph: None,
            save_dialog: None,
            load_dialog: None,
        }
    }
}

/// Edit buffer for one graph, detached from the set until submitted.
#[derive(Clone)]
pub struct GraphForm {
    pub name: String,
    pub body: String,
    pub color: [f32; 3],
    pub thickness: f32,
    pub functional: bool,
}

impl GraphForm {
    pub fn new() -> Self {
        Self {
            name: String::new(),
            body: String::new(),
            color: [1.0, 0.0, 0.0],
            thickness: DEFAULT_THICKNESS,
            functional: true,
        }
    }

    pub fn from_graph(graph: &Graph) -> Self {
        Self {
            name: graph.name.clone(),
            body: graph.body.clone(),
            color: graph.color,
            thickness: graph.thickness,
            functional: graph.kind == GraphKind::Functional,
        }
    }

    pub fn kind(&self) -> GraphKind {
        if self.functional {
            GraphKind::Functional
        } else {
            GraphKind::Implicit
        }
    }

    pub fn to_graph(&self) -> Graph {
        Graph::new(&self.name, self.kind(), &self.body, self.color, self.thickness)
    }
}

pub struct TeleportForm {
    pub x: f32,
    pub y: f32,
}

pub struct SaveForm {
    pub name: String,
}

pub struct LoadDialog {
    pub files: Vec<String>,
    pub selected: Option<usize>,
}

/// Truncate in place to at most `max` characters, on a char boundary.
fn clamp_len(text: &mut String, max: usize) {
    if let Some((byte_index, _)) = text.char_indices().nth(max) {
        text.truncate(byte_index);
    }
}

enum GraphsAction {
    OpenAdd,
    OpenSave,
    OpenLoad,
    Edit(usize),
    Toggle(usize),
    Delete(usize),
}

impl PlotApp {
    pub(crate) fn draw_menu_bar(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::top("menu_bar").show(ctx, |ui| {
            egui::menu::bar(ui, |ui| {
                ui.menu_button("Windows", |ui| {
                    if ui.button("Info").clicked() {
                        self.ui.info_open = !self.ui.info_open;
                        ui.close_menu();
                    }
                    if ui.button("Graphs").clicked() {
                        self.ui.graphs_open = !self.ui.graphs_open;
                        ui.close_menu();
                    }
                });
                ui.menu_button("Tools", |ui| {
                    if ui.button("Center position").clicked() {
                        self.viewport.center();
                        ui.close_menu();
                    }
                    if ui.button("Normalize zoom").clicked() {
                        self.viewport.normalize_zoom();
                        ui.close_menu();
                    }
                    if ui.button("Teleport…").clicked() {
                        self.ui.teleport = Some(TeleportForm {
                            x: self.viewport.position_x,
                            y: self.viewport.position_y,
                        });
                        ui.close_menu();
                    }
                });
            });
        });
    }

    pub(crate) fn draw_windows(&mut self, ctx: &egui::Context) {
        self.draw_info_window(ctx);
        self.draw_graphs_window(ctx);
        self.draw_teleport_popup(ctx);
        self.draw_add_popup(ctx);
        self.draw_edit_popup(ctx);
        self.draw_save_popup(ctx);
        self.draw_load_popup(ctx);
        self.draw_error_window(ctx);
    }

    fn draw_info_window(&mut self, ctx: &egui::Context) {
        if !self.ui.info_open {
            return;
        }
        let cursor = self.plot_cursor(ctx);
        let fps = 1.0 / ctx.input(|i| i.stable_dt).max(1e-6);
        let vp = &self.viewport;

        let mut open = self.ui.info_open;
        egui::Window::new("Info").open(&mut open).resizable(false).show(ctx, |ui| {
            ui.label(format!("Plotline {}", env!("CARGO_PKG_VERSION")));
            ui.separator();
            ui.label(format!("Plot size: {}x{}", vp.window_width, vp.window_height));
            ui.label(format!("Zoom: {:.3}", vp.zoom));
            ui.label(format!("Position: ({:.3}; {:.3})", vp.position_x, vp.position_y));
            match cursor {
                Some((x, y)) => {
                    let (wx, wy) = vp.screen_to_world(x, y);
                    ui.label(format!("Cursor: ({wx:.3}; {wy:.3})"));
                }
                None => {
                    ui.label("Cursor: outside plot");
                }
            }
            ui.label(format!("FPS: {fps:.0}"));
        });
        self.ui.info_open = open;
    }

    fn draw_graphs_window(&mut self, ctx: &egui::Context) {
        if !self.ui.graphs_open {
            return;
        }
        let mut actions: Vec<GraphsAction> = Vec::new();
        let graphs = &self.graphs;

        let mut open = self.ui.graphs_open;
        egui::Window::new("Graphs").open(&mut open).show(ctx, |ui| {
            ui.horizontal(|ui| {
                if ui.button("Add graph").clicked() {
                    actions.push(GraphsAction::OpenAdd);
                }
                if ui.button("Save…").clicked() {
                    actions.push(GraphsAction::OpenSave);
                }
                if ui.button("Load…").clicked() {
                    actions.push(GraphsAction::OpenLoad);
                }
            });
            ui.separator();

            if graphs.is_empty() {
                ui.label("No graphs yet.");
            }
            for (index, graph) in graphs.iter().enumerate() {
                let title = if graph.compiled {
                    graph.name.clone()
                } else {
                    format!("{} (!)", graph.name)
                };
                egui::CollapsingHeader::new(title).id_salt(index).show(ui, |ui| {
                    if !graph.compiled {
                        ui.colored_label(
                            egui::Color32::RED,
                            "This graph broke the shader build and is not drawn.",
                        );
                    }
                    let kind = match graph.kind {
                        GraphKind::Functional => "functional",
                        GraphKind::Implicit => "implicit",
                    };
                    let shown = if graph.visible { "visible" } else { "hidden" };
                    ui.label(format!("{kind}, {shown}"));
                    match graph.kind {
                        GraphKind::Functional => ui.label(format!("y = {}", graph.body)),
                        GraphKind::Implicit => ui.label(graph.body.clone()),
                    };
                    ui.horizontal(|ui| {
                        if ui.button("Edit").clicked() {
                            actions.push(GraphsAction::Edit(index));
                        }
                        if ui.button("Toggle visibility").clicked() {
                            actions.push(GraphsAction::Toggle(index));
                        }
                        if ui.button("Delete").clicked() {
                            actions.push(GraphsAction::Delete(index));
                        }
                    });
                });
            }
        });
        self.ui.graphs_open = open;

        for action in actions {
            match action {
                GraphsAction::OpenAdd => self.ui.add_graph = Some(GraphForm::new()),
                GraphsAction::OpenSave => {
                    self.ui.save_dialog = Some(SaveForm { name: String::new() });
                }
                GraphsAction::OpenLoad => self.open_load_dialog(),
                GraphsAction::Edit(index) => {
                    if let Some(graph) = self.graphs.get(index) {
                        self.ui.edit_graph = Some((index, GraphForm::from_graph(graph)));
                    }
                }
                GraphsAction::Toggle(index) => self.toggle_graph(index),
                GraphsAction::Delete(index) => self.delete_graph(index),
            }
        }
    }

    fn open_load_dialog(&mut self) {
        match self.store.list() {
            Ok(files) => self.ui.load_dialog = Some(LoadDialog { files, selected: None }),
            Err(err) => self.ui.error = Some(err.to_string()),
        }
    }

    fn draw_teleport_popup(&mut self, ctx: &egui::Context) {
        let mut submitted: Option<(f32, f32)> = None;
        let mut close = false;
        if let Some(form) = &mut self.ui.teleport {
            popup("Teleport").show(ctx, |ui| {
                ui.horizontal(|ui| {
                    ui.label("X");
                    ui.add(egui::DragValue::new(&mut form.x).speed(0.1));
                    ui.label("Y");
                    ui.add(egui::DragValue::new(&mut form.y).speed(0.1));
                });
                ui.horizontal(|ui| {
                    if ui.button("Go").clicked() {
                        submitted = Some((form.x, form.y));
                        close = true;
                    }
                    if ui.button("Cancel").clicked() {
                        close = true;
                    }
                });
            });
        }
        if close {
            self.ui.teleport = None;
        }
        if let Some((x, y)) = submitted {
            self.viewport.teleport(x, y);
        }
    }

    fn draw_add_popup(&mut self, ctx: &egui::Context) {
        let mut submitted: Option<Graph> = None;
        let mut close = false;
        if let Some(form) = &mut self.ui.add_graph {
            popup("Add graph").show(ctx, |ui| {
                ui.horizontal(|ui| {
                    ui.label("Name");
                    ui.text_edit_singleline(&mut form.name);
                });
                clamp_len(&mut form.name, MAX_NAME_LEN);
                graph_form_fields(ui, form);
                ui.horizontal(|ui| {
                    if ui.button("Add").clicked() {
                        submitted = Some(form.to_graph());
                        close = true;
                    }
                    if ui.button("Cancel").clicked() {
                        close = true;
                    }
                });
            });
        }
        if close {
            self.ui.add_graph = None;
        }
        if let Some(graph) = submitted {
            self.add_graph(graph);
        }
    }

    fn draw_edit_popup(&mut self, ctx: &egui::Context) {
        let mut submitted: Option<(usize, GraphForm)> = None;
        let mut close = false;
        if let Some((index, form)) = &mut self.ui.edit_graph {
            popup(&format!("Edit '{}'", form.name)).show(ctx, |ui| {
                graph_form_fields(ui, form);
                ui.horizontal(|ui| {
                    if ui.button("Apply").clicked() {
                        submitted = Some((*index, form.clone()));
                        close = true;
                    }
                    if ui.button("Cancel").clicked() {
                        close = true;
                    }
                });
            });
        }
        if close {
            self.ui.edit_graph = None;
        }
        if let Some((index, form)) = submitted {
            self.apply_edit(index, &form);
        }
    }

    fn draw_save_popup(&mut self, ctx: &egui::Context) {
        let mut submitted: Option<String> = None;
        let mut close = false;
        if let Some(form) = &mut self.ui.save_dialog {
            popup("Save graphs").show(ctx, |ui| {
                ui.horizontal(|ui| {
                    ui.label("Save name");
                    ui.text_edit_singleline(&mut form.name);
                });
                clamp_len(&mut form.name, MAX_NAME_LEN);
                ui.horizontal(|ui| {
                    let enabled = !form.name.trim().is_empty();
                    if ui.add_enabled(enabled, egui::Button::new("Save")).clicked() {
                        submitted = Some(form.name.trim().to_string());
                        close = true;
                    }
                    if ui.button("Cancel").clicked() {
                        close = true;
                    }
                });
            });
        }
        if close {
            self.ui.save_dialog = None;
        }
        if let Some(name) = submitted {
            self.save_graphs(&name);
        }
    }

    fn draw_load_popup(&mut self, ctx: &egui::Context) {
        enum LoadAction {
            Load(String),
            Delete(String),
        }
        let mut action: Option<LoadAction> = None;
        let mut close = false;
        if let Some(dialog) = &mut self.ui.load_dialog {
            popup("Load graphs").show(ctx, |ui| {
                if dialog.files.is_empty() {
                    ui.label("No saves found.");
                }
                for (index, file) in dialog.files.iter().enumerate() {
                    let selected = dialog.selected == Some(index);
                    if ui.selectable_label(selected, file).clicked() {
                        dialog.selected = Some(index);
                    }
                }
                ui.separator();
                ui.horizontal(|ui| {
                    let chosen = dialog.selected.and_then(|i| dialog.files.get(i));
                    let enabled = chosen.is_some();
                    if ui.add_enabled(enabled, egui::Button::new("Load")).clicked() {
                        if let Some(name) = chosen {
                            action = Some(LoadAction::Load(name.clone()));
                            close = true;
                        }
                    }
                    if ui.add_enabled(enabled, egui::Button::new("Delete")).clicked() {
                        if let Some(name) = chosen {
                            action = Some(LoadAction::Delete(name.clone()));
                        }
                    }
                    if ui.button("Cancel").clicked() {
                        close = true;
                    }
                });
            });
        }
        if close {
            self.ui.load_dialog = None;
        }
        match action {
            Some(LoadAction::Load(name)) => self.load_graphs(&name),
            Some(LoadAction::Delete(name)) => {
                if let Err(err) = self.store.delete(&name) {
                    self.ui.error = Some(err.to_string());
                }
                // Refresh the listing in place.
                if self.ui.load_dialog.is_some() {
                    self.open_load_dialog();
                }
            }
            None => {}
        }
    }

    fn draw_error_window(&mut self, ctx: &egui::Context) {
        let Some(message) = self.ui.error.clone() else {
            return;
        };
        let mut open = true;
        let mut dismissed = false;
        egui::Window::new("Error")
            .open(&mut open)
            .collapsible(false)
            .resizable(false)
            .anchor(egui::Align2::CENTER_CENTER, egui::Vec2::ZERO)
            .show(ctx, |ui| {
                ui.colored_label(egui::Color32::RED, &message);
                if ui.button("Dismiss").clicked() {
                    dismissed = true;
                }
            });
        if !open || dismissed {
            self.ui.error = None;
        }
    }
}

fn popup(title: &str) -> egui::Window<'_> {
    egui::Window::new(title)
        .collapsible(false)
        .resizable(false)
        .anchor(egui::Align2::CENTER_CENTER, egui::Vec2::ZERO)
}

fn graph_form_fields(ui: &mut egui::Ui, form: &mut GraphForm) {
    ui.horizontal(|ui| {
        ui.label("Body");
        ui.text_edit_singleline(&mut form.body);
    });
    clamp_len(&mut form.body, MAX_BODY_LEN);
    ui.horizontal(|ui| {
        ui.label("Color");
        ui.color_edit_button_rgb(&mut form.color);
        ui.label("Thickness");
        ui.add(egui::DragValue::new(&mut form.thickness).speed(0.1).range(THICKNESS_RANGE));
    });
    ui.checkbox(&mut form.functional, "Functional (y = f(x))");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamp_len_char_boundary() {
        let mut text = "αβγδε".to_string();
        clamp_len(&mut text, 3);
        assert_eq!(text, "αβγ");

        let mut short = "ok".to_string();
        clamp_len(&mut short, MAX_NAME_LEN);
        assert_eq!(short, "ok");
    }

    #[test]
    fn test_form_roundtrip() {
        let graph = Graph::new("wave", GraphKind::Implicit, "y > sin(x)", [0.2, 0.4, 0.6], 2.0);
        let form = GraphForm::from_graph(&graph);
        assert!(!form.functional);
        let back = form.to_graph();
        assert_eq!(back.name, graph.name);
        assert_eq!(back.kind, graph.kind);
        assert_eq!(back.body, graph.body);
        assert_eq!(back.color, graph.color);
        assert_eq!(back.thickness, graph.thickness);
    }
}
