use eframe::egui::{self, ScrollArea, Ui};

use crate::config::DashboardConfig;
use crate::state::AppState;
use crate::ui::{panels, plot, table};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct DashboardApp {
    pub state: AppState,
}

impl DashboardApp {
    /// Create the app and load the configured dataset once.
    pub fn new(config: DashboardConfig) -> Self {
        let mut state = AppState::new(config);
        state.load();
        Self { state }
    }
}

impl eframe::App for DashboardApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Left side panel: selection ----
        egui::SidePanel::left("selection_panel")
            .default_width(280.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state);
            });

        // ---- Central panel: metrics, charts, table ----
        egui::CentralPanel::default().show(ctx, |ui| {
            let state = &self.state;
            let Some(item) = state.selected.as_deref() else {
                ui.centered_and_justified(|ui: &mut Ui| {
                    ui.heading("Open an indicator table to begin  (File → Open…)");
                });
                return;
            };

            ScrollArea::vertical()
                .auto_shrink([false, false])
                .show(ui, |ui: &mut Ui| {
                    ui.heading(format!(
                        "{} Food Security Analysis: {item}",
                        state.config.country
                    ));
                    table::metrics_row(ui, state);
                    ui.add_space(8.0);
                    plot::trend_plot(ui, state);
                    ui.add_space(8.0);
                    plot::comparison_plot(ui, state);
                    ui.add_space(8.0);
                    table::raw_table(ui, state);
                    table::footer(ui, state);
                });
        });
    }
}
