use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};

use crate::data::category::IndicatorCategory;
use crate::data::export::export_csv;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Left side panel – selection widgets
// ---------------------------------------------------------------------------

/// Render the left selection panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading(format!("{} Food Security Dashboard", state.config.country));
    ui.label(format!(
        "Explore key food security indicators for {}",
        state.config.country
    ));
    ui.separator();

    if state.dataset.is_none() {
        ui.label("No dataset loaded.");
        return;
    }

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            indicator_selector(ui, state);
            ui.separator();
            year_range(ui, state);

            if state.view.category == IndicatorCategory::ChildNutrition
                && state.child_indicators.len() > 1
            {
                ui.separator();
                child_selector(ui, state);
            }
        });
}

fn indicator_selector(ui: &mut Ui, state: &mut AppState) {
    ui.strong("Select Indicator");
    let current = state.selected.clone().unwrap_or_default();
    let mut picked = None;
    egui::ComboBox::from_id_salt("indicator")
        .selected_text(&current)
        .width(ui.available_width())
        .show_ui(ui, |ui: &mut Ui| {
            for item in &state.indicators {
                if ui.selectable_label(current == *item, item).clicked() {
                    picked = Some(item.clone());
                }
            }
        });
    if let Some(item) = picked.filter(|item| *item != current) {
        state.select_indicator(item);
    }
}

fn year_range(ui: &mut Ui, state: &mut AppState) {
    let Some((min, max)) = state.year_bounds else {
        return;
    };
    ui.strong("Select Year Range");
    let (mut low, mut high) = state.year_range;
    let from = ui.add(egui::Slider::new(&mut low, min..=max).text("from"));
    let to = ui.add(egui::Slider::new(&mut high, min..=max).text("to"));
    if from.changed() || to.changed() {
        state.set_year_range(low, high);
    }
}

fn child_selector(ui: &mut Ui, state: &mut AppState) {
    ui.strong("Compare with other child nutrition indicators");
    let mut toggled = None;
    for item in &state.child_indicators {
        let mut checked = state.child_selection.contains(item);
        let text = RichText::new(item).color(state.colors.color_for(item));
        if ui.checkbox(&mut checked, text).changed() {
            toggled = Some(item.clone());
        }
    }
    if let Some(item) = toggled {
        state.toggle_child(&item);
    }
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open…").clicked() {
                open_file_dialog(state);
                ui.close_menu();
            }
            if ui.button("Reload").clicked() {
                state.reload();
                ui.close_menu();
            }
            let can_export = !state.view.window.is_empty();
            if ui
                .add_enabled(can_export, egui::Button::new("Export window as CSV…"))
                .clicked()
            {
                export_file_dialog(state);
                ui.close_menu();
            }
        });

        ui.separator();

        if let (Some(ds), Some(path)) = (&state.dataset, state.data_path()) {
            ui.label(format!(
                "{} records, {} indicators from {}",
                ds.len(),
                state.indicators.len(),
                path.display()
            ));
        }

        if let Some(msg) = &state.status_message {
            ui.separator();
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialogs
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open indicator table")
        .add_filter("Supported files", &["csv", "txt", "json", "parquet", "pq"])
        .add_filter("CSV", &["csv", "txt"])
        .add_filter("JSON", &["json"])
        .add_filter("Parquet", &["parquet", "pq"])
        .pick_file();

    if let Some(path) = file {
        state.open_path(path);
    }
}

pub fn export_file_dialog(state: &mut AppState) {
    let default_name = state
        .selected
        .as_deref()
        .map(|item| format!("{}.csv", sanitize_file_stem(item)))
        .unwrap_or_else(|| "window.csv".to_string());

    let file = rfd::FileDialog::new()
        .set_title("Export window")
        .set_file_name(&default_name)
        .add_filter("CSV", &["csv"])
        .save_file();

    if let Some(path) = file {
        match export_csv(&state.view.window, &path) {
            Ok(()) => state.status_message = None,
            Err(e) => {
                log::error!("Failed to export: {e:#}");
                state.status_message = Some(format!("Error: {e:#}"));
            }
        }
    }
}

/// Indicator names carry parentheses, percent signs and slashes.
fn sanitize_file_stem(item: &str) -> String {
    let stem: String = item
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c.to_ascii_lowercase() } else { '_' })
        .collect();
    stem.split('_')
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("_")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitizes_indicator_names() {
        assert_eq!(
            sanitize_file_stem("Prevalence of undernourishment (percent) (3-year average)"),
            "prevalence_of_undernourishment_percent_3_year_average"
        );
        assert_eq!(sanitize_file_stem("%/%"), "");
    }
}
