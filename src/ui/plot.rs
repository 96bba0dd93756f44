use eframe::egui::{Color32, Ui};
use egui_plot::{Legend, Line, Plot, PlotPoints, PlotUi, Points};

use crate::color::SeriesColors;
use crate::data::category::{Comparison, Series};
use crate::data::model::IndicatorRecord;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Series helpers
// ---------------------------------------------------------------------------

/// Split a year-sorted series into runs of present values so absent years
/// show as gaps instead of being bridged.
fn segments(records: &[IndicatorRecord]) -> Vec<Vec<[f64; 2]>> {
    let mut runs: Vec<Vec<[f64; 2]>> = Vec::new();
    let mut current = Vec::new();
    for r in records {
        match r.value {
            Some(v) => current.push([r.year as f64, v]),
            None if !current.is_empty() => runs.push(std::mem::take(&mut current)),
            None => {}
        }
    }
    if !current.is_empty() {
        runs.push(current);
    }
    runs
}

fn draw_series(plot_ui: &mut PlotUi, name: &str, records: &[IndicatorRecord], color: Color32) {
    for run in segments(records) {
        if run.len() == 1 {
            plot_ui.points(
                Points::new(PlotPoints::from(run))
                    .name(name)
                    .color(color)
                    .radius(3.0),
            );
        } else {
            plot_ui.line(
                Line::new(PlotPoints::from(run))
                    .name(name)
                    .color(color)
                    .width(2.0),
            );
        }
    }
}

fn series_plot(ui: &mut Ui, id: &str, y_label: &str, series: &[&Series], colors: &SeriesColors) {
    Plot::new(id)
        .legend(Legend::default())
        .height(260.0)
        .x_axis_label("Year")
        .y_axis_label(y_label)
        .allow_boxed_zoom(true)
        .allow_drag(true)
        .allow_scroll(false)
        .allow_zoom(true)
        .show(ui, |plot_ui| {
            for s in series {
                draw_series(plot_ui, &s.name, &s.records, colors.color_for(&s.name));
            }
        });
}

// ---------------------------------------------------------------------------
// Trend plot
// ---------------------------------------------------------------------------

/// Line chart of the current window, or an empty-state warning.
pub fn trend_plot(ui: &mut Ui, state: &AppState) {
    ui.heading("Trend Over Time");

    let view = &state.view;
    let Some(item) = state.selected.as_deref() else {
        return;
    };
    if view.window.is_empty() {
        ui.colored_label(
            Color32::from_rgb(230, 160, 40),
            "No data available for the selected indicator and year range.",
        );
        return;
    }

    ui.label(format!("{item} ({})", view.unit()));
    Plot::new("trend_plot")
        .legend(Legend::default())
        .height(320.0)
        .x_axis_label("Year")
        .y_axis_label("Value")
        .allow_boxed_zoom(true)
        .allow_drag(true)
        .allow_scroll(false)
        .allow_zoom(true)
        .show(ui, |plot_ui| {
            draw_series(plot_ui, item, &view.window, state.colors.color_for(item));
        });
}

// ---------------------------------------------------------------------------
// Comparison plot
// ---------------------------------------------------------------------------

/// Category blurb plus the comparison chart, if the view has one.
pub fn comparison_plot(ui: &mut Ui, state: &AppState) {
    ui.heading("Indicator Analysis");

    if let Some(blurb) = state.view.category.blurb() {
        ui.label(blurb);
    }

    match &state.view.comparison {
        None => {}
        // egui_plot has a single y axis, so the two series get stacked plots
        // sharing the year axis.
        Some(Comparison::DualAxis {
            title,
            primary,
            secondary,
            secondary_axis,
        }) => {
            ui.strong(*title);
            series_plot(ui, "comparison_primary", &primary.label(), &[primary], &state.colors);
            let secondary: Vec<&Series> = secondary.iter().collect();
            series_plot(ui, "comparison_secondary", secondary_axis, &secondary, &state.colors);
        }
        Some(Comparison::MultiSeries { title, series }) => {
            ui.strong(*title);
            let series: Vec<&Series> = series.iter().collect();
            series_plot(ui, "comparison_children", "Value", &series, &state.colors);
        }
    }
}
