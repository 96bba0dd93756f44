use eframe::egui::{RichText, Ui};
use egui_extras::{Column, TableBuilder};

use crate::data::summary::Summary;
use crate::state::AppState;

const NOT_APPLICABLE: &str = "N/A";

// ---------------------------------------------------------------------------
// Metric cards
// ---------------------------------------------------------------------------

pub fn format_latest(summary: &Summary, unit: &str) -> String {
    match summary.latest_value {
        Some(v) if unit.is_empty() => format!("{v}"),
        Some(v) => format!("{v} {unit}"),
        None => NOT_APPLICABLE.to_string(),
    }
}

pub fn format_change(summary: &Summary) -> String {
    summary
        .percent_change
        .map_or_else(|| NOT_APPLICABLE.to_string(), |c| format!("{c:.1}%"))
}

pub fn format_count(summary: &Summary) -> String {
    format!("{} years", summary.observation_count)
}

fn metric(ui: &mut Ui, label: &str, value: String) {
    ui.group(|ui: &mut Ui| {
        ui.label(label);
        ui.label(RichText::new(value).size(22.0).strong());
    });
}

/// Latest value, change over the period and record count, side by side.
pub fn metrics_row(ui: &mut Ui, state: &AppState) {
    let summary = &state.view.summary;
    let unit = state.view.unit();
    ui.columns(3, |cols: &mut [Ui]| {
        metric(&mut cols[0], "Latest Value", format_latest(summary, unit));
        metric(&mut cols[1], "Change Over Period", format_change(summary));
        metric(&mut cols[2], "Years of Data", format_count(summary));
    });
}

// ---------------------------------------------------------------------------
// Raw data table
// ---------------------------------------------------------------------------

/// Year, value, unit, flag and note of every record in the window.
pub fn raw_table(ui: &mut Ui, state: &AppState) {
    ui.heading("Raw Data");
    let window = &state.view.window;

    TableBuilder::new(ui)
        .id_salt("raw_data")
        .striped(true)
        .max_scroll_height(260.0)
        .column(Column::auto().at_least(50.0))
        .column(Column::auto().at_least(80.0))
        .column(Column::auto().at_least(60.0))
        .column(Column::auto().at_least(40.0))
        .column(Column::remainder())
        .header(20.0, |mut header| {
            for title in ["year", "value", "unit", "flag", "note"] {
                header.col(|ui: &mut Ui| {
                    ui.strong(title);
                });
            }
        })
        .body(|mut body| {
            for record in window {
                body.row(18.0, |mut row| {
                    row.col(|ui: &mut Ui| {
                        ui.label(record.year.to_string());
                    });
                    row.col(|ui: &mut Ui| {
                        ui.label(record.value.map_or_else(String::new, |v| v.to_string()));
                    });
                    row.col(|ui: &mut Ui| {
                        ui.label(&record.unit);
                    });
                    row.col(|ui: &mut Ui| {
                        ui.label(&record.flag);
                    });
                    row.col(|ui: &mut Ui| {
                        ui.label(record.note.as_deref().unwrap_or(""));
                    });
                });
            }
        });
}

/// Source attribution lines from the config.
pub fn footer(ui: &mut Ui, state: &AppState) {
    ui.separator();
    for line in &state.config.source_note {
        ui.label(RichText::new(line).small());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_metrics() {
        let s = Summary {
            latest_value: Some(12.5),
            percent_change: Some(-3.333),
            observation_count: 4,
        };
        assert_eq!(format_latest(&s, "%"), "12.5 %");
        assert_eq!(format_latest(&s, ""), "12.5");
        assert_eq!(format_change(&s), "-3.3%");
        assert_eq!(format_count(&s), "4 years");
    }

    #[test]
    fn absent_metrics_read_not_applicable() {
        let s = Summary::default();
        assert_eq!(format_latest(&s, "%"), "N/A");
        assert_eq!(format_change(&s), "N/A");
        assert_eq!(format_count(&s), "0 years");
    }
}
