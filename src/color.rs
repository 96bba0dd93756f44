use std::collections::BTreeMap;

use eframe::egui::Color32;
use palette::{Hsl, IntoColor, Srgb};

// ---------------------------------------------------------------------------
// Color palette generator
// ---------------------------------------------------------------------------

/// Generates `n` visually distinct colours using evenly spaced hues.
pub fn generate_palette(n: usize) -> Vec<Color32> {
    if n == 0 {
        return Vec::new();
    }
    (0..n)
        .map(|i| {
            let hue = (i as f32 / n as f32) * 360.0;
            let hsl = Hsl::new(hue, 0.75, 0.55);
            let rgb: Srgb = hsl.into_color();
            Color32::from_rgb(
                (rgb.red * 255.0) as u8,
                (rgb.green * 255.0) as u8,
                (rgb.blue * 255.0) as u8,
            )
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Series colours: indicator name → Color32
// ---------------------------------------------------------------------------

/// Stable colour per indicator, so a series keeps its colour across charts.
#[derive(Debug, Clone, Default)]
pub struct SeriesColors {
    mapping: BTreeMap<String, Color32>,
}

impl SeriesColors {
    /// Assign colours to indicator names in the given order.
    pub fn new(names: &[String]) -> Self {
        let mapping = names
            .iter()
            .cloned()
            .zip(generate_palette(names.len()))
            .collect();
        SeriesColors { mapping }
    }

    /// Colour for an indicator; unknown names fall back to light blue.
    pub fn color_for(&self, name: &str) -> Color32 {
        self.mapping
            .get(name)
            .copied()
            .unwrap_or(Color32::LIGHT_BLUE)
    }
}
