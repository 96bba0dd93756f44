mod app;
mod color;
mod config;
mod data;
mod state;
mod ui;

use app::DashboardApp;
use config::DashboardConfig;
use eframe::egui;

fn main() -> eframe::Result {
    env_logger::init();

    let config = match DashboardConfig::from_args(std::env::args().skip(1)) {
        Ok(config) => config,
        Err(e) => {
            log::error!("Invalid configuration: {e:#}");
            eprintln!("error: {e:#}");
            std::process::exit(2);
        }
    };
    log::info!("Using data file {}", config.data_path.display());

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([config.window_width, config.window_height])
            .with_min_inner_size([640.0, 420.0]),
        ..Default::default()
    };

    let title = format!("{} Food Security Dashboard", config.country);
    eframe::run_native(
        &title,
        options,
        Box::new(|_cc| Ok(Box::new(DashboardApp::new(config)))),
    )
}
