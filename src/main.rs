mod app;
mod ui;

use app::RustyScoutApp;
use eframe::egui;
use rusty_scout::config::DashboardConfig;

fn main() -> eframe::Result {
    env_logger::init();

    let (config, config_error) = match DashboardConfig::discover() {
        Ok(cfg) => (cfg, None),
        Err(e) => {
            log::error!("{e}; falling back to defaults");
            (DashboardConfig::default(), Some(e.to_string()))
        }
    };

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1200.0, 800.0])
            .with_min_inner_size([600.0, 400.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Rusty Scout – Estadísticas Liga BetPlay",
        options,
        Box::new(|cc| {
            // Install image loaders so egui can show the logo and photos.
            egui_extras::install_image_loaders(&cc.egui_ctx);
            Ok(Box::new(RustyScoutApp::new(config, config_error)))
        }),
    )
}
