use eframe::egui;

use rusty_scout::config::DashboardConfig;
use rusty_scout::state::AppState;

use crate::ui::{panels, plot};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct RustyScoutApp {
    pub state: AppState,
}

impl RustyScoutApp {
    pub fn new(config: DashboardConfig, config_error: Option<String>) -> Self {
        let mut state = AppState::new(config);
        if config_error.is_some() {
            state.status_message = config_error;
        }
        Self { state }
    }
}

impl eframe::App for RustyScoutApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ---- Login gate ----
        if !self.state.session.is_authenticated() {
            egui::CentralPanel::default().show(ctx, |ui| {
                panels::login_panel(ui, &mut self.state);
            });
            return;
        }

        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Left side panel: filters ----
        egui::SidePanel::left("filter_panel")
            .default_width(240.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state);
            });

        // ---- Central panel: identity, charts, export ----
        egui::CentralPanel::default().show(ctx, |ui| {
            plot::dashboard(ui, &mut self.state);
        });
    }
}
