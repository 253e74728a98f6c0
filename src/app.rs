use eframe::egui::{self, ScrollArea, Ui};

use crate::state::AppState;
use crate::ui::{panels, plot, tables};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct DashboardApp {
    pub state: AppState,
}

impl DashboardApp {
    pub fn new(state: AppState) -> Self {
        Self { state }
    }
}

impl eframe::App for DashboardApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Left side panel: filters ----
        egui::SidePanel::left("filter_panel")
            .default_width(220.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state);
            });

        // ---- Central panel: metrics, charts, tables ----
        egui::CentralPanel::default().show(ctx, |ui| {
            dashboard(ui, &self.state);
        });
    }
}

fn dashboard(ui: &mut Ui, state: &AppState) {
    let Some(view) = &state.view else {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("Open a file to view the dashboard  (File → Open…)");
        });
        return;
    };

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            ui.heading("User Engagement & Revenue Dashboard");
            ui.add_space(8.0);

            ui.strong("Key Metrics");
            tables::key_metrics(ui, &view.metrics);
            ui.separator();

            ui.strong("Revenue by Signup Date");
            plot::revenue_trend(ui, view);
            ui.separator();

            ui.strong("Sessions vs Revenue");
            plot::engagement_scatter(ui, view, state.device_colors.as_ref());
            ui.separator();

            ui.strong("Revenue by Game Mode");
            plot::game_mode_bars(ui, view);
            ui.separator();

            ui.strong(format!("Top {} Revenue Users", state.config.top_users));
            tables::top_users(ui, view);
            ui.separator();

            ui.strong("Potential Churn Signals");
            tables::churn_candidates(ui, &view.churn, &state.config.churn);
        });
}
