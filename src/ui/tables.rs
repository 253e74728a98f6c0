use eframe::egui::{self, RichText, Ui};
use egui_extras::{Column, TableBuilder};

use crate::data::churn::{ChurnReport, ChurnThresholds, NO_RISK_MESSAGE};
use crate::data::metrics::KeyMetrics;
use crate::data::view::DashboardView;
use crate::report::{format_avg, format_usd};

const ROW_HEIGHT: f32 = 18.0;

// ---------------------------------------------------------------------------
// Key metrics row
// ---------------------------------------------------------------------------

pub fn key_metrics(ui: &mut Ui, metrics: &KeyMetrics) {
    let cards = [
        ("Total Users", metrics.total_users.to_string()),
        ("Total Revenue ($)", format_usd(metrics.total_revenue)),
        ("Avg Revenue/User ($)", format_avg(metrics.avg_revenue)),
        ("Total Sessions", metrics.total_sessions.to_string()),
    ];

    ui.columns(cards.len(), |cols| {
        for (col, (label, value)) in cols.iter_mut().zip(cards) {
            col.label(RichText::new(label).weak());
            col.heading(value);
        }
    });
}

// ---------------------------------------------------------------------------
// Ranked tables
// ---------------------------------------------------------------------------

pub fn top_users(ui: &mut Ui, view: &DashboardView) {
    if view.top_users.is_empty() {
        ui.label("No users match the current filters.");
        return;
    }

    ui.push_id("top_users", |ui: &mut Ui| {
        TableBuilder::new(ui)
            .striped(true)
            .vscroll(false)
            .cell_layout(egui::Layout::left_to_right(egui::Align::Center))
            .column(Column::auto().at_least(40.0))
            .column(Column::auto().at_least(160.0))
            .column(Column::remainder())
            .header(20.0, |mut header| {
                header.col(|ui| {
                    ui.strong("#");
                });
                header.col(|ui| {
                    ui.strong("Username");
                });
                header.col(|ui| {
                    ui.strong("Total_Revenue_USD");
                });
            })
            .body(|mut body| {
                for (rank, user) in view.top_users.iter().enumerate() {
                    body.row(ROW_HEIGHT, |mut row| {
                        row.col(|ui| {
                            ui.label((rank + 1).to_string());
                        });
                        row.col(|ui| {
                            ui.label(user.username.as_str());
                        });
                        row.col(|ui| {
                            ui.label(user.revenue.map(format_usd).unwrap_or_else(|| "n/a".into()));
                        });
                    });
                }
            });
    });
}

pub fn churn_candidates(ui: &mut Ui, churn: &ChurnReport, thresholds: &ChurnThresholds) {
    let candidates = match churn {
        ChurnReport::NoRisk => {
            ui.label(NO_RISK_MESSAGE);
            return;
        }
        ChurnReport::AtRisk(candidates) => candidates,
    };

    ui.label(thresholds.describe());
    ui.push_id("churn_candidates", |ui: &mut Ui| {
        TableBuilder::new(ui)
            .striped(true)
            .vscroll(false)
            .cell_layout(egui::Layout::left_to_right(egui::Align::Center))
            .column(Column::auto().at_least(160.0))
            .column(Column::auto().at_least(160.0))
            .column(Column::remainder())
            .header(20.0, |mut header| {
                header.col(|ui| {
                    ui.strong("Username");
                });
                header.col(|ui| {
                    ui.strong("Days_Since_Last_Login");
                });
                header.col(|ui| {
                    ui.strong("Total_Play_Sessions");
                });
            })
            .body(|mut body| {
                for c in candidates {
                    body.row(ROW_HEIGHT, |mut row| {
                        row.col(|ui| {
                            ui.label(c.username.as_str());
                        });
                        row.col(|ui| {
                            ui.label(c.days_since_last_login.to_string());
                        });
                        row.col(|ui| {
                            ui.label(c.play_sessions.to_string());
                        });
                    });
                }
            });
    });
}
