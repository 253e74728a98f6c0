use std::collections::BTreeMap;
use std::ops::RangeInclusive;

use chrono::{DateTime, NaiveDateTime};
use eframe::egui::{Color32, Ui};
use egui_plot::{Bar, BarChart, GridMark, Legend, Line, Plot, PlotPoint, PlotPoints, Points};

use crate::color::ColorMap;
use crate::data::view::DashboardView;

const PLOT_HEIGHT: f32 = 260.0;
const SECONDS_PER_DAY: f64 = 86_400.0;

/// Dates are plotted as fractional days since the Unix epoch.
fn date_to_x(date: NaiveDateTime) -> f64 {
    date.and_utc().timestamp() as f64 / SECONDS_PER_DAY
}

fn x_to_date_label(x: f64) -> String {
    DateTime::from_timestamp((x * SECONDS_PER_DAY) as i64, 0)
        .map(|dt| dt.date_naive().to_string())
        .unwrap_or_default()
}

// ---------------------------------------------------------------------------
// Revenue by signup date (line)
// ---------------------------------------------------------------------------

pub fn revenue_trend(ui: &mut Ui, view: &DashboardView) {
    Plot::new("revenue_trend")
        .height(PLOT_HEIGHT)
        .x_axis_label("Signup Date")
        .y_axis_label("Total Revenue (USD)")
        .x_axis_formatter(|mark: GridMark, _range: &RangeInclusive<f64>| {
            x_to_date_label(mark.value)
        })
        .label_formatter(|_name: &str, value: &PlotPoint| {
            format!("{}\n${:.2}", x_to_date_label(value.x), value.y)
        })
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            let points: PlotPoints = view
                .revenue_by_date
                .iter()
                .map(|p| [date_to_x(p.signup_date), p.revenue])
                .collect();
            plot_ui.line(
                Line::new(points)
                    .name("Revenue Over Time")
                    .color(Color32::LIGHT_BLUE)
                    .width(2.0),
            );
        });
}

// ---------------------------------------------------------------------------
// Sessions vs revenue (scatter, coloured by device type)
// ---------------------------------------------------------------------------

pub fn engagement_scatter(ui: &mut Ui, view: &DashboardView, colors: Option<&ColorMap>) {
    let lookup: Vec<HoverPoint> = view
        .engagement
        .iter()
        .map(|p| HoverPoint {
            device: p.device_type.clone(),
            username: p.username.clone(),
            sessions: p.sessions as f64,
            revenue: p.revenue,
        })
        .collect();
    let spans = axis_spans(&lookup);

    Plot::new("engagement_scatter")
        .height(PLOT_HEIGHT)
        .legend(Legend::default())
        .x_axis_label("Total Play Sessions")
        .y_axis_label("Total Revenue (USD)")
        .label_formatter(move |device: &str, value: &PlotPoint| {
            match nearest_user(&lookup, spans, device, value) {
                Some(user) => format!(
                    "{user} ({device})\nsessions: {:.0}\nrevenue: ${:.2}",
                    value.x, value.y
                ),
                None => format!("sessions: {:.0}\nrevenue: ${:.2}", value.x, value.y),
            }
        })
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            let mut by_device: BTreeMap<&str, Vec<[f64; 2]>> = BTreeMap::new();
            for p in &view.engagement {
                by_device
                    .entry(p.device_type.as_str())
                    .or_default()
                    .push([p.sessions as f64, p.revenue]);
            }

            for (device, series) in by_device {
                let color = colors
                    .map(|cm| cm.color_for(device))
                    .unwrap_or(Color32::LIGHT_BLUE);
                plot_ui.points(
                    Points::new(series)
                        .name(device)
                        .color(color)
                        .radius(3.0),
                );
            }
        });
}

struct HoverPoint {
    device: String,
    username: String,
    sessions: f64,
    revenue: f64,
}

fn extent(values: impl Iterator<Item = f64>) -> f64 {
    let (lo, hi) = values.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
        (lo.min(v), hi.max(v))
    });
    if hi > lo {
        hi - lo
    } else {
        1.0
    }
}

/// Data extent along (sessions, revenue), never zero.
fn axis_spans(points: &[HoverPoint]) -> (f64, f64) {
    (
        extent(points.iter().map(|p| p.sessions)),
        extent(points.iter().map(|p| p.revenue)),
    )
}

/// Closest user within the hovered device series, with both axes scaled to
/// their data extent.
fn nearest_user<'a>(
    points: &'a [HoverPoint],
    (sx, sy): (f64, f64),
    device: &str,
    at: &PlotPoint,
) -> Option<&'a str> {
    if device.is_empty() {
        return None;
    }
    let dist = |p: &HoverPoint| {
        ((p.sessions - at.x) / sx).powi(2) + ((p.revenue - at.y) / sy).powi(2)
    };
    points
        .iter()
        .filter(|p| p.device == device)
        .min_by(|a, b| dist(*a).total_cmp(&dist(*b)))
        .map(|p| p.username.as_str())
}

// ---------------------------------------------------------------------------
// Revenue by game mode (bars)
// ---------------------------------------------------------------------------

pub fn game_mode_bars(ui: &mut Ui, view: &DashboardView) {
    let labels: Vec<String> = view
        .revenue_by_game_mode
        .iter()
        .map(|g| g.group.clone())
        .collect();

    Plot::new("game_mode_bars")
        .height(PLOT_HEIGHT)
        .x_axis_label("Preferred Game Mode")
        .y_axis_label("Total Revenue (USD)")
        .x_axis_formatter(move |mark: GridMark, _range: &RangeInclusive<f64>| {
            let idx = mark.value.round();
            if (mark.value - idx).abs() > f64::EPSILON || idx < 0.0 {
                return String::new();
            }
            labels.get(idx as usize).cloned().unwrap_or_default()
        })
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            let bars: Vec<Bar> = view
                .revenue_by_game_mode
                .iter()
                .enumerate()
                .map(|(i, g)| Bar::new(i as f64, g.revenue).name(&g.group).width(0.6))
                .collect();
            plot_ui.bar_chart(
                BarChart::new(bars)
                    .name("Revenue by Game Mode")
                    .color(Color32::from_rgb(99, 110, 250)),
            );
        });
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn date_axis_round_trips_to_the_day() {
        let date = NaiveDate::from_ymd_opt(2024, 2, 29)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        assert_eq!(x_to_date_label(date_to_x(date)), "2024-02-29");
    }

    fn hover(device: &str, username: &str, sessions: f64, revenue: f64) -> HoverPoint {
        HoverPoint {
            device: device.to_string(),
            username: username.to_string(),
            sessions,
            revenue,
        }
    }

    #[test]
    fn hover_picks_nearest_user_in_scaled_units() {
        let points = vec![
            hover("PC", "near_in_sessions", 10.0, 2000.0),
            hover("PC", "near_in_revenue", 40.0, 1010.0),
            hover("PC", "anchor", 0.0, 0.0),
        ];
        let spans = axis_spans(&points);
        // Raw distance would favour `near_in_revenue`; scaled, the session gap dominates.
        let at = PlotPoint::new(10.0, 1000.0);
        assert_eq!(nearest_user(&points, spans, "PC", &at), Some("near_in_sessions"));
    }

    #[test]
    fn hover_only_considers_the_hovered_series() {
        let points = vec![
            hover("PC", "pc_user", 5.0, 50.0),
            hover("Mobile", "mobile_user", 6.0, 60.0),
        ];
        let spans = axis_spans(&points);
        let at = PlotPoint::new(6.0, 60.0);
        assert_eq!(nearest_user(&points, spans, "PC", &at), Some("pc_user"));
        assert_eq!(nearest_user(&points, spans, "", &at), None);
    }
}
