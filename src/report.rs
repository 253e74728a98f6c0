use std::fmt::Write;

use crate::data::churn::{ChurnReport, ChurnThresholds, NO_RISK_MESSAGE};
use crate::data::view::DashboardView;

/// Format a dollar amount with thousands separators: `1234.5` → `1,234.50`.
pub fn format_usd(amount: f64) -> String {
    let fixed = format!("{:.2}", amount.abs());
    let (int_part, frac_part) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));

    let mut grouped = String::new();
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if amount < 0.0 { "-" } else { "" };
    format!("{sign}{grouped}.{frac_part}")
}

/// Average revenue, or `n/a` when there is nothing to average.
pub fn format_avg(avg: Option<f64>) -> String {
    avg.map(format_usd).unwrap_or_else(|| "n/a".to_string())
}

/// Render the dashboard sections as markdown.
pub fn build_report(source: &str, view: &DashboardView, thresholds: &ChurnThresholds) -> String {
    let mut output = String::new();
    let m = &view.metrics;

    let _ = writeln!(output, "# User Engagement & Revenue Dashboard");
    let _ = writeln!(output, "Source: {source}");
    let _ = writeln!(output);
    let _ = writeln!(output, "## Key Metrics");
    let _ = writeln!(output, "- Total Users: {}", m.total_users);
    let _ = writeln!(output, "- Total Revenue ($): {}", format_usd(m.total_revenue));
    let _ = writeln!(output, "- Avg Revenue/User ($): {}", format_avg(m.avg_revenue));
    let _ = writeln!(output, "- Total Sessions: {}", m.total_sessions);

    let _ = writeln!(output);
    let _ = writeln!(output, "## Revenue by Signup Date");
    if view.revenue_by_date.is_empty() {
        let _ = writeln!(output, "No signup dates in the current selection.");
    } else {
        for point in &view.revenue_by_date {
            let _ = writeln!(output, "- {}: {}", point.signup_date, format_usd(point.revenue));
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Revenue by Game Mode");
    if view.revenue_by_game_mode.is_empty() {
        let _ = writeln!(output, "No users in the current selection.");
    } else {
        for group in &view.revenue_by_game_mode {
            let _ = writeln!(output, "- {}: {}", group.group, format_usd(group.revenue));
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Top {} Revenue Users", view.top_users.len());
    if view.top_users.is_empty() {
        let _ = writeln!(output, "No users in the current selection.");
    } else {
        for user in &view.top_users {
            let revenue = user.revenue.map(format_usd).unwrap_or_else(|| "n/a".to_string());
            let _ = writeln!(output, "- {}: {revenue}", user.username);
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Potential Churn Signals");
    match &view.churn {
        ChurnReport::NoRisk => {
            let _ = writeln!(output, "{NO_RISK_MESSAGE}");
        }
        ChurnReport::AtRisk(candidates) => {
            let _ = writeln!(output, "{}", thresholds.describe());
            for c in candidates {
                let _ = writeln!(
                    output,
                    "- {}: {} days since last login, {} sessions",
                    c.username, c.days_since_last_login, c.play_sessions
                );
            }
        }
    }

    output
}
