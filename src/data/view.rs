use chrono::NaiveDateTime;

use super::churn::{detect_churn, ChurnReport};
use super::filter::{apply, FilterSelection};
use super::metrics::{
    engagement_points, revenue_by_date, revenue_by_game_mode, top_users_by_revenue, DatedRevenue,
    EngagementPoint, GroupRevenue, KeyMetrics, UserRevenue,
};
use super::model::UserTable;
use crate::config::DashboardConfig;

/// Everything the dashboard shows for one filter selection.
///
/// Recomputed from scratch whenever the selection changes; the source table
/// is only read.
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardView {
    pub filtered: UserTable,
    pub metrics: KeyMetrics,
    pub revenue_by_date: Vec<DatedRevenue>,
    pub revenue_by_game_mode: Vec<GroupRevenue>,
    pub engagement: Vec<EngagementPoint>,
    pub top_users: Vec<UserRevenue>,
    pub churn: ChurnReport,
}

impl DashboardView {
    pub fn compute(
        table: &UserTable,
        selection: &FilterSelection,
        now: NaiveDateTime,
        config: &DashboardConfig,
    ) -> Self {
        let filtered = apply(table, selection);
        let rows = filtered.records();

        DashboardView {
            metrics: KeyMetrics::compute(rows),
            revenue_by_date: revenue_by_date(rows),
            revenue_by_game_mode: revenue_by_game_mode(rows),
            engagement: engagement_points(rows),
            top_users: top_users_by_revenue(rows, config.top_users),
            churn: detect_churn(rows, now, &config.churn),
            filtered,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::filter::init_selection;
    use crate::data::model::UserRecord;
    use chrono::{Duration, NaiveDate};

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 6, 30)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap()
    }

    fn user(name: &str, device: &str, revenue: f64, sessions: u64, idle_days: i64) -> UserRecord {
        UserRecord {
            username: name.to_string(),
            device_type: device.to_string(),
            game_mode: "Solo".to_string(),
            revenue_usd: Some(revenue),
            play_sessions: Some(sessions),
            signup_date: Some(now() - Duration::days(90)),
            last_login: Some(now() - Duration::days(idle_days)),
        }
    }

    fn table() -> UserTable {
        UserTable::from_records(vec![
            user("A", "Mobile", 100.0, 3, 10),
            user("B", "PC", 50.0, 20, 1),
        ])
    }

    #[test]
    fn two_user_scenario() {
        let table = table();
        let view = DashboardView::compute(
            &table,
            &init_selection(&table),
            now(),
            &DashboardConfig::default(),
        );

        assert_eq!(view.metrics.total_users, 2);
        assert_eq!(view.metrics.total_revenue, 150.0);
        assert_eq!(view.metrics.avg_revenue, Some(75.0));
        let churned: Vec<&str> = view.churn.candidates().iter().map(|c| c.username.as_str()).collect();
        assert_eq!(churned, vec!["A"]);
        assert_eq!(view.revenue_by_date.len(), 1);
        assert_eq!(view.revenue_by_date[0].revenue, 150.0);
        assert_eq!(view.top_users[0].username, "A");
    }

    #[test]
    fn empty_selection_yields_empty_states() {
        let table = table();
        let view = DashboardView::compute(
            &table,
            &FilterSelection::default(),
            now(),
            &DashboardConfig::default(),
        );

        assert_eq!(view.metrics.total_users, 0);
        assert_eq!(view.metrics.total_revenue, 0.0);
        assert_eq!(view.metrics.avg_revenue, None);
        assert_eq!(view.churn, ChurnReport::NoRisk);
        assert!(view.revenue_by_date.is_empty());
        assert!(view.revenue_by_game_mode.is_empty());
        assert!(view.top_users.is_empty());
        assert!(view.engagement.is_empty());
    }

    #[test]
    fn all_null_logins_report_no_risk() {
        let mut rows = table().records().to_vec();
        for row in &mut rows {
            row.last_login = None;
        }
        let table = UserTable::from_records(rows);
        let view = DashboardView::compute(
            &table,
            &init_selection(&table),
            now(),
            &DashboardConfig::default(),
        );
        assert!(view.churn.is_empty());
        assert_eq!(view.metrics.total_users, 2);
    }

    #[test]
    fn total_users_tracks_the_filtered_rows() {
        let table = table();
        let selection = FilterSelection::new(["PC"], ["Solo"]);
        let view = DashboardView::compute(&table, &selection, now(), &DashboardConfig::default());
        assert_eq!(view.metrics.total_users, view.filtered.len());
        assert_eq!(view.metrics.total_users, 1);
        assert!(view.churn.is_empty());
    }

    #[test]
    fn source_table_is_left_untouched() {
        let table = table();
        let before = table.clone();
        let _ = DashboardView::compute(
            &table,
            &FilterSelection::new(["Mobile"], ["Solo"]),
            now(),
            &DashboardConfig::default(),
        );
        assert_eq!(table, before);
    }
}
