//! Scalar summaries and grouped revenue aggregates over filtered rows.
//!
//! Every function is read-only and treats an empty input as a valid,
//! zero/empty result.

use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};

use chrono::NaiveDateTime;

use super::model::UserRecord;

/// The four headline numbers.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct KeyMetrics {
    pub total_users: usize,
    pub total_revenue: f64,
    /// Mean revenue per user with a revenue value; `None` when there are no
    /// such users.
    pub avg_revenue: Option<f64>,
    /// Saturates at `u64::MAX`.
    pub total_sessions: u64,
}

impl KeyMetrics {
    pub fn compute(rows: &[UserRecord]) -> Self {
        let revenues: Vec<f64> = rows.iter().filter_map(|r| r.revenue_usd).collect();
        let total_revenue: f64 = revenues.iter().sum();
        let avg_revenue = if revenues.is_empty() {
            None
        } else {
            Some(total_revenue / revenues.len() as f64)
        };

        KeyMetrics {
            total_users: rows.len(),
            total_revenue,
            avg_revenue,
            total_sessions: rows
                .iter()
                .filter_map(|r| r.play_sessions)
                .fold(0u64, u64::saturating_add),
        }
    }
}

/// Revenue summed over one signup timestamp.
#[derive(Debug, Clone, PartialEq)]
pub struct DatedRevenue {
    pub signup_date: NaiveDateTime,
    pub revenue: f64,
}

/// Revenue summed over one categorical value.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupRevenue {
    pub group: String,
    pub revenue: f64,
}

/// Revenue attributed to a single user.
#[derive(Debug, Clone, PartialEq)]
pub struct UserRevenue {
    pub username: String,
    pub revenue: Option<f64>,
}

/// One point of the sessions-vs-revenue scatter.
#[derive(Debug, Clone, PartialEq)]
pub struct EngagementPoint {
    pub sessions: u64,
    pub revenue: f64,
    pub device_type: String,
    pub username: String,
}

/// Sum revenue per signup timestamp, ascending by date.
/// Rows without a signup date are left out.
pub fn revenue_by_date(rows: &[UserRecord]) -> Vec<DatedRevenue> {
    let mut groups: BTreeMap<NaiveDateTime, f64> = BTreeMap::new();
    for row in rows {
        if let Some(date) = row.signup_date {
            *groups.entry(date).or_insert(0.0) += row.revenue_usd.unwrap_or(0.0);
        }
    }
    groups
        .into_iter()
        .map(|(signup_date, revenue)| DatedRevenue {
            signup_date,
            revenue,
        })
        .collect()
}

/// Sum revenue per game mode, descending by revenue.
/// Equal totals keep the order in which the groups first appear.
pub fn revenue_by_game_mode(rows: &[UserRecord]) -> Vec<GroupRevenue> {
    let mut groups: Vec<GroupRevenue> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();

    for row in rows {
        let slot = *index.entry(row.game_mode.as_str()).or_insert_with(|| {
            groups.push(GroupRevenue {
                group: row.game_mode.clone(),
                revenue: 0.0,
            });
            groups.len() - 1
        });
        groups[slot].revenue += row.revenue_usd.unwrap_or(0.0);
    }

    groups.sort_by(|a, b| b.revenue.total_cmp(&a.revenue));
    groups
}

/// The `n` highest-revenue users, descending. Users without a revenue value
/// sort last; equal revenues keep table order.
pub fn top_users_by_revenue(rows: &[UserRecord], n: usize) -> Vec<UserRevenue> {
    let mut ranked: Vec<&UserRecord> = rows.iter().collect();
    ranked.sort_by(|a, b| cmp_revenue_desc(a.revenue_usd, b.revenue_usd));
    ranked
        .into_iter()
        .take(n)
        .map(|r| UserRevenue {
            username: r.username.clone(),
            revenue: r.revenue_usd,
        })
        .collect()
}

fn cmp_revenue_desc(a: Option<f64>, b: Option<f64>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => b.total_cmp(&a),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Sessions-vs-revenue points, for rows where both values are present.
pub fn engagement_points(rows: &[UserRecord]) -> Vec<EngagementPoint> {
    rows.iter()
        .filter_map(|r| {
            Some(EngagementPoint {
                sessions: r.play_sessions?,
                revenue: r.revenue_usd?,
                device_type: r.device_type.clone(),
                username: r.username.clone(),
            })
        })
        .collect()
}
