use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::model::UserRecord;

/// Message shown when no user qualifies as a churn risk.
pub const NO_RISK_MESSAGE: &str = "No high-risk churn users found based on the current filters.";

/// Risk predicate parameters: a user is at risk when they played fewer than
/// `max_sessions` sessions and last logged in more than `min_days_inactive`
/// days ago.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChurnThresholds {
    pub max_sessions: u64,
    pub min_days_inactive: i64,
    /// Maximum number of candidates reported.
    pub limit: usize,
}

impl Default for ChurnThresholds {
    fn default() -> Self {
        Self {
            max_sessions: 10,
            min_days_inactive: 7,
            limit: 10,
        }
    }
}

impl ChurnThresholds {
    pub fn describe(&self) -> String {
        format!(
            "Users with <{} sessions and >{} days since last login:",
            self.max_sessions, self.min_days_inactive
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChurnCandidate {
    pub username: String,
    pub days_since_last_login: i64,
    pub play_sessions: u64,
}

/// Outcome of churn detection. `NoRisk` is a valid result, not a failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChurnReport {
    NoRisk,
    AtRisk(Vec<ChurnCandidate>),
}

impl ChurnReport {
    pub fn candidates(&self) -> &[ChurnCandidate] {
        match self {
            ChurnReport::NoRisk => &[],
            ChurnReport::AtRisk(candidates) => candidates,
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, ChurnReport::NoRisk)
    }
}

/// Whole days from `last_login` to `now`, rounded down.
pub fn days_since(last_login: NaiveDateTime, now: NaiveDateTime) -> i64 {
    let elapsed = now - last_login;
    let days = elapsed.num_days();
    if elapsed < chrono::Duration::days(days) {
        days - 1
    } else {
        days
    }
}

/// Select users at risk of churning, most inactive first.
///
/// Rows without a last login or a session count never qualify. The result is
/// a pure function of its arguments; callers supply `now`.
pub fn detect_churn(
    rows: &[UserRecord],
    now: NaiveDateTime,
    thresholds: &ChurnThresholds,
) -> ChurnReport {
    let mut candidates: Vec<ChurnCandidate> = rows
        .iter()
        .filter_map(|r| {
            let last_login = r.last_login?;
            let sessions = r.play_sessions?;
            Some(ChurnCandidate {
                username: r.username.clone(),
                days_since_last_login: days_since(last_login, now),
                play_sessions: sessions,
            })
        })
        .filter(|c| {
            c.play_sessions < thresholds.max_sessions
                && c.days_since_last_login > thresholds.min_days_inactive
        })
        .collect();

    candidates.sort_by(|a, b| b.days_since_last_login.cmp(&a.days_since_last_login));
    candidates.truncate(thresholds.limit);

    if candidates.is_empty() {
        ChurnReport::NoRisk
    } else {
        ChurnReport::AtRisk(candidates)
    }
}
