use std::collections::BTreeSet;

use chrono::{DateTime, NaiveDate, NaiveDateTime};

// ---------------------------------------------------------------------------
// Column – the required source columns
// ---------------------------------------------------------------------------

/// The columns every source must provide. Extra columns are ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Column {
    Username,
    DeviceType,
    GameMode,
    Revenue,
    PlaySessions,
    SignupDate,
    LastLogin,
}

impl Column {
    pub const ALL: [Column; 7] = [
        Column::Username,
        Column::DeviceType,
        Column::GameMode,
        Column::Revenue,
        Column::PlaySessions,
        Column::SignupDate,
        Column::LastLogin,
    ];

    /// Header name as it appears in the source file.
    pub fn name(self) -> &'static str {
        match self {
            Column::Username => "Username",
            Column::DeviceType => "Device_Type",
            Column::GameMode => "Preferred_Game_Mode",
            Column::Revenue => "Total_Revenue_USD",
            Column::PlaySessions => "Total_Play_Sessions",
            Column::SignupDate => "Signup_Date",
            Column::LastLogin => "Last_Login",
        }
    }

    pub fn index(self) -> usize {
        self as usize
    }
}

// ---------------------------------------------------------------------------
// UserRecord – one row of the source table
// ---------------------------------------------------------------------------

/// A single user (one row of the source table).
#[derive(Debug, Clone, PartialEq)]
pub struct UserRecord {
    pub username: String,
    pub device_type: String,
    pub game_mode: String,
    /// `None` when the cell was blank or not a number.
    pub revenue_usd: Option<f64>,
    /// `None` when the cell was blank or not a whole number.
    pub play_sessions: Option<u64>,
    pub signup_date: Option<NaiveDateTime>,
    pub last_login: Option<NaiveDateTime>,
}

impl UserRecord {
    /// Build a record from raw text cells, coercing each typed column.
    ///
    /// `field` returns the raw text for a column, or `None` when the row has
    /// no such cell. Coercion never fails: bad cells become `None`. Text
    /// columns are kept verbatim, so `"Mobile "` and `"Mobile"` are distinct.
    pub fn from_fields<'a>(field: impl Fn(Column) -> Option<&'a str>) -> Self {
        let text = |c: Column| field(c).unwrap_or("").to_string();
        UserRecord {
            username: text(Column::Username),
            device_type: text(Column::DeviceType),
            game_mode: text(Column::GameMode),
            revenue_usd: field(Column::Revenue).and_then(parse_revenue),
            play_sessions: field(Column::PlaySessions).and_then(parse_sessions),
            signup_date: field(Column::SignupDate).and_then(parse_timestamp),
            last_login: field(Column::LastLogin).and_then(parse_timestamp),
        }
    }
}

// ---------------------------------------------------------------------------
// Cell coercion
// ---------------------------------------------------------------------------

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%m/%d/%Y %H:%M:%S",
    "%d/%m/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
    "%d/%m/%Y %H:%M",
];

// Slash dates are month-first; day-first only when the month would be > 12.
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y", "%d/%m/%Y", "%d-%m-%Y"];

/// Parse a timestamp cell. Offsets are dropped after conversion to UTC.
pub fn parse_timestamp(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.naive_utc());
    }

    for fmt in DATETIME_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(naive);
        }
    }
    for fmt in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(s, fmt) {
            return date.and_hms_opt(0, 0, 0);
        }
    }
    None
}

/// Parse a revenue cell. Accepts a leading `$` and `,` thousands separators.
pub fn parse_revenue(s: &str) -> Option<f64> {
    let cleaned: String = s
        .trim()
        .trim_start_matches('$')
        .chars()
        .filter(|c| *c != ',')
        .collect();
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Parse a session count. Integral floats such as `"12.0"` are accepted.
pub fn parse_sessions(s: &str) -> Option<u64> {
    let s = s.trim();
    if let Ok(n) = s.parse::<u64>() {
        return Some(n);
    }
    let f = s.parse::<f64>().ok()?;
    if f.is_finite() && f >= 0.0 && f.fract() == 0.0 {
        Some(f as u64)
    } else {
        None
    }
}

// ---------------------------------------------------------------------------
// UserTable – the complete loaded dataset
// ---------------------------------------------------------------------------

/// The loaded dataset with the observed categorical values.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UserTable {
    records: Vec<UserRecord>,
    /// Sorted set of observed `Device_Type` values.
    pub device_types: BTreeSet<String>,
    /// Sorted set of observed `Preferred_Game_Mode` values.
    pub game_modes: BTreeSet<String>,
}

impl UserTable {
    /// Build the categorical indices from the loaded records.
    pub fn from_records(records: Vec<UserRecord>) -> Self {
        let device_types = records.iter().map(|r| r.device_type.clone()).collect();
        let game_modes = records.iter().map(|r| r.game_mode.clone()).collect();
        UserTable {
            records,
            device_types,
            game_modes,
        }
    }

    pub fn records(&self) -> &[UserRecord] {
        &self.records
    }

    /// Number of users.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the table is empty.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
