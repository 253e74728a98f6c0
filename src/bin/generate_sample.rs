//! Writes a deterministic synthetic user dataset for demos.
//!
//! ```text
//! generate_sample [OUTPUT] [ROWS]
//! ```
//! The format follows the extension of OUTPUT: `.parquet`/`.pq` or CSV.

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{ArrayRef, Float64Array, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use chrono::{Duration, NaiveDate, NaiveDateTime};
use parquet::arrow::ArrowWriter;

const DEVICES: [&str; 4] = ["Mobile", "PC", "Console", "Tablet"];
const GAME_MODES: [&str; 4] = ["Solo", "Co-op", "Multiplayer", "Ranked"];
const HEADER: [&str; 7] = [
    "Username",
    "Device_Type",
    "Preferred_Game_Mode",
    "Total_Revenue_USD",
    "Total_Play_Sessions",
    "Signup_Date",
    "Last_Login",
];

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    fn below(&mut self, n: u64) -> u64 {
        self.next_u64() % n.max(1)
    }

    fn pick<'a>(&mut self, items: &[&'a str]) -> &'a str {
        items[self.below(items.len() as u64) as usize]
    }
}

/// One generated row; `None` cells are written blank.
struct SampleUser {
    username: String,
    device: &'static str,
    game_mode: &'static str,
    revenue: Option<f64>,
    sessions: i64,
    signup: NaiveDateTime,
    last_login: Option<NaiveDateTime>,
}

fn generate(rows: usize, rng: &mut SimpleRng) -> Result<Vec<SampleUser>> {
    let first_signup = NaiveDate::from_ymd_opt(2024, 1, 1)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .context("invalid base date")?;
    let snapshot = first_signup + Duration::days(210);

    let mut users = Vec::with_capacity(rows);
    for i in 0..rows {
        let signup = first_signup + Duration::days(rng.below(180) as i64);

        // Most players are casual; a few grind hundreds of sessions.
        let sessions = if rng.next_f64() < 0.1 {
            50 + rng.below(250) as i64
        } else {
            1 + rng.below(40) as i64
        };
        let spend_rate = 0.2 + rng.next_f64() * 1.5;
        let revenue = (rng.next_f64() >= 0.02)
            .then(|| ((sessions as f64 * spend_rate) * 100.0).round() / 100.0);

        let active_span = (snapshot - signup).num_hours().max(1) as u64;
        let last_login = (rng.next_f64() >= 0.03)
            .then(|| signup + Duration::hours(rng.below(active_span) as i64));

        users.push(SampleUser {
            username: format!("player_{i:04}"),
            device: rng.pick(&DEVICES),
            game_mode: rng.pick(&GAME_MODES),
            revenue,
            sessions,
            signup,
            last_login,
        });
    }
    Ok(users)
}

fn fmt_ts(ts: &NaiveDateTime) -> String {
    ts.format("%Y-%m-%d %H:%M:%S").to_string()
}

fn write_csv(path: &Path, users: &[SampleUser]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path).context("creating CSV")?;
    writer.write_record(HEADER)?;
    for u in users {
        writer.write_record([
            u.username.clone(),
            u.device.to_string(),
            u.game_mode.to_string(),
            u.revenue.map(|r| format!("{r:.2}")).unwrap_or_default(),
            u.sessions.to_string(),
            u.signup.format("%Y-%m-%d").to_string(),
            u.last_login.as_ref().map(fmt_ts).unwrap_or_default(),
        ])?;
    }
    writer.flush().context("flushing CSV")?;
    Ok(())
}

fn write_parquet(path: &Path, users: &[SampleUser]) -> Result<()> {
    let text = |name: &str| Field::new(name, DataType::Utf8, true);
    let schema = Arc::new(Schema::new(vec![
        text(HEADER[0]),
        text(HEADER[1]),
        text(HEADER[2]),
        Field::new(HEADER[3], DataType::Float64, true),
        Field::new(HEADER[4], DataType::Int64, false),
        text(HEADER[5]),
        text(HEADER[6]),
    ]));

    let columns: Vec<ArrayRef> = vec![
        Arc::new(StringArray::from_iter_values(users.iter().map(|u| u.username.as_str()))),
        Arc::new(StringArray::from_iter_values(users.iter().map(|u| u.device))),
        Arc::new(StringArray::from_iter_values(users.iter().map(|u| u.game_mode))),
        Arc::new(Float64Array::from_iter(users.iter().map(|u| u.revenue))),
        Arc::new(Int64Array::from_iter_values(users.iter().map(|u| u.sessions))),
        Arc::new(StringArray::from_iter_values(
            users.iter().map(|u| u.signup.format("%Y-%m-%d").to_string()),
        )),
        Arc::new(StringArray::from_iter(
            users.iter().map(|u| u.last_login.as_ref().map(fmt_ts)),
        )),
    ];

    let batch = RecordBatch::try_new(schema.clone(), columns).context("building record batch")?;
    let file = std::fs::File::create(path).context("creating output file")?;
    let mut writer = ArrowWriter::try_new(file, schema, None).context("creating writer")?;
    writer.write(&batch).context("writing batch")?;
    writer.close().context("closing writer")?;
    Ok(())
}

fn main() -> Result<()> {
    let mut args = std::env::args().skip(1);
    let output = args.next().unwrap_or_else(|| "sample_users.csv".to_string());
    let rows: usize = match args.next() {
        Some(n) => n.parse().with_context(|| format!("invalid row count '{n}'"))?,
        None => 500,
    };

    let mut rng = SimpleRng::new(42);
    let users = generate(rows, &mut rng)?;

    let path = Path::new(&output);
    match path.extension().and_then(|e| e.to_str()) {
        Some("parquet") | Some("pq") => write_parquet(path, &users)?,
        _ => write_csv(path, &users)?,
    }

    println!("Wrote {} users to {output}", users.len());
    Ok(())
}
