//! Derived-table conditioning for query results.
//!
//! Converts raw game rows into the tabular structure consumed by the data
//! table and the duration histogram. Every derived column is a pure function
//! of its raw row.

use chrono::NaiveDateTime;
use derive_getters::Getters;
use serde::Serialize;
use serde_json::Value;
use tracing::{instrument, warn};

use crate::db::GameRow;

/// Column names of the derived table, in display order.
pub const FRAME_COLUMNS: [&str; 14] = [
    "INSTANCE_UUID",
    "GAME_ID",
    "INSTANCE_VERSION",
    "VERSION_BUCKET",
    "GAME_NAME",
    "START_TIME",
    "END_TIME",
    "REPLAY_NAME",
    "OOS",
    "RELOAD",
    "OBSERVERS",
    "PASSWORD",
    "PUBLIC",
    "GAME_DURATION",
];

/// The derived in-memory table produced per query.
///
/// `rows` holds one cell vector per game, aligned with `columns`. Cells are
/// JSON values so the table widget and the histogram consume them directly.
#[derive(Debug, Clone, Serialize, Getters)]
pub struct GameFrame {
    /// Column names, in display order.
    columns: Vec<String>,
    /// One row of cells per game.
    rows: Vec<Vec<Value>>,
}

impl GameFrame {
    /// Conditions raw game rows into the derived table.
    ///
    /// Single pass: timestamps are formatted, boolean flags become `0`/`1`
    /// cells, and the derived `VERSION_BUCKET` and `GAME_DURATION` columns
    /// are computed per row.
    #[instrument(skip(rows), fields(rows = rows.len()))]
    pub fn from_rows(rows: &[GameRow]) -> Self {
        let columns = FRAME_COLUMNS.iter().map(|c| c.to_string()).collect();
        let rows = rows.iter().map(condition_row).collect();
        Self { columns, rows }
    }

    /// Number of rows in the derived table.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the derived table has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

fn condition_row(row: &GameRow) -> Vec<Value> {
    vec![
        Value::from(row.instance_uuid().as_str()),
        Value::from(*row.game_id()),
        Value::from(row.instance_version().as_str()),
        Value::from(version_bucket(row.instance_version())),
        Value::from(row.game_name().as_str()),
        Value::from(format_timestamp(row.start_time())),
        row.end_time()
            .map(|t| Value::from(format_timestamp(&t)))
            .unwrap_or(Value::Null),
        row.replay_name()
            .as_deref()
            .map(Value::from)
            .unwrap_or(Value::Null),
        flag_cell(*row.oos()),
        flag_cell(*row.reload()),
        flag_cell(*row.observers()),
        flag_cell(*row.password()),
        flag_cell(*row.public()),
        game_duration_minutes(row)
            .map(Value::from)
            .unwrap_or(Value::Null),
    ]
}

fn flag_cell(flag: bool) -> Value {
    Value::from(u8::from(flag))
}

fn format_timestamp(t: &NaiveDateTime) -> String {
    t.format("%Y-%m-%d %H:%M:%S").to_string()
}

/// Game duration in fractional minutes, `None` when the game has no recorded
/// end. Never negative: a malformed row with an end before its start is
/// clamped to zero.
pub fn game_duration_minutes(row: &GameRow) -> Option<f64> {
    let end = (*row.end_time())?;
    let seconds = (end - *row.start_time()).num_seconds();
    if seconds < 0 {
        warn!(
            instance_uuid = %row.instance_uuid(),
            game_id = row.game_id(),
            seconds,
            "Game ends before it starts, clamping duration to zero"
        );
        return Some(0.0);
    }
    Some(seconds as f64 / 60.0)
}

/// The `major.minor` prefix of a version string, or the whole string when it
/// has fewer than two dot-separated parts (development builds report names
/// like `trunk`).
pub fn version_bucket(version: &str) -> String {
    let mut parts = version.splitn(3, '.');
    match (parts.next(), parts.next()) {
        (Some(major), Some(minor)) => format!("{}.{}", major, minor),
        _ => version.to_string(),
    }
}
