//! Row models and query parameter types for the multiplayer database.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use derive_getters::Getters;
use derive_new::new;
use diesel::prelude::*;
use diesel::sql_types::{Bool, Integer, Nullable, Text, Timestamp};
use serde::Serialize;

/// One game session record, as fetched from the `game_info` table.
#[derive(Debug, Clone, QueryableByName, Getters, new)]
pub struct GameRow {
    /// UUID of the wesnothd instance that recorded the game.
    #[diesel(sql_type = Text)]
    instance_uuid: String,
    /// Game id, unique within an instance.
    #[diesel(sql_type = Integer)]
    game_id: i32,
    /// Version of the wesnothd instance.
    #[diesel(sql_type = Text)]
    instance_version: String,
    /// Title of the game as shown in the lobby.
    #[diesel(sql_type = Text)]
    game_name: String,
    /// When the game started.
    #[diesel(sql_type = Timestamp)]
    start_time: NaiveDateTime,
    /// When the game ended. Null for games with no recorded end.
    #[diesel(sql_type = Nullable<Timestamp>)]
    end_time: Option<NaiveDateTime>,
    /// Server-side replay file name, if a replay was written.
    #[diesel(sql_type = Nullable<Text>)]
    replay_name: Option<String>,
    /// Whether the game hit an out-of-sync error.
    #[diesel(sql_type = Bool)]
    oos: bool,
    /// Whether the game was reloaded from a save.
    #[diesel(sql_type = Bool)]
    reload: bool,
    /// Whether observers were allowed.
    #[diesel(sql_type = Bool)]
    observers: bool,
    /// Whether joining required a password.
    #[diesel(sql_type = Bool)]
    password: bool,
    /// Whether the replay file was made public.
    #[diesel(sql_type = Bool)]
    public: bool,
}

/// Inclusive date range bounding which game sessions are fetched.
///
/// Matches the SQL `BETWEEN` comparison against date-typed inputs: both
/// bounds are midnight timestamps, so the end date itself contributes only
/// games starting at exactly midnight.
#[derive(Debug, Clone, Copy, Getters)]
pub struct DateRange {
    /// Lower bound (inclusive).
    start: NaiveDateTime,
    /// Upper bound (inclusive).
    end: NaiveDateTime,
}

impl DateRange {
    /// Builds a range from calendar dates.
    pub fn from_dates(start: NaiveDate, end: NaiveDate) -> Self {
        Self {
            start: start.and_time(NaiveTime::MIN),
            end: end.and_time(NaiveTime::MIN),
        }
    }
}

/// A label with its number of occurrences, one slice of a donut chart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Getters, new)]
pub struct ValueCount {
    /// Display label for the group.
    label: String,
    /// Number of rows in the group.
    count: i64,
}

/// Which logical table a statistics dimension is grouped over.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DimensionSource {
    /// The game session table.
    Game,
    /// The per-player table, joined to sessions for the date filter.
    Player,
    /// The per-game content table, joined to sessions for the date filter.
    Content,
}

/// A groupable column exposed by the statistics endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display, strum::EnumString)]
#[strum(serialize_all = "snake_case")]
pub enum StatsDimension {
    /// Wesnoth instance version.
    InstanceVersion,
    /// Out-of-sync flag.
    Oos,
    /// Reloaded-game flag.
    Reload,
    /// Observers-allowed flag.
    Observers,
    /// Password-required flag.
    Password,
    /// Public-replay flag.
    Public,
    /// Player faction, from the per-player table.
    Faction,
    /// Content type (era, scenario, modification), from the content table.
    ContentType,
}

impl StatsDimension {
    /// The table the dimension's column lives in.
    pub fn source(&self) -> DimensionSource {
        match self {
            Self::Faction => DimensionSource::Player,
            Self::ContentType => DimensionSource::Content,
            _ => DimensionSource::Game,
        }
    }

    /// The grouped column name.
    pub fn column(&self) -> &'static str {
        match self {
            Self::InstanceVersion => "INSTANCE_VERSION",
            Self::Oos => "OOS",
            Self::Reload => "RELOAD",
            Self::Observers => "OBSERVERS",
            Self::Password => "PASSWORD",
            Self::Public => "PUBLIC",
            Self::Faction => "FACTION",
            Self::ContentType => "TYPE",
        }
    }

    /// Display labels for boolean dimensions as `(set, unset)`, or `None`
    /// for text dimensions.
    pub fn flag_labels(&self) -> Option<(&'static str, &'static str)> {
        match self {
            Self::Oos => Some(("Encountered OOS", "Did not encounter OOS")),
            Self::Reload => Some(("Reloaded Game", "New Game")),
            Self::Observers => Some(("Observers allowed", "Observers not allowed")),
            Self::Password => Some(("Password required", "Password not required")),
            Self::Public => Some((
                "Replay file was made public",
                "Replay file was not made public",
            )),
            _ => None,
        }
    }
}
