//! Read-only repository over the multiplayer game database.
//!
//! Actual table names come from configuration, so every query is a
//! `sql_query` with the (validated) table identifier interpolated and the
//! date range bound as parameters.

use diesel::prelude::*;
use diesel::sql_types::{BigInt, Bool, Nullable, Text, Timestamp};
use std::sync::Arc;
use tracing::{debug, info, instrument};

use crate::config::AppConfig;
use crate::db::{DateRange, DbError, DimensionSource, GameRow, StatsDimension, ValueCount};

/// Supported connection types. The URL scheme picks the variant when
/// establishing: a `mysql://` URL connects to MariaDB, anything else is
/// treated as a SQLite path.
#[derive(diesel::MultiConnection)]
pub enum AnyConnection {
    /// MariaDB (MySQL protocol) connection.
    Mariadb(diesel::MysqlConnection),
    /// Local SQLite file connection.
    Sqlite(diesel::SqliteConnection),
}

/// Column list of the game table query, aliased to the row model's field
/// names.
const GAME_COLUMNS: &str = "INSTANCE_UUID AS instance_uuid, \
     GAME_ID AS game_id, \
     INSTANCE_VERSION AS instance_version, \
     GAME_NAME AS game_name, \
     START_TIME AS start_time, \
     END_TIME AS end_time, \
     REPLAY_NAME AS replay_name, \
     OOS AS oos, \
     RELOAD AS reload, \
     OBSERVERS AS observers, \
     PASSWORD AS password, \
     PUBLIC AS public";

#[derive(QueryableByName)]
struct CountRow {
    #[diesel(sql_type = BigInt)]
    count: i64,
}

#[derive(QueryableByName)]
struct TextCountRow {
    #[diesel(sql_type = Nullable<Text>)]
    label: Option<String>,
    #[diesel(sql_type = BigInt)]
    count: i64,
}

#[derive(QueryableByName)]
struct FlagCountRow {
    #[diesel(sql_type = Bool)]
    flag: bool,
    #[diesel(sql_type = BigInt)]
    count: i64,
}

/// Repository for date-range queries against the game record tables.
///
/// Establishes one connection per query call; connection lifecycle beyond
/// that is delegated to the driver.
#[derive(Debug, Clone)]
pub struct GameRepository {
    config: Arc<AppConfig>,
}

impl GameRepository {
    /// Creates a repository reading connection settings and table names from
    /// the shared configuration.
    #[instrument(skip(config), fields(backend = %config.backend()))]
    pub fn new(config: Arc<AppConfig>) -> Self {
        info!(backend = %config.backend(), "Creating game repository");
        Self { config }
    }

    /// Establishes a database connection.
    #[instrument(skip(self))]
    fn connection(&self) -> Result<AnyConnection, DbError> {
        let url = self.config.connection_url()?;
        debug!(backend = %self.config.backend(), "Establishing connection");
        AnyConnection::establish(&url).map_err(DbError::from)
    }

    /// Counts games whose start time falls in the given range.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the connection or query fails.
    #[instrument(skip(self))]
    pub fn count_games(&self, range: &DateRange) -> Result<i64, DbError> {
        let mut conn = self.connection()?;
        let table = self.config.table_names_map().game_info();

        let sql = format!(
            "SELECT COUNT(*) AS count FROM {} WHERE START_TIME BETWEEN ? AND ?",
            table
        );
        let row: CountRow = diesel::sql_query(sql)
            .bind::<Timestamp, _>(*range.start())
            .bind::<Timestamp, _>(*range.end())
            .get_result(&mut conn)?;

        debug!(count = row.count, table = %table, "Fetched the count of total games");
        Ok(row.count)
    }

    /// Fetches all game rows whose start time falls in the given range,
    /// ordered by start time.
    ///
    /// Callers are expected to check [`Self::count_games`] against the
    /// configured row limit before fetching.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the connection or query fails.
    #[instrument(skip(self))]
    pub fn fetch_games(&self, range: &DateRange) -> Result<Vec<GameRow>, DbError> {
        let mut conn = self.connection()?;
        let table = self.config.table_names_map().game_info();

        let sql = format!(
            "SELECT {} FROM {} WHERE START_TIME BETWEEN ? AND ? ORDER BY START_TIME, GAME_ID",
            GAME_COLUMNS, table
        );
        let rows: Vec<GameRow> = diesel::sql_query(sql)
            .bind::<Timestamp, _>(*range.start())
            .bind::<Timestamp, _>(*range.end())
            .load(&mut conn)?;

        info!(count = rows.len(), table = %table, "Fetched data for table from database");
        Ok(rows)
    }

    /// Groups games in the given range by a statistics dimension and counts
    /// each value. Boolean dimensions come back with their display labels;
    /// null group values are labelled `"Unknown"`.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the connection or query fails.
    #[instrument(skip(self))]
    pub fn value_counts(
        &self,
        dimension: StatsDimension,
        range: &DateRange,
    ) -> Result<Vec<ValueCount>, DbError> {
        let mut conn = self.connection()?;
        let tables = self.config.table_names_map();
        let column = dimension.column();

        let counts = if let Some((set_label, unset_label)) = dimension.flag_labels() {
            let sql = format!(
                "SELECT {col} AS flag, COUNT(*) AS count FROM {table} \
                 WHERE START_TIME BETWEEN ? AND ? GROUP BY {col} ORDER BY count DESC",
                col = column,
                table = tables.game_info(),
            );
            let rows: Vec<FlagCountRow> = diesel::sql_query(sql)
                .bind::<Timestamp, _>(*range.start())
                .bind::<Timestamp, _>(*range.end())
                .load(&mut conn)?;

            rows.into_iter()
                .map(|row| {
                    let label = if row.flag { set_label } else { unset_label };
                    ValueCount::new(label.to_string(), row.count)
                })
                .collect()
        } else {
            let sql = match dimension.source() {
                DimensionSource::Game => format!(
                    "SELECT {col} AS label, COUNT(*) AS count FROM {table} \
                     WHERE START_TIME BETWEEN ? AND ? GROUP BY {col} ORDER BY count DESC",
                    col = column,
                    table = tables.game_info(),
                ),
                DimensionSource::Player => joined_counts_sql(
                    column,
                    tables.game_player_info(),
                    tables.game_info(),
                ),
                DimensionSource::Content => joined_counts_sql(
                    column,
                    tables.game_content_info(),
                    tables.game_info(),
                ),
            };
            let rows: Vec<TextCountRow> = diesel::sql_query(sql)
                .bind::<Timestamp, _>(*range.start())
                .bind::<Timestamp, _>(*range.end())
                .load(&mut conn)?;

            rows.into_iter()
                .map(|row| {
                    ValueCount::new(row.label.unwrap_or_else(|| "Unknown".to_string()), row.count)
                })
                .collect()
        };

        debug!(
            dimension = %dimension,
            groups = counts.len(),
            "Fetched value counts from database"
        );
        Ok(counts)
    }
}

/// Group-and-count over a side table, joined to the game table so the date
/// filter applies to the owning session.
fn joined_counts_sql(column: &str, side_table: &str, game_table: &str) -> String {
    format!(
        "SELECT s.{col} AS label, COUNT(*) AS count \
         FROM {side} AS s \
         INNER JOIN {game} AS g \
         ON s.INSTANCE_UUID = g.INSTANCE_UUID AND s.GAME_ID = g.GAME_ID \
         WHERE g.START_TIME BETWEEN ? AND ? \
         GROUP BY s.{col} ORDER BY count DESC",
        col = column,
        side = side_table,
        game = game_table,
    )
}
