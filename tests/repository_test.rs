//! Tests for date-range queries against the sample dataset.

use chrono::NaiveDate;
use tempfile::NamedTempFile;

use wesnoth_mp_dashboard::{
    AppConfig, DateRange, GameFrame, GameRepository, StatsDimension, game_duration_minutes, sample,
};

/// Creates a temporary SQLite database loaded with the bundled sample
/// dataset, returns the file handle (must stay in scope to keep the file
/// alive) and a ready repository.
fn setup_sample_db() -> (NamedTempFile, GameRepository) {
    let db_file = NamedTempFile::new().expect("Failed to create temp file");
    let db_path = db_file.path().to_str().expect("Invalid path").to_string();

    sample::init_sample_database(&db_path).expect("Sample load failed");

    let config = AppConfig::for_sqlite(db_path).into_shared();
    let repo = GameRepository::new(config);
    (db_file, repo)
}

fn range(start: &str, end: &str) -> DateRange {
    DateRange::from_dates(
        NaiveDate::parse_from_str(start, "%Y-%m-%d").expect("Invalid start date"),
        NaiveDate::parse_from_str(end, "%Y-%m-%d").expect("Invalid end date"),
    )
}

fn sample_range() -> DateRange {
    range(sample::SAMPLE_FIRST_DAY, sample::SAMPLE_END_DAY)
}

#[test]
fn test_count_games_full_sample_range() {
    let (_db, repo) = setup_sample_db();
    let count = repo.count_games(&sample_range()).expect("Count failed");
    assert_eq!(count, sample::SAMPLE_GAME_COUNT);
}

#[test]
fn test_count_games_empty_range() {
    let (_db, repo) = setup_sample_db();
    let count = repo
        .count_games(&range("2019-01-01", "2019-01-31"))
        .expect("Count failed");
    assert_eq!(count, 0);
}

#[test]
fn test_end_date_bounds_at_midnight() {
    // BETWEEN against date inputs compares midnight timestamps, so the end
    // date itself only contributes games starting at exactly midnight.
    let (_db, repo) = setup_sample_db();
    let count = repo
        .count_games(&range("2023-07-14", "2023-07-15"))
        .expect("Count failed");
    assert_eq!(count, 18);
}

#[test]
fn test_fetch_games_empty_range_yields_empty_frame() {
    let (_db, repo) = setup_sample_db();
    let rows = repo
        .fetch_games(&range("2019-01-01", "2019-01-31"))
        .expect("Fetch failed");
    assert!(rows.is_empty());

    let frame = GameFrame::from_rows(&rows);
    assert!(frame.is_empty());
    assert!(!frame.columns().is_empty());
}

#[test]
fn test_fetch_games_full_sample_range() {
    let (_db, repo) = setup_sample_db();
    let rows = repo.fetch_games(&sample_range()).expect("Fetch failed");
    assert_eq!(rows.len() as i64, sample::SAMPLE_GAME_COUNT);

    // Ordered by start time: the earliest sample game comes first.
    assert_eq!(*rows[0].game_id(), 1000);
    assert_eq!(
        rows[0].start_time().format("%Y-%m-%d %H:%M:%S").to_string(),
        "2023-07-14 00:35:00"
    );

    let frame = GameFrame::from_rows(&rows);
    assert_eq!(frame.len() as i64, sample::SAMPLE_GAME_COUNT);
}

#[test]
fn test_durations_derived_from_sample_rows() {
    let (_db, repo) = setup_sample_db();
    let rows = repo.fetch_games(&sample_range()).expect("Fetch failed");

    // First sample game runs 00:35 to 00:44.
    assert_eq!(game_duration_minutes(&rows[0]), Some(9.0));

    // One sample game has no recorded end.
    let unfinished = rows
        .iter()
        .find(|row| *row.game_id() == 1037)
        .expect("Sample game 1037 missing");
    assert!(unfinished.end_time().is_none());
    assert_eq!(game_duration_minutes(unfinished), None);

    for row in &rows {
        if let Some(minutes) = game_duration_minutes(row) {
            assert!(minutes >= 0.0);
        }
    }
}

#[test]
fn test_value_counts_instance_version() {
    let (_db, repo) = setup_sample_db();
    let counts = repo
        .value_counts(StatsDimension::InstanceVersion, &sample_range())
        .expect("Value counts failed");

    assert_eq!(counts.len(), 4);
    let total: i64 = counts.iter().map(|c| c.count()).sum();
    assert_eq!(total, sample::SAMPLE_GAME_COUNT);

    let group = counts
        .iter()
        .find(|c| c.label() == "1.16.10")
        .expect("Version group missing");
    assert_eq!(*group.count(), 20);
}

#[test]
fn test_value_counts_oos_uses_display_labels() {
    let (_db, repo) = setup_sample_db();
    let counts = repo
        .value_counts(StatsDimension::Oos, &sample_range())
        .expect("Value counts failed");

    assert_eq!(counts.len(), 2);
    // Ordered by count descending.
    assert_eq!(counts[0].label(), "Did not encounter OOS");
    assert_eq!(*counts[0].count(), 54);
    assert_eq!(counts[1].label(), "Encountered OOS");
    assert_eq!(*counts[1].count(), 6);
}

#[test]
fn test_value_counts_reload() {
    let (_db, repo) = setup_sample_db();
    let counts = repo
        .value_counts(StatsDimension::Reload, &sample_range())
        .expect("Value counts failed");

    let reloaded = counts
        .iter()
        .find(|c| c.label() == "Reloaded Game")
        .expect("Reload group missing");
    assert_eq!(*reloaded.count(), 9);
    let fresh = counts
        .iter()
        .find(|c| c.label() == "New Game")
        .expect("New game group missing");
    assert_eq!(*fresh.count(), 51);
}

#[test]
fn test_value_counts_faction_joins_player_table() {
    let (_db, repo) = setup_sample_db();
    let counts = repo
        .value_counts(StatsDimension::Faction, &sample_range())
        .expect("Value counts failed");

    // One row per player, not per game.
    let total: i64 = counts.iter().map(|c| c.count()).sum();
    assert_eq!(total, 180);

    let group = counts
        .iter()
        .find(|c| c.label() == "Northerners")
        .expect("Faction group missing");
    assert_eq!(*group.count(), 40);
}

#[test]
fn test_value_counts_content_type_joins_content_table() {
    let (_db, repo) = setup_sample_db();
    let counts = repo
        .value_counts(StatsDimension::ContentType, &sample_range())
        .expect("Value counts failed");

    assert_eq!(counts.len(), 3);
    let lookup = |label: &str| {
        *counts
            .iter()
            .find(|c| c.label() == label)
            .unwrap_or_else(|| panic!("Missing content type {label}"))
            .count()
    };
    assert_eq!(lookup("era"), 60);
    assert_eq!(lookup("scenario"), 60);
    assert_eq!(lookup("modification"), 12);
}

#[test]
fn test_value_counts_empty_range() {
    let (_db, repo) = setup_sample_db();
    let counts = repo
        .value_counts(StatsDimension::InstanceVersion, &range("2019-01-01", "2019-01-31"))
        .expect("Value counts failed");
    assert!(counts.is_empty());
}
