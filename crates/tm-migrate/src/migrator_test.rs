//! Tests for up/down/status/create orchestration.

use super::*;
use tm_core::{CoreError, FsSource, MemorySource};
use tm_db::DuckDbBackend;

// ── Helpers ────────────────────────────────────────────────────────────

fn ledger() -> Ledger {
    Ledger::new("migrations").unwrap()
}

fn library() -> MemorySource {
    MemorySource::new()
        .with_migration(
            "0_init",
            "CREATE TABLE books (id INTEGER, title VARCHAR);",
            "DROP TABLE books;",
        )
        .with_migration(
            "1_add_genre",
            "ALTER TABLE books ADD COLUMN genre VARCHAR;",
            "ALTER TABLE books DROP COLUMN genre;",
        )
}

fn applied(migrator: &Migrator<'_>, db: &DuckDbBackend) -> Vec<String> {
    migrator
        .ledger()
        .applied_names(db)
        .unwrap()
        .iter()
        .map(str::to_string)
        .collect()
}

fn names(report: &UpReport) -> Vec<&str> {
    report.applied.iter().map(MigrationName::as_str).collect()
}

// ── Up ─────────────────────────────────────────────────────────────────

#[test]
fn test_up_applies_all_in_order() {
    let source = library();
    let db = DuckDbBackend::in_memory().unwrap();
    let migrator = Migrator::new(&source, &db, ledger());

    let report = migrator.up().unwrap();

    assert_eq!(names(&report), vec!["0_init", "1_add_genre"]);
    assert_eq!(report.skipped, 0);
    assert_eq!(applied(&migrator, &db), vec!["0_init", "1_add_genre"]);
    db.execute("INSERT INTO books VALUES (1, 'Dune', 'scifi')")
        .unwrap();
}

#[test]
fn test_up_twice_applies_nothing_the_second_time() {
    let source = library();
    let db = DuckDbBackend::in_memory().unwrap();
    let migrator = Migrator::new(&source, &db, ledger());

    migrator.up().unwrap();
    let second = migrator.up().unwrap();

    assert!(second.applied.is_empty());
    assert_eq!(second.skipped, 2);
}

#[test]
fn test_up_applies_only_missing_entries() {
    let source = library().with_migration(
        "2_add_author",
        "ALTER TABLE books ADD COLUMN author VARCHAR;",
        "ALTER TABLE books DROP COLUMN author;",
    );
    let db = DuckDbBackend::in_memory().unwrap();
    let migrator = Migrator::new(&source, &db, ledger());
    migrator.up().unwrap();

    source
        .insert(
            "3_add_year",
            "ALTER TABLE books ADD COLUMN year INTEGER;",
            "ALTER TABLE books DROP COLUMN year;",
        )
        .unwrap();
    let report = migrator.up().unwrap();

    assert_eq!(names(&report), vec!["3_add_year"]);
    assert_eq!(report.skipped, 3);
}

#[test]
fn test_up_orders_by_numeric_index() {
    let source = MemorySource::new()
        .with_migration("10_ten", "CREATE TABLE t10 (id INTEGER);", "DROP TABLE t10;")
        .with_migration("2_two", "CREATE TABLE t2 (id INTEGER);", "DROP TABLE t2;")
        .with_migration("1_one", "CREATE TABLE t1 (id INTEGER);", "DROP TABLE t1;");
    let db = DuckDbBackend::in_memory().unwrap();

    let mut seen = Vec::new();
    Migrator::new(&source, &db, ledger())
        .up_with(|name| seen.push(name.to_string()))
        .unwrap();

    assert_eq!(seen, vec!["1_one", "2_two", "10_ten"]);
}

#[test]
fn test_up_stops_at_first_failure() {
    let source = MemorySource::new()
        .with_migration("0_init", "CREATE TABLE books (id INTEGER);", "DROP TABLE books;")
        .with_migration(
            "1_broken",
            "CREATE TABLE authors (id INTEGER);\nINSERT INTO nowhere VALUES (1);",
            "DROP TABLE authors;",
        )
        .with_migration("2_later", "CREATE TABLE later (id INTEGER);", "DROP TABLE later;");
    let db = DuckDbBackend::in_memory().unwrap();
    let migrator = Migrator::new(&source, &db, ledger());

    let err = migrator.up().unwrap_err();

    assert!(matches!(err, MigrateError::Execution { ref name, .. } if name == "1_broken"));
    assert_eq!(applied(&migrator, &db), vec!["0_init"]);
    assert!(db.query_rows("SELECT * FROM authors", &[]).is_err());
    assert!(db.query_rows("SELECT * FROM later", &[]).is_err());
}

#[test]
fn test_failed_migration_leaves_ledger_unchanged() {
    let source = MemorySource::new().with_migration(
        "0_bad",
        "CREATE TABLE books (id INTEGER);\nSELECT missing_column FROM books;",
        "DROP TABLE books;",
    );
    let db = DuckDbBackend::in_memory().unwrap();
    let migrator = Migrator::new(&source, &db, ledger());

    assert!(migrator.up().is_err());
    assert!(applied(&migrator, &db).is_empty());

    // Fixing the script lets the next run pick it up.
    source
        .insert("0_bad", "CREATE TABLE books (id INTEGER);", "DROP TABLE books;")
        .unwrap();
    let report = migrator.up().unwrap();
    assert_eq!(names(&report), vec!["0_bad"]);
}

#[test]
fn test_up_on_empty_source() {
    let source = MemorySource::new();
    let db = DuckDbBackend::in_memory().unwrap();

    let report = Migrator::new(&source, &db, ledger()).up().unwrap();
    assert!(report.applied.is_empty());
    assert_eq!(report.skipped, 0);
}

#[test]
fn test_up_with_unreadable_source_is_discovery_error() {
    let dir = tempfile::tempdir().unwrap();
    let source = FsSource::new(dir.path().join("nope/up"), dir.path().join("nope/down"));
    let db = DuckDbBackend::in_memory().unwrap();

    let err = Migrator::new(&source, &db, ledger()).up().unwrap_err();
    assert!(matches!(
        err,
        MigrateError::Discovery(CoreError::SourceUnreadable { .. })
    ));
}

// ── Down ───────────────────────────────────────────────────────────────

#[test]
fn test_down_walks_back_to_empty() {
    let source = library();
    let db = DuckDbBackend::in_memory().unwrap();
    let migrator = Migrator::new(&source, &db, ledger());
    migrator.up().unwrap();

    assert_eq!(migrator.down().unwrap(), "1_add_genre");
    assert_eq!(applied(&migrator, &db), vec!["0_init"]);

    assert_eq!(migrator.down().unwrap(), "0_init");
    assert!(applied(&migrator, &db).is_empty());
    assert!(db.query_rows("SELECT * FROM books", &[]).is_err());

    assert!(matches!(
        migrator.down(),
        Err(MigrateError::NoMigrationsApplied)
    ));
}

#[test]
fn test_down_reverts_latest_applied_not_highest_index() {
    let source = library();
    let db = DuckDbBackend::in_memory().unwrap();
    let migrator = Migrator::new(&source, &db, ledger());
    migrator.ledger().ensure_schema(&db).unwrap();
    // 1_add_genre was recorded earlier than 0_init
    db.execute(
        "CREATE TABLE books (id INTEGER, title VARCHAR, genre VARCHAR);
         INSERT INTO migrations (name, applied_at) VALUES
             ('1_add_genre', TIMESTAMP '2024-01-01 00:00:00'),
             ('0_init',      TIMESTAMP '2024-02-01 00:00:00');",
    )
    .unwrap();

    assert_eq!(migrator.down().unwrap(), "0_init");
    assert_eq!(applied(&migrator, &db), vec!["1_add_genre"]);
}

#[test]
fn test_down_on_fresh_database() {
    let source = library();
    let db = DuckDbBackend::in_memory().unwrap();

    assert!(matches!(
        Migrator::new(&source, &db, ledger()).down(),
        Err(MigrateError::NoMigrationsApplied)
    ));
}

#[test]
fn test_failed_down_keeps_entry() {
    let source = MemorySource::new().with_migration(
        "0_init",
        "CREATE TABLE books (id INTEGER);",
        "DROP TABLE no_such_table;",
    );
    let db = DuckDbBackend::in_memory().unwrap();
    let migrator = Migrator::new(&source, &db, ledger());
    migrator.up().unwrap();

    let err = migrator.down().unwrap_err();

    assert!(matches!(
        err,
        MigrateError::Execution {
            direction: Direction::Down,
            ..
        }
    ));
    assert_eq!(applied(&migrator, &db), vec!["0_init"]);
}

// ── Status ─────────────────────────────────────────────────────────────

#[test]
fn test_status_reports_each_state() {
    let source = library();
    let db = DuckDbBackend::in_memory().unwrap();
    let migrator = Migrator::new(&source, &db, ledger());
    migrator.ledger().ensure_schema(&db).unwrap();
    db.execute(
        "CREATE TABLE books (id INTEGER);
         INSERT INTO migrations (name, applied_at) VALUES
             ('0_init',    TIMESTAMP '2024-01-01 00:00:00'),
             ('7_removed', TIMESTAMP '2024-01-02 00:00:00');",
    )
    .unwrap();

    let status = migrator.status().unwrap();

    let summary: Vec<(&str, MigrationState)> =
        status.iter().map(|s| (s.name.as_str(), s.state)).collect();
    assert_eq!(
        summary,
        vec![
            ("0_init", MigrationState::Applied),
            ("1_add_genre", MigrationState::Pending),
            ("7_removed", MigrationState::Missing),
        ]
    );
    assert!(status[0].applied_at.is_some());
    assert!(status[1].applied_at.is_none());
}

#[test]
fn test_status_serializes_lowercase_state() {
    let source = library();
    let db = DuckDbBackend::in_memory().unwrap();

    let status = Migrator::new(&source, &db, ledger()).status().unwrap();
    let json = serde_json::to_value(&status).unwrap();

    assert_eq!(json[0]["name"], "0_init");
    assert_eq!(json[0]["state"], "pending");
    assert!(json[0]["applied_at"].is_null());
}

// ── Create ─────────────────────────────────────────────────────────────

#[test]
fn test_create_uses_next_index_and_slug() {
    let source = library();

    let created = create(&source, "Add  Author Table").unwrap();

    assert_eq!(created.name, "2_add_author_table");
    assert_eq!(source.open(&created.name, Direction::Up).unwrap(), "");
    assert_eq!(source.open(&created.name, Direction::Down).unwrap(), "");
}

#[test]
fn test_create_on_fresh_project_writes_files() {
    let dir = tempfile::tempdir().unwrap();
    let up = dir.path().join("migrations/up");
    let down = dir.path().join("migrations/down");
    let source = FsSource::new(&up, &down);

    let first = create(&source, "init").unwrap();
    let second = create(&source, "add genre").unwrap();

    assert_eq!(first.name, "0_init");
    assert_eq!(second.name, "1_add_genre");
    assert!(up.join("1_add_genre.sql").is_file());
    assert!(down.join("1_add_genre.sql").is_file());
}

#[test]
fn test_create_rejects_blank_name() {
    let source = MemorySource::new();
    assert!(matches!(
        create(&source, "   "),
        Err(MigrateError::Discovery(CoreError::InvalidMigrationName { .. }))
    ));
}

#[test]
fn test_created_migration_must_be_filled_before_up() {
    let source = MemorySource::new();
    let db = DuckDbBackend::in_memory().unwrap();
    create(&source, "init").unwrap();

    let err = Migrator::new(&source, &db, ledger()).up().unwrap_err();
    assert!(matches!(err, MigrateError::Parse { .. }));
}

// ── pending ────────────────────────────────────────────────────────────

#[test]
fn test_pending_is_set_difference_in_order() {
    let applied: AppliedSet = ["1_b", "3_d"].into_iter().collect();
    let available = ["0_a", "1_b", "2_c", "3_d", "4_e"]
        .into_iter()
        .map(|n| MigrationName::parse(n).unwrap())
        .collect();

    let result: Vec<String> = pending(&applied, available)
        .into_iter()
        .map(String::from)
        .collect();
    assert_eq!(result, vec!["0_a", "2_c", "4_e"]);
}
