use super::*;
use crate::DuckDbBackend;

fn table_count(db: &DuckDbBackend, table: &str) -> usize {
    db.query_rows(
        "SELECT table_name FROM information_schema.tables WHERE table_name = ?",
        &[table],
    )
    .unwrap()
    .len()
}

#[test]
fn test_commit_on_success() {
    let db = DuckDbBackend::in_memory().unwrap();
    let value = with_transaction(&db, |tx| -> DbResult<i32> {
        tx.execute("CREATE TABLE kept (id INT)")?;
        tx.execute_with("INSERT INTO kept VALUES (?)", &["1"])?;
        Ok(7)
    })
    .unwrap();

    assert_eq!(value, 7);
    assert_eq!(table_count(&db, "kept"), 1);
    assert_eq!(db.query_rows("SELECT id FROM kept", &[]).unwrap(), vec![vec!["1"]]);
}

#[test]
fn test_rollback_on_error() {
    let db = DuckDbBackend::in_memory().unwrap();
    let result = with_transaction(&db, |tx| -> DbResult<()> {
        tx.execute("CREATE TABLE dropped (id INT)")?;
        tx.execute("INSERT INTO no_such_table VALUES (1)")?;
        Ok(())
    });

    assert!(matches!(result, Err(DbError::ExecutionError(_))));
    assert_eq!(table_count(&db, "dropped"), 0);
}

#[derive(Debug)]
#[allow(dead_code)]
enum AppError {
    Db(DbError),
    Refused,
}

impl From<DbError> for AppError {
    fn from(err: DbError) -> Self {
        AppError::Db(err)
    }
}

#[test]
fn test_body_error_returned_unchanged() {
    let db = DuckDbBackend::in_memory().unwrap();
    let result = with_transaction(&db, |tx| -> Result<(), AppError> {
        tx.execute("CREATE TABLE refused (id INT)")?;
        Err(AppError::Refused)
    });

    assert!(matches!(result, Err(AppError::Refused)));
    assert_eq!(table_count(&db, "refused"), 0);
}

#[test]
fn test_connection_usable_after_rollback() {
    let db = DuckDbBackend::in_memory().unwrap();
    let _ = with_transaction(&db, |tx| -> DbResult<()> {
        tx.execute("SELECT * FROM nowhere")
    });

    with_transaction(&db, |tx| -> Result<(), AppError> {
        tx.execute("CREATE TABLE after (id INT)")?;
        Ok(())
    })
    .unwrap();
    assert_eq!(table_count(&db, "after"), 1);
}
