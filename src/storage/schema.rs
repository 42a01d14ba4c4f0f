//! Database schema definitions
//!
//! The queue is a single `urls` table. `status` holds one of the
//! `UrlStatus` database strings; `http_code` is only written together
//! with `DONE`.

/// SQL schema for the queue database
pub const SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS urls (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    url TEXT NOT NULL,
    status TEXT NOT NULL,
    http_code INTEGER
);

CREATE INDEX IF NOT EXISTS idx_urls_status ON urls(status);
"#;

/// SQL dropping every queue table
pub const DROP_SQL: &str = r#"
DROP INDEX IF EXISTS idx_urls_status;
DROP TABLE IF EXISTS urls;
"#;

/// Initializes the database schema
///
/// Safe to run on every connection: all statements are `IF NOT EXISTS`.
pub fn initialize_schema(conn: &rusqlite::Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(SCHEMA_SQL)?;
    Ok(())
}

/// Drops and recreates the queue table
pub fn recreate_schema(conn: &rusqlite::Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(DROP_SQL)?;
    initialize_schema(conn)
}
