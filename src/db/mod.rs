//! Database - a thin wrapper over one relational connection.
//!
//! Handlers get a [`Database`] through their [`Context`](crate::Context). It
//! offers table creation plus parameterized `execute`/`get` helpers and returns
//! rows as [`Row`] views. Every statement goes through `SeaORM` with its values
//! bound separately from the SQL text.
//!
//! The underlying pool holds a single connection, so statements issued by
//! concurrently running handlers are serialized. Read-then-write sequences are
//! *not* atomic: counters must be updated with a single statement such as
//! `UPDATE users SET coins = coins + ? WHERE user_id = ?`.

mod row;

pub use row::Row;

use crate::config::database::{DbType, resolve_database_url};
use crate::errors::{Error, Result};
use sea_orm::{ConnectOptions, ConnectionTrait, DatabaseConnection, DbBackend, Statement, Value};
use tracing::{debug, info, instrument};

/// Builds a parameter list for [`Database::execute`] and [`Database::get`].
///
/// ```rust,ignore
/// db.execute(
///     "UPDATE users SET coins = coins + ? WHERE user_id = ?",
///     params![50, ctx.sender().id],
/// )
/// .await?;
/// ```
#[macro_export]
macro_rules! params {
    () => {
        ::std::vec::Vec::<$crate::Value>::new()
    };
    ($($value:expr),+ $(,)?) => {
        vec![$($crate::Value::from($value)),+]
    };
}

/// Handle to the bot's relational store.
///
/// Cloning is cheap and every clone shares the same connection.
#[derive(Debug, Clone)]
pub struct Database {
    connection: DatabaseConnection,
}

impl Database {
    /// Connects to the store behind `url` with a single-connection pool.
    #[instrument(skip(url))]
    pub async fn connect(url: &str) -> Result<Self> {
        let mut options = ConnectOptions::new(url.to_owned());
        options
            .max_connections(1)
            .min_connections(1)
            .sqlx_logging(false);

        let connection = sea_orm::Database::connect(options).await?;
        info!(backend = ?connection.get_database_backend(), "Database connected");
        Ok(Self { connection })
    }

    /// Opens the store selected by `db_type` and `target`.
    ///
    /// `DATABASE_URL` in the environment overrides the target.
    pub async fn open(db_type: DbType, target: &str) -> Result<Self> {
        let url = resolve_database_url(db_type, target)?;
        Self::connect(&url).await
    }

    /// Opens a private in-memory `SQLite` store.
    pub async fn in_memory() -> Result<Self> {
        Self::connect("sqlite::memory:").await
    }

    /// Wraps an already established `SeaORM` connection.
    #[must_use]
    pub const fn from_connection(connection: DatabaseConnection) -> Self {
        Self { connection }
    }

    /// The underlying `SeaORM` connection, for entity-based queries.
    #[must_use]
    pub const fn connection(&self) -> &DatabaseConnection {
        &self.connection
    }

    fn backend(&self) -> DbBackend {
        self.connection.get_database_backend()
    }

    fn statement(&self, sql: &str, params: Vec<Value>) -> Statement {
        Statement::from_sql_and_values(self.backend(), sql, params)
    }

    /// Creates `name` with the given columns unless it already exists.
    ///
    /// Columns are `(column name, type and constraints)` pairs, kept in order:
    ///
    /// ```rust,ignore
    /// db.create_table("users", &[
    ///     ("user_id", "INTEGER PRIMARY KEY"),
    ///     ("coins", "INTEGER DEFAULT 0"),
    /// ]).await?;
    /// ```
    ///
    /// Names are validated and quoted. Calling this again with the same shape
    /// is a no-op and leaves existing rows untouched.
    #[instrument(skip(self, columns))]
    pub async fn create_table(&self, name: &str, columns: &[(&str, &str)]) -> Result<()> {
        let sql = create_table_sql(name, columns)?;
        debug!(%sql, "Creating table if absent");
        self.connection.execute_unprepared(&sql).await?;
        Ok(())
    }

    /// Runs a statement that returns no rows and reports how many rows it touched.
    #[instrument(skip(self, params), fields(param_count = params.len()))]
    pub async fn execute(&self, sql: &str, params: Vec<Value>) -> Result<u64> {
        let result = self.connection.execute(self.statement(sql, params)).await?;
        Ok(result.rows_affected())
    }

    /// Runs a read (or a write with `RETURNING`) and returns every result
    /// row, possibly none.
    #[instrument(skip(self, params), fields(param_count = params.len()))]
    pub async fn get(&self, sql: &str, params: Vec<Value>) -> Result<Vec<Row>> {
        let results = self.connection.query_all(self.statement(sql, params)).await?;
        results.iter().map(row::decode).collect()
    }

    /// Runs a read and returns the first row, or `None` when nothing matches.
    #[instrument(skip(self, params), fields(param_count = params.len()))]
    pub async fn get_one(&self, sql: &str, params: Vec<Value>) -> Result<Option<Row>> {
        self.connection
            .query_one(self.statement(sql, params))
            .await?
            .as_ref()
            .map(row::decode)
            .transpose()
    }
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    chars
        .next()
        .is_some_and(|first| first.is_ascii_alphabetic() || first == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

fn quote_identifier(name: &str) -> Result<String> {
    if is_identifier(name) {
        Ok(format!("\"{name}\""))
    } else {
        Err(Error::InvalidIdentifier {
            name: name.to_string(),
        })
    }
}

/// Builds the `CREATE TABLE IF NOT EXISTS` DDL for [`Database::create_table`].
fn create_table_sql(name: &str, columns: &[(&str, &str)]) -> Result<String> {
    if columns.is_empty() {
        return Err(Error::InvalidIdentifier {
            name: format!("{name} (no columns)"),
        });
    }

    let mut definitions = Vec::with_capacity(columns.len());
    for (column, definition) in columns {
        // Definitions are application constants, but one statement only.
        if definition.contains(';') {
            return Err(Error::InvalidIdentifier {
                name: format!("{column} {definition}"),
            });
        }
        definitions.push(format!("{} {}", quote_identifier(column)?, definition.trim()));
    }

    Ok(format!(
        "CREATE TABLE IF NOT EXISTS {} ({})",
        quote_identifier(name)?,
        definitions.join(", ")
    ))
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::test_utils::setup_test_db as users_db;
    use tokio::task::JoinSet;

    #[test]
    fn test_create_table_sql_quotes_names() {
        let sql = create_table_sql("users", &[("user_id", "INTEGER PRIMARY KEY")]).unwrap();
        assert_eq!(
            sql,
            "CREATE TABLE IF NOT EXISTS \"users\" (\"user_id\" INTEGER PRIMARY KEY)"
        );
    }

    #[test]
    fn test_create_table_sql_rejects_bad_names() {
        assert!(create_table_sql("users; DROP", &[("a", "TEXT")]).is_err());
        assert!(create_table_sql("users", &[("1abc", "TEXT")]).is_err());
        assert!(create_table_sql("users", &[("a", "TEXT); DROP TABLE x; --")]).is_err());
        assert!(create_table_sql("users", &[]).is_err());
    }

    #[tokio::test]
    async fn test_create_table_is_idempotent() -> Result<()> {
        let db = users_db().await?;
        db.execute(
            "INSERT INTO users (user_id, coins) VALUES (?, ?)",
            params![1_i64, 25_i64],
        )
        .await?;

        db.create_table(
            "users",
            &[
                ("user_id", "INTEGER PRIMARY KEY"),
                ("coins", "INTEGER DEFAULT 0"),
                ("fishes_caught", "INTEGER DEFAULT 0"),
            ],
        )
        .await?;

        let rows = db.get("SELECT * FROM users", params![]).await?;
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].i64("coins")?, 25);
        Ok(())
    }

    #[tokio::test]
    async fn test_get_one_absent_returns_none() -> Result<()> {
        let db = users_db().await?;
        let row = db
            .get_one("SELECT * FROM users WHERE user_id = ?", params![42_i64])
            .await?;
        assert!(row.is_none());
        Ok(())
    }

    #[tokio::test]
    async fn test_get_empty_returns_empty_vec() -> Result<()> {
        let db = users_db().await?;
        let rows = db
            .get("SELECT * FROM users WHERE coins > ?", params![0_i64])
            .await?;
        assert!(rows.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_execute_reports_constraint_violation() -> Result<()> {
        let db = users_db().await?;
        db.execute("INSERT INTO users (user_id) VALUES (?)", params![7_i64])
            .await?;
        let result = db
            .execute("INSERT INTO users (user_id) VALUES (?)", params![7_i64])
            .await;
        assert!(matches!(result, Err(Error::Storage(_))));
        Ok(())
    }

    #[tokio::test]
    async fn test_params_are_not_interpolated() -> Result<()> {
        let db = Database::in_memory().await?;
        db.create_table("notes", &[("body", "TEXT NOT NULL")]).await?;
        let hostile = "x'); DROP TABLE notes; --";
        db.execute("INSERT INTO notes (body) VALUES (?)", params![hostile])
            .await?;

        let row = db.get_one("SELECT body FROM notes", params![]).await?.unwrap();
        assert_eq!(row.str("body")?, hostile);
        Ok(())
    }

    #[tokio::test]
    async fn test_get_keeps_computed_columns() -> Result<()> {
        let db = users_db().await?;
        db.execute(
            "INSERT INTO users (user_id, coins) VALUES (?, ?), (?, ?)",
            params![1_i64, 20_i64, 2_i64, 30_i64],
        )
        .await?;

        let row = db
            .get_one(
                "SELECT COUNT(*) AS n, SUM(coins) AS s, MAX(coins) AS m, AVG(coins) AS a, \
                 MIN(coins) + 1 AS c1, NULL AS nothing, 'fish' AS word FROM users",
                params![],
            )
            .await?
            .unwrap();
        assert_eq!(row.i64("n")?, 2);
        assert_eq!(row.i64("s")?, 50);
        assert_eq!(row.i64("m")?, 30);
        assert!((row.get::<f64>("a")? - 25.0).abs() < f64::EPSILON);
        assert_eq!(row.i64("c1")?, 21);
        assert!(row.contains("nothing"));
        assert!(row["nothing"].is_null());
        assert_eq!(row.str("word")?, "fish");
        Ok(())
    }

    #[tokio::test]
    async fn test_get_sum_over_no_rows_is_null() -> Result<()> {
        let db = users_db().await?;
        let rows = db
            .get("SELECT COUNT(*) AS n, SUM(coins) AS s FROM users", params![])
            .await?;
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].i64("n")?, 0);
        assert!(rows[0]["s"].is_null());
        Ok(())
    }

    #[tokio::test]
    async fn test_concurrent_atomic_increments_are_not_lost() -> Result<()> {
        const INCREMENTS: i64 = 50;

        let db = users_db().await?;
        db.execute(
            "INSERT INTO users (user_id, coins, fishes_caught) VALUES (?, 0, 3)",
            params![1_i64],
        )
        .await?;

        let mut tasks = JoinSet::new();
        for _ in 0..INCREMENTS {
            let db = db.clone();
            tasks.spawn(async move {
                db.execute(
                    "UPDATE users SET fishes_caught = fishes_caught + 1 WHERE user_id = ?",
                    params![1_i64],
                )
                .await
            });
        }
        while let Some(joined) = tasks.join_next().await {
            joined.unwrap()?;
        }

        let row = db
            .get_one("SELECT fishes_caught FROM users WHERE user_id = ?", params![1_i64])
            .await?
            .unwrap();
        assert_eq!(row.i64("fishes_caught")?, 3 + INCREMENTS);
        Ok(())
    }
}
