use async_trait::async_trait;
use tokio::sync::Mutex;
use tokio_postgres::{Client, Config, NoTls};
use tracing::error;

use crate::error::{OrmLinkError, Result};
use crate::traits::DatabaseDriver;
use crate::types::RowSet;

/// PostgreSQL driver implementation using tokio-postgres.
///
/// The session is opened by the `connect` hook rather than at
/// construction, so the adapter's lazy-connection policy decides when
/// I/O first happens. PostgreSQL has no in-session database switch;
/// `select_database` re-establishes the session against the new
/// database instead.
pub struct TokioPostgresDriver {
    session: Mutex<Session>,
}

#[derive(Default)]
struct Session {
    client: Option<Client>,
    host: String,
    user: String,
    password: String,
    database: Option<String>,
}

impl TokioPostgresDriver {
    pub fn new() -> Self {
        Self {
            session: Mutex::new(Session::default()),
        }
    }

    // Transaction control must not go through the prepared-statement
    // path, so it uses the simple query protocol.
    async fn batch(&self, sql: &str) -> Result<()> {
        let session = self.session.lock().await;
        let client = require_client(&session, sql)?;
        client.batch_execute(sql).await.map_err(|cause| {
            error!("statement failed: {}", cause);
            query_failed(sql)
        })
    }
}

impl Default for TokioPostgresDriver {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DatabaseDriver for TokioPostgresDriver {
    async fn connect(&self, host: &str, user: &str, password: &str) -> Result<()> {
        let mut session = self.session.lock().await;
        session.host = host.to_string();
        session.user = user.to_string();
        session.password = password.to_string();
        match open_client(&session).await {
            Ok(client) => {
                session.client = Some(client);
                Ok(())
            }
            Err(cause) => {
                error!("postgres connect failed: {}", cause);
                Err(OrmLinkError::ConnectionFailed {
                    host: host.to_string(),
                    user: user.to_string(),
                    password: password.to_string(),
                })
            }
        }
    }

    async fn select_database(&self, database: &str) -> Result<()> {
        let mut session = self.session.lock().await;
        let previous = session.database.replace(database.to_string());
        match open_client(&session).await {
            Ok(client) => {
                session.client = Some(client);
                Ok(())
            }
            Err(cause) => {
                error!("postgres select-database failed: {}", cause);
                // The previous session, if any, stays usable.
                session.database = previous;
                Err(OrmLinkError::DatabaseSelectFailed {
                    database: database.to_string(),
                })
            }
        }
    }

    async fn close(&self) -> Result<()> {
        let mut session = self.session.lock().await;
        // Dropping the client ends the spawned connection task.
        session.client = None;
        Ok(())
    }

    async fn create_table(&self, name: &str, fields: &str) -> Result<()> {
        let sql = format!("CREATE TABLE {} ({})", self.quote_table_name(name), fields);
        self.execute_statement(&sql).await?;
        Ok(())
    }

    async fn drop_table(&self, name: &str) -> Result<()> {
        let sql = format!("DROP TABLE {}", self.quote_table_name(name));
        self.execute_statement(&sql).await?;
        Ok(())
    }

    async fn describe_table(&self, name: &str) -> Result<RowSet> {
        let sql = "SELECT column_name, data_type, is_nullable \
                   FROM information_schema.columns \
                   WHERE table_name = $1 ORDER BY ordinal_position";
        let session = self.session.lock().await;
        let client = require_client(&session, sql)?;
        let rows = client.query(sql, &[&name]).await.map_err(|cause| {
            error!("describe failed: {}", cause);
            query_failed(sql)
        })?;
        Ok(rows_to_set(&rows))
    }

    async fn execute_statement(&self, sql: &str) -> Result<u64> {
        let session = self.session.lock().await;
        let client = require_client(&session, sql)?;
        client.execute(sql, &[]).await.map_err(|cause| {
            error!("statement failed: {}", cause);
            query_failed(sql)
        })
    }

    async fn select_rows(&self, sql: &str) -> Result<RowSet> {
        let session = self.session.lock().await;
        let client = require_client(&session, sql)?;
        let rows = client.query(sql, &[]).await.map_err(|cause| {
            error!("query failed: {}", cause);
            query_failed(sql)
        })?;
        Ok(rows_to_set(&rows))
    }

    async fn insert_row(&self, sql: &str) -> Result<String> {
        let session = self.session.lock().await;
        let client = require_client(&session, sql)?;
        let rows = client.query(sql, &[]).await.map_err(|cause| {
            error!("insert failed: {}", cause);
            query_failed(sql)
        })?;
        // Generated ids come back through the RETURNING convention; a
        // statement without one yields no rows.
        Ok(rows
            .first()
            .map(|row| row_value_to_string(row, 0))
            .unwrap_or_else(|| "0".to_string()))
    }

    async fn update_rows(&self, sql: &str) -> Result<u64> {
        let session = self.session.lock().await;
        let client = require_client(&session, sql)?;
        client.execute(sql, &[]).await.map_err(|cause| {
            error!("update failed: {}", cause);
            query_failed(sql)
        })
    }

    async fn transaction_begin(&self) -> Result<()> {
        self.batch("BEGIN").await
    }

    async fn transaction_commit(&self) -> Result<()> {
        self.batch("COMMIT").await
    }

    async fn transaction_rollback(&self) -> Result<()> {
        self.batch("ROLLBACK").await
    }

    fn quote_true(&self) -> &str {
        "TRUE"
    }

    fn quote_false(&self) -> &str {
        "FALSE"
    }

    fn quote_column_name(&self, name: &str) -> String {
        format!("\"{}\"", name)
    }
}

async fn open_client(session: &Session) -> std::result::Result<Client, tokio_postgres::Error> {
    let mut config = Config::new();
    config.host(&session.host);
    config.user(&session.user);
    config.password(&session.password);
    if let Some(database) = &session.database {
        config.dbname(database);
    }
    let (client, connection) = config.connect(NoTls).await?;

    // The connection task drives the socket until the client is dropped.
    tokio::spawn(async move {
        if let Err(e) = connection.await {
            error!("postgres connection task failed: {}", e);
        }
    });

    Ok(client)
}

fn require_client<'a>(session: &'a Session, sql: &str) -> Result<&'a Client> {
    session.client.as_ref().ok_or_else(|| query_failed(sql))
}

fn query_failed(sql: &str) -> OrmLinkError {
    OrmLinkError::QueryFailed {
        sql: sql.to_string(),
    }
}

fn rows_to_set(rows: &[tokio_postgres::Row]) -> RowSet {
    let columns: Vec<String> = match rows.first() {
        Some(row) => row.columns().iter().map(|c| c.name().to_string()).collect(),
        None => Vec::new(),
    };

    let converted: Vec<Vec<String>> = rows
        .iter()
        .map(|row| (0..row.len()).map(|i| row_value_to_string(row, i)).collect())
        .collect();

    RowSet::new(columns, converted)
}

/// Convert a row value at a given index to a string.
fn row_value_to_string(row: &tokio_postgres::Row, index: usize) -> String {
    // Try common types and convert to string. A production driver for a
    // wider schema surface would cover more of the pg type catalog.
    if let Ok(val) = row.try_get::<_, i32>(index) {
        return val.to_string();
    }

    if let Ok(val) = row.try_get::<_, i64>(index) {
        return val.to_string();
    }

    if let Ok(val) = row.try_get::<_, String>(index) {
        return val;
    }

    if let Ok(val) = row.try_get::<_, bool>(index) {
        return val.to_string();
    }

    if let Ok(val) = row.try_get::<_, f64>(index) {
        return val.to_string();
    }

    // Option<String> catches SQL NULL for textual columns.
    if let Ok(val) = row.try_get::<_, Option<String>>(index) {
        return val.unwrap_or_else(|| "NULL".to_string());
    }

    "UNKNOWN".to_string()
}
