use std::sync::Arc;

use tracing::{debug, warn};

use crate::drivers::TokioPostgresDriver;
use crate::error::{OrmLinkError, Result};
use crate::quoting;
use crate::traits::DatabaseDriver;
use crate::types::{Row, RowSet, SqlValue};

/// Connection lifecycle of an [`Adapter`].
///
/// The only transition into `Connected` is a successful
/// `force_connection`; the only transition back is `close`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ConnectionState {
    Disconnected,
    Connected,
}

/// Main entry point for ormlink.
///
/// One `Adapter` per logical database connection. Credentials are
/// stored by [`connect`](Adapter::connect) without touching the
/// network; the physical session is established lazily by the first
/// operation that needs it. All engine-specific work is delegated to a
/// [`DatabaseDriver`].
///
/// An `Adapter` expects a single logical caller: methods take
/// `&mut self` and no internal locking is performed. Concurrent use
/// must be serialized externally, one adapter per worker being the
/// usual arrangement.
pub struct Adapter {
    driver: Arc<dyn DatabaseDriver>,
    host: String,
    user: String,
    password: String,
    database: Option<String>,
    state: ConnectionState,
}

impl Adapter {
    /// Create an adapter backed by the given driver.
    ///
    /// # Example
    /// ```ignore
    /// let driver = Arc::new(InMemoryTestDriver::new());
    /// let mut adapter = Adapter::new(driver);
    /// ```
    pub fn new(driver: Arc<dyn DatabaseDriver>) -> Self {
        Self {
            driver,
            host: String::new(),
            user: String::new(),
            password: String::new(),
            database: None,
            state: ConnectionState::Disconnected,
        }
    }

    /// Create an adapter backed by the bundled PostgreSQL driver.
    pub fn postgres() -> Self {
        Self::new(Arc::new(TokioPostgresDriver::new()))
    }

    /// Store connection credentials. Pure state mutation: no network
    /// traffic happens until the first operation that needs a session.
    pub fn connect(
        &mut self,
        host: impl Into<String>,
        user: impl Into<String>,
        password: impl Into<String>,
    ) {
        self.host = host.into();
        self.user = user.into();
        self.password = password.into();
    }

    /// Select the working database.
    ///
    /// While disconnected the name is only recorded; the selection is
    /// applied automatically once the connection is established. While
    /// connected the driver hook is invoked immediately.
    pub async fn select_database(&mut self, name: impl Into<String>) -> Result<()> {
        let name = name.into();
        self.database = Some(name.clone());
        if self.state == ConnectionState::Connected {
            self.apply_database_selection(&name).await?;
        }
        Ok(())
    }

    /// Establish the physical connection if there is none yet.
    ///
    /// This is the single choke point every data operation passes
    /// through, which keeps the lazy-connection policy in one place.
    /// Idempotent: a connected adapter returns immediately. On connect
    /// failure the adapter stays disconnected; a pending database
    /// selection is applied right after a successful connect, and its
    /// failure is propagated while the session itself stays live.
    pub async fn force_connection(&mut self) -> Result<()> {
        if self.state == ConnectionState::Connected {
            return Ok(());
        }
        debug!("connecting to {} as {}", self.host, self.user);
        if let Err(cause) = self
            .driver
            .connect(&self.host, &self.user, &self.password)
            .await
        {
            warn!("connect hook failed: {}", cause);
            return Err(OrmLinkError::ConnectionFailed {
                host: self.host.clone(),
                user: self.user.clone(),
                password: self.password.clone(),
            });
        }
        self.state = ConnectionState::Connected;
        if let Some(database) = self.database.clone() {
            self.apply_database_selection(&database).await?;
        }
        Ok(())
    }

    /// Close the connection. Best-effort: a failing driver close hook
    /// is logged and suppressed, and the adapter is marked disconnected
    /// unconditionally. No-op while disconnected. Credentials and the
    /// database name are retained, so a later operation reconnects.
    pub async fn close(&mut self) {
        if self.state == ConnectionState::Disconnected {
            return;
        }
        if let Err(cause) = self.driver.close().await {
            warn!("close hook failed: {}", cause);
        }
        self.state = ConnectionState::Disconnected;
        debug!("connection closed");
    }

    /// Execute a row-returning statement, connecting first if needed.
    pub async fn select(&mut self, sql: &str) -> Result<Vec<Row>> {
        self.force_connection().await?;
        let set = self.driver.select_rows(sql).await?;
        Ok(set.into_rows())
    }

    /// Execute a row-returning statement and keep only the first row.
    pub async fn select_row(&mut self, sql: &str) -> Result<Option<Row>> {
        let mut rows = self.select(sql).await?;
        if rows.is_empty() {
            Ok(None)
        } else {
            Ok(Some(rows.remove(0)))
        }
    }

    /// Execute a row-returning statement and keep only the first field
    /// of the first row.
    pub async fn select_cell(&mut self, sql: &str) -> Result<Option<String>> {
        let row = self.select_row(sql).await?;
        Ok(row.and_then(|row| row.first().map(|cell| cell.to_string())))
    }

    /// Execute an inserting statement; returns the generated row
    /// identifier in string form.
    pub async fn insert(&mut self, sql: &str) -> Result<String> {
        self.force_connection().await?;
        self.driver.insert_row(sql).await
    }

    /// Execute a mutating statement; returns the affected-row count.
    pub async fn update(&mut self, sql: &str) -> Result<u64> {
        self.force_connection().await?;
        self.driver.update_rows(sql).await
    }

    /// Open a transaction. Nesting semantics, if any, are a driver
    /// concern; no transaction state is tracked at this layer.
    pub async fn transaction_begin(&mut self) -> Result<()> {
        self.force_connection().await?;
        self.driver.transaction_begin().await
    }

    pub async fn transaction_commit(&mut self) -> Result<()> {
        self.force_connection().await?;
        self.driver.transaction_commit().await
    }

    pub async fn transaction_rollback(&mut self) -> Result<()> {
        self.force_connection().await?;
        self.driver.transaction_rollback().await
    }

    /// Create a table from a driver-dialect fields description.
    pub async fn create_table(&mut self, name: &str, fields: &str) -> Result<()> {
        self.force_connection().await?;
        self.driver.create_table(name, fields).await
    }

    /// Drop a table.
    pub async fn drop_table(&mut self, name: &str) -> Result<()> {
        self.force_connection().await?;
        self.driver.drop_table(name).await
    }

    /// Describe the columns of a table; the result shape is
    /// driver-defined.
    pub async fn describe_table(&mut self, name: &str) -> Result<RowSet> {
        self.force_connection().await?;
        self.driver.describe_table(name).await
    }

    /// True while a live driver session exists.
    pub fn is_connected(&self) -> bool {
        self.state == ConnectionState::Connected
    }

    /// The pending or active database name, if one was selected.
    pub fn database(&self) -> Option<&str> {
        self.database.as_deref()
    }

    /// Encode a value as a SQL literal. Pure; never touches the
    /// connection. Boolean literals come from the driver.
    pub fn quote(&self, value: &SqlValue) -> String {
        quoting::quote(value, self.driver.as_ref())
    }

    /// Encode a string as a quoted, escaped SQL literal.
    pub fn quote_string(&self, text: &str) -> String {
        quoting::quote_string(text)
    }

    /// Quote a column identifier using the driver's dialect.
    pub fn quote_column_name(&self, name: &str) -> String {
        self.driver.quote_column_name(name)
    }

    /// Quote a table identifier using the driver's dialect.
    pub fn quote_table_name(&self, name: &str) -> String {
        self.driver.quote_table_name(name)
    }

    async fn apply_database_selection(&mut self, database: &str) -> Result<()> {
        if let Err(cause) = self.driver.select_database(database).await {
            warn!("select-database hook failed: {}", cause);
            return Err(OrmLinkError::DatabaseSelectFailed {
                database: database.to_string(),
            });
        }
        Ok(())
    }
}
