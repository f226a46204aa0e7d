use async_trait::async_trait;

use crate::error::Result;
use crate::types::RowSet;

/// Trait for database driver implementations.
///
/// Drivers own everything engine-specific: the wire protocol, native
/// value conversion, and dialect quirks. The `Adapter` guarantees that
/// no hook other than `connect` is invoked before `connect` succeeded,
/// so implementations may assume a live session in every other hook.
///
/// Failure contract: `connect` and `select_database` may fail with any
/// error value (the adapter replaces it with the contextualized kind);
/// the statement hooks fail with `QueryFailed` carrying the SQL text,
/// which the adapter propagates unchanged.
#[async_trait]
pub trait DatabaseDriver: Send + Sync {
    /// Establish the physical session with the given credentials.
    async fn connect(&self, host: &str, user: &str, password: &str) -> Result<()>;

    /// Switch the live session to `database`.
    async fn select_database(&self, database: &str) -> Result<()>;

    /// Tear down the session. The adapter treats this as best-effort
    /// and suppresses any error.
    async fn close(&self) -> Result<()>;

    /// Create a table. `fields` is a driver-dialect column-definition
    /// string, spliced verbatim into the statement.
    async fn create_table(&self, name: &str, fields: &str) -> Result<()>;

    /// Drop a table.
    async fn drop_table(&self, name: &str) -> Result<()>;

    /// Describe the columns of a table; the result shape is
    /// driver-defined.
    async fn describe_table(&self, name: &str) -> Result<RowSet>;

    /// Execute an arbitrary statement, returning the affected-row count.
    async fn execute_statement(&self, sql: &str) -> Result<u64>;

    /// Execute a row-returning statement. Column and row order must be
    /// preserved.
    async fn select_rows(&self, sql: &str) -> Result<RowSet>;

    /// Execute an inserting statement and return the generated row
    /// identifier in string form, even when numeric.
    async fn insert_row(&self, sql: &str) -> Result<String>;

    /// Execute a mutating statement and return the affected-row count.
    async fn update_rows(&self, sql: &str) -> Result<u64>;

    async fn transaction_begin(&self) -> Result<()>;

    async fn transaction_commit(&self) -> Result<()>;

    async fn transaction_rollback(&self) -> Result<()>;

    /// SQL literal for boolean true.
    fn quote_true(&self) -> &str {
        "1"
    }

    /// SQL literal for boolean false.
    fn quote_false(&self) -> &str {
        "0"
    }

    /// Quote a column identifier. Identity by default; dialects add
    /// their own delimiters.
    fn quote_column_name(&self, name: &str) -> String {
        name.to_string()
    }

    /// Quote a table identifier. Follows `quote_column_name` unless a
    /// dialect distinguishes the two.
    fn quote_table_name(&self, name: &str) -> String {
        self.quote_column_name(name)
    }
}
