use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::{OrmLinkError, Result};
use crate::traits::DatabaseDriver;
use crate::types::RowSet;

/// A recorded driver hook invocation for verification.
#[derive(Debug, Clone, PartialEq)]
pub enum RecordedCall {
    Connect {
        host: String,
        user: String,
        password: String,
    },
    SelectDatabase {
        database: String,
    },
    Close,
    CreateTable {
        name: String,
        fields: String,
    },
    DropTable {
        name: String,
    },
    DescribeTable {
        name: String,
    },
    ExecuteStatement {
        sql: String,
    },
    SelectRows {
        sql: String,
    },
    InsertRow {
        sql: String,
    },
    UpdateRows {
        sql: String,
    },
    TransactionBegin,
    TransactionCommit,
    TransactionRollback,
}

/// An in-memory database driver for testing.
///
/// Records every hook invocation, returns scripted responses in FIFO
/// order, and can be configured to fail individual hooks.
///
/// # Example
/// ```
/// use ormlink::drivers::{InMemoryTestDriver, RowSetBuilder};
///
/// let driver = InMemoryTestDriver::new().with_row_set(
///     RowSetBuilder::new()
///         .columns(&["id", "name"])
///         .row(&["1", "Alice"])
///         .build(),
/// );
/// ```
pub struct InMemoryTestDriver {
    calls: Mutex<Vec<RecordedCall>>,
    row_sets: Mutex<VecDeque<RowSet>>,
    insert_ids: Mutex<VecDeque<String>>,
    affected_counts: Mutex<VecDeque<u64>>,
    fail_connect: bool,
    fail_select_database: bool,
    fail_close: bool,
    failing_statements: Vec<String>,
}

impl InMemoryTestDriver {
    /// Create a driver with no scripted responses: every hook succeeds
    /// and row-returning hooks yield empty sets.
    pub fn new() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            row_sets: Mutex::new(VecDeque::new()),
            insert_ids: Mutex::new(VecDeque::new()),
            affected_counts: Mutex::new(VecDeque::new()),
            fail_connect: false,
            fail_select_database: false,
            fail_close: false,
            failing_statements: Vec::new(),
        }
    }

    /// Queue a row set for the next row-returning hook. FIFO order.
    pub fn with_row_set(self, set: RowSet) -> Self {
        self.row_sets.lock().unwrap().push_back(set);
        self
    }

    /// Queue a generated id for the next `insert_row` call.
    pub fn with_insert_id(self, id: impl Into<String>) -> Self {
        self.insert_ids.lock().unwrap().push_back(id.into());
        self
    }

    /// Queue an affected-row count for the next mutating hook.
    pub fn with_affected_rows(self, count: u64) -> Self {
        self.affected_counts.lock().unwrap().push_back(count);
        self
    }

    /// Make the connect hook report failure.
    pub fn failing_connect(mut self) -> Self {
        self.fail_connect = true;
        self
    }

    /// Make the select-database hook report failure.
    pub fn failing_select_database(mut self) -> Self {
        self.fail_select_database = true;
        self
    }

    /// Make the close hook report failure.
    pub fn failing_close(mut self) -> Self {
        self.fail_close = true;
        self
    }

    /// Make statement hooks fail for this exact SQL text. The
    /// transaction hooks match against `BEGIN`, `COMMIT` and
    /// `ROLLBACK`.
    pub fn failing_statement(mut self, sql: impl Into<String>) -> Self {
        self.failing_statements.push(sql.into());
        self
    }

    /// All hook invocations recorded so far, in order.
    pub fn recorded_calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    /// The most recent hook invocation, if any.
    pub fn last_call(&self) -> Option<RecordedCall> {
        self.calls.lock().unwrap().last().cloned()
    }

    /// Number of connect hook invocations.
    pub fn connect_count(&self) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|call| matches!(call, RecordedCall::Connect { .. }))
            .count()
    }

    /// Number of select-database hook invocations.
    pub fn select_database_count(&self) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|call| matches!(call, RecordedCall::SelectDatabase { .. }))
            .count()
    }

    /// Assert that exactly n hook invocations were recorded.
    pub fn assert_call_count(&self, expected: usize) {
        let actual = self.calls.lock().unwrap().len();
        assert_eq!(
            actual, expected,
            "Call count mismatch. Expected: {}, Actual: {}",
            expected, actual
        );
    }

    /// Assert that the most recent hook invocation matches.
    pub fn assert_last_call(&self, expected: RecordedCall) {
        let last = self.last_call().expect("No calls were recorded");
        assert_eq!(
            last, expected,
            "Call mismatch.\nExpected: {:?}\nActual: {:?}",
            expected, last
        );
    }

    fn record(&self, call: RecordedCall) {
        self.calls.lock().unwrap().push(call);
    }

    fn check_statement(&self, sql: &str) -> Result<()> {
        if self.failing_statements.iter().any(|s| s == sql) {
            return Err(OrmLinkError::QueryFailed {
                sql: sql.to_string(),
            });
        }
        Ok(())
    }

    fn next_row_set(&self) -> RowSet {
        self.row_sets
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(RowSet::empty)
    }
}

impl Default for InMemoryTestDriver {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DatabaseDriver for InMemoryTestDriver {
    async fn connect(&self, host: &str, user: &str, password: &str) -> Result<()> {
        self.record(RecordedCall::Connect {
            host: host.to_string(),
            user: user.to_string(),
            password: password.to_string(),
        });
        if self.fail_connect {
            return Err(OrmLinkError::ConnectionFailed {
                host: host.to_string(),
                user: user.to_string(),
                password: password.to_string(),
            });
        }
        Ok(())
    }

    async fn select_database(&self, database: &str) -> Result<()> {
        self.record(RecordedCall::SelectDatabase {
            database: database.to_string(),
        });
        if self.fail_select_database {
            return Err(OrmLinkError::DatabaseSelectFailed {
                database: database.to_string(),
            });
        }
        Ok(())
    }

    async fn close(&self) -> Result<()> {
        self.record(RecordedCall::Close);
        if self.fail_close {
            return Err(OrmLinkError::QueryFailed {
                sql: "close".to_string(),
            });
        }
        Ok(())
    }

    async fn create_table(&self, name: &str, fields: &str) -> Result<()> {
        self.record(RecordedCall::CreateTable {
            name: name.to_string(),
            fields: fields.to_string(),
        });
        Ok(())
    }

    async fn drop_table(&self, name: &str) -> Result<()> {
        self.record(RecordedCall::DropTable {
            name: name.to_string(),
        });
        Ok(())
    }

    async fn describe_table(&self, name: &str) -> Result<RowSet> {
        self.record(RecordedCall::DescribeTable {
            name: name.to_string(),
        });
        Ok(self.next_row_set())
    }

    async fn execute_statement(&self, sql: &str) -> Result<u64> {
        self.record(RecordedCall::ExecuteStatement {
            sql: sql.to_string(),
        });
        self.check_statement(sql)?;
        Ok(self.affected_counts.lock().unwrap().pop_front().unwrap_or(0))
    }

    async fn select_rows(&self, sql: &str) -> Result<RowSet> {
        self.record(RecordedCall::SelectRows {
            sql: sql.to_string(),
        });
        self.check_statement(sql)?;
        Ok(self.next_row_set())
    }

    async fn insert_row(&self, sql: &str) -> Result<String> {
        self.record(RecordedCall::InsertRow {
            sql: sql.to_string(),
        });
        self.check_statement(sql)?;
        Ok(self
            .insert_ids
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| "0".to_string()))
    }

    async fn update_rows(&self, sql: &str) -> Result<u64> {
        self.record(RecordedCall::UpdateRows {
            sql: sql.to_string(),
        });
        self.check_statement(sql)?;
        Ok(self.affected_counts.lock().unwrap().pop_front().unwrap_or(0))
    }

    async fn transaction_begin(&self) -> Result<()> {
        self.record(RecordedCall::TransactionBegin);
        self.check_statement("BEGIN")
    }

    async fn transaction_commit(&self) -> Result<()> {
        self.record(RecordedCall::TransactionCommit);
        self.check_statement("COMMIT")
    }

    async fn transaction_rollback(&self) -> Result<()> {
        self.record(RecordedCall::TransactionRollback);
        self.check_statement("ROLLBACK")
    }
}

/// Builder for creating test row sets easily.
pub struct RowSetBuilder {
    columns: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl RowSetBuilder {
    pub fn new() -> Self {
        Self {
            columns: Vec::new(),
            rows: Vec::new(),
        }
    }

    /// Set the column names for the row set.
    pub fn columns(mut self, cols: &[&str]) -> Self {
        self.columns = cols.iter().map(|s| s.to_string()).collect();
        self
    }

    /// Add a row of string values.
    pub fn row(mut self, values: &[&str]) -> Self {
        self.rows
            .push(values.iter().map(|s| s.to_string()).collect());
        self
    }

    /// Build the RowSet.
    pub fn build(self) -> RowSet {
        RowSet::new(self.columns, self.rows)
    }
}

impl Default for RowSetBuilder {
    fn default() -> Self {
        Self::new()
    }
}
