use thiserror::Error;

/// Error type for ormlink operations.
///
/// Three kinds, each carrying the diagnostic context of the failing
/// operation rather than a bare message. Nothing is retried or recovered
/// at this layer; callers see every failure as it happened.
#[derive(Debug, Error)]
pub enum OrmLinkError {
    /// Establishing the physical connection failed. Carries the exact
    /// credential tuple that was attempted. Raised only from
    /// `Adapter::force_connection`.
    #[error("connection to {host} as {user} failed")]
    ConnectionFailed {
        host: String,
        user: String,
        password: String,
    },

    /// The driver could not switch to the requested database, either
    /// immediately or during the deferred selection at connection time.
    #[error("could not select database {database}")]
    DatabaseSelectFailed { database: String },

    /// A statement-level driver hook failed. Carries the failing SQL
    /// text; constructed by the driver and propagated unchanged.
    #[error("query failed: {sql}")]
    QueryFailed { sql: String },
}

/// Result type alias for ormlink operations
pub type Result<T> = std::result::Result<T, OrmLinkError>;
