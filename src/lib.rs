//! ormlink - A lazy-connecting, driver-agnostic database adapter layer
//!
//! The connectivity core of a small ORM: an [`Adapter`] holds
//! credentials and connection state, defers the physical connection
//! until the first operation that needs one, and delegates all
//! engine-specific work to a [`DatabaseDriver`]. A quoting subsystem
//! encodes values into injection-safe SQL literals.
//!
//! # Example
//! ```ignore
//! use ormlink::{Adapter, SqlValue};
//!
//! let mut adapter = Adapter::postgres();
//! adapter.connect("localhost", "app", "secret");
//! adapter.select_database("inventory").await?;
//!
//! // The physical connection is opened here, on first use.
//! let rows = adapter.select("SELECT id, name FROM parts").await?;
//! let count = adapter.select_cell("SELECT COUNT(*) FROM parts").await?;
//!
//! // Values are encoded before being spliced into SQL text.
//! let literal = adapter.quote(&SqlValue::from("O'Brien"));
//! assert_eq!(literal, "'O\\'Brien'");
//! ```

pub mod drivers;
pub mod error;
pub mod quoting;
pub mod traits;
pub mod types;

mod adapter;

// Re-export main types for convenient access
pub use adapter::Adapter;
pub use error::{OrmLinkError, Result};
pub use traits::DatabaseDriver;
pub use types::{Row, RowSet, SqlValue};
