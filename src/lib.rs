#![deny(missing_docs)]
#![deny(warnings)]

//! # DynamoDB Tables
//!
//! A high-level table and row interface for Amazon DynamoDB, built for
//! short-lived serverless functions.
//!
//! ## Overview
//!
//! This library normalizes three recurring patterns so handlers don't
//! hand-write query and update expressions:
//! - Looking up rows by the primary key or a secondary index, with the
//!   index-versus-key decision made transparently per call
//! - Writing and merging whole rows with clear, local failure modes
//! - Applying numeric deltas server-side, so concurrent increments and
//!   decrements of the same field never lose updates
//!
//! Rows are dynamic attribute bags ([`Row`]); every lookup returns an ordered
//! [`QueryResult`], even when at most one row can match.
//!
//! ## Quick Example
//!
//! ```no_run
//! use dynamodb_tables::{Database, LookupArgs, Row};
//! use serde_json::json;
//!
//! # async fn example() -> Result<(), dynamodb_tables::Error> {
//! let database = Database::from_env().await;
//! let users = database.table("users").await?;
//!
//! let row: Row = serde_json::from_value(json!({
//!     "user-id": "u1",
//!     "region": "Somerset",
//!     "login-count": 0,
//! })).expect("row literal");
//! users.write(row).await?;
//!
//! // Point lookup on the primary key.
//! let result = users.get("user-id", "u1", LookupArgs::default()).await?;
//! assert!(result.is_unique());
//!
//! // Indexed lookup; queries the secondary index named after the column.
//! let somerset = users.get("region", "Somerset", LookupArgs::default()).await?;
//! println!("{} users in Somerset", somerset.len());
//!
//! // Atomic counter update, safe under concurrent invocations.
//! users.increment("user-id", "u1", "login-count", 1).await?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Modules
//!
//! - [`mod@database`] - Client bootstrap, table factories, named registry
//! - [`mod@table`] - Lookups, writes, updates, atomic deltas, scans
//! - [`mod@key_value`] - The two-column key-value specialization
//! - [`mod@result`] - The ordered query-result view and its local
//!   filtering, shaping, and join helpers ([`mod@filter`])
//! - [`mod@row`] / [`mod@lookup`] / [`mod@error`] - Rows, lookup resolution,
//!   and the error taxonomy

mod expression;

/// Database factory and named key-value registry.
pub mod database;

/// Error taxonomy for table and row operations.
pub mod error;

/// Client-side predicates over already-fetched rows.
pub mod filter;

/// Two-column key-value table specialization.
pub mod key_value;

/// Primary-key versus secondary-index lookup resolution.
pub mod lookup;

/// Ordered, read-only view over rows returned by one lookup.
pub mod result;

/// Dynamic row representation and attribute conversion.
pub mod row;

/// Table operations: lookups, writes, updates, atomic deltas, scans.
pub mod table;

pub use database::{Database, GLOBALS_ALIAS, NamedTable};
pub use error::{Error, Result};
pub use filter::{Filter, Predicate};
pub use key_value::{KeyValueArgs, KeyValueTable};
pub use lookup::Lookup;
pub use result::QueryResult;
pub use row::Row;
pub use table::{Delta, LookupArgs, ScanArgs, Table};
