//! Database provider trait
//!
//! This trait defines the interface that every backend must provide. A
//! provider owns exactly one live connection; the session manager owns the
//! provider.

use crate::pagination::OrderBy;
use crate::schema::{StatementOutcome, StorageFigures, TableSchema};
use crate::session::ConnectParams;
use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

/// Database provider trait for schema discovery and data access
///
/// Table and column names handed to a provider have already passed
/// [`crate::identifier::validate`] with [`DatabaseProvider::IDENTIFIER_QUOTE`]
/// and [`DatabaseProvider::MAX_IDENTIFIER_LENGTH`].
#[async_trait]
pub trait DatabaseProvider: Send + Sized + 'static {
    /// Character used to quote identifiers in SQL text
    const IDENTIFIER_QUOTE: char;

    /// Longest table or column name the backend accepts
    const MAX_IDENTIFIER_LENGTH: usize;

    /// Open a single connection with the given credentials
    async fn connect(params: &ConnectParams) -> Result<Self, DatabaseError>;

    /// Close the connection gracefully
    async fn close(self) -> Result<(), DatabaseError>;

    /// List table names of the current database
    async fn list_tables(&mut self) -> Result<Vec<String>, DatabaseError>;

    /// Read storage, index and key figures for `database`
    async fn storage_figures(&mut self, database: &str) -> Result<StorageFigures, DatabaseError>;

    /// Get column and index metadata for a table
    async fn describe_table(&mut self, table: &str) -> Result<TableSchema, DatabaseError>;

    /// Fetch one window of rows as JSON objects
    ///
    /// # Arguments
    ///
    /// * `table` - Name of the table
    /// * `order` - Optional sort column and direction
    /// * `limit` - Maximum number of rows
    /// * `offset` - Rows to skip
    async fn fetch_page(
        &mut self,
        table: &str,
        order: Option<&OrderBy>,
        limit: u64,
        offset: u64,
    ) -> Result<Vec<Value>, DatabaseError>;

    /// Total row count for a table, ignoring pagination
    async fn count_rows(&mut self, table: &str) -> Result<u64, DatabaseError>;

    /// Run a caller-supplied statement verbatim
    ///
    /// # Security Warning
    ///
    /// This allows executing any SQL statement including INSERT, UPDATE, DELETE and DDL.
    async fn execute_statement(&mut self, sql: &str) -> Result<StatementOutcome, DatabaseError>;

    /// Column names a statement would return, without running it
    async fn result_columns(&mut self, sql: &str) -> Result<Vec<String>, DatabaseError>;
}

/// Database error type
#[derive(Debug, Error)]
pub enum DatabaseError {
    /// Error reported by the driver, message kept verbatim
    #[error("{0}")]
    Driver(String),

    /// A value could not be converted to JSON
    #[error("Failed to decode column '{column}': {message}")]
    Decode { column: String, message: String },
}

impl From<sqlx::Error> for DatabaseError {
    fn from(error: sqlx::Error) -> Self {
        DatabaseError::Driver(error.to_string())
    }
}
