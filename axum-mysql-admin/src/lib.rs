//! # axum-mysql-admin
//!
//! A single-session database administration backend, easily integrable as an Axum router.
//!
//! ## Features
//!
//! - One live database connection per process, replaced on reconnect
//! - Storage statistics computed from the metadata catalog
//! - Schema inspection (columns and indexes) for any table
//! - Paginated, sortable table browsing
//! - Raw SQL console with row-set / mutation result shaping
//! - MySQL backend, plus SQLite for local files
//!
//! ## Security Warning
//!
//! **This is an administration tool!**
//!
//! - No authentication/authorization built-in beyond the database credentials
//! - Exposes full database schema and data
//! - Raw query execution allows full database access (INSERT/UPDATE/DELETE/DDL)
//! - Should never be exposed on public networks
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use axum::{Router, routing::get};
//! use axum_mysql_admin::{AdminConfig, AdminLayer};
//!
//! #[tokio::main]
//! async fn main() {
//!     let app = Router::new()
//!         .route("/health", get(|| async { "ok" }))
//!         .merge(AdminLayer::mysql("", AdminConfig::default()).into_router());
//!
//!     // Serve the application...
//! }
//! ```

// Public modules
pub mod api;
pub mod config;
pub mod database;
pub mod identifier;
pub mod layer;
pub mod pagination;
pub mod schema;
pub mod service;
pub mod session;

// Public exports
pub use config::AdminConfig;
pub use layer::AdminLayer;
pub use schema::{
    ColumnInfo, ContentPage, IndexInfo, QueryResult, StatsSummary, TableSchema, TableSize,
};
pub use service::AdminService;
pub use session::{ConnectParams, Session, SessionIdentity, SessionManager};

// Re-export database providers
pub use database::traits::DatabaseProvider;

#[cfg(feature = "mysql")]
pub use database::mysql::MySqlProvider;

#[cfg(feature = "sqlite")]
pub use database::sqlite::SqliteProvider;

// Error type
use thiserror::Error;

/// Message returned whenever an operation runs before `connect`.
pub const NOT_CONNECTED_MESSAGE: &str = "Not connected to database. Please login.";

#[derive(Debug, Error)]
pub enum Error {
    /// No session has been established yet
    #[error("{}", NOT_CONNECTED_MESSAGE)]
    NoActiveSession,

    /// Connecting failed: credentials rejected, host unreachable or database missing
    #[error("{0}")]
    Connection(String),

    /// An introspection or browsing query failed
    #[error("{0}")]
    Catalog(String),

    /// A caller-supplied statement failed
    #[error("{0}")]
    Execution(String),

    /// Identifier rejected before reaching SQL text
    #[error("Invalid identifier: {0}")]
    InvalidIdentifier(String),

    /// Sort column not present in the table
    #[error("Invalid column: {0}")]
    InvalidColumn(String),

    /// Table not present in the current database
    #[error("Table not found: {0}")]
    TableNotFound(String),
}

impl Error {
    pub(crate) fn catalog(error: database::DatabaseError) -> Self {
        Error::Catalog(error.to_string())
    }

    pub(crate) fn execution(error: database::DatabaseError) -> Self {
        Error::Execution(error.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
