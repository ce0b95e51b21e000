//! AdminLayer - Main Axum integration layer
//!
//! This module provides the main entry point for integrating axum-mysql-admin
//! into an Axum application.

use crate::api::create_api_router;
use crate::config::AdminConfig;
use crate::database::traits::DatabaseProvider;
use crate::service::AdminService;
use axum::Router;
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;

#[cfg(feature = "mysql")]
use crate::database::mysql::MySqlProvider;

#[cfg(feature = "sqlite")]
use crate::database::sqlite::SqliteProvider;

/// Main layer for integrating the admin backend into an Axum application
///
/// # Example
///
/// ```rust,no_run
/// use axum::Router;
/// use axum_mysql_admin::{AdminConfig, AdminLayer};
///
/// let admin = AdminLayer::mysql("/admin", AdminConfig::default());
/// let app: Router = Router::new().merge(admin.into_router());
/// ```
pub struct AdminLayer<DB: DatabaseProvider> {
    base_path: String,
    service: Arc<AdminService<DB>>,
    static_dir: Option<PathBuf>,
}

impl<DB: DatabaseProvider> AdminLayer<DB> {
    /// Create a new admin backend at the given base path
    ///
    /// # Arguments
    ///
    /// * `base_path` - The URL path where the backend will be mounted (e.g., "/admin", or "" for the root)
    /// * `config` - Page size limits
    pub fn new(base_path: impl Into<String>, config: AdminConfig) -> Self {
        Self {
            base_path: base_path.into().trim_end_matches('/').to_string(),
            service: Arc::new(AdminService::new(config)),
            static_dir: None,
        }
    }

    /// Serve files from `directory` for every path the API does not handle
    pub fn with_static_dir(mut self, directory: impl Into<PathBuf>) -> Self {
        self.static_dir = Some(directory.into());
        self
    }

    /// Shared service, e.g. for closing the session on shutdown
    pub fn service(&self) -> Arc<AdminService<DB>> {
        self.service.clone()
    }

    /// Convert into an Axum Router that can be merged
    ///
    /// The returned router includes:
    /// - API endpoints at `{base_path}/api/*`
    /// - Static files from the configured directory as fallback
    /// - Permissive CORS middleware
    pub fn into_router(self) -> Router {
        let api_router = create_api_router(self.service);

        let mut router = Router::new().nest(&format!("{}/api", self.base_path), api_router);

        if let Some(directory) = self.static_dir {
            let files = ServeDir::new(directory);
            router = if self.base_path.is_empty() {
                router.fallback_service(files)
            } else {
                router.nest_service(&self.base_path, files)
            };
        }

        router.layer(CorsLayer::permissive())
    }
}

#[cfg(feature = "mysql")]
impl AdminLayer<MySqlProvider> {
    /// Create a new admin backend for MySQL
    ///
    /// # Arguments
    ///
    /// * `base_path` - The URL path where the backend will be mounted
    /// * `config` - Page size limits
    pub fn mysql(base_path: impl Into<String>, config: AdminConfig) -> Self {
        Self::new(base_path, config)
    }
}

#[cfg(feature = "sqlite")]
impl AdminLayer<SqliteProvider> {
    /// Create a new admin backend for SQLite database files
    ///
    /// # Arguments
    ///
    /// * `base_path` - The URL path where the backend will be mounted
    /// * `config` - Page size limits
    pub fn sqlite(base_path: impl Into<String>, config: AdminConfig) -> Self {
        Self::new(base_path, config)
    }
}
