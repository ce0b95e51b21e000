//! Session-bound admin operations
//!
//! Every operation except [`AdminService::connect`] first passes the session
//! guard and then runs against the one live connection.

use crate::config::AdminConfig;
use crate::database::traits::DatabaseProvider;
use crate::session::{ConnectParams, SessionIdentity, SessionManager};
use crate::Error;

mod catalog;
mod content;
mod query;

/// Catalog reader, content browser and query executor over one session
pub struct AdminService<DB: DatabaseProvider> {
    sessions: SessionManager<DB>,
    config: AdminConfig,
}

impl<DB: DatabaseProvider> AdminService<DB> {
    pub fn new(config: AdminConfig) -> Self {
        Self {
            sessions: SessionManager::new(),
            config,
        }
    }

    pub fn config(&self) -> &AdminConfig {
        &self.config
    }

    pub fn sessions(&self) -> &SessionManager<DB> {
        &self.sessions
    }

    /// Open a new session, replacing the current one
    pub async fn connect(&self, params: &ConnectParams) -> Result<SessionIdentity, Error> {
        self.sessions.connect(params).await
    }

    /// Close the live session; used when the process shuts down
    pub async fn shutdown(&self) {
        self.sessions.shutdown().await
    }
}
