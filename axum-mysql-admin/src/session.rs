//! Connection session management
//!
//! The backend holds at most one live connection. [`SessionManager`] owns it
//! behind an async mutex: every operation goes through
//! [`SessionManager::require_session`] and keeps the lock for its whole
//! duration, so statements on the single wire connection never interleave.
//! A reconnect waits for in-flight operations, which finish against the old
//! connection.

use crate::database::traits::DatabaseProvider;
use crate::Error;
use serde::{Deserialize, Serialize};
use std::fmt;
use tokio::sync::{MappedMutexGuard, Mutex, MutexGuard};
use tracing::{info, warn};

/// Host used when the connect request leaves it empty
pub const DEFAULT_HOST: &str = "localhost";

/// Credentials and target of a connect request
#[derive(Clone, Default, Deserialize)]
pub struct ConnectParams {
    #[serde(default)]
    pub host: String,

    /// Backend default when absent
    #[serde(default)]
    pub port: Option<u16>,

    #[serde(default)]
    pub user: String,

    #[serde(default)]
    pub password: String,

    #[serde(default)]
    pub database: String,
}

impl ConnectParams {
    pub fn host_or_default(&self) -> &str {
        match self.host.trim() {
            "" => DEFAULT_HOST,
            host => host,
        }
    }

    /// Identity recorded for a session opened with these parameters
    pub fn identity(&self) -> SessionIdentity {
        SessionIdentity {
            host: self.host_or_default().to_string(),
            user: self.user.clone(),
            database: self.database.clone(),
        }
    }
}

impl fmt::Debug for ConnectParams {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("ConnectParams")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .field("database", &self.database)
            .finish()
    }
}

/// Who and where the current session is connected
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionIdentity {
    pub host: String,
    pub user: String,
    pub database: String,
}

/// The live connection together with the identity it was opened with
pub struct Session<DB: DatabaseProvider> {
    pub identity: SessionIdentity,
    pub connection: DB,
}

/// Owner of the single session
pub struct SessionManager<DB: DatabaseProvider> {
    current: Mutex<Option<Session<DB>>>,
}

impl<DB: DatabaseProvider> SessionManager<DB> {
    pub fn new() -> Self {
        Self {
            current: Mutex::new(None),
        }
    }

    /// Replace the current session with a new connection
    ///
    /// The previous connection is closed first; a failed close is logged and
    /// does not prevent the new attempt. If the new connection cannot be
    /// opened, no session remains.
    pub async fn connect(&self, params: &ConnectParams) -> Result<SessionIdentity, Error> {
        let mut current = self.current.lock().await;

        if let Some(previous) = current.take() {
            Self::release(previous).await;
        }

        let connection = DB::connect(params).await.map_err(|error| {
            warn!(
                host = %params.host_or_default(),
                user = %params.user,
                database = %params.database,
                %error,
                "Connection attempt failed"
            );
            Error::Connection(error.to_string())
        })?;

        let identity = params.identity();
        info!(
            host = %identity.host,
            user = %identity.user,
            database = %identity.database,
            "Session established"
        );

        *current = Some(Session {
            identity: identity.clone(),
            connection,
        });

        Ok(identity)
    }

    /// Exclusive access to the live session
    ///
    /// Fails with [`Error::NoActiveSession`] before the first successful connect.
    pub async fn require_session(&self) -> Result<MappedMutexGuard<'_, Session<DB>>, Error> {
        let current = self.current.lock().await;
        MutexGuard::try_map(current, |slot| slot.as_mut()).map_err(|_| Error::NoActiveSession)
    }

    /// Identity of the live session, if any
    pub async fn identity(&self) -> Option<SessionIdentity> {
        self.current
            .lock()
            .await
            .as_ref()
            .map(|session| session.identity.clone())
    }

    /// Close the live connection, if any
    pub async fn shutdown(&self) {
        let previous = self.current.lock().await.take();
        if let Some(previous) = previous {
            Self::release(previous).await;
        }
    }

    async fn release(session: Session<DB>) {
        let Session {
            identity,
            connection,
        } = session;

        match connection.close().await {
            Ok(()) => info!(
                host = %identity.host,
                database = %identity.database,
                "Previous session closed"
            ),
            Err(error) => warn!(
                host = %identity.host,
                database = %identity.database,
                %error,
                "Failed to close previous connection, continuing"
            ),
        }
    }
}

impl<DB: DatabaseProvider> Default for SessionManager<DB> {
    fn default() -> Self {
        Self::new()
    }
}
