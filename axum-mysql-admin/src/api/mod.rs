//! REST API endpoints
//!
//! This module contains all API endpoint handlers for the admin backend.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use crate::database::traits::DatabaseProvider;
use crate::schema::{ApiResponse, MessageBody};
use crate::service::AdminService;
use crate::Error;

pub mod connect;
pub mod content;
pub mod query;
pub mod stats;
pub mod tables;

// Re-export handlers for convenience
pub use connect::connect_handler;
pub use content::get_content_handler;
pub use query::execute_query_handler;
pub use stats::get_stats_handler;
pub use tables::{get_table_schema_handler, list_tables_handler};

/// Create the API router with all endpoints
///
/// # Arguments
///
/// * `service` - Arc-wrapped admin service shared by all handlers
///
/// # Returns
///
/// An Axum Router configured with all API routes, to be nested under `/api`
pub fn create_api_router<DB: DatabaseProvider>(service: Arc<AdminService<DB>>) -> Router {
    Router::new()
        .route("/connect", post(connect_handler::<DB>))
        .route("/stats", get(get_stats_handler::<DB>))
        .route("/tables", get(list_tables_handler::<DB>))
        .route("/tables/{name}/schema", get(get_table_schema_handler::<DB>))
        .route("/tables/{name}/content", get(get_content_handler::<DB>))
        .route("/query", post(execute_query_handler::<DB>))
        .with_state(service)
}

impl Error {
    /// HTTP status reported for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            Error::NoActiveSession | Error::Connection(_) => StatusCode::UNAUTHORIZED,
            Error::Catalog(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Error::Execution(_) | Error::InvalidIdentifier(_) | Error::InvalidColumn(_) => {
                StatusCode::BAD_REQUEST
            }
            Error::TableNotFound(_) => StatusCode::NOT_FOUND,
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = ApiResponse::failure(MessageBody {
            message: self.to_string(),
        });
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(Error::NoActiveSession.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            Error::Connection("Access denied".into()).status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            Error::Catalog("gone away".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            Error::Execution("syntax error".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            Error::TableNotFound("ghost".into()).status_code(),
            StatusCode::NOT_FOUND
        );
    }

    #[test]
    fn test_driver_message_passes_through() {
        let message = "You have an error in your SQL syntax";
        assert_eq!(Error::Execution(message.into()).to_string(), message);
        assert_eq!(
            Error::NoActiveSession.to_string(),
            crate::NOT_CONNECTED_MESSAGE
        );
    }
}
