//! Session connect endpoint

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use std::sync::Arc;

use crate::database::traits::DatabaseProvider;
use crate::schema::{ApiResponse, MessageBody};
use crate::service::AdminService;
use crate::session::ConnectParams;

/// Handler for POST /api/connect
///
/// Opens a new connection, closing the current one first.
///
/// Request body:
/// ```json
/// {
///   "host": "localhost",
///   "user": "root",
///   "password": "secret",
///   "database": "shop"
/// }
/// ```
///
/// Failures answer 401 with the driver's message.
pub async fn connect_handler<DB: DatabaseProvider>(
    State(service): State<Arc<AdminService<DB>>>,
    Json(params): Json<ConnectParams>,
) -> Response {
    match service.connect(&params).await {
        Ok(_) => (
            StatusCode::OK,
            Json(ApiResponse::ok(MessageBody {
                message: "Connected successfully".to_string(),
            })),
        )
            .into_response(),
        Err(error) => error.into_response(),
    }
}
