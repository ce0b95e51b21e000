//! Raw SQL query execution endpoint

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use std::sync::Arc;

use crate::database::traits::DatabaseProvider;
use crate::schema::{ApiResponse, QueryBody, QueryRequest};
use crate::service::AdminService;

/// Handler for POST /api/query
///
/// Executes a raw SQL statement and returns the results.
///
/// # Security Warning
///
/// This endpoint allows executing ANY SQL statement including INSERT, UPDATE, DELETE and DDL.
///
/// Request body:
/// ```json
/// {
///   "query": "SELECT * FROM users LIMIT 10"
/// }
/// ```
///
/// Response (row-set):
/// ```json
/// {
///   "success": true,
///   "data": [...],
///   "meta": { "columns": ["id", "name", "email"] },
///   "message": "10 rows returned"
/// }
/// ```
///
/// Response (mutation):
/// ```json
/// {
///   "success": true,
///   "data": { "affectedRows": 5, "insertId": 0 },
///   "meta": {},
///   "message": "Query OK, 5 rows affected."
/// }
/// ```
pub async fn execute_query_handler<DB: DatabaseProvider>(
    State(service): State<Arc<AdminService<DB>>>,
    Json(request): Json<QueryRequest>,
) -> Response {
    match service.execute(&request.query).await {
        Ok(result) => {
            (StatusCode::OK, Json(ApiResponse::ok(QueryBody::from(result)))).into_response()
        }
        Err(error) => {
            tracing::warn!(%error, "Failed to execute query");
            error.into_response()
        }
    }
}
