//! Table content endpoint with pagination

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use std::sync::Arc;

use crate::database::traits::DatabaseProvider;
use crate::schema::{ApiResponse, ContentQuery};
use crate::service::AdminService;

/// Handler for GET /api/tables/{name}/content
///
/// Query parameters:
/// - page: 1-based page number (default: 1)
/// - limit: rows per page (default: 50, clamped to the configured maximum)
/// - sort: column to sort by (must exist in the table)
/// - dir: "desc" for descending, anything else ascending
///
/// Response:
/// ```json
/// {
///   "success": true,
///   "data": [...],
///   "total": 25,
///   "page": 2,
///   "totalPages": 3
/// }
/// ```
pub async fn get_content_handler<DB: DatabaseProvider>(
    State(service): State<Arc<AdminService<DB>>>,
    Path(table_name): Path<String>,
    Query(query): Query<ContentQuery>,
) -> Response {
    match service.browse(&table_name, &query).await {
        Ok(page) => (StatusCode::OK, Json(ApiResponse::ok(page))).into_response(),
        Err(error) => {
            tracing::warn!(table = %table_name, %error, "Failed to get table content");
            error.into_response()
        }
    }
}
