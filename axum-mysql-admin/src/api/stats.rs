//! Dashboard statistics endpoint

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use std::sync::Arc;

use crate::database::traits::DatabaseProvider;
use crate::schema::{ApiResponse, StatsBody};
use crate::service::AdminService;

/// Handler for GET /api/stats
///
/// Returns table count, storage sizes, index and key counts and the ten
/// largest tables of the current database.
pub async fn get_stats_handler<DB: DatabaseProvider>(
    State(service): State<Arc<AdminService<DB>>>,
) -> Response {
    match service.compute_stats().await {
        Ok(stats) => (StatusCode::OK, Json(ApiResponse::ok(StatsBody { stats }))).into_response(),
        Err(error) => {
            tracing::warn!(%error, "Failed to compute stats");
            error.into_response()
        }
    }
}
