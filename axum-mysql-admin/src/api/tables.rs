//! Table listing and schema endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use std::sync::Arc;

use crate::database::traits::DatabaseProvider;
use crate::schema::{ApiResponse, TablesBody};
use crate::service::AdminService;

/// Handler for GET /api/tables
///
/// Returns the names of all tables in the current database.
pub async fn list_tables_handler<DB: DatabaseProvider>(
    State(service): State<Arc<AdminService<DB>>>,
) -> Response {
    match service.list_tables().await {
        Ok(tables) => {
            (StatusCode::OK, Json(ApiResponse::ok(TablesBody { tables }))).into_response()
        }
        Err(error) => {
            tracing::warn!(%error, "Failed to list tables");
            error.into_response()
        }
    }
}

/// Handler for GET /api/tables/{name}/schema
///
/// Returns column definitions and index entries for a table.
///
/// # Arguments
///
/// * `service` - Admin service from state
/// * `table_name` - Name of the table to describe
pub async fn get_table_schema_handler<DB: DatabaseProvider>(
    State(service): State<Arc<AdminService<DB>>>,
    Path(table_name): Path<String>,
) -> Response {
    match service.describe_table(&table_name).await {
        Ok(schema) => (StatusCode::OK, Json(ApiResponse::ok(schema))).into_response(),
        Err(error) => {
            tracing::warn!(table = %table_name, %error, "Failed to get table schema");
            error.into_response()
        }
    }
}
