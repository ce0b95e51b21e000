//! Request, result and response types
//!
//! These types describe what the admin backend discovers at runtime and the
//! JSON contract it serves.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Bytes per megabyte used for every size reported in statistics
const BYTES_PER_MEGABYTE: f64 = 1024.0 * 1024.0;

/// Number of tables listed in [`StatsSummary::element_sizes`]
pub const LARGEST_TABLES_LIMIT: usize = 10;

/// Raw storage numbers read from the metadata catalog
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StorageFigures {
    /// Sum of data and index bytes over all tables
    pub total_bytes: u64,

    /// Number of tables that reported a size (the divisor of the average)
    pub sized_tables: u64,

    /// Largest tables first, at most [`LARGEST_TABLES_LIMIT`] entries
    pub largest_tables: Vec<(String, u64)>,

    /// Index-statistics rows, one per indexed column
    pub index_count: u64,

    /// Key-usage rows belonging to primary keys
    pub primary_key_count: u64,

    /// Key-usage rows that reference another table
    pub foreign_key_count: u64,
}

/// Aggregate storage statistics for the current database
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StatsSummary {
    pub table_count: u64,

    /// Megabytes with two decimals, e.g. `"12.50"`
    #[serde(rename = "totalSizeMB")]
    pub total_size_mb: String,

    /// Megabytes with two decimals
    #[serde(rename = "avgTableSizeMB")]
    pub avg_table_size_mb: String,

    pub index_count: u64,
    pub pk_count: u64,
    pub fk_count: u64,
    pub db_name: String,
    pub user: String,

    /// Largest tables, descending by size
    pub element_sizes: Vec<TableSize>,
}

impl StatsSummary {
    /// Turn catalog figures into the reported summary
    pub fn from_figures(
        table_count: usize,
        figures: StorageFigures,
        database: &str,
        user: &str,
    ) -> Self {
        let total_megabytes = figures.total_bytes as f64 / BYTES_PER_MEGABYTE;
        let average_megabytes = if figures.sized_tables == 0 {
            0.0
        } else {
            total_megabytes / figures.sized_tables as f64
        };

        let element_sizes = figures
            .largest_tables
            .into_iter()
            .take(LARGEST_TABLES_LIMIT)
            .map(|(name, bytes)| TableSize {
                name,
                size: round_to_hundredths(bytes as f64 / BYTES_PER_MEGABYTE),
            })
            .collect();

        Self {
            table_count: table_count as u64,
            total_size_mb: format!("{:.2}", total_megabytes),
            avg_table_size_mb: format!("{:.2}", average_megabytes),
            index_count: figures.index_count,
            pk_count: figures.primary_key_count,
            fk_count: figures.foreign_key_count,
            db_name: database.to_string(),
            user: user.to_string(),
            element_sizes,
        }
    }
}

fn round_to_hundredths(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Size of one table in the stats leaderboard
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TableSize {
    pub name: String,

    /// Megabytes, rounded to two decimals
    pub size: f64,
}

/// Complete schema information for a database table
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TableSchema {
    /// Columns in ordinal order
    pub columns: Vec<ColumnInfo>,

    /// One entry per (index, column) pair, in index order
    pub indexes: Vec<IndexInfo>,
}

/// Information about a single column
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ColumnInfo {
    /// Column name
    pub name: String,

    /// SQL data type as declared (e.g., "int(11)", "varchar(255)")
    pub data_type: String,

    /// Collation for character columns
    pub collation: Option<String>,

    /// Whether the column allows NULL values
    pub nullable: bool,

    /// Key role: "PRI", "UNI", "MUL" or empty
    pub key: String,

    /// Default value expression (if any)
    pub default_value: Option<String>,

    /// Extra attributes such as "auto_increment"
    pub extra: String,

    /// Privileges the current user holds on the column
    pub privileges: String,

    pub comment: String,
}

/// One column of one index
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct IndexInfo {
    /// Index name ("PRIMARY" for the primary key on MySQL)
    pub name: String,

    /// Indexed column name
    pub column: String,

    /// 1-based position of the column inside the index
    pub sequence: u64,

    /// Whether the index enforces uniqueness
    pub unique: bool,

    /// Estimated distinct values, when the database tracks it
    pub cardinality: Option<u64>,
}

/// Query parameters for browsing table content
///
/// Values stay raw strings so that garbage input falls back to defaults
/// instead of rejecting the request.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ContentQuery {
    pub page: Option<String>,
    pub limit: Option<String>,

    /// Column name to sort by
    pub sort: Option<String>,

    /// "desc" for descending, anything else ascending
    pub dir: Option<String>,
}

/// One page of table rows
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ContentPage {
    /// Row objects keyed by column name
    pub data: Vec<Value>,

    /// Row count of the whole table
    pub total: u64,

    /// 1-based page number
    pub page: u64,

    pub total_pages: u64,
}

/// Request to execute a raw SQL statement
#[derive(Debug, Clone, Default, Deserialize)]
pub struct QueryRequest {
    #[serde(default)]
    pub query: String,
}

/// What a provider observed while running a raw statement
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StatementOutcome {
    /// Column names of the first returned row
    pub columns: Vec<String>,

    pub rows: Vec<Value>,

    /// Summed over all statement results
    pub rows_affected: u64,

    /// Last generated key, when the driver reports a non-zero one
    pub last_insert_id: Option<u64>,
}

/// Normalized result of an ad-hoc statement
#[derive(Debug, Clone, PartialEq)]
pub enum QueryResult {
    /// The statement produced a result set
    RowSet {
        rows: Vec<Value>,
        columns: Vec<String>,
    },

    /// The statement changed data or schema
    Mutation {
        affected_rows: u64,
        last_insert_id: Option<u64>,
    },
}

impl QueryResult {
    /// Human-readable summary shown in the SQL console
    pub fn message(&self) -> String {
        match self {
            QueryResult::RowSet { rows, .. } => format!("{} rows returned", rows.len()),
            QueryResult::Mutation { affected_rows, .. } => {
                format!("Query OK, {} rows affected.", affected_rows)
            }
        }
    }
}

/// Response envelope: every body carries `success`
#[derive(Debug, Clone, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,

    #[serde(flatten)]
    pub body: T,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(body: T) -> Self {
        Self {
            success: true,
            body,
        }
    }

    pub fn failure(body: T) -> Self {
        Self {
            success: false,
            body,
        }
    }
}

/// Body carrying only a message
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageBody {
    pub message: String,
}

/// Response body for GET /api/stats
#[derive(Debug, Clone, Serialize)]
pub struct StatsBody {
    pub stats: StatsSummary,
}

/// Response body for GET /api/tables
#[derive(Debug, Clone, Serialize)]
pub struct TablesBody {
    pub tables: Vec<String>,
}

/// Column metadata attached to query responses
#[derive(Debug, Clone, Default, Serialize)]
pub struct QueryMeta {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub columns: Option<Vec<String>>,
}

/// Response body for POST /api/query
#[derive(Debug, Clone, Serialize)]
pub struct QueryBody {
    /// Rows for a row-set, or `{affectedRows, insertId}` for a mutation
    pub data: Value,
    pub meta: QueryMeta,
    pub message: String,
}

impl From<QueryResult> for QueryBody {
    fn from(result: QueryResult) -> Self {
        let message = result.message();
        match result {
            QueryResult::RowSet { rows, columns } => QueryBody {
                data: Value::Array(rows),
                meta: QueryMeta {
                    columns: Some(columns),
                },
                message,
            },
            QueryResult::Mutation {
                affected_rows,
                last_insert_id,
            } => QueryBody {
                data: serde_json::json!({
                    "affectedRows": affected_rows,
                    "insertId": last_insert_id.unwrap_or(0),
                }),
                meta: QueryMeta::default(),
                message,
            },
        }
    }
}
