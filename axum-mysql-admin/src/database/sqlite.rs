//! SQLite database provider implementation
//!
//! Serves local database files with the same contract as the MySQL provider.
//! `host` and `user` are recorded in the session identity but not used; the
//! `database` field is the file path, or `:memory:` for a private in-memory
//! database.

use crate::database::traits::{DatabaseError, DatabaseProvider};
use crate::database::{blob_preview, leading_keyword};
use crate::identifier::quote;
use crate::pagination::OrderBy;
use crate::schema::{
    ColumnInfo, IndexInfo, StatementOutcome, StorageFigures, TableSchema, LARGEST_TABLES_LIMIT,
};
use crate::session::ConnectParams;
use async_trait::async_trait;
use futures_util::TryStreamExt;
use serde_json::Value;
use sqlx::sqlite::{SqliteColumn, SqliteConnectOptions, SqliteConnection, SqliteRow};
use sqlx::{
    Column, ConnectOptions, Connection, Either, Executor, Row, Statement, TypeInfo, ValueRef,
};
use std::collections::HashMap;
use std::str::FromStr;

/// Filter shared by every catalog query: user tables only
const USER_TABLES: &str = "m.type = 'table' AND m.name NOT LIKE 'sqlite_%'";

/// SQLite database provider owning one connection
pub struct SqliteProvider {
    connection: SqliteConnection,
}

impl SqliteProvider {
    /// Wrap an already established connection
    pub fn new(connection: SqliteConnection) -> Self {
        Self { connection }
    }

    fn quote_identifier(identifier: &str) -> String {
        quote(identifier, <Self as DatabaseProvider>::IDENTIFIER_QUOTE)
    }

    /// In-memory for an empty name or `:memory:`; otherwise an existing file
    fn connect_options(params: &ConnectParams) -> Result<SqliteConnectOptions, DatabaseError> {
        let database = params.database.trim();
        if database.is_empty() || database == ":memory:" {
            return Ok(SqliteConnectOptions::from_str("sqlite::memory:")?);
        }

        Ok(SqliteConnectOptions::new()
            .filename(database)
            .create_if_missing(false)
            .foreign_keys(true))
    }

    /// Convert a SQLite row to a JSON object
    fn row_to_json(row: &SqliteRow) -> Result<Value, DatabaseError> {
        let mut map = serde_json::Map::new();

        for column in row.columns() {
            let value = Self::extract_column_value(row, column)?;
            map.insert(column.name().to_string(), value);
        }

        Ok(Value::Object(map))
    }

    /// Extract a column value from a SQLite row and convert to JSON
    fn extract_column_value(
        row: &SqliteRow,
        column: &SqliteColumn,
    ) -> Result<Value, DatabaseError> {
        let index = column.ordinal();

        let raw = row.try_get_raw(index).map_err(|error| DatabaseError::Decode {
            column: column.name().to_string(),
            message: error.to_string(),
        })?;
        if raw.is_null() {
            return Ok(Value::Null);
        }

        let declared_type = column.type_info().name();
        if matches!(declared_type, "BOOLEAN" | "BOOL") {
            if let Ok(value) = row.try_get::<bool, _>(index) {
                return Ok(Value::Bool(value));
            }
        }

        // Columns are not strictly typed, so dispatch on the stored value's storage class
        let storage_class = raw.type_info().name().to_string();
        match storage_class.as_str() {
            "INTEGER" => {
                if let Ok(value) = row.try_get_unchecked::<i64, _>(index) {
                    return Ok(Value::Number(value.into()));
                }
            }
            "REAL" => {
                if let Ok(value) = row.try_get_unchecked::<f64, _>(index) {
                    if let Some(number) = serde_json::Number::from_f64(value) {
                        return Ok(Value::Number(number));
                    }
                }
            }
            "BLOB" => {
                if let Ok(value) = row.try_get_unchecked::<Vec<u8>, _>(index) {
                    return Ok(Value::String(blob_preview(&value)));
                }
            }
            _ => {
                if let Ok(value) = row.try_get_unchecked::<String, _>(index) {
                    return Ok(Value::String(value));
                }
            }
        }

        // Fallback: text first, since numeric decoding silently coerces text to 0
        if let Ok(value) = row.try_get_unchecked::<String, _>(index) {
            return Ok(Value::String(value));
        }
        if let Ok(value) = row.try_get_unchecked::<Vec<u8>, _>(index) {
            return Ok(Value::String(blob_preview(&value)));
        }

        Ok(Value::Null)
    }

    /// Build an ORDER BY clause from an already validated sort request
    fn build_order_clause(order: Option<&OrderBy>) -> String {
        match order {
            Some(order) => format!(
                " ORDER BY {} {}",
                Self::quote_identifier(&order.column),
                order.direction.as_sql()
            ),
            None => String::new(),
        }
    }

    async fn count(&mut self, query: &str) -> Result<u64, DatabaseError> {
        let count: i64 = sqlx::query_scalar(query)
            .fetch_one(&mut self.connection)
            .await?;
        Ok(count.max(0) as u64)
    }

    /// Per-table page usage from the `dbstat` virtual table
    ///
    /// Builds without `SQLITE_ENABLE_DBSTAT_VTAB` report every table as empty.
    async fn table_sizes(&mut self) -> Result<Vec<(String, u64)>, DatabaseError> {
        let tables = self.list_tables().await?;
        let sizes_query = "SELECT m.tbl_name AS name, SUM(d.pgsize) AS size_bytes \
             FROM sqlite_master AS m JOIN dbstat AS d ON d.name = m.name \
             WHERE m.tbl_name NOT LIKE 'sqlite_%' AND m.type IN ('table', 'index') \
             GROUP BY m.tbl_name";

        let measured: HashMap<String, u64> = match sqlx::query_as::<_, (String, i64)>(sizes_query)
            .fetch_all(&mut self.connection)
            .await
        {
            Ok(rows) => rows
                .into_iter()
                .map(|(name, bytes)| (name, bytes.max(0) as u64))
                .collect(),
            Err(error) => {
                tracing::debug!(%error, "dbstat unavailable, reporting zero table sizes");
                HashMap::new()
            }
        };

        Ok(tables
            .into_iter()
            .map(|name| {
                let bytes = measured.get(&name).copied().unwrap_or(0);
                (name, bytes)
            })
            .collect())
    }
}

#[async_trait]
impl DatabaseProvider for SqliteProvider {
    const IDENTIFIER_QUOTE: char = '"';
    // No limit on name length
    const MAX_IDENTIFIER_LENGTH: usize = usize::MAX;

    async fn connect(params: &ConnectParams) -> Result<Self, DatabaseError> {
        let connection = Self::connect_options(params)?.connect().await?;
        Ok(Self::new(connection))
    }

    async fn close(self) -> Result<(), DatabaseError> {
        self.connection.close().await?;
        Ok(())
    }

    async fn list_tables(&mut self) -> Result<Vec<String>, DatabaseError> {
        let query = format!(
            "SELECT m.name FROM sqlite_master AS m WHERE {} ORDER BY m.name",
            USER_TABLES
        );
        let rows = sqlx::query(&query).fetch_all(&mut self.connection).await?;

        let mut tables = Vec::with_capacity(rows.len());
        for row in rows {
            tables.push(row.try_get::<String, _>(0)?);
        }

        Ok(tables)
    }

    async fn storage_figures(&mut self, _database: &str) -> Result<StorageFigures, DatabaseError> {
        let mut sizes = self.table_sizes().await?;
        let total_bytes = sizes.iter().map(|(_, bytes)| bytes).sum();
        let sized_tables = sizes.len() as u64;

        sizes.sort_by(|left, right| right.1.cmp(&left.1).then_with(|| left.0.cmp(&right.0)));
        sizes.truncate(LARGEST_TABLES_LIMIT);

        // One row per indexed column, matching information_schema.STATISTICS
        let index_count = self
            .count(&format!(
                "SELECT COUNT(*) FROM sqlite_master AS m, pragma_index_list(m.name) AS il, \
                 pragma_index_info(il.name) AS ii WHERE {}",
                USER_TABLES
            ))
            .await?;

        let primary_key_count = self
            .count(&format!(
                "SELECT COUNT(*) FROM sqlite_master AS m, pragma_table_info(m.name) AS ti \
                 WHERE {} AND ti.pk > 0",
                USER_TABLES
            ))
            .await?;

        let foreign_key_count = self
            .count(&format!(
                "SELECT COUNT(*) FROM sqlite_master AS m, pragma_foreign_key_list(m.name) AS fk \
                 WHERE {}",
                USER_TABLES
            ))
            .await?;

        Ok(StorageFigures {
            total_bytes,
            sized_tables,
            largest_tables: sizes,
            index_count,
            primary_key_count,
            foreign_key_count,
        })
    }

    async fn describe_table(&mut self, table: &str) -> Result<TableSchema, DatabaseError> {
        let quoted_table = Self::quote_identifier(table);

        // PRAGMA index_list returns: seq, name, unique, origin, partial
        let index_list_query = format!("PRAGMA index_list({})", quoted_table);
        let index_rows = sqlx::query(&index_list_query)
            .fetch_all(&mut self.connection)
            .await?;

        let mut indexes = Vec::new();
        for row in index_rows {
            let index_name: String = row.try_get("name")?;
            let unique: i64 = row.try_get("unique")?;

            // PRAGMA index_info returns: seqno, cid, name
            let index_info_query = format!("PRAGMA index_info({})", Self::quote_identifier(&index_name));
            let column_rows = sqlx::query(&index_info_query)
                .fetch_all(&mut self.connection)
                .await?;

            for column_row in column_rows {
                let sequence: i64 = column_row.try_get("seqno")?;
                let column: Option<String> = column_row.try_get("name")?;
                indexes.push(IndexInfo {
                    name: index_name.clone(),
                    column: column.unwrap_or_default(),
                    sequence: sequence.max(0) as u64 + 1,
                    unique: unique != 0,
                    cardinality: None,
                });
            }
        }

        // PRAGMA table_info returns: cid, name, type, notnull, dflt_value, pk
        let table_info_query = format!("PRAGMA table_info({})", quoted_table);
        let column_rows = sqlx::query(&table_info_query)
            .fetch_all(&mut self.connection)
            .await?;

        let mut columns = Vec::with_capacity(column_rows.len());
        for row in column_rows {
            let name: String = row.try_get("name")?;
            let data_type: String = row.try_get("type")?;
            let not_null: i64 = row.try_get("notnull")?;
            let default_value: Option<String> = row.try_get("dflt_value")?;
            let primary_key: i64 = row.try_get("pk")?;

            let key = if primary_key > 0 {
                "PRI"
            } else if indexes
                .iter()
                .any(|index| index.unique && index.sequence == 1 && index.column == name)
            {
                "UNI"
            } else if indexes
                .iter()
                .any(|index| index.sequence == 1 && index.column == name)
            {
                "MUL"
            } else {
                ""
            };

            columns.push(ColumnInfo {
                name,
                data_type,
                collation: None,
                nullable: not_null == 0,
                key: key.to_string(),
                default_value,
                extra: String::new(),
                privileges: String::new(),
                comment: String::new(),
            });
        }

        Ok(TableSchema { columns, indexes })
    }

    async fn fetch_page(
        &mut self,
        table: &str,
        order: Option<&OrderBy>,
        limit: u64,
        offset: u64,
    ) -> Result<Vec<Value>, DatabaseError> {
        let select_query = format!(
            "SELECT * FROM {}{} LIMIT ? OFFSET ?",
            Self::quote_identifier(table),
            Self::build_order_clause(order)
        );

        let rows = sqlx::query(&select_query)
            .bind(i64::try_from(limit).unwrap_or(i64::MAX))
            .bind(i64::try_from(offset).unwrap_or(i64::MAX))
            .fetch_all(&mut self.connection)
            .await?;

        rows.iter().map(Self::row_to_json).collect()
    }

    async fn count_rows(&mut self, table: &str) -> Result<u64, DatabaseError> {
        self.count(&format!("SELECT COUNT(*) FROM {}", Self::quote_identifier(table)))
            .await
    }

    async fn execute_statement(&mut self, sql: &str) -> Result<StatementOutcome, DatabaseError> {
        let mut outcome = StatementOutcome::default();

        // last_insert_rowid() is per connection and survives non-inserting statements
        let previous_rowid: i64 = sqlx::query_scalar("SELECT last_insert_rowid()")
            .fetch_one(&mut self.connection)
            .await?;
        let inserting = matches!(leading_keyword(sql).as_str(), "INSERT" | "REPLACE");

        let mut results = (&mut self.connection).fetch_many(sql);
        while let Some(step) = results.try_next().await? {
            match step {
                Either::Left(done) => {
                    outcome.rows_affected += done.rows_affected();
                    let rowid = done.last_insert_rowid();
                    if rowid > 0
                        && done.rows_affected() > 0
                        && (inserting || rowid != previous_rowid)
                    {
                        outcome.last_insert_id = Some(rowid as u64);
                    }
                }
                Either::Right(row) => {
                    if outcome.columns.is_empty() {
                        outcome.columns = row
                            .columns()
                            .iter()
                            .map(|column| column.name().to_string())
                            .collect();
                    }
                    outcome.rows.push(Self::row_to_json(&row)?);
                }
            }
        }

        Ok(outcome)
    }

    async fn result_columns(&mut self, sql: &str) -> Result<Vec<String>, DatabaseError> {
        let statement = (&mut self.connection).prepare(sql).await?;
        Ok(statement
            .columns()
            .iter()
            .map(|column| column.name().to_string())
            .collect())
    }
}
