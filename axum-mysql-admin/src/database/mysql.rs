//! MySQL database provider implementation

use crate::database::traits::{DatabaseError, DatabaseProvider};
use crate::database::blob_preview;
use crate::identifier::quote;
use crate::pagination::OrderBy;
use crate::schema::{
    ColumnInfo, IndexInfo, StatementOutcome, StorageFigures, TableSchema, LARGEST_TABLES_LIMIT,
};
use crate::session::ConnectParams;
use async_trait::async_trait;
use futures_util::TryStreamExt;
use serde_json::Value;
use sqlx::mysql::{MySqlColumn, MySqlConnectOptions, MySqlConnection, MySqlRow};
use sqlx::types::chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use sqlx::{
    Column, ConnectOptions, Connection, Either, Executor, Row, Statement, TypeInfo, ValueRef,
};

/// Port used when the connect request names none
pub const DEFAULT_PORT: u16 = 3306;

/// MySQL database provider owning one connection
pub struct MySqlProvider {
    connection: MySqlConnection,
}

impl MySqlProvider {
    /// Wrap an already established connection
    pub fn new(connection: MySqlConnection) -> Self {
        Self { connection }
    }

    fn quote_identifier(identifier: &str) -> String {
        quote(identifier, <Self as DatabaseProvider>::IDENTIFIER_QUOTE)
    }

    fn connect_options(params: &ConnectParams) -> MySqlConnectOptions {
        let mut options = MySqlConnectOptions::new()
            .host(params.host_or_default())
            .port(params.port.unwrap_or(DEFAULT_PORT))
            .username(&params.user);

        if !params.password.is_empty() {
            options = options.password(&params.password);
        }
        if !params.database.is_empty() {
            options = options.database(&params.database);
        }

        options
    }

    /// Convert a MySQL row to a JSON object keyed by column name
    fn row_to_json(row: &MySqlRow) -> Result<Value, DatabaseError> {
        let mut map = serde_json::Map::new();

        for column in row.columns() {
            let value = Self::extract_column_value(row, column)?;
            map.insert(column.name().to_string(), value);
        }

        Ok(Value::Object(map))
    }

    /// Extract a column value and convert to JSON
    ///
    /// Works for both the binary protocol (prepared statements) and the text
    /// protocol used for raw statements.
    fn extract_column_value(row: &MySqlRow, column: &MySqlColumn) -> Result<Value, DatabaseError> {
        let index = column.ordinal();

        let raw = row.try_get_raw(index).map_err(|error| DatabaseError::Decode {
            column: column.name().to_string(),
            message: error.to_string(),
        })?;
        if raw.is_null() {
            return Ok(Value::Null);
        }

        let type_name = column.type_info().name();
        match type_name {
            "BOOLEAN" => {
                if let Ok(value) = row.try_get::<bool, _>(index) {
                    return Ok(Value::Bool(value));
                }
            }
            "TINYINT" | "SMALLINT" | "MEDIUMINT" | "INT" | "BIGINT" | "YEAR" => {
                if let Ok(value) = row.try_get::<i64, _>(index) {
                    return Ok(Value::Number(value.into()));
                }
            }
            name if name.ends_with(" UNSIGNED") || name == "BIT" => {
                if let Ok(value) = row.try_get::<u64, _>(index) {
                    return Ok(Value::Number(value.into()));
                }
            }
            "FLOAT" => {
                if let Ok(value) = row.try_get::<f32, _>(index) {
                    if let Some(number) = serde_json::Number::from_f64(value as f64) {
                        return Ok(Value::Number(number));
                    }
                }
            }
            "DOUBLE" => {
                if let Ok(value) = row.try_get::<f64, _>(index) {
                    if let Some(number) = serde_json::Number::from_f64(value) {
                        return Ok(Value::Number(number));
                    }
                }
            }
            "DECIMAL" => {
                // Decimals travel as text in both protocols; keep the exact digits
                if let Ok(value) = row.try_get_unchecked::<String, _>(index) {
                    return Ok(Value::String(value));
                }
            }
            "DATE" => {
                if let Ok(value) = row.try_get::<NaiveDate, _>(index) {
                    return Ok(Value::String(value.to_string()));
                }
            }
            "DATETIME" => {
                if let Ok(value) = row.try_get::<NaiveDateTime, _>(index) {
                    return Ok(Value::String(value.to_string()));
                }
            }
            "TIMESTAMP" => {
                if let Ok(value) = row.try_get::<DateTime<Utc>, _>(index) {
                    return Ok(Value::String(value.to_rfc3339()));
                }
            }
            "TIME" => {
                if let Ok(value) = row.try_get::<NaiveTime, _>(index) {
                    return Ok(Value::String(value.to_string()));
                }
            }
            "JSON" => {
                if let Ok(text) = row.try_get_unchecked::<String, _>(index) {
                    return Ok(serde_json::from_str(&text).unwrap_or(Value::String(text)));
                }
            }
            "BLOB" | "TINYBLOB" | "MEDIUMBLOB" | "LONGBLOB" | "BINARY" | "VARBINARY"
            | "GEOMETRY" => {
                if let Ok(value) = row.try_get::<Vec<u8>, _>(index) {
                    return Ok(Value::String(blob_preview(&value)));
                }
            }
            _ => {
                if let Ok(value) = row.try_get::<String, _>(index) {
                    return Ok(Value::String(value));
                }
            }
        }

        // Fallback: try common types in order
        if let Ok(value) = row.try_get::<i64, _>(index) {
            return Ok(Value::Number(value.into()));
        }
        if let Ok(value) = row.try_get::<u64, _>(index) {
            return Ok(Value::Number(value.into()));
        }
        if let Ok(value) = row.try_get::<f64, _>(index) {
            if let Some(number) = serde_json::Number::from_f64(value) {
                return Ok(Value::Number(number));
            }
        }
        if let Ok(value) = row.try_get_unchecked::<String, _>(index) {
            return Ok(Value::String(value));
        }
        if let Ok(value) = row.try_get_unchecked::<Vec<u8>, _>(index) {
            return Ok(Value::String(blob_preview(&value)));
        }

        Ok(Value::Null)
    }

    /// Read a column as text whatever its reported type
    ///
    /// Catalog output mixes VARCHAR, BLOB and VARBINARY depending on server
    /// version and collation, so strict decoding is not an option here.
    fn text_at(row: &MySqlRow, index: usize) -> Result<Option<String>, DatabaseError> {
        if row.try_get_raw(index)?.is_null() {
            return Ok(None);
        }
        if let Ok(value) = row.try_get::<String, _>(index) {
            return Ok(Some(value));
        }
        let bytes: Vec<u8> = row.try_get_unchecked(index)?;
        Ok(Some(String::from_utf8_lossy(&bytes).into_owned()))
    }

    fn text_named(row: &MySqlRow, name: &str) -> Result<Option<String>, DatabaseError> {
        let index = row.try_column(name)?.ordinal();
        Self::text_at(row, index)
    }

    /// Read a column as an unsigned number, accepting signed and textual forms
    fn unsigned_at(row: &MySqlRow, index: usize) -> Result<Option<u64>, DatabaseError> {
        if row.try_get_raw(index)?.is_null() {
            return Ok(None);
        }
        if let Ok(value) = row.try_get::<u64, _>(index) {
            return Ok(Some(value));
        }
        if let Ok(value) = row.try_get::<i64, _>(index) {
            return Ok(u64::try_from(value).ok());
        }
        Ok(Self::text_at(row, index)?.and_then(|text| text.trim().parse().ok()))
    }

    fn unsigned_named(row: &MySqlRow, name: &str) -> Result<Option<u64>, DatabaseError> {
        let index = row.try_column(name)?.ordinal();
        Self::unsigned_at(row, index)
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

    fn column_from_row(row: &MySqlRow) -> Result<ColumnInfo, DatabaseError> {
        // SHOW FULL COLUMNS returns: Field, Type, Collation, Null, Key, Default, Extra, Privileges, Comment
        Ok(ColumnInfo {
            name: Self::text_named(row, "Field")?.unwrap_or_default(),
            data_type: Self::text_named(row, "Type")?.unwrap_or_default(),
            collation: Self::text_named(row, "Collation")?,
            nullable: Self::text_named(row, "Null")?.as_deref() == Some("YES"),
            key: Self::text_named(row, "Key")?.unwrap_or_default(),
            default_value: Self::text_named(row, "Default")?,
            extra: Self::text_named(row, "Extra")?.unwrap_or_default(),
            privileges: Self::text_named(row, "Privileges")?.unwrap_or_default(),
            comment: Self::text_named(row, "Comment")?.unwrap_or_default(),
        })
    }

    fn index_from_row(row: &MySqlRow) -> Result<IndexInfo, DatabaseError> {
        // SHOW INDEX returns: Table, Non_unique, Key_name, Seq_in_index, Column_name, Collation, Cardinality, ...
        Ok(IndexInfo {
            name: Self::text_named(row, "Key_name")?.unwrap_or_default(),
            column: Self::text_named(row, "Column_name")?.unwrap_or_default(),
            sequence: Self::unsigned_named(row, "Seq_in_index")?.unwrap_or(1),
            unique: Self::unsigned_named(row, "Non_unique")? == Some(0),
            cardinality: Self::unsigned_named(row, "Cardinality")?,
        })
    }
}

#[async_trait]
impl DatabaseProvider for MySqlProvider {
    const IDENTIFIER_QUOTE: char = '`';
    const MAX_IDENTIFIER_LENGTH: usize = 64;

    async fn connect(params: &ConnectParams) -> Result<Self, DatabaseError> {
        let connection = Self::connect_options(params).connect().await?;
        Ok(Self::new(connection))
    }

    async fn close(self) -> Result<(), DatabaseError> {
        self.connection.close().await?;
        Ok(())
    }

    async fn list_tables(&mut self) -> Result<Vec<String>, DatabaseError> {
        let rows = sqlx::query("SHOW TABLES")
            .fetch_all(&mut self.connection)
            .await?;

        // The column is named "Tables_in_<database>", so read it by position
        let mut tables = Vec::with_capacity(rows.len());
        for row in &rows {
            if let Some(name) = Self::text_at(row, 0)? {
                tables.push(name);
            }
        }

        Ok(tables)
    }

    async fn storage_figures(&mut self, database: &str) -> Result<StorageFigures, DatabaseError> {
        let size_row = sqlx::query(
            "SELECT CAST(COALESCE(SUM(data_length + index_length), 0) AS UNSIGNED) AS total_bytes, \
                    COUNT(data_length + index_length) AS sized_tables \
             FROM information_schema.TABLES \
             WHERE table_schema = ?",
        )
        .bind(database)
        .fetch_one(&mut self.connection)
        .await?;

        let largest_query = format!(
            "SELECT table_name AS name, \
                    CAST(COALESCE(data_length + index_length, 0) AS UNSIGNED) AS size_bytes \
             FROM information_schema.TABLES \
             WHERE table_schema = ? \
             ORDER BY size_bytes DESC \
             LIMIT {}",
            LARGEST_TABLES_LIMIT
        );
        let largest_rows = sqlx::query(&largest_query)
            .bind(database)
            .fetch_all(&mut self.connection)
            .await?;

        let mut largest_tables = Vec::with_capacity(largest_rows.len());
        for row in &largest_rows {
            let name = Self::text_at(row, 0)?.unwrap_or_default();
            let bytes = Self::unsigned_at(row, 1)?.unwrap_or(0);
            largest_tables.push((name, bytes));
        }

        let index_row = sqlx::query(
            "SELECT COUNT(*) AS index_count \
             FROM information_schema.STATISTICS \
             WHERE table_schema = ?",
        )
        .bind(database)
        .fetch_one(&mut self.connection)
        .await?;

        let key_row = sqlx::query(
            "SELECT COUNT(CASE WHEN constraint_name = 'PRIMARY' THEN 1 END) AS pk_count, \
                    COUNT(CASE WHEN referenced_table_name IS NOT NULL THEN 1 END) AS fk_count \
             FROM information_schema.KEY_COLUMN_USAGE \
             WHERE table_schema = ?",
        )
        .bind(database)
        .fetch_one(&mut self.connection)
        .await?;

        Ok(StorageFigures {
            total_bytes: Self::unsigned_at(&size_row, 0)?.unwrap_or(0),
            sized_tables: Self::unsigned_at(&size_row, 1)?.unwrap_or(0),
            largest_tables,
            index_count: Self::unsigned_at(&index_row, 0)?.unwrap_or(0),
            primary_key_count: Self::unsigned_at(&key_row, 0)?.unwrap_or(0),
            foreign_key_count: Self::unsigned_at(&key_row, 1)?.unwrap_or(0),
        })
    }

    async fn describe_table(&mut self, table: &str) -> Result<TableSchema, DatabaseError> {
        let quoted_table = Self::quote_identifier(table);

        let columns_query = format!("SHOW FULL COLUMNS FROM {}", quoted_table);
        let column_rows = sqlx::query(&columns_query)
            .fetch_all(&mut self.connection)
            .await?;

        let mut columns = Vec::with_capacity(column_rows.len());
        for row in &column_rows {
            columns.push(Self::column_from_row(row)?);
        }

        let index_query = format!("SHOW INDEX FROM {}", quoted_table);
        let index_rows = sqlx::query(&index_query)
            .fetch_all(&mut self.connection)
            .await?;

        let mut indexes = Vec::with_capacity(index_rows.len());
        for row in &index_rows {
            indexes.push(Self::index_from_row(row)?);
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
            .bind(limit)
            .bind(offset)
            .fetch_all(&mut self.connection)
            .await?;

        rows.iter().map(Self::row_to_json).collect()
    }

    async fn count_rows(&mut self, table: &str) -> Result<u64, DatabaseError> {
        let count_query = format!("SELECT COUNT(*) FROM {}", Self::quote_identifier(table));
        let count: i64 = sqlx::query_scalar(&count_query)
            .fetch_one(&mut self.connection)
            .await?;

        Ok(count.max(0) as u64)
    }

    async fn execute_statement(&mut self, sql: &str) -> Result<StatementOutcome, DatabaseError> {
        let mut outcome = StatementOutcome::default();

        // A bare &str runs over the text protocol, which accepts every statement type
        let mut results = (&mut self.connection).fetch_many(sql);
        while let Some(step) = results.try_next().await? {
            match step {
                Either::Left(done) => {
                    outcome.rows_affected += done.rows_affected();
                    if done.last_insert_id() != 0 {
                        outcome.last_insert_id = Some(done.last_insert_id());
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
