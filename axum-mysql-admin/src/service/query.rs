//! Ad-hoc statement execution

use super::AdminService;
use crate::database::returns_rows;
use crate::database::traits::DatabaseProvider;
use crate::schema::QueryResult;
use crate::Error;
use tracing::debug;

impl<DB: DatabaseProvider> AdminService<DB> {
    /// Run a caller-supplied statement and classify its result
    ///
    /// No statement type is refused: this is a full SQL console.
    pub async fn execute(&self, sql: &str) -> Result<QueryResult, Error> {
        let mut session = self.sessions.require_session().await?;
        debug!(sql = %sql, "Executing SQL statement");

        let outcome = session
            .connection
            .execute_statement(sql)
            .await
            .map_err(Error::execution)?;

        if !outcome.rows.is_empty() {
            return Ok(QueryResult::RowSet {
                rows: outcome.rows,
                columns: outcome.columns,
            });
        }

        // Without rows, the statement's own result metadata tells a row-set from a mutation
        match session.connection.result_columns(sql).await {
            Ok(columns) if !columns.is_empty() => {
                return Ok(QueryResult::RowSet {
                    rows: Vec::new(),
                    columns,
                });
            }
            Ok(_) => {}
            Err(error) => {
                debug!(%error, "Could not describe result columns");
                if returns_rows(sql) {
                    return Ok(QueryResult::RowSet {
                        rows: Vec::new(),
                        columns: Vec::new(),
                    });
                }
            }
        }

        Ok(QueryResult::Mutation {
            affected_rows: outcome.rows_affected,
            last_insert_id: outcome.last_insert_id,
        })
    }
}
