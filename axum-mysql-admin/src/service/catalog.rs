//! Metadata catalog reads

use super::AdminService;
use crate::database::traits::DatabaseProvider;
use crate::identifier;
use crate::schema::{StatsSummary, TableSchema};
use crate::Error;

impl<DB: DatabaseProvider> AdminService<DB> {
    /// Table names of the current database
    pub async fn list_tables(&self) -> Result<Vec<String>, Error> {
        let mut session = self.sessions.require_session().await?;
        session
            .connection
            .list_tables()
            .await
            .map_err(Error::catalog)
    }

    /// Storage statistics, computed fresh on every call
    pub async fn compute_stats(&self) -> Result<StatsSummary, Error> {
        let mut session = self.sessions.require_session().await?;
        let identity = session.identity.clone();

        let tables = session
            .connection
            .list_tables()
            .await
            .map_err(Error::catalog)?;
        let figures = session
            .connection
            .storage_figures(&identity.database)
            .await
            .map_err(Error::catalog)?;

        Ok(StatsSummary::from_figures(
            tables.len(),
            figures,
            &identity.database,
            &identity.user,
        ))
    }

    /// Column and index metadata for one table
    pub async fn describe_table(&self, table: &str) -> Result<TableSchema, Error> {
        let mut session = self.sessions.require_session().await?;
        let table = resolve_table(&mut session.connection, table).await?;

        session
            .connection
            .describe_table(&table)
            .await
            .map_err(Error::catalog)
    }
}

/// Validate a table name and confirm the database knows it
pub(super) async fn resolve_table<DB: DatabaseProvider>(
    connection: &mut DB,
    table: &str,
) -> Result<String, Error> {
    identifier::validate(table, DB::IDENTIFIER_QUOTE, DB::MAX_IDENTIFIER_LENGTH)?;

    let tables = connection.list_tables().await.map_err(Error::catalog)?;
    identifier::ensure_table(table, &tables).map(str::to_string)
}
