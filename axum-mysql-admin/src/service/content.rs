//! Paginated table browsing

use super::catalog::resolve_table;
use super::AdminService;
use crate::database::traits::DatabaseProvider;
use crate::identifier;
use crate::pagination::{OrderBy, Pagination, SortDirection};
use crate::schema::{ContentPage, ContentQuery};
use crate::Error;

impl<DB: DatabaseProvider> AdminService<DB> {
    /// One page of rows plus the table's total row count
    ///
    /// A sort column must exist in the table; it is checked against a live
    /// schema lookup, case-insensitively, before being quoted into the query.
    pub async fn browse(&self, table: &str, query: &ContentQuery) -> Result<ContentPage, Error> {
        let pagination =
            Pagination::from_params(query.page.as_deref(), query.limit.as_deref(), &self.config);
        let direction = SortDirection::from_param(query.dir.as_deref());

        let mut session = self.sessions.require_session().await?;
        let connection = &mut session.connection;
        let table = resolve_table(connection, table).await?;

        let order = match query.sort.as_deref().map(str::trim) {
            Some(column) if !column.is_empty() => {
                identifier::validate(column, DB::IDENTIFIER_QUOTE, DB::MAX_IDENTIFIER_LENGTH)?;
                let schema = connection
                    .describe_table(&table)
                    .await
                    .map_err(Error::catalog)?;
                let column = identifier::ensure_column(
                    column,
                    schema.columns.iter().map(|known| known.name.as_str()),
                )?;
                Some(OrderBy {
                    column: column.to_string(),
                    direction,
                })
            }
            _ => None,
        };

        let data = connection
            .fetch_page(
                &table,
                order.as_ref(),
                pagination.limit(),
                pagination.offset(),
            )
            .await
            .map_err(Error::catalog)?;
        let total = connection
            .count_rows(&table)
            .await
            .map_err(Error::catalog)?;

        Ok(ContentPage {
            data,
            total,
            page: pagination.page(),
            total_pages: pagination.total_pages(total),
        })
    }
}
