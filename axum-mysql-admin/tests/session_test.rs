//! Session, catalog, browsing and query tests against an in-memory SQLite database

#![cfg(feature = "sqlite")]

use axum_mysql_admin::schema::ContentQuery;
use axum_mysql_admin::{
    AdminConfig, AdminService, ConnectParams, Error, QueryResult, SessionIdentity, SqliteProvider,
};
use serde_json::json;

fn memory_params(user: &str) -> ConnectParams {
    ConnectParams {
        host: "localhost".to_string(),
        port: None,
        user: user.to_string(),
        password: String::new(),
        database: ":memory:".to_string(),
    }
}

async fn connected_service() -> AdminService<SqliteProvider> {
    let service = AdminService::new(AdminConfig::default());
    service
        .connect(&memory_params("tester"))
        .await
        .expect("in-memory connect");
    service
}

/// Table `t` with ids 1..=rows
async fn seed_numbers(service: &AdminService<SqliteProvider>, rows: usize) {
    service
        .execute("CREATE TABLE t (id INTEGER PRIMARY KEY, label TEXT NOT NULL)")
        .await
        .unwrap();

    let values: Vec<String> = (1..=rows)
        .map(|id| format!("({id}, 'row {id}')"))
        .collect();
    let insert = format!("INSERT INTO t (id, label) VALUES {}", values.join(", "));
    let result = service.execute(&insert).await.unwrap();
    assert!(matches!(
        result,
        QueryResult::Mutation { affected_rows, .. } if affected_rows == rows as u64
    ));
}

fn page_query(page: &str, limit: &str) -> ContentQuery {
    ContentQuery {
        page: Some(page.to_string()),
        limit: Some(limit.to_string()),
        ..Default::default()
    }
}

#[tokio::test]
async fn test_require_session_before_and_after_connect() {
    let service: AdminService<SqliteProvider> = AdminService::new(AdminConfig::default());

    assert!(matches!(
        service.sessions().require_session().await,
        Err(Error::NoActiveSession)
    ));
    assert!(matches!(
        service.list_tables().await,
        Err(Error::NoActiveSession)
    ));
    assert!(matches!(
        service.execute("SELECT 1").await,
        Err(Error::NoActiveSession)
    ));

    service.connect(&memory_params("tester")).await.unwrap();

    assert!(service.sessions().require_session().await.is_ok());
    assert!(service.list_tables().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_reconnect_keeps_only_latest_session() {
    let service = connected_service().await;
    seed_numbers(&service, 3).await;

    service.connect(&memory_params("alice")).await.unwrap();
    let identity = service.connect(&memory_params("bob")).await.unwrap();

    let expected = SessionIdentity {
        host: "localhost".to_string(),
        user: "bob".to_string(),
        database: ":memory:".to_string(),
    };
    assert_eq!(identity, expected);
    assert_eq!(service.sessions().identity().await, Some(expected));

    // The first connection's in-memory database is gone with it
    assert!(service.list_tables().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_failed_connect_leaves_no_session() {
    let service = connected_service().await;

    let params = ConnectParams {
        database: "/nonexistent-directory/missing.db".to_string(),
        ..memory_params("tester")
    };
    let error = service.connect(&params).await.unwrap_err();
    assert!(matches!(error, Error::Connection(ref message) if !message.is_empty()));

    assert!(matches!(
        service.list_tables().await,
        Err(Error::NoActiveSession)
    ));
    assert_eq!(service.sessions().identity().await, None);
}

#[tokio::test]
async fn test_stats_for_empty_database() {
    let service = connected_service().await;

    let stats = service.compute_stats().await.unwrap();
    assert_eq!(stats.table_count, 0);
    assert_eq!(stats.total_size_mb, "0.00");
    assert_eq!(stats.avg_table_size_mb, "0.00");
    assert_eq!(stats.index_count, 0);
    assert_eq!(stats.pk_count, 0);
    assert_eq!(stats.fk_count, 0);
    assert!(stats.element_sizes.is_empty());
    assert_eq!(stats.db_name, ":memory:");
    assert_eq!(stats.user, "tester");
}

#[tokio::test]
async fn test_stats_count_keys_and_indexes() {
    let service = connected_service().await;
    for statement in [
        "CREATE TABLE parent (id INTEGER PRIMARY KEY, code TEXT UNIQUE)",
        "CREATE TABLE child (id INTEGER PRIMARY KEY, parent_id INTEGER REFERENCES parent(id))",
        "CREATE INDEX idx_child_parent ON child (parent_id)",
    ] {
        service.execute(statement).await.unwrap();
    }

    let stats = service.compute_stats().await.unwrap();
    assert_eq!(stats.table_count, 2);
    assert_eq!(stats.pk_count, 2);
    assert_eq!(stats.fk_count, 1);
    assert_eq!(stats.index_count, 2);
    assert_eq!(stats.element_sizes.len(), 2);
}

#[tokio::test]
async fn test_list_tables_returns_names() {
    let service = connected_service().await;
    service.execute("CREATE TABLE zebra (id INTEGER)").await.unwrap();
    service.execute("CREATE TABLE apple (id INTEGER)").await.unwrap();

    assert_eq!(service.list_tables().await.unwrap(), vec!["apple", "zebra"]);
}

#[tokio::test]
async fn test_describe_table() {
    let service = connected_service().await;
    for statement in [
        "CREATE TABLE parent (id INTEGER PRIMARY KEY, code TEXT UNIQUE)",
        "CREATE TABLE child (id INTEGER PRIMARY KEY, parent_id INTEGER NOT NULL DEFAULT 0 REFERENCES parent(id))",
        "CREATE INDEX idx_child_parent ON child (parent_id)",
    ] {
        service.execute(statement).await.unwrap();
    }

    let schema = service.describe_table("child").await.unwrap();
    let names: Vec<&str> = schema.columns.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, vec!["id", "parent_id"]);
    assert_eq!(schema.columns[0].key, "PRI");
    assert_eq!(schema.columns[1].key, "MUL");
    assert!(!schema.columns[1].nullable);
    assert_eq!(schema.columns[1].default_value.as_deref(), Some("0"));

    assert_eq!(schema.indexes.len(), 1);
    assert_eq!(schema.indexes[0].name, "idx_child_parent");
    assert_eq!(schema.indexes[0].column, "parent_id");
    assert_eq!(schema.indexes[0].sequence, 1);
    assert!(!schema.indexes[0].unique);

    let parent = service.describe_table("parent").await.unwrap();
    assert_eq!(parent.columns[1].key, "UNI");
}

#[tokio::test]
async fn test_describe_rejects_unknown_and_unsafe_names() {
    let service = connected_service().await;
    seed_numbers(&service, 1).await;

    assert!(matches!(
        service.describe_table("ghost").await,
        Err(Error::TableNotFound(name)) if name == "ghost"
    ));
    assert!(matches!(
        service.describe_table("t\" ; DROP TABLE t; --").await,
        Err(Error::InvalidIdentifier(_))
    ));
}

#[tokio::test]
async fn test_browse_second_page() {
    let service = connected_service().await;
    seed_numbers(&service, 25).await;

    let page = service.browse("t", &page_query("2", "10")).await.unwrap();
    assert_eq!(page.total, 25);
    assert_eq!(page.page, 2);
    assert_eq!(page.total_pages, 3);

    let ids: Vec<i64> = page
        .data
        .iter()
        .map(|row| row["id"].as_i64().unwrap())
        .collect();
    assert_eq!(ids, (11..=20).collect::<Vec<i64>>());
    assert_eq!(page.data[0], json!({"id": 11, "label": "row 11"}));
}

#[tokio::test]
async fn test_browse_last_and_out_of_range_pages() {
    let service = connected_service().await;
    seed_numbers(&service, 25).await;

    let last = service.browse("t", &page_query("3", "10")).await.unwrap();
    assert_eq!(last.data.len(), 5);

    let beyond = service.browse("t", &page_query("9", "10")).await.unwrap();
    assert!(beyond.data.is_empty());
    assert_eq!(beyond.total, 25);
    assert_eq!(beyond.page, 9);
}

#[tokio::test]
async fn test_browse_defaults() {
    let service = connected_service().await;
    seed_numbers(&service, 60).await;

    let page = service
        .browse("t", &page_query("zero", "lots"))
        .await
        .unwrap();
    assert_eq!(page.page, 1);
    assert_eq!(page.data.len(), 50);
    assert_eq!(page.total_pages, 2);
}

#[tokio::test]
async fn test_browse_sorted_descending() {
    let service = connected_service().await;
    seed_numbers(&service, 25).await;

    let query = ContentQuery {
        sort: Some("id".to_string()),
        dir: Some("DESC".to_string()),
        ..page_query("1", "5")
    };
    let page = service.browse("t", &query).await.unwrap();
    let ids: Vec<i64> = page
        .data
        .iter()
        .map(|row| row["id"].as_i64().unwrap())
        .collect();
    assert_eq!(ids, vec![25, 24, 23, 22, 21]);
}

#[tokio::test]
async fn test_browse_rejects_unknown_sort_column() {
    let service = connected_service().await;
    seed_numbers(&service, 5).await;

    let query = ContentQuery {
        sort: Some("missing".to_string()),
        ..Default::default()
    };
    assert!(matches!(
        service.browse("t", &query).await,
        Err(Error::InvalidColumn(column)) if column == "missing"
    ));

    let query = ContentQuery {
        sort: Some("id\" DESC, (SELECT 1) --".to_string()),
        ..Default::default()
    };
    assert!(matches!(
        service.browse("t", &query).await,
        Err(Error::InvalidIdentifier(_))
    ));

    assert!(matches!(
        service.browse("nope", &ContentQuery::default()).await,
        Err(Error::TableNotFound(_))
    ));
}

#[tokio::test]
async fn test_execute_select_one() {
    let service = connected_service().await;

    let result = service.execute("SELECT 1").await.unwrap();
    assert_eq!(result.message(), "1 rows returned");
    match result {
        QueryResult::RowSet { rows, columns } => {
            assert_eq!(rows.len(), 1);
            assert_eq!(columns.len(), 1);
            assert_eq!(rows[0][&columns[0]], json!(1));
        }
        other => panic!("expected a row-set, got {other:?}"),
    }
}

#[tokio::test]
async fn test_execute_update_on_empty_table() {
    let service = connected_service().await;
    service.execute("CREATE TABLE t (x INTEGER)").await.unwrap();

    let result = service
        .execute("UPDATE t SET x=1 WHERE 1=0")
        .await
        .unwrap();
    assert_eq!(result.message(), "Query OK, 0 rows affected.");
    assert!(matches!(
        result,
        QueryResult::Mutation {
            affected_rows: 0,
            ..
        }
    ));
}

#[tokio::test]
async fn test_execute_empty_select_keeps_columns() {
    let service = connected_service().await;
    seed_numbers(&service, 3).await;

    let result = service
        .execute("SELECT id, label FROM t WHERE 1 = 0")
        .await
        .unwrap();
    assert_eq!(result.message(), "0 rows returned");
    assert_eq!(
        result,
        QueryResult::RowSet {
            rows: vec![],
            columns: vec!["id".to_string(), "label".to_string()],
        }
    );
}

#[tokio::test]
async fn test_execute_insert_reports_affected_rows() {
    let service = connected_service().await;
    seed_numbers(&service, 3).await;

    let result = service
        .execute("INSERT INTO t (label) VALUES ('a'), ('b')")
        .await
        .unwrap();
    assert_eq!(result.message(), "Query OK, 2 rows affected.");
    assert!(matches!(
        result,
        QueryResult::Mutation {
            affected_rows: 2,
            last_insert_id: Some(5),
        }
    ));
}

#[tokio::test]
async fn test_execute_error_passes_driver_message() {
    let service = connected_service().await;

    match service.execute("SELEC 1").await {
        Err(Error::Execution(message)) => assert!(message.contains("syntax error"), "{message}"),
        other => panic!("expected an execution error, got {other:?}"),
    }

    // The connection stays usable after a failed statement
    assert!(service.execute("SELECT 1").await.is_ok());
}

#[tokio::test]
async fn test_execute_with_clause_delete_is_a_mutation() {
    let service = connected_service().await;
    seed_numbers(&service, 2).await;

    let result = service
        .execute("WITH doomed AS (SELECT 1 AS id) DELETE FROM t WHERE id IN (SELECT id FROM doomed)")
        .await
        .unwrap();
    assert_eq!(result.message(), "Query OK, 1 rows affected.");
    assert!(matches!(
        result,
        QueryResult::Mutation {
            affected_rows: 1,
            ..
        }
    ));

    let page = service.browse("t", &ContentQuery::default()).await.unwrap();
    assert_eq!(page.total, 1);
}

#[tokio::test]
async fn test_execute_update_reports_no_insert_id() {
    let service = connected_service().await;
    seed_numbers(&service, 3).await;

    let result = service
        .execute("UPDATE t SET label = 'changed' WHERE id = 1")
        .await
        .unwrap();
    assert_eq!(
        result,
        QueryResult::Mutation {
            affected_rows: 1,
            last_insert_id: None,
        }
    );
}

#[tokio::test]
async fn test_browse_running_alongside_reconnect() {
    let service = connected_service().await;
    seed_numbers(&service, 25).await;

    let query = page_query("1", "10");
    let params = memory_params("bob");
    let (page, identity) = tokio::join!(
        service.browse("t", &query),
        service.connect(&params),
    );

    // The browse started first and finished against the old connection
    let page = page.unwrap();
    assert_eq!(page.data.len(), 10);
    assert_eq!(page.total, 25);

    assert_eq!(identity.unwrap().user, "bob");
    assert!(service.list_tables().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_long_table_names_are_browsable() {
    let service = connected_service().await;
    let table = "t".repeat(70);
    service
        .execute(&format!("CREATE TABLE \"{table}\" (id INTEGER PRIMARY KEY)"))
        .await
        .unwrap();

    assert_eq!(service.list_tables().await.unwrap(), vec![table.clone()]);
    assert_eq!(service.describe_table(&table).await.unwrap().columns.len(), 1);
    assert_eq!(
        service
            .browse(&table, &ContentQuery::default())
            .await
            .unwrap()
            .total,
        0
    );
}

#[tokio::test]
async fn test_browse_sort_column_ignores_case() {
    let service = connected_service().await;
    seed_numbers(&service, 5).await;

    let query = ContentQuery {
        sort: Some("ID".to_string()),
        dir: Some("desc".to_string()),
        ..Default::default()
    };
    let page = service.browse("t", &query).await.unwrap();
    assert_eq!(page.data[0]["id"], json!(5));
}
