//! Batch execution through the public workspace API.

use std::sync::Arc;

use pretty_assertions::assert_eq;
use serde_json::json;
use sql_workspace::error::{WorkspaceError, SERVICE_UNREACHABLE};
use sql_workspace::presenter::Presentation;
use sql_workspace::remote::{ExecutePayload, MockRemoteService, RemoteCall};
use sql_workspace::workspace::Workspace;

fn workspace() -> (Arc<MockRemoteService>, Workspace) {
    let mock = Arc::new(MockRemoteService::new().with_database("shop", &["orders"]));
    let workspace = Workspace::new(mock.clone());
    (mock, workspace)
}

#[tokio::test]
async fn test_second_of_three_fails() {
    let (mock, workspace) = workspace();
    let first = ExecutePayload::new(json!({"message": "1 fila insertada", "rows_affected": 1}));
    mock.script("INSERT INTO shop.orders VALUES (1)", Ok(first.clone()));
    mock.script(
        "INSERT INTO shop.orders VALUES ('x')",
        Err(WorkspaceError::statement("tipo inválido")),
    );

    let submission = workspace
        .submit(
            "INSERT INTO shop.orders VALUES (1);\n\
             INSERT INTO shop.orders VALUES ('x');\n\
             INSERT INTO shop.orders VALUES (3);",
        )
        .await;

    assert_eq!(mock.executed().len(), 2);
    assert_eq!(submission.batch.last_result, Some(first));
    assert_eq!(
        submission.batch.error,
        Some(WorkspaceError::statement("tipo inválido"))
    );
    assert_eq!(
        submission.presentation,
        Some(Presentation::Mutation {
            rows_affected: Some(1),
            execution_time_secs: None,
            from_cache: false,
            message: Some("1 fila insertada".to_string()),
        })
    );
}

#[tokio::test]
async fn test_unreachable_service() {
    let (mock, workspace) = workspace();
    mock.set_unreachable(true);

    let submission = workspace.submit("SELECT 1; SELECT 2").await;

    assert_eq!(
        submission.batch.error,
        Some(WorkspaceError::transport(SERVICE_UNREACHABLE))
    );
    assert!(submission.presentation.is_none());
    assert_eq!(mock.calls(), vec![RemoteCall::Execute("SELECT 1".into())]);
}

#[tokio::test]
async fn test_create_database_then_table() {
    let (mock, workspace) = workspace();
    workspace.mount().await;

    let submission = workspace
        .submit("CREATE DATABASE shop2; CREATE TABLE shop2.orders(id INT, total FLOAT)")
        .await;

    assert_eq!(submission.batch.database_created.as_deref(), Some("shop2"));
    assert_eq!(submission.batch.table_created.as_deref(), Some("shop2"));
    // One from mount, one from the refresh.
    assert_eq!(mock.count(&RemoteCall::ListDatabases), 2);
    assert_eq!(mock.count(&RemoteCall::ListTables("shop2".into())), 1);
    assert_eq!(workspace.schema().databases(), vec!["shop", "shop2"]);
}

#[tokio::test]
async fn test_cache_hit_presentation() {
    let (mock, workspace) = workspace();
    mock.script(
        "SELECT COUNT(*) FROM shop.orders",
        Ok(ExecutePayload::new(json!({"source": "cache", "execution_time": 0.0001}))),
    );

    let submission = workspace.submit("SELECT COUNT(*) FROM shop.orders").await;

    match submission.presentation {
        Some(Presentation::Mutation { from_cache, .. }) => assert!(from_cache),
        other => panic!("Expected cached mutation summary, got {other:?}"),
    }
}
