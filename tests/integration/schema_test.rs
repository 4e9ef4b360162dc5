//! Schema browsing through the public workspace API.

use std::sync::Arc;

use pretty_assertions::assert_eq;
use sql_workspace::error::WorkspaceError;
use sql_workspace::remote::{ColumnMeta, MockRemoteService, RemoteCall};
use sql_workspace::schema::{LoadState, TableRef};
use sql_workspace::workspace::Workspace;

fn catalog() -> Arc<MockRemoteService> {
    Arc::new(
        MockRemoteService::new()
            .with_database("shop", &["orders", "customers"])
            .with_database("hr", &["staff"])
            .with_columns(
                "shop",
                "orders",
                vec![
                    ColumnMeta::new("id", "INT"),
                    ColumnMeta::new("customer", "VARCHAR(255)"),
                ],
            ),
    )
}

#[tokio::test]
async fn test_browse_tree() {
    let mock = catalog();
    let workspace = Workspace::new(mock.clone());

    assert_eq!(workspace.mount().await, vec!["hr", "shop"]);
    assert_eq!(
        workspace.expand_database("shop").await,
        Some(vec!["customers".to_string(), "orders".to_string()])
    );

    let columns = workspace.select_table("shop", "orders").await;
    assert_eq!(columns.len(), 2);
    assert_eq!(
        workspace.schema().column("customer").map(|c| c.data_type),
        Some("VARCHAR(255)".to_string())
    );
    assert_eq!(
        workspace.schema().expansion().table,
        Some(TableRef::new("shop", "orders"))
    );

    // Switching database hides the table and keeps shop's tables memoized.
    workspace.expand_database("hr").await;
    assert_eq!(workspace.schema().expansion().table, None);
    workspace.expand_database("shop").await;
    assert_eq!(mock.count(&RemoteCall::ListTables("shop".into())), 1);
}

#[tokio::test]
async fn test_failed_table_fetch_degrades() {
    let mock = catalog();
    mock.fail_tables("shop", WorkspaceError::transport("connection reset"));
    let workspace = Workspace::new(mock.clone());

    assert_eq!(workspace.expand_database("shop").await, Some(Vec::new()));
    assert_eq!(workspace.schema().load_state("shop"), LoadState::LoadFailed);
}

#[tokio::test]
async fn test_explicit_refresh_refetches() {
    let mock = catalog();
    let workspace = Workspace::new(mock.clone());
    workspace.expand_database("shop").await;

    workspace.refresh(Some("shop")).await;

    assert_eq!(mock.count(&RemoteCall::ListTables("shop".into())), 2);
    assert_eq!(mock.count(&RemoteCall::ListDatabases), 1);
}

#[tokio::test]
async fn test_drop_database() {
    let mock = catalog();
    let workspace = Workspace::new(mock.clone());
    workspace.mount().await;
    workspace.expand_database("shop").await;

    workspace.drop_database("shop").await.unwrap();

    assert_eq!(workspace.schema().databases(), vec!["hr"]);
    assert_eq!(workspace.schema().expansion().database, None);

    let err = workspace.drop_database("shop").await.unwrap_err();
    assert_eq!(err.category(), "Statement Error");
}
