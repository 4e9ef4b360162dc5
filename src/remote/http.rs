//! HTTP client for the SQL service.

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

use super::types::{
    BackupsResponse, ColumnMeta, ColumnsResponse, DatabasesResponse, DropDatabaseRequest,
    ExecutePayload, ExecuteRequest, RestoreBackupRequest, TablesResponse,
};
use super::RemoteService;
use crate::config::ServiceConfig;
use crate::error::{Result, WorkspaceError, UNKNOWN_SERVICE_ERROR};

/// SQL service client speaking JSON over HTTP.
#[derive(Debug, Clone)]
pub struct HttpRemoteService {
    base_url: String,
    client: Client,
}

impl HttpRemoteService {
    /// Creates a client for the configured service.
    pub fn new(config: &ServiceConfig) -> Result<Self> {
        let base_url = config.base_url()?;
        let client = Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| WorkspaceError::internal(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self { base_url, client })
    }

    /// Returns the service base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    /// Sends a request and decodes the JSON body.
    ///
    /// No response, an unreadable body, or a non-JSON body is a transport failure.
    async fn send(&self, request: RequestBuilder) -> Result<(StatusCode, Value)> {
        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                WorkspaceError::transport("Request timed out")
            } else if e.is_connect() {
                WorkspaceError::transport(format!("Failed to connect to {}", self.base_url))
            } else {
                WorkspaceError::transport(format!("Request failed: {e}"))
            }
        })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| WorkspaceError::transport(format!("Failed to read response: {e}")))?;

        let value = serde_json::from_str(&body)
            .map_err(|e| WorkspaceError::transport(format!("Malformed response ({status}): {e}")))?;

        debug!(%status, "SQL service responded");
        Ok((status, value))
    }

    /// Sends an execution-family request. Rejections become statement errors.
    async fn send_execution(&self, request: RequestBuilder) -> Result<ExecutePayload> {
        let (status, body) = self.send(request).await?;
        if !status.is_success() {
            return Err(WorkspaceError::statement(rejection_message(&body)));
        }
        Ok(ExecutePayload::new(body))
    }

    /// Sends a listing request. Rejections become schema load errors.
    async fn send_listing<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        what: &str,
    ) -> Result<T> {
        let (status, body) = self.send(request).await?;
        if !status.is_success() {
            return Err(WorkspaceError::schema_load(format!(
                "{what} ({status}): {}",
                rejection_message(&body)
            )));
        }
        serde_json::from_value(body)
            .map_err(|e| WorkspaceError::schema_load(format!("{what}: unexpected shape: {e}")))
    }
}

/// Extracts the `error` field of a rejection body.
fn rejection_message(body: &Value) -> String {
    body.get("error")
        .and_then(Value::as_str)
        .unwrap_or(UNKNOWN_SERVICE_ERROR)
        .to_string()
}

#[async_trait]
impl RemoteService for HttpRemoteService {
    async fn execute(&self, statement: &str) -> Result<ExecutePayload> {
        let request = self
            .client
            .post(self.url("execute"))
            .json(&ExecuteRequest { query: statement });
        self.send_execution(request).await
    }

    async fn list_databases(&self) -> Result<Vec<String>> {
        let request = self.client.get(self.url("databases"));
        let response: DatabasesResponse = self.send_listing(request, "databases").await?;
        Ok(response.databases)
    }

    async fn list_tables(&self, db: &str) -> Result<Vec<String>> {
        let request = self.client.get(self.url("tables")).query(&[("db", db)]);
        let response: TablesResponse = self
            .send_listing(request, &format!("tables of '{db}'"))
            .await?;
        Ok(response.tables)
    }

    async fn list_columns(&self, db: &str, table: &str) -> Result<Vec<ColumnMeta>> {
        let request = self
            .client
            .get(self.url("columns"))
            .query(&[("db", db), ("table", table)]);
        let response: ColumnsResponse = self
            .send_listing(request, &format!("columns of '{db}.{table}'"))
            .await?;
        Ok(response.columns)
    }

    async fn drop_database(&self, db: &str) -> Result<ExecutePayload> {
        let request = self
            .client
            .post(self.url("drop_database"))
            .json(&DropDatabaseRequest { db });
        self.send_execution(request).await
    }

    async fn list_backups(&self, db: &str, table: &str) -> Result<Vec<String>> {
        let request = self
            .client
            .get(self.url("backups"))
            .query(&[("db", db), ("table", table)]);
        let response: BackupsResponse = self
            .send_listing(request, &format!("backups of '{db}.{table}'"))
            .await?;
        Ok(response.backups)
    }

    async fn restore_backup(
        &self,
        db: &str,
        table: &str,
        backup_file: &str,
    ) -> Result<ExecutePayload> {
        let request = self
            .client
            .post(self.url("restore_backup"))
            .json(&RestoreBackupRequest {
                db,
                table,
                backup_file,
            });
        self.send_execution(request).await
    }
}
