use super::{sort_newest_first, TaskStore};
use crate::config::StoreConfig;
use crate::error::{Result, StoreError, TodoError};
use crate::models::{NewTaskRecord, TaskRecord};
use serde_json::json;

/// PostgREST client for the task table
pub struct RestTaskStore {
    config: StoreConfig,
    client: reqwest::Client,
}

impl RestTaskStore {
    /// No request timeout is set; the transport defaults apply.
    pub fn new(config: StoreConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("smart-todo/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { config, client })
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    fn request(&self, method: reqwest::Method) -> reqwest::RequestBuilder {
        self.client
            .request(method, self.config.table_url())
            .header("apikey", &self.config.api_key)
            .header("Authorization", format!("Bearer {}", self.config.api_key))
    }

    /// Turn a non-2xx response into a `StoreError` from its JSON body
    async fn check(response: reqwest::Response) -> Result<reqwest::Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "(no body)".to_string());
        let err = serde_json::from_str::<StoreError>(&body)
            .unwrap_or_else(|_| StoreError::new(None, format!("HTTP {}: {}", status, body)))
            .with_status(status.as_u16());

        tracing::debug!(status = status.as_u16(), error = %err, "Store request failed");
        Err(TodoError::Store(err))
    }
}

/// `eq.<id>` filter value
fn eq_filter(id: &str) -> String {
    format!("eq.{}", id)
}

/// `in.("a","b")` filter value; quoting keeps commas and parens inside ids literal
fn in_filter(ids: &[String]) -> String {
    let quoted: Vec<String> = ids
        .iter()
        .map(|id| format!("\"{}\"", id.replace('\\', "\\\\").replace('"', "\\\"")))
        .collect();
    format!("in.({})", quoted.join(","))
}

impl TaskStore for RestTaskStore {
    fn qualified_table(&self) -> String {
        self.config.qualified_table()
    }

    async fn list_all(&self) -> Result<Vec<TaskRecord>> {
        let response = self
            .request(reqwest::Method::GET)
            .query(&[("select", "*"), ("order", "created_at.desc")])
            .send()
            .await?;

        let mut records: Vec<TaskRecord> = Self::check(response).await?.json().await?;
        sort_newest_first(&mut records);
        tracing::debug!(count = records.len(), "Fetched tasks");
        Ok(records)
    }

    async fn insert(&self, record: &NewTaskRecord) -> Result<TaskRecord> {
        let response = self
            .request(reqwest::Method::POST)
            .query(&[("select", "*")])
            .header("Prefer", "return=representation")
            .json(&[record])
            .send()
            .await?;

        let rows: Vec<TaskRecord> = Self::check(response).await?.json().await?;
        rows.into_iter().next().ok_or_else(|| {
            TodoError::Store(StoreError::new(None, "Insert returned no rows"))
        })
    }

    async fn update_completion(&self, id: &str, is_completed: bool) -> Result<()> {
        let response = self
            .request(reqwest::Method::PATCH)
            .query(&[("id", eq_filter(id))])
            .json(&json!({ "is_completed": is_completed }))
            .send()
            .await?;
        Self::check(response).await?;
        Ok(())
    }

    async fn delete_by_id(&self, id: &str) -> Result<()> {
        let response = self
            .request(reqwest::Method::DELETE)
            .query(&[("id", eq_filter(id))])
            .send()
            .await?;
        Self::check(response).await?;
        Ok(())
    }

    async fn delete_by_ids(&self, ids: &[String]) -> Result<()> {
        if ids.is_empty() {
            return Ok(());
        }

        let response = self
            .request(reqwest::Method::DELETE)
            .query(&[("id", in_filter(ids))])
            .send()
            .await?;
        Self::check(response).await?;
        Ok(())
    }
}
