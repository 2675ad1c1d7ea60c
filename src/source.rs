// THEORY:
// A task source is where the audit gets its labeling tasks from. The pipeline
// only needs `list_tasks(project)`; paging, authentication and filtering belong
// to the source.
//
// 1.  **ScaleTaskSource**: walks the annotation service's paginated listing.
//     The first request carries no token. Paging continues while a page says
//     `has_more` and hands back a `next_token`, and stops on the first page
//     that lacks either.
// 2.  **JsonFileTaskSource**: reads an exported dump from disk.

use crate::error::SourceError;
use crate::task::{Task, TaskRecord};
use async_trait::async_trait;
use serde::Deserialize;
use std::path::PathBuf;

#[async_trait]
pub trait TaskSource: Send + Sync {
    /// Every task of `project`, in the order the source yields them.
    async fn list_tasks(&self, project: &str) -> Result<Vec<Task>, SourceError>;
}

/// One page of the annotation service's task listing.
#[derive(Debug, Deserialize)]
pub struct TaskPage {
    pub docs: Vec<TaskRecord>,
    #[serde(default)]
    pub next_token: Option<String>,
    #[serde(default)]
    pub has_more: bool,
}

/// HTTP client for the annotation service's `GET /tasks` endpoint.
pub struct ScaleTaskSource {
    client: reqwest::Client,
    api_url: String,
    api_key: String,
    page_size: u32,
}

impl ScaleTaskSource {
    /// * `api_url` - Base URL, e.g. `https://api.scale.com/v1`.
    /// * `api_key` - Sent as the basic-auth user name.
    pub fn new(api_url: String, api_key: String, page_size: u32) -> Self {
        Self::with_client(reqwest::Client::new(), api_url, api_key, page_size)
    }

    pub fn with_client(
        client: reqwest::Client,
        api_url: String,
        api_key: String,
        page_size: u32,
    ) -> Self {
        Self {
            client,
            api_url: api_url.trim_end_matches('/').to_string(),
            api_key,
            page_size,
        }
    }

    async fn fetch_page(
        &self,
        project: &str,
        next_token: Option<&str>,
    ) -> Result<TaskPage, SourceError> {
        let mut request = self
            .client
            .get(format!("{}/tasks", self.api_url))
            .basic_auth(&self.api_key, Some(""))
            .query(&[("project", project)])
            .query(&[("limit", self.page_size)]);
        if let Some(token) = next_token {
            request = request.query(&[("next_token", token)]);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SourceError::Api {
                status: status.as_u16(),
                body,
            });
        }

        Ok(response.json::<TaskPage>().await?)
    }
}

#[async_trait]
impl TaskSource for ScaleTaskSource {
    async fn list_tasks(&self, project: &str) -> Result<Vec<Task>, SourceError> {
        let mut records: Vec<TaskRecord> = Vec::new();
        let mut cursor: Option<String> = None;
        loop {
            let page = self.fetch_page(project, cursor.as_deref()).await?;
            tracing::debug!(tasks = page.docs.len(), has_more = page.has_more, "fetched task page");

            records.extend(page.docs);
            match next_cursor(page.next_token, page.has_more) {
                Some(token) => cursor = Some(token),
                None => break,
            }
        }

        Ok(records.into_iter().map(Task::from).collect())
    }
}

/// The token for the next listing request, or `None` once the listing is done.
fn next_cursor(next_token: Option<String>, has_more: bool) -> Option<String> {
    match next_token {
        Some(token) if has_more => Some(token),
        _ => None,
    }
}

/// The shapes a task dump on disk may take.
#[derive(Deserialize)]
#[serde(untagged)]
enum TaskDump {
    List(Vec<TaskRecord>),
    Page(TaskPage),
}

/// Reads tasks from a JSON export: either an array of tasks or a single
/// listing page (`{"docs": [...]}`).
pub struct JsonFileTaskSource {
    path: PathBuf,
}

impl JsonFileTaskSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Parses a dump, keeping records of `project` and records that carry no
    /// project at all.
    pub fn parse(json: &str, project: &str) -> Result<Vec<Task>, SourceError> {
        let records = match serde_json::from_str::<TaskDump>(json)? {
            TaskDump::List(records) => records,
            TaskDump::Page(page) => page.docs,
        };
        Ok(records
            .into_iter()
            .filter(|record| record.project.as_deref().is_none_or(|p| p == project))
            .map(Task::from)
            .collect())
    }
}

#[async_trait]
impl TaskSource for JsonFileTaskSource {
    async fn list_tasks(&self, project: &str) -> Result<Vec<Task>, SourceError> {
        let json = tokio::fs::read_to_string(&self.path).await?;
        let tasks = Self::parse(&json, project)?;
        tracing::info!(path = %self.path.display(), tasks = tasks.len(), "loaded task dump");
        Ok(tasks)
    }
}
