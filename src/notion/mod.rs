//! Client for the hosted project database (Notion REST API).
//!
//! Queries are paginated strictly in sequence: each page's cursor is read
//! before the next request goes out. Failures are returned as-is; falling
//! back to local content is the resolver's job.

pub mod mapping;
pub mod markdown;
pub mod types;

use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, info};

use crate::config::NotionConfig;
use crate::constants::USER_AGENT;
use crate::error::{ContentError, Result};
use crate::project::{ProjectDetail, ProjectRecord};
use crate::source::ProjectSource;

use mapping::{base_filter, fields, page_slug, page_to_project, slug_filter};
use types::{Block, ErrorResponse, ListResponse, Page, QueryRequest, RawBlock, Sort, SortDirection};

/// Maximum page size accepted by the block children endpoint.
const BLOCK_PAGE_SIZE: u32 = 100;

/// Reads projects from a Notion database.
#[derive(Clone)]
pub struct NotionClient {
    http: Client,
    config: NotionConfig,
}

impl NotionClient {
    /// Create a client for the configured database.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: NotionConfig) -> Result<Self> {
        let http = Client::builder()
            .timeout(config.timeout)
            .user_agent(USER_AGENT)
            .build()?;
        Ok(Self { http, config })
    }

    /// Every public project that is not on hold, ascending by year.
    ///
    /// Rows without a slug are kept with an empty slug.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failures, non-2xx responses or
    /// malformed JSON.
    pub async fn list_all(&self) -> Result<Vec<ProjectRecord>> {
        let pages = self.query_all(&base_filter(self.config.status_type)).await?;
        let projects: Vec<ProjectRecord> = pages.iter().map(page_to_project).collect();
        info!(count = projects.len(), "Fetched projects from Notion");
        Ok(projects)
    }

    /// Slugs of every listable project. Rows without a slug are dropped.
    ///
    /// # Errors
    ///
    /// Same as [`NotionClient::list_all`].
    pub async fn list_slugs(&self) -> Result<Vec<String>> {
        let pages = self.query_all(&base_filter(self.config.status_type)).await?;
        Ok(pages.iter().filter_map(page_slug).collect())
    }

    /// One project with its rendered body, or `None` if no listable row has
    /// this slug.
    ///
    /// # Errors
    ///
    /// Same as [`NotionClient::list_all`], for both the row query and the
    /// block tree fetch.
    pub async fn get_by_slug(&self, slug: &str) -> Result<Option<ProjectDetail>> {
        let filter = slug_filter(slug, self.config.status_type);
        let response: ListResponse<Page> = self.query_database(&filter, None, 1).await?;
        let Some(page) = response.results.into_iter().next() else {
            debug!(slug = %slug, "No Notion row for slug");
            return Ok(None);
        };

        let blocks = self.fetch_block_tree(&page.id).await?;
        let content = markdown::render_blocks(&blocks);

        Ok(Some(ProjectDetail {
            project: page_to_project(&page),
            content: content.trim_end().to_string(),
        }))
    }

    /// Issue one query request.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failures, non-2xx responses or
    /// malformed JSON.
    pub async fn query_database(
        &self,
        filter: &Value,
        start_cursor: Option<String>,
        page_size: u32,
    ) -> Result<ListResponse<Page>> {
        let url = format!(
            "{}/v1/databases/{}/query",
            self.api_base(),
            self.config.database_id
        );
        let body = QueryRequest {
            filter: filter.clone(),
            sorts: vec![Sort {
                property: fields::YEAR.to_string(),
                direction: SortDirection::Ascending,
            }],
            start_cursor,
            page_size,
        };

        debug!(url = %url, cursor = ?body.start_cursor, "Querying Notion database");
        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.config.api_key)
            .header("Notion-Version", &self.config.notion_version)
            .json(&body)
            .send()
            .await?;

        decode_response(response, "database query").await
    }

    /// Follow query cursors until the result set is exhausted.
    async fn query_all(&self, filter: &Value) -> Result<Vec<Page>> {
        let mut pages = Vec::new();
        let mut cursor = None;

        loop {
            let response = self
                .query_database(filter, cursor.take(), self.config.page_size)
                .await?;
            pages.extend(response.results);

            match response.next_cursor {
                Some(next) if response.has_more => cursor = Some(next),
                _ => break,
            }
        }

        Ok(pages)
    }

    /// Fetch the full block tree under `block_id`, depth first.
    async fn fetch_block_tree(&self, block_id: &str) -> Result<Vec<Block>> {
        // Async recursion needs boxing; walk the tree with an explicit stack
        // of index paths into `root` instead.
        let mut root = self.fetch_children(block_id).await?;
        let mut pending: Vec<Vec<usize>> = (0..root.len())
            .filter(|&i| root[i].has_children)
            .map(|i| vec![i])
            .collect();

        while let Some(path) = pending.pop() {
            let Some(block) = block_at_mut(&mut root, &path) else {
                continue;
            };
            let children = self.fetch_children(&block.id).await?;
            for (i, child) in children.iter().enumerate() {
                if child.has_children {
                    let mut child_path = path.clone();
                    child_path.push(i);
                    pending.push(child_path);
                }
            }
            block.children = children;
        }

        Ok(root)
    }

    /// Fetch the direct children of one block, following pagination.
    async fn fetch_children(&self, block_id: &str) -> Result<Vec<Block>> {
        let url = format!("{}/v1/blocks/{block_id}/children", self.api_base());
        let mut blocks = Vec::new();
        let mut cursor: Option<String> = None;

        loop {
            let mut request = self
                .http
                .get(&url)
                .bearer_auth(&self.config.api_key)
                .header("Notion-Version", &self.config.notion_version)
                .query(&[("page_size", BLOCK_PAGE_SIZE.to_string())]);
            if let Some(start) = cursor.take() {
                request = request.query(&[("start_cursor", start)]);
            }

            let response: ListResponse<RawBlock> =
                decode_response(request.send().await?, "block children").await?;
            for raw in response.results {
                let kind = raw.kind.clone();
                let block = Block::try_from(raw).map_err(|source| ContentError::Decode {
                    context: format!("{kind} block"),
                    source,
                })?;
                blocks.push(block);
            }

            match response.next_cursor {
                Some(next) if response.has_more => cursor = Some(next),
                _ => break,
            }
        }

        Ok(blocks)
    }

    fn api_base(&self) -> &str {
        self.config.api_base.trim_end_matches('/')
    }
}

fn block_at_mut<'a>(blocks: &'a mut [Block], path: &[usize]) -> Option<&'a mut Block> {
    let (first, rest) = path.split_first()?;
    let mut block = blocks.get_mut(*first)?;
    for &i in rest {
        block = block.children.get_mut(i)?;
    }
    Some(block)
}

/// Turn a response into `T`, or into [`ContentError::Remote`] for non-2xx.
async fn decode_response<T: DeserializeOwned>(response: Response, context: &str) -> Result<T> {
    let status = response.status();
    let body = response.text().await?;

    if !status.is_success() {
        let (code, message) = match serde_json::from_str::<ErrorResponse>(&body) {
            Ok(err) => (err.code, err.message),
            Err(_) => ("unknown".to_string(), body),
        };
        return Err(ContentError::Remote {
            status: status.as_u16(),
            code,
            message,
        });
    }

    serde_json::from_str(&body).map_err(|source| ContentError::Decode {
        context: context.to_string(),
        source,
    })
}

#[async_trait]
impl ProjectSource for NotionClient {
    fn name(&self) -> &'static str {
        "notion"
    }

    async fn list_all(&self) -> Result<Vec<ProjectRecord>> {
        NotionClient::list_all(self).await
    }

    async fn get_by_slug(&self, slug: &str) -> Result<Option<ProjectDetail>> {
        NotionClient::get_by_slug(self, slug).await
    }

    async fn list_slugs(&self) -> Result<Vec<String>> {
        NotionClient::list_slugs(self).await
    }
}

impl std::fmt::Debug for NotionClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NotionClient")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
