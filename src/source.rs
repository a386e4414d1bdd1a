use async_trait::async_trait;

use crate::error::Result;
use crate::project::{ProjectDetail, ProjectRecord};

/// A place project records can be read from.
#[async_trait]
pub trait ProjectSource: Send + Sync {
    /// Short identifier used in logs.
    fn name(&self) -> &'static str;

    /// Every listable project, sorted ascending by year.
    ///
    /// # Errors
    ///
    /// Returns an error if the source cannot be read.
    async fn list_all(&self) -> Result<Vec<ProjectRecord>>;

    /// A single project with its body, or `None` when the source has no
    /// project with that slug.
    ///
    /// # Errors
    ///
    /// Returns an error if the source cannot be read or the record is malformed.
    async fn get_by_slug(&self, slug: &str) -> Result<Option<ProjectDetail>>;

    /// Slugs of every listable project.
    ///
    /// # Errors
    ///
    /// Returns an error if the source cannot be read.
    async fn list_slugs(&self) -> Result<Vec<String>> {
        Ok(self
            .list_all()
            .await?
            .into_iter()
            .map(|p| p.slug)
            .filter(|slug| !slug.is_empty())
            .collect())
    }
}
