//! Entry point for page rendering code.
//!
//! The remote database is always tried first. Any failure there is logged
//! and answered from the local store instead, so listing pages keep working
//! through remote outages. Project lists are cached for the configured
//! window or until their tag is invalidated.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};

use crate::cache::TagCache;
use crate::config::Config;
use crate::constants::{PROJECTS_CACHE_KEY, PROJECTS_CACHE_TAG};
use crate::error::{ContentError, Result};
use crate::local::LocalContentStore;
use crate::notion::NotionClient;
use crate::project::{ProjectDetail, ProjectRecord};
use crate::source::ProjectSource;
use crate::thumbnail::{ThumbnailResolver, ThumbnailSettings};

pub struct ContentResolver {
    remote: Option<Arc<dyn ProjectSource>>,
    local: Arc<dyn ProjectSource>,
    thumbnails: ThumbnailResolver,
    cache: TagCache<Vec<ProjectRecord>>,
}

impl ContentResolver {
    /// Build a resolver from explicit parts. `remote` may be `None`, in which
    /// case every call is answered from `local`.
    #[must_use]
    pub fn new(
        remote: Option<Arc<dyn ProjectSource>>,
        local: Arc<dyn ProjectSource>,
        thumbnails: ThumbnailResolver,
        cache_window: Duration,
    ) -> Self {
        Self {
            remote,
            local,
            thumbnails,
            cache: TagCache::new(cache_window),
        }
    }

    /// Build a resolver wired to Notion (when configured) and the local
    /// content directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the Notion HTTP client cannot be built.
    pub fn from_config(config: &Config) -> Result<Self> {
        let remote = match &config.notion {
            Some(notion) => {
                Some(Arc::new(NotionClient::new(notion.clone())?) as Arc<dyn ProjectSource>)
            }
            None => None,
        };
        let local = Arc::new(LocalContentStore::new(&config.content_dir));
        let thumbnails = ThumbnailResolver::new(ThumbnailSettings::from_config(config));

        Ok(Self::new(remote, local, thumbnails, config.cache_window))
    }

    /// All listable projects, with thumbnails assigned.
    ///
    /// Served from cache while the cached list is valid.
    ///
    /// # Errors
    ///
    /// Only returns an error when the local store also fails after a remote
    /// failure (or when no remote is configured).
    pub async fn get_all_projects(&self) -> Result<Vec<ProjectRecord>> {
        self.cache
            .get_or_try_insert_with(PROJECTS_CACHE_KEY, &[PROJECTS_CACHE_TAG], || async {
                let projects = self.fetch_project_list().await?;
                Ok::<_, ContentError>(self.thumbnails.assign_all(&projects).await)
            })
            .await
    }

    /// Projects flagged as featured, in listing order.
    ///
    /// # Errors
    ///
    /// Same as [`ContentResolver::get_all_projects`].
    pub async fn get_featured_projects(&self) -> Result<Vec<ProjectRecord>> {
        Ok(self
            .get_all_projects()
            .await?
            .into_iter()
            .filter(|p| p.featured)
            .collect())
    }

    /// One project for its detail page. Not cached.
    ///
    /// A remote "no such project" is final and does not consult the local
    /// store; only remote failures fall back. Local not-found and malformed
    /// files both come back as `None`.
    ///
    /// # Errors
    ///
    /// Returns an error only when the local store fails for a reason other
    /// than a missing or malformed file.
    pub async fn get_project_by_slug(&self, slug: &str) -> Result<Option<ProjectDetail>> {
        let detail = match &self.remote {
            Some(remote) => match remote.get_by_slug(slug).await {
                Ok(found) => found,
                Err(e) => {
                    warn!(
                        source = remote.name(),
                        slug = %slug,
                        error = %e,
                        "Remote project lookup failed, falling back to local content"
                    );
                    self.local_detail(slug).await?
                }
            },
            None => self.local_detail(slug).await?,
        };

        let Some(mut detail) = detail else {
            return Ok(None);
        };
        let index = self.cached_position(slug).unwrap_or(0);
        detail.project = self.thumbnails.assign(&detail.project, index).await;
        Ok(Some(detail))
    }

    /// Slugs of every detail page that should exist.
    ///
    /// # Errors
    ///
    /// Same as [`ContentResolver::get_all_projects`].
    pub async fn get_all_slugs(&self) -> Result<Vec<String>> {
        if let Some(remote) = &self.remote {
            match remote.list_slugs().await {
                Ok(slugs) => return Ok(slugs),
                Err(e) => {
                    warn!(
                        source = remote.name(),
                        error = %e,
                        "Remote slug listing failed, falling back to local content"
                    );
                }
            }
        }
        self.local.list_slugs().await
    }

    /// Force cached entries carrying `tag` to be refetched on next access.
    pub fn invalidate(&self, tag: &str) -> usize {
        self.cache.invalidate_tag(tag)
    }

    async fn fetch_project_list(&self) -> Result<Vec<ProjectRecord>> {
        if let Some(remote) = &self.remote {
            match remote.list_all().await {
                Ok(projects) => return Ok(projects),
                Err(e) => {
                    warn!(
                        source = remote.name(),
                        error = %e,
                        "Remote project listing failed, falling back to local content"
                    );
                }
            }
        }
        self.local.list_all().await
    }

    async fn local_detail(&self, slug: &str) -> Result<Option<ProjectDetail>> {
        match self.local.get_by_slug(slug).await {
            Ok(found) => Ok(found),
            Err(ContentError::FrontMatter { path, message }) => {
                warn!(slug = %slug, path = %path.display(), error = %message, "Local project file is malformed");
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    fn cached_position(&self, slug: &str) -> Option<usize> {
        let projects = self.cache.get(PROJECTS_CACHE_KEY)?;
        let position = projects.iter().position(|p| p.slug == slug);
        debug!(slug = %slug, ?position, "Placeholder index from cached listing");
        position
    }
}

impl std::fmt::Debug for ContentResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContentResolver")
            .field("remote", &self.remote.as_ref().map(|r| r.name()))
            .field("local", &self.local.name())
            .field("cache", &self.cache)
            .finish_non_exhaustive()
    }
}
