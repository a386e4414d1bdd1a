//! Picks one display image per project.
//!
//! Sources are tried in [`ThumbnailSource::PRIORITY`] order and the first
//! one that yields an image wins. Placeholders depend only on the project's
//! position in its list, so a given ordering always maps to the same images.

pub mod preview;

use std::path::PathBuf;

use futures_util::future::join_all;
use tracing::debug;

use crate::config::Config;
use crate::constants::{DEFAULT_PLACEHOLDERS, THUMBNAIL_EXTENSIONS};
use crate::project::ProjectRecord;

/// Where a thumbnail came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThumbnailSource {
    /// Declared on the record itself.
    Explicit,
    /// `{slug}.{ext}` found in the thumbnail directory.
    LocalFile,
    /// Rotating placeholder.
    Placeholder,
}

impl ThumbnailSource {
    pub const PRIORITY: [ThumbnailSource; 3] = [
        ThumbnailSource::Explicit,
        ThumbnailSource::LocalFile,
        ThumbnailSource::Placeholder,
    ];
}

/// The image chosen for a project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThumbnailAssignment {
    pub source: ThumbnailSource,
    pub path: String,
    pub blur_data_url: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ThumbnailSettings {
    /// Directory holding `{slug}.{ext}` thumbnails.
    pub thumbnail_dir: PathBuf,
    /// URL prefix under which `thumbnail_dir` is served.
    pub url_prefix: String,
    /// Directory served at the site root, used to locate files for previews.
    pub public_dir: PathBuf,
    pub placeholders: Vec<String>,
    pub blur_previews: bool,
}

impl ThumbnailSettings {
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        Self {
            thumbnail_dir: config.thumbnail_dir.clone(),
            url_prefix: config.thumbnail_url_prefix.clone(),
            public_dir: config.public_dir.clone(),
            placeholders: DEFAULT_PLACEHOLDERS.iter().map(|p| (*p).to_string()).collect(),
            blur_previews: config.blur_previews,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ThumbnailResolver {
    settings: ThumbnailSettings,
}

impl ThumbnailResolver {
    #[must_use]
    pub fn new(settings: ThumbnailSettings) -> Self {
        Self { settings }
    }

    #[must_use]
    pub fn settings(&self) -> &ThumbnailSettings {
        &self.settings
    }

    /// Choose the image for `project` at list position `index`.
    ///
    /// Returns `None` only when nothing matches and there are no placeholders.
    pub async fn resolve(&self, project: &ProjectRecord, index: usize) -> Option<ThumbnailAssignment> {
        for source in ThumbnailSource::PRIORITY {
            let Some(path) = self.attempt(source, project, index).await else {
                continue;
            };

            let blur_data_url = if self.settings.blur_previews {
                preview::blur_data_url(&self.settings.public_dir, &path).await
            } else {
                None
            };
            debug!(slug = %project.slug, ?source, path = %path, "Assigned thumbnail");
            return Some(ThumbnailAssignment {
                source,
                path,
                blur_data_url,
            });
        }
        None
    }

    async fn attempt(
        &self,
        source: ThumbnailSource,
        project: &ProjectRecord,
        index: usize,
    ) -> Option<String> {
        match source {
            ThumbnailSource::Explicit => project
                .thumbnail
                .as_deref()
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .map(str::to_string),
            ThumbnailSource::LocalFile => self.local_file(&project.slug).await,
            ThumbnailSource::Placeholder => self.placeholder(index),
        }
    }

    /// First `{slug}.{ext}` that exists, in extension precedence order.
    async fn local_file(&self, slug: &str) -> Option<String> {
        if slug.is_empty() || slug.contains(['/', '\\']) || slug == ".." {
            return None;
        }
        for ext in THUMBNAIL_EXTENSIONS {
            let file_name = format!("{slug}.{ext}");
            let path = self.settings.thumbnail_dir.join(&file_name);
            if tokio::fs::try_exists(&path).await.unwrap_or(false) {
                let prefix = self.settings.url_prefix.trim_end_matches('/');
                return Some(format!("{prefix}/{file_name}"));
            }
        }
        None
    }

    fn placeholder(&self, index: usize) -> Option<String> {
        let placeholders = &self.settings.placeholders;
        if placeholders.is_empty() {
            return None;
        }
        placeholders.get(index % placeholders.len()).cloned()
    }

    /// Copy of `project` with its thumbnail (and preview) assigned.
    pub async fn assign(&self, project: &ProjectRecord, index: usize) -> ProjectRecord {
        let mut assigned = project.clone();
        if let Some(thumbnail) = self.resolve(project, index).await {
            assigned.thumbnail = Some(thumbnail.path);
            assigned.blur_data_url = thumbnail.blur_data_url;
        }
        assigned
    }

    /// Assign thumbnails to a whole list; records are resolved concurrently.
    pub async fn assign_all(&self, projects: &[ProjectRecord]) -> Vec<ProjectRecord> {
        join_all(
            projects
                .iter()
                .enumerate()
                .map(|(index, project)| self.assign(project, index)),
        )
        .await
    }
}
