//! Portfolio project content.
//!
//! Resolves the project list and project detail pages for a portfolio site:
//! records come from a Notion database when it is reachable and from local
//! markdown files otherwise, with thumbnails and blur previews attached and
//! the list cached for a fixed window.

pub mod cache;
pub mod config;
pub mod constants;
pub mod error;
pub mod local;
pub mod notion;
pub mod project;
pub mod resolver;
pub mod source;
pub mod thumbnail;

pub use error::{ContentError, Result};
pub use project::{ProjectDetail, ProjectLinks, ProjectRecord};
pub use resolver::ContentResolver;
pub use source::ProjectSource;
