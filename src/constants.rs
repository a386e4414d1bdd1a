//! Shared constants used across the crate.

/// User agent sent with content API requests.
pub const USER_AGENT: &str = concat!("portfolio-content/", env!("CARGO_PKG_VERSION"));

/// Cache key and invalidation tag for the full project list.
pub const PROJECTS_CACHE_KEY: &str = "projects";
pub const PROJECTS_CACHE_TAG: &str = "projects";

/// Remote status that keeps a project out of every listing.
pub const STATUS_ON_HOLD: &str = "On Hold";

/// Remote status that marks a project as featured.
pub const STATUS_IN_PROGRESS: &str = "In Progress";

/// Extensions accepted for locally deposited thumbnails, in lookup order.
pub const THUMBNAIL_EXTENSIONS: [&str; 7] = ["webp", "png", "jpg", "jpeg", "avif", "gif", "svg"];

/// Placeholder rotation used when a project has no image of its own.
pub const DEFAULT_PLACEHOLDERS: [&str; 6] = [
    "/images/placeholders/project-1.svg",
    "/images/placeholders/project-2.svg",
    "/images/placeholders/project-3.svg",
    "/images/placeholders/project-4.svg",
    "/images/placeholders/project-5.svg",
    "/images/placeholders/project-6.svg",
];

/// Bounding box (in pixels) for blur previews.
pub const PREVIEW_SIZE: u32 = 10;

/// JPEG quality for blur previews.
pub const PREVIEW_QUALITY: u8 = 40;
