//! Tiny blurred previews for locally stored thumbnails.
//!
//! The image is shrunk to fit a [`PREVIEW_SIZE`] square, re-encoded as a
//! low quality JPEG and returned as a `data:` URL suitable for inlining.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::DynamicImage;
use tracing::debug;

use crate::constants::{PREVIEW_QUALITY, PREVIEW_SIZE};

/// Disk location of a site-rooted image path, if a preview can be made
/// for it. Remote URLs, protocol-relative URLs and SVGs yield `None`.
#[must_use]
pub fn local_source(public_dir: &Path, image_path: &str) -> Option<PathBuf> {
    if !image_path.starts_with('/') || image_path.starts_with("//") {
        return None;
    }
    let relative = image_path.trim_start_matches('/');
    let relative = relative.split(['?', '#']).next().unwrap_or(relative);
    if relative.split('/').any(|segment| segment == "..") {
        return None;
    }

    let path = public_dir.join(relative);
    let is_vector = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("svg"));
    (!is_vector).then_some(path)
}

/// Build a preview for the image at `path`, blocking the current thread.
///
/// # Errors
///
/// Returns an error if the file cannot be read, decoded or re-encoded.
pub fn encode_preview(path: &Path) -> Result<String> {
    let img = image::open(path).with_context(|| format!("Failed to decode {}", path.display()))?;
    let small = img.resize(PREVIEW_SIZE, PREVIEW_SIZE, FilterType::Triangle);
    let rgb = DynamicImage::ImageRgb8(small.to_rgb8());

    let mut jpeg = Vec::new();
    rgb.write_with_encoder(JpegEncoder::new_with_quality(&mut jpeg, PREVIEW_QUALITY))
        .context("Failed to encode preview")?;

    Ok(format!("data:image/jpeg;base64,{}", STANDARD.encode(&jpeg)))
}

/// Build a preview for a site-rooted image path, off the async runtime.
///
/// Every failure degrades to `None`.
pub async fn blur_data_url(public_dir: &Path, image_path: &str) -> Option<String> {
    let path = local_source(public_dir, image_path)?;
    let shown = path.display().to_string();

    match tokio::task::spawn_blocking(move || encode_preview(&path)).await {
        Ok(Ok(data_url)) => Some(data_url),
        Ok(Err(e)) => {
            debug!(path = %shown, error = %format!("{e:#}"), "No blur preview");
            None
        }
        Err(e) => {
            debug!(path = %shown, error = %e, "Blur preview task failed");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_local_source() {
        let public = Path::new("/srv/site/public");
        assert_eq!(
            local_source(public, "/images/projects/atlas.png"),
            Some(PathBuf::from("/srv/site/public/images/projects/atlas.png"))
        );
        assert_eq!(
            local_source(public, "/images/a.jpg?v=2"),
            Some(PathBuf::from("/srv/site/public/images/a.jpg"))
        );
        assert_eq!(local_source(public, "https://cdn.example.com/a.png"), None);
        assert_eq!(local_source(public, "//cdn.example.com/a.png"), None);
        assert_eq!(local_source(public, "/images/placeholder.svg"), None);
        assert_eq!(local_source(public, "/images/../../etc/passwd"), None);
    }

    #[test]
    fn test_encode_preview() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("wide.png");
        image::RgbaImage::from_pixel(64, 32, image::Rgba([200, 30, 30, 255]))
            .save(&path)
            .unwrap();

        let data_url = encode_preview(&path).unwrap();
        assert!(data_url.starts_with("data:image/jpeg;base64,"));

        let encoded = data_url.trim_start_matches("data:image/jpeg;base64,");
        let bytes = STANDARD.decode(encoded).unwrap();
        let decoded = image::load_from_memory(&bytes).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (10, 5));
    }

    #[test]
    fn test_encode_preview_rejects_garbage() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("broken.png");
        std::fs::write(&path, b"not an image").unwrap();
        assert!(encode_preview(&path).is_err());
    }

    #[tokio::test]
    async fn test_blur_data_url_missing_file() {
        let dir = tempfile::TempDir::new().unwrap();
        assert_eq!(blur_data_url(dir.path(), "/images/missing.png").await, None);
    }

    #[tokio::test]
    async fn test_blur_data_url_from_public_dir() {
        let dir = tempfile::TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join("images")).unwrap();
        image::RgbImage::from_pixel(20, 20, image::Rgb([10, 120, 200]))
            .save(dir.path().join("images/atlas.png"))
            .unwrap();
        std::fs::write(dir.path().join("images/broken.png"), b"garbage").unwrap();

        let url = blur_data_url(dir.path(), "/images/atlas.png").await.unwrap();
        assert!(url.starts_with("data:image/jpeg;base64,"));
        assert_eq!(blur_data_url(dir.path(), "/images/broken.png").await, None);
    }
}
