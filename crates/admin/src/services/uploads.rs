//! Product image uploads.
//!
//! Images are written under the media directory and served back from
//! `/media` by the admin server. Paths are `products/{unix_millis}-{token}.{ext}`.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use rand::{Rng, distr::Alphanumeric};
use serde::Serialize;
use thiserror::Error;
use tracing::info;

/// Largest accepted image, in bytes.
pub const MAX_IMAGE_BYTES: usize = 5 * 1024 * 1024;

const TOKEN_LEN: usize = 8;
const MAX_EXTENSION_LEN: usize = 10;

#[derive(Debug, Error)]
pub enum UploadError {
    #[error("Please select an image file")]
    NotAnImage,

    #[error("Image size must be less than 5MB")]
    TooLarge,

    #[error("No file was uploaded")]
    MissingFile,

    #[error("failed to store image: {0}")]
    Io(#[from] std::io::Error),
}

/// Where an image ended up: `path` relative to the media directory and the
/// public `url`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StoredImage {
    pub path: String,
    pub url: String,
}

/// Reject anything that is not an `image/*` upload of at most
/// [`MAX_IMAGE_BYTES`].
///
/// # Errors
///
/// Returns `UploadError::NotAnImage` or `UploadError::TooLarge`.
pub fn validate_image(content_type: Option<&str>, len: usize) -> Result<(), UploadError> {
    let is_image = content_type.is_some_and(|ct| {
        ct.get(..6)
            .is_some_and(|prefix| prefix.eq_ignore_ascii_case("image/"))
    });
    if !is_image {
        return Err(UploadError::NotAnImage);
    }
    if len > MAX_IMAGE_BYTES {
        return Err(UploadError::TooLarge);
    }
    Ok(())
}

/// File extension for the stored image: the uploaded file's own extension
/// when it is sane, otherwise derived from the content type.
#[must_use]
pub fn extension_for(file_name: Option<&str>, content_type: &str) -> String {
    let from_name = file_name
        .and_then(|name| Path::new(name).extension())
        .and_then(|ext| ext.to_str())
        .filter(|ext| is_sane_extension(ext));
    if let Some(ext) = from_name {
        return ext.to_ascii_lowercase();
    }

    let subtype = content_type
        .split_once('/')
        .map_or("", |(_, subtype)| subtype);
    let subtype = subtype
        .split(['+', ';'])
        .next()
        .unwrap_or_default()
        .trim();
    match subtype.to_ascii_lowercase().as_str() {
        "jpeg" | "pjpeg" => "jpg".to_owned(),
        other if is_sane_extension(other) => other.to_owned(),
        _ => "img".to_owned(),
    }
}

fn is_sane_extension(ext: &str) -> bool {
    !ext.is_empty()
        && ext.len() <= MAX_EXTENSION_LEN
        && ext.chars().all(|c| c.is_ascii_alphanumeric())
}

/// Relative storage path for a new product image.
#[must_use]
pub fn image_path(now: DateTime<Utc>, rng: &mut impl Rng, extension: &str) -> String {
    let token: String = rng
        .sample_iter(Alphanumeric)
        .take(TOKEN_LEN)
        .map(|b| char::from(b).to_ascii_lowercase())
        .collect();
    format!("products/{}-{token}.{extension}", now.timestamp_millis())
}

/// Local-disk image storage rooted at the media directory.
#[derive(Debug, Clone)]
pub struct ImageStore {
    root: PathBuf,
    base_url: String,
}

impl ImageStore {
    #[must_use]
    pub fn new(root: impl Into<PathBuf>, base_url: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            base_url: base_url.into().trim_end_matches('/').to_owned(),
        }
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Public URL for a path relative to the media directory.
    #[must_use]
    pub fn url_for(&self, relative: &str) -> String {
        format!("{}/{}", self.base_url, relative.trim_start_matches('/'))
    }

    /// Validate and write an uploaded product image.
    ///
    /// # Errors
    ///
    /// Returns a validation error from [`validate_image`], or
    /// `UploadError::Io` if the file cannot be written.
    pub async fn save_product_image(
        &self,
        file_name: Option<&str>,
        content_type: Option<&str>,
        bytes: &[u8],
    ) -> Result<StoredImage, UploadError> {
        validate_image(content_type, bytes.len())?;

        let extension = extension_for(file_name, content_type.unwrap_or_default());
        let path = image_path(Utc::now(), &mut rand::rng(), &extension);
        let target = self.root.join(&path);

        if let Some(parent) = target.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&target, bytes).await?;

        info!(path = %path, bytes = bytes.len(), "Stored product image");

        Ok(StoredImage {
            url: self.url_for(&path),
            path,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rand::{SeedableRng, rngs::StdRng};

    #[test]
    fn test_rejects_non_images() {
        assert!(matches!(
            validate_image(Some("application/pdf"), 10),
            Err(UploadError::NotAnImage)
        ));
        assert!(matches!(
            validate_image(None, 10),
            Err(UploadError::NotAnImage)
        ));
        assert!(validate_image(Some("image/png"), 10).is_ok());
        assert!(validate_image(Some("IMAGE/JPEG"), 10).is_ok());
    }

    #[test]
    fn test_size_limit_is_inclusive() {
        assert!(validate_image(Some("image/png"), MAX_IMAGE_BYTES).is_ok());
        let err = validate_image(Some("image/png"), MAX_IMAGE_BYTES + 1).unwrap_err();
        assert_eq!(err.to_string(), "Image size must be less than 5MB");
    }

    #[test]
    fn test_extension_prefers_file_name() {
        assert_eq!(extension_for(Some("Sneaker.PNG"), "image/jpeg"), "png");
        assert_eq!(extension_for(Some("noext"), "image/jpeg"), "jpg");
        assert_eq!(extension_for(None, "image/svg+xml"), "svg");
        assert_eq!(extension_for(Some("x.p!g"), "image/webp"), "webp");
        assert_eq!(extension_for(None, "image/"), "img");
    }

    #[test]
    fn test_image_path_shape() {
        let now = Utc.with_ymd_and_hms(2026, 3, 1, 0, 0, 0).unwrap();
        let mut rng = StdRng::seed_from_u64(7);
        let path = image_path(now, &mut rng, "png");

        let rest = path.strip_prefix("products/").unwrap();
        let (millis, tail) = rest.split_once('-').unwrap();
        assert_eq!(millis, now.timestamp_millis().to_string());
        let (token, ext) = tail.split_once('.').unwrap();
        assert_eq!(token.len(), TOKEN_LEN);
        assert!(token.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit()));
        assert_eq!(ext, "png");
    }

    #[tokio::test]
    async fn test_save_writes_under_media_dir() {
        let dir = tempfile::tempdir().unwrap();
        let store = ImageStore::new(dir.path(), "http://localhost:3001/media/");

        let stored = store
            .save_product_image(Some("shoe.webp"), Some("image/webp"), b"RIFF....WEBP")
            .await
            .unwrap();

        assert!(stored.path.starts_with("products/"));
        assert!(stored.path.ends_with(".webp"));
        assert_eq!(stored.url, format!("http://localhost:3001/media/{}", stored.path));
        let written = tokio::fs::read(dir.path().join(&stored.path)).await.unwrap();
        assert_eq!(written, b"RIFF....WEBP");
    }

    #[test]
    fn test_url_for_joins_cleanly() {
        let store = ImageStore::new("/srv/media", "https://admin.slick.ph/media/");
        assert_eq!(
            store.url_for("/products/x.jpg"),
            "https://admin.slick.ph/media/products/x.jpg"
        );
    }

    #[tokio::test]
    async fn test_rejected_upload_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let store = ImageStore::new(dir.path(), "http://localhost:3001/media");

        let result = store
            .save_product_image(Some("notes.txt"), Some("text/plain"), b"hello")
            .await;

        assert!(matches!(result, Err(UploadError::NotAnImage)));
        assert!(!dir.path().join("products").exists());
    }
}
