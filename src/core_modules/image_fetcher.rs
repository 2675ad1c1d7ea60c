// THEORY:
// The fetcher downloads a task image and decodes it into an RGB pixel grid.
// Every check works on that grid, so a task's image is fetched exactly once.

use crate::error::{FetchFailure, ImageFetchError};
use async_trait::async_trait;
use image::RgbImage;

/// Anything that can turn an image URL into a decoded RGB image.
#[async_trait]
pub trait ImageFetcher: Send + Sync {
    async fn fetch_and_decode(&self, url: &str) -> Result<RgbImage, ImageFetchError>;
}

/// Fetches over HTTP(S), or from disk for `file://` URLs. No retries, no caching.
#[derive(Debug, Clone, Default)]
pub struct HttpImageFetcher {
    client: reqwest::Client,
}

impl HttpImageFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reuse an existing client (shares its connection pool).
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }

    async fn fetch_bytes(&self, url: &str) -> Result<Vec<u8>, FetchFailure> {
        if let Some(path) = url.strip_prefix("file://") {
            return Ok(tokio::fs::read(path).await?);
        }

        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchFailure::Status(status.as_u16()));
        }
        Ok(response.bytes().await?.to_vec())
    }
}

#[async_trait]
impl ImageFetcher for HttpImageFetcher {
    async fn fetch_and_decode(&self, url: &str) -> Result<RgbImage, ImageFetchError> {
        let bytes = self
            .fetch_bytes(url)
            .await
            .map_err(|source| ImageFetchError::Fetch {
                url: url.to_string(),
                source,
            })?;
        tracing::debug!(url, bytes = bytes.len(), "fetched image");
        decode(url, &bytes)
    }
}

/// Decodes encoded image bytes (PNG, JPEG, ...) into 8-bit RGB.
pub fn decode(url: &str, bytes: &[u8]) -> Result<RgbImage, ImageFetchError> {
    image::load_from_memory(bytes)
        .map(|decoded| decoded.to_rgb8())
        .map_err(|source| ImageFetchError::Decode {
            url: url.to_string(),
            source,
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use std::io::Cursor;

    fn png_bytes(image: &RgbImage) -> Vec<u8> {
        let mut bytes = Vec::new();
        image
            .write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png)
            .expect("Error encoding PNG.");
        bytes
    }

    #[test]
    fn decodes_png_into_rgb() {
        let image = RgbImage::from_fn(3, 2, |x, y| image::Rgb([x as u8 * 10, y as u8 * 20, 7]));
        let decoded = decode("memory", &png_bytes(&image)).expect("valid png");

        assert_eq!(decoded.dimensions(), (3, 2));
        assert_eq!(decoded, image);
    }

    #[test]
    fn garbage_bytes_are_a_decode_error() {
        assert_matches!(
            decode("memory", b"definitely not an image"),
            Err(ImageFetchError::Decode { .. })
        );
    }

    #[tokio::test]
    async fn reads_file_urls_from_disk() {
        let image = RgbImage::from_pixel(4, 4, image::Rgb([67, 133, 255]));
        let path = std::env::temp_dir().join(format!("annotation_qa_fetch_{}.png", std::process::id()));
        std::fs::write(&path, png_bytes(&image)).expect("Error writing file.");

        let fetcher = HttpImageFetcher::new();
        let decoded = fetcher
            .fetch_and_decode(&format!("file://{}", path.display()))
            .await
            .expect("readable image");
        std::fs::remove_file(&path).ok();

        assert_eq!(decoded, image);
    }

    #[tokio::test]
    async fn missing_file_is_a_fetch_error() {
        let fetcher = HttpImageFetcher::new();
        let result = fetcher
            .fetch_and_decode("file:///nonexistent/annotation_qa/missing.png")
            .await;

        assert_matches!(
            result,
            Err(ImageFetchError::Fetch {
                source: FetchFailure::Io(_),
                ..
            })
        );
    }
}
