// Media store HTTP client
//
// The provider accepts signed multipart uploads and signed JSON deletes:
//
//   POST {base}/{cloud}/upload            multipart: file, api_key, timestamp, signature
//   POST {base}/{cloud}/{kind}/delete     json: {public_ids, api_key, timestamp, signature}
//
// Signatures are SHA-256 over "timestamp=<ts><api_secret>". Uploads return
// {url, public_id, duration?}; duration is present for video assets only.

use reqwest::multipart::{Form, Part};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::path::Path;

use crate::error::{MediaError, Result};

/// Stored media asset, as reported by the provider at upload time.
#[derive(Debug, Clone, Deserialize)]
pub struct MediaAsset {
    pub url: String,
    pub public_id: String,
    pub duration: Option<f64>,
}

/// Asset kind, used to address the provider's delete endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Image,
    Video,
}

impl MediaKind {
    fn as_str(self) -> &'static str {
        match self {
            MediaKind::Image => "image",
            MediaKind::Video => "video",
        }
    }
}

/// Media store configuration
#[derive(Debug, Clone)]
pub struct MediaConfig {
    /// Provider base URL
    pub base_url: String,
    /// Account namespace at the provider
    pub cloud_name: String,
    pub api_key: String,
    pub api_secret: String,
}

impl MediaConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        let base_url = std::env::var("MEDIA_BASE_URL")
            .map_err(|_| MediaError::config("MEDIA_BASE_URL not set"))?;
        let cloud_name = std::env::var("MEDIA_CLOUD_NAME")
            .map_err(|_| MediaError::config("MEDIA_CLOUD_NAME not set"))?;
        let api_key = std::env::var("MEDIA_API_KEY")
            .map_err(|_| MediaError::config("MEDIA_API_KEY not set"))?;
        let api_secret = std::env::var("MEDIA_API_SECRET")
            .map_err(|_| MediaError::config("MEDIA_API_SECRET not set"))?;

        Ok(Self {
            base_url,
            cloud_name,
            api_key,
            api_secret,
        })
    }
}

#[derive(Debug, Serialize)]
struct DeleteRequest<'a> {
    public_ids: &'a [String],
    api_key: &'a str,
    timestamp: i64,
    signature: String,
}

#[derive(Debug, Deserialize)]
struct DeleteResponse {
    deleted: u64,
}

/// Client for the external media store.
#[derive(Clone)]
pub struct MediaClient {
    client: Client,
    config: MediaConfig,
}

impl MediaClient {
    pub fn new(config: MediaConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    /// Create a client from environment variables.
    pub fn from_env() -> Result<Self> {
        Ok(Self::new(MediaConfig::from_env()?))
    }

    fn sign(&self, timestamp: i64) -> String {
        let payload = format!("timestamp={}{}", timestamp, self.config.api_secret);
        hex::encode(Sha256::digest(payload.as_bytes()))
    }

    /// Upload a locally staged file. The local file is left in place; callers
    /// that stage files should go through [`MediaClient::upload_staged`].
    pub async fn upload(&self, local_path: &Path) -> Result<MediaAsset> {
        let bytes = tokio::fs::read(local_path).await?;
        let file_name = local_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload.bin".to_string());

        let timestamp = chrono::Utc::now().timestamp();
        let form = Form::new()
            .text("api_key", self.config.api_key.clone())
            .text("timestamp", timestamp.to_string())
            .text("signature", self.sign(timestamp))
            .part("file", Part::bytes(bytes).file_name(file_name));

        let url = format!("{}/{}/upload", self.config.base_url, self.config.cloud_name);
        let response = self.client.post(&url).multipart(form).send().await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(MediaError::Provider {
                status: status.as_u16(),
                message,
            });
        }

        let asset: MediaAsset = response
            .json()
            .await
            .map_err(|e| MediaError::InvalidResponse(e.to_string()))?;

        tracing::debug!(public_id = %asset.public_id, "Uploaded media asset");
        Ok(asset)
    }

    /// Upload a staged file, always removing the local copy afterwards.
    /// A failed upload removes the staged file before surfacing the failure.
    pub async fn upload_staged(&self, local_path: &Path) -> Result<MediaAsset> {
        let result = self.upload(local_path).await;
        if let Err(e) = tokio::fs::remove_file(local_path).await {
            tracing::warn!(path = %local_path.display(), "Failed to remove staged file: {}", e);
        }
        result
    }

    /// Delete stored assets by public id. Returns the provider's deleted count.
    pub async fn delete(&self, public_ids: &[String], kind: MediaKind) -> Result<u64> {
        if public_ids.is_empty() {
            return Ok(0);
        }

        let timestamp = chrono::Utc::now().timestamp();
        let body = DeleteRequest {
            public_ids,
            api_key: &self.config.api_key,
            timestamp,
            signature: self.sign(timestamp),
        };

        let url = format!(
            "{}/{}/{}/delete",
            self.config.base_url,
            self.config.cloud_name,
            kind.as_str()
        );
        let response = self.client.post(&url).json(&body).send().await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(MediaError::Provider {
                status: status.as_u16(),
                message,
            });
        }

        let ack: DeleteResponse = response
            .json()
            .await
            .map_err(|e| MediaError::InvalidResponse(e.to_string()))?;

        Ok(ack.deleted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_client(base_url: &str) -> MediaClient {
        MediaClient::new(MediaConfig {
            base_url: base_url.to_string(),
            cloud_name: "testcloud".to_string(),
            api_key: "key".to_string(),
            api_secret: "secret".to_string(),
        })
    }

    fn staged_file(dir: &tempfile::TempDir, name: &str) -> std::path::PathBuf {
        let path = dir.path().join(name);
        let mut f = std::fs::File::create(&path).unwrap();
        f.write_all(b"fake media bytes").unwrap();
        path
    }

    #[tokio::test]
    async fn test_upload_parses_asset() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/testcloud/upload"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "url": "https://cdn.example/clip.mp4",
                "public_id": "clips/abc123",
                "duration": 42.5
            })))
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let file = staged_file(&dir, "clip.mp4");

        let asset = test_client(&server.uri()).upload(&file).await.unwrap();
        assert_eq!(asset.url, "https://cdn.example/clip.mp4");
        assert_eq!(asset.public_id, "clips/abc123");
        assert_eq!(asset.duration, Some(42.5));

        // Plain upload leaves the staged file alone
        assert!(file.exists());
    }

    #[tokio::test]
    async fn test_upload_provider_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/testcloud/upload"))
            .respond_with(ResponseTemplate::new(400).set_body_string("bad signature"))
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let file = staged_file(&dir, "clip.mp4");

        let err = test_client(&server.uri()).upload(&file).await.unwrap_err();
        match err {
            MediaError::Provider { status, message } => {
                assert_eq!(status, 400);
                assert_eq!(message, "bad signature");
            }
            other => panic!("expected provider error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_upload_staged_removes_file_on_failure() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/testcloud/upload"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let file = staged_file(&dir, "clip.mp4");

        let result = test_client(&server.uri()).upload_staged(&file).await;
        assert!(result.is_err());
        assert!(!file.exists(), "staged file must be removed on failure");
    }

    #[tokio::test]
    async fn test_upload_staged_removes_file_on_success() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/testcloud/upload"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "url": "https://cdn.example/a.png",
                "public_id": "avatars/a1"
            })))
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let file = staged_file(&dir, "a.png");

        let asset = test_client(&server.uri())
            .upload_staged(&file)
            .await
            .unwrap();
        assert_eq!(asset.duration, None);
        assert!(!file.exists(), "staged file must be removed on success");
    }

    #[tokio::test]
    async fn test_delete_returns_count() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/testcloud/video/delete"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({"deleted": 2})),
            )
            .mount(&server)
            .await;

        let deleted = test_client(&server.uri())
            .delete(
                &["clips/a".to_string(), "clips/b".to_string()],
                MediaKind::Video,
            )
            .await
            .unwrap();
        assert_eq!(deleted, 2);
    }

    #[tokio::test]
    async fn test_delete_empty_is_noop() {
        // No mock server at all: an empty id list must not hit the network.
        let deleted = test_client("http://127.0.0.1:1")
            .delete(&[], MediaKind::Image)
            .await
            .unwrap();
        assert_eq!(deleted, 0);
    }

    #[test]
    fn test_signature_is_deterministic() {
        let client = test_client("http://unused");
        assert_eq!(client.sign(1700000000), client.sign(1700000000));
        assert_ne!(client.sign(1700000000), client.sign(1700000001));
        assert_eq!(client.sign(0).len(), 64);
    }
}
