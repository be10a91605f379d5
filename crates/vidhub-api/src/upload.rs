// Multipart staging for file uploads
//
// Uploaded files are staged under the configured upload directory before
// being pushed to the media store. Staging is all-or-nothing: a malformed
// part discards everything staged so far. Handlers call `discard` on every
// exit path; removing an already-consumed staged file is a no-op.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use axum::extract::Multipart;
use uuid::Uuid;

use crate::error::{ApiError, ApiResult};

/// A file part staged to local disk.
#[derive(Debug)]
pub struct StagedFile {
    pub path: PathBuf,
    pub file_name: String,
}

/// Parsed multipart form: text fields plus staged file parts.
#[derive(Debug, Default)]
pub struct StagedForm {
    fields: HashMap<String, String>,
    files: HashMap<String, StagedFile>,
}

impl StagedForm {
    /// Drain the multipart stream, staging file parts to `upload_dir`.
    pub async fn from_multipart(multipart: &mut Multipart, upload_dir: &Path) -> ApiResult<Self> {
        let mut form = StagedForm::default();

        loop {
            let field = match multipart.next_field().await {
                Ok(Some(field)) => field,
                Ok(None) => break,
                Err(e) => {
                    tracing::debug!("Malformed multipart payload: {}", e);
                    form.discard().await;
                    return Err(ApiError::validation("Malformed multipart payload"));
                }
            };

            let Some(name) = field.name().map(str::to_string) else {
                continue;
            };

            if let Some(file_name) = field.file_name().map(str::to_string) {
                let bytes = match field.bytes().await {
                    Ok(bytes) => bytes,
                    Err(e) => {
                        tracing::debug!("Failed to read multipart file part: {}", e);
                        form.discard().await;
                        return Err(ApiError::validation("Malformed multipart payload"));
                    }
                };

                if let Err(e) = tokio::fs::create_dir_all(upload_dir).await {
                    form.discard().await;
                    return Err(ApiError::Internal(anyhow::anyhow!(
                        "Failed to create upload dir: {e}"
                    )));
                }

                let staged_name = match Path::new(&file_name)
                    .extension()
                    .and_then(|e| e.to_str())
                {
                    Some(ext) => format!("{}.{}", Uuid::now_v7(), ext),
                    None => Uuid::now_v7().to_string(),
                };
                let path = upload_dir.join(staged_name);

                if let Err(e) = tokio::fs::write(&path, &bytes).await {
                    form.discard().await;
                    return Err(ApiError::Internal(anyhow::anyhow!(
                        "Failed to stage upload: {e}"
                    )));
                }

                form.files.insert(name, StagedFile { path, file_name });
            } else {
                let value = match field.text().await {
                    Ok(value) => value,
                    Err(e) => {
                        tracing::debug!("Failed to read multipart text part: {}", e);
                        form.discard().await;
                        return Err(ApiError::validation("Malformed multipart payload"));
                    }
                };
                form.fields.insert(name, value);
            }
        }

        Ok(form)
    }

    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }

    /// Trimmed, non-empty text field; anything else is a validation failure.
    pub fn require_field(&self, name: &str) -> ApiResult<&str> {
        match self.field(name).map(str::trim) {
            Some(value) if !value.is_empty() => Ok(value),
            _ => Err(ApiError::validation(format!("Field '{name}' is required"))),
        }
    }

    pub fn file(&self, name: &str) -> Option<&StagedFile> {
        self.files.get(name)
    }

    pub fn require_file(&self, name: &str) -> ApiResult<&StagedFile> {
        self.file(name)
            .ok_or_else(|| ApiError::validation(format!("File '{name}' is required")))
    }

    /// Remove every staged file still on disk. Files already consumed (and
    /// removed) by the media client are skipped silently.
    pub async fn discard(&self) {
        for staged in self.files.values() {
            match tokio::fs::remove_file(&staged.path).await {
                Ok(()) => {}
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => {
                    tracing::warn!(
                        path = %staged.path.display(),
                        "Failed to remove staged upload: {}", e
                    );
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_require_field_rejects_empty() {
        let mut form = StagedForm::default();
        form.fields.insert("title".to_string(), "   ".to_string());

        assert!(form.require_field("title").is_err());
        assert!(form.require_field("missing").is_err());

        form.fields
            .insert("title".to_string(), " My video ".to_string());
        assert_eq!(form.require_field("title").unwrap(), "My video");
    }

    #[tokio::test]
    async fn test_discard_removes_staged_files() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("staged.bin");
        tokio::fs::write(&path, b"data").await.unwrap();

        let mut form = StagedForm::default();
        form.files.insert(
            "video".to_string(),
            StagedFile {
                path: path.clone(),
                file_name: "clip.mp4".to_string(),
            },
        );

        form.discard().await;
        assert!(!path.exists());

        // Second discard is a no-op
        form.discard().await;
    }
}
