//! HTTP client for the compare API
//!
//! Mirrors the upload flow of the web frontend: each picture is checked
//! locally (image type, 5MB cap) before anything is sent.

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use reqwest::multipart::{Form, Part};
use serde_json::Value;
use thiserror::Error;

use crate::models::{CompareResponse, FEED_FIELD, IMAGE_A_FIELD, IMAGE_B_FIELD};

pub const DEFAULT_API_URL: &str = "http://localhost:8000";
pub const MAX_UPLOAD_BYTES: u64 = 5 * 1024 * 1024;
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Which of the three upload slots a picture fills
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slot {
    Feed,
    ImageA,
    ImageB,
}

impl Slot {
    pub fn field(&self) -> &'static str {
        match self {
            Slot::Feed => FEED_FIELD,
            Slot::ImageA => IMAGE_A_FIELD,
            Slot::ImageB => IMAGE_B_FIELD,
        }
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Slot::Feed => write!(f, "Feed screenshot"),
            Slot::ImageA => write!(f, "Picture A"),
            Slot::ImageB => write!(f, "Picture B"),
        }
    }
}

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("{slot}: invalid file type. Please upload an image file.")]
    InvalidFileType { slot: Slot },

    #[error("{slot}: file too large ({size} bytes). Please upload an image smaller than 5MB.")]
    FileTooLarge { slot: Slot, size: u64 },

    #[error("Failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("API request failed: {status} {detail}")]
    Api { status: u16, detail: String },

    #[error(transparent)]
    Http(#[from] reqwest::Error),
}

/// Content type implied by a file extension
pub fn content_type_for(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    match ext.as_str() {
        "jpg" | "jpeg" => Some("image/jpeg"),
        "png" => Some("image/png"),
        "gif" => Some("image/gif"),
        "bmp" => Some("image/bmp"),
        "webp" => Some("image/webp"),
        _ => None,
    }
}

/// Same checks the upload page runs before accepting a file
pub fn validate_local(slot: Slot, content_type: Option<&str>, size: u64) -> Result<(), ClientError> {
    if !content_type.is_some_and(|ct| ct.starts_with("image/")) {
        return Err(ClientError::InvalidFileType { slot });
    }
    if size > MAX_UPLOAD_BYTES {
        return Err(ClientError::FileTooLarge { slot, size });
    }
    Ok(())
}

/// A validated picture ready to upload
#[derive(Debug, Clone)]
pub struct UploadImage {
    pub slot: Slot,
    pub filename: String,
    pub content_type: &'static str,
    pub bytes: Vec<u8>,
}

impl UploadImage {
    pub async fn from_path(slot: Slot, path: impl AsRef<Path>) -> Result<Self, ClientError> {
        let path = path.as_ref();
        let io_err = |source| ClientError::Io {
            path: path.to_path_buf(),
            source,
        };

        let content_type = content_type_for(path);
        let size = tokio::fs::metadata(path).await.map_err(io_err)?.len();
        validate_local(slot, content_type, size)?;

        let bytes = tokio::fs::read(path).await.map_err(io_err)?;
        let filename = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| slot.field().to_string());

        Ok(Self {
            slot,
            filename,
            content_type: content_type.unwrap_or("application/octet-stream"),
            bytes,
        })
    }

    fn into_part(self) -> Result<Part, ClientError> {
        Ok(Part::bytes(self.bytes)
            .file_name(self.filename)
            .mime_str(self.content_type)?)
    }
}

pub struct FeedFitClient {
    base_url: String,
    http: reqwest::Client,
}

impl FeedFitClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http,
        })
    }

    pub fn compare_url(&self) -> String {
        format!("{}/compare", self.base_url)
    }

    pub fn health_url(&self) -> String {
        format!("{}/health", self.base_url)
    }

    /// Upload the feed and both candidates and return the scores
    pub async fn compare(
        &self,
        feed: UploadImage,
        image_a: UploadImage,
        image_b: UploadImage,
    ) -> Result<CompareResponse, ClientError> {
        let mut form = Form::new();
        for upload in [feed, image_a, image_b] {
            let field = upload.slot.field();
            form = form.part(field, upload.into_part()?);
        }

        tracing::debug!(url = %self.compare_url(), "Submitting images for analysis");
        let response = self.http.post(self.compare_url()).multipart(form).send().await?;
        let response = check_status(response).await?;
        Ok(response.json().await?)
    }

    pub async fn health(&self) -> Result<Value, ClientError> {
        let response = self.http.get(self.health_url()).send().await?;
        let response = check_status(response).await?;
        Ok(response.json().await?)
    }
}

/// Turn a non-2xx response into `ClientError::Api`, preferring the JSON `detail`
async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, ClientError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let text = response.text().await.unwrap_or_default();
    let detail = serde_json::from_str::<Value>(&text)
        .ok()
        .and_then(|v| v.get("detail").and_then(Value::as_str).map(String::from))
        .unwrap_or_else(|| status.canonical_reason().unwrap_or(text.as_str()).to_string());

    Err(ClientError::Api {
        status: status.as_u16(),
        detail,
    })
}
