//! Document upload: file routes, the hosted upload service, and the
//! client-side widget state.

pub mod client;
pub mod route;
pub mod widget;

use serde::{Deserialize, Serialize};
use tracing::info;

pub use client::{HostedUploadClient, UploadService};
pub use route::{parse_file_size, FileCategory, FileRoute, FileRouter, RouteConfig};
pub use widget::{Notification, NotificationKind, UploadWidget};

/// Value returned to the hosted service when an upload completes.
pub const UPLOADED_BY: &str = "Prats";

/// File metadata a client declares before uploading.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileDescriptor {
    pub name: String,
    pub size: u64,
    #[serde(rename = "type")]
    pub content_type: String,
}

/// Create-upload request body.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateUploadRequest {
    pub files: Vec<FileDescriptor>,
}

/// Upload slot handed out by the hosted service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PresignedUpload {
    pub key: String,
    #[serde(alias = "fileName")]
    pub name: String,
    /// Where the client sends the file.
    pub url: String,
    /// Where the stored file will be served from.
    pub file_url: String,
    #[serde(default)]
    pub fields: serde_json::Map<String, serde_json::Value>,
}

/// One uploaded item as reported to the widget.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadResult {
    pub url: String,
    pub name: String,
    pub size: u64,
    #[serde(rename = "type")]
    pub content_type: String,
}

/// Failure reported to the widget.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadErrorEvent {
    pub message: String,
}

/// The file a widget currently holds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadedFile {
    pub title: String,
    #[serde(rename = "type")]
    pub content_type: String,
    pub size: u64,
    pub url: String,
}

impl From<&UploadResult> for UploadedFile {
    fn from(result: &UploadResult) -> Self {
        Self {
            title: result.name.clone(),
            content_type: result.content_type.clone(),
            size: result.size,
            url: result.url.clone(),
        }
    }
}

/// Stored file as described by the completion callback.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletedFile {
    pub url: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub size: Option<u64>,
    #[serde(default)]
    pub key: Option<String>,
    #[serde(default, rename = "type")]
    pub content_type: Option<String>,
}

/// Completion callback sent by the hosted service.
#[derive(Debug, Clone, Deserialize)]
pub struct UploadCompleteCallback {
    #[serde(default)]
    pub metadata: serde_json::Value,
    pub file: CompletedFile,
}

/// Response to the completion callback.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadCompleteResponse {
    pub uploaded_by: String,
}

/// Handle a completed upload.
pub fn on_upload_complete(callback: &UploadCompleteCallback) -> UploadCompleteResponse {
    info!(file_url = %callback.file.url, "file url");
    UploadCompleteResponse {
        uploaded_by: UPLOADED_BY.to_string(),
    }
}
