//! Client for the hosted file upload service.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, error};

use super::{FileDescriptor, FileRoute, PresignedUpload};
use crate::secrets::UploadCredentials;
use crate::{Error, Result};

const API_KEY_HEADER: &str = "x-uploadthing-api-key";

/// Hands out upload slots for files that passed route validation.
#[async_trait]
pub trait UploadService: Send + Sync {
    async fn create_upload(
        &self,
        route: &FileRoute,
        files: &[FileDescriptor],
    ) -> Result<Vec<PresignedUpload>>;
}

/// Hosted upload service over HTTPS.
pub struct HostedUploadClient {
    http_client: reqwest::Client,
    base_url: String,
    credentials: UploadCredentials,
}

impl HostedUploadClient {
    pub fn new(base_url: impl Into<String>, credentials: UploadCredentials) -> Self {
        Self {
            http_client: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            credentials,
        }
    }

    fn upload_files_url(&self) -> String {
        format!("{}/uploadFiles", self.base_url)
    }
}

#[async_trait]
impl UploadService for HostedUploadClient {
    async fn create_upload(
        &self,
        route: &FileRoute,
        files: &[FileDescriptor],
    ) -> Result<Vec<PresignedUpload>> {
        let body = request_body(route, files, self.credentials.app_id.as_deref());
        debug!(slug = %route.slug, files = files.len(), "Requesting upload slots");

        let response = self
            .http_client
            .post(self.upload_files_url())
            .header(API_KEY_HEADER, &self.credentials.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            error!(status = %status, "Upload service rejected request");
            return Err(Error::Upload(format!(
                "Upload service returned {}: {}",
                status, error_text
            )));
        }

        let payload: Value = response.json().await?;
        parse_response(payload)
    }
}

/// Body for the `uploadFiles` call.
pub(crate) fn request_body(
    route: &FileRoute,
    files: &[FileDescriptor],
    app_id: Option<&str>,
) -> Value {
    let mut body = json!({
        "files": files,
        "routeConfig": route.config(),
        "slug": route.slug,
    });
    if let Some(app_id) = app_id {
        body["appId"] = json!(app_id);
    }
    body
}

#[derive(Deserialize)]
struct UploadFilesResponse {
    data: Vec<PresignedUpload>,
}

/// Extract upload slots from an `uploadFiles` response.
pub(crate) fn parse_response(payload: Value) -> Result<Vec<PresignedUpload>> {
    let response: UploadFilesResponse = serde_json::from_value(payload)
        .map_err(|e| Error::Upload(format!("Unexpected upload service response: {}", e)))?;
    if response.data.is_empty() {
        return Err(Error::Upload("Upload service returned no upload slots".to_string()));
    }
    Ok(response.data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::upload::FileRouter;

    fn files() -> Vec<FileDescriptor> {
        vec![FileDescriptor {
            name: "plan.pdf".to_string(),
            size: 2048,
            content_type: "application/pdf".to_string(),
        }]
    }

    #[test]
    fn test_request_body() {
        let router = FileRouter::documents().unwrap();
        let route = router.get("pdfUpload").unwrap();

        let body = request_body(route, &files(), Some("app_123"));
        assert_eq!(body["slug"], "pdfUpload");
        assert_eq!(body["appId"], "app_123");
        assert_eq!(body["files"][0]["name"], "plan.pdf");
        assert_eq!(body["files"][0]["type"], "application/pdf");
        assert_eq!(body["routeConfig"]["maxFileCount"], 1);

        let body = request_body(route, &files(), None);
        assert!(body.get("appId").is_none());
    }

    #[test]
    fn test_parse_response() {
        let payload = json!({
            "data": [{
                "key": "abc",
                "fileName": "plan.pdf",
                "url": "https://uploads.example.com/put",
                "fileUrl": "https://utfs.io/f/abc",
                "fields": {"policy": "p"}
            }]
        });
        let uploads = parse_response(payload).unwrap();
        assert_eq!(uploads.len(), 1);
        assert_eq!(uploads[0].key, "abc");
        assert_eq!(uploads[0].file_url, "https://utfs.io/f/abc");
        assert_eq!(uploads[0].fields["policy"], "p");
    }

    #[test]
    fn test_parse_response_rejects_bad_payloads() {
        assert!(matches!(
            parse_response(json!({"error": "Invalid API key"})),
            Err(Error::Upload(_))
        ));
        assert!(matches!(
            parse_response(json!({"data": []})),
            Err(Error::Upload(_))
        ));
    }

    #[test]
    fn test_base_url_trailing_slash() {
        let client = HostedUploadClient::new(
            "https://api.uploadthing.com/v6/",
            UploadCredentials {
                api_key: "sk_test".to_string(),
                app_id: None,
            },
        );
        assert_eq!(
            client.upload_files_url(),
            "https://api.uploadthing.com/v6/uploadFiles"
        );
    }
}
