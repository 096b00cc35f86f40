//! Headless state of the document upload widget.

use serde::Serialize;
use tracing::{error, info};

use super::{UploadErrorEvent, UploadResult, UploadedFile};
use crate::{Error, Result};

pub const UPLOAD_COMPLETED: &str = "Upload Completed!";
pub const UPLOAD_FAILED: &str = "File Upload Failed, Try Again";

/// Extension shown before any file is held.
const DEFAULT_EXTENSION: &str = "pdf";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    Success,
    Error,
}

/// Transient message for the end user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    pub kind: NotificationKind,
    pub message: String,
}

impl Notification {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            kind: NotificationKind::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            kind: NotificationKind::Error,
            message: message.into(),
        }
    }
}

/// Widget holding at most one uploaded document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UploadWidget {
    pub label: String,
    file: Option<UploadedFile>,
}

impl UploadWidget {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            file: None,
        }
    }

    pub fn file(&self) -> Option<&UploadedFile> {
        self.file.as_ref()
    }

    /// Store the first uploaded item.
    ///
    /// An empty result list is an upload failure and leaves the state as it was.
    pub fn on_client_upload_complete(
        &mut self,
        results: &[UploadResult],
    ) -> Result<Notification> {
        let first = results
            .first()
            .ok_or_else(|| Error::Upload("Upload completed with no files".to_string()))?;

        let file = UploadedFile::from(first);
        info!(title = %file.title, url = %file.url, size = file.size, "Uploaded file");
        self.file = Some(file);

        Ok(Notification::success(UPLOAD_COMPLETED))
    }

    /// Report a failed upload. State is untouched and nothing is retried.
    pub fn on_upload_error(&self, event: &UploadErrorEvent) -> Notification {
        error!(message = %event.message, "Upload error");
        Notification::error(UPLOAD_FAILED)
    }

    /// "Change File" and remove both just drop the held record.
    pub fn clear(&mut self) -> Option<UploadedFile> {
        self.file.take()
    }

    /// Lower-cased suffix after the last dot of the title.
    pub fn extension(&self) -> String {
        match &self.file {
            Some(file) => file
                .title
                .rsplit('.')
                .next()
                .unwrap_or_default()
                .to_lowercase(),
            None => DEFAULT_EXTENSION.to_string(),
        }
    }

    /// Size in decimal kilobytes, e.g. `"12.35 KB"`. Hidden for empty files.
    pub fn size_label(&self) -> Option<String> {
        self.file
            .as_ref()
            .filter(|file| file.size > 0)
            .map(|file| format!("{:.2} KB", file.size as f64 / 1000.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(name: &str, size: u64) -> UploadResult {
        UploadResult {
            url: format!("https://utfs.io/f/{}", name),
            name: name.to_string(),
            size,
            content_type: "application/pdf".to_string(),
        }
    }

    #[test]
    fn test_upload_complete_stores_first_result() {
        let mut widget = UploadWidget::new("Upload Document");
        let notification = widget
            .on_client_upload_complete(&[result("plan.pdf", 12_345), result("other.pdf", 1)])
            .unwrap();

        assert_eq!(notification, Notification::success("Upload Completed!"));
        let file = widget.file().unwrap();
        assert_eq!(file.title, "plan.pdf");
        assert_eq!(file.url, "https://utfs.io/f/plan.pdf");
        assert_eq!(file.size, 12_345);
        assert_eq!(file.content_type, "application/pdf");
    }

    #[test]
    fn test_empty_results_leave_state_untouched() {
        let mut widget = UploadWidget::new("Upload Document");
        widget
            .on_client_upload_complete(&[result("plan.pdf", 10)])
            .unwrap();
        let before = widget.clone();

        assert!(matches!(
            widget.on_client_upload_complete(&[]),
            Err(Error::Upload(_))
        ));
        assert_eq!(widget, before);
    }

    #[test]
    fn test_upload_error_keeps_state() {
        let mut widget = UploadWidget::new("Upload Document");
        widget
            .on_client_upload_complete(&[result("plan.pdf", 10)])
            .unwrap();

        let notification = widget.on_upload_error(&UploadErrorEvent {
            message: "network down".to_string(),
        });
        assert_eq!(notification.kind, NotificationKind::Error);
        assert_eq!(notification.message, "File Upload Failed, Try Again");
        assert_eq!(widget.file().unwrap().title, "plan.pdf");
    }

    #[test]
    fn test_clear_and_replace() {
        let mut widget = UploadWidget::new("Upload Document");
        widget
            .on_client_upload_complete(&[result("first.pdf", 10)])
            .unwrap();

        let removed = widget.clear().unwrap();
        assert_eq!(removed.title, "first.pdf");
        assert!(widget.file().is_none());

        widget
            .on_client_upload_complete(&[result("second.pdf", 10)])
            .unwrap();
        assert_eq!(widget.file().unwrap().title, "second.pdf");
    }

    #[test]
    fn test_extension() {
        let mut widget = UploadWidget::new("Upload Document");
        assert_eq!(widget.extension(), "pdf");

        widget
            .on_client_upload_complete(&[result("Annual.Report.PDF", 10)])
            .unwrap();
        assert_eq!(widget.extension(), "pdf");

        widget.clear();
        widget
            .on_client_upload_complete(&[result("README", 10)])
            .unwrap();
        assert_eq!(widget.extension(), "readme");
    }

    #[test]
    fn test_size_label() {
        let mut widget = UploadWidget::new("Upload Document");
        assert_eq!(widget.size_label(), None);

        widget
            .on_client_upload_complete(&[result("plan.pdf", 12_345)])
            .unwrap();
        assert_eq!(widget.size_label().as_deref(), Some("12.35 KB"));

        widget
            .on_client_upload_complete(&[result("empty.pdf", 0)])
            .unwrap();
        assert_eq!(widget.size_label(), None);
    }
}
