//! File routes: which files an upload endpoint accepts.

use serde::{Deserialize, Serialize};

use super::FileDescriptor;
use crate::{Error, Result};

/// Slug of the document upload route.
pub const PDF_UPLOAD: &str = "pdfUpload";

/// Content category a route accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileCategory {
    Pdf,
}

impl FileCategory {
    /// Whether a declared MIME type belongs to this category.
    pub fn accepts(&self, content_type: &str) -> bool {
        let content_type = content_type.trim().to_ascii_lowercase();
        match self {
            FileCategory::Pdf => content_type == "application/pdf",
        }
    }
}

/// Parse a size such as `"512KB"`, `"4MB"` or `"1GB"` into bytes.
///
/// Units are 1024-based. A bare number is taken as bytes.
pub fn parse_file_size(input: &str) -> Result<u64> {
    let trimmed = input.trim();
    let split = trimmed
        .find(|c: char| c.is_ascii_alphabetic())
        .unwrap_or(trimmed.len());
    let (number, unit) = trimmed.split_at(split);

    let multiplier: u64 = match unit.trim().to_ascii_uppercase().as_str() {
        "" | "B" => 1,
        "KB" => 1024,
        "MB" => 1024 * 1024,
        "GB" => 1024 * 1024 * 1024,
        other => return Err(Error::Config(format!("Unknown size unit '{}' in '{}'", other, input))),
    };

    let number: f64 = number
        .trim()
        .parse()
        .map_err(|_| Error::Config(format!("Invalid file size '{}'", input)))?;
    if !number.is_finite() || number < 0.0 {
        return Err(Error::Config(format!("Invalid file size '{}'", input)));
    }

    Ok((number * multiplier as f64).round() as u64)
}

/// A named upload endpoint with its constraints.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRoute {
    pub slug: String,
    pub category: FileCategory,
    pub max_file_size: u64,
    pub max_file_count: usize,
}

impl FileRoute {
    /// `max_file_size` uses the `"512KB"` / `"4MB"` / `"1GB"` notation.
    pub fn new(
        slug: impl Into<String>,
        category: FileCategory,
        max_file_size: &str,
        max_file_count: usize,
    ) -> Result<Self> {
        Ok(Self {
            slug: slug.into(),
            category,
            max_file_size: parse_file_size(max_file_size)?,
            max_file_count,
        })
    }

    /// Check a create-upload request against this route.
    pub fn validate(&self, files: &[FileDescriptor]) -> Result<()> {
        if files.is_empty() {
            return Err(Error::Validation("No files to upload".to_string()));
        }
        if files.len() > self.max_file_count {
            return Err(Error::Validation(format!(
                "Too many files: {} (max {})",
                files.len(),
                self.max_file_count
            )));
        }
        for file in files {
            if !self.category.accepts(&file.content_type) {
                return Err(Error::Validation(format!(
                    "File type '{}' is not allowed for {}",
                    file.content_type, self.slug
                )));
            }
            if file.size > self.max_file_size {
                return Err(Error::Validation(format!(
                    "File '{}' is {} bytes (max {})",
                    file.name, file.size, self.max_file_size
                )));
            }
        }
        Ok(())
    }

    pub fn config(&self) -> RouteConfig {
        RouteConfig {
            slug: self.slug.clone(),
            category: self.category,
            max_file_size: self.max_file_size,
            max_file_count: self.max_file_count,
        }
    }
}

/// Public description of a route.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteConfig {
    pub slug: String,
    pub category: FileCategory,
    pub max_file_size: u64,
    pub max_file_count: usize,
}

/// Set of file routes served by the upload Lambda.
#[derive(Debug, Clone, Default)]
pub struct FileRouter {
    routes: Vec<FileRoute>,
}

impl FileRouter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn route(mut self, route: FileRoute) -> Self {
        self.routes.retain(|existing| existing.slug != route.slug);
        self.routes.push(route);
        self
    }

    /// The document router: one PDF of at most 1GB.
    pub fn documents() -> Result<Self> {
        Ok(Self::new().route(FileRoute::new(PDF_UPLOAD, FileCategory::Pdf, "1GB", 1)?))
    }

    pub fn get(&self, slug: &str) -> Result<&FileRoute> {
        self.routes
            .iter()
            .find(|route| route.slug == slug)
            .ok_or_else(|| Error::NotFound(format!("Upload route '{}'", slug)))
    }

    pub fn config(&self) -> Vec<RouteConfig> {
        self.routes.iter().map(FileRoute::config).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pdf(name: &str, size: u64) -> FileDescriptor {
        FileDescriptor {
            name: name.to_string(),
            size,
            content_type: "application/pdf".to_string(),
        }
    }

    #[test]
    fn test_parse_file_size() {
        assert_eq!(parse_file_size("1GB").unwrap(), 1_073_741_824);
        assert_eq!(parse_file_size("4MB").unwrap(), 4_194_304);
        assert_eq!(parse_file_size("512KB").unwrap(), 524_288);
        assert_eq!(parse_file_size("1.5 kb").unwrap(), 1_536);
        assert_eq!(parse_file_size("100").unwrap(), 100);
        assert!(parse_file_size("1TB").is_err());
        assert!(parse_file_size("lots").is_err());
        assert!(parse_file_size("-1MB").is_err());
    }

    #[test]
    fn test_document_router() {
        let router = FileRouter::documents().unwrap();
        let route = router.get(PDF_UPLOAD).unwrap();
        assert_eq!(route.category, FileCategory::Pdf);
        assert_eq!(route.max_file_size, 1024 * 1024 * 1024);
        assert_eq!(route.max_file_count, 1);
        assert!(matches!(router.get("imageUpload"), Err(Error::NotFound(_))));
    }

    #[test]
    fn test_validate_accepts_single_pdf_at_limit() {
        let router = FileRouter::documents().unwrap();
        let route = router.get(PDF_UPLOAD).unwrap();
        assert!(route.validate(&[pdf("plan.pdf", 1024 * 1024 * 1024)]).is_ok());
    }

    #[test]
    fn test_validate_rejections() {
        let router = FileRouter::documents().unwrap();
        let route = router.get(PDF_UPLOAD).unwrap();

        assert!(route.validate(&[]).is_err());
        assert!(route.validate(&[pdf("a.pdf", 1), pdf("b.pdf", 1)]).is_err());
        assert!(route.validate(&[pdf("big.pdf", 1024 * 1024 * 1024 + 1)]).is_err());

        let doc = FileDescriptor {
            name: "notes.docx".to_string(),
            size: 10,
            content_type: "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
                .to_string(),
        };
        let err = route.validate(&[doc]).unwrap_err();
        assert_eq!(err.status_code(), 400);
    }

    #[test]
    fn test_route_rejects_bad_size_notation() {
        assert!(matches!(
            FileRoute::new("docs", FileCategory::Pdf, "1TB", 1),
            Err(Error::Config(_))
        ));
        let route = FileRoute::new("docs", FileCategory::Pdf, "4MB", 2).unwrap();
        assert_eq!(route.max_file_size, 4 * 1024 * 1024);
        assert_eq!(route.max_file_count, 2);
    }

    #[test]
    fn test_router_config_serialization() {
        let config = FileRouter::documents().unwrap().config();
        assert_eq!(
            serde_json::to_value(&config).unwrap(),
            serde_json::json!([{
                "slug": "pdfUpload",
                "category": "pdf",
                "maxFileSize": 1073741824u64,
                "maxFileCount": 1
            }])
        );
    }

    #[test]
    fn test_category_matching() {
        assert!(FileCategory::Pdf.accepts("Application/PDF"));
        assert!(FileCategory::Pdf.accepts(" application/pdf "));
        assert!(!FileCategory::Pdf.accepts("image/png"));
        assert!(!FileCategory::Pdf.accepts("application/x-pdf-archive"));
    }
}
