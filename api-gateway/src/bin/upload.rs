//! Upload Lambda - Hands out upload slots for documents and receives
//! completion callbacks from the hosted upload service.
//!
//! Endpoints:
//! - GET /api/uploadthing - Describe the file routes
//! - POST /api/uploadthing/upload?slug={slug} - Create an upload
//! - POST /api/uploadthing/callback - Upload completed

use std::sync::Arc;

use lambda_http::{run, service_fn, Body, Error, Request, RequestExt, Response};
use shared::http::{error_response, json_response, ApiResponse};
use shared::upload::{on_upload_complete, CreateUploadRequest, UploadCompleteCallback};
use shared::{get_upload_credentials, Config, FileRouter, HostedUploadClient, UploadService};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

/// Application state
struct AppState {
    router: FileRouter,
    upload_service: Arc<dyn UploadService>,
}

impl AppState {
    async fn new() -> Result<Self, Error> {
        let config = Config::from_env()?;
        let aws_config = config.load_aws_config().await;
        let secrets_client = aws_sdk_secretsmanager::Client::new(&aws_config);

        let credentials =
            get_upload_credentials(&secrets_client, config.require_upload_secret_arn()?).await?;
        let upload_service = HostedUploadClient::new(config.upload_api_url.clone(), credentials);

        info!(upload_api_url = %config.upload_api_url, "Upload Lambda initialized");

        Ok(Self {
            router: FileRouter::documents()?,
            upload_service: Arc::new(upload_service),
        })
    }
}

async fn handler(state: Arc<AppState>, event: Request) -> Result<Response<Body>, Error> {
    let raw_path = event.uri().path();
    // Strip /api stage prefix if present
    let path = raw_path.strip_prefix("/api").unwrap_or(raw_path);
    let method = event.method().as_str();

    info!("Received request: method={}, path={}", method, path);

    match (method, path) {
        ("GET", "/uploadthing") => json_response(200, &ApiResponse::success(state.router.config())),

        ("POST", "/uploadthing/upload") => {
            let params = event.query_string_parameters();
            let slug = match params.first("slug") {
                Some(slug) => slug.to_string(),
                None => return error_response(400, "Missing slug parameter"),
            };

            let route = match state.router.get(&slug) {
                Ok(route) => route,
                Err(e) => return error_response(e.status_code(), e.to_string()),
            };

            let request: CreateUploadRequest = shared::parse_body!(event.body());
            if let Err(e) = route.validate(&request.files) {
                return error_response(e.status_code(), e.to_string());
            }

            match state.upload_service.create_upload(route, &request.files).await {
                Ok(uploads) => {
                    info!(slug = %slug, count = uploads.len(), "Created upload");
                    json_response(200, &ApiResponse::success(uploads))
                }
                Err(e) => {
                    error!(slug = %slug, error = %e, "Failed to create upload");
                    error_response(e.status_code(), e.to_string())
                }
            }
        }

        ("POST", "/uploadthing/callback") => {
            let callback: UploadCompleteCallback = shared::parse_body!(event.body());
            json_response(200, &on_upload_complete(&callback))
        }

        _ => {
            warn!("No route for {} {}", method, path);
            error_response(404, "Not found")
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .init();

    let state = Arc::new(AppState::new().await?);

    run(service_fn(move |event| {
        let state = Arc::clone(&state);
        async move { handler(state, event).await }
    }))
    .await
}
