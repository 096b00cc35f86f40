//! Chat Lambda - Answers questions about uploaded documents.
//!
//! Endpoints:
//! - POST /v1/chat - Run the message pipeline for a user prompt

use std::sync::Arc;

use lambda_http::{run, service_fn, Body, Error, Request, Response};
use shared::http::{error_response, json_response, ApiResponse};
use shared::{
    BedrockChatModel, BedrockKnowledgeBase, ChatModel, ChatRequest, Config, MessagePipeline,
    ProcessMessageArgs, VectorStore,
};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use validator::Validate;

/// Application state
struct AppState {
    pipeline: MessagePipeline,
    vector_store: Arc<dyn VectorStore>,
    answer_model: Arc<dyn ChatModel>,
}

impl AppState {
    async fn new() -> Result<Self, Error> {
        let config = Config::from_env()?;
        let aws_config = config.load_aws_config().await;

        let bedrock = aws_sdk_bedrockruntime::Client::new(&aws_config);
        let agent_runtime = aws_sdk_bedrockagentruntime::Client::new(&aws_config);

        let inquiry_model =
            BedrockChatModel::deterministic(bedrock.clone(), config.inquiry_model_id.clone());
        let mut answer_model = BedrockChatModel::new(bedrock, config.answer_model_id.clone());
        if let Some(temperature) = config.answer_temperature {
            answer_model = answer_model.with_temperature(temperature);
        }

        let knowledge_base =
            BedrockKnowledgeBase::new(agent_runtime, config.require_knowledge_base_id()?);

        info!(
            inquiry_model = %config.inquiry_model_id,
            answer_model = %config.answer_model_id,
            "Chat Lambda initialized"
        );

        Ok(Self::with_components(
            Arc::new(inquiry_model),
            Arc::new(answer_model),
            Arc::new(knowledge_base),
        ))
    }

    fn with_components(
        inquiry_model: Arc<dyn ChatModel>,
        answer_model: Arc<dyn ChatModel>,
        vector_store: Arc<dyn VectorStore>,
    ) -> Self {
        Self {
            pipeline: MessagePipeline::new(inquiry_model),
            vector_store,
            answer_model,
        }
    }
}

async fn handler(state: Arc<AppState>, event: Request) -> Result<Response<Body>, Error> {
    let raw_path = event.uri().path();
    // Strip /api stage prefix if present
    let path = raw_path.strip_prefix("/api").unwrap_or(raw_path);
    let method = event.method().as_str();

    info!("Received request: method={}, path={}", method, path);

    match (method, path) {
        ("POST", "/v1/chat") => {
            let request: ChatRequest = shared::parse_body!(event.body());
            if let Err(e) = request.validate() {
                return error_response(400, format!("Validation error: {}", e));
            }

            let args = ProcessMessageArgs {
                user_prompt: &request.user_prompt,
                conversation_history: &request.conversation_history,
                persona: &request.persona,
                vector_store: state.vector_store.as_ref(),
                model: state.answer_model.as_ref(),
            };

            match state.pipeline.process(args).await {
                Ok(response) => json_response(200, &ApiResponse::success(response)),
                Err(e) => error_response(500, e.to_string()),
            }
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
