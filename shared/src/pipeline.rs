//! Retrieval-augmented message pipeline.
//!
//! A message is processed in five strictly sequential steps:
//! 1. redact PII from the prompt and the conversation history
//! 2. reformulate both into a single search question (the *inquiry*)
//! 3. retrieve the top documents for the inquiry from the vector store
//! 4. look up the persona guideline
//! 5. answer the inquiry from the retrieved context
//!
//! Any failure is logged with the step that caused it and surfaced to the
//! caller only as [`ProcessMessageError`].

use std::sync::Arc;

use futures::stream::BoxStream;
use futures::{StreamExt, TryStreamExt};
use tracing::{error, info};

use crate::error::{PipelineStep, ProcessMessageError, StepError};
use crate::model::{collect_text, ChatModel, TextStream};
use crate::models::ChatResponse;
use crate::persona::guideline_for;
use crate::prompts::{PromptVars, ANSWER_PROMPT, INQUIRY_PROMPT};
use crate::redact::Redactor;
use crate::vector_store::{join_contents, VectorStore};
use crate::Result;

/// Number of documents retrieved per inquiry.
pub const RETRIEVAL_K: usize = 3;

/// Inputs for one pipeline invocation.
pub struct ProcessMessageArgs<'a> {
    pub user_prompt: &'a str,
    pub conversation_history: &'a str,
    pub persona: &'a str,
    pub vector_store: &'a dyn VectorStore,
    /// Model that writes the final answer.
    pub model: &'a dyn ChatModel,
}

/// Answer chunks as seen by the caller of [`MessagePipeline::process_stream`].
pub type AnswerStream = BoxStream<'static, std::result::Result<String, ProcessMessageError>>;

/// Streamed variant of [`ChatResponse`].
pub struct StreamedResponse {
    pub inquiry: String,
    pub answer: AnswerStream,
}

struct Started {
    inquiry: String,
    answer: TextStream,
}

/// The message pipeline.
///
/// Holds the non-streaming model used to reformulate the user prompt; the
/// answering model is supplied per call.
#[derive(Clone)]
pub struct MessagePipeline {
    inquiry_model: Arc<dyn ChatModel>,
    redactor: &'static Redactor,
}

impl MessagePipeline {
    pub fn new(inquiry_model: Arc<dyn ChatModel>) -> Self {
        Self {
            inquiry_model,
            redactor: Redactor::standard(),
        }
    }

    /// Process a message and collect the full answer.
    pub async fn process(
        &self,
        args: ProcessMessageArgs<'_>,
    ) -> std::result::Result<ChatResponse, ProcessMessageError> {
        match self.run(args).await {
            Ok(response) => {
                info!(
                    inquiry = %response.inquiry,
                    answer_len = response.answer.len(),
                    "Processed message"
                );
                Ok(response)
            }
            Err(e) => Err(report(e)),
        }
    }

    /// Process a message and stream the answer.
    ///
    /// A failure while the answer is streaming ends the stream with
    /// [`ProcessMessageError`].
    pub async fn process_stream(
        &self,
        args: ProcessMessageArgs<'_>,
    ) -> std::result::Result<StreamedResponse, ProcessMessageError> {
        let started = self.start(args).await.map_err(report)?;
        info!(inquiry = %started.inquiry, "Streaming answer");

        let answer = started
            .answer
            .map_err(|e| report(StepError::new(PipelineStep::Answer, e)))
            .boxed();

        Ok(StreamedResponse {
            inquiry: started.inquiry,
            answer,
        })
    }

    async fn run(&self, args: ProcessMessageArgs<'_>) -> std::result::Result<ChatResponse, StepError> {
        let started = self.start(args).await?;
        let answer = collect_text(started.answer)
            .await
            .map_err(|e| StepError::new(PipelineStep::Answer, e))?;

        Ok(ChatResponse {
            answer,
            inquiry: started.inquiry,
        })
    }

    async fn start(&self, args: ProcessMessageArgs<'_>) -> std::result::Result<Started, StepError> {
        let prompt = self.redactor.redact(args.user_prompt);
        let history = self.redactor.redact(args.conversation_history);

        let inquiry = self
            .reformulate(prompt, history)
            .await
            .map_err(|e| StepError::new(PipelineStep::Reformulate, e))?;

        let documents = args
            .vector_store
            .similarity_search(&inquiry, RETRIEVAL_K)
            .await
            .map_err(|e| StepError::new(PipelineStep::Retrieve, e))?;
        let context = join_contents(&documents);

        let persona_guideline = guideline_for(args.persona);

        let answer = generate_answer(args.model, &inquiry, context, persona_guideline)
            .await
            .map_err(|e| StepError::new(PipelineStep::Answer, e))?;

        Ok(Started { inquiry, answer })
    }

    async fn reformulate(&self, prompt: String, history: String) -> Result<String> {
        let vars = PromptVars::new()
            .with("userPrompt", prompt)
            .with("conversationHistory", history);
        let rendered = INQUIRY_PROMPT.render(&vars)?;
        self.inquiry_model.invoke(&rendered).await
    }
}

async fn generate_answer(
    model: &dyn ChatModel,
    inquiry: &str,
    context: String,
    persona_guideline: &str,
) -> Result<TextStream> {
    let vars = PromptVars::new()
        .with("context", context)
        .with("question", inquiry)
        .with("personaGuideline", persona_guideline);
    let rendered = ANSWER_PROMPT.render(&vars)?;
    model.stream(&rendered).await
}

fn report(e: StepError) -> ProcessMessageError {
    error!(step = %e.step, error = %e.source, "Error processing message");
    ProcessMessageError
}
