//! Shared library for the document chat Lambda functions.
//!
//! This crate provides the message pipeline, upload handling, and the common
//! utilities, types, and clients used across all Lambda functions.

pub mod config;
pub mod error;
pub mod http;
pub mod model;
pub mod models;
pub mod persona;
pub mod pipeline;
pub mod prompts;
pub mod redact;
pub mod secrets;
pub mod upload;
pub mod vector_store;

pub use config::Config;
pub use error::{Error, PipelineStep, ProcessMessageError, Result, StepError};
pub use http::{error_response, json_response, ApiResponse};
pub use model::{BedrockChatModel, ChatModel, TextStream};
pub use models::{ChatRequest, ChatResponse};
pub use persona::{guideline_for, Persona};
pub use pipeline::{MessagePipeline, ProcessMessageArgs, StreamedResponse};
pub use redact::{anonymize, Redactor};
pub use secrets::{get_secret, get_upload_credentials, UploadCredentials};
pub use upload::{FileRouter, HostedUploadClient, UploadService, UploadWidget};
pub use vector_store::{BedrockKnowledgeBase, Document, VectorStore};
