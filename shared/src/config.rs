//! Configuration management for Lambda functions.

use std::env;

use crate::{Error, Result};

const DEFAULT_MODEL_ID: &str = "anthropic.claude-3-haiku-20240307-v1:0";
const DEFAULT_UPLOAD_API_URL: &str = "https://api.uploadthing.com/v6";

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// AWS region
    pub aws_region: String,
    /// Bedrock model used to reformulate the user prompt into an inquiry
    pub inquiry_model_id: String,
    /// Bedrock model used to answer the inquiry
    pub answer_model_id: String,
    /// Sampling temperature for the answer model (provider default when unset)
    pub answer_temperature: Option<f32>,
    /// Bedrock knowledge base queried for context
    pub knowledge_base_id: Option<String>,
    /// Base URL of the hosted upload service
    pub upload_api_url: String,
    /// ARN of the secret holding the upload service API key
    pub upload_secret_arn: Option<String>,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let inquiry_model_id =
            lookup("INQUIRY_MODEL_ID").unwrap_or_else(|| DEFAULT_MODEL_ID.to_string());
        let answer_model_id =
            lookup("ANSWER_MODEL_ID").unwrap_or_else(|| inquiry_model_id.clone());

        let answer_temperature = match lookup("ANSWER_TEMPERATURE") {
            Some(raw) => Some(raw.trim().parse::<f32>().map_err(|e| {
                Error::Config(format!("ANSWER_TEMPERATURE is not a number: {}", e))
            })?),
            None => None,
        };

        Ok(Self {
            aws_region: lookup("AWS_REGION").unwrap_or_else(|| "us-east-1".to_string()),
            inquiry_model_id,
            answer_model_id,
            answer_temperature,
            knowledge_base_id: lookup("KNOWLEDGE_BASE_ID"),
            upload_api_url: lookup("UPLOAD_API_URL")
                .unwrap_or_else(|| DEFAULT_UPLOAD_API_URL.to_string()),
            upload_secret_arn: lookup("UPLOAD_SECRET_ARN"),
        })
    }

    /// Load the AWS SDK configuration for the configured region.
    pub async fn load_aws_config(&self) -> aws_config::SdkConfig {
        aws_config::defaults(aws_config::BehaviorVersion::latest())
            .region(aws_config::Region::new(self.aws_region.clone()))
            .load()
            .await
    }

    /// Knowledge base id, required by the chat Lambda.
    pub fn require_knowledge_base_id(&self) -> Result<&str> {
        self.knowledge_base_id
            .as_deref()
            .ok_or_else(|| Error::Config("KNOWLEDGE_BASE_ID not set".to_string()))
    }

    /// Upload secret ARN, required by the upload Lambda.
    pub fn require_upload_secret_arn(&self) -> Result<&str> {
        self.upload_secret_arn
            .as_deref()
            .ok_or_else(|| Error::Config("UPLOAD_SECRET_ARN not set".to_string()))
    }
}
