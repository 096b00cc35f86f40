//! Chat model capability and its Amazon Bedrock implementation.

use std::sync::Arc;

use async_trait::async_trait;
use aws_sdk_bedrockruntime::types::{
    ContentBlock, ContentBlockDelta, ConversationRole, ConverseStreamOutput,
    InferenceConfiguration, Message, SystemContentBlock,
};
use aws_sdk_bedrockruntime::Client as BedrockClient;
use futures::stream::{self, BoxStream, StreamExt, TryStreamExt};

use crate::prompts::RenderedPrompt;
use crate::{Error, Result};

/// A stream of generated text chunks.
pub type TextStream = BoxStream<'static, Result<String>>;

/// Something that turns a rendered prompt into text.
#[async_trait]
pub trait ChatModel: Send + Sync {
    /// Generate the full response in one call.
    async fn invoke(&self, prompt: &RenderedPrompt) -> Result<String>;

    /// Generate the response as a stream of chunks.
    ///
    /// Models without native streaming yield the whole response as one chunk.
    async fn stream(&self, prompt: &RenderedPrompt) -> Result<TextStream> {
        let text = self.invoke(prompt).await?;
        Ok(stream::once(async move { Ok(text) }).boxed())
    }
}

#[async_trait]
impl<T: ChatModel + ?Sized> ChatModel for Arc<T> {
    async fn invoke(&self, prompt: &RenderedPrompt) -> Result<String> {
        (**self).invoke(prompt).await
    }

    async fn stream(&self, prompt: &RenderedPrompt) -> Result<TextStream> {
        (**self).stream(prompt).await
    }
}

/// Concatenate every chunk of a text stream.
pub async fn collect_text(stream: TextStream) -> Result<String> {
    stream.try_collect::<Vec<_>>().await.map(|chunks| chunks.concat())
}

/// Chat model backed by the Bedrock Converse API.
#[derive(Debug, Clone)]
pub struct BedrockChatModel {
    client: BedrockClient,
    model_id: String,
    temperature: Option<f32>,
    streaming: bool,
}

impl BedrockChatModel {
    /// Create a streaming model with provider-default sampling.
    pub fn new(client: BedrockClient, model_id: impl Into<String>) -> Self {
        Self {
            client,
            model_id: model_id.into(),
            temperature: None,
            streaming: true,
        }
    }

    /// Deterministic, non-streaming model used for query reformulation.
    pub fn deterministic(client: BedrockClient, model_id: impl Into<String>) -> Self {
        Self::new(client, model_id).with_temperature(0.0).with_streaming(false)
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn with_streaming(mut self, streaming: bool) -> Self {
        self.streaming = streaming;
        self
    }

    fn inference_config(&self) -> Option<InferenceConfiguration> {
        self.temperature
            .map(|temperature| InferenceConfiguration::builder().temperature(temperature).build())
    }

    fn user_message(prompt: &RenderedPrompt) -> Result<Message> {
        Message::builder()
            .role(ConversationRole::User)
            .content(ContentBlock::Text(prompt.user.clone()))
            .build()
            .map_err(|e| Error::Model(format!("Failed to build message: {}", e)))
    }
}

#[async_trait]
impl ChatModel for BedrockChatModel {
    async fn invoke(&self, prompt: &RenderedPrompt) -> Result<String> {
        let response = self
            .client
            .converse()
            .model_id(&self.model_id)
            .system(SystemContentBlock::Text(prompt.system.clone()))
            .messages(Self::user_message(prompt)?)
            .set_inference_config(self.inference_config())
            .send()
            .await
            .map_err(|e| Error::Model(format!("Failed to invoke {}: {}", self.model_id, e)))?;

        let message = response
            .output()
            .and_then(|output| output.as_message().ok())
            .ok_or_else(|| Error::Model("No message in model response".to_string()))?;

        let text = message
            .content()
            .iter()
            .filter_map(|block| block.as_text().ok())
            .map(String::as_str)
            .collect::<String>();

        Ok(text)
    }

    async fn stream(&self, prompt: &RenderedPrompt) -> Result<TextStream> {
        if !self.streaming {
            let text = self.invoke(prompt).await?;
            return Ok(stream::once(async move { Ok(text) }).boxed());
        }

        let response = self
            .client
            .converse_stream()
            .model_id(&self.model_id)
            .system(SystemContentBlock::Text(prompt.system.clone()))
            .messages(Self::user_message(prompt)?)
            .set_inference_config(self.inference_config())
            .send()
            .await
            .map_err(|e| Error::Model(format!("Failed to stream {}: {}", self.model_id, e)))?;

        let chunks = stream::try_unfold(response.stream, |mut events| async move {
            loop {
                match events.recv().await {
                    Ok(Some(ConverseStreamOutput::ContentBlockDelta(event))) => {
                        if let Some(ContentBlockDelta::Text(text)) = event.delta {
                            return Ok(Some((text, events)));
                        }
                    }
                    Ok(Some(_)) => continue,
                    Ok(None) => return Ok(None),
                    Err(e) => return Err(Error::Model(format!("Model stream failed: {}", e))),
                }
            }
        });

        Ok(chunks.boxed())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct EchoModel;

    #[async_trait]
    impl ChatModel for EchoModel {
        async fn invoke(&self, prompt: &RenderedPrompt) -> Result<String> {
            Ok(format!("{} | {}", prompt.system, prompt.user))
        }
    }

    fn prompt() -> RenderedPrompt {
        RenderedPrompt {
            system: "sys".to_string(),
            user: "hi".to_string(),
        }
    }

    #[tokio::test]
    async fn test_default_stream_yields_single_chunk() {
        let chunks: Vec<_> = EchoModel.stream(&prompt()).await.unwrap().collect().await;
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].as_ref().unwrap(), "sys | hi");
    }

    #[tokio::test]
    async fn test_collect_text_concatenates_chunks() {
        let chunks: TextStream = stream::iter(vec![Ok("a".to_string()), Ok("b".to_string())]).boxed();
        assert_eq!(collect_text(chunks).await.unwrap(), "ab");
    }

    #[tokio::test]
    async fn test_collect_text_stops_at_first_error() {
        let chunks: TextStream = stream::iter(vec![
            Ok("a".to_string()),
            Err(Error::Model("dropped".to_string())),
            Ok("b".to_string()),
        ])
        .boxed();
        assert!(matches!(collect_text(chunks).await, Err(Error::Model(_))));
    }

    fn bedrock_client() -> BedrockClient {
        let config = aws_sdk_bedrockruntime::Config::builder()
            .behavior_version(aws_sdk_bedrockruntime::config::BehaviorVersion::latest())
            .region(aws_sdk_bedrockruntime::config::Region::new("us-east-1"))
            .build();
        BedrockClient::from_conf(config)
    }

    #[tokio::test]
    async fn test_inference_config_only_when_temperature_set() {
        let model = BedrockChatModel::new(bedrock_client(), "model");
        assert!(model.inference_config().is_none());

        let config = BedrockChatModel::deterministic(bedrock_client(), "model")
            .inference_config()
            .unwrap();
        assert_eq!(config.temperature(), Some(0.0));
        assert_eq!(config.max_tokens(), None);
    }

    #[tokio::test]
    async fn test_arc_forwards_to_inner_model() {
        let model: Arc<dyn ChatModel> = Arc::new(EchoModel);
        assert_eq!(model.invoke(&prompt()).await.unwrap(), "sys | hi");
    }
}
