//! Vector store capability and its Bedrock Knowledge Base implementation.

use std::sync::Arc;

use async_trait::async_trait;
use aws_sdk_bedrockagentruntime::types::{
    KnowledgeBaseQuery, KnowledgeBaseRetrievalConfiguration, KnowledgeBaseRetrievalResult,
    KnowledgeBaseVectorSearchConfiguration,
};
use aws_sdk_bedrockagentruntime::Client as BedrockAgentClient;
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// A retrieved piece of content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
}

impl Document {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            source: None,
            score: None,
        }
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    pub fn with_score(mut self, score: f64) -> Self {
        self.score = Some(score);
        self
    }
}

/// Similarity search over an external document collection.
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Return at most `k` documents, most similar first.
    async fn similarity_search(&self, query: &str, k: usize) -> Result<Vec<Document>>;
}

#[async_trait]
impl<T: VectorStore + ?Sized> VectorStore for Arc<T> {
    async fn similarity_search(&self, query: &str, k: usize) -> Result<Vec<Document>> {
        (**self).similarity_search(query, k).await
    }
}

/// Join document contents with a blank line, keeping rank order.
pub fn join_contents(documents: &[Document]) -> String {
    documents
        .iter()
        .map(|doc| doc.content.as_str())
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Vector store backed by the Bedrock Agent Runtime `Retrieve` API.
#[derive(Debug, Clone)]
pub struct BedrockKnowledgeBase {
    client: BedrockAgentClient,
    knowledge_base_id: String,
}

impl BedrockKnowledgeBase {
    pub fn new(client: BedrockAgentClient, knowledge_base_id: impl Into<String>) -> Self {
        Self {
            client,
            knowledge_base_id: knowledge_base_id.into(),
        }
    }

    fn to_document(result: &KnowledgeBaseRetrievalResult) -> Option<Document> {
        let content: Option<&str> = Option::from(result.content()?.text());
        let mut document = Document::new(content?);
        if let Some(uri) = result
            .location()
            .and_then(|location| location.s3_location())
            .and_then(|s3| s3.uri())
        {
            document = document.with_source(uri);
        }
        if let Some(score) = result.score() {
            document = document.with_score(score);
        }
        Some(document)
    }
}

#[async_trait]
impl VectorStore for BedrockKnowledgeBase {
    async fn similarity_search(&self, query: &str, k: usize) -> Result<Vec<Document>> {
        let number_of_results = i32::try_from(k)
            .map_err(|_| Error::Validation(format!("k out of range: {}", k)))?;

        let retrieval_query = KnowledgeBaseQuery::builder()
            .text(query)
            .build()
            .map_err(|e| Error::VectorStore(format!("Invalid retrieval query: {}", e)))?;
        let retrieval_configuration = KnowledgeBaseRetrievalConfiguration::builder()
            .vector_search_configuration(
                KnowledgeBaseVectorSearchConfiguration::builder()
                    .number_of_results(number_of_results)
                    .build(),
            )
            .build();

        let response = self
            .client
            .retrieve()
            .knowledge_base_id(&self.knowledge_base_id)
            .retrieval_query(retrieval_query)
            .retrieval_configuration(retrieval_configuration)
            .send()
            .await
            .map_err(|e| Error::VectorStore(format!("Failed to retrieve: {}", e)))?;

        Ok(response
            .retrieval_results()
            .iter()
            .filter_map(Self::to_document)
            .take(k)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_contents_keeps_rank_order() {
        let docs = vec![
            Document::new("first").with_score(0.9),
            Document::new("second").with_score(0.8),
            Document::new("third").with_source("s3://bucket/c.pdf"),
        ];
        assert_eq!(join_contents(&docs), "first\n\nsecond\n\nthird");
    }

    #[test]
    fn test_join_contents_empty() {
        assert_eq!(join_contents(&[]), "");
    }

    #[test]
    fn test_join_contents_keeps_duplicates() {
        let docs = vec![Document::new("same"), Document::new("same")];
        assert_eq!(join_contents(&docs), "same\n\nsame");
    }

    #[test]
    fn test_document_serialization_skips_missing_metadata() {
        let json = serde_json::to_value(Document::new("text")).unwrap();
        assert_eq!(json, serde_json::json!({"content": "text"}));
    }
}
