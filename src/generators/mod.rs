// Generation capability surface
//
// The editing core has no knowledge of any concrete provider. Everything
// it needs from the outside world is behind the `Generator` trait; a
// provider integration lives entirely with the caller.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::mpsc;

use crate::lint::LayoutIssue;

mod cleanup;

pub use cleanup::cleanup_response;

/// Failures at the generation boundary. Timeouts are the provider's to
/// detect; the loop treats them like any other collaborator error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GeneratorError {
    #[error("generation service error: {0}")]
    Service(String),

    #[error("generation request timed out")]
    Timeout,

    #[error("malformed response from generator: {0}")]
    MalformedResponse(String),

    #[error("generator returned no text")]
    EmptyResponse,
}

/// Incremental piece of a streamed response.
#[derive(Debug, Clone)]
pub enum StreamChunk {
    TextDelta(String),
}

/// Parameters for fresh whole-deck generation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeckRequest {
    pub topic: String,
    pub slide_count: usize,
    pub language: String,
    pub style: Option<String>,
    pub include_notes: bool,
}

impl DeckRequest {
    pub fn new(topic: impl Into<String>) -> Self {
        Self {
            topic: topic.into(),
            slide_count: 8,
            language: "en".to_string(),
            style: None,
            include_notes: false,
        }
    }

    pub fn with_slide_count(mut self, count: usize) -> Self {
        self.slide_count = count;
        self
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    pub fn with_style(mut self, style: impl Into<String>) -> Self {
        self.style = Some(style.into());
        self
    }

    pub fn with_notes(mut self) -> Self {
        self.include_notes = true;
        self
    }
}

/// Unified generation interface the edit loop delegates to.
///
/// `generate` is issue-aware: on repair passes the detected issues ride
/// along so the provider can build a targeted prompt from them. How the
/// prompt is worded is the provider's business, not this crate's.
#[async_trait]
pub trait Generator: Send + Sync {
    /// Regenerate one slide's content for the given instruction.
    async fn generate(
        &self,
        content: &str,
        instruction: &str,
        issues: &[LayoutIssue],
    ) -> Result<String, GeneratorError>;

    /// Stream the same regeneration if supported (None if not). Callers
    /// must drain the channel to completion before using the text.
    async fn generate_stream(
        &self,
        _content: &str,
        _instruction: &str,
        _issues: &[LayoutIssue],
    ) -> Result<Option<mpsc::Receiver<Result<StreamChunk, GeneratorError>>>, GeneratorError> {
        Ok(None)
    }

    /// Produce a complete deck in serialized form.
    async fn generate_deck(&self, request: &DeckRequest) -> Result<String, GeneratorError>;

    /// Produce a diagram block (e.g. mermaid) for the description.
    async fn generate_diagram(
        &self,
        description: &str,
        diagram_type: &str,
    ) -> Result<String, GeneratorError>;

    /// Produce an image reference line for the prompt.
    async fn generate_image_reference(&self, prompt: &str) -> Result<String, GeneratorError>;

    /// Generator name for logging.
    fn name(&self) -> &str;
}

/// Collect a streamed response into one string. Detection must never see
/// partial output, so this runs to channel close before returning.
pub async fn drain_stream(
    rx: &mut mpsc::Receiver<Result<StreamChunk, GeneratorError>>,
) -> Result<String, GeneratorError> {
    let mut text = String::new();
    while let Some(chunk) = rx.recv().await {
        match chunk? {
            StreamChunk::TextDelta(delta) => text.push_str(&delta),
        }
    }
    if text.trim().is_empty() {
        return Err(GeneratorError::EmptyResponse);
    }
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_drain_stream_concatenates_deltas() {
        let (tx, mut rx) = mpsc::channel(8);
        tx.send(Ok(StreamChunk::TextDelta("# He".to_string())))
            .await
            .unwrap();
        tx.send(Ok(StreamChunk::TextDelta("llo".to_string())))
            .await
            .unwrap();
        drop(tx);
        assert_eq!(drain_stream(&mut rx).await.unwrap(), "# Hello");
    }

    #[tokio::test]
    async fn test_drain_stream_surfaces_mid_stream_error() {
        let (tx, mut rx) = mpsc::channel(8);
        tx.send(Ok(StreamChunk::TextDelta("partial".to_string())))
            .await
            .unwrap();
        tx.send(Err(GeneratorError::Timeout)).await.unwrap();
        drop(tx);
        assert_eq!(drain_stream(&mut rx).await, Err(GeneratorError::Timeout));
    }

    #[tokio::test]
    async fn test_drain_stream_rejects_empty_output() {
        let (tx, mut rx) = mpsc::channel(8);
        drop(tx);
        assert_eq!(
            drain_stream(&mut rx).await,
            Err(GeneratorError::EmptyResponse)
        );
    }

    #[test]
    fn test_deck_request_builder() {
        let request = DeckRequest::new("rust memory model")
            .with_slide_count(12)
            .with_language("de")
            .with_style("academic")
            .with_notes();
        assert_eq!(request.slide_count, 12);
        assert_eq!(request.language, "de");
        assert_eq!(request.style.as_deref(), Some("academic"));
        assert!(request.include_notes);
    }
}
