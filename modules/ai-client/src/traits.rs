use async_trait::async_trait;

use crate::error::AiError;

// =============================================================================
// Content Parts
// =============================================================================

/// One piece of a multimodal prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentPart {
    Text(String),
    /// Base64 payload plus its declared media type (`image/png`, `application/pdf`, ...).
    InlineData { mime_type: String, data: String },
}

impl ContentPart {
    pub fn text(content: impl Into<String>) -> Self {
        Self::Text(content.into())
    }

    pub fn inline_data(mime_type: impl Into<String>, data: impl Into<String>) -> Self {
        Self::InlineData {
            mime_type: mime_type.into(),
            data: data.into(),
        }
    }

    pub fn is_text(&self) -> bool {
        matches!(self, Self::Text(_))
    }
}

// =============================================================================
// CompletionModel Trait
// =============================================================================

/// Dyn-compatible single-shot completion: parts in, model text out.
#[async_trait]
pub trait CompletionModel: Send + Sync {
    /// Provider name for logs (`gemini`, `claude`, ...).
    fn provider(&self) -> &'static str;

    fn model(&self) -> &str;

    async fn complete(&self, parts: Vec<ContentPart>) -> Result<String, AiError>;

    async fn complete_text(&self, prompt: &str) -> Result<String, AiError> {
        self.complete(vec![ContentPart::text(prompt)]).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Echo;

    #[async_trait]
    impl CompletionModel for Echo {
        fn provider(&self) -> &'static str {
            "echo"
        }

        fn model(&self) -> &str {
            "echo-1"
        }

        async fn complete(&self, parts: Vec<ContentPart>) -> Result<String, AiError> {
            Ok(format!("{} part(s): {:?}", parts.len(), parts[0]))
        }
    }

    #[test]
    fn complete_text_sends_a_single_text_part() {
        let model: Box<dyn CompletionModel> = Box::new(Echo);
        let reply = tokio_test::block_on(model.complete_text("hello")).unwrap();
        assert_eq!(reply, r#"1 part(s): Text("hello")"#);
    }
}
