use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::{Deserialize, Serialize};

use crate::traits::ContentPart;

// =============================================================================
// Messages
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub(crate) enum Role {
    User,
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct WireMessage {
    pub role: Role,
    pub content: Vec<RequestBlock>,
}

/// Outgoing content. PDFs and plain text go out as `document`, everything else as `image`.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type")]
pub(crate) enum RequestBlock {
    #[serde(rename = "text")]
    Text { text: String },
    #[serde(rename = "image")]
    Image { source: BlockSource },
    #[serde(rename = "document")]
    Document { source: BlockSource },
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct BlockSource {
    /// `base64`, or `text` for decoded plain-text documents.
    #[serde(rename = "type")]
    pub source_type: &'static str,
    pub media_type: String,
    pub data: String,
}

impl From<ContentPart> for RequestBlock {
    fn from(part: ContentPart) -> Self {
        match part {
            ContentPart::Text(text) => RequestBlock::Text { text },
            ContentPart::InlineData { mime_type, data } => {
                if mime_type.starts_with("text/") {
                    if let Some(text) = decode_text(&data) {
                        return RequestBlock::Document {
                            source: BlockSource {
                                source_type: "text",
                                media_type: "text/plain".to_string(),
                                data: text,
                            },
                        };
                    }
                }
                let is_document = mime_type == "application/pdf";
                let source = BlockSource {
                    source_type: "base64",
                    media_type: mime_type,
                    data,
                };
                if is_document {
                    RequestBlock::Document { source }
                } else {
                    RequestBlock::Image { source }
                }
            }
        }
    }
}

/// Claude only takes base64 for PDFs and images; text files are sent decoded.
fn decode_text(data: &str) -> Option<String> {
    let bytes = STANDARD.decode(data).ok()?;
    String::from_utf8(bytes).ok()
}

impl WireMessage {
    pub fn user_parts(parts: Vec<ContentPart>) -> Self {
        Self {
            role: Role::User,
            content: parts.into_iter().map(RequestBlock::from).collect(),
        }
    }
}

// =============================================================================
// Chat Request
// =============================================================================

#[derive(Debug, Clone, Serialize)]
pub(crate) struct ChatRequest {
    pub model: String,
    pub max_tokens: u32,
    pub messages: Vec<WireMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
}

impl ChatRequest {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            max_tokens: 8192,
            messages: Vec::new(),
            system: None,
            temperature: None,
        }
    }

    pub fn system(mut self, system: impl Into<String>) -> Self {
        self.system = Some(system.into());
        self
    }

    pub fn message(mut self, message: WireMessage) -> Self {
        self.messages.push(message);
        self
    }

    pub fn temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }
}

// =============================================================================
// Chat Response
// =============================================================================

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type")]
pub(crate) enum ResponseBlock {
    #[serde(rename = "text")]
    Text { text: String },
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ChatResponse {
    pub content: Vec<ResponseBlock>,
    pub stop_reason: Option<String>,
}

impl ChatResponse {
    pub fn text(&self) -> Option<String> {
        let text: String = self
            .content
            .iter()
            .filter_map(|block| match block {
                ResponseBlock::Text { text } => Some(text.as_str()),
                ResponseBlock::Other => None,
            })
            .collect();
        if text.trim().is_empty() {
            None
        } else {
            Some(text)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn pdf_attachments_become_document_blocks() {
        let message = WireMessage::user_parts(vec![
            ContentPart::inline_data("application/pdf", "JVBERi0="),
            ContentPart::inline_data("image/jpeg", "/9j/"),
            ContentPart::text("plan"),
        ]);
        let value = serde_json::to_value(&message).unwrap();
        assert_eq!(
            value,
            json!({
                "role": "user",
                "content": [
                    {"type": "document", "source": {"type": "base64", "media_type": "application/pdf", "data": "JVBERi0="}},
                    {"type": "image", "source": {"type": "base64", "media_type": "image/jpeg", "data": "/9j/"}},
                    {"type": "text", "text": "plan"}
                ]
            })
        );
    }

    #[test]
    fn text_files_are_sent_decoded() {
        let block = RequestBlock::from(ContentPart::inline_data("text/markdown", "IyBJdGluZXJhcnk="));
        let value = serde_json::to_value(&block).unwrap();
        assert_eq!(
            value,
            json!({"type": "document", "source": {"type": "text", "media_type": "text/plain", "data": "# Itinerary"}})
        );
    }

    #[test]
    fn response_text_ignores_non_text_blocks() {
        let response: ChatResponse = serde_json::from_value(json!({
            "content": [
                {"type": "thinking", "thinking": "..."},
                {"type": "text", "text": "{}"}
            ],
            "stop_reason": "end_turn"
        }))
        .unwrap();
        assert_eq!(response.text().as_deref(), Some("{}"));
    }
}
