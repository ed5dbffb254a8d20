use ai_client::ContentPart;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use wayfarer_common::ItineraryError;

/// An inline file sent alongside the prompt: declared media type plus base64 payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    pub mime_type: String,
    pub data: String,
}

impl Attachment {
    /// Parse a `data:<mime>;base64,<payload>` URI.
    pub fn from_data_uri(uri: &str) -> Result<Self, ItineraryError> {
        let invalid = |reason: &str| ItineraryError::InvalidAttachment(reason.to_string());

        let rest = uri
            .trim()
            .strip_prefix("data:")
            .ok_or_else(|| invalid("expected a data: URI"))?;
        let (meta, payload) = rest
            .split_once(',')
            .ok_or_else(|| invalid("data URI has no payload"))?;

        let mut params = meta.split(';');
        let mime_type = params.next().unwrap_or_default().trim().to_ascii_lowercase();
        if !params.any(|p| p.trim().eq_ignore_ascii_case("base64")) {
            return Err(invalid("only base64 data URIs are supported"));
        }
        if mime_type.is_empty() || !mime_type.contains('/') {
            return Err(invalid("data URI has no media type"));
        }

        let data = payload.trim();
        if data.is_empty() {
            return Err(invalid("data URI payload is empty"));
        }
        STANDARD
            .decode(data)
            .map_err(|e| ItineraryError::InvalidAttachment(format!("payload is not base64: {e}")))?;

        Ok(Self {
            mime_type,
            data: data.to_string(),
        })
    }

    pub fn from_bytes(mime_type: impl Into<String>, bytes: &[u8]) -> Self {
        Self {
            mime_type: mime_type.into(),
            data: STANDARD.encode(bytes),
        }
    }

    pub fn to_data_uri(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, self.data)
    }

    pub fn into_part(self) -> ContentPart {
        ContentPart::inline_data(self.mime_type, self.data)
    }
}

/// Media type for a file extension, as the planner reads attachments from disk.
pub fn mime_for_extension(extension: &str) -> &'static str {
    match extension.to_ascii_lowercase().as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "heic" => "image/heic",
        "pdf" => "application/pdf",
        "txt" => "text/plain",
        "md" => "text/markdown",
        "csv" => "text/csv",
        _ => "application/octet-stream",
    }
}
