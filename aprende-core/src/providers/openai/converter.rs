//! Conversion from canonical user content to OpenAI message content

use super::types::{OpenAIContent, OpenAIContentPart, OpenAIImageUrl};
use crate::content::{ContentPart, UserContent};

/// Sent in place of a document, whose bytes are not forwarded to OpenAI
pub const DOCUMENT_PLACEHOLDER: &str =
    "[Arquivo PDF enviado. Analise com base na descrição e observações do professor.]";

/// Convert user content, keeping every part in order.
///
/// Text stays text, images become `data:` URLs and documents become
/// [`DOCUMENT_PLACEHOLDER`].
pub fn to_openai_content(content: &UserContent) -> OpenAIContent {
    match content {
        UserContent::Text(text) => OpenAIContent::Text(text.clone()),
        UserContent::Parts(parts) => OpenAIContent::Parts(
            parts
                .iter()
                .filter_map(|part| match part {
                    ContentPart::Text { text } => {
                        Some(OpenAIContentPart::Text { text: text.clone() })
                    }
                    ContentPart::Image { source } => Some(OpenAIContentPart::ImageUrl {
                        image_url: OpenAIImageUrl {
                            url: format!("data:{};base64,{}", source.media_type, source.data),
                        },
                    }),
                    ContentPart::Document { .. } => Some(OpenAIContentPart::Text {
                        text: DOCUMENT_PLACEHOLDER.to_string(),
                    }),
                    ContentPart::Unsupported => None,
                })
                .collect(),
        ),
    }
}
