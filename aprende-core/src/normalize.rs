//! Content normalization shared by the provider adapters
//!
//! Providers differ in how much of a multimodal message they can take:
//! Gemini has one text slot plus one inline attachment, Groq is text only.
//! The OpenAI part conversion lives next to its wire types in
//! [`crate::providers::openai::converter`].

use crate::content::{ContentPart, UserContent};

/// Appended at the position of every attachment a text-only model cannot see
pub const ATTACHMENT_DISCLAIMER: &str = "[Uma imagem da página do livro foi anexada, mas este modelo não consegue visualizá-la. Baseie-se exclusivamente nos metadados textuais informados: componente curricular, ano, volume e página.]";

/// Appended once, at the end, when at least one attachment was dropped
pub const METADATA_ONLY_INSTRUCTION: &str = "IMPORTANTE: você não tem acesso ao conteúdo visual da página. Elabore a resposta apenas com base nos metadados fornecidos (componente curricular, ano, volume e página), sem inventar detalhes do conteúdo da página.";

/// Separator between appended text fragments for text-only providers
const TEXT_SEPARATOR: &str = "\n\n";

/// Inline binary attachment (`{mimeType, data}` in Gemini terms)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InlineBinary {
    pub mime_type: String,
    pub data: String,
}

/// Content reduced to one text slot and at most one attachment
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SingleSlot {
    pub text: String,
    pub attachment: Option<InlineBinary>,
}

/// Reduce content for providers with a single text slot.
///
/// The last text part wins, and so does the last attachment. Documents go
/// into the same inline slot as images whatever their media type.
pub fn single_slot(content: &UserContent) -> SingleSlot {
    match content {
        UserContent::Text(text) => SingleSlot {
            text: text.clone(),
            attachment: None,
        },
        UserContent::Parts(parts) => {
            let mut slot = SingleSlot::default();
            for part in parts {
                match part {
                    ContentPart::Text { text } => slot.text = text.clone(),
                    ContentPart::Image { source } | ContentPart::Document { source } => {
                        slot.attachment = Some(InlineBinary {
                            mime_type: source.media_type.clone(),
                            data: source.data.clone(),
                        });
                    }
                    ContentPart::Unsupported => {}
                }
            }
            slot
        }
    }
}

/// Build the prompt for a provider without vision.
///
/// Text parts are appended in order. Each attachment is replaced by
/// [`ATTACHMENT_DISCLAIMER`] and, if any was present, the prompt ends with
/// [`METADATA_ONLY_INSTRUCTION`]. Attachment bytes never reach the prompt.
pub fn text_only(content: &UserContent) -> String {
    let parts = match content {
        UserContent::Text(text) => return text.clone(),
        UserContent::Parts(parts) => parts,
    };

    let mut fragments: Vec<&str> = Vec::with_capacity(parts.len() + 1);
    let mut dropped_attachment = false;
    for part in parts {
        match part {
            ContentPart::Text { text } => fragments.push(text),
            ContentPart::Image { .. } | ContentPart::Document { .. } => {
                fragments.push(ATTACHMENT_DISCLAIMER);
                dropped_attachment = true;
            }
            ContentPart::Unsupported => {}
        }
    }
    if dropped_attachment {
        fragments.push(METADATA_ONLY_INSTRUCTION);
    }
    fragments.join(TEXT_SEPARATOR)
}
