//! OpenAI provider implementation
//!
//! Chat completions with multimodal user messages. The wire types are shared
//! with the Groq adapter.

mod client;
pub mod converter;
pub mod types;

pub use client::OpenAIProvider;
pub use types::{OpenAIContent, OpenAIRequest};
