//! Wire payloads for the OpenAI-compatible chat-completions endpoint.
//!
//! Only the fields this tool reads are modeled; everything else in the
//! upstream response is ignored during deserialization.

use serde::{Deserialize, Serialize};

use crate::core::error::SayError;

pub mod client;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn system<S: Into<String>>(content: S) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user<S: Into<String>>(content: S) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
}

#[derive(Debug, Deserialize)]
pub struct ResponseMessage {
    pub content: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ChatChoice {
    pub message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
pub struct ChatResponse {
    #[serde(default)]
    pub choices: Vec<ChatChoice>,
}

impl ChatResponse {
    /// Extract `choices[0].message.content`, the one field this tool
    /// consumes. Anything else the endpoint sent is already discarded.
    pub fn into_content(self) -> Result<String, SayError> {
        let choice = self
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| SayError::response_shape("response contained no choices"))?;
        choice
            .message
            .content
            .ok_or_else(|| SayError::response_shape("first choice carried no message content"))
    }
}
