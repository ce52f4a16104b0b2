//! Reflection cycles against a text-generation service.
//!
//! The service is opaque: one prompt in, one reply out. All structure in the
//! reply is recovered here by [`parse_reply`].

mod client;
mod parse;
mod prompt;

pub use client::*;
pub use parse::*;
pub use prompt::*;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Why a reflection cycle was started.
///
/// - `Learn`: first exposure to a file and its memo
/// - `Forget`: the file is being sent to the abyss
/// - `Remember`: the file is being restored from the abyss
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ThoughtMode {
    Learn,
    Forget,
    Remember,
}

impl ThoughtMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Learn => "learn",
            Self::Forget => "forget",
            Self::Remember => "remember",
        }
    }
}

/// One call to the generation service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationRequest {
    pub model: String,
    pub prompt: String,
}

/// Generation service errors.
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Unauthorized: API key missing or rejected")]
    Unauthorized,

    #[error("Server error: {0}")]
    Server(String),

    #[error("Reply contained no text")]
    EmptyReply,
}

/// A text-generation service.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, request: &GenerationRequest) -> Result<String, GenerationError>;
}
