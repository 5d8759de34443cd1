//! LLM provider trait for generating answers

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Token counts as reported by the model
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    pub prompt_tokens: i64,
    pub completion_tokens: i64,
}

/// Raw model output plus usage
#[derive(Debug, Clone, PartialEq)]
pub struct Generation {
    pub text: String,
    pub usage: TokenUsage,
}

/// Trait for text generation from a fully-built prompt
///
/// Implementations:
/// - `GeminiClient`: Generative Language API (gemini-1.5-flash)
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Generate a completion for `prompt`
    async fn generate(&self, prompt: &str) -> Result<Generation>;

    /// Get provider name for logging
    fn name(&self) -> &str;

    /// Get the model being used
    fn model(&self) -> &str;
}
