//! Token usage to cost conversion

use crate::error::{Error, Result};

/// Default input rate, currency units per million prompt tokens
pub const PROMPT_RATE_PER_MILLION: f64 = 0.35;
/// Default output rate, currency units per million completion tokens
pub const COMPLETION_RATE_PER_MILLION: f64 = 0.70;

/// Fixed-rate cost estimator
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CostEstimator {
    pub prompt_rate: f64,
    pub completion_rate: f64,
}

impl Default for CostEstimator {
    fn default() -> Self {
        Self {
            prompt_rate: PROMPT_RATE_PER_MILLION,
            completion_rate: COMPLETION_RATE_PER_MILLION,
        }
    }
}

impl CostEstimator {
    /// `prompt/1e6 * prompt_rate + completion/1e6 * completion_rate`
    pub fn estimate(&self, prompt_tokens: i64, completion_tokens: i64) -> Result<f64> {
        if prompt_tokens < 0 || completion_tokens < 0 {
            return Err(Error::InvalidInput(format!(
                "token counts must be non-negative (prompt={}, completion={})",
                prompt_tokens, completion_tokens
            )));
        }

        Ok(prompt_tokens as f64 / 1_000_000.0 * self.prompt_rate
            + completion_tokens as f64 / 1_000_000.0 * self.completion_rate)
    }
}
