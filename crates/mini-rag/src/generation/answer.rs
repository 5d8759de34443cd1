//! Grounded answer generation

use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;

use crate::error::{Error, Result};
use crate::providers::{LlmProvider, TokenUsage};
use crate::types::ChunkPayload;

use super::prompt::PromptBuilder;

/// Raw answer text and the usage the model reported
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedAnswer {
    pub answer: String,
    pub usage: TokenUsage,
}

/// Aborts the wrapped task when dropped, so a cancelled request does not
/// leave a generation call running
struct AbortOnDrop<T>(JoinHandle<T>);

impl<T> Drop for AbortOnDrop<T> {
    fn drop(&mut self) {
        self.0.abort();
    }
}

/// Builds the grounding prompt and calls the model
#[derive(Clone)]
pub struct AnswerGenerator {
    llm: Arc<dyn LlmProvider>,
    timeout: Duration,
}

impl AnswerGenerator {
    pub fn new(llm: Arc<dyn LlmProvider>, timeout: Duration) -> Self {
        Self { llm, timeout }
    }

    /// Generate an answer for `query` from the selected passages.
    ///
    /// Citation numbers in the answer refer to positions in `passages`.
    pub async fn generate(&self, query: &str, passages: &[ChunkPayload]) -> Result<GeneratedAnswer> {
        let prompt = PromptBuilder::build_rag_prompt(query, passages);
        tracing::debug!(
            model = self.llm.model(),
            passages = passages.len(),
            prompt_chars = prompt.len(),
            "Generating answer"
        );

        let llm = Arc::clone(&self.llm);
        let mut task = AbortOnDrop(tokio::spawn(async move { llm.generate(&prompt).await }));

        let generation = match tokio::time::timeout(self.timeout, &mut task.0).await {
            Ok(joined) => {
                joined.map_err(|e| Error::internal(format!("Generation task failed: {}", e)))??
            }
            Err(_) => {
                return Err(Error::upstream(
                    self.llm.name(),
                    format!("generation timed out after {:?}", self.timeout),
                ))
            }
        };

        Ok(GeneratedAnswer {
            answer: generation.text,
            usage: generation.usage,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::Generation;
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use std::sync::atomic::{AtomicBool, Ordering};

    struct RecordingLlm {
        prompts: Mutex<Vec<String>>,
        delay: Duration,
    }

    #[async_trait]
    impl LlmProvider for RecordingLlm {
        async fn generate(&self, prompt: &str) -> Result<Generation> {
            self.prompts.lock().push(prompt.to_string());
            tokio::time::sleep(self.delay).await;
            Ok(Generation {
                text: "It is blue [1].".to_string(),
                usage: TokenUsage {
                    prompt_tokens: 120,
                    completion_tokens: 8,
                },
            })
        }

        fn name(&self) -> &str {
            "recording"
        }

        fn model(&self) -> &str {
            "test-model"
        }
    }

    fn passage() -> ChunkPayload {
        ChunkPayload {
            text: "The sky is blue.".to_string(),
            source: "sky.txt".to_string(),
            chunk_num: 1,
        }
    }

    #[tokio::test]
    async fn test_returns_text_and_usage() {
        let llm = Arc::new(RecordingLlm {
            prompts: Mutex::new(Vec::new()),
            delay: Duration::ZERO,
        });
        let generator = AnswerGenerator::new(llm.clone(), Duration::from_secs(5));

        let answer = generator.generate("What colour?", &[passage()]).await.unwrap();
        assert_eq!(answer.answer, "It is blue [1].");
        assert_eq!(answer.usage.prompt_tokens, 120);
        assert_eq!(answer.usage.completion_tokens, 8);

        let prompts = llm.prompts.lock();
        assert_eq!(prompts.len(), 1);
        assert!(prompts[0].contains("Source [1]: (From File: sky.txt, Chunk: 1)"));
    }

    /// Sleeps, then records that it ran to completion
    struct SlowLlm {
        started: Arc<AtomicBool>,
        finished: Arc<AtomicBool>,
    }

    #[async_trait]
    impl LlmProvider for SlowLlm {
        async fn generate(&self, _prompt: &str) -> Result<Generation> {
            self.started.store(true, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(100)).await;
            self.finished.store(true, Ordering::SeqCst);
            Ok(Generation {
                text: String::new(),
                usage: TokenUsage::default(),
            })
        }

        fn name(&self) -> &str {
            "slow"
        }

        fn model(&self) -> &str {
            "slow-model"
        }
    }

    #[tokio::test]
    async fn test_dropping_caller_aborts_generation() {
        let started = Arc::new(AtomicBool::new(false));
        let finished = Arc::new(AtomicBool::new(false));
        let llm = Arc::new(SlowLlm {
            started: started.clone(),
            finished: finished.clone(),
        });
        let generator = AnswerGenerator::new(llm, Duration::from_secs(30));

        let passages = [passage()];
        let outcome =
            tokio::time::timeout(Duration::from_millis(20), generator.generate("q", &passages)).await;
        assert!(outcome.is_err());

        tokio::time::sleep(Duration::from_millis(300)).await;
        assert!(started.load(Ordering::SeqCst));
        assert!(!finished.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_timeout_is_upstream_error() {
        let llm = Arc::new(RecordingLlm {
            prompts: Mutex::new(Vec::new()),
            delay: Duration::from_secs(600),
        });
        let generator = AnswerGenerator::new(llm, Duration::from_millis(50));

        let result = generator.generate("q", &[passage()]).await;
        assert!(matches!(result, Err(Error::Upstream { .. })));
    }
}
