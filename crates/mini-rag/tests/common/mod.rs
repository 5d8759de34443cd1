//! Fake collaborators shared by the integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use mini_rag::error::{Error, Result};
use mini_rag::providers::vector_store::ScrolledRecord;
use mini_rag::providers::{
    DistanceMetric, EmbeddingProvider, Generation, LlmProvider, PayloadFilter, RerankResult,
    Reranker, TokenUsage, VectorIndex,
};
use mini_rag::types::{IndexedRecord, SearchHit};

pub const DIMS: usize = 26;

/// Letter-frequency embedding: texts sharing letters land close together
pub fn letter_vector(text: &str) -> Vec<f32> {
    let mut v = vec![0.0f32; DIMS];
    for c in text.chars().filter(|c| c.is_ascii_alphabetic()) {
        v[(c.to_ascii_lowercase() as u8 - b'a') as usize] += 1.0;
    }
    // Never return a zero vector
    v[0] += 0.01;
    v
}

#[derive(Default)]
pub struct LetterEmbedder {
    pub document_calls: AtomicUsize,
    pub query_calls: AtomicUsize,
    pub titles: Mutex<Vec<String>>,
}

#[async_trait]
impl EmbeddingProvider for LetterEmbedder {
    async fn embed_documents(&self, texts: &[String], title: &str) -> Result<Vec<Vec<f32>>> {
        self.document_calls.fetch_add(1, Ordering::SeqCst);
        self.titles.lock().push(title.to_string());
        Ok(texts.iter().map(|t| letter_vector(t)).collect())
    }

    async fn embed_query(&self, text: &str) -> Result<Vec<f32>> {
        self.query_calls.fetch_add(1, Ordering::SeqCst);
        Ok(letter_vector(text))
    }

    fn dimensions(&self) -> usize {
        DIMS
    }

    fn name(&self) -> &str {
        "letters"
    }
}

/// Reverses the candidate order, optionally appending a bogus index
#[derive(Default)]
pub struct ReversingReranker {
    pub calls: AtomicUsize,
    pub seen: Mutex<Vec<Vec<String>>>,
    pub bogus_index: Option<usize>,
}

#[async_trait]
impl Reranker for ReversingReranker {
    async fn rerank(
        &self,
        _query: &str,
        documents: &[String],
        top_n: usize,
    ) -> Result<Vec<RerankResult>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.seen.lock().push(documents.to_vec());

        let mut results: Vec<RerankResult> = (0..documents.len())
            .rev()
            .take(top_n)
            .enumerate()
            .map(|(rank, index)| RerankResult {
                index,
                relevance_score: 1.0 - rank as f32 * 0.1,
            })
            .collect();

        if let Some(index) = self.bogus_index {
            results.insert(0, RerankResult { index, relevance_score: 2.0 });
        }
        Ok(results)
    }

    fn name(&self) -> &str {
        "reversing"
    }
}

/// Returns a canned answer and records every prompt
pub struct ScriptedLlm {
    pub answer: String,
    pub usage: TokenUsage,
    pub fail: bool,
    pub prompts: Mutex<Vec<String>>,
}

impl ScriptedLlm {
    pub fn new(answer: &str, prompt_tokens: i64, completion_tokens: i64) -> Self {
        Self {
            answer: answer.to_string(),
            usage: TokenUsage {
                prompt_tokens,
                completion_tokens,
            },
            fail: false,
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::new("", 0, 0)
        }
    }

    pub fn calls(&self) -> usize {
        self.prompts.lock().len()
    }
}

#[async_trait]
impl LlmProvider for ScriptedLlm {
    async fn generate(&self, prompt: &str) -> Result<Generation> {
        self.prompts.lock().push(prompt.to_string());
        if self.fail {
            return Err(Error::upstream("scripted", "503 upstream secret detail"));
        }
        Ok(Generation {
            text: self.answer.clone(),
            usage: self.usage,
        })
    }

    fn name(&self) -> &str {
        "scripted"
    }

    fn model(&self) -> &str {
        "scripted-model"
    }
}

/// An index whose collection never comes into existence
pub struct MissingCollectionIndex;

#[async_trait]
impl VectorIndex for MissingCollectionIndex {
    async fn ensure_collection(&self, _dimensions: usize, _distance: DistanceMetric) -> Result<()> {
        Ok(())
    }

    async fn upsert(&self, _records: Vec<IndexedRecord>, _wait: bool) -> Result<()> {
        Err(Error::CollectionNotFound("gone".to_string()))
    }

    async fn search(
        &self,
        _vector: &[f32],
        _filter: Option<&PayloadFilter>,
        _limit: usize,
    ) -> Result<Vec<SearchHit>> {
        Err(Error::CollectionNotFound("gone".to_string()))
    }

    async fn scroll(&self, _limit: usize, _fields: &[&str]) -> Result<Vec<ScrolledRecord>> {
        Err(Error::CollectionNotFound("gone".to_string()))
    }

    fn name(&self) -> &str {
        "missing"
    }
}

pub fn sky_text() -> String {
    let mut text = String::new();
    for i in 0..12 {
        text.push_str(&format!(
            "Paragraph {} explains that the sky appears blue because of Rayleigh scattering of sunlight by air molecules.\n\n",
            i
        ));
    }
    text
}

pub fn shared<T>(value: T) -> Arc<T> {
    Arc::new(value)
}
