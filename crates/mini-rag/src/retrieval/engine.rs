//! Query pipeline: embed, search, rerank, generate, cite, price

use std::sync::Arc;
use std::time::Instant;

use crate::error::{Error, Result};
use crate::generation::{resolve_citations, AnswerGenerator, CostEstimator};
use crate::providers::{EmbeddingProvider, PayloadFilter, Reranker, VectorIndex};
use crate::types::response::round_duration;
use crate::types::{ChunkPayload, DocumentScope, QueryResult};

/// Candidates fetched from the vector index
pub const SEARCH_LIMIT: usize = 10;
/// Passages kept after reranking and shown to the model
pub const RERANK_TOP_N: usize = 3;

/// Answers queries against the vector index
#[derive(Clone)]
pub struct QueryEngine {
    embedder: Arc<dyn EmbeddingProvider>,
    index: Arc<dyn VectorIndex>,
    reranker: Arc<dyn Reranker>,
    generator: AnswerGenerator,
    cost: CostEstimator,
}

impl QueryEngine {
    pub fn new(
        embedder: Arc<dyn EmbeddingProvider>,
        index: Arc<dyn VectorIndex>,
        reranker: Arc<dyn Reranker>,
        generator: AnswerGenerator,
    ) -> Self {
        Self {
            embedder,
            index,
            reranker,
            generator,
            cost: CostEstimator::default(),
        }
    }

    /// Answer `query`, optionally restricted to one source document.
    ///
    /// A search with no hits returns the canned answer without calling the
    /// reranker or the model.
    pub async fn answer_query(&self, query: &str, scope: &DocumentScope) -> Result<QueryResult> {
        let start = Instant::now();

        let query_vector = self.embedder.embed_query(query).await?;
        if query_vector.is_empty() {
            return Err(Error::embedding("Failed to embed the query."));
        }

        let filter = scope.source().map(PayloadFilter::source);
        let hits = self
            .index
            .search(&query_vector, filter.as_ref(), SEARCH_LIMIT)
            .await?;

        if hits.is_empty() {
            tracing::info!(?scope, "No hits for query");
            return Ok(QueryResult::no_results(round_duration(
                start.elapsed().as_secs_f64(),
            )));
        }

        let candidates: Vec<ChunkPayload> = hits.into_iter().map(|h| h.payload).collect();
        let passages = self.select_passages(query, candidates).await?;

        let generated = self.generator.generate(query, &passages).await?;
        let usage = generated.usage;
        let cost = self.cost.estimate(usage.prompt_tokens, usage.completion_tokens)?;
        let sources = resolve_citations(&generated.answer, &passages);

        let duration = round_duration(start.elapsed().as_secs_f64());
        tracing::info!(
            hits = passages.len(),
            cited = sources.len(),
            prompt_tokens = usage.prompt_tokens,
            completion_tokens = usage.completion_tokens,
            duration,
            "Answered query"
        );

        Ok(QueryResult {
            answer: generated.answer,
            sources,
            duration,
            prompt_tokens: token_count(usage.prompt_tokens)?,
            completion_tokens: token_count(usage.completion_tokens)?,
            cost,
        })
    }

    /// Rerank the candidates and keep the top passages in reranked order
    async fn select_passages(
        &self,
        query: &str,
        candidates: Vec<ChunkPayload>,
    ) -> Result<Vec<ChunkPayload>> {
        let texts: Vec<String> = candidates.iter().map(|c| c.text.clone()).collect();
        let ranked = self.reranker.rerank(query, &texts, RERANK_TOP_N).await?;

        let mut passages = Vec::with_capacity(ranked.len().min(RERANK_TOP_N));
        for result in ranked.into_iter().take(RERANK_TOP_N) {
            let passage = candidates.get(result.index).ok_or_else(|| {
                Error::upstream(
                    self.reranker.name(),
                    format!(
                        "rerank index {} out of range for {} candidates",
                        result.index,
                        candidates.len()
                    ),
                )
            })?;
            passages.push(passage.clone());
        }

        Ok(passages)
    }
}

fn token_count(count: i64) -> Result<u64> {
    u64::try_from(count)
        .map_err(|_| Error::InvalidInput(format!("negative token count {}", count)))
}
