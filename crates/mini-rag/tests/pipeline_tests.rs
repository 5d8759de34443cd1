//! End-to-end pipeline tests over fake model services and the in-memory index

mod common;

use std::collections::BTreeSet;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;

use common::*;
use mini_rag::error::Error;
use mini_rag::generation::AnswerGenerator;
use mini_rag::providers::{DistanceMetric, InMemoryVectorIndex, VectorIndex};
use mini_rag::retrieval::{list_documents, SEARCH_LIMIT};
use mini_rag::types::response::NO_RESULTS_ANSWER;
use mini_rag::{DocumentScope, IngestPipeline, QueryEngine};

struct Harness {
    embedder: Arc<LetterEmbedder>,
    reranker: Arc<ReversingReranker>,
    llm: Arc<ScriptedLlm>,
    index: Arc<InMemoryVectorIndex>,
    ingest: IngestPipeline,
    engine: QueryEngine,
}

async fn harness(reranker: ReversingReranker, llm: ScriptedLlm) -> Harness {
    let embedder = shared(LetterEmbedder::default());
    let reranker = shared(reranker);
    let llm = shared(llm);
    let index = shared(InMemoryVectorIndex::new("pipeline"));
    index.ensure_collection(DIMS, DistanceMetric::Cosine).await.unwrap();

    let ingest = IngestPipeline::new(embedder.clone(), index.clone());
    let engine = QueryEngine::new(
        embedder.clone(),
        index.clone(),
        reranker.clone(),
        AnswerGenerator::new(llm.clone(), Duration::from_secs(5)),
    );

    Harness {
        embedder,
        reranker,
        llm,
        index,
        ingest,
        engine,
    }
}

#[tokio::test]
async fn ingest_stores_every_chunk_with_contiguous_numbers() {
    let h = harness(ReversingReranker::default(), ScriptedLlm::new("", 0, 0)).await;
    let text = "Lorem ipsum dolor sit amet, consectetur adipiscing elit. ".repeat(120);

    let message = h
        .ingest
        .process_and_upload_document(text.as_bytes(), "lorem.txt")
        .await
        .unwrap();

    let rows = h.index.scroll(1000, &["source", "chunk_num"]).await.unwrap();
    let n = rows.len();
    assert!(n > 1);
    assert_eq!(
        message,
        format!("Successfully processed 'lorem.txt' and uploaded {} chunks.", n)
    );

    let numbers: BTreeSet<u64> = rows
        .iter()
        .map(|r| r.payload["chunk_num"].as_u64().unwrap())
        .collect();
    assert_eq!(numbers, (1..=n as u64).collect::<BTreeSet<u64>>());
    assert!(rows.iter().all(|r| r.payload["source"] == "lorem.txt"));

    assert_eq!(h.embedder.document_calls.load(Ordering::SeqCst), 1);
    assert_eq!(h.embedder.titles.lock().as_slice(), ["lorem.txt".to_string()]);
}

#[tokio::test]
async fn query_numbers_passages_in_reranked_order() {
    let llm = ScriptedLlm::new(
        "Rayleigh scattering [1]. Also [2][2]. Not real [9].",
        1_000_000,
        0,
    );
    let h = harness(ReversingReranker::default(), llm).await;
    h.ingest
        .process_and_upload_document(sky_text().as_bytes(), "sky.txt")
        .await
        .unwrap();
    h.ingest
        .process_and_upload_document(b"Cooking pasta needs salted boiling water.", "pasta.txt")
        .await
        .unwrap();

    let result = h
        .engine
        .answer_query("Why is the sky blue?", &DocumentScope::All)
        .await
        .unwrap();

    let seen = h.reranker.seen.lock().clone();
    assert_eq!(seen.len(), 1);
    let candidates = &seen[0];
    assert!(candidates.len() <= SEARCH_LIMIT);

    // The reversing reranker puts the last search candidate first
    let prompt = h.llm.prompts.lock()[0].clone();
    let first_block = prompt.find("Source [1]:").unwrap();
    let first_text = candidates.last().unwrap();
    assert!(prompt[first_block..].contains(first_text.as_str()));

    let nums: Vec<usize> = result.sources.iter().map(|c| c.citation_num).collect();
    assert_eq!(nums, vec![1, 2]);
    assert_eq!(&result.sources[0].text, first_text);
    assert_eq!(result.answer, "Rayleigh scattering [1]. Also [2][2]. Not real [9].");
    assert_eq!(result.prompt_tokens, 1_000_000);
    assert_eq!(result.completion_tokens, 0);
    assert_eq!(result.cost, 0.35);
    assert!(result.duration >= 0.0);
}

#[tokio::test]
async fn scoped_query_only_sees_selected_document() {
    let h = harness(ReversingReranker::default(), ScriptedLlm::new("Pasta [1].", 10, 5)).await;
    h.ingest
        .process_and_upload_document(sky_text().as_bytes(), "sky.txt")
        .await
        .unwrap();
    h.ingest
        .process_and_upload_document(b"Cooking pasta needs salted boiling water.", "pasta.txt")
        .await
        .unwrap();

    let scope = DocumentScope::from_selection(Some("pasta.txt"));
    let result = h.engine.answer_query("sky blue", &scope).await.unwrap();

    let seen = h.reranker.seen.lock().clone();
    assert_eq!(seen[0], vec!["Cooking pasta needs salted boiling water.".to_string()]);
    assert_eq!(result.sources.len(), 1);
    assert_eq!(result.sources[0].source_file, "pasta.txt");
}

#[tokio::test]
async fn zero_hits_skip_rerank_and_generation() {
    let h = harness(ReversingReranker::default(), ScriptedLlm::new("unused [1]", 5, 5)).await;
    h.ingest
        .process_and_upload_document(b"Some text.", "present.txt")
        .await
        .unwrap();

    let scope = DocumentScope::Document("absent.pdf".to_string());
    let result = h.engine.answer_query("anything", &scope).await.unwrap();

    assert_eq!(result.answer, NO_RESULTS_ANSWER);
    assert!(result.sources.is_empty());
    assert_eq!(result.prompt_tokens, 0);
    assert_eq!(result.completion_tokens, 0);
    assert_eq!(result.cost, 0.0);
    assert_eq!(h.reranker.calls.load(Ordering::SeqCst), 0);
    assert_eq!(h.llm.calls(), 0);
}

#[tokio::test]
async fn empty_index_returns_canned_answer() {
    let h = harness(ReversingReranker::default(), ScriptedLlm::new("unused", 1, 1)).await;
    let result = h.engine.answer_query("hello", &DocumentScope::All).await.unwrap();
    assert_eq!(result.answer, NO_RESULTS_ANSWER);
    assert_eq!(h.embedder.query_calls.load(Ordering::SeqCst), 1);
    assert_eq!(h.llm.calls(), 0);
}

#[tokio::test]
async fn out_of_range_rerank_index_is_upstream_error() {
    let reranker = ReversingReranker {
        bogus_index: Some(42),
        ..Default::default()
    };
    let h = harness(reranker, ScriptedLlm::new("x [1]", 1, 1)).await;
    h.ingest
        .process_and_upload_document(b"Blue skies.", "sky.txt")
        .await
        .unwrap();

    let result = h.engine.answer_query("sky", &DocumentScope::All).await;
    assert!(matches!(result, Err(Error::Upstream { .. })));
    assert_eq!(h.llm.calls(), 0);
}

#[tokio::test]
async fn negative_usage_is_invalid_input() {
    let h = harness(ReversingReranker::default(), ScriptedLlm::new("x [1]", -3, 1)).await;
    h.ingest
        .process_and_upload_document(b"Blue skies.", "sky.txt")
        .await
        .unwrap();

    let result = h.engine.answer_query("sky", &DocumentScope::All).await;
    assert!(matches!(result, Err(Error::InvalidInput(_))));
}

#[tokio::test]
async fn unsupported_upload_never_reaches_embedder() {
    let h = harness(ReversingReranker::default(), ScriptedLlm::new("", 0, 0)).await;
    let result = h
        .ingest
        .process_and_upload_document(b"a,b\n1,2", "table.csv")
        .await;

    assert!(matches!(result, Err(Error::UnsupportedFormat { .. })));
    assert_eq!(h.embedder.document_calls.load(Ordering::SeqCst), 0);
    assert!(h.index.is_empty());
}

#[tokio::test]
async fn listing_reflects_ingested_sources() {
    let h = harness(ReversingReranker::default(), ScriptedLlm::new("", 0, 0)).await;
    assert!(list_documents(h.index.as_ref()).await.unwrap().is_empty());

    for name in ["b.txt", "a.txt", "b.txt"] {
        h.ingest
            .process_and_upload_document(b"content", name)
            .await
            .unwrap();
    }

    let documents = list_documents(h.index.as_ref()).await.unwrap();
    assert_eq!(documents, vec!["a.txt", "b.txt"]);
}

#[tokio::test]
async fn listing_missing_collection_is_empty() {
    let documents = list_documents(&MissingCollectionIndex).await.unwrap();
    assert!(documents.is_empty());
}
