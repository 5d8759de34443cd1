//! Gemini client for embeddings and answer generation
//!
//! Talks to the Generative Language REST API with an API key. One client
//! serves both the embedding and generation seams.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::config::{EmbeddingConfig, LlmConfig};
use crate::error::{Error, Result};
use crate::providers::embedding::EmbeddingProvider;
use crate::providers::llm::{Generation, LlmProvider, TokenUsage};

const SERVICE: &str = "Gemini";

/// Largest request accepted by `batchEmbedContents`
const MAX_EMBED_BATCH: usize = 100;

/// Gemini client via the Generative Language API
pub struct GeminiClient {
    http: reqwest::Client,
    embed_base_url: String,
    embed_api_key: String,
    embed_model: String,
    dimensions: usize,
    embed_timeout: Duration,
    llm_base_url: String,
    llm_api_key: String,
    generate_model: String,
    temperature: f32,
    llm_timeout: Duration,
}

impl GeminiClient {
    /// Create a new Gemini client
    pub fn new(embeddings: &EmbeddingConfig, llm: &LlmConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .build()
            .map_err(|e| Error::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http,
            embed_base_url: embeddings.base_url.trim_end_matches('/').to_string(),
            embed_api_key: embeddings.api_key.clone(),
            embed_model: embeddings.model.clone(),
            dimensions: embeddings.dimensions,
            embed_timeout: Duration::from_secs(embeddings.timeout_secs),
            llm_base_url: llm.base_url.trim_end_matches('/').to_string(),
            llm_api_key: llm.api_key.clone(),
            generate_model: llm.generate_model.clone(),
            temperature: llm.temperature,
            llm_timeout: Duration::from_secs(llm.timeout_secs),
        })
    }

    fn embed_url(&self, method: &str) -> String {
        format!("{}/models/{}:{}", self.embed_base_url, self.embed_model, method)
    }

    fn model_ref(&self) -> String {
        format!("models/{}", self.embed_model)
    }

    async fn post<Req, Resp>(
        &self,
        url: &str,
        api_key: &str,
        timeout: Duration,
        body: &Req,
    ) -> Result<Resp>
    where
        Req: Serialize + ?Sized,
        Resp: for<'de> Deserialize<'de>,
    {
        let response = self
            .http
            .post(url)
            .header("x-goog-api-key", api_key)
            .timeout(timeout)
            .json(body)
            .send()
            .await
            .map_err(|e| Error::upstream(SERVICE, e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::upstream(SERVICE, format!("{}: {}", status, body)));
        }

        response
            .json()
            .await
            .map_err(|e| Error::upstream(SERVICE, format!("Failed to parse response: {}", e)))
    }

    /// Embed one sub-batch (at most `MAX_EMBED_BATCH` texts)
    async fn embed_batch(&self, texts: &[String], title: &str) -> Result<Vec<Vec<f32>>> {
        let request = BatchEmbedRequest {
            requests: texts
                .iter()
                .map(|text| EmbedRequest {
                    model: self.model_ref(),
                    content: Content::user_text(text),
                    task_type: TaskType::RetrievalDocument,
                    title: Some(title.to_string()),
                })
                .collect(),
        };

        let response: BatchEmbedResponse = self
            .post(
                &self.embed_url("batchEmbedContents"),
                &self.embed_api_key,
                self.embed_timeout,
                &request,
            )
            .await?;

        if response.embeddings.len() != texts.len() {
            return Err(Error::embedding(format!(
                "expected {} embeddings, got {}",
                texts.len(),
                response.embeddings.len()
            )));
        }

        Ok(response.embeddings.into_iter().map(|e| e.values).collect())
    }
}

#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
enum TaskType {
    RetrievalDocument,
    RetrievalQuery,
}

#[derive(Serialize)]
struct Content {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<&'static str>,
    parts: Vec<Part>,
}

impl Content {
    fn user_text(text: &str) -> Self {
        Self {
            role: None,
            parts: vec![Part {
                text: text.to_string(),
            }],
        }
    }
}

#[derive(Serialize)]
struct Part {
    text: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct EmbedRequest {
    model: String,
    content: Content,
    task_type: TaskType,
    #[serde(skip_serializing_if = "Option::is_none")]
    title: Option<String>,
}

#[derive(Serialize)]
struct BatchEmbedRequest {
    requests: Vec<EmbedRequest>,
}

#[derive(Deserialize)]
struct EmbeddingValues {
    #[serde(default)]
    values: Vec<f32>,
}

#[derive(Deserialize)]
struct EmbedResponse {
    #[serde(default)]
    embedding: Option<EmbeddingValues>,
}

impl EmbedResponse {
    fn into_vector(self) -> Result<Vec<f32>> {
        match self.embedding {
            Some(embedding) if !embedding.values.is_empty() => Ok(embedding.values),
            Some(_) => Err(Error::embedding("empty query embedding")),
            None => Err(Error::embedding("no embedding in response")),
        }
    }
}

#[derive(Deserialize)]
struct BatchEmbedResponse {
    #[serde(default)]
    embeddings: Vec<EmbeddingValues>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest {
    contents: Vec<Content>,
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(default)]
    usage_metadata: Option<UsageMetadata>,
}

#[derive(Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<ResponseContent>,
}

#[derive(Deserialize)]
struct ResponseContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Deserialize)]
struct ResponsePart {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct UsageMetadata {
    #[serde(default)]
    prompt_token_count: i64,
    #[serde(default)]
    candidates_token_count: i64,
}

impl GenerateResponse {
    fn into_generation(self) -> Result<Generation> {
        let usage = self.usage_metadata.unwrap_or_default();

        let text = self
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .map(|content| {
                content
                    .parts
                    .into_iter()
                    .filter_map(|p| p.text)
                    .collect::<String>()
            })
            .ok_or_else(|| Error::upstream(SERVICE, "No candidates in response"))?;

        Ok(Generation {
            text,
            usage: TokenUsage {
                prompt_tokens: usage.prompt_token_count,
                completion_tokens: usage.candidates_token_count,
            },
        })
    }
}

#[async_trait]
impl EmbeddingProvider for GeminiClient {
    async fn embed_documents(&self, texts: &[String], title: &str) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        tracing::debug!(
            provider = SERVICE,
            batch_size = texts.len(),
            title,
            "Embedding document chunks"
        );

        let mut vectors = Vec::with_capacity(texts.len());
        for batch in texts.chunks(MAX_EMBED_BATCH) {
            vectors.extend(self.embed_batch(batch, title).await?);
        }
        Ok(vectors)
    }

    async fn embed_query(&self, text: &str) -> Result<Vec<f32>> {
        let request = EmbedRequest {
            model: self.model_ref(),
            content: Content::user_text(text),
            task_type: TaskType::RetrievalQuery,
            title: None,
        };

        let response: EmbedResponse = self
            .post(
                &self.embed_url("embedContent"),
                &self.embed_api_key,
                self.embed_timeout,
                &request,
            )
            .await?;

        response.into_vector()
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    fn name(&self) -> &str {
        "gemini"
    }
}

#[async_trait]
impl LlmProvider for GeminiClient {
    async fn generate(&self, prompt: &str) -> Result<Generation> {
        let request = GenerateRequest {
            contents: vec![Content {
                role: Some("user"),
                parts: vec![Part {
                    text: prompt.to_string(),
                }],
            }],
            generation_config: GenerationConfig {
                temperature: self.temperature,
            },
        };

        let url = format!(
            "{}/models/{}:generateContent",
            self.llm_base_url, self.generate_model
        );

        let response: GenerateResponse = self
            .post(&url, &self.llm_api_key, self.llm_timeout, &request)
            .await?;

        response.into_generation()
    }

    fn name(&self) -> &str {
        "gemini"
    }

    fn model(&self) -> &str {
        &self.generate_model
    }
}
