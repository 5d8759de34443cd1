//! Mini RAG server binary
//!
//! Run with: cargo run -p mini-rag --bin mini-rag-server

use mini_rag::{config::RagConfig, server::RagServer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "mini_rag=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = RagConfig::from_env()?;

    tracing::info!("Configuration loaded");
    tracing::info!("  - Collection: {}", config.vector_db.collection_name);
    tracing::info!("  - Embedding model: {}", config.embeddings.model);
    tracing::info!("  - Embedding dimensions: {}", config.embeddings.dimensions);
    tracing::info!("  - LLM model: {}", config.llm.generate_model);
    tracing::info!("  - Rerank model: {}", config.rerank.model);

    let server = RagServer::new(config).await?;

    println!("\nServer starting...");
    println!("  API: http://{}", server.address());
    println!("  Health: http://{}/health", server.address());
    println!("\nEndpoints:");
    println!("  POST /api/upload    - Upload a .txt, .pdf or .docx file");
    println!("  POST /api/paste     - Ingest pasted text");
    println!("  POST /api/query     - Ask questions");
    println!("  GET  /api/documents - List documents");
    println!("\nPress Ctrl+C to stop\n");

    server.start().await?;

    Ok(())
}
