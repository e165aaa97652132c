//! The three commands: chunk the profile, load chunks into the index, serve.

use std::sync::Arc;

use anyhow::Context;
use persona_agent::{ServiceContext, Workflow};
use persona_core::config::Requirement;
use persona_core::Config;
use persona_ingest::document::{chunk_profile_file, read_chunks, write_chunks, ChunkConfig};
use persona_ingest::embedding::create_embedder;
use persona_ingest::index::PineconeIndex;
use persona_ingest::{IndexLoader, LoadReport};
use tracing::{info, warn};

use crate::router::build_router;
use crate::state::AppState;

/// Chunk the profile file and write the chunk artifact.
///
/// A missing or malformed profile yields no chunks; the artifact is then left
/// untouched and `Ok(0)` returned.
pub fn run_chunk(config: &Config) -> anyhow::Result<usize> {
    config.validate()?;
    let profile_path = config.storage.profile_path();
    let chunks = chunk_profile_file(&profile_path, &ChunkConfig::from(&config.chunking));
    if chunks.is_empty() {
        warn!(profile = %profile_path.display(), "No chunks produced; chunk file not written");
        return Ok(0);
    }

    let chunks_path = config.storage.chunks_path();
    write_chunks(&chunks_path, &chunks)
        .with_context(|| format!("Failed to write {}", chunks_path.display()))?;
    info!(count = chunks.len(), path = %chunks_path.display(), "Chunking complete");
    Ok(chunks.len())
}

/// Embed the chunk artifact and upsert it into the configured index,
/// creating the index first if needed.
pub async fn run_load(config: &Config) -> anyhow::Result<LoadReport> {
    config.require(Requirement::Load)?;

    let chunks = read_chunks(&config.storage.chunks_path())?;
    info!(count = chunks.len(), "Loaded chunks for indexing");

    let embedder = create_embedder(&config.embedding, &config.llm)?;
    let index = Arc::new(PineconeIndex::from_config(&config.pinecone)?);
    let loader = IndexLoader::new(
        embedder,
        index,
        config.pinecone.metric.clone(),
        config.embedding.batch_size,
    );

    let report = loader.load(&chunks).await.context("Index load failed")?;
    info!(
        created_index = report.created_index,
        upserted = report.upserted,
        "Vector index load complete"
    );
    Ok(report)
}

/// Validate configuration, build service clients and confirm the index exists.
pub async fn build_app_state(config: &Config) -> anyhow::Result<Arc<AppState>> {
    let ctx = ServiceContext::from_config(config).context("Failed to initialise services")?;
    ctx.verify_index().await?;
    let workflow = Workflow::new(Arc::new(ctx));
    Ok(Arc::new(AppState::new(workflow, config)))
}

pub async fn serve(config: &Config) -> anyhow::Result<()> {
    config.log_summary();
    let state = build_app_state(config).await?;
    let app = build_router(state);

    let addr = config.server.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    info!("Server listening on http://{}", addr);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
