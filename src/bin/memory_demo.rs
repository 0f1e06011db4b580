//! Memory-agent demo: prove that a fact survives across two independent
//! invocation contexts, i.e. that persistence is store-backed rather than
//! conversational recall.

use std::error::Error;
use std::sync::Arc;

use tracing::info;
use tracing_subscriber::EnvFilter;

use agent_memory::{Agent, MemoryConfig, MemoryStore};
use case_ingest::{IngestConfig, LlmEmbedder, QdrantIndex, VectorSpec};
use llm_service::{ChatClient, LlmConfig};

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let ingest_cfg = IngestConfig::from_env()?;
    let memory_cfg = MemoryConfig::from_env()?;

    let index: Arc<dyn case_ingest::VectorIndex> = Arc::new(QdrantIndex::with_collection(
        &ingest_cfg,
        &memory_cfg.collection,
    )?);
    let embedder = Arc::new(LlmEmbedder::new(
        LlmConfig::new(&ingest_cfg.embedding_model, &ingest_cfg.embedding_url)
            .with_api_key(ingest_cfg.embedding_api_key.clone()),
        ingest_cfg.vector_size as usize,
    )?);

    let memory = Arc::new(MemoryStore::new(
        index,
        embedder,
        VectorSpec {
            vector_name: ingest_cfg.vector_name(),
            size: ingest_cfg.vector_size,
            distance: ingest_cfg.distance,
        },
    ));
    memory.ensure_ready().await?;

    // Context 1: its own agent and its own conversation, torn down after.
    {
        let backend = Arc::new(ChatClient::new(memory_cfg.chat.clone())?);
        let agent = Agent::new(backend, Arc::clone(&memory));
        info!("telling the agent to remember a secret");
        let stored = agent
            .run("Remember that the secret code for the hackathon is 'Aurora Penguin'.")
            .await?;
        info!(reply = %stored, "agent confirmed");
    }

    // Context 2: a completely separate agent with no shared history. Only
    // the store can carry the secret across.
    {
        let backend = Arc::new(ChatClient::new(memory_cfg.chat.clone())?);
        let agent = Agent::new(backend, Arc::clone(&memory));
        info!("asking a fresh context to recall the secret");
        let recalled = agent.run("What is the secret code for the event?").await?;
        info!(reply = %recalled, "agent recalled");
    }

    Ok(())
}
