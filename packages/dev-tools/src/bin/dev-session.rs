//! Development Session Runner
//!
//! Drives one scripted mind-map session against canned collaborators and
//! prints the committed graph as JSON. Useful for eyeballing layouts
//! without a canvas.
//!
//! # Usage
//!
//! ```bash
//! # Default topic, sessions saved to ~/.mindgraph/sessions.json
//! cargo run --bin dev-session
//!
//! # Custom topic and session file
//! MINDGRAPH_TOPIC="Black Holes" MINDGRAPH_SESSIONS_FILE=/tmp/s.json cargo run --bin dev-session
//! ```
//!
//! # Environment Variables
//!
//! - `MINDGRAPH_TOPIC`: Topic to start from (default: "Quantum Computing")
//! - `MINDGRAPH_SESSIONS_FILE`: Session file path (default: ~/.mindgraph/sessions.json)
//! - `RUST_LOG`: Logging level (e.g., "info", "debug", "trace")
//!
//! # Script
//!
//! 1. Submit the topic
//! 2. Expand the root with three concepts
//! 3. Chat turn proposing a concept under "Superposition" with an image
//! 4. Wait for enrichment, then save and restore the session

use std::env;
use std::sync::Arc;

use mindgraph_core::providers::fixed::{
    FixedConcepts, FixedEnrichment, FixedTitles, ScriptedProposer,
};
use mindgraph_core::providers::{ChatReply, ConceptDraft, ProposedConcept};
use mindgraph_core::{
    Collaborators, EngineConfig, JsonFileSessionStore, MutationOrchestrator, SessionStoreConfig,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    tracing::info!("🧠 MindGraph Dev Session");
    tracing::info!("==================================");

    let topic = env::var("MINDGRAPH_TOPIC").unwrap_or_else(|_| "Quantum Computing".to_string());
    let store_config = SessionStoreConfig {
        path: env::var("MINDGRAPH_SESSIONS_FILE").ok().map(Into::into),
    };
    let sessions = JsonFileSessionStore::from_config(&store_config)?;
    tracing::info!("📦 Sessions: {}", sessions.path().display());

    let collaborators = Collaborators {
        titles: Arc::new(FixedTitles::returning(topic.clone())),
        concepts: Arc::new(FixedConcepts::new(vec![
            ConceptDraft::new("What is a Qubit?", "The basic unit of quantum information"),
            ConceptDraft::new("Superposition", "A qubit can be 0 and 1 at once")
                .with_diagram("graph LR; zero((0)) --- one((1))"),
            ConceptDraft::new("Entanglement", "Qubits whose states are linked"),
        ])),
        proposer: Arc::new(ScriptedProposer::new(vec![ChatReply::with_proposal(
            "Interference is how amplitudes add up or cancel out.",
            ProposedConcept::new("Interference", "Amplitudes reinforcing or cancelling")
                .with_emoji("🌊")
                .with_parent_hint("superposition")
                .with_enrichment_prompt("wave interference diagram"),
        )])),
        enrichment: Arc::new(FixedEnrichment::new()),
    };
    let orchestrator = MutationOrchestrator::new(EngineConfig::default(), collaborators)?;

    let root_id = orchestrator.submit_topic(&topic).await?;
    let expansion = orchestrator.expand_node(&root_id).await?;
    tracing::info!("🌱 Expanded root with {} concepts", expansion.node_ids.len());

    let turn = orchestrator.chat_turn("How do superposed states combine?").await?;
    tracing::info!("💬 {}", turn.reply);
    if let Some(inserted) = turn.inserted {
        if let Some(enrichment) = inserted.enrichment {
            enrichment.await?;
        }
    }

    let saved = orchestrator.save_session(&sessions, &topic).await?;
    tracing::info!("💾 Saved session {}", saved.id);

    orchestrator.new_session().await;
    orchestrator.load_session(&sessions, &saved.id).await?;
    tracing::info!("✅ Restored session {}", saved.id);

    let snapshot = orchestrator.snapshot();
    println!("{}", serde_json::to_string_pretty(&*snapshot)?);

    Ok(())
}
