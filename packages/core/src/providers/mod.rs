//! External Collaborators
//!
//! Interfaces the orchestrator consumes for generated content. The core
//! treats every response as opaque content and only checks its structure.
//!
//! All traits are `Send + Sync` so implementations can be shared as
//! `Arc<dyn Trait>` across spawned tasks.

mod error;
pub mod fixed;

pub use error::ProviderError;

use crate::models::ChatMessage;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Input for a bulk expansion
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConceptRequest {
    /// Label of the map's root
    pub topic: String,
    /// Label of the node being expanded; `None` when expanding the root
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_context: Option<String>,
}

/// One concept of a bulk expansion batch
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConceptDraft {
    pub label: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub diagram: Option<String>,
}

impl ConceptDraft {
    pub fn new(label: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            description: description.into(),
            diagram: None,
        }
    }

    pub fn with_diagram(mut self, diagram: impl Into<String>) -> Self {
        self.diagram = Some(diagram.into());
        self
    }
}

/// A single concept proposed during a chat turn
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProposedConcept {
    pub label: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub emoji: Option<String>,
    /// Free-text name of the intended parent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_hint: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub diagram: Option<String>,
    /// Prompt for asynchronous image enrichment
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enrichment_prompt: Option<String>,
}

impl ProposedConcept {
    pub fn new(label: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            description: description.into(),
            ..Default::default()
        }
    }

    pub fn with_parent_hint(mut self, hint: impl Into<String>) -> Self {
        self.parent_hint = Some(hint.into());
        self
    }

    pub fn with_emoji(mut self, emoji: impl Into<String>) -> Self {
        self.emoji = Some(emoji.into());
        self
    }

    pub fn with_diagram(mut self, diagram: impl Into<String>) -> Self {
        self.diagram = Some(diagram.into());
        self
    }

    pub fn with_enrichment_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.enrichment_prompt = Some(prompt.into());
        self
    }
}

/// Everything the proposer sees for one chat turn
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProposalContext {
    /// Full transcript, ending with the user's latest message
    pub transcript: Vec<ChatMessage>,
    /// Labels currently on the map
    pub labels: Vec<String>,
}

/// Proposer answer: reply text plus at most one concept
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatReply {
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proposal: Option<ProposedConcept>,
}

impl ChatReply {
    pub fn text_only(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            proposal: None,
        }
    }

    pub fn with_proposal(text: impl Into<String>, proposal: ProposedConcept) -> Self {
        Self {
            text: text.into(),
            proposal: Some(proposal),
        }
    }
}

/// Turns a free-form topic into a short root label
#[async_trait]
pub trait TitleGenerator: Send + Sync {
    async fn title(&self, topic: &str) -> Result<String, ProviderError>;
}

/// Produces the 3–4 sibling concepts of a bulk expansion
#[async_trait]
pub trait ConceptGenerator: Send + Sync {
    async fn generate(&self, request: ConceptRequest)
        -> Result<Vec<ConceptDraft>, ProviderError>;
}

/// Chat-driven single-concept proposer
#[async_trait]
pub trait ConceptProposer: Send + Sync {
    async fn propose(&self, context: ProposalContext) -> Result<ChatReply, ProviderError>;
}

/// Resolves an enrichment prompt to an image reference
#[async_trait]
pub trait EnrichmentProvider: Send + Sync {
    async fn enrich(&self, prompt: &str) -> Result<String, ProviderError>;
}
