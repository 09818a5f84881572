//! Deterministic in-process collaborators
//!
//! Canned implementations for tests and the `dev-session` tool. Each one can
//! simulate latency and failure, and records what it was asked.

use super::{
    ChatReply, ConceptDraft, ConceptGenerator, ConceptProposer, ConceptRequest,
    EnrichmentProvider, ProposalContext, ProviderError, TitleGenerator,
};
use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::{Mutex, PoisonError};
use std::time::Duration;
use tokio::time::sleep;

async fn simulate_latency(delay: Option<Duration>) {
    if let Some(delay) = delay {
        sleep(delay).await;
    }
}

/// Title generator returning a fixed answer
pub struct FixedTitles {
    answer: Result<String, ProviderError>,
}

impl FixedTitles {
    pub fn returning(title: impl Into<String>) -> Self {
        Self {
            answer: Ok(title.into()),
        }
    }

    pub fn failing(reason: impl Into<String>) -> Self {
        Self {
            answer: Err(ProviderError::unavailable(reason)),
        }
    }
}

#[async_trait]
impl TitleGenerator for FixedTitles {
    async fn title(&self, _topic: &str) -> Result<String, ProviderError> {
        self.answer.clone()
    }
}

/// Concept generator answering from a table keyed by parent context
pub struct FixedConcepts {
    default_batch: Result<Vec<ConceptDraft>, ProviderError>,
    by_parent: HashMap<String, Vec<ConceptDraft>>,
    delay: Option<Duration>,
    requests: Mutex<Vec<ConceptRequest>>,
}

impl FixedConcepts {
    /// Answer every request with `batch`
    pub fn new(batch: Vec<ConceptDraft>) -> Self {
        Self {
            default_batch: Ok(batch),
            by_parent: HashMap::new(),
            delay: None,
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Fail every request not covered by `with_batch_for`
    pub fn failing(error: ProviderError) -> Self {
        Self {
            default_batch: Err(error),
            ..Self::new(Vec::new())
        }
    }

    /// Answer requests whose parent context is `parent_label` with `batch`
    pub fn with_batch_for(
        mut self,
        parent_label: impl Into<String>,
        batch: Vec<ConceptDraft>,
    ) -> Self {
        self.by_parent.insert(parent_label.into(), batch);
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Requests received so far, in arrival order
    pub fn requests(&self) -> Vec<ConceptRequest> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[async_trait]
impl ConceptGenerator for FixedConcepts {
    async fn generate(
        &self,
        request: ConceptRequest,
    ) -> Result<Vec<ConceptDraft>, ProviderError> {
        let answer = match request
            .parent_context
            .as_ref()
            .and_then(|parent| self.by_parent.get(parent))
        {
            Some(batch) => Ok(batch.clone()),
            None => self.default_batch.clone(),
        };
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(request);

        simulate_latency(self.delay).await;
        answer
    }
}

/// Proposer replaying a script of replies, one per turn
pub struct ScriptedProposer {
    script: Mutex<VecDeque<Result<ChatReply, ProviderError>>>,
    delay: Option<Duration>,
    contexts: Mutex<Vec<ProposalContext>>,
}

impl ScriptedProposer {
    pub fn new(replies: Vec<ChatReply>) -> Self {
        Self::from_results(replies.into_iter().map(Ok).collect())
    }

    /// Script that may contain failures
    pub fn from_results(script: Vec<Result<ChatReply, ProviderError>>) -> Self {
        Self {
            script: Mutex::new(script.into()),
            delay: None,
            contexts: Mutex::new(Vec::new()),
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Contexts received so far, in arrival order
    pub fn contexts(&self) -> Vec<ProposalContext> {
        self.contexts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[async_trait]
impl ConceptProposer for ScriptedProposer {
    async fn propose(&self, context: ProposalContext) -> Result<ChatReply, ProviderError> {
        self.contexts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(context);
        let next = self
            .script
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front();

        simulate_latency(self.delay).await;
        next.unwrap_or_else(|| Err(ProviderError::unavailable("script exhausted")))
    }
}

/// Enrichment provider minting `img://` references from the prompt
pub struct FixedEnrichment {
    failure: Option<ProviderError>,
    delay: Option<Duration>,
}

impl FixedEnrichment {
    pub fn new() -> Self {
        Self {
            failure: None,
            delay: None,
        }
    }

    pub fn failing(error: ProviderError) -> Self {
        Self {
            failure: Some(error),
            delay: None,
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Reference returned for `prompt`
    pub fn reference_for(prompt: &str) -> String {
        let slug: String = prompt
            .trim()
            .to_lowercase()
            .chars()
            .map(|c| if c.is_alphanumeric() { c } else { '-' })
            .collect();
        format!("img://{}", slug)
    }
}

impl Default for FixedEnrichment {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EnrichmentProvider for FixedEnrichment {
    async fn enrich(&self, prompt: &str) -> Result<String, ProviderError> {
        simulate_latency(self.delay).await;
        match &self.failure {
            Some(error) => Err(error.clone()),
            None => Ok(Self::reference_for(prompt)),
        }
    }
}
