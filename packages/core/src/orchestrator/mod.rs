//! Mutation Orchestrator
//!
//! Sequences every graph mutation as one atomic transition:
//!
//! ```text
//! Idle ─┬─ topic / expansion ─▶ AppendingBulk ──┐
//!       └─ chat concept ──────▶ AppendingSingle ┴─▶ LayingOut ─▶ Committing ─▶ Idle
//! ```
//!
//! # Concurrency
//!
//! - External calls (title, concepts, proposer) run before any lock is taken,
//!   so several requests may be outstanding at once
//! - The append → layout → commit pipeline runs under one async mutex; two
//!   cycles never interleave
//! - Each append rebuilds from the snapshot current *inside* the mutex and
//!   commits with merge-on-commit, so an enrichment that landed meanwhile is
//!   never overwritten
//! - Enrichment runs as a detached task and only patches one node's visual
//!   sub-state
//!
//! Requests are tracked per context (`expand:{node_id}`, `chat`). The
//! configured `InFlightPolicy` decides whether a second request for a busy
//! context is rejected or allowed to run independently.

mod enrichment;
mod error;
mod state;

pub use error::OrchestratorError;
pub use state::OrchestratorState;

use crate::attachment::{
    AttachmentResolver, ParentMatcher, Resolution, ResolvedParent, SubstringMatcher,
};
use crate::config::{EngineConfig, InFlightPolicy};
use crate::layout::LayoutEngine;
use crate::models::{ChatMessage, Edge, GraphSnapshot, Node, Session, DEFAULT_CONCEPT_EMOJI};
use crate::persistence::{PersistenceError, SessionStore};
use crate::providers::{
    ConceptGenerator, ConceptProposer, ConceptRequest, EnrichmentProvider, ProposalContext,
    ProposedConcept, TitleGenerator,
};
use crate::store::{GraphError, GraphEvent, GraphStore};
use enrichment::EnrichmentJob;
use state::{expand_key, InFlightGuard, InFlightRegistry, CHAT_KEY};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;
use uuid::Uuid;

/// Opening message of a fresh session
pub const DEFAULT_GREETING: &str =
    "Hi! Select a node or ask me anything to deepen your understanding.";

/// Root label used when a topic is blank
pub const FALLBACK_TITLE: &str = "New Topic";

/// A blank generated title falls back to the topic cut to this many characters
const MAX_TITLE_CHARS: usize = 30;

/// Handles to the external content collaborators
#[derive(Clone)]
pub struct Collaborators {
    pub titles: Arc<dyn TitleGenerator>,
    pub concepts: Arc<dyn ConceptGenerator>,
    pub proposer: Arc<dyn ConceptProposer>,
    pub enrichment: Arc<dyn EnrichmentProvider>,
}

/// Result of a bulk expansion
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BulkOutcome {
    pub revision: u64,
    /// Ids of the new nodes, in the order the generator returned them
    pub node_ids: Vec<String>,
}

/// Result of a single insertion
#[derive(Debug)]
pub struct InsertOutcome {
    pub revision: u64,
    pub node_id: String,
    pub parent_id: String,
    pub resolution: Resolution,
    /// Pending enrichment, when the concept asked for one
    pub enrichment: Option<JoinHandle<()>>,
}

/// Result of one chat turn
#[derive(Debug)]
pub struct ChatTurnOutcome {
    pub reply: String,
    /// `None` when the proposer offered no concept
    pub inserted: Option<InsertOutcome>,
}

/// Transcript and session identity, reset together with the graph
#[derive(Debug, Default)]
struct Conversation {
    transcript: Vec<ChatMessage>,
    session_id: Option<String>,
}

impl Conversation {
    fn fresh(greeting: impl Into<String>) -> Self {
        Self {
            transcript: vec![ChatMessage::model(greeting)],
            session_id: None,
        }
    }
}

/// Owner of one mind map's graph, transcript and session identity
pub struct MutationOrchestrator {
    config: EngineConfig,
    store: Arc<GraphStore>,
    layout: LayoutEngine,
    resolver: AttachmentResolver<Arc<dyn ParentMatcher>>,
    collaborators: Collaborators,
    commit_lock: tokio::sync::Mutex<()>,
    state: watch::Sender<OrchestratorState>,
    in_flight: InFlightRegistry,
    conversation: Mutex<Conversation>,
}

impl MutationOrchestrator {
    /// Create an orchestrator with an empty graph.
    ///
    /// Fails with `ConfigInvalid` when `config` does not validate.
    pub fn new(
        config: EngineConfig,
        collaborators: Collaborators,
    ) -> Result<Self, OrchestratorError> {
        config
            .validate()
            .map_err(OrchestratorError::config_invalid)?;

        let (state, _) = watch::channel(OrchestratorState::Idle);
        let matcher: Arc<dyn ParentMatcher> = Arc::new(SubstringMatcher);

        Ok(Self {
            store: Arc::new(GraphStore::new(config.event_channel_capacity)),
            layout: LayoutEngine::new(config.layout),
            resolver: AttachmentResolver::with_matcher(matcher),
            collaborators,
            commit_lock: tokio::sync::Mutex::new(()),
            state,
            in_flight: InFlightRegistry::default(),
            conversation: Mutex::new(Conversation::fresh(DEFAULT_GREETING)),
            config,
        })
    }

    /// Replace the parent-hint matching strategy
    pub fn with_parent_matcher(mut self, matcher: Arc<dyn ParentMatcher>) -> Self {
        self.resolver = AttachmentResolver::with_matcher(matcher);
        self
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Shared handle to the underlying graph store
    pub fn store(&self) -> Arc<GraphStore> {
        self.store.clone()
    }

    /// Latest committed graph
    pub fn snapshot(&self) -> Arc<GraphSnapshot> {
        self.store.snapshot()
    }

    pub fn state(&self) -> OrchestratorState {
        *self.state.borrow()
    }

    /// Watch pipeline state changes
    pub fn watch_state(&self) -> watch::Receiver<OrchestratorState> {
        self.state.subscribe()
    }

    /// Subscribe to graph and pipeline events
    pub fn subscribe(&self) -> broadcast::Receiver<GraphEvent> {
        self.store.subscribe()
    }

    pub fn transcript(&self) -> Vec<ChatMessage> {
        self.conversation().transcript.clone()
    }

    /// Id the next save will upsert under, if the map was saved or loaded
    pub fn session_id(&self) -> Option<String> {
        self.conversation().session_id.clone()
    }

    /// Whether a bulk expansion of `node_id` is pending
    pub fn is_expanding(&self, node_id: &str) -> bool {
        self.in_flight.contains(&expand_key(node_id))
    }

    // ── Operations ───────────────────────────────────────────────────

    /// Start a new map from a free-form topic.
    ///
    /// Replaces the whole graph with a single root and resets the
    /// transcript. Title generation failures fall back to the topic's first
    /// words. Returns the root id.
    pub async fn submit_topic(&self, topic: &str) -> Result<String, OrchestratorError> {
        let title = self.derive_title(topic).await;
        let description = Some(topic.trim().to_string()).filter(|d| !d.is_empty());
        let root = Node::root(title.clone(), description);
        let root_id = root.id.clone();

        let _commit = self.commit_lock.lock().await;
        self.set_state(OrchestratorState::AppendingBulk);
        let result = self.layout_and_commit(vec![root], Vec::new(), false);
        if result.is_ok() {
            *self.conversation() = Conversation::fresh(topic_greeting(&title));
        }
        self.set_state(OrchestratorState::Idle);

        let revision = result?;
        tracing::info!("Started map '{}' (revision {})", title, revision);
        Ok(root_id)
    }

    /// Bulk-expand `node_id` with generated sibling concepts.
    ///
    /// Generator failures and empty batches leave the graph unchanged. When
    /// the node disappears while the call is pending, the commit is rejected.
    pub async fn expand_node(&self, node_id: &str) -> Result<BulkOutcome, OrchestratorError> {
        let key = expand_key(node_id);
        let _pending = self.enter(&key)?;

        let request = {
            let snapshot = self.store.snapshot();
            let target = snapshot
                .node(node_id)
                .ok_or_else(|| GraphError::node_not_found(node_id))?;
            let topic = snapshot
                .root()
                .map(|root| root.label.clone())
                .unwrap_or_else(|| target.label.clone());
            ConceptRequest {
                topic,
                parent_context: (!target.is_root).then(|| target.label.clone()),
            }
        };

        let drafts = match self.collaborators.concepts.generate(request).await {
            Ok(drafts) if drafts.is_empty() => {
                tracing::warn!("Concept generator returned no concepts for {}", node_id);
                return Err(OrchestratorError::external_call_failure(format!(
                    "concept generation for {} returned no concepts",
                    node_id
                )));
            }
            Ok(drafts) => drafts,
            Err(err) => {
                tracing::warn!("Concept generation for {} failed: {}", node_id, err);
                return Err(OrchestratorError::external_call_failure(format!(
                    "concept generation for {}: {}",
                    node_id, err
                )));
            }
        };

        let new_nodes: Vec<Node> = drafts
            .into_iter()
            .map(|draft| {
                let description = Some(draft.description).filter(|d| !d.is_empty());
                Node::concept(draft.label, description, draft.diagram)
            })
            .collect();
        let node_ids: Vec<String> = new_nodes.iter().map(|n| n.id.clone()).collect();

        let _commit = self.commit_lock.lock().await;
        self.set_state(OrchestratorState::AppendingBulk);
        let current = self.store.snapshot();
        let mut nodes = current.nodes.clone();
        let mut edges = current.edges.clone();
        for node in new_nodes {
            edges.push(Edge::between(node_id, &node.id));
            nodes.push(node);
        }
        let result = self.layout_and_commit(nodes, edges, true);
        self.set_state(OrchestratorState::Idle);

        let revision = result?;
        tracing::info!(
            "Expanded {} with {} concepts (revision {})",
            node_id,
            node_ids.len(),
            revision
        );
        Ok(BulkOutcome { revision, node_ids })
    }

    /// Insert one proposed concept under the parent chosen by the resolver.
    ///
    /// When the proposal carries an enrichment prompt, the node is created
    /// in its loading state and enrichment is spawned after the commit.
    pub async fn insert_concept(
        &self,
        proposal: ProposedConcept,
    ) -> Result<InsertOutcome, OrchestratorError> {
        let ProposedConcept {
            label,
            description,
            emoji,
            parent_hint,
            diagram,
            enrichment_prompt,
        } = proposal;
        let enrichment_prompt = enrichment_prompt.filter(|p| !p.trim().is_empty());

        let description = Some(description).filter(|d| !d.is_empty());
        let node = Node::concept(label, description, diagram)
            .with_emoji(emoji.unwrap_or_else(|| DEFAULT_CONCEPT_EMOJI.to_string()))
            .with_image_loading(enrichment_prompt.is_some());
        let node_id = node.id.clone();

        let (revision, resolved) = {
            let _commit = self.commit_lock.lock().await;
            self.set_state(OrchestratorState::AppendingSingle);
            let result = self.append_single(node, parent_hint.as_deref());
            self.set_state(OrchestratorState::Idle);
            result?
        };

        tracing::info!(
            "Inserted {} under {} ({:?}, revision {})",
            node_id,
            resolved.parent_id,
            resolved.resolution,
            revision
        );

        let enrichment = enrichment_prompt.map(|prompt| {
            enrichment::spawn(
                self.store.clone(),
                self.collaborators.enrichment.clone(),
                EnrichmentJob {
                    node_id: node_id.clone(),
                    prompt,
                    timeout: Duration::from_secs(self.config.enrichment_timeout_secs),
                },
            )
        });

        Ok(InsertOutcome {
            revision,
            node_id,
            parent_id: resolved.parent_id,
            resolution: resolved.resolution,
            enrichment,
        })
    }

    /// Run one chat turn: record the message, ask the proposer, record the
    /// reply and insert its concept, if any.
    ///
    /// On proposer failure the transcript keeps only the user message and
    /// the graph is untouched. A proposal arriving while the map is empty is
    /// ignored.
    pub async fn chat_turn(&self, message: &str) -> Result<ChatTurnOutcome, OrchestratorError> {
        let _pending = self.enter(CHAT_KEY)?;

        let transcript = {
            let mut conversation = self.conversation();
            conversation.transcript.push(ChatMessage::user(message));
            conversation.transcript.clone()
        };
        let context = ProposalContext {
            transcript,
            labels: self.store.snapshot().labels(),
        };

        let reply = match self.collaborators.proposer.propose(context).await {
            Ok(reply) => reply,
            Err(err) => {
                tracing::warn!("Concept proposer failed: {}", err);
                return Err(OrchestratorError::external_call_failure(format!(
                    "chat proposal: {}",
                    err
                )));
            }
        };

        self.conversation()
            .transcript
            .push(ChatMessage::model(reply.text.clone()));

        let inserted = match reply.proposal {
            Some(_) if self.store.snapshot().is_empty() => {
                tracing::warn!("Ignoring chat proposal: the map has no nodes yet");
                None
            }
            Some(proposal) => Some(self.insert_concept(proposal).await?),
            None => None,
        };

        Ok(ChatTurnOutcome {
            reply: reply.text,
            inserted,
        })
    }

    /// Discard the graph and transcript
    pub async fn new_session(&self) {
        let _commit = self.commit_lock.lock().await;
        self.store.clear();
        *self.conversation() = Conversation::fresh(DEFAULT_GREETING);
        tracing::info!("Started new session");
    }

    /// Persist the current graph and transcript.
    ///
    /// The first save mints the session id; later saves upsert under it.
    pub async fn save_session(
        &self,
        sessions: &dyn SessionStore,
        title: &str,
    ) -> Result<Session, OrchestratorError> {
        // Serializes first saves so they agree on one minted id
        let _commit = self.commit_lock.lock().await;
        let (id, transcript) = {
            let conversation = self.conversation();
            let id = conversation
                .session_id
                .clone()
                .unwrap_or_else(|| Uuid::new_v4().to_string());
            (id, conversation.transcript.clone())
        };
        let snapshot = self.store.snapshot();
        let session = Session::from_snapshot(id, title, &snapshot, transcript);

        let stored = sessions.upsert(session).await?;
        self.conversation().session_id = Some(stored.id.clone());

        tracing::info!(
            "Saved session {} ({} nodes)",
            stored.id,
            stored.nodes.len()
        );
        Ok(stored)
    }

    /// Restore a saved session, trusting its stored positions.
    ///
    /// Any failure leaves an empty map behind and is returned to the caller.
    pub async fn load_session(
        &self,
        sessions: &dyn SessionStore,
        id: &str,
    ) -> Result<(), OrchestratorError> {
        let lookup = match sessions.get(id).await {
            Ok(Some(session)) => Ok(session),
            Ok(None) => Err(PersistenceError::not_found(id).into()),
            Err(err) => Err(OrchestratorError::from(err)),
        };

        let _commit = self.commit_lock.lock().await;
        let session = match lookup {
            Ok(session) => session,
            Err(err) => {
                tracing::warn!("Failed to restore session {}: {}", id, err);
                self.reset_locked();
                return Err(err);
            }
        };

        // No enrichment task survives a save; a pending image would never land
        let mut nodes = session.nodes;
        for node in nodes.iter_mut().filter(|n| n.image_url.is_none()) {
            node.image_loading = false;
        }

        self.set_state(OrchestratorState::Committing);
        let result = self.store.commit(nodes, session.edges);
        self.set_state(OrchestratorState::Idle);

        match result {
            Ok(revision) => {
                *self.conversation() = Conversation {
                    transcript: session.chat_history,
                    session_id: Some(session.id),
                };
                tracing::info!("Restored session {} (revision {})", id, revision);
                Ok(())
            }
            Err(err) => {
                tracing::warn!("Saved session {} is not a valid graph: {}", id, err);
                self.reset_locked();
                Err(err.into())
            }
        }
    }

    /// Delete a saved session.
    ///
    /// Deleting the session currently open starts a new one, so the next
    /// save cannot resurrect it. Returns whether the store held `id`.
    pub async fn delete_session(
        &self,
        sessions: &dyn SessionStore,
        id: &str,
    ) -> Result<bool, OrchestratorError> {
        let _commit = self.commit_lock.lock().await;
        let deleted = sessions.delete(id).await?;

        let is_current = self.conversation().session_id.as_deref() == Some(id);
        if is_current {
            self.reset_locked();
            tracing::info!("Deleted open session {}; started new session", id);
        } else {
            tracing::info!("Deleted session {}", id);
        }
        Ok(deleted)
    }

    // ── Pipeline ─────────────────────────────────────────────────────

    /// Resolve, append, lay out and commit one node. Caller holds the commit lock.
    fn append_single(
        &self,
        node: Node,
        parent_hint: Option<&str>,
    ) -> Result<(u64, ResolvedParent), OrchestratorError> {
        let current = self.store.snapshot();
        let resolved =
            self.resolver
                .resolve_parent(&node.label, parent_hint, &current.nodes, &current.edges)?;

        let mut nodes = current.nodes.clone();
        let mut edges = current.edges.clone();
        edges.push(Edge::between(&resolved.parent_id, &node.id));
        nodes.push(node);

        let revision = self.layout_and_commit(nodes, edges, true)?;
        Ok((revision, resolved))
    }

    /// Lay out the full graph and commit it. Caller holds the commit lock.
    fn layout_and_commit(
        &self,
        nodes: Vec<Node>,
        edges: Vec<Edge>,
        merge_visuals: bool,
    ) -> Result<u64, OrchestratorError> {
        self.set_state(OrchestratorState::LayingOut);
        let laid_out = self.layout.layout(&nodes, &edges);

        self.set_state(OrchestratorState::Committing);
        let revision = if merge_visuals {
            self.store.commit_merging_visuals(laid_out, edges)?
        } else {
            self.store.commit(laid_out, edges)?
        };
        Ok(revision)
    }

    /// Empty graph and fresh transcript. Caller holds the commit lock.
    fn reset_locked(&self) {
        self.store.clear();
        *self.conversation() = Conversation::fresh(DEFAULT_GREETING);
    }

    fn set_state(&self, next: OrchestratorState) {
        let previous = self.state.send_replace(next);
        if previous != next {
            tracing::debug!("Orchestrator {} -> {}", previous, next);
            self.store.emit(GraphEvent::StateChanged(next));
        }
    }

    fn enter(&self, key: &str) -> Result<InFlightGuard<'_>, OrchestratorError> {
        let exclusive = self.config.in_flight_policy == InFlightPolicy::Reject;
        self.in_flight.enter(key, exclusive).ok_or_else(|| {
            tracing::warn!("Rejected request: {} already in flight", key);
            OrchestratorError::append_in_flight(key)
        })
    }

    fn conversation(&self) -> std::sync::MutexGuard<'_, Conversation> {
        self.conversation
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    async fn derive_title(&self, topic: &str) -> String {
        match self.collaborators.titles.title(topic).await {
            Ok(title) if !title.trim().is_empty() => title.trim().to_string(),
            Ok(_) => truncated_title(topic),
            Err(err) => {
                tracing::warn!("Title generation failed, using topic words: {}", err);
                fallback_title(topic)
            }
        }
    }
}

/// First three words of the topic
pub fn fallback_title(topic: &str) -> String {
    let words: Vec<&str> = topic.split_whitespace().take(3).collect();
    if words.is_empty() {
        FALLBACK_TITLE.to_string()
    } else {
        words.join(" ")
    }
}

/// Topic cut to the maximum title length
fn truncated_title(topic: &str) -> String {
    let trimmed = topic.trim();
    if trimmed.is_empty() {
        return FALLBACK_TITLE.to_string();
    }
    trimmed.chars().take(MAX_TITLE_CHARS).collect()
}

fn topic_greeting(title: &str) -> String {
    format!(
        "Great choice! Let's learn about **{}** together. I'll guide you step by step.\n\n\
         Before we dive in, what do you already know about this topic?",
        title
    )
}
