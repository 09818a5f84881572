//! MindGraph Core Graph Engine
//!
//! This crate grows a mind map incrementally: it keeps the node/edge graph
//! consistent under asynchronous insertions, decides where single concepts
//! attach, and recomputes a deterministic top-down layout after every
//! mutation.
//!
//! # Architecture
//!
//! - **Copy-on-commit store**: readers always see a complete, laid-out graph
//! - **Serialized pipeline**: append → layout → commit never interleaves
//! - **Breadth bias**: ambiguous single insertions attach to the root
//! - **Full recompute**: every mutation re-lays the whole tree
//!
//! # Modules
//!
//! - [`models`] - Data structures (Node, Edge, GraphSnapshot, Session)
//! - [`store`] - Graph store, commit validation and domain events
//! - [`attachment`] - Parent resolution for chat-proposed concepts
//! - [`layout`] - Layered layout engine
//! - [`orchestrator`] - Mutation state machine and enrichment
//! - [`providers`] - External content collaborators
//! - [`persistence`] - Session stores
//! - [`config`] - Engine configuration

pub mod attachment;
pub mod config;
pub mod layout;
pub mod models;
pub mod orchestrator;
pub mod persistence;
pub mod providers;
pub mod store;

// Re-export commonly used types
pub use attachment::{AttachmentResolver, ParentMatcher, Resolution, SubstringMatcher};
pub use config::{EngineConfig, InFlightPolicy, SessionStoreConfig};
pub use layout::{LayoutConfig, LayoutEngine};
pub use models::*;
pub use orchestrator::{
    Collaborators, InsertOutcome, MutationOrchestrator, OrchestratorError, OrchestratorState,
};
pub use persistence::{JsonFileSessionStore, MemorySessionStore, PersistenceError, SessionStore};
pub use providers::ProviderError;
pub use store::{GraphError, GraphEvent, GraphStore};
