//! Data Models
//!
//! This module contains the core data structures used throughout MindGraph:
//!
//! - `Node` / `Edge` - Concepts and parent → child links
//! - `GraphSnapshot` - Immutable committed graph handed to renderers
//! - `Session` - Persisted snapshot plus chat transcript

mod graph;
mod node;
mod session;

pub use graph::{Edge, GraphSnapshot};
pub use node::{Node, Position, VisualUpdate, DEFAULT_CONCEPT_EMOJI, ROOT_EMOJI};
pub use session::{ChatMessage, ChatRole, Session, SessionMetadata};
