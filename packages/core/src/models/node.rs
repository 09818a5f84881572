//! Node Data Structures
//!
//! This module defines the `Node` struct that represents a single concept on
//! the mind map canvas, together with its layout `Position` and the narrow
//! `VisualUpdate` applied by asynchronous enrichment.
//!
//! # Examples
//!
//! ```rust
//! use mindgraph_core::models::Node;
//!
//! // The root of a new mind map
//! let root = Node::root("Quantum Computing", Some("teach me about quantum computing".into()));
//! assert!(root.is_root);
//!
//! // A concept produced by bulk expansion
//! let child = Node::concept("What is a qubit?", Some("The basic unit.".into()), None);
//! assert!(!child.is_root);
//! assert_ne!(root.id, child.id);
//! ```

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Emoji given to every root node
pub const ROOT_EMOJI: &str = "🎯";

/// Emoji used for chat-inserted concepts that did not propose one
pub const DEFAULT_CONCEPT_EMOJI: &str = "📝";

/// Top-left anchor of a node on the canvas.
///
/// Owned by the layout engine; only layout and session restore write it.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// A concept on the mind map.
///
/// # Fields
///
/// - `id`: Unique, stable for the node's lifetime (UUID v4)
/// - `label`: Short title shown on the card
/// - `description`: Optional longer explanation
/// - `is_root`: Exactly one node per non-empty graph carries `true`
/// - `emoji`: Optional decoration
/// - `diagram`: Opaque diagram source, never interpreted by the engine
/// - `image_url`: Set asynchronously by enrichment
/// - `image_loading`: `true` between creation and enrichment arrival/failure
/// - `position`: Top-left anchor computed by the layout engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Node {
    pub id: String,

    pub label: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default)]
    pub is_root: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub emoji: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub diagram: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,

    #[serde(default)]
    pub image_loading: bool,

    #[serde(default)]
    pub position: Position,
}

impl Node {
    /// Create a root node with a fresh id.
    pub fn root(label: impl Into<String>, description: Option<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            label: label.into(),
            description,
            is_root: true,
            emoji: Some(ROOT_EMOJI.to_string()),
            diagram: None,
            image_url: None,
            image_loading: false,
            position: Position::default(),
        }
    }

    /// Create a non-root concept node with a fresh id.
    pub fn concept(
        label: impl Into<String>,
        description: Option<String>,
        diagram: Option<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            label: label.into(),
            description,
            is_root: false,
            emoji: None,
            diagram,
            image_url: None,
            image_loading: false,
            position: Position::default(),
        }
    }

    /// Builder-style emoji setter
    pub fn with_emoji(mut self, emoji: impl Into<String>) -> Self {
        self.emoji = Some(emoji.into());
        self
    }

    /// Mark the node as waiting for an image
    pub fn with_image_loading(mut self, loading: bool) -> Self {
        self.image_loading = loading;
        self
    }

    /// Whether the card reserves room for an image.
    ///
    /// True once an image has arrived and also while one is loading, so the
    /// box does not jump when the image lands.
    pub fn has_image_slot(&self) -> bool {
        self.image_url.is_some() || self.image_loading
    }

    /// The visual sub-state touched by enrichment
    pub fn visual(&self) -> VisualUpdate {
        VisualUpdate {
            image_url: self.image_url.clone(),
            image_loading: self.image_loading,
        }
    }

    /// Overwrite the visual sub-state in place
    pub fn apply_visual(&mut self, update: &VisualUpdate) {
        self.image_url = update.image_url.clone();
        self.image_loading = update.image_loading;
    }
}

/// Visual sub-state of a node (`image_url`, `image_loading`).
///
/// Enrichment only ever writes this pair; it never touches positions,
/// labels or edges.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct VisualUpdate {
    pub image_url: Option<String>,
    pub image_loading: bool,
}

impl VisualUpdate {
    /// Image arrived
    pub fn loaded(image_url: impl Into<String>) -> Self {
        Self {
            image_url: Some(image_url.into()),
            image_loading: false,
        }
    }

    /// Enrichment failed: keep the node, drop the loading state
    pub fn failed() -> Self {
        Self {
            image_url: None,
            image_loading: false,
        }
    }
}
