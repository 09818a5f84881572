//! Layout sizing and spacing parameters (canvas units)

use crate::models::Node;
use serde::{Deserialize, Serialize};

/// Box sizes and gaps used by the layout engine.
///
/// Defaults match the card sizes the canvas renders: 400 wide, 200 tall, or
/// 350 tall when the card shows (or is waiting for) an image.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    pub node_width: f64,
    pub node_height: f64,
    /// Height of a card that carries an image or an image placeholder
    pub image_node_height: f64,
    /// Horizontal gap between neighbouring boxes in a rank
    pub node_sep: f64,
    /// Vertical gap between ranks
    pub rank_sep: f64,
    pub margin_x: f64,
    pub margin_y: f64,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            node_width: 400.0,
            node_height: 200.0,
            image_node_height: 350.0,
            node_sep: 100.0,
            rank_sep: 180.0,
            margin_x: 100.0,
            margin_y: 100.0,
        }
    }
}

impl LayoutConfig {
    /// Size the node will occupy at render time: (width, height)
    pub fn size_of(&self, node: &Node) -> (f64, f64) {
        let height = if node.has_image_slot() {
            self.image_node_height
        } else {
            self.node_height
        };
        (self.node_width, height)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        let finite = [
            self.node_width,
            self.node_height,
            self.image_node_height,
            self.node_sep,
            self.rank_sep,
            self.margin_x,
            self.margin_y,
        ]
        .iter()
        .all(|v| v.is_finite());
        if !finite {
            return Err("layout values must be finite".to_string());
        }

        if self.node_width <= 0.0 || self.node_height <= 0.0 {
            return Err("node_width and node_height must be greater than 0".to_string());
        }

        if self.image_node_height <= self.node_height {
            return Err("image_node_height must be greater than node_height".to_string());
        }

        if self.node_sep < 0.0 || self.rank_sep < 0.0 {
            return Err("node_sep and rank_sep cannot be negative".to_string());
        }

        if self.margin_x < 0.0 || self.margin_y < 0.0 {
            return Err("margins cannot be negative".to_string());
        }

        Ok(())
    }
}
