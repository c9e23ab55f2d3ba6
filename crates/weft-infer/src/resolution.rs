//! Resolved-type output, the hand-off from inference to code emission.
//!
//! Everything here is plain strings in sorted maps, so serialized output is
//! stable across runs and the consumer needs no expression machinery.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::board::{Board, PinDir};

/// Resolved type for one pin.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PinResolution {
    pub dir: PinDir,
    pub ty: String,
}

/// Resolved types for one node: its pins plus the concrete types its own
/// parameters ended up with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NodeResolution {
    pub pins: BTreeMap<String, PinResolution>,
    pub params: BTreeMap<String, String>,
}

/// The full outcome of a propagation run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Resolution {
    pub nodes: BTreeMap<String, NodeResolution>,
    pub channels: BTreeMap<String, String>,
}

impl Resolution {
    /// Read the grounded state off a board after a finished run.
    ///
    /// A node's exported parameter table is limited to parameters in its own
    /// scope; foreign bindings that transited through its solution table
    /// stay internal.
    pub(crate) fn collect(board: &Board) -> Resolution {
        let mut nodes = BTreeMap::new();
        for node_name in board.node_names() {
            let Some(node) = board.node(&node_name) else {
                continue;
            };
            let mut pins = BTreeMap::new();
            for pin in node.pins() {
                let ty = pin
                    .expr()
                    .map(|e| e.to_string())
                    .unwrap_or_else(|| pin.spec.clone());
                pins.insert(pin.name.clone(), PinResolution { dir: pin.dir, ty });
            }
            let mut params = BTreeMap::new();
            for (param, binding) in node.solutions().entries() {
                if param.scope != node_name {
                    continue;
                }
                if let Some(expr) = binding {
                    params.insert(param.name.clone(), expr.to_string());
                }
            }
            nodes.insert(node_name, NodeResolution { pins, params });
        }

        let mut channels = BTreeMap::new();
        for channel_name in board.channel_names() {
            let Some(channel) = board.channel(&channel_name) else {
                continue;
            };
            if let Some(ty) = channel.ty() {
                channels.insert(channel_name, ty.to_string());
            }
        }

        Resolution { nodes, channels }
    }

    /// The resolved type of a channel.
    pub fn channel_type(&self, channel: &str) -> Option<&str> {
        self.channels.get(channel).map(String::as_str)
    }

    /// The resolved type of a pin.
    pub fn pin_type(&self, node: &str, pin: &str) -> Option<&str> {
        self.nodes
            .get(node)
            .and_then(|n| n.pins.get(pin))
            .map(|p| p.ty.as_str())
    }

    /// The concrete type a node's own parameter resolved to.
    pub fn param_type(&self, node: &str, param: &str) -> Option<&str> {
        self.nodes
            .get(node)
            .and_then(|n| n.params.get(param))
            .map(String::as_str)
    }
}
