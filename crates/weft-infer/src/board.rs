//! Board model: nodes, pins, and the channels joining them.
//!
//! Node, pin, and channel identities are fixed before an inference run
//! starts; the propagator owns all type slots exclusively for the duration
//! of a run. Structural edits happen between runs only.

use std::collections::BTreeSet;
use std::fmt;

use rustc_hash::FxHashMap;
use serde::Serialize;
use weft_typeexpr::{InferenceMap, TypeExpr};

use crate::catalog::PinDecl;

/// Pin direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PinDir {
    /// The pin consumes values from its channel.
    In,
    /// The pin produces values into its channel.
    Out,
}

impl fmt::Display for PinDir {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PinDir::In => write!(f, "in"),
            PinDir::Out => write!(f, "out"),
        }
    }
}

/// A (node, pin) endpoint reference. Ordered by node, then pin.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PinRef {
    pub node: String,
    pub pin: String,
}

impl PinRef {
    pub fn new(node: impl Into<String>, pin: impl Into<String>) -> Self {
        Self {
            node: node.into(),
            pin: pin.into(),
        }
    }
}

impl fmt::Display for PinRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.node, self.pin)
    }
}

/// A directional, typed attachment point on a node.
#[derive(Debug, Clone)]
pub struct Pin {
    pub name: String,
    pub dir: PinDir,
    /// The declared type spec, e.g. `chan $T`.
    pub spec: String,
    /// The node-scoped expression for the current run. Rebuilt fresh at the
    /// start of every propagation; holds the final grounded form afterwards.
    pub(crate) expr: Option<TypeExpr>,
}

impl Pin {
    /// The pin's expression for the most recent run, if one has started.
    pub fn expr(&self) -> Option<&TypeExpr> {
        self.expr.as_ref()
    }
}

/// A named worker with typed pins and a per-run solution table.
#[derive(Debug, Clone)]
pub struct Node {
    pub name: String,
    pub(crate) pins: FxHashMap<String, Pin>,
    /// Bindings learned for this node during the current run.
    pub(crate) solutions: InferenceMap,
}

impl Node {
    fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            pins: FxHashMap::default(),
            solutions: InferenceMap::new(),
        }
    }

    /// Look up a pin by name.
    pub fn pin(&self, name: &str) -> Option<&Pin> {
        self.pins.get(name)
    }

    /// Pins sorted by name.
    pub fn pins(&self) -> Vec<&Pin> {
        let mut pins: Vec<&Pin> = self.pins.values().collect();
        pins.sort_by(|a, b| a.name.cmp(&b.name));
        pins
    }

    /// The solution table accumulated by the most recent run.
    pub fn solutions(&self) -> &InferenceMap {
        &self.solutions
    }

    pub(crate) fn pin_names_sorted(&self) -> Vec<String> {
        let mut names: Vec<String> = self.pins.keys().cloned().collect();
        names.sort();
        names
    }

    /// Refine every pin against the node's full solution table. Returns the
    /// names of the pins whose expression changed, sorted.
    pub(crate) fn refine_pins(&mut self) -> Result<Vec<String>, weft_typeexpr::UnifyError> {
        let mut changed = Vec::new();
        for name in self.pin_names_sorted() {
            if let Some(pin) = self.pins.get_mut(&name) {
                if let Some(expr) = pin.expr.as_mut() {
                    if expr.refine(&self.solutions)? {
                        changed.push(name);
                    }
                }
            }
        }
        Ok(changed)
    }
}

/// A typed connection joining node pins.
///
/// The type slot starts unresolved each run and only ever becomes more
/// concrete while the run lasts.
#[derive(Debug, Clone)]
pub struct Channel {
    pub name: String,
    pub(crate) pins: BTreeSet<PinRef>,
    pub(crate) ty: Option<TypeExpr>,
}

impl Channel {
    fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            pins: BTreeSet::new(),
            ty: None,
        }
    }

    /// Attached endpoints in (node, pin) order.
    pub fn endpoints(&self) -> impl Iterator<Item = &PinRef> {
        self.pins.iter()
    }

    /// The channel's type for the most recent run, once adopted.
    pub fn ty(&self) -> Option<&TypeExpr> {
        self.ty.as_ref()
    }
}

/// Why a board edit was rejected.
#[derive(Debug, Clone, PartialEq)]
pub enum BoardError {
    DuplicateNode(String),
    DuplicateChannel(String),
    UnknownNode(String),
    UnknownPin { node: String, pin: String },
    UnknownChannel(String),
    /// A pin attaches to at most one channel.
    AlreadyAttached { pin: PinRef, channel: String },
}

impl fmt::Display for BoardError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DuplicateNode(name) => write!(f, "node `{name}` already exists"),
            Self::DuplicateChannel(name) => write!(f, "channel `{name}` already exists"),
            Self::UnknownNode(name) => write!(f, "unknown node `{name}`"),
            Self::UnknownPin { node, pin } => write!(f, "node `{node}` has no pin `{pin}`"),
            Self::UnknownChannel(name) => write!(f, "unknown channel `{name}`"),
            Self::AlreadyAttached { pin, channel } => {
                write!(f, "pin `{pin}` is already attached to channel `{channel}`")
            }
        }
    }
}

impl std::error::Error for BoardError {}

/// The graph under inference: nodes, channels, and pin attachments.
#[derive(Debug, Clone)]
pub struct Board {
    pub(crate) nodes: FxHashMap<String, Node>,
    pub(crate) channels: FxHashMap<String, Channel>,
    /// Which channel each pin is attached to.
    pub(crate) attachments: FxHashMap<PinRef, String>,
}

impl Board {
    /// Create an empty board.
    pub fn new() -> Self {
        Self {
            nodes: FxHashMap::default(),
            channels: FxHashMap::default(),
            attachments: FxHashMap::default(),
        }
    }

    /// Add a node with the given pin declarations.
    pub fn add_node(&mut self, name: &str, pins: Vec<PinDecl>) -> Result<(), BoardError> {
        if self.nodes.contains_key(name) {
            return Err(BoardError::DuplicateNode(name.to_string()));
        }
        let mut node = Node::new(name);
        for decl in pins {
            node.pins.insert(
                decl.name.clone(),
                Pin {
                    name: decl.name,
                    dir: decl.dir,
                    spec: decl.spec,
                    expr: None,
                },
            );
        }
        self.nodes.insert(name.to_string(), node);
        Ok(())
    }

    /// Add an empty channel.
    pub fn add_channel(&mut self, name: &str) -> Result<(), BoardError> {
        if self.channels.contains_key(name) {
            return Err(BoardError::DuplicateChannel(name.to_string()));
        }
        self.channels.insert(name.to_string(), Channel::new(name));
        Ok(())
    }

    /// Attach a node's pin to a channel.
    pub fn connect(&mut self, channel: &str, node: &str, pin: &str) -> Result<(), BoardError> {
        if !self.channels.contains_key(channel) {
            return Err(BoardError::UnknownChannel(channel.to_string()));
        }
        let owner = self
            .nodes
            .get(node)
            .ok_or_else(|| BoardError::UnknownNode(node.to_string()))?;
        if owner.pin(pin).is_none() {
            return Err(BoardError::UnknownPin {
                node: node.to_string(),
                pin: pin.to_string(),
            });
        }
        let pin_ref = PinRef::new(node, pin);
        if let Some(existing) = self.attachments.get(&pin_ref) {
            return Err(BoardError::AlreadyAttached {
                pin: pin_ref,
                channel: existing.clone(),
            });
        }
        self.attachments.insert(pin_ref.clone(), channel.to_string());
        if let Some(chan) = self.channels.get_mut(channel) {
            chan.pins.insert(pin_ref);
        }
        Ok(())
    }

    /// Look up a node by name.
    pub fn node(&self, name: &str) -> Option<&Node> {
        self.nodes.get(name)
    }

    /// Look up a channel by name.
    pub fn channel(&self, name: &str) -> Option<&Channel> {
        self.channels.get(name)
    }

    /// The channel a pin is attached to, if any.
    pub fn attachment(&self, pin: &PinRef) -> Option<&str> {
        self.attachments.get(pin).map(String::as_str)
    }

    /// Node names, sorted.
    pub fn node_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.nodes.keys().cloned().collect();
        names.sort();
        names
    }

    /// Channel names, sorted.
    pub fn channel_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.channels.keys().cloned().collect();
        names.sort();
        names
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn board_with_double() -> Board {
        let mut board = Board::new();
        board
            .add_node(
                "double",
                vec![
                    PinDecl::input("in", "$T"),
                    PinDecl::output("out", "[]$T"),
                ],
            )
            .unwrap();
        board
    }

    #[test]
    fn add_and_look_up_nodes() {
        let board = board_with_double();
        let node = board.node("double").unwrap();
        assert_eq!(node.pin("in").unwrap().dir, PinDir::In);
        assert_eq!(node.pin("out").unwrap().spec, "[]$T");
        assert!(board.node("missing").is_none());
    }

    #[test]
    fn duplicate_names_are_rejected() {
        let mut board = board_with_double();
        assert_eq!(
            board.add_node("double", vec![]).unwrap_err(),
            BoardError::DuplicateNode("double".to_string())
        );
        board.add_channel("c").unwrap();
        assert_eq!(
            board.add_channel("c").unwrap_err(),
            BoardError::DuplicateChannel("c".to_string())
        );
    }

    #[test]
    fn connect_validates_every_endpoint() {
        let mut board = board_with_double();
        board.add_channel("c").unwrap();

        assert_eq!(
            board.connect("nope", "double", "in").unwrap_err(),
            BoardError::UnknownChannel("nope".to_string())
        );
        assert_eq!(
            board.connect("c", "nope", "in").unwrap_err(),
            BoardError::UnknownNode("nope".to_string())
        );
        assert_eq!(
            board.connect("c", "double", "nope").unwrap_err(),
            BoardError::UnknownPin {
                node: "double".to_string(),
                pin: "nope".to_string(),
            }
        );

        board.connect("c", "double", "in").unwrap();
        assert_eq!(
            board.attachment(&PinRef::new("double", "in")),
            Some("c")
        );
    }

    #[test]
    fn a_pin_attaches_to_one_channel_only() {
        let mut board = board_with_double();
        board.add_channel("c1").unwrap();
        board.add_channel("c2").unwrap();
        board.connect("c1", "double", "in").unwrap();
        assert_eq!(
            board.connect("c2", "double", "in").unwrap_err(),
            BoardError::AlreadyAttached {
                pin: PinRef::new("double", "in"),
                channel: "c1".to_string(),
            }
        );
    }

    #[test]
    fn endpoints_iterate_in_order() {
        let mut board = board_with_double();
        board
            .add_node("sink", vec![PinDecl::input("in", "int")])
            .unwrap();
        board.add_channel("c").unwrap();
        board.connect("c", "sink", "in").unwrap();
        board.connect("c", "double", "out").unwrap();

        let endpoints: Vec<String> = board
            .channel("c")
            .unwrap()
            .endpoints()
            .map(|p| p.to_string())
            .collect();
        assert_eq!(endpoints, vec!["double.out", "sink.in"]);
    }

    #[test]
    fn name_listings_are_sorted() {
        let mut board = Board::new();
        board.add_node("zeta", vec![]).unwrap();
        board.add_node("alpha", vec![]).unwrap();
        board.add_channel("c2").unwrap();
        board.add_channel("c1").unwrap();
        assert_eq!(board.node_names(), vec!["alpha", "zeta"]);
        assert_eq!(board.channel_names(), vec!["c1", "c2"]);
    }
}
