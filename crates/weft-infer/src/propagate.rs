//! Work-queue propagation of channel and pin types to a fixpoint.
//!
//! A run walks the board's channels until no expression changes any more:
//!
//!  1. every pin spec is re-parsed under its node's scope and every channel
//!     type slot is cleared, so reruns never see stale state;
//!  2. channels are processed from a queue. An unresolved channel adopts the
//!     first endpoint's expression and requeues itself; a resolved one is
//!     unified against each endpoint in both directions, refining the
//!     channel and folding pin-side bindings into the owning node;
//!  3. whenever an expression changes, the channels that can observe the
//!     change go back on the queue;
//!  4. once the queue drains, whatever is still parametered is grounded to
//!     the unconstrained type.
//!
//! The first unification failure aborts the run, naming the channel where
//! the types met.

use std::collections::VecDeque;

use rustc_hash::FxHashSet;
use weft_typeexpr::{InferenceMap, TypeExpr, UnifyError};

use crate::board::{Board, PinRef};
use crate::error::PropagateError;
use crate::resolution::Resolution;

/// Options for one propagation run.
#[derive(Debug, Clone)]
pub struct InferOptions {
    /// The type assigned to anything still unresolved after the queue
    /// drains. Must be plain; a parametered default fails the run before
    /// it starts.
    pub unconstrained: TypeExpr,
}

impl Default for InferOptions {
    fn default() -> Self {
        Self {
            unconstrained: TypeExpr::parse("", "interface{}").expect("interface{} parses"),
        }
    }
}

/// Run propagation over `board` and collect the resolved types.
pub(crate) fn run(board: &mut Board, options: &InferOptions) -> Result<Resolution, PropagateError> {
    if !options.unconstrained.is_plain() {
        return Err(PropagateError::InvalidDefault {
            ty: options.unconstrained.to_string(),
        });
    }
    let mut propagator = Propagator::new(board, options);
    propagator.prepare()?;
    propagator.drain()?;
    Ok(propagator.finish())
}

/// One propagation run. Owns the board's type slots for its duration.
struct Propagator<'a> {
    board: &'a mut Board,
    options: &'a InferOptions,
    queue: VecDeque<String>,
    queued: FxHashSet<String>,
}

impl<'a> Propagator<'a> {
    fn new(board: &'a mut Board, options: &'a InferOptions) -> Self {
        Self {
            board,
            options,
            queue: VecDeque::new(),
            queued: FxHashSet::default(),
        }
    }

    /// Rebuild all per-run state: pin expressions, node solution tables,
    /// channel slots, and the queue itself (all channels, sorted).
    fn prepare(&mut self) -> Result<(), PropagateError> {
        for node_name in self.board.node_names() {
            let Some(node) = self.board.nodes.get_mut(&node_name) else {
                continue;
            };
            node.solutions = InferenceMap::new();
            for pin_name in node.pin_names_sorted() {
                let Some(pin) = node.pins.get_mut(&pin_name) else {
                    continue;
                };
                let expr = TypeExpr::parse(&node_name, &pin.spec).map_err(|source| {
                    PropagateError::Parse {
                        node: node_name.clone(),
                        pin: pin_name.clone(),
                        source,
                    }
                })?;
                node.solutions.note(&expr);
                pin.expr = Some(expr);
            }
        }

        for channel in self.board.channels.values_mut() {
            channel.ty = None;
        }

        self.queue.clear();
        self.queued.clear();
        for name in self.board.channel_names() {
            self.enqueue(&name);
        }
        Ok(())
    }

    fn enqueue(&mut self, name: &str) {
        if self.queued.insert(name.to_string()) {
            self.queue.push_back(name.to_string());
        }
    }

    fn drain(&mut self) -> Result<(), PropagateError> {
        while let Some(name) = self.queue.pop_front() {
            self.queued.remove(&name);
            self.step(&name)
                .map_err(|source| PropagateError::Incompatible {
                    channel: name.clone(),
                    source,
                })?;
        }
        Ok(())
    }

    /// Cross-check one channel against its endpoints, in (node, pin) order.
    fn step(&mut self, channel: &str) -> Result<(), UnifyError> {
        let endpoints: Vec<PinRef> = match self.board.channels.get(channel) {
            Some(c) => c.pins.iter().cloned().collect(),
            None => return Ok(()),
        };

        let mut channel_changed = false;
        for pin_ref in &endpoints {
            let Some(pt) = self.pin_expr(pin_ref).cloned() else {
                continue;
            };
            let Some(mut ct) = self.take_channel_ty(channel) else {
                // Unresolved: adopt this endpoint's expression and requeue
                // so the remaining endpoints cross-check against it.
                self.put_channel_ty(channel, pt);
                self.enqueue(channel);
                return Ok(());
            };

            // Both directions from the same snapshot, then apply.
            let cinf = ct.infer(&pt)?;
            let pinf = pt.infer(&ct)?;
            if ct.refine(&cinf)? {
                channel_changed = true;
            }
            self.put_channel_ty(channel, ct);

            // Fold the pin-side bindings into the owning node and push the
            // full solution table through every one of its pins.
            let changed_pins = match self.board.nodes.get_mut(&pin_ref.node) {
                Some(node) => {
                    node.solutions.merge(pinf)?;
                    node.refine_pins()?
                }
                None => continue,
            };
            for pin_name in changed_pins {
                let changed_ref = PinRef::new(pin_ref.node.clone(), pin_name);
                let attached = self.board.attachments.get(&changed_ref).cloned();
                if let Some(attached) = attached {
                    self.enqueue(&attached);
                }
            }
        }

        if channel_changed {
            self.enqueue(channel);
        }
        Ok(())
    }

    /// Ground whatever the queue left parametered and collect the output.
    fn finish(&mut self) -> Resolution {
        let options = self.options;
        let default = &options.unconstrained;

        for name in self.board.channel_names() {
            let Some(channel) = self.board.channels.get_mut(&name) else {
                continue;
            };
            match channel.ty.as_mut() {
                Some(expr) => {
                    expr.lithify(default);
                }
                None => channel.ty = Some(default.clone()),
            }
        }

        for name in self.board.node_names() {
            let Some(node) = self.board.nodes.get_mut(&name) else {
                continue;
            };
            for pin_name in node.pin_names_sorted() {
                if let Some(pin) = node.pins.get_mut(&pin_name) {
                    if let Some(expr) = pin.expr.as_mut() {
                        expr.lithify(default);
                    }
                }
            }
            node.solutions.ground(default);
        }

        Resolution::collect(self.board)
    }

    fn pin_expr(&self, pin_ref: &PinRef) -> Option<&TypeExpr> {
        self.board
            .nodes
            .get(&pin_ref.node)?
            .pins
            .get(&pin_ref.pin)?
            .expr
            .as_ref()
    }

    fn take_channel_ty(&mut self, name: &str) -> Option<TypeExpr> {
        self.board.channels.get_mut(name).and_then(|c| c.ty.take())
    }

    fn put_channel_ty(&mut self, name: &str, expr: TypeExpr) {
        if let Some(channel) = self.board.channels.get_mut(name) {
            channel.ty = Some(expr);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::PinDecl;

    #[test]
    fn default_options_use_the_empty_interface() {
        let options = InferOptions::default();
        assert_eq!(options.unconstrained.to_string(), "interface{}");
        assert!(options.unconstrained.is_plain());
    }

    #[test]
    fn a_parse_failure_names_the_pin() {
        let mut board = Board::new();
        board
            .add_node("reader", vec![PinDecl::output("out", "map[int")])
            .unwrap();
        let err = run(&mut board, &InferOptions::default()).unwrap_err();
        match err {
            PropagateError::Parse { node, pin, .. } => {
                assert_eq!(node, "reader");
                assert_eq!(pin, "out");
            }
            other => panic!("expected a parse error, got {other:?}"),
        }
    }

    #[test]
    fn a_lone_channel_gets_the_unconstrained_type() {
        let mut board = Board::new();
        board.add_channel("idle").unwrap();
        let resolution = run(&mut board, &InferOptions::default()).unwrap();
        assert_eq!(resolution.channel_type("idle"), Some("interface{}"));
    }

    #[test]
    fn a_parametered_default_is_rejected_up_front() {
        let mut board = Board::new();
        board
            .add_node("src", vec![PinDecl::output("out", "int")])
            .unwrap();
        let options = InferOptions {
            unconstrained: TypeExpr::parse("", "[]$T").unwrap(),
        };
        match run(&mut board, &options).unwrap_err() {
            PropagateError::InvalidDefault { ty } => assert_eq!(ty, "[]$T"),
            other => panic!("expected an invalid default, got {other:?}"),
        }
    }

    #[test]
    fn reruns_rebuild_state_from_the_specs() {
        let mut board = Board::new();
        board
            .add_node("src", vec![PinDecl::output("out", "$T")])
            .unwrap();
        board
            .add_node("dst", vec![PinDecl::input("in", "int")])
            .unwrap();
        board.add_channel("c").unwrap();
        board.connect("c", "src", "out").unwrap();
        board.connect("c", "dst", "in").unwrap();

        let first = run(&mut board, &InferOptions::default()).unwrap();
        let second = run(&mut board, &InferOptions::default()).unwrap();
        assert_eq!(first.channel_type("c"), Some("int"));
        assert_eq!(
            serde_json::to_value(&first).unwrap(),
            serde_json::to_value(&second).unwrap()
        );
    }
}
