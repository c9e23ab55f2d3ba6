//! Weft board-wide type inference.
//!
//! Takes a board of nodes whose pins carry genericized type specs, joined
//! by channels, and resolves every pin and channel to a concrete type:
//!
//! - **Board model** ([`board`]): nodes, pins, channels, and attachments,
//!   with structural validation at edit time.
//! - **Part catalog** ([`catalog`]): reusable pin declarations stamped out
//!   onto boards; a plain value, never a process-wide registry.
//! - **Propagation** ([`propagate`]): a work-queue fixpoint that flows type
//!   information across channels in both directions, then grounds whatever
//!   is left to the unconstrained type.
//! - **Resolution** ([`resolution`]): the serialized hand-off to code
//!   emission, all strings in sorted maps.
//!
//! The run either produces a full [`Resolution`] or fails fast with a
//! [`PropagateError`] naming the pin or channel at fault.

pub mod board;
pub mod catalog;
pub mod diagnostics;
pub mod error;
pub mod propagate;
pub mod resolution;

pub use board::{Board, BoardError, Channel, Node, Pin, PinDir, PinRef};
pub use catalog::{CatalogError, PartCatalog, PinDecl};
pub use error::PropagateError;
pub use propagate::InferOptions;
pub use resolution::{NodeResolution, PinResolution, Resolution};

/// Resolve every pin and channel type on the board with default options.
pub fn resolve(board: &mut Board) -> Result<Resolution, PropagateError> {
    resolve_with(board, &InferOptions::default())
}

/// Resolve every pin and channel type on the board.
pub fn resolve_with(
    board: &mut Board,
    options: &InferOptions,
) -> Result<Resolution, PropagateError> {
    propagate::run(board, options)
}
