//! Weft type expressions: the genericized type language for pins and channels.
//!
//! Pin and channel types on a Weft board are written in a Go-flavored type
//! syntax extended with `$`-prefixed parameters (`[]$T`, `map[$K]$V`). This
//! crate parses those specs, unifies pairs of them structurally, and applies
//! the bindings unification discovers:
//!
//! - Parameters are identified by (scope, name); the same `$T` on two
//!   different nodes is two parameters
//! - Unification pairs the two trees position by position and binds each
//!   parameter to the subtree facing it
//! - Refinement substitutes learned bindings in place, chasing bindings the
//!   substitutes themselves expose
//! - Lithification forces whatever is left to a default type
//!
//! # Architecture
//!
//! - [`expr`]: [`TypeExpr`], the arena-backed expression tree
//! - [`unify`]: [`InferenceMap`] and the lockstep unification driver
//! - [`pattern`]: [`TypePattern`], the string-level single-shot matcher
//! - [`error`]: [`SyntaxError`] and [`UnifyError`]
//! - [`diagnostics`]: ariadne rendering of parse errors
//! - `lexer`/`parser`: the spec tokenizer and recursive-descent parser

pub mod diagnostics;
pub mod error;
pub mod expr;
pub mod param;
pub mod pattern;
pub mod span;
pub mod term;
pub mod unify;

mod cursor;
mod lexer;
mod parser;
mod token;
mod walk;

pub use error::{SyntaxError, SyntaxErrorKind, UnifyError};
pub use expr::TypeExpr;
pub use param::TypeParam;
pub use pattern::{PatternError, TypePattern};
pub use span::Span;
pub use unify::InferenceMap;
