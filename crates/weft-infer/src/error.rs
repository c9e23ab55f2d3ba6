//! Errors raised while propagating types over a board.

use std::fmt;

use weft_typeexpr::{SyntaxError, UnifyError};

/// Why a propagation run aborted.
///
/// A run fails fast: the first error stops the queue and the board's type
/// slots are left mid-flight. Callers must rerun before reading them.
#[derive(Debug, Clone, PartialEq)]
pub enum PropagateError {
    /// A pin's type spec failed to parse when the run instantiated it.
    Parse {
        node: String,
        pin: String,
        source: SyntaxError,
    },
    /// Two types meeting at a channel could not be unified.
    Incompatible {
        channel: String,
        source: UnifyError,
    },
    /// The configured unconstrained type itself contains parameters, so it
    /// cannot ground anything. Rejected before the run starts.
    InvalidDefault { ty: String },
}

impl fmt::Display for PropagateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Parse { node, pin, source } => {
                write!(f, "invalid type spec on pin `{node}.{pin}`: {source}")
            }
            Self::Incompatible { channel, source } => {
                write!(f, "incompatible types on channel `{channel}`: {source}")
            }
            Self::InvalidDefault { ty } => {
                write!(f, "invalid unconstrained type `{ty}`: contains type parameters")
            }
        }
    }
}

impl std::error::Error for PropagateError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Parse { source, .. } => Some(source),
            Self::Incompatible { source, .. } => Some(source),
            Self::InvalidDefault { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;
    use weft_typeexpr::TypeExpr;

    #[test]
    fn parse_errors_name_the_pin() {
        let source = TypeExpr::parse("n", "map[int").unwrap_err();
        let err = PropagateError::Parse {
            node: "splitter".to_string(),
            pin: "in".to_string(),
            source,
        };
        let text = err.to_string();
        assert!(text.starts_with("invalid type spec on pin `splitter.in`:"));
        assert!(err.source().is_some());
    }

    #[test]
    fn incompatibilities_name_the_channel() {
        let left = TypeExpr::parse("a", "[]int").unwrap();
        let right = TypeExpr::parse("b", "map[int]bool").unwrap();
        let source = left.infer(&right).unwrap_err();
        let err = PropagateError::Incompatible {
            channel: "values".to_string(),
            source,
        };
        let text = err.to_string();
        assert!(text.starts_with("incompatible types on channel `values`:"));
        assert!(text.contains("shape mismatch"));
    }

    #[test]
    fn invalid_defaults_name_the_type() {
        let err = PropagateError::InvalidDefault {
            ty: "[]$T".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "invalid unconstrained type `[]$T`: contains type parameters"
        );
        assert!(err.source().is_none());
    }
}
