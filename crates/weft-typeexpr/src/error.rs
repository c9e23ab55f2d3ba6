//! Error types for parsing and unification.

use std::fmt;

use crate::param::TypeParam;
use crate::span::Span;

/// A parse error with location information.
///
/// Parsing is strict: the first malformed construct aborts the parse and
/// surfaces here with the byte span of the offending token.
#[derive(Debug, Clone, PartialEq)]
pub struct SyntaxError {
    pub kind: SyntaxErrorKind,
    pub span: Span,
}

impl SyntaxError {
    /// Create a new syntax error.
    pub fn new(kind: SyntaxErrorKind, span: Span) -> Self {
        Self { kind, span }
    }
}

/// The specific kind of syntax error.
#[derive(Debug, Clone, PartialEq)]
pub enum SyntaxErrorKind {
    /// The parser needed one construct and found another token.
    Unexpected {
        /// Token text, or `"end of input"` when the spec ran out.
        found: String,
        /// What the parser was looking for, e.g. `"a type"` or `"']'"`.
        expected: &'static str,
    },
    /// A complete type was parsed but input remained.
    TrailingInput(String),
    /// An array length literal does not fit in `u64`.
    ArrayLenOverflow(String),
    /// Recognized Go syntax that type specs deliberately do not support,
    /// e.g. non-empty interface bodies or variadic function parameters.
    Unsupported(&'static str),
}

impl fmt::Display for SyntaxErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unexpected { found, expected } => {
                write!(f, "expected {expected}, found `{found}`")
            }
            Self::TrailingInput(found) => {
                write!(f, "unexpected input after type: `{found}`")
            }
            Self::ArrayLenOverflow(text) => {
                write!(f, "array length out of range: {text}")
            }
            Self::Unsupported(what) => write!(f, "unsupported type syntax: {what}"),
        }
    }
}

impl fmt::Display for SyntaxError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.kind)
    }
}

impl std::error::Error for SyntaxError {}

/// An error raised while unifying or refining type expressions.
///
/// Rendered subtree text is carried instead of live expression handles so
/// errors stay cheap to clone and compare after the expressions that raised
/// them have moved on.
#[derive(Debug, Clone, PartialEq)]
pub enum UnifyError {
    /// Two expressions disagree on composite kind, literal value, or arity
    /// at some paired position.
    ShapeMismatch {
        /// Printed form of the offending subtree on the left.
        left: String,
        /// Printed form of the offending subtree on the right.
        right: String,
    },
    /// A parameter already bound to one expression is required to equal an
    /// irreconcilable second expression.
    Conflict {
        param: TypeParam,
        existing: String,
        candidate: String,
        /// The unification failure between the two bindings.
        cause: Box<UnifyError>,
    },
    /// A substitution's right-hand side transitively contains the parameter
    /// it would replace.
    CyclicSubstitution {
        param: TypeParam,
        /// Printed form of the substitute that loops back.
        substitute: String,
    },
}

impl fmt::Display for UnifyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ShapeMismatch { left, right } => {
                write!(f, "shape mismatch: `{left}` does not unify with `{right}`")
            }
            Self::Conflict {
                param,
                existing,
                candidate,
                ..
            } => {
                write!(
                    f,
                    "conflicting bindings for `{param}`: already `{existing}`, also requires `{candidate}`"
                )
            }
            Self::CyclicSubstitution { param, substitute } => {
                write!(
                    f,
                    "cyclic substitution: `{param}` occurs in its own substitute `{substitute}`"
                )
            }
        }
    }
}

impl std::error::Error for UnifyError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Conflict { cause, .. } => Some(cause.as_ref()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn syntax_error_display() {
        let err = SyntaxError::new(
            SyntaxErrorKind::Unexpected {
                found: "]".into(),
                expected: "a type",
            },
            Span::new(4, 5),
        );
        assert_eq!(err.to_string(), "expected a type, found `]`");
    }

    #[test]
    fn unify_error_display() {
        let err = UnifyError::ShapeMismatch {
            left: "[]int".into(),
            right: "map[string]int".into(),
        };
        assert_eq!(
            err.to_string(),
            "shape mismatch: `[]int` does not unify with `map[string]int`"
        );
    }

    #[test]
    fn conflict_chains_its_cause() {
        use std::error::Error;

        let cause = UnifyError::ShapeMismatch {
            left: "int".into(),
            right: "string".into(),
        };
        let err = UnifyError::Conflict {
            param: TypeParam::new("n", "T"),
            existing: "int".into(),
            candidate: "string".into(),
            cause: Box::new(cause.clone()),
        };
        assert_eq!(
            err.to_string(),
            "conflicting bindings for `$T`: already `int`, also requires `string`"
        );
        let source = err.source().expect("conflict should carry a cause");
        assert_eq!(source.to_string(), cause.to_string());
    }
}
