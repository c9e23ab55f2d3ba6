//! Scoped type-parameter identity.

use std::fmt;

/// A type parameter: an owning scope (normally a node name) plus the
/// identifier written after `$` in a type spec.
///
/// Identity is the pair. `$T` declared on node `double` and `$T` declared
/// on node `filter` are two unrelated parameters, so bindings learned for
/// one never leak into the other.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeParam {
    /// Owning scope. Ordered first so parameter lists group by scope.
    pub scope: String,
    /// Identifier without the leading `$`.
    pub name: String,
}

impl TypeParam {
    /// Create a parameter identity from a scope and a bare identifier.
    pub fn new(scope: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            scope: scope.into(),
            name: name.into(),
        }
    }
}

impl fmt::Display for TypeParam {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "${}", self.name)
    }
}
