//! Arena nodes for parsed type expressions.
//!
//! A [`crate::TypeExpr`] stores its tree as a flat `Vec<Term>` addressed by
//! [`TermId`] handles, so deep-copying an expression is a plain vector clone
//! and no node ever holds a pointer into another expression.

use crate::param::TypeParam;

/// A handle to one [`Term`] inside an expression's arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TermId(pub u32);

impl TermId {
    /// Arena index of this handle.
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Channel direction marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChanDir {
    /// `chan T` - send and receive.
    Both,
    /// `chan<- T` - send only.
    Send,
    /// `<-chan T` - receive only.
    Recv,
}

/// One node of a parsed type expression.
///
/// Child links are [`TermId`] handles into the owning expression's arena.
/// Two terms unify only if they agree on variant and on every literal
/// carried here (names, array lengths, channel directions, field names,
/// arity of struct/func children).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Term {
    /// A bare named type: `int`, `string`, `error`, `MyType`.
    Named(String),
    /// A package-qualified name: `time.Time`, `io.Reader`.
    Qualified(String, String),
    /// A `$`-parameter occurrence.
    Param(TypeParam),
    /// `*T`
    Pointer(TermId),
    /// `[]T`
    Slice(TermId),
    /// `[N]T` with a decimal length literal.
    Array(u64, TermId),
    /// `chan T`, `chan<- T`, `<-chan T`.
    Chan(ChanDir, TermId),
    /// `map[K]V`
    Map(TermId, TermId),
    /// `struct { name T; ... }` with named fields in declaration order.
    Struct(Vec<(String, TermId)>),
    /// `interface{}` - the empty interface only.
    Interface,
    /// `func(params...) (results...)`
    Func(Vec<TermId>, Vec<TermId>),
    /// `(T)` - parentheses are kept as a real node so the printed form
    /// re-reads as the same type.
    Paren(TermId),
}

impl Term {
    /// Whether this term is a parameter occurrence.
    pub fn is_param(&self) -> bool {
        matches!(self, Term::Param(_))
    }

    /// The parameter at this term, if it is one.
    pub fn as_param(&self) -> Option<&TypeParam> {
        match self {
            Term::Param(p) => Some(p),
            _ => None,
        }
    }

    /// Child handles in canonical (printing and walking) order.
    pub fn children(&self) -> Vec<TermId> {
        match self {
            Term::Named(_) | Term::Qualified(_, _) | Term::Param(_) | Term::Interface => {
                Vec::new()
            }
            Term::Pointer(t) | Term::Slice(t) | Term::Array(_, t) | Term::Chan(_, t)
            | Term::Paren(t) => vec![*t],
            Term::Map(k, v) => vec![*k, *v],
            Term::Struct(fields) => fields.iter().map(|(_, t)| *t).collect(),
            Term::Func(params, results) => {
                params.iter().chain(results.iter()).copied().collect()
            }
        }
    }

    /// Whether two terms agree on variant and literal content, ignoring
    /// child handles. Children are compared separately by the lockstep walk.
    pub fn head_matches(&self, other: &Term) -> bool {
        match (self, other) {
            (Term::Named(a), Term::Named(b)) => a == b,
            (Term::Qualified(ap, an), Term::Qualified(bp, bn)) => ap == bp && an == bn,
            (Term::Param(a), Term::Param(b)) => a == b,
            (Term::Pointer(_), Term::Pointer(_)) => true,
            (Term::Slice(_), Term::Slice(_)) => true,
            (Term::Array(a, _), Term::Array(b, _)) => a == b,
            (Term::Chan(a, _), Term::Chan(b, _)) => a == b,
            (Term::Map(_, _), Term::Map(_, _)) => true,
            (Term::Struct(a), Term::Struct(b)) => {
                a.len() == b.len()
                    && a.iter().zip(b.iter()).all(|((an, _), (bn, _))| an == bn)
            }
            (Term::Interface, Term::Interface) => true,
            (Term::Func(ap, ar), Term::Func(bp, br)) => {
                ap.len() == bp.len() && ar.len() == br.len()
            }
            (Term::Paren(_), Term::Paren(_)) => true,
            _ => false,
        }
    }
}
