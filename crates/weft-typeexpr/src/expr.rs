//! Genericized type expressions.
//!
//! A [`TypeExpr`] holds one parsed type spec as a flat [`Term`] arena plus an
//! occurrence table mapping every [`TypeParam`] to the arena slots where it
//! currently sits. Substitution overwrites those slots in place, so the
//! occurrence table always points at live `Term::Param` nodes and a deep copy
//! of the whole expression is a plain vector clone.

use std::fmt;

use rustc_hash::FxHashMap;

use crate::error::{SyntaxError, UnifyError};
use crate::param::TypeParam;
use crate::parser;
use crate::term::{ChanDir, Term, TermId};
use crate::unify::{self, InferenceMap};

/// One genericized type description, e.g. `map[string][]$T`.
///
/// Mutating operations ([`refine`](Self::refine), [`lithify`](Self::lithify))
/// rewrite the tree in place. Consumers that need an independently mutable
/// copy of a logically shared expression clone it first.
#[derive(Debug, Clone)]
pub struct TypeExpr {
    /// The text this expression was parsed from. Kept for diagnostics;
    /// the current (possibly refined) form is rendered by `Display`.
    pub(crate) source: String,
    pub(crate) terms: Vec<Term>,
    pub(crate) root: TermId,
    /// Parameter occurrence sites. Every listed slot holds a live
    /// `Term::Param` for its key.
    pub(crate) occurrences: FxHashMap<TypeParam, Vec<TermId>>,
}

impl TypeExpr {
    /// Parse a type spec. Parameters written `$name` are scoped to `scope`.
    pub fn parse(scope: &str, spec: &str) -> Result<Self, SyntaxError> {
        parser::parse(scope, spec)
    }

    /// The spec text this expression was originally parsed from.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// True iff the expression holds no parameter occurrences.
    pub fn is_plain(&self) -> bool {
        self.occurrences.is_empty()
    }

    /// Parameters still present, sorted by (scope, name).
    pub fn params(&self) -> Vec<TypeParam> {
        let mut params: Vec<TypeParam> = self.occurrences.keys().cloned().collect();
        params.sort();
        params
    }

    /// Structurally unify `self` against `other`.
    ///
    /// The returned map binds parameters occurring in `self`'s tree to the
    /// subtrees of `other` they lined up with. Bindings for `other`'s own
    /// parameters are the mirrored call's job: `other.infer(self)`. A paired
    /// position where both sides are parameters records nothing.
    pub fn infer(&self, other: &TypeExpr) -> Result<InferenceMap, UnifyError> {
        unify::infer_exprs(self, other)
    }

    /// Substitute bound parameters in place, worklist style.
    ///
    /// Repeatedly takes one bound parameter still present in the tree,
    /// splices its substitute over every occurrence site, then picks up any
    /// parameters the substitute exposed if the map binds those too. A
    /// substitution whose right-hand side transitively contains the
    /// parameter being replaced is rejected. Returns whether the tree
    /// changed; a grounded expression is a no-op reporting `false`.
    pub fn refine(&mut self, bindings: &InferenceMap) -> Result<bool, UnifyError> {
        let mut changed = false;
        loop {
            // Always take the least bound parameter still present, so
            // repeated runs substitute in the same order.
            let next = self
                .occurrences
                .keys()
                .filter(|p| bindings.binding(p).is_some())
                .min()
                .cloned();
            let Some(param) = next else {
                break;
            };
            let Some(substitute) = bindings.binding(&param).cloned() else {
                break;
            };

            if unify::reaches_param(bindings, &substitute, &param) {
                return Err(UnifyError::CyclicSubstitution {
                    substitute: substitute.to_string(),
                    param,
                });
            }

            let sites = self.occurrences.remove(&param).unwrap_or_default();
            for site in sites {
                self.splice(site, &substitute);
            }
            changed = true;
        }
        Ok(changed)
    }

    /// Force every parameter still present to `default`.
    ///
    /// `default` must be plain. Returns whether the tree changed.
    pub fn lithify(&mut self, default: &TypeExpr) -> bool {
        debug_assert!(default.is_plain());
        let params = self.params();
        if params.is_empty() {
            return false;
        }
        for param in params {
            let sites = self.occurrences.remove(&param).unwrap_or_default();
            for site in sites {
                self.splice(site, default);
            }
        }
        true
    }

    /// The term at `id`.
    pub(crate) fn term(&self, id: TermId) -> &Term {
        &self.terms[id.index()]
    }

    /// Extract the subtree rooted at `root` as a standalone expression.
    pub(crate) fn subexpr(&self, root: TermId) -> TypeExpr {
        let mut sub = TypeExpr {
            source: String::new(),
            terms: Vec::new(),
            root: TermId(0),
            occurrences: FxHashMap::default(),
        };
        sub.root = sub.import_term(&self.terms, root, None);
        sub.source = sub.to_string();
        sub
    }

    /// Overwrite the leaf at `site` with a copy of `substitute`'s tree.
    ///
    /// `site` must be a childless slot (a parameter occurrence), so nothing
    /// reachable is orphaned by the overwrite; the substitute's children are
    /// appended fresh.
    fn splice(&mut self, site: TermId, substitute: &TypeExpr) {
        self.import_term(&substitute.terms, substitute.root, Some(site));
    }

    /// Copy the subtree `src[id]` into this arena, either into an existing
    /// slot (`Some`) or appended (`None`). Parameter occurrences inside the
    /// copy are recorded as they land.
    fn import_term(&mut self, src: &[Term], id: TermId, slot: Option<TermId>) -> TermId {
        let term = match &src[id.index()] {
            Term::Named(name) => Term::Named(name.clone()),
            Term::Qualified(pkg, name) => Term::Qualified(pkg.clone(), name.clone()),
            Term::Param(param) => Term::Param(param.clone()),
            Term::Pointer(t) => {
                let t = self.import_term(src, *t, None);
                Term::Pointer(t)
            }
            Term::Slice(t) => {
                let t = self.import_term(src, *t, None);
                Term::Slice(t)
            }
            Term::Array(len, t) => {
                let len = *len;
                let t = self.import_term(src, *t, None);
                Term::Array(len, t)
            }
            Term::Chan(dir, t) => {
                let dir = *dir;
                let t = self.import_term(src, *t, None);
                Term::Chan(dir, t)
            }
            Term::Map(k, v) => {
                let k = self.import_term(src, *k, None);
                let v = self.import_term(src, *v, None);
                Term::Map(k, v)
            }
            Term::Struct(fields) => {
                let fields = fields
                    .iter()
                    .map(|(name, t)| (name.clone(), self.import_term(src, *t, None)))
                    .collect();
                Term::Struct(fields)
            }
            Term::Interface => Term::Interface,
            Term::Func(params, results) => {
                let params = params
                    .iter()
                    .map(|t| self.import_term(src, *t, None))
                    .collect();
                let results = results
                    .iter()
                    .map(|t| self.import_term(src, *t, None))
                    .collect();
                Term::Func(params, results)
            }
            Term::Paren(t) => {
                let t = self.import_term(src, *t, None);
                Term::Paren(t)
            }
        };

        let new_id = match slot {
            Some(slot) => {
                self.terms[slot.index()] = term;
                slot
            }
            None => {
                let id = TermId(self.terms.len() as u32);
                self.terms.push(term);
                id
            }
        };
        if let Some(param) = self.terms[new_id.index()].as_param().cloned() {
            self.occurrences.entry(param).or_default().push(new_id);
        }
        new_id
    }
}

impl fmt::Display for TypeExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_term(f, &self.terms, self.root)
    }
}

/// Renders the subtree rooted at `root` without extracting it.
pub(crate) struct TermDisplay<'a> {
    pub(crate) terms: &'a [Term],
    pub(crate) root: TermId,
}

impl fmt::Display for TermDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_term(f, self.terms, self.root)
    }
}

fn write_term(f: &mut fmt::Formatter<'_>, terms: &[Term], id: TermId) -> fmt::Result {
    match &terms[id.index()] {
        Term::Named(name) => write!(f, "{name}"),
        Term::Qualified(pkg, name) => write!(f, "{pkg}.{name}"),
        Term::Param(param) => write!(f, "{param}"),
        Term::Pointer(t) => {
            write!(f, "*")?;
            write_term(f, terms, *t)
        }
        Term::Slice(t) => {
            write!(f, "[]")?;
            write_term(f, terms, *t)
        }
        Term::Array(len, t) => {
            write!(f, "[{len}]")?;
            write_term(f, terms, *t)
        }
        Term::Chan(ChanDir::Both, t) => {
            // `chan <-chan int` would re-read as a send-only channel, so a
            // receive-channel element keeps explicit parentheses.
            if matches!(terms[t.index()], Term::Chan(ChanDir::Recv, _)) {
                write!(f, "chan (")?;
                write_term(f, terms, *t)?;
                write!(f, ")")
            } else {
                write!(f, "chan ")?;
                write_term(f, terms, *t)
            }
        }
        Term::Chan(ChanDir::Send, t) => {
            write!(f, "chan<- ")?;
            write_term(f, terms, *t)
        }
        Term::Chan(ChanDir::Recv, t) => {
            write!(f, "<-chan ")?;
            write_term(f, terms, *t)
        }
        Term::Map(k, v) => {
            write!(f, "map[")?;
            write_term(f, terms, *k)?;
            write!(f, "]")?;
            write_term(f, terms, *v)
        }
        Term::Struct(fields) => {
            if fields.is_empty() {
                return write!(f, "struct{{}}");
            }
            write!(f, "struct {{ ")?;
            for (i, (name, t)) in fields.iter().enumerate() {
                if i > 0 {
                    write!(f, "; ")?;
                }
                write!(f, "{name} ")?;
                write_term(f, terms, *t)?;
            }
            write!(f, " }}")
        }
        Term::Interface => write!(f, "interface{{}}"),
        Term::Func(params, results) => {
            write!(f, "func(")?;
            for (i, t) in params.iter().enumerate() {
                if i > 0 {
                    write!(f, ", ")?;
                }
                write_term(f, terms, *t)?;
            }
            write!(f, ")")?;
            match results.len() {
                0 => Ok(()),
                1 => {
                    write!(f, " ")?;
                    write_term(f, terms, results[0])
                }
                _ => {
                    write!(f, " (")?;
                    for (i, t) in results.iter().enumerate() {
                        if i > 0 {
                            write!(f, ", ")?;
                        }
                        write_term(f, terms, *t)?;
                    }
                    write!(f, ")")
                }
            }
        }
        Term::Paren(t) => {
            write!(f, "(")?;
            write_term(f, terms, *t)?;
            write!(f, ")")
        }
    }
}
