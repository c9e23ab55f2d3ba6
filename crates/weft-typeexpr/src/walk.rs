//! Depth-first term traversal.
//!
//! Unification zips two trees by advancing two [`TermCursor`]s in lockstep:
//! the driver peeks both, decides, then either descends into the current
//! terms or skips their subtrees entirely.

use crate::term::{Term, TermId};

/// An explicit-stack preorder cursor over one expression's terms.
pub(crate) struct TermCursor<'a> {
    terms: &'a [Term],
    /// Pending term ids; the top of the stack is the current position.
    stack: Vec<TermId>,
}

impl<'a> TermCursor<'a> {
    pub(crate) fn new(terms: &'a [Term], root: TermId) -> Self {
        Self {
            terms,
            stack: vec![root],
        }
    }

    /// The current term id, or `None` once the walk is exhausted.
    pub(crate) fn peek(&self) -> Option<TermId> {
        self.stack.last().copied()
    }

    /// Consume the current term and schedule its children next, leftmost
    /// first. Returns the consumed id.
    pub(crate) fn advance_into(&mut self) -> Option<TermId> {
        let id = self.stack.pop()?;
        let children = self.terms[id.index()].children();
        for child in children.into_iter().rev() {
            self.stack.push(child);
        }
        Some(id)
    }

    /// Consume the current term without visiting its subtree.
    pub(crate) fn advance_over(&mut self) -> Option<TermId> {
        self.stack.pop()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::TypeExpr;

    fn walk_all(expr: &TypeExpr) -> Vec<String> {
        let mut cursor = TermCursor::new(&expr.terms, expr.root);
        let mut out = Vec::new();
        while let Some(id) = cursor.advance_into() {
            out.push(format!("{:?}", std::mem::discriminant(expr.term(id))));
        }
        out
    }

    #[test]
    fn preorder_visits_every_term_once() {
        let expr = TypeExpr::parse("n", "map[string][]int").expect("spec should parse");
        // map, key, slice, elem
        assert_eq!(walk_all(&expr).len(), 4);
    }

    #[test]
    fn children_come_out_left_to_right() {
        let expr = TypeExpr::parse("n", "map[$K]$V").expect("spec should parse");
        let mut cursor = TermCursor::new(&expr.terms, expr.root);
        cursor.advance_into();
        let key = cursor.advance_into().expect("key position");
        let value = cursor.advance_into().expect("value position");
        assert_eq!(expr.term(key).as_param().map(|p| p.name.as_str()), Some("K"));
        assert_eq!(expr.term(value).as_param().map(|p| p.name.as_str()), Some("V"));
        assert_eq!(cursor.peek(), None);
    }

    #[test]
    fn advance_over_skips_the_subtree() {
        let expr = TypeExpr::parse("n", "map[map[int]int]string").expect("spec should parse");
        let mut cursor = TermCursor::new(&expr.terms, expr.root);
        cursor.advance_into();
        // Skip the whole inner map; next up is the outer value.
        cursor.advance_over();
        let value = cursor.advance_into().expect("value position");
        assert!(matches!(expr.term(value), Term::Named(n) if n == "string"));
        assert_eq!(cursor.peek(), None);
    }
}
