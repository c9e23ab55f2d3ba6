//! Parameter bindings and structural unification.
//!
//! [`InferenceMap`] holds what inference has established about each
//! parameter so far. The lockstep driver below walks two expressions in
//! step, feeding parameter/subtree pairings into the map and rejecting
//! shape disagreements.

use rustc_hash::{FxHashMap, FxHashSet};

use crate::error::UnifyError;
use crate::expr::{TermDisplay, TypeExpr};
use crate::param::TypeParam;
use crate::walk::TermCursor;

/// Accumulated parameter bindings with conflict resolution.
///
/// An entry is either bound to a substitute expression or merely noted
/// (known to exist, still unresolved). Noting lets a final defaulting pass
/// reach parameters that no unification ever constrained.
#[derive(Debug, Clone)]
pub struct InferenceMap {
    bindings: FxHashMap<TypeParam, Option<TypeExpr>>,
}

impl InferenceMap {
    /// Create an empty map.
    pub fn new() -> Self {
        Self {
            bindings: FxHashMap::default(),
        }
    }

    /// Number of parameters tracked, bound or noted.
    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    /// True iff no parameter is tracked at all.
    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// The substitute bound for `param`, if one has been learned.
    pub fn binding(&self, param: &TypeParam) -> Option<&TypeExpr> {
        self.bindings.get(param).and_then(|b| b.as_ref())
    }

    /// Whether `param` is tracked, bound or not.
    pub fn contains(&self, param: &TypeParam) -> bool {
        self.bindings.contains_key(param)
    }

    /// Ensure every parameter occurring in `expr` is tracked, binding none.
    pub fn note(&mut self, expr: &TypeExpr) {
        for param in expr.params() {
            self.bindings.entry(param).or_insert(None);
        }
    }

    /// Record that `param` must equal `candidate`.
    ///
    /// Binds if unbound. If a binding already exists, the existing and
    /// candidate expressions are unified in both directions and every
    /// derived binding is learned in turn; the existing binding stays in
    /// place. An irreconcilable pair is a [`UnifyError::Conflict`] naming
    /// the parameter and carrying the structural cause.
    pub fn learn(&mut self, param: TypeParam, candidate: TypeExpr) -> Result<(), UnifyError> {
        let existing = match self.bindings.get(&param) {
            Some(Some(existing)) => existing.clone(),
            _ => {
                self.bindings.insert(param, Some(candidate));
                return Ok(());
            }
        };

        let conflict = |cause: UnifyError| UnifyError::Conflict {
            param: param.clone(),
            existing: existing.to_string(),
            candidate: candidate.to_string(),
            cause: Box::new(cause),
        };
        let forward = existing.infer(&candidate).map_err(&conflict)?;
        let backward = candidate.infer(&existing).map_err(&conflict)?;

        for (p, expr) in forward.into_bound() {
            self.learn(p, expr)?;
        }
        for (p, expr) in backward.into_bound() {
            self.learn(p, expr)?;
        }
        Ok(())
    }

    /// Bind every noted-but-unbound parameter to `default`.
    pub fn apply_default(&mut self, default: &TypeExpr) {
        for binding in self.bindings.values_mut() {
            if binding.is_none() {
                *binding = Some(default.clone());
            }
        }
    }

    /// Ground every entry to a plain expression: default unbound
    /// parameters, chase each binding through the map, and force any
    /// parameter still left to `default`.
    ///
    /// A chain that loops keeps its shape through the chase and has its
    /// parameters forced like any other leftover, so grounding always
    /// succeeds.
    pub fn ground(&mut self, default: &TypeExpr) {
        self.apply_default(default);
        let snapshot = self.clone();
        for binding in self.bindings.values_mut().flatten() {
            let _ = binding.refine(&snapshot);
            binding.lithify(default);
        }
    }

    /// Tracked parameters, sorted by (scope, name).
    pub fn params(&self) -> Vec<TypeParam> {
        let mut params: Vec<TypeParam> = self.bindings.keys().cloned().collect();
        params.sort();
        params
    }

    /// All entries sorted by parameter.
    pub fn entries(&self) -> Vec<(&TypeParam, Option<&TypeExpr>)> {
        let mut entries: Vec<_> = self.bindings.iter().map(|(p, b)| (p, b.as_ref())).collect();
        entries.sort_by(|a, b| a.0.cmp(b.0));
        entries
    }

    /// Consume the map, yielding its bound entries sorted by parameter.
    pub fn into_bound(self) -> Vec<(TypeParam, TypeExpr)> {
        let mut bound: Vec<_> = self
            .bindings
            .into_iter()
            .filter_map(|(p, b)| b.map(|expr| (p, expr)))
            .collect();
        bound.sort_by(|a, b| a.0.cmp(&b.0));
        bound
    }

    /// Fold `other` into this map: bound entries are learned, unbound ones
    /// noted.
    pub fn merge(&mut self, other: InferenceMap) -> Result<(), UnifyError> {
        let mut entries: Vec<_> = other.bindings.into_iter().collect();
        entries.sort_by(|a, b| a.0.cmp(&b.0));
        for (param, binding) in entries {
            match binding {
                Some(expr) => self.learn(param, expr)?,
                None => {
                    self.bindings.entry(param).or_insert(None);
                }
            }
        }
        Ok(())
    }
}

/// Whether `expr` contains `target`, looking through the map's bindings:
/// a parameter in `expr` that is bound counts as containing everything its
/// substitute contains.
pub(crate) fn reaches_param(map: &InferenceMap, expr: &TypeExpr, target: &TypeParam) -> bool {
    let mut stack = expr.params();
    let mut seen: FxHashSet<TypeParam> = FxHashSet::default();
    while let Some(param) = stack.pop() {
        if &param == target {
            return true;
        }
        if seen.insert(param.clone()) {
            if let Some(binding) = map.binding(&param) {
                stack.extend(binding.params());
            }
        }
    }
    false
}

/// Lockstep unification of `left` against `right`.
///
/// Bindings are recorded for `left`'s parameters only; the caller runs the
/// mirrored direction when it wants the other side's.
pub(crate) fn infer_exprs(left: &TypeExpr, right: &TypeExpr) -> Result<InferenceMap, UnifyError> {
    let mut map = InferenceMap::new();
    let mut lc = TermCursor::new(&left.terms, left.root);
    let mut rc = TermCursor::new(&right.terms, right.root);

    loop {
        match (lc.peek(), rc.peek()) {
            (None, None) => return Ok(map),
            (Some(l), Some(r)) => {
                let lt = left.term(l);
                let rt = right.term(r);
                match (lt.as_param(), rt.as_param()) {
                    // A parameter on both sides records no binding; each
                    // side stays independent.
                    (Some(_), Some(_)) => {
                        lc.advance_over();
                        rc.advance_over();
                    }
                    (Some(param), None) => {
                        let param = param.clone();
                        let substitute = right.subexpr(r);
                        map.learn(param, substitute)?;
                        lc.advance_over();
                        rc.advance_over();
                    }
                    // The mirrored call records right-side parameters.
                    (None, Some(_)) => {
                        lc.advance_over();
                        rc.advance_over();
                    }
                    (None, None) => {
                        if !lt.head_matches(rt) {
                            return Err(UnifyError::ShapeMismatch {
                                left: TermDisplay {
                                    terms: &left.terms,
                                    root: l,
                                }
                                .to_string(),
                                right: TermDisplay {
                                    terms: &right.terms,
                                    root: r,
                                }
                                .to_string(),
                            });
                        }
                        lc.advance_into();
                        rc.advance_into();
                    }
                }
            }
            // One walk drained before the other.
            _ => {
                return Err(UnifyError::ShapeMismatch {
                    left: left.to_string(),
                    right: right.to_string(),
                });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn expr(scope: &str, spec: &str) -> TypeExpr {
        TypeExpr::parse(scope, spec).expect("spec should parse")
    }

    fn n(spec: &str) -> TypeExpr {
        expr("n", spec)
    }

    fn param(name: &str) -> TypeParam {
        TypeParam::new("n", name)
    }

    fn binding_text(map: &InferenceMap, name: &str) -> String {
        map.binding(&param(name))
            .map(|b| b.to_string())
            .unwrap_or_else(|| "<unbound>".into())
    }

    #[test]
    fn plain_self_unification_is_empty() {
        let t = n("map[string][]int");
        let map = t.infer(&t).unwrap();
        assert!(map.is_empty());
    }

    #[test]
    fn single_param_binds_matching_subtree() {
        let map = n("[]$T").infer(&n("[]map[string]int")).unwrap();
        assert_eq!(map.len(), 1);
        assert_eq!(binding_text(&map, "T"), "map[string]int");
    }

    #[test]
    fn map_key_and_value_split() {
        let map = n("map[$K]$V").infer(&n("map[int]string")).unwrap();
        assert_eq!(map.len(), 2);
        assert_eq!(binding_text(&map, "K"), "int");
        assert_eq!(binding_text(&map, "V"), "string");
    }

    #[test]
    fn repeated_param_conflicts_on_divergent_sides() {
        let err = n("map[$T]$T").infer(&n("map[int]string")).unwrap_err();
        match err {
            UnifyError::Conflict {
                param: p,
                existing,
                candidate,
                ..
            } => {
                assert_eq!(p, param("T"));
                assert_eq!(existing, "int");
                assert_eq!(candidate, "string");
            }
            other => panic!("expected conflict, got {other:?}"),
        }
    }

    #[test]
    fn repeated_param_accepts_agreeing_sides() {
        let map = n("map[$T]$T").infer(&n("map[int]int")).unwrap();
        assert_eq!(map.len(), 1);
        assert_eq!(binding_text(&map, "T"), "int");
    }

    #[test]
    fn shape_mismatch_reports_offending_subtrees() {
        let err = n("chan []int").infer(&n("chan map[string]int")).unwrap_err();
        match err {
            UnifyError::ShapeMismatch { left, right } => {
                assert_eq!(left, "[]int");
                assert_eq!(right, "map[string]int");
            }
            other => panic!("expected shape mismatch, got {other:?}"),
        }
    }

    #[test]
    fn named_literals_must_agree() {
        assert!(n("int").infer(&n("string")).is_err());
        assert!(n("time.Time").infer(&n("time.Duration")).is_err());
        assert!(n("int").infer(&n("int")).unwrap().is_empty());
    }

    #[test]
    fn array_lengths_must_agree() {
        assert!(n("[4]byte").infer(&n("[4]byte")).is_ok());
        let err = n("[4]byte").infer(&n("[8]byte")).unwrap_err();
        assert!(matches!(err, UnifyError::ShapeMismatch { .. }));
    }

    #[test]
    fn chan_directions_must_agree() {
        assert!(n("chan<- int").infer(&n("<-chan int")).is_err());
        assert!(n("chan int").infer(&n("chan<- int")).is_err());
        assert!(n("<-chan $T").infer(&n("<-chan int")).is_ok());
    }

    #[test]
    fn func_arity_must_agree() {
        assert!(n("func(int)").infer(&n("func(int, int)")).is_err());
        assert!(n("func() int").infer(&n("func()")).is_err());
        let map = n("func($A) $B").infer(&n("func(string) error")).unwrap();
        assert_eq!(binding_text(&map, "A"), "string");
        assert_eq!(binding_text(&map, "B"), "error");
    }

    #[test]
    fn struct_field_names_must_agree() {
        assert!(n("struct { x int }").infer(&n("struct { y int }")).is_err());
        let map = n("struct { x $T; y int }")
            .infer(&n("struct { x string; y int }"))
            .unwrap();
        assert_eq!(binding_text(&map, "T"), "string");
    }

    #[test]
    fn params_on_both_sides_record_nothing() {
        let left = n("[]$A");
        let right = expr("m", "[]$B");
        assert!(left.infer(&right).unwrap().is_empty());
        assert!(right.infer(&left).unwrap().is_empty());
    }

    #[test]
    fn bindings_are_self_side_only() {
        let concrete = n("[]int");
        let generic = n("[]$T");
        assert!(concrete.infer(&generic).unwrap().is_empty());
        let map = generic.infer(&concrete).unwrap();
        assert_eq!(binding_text(&map, "T"), "int");
    }

    #[test]
    fn learn_derives_bindings_from_partial_overlap() {
        let mut map = InferenceMap::new();
        map.learn(param("X"), n("map[$K]$V")).unwrap();
        map.learn(param("X"), n("map[int]string")).unwrap();
        assert_eq!(binding_text(&map, "X"), "map[$K]$V");
        assert_eq!(binding_text(&map, "K"), "int");
        assert_eq!(binding_text(&map, "V"), "string");
    }

    #[test]
    fn learn_derives_bindings_from_candidate_side() {
        let mut map = InferenceMap::new();
        map.learn(param("X"), n("map[int]string")).unwrap();
        map.learn(param("X"), n("map[$K]$V")).unwrap();
        assert_eq!(binding_text(&map, "X"), "map[int]string");
        assert_eq!(binding_text(&map, "K"), "int");
        assert_eq!(binding_text(&map, "V"), "string");
    }

    #[test]
    fn learn_conflict_carries_structural_cause() {
        use std::error::Error;

        let mut map = InferenceMap::new();
        map.learn(param("T"), n("int")).unwrap();
        let err = map.learn(param("T"), n("string")).unwrap_err();
        assert!(matches!(err, UnifyError::Conflict { .. }));
        let cause = err.source().expect("conflict should carry a cause");
        assert!(cause.to_string().contains("shape mismatch"));
    }

    #[test]
    fn note_tracks_without_binding() {
        let mut map = InferenceMap::new();
        map.note(&n("map[$K]$V"));
        assert_eq!(map.len(), 2);
        assert!(map.contains(&param("K")));
        assert!(map.binding(&param("K")).is_none());
    }

    #[test]
    fn apply_default_fills_only_unbound_entries() {
        let mut map = InferenceMap::new();
        map.note(&n("map[$K]$V"));
        map.learn(param("K"), n("int")).unwrap();
        let default = expr("", "interface{}");
        map.apply_default(&default);
        assert_eq!(binding_text(&map, "K"), "int");
        assert_eq!(binding_text(&map, "V"), "interface{}");
    }

    #[test]
    fn ground_chases_chains_and_forces_leftovers() {
        let mut map = InferenceMap::new();
        map.learn(param("W"), n("[]$T")).unwrap();
        map.learn(param("T"), n("int")).unwrap();
        map.note(&n("$U"));
        map.ground(&expr("", "interface{}"));
        assert_eq!(binding_text(&map, "W"), "[]int");
        assert_eq!(binding_text(&map, "T"), "int");
        assert_eq!(binding_text(&map, "U"), "interface{}");
    }

    #[test]
    fn ground_survives_cyclic_chains() {
        let mut map = InferenceMap::new();
        map.learn(param("T"), n("[]$T")).unwrap();
        map.ground(&expr("", "interface{}"));
        assert_eq!(binding_text(&map, "T"), "[]interface{}");
    }

    #[test]
    fn merge_learns_bound_and_notes_unbound() {
        let mut target = InferenceMap::new();
        target.learn(param("A"), n("int")).unwrap();

        let mut other = InferenceMap::new();
        other.note(&n("$B"));
        other.learn(param("C"), n("string")).unwrap();

        target.merge(other).unwrap();
        assert_eq!(binding_text(&target, "A"), "int");
        assert!(target.contains(&param("B")));
        assert!(target.binding(&param("B")).is_none());
        assert_eq!(binding_text(&target, "C"), "string");
    }

    #[test]
    fn merge_conflicts_propagate() {
        let mut target = InferenceMap::new();
        target.learn(param("A"), n("int")).unwrap();

        let mut other = InferenceMap::new();
        other.learn(param("A"), n("string")).unwrap();

        assert!(target.merge(other).is_err());
    }

    #[test]
    fn entries_come_out_sorted() {
        let mut map = InferenceMap::new();
        map.learn(TypeParam::new("b", "Z"), n("int")).unwrap();
        map.learn(TypeParam::new("a", "T"), n("string")).unwrap();
        map.learn(TypeParam::new("a", "A"), n("bool")).unwrap();
        let names: Vec<String> = map
            .entries()
            .into_iter()
            .map(|(p, _)| format!("{}/{}", p.scope, p.name))
            .collect();
        assert_eq!(names, vec!["a/A", "a/T", "b/Z"]);
    }

    #[test]
    fn reachability_follows_binding_chains() {
        let mut map = InferenceMap::new();
        map.learn(param("A"), n("[]$B")).unwrap();
        map.learn(param("B"), n("chan $C")).unwrap();
        let start = n("$A");
        assert!(reaches_param(&map, &start, &param("C")));
        assert!(reaches_param(&map, &start, &param("A")));
        assert!(!reaches_param(&map, &start, &param("D")));
    }
}
