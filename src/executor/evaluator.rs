//! Query evaluator
//!
//! Resolves a predicate or compound query to a row-id set against one index
//! snapshot.
//!
//! Predicate evaluation (per set field, in field-table order):
//! 1. Exact text match -> string index lookup (absent value is an error)
//! 2. Exact numeric match -> backend equality scan
//! 3. Range (min and max together) -> one backend inclusive range scan
//! 4. Intersect all per-field results; no set field means no rows
//! 5. If excluded, complement against the universe
//!
//! Compound evaluation folds children left to right (AND = intersection,
//! OR = union), no children means no rows, then applies its own include flag.

use crate::index::{FieldIndex, FieldNode, NumericBackend, RowIdSet};
use crate::planner::{CompoundQuery, MatchValue, Operation, Predicate, QueryNode};

use super::errors::{ExecutorError, ExecutorResult};

/// Evaluates queries against one index snapshot
pub struct QueryEvaluator<'a> {
    index: &'a FieldIndex,
    universe: &'a RowIdSet,
    backend: &'a dyn NumericBackend,
}

impl<'a> QueryEvaluator<'a> {
    pub fn new(index: &'a FieldIndex, universe: &'a RowIdSet, backend: &'a dyn NumericBackend) -> Self {
        Self {
            index,
            universe,
            backend,
        }
    }

    /// Evaluates either query shape
    pub fn evaluate(&self, node: &QueryNode) -> ExecutorResult<RowIdSet> {
        match node {
            QueryNode::Predicate(predicate) => self.evaluate_predicate(predicate),
            QueryNode::Compound(compound) => self.evaluate_compound(compound),
        }
    }

    pub fn evaluate_predicate(&self, predicate: &Predicate) -> ExecutorResult<RowIdSet> {
        // Nothing to match against, and nothing to complement.
        if self.universe.is_empty() {
            return Ok(RowIdSet::new());
        }

        let mut matched: Option<RowIdSet> = None;
        for (descriptor, condition) in predicate.conditions() {
            if let Some(target) = &condition.exact {
                let rows = self.match_exact(descriptor.name, target)?;
                intersect(&mut matched, rows);
            }
            if condition.has_range() {
                let (min, max) = condition.bounds();
                let rows = self.match_range(descriptor.name, min, max);
                intersect(&mut matched, rows);
            }
        }

        Ok(self.apply_include(matched.unwrap_or_default(), predicate.include()))
    }

    pub fn evaluate_compound(&self, compound: &CompoundQuery) -> ExecutorResult<RowIdSet> {
        let mut folded: Option<RowIdSet> = None;
        for child in compound.children() {
            let rows = self.evaluate(child)?;
            folded = Some(match folded {
                None => rows,
                Some(mut acc) => {
                    match compound.operation() {
                        Operation::And => acc &= rows,
                        Operation::Or => acc |= rows,
                    }
                    acc
                }
            });
        }

        Ok(self.apply_include(folded.unwrap_or_default(), compound.include()))
    }

    fn match_exact(&self, field: &str, target: &MatchValue) -> ExecutorResult<RowIdSet> {
        match target {
            MatchValue::Text(text) => self
                .index
                .strings(field)
                .and_then(|index| index.get(text))
                .cloned()
                .ok_or_else(|| ExecutorError::unknown_value(field, text.as_str())),
            MatchValue::Number(number) => Ok(match self.index.get(field) {
                Some(FieldNode::Numbers(series)) => self.backend.equal(series, *number),
                _ => RowIdSet::new(),
            }),
        }
    }

    fn match_range(&self, field: &str, min: f64, max: f64) -> RowIdSet {
        match self.index.numbers(field) {
            Some(series) => self.backend.within(series, min, max),
            None => RowIdSet::new(),
        }
    }

    fn apply_include(&self, matched: RowIdSet, include: bool) -> RowIdSet {
        if include {
            matched
        } else {
            self.universe - &matched
        }
    }
}

fn intersect(acc: &mut Option<RowIdSet>, rows: RowIdSet) {
    match acc {
        Some(current) => *current &= rows,
        None => *acc = Some(rows),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::{CpuBackend, FieldIndexer, IndexSnapshot, RowId};
    use crate::schema::{Detection, Record};

    fn snapshot() -> IndexSnapshot {
        let records: Vec<Record> = [("A", 0.9), ("B", 0.2), ("A", 0.95), ("C", 0.5), ("A", 0.1)]
            .iter()
            .enumerate()
            .map(|(t, (value, confidence))| {
                Detection::new(t as f64, *value).with_confidence(*confidence).into_record()
            })
            .collect();
        FieldIndexer::new().build(records).unwrap()
    }

    fn rows(set: &RowIdSet) -> Vec<RowId> {
        set.iter().collect()
    }

    #[test]
    fn test_exact_text_then_range() {
        let snapshot = snapshot();
        let evaluator = QueryEvaluator::new(snapshot.index(), snapshot.universe(), &CpuBackend);

        let mut predicate = Predicate::detection();
        predicate.match_value("A").unwrap();
        assert_eq!(rows(&evaluator.evaluate_predicate(&predicate).unwrap()), vec![0, 2, 4]);

        predicate.set_min_confidence(0.9).unwrap();
        assert_eq!(rows(&evaluator.evaluate_predicate(&predicate).unwrap()), vec![0, 2]);

        predicate.set_include(false);
        assert_eq!(rows(&evaluator.evaluate_predicate(&predicate).unwrap()), vec![1, 3, 4]);
    }

    #[test]
    fn test_unknown_text_value_is_an_error() {
        let snapshot = snapshot();
        let evaluator = QueryEvaluator::new(snapshot.index(), snapshot.universe(), &CpuBackend);

        let mut predicate = Predicate::detection();
        predicate.match_value("Z").unwrap();
        let err = evaluator.evaluate_predicate(&predicate).unwrap_err();
        assert!(err.is_unknown_value());

        // Error even when another condition already matched nothing.
        let mut predicate = Predicate::detection();
        predicate.set_min_confidence(2.0).unwrap().match_model("resnet").unwrap();
        let err = evaluator.evaluate_predicate(&predicate).unwrap_err();
        assert_eq!(err.field(), Some("model"));
        assert_eq!(err.value(), Some("resnet"));
    }

    #[test]
    fn test_numeric_exact_match() {
        let snapshot = snapshot();
        let evaluator = QueryEvaluator::new(snapshot.index(), snapshot.universe(), &CpuBackend);

        let mut predicate = Predicate::detection();
        predicate.match_t(3.0).unwrap();
        assert_eq!(rows(&evaluator.evaluate_predicate(&predicate).unwrap()), vec![3]);

        let mut predicate = Predicate::detection();
        predicate.match_confidence(0.33).unwrap();
        assert!(evaluator.evaluate_predicate(&predicate).unwrap().is_empty());
    }

    #[test]
    fn test_empty_predicate_matches_nothing() {
        let snapshot = snapshot();
        let evaluator = QueryEvaluator::new(snapshot.index(), snapshot.universe(), &CpuBackend);

        let mut predicate = Predicate::detection();
        assert!(evaluator.evaluate_predicate(&predicate).unwrap().is_empty());

        predicate.set_exclude(true);
        assert_eq!(evaluator.evaluate_predicate(&predicate).unwrap().len(), 5);
    }

    #[test]
    fn test_compound_fold() {
        let snapshot = snapshot();
        let evaluator = QueryEvaluator::new(snapshot.index(), snapshot.universe(), &CpuBackend);

        let mut a = Predicate::detection();
        a.match_value("A").unwrap();
        let mut b = Predicate::detection();
        b.set_max_confidence(0.5).unwrap();

        let or = CompoundQuery::or().with_child(a.clone()).with_child(b.clone());
        assert_eq!(rows(&evaluator.evaluate_compound(&or).unwrap()), vec![0, 1, 2, 3, 4]);

        let mut and = CompoundQuery::and().with_child(a).with_child(b);
        assert_eq!(rows(&evaluator.evaluate_compound(&and).unwrap()), vec![4]);

        and.set_exclude(true);
        assert_eq!(rows(&evaluator.evaluate_compound(&and).unwrap()), vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_empty_compound() {
        let snapshot = snapshot();
        let evaluator = QueryEvaluator::new(snapshot.index(), snapshot.universe(), &CpuBackend);

        let mut compound = CompoundQuery::and();
        assert!(evaluator.evaluate_compound(&compound).unwrap().is_empty());
        compound.set_include(false);
        assert_eq!(evaluator.evaluate_compound(&compound).unwrap().len(), 5);
    }

    #[test]
    fn test_empty_collection_yields_empty_sets() {
        let snapshot = FieldIndexer::new().build(Vec::new()).unwrap();
        let evaluator = QueryEvaluator::new(snapshot.index(), snapshot.universe(), &CpuBackend);

        let mut predicate = Predicate::detection();
        predicate.match_value("A").unwrap().set_exclude(true);
        assert!(evaluator.evaluate_predicate(&predicate).unwrap().is_empty());
    }
}
