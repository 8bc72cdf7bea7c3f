//! Normalization stages.
//!
//! Every stage takes a [`Grammar`] by value and returns the transformed
//! grammar, so stages can be run and tested on their own. The free
//! functions in the submodules do the work; the [`Stage`] values wrap them
//! for the pipeline.

pub mod epsilon;
pub mod productive;
pub mod reachable;
pub mod shape;
pub mod unit;

use std::fmt;

use crate::grammar::Grammar;
use crate::utils::Result;

/// A single grammar-to-grammar transformation in the normalization pipeline
pub trait Stage: fmt::Debug + Send + Sync {
    /// Short identifier of this stage
    fn name(&self) -> &str;

    /// Heading used when the stage's result is recorded in a trace
    fn title(&self) -> &str;

    /// Transform the grammar. Fails only when fresh names run out.
    fn apply(&self, grammar: Grammar) -> Result<Grammar>;
}

/// Removes empty productions
#[derive(Debug, Clone, Copy, Default)]
pub struct EliminateEpsilon;

impl Stage for EliminateEpsilon {
    fn name(&self) -> &str {
        "epsilon"
    }

    fn title(&self) -> &str {
        "After eliminating epsilon productions"
    }

    fn apply(&self, grammar: Grammar) -> Result<Grammar> {
        Ok(epsilon::eliminate_epsilon(grammar))
    }
}

/// Removes unit (renaming) productions
#[derive(Debug, Clone, Copy, Default)]
pub struct EliminateUnits;

impl Stage for EliminateUnits {
    fn name(&self) -> &str {
        "unit"
    }

    fn title(&self) -> &str {
        "After eliminating renaming productions"
    }

    fn apply(&self, grammar: Grammar) -> Result<Grammar> {
        Ok(unit::eliminate_units(grammar))
    }
}

/// Removes non-terminals not reachable from the start symbol
#[derive(Debug, Clone, Copy, Default)]
pub struct PruneUnreachable;

impl Stage for PruneUnreachable {
    fn name(&self) -> &str {
        "reachable"
    }

    fn title(&self) -> &str {
        "After eliminating inaccessible symbols"
    }

    fn apply(&self, grammar: Grammar) -> Result<Grammar> {
        Ok(reachable::prune_unreachable(grammar))
    }
}

/// Removes non-terminals that derive no terminal string
#[derive(Debug, Clone, Copy, Default)]
pub struct PruneUnproductive;

impl Stage for PruneUnproductive {
    fn name(&self) -> &str {
        "productive"
    }

    fn title(&self) -> &str {
        "After eliminating non-productive symbols"
    }

    fn apply(&self, grammar: Grammar) -> Result<Grammar> {
        Ok(productive::prune_unproductive(grammar))
    }
}

/// Replaces terminals inside long productions with helper non-terminals
#[derive(Debug, Clone, Copy, Default)]
pub struct IsolateTerminals;

impl Stage for IsolateTerminals {
    fn name(&self) -> &str {
        "terminals"
    }

    fn title(&self) -> &str {
        "After isolating terminals"
    }

    fn apply(&self, grammar: Grammar) -> Result<Grammar> {
        shape::isolate_terminals(grammar).map(|(grammar, _)| grammar)
    }
}

/// Splits productions longer than two symbols
#[derive(Debug, Clone, Copy, Default)]
pub struct Binarize;

impl Stage for Binarize {
    fn name(&self) -> &str {
        "binarize"
    }

    fn title(&self) -> &str {
        "After binarizing long productions"
    }

    fn apply(&self, grammar: Grammar) -> Result<Grammar> {
        shape::binarize(grammar).map(|(grammar, _)| grammar)
    }
}

/// The Chomsky Normal Form stages, in the order they must run
pub fn standard_stages() -> Vec<Box<dyn Stage>> {
    vec![
        Box::new(EliminateEpsilon),
        Box::new(EliminateUnits),
        Box::new(PruneUnreachable),
        Box::new(PruneUnproductive),
        Box::new(IsolateTerminals),
        Box::new(Binarize),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_stage_order() {
        let names: Vec<String> = standard_stages()
            .iter()
            .map(|stage| stage.name().to_string())
            .collect();
        assert_eq!(
            names,
            vec!["epsilon", "unit", "reachable", "productive", "terminals", "binarize"]
        );
    }

    #[test]
    fn test_stages_compose() {
        let grammar = Grammar::from_text("S -> A b C | A\nA -> a | ε\nC -> c", None).unwrap();
        let normalized = standard_stages()
            .iter()
            .try_fold(grammar, |grammar, stage| stage.apply(grammar))
            .unwrap();
        assert!(normalized.is_cnf());
    }
}
