//! Reachability pruning.

use std::collections::{BTreeSet, VecDeque};

use log::debug;

use crate::grammar::Grammar;
use crate::symbol::NonTerminal;

/// Non-terminals that occur in some derivation from the start symbol
pub fn reachable_set(grammar: &Grammar) -> BTreeSet<NonTerminal> {
    let start = grammar.start().clone();
    let mut reachable = BTreeSet::from([start.clone()]);
    let mut queue = VecDeque::from([start]);

    while let Some(current) = queue.pop_front() {
        for nt in grammar.productions(&current).flat_map(|p| p.non_terminals()) {
            if reachable.insert(nt.clone()) {
                queue.push_back(nt.clone());
            }
        }
    }
    reachable
}

/// Drop the non-terminals that can never be reached from the start symbol
pub fn prune_unreachable(mut grammar: Grammar) -> Grammar {
    let reachable = reachable_set(&grammar);
    let removed = grammar.non_terminals().len() - reachable.len();
    if removed > 0 {
        debug!("Removing {} unreachable non-terminals", removed);
    }

    grammar.retain_non_terminals(|nt| reachable.contains(nt));
    grammar
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unreferenced_symbol_is_removed() {
        let grammar = Grammar::from_text("S -> a A\nA -> b\nZ -> z Z | z", None).unwrap();
        let grammar = prune_unreachable(grammar);

        assert!(grammar.has_non_terminal("A"));
        assert!(!grammar.has_non_terminal("Z"));
        assert!(!grammar.rules().contains_key(&NonTerminal::new("Z")));
    }

    #[test]
    fn test_transitive_reachability() {
        let grammar = Grammar::from_text("S -> A\nA -> B b\nB -> C\nC -> c\nD -> S", None).unwrap();
        let reachable = reachable_set(&grammar);

        let names: Vec<String> = reachable.iter().map(|nt| nt.to_string()).collect();
        assert_eq!(names, vec!["A", "B", "C", "S"]);
    }

    #[test]
    fn test_start_symbol_always_reachable() {
        let grammar = Grammar::from_text("S -> a", None).unwrap();
        let grammar = prune_unreachable(grammar);
        assert_eq!(grammar.non_terminals().len(), 1);
        assert!(grammar.has_non_terminal("S"));
    }
}
