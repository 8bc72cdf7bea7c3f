//! Unit-pair closure and renaming elimination.

use std::collections::{BTreeSet, VecDeque};

use log::debug;

use crate::grammar::{Grammar, Rules};
use crate::symbol::NonTerminal;

/// Non-terminals reachable from `nt` through zero or more unit productions.
///
/// Every non-terminal is visited at most once, so cycles of unit
/// productions terminate.
pub fn unit_closure(grammar: &Grammar, nt: &NonTerminal) -> BTreeSet<NonTerminal> {
    let mut closure = BTreeSet::from([nt.clone()]);
    let mut queue = VecDeque::from([nt.clone()]);

    while let Some(current) = queue.pop_front() {
        for target in grammar.productions(&current).filter_map(|p| p.as_unit()) {
            if closure.insert(target.clone()) {
                queue.push_back(target.clone());
            }
        }
    }
    closure
}

/// Replace unit productions by the non-unit productions they lead to.
pub fn eliminate_units(mut grammar: Grammar) -> Grammar {
    let mut rules = Rules::new();
    let mut unit_count = 0;

    for nt in grammar.non_terminals() {
        let closure = unit_closure(&grammar, nt);
        unit_count += closure.len() - 1;

        let productions = closure
            .iter()
            .flat_map(|member| grammar.productions(member))
            .filter(|p| p.as_unit().is_none())
            .cloned()
            .collect();
        rules.insert(nt.clone(), productions);
    }
    debug!("Collapsed {} unit pairs", unit_count);

    grammar.replace_rules(rules);
    grammar
}
