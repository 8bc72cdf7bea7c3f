//! Productivity pruning.

use std::collections::BTreeSet;

use log::{debug, warn};

use crate::grammar::Grammar;
use crate::symbol::{NonTerminal, Production, Symbol};

/// Compute the non-terminals that derive at least one terminal string.
///
/// Seeded by productions made only of terminals, then extended until no
/// production made of terminals and productive non-terminals adds a head.
pub fn productive_set(grammar: &Grammar) -> BTreeSet<NonTerminal> {
    let mut productive = BTreeSet::new();
    loop {
        let mut changed = false;
        for (nt, productions) in grammar.rules() {
            if productive.contains(nt) {
                continue;
            }
            if productions.iter().any(|p| is_productive(p, &productive)) {
                productive.insert(nt.clone());
                changed = true;
            }
        }
        if !changed {
            return productive;
        }
    }
}

fn is_productive(production: &Production, productive: &BTreeSet<NonTerminal>) -> bool {
    production.symbols().iter().all(|symbol| match symbol {
        Symbol::Terminal(_) => true,
        Symbol::NonTerminal(nt) => productive.contains(nt),
    })
}

/// Drop the non-terminals that derive no terminal string, and every
/// production that mentions one.
///
/// The start symbol stays declared even when it is unproductive; it is then
/// left without productions and the grammar generates nothing.
pub fn prune_unproductive(mut grammar: Grammar) -> Grammar {
    let productive = productive_set(&grammar);
    if !productive.contains(grammar.start()) {
        warn!(
            "Start symbol {} derives no terminal string; the language is empty",
            grammar.start()
        );
    }
    debug!(
        "Productive non-terminals: {} of {}",
        productive.len(),
        grammar.non_terminals().len()
    );

    grammar.retain_non_terminals(|nt| productive.contains(nt));
    if !productive.contains(grammar.start()) {
        let start = grammar.start().clone();
        grammar.clear_productions(&start);
    }
    grammar
}
