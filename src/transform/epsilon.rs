//! Nullability and epsilon elimination.

use std::collections::BTreeSet;

use log::debug;

use crate::grammar::{Grammar, Rules};
use crate::symbol::{NonTerminal, Production, Symbol};

/// Compute the non-terminals that derive the empty string.
///
/// A non-terminal is nullable if one of its productions consists only of
/// nullable non-terminals; the empty production qualifies trivially.
pub fn nullable_set(grammar: &Grammar) -> BTreeSet<NonTerminal> {
    let mut nullable = BTreeSet::new();
    loop {
        let mut changed = false;
        for (nt, productions) in grammar.rules() {
            if nullable.contains(nt) {
                continue;
            }
            if productions.iter().any(|p| is_nullable(p, &nullable)) {
                nullable.insert(nt.clone());
                changed = true;
            }
        }
        if !changed {
            return nullable;
        }
    }
}

fn is_nullable(production: &Production, nullable: &BTreeSet<NonTerminal>) -> bool {
    production
        .symbols()
        .iter()
        .all(|symbol| matches!(symbol, Symbol::NonTerminal(nt) if nullable.contains(nt)))
}

/// Every way of deleting a subset of the nullable occurrences in `production`.
///
/// The result may contain the empty sequence and duplicates.
pub fn nullable_variants(
    production: &Production,
    nullable: &BTreeSet<NonTerminal>,
) -> Vec<Vec<Symbol>> {
    let mut variants: Vec<Vec<Symbol>> = vec![Vec::new()];
    for symbol in production.symbols() {
        let droppable = matches!(symbol, Symbol::NonTerminal(nt) if nullable.contains(nt));
        let mut next = Vec::with_capacity(variants.len() * if droppable { 2 } else { 1 });
        for variant in variants {
            if droppable {
                next.push(variant.clone());
            }
            let mut kept = variant;
            kept.push(symbol.clone());
            next.push(kept);
        }
        variants = next;
    }
    variants
}

/// Remove every empty production while keeping all non-empty derivations.
///
/// A non-terminal whose only derivation was the empty string is left with
/// no productions; productivity pruning removes it later. The empty string
/// itself is dropped from the language, including when the start symbol is
/// nullable.
pub fn eliminate_epsilon(mut grammar: Grammar) -> Grammar {
    let nullable = nullable_set(&grammar);
    debug!("Nullable non-terminals: {}", nullable.len());

    let mut rules = Rules::new();
    for (nt, productions) in grammar.rules() {
        let mut rewritten = BTreeSet::new();
        for production in productions.iter().filter(|p| !p.is_epsilon()) {
            rewritten.extend(
                nullable_variants(production, &nullable)
                    .into_iter()
                    .filter(|variant| !variant.is_empty())
                    .map(Production::new),
            );
        }
        rules.insert(nt.clone(), rewritten);
    }

    grammar.replace_rules(rules);
    grammar
}
