//! Chomsky Normal Form checks.
//!
//! A grammar is in CNF when every production is a single terminal, the
//! empty production, or two non-terminals. [`strict_violations`] narrows
//! the empty production to an unused start symbol.

use std::fmt;

use crate::grammar::Grammar;
use crate::symbol::{NonTerminal, Production, Symbol};

/// Why a production is not in Chomsky Normal Form
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViolationKind {
    /// Empty production outside the start symbol, or on a start symbol that
    /// is used on a right-hand side (strict check only)
    Empty,
    /// A single non-terminal
    Unit,
    /// Two symbols, at least one of them a terminal
    TerminalInPair,
    /// More than two symbols
    TooLong,
}

impl fmt::Display for ViolationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            ViolationKind::Empty => "empty production not allowed here",
            ViolationKind::Unit => "unit production",
            ViolationKind::TerminalInPair => "terminal in a two-symbol production",
            ViolationKind::TooLong => "more than two symbols",
        };
        f.write_str(text)
    }
}

/// A production that breaks the normal form
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    pub head: NonTerminal,
    pub production: Production,
    pub kind: ViolationKind,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}: {}", self.head, self.production, self.kind)
    }
}

fn check(production: &Production, empty_allowed: bool) -> Option<ViolationKind> {
    match production.symbols() {
        [] if empty_allowed => None,
        [] => Some(ViolationKind::Empty),
        [Symbol::Terminal(_)] => None,
        [Symbol::NonTerminal(_)] => Some(ViolationKind::Unit),
        [Symbol::NonTerminal(_), Symbol::NonTerminal(_)] => None,
        [_, _] => Some(ViolationKind::TerminalInPair),
        _ => Some(ViolationKind::TooLong),
    }
}

fn start_on_right_hand_side(grammar: &Grammar) -> bool {
    grammar
        .rules()
        .values()
        .flatten()
        .any(|p| p.mentions(grammar.start()))
}

fn collect<F>(grammar: &Grammar, empty_allowed: F) -> Vec<Violation>
where
    F: Fn(&NonTerminal) -> bool,
{
    let mut found = Vec::new();
    for (head, productions) in grammar.rules() {
        let allowed = empty_allowed(head);
        for production in productions {
            if let Some(kind) = check(production, allowed) {
                found.push(Violation {
                    head: head.clone(),
                    production: production.clone(),
                    kind,
                });
            }
        }
    }
    found
}

/// Every production of `grammar` that is not in Chomsky Normal Form
pub fn violations(grammar: &Grammar) -> Vec<Violation> {
    collect(grammar, |_| true)
}

/// Like [`violations`], but the empty production is only accepted on the
/// start symbol, and only while the start symbol appears on no right-hand
/// side. Normalizer output always passes this check.
pub fn strict_violations(grammar: &Grammar) -> Vec<Violation> {
    let start_used = start_on_right_hand_side(grammar);
    collect(grammar, |head| head == grammar.start() && !start_used)
}

/// Check whether `grammar` is in Chomsky Normal Form. Pure; never mutates.
pub fn is_cnf(grammar: &Grammar) -> bool {
    grammar
        .rules()
        .values()
        .flatten()
        .all(|p| check(p, true).is_none())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_cnf_grammar_accepted() {
        let grammar = Grammar::from_text("S -> A B | a\nA -> a\nB -> b | A B", None).unwrap();
        assert!(is_cnf(&grammar));
        assert!(violations(&grammar).is_empty());
    }

    #[test]
    fn test_violation_kinds() {
        let grammar = Grammar::from_text("S -> A | a B | A B C | ε\nA -> a\nB -> b\nC -> c", None)
            .unwrap();
        assert!(!is_cnf(&grammar));

        let kinds: Vec<ViolationKind> = violations(&grammar).iter().map(|v| v.kind).collect();
        assert_eq!(
            kinds,
            vec![
                ViolationKind::TerminalInPair,
                ViolationKind::Unit,
                ViolationKind::TooLong,
            ]
        );
    }

    #[test]
    fn test_empty_production_on_any_symbol() {
        let grammar = Grammar::from_text("S -> A A\nA -> a | ε", None).unwrap();
        assert!(is_cnf(&grammar));
        assert!(violations(&grammar).is_empty());

        let grammar = Grammar::from_text("S -> ε | S S | a", None).unwrap();
        assert!(is_cnf(&grammar));
    }

    #[test]
    fn test_strict_empty_production() {
        // allowed on an unused start symbol
        let grammar = Grammar::from_text("S -> ε | A A\nA -> a", None).unwrap();
        assert!(strict_violations(&grammar).is_empty());

        // not once the start symbol is used on a right-hand side
        let grammar = Grammar::from_text("S -> ε | S S | a", None).unwrap();
        let found = strict_violations(&grammar);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].kind, ViolationKind::Empty);

        // never on other symbols
        let grammar = Grammar::from_text("S -> A A\nA -> a | ε", None).unwrap();
        let found = strict_violations(&grammar);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].head, NonTerminal::new("A"));
    }

    #[test]
    fn test_violation_display() {
        let grammar = Grammar::from_text("S -> a b", None).unwrap();
        let found = violations(&grammar);
        assert_eq!(found[0].to_string(), "S -> a b: terminal in a two-symbol production");
    }
}
