//! Random grammar generation for property tests and benchmarks.

use std::collections::BTreeSet;

use rand::Rng;

use crate::grammar::{Grammar, Rules};
use crate::symbol::{NonTerminal, Production, Symbol, Terminal};
use crate::utils::Result;

/// Shape of the grammars produced by [`random_grammar`]
#[derive(Debug, Clone)]
pub struct RandomGrammarConfig {
    /// Number of non-terminals, including the start symbol `S`
    pub non_terminals: usize,
    /// Size of the terminal alphabet
    pub terminals: usize,
    /// Maximum number of alternatives per non-terminal (at least one is made)
    pub max_alternatives: usize,
    /// Maximum length of a non-empty alternative
    pub max_length: usize,
    /// Probability that an alternative is the empty production, clamped to
    /// `[0, 1]` (NaN counts as 0)
    pub epsilon_probability: f64,
    /// Probability that a symbol is a non-terminal rather than a terminal,
    /// clamped like `epsilon_probability`
    pub non_terminal_probability: f64,
}

impl Default for RandomGrammarConfig {
    fn default() -> Self {
        RandomGrammarConfig {
            non_terminals: 4,
            terminals: 2,
            max_alternatives: 3,
            max_length: 4,
            epsilon_probability: 0.1,
            non_terminal_probability: 0.5,
        }
    }
}

fn non_terminal_name(index: usize) -> String {
    if index == 0 {
        "S".to_string()
    } else {
        format!("N{}", index)
    }
}

fn probability(p: f64) -> f64 {
    if p.is_nan() { 0.0 } else { p.clamp(0.0, 1.0) }
}

fn terminal_name(index: usize) -> String {
    match u8::try_from(index) {
        Ok(i) if i < 26 => char::from(b'a' + i).to_string(),
        _ => format!("t{}", index),
    }
}

/// Generate a random grammar with start symbol `S`.
///
/// The result is always structurally valid; it may contain empty, unit,
/// unreachable and unproductive rules, which is what makes it useful for
/// exercising normalization.
pub fn random_grammar<R: Rng>(rng: &mut R, config: &RandomGrammarConfig) -> Result<Grammar> {
    let non_terminal_count = config.non_terminals.max(1);
    let terminal_count = config.terminals.max(1);

    let non_terminals: Vec<NonTerminal> = (0..non_terminal_count)
        .map(|i| NonTerminal::new(&non_terminal_name(i)))
        .collect();
    let terminals: Vec<Terminal> = (0..terminal_count)
        .map(|i| Terminal::new(&terminal_name(i)))
        .collect();

    let epsilon_probability = probability(config.epsilon_probability);
    let non_terminal_probability = probability(config.non_terminal_probability);

    let mut rules = Rules::new();
    for head in &non_terminals {
        let alternatives = rng.gen_range(1..=config.max_alternatives.max(1));
        let mut productions = BTreeSet::new();
        for _ in 0..alternatives {
            if rng.gen_bool(epsilon_probability) {
                productions.insert(Production::epsilon());
                continue;
            }
            let length = rng.gen_range(1..=config.max_length.max(1));
            let symbols = (0..length)
                .map(|_| {
                    if rng.gen_bool(non_terminal_probability) {
                        let index = rng.gen_range(0..non_terminal_count);
                        Symbol::NonTerminal(non_terminals[index].clone())
                    } else {
                        let index = rng.gen_range(0..terminal_count);
                        Symbol::Terminal(terminals[index].clone())
                    }
                })
                .collect();
            productions.insert(Production::new(symbols));
        }
        rules.insert(head.clone(), productions);
    }

    Grammar::new(
        non_terminals.iter().cloned().collect(),
        terminals.into_iter().collect(),
        rules,
        NonTerminal::new("S"),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_same_seed_same_grammar() {
        let config = RandomGrammarConfig::default();
        let first = random_grammar(&mut StdRng::seed_from_u64(7), &config).unwrap();
        let second = random_grammar(&mut StdRng::seed_from_u64(7), &config).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_shape_follows_config() {
        let config = RandomGrammarConfig {
            non_terminals: 6,
            terminals: 3,
            max_alternatives: 2,
            max_length: 3,
            epsilon_probability: 0.0,
            ..Default::default()
        };
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..20 {
            let grammar = random_grammar(&mut rng, &config).unwrap();
            assert_eq!(grammar.non_terminals().len(), 6);
            assert_eq!(grammar.terminals().len(), 3);
            for productions in grammar.rules().values() {
                assert!(!productions.is_empty() && productions.len() <= 2);
                assert!(productions.iter().all(|p| (1..=3).contains(&p.len())));
            }
        }
    }

    #[test]
    fn test_probabilities_out_of_range() {
        let config = RandomGrammarConfig {
            epsilon_probability: -0.5,
            non_terminal_probability: 3.0,
            ..Default::default()
        };
        let grammar = random_grammar(&mut StdRng::seed_from_u64(1), &config).unwrap();
        for production in grammar.rules().values().flatten() {
            assert!(!production.is_epsilon());
            assert!(production.symbols().iter().all(|s| !s.is_terminal()));
        }

        let config = RandomGrammarConfig {
            epsilon_probability: f64::NAN,
            ..Default::default()
        };
        assert!(random_grammar(&mut StdRng::seed_from_u64(1), &config).is_ok());
    }

    #[test]
    fn test_names() {
        assert_eq!(non_terminal_name(0), "S");
        assert_eq!(non_terminal_name(3), "N3");
        assert_eq!(terminal_name(1), "b");
        assert_eq!(terminal_name(30), "t30");
    }
}
