//! Terminal isolation and binarization, the two stages that give every
//! production its final shape.
//!
//! Both expect a grammar with no empty and no unit productions.

use std::collections::{BTreeMap, BTreeSet};

use log::debug;

use crate::grammar::{Grammar, Rules};
use crate::symbol::{NonTerminal, Production, Symbol, Terminal};
use crate::utils::Result;

/// Helper non-terminal minted for each terminal
pub type TerminalHelpers = BTreeMap<Terminal, NonTerminal>;

/// Non-terminal minted for each folded pair of adjacent symbols
pub type PairHelpers = BTreeMap<(Symbol, Symbol), NonTerminal>;

/// Replace every terminal inside a production of two or more symbols by a
/// helper non-terminal whose only production is that terminal.
///
/// One helper is minted per terminal of the alphabet, whether or not the
/// terminal occurs in a long production. Productions of length one are left
/// untouched.
pub fn isolate_terminals(mut grammar: Grammar) -> Result<(Grammar, TerminalHelpers)> {
    let terminals: Vec<Terminal> = grammar.terminals().iter().cloned().collect();
    let original: Rules = grammar.rules().clone();

    let mut helpers = TerminalHelpers::new();
    for terminal in terminals {
        let helper = grammar.mint()?;
        helpers.insert(terminal, helper);
    }

    let mut rules = Rules::new();
    for (nt, productions) in original {
        let rewritten = productions
            .into_iter()
            .map(|production| {
                if production.len() < 2 {
                    return production;
                }
                let symbols = production
                    .symbols()
                    .iter()
                    .map(|symbol| match symbol {
                        Symbol::Terminal(t) => Symbol::NonTerminal(helpers[t].clone()),
                        Symbol::NonTerminal(_) => symbol.clone(),
                    })
                    .collect();
                Production::new(symbols)
            })
            .collect();
        rules.insert(nt, rewritten);
    }
    for (terminal, helper) in &helpers {
        let production = Production::new(vec![Symbol::Terminal(terminal.clone())]);
        rules.insert(helper.clone(), BTreeSet::from([production]));
    }
    debug!("Minted {} terminal helpers", helpers.len());

    grammar.replace_rules(rules);
    Ok((grammar, helpers))
}

/// Fold productions longer than two symbols, two leftmost symbols at a time.
///
/// `X1 X2 ... Xk` becomes `P X3 ... Xk` with `P -> X1 X2`, repeated until
/// two symbols remain. Pair helpers are shared by every production folded
/// in the same call, so identical leftmost pairs in different rules map to
/// the same non-terminal.
pub fn binarize(mut grammar: Grammar) -> Result<(Grammar, PairHelpers)> {
    let mut pairs = PairHelpers::new();
    let heads: Vec<NonTerminal> = grammar.rules().keys().cloned().collect();

    for head in heads {
        let productions: Vec<Production> = grammar.productions(&head).cloned().collect();
        if productions.iter().all(|p| p.len() <= 2) {
            continue;
        }

        let mut rewritten = BTreeSet::new();
        for production in productions {
            let mut symbols = production.symbols().to_vec();
            while symbols.len() > 2 {
                let key = (symbols[0].clone(), symbols[1].clone());
                let pair = match pairs.get(&key) {
                    Some(nt) => nt.clone(),
                    None => {
                        let nt = grammar.mint()?;
                        let body = Production::new(vec![key.0.clone(), key.1.clone()]);
                        grammar.add_production(&nt, body);
                        pairs.insert(key, nt.clone());
                        nt
                    }
                };
                symbols[1] = Symbol::NonTerminal(pair);
                symbols.remove(0);
            }
            rewritten.insert(Production::new(symbols));
        }
        grammar.set_productions(&head, rewritten);
    }
    debug!("Minted {} pair helpers", pairs.len());

    Ok((grammar, pairs))
}
