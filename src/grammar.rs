use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::fs;
use std::path::Path;

use log::{debug, trace};
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::pipeline::Normalizer;
use crate::symbol::{is_epsilon_token, NonTerminal, Production, Symbol, Terminal};
use crate::utils::{GrammarError, OptionExt, Result};
use crate::validator;

/// Productions of every non-terminal, in canonical order
pub type Rules = BTreeMap<NonTerminal, BTreeSet<Production>>;

/// A context-free grammar.
///
/// The non-terminal and terminal sets are disjoint, the start symbol is a
/// non-terminal, and every symbol used by a production is declared. These
/// hold for every `Grammar` handed out by this crate: construction checks
/// them and the normalization stages preserve them.
///
/// The grammar also carries the counter used to mint fresh non-terminals.
/// It starts past any generated symbol already present and only grows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grammar {
    non_terminals: BTreeSet<NonTerminal>,
    terminals: BTreeSet<Terminal>,
    rules: Rules,
    start: NonTerminal,
    next_generated: u32,
}

impl Grammar {
    /// Create a grammar from its four components.
    ///
    /// Fails if the start symbol is not a non-terminal, a name is both a
    /// terminal and a non-terminal, a production uses an undeclared symbol,
    /// or a generated symbol leaves no room for fresh ones (`_4294967295`).
    pub fn new(
        non_terminals: BTreeSet<NonTerminal>,
        terminals: BTreeSet<Terminal>,
        mut rules: Rules,
        start: NonTerminal,
    ) -> Result<Self> {
        for nt in &non_terminals {
            rules.entry(nt.clone()).or_default();
        }
        let next_generated = match non_terminals.iter().filter_map(generated_index).max() {
            Some(index) => index
                .checked_add(1)
                .ok_or_grammar_err(|| format!("generated symbol _{} is out of range", index))?,
            None => 0,
        };

        let grammar = Grammar {
            non_terminals,
            terminals,
            rules,
            start,
            next_generated,
        };
        grammar.validate()?;
        Ok(grammar)
    }

    /// Check the structural invariants of the grammar.
    ///
    /// A start symbol without productions passes: it is how an empty
    /// language looks after normalization. See [`Grammar::validate_input`].
    pub fn validate(&self) -> Result<()> {
        if !self.non_terminals.contains(&self.start) {
            return Err(GrammarError::UnknownNonTerminal(self.start.to_string()));
        }

        for nt in &self.non_terminals {
            if let NonTerminal::Named(name) = nt {
                if self.terminals.contains(&Terminal::new(name)) {
                    return Err(GrammarError::OverlappingSymbol(name.clone()));
                }
            }
        }

        for (head, productions) in &self.rules {
            if !self.non_terminals.contains(head) {
                return Err(GrammarError::UnknownNonTerminal(head.to_string()));
            }
            for production in productions {
                for symbol in production.symbols() {
                    let declared = match symbol {
                        Symbol::Terminal(t) => self.terminals.contains(t),
                        Symbol::NonTerminal(nt) => self.non_terminals.contains(nt),
                    };
                    if !declared {
                        return Err(GrammarError::UnknownSymbol {
                            head: head.to_string(),
                            symbol: symbol.to_string(),
                        });
                    }
                }
            }
        }

        Ok(())
    }

    /// Check the structural invariants plus the precondition for running the
    /// normalization stages: the start symbol has at least one production.
    pub fn validate_input(&self) -> Result<()> {
        self.validate()?;
        if self.productions(&self.start).next().is_none() {
            return Err(GrammarError::StartWithoutProductions(self.start.to_string()));
        }
        Ok(())
    }

    /// Parse a grammar from rule lines.
    ///
    /// Each line has the form `Head -> alt | alt | ...` (the arrow may also be
    /// written `→` or `::=`), and repeated heads add alternatives. Lines that
    /// are empty or start with `#` are skipped. Tokens starting with an
    /// uppercase letter are non-terminals, `ε`, `ϵ`, `$` and `epsilon` denote
    /// the empty production, and every other token is a terminal.
    ///
    /// The start symbol defaults to the first head.
    ///
    /// Symbols are classified by spelling alone, so a grammar whose
    /// terminals are uppercase or spelled like an epsilon token does not
    /// survive `Display` followed by `from_text`. Use the JSON form, which
    /// resolves names against the declared sets, for such grammars.
    pub fn from_text(text: &str, start_symbol: Option<&str>) -> Result<Self> {
        let rule_regex = Regex::new(r"^\s*(\S+)\s*(?:->|→|::=)\s*(.*)$")
            .map_err(|e| GrammarError::InvalidGrammar(e.to_string()))?;

        let mut non_terminals = BTreeSet::new();
        let mut terminals = BTreeSet::new();
        let mut rules = Rules::new();
        let mut first_head = None;

        for (index, line) in text.lines().enumerate() {
            let line_no = index + 1;
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }

            let captures = rule_regex.captures(trimmed).ok_or_else(|| GrammarError::Parse {
                line: line_no,
                message: format!("expected `Head -> alternatives`, found `{}`", trimmed),
            })?;
            let head_token = &captures[1];
            let head = match classify_token(head_token) {
                Some(Symbol::NonTerminal(nt)) => nt,
                _ => {
                    return Err(GrammarError::Parse {
                        line: line_no,
                        message: format!("rule head `{}` is not a non-terminal", head_token),
                    })
                }
            };
            non_terminals.insert(head.clone());
            first_head.get_or_insert_with(|| head.clone());

            for alternative in captures[2].split('|') {
                let tokens: Vec<&str> = alternative.split_whitespace().collect();
                if tokens.is_empty() {
                    return Err(GrammarError::Parse {
                        line: line_no,
                        message: format!("empty alternative for `{}`", head),
                    });
                }

                let mut symbols = Vec::with_capacity(tokens.len());
                for token in tokens {
                    match classify_token(token) {
                        Some(Symbol::NonTerminal(nt)) => {
                            non_terminals.insert(nt.clone());
                            symbols.push(Symbol::NonTerminal(nt));
                        }
                        Some(Symbol::Terminal(t)) => {
                            terminals.insert(t.clone());
                            symbols.push(Symbol::Terminal(t));
                        }
                        None => {}
                    }
                }
                rules
                    .entry(head.clone())
                    .or_default()
                    .insert(Production::new(symbols));
            }
        }

        let start = match start_symbol {
            Some(name) => NonTerminal::new(name),
            None => first_head.ok_or_grammar_err(|| "grammar has no rules".to_string())?,
        };

        Grammar::new(non_terminals, terminals, rules, start)
    }

    /// Parse a grammar from a file in the rule-line format of [`Grammar::from_text`]
    pub fn from_file<P: AsRef<Path>>(path: P, start_symbol: Option<&str>) -> Result<Self> {
        let text = fs::read_to_string(path.as_ref())?;
        debug!("Loaded {} bytes from {}", text.len(), path.as_ref().display());
        Self::from_text(&text, start_symbol)
    }

    /// Parse a grammar from its JSON document form
    pub fn from_json(json: &str) -> Result<Self> {
        let document: GrammarDocument = serde_json::from_str(json)?;
        document.into_grammar()
    }

    /// Serialize the grammar as a JSON document
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.to_document())?)
    }

    /// The serializable form of this grammar
    pub fn to_document(&self) -> GrammarDocument {
        GrammarDocument {
            start: self.start.to_string(),
            non_terminals: self.non_terminals.iter().map(|nt| nt.to_string()).collect(),
            terminals: self.terminals.iter().map(|t| t.to_string()).collect(),
            rules: self
                .rules
                .iter()
                .map(|(head, productions)| {
                    let alternatives = productions
                        .iter()
                        .map(|p| p.symbols().iter().map(|s| s.to_string()).collect())
                        .collect();
                    (head.to_string(), alternatives)
                })
                .collect(),
        }
    }

    /// Check whether the grammar is in Chomsky Normal Form
    pub fn is_cnf(&self) -> bool {
        validator::is_cnf(self)
    }

    /// Convert the grammar to Chomsky Normal Form with the default settings
    pub fn to_cnf(self) -> Result<Grammar> {
        Normalizer::default().run(self).map(|normalized| normalized.grammar)
    }

    /// Get the start symbol
    pub fn start(&self) -> &NonTerminal {
        &self.start
    }

    pub fn non_terminals(&self) -> &BTreeSet<NonTerminal> {
        &self.non_terminals
    }

    pub fn terminals(&self) -> &BTreeSet<Terminal> {
        &self.terminals
    }

    /// Get a reference to the grammar's rules
    pub fn rules(&self) -> &Rules {
        &self.rules
    }

    /// Iterate over the productions of `nt` (empty if it has none)
    pub fn productions<'a>(
        &'a self,
        nt: &NonTerminal,
    ) -> impl Iterator<Item = &'a Production> + use<'a> {
        self.rules.get(nt).into_iter().flatten()
    }

    /// Check if the grammar contains a specific non-terminal
    pub fn has_non_terminal(&self, name: &str) -> bool {
        self.non_terminals.contains(&NonTerminal::new(name))
    }

    /// Total number of productions across all non-terminals
    pub fn production_count(&self) -> usize {
        self.rules.values().map(BTreeSet::len).sum()
    }

    /// Replace the whole production mapping.
    ///
    /// Non-terminals keep their membership; a non-terminal missing from
    /// `rules` ends up with no productions.
    pub(crate) fn replace_rules(&mut self, mut rules: Rules) {
        for nt in &self.non_terminals {
            rules.entry(nt.clone()).or_default();
        }
        self.rules = rules;
    }

    /// Keep only the non-terminals accepted by `keep`, along with the start
    /// symbol. Productions of removed non-terminals, and productions that
    /// mention one, are dropped.
    pub(crate) fn retain_non_terminals<F>(&mut self, keep: F)
    where
        F: Fn(&NonTerminal) -> bool,
    {
        let start = self.start.clone();
        self.non_terminals.retain(|nt| *nt == start || keep(nt));

        let non_terminals = &self.non_terminals;
        self.rules.retain(|nt, _| non_terminals.contains(nt));
        for productions in self.rules.values_mut() {
            productions.retain(|p| p.non_terminals().all(|nt| non_terminals.contains(nt)));
        }
    }

    pub(crate) fn add_production(&mut self, nt: &NonTerminal, production: Production) {
        self.rules.entry(nt.clone()).or_default().insert(production);
    }

    pub(crate) fn set_productions(&mut self, nt: &NonTerminal, productions: BTreeSet<Production>) {
        self.rules.insert(nt.clone(), productions);
    }

    pub(crate) fn clear_productions(&mut self, nt: &NonTerminal) {
        self.set_productions(nt, BTreeSet::new());
    }

    pub(crate) fn set_start(&mut self, start: NonTerminal) {
        self.start = start;
    }

    /// Mint a fresh non-terminal and register it immediately, so the next
    /// call sees it as taken.
    pub(crate) fn mint(&mut self) -> Result<NonTerminal> {
        let nt = NonTerminal::Generated(self.next_generated);
        self.next_generated = self
            .next_generated
            .checked_add(1)
            .ok_or_grammar_err(|| "generated symbol counter exhausted".to_string())?;
        self.non_terminals.insert(nt.clone());
        self.rules.entry(nt.clone()).or_default();
        trace!("Minted non-terminal {}", nt);
        Ok(nt)
    }

    /// Non-terminals in display order: the start symbol first, then named
    /// symbols, then generated ones
    pub fn display_order(&self) -> Vec<&NonTerminal> {
        let mut ordered: Vec<&NonTerminal> = vec![&self.start];
        ordered.extend(self.non_terminals.iter().filter(|nt| **nt != self.start));
        ordered
    }
}

/// Rule-line rendering, start symbol first. See [`Grammar::from_text`] for
/// which grammars read back unchanged.
impl fmt::Display for Grammar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for nt in self.display_order() {
            let alternatives: Vec<String> = self.productions(nt).map(|p| p.to_string()).collect();
            if alternatives.is_empty() {
                writeln!(f, "{} ->", nt)?;
            } else {
                writeln!(f, "{} -> {}", nt, alternatives.join(" | "))?;
            }
        }
        Ok(())
    }
}

fn generated_index(nt: &NonTerminal) -> Option<u32> {
    match nt {
        NonTerminal::Generated(index) => Some(*index),
        NonTerminal::Named(_) => None,
    }
}

/// Classify a rule-line token. Returns `None` for the empty production.
fn classify_token(token: &str) -> Option<Symbol> {
    if is_epsilon_token(token) {
        return None;
    }
    let nt = NonTerminal::new(token);
    let starts_upper = token.chars().next().is_some_and(char::is_uppercase);
    if nt.is_generated() || starts_upper {
        Some(Symbol::NonTerminal(nt))
    } else {
        Some(Symbol::Terminal(Terminal::new(token)))
    }
}

/// Serializable form of a grammar.
///
/// Every symbol in `rules` must be listed in `non_terminals` or
/// `terminals`. The empty production is written `[]` (or as a single
/// epsilon token).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GrammarDocument {
    pub start: String,
    pub non_terminals: Vec<String>,
    pub terminals: Vec<String>,
    pub rules: BTreeMap<String, Vec<Vec<String>>>,
}

impl GrammarDocument {
    /// Resolve the names against the declared sets and build the grammar
    pub fn into_grammar(self) -> Result<Grammar> {
        let mut builder = GrammarBuilder::new(&self.start)
            .non_terminals(&self.non_terminals)
            .terminals(&self.terminals);
        for (head, alternatives) in &self.rules {
            for alternative in alternatives {
                builder = builder.rule(head, alternative);
            }
        }
        builder.build()
    }
}

/// Builder for constructing Grammar instances from declared symbol names.
///
/// Symbols in rules are resolved against the declared sets when
/// [`GrammarBuilder::build`] runs; epsilon tokens stand for the empty
/// production.
#[derive(Debug, Clone, Default)]
pub struct GrammarBuilder {
    start: String,
    non_terminals: Vec<String>,
    terminals: Vec<String>,
    rules: Vec<(String, Vec<String>)>,
}

impl GrammarBuilder {
    /// Create a new grammar builder with the given start symbol
    pub fn new(start_symbol: &str) -> Self {
        GrammarBuilder {
            start: start_symbol.to_string(),
            ..Default::default()
        }
    }

    /// Declare non-terminals
    pub fn non_terminals<S: AsRef<str>>(mut self, names: &[S]) -> Self {
        self.non_terminals
            .extend(names.iter().map(|n| n.as_ref().to_string()));
        self
    }

    /// Declare terminals
    pub fn terminals<S: AsRef<str>>(mut self, names: &[S]) -> Self {
        self.terminals.extend(names.iter().map(|n| n.as_ref().to_string()));
        self
    }

    /// Add an alternative for `head`
    pub fn rule<S: AsRef<str>>(mut self, head: &str, symbols: &[S]) -> Self {
        self.rules.push((
            head.to_string(),
            symbols.iter().map(|s| s.as_ref().to_string()).collect(),
        ));
        self
    }

    /// Add the empty production for `head`
    pub fn epsilon(self, head: &str) -> Self {
        self.rule::<&str>(head, &[])
    }

    /// Build the grammar
    pub fn build(self) -> Result<Grammar> {
        let terminal_names: BTreeSet<&str> = self.terminals.iter().map(String::as_str).collect();
        let non_terminal_names: BTreeSet<&str> =
            self.non_terminals.iter().map(String::as_str).collect();

        if let Some(name) = non_terminal_names.intersection(&terminal_names).next() {
            return Err(GrammarError::OverlappingSymbol(name.to_string()));
        }

        let mut rules = Rules::new();
        for (head, names) in &self.rules {
            if !non_terminal_names.contains(head.as_str()) {
                return Err(GrammarError::UnknownNonTerminal(head.clone()));
            }
            let mut symbols = Vec::with_capacity(names.len());
            for name in names {
                if non_terminal_names.contains(name.as_str()) {
                    symbols.push(Symbol::nt(name));
                } else if terminal_names.contains(name.as_str()) {
                    symbols.push(Symbol::t(name));
                } else if !is_epsilon_token(name) {
                    return Err(GrammarError::UnknownSymbol {
                        head: head.clone(),
                        symbol: name.clone(),
                    });
                }
            }
            rules
                .entry(NonTerminal::new(head))
                .or_default()
                .insert(Production::new(symbols));
        }

        Grammar::new(
            non_terminal_names.into_iter().map(NonTerminal::new).collect(),
            terminal_names.into_iter().map(Terminal::new).collect(),
            rules,
            NonTerminal::new(&self.start),
        )
    }
}
