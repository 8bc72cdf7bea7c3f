//! Grammar symbols and productions.
//!
//! Productions are sequences of [`Symbol`]s rather than concatenated
//! characters, so names of any length (including the non-terminals minted
//! during normalization) fit without ambiguity.

use std::fmt;

/// Textual spellings accepted for the empty production.
pub const EPSILON_TOKENS: [&str; 4] = ["ε", "ϵ", "$", "epsilon"];

/// How the empty production is rendered.
pub const EPSILON: &str = "ε";

/// Returns true if `token` spells the empty production.
pub fn is_epsilon_token(token: &str) -> bool {
    EPSILON_TOKENS.contains(&token)
}

/// A terminal symbol (literal text of the generated language)
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Terminal(String);

impl Terminal {
    pub fn new(name: &str) -> Self {
        Terminal(name.to_string())
    }

    pub fn name(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Terminal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A non-terminal symbol.
///
/// Names supplied by the user and names minted by the normalization stages
/// live in separate variants, so a generated symbol can never collide with
/// a user symbol. Generated symbols render as `_<n>`, and [`NonTerminal::new`]
/// parses that spelling back into the generated variant.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum NonTerminal {
    /// A non-terminal named in the input grammar
    Named(String),
    /// A non-terminal minted during normalization
    Generated(u32),
}

impl NonTerminal {
    /// Create a non-terminal from its textual name
    pub fn new(name: &str) -> Self {
        match Self::generated_index(name) {
            Some(index) => NonTerminal::Generated(index),
            None => NonTerminal::Named(name.to_string()),
        }
    }

    /// Returns the index if `name` is the spelling of a generated symbol
    fn generated_index(name: &str) -> Option<u32> {
        let digits = name.strip_prefix('_')?;
        if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
            return None;
        }
        digits.parse().ok()
    }

    pub fn is_generated(&self) -> bool {
        matches!(self, NonTerminal::Generated(_))
    }
}

impl fmt::Display for NonTerminal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NonTerminal::Named(name) => f.write_str(name),
            NonTerminal::Generated(index) => write!(f, "_{}", index),
        }
    }
}

/// A symbol on the right-hand side of a production
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Symbol {
    Terminal(Terminal),
    NonTerminal(NonTerminal),
}

impl Symbol {
    /// Shorthand for a terminal symbol
    pub fn t(name: &str) -> Self {
        Symbol::Terminal(Terminal::new(name))
    }

    /// Shorthand for a non-terminal symbol
    pub fn nt(name: &str) -> Self {
        Symbol::NonTerminal(NonTerminal::new(name))
    }

    pub fn as_terminal(&self) -> Option<&Terminal> {
        match self {
            Symbol::Terminal(t) => Some(t),
            Symbol::NonTerminal(_) => None,
        }
    }

    pub fn as_non_terminal(&self) -> Option<&NonTerminal> {
        match self {
            Symbol::NonTerminal(nt) => Some(nt),
            Symbol::Terminal(_) => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Symbol::Terminal(_))
    }
}

impl From<Terminal> for Symbol {
    fn from(t: Terminal) -> Self {
        Symbol::Terminal(t)
    }
}

impl From<NonTerminal> for Symbol {
    fn from(nt: NonTerminal) -> Self {
        Symbol::NonTerminal(nt)
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Symbol::Terminal(t) => fmt::Display::fmt(t, f),
            Symbol::NonTerminal(nt) => fmt::Display::fmt(nt, f),
        }
    }
}

/// The right-hand side of a rule. The empty sequence is the empty-string
/// production.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Production {
    symbols: Vec<Symbol>,
}

impl Production {
    pub fn new(symbols: Vec<Symbol>) -> Self {
        Production { symbols }
    }

    /// The empty-string production
    pub fn epsilon() -> Self {
        Production::default()
    }

    pub fn symbols(&self) -> &[Symbol] {
        &self.symbols
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_epsilon(&self) -> bool {
        self.symbols.is_empty()
    }

    /// Returns the non-terminal if this is a unit (chain) production
    pub fn as_unit(&self) -> Option<&NonTerminal> {
        match self.symbols.as_slice() {
            [Symbol::NonTerminal(nt)] => Some(nt),
            _ => None,
        }
    }

    /// Iterate over the non-terminals used by this production
    pub fn non_terminals(&self) -> impl Iterator<Item = &NonTerminal> {
        self.symbols.iter().filter_map(Symbol::as_non_terminal)
    }

    pub fn mentions(&self, nt: &NonTerminal) -> bool {
        self.non_terminals().any(|n| n == nt)
    }
}

impl From<Vec<Symbol>> for Production {
    fn from(symbols: Vec<Symbol>) -> Self {
        Production::new(symbols)
    }
}

impl fmt::Display for Production {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.symbols.is_empty() {
            return f.write_str(EPSILON);
        }
        for (i, symbol) in self.symbols.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{}", symbol)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_spelling_round_trips() {
        assert_eq!(NonTerminal::new("_12"), NonTerminal::Generated(12));
        assert_eq!(NonTerminal::Generated(12).to_string(), "_12");

        // Only `_` followed by digits is reserved
        assert_eq!(NonTerminal::new("_"), NonTerminal::Named("_".to_string()));
        assert_eq!(NonTerminal::new("_a1"), NonTerminal::Named("_a1".to_string()));
        assert_eq!(NonTerminal::new("S_1"), NonTerminal::Named("S_1".to_string()));
    }

    #[test]
    fn test_named_sort_before_generated() {
        let mut symbols = vec![
            NonTerminal::Generated(0),
            NonTerminal::new("B"),
            NonTerminal::new("A"),
        ];
        symbols.sort();
        assert_eq!(
            symbols,
            vec![
                NonTerminal::new("A"),
                NonTerminal::new("B"),
                NonTerminal::Generated(0)
            ]
        );
    }

    #[test]
    fn test_production_display() {
        let prod = Production::new(vec![Symbol::t("a"), Symbol::nt("B"), Symbol::nt("_3")]);
        assert_eq!(prod.to_string(), "a B _3");
        assert_eq!(Production::epsilon().to_string(), "ε");
    }

    #[test]
    fn test_unit_detection() {
        let unit = Production::new(vec![Symbol::nt("A")]);
        assert_eq!(unit.as_unit(), Some(&NonTerminal::new("A")));

        let terminal = Production::new(vec![Symbol::t("a")]);
        assert_eq!(terminal.as_unit(), None);

        let pair = Production::new(vec![Symbol::nt("A"), Symbol::nt("B")]);
        assert_eq!(pair.as_unit(), None);
        assert!(pair.mentions(&NonTerminal::new("B")));
    }

    #[test]
    fn test_epsilon_tokens() {
        for token in EPSILON_TOKENS {
            assert!(is_epsilon_token(token));
        }
        assert!(!is_epsilon_token("e"));
    }
}
