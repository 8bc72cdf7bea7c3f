//! Grammar-CNF normalizes context-free grammars into Chomsky Normal Form.
//!
//! A grammar is loaded from rule lines, a JSON document, or built in code,
//! then passed through a fixed sequence of stages: epsilon elimination,
//! unit (renaming) elimination, reachability pruning, productivity pruning,
//! terminal isolation and binarization. Afterwards every production is a
//! single terminal or a pair of non-terminals.
//!
//! # Example
//!
//! ```rust
//! use grammar_cnf::Grammar;
//!
//! let grammar = Grammar::from_text("S -> a S b | a b", None).unwrap();
//! let cnf = grammar.to_cnf().unwrap();
//!
//! assert!(cnf.is_cnf());
//! assert!(cnf.cyk_accepts(&[
//!     grammar_cnf::Terminal::new("a"),
//!     grammar_cnf::Terminal::new("b"),
//! ]));
//! ```

pub mod grammar;
pub mod pipeline;
pub mod random;
pub mod recognize;
pub mod symbol;
pub mod transform;
pub mod utils;
pub mod validator;

pub use grammar::{Grammar, GrammarBuilder, GrammarDocument, Rules};
pub use pipeline::{Normalization, Normalizer, NormalizerConfig, TraceStep};
pub use utils::{GrammarError, Result};

// Re-export common enums and structs
pub use symbol::{NonTerminal, Production, Symbol, Terminal};
pub use validator::{Violation, ViolationKind};
