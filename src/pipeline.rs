use std::fs;
use std::path::Path;

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use crate::grammar::Grammar;
use crate::symbol::Production;
use crate::transform::epsilon::nullable_set;
use crate::transform::{standard_stages, PruneUnreachable, Stage};
use crate::utils::{GrammarError, Result};
use crate::validator;

/// Configuration options for normalization
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NormalizerConfig {
    /// Record a snapshot of the grammar after every stage
    pub record_trace: bool,
    /// Keep the empty word when the start symbol is nullable, by adding a
    /// fresh start symbol with an empty production
    pub preserve_empty_word: bool,
    /// Run reachability once more at the end, removing terminal helpers no
    /// production uses
    pub prune_unused_helpers: bool,
}

impl NormalizerConfig {
    /// Load a configuration from a JSON file. Missing fields keep their
    /// default values.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }
}

/// A titled snapshot of the grammar taken after one stage
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraceStep {
    pub title: String,
    pub grammar: Grammar,
}

/// The outcome of a normalization run
#[derive(Debug, Clone)]
pub struct Normalization {
    /// The grammar in Chomsky Normal Form
    pub grammar: Grammar,
    /// Snapshots after each stage, if tracing was enabled
    pub trace: Vec<TraceStep>,
    /// The input was already in normal form and was returned unchanged
    pub already_normal: bool,
    /// The start symbol was nullable and the empty word is not in the
    /// language of the result
    pub dropped_empty_word: bool,
}

/// Runs the normalization stages in order
#[derive(Debug)]
pub struct Normalizer {
    config: NormalizerConfig,
    stages: Vec<Box<dyn Stage>>,
}

impl Default for Normalizer {
    fn default() -> Self {
        Normalizer::new(NormalizerConfig::default())
    }
}

impl Normalizer {
    pub fn new(config: NormalizerConfig) -> Self {
        let mut stages = standard_stages();
        if config.prune_unused_helpers {
            stages.push(Box::new(PruneUnreachable));
        }
        Normalizer { config, stages }
    }

    pub fn config(&self) -> &NormalizerConfig {
        &self.config
    }

    /// Names of the stages this normalizer runs, in order
    pub fn stage_names(&self) -> Vec<&str> {
        self.stages.iter().map(|stage| stage.name()).collect()
    }

    /// Convert `grammar` to Chomsky Normal Form.
    ///
    /// The grammar is validated before any stage runs, and a grammar that is
    /// already in normal form is returned untouched. Only a grammar that
    /// needs the stages must give its start symbol a production, so the
    /// empty-language output of an earlier run normalizes again.
    pub fn run(&self, grammar: Grammar) -> Result<Normalization> {
        grammar.validate()?;

        if grammar.is_cnf() {
            info!("Grammar is already in Chomsky Normal Form");
            let trace = if self.config.record_trace {
                vec![TraceStep {
                    title: "Grammar is already in CNF".to_string(),
                    grammar: grammar.clone(),
                }]
            } else {
                Vec::new()
            };
            return Ok(Normalization {
                grammar,
                trace,
                already_normal: true,
                dropped_empty_word: false,
            });
        }

        grammar.validate_input()?;
        let start_nullable = nullable_set(&grammar).contains(grammar.start());
        let mut trace = Vec::new();
        let mut grammar = grammar;

        for (index, stage) in self.stages.iter().enumerate() {
            grammar = stage.apply(grammar)?;
            debug!(
                "Stage {}: {} non-terminals, {} productions",
                stage.name(),
                grammar.non_terminals().len(),
                grammar.production_count()
            );
            if self.config.record_trace {
                trace.push(TraceStep {
                    title: format!("{}. {}", index + 1, stage.title()),
                    grammar: grammar.clone(),
                });
            }
        }

        let mut dropped_empty_word = false;
        if start_nullable {
            if self.config.preserve_empty_word {
                grammar = restore_empty_word(grammar)?;
                if self.config.record_trace {
                    trace.push(TraceStep {
                        title: format!("{}. After restoring the empty word", trace.len() + 1),
                        grammar: grammar.clone(),
                    });
                }
            } else {
                warn!(
                    "Start symbol {} is nullable; the empty word is not kept in the normal form",
                    grammar.start()
                );
                dropped_empty_word = true;
            }
        }

        let violations = validator::strict_violations(&grammar);
        if !violations.is_empty() {
            let listed: Vec<String> = violations.iter().map(|v| v.to_string()).collect();
            return Err(GrammarError::ValidationFailed(listed.join("; ")));
        }

        info!(
            "Normalized grammar has {} non-terminals and {} productions",
            grammar.non_terminals().len(),
            grammar.production_count()
        );
        Ok(Normalization {
            grammar,
            trace,
            already_normal: false,
            dropped_empty_word,
        })
    }
}

/// Add a fresh start symbol deriving everything the old one does, plus the
/// empty word. The fresh symbol never occurs on a right-hand side.
fn restore_empty_word(mut grammar: Grammar) -> Result<Grammar> {
    let old_start = grammar.start().clone();
    let new_start = grammar.mint()?;
    let productions: Vec<Production> = grammar.productions(&old_start).cloned().collect();
    for production in productions {
        grammar.add_production(&new_start, production);
    }
    grammar.add_production(&new_start, Production::epsilon());
    debug!("Restored the empty word under new start symbol {}", new_start);
    grammar.set_start(new_start);
    Ok(grammar)
}
