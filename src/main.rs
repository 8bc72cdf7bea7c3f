use clap::{Args, Parser, Subcommand};
use grammar_cnf::{validator, Grammar, Normalizer, NormalizerConfig, Terminal};
use log::info;
use std::fs;
use std::path::{Path, PathBuf};

const LAB_GRAMMAR: &str = "\
# Variant grammar used throughout the normal-form examples
S -> a B | b A | B
A -> b | a D | A S | b A B | ε
B -> a | b S
C -> A B
D -> B B
";

/// Chomsky Normal Form converter for context-free grammars
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

/// Where to read the grammar from
#[derive(Args)]
struct Input {
    /// Path to the grammar file
    grammar_file: PathBuf,

    /// Start symbol (default: first rule in the file)
    #[arg(short, long, value_name = "SYMBOL")]
    start: Option<String>,

    /// Read the grammar as a JSON document instead of rule lines
    #[arg(long)]
    json: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert a grammar to Chomsky Normal Form
    Normalize {
        #[command(flatten)]
        input: Input,

        /// Print the grammar after every stage
        #[arg(long)]
        trace: bool,

        /// Keep the empty word when the start symbol is nullable
        #[arg(long)]
        preserve_empty: bool,

        /// Remove terminal helpers that no production uses
        #[arg(long)]
        prune_helpers: bool,

        /// JSON file with normalizer settings
        #[arg(long, value_name = "FILE")]
        config: Option<PathBuf>,

        /// Write the normalized grammar as JSON to this file
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },

    /// Report the productions that are not in Chomsky Normal Form
    Check {
        #[command(flatten)]
        input: Input,

        /// Only allow the empty production on a start symbol that no
        /// production uses
        #[arg(long)]
        strict: bool,
    },

    /// Test whether a word, given as terminals, belongs to the language
    Accepts {
        #[command(flatten)]
        input: Input,

        /// Terminals of the word (none for the empty word)
        word: Vec<String>,
    },

    /// Write an example grammar file
    Example {
        /// Output file path
        #[arg(short, long, value_name = "FILE", default_value = "example_grammar.txt")]
        output: PathBuf,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Normalize {
            input,
            trace,
            preserve_empty,
            prune_helpers,
            config,
            output,
        } => {
            let mut settings = match config {
                Some(path) => NormalizerConfig::from_file(&path)?,
                None => NormalizerConfig::default(),
            };
            settings.record_trace |= trace;
            settings.preserve_empty_word |= preserve_empty;
            settings.prune_unused_helpers |= prune_helpers;

            let grammar = load_grammar(&input)?;
            print_grammar("Input grammar", &grammar);

            let result = Normalizer::new(settings).run(grammar)?;
            for step in &result.trace {
                print_grammar(&step.title, &step.grammar);
            }
            if !result.already_normal {
                print_grammar("Final CNF form", &result.grammar);
            }
            if result.dropped_empty_word {
                println!(
                    "\nnote: the start symbol is nullable; the empty word was dropped \
                     (use --preserve-empty to keep it)"
                );
            }

            if let Some(path) = output {
                fs::write(&path, result.grammar.to_json()?)?;
                println!("\nWrote normalized grammar to {}", path.display());
            }
        }

        Commands::Check { input, strict } => {
            let grammar = load_grammar(&input)?;
            let violations = if strict {
                validator::strict_violations(&grammar)
            } else {
                validator::violations(&grammar)
            };
            if violations.is_empty() {
                println!("Grammar is in Chomsky Normal Form");
            } else {
                for violation in &violations {
                    println!("{}", violation);
                }
                return Err(format!("{} productions are not in CNF", violations.len()).into());
            }
        }

        Commands::Accepts { input, word } => {
            let grammar = load_grammar(&input)?;
            let word: Vec<Terminal> = word.iter().map(|t| Terminal::new(t)).collect();
            let original = grammar.derives(&word);
            let cnf = grammar.to_cnf()?;
            println!("original grammar: {}", verdict(original));
            println!("normal form:      {}", verdict(cnf.cyk_accepts(&word)));
        }

        Commands::Example { output } => {
            write_example(&output)?;
            println!("Created example grammar at: {}", output.display());
        }
    }

    Ok(())
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
}

fn load_grammar(input: &Input) -> grammar_cnf::Result<Grammar> {
    info!("Loading grammar from {}", input.grammar_file.display());
    if input.json {
        Grammar::from_json(&fs::read_to_string(&input.grammar_file)?)
    } else {
        Grammar::from_file(&input.grammar_file, input.start.as_deref())
    }
}

fn print_grammar(title: &str, grammar: &Grammar) {
    println!("\n{}", "=".repeat(50));
    println!("{:^50}", title);
    println!("{}", "=".repeat(50));
    print!("{}", grammar);
}

fn verdict(accepted: bool) -> &'static str {
    if accepted { "accepted" } else { "rejected" }
}

fn write_example(path: &Path) -> std::io::Result<()> {
    fs::write(path, LAB_GRAMMAR)
}
