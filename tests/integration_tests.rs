use grammar_cnf::random::{random_grammar, RandomGrammarConfig};
use grammar_cnf::{Grammar, GrammarError, Normalizer, NormalizerConfig, NonTerminal, Terminal};
use pretty_assertions::assert_eq;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::fs;
use tempfile::tempdir;

const LAB: &str = r#"
    # Variant grammar
    S -> a B | b A | B
    A -> b | a D | A S | b A B | ε
    B -> a | b S
    C -> A B
    D -> B B
"#;

/// Every word over `alphabet` with length in `1..=max_len`
fn words(alphabet: &[&str], max_len: usize) -> Vec<Vec<Terminal>> {
    let mut all = Vec::new();
    let mut layer: Vec<Vec<Terminal>> = vec![Vec::new()];
    for _ in 0..max_len {
        layer = layer
            .iter()
            .flat_map(|prefix| {
                alphabet.iter().map(move |t| {
                    let mut word = prefix.clone();
                    word.push(Terminal::new(t));
                    word
                })
            })
            .collect();
        all.extend(layer.iter().cloned());
    }
    all
}

fn assert_same_language(original: &Grammar, cnf: &Grammar, alphabet: &[&str], max_len: usize) {
    for word in words(alphabet, max_len) {
        assert_eq!(
            original.derives(&word),
            cnf.cyk_accepts(&word),
            "languages differ on {:?}\noriginal:\n{}\nnormal form:\n{}",
            word,
            original,
            cnf
        );
    }
}

#[test]
fn test_load_from_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("lab.txt");
    fs::write(&path, LAB).unwrap();

    let grammar = Grammar::from_file(&path, None).unwrap();

    assert_eq!(grammar.start(), &NonTerminal::new("S"));
    assert!(grammar.has_non_terminal("C"));
    assert_eq!(grammar.terminals().len(), 2);
    assert!(!grammar.is_cnf());
}

#[test]
fn test_missing_file() {
    let dir = tempdir().unwrap();
    let result = Grammar::from_file(dir.path().join("absent.txt"), None);
    assert!(matches!(result, Err(GrammarError::Io(_))));
}

#[test]
fn test_lab_grammar_to_cnf() {
    let original = Grammar::from_text(LAB, None).unwrap();
    let cnf = original.clone().to_cnf().unwrap();

    assert!(cnf.is_cnf());
    assert_eq!(cnf.start(), &NonTerminal::new("S"));
    assert!(!cnf.has_non_terminal("C"));
    for (head, productions) in cnf.rules() {
        for production in productions {
            assert!(!production.is_epsilon(), "{} has an empty production", head);
            assert!(production.len() <= 2);
        }
    }
    assert_same_language(&original, &cnf, &["a", "b"], 6);
}

#[test]
fn test_normalizing_twice_changes_nothing() {
    let cnf = Grammar::from_text(LAB, None).unwrap().to_cnf().unwrap();
    let again = Normalizer::default().run(cnf.clone()).unwrap();

    assert!(again.already_normal);
    assert_eq!(again.grammar, cnf);
}

#[test]
fn test_empty_productions_inside_normal_form_kept() {
    let grammar = Grammar::from_text("S -> A B | b\nA -> a | ε\nB -> b | ε", None).unwrap();
    assert!(grammar.is_cnf());

    let cnf = grammar.clone().to_cnf().unwrap();
    assert_eq!(cnf, grammar);
    assert!(cnf.cyk_accepts(&[]));
    assert_same_language(&grammar, &cnf, &["a", "b"], 3);
}

#[test]
fn test_balanced_brackets() {
    let original = Grammar::from_text("S -> ( S ) S | ε", None).unwrap();
    let result = Normalizer::default().run(original.clone()).unwrap();

    assert!(result.dropped_empty_word);
    assert!(result.grammar.is_cnf());
    assert_same_language(&original, &result.grammar, &["(", ")"], 6);
}

#[test]
fn test_preserved_empty_word_language() {
    let original = Grammar::from_text("S -> a S b | S S | ε", None).unwrap();
    let result = Normalizer::new(NormalizerConfig {
        preserve_empty_word: true,
        ..Default::default()
    })
    .run(original.clone())
    .unwrap();

    assert!(result.grammar.is_cnf());
    assert!(result.grammar.cyk_accepts(&[]));
    assert_same_language(&original, &result.grammar, &["a", "b"], 6);
}

#[test]
fn test_random_grammars_keep_their_language() {
    let config = RandomGrammarConfig::default();
    let mut rng = StdRng::seed_from_u64(2024);

    for _ in 0..60 {
        let original = random_grammar(&mut rng, &config).unwrap();
        let cnf = original.clone().to_cnf().unwrap();

        assert!(cnf.is_cnf(), "not in normal form:\n{}", cnf);
        assert_same_language(&original, &cnf, &["a", "b"], 4);
    }
}

#[test]
fn test_random_grammars_with_long_rules() {
    let config = RandomGrammarConfig {
        non_terminals: 3,
        terminals: 3,
        max_length: 6,
        epsilon_probability: 0.25,
        ..Default::default()
    };
    let mut rng = StdRng::seed_from_u64(99);

    for _ in 0..30 {
        let original = random_grammar(&mut rng, &config).unwrap();
        let result = Normalizer::new(NormalizerConfig {
            preserve_empty_word: true,
            prune_unused_helpers: true,
            ..Default::default()
        })
        .run(original.clone())
        .unwrap();

        assert!(result.grammar.is_cnf());
        assert_eq!(original.derives(&[]), result.grammar.cyk_accepts(&[]));
        assert_same_language(&original, &result.grammar, &["a", "b", "c"], 3);
    }
}

#[test]
fn test_cnf_json_round_trip() {
    let cnf = Grammar::from_text(LAB, None).unwrap().to_cnf().unwrap();

    let dir = tempdir().unwrap();
    let path = dir.path().join("cnf.json");
    fs::write(&path, cnf.to_json().unwrap()).unwrap();

    let loaded = Grammar::from_json(&fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(loaded, cnf);
    assert!(loaded.is_cnf());
}

#[test]
fn test_generated_names_survive_text_round_trip() {
    let cnf = Grammar::from_text("S -> a S b | a b", None)
        .unwrap()
        .to_cnf()
        .unwrap();
    let reparsed = Grammar::from_text(&cnf.to_string(), None).unwrap();

    assert_eq!(reparsed.rules(), cnf.rules());
    assert!(reparsed.non_terminals().iter().any(NonTerminal::is_generated));

    // Fresh symbols continue after the ones already in use
    let renormalized = Grammar::from_text(&format!("{}\nS -> a b c", cnf), None)
        .unwrap()
        .to_cnf()
        .unwrap();
    assert!(renormalized.is_cnf());
}

#[test]
fn test_malformed_grammars_rejected() {
    assert!(matches!(
        Grammar::from_text("S -> a |", None),
        Err(GrammarError::Parse { line: 1, .. })
    ));
    assert!(matches!(
        Grammar::from_text("S -> a\nb -> S", None),
        Err(GrammarError::Parse { line: 2, .. })
    ));
    assert!(matches!(
        Grammar::from_text("S -> a", Some("T")),
        Err(GrammarError::UnknownNonTerminal(_))
    ));
    assert!(matches!(
        Grammar::from_json(r#"{"start": "S", "non_terminals": ["S"], "terminals": [], "rules": {"S": [["x"]]}}"#),
        Err(GrammarError::UnknownSymbol { .. })
    ));
}

#[test]
fn test_config_from_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("normalizer.json");
    fs::write(&path, r#"{"record_trace": true, "prune_unused_helpers": true}"#).unwrap();

    let config = NormalizerConfig::from_file(&path).unwrap();
    assert_eq!(
        config,
        NormalizerConfig {
            record_trace: true,
            preserve_empty_word: false,
            prune_unused_helpers: true,
        }
    );

    let result = Normalizer::new(config)
        .run(Grammar::from_text(LAB, None).unwrap())
        .unwrap();
    assert_eq!(result.trace.len(), 7);
    assert_eq!(
        result.trace[6].title,
        "7. After eliminating inaccessible symbols"
    );
}
