//! Membership checks, used to compare a grammar with its normal form.
//!
//! [`Grammar::derives`] is an Earley recognizer and accepts any grammar,
//! including empty and unit productions. [`Grammar::cyk_accepts`] is the
//! CYK algorithm and only looks at productions already in normal form.

use std::collections::{BTreeMap, BTreeSet, HashSet};

use crate::grammar::Grammar;
use crate::symbol::{NonTerminal, Symbol, Terminal};
use crate::transform::epsilon::nullable_set;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct Item {
    rule: usize,
    dot: usize,
    origin: usize,
}

/// Earley chart column with set semantics
#[derive(Default)]
struct Column {
    items: Vec<Item>,
    seen: HashSet<Item>,
}

impl Column {
    fn add(&mut self, item: Item) {
        if self.seen.insert(item) {
            self.items.push(item);
        }
    }
}

impl Grammar {
    /// Check whether the start symbol derives `word`.
    pub fn derives(&self, word: &[Terminal]) -> bool {
        let rules: Vec<(&NonTerminal, &[Symbol])> = self
            .rules()
            .iter()
            .flat_map(|(head, productions)| productions.iter().map(move |p| (head, p.symbols())))
            .collect();
        let mut by_head: BTreeMap<&NonTerminal, Vec<usize>> = BTreeMap::new();
        for (index, (head, _)) in rules.iter().enumerate() {
            by_head.entry(*head).or_default().push(index);
        }
        let nullable = nullable_set(self);

        let mut chart: Vec<Column> = (0..=word.len()).map(|_| Column::default()).collect();
        for &rule in by_head.get(self.start()).into_iter().flatten() {
            chart[0].add(Item { rule, dot: 0, origin: 0 });
        }

        for position in 0..=word.len() {
            let mut next = 0;
            while next < chart[position].items.len() {
                let item = chart[position].items[next];
                next += 1;
                let (head, body) = rules[item.rule];

                match body.get(item.dot) {
                    None => {
                        // complete
                        let waiting: Vec<Item> = chart[item.origin]
                            .items
                            .iter()
                            .filter(|w| {
                                matches!(rules[w.rule].1.get(w.dot),
                                    Some(Symbol::NonTerminal(nt)) if nt == head)
                            })
                            .map(|w| Item { dot: w.dot + 1, ..*w })
                            .collect();
                        for advanced in waiting {
                            chart[position].add(advanced);
                        }
                    }
                    Some(Symbol::NonTerminal(nt)) => {
                        // predict
                        for &rule in by_head.get(nt).into_iter().flatten() {
                            chart[position].add(Item {
                                rule,
                                dot: 0,
                                origin: position,
                            });
                        }
                        if nullable.contains(nt) {
                            chart[position].add(Item {
                                dot: item.dot + 1,
                                ..item
                            });
                        }
                    }
                    Some(Symbol::Terminal(t)) => {
                        // scan
                        if word.get(position) == Some(t) {
                            chart[position + 1].add(Item {
                                dot: item.dot + 1,
                                ..item
                            });
                        }
                    }
                }
            }
        }

        chart[word.len()].items.iter().any(|item| {
            let (head, body) = rules[item.rule];
            head == self.start() && item.origin == 0 && item.dot == body.len()
        })
    }

    /// Check membership with the CYK algorithm.
    ///
    /// Only productions of a single terminal, two non-terminals, or the
    /// empty production are considered, so the answer is only meaningful for
    /// a grammar in Chomsky Normal Form. Empty productions may sit on any
    /// non-terminal; a pair with a nullable side then spans what its other
    /// side spans.
    pub fn cyk_accepts(&self, word: &[Terminal]) -> bool {
        let nullable = nullable_set(self);
        if word.is_empty() {
            return nullable.contains(self.start());
        }

        let mut unary: BTreeMap<&Terminal, Vec<&NonTerminal>> = BTreeMap::new();
        let mut binary: Vec<(&NonTerminal, &NonTerminal, &NonTerminal)> = Vec::new();
        for (head, productions) in self.rules() {
            for production in productions {
                match production.symbols() {
                    [Symbol::Terminal(t)] => unary.entry(t).or_default().push(head),
                    [Symbol::NonTerminal(left), Symbol::NonTerminal(right)] => {
                        binary.push((head, left, right))
                    }
                    _ => {}
                }
            }
        }

        let n = word.len();
        // table[start][len - 1]: non-terminals deriving word[start..start + len]
        let mut table: Vec<Vec<BTreeSet<&NonTerminal>>> = vec![vec![BTreeSet::new(); n]; n];
        for (i, terminal) in word.iter().enumerate() {
            if let Some(heads) = unary.get(terminal) {
                table[i][0].extend(heads.iter().copied());
            }
            close_over_nullable(&mut table[i][0], &binary, &nullable);
        }

        for len in 2..=n {
            for start in 0..=n - len {
                let mut found = BTreeSet::new();
                for split in 1..len {
                    let left_cell = &table[start][split - 1];
                    let right_cell = &table[start + split][len - split - 1];
                    for &(head, left, right) in &binary {
                        if left_cell.contains(left) && right_cell.contains(right) {
                            found.insert(head);
                        }
                    }
                }
                close_over_nullable(&mut found, &binary, &nullable);
                table[start][len - 1] = found;
            }
        }

        table[0][n - 1].contains(self.start())
    }
}

/// Add every head of a pair whose one side is in `cell` and whose other
/// side derives the empty string, until nothing changes.
fn close_over_nullable<'a>(
    cell: &mut BTreeSet<&'a NonTerminal>,
    binary: &[(&'a NonTerminal, &'a NonTerminal, &'a NonTerminal)],
    nullable: &BTreeSet<NonTerminal>,
) {
    if nullable.is_empty() {
        return;
    }
    loop {
        let added: Vec<&NonTerminal> = binary
            .iter()
            .filter(|(head, left, right)| {
                !cell.contains(*head)
                    && ((cell.contains(*left) && nullable.contains(*right))
                        || (nullable.contains(*left) && cell.contains(*right)))
            })
            .map(|(head, _, _)| *head)
            .collect();
        if added.is_empty() {
            return;
        }
        cell.extend(added);
    }
}
