use std::collections::{BTreeSet, VecDeque};

use ahash::AHashSet;
use indexmap::IndexMap;

use crate::automaton::{self, Dfa, DfaTransition, State, StateNamer};
use crate::error::SemanticError;
use crate::grammar::{Grammar, NonTerminal, Symbol, Terminal};

/// Synthetic marker standing in for "a single-terminal rule was consumed";
/// a closure set containing it names an accepting state.
const FINAL_MARKER: &str = "FINAL";

fn validate_regular(grammar: &Grammar) -> Result<(), SemanticError> {
    for rule in grammar.rules() {
        let regular = match rule.rhs() {
            [] => true,
            [Symbol::Terminal(_)] => true,
            [Symbol::Terminal(_), Symbol::NonTerminal(_)] => true,
            _ => false,
        };

        if !regular {
            return Err(SemanticError::NotRegular {
                rule: rule.to_string(),
            });
        }
    }

    Ok(())
}

/// Expand a non-terminal set with every non-terminal standing first in a
/// rule headed by a member, repeated to a fixed point.
fn closure(grammar: &Grammar, nonterminals: BTreeSet<NonTerminal>) -> BTreeSet<NonTerminal> {
    let mut closure = nonterminals;
    let mut changed = true;

    while changed {
        changed = false;
        for rule in grammar.rules() {
            if !closure.contains(rule.lhs()) {
                continue;
            }
            if let Some(first) = rule.rhs().first().and_then(Symbol::as_non_terminal) {
                if closure.insert(first.clone()) {
                    changed = true;
                }
            }
        }
    }

    closure
}

/// The closure reached from `current` by consuming `terminal`: the trailing
/// non-terminal of every matching A -> aB rule, plus the marker for every
/// matching A -> a rule.
fn successors(
    grammar: &Grammar,
    current: &BTreeSet<NonTerminal>,
    terminal: &Terminal,
) -> BTreeSet<NonTerminal> {
    let mut result = BTreeSet::new();

    for rule in grammar.rules() {
        if !current.contains(rule.lhs()) {
            continue;
        }
        match rule.rhs() {
            [Symbol::Terminal(t)] if t == terminal => {
                result.insert(NonTerminal::new(FINAL_MARKER));
            },
            [Symbol::Terminal(t), Symbol::NonTerminal(next)] if t == terminal => {
                result.insert(next.clone());
            },
            _ => {},
        }
    }

    closure(grammar, result)
}

/// Build a DFA directly from a right-linear grammar.
///
/// Only rules of the shapes A -> aB, A -> a and A -> e are accepted; any
/// other shape fails with [`SemanticError::NotRegular`] naming the rule.
/// Worklist exploration starts from the closure of the start symbol; each
/// distinct closure set is canonicalized and named `q<n>` the first time it
/// is seen, so set-equal closures always merge into one state.
pub fn regular_grammar_to_dfa(grammar: &Grammar) -> Result<Dfa, SemanticError> {
    validate_regular(grammar)?;

    let mut namer = StateNamer::new();
    let mut names: IndexMap<BTreeSet<NonTerminal>, State> = IndexMap::new();
    let mut transitions = Vec::new();

    let initial = closure(grammar, BTreeSet::from([grammar.start_symbol().clone()]));
    let start = namer.fresh();
    names.insert(initial.clone(), start.clone());

    let mut queue = VecDeque::from([initial]);
    let mut processed: AHashSet<BTreeSet<NonTerminal>> = AHashSet::new();

    while let Some(current) = queue.pop_front() {
        if !processed.insert(current.clone()) {
            continue;
        }

        let current_name = names.get(&current).unwrap().clone();

        for terminal in grammar.terminals() {
            let next = successors(grammar, &current, terminal);

            if next.is_empty() {
                continue;
            }

            let next_name = names
                .entry(next.clone())
                .or_insert_with(|| namer.fresh())
                .clone();

            if !processed.contains(&next) {
                queue.push_back(next);
            }

            transitions.push(DfaTransition::new(
                current_name.clone(),
                next_name,
                automaton::Symbol::new(terminal.content()),
            ));
        }
    }

    let marker = NonTerminal::new(FINAL_MARKER);
    let accepts: Vec<State> = names
        .iter()
        .filter(|(set, _)| set.contains(&marker))
        .map(|(_, name)| name.clone())
        .collect();
    let states: Vec<State> = names.values().cloned().collect();

    Ok(Dfa::from_parts(states, start, accepts, transitions))
}
