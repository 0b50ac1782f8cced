use std::collections::{BTreeSet, VecDeque};

use ahash::AHashSet;
use indexmap::IndexMap;
use itertools::Itertools;

use crate::automaton::{
    Dfa, DfaTransition, Mealy, MealyTransition, Nfa, State, StateNamer, Symbol,
};

/// All states reachable from `states` through zero or more epsilon
/// transitions, computed by breadth-first traversal to a fixed point.
pub fn epsilon_closure(nfa: &Nfa, states: &BTreeSet<State>) -> BTreeSet<State> {
    let mut closure = states.clone();
    let mut queue: VecDeque<State> = states.iter().cloned().collect();

    while let Some(state) = queue.pop_front() {
        for transition in nfa.transitions() {
            if transition.from() == &state
                && transition.symbol().is_none()
                && !closure.contains(transition.to())
            {
                closure.insert(transition.to().clone());
                queue.push_back(transition.to().clone());
            }
        }
    }

    closure
}

fn step(nfa: &Nfa, states: &BTreeSet<State>, symbol: &Symbol) -> BTreeSet<State> {
    let mut result = BTreeSet::new();

    for transition in nfa.transitions() {
        if states.contains(transition.from()) && transition.symbol() == Some(symbol) {
            result.insert(transition.to().clone());
        }
    }

    result
}

/// Convert an NFA into an equivalent DFA via the subset construction.
///
/// Every visited state set is canonicalized as a sorted set and assigned a
/// fresh name the first time it is seen; set equality is the sole
/// deduplication mechanism. Successor sets that are empty produce no
/// transition instead of a dead state. A DFA state accepts iff its
/// underlying set intersects the NFA accept states.
pub fn determinize_nfa(nfa: &Nfa) -> Dfa {
    let mut namer = StateNamer::new();
    let mut names: IndexMap<BTreeSet<State>, State> = IndexMap::new();
    let mut transitions = Vec::new();

    /* The working alphabet is every non-epsilon symbol of the NFA,
     * iterated in sorted order so state numbering is reproducible. */
    let alphabet: BTreeSet<Symbol> = nfa
        .transitions()
        .iter()
        .filter_map(|t| t.symbol().cloned())
        .collect();

    let initial = epsilon_closure(nfa, &BTreeSet::from([nfa.start_state().clone()]));
    let start = namer.fresh();
    names.insert(initial.clone(), start.clone());

    let mut queue = VecDeque::from([initial]);
    let mut processed: AHashSet<BTreeSet<State>> = AHashSet::new();

    while let Some(current) = queue.pop_front() {
        if !processed.insert(current.clone()) {
            continue;
        }

        let current_name = names.get(&current).unwrap().clone();

        for symbol in &alphabet {
            let next = epsilon_closure(nfa, &step(nfa, &current, symbol));

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
                symbol.clone(),
            ));
        }
    }

    let accepts: Vec<State> = names
        .iter()
        .filter(|(set, _)| nfa.accept_states().iter().any(|a| set.contains(a)))
        .map(|(_, name)| name.clone())
        .collect();
    let states: Vec<State> = names.values().cloned().collect();

    Dfa::from_parts(states, start, accepts, transitions)
}

/// The display name of a merged state set: a single member keeps its own
/// name, larger sets render as `{a,b}` over the sorted members. Derived only
/// when the output machine is assembled; lookups use the set itself.
fn merged_state_name(set: &BTreeSet<State>) -> State {
    if set.len() == 1 {
        set.iter().next().unwrap().clone()
    } else {
        State::new(format!("{{{}}}", set.iter().map(State::name).join(",")))
    }
}

/// Merge nondeterministic Mealy transitions sharing a (state, input) pair
/// into deterministic ones.
///
/// A machine that already satisfies "at most one transition per
/// (state, input)" is returned unchanged. When merged transitions disagree
/// on output, the lexicographically smallest label wins; this tie-break is
/// deterministic but carries no formal equivalence guarantee.
pub fn determinize_mealy(machine: &Mealy) -> Mealy {
    if machine.is_deterministic() {
        return machine.clone();
    }

    /* Inputs in first-seen order over the transition list. */
    let mut inputs: Vec<Symbol> = Vec::new();
    for transition in machine.transitions() {
        if !inputs.contains(transition.input()) {
            inputs.push(transition.input().clone());
        }
    }

    // Exploration starts at the designated initial state.
    let Some(initial) = machine.states().first().cloned() else {
        return machine.clone();
    };

    let mut states = Vec::new();
    let mut transitions = Vec::new();
    let mut processed: AHashSet<BTreeSet<State>> = AHashSet::new();
    let mut queue = VecDeque::from([BTreeSet::from([initial])]);

    while let Some(current) = queue.pop_front() {
        if !processed.insert(current.clone()) {
            continue;
        }

        let current_name = merged_state_name(&current);
        states.push(current_name.clone());

        for input in &inputs {
            let merged: Vec<&MealyTransition> = machine
                .transitions()
                .iter()
                .filter(|t| current.contains(t.from()) && t.input() == input)
                .collect();

            if merged.is_empty() {
                continue;
            }

            let targets: BTreeSet<State> = merged.iter().map(|t| t.to().clone()).collect();
            let output = merged
                .iter()
                .map(|t| t.output())
                .min()
                .unwrap()
                .clone();

            transitions.push(MealyTransition::new(
                current_name.clone(),
                merged_state_name(&targets),
                input.clone(),
                output,
            ));

            if !processed.contains(&targets) {
                queue.push_back(targets);
            }
        }
    }

    Mealy::new(states, transitions)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::automaton::NfaTransition;

    fn state(name: &str) -> State {
        State::new(name)
    }

    fn symbol(text: &str) -> Symbol {
        Symbol::new(text)
    }

    fn mealy_transition(from: &str, to: &str, input: &str, output: &str) -> MealyTransition {
        MealyTransition::new(state(from), state(to), symbol(input), symbol(output))
    }

    #[test]
    fn test_epsilon_closure_reaches_fixed_point() {
        // q0 -e-> q1 -e-> q2, q1 -a-> q3
        let nfa = Nfa::new(
            vec![state("q0"), state("q1"), state("q2"), state("q3")],
            state("q0"),
            vec![state("q3")],
            vec![
                NfaTransition::new(state("q0"), state("q1"), None),
                NfaTransition::new(state("q1"), state("q2"), None),
                NfaTransition::new(state("q1"), state("q3"), Some(symbol("a"))),
            ],
        )
        .unwrap();

        let closure = epsilon_closure(&nfa, &BTreeSet::from([state("q0")]));
        assert_eq!(
            closure,
            BTreeSet::from([state("q0"), state("q1"), state("q2")]),
        );
    }

    #[test]
    fn test_subset_construction_merges_identical_sets() {
        // Nondeterministic on 'a': both branches loop back to the same set.
        let nfa = Nfa::new(
            vec![state("q0"), state("q1"), state("q2")],
            state("q0"),
            vec![state("q1"), state("q2")],
            vec![
                NfaTransition::new(state("q0"), state("q1"), Some(symbol("a"))),
                NfaTransition::new(state("q0"), state("q2"), Some(symbol("a"))),
                NfaTransition::new(state("q1"), state("q0"), Some(symbol("b"))),
                NfaTransition::new(state("q2"), state("q0"), Some(symbol("b"))),
            ],
        )
        .unwrap();

        let dfa = determinize_nfa(&nfa);

        assert_eq!(dfa.states().len(), 2);
        assert_eq!(dfa.start_state(), &state("q0"));
        assert_eq!(dfa.accept_states(), &[state("q1")]);
        assert_eq!(
            dfa.transitions(),
            &[
                DfaTransition::new(state("q0"), state("q1"), symbol("a")),
                DfaTransition::new(state("q1"), state("q0"), symbol("b")),
            ],
        );
    }

    #[test]
    fn test_deterministic_mealy_is_returned_unchanged() {
        let machine = Mealy::new(
            vec![state("S1"), state("S2")],
            vec![mealy_transition("S1", "S2", "a", "y1")],
        );
        assert_eq!(determinize_mealy(&machine), machine);
    }

    #[test]
    fn test_mealy_merge_with_equal_outputs() {
        let machine = Mealy::new(
            vec![state("S0"), state("S1"), state("S2")],
            vec![
                mealy_transition("S0", "S1", "a", "y1"),
                mealy_transition("S0", "S2", "a", "y1"),
                mealy_transition("S1", "S0", "b", "y2"),
                mealy_transition("S2", "S0", "b", "y3"),
            ],
        );

        let result = determinize_mealy(&machine);

        assert!(result.is_deterministic());
        assert!(result.states().contains(&state("S0")));
        assert!(result.states().contains(&state("{S1,S2}")));

        let from_start = result
            .transitions()
            .iter()
            .find(|t| t.from() == &state("S0") && t.input() == &symbol("a"))
            .unwrap();
        assert_eq!(from_start.to(), &state("{S1,S2}"));
        assert_eq!(from_start.output(), &symbol("y1"));

        // The merged state disagrees on the output for 'b': y2 < y3 wins.
        let from_merged = result
            .transitions()
            .iter()
            .find(|t| t.from() == &state("{S1,S2}") && t.input() == &symbol("b"))
            .unwrap();
        assert_eq!(from_merged.to(), &state("S0"));
        assert_eq!(from_merged.output(), &symbol("y2"));
    }

    #[test]
    fn test_mealy_merge_with_distinct_outputs() {
        let machine = Mealy::new(
            vec![state("S1"), state("S2"), state("S3"), state("S4")],
            vec![
                mealy_transition("S1", "S2", "a", "y1"),
                mealy_transition("S1", "S3", "a", "y2"),
                mealy_transition("S2", "S4", "b", "y3"),
                mealy_transition("S3", "S4", "b", "y4"),
                mealy_transition("S4", "S1", "c", "y5"),
            ],
        );

        let result = determinize_mealy(&machine);

        assert!(result.is_deterministic());
        assert!(result.states().contains(&state("{S2,S3}")));

        let from_start = result
            .transitions()
            .iter()
            .find(|t| t.from() == &state("S1") && t.input() == &symbol("a"))
            .unwrap();
        assert_eq!(from_start.to(), &state("{S2,S3}"));
        assert_eq!(from_start.output(), &symbol("y1"));
    }
}
