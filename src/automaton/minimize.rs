use ahash::AHashMap;
use indexmap::IndexMap;

use crate::automaton::{
    Dfa, DfaTransition, Mealy, MealyTransition, Moore, MooreState, MooreTransition, State, Symbol,
};

/// The behavior of one state for a single refinement round: over its
/// transitions sorted by symbol, the index of the block containing each
/// target (`None` for a target outside the partition, which Mealy machines
/// permit), plus the emitted output for Mealy machines.
type Signature = Vec<(Symbol, Option<usize>, Option<Symbol>)>;

/// One refinement algorithm serves DFA, Mealy and Moore minimization; only
/// the initial partition and the per-state signature differ per kind.
///
/// Every round splits each block into sub-groups of identical signatures
/// (kept in first-seen order) and stops once no block splits. Termination is
/// guaranteed because a partition of a finite state set can only be refined
/// finitely often.
fn refine<F>(mut partitions: Vec<Vec<State>>, signature_of: F) -> Vec<Vec<State>>
where
    F: Fn(&State, &AHashMap<State, usize>) -> Signature,
{
    loop {
        let mut block_of: AHashMap<State, usize> = AHashMap::new();
        for (index, block) in partitions.iter().enumerate() {
            for state in block {
                block_of.insert(state.clone(), index);
            }
        }

        let mut next = Vec::new();
        let mut changed = false;

        for block in &partitions {
            if block.len() == 1 {
                next.push(block.clone());
                continue;
            }

            let mut groups: IndexMap<Signature, Vec<State>> = IndexMap::new();
            for state in block {
                groups
                    .entry(signature_of(state, &block_of))
                    .or_default()
                    .push(state.clone());
            }

            if groups.len() > 1 {
                changed = true;
            }
            next.extend(groups.into_values());
        }

        partitions = next;

        if !changed {
            return partitions;
        }
    }
}

/// Maps every state to the representative of its block: the first member
/// encountered in original input order.
fn state_mapping(partitions: &[Vec<State>]) -> AHashMap<State, State> {
    let mut mapping = AHashMap::new();

    for block in partitions {
        let representative = block[0].clone();
        for state in block {
            mapping.insert(state.clone(), representative.clone());
        }
    }

    mapping
}

/// Collapse equivalent DFA states.
///
/// The initial partition separates accepting from non-accepting states;
/// empty groups are omitted. The result is a fixed point: minimizing twice
/// yields the same machine.
pub fn minimize_dfa(dfa: &Dfa) -> Dfa {
    let accepting: Vec<State> = dfa
        .states()
        .iter()
        .filter(|s| dfa.is_accepting(s))
        .cloned()
        .collect();
    let rejecting: Vec<State> = dfa
        .states()
        .iter()
        .filter(|s| !dfa.is_accepting(s))
        .cloned()
        .collect();

    let initial: Vec<Vec<State>> = [accepting, rejecting]
        .into_iter()
        .filter(|block| !block.is_empty())
        .collect();

    if initial.is_empty() {
        return dfa.clone();
    }

    let partitions = refine(initial, |state, block_of| {
        let mut signature: Signature = dfa
            .transitions()
            .iter()
            .filter(|t| t.from() == state)
            .map(|t| (t.symbol().clone(), block_of.get(t.to()).copied(), None))
            .collect();
        signature.sort();
        signature
    });
    let mapping = state_mapping(&partitions);

    let mut states = Vec::new();
    let mut accepts = Vec::new();
    for state in dfa.states() {
        let renamed = mapping[state].clone();
        if !states.contains(&renamed) {
            if dfa.is_accepting(state) {
                accepts.push(renamed.clone());
            }
            states.push(renamed);
        }
    }

    let mut transitions: Vec<DfaTransition> = Vec::new();
    for transition in dfa.transitions() {
        let renamed = DfaTransition::new(
            mapping[transition.from()].clone(),
            mapping[transition.to()].clone(),
            transition.symbol().clone(),
        );
        if !transitions.contains(&renamed) {
            transitions.push(renamed);
        }
    }

    let start = mapping[dfa.start_state()].clone();

    Dfa::from_parts(states, start, accepts, transitions)
}

/// Collapse equivalent Mealy states.
///
/// The initial partition is a single block: the discriminating information
/// of a Mealy machine is carried by its transitions, not its states, so the
/// transition outputs enter through the signature instead.
pub fn minimize_mealy(machine: &Mealy) -> Mealy {
    if machine.states().is_empty() {
        return machine.clone();
    }

    let partitions = refine(vec![machine.states().to_vec()], |state, block_of| {
        let mut signature: Signature = machine
            .transitions()
            .iter()
            .filter(|t| t.from() == state)
            .map(|t| {
                (
                    t.input().clone(),
                    block_of.get(t.to()).copied(),
                    Some(t.output().clone()),
                )
            })
            .collect();
        signature.sort();
        signature
    });
    let mapping = state_mapping(&partitions);

    let mut states = Vec::new();
    for state in machine.states() {
        let renamed = mapping[state].clone();
        if !states.contains(&renamed) {
            states.push(renamed);
        }
    }

    // Endpoints outside the declared state list pass through unrenamed.
    let rename = |state: &State| mapping.get(state).unwrap_or(state).clone();

    let mut transitions: Vec<MealyTransition> = Vec::new();
    for transition in machine.transitions() {
        let renamed = MealyTransition::new(
            rename(transition.from()),
            rename(transition.to()),
            transition.input().clone(),
            transition.output().clone(),
        );
        if !transitions.contains(&renamed) {
            transitions.push(renamed);
        }
    }

    Mealy::new(states, transitions)
}

/// Collapse equivalent Moore states.
///
/// The initial partition groups states by their output label, in first-seen
/// order of the outputs.
pub fn minimize_moore(machine: &Moore) -> Moore {
    if machine.states().is_empty() {
        return machine.clone();
    }

    let mut by_output: IndexMap<Symbol, Vec<State>> = IndexMap::new();
    for state in machine.states() {
        by_output
            .entry(state.output().clone())
            .or_default()
            .push(state.name().clone());
    }

    let partitions = refine(by_output.into_values().collect(), |state, block_of| {
        let mut signature: Signature = machine
            .transitions()
            .iter()
            .filter(|t| t.from() == state)
            .map(|t| (t.input().clone(), block_of.get(t.to()).copied(), None))
            .collect();
        signature.sort();
        signature
    });
    let mapping = state_mapping(&partitions);

    let mut states: Vec<MooreState> = Vec::new();
    for state in machine.states() {
        let renamed = mapping[state.name()].clone();
        if !states.iter().any(|s| s.name() == &renamed) {
            states.push(MooreState::new(renamed, state.output().clone()));
        }
    }

    let mut transitions: Vec<MooreTransition> = Vec::new();
    for transition in machine.transitions() {
        let renamed = MooreTransition::new(
            mapping[transition.from()].clone(),
            mapping[transition.to()].clone(),
            transition.input().clone(),
        );
        if !transitions.contains(&renamed) {
            transitions.push(renamed);
        }
    }

    Moore::from_parts(states, transitions)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state(name: &str) -> State {
        State::new(name)
    }

    fn symbol(text: &str) -> Symbol {
        Symbol::new(text)
    }

    fn moore_state(name: &str, output: &str) -> MooreState {
        MooreState::new(state(name), symbol(output))
    }

    fn moore_transition(from: &str, to: &str, input: &str) -> MooreTransition {
        MooreTransition::new(state(from), state(to), symbol(input))
    }

    fn mealy_transition(from: &str, to: &str, input: &str, output: &str) -> MealyTransition {
        MealyTransition::new(state(from), state(to), symbol(input), symbol(output))
    }

    fn symmetric_moore() -> Moore {
        Moore::new(
            vec![
                moore_state("S1", "w1"),
                moore_state("S2", "w1"),
                moore_state("S3", "w2"),
                moore_state("S4", "w2"),
            ],
            vec![
                moore_transition("S1", "S3", "0"),
                moore_transition("S1", "S4", "1"),
                moore_transition("S2", "S3", "0"),
                moore_transition("S2", "S4", "1"),
                moore_transition("S3", "S1", "0"),
                moore_transition("S3", "S2", "1"),
                moore_transition("S4", "S1", "0"),
                moore_transition("S4", "S2", "1"),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_moore_collapses_output_classes() {
        let result = minimize_moore(&symmetric_moore());

        assert_eq!(
            result.states(),
            &[moore_state("S1", "w1"), moore_state("S3", "w2")],
        );
        assert_eq!(
            result.transitions(),
            &[
                moore_transition("S1", "S3", "0"),
                moore_transition("S1", "S3", "1"),
                moore_transition("S3", "S1", "0"),
                moore_transition("S3", "S1", "1"),
            ],
        );
    }

    #[test]
    fn test_moore_distinct_outputs_stay_apart() {
        let machine = Moore::new(
            vec![
                moore_state("S1", "w1"),
                moore_state("S2", "w2"),
                moore_state("S3", "w3"),
            ],
            vec![
                moore_transition("S1", "S2", "0"),
                moore_transition("S2", "S3", "0"),
                moore_transition("S3", "S1", "0"),
            ],
        )
        .unwrap();

        let result = minimize_moore(&machine);

        assert_eq!(result, machine);
    }

    #[test]
    fn test_mealy_collapses_to_single_state() {
        let machine = Mealy::new(
            vec![
                state("S1"),
                state("S2"),
                state("S3"),
                state("S4"),
                state("S5"),
            ],
            vec![
                mealy_transition("S1", "S2", "0", "w1"),
                mealy_transition("S1", "S3", "1", "w2"),
                mealy_transition("S2", "S4", "0", "w1"),
                mealy_transition("S2", "S5", "1", "w2"),
                mealy_transition("S3", "S4", "0", "w1"),
                mealy_transition("S3", "S5", "1", "w2"),
                mealy_transition("S4", "S4", "0", "w1"),
                mealy_transition("S4", "S5", "1", "w2"),
                mealy_transition("S5", "S4", "0", "w1"),
                mealy_transition("S5", "S5", "1", "w2"),
            ],
        );

        let result = minimize_mealy(&machine);

        assert_eq!(result.states(), &[state("S1")]);
        assert_eq!(
            result.transitions(),
            &[
                mealy_transition("S1", "S1", "0", "w1"),
                mealy_transition("S1", "S1", "1", "w2"),
            ],
        );
    }

    #[test]
    fn test_mealy_differing_outputs_stay_apart() {
        let machine = Mealy::new(
            vec![state("S1"), state("S2"), state("S3")],
            vec![
                mealy_transition("S1", "S2", "0", "w1"),
                mealy_transition("S2", "S3", "0", "w2"),
                mealy_transition("S3", "S1", "0", "w3"),
            ],
        );

        assert_eq!(minimize_mealy(&machine), machine);
    }

    #[test]
    fn test_minimize_is_a_fixed_point() {
        let once = minimize_moore(&symmetric_moore());
        let twice = minimize_moore(&once);
        assert_eq!(once, twice);

        assert!(once.states().len() <= symmetric_moore().states().len());
    }

    #[test]
    fn test_dfa_merges_indistinguishable_accepts() {
        // q0 -a-> q1, q0 -b-> q2, both accepting without successors.
        let dfa = Dfa::new(
            vec![state("q0"), state("q1"), state("q2")],
            state("q0"),
            vec![state("q1"), state("q2")],
            vec![
                DfaTransition::new(state("q0"), state("q1"), symbol("a")),
                DfaTransition::new(state("q0"), state("q2"), symbol("b")),
            ],
        )
        .unwrap();

        let result = minimize_dfa(&dfa);

        assert_eq!(result.states().len(), 2);
        assert_eq!(result.start_state(), &state("q0"));
        assert_eq!(result.accept_states(), &[state("q1")]);
        assert_eq!(
            result.transitions(),
            &[
                DfaTransition::new(state("q0"), state("q1"), symbol("a")),
                DfaTransition::new(state("q0"), state("q1"), symbol("b")),
            ],
        );
    }
}
