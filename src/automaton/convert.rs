use indexmap::IndexSet;

use crate::automaton::{
    Mealy, MealyTransition, Moore, MooreState, MooreTransition, State, Symbol,
};

fn paired_state(state: &State, output: &Symbol) -> State {
    State::new(format!("{}_{}", state.name(), output.text()))
}

/// Translate a Mealy machine into a Moore machine.
///
/// Every transition pairs both of its endpoints with the transition's output;
/// each distinct (state, output) pair becomes one Moore state, produced in
/// first-seen order, and the output moves from the edge into the state. A
/// Mealy state observed with two different outputs deliberately yields two
/// distinct Moore states: that is the defining difference between the two
/// models, not a merge opportunity.
pub fn mealy_to_moore(machine: &Mealy) -> Moore {
    let mut pairs: IndexSet<(State, Symbol)> = IndexSet::new();

    for transition in machine.transitions() {
        pairs.insert((transition.from().clone(), transition.output().clone()));
        pairs.insert((transition.to().clone(), transition.output().clone()));
    }

    let states: Vec<MooreState> = pairs
        .iter()
        .map(|(state, output)| MooreState::new(paired_state(state, output), output.clone()))
        .collect();

    let transitions: Vec<MooreTransition> = machine
        .transitions()
        .iter()
        .map(|t| {
            MooreTransition::new(
                paired_state(t.from(), t.output()),
                paired_state(t.to(), t.output()),
                t.input().clone(),
            )
        })
        .collect();

    Moore::from_parts(states, transitions)
}

/// Translate a Moore machine into a Mealy machine.
///
/// State names pass through unchanged; each Mealy transition takes its
/// output from the Moore *target* state, because Moore output is associated
/// with entering a state.
pub fn moore_to_mealy(machine: &Moore) -> Mealy {
    let states: Vec<State> = machine.states().iter().map(|s| s.name().clone()).collect();

    let transitions: Vec<MealyTransition> = machine
        .transitions()
        .iter()
        .map(|t| {
            // Endpoints of a Moore machine are declared by construction.
            let output = machine.output_of(t.to()).unwrap().clone();
            MealyTransition::new(t.from().clone(), t.to().clone(), t.input().clone(), output)
        })
        .collect();

    Mealy::new(states, transitions)
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

    fn mealy_transition(from: &str, to: &str, input: &str, output: &str) -> MealyTransition {
        MealyTransition::new(state(from), state(to), symbol(input), symbol(output))
    }

    #[test]
    fn test_mealy_to_moore_pairs_states_with_outputs() {
        let machine = Mealy::new(
            vec![state("S1"), state("S2"), state("S3"), state("S4")],
            vec![
                mealy_transition("S1", "S3", "1", "w1"),
                mealy_transition("S1", "S2", "2", "w1"),
                mealy_transition("S2", "S3", "1", "w2"),
                mealy_transition("S3", "S4", "1", "w2"),
            ],
        );

        let moore = mealy_to_moore(&machine);

        let names: Vec<&str> = moore.states().iter().map(|s| s.name().name()).collect();
        assert_eq!(
            names,
            vec!["S1_w1", "S3_w1", "S2_w1", "S2_w2", "S3_w2", "S4_w2"],
        );

        // S3 is observed under w1 and under w2 and must appear twice.
        assert_eq!(moore.output_of(&state("S3_w1")), Some(&symbol("w1")));
        assert_eq!(moore.output_of(&state("S3_w2")), Some(&symbol("w2")));

        assert_eq!(
            moore.transitions(),
            &[
                MooreTransition::new(state("S1_w1"), state("S3_w1"), symbol("1")),
                MooreTransition::new(state("S1_w1"), state("S2_w1"), symbol("2")),
                MooreTransition::new(state("S2_w2"), state("S3_w2"), symbol("1")),
                MooreTransition::new(state("S3_w2"), state("S4_w2"), symbol("1")),
            ],
        );
    }

    #[test]
    fn test_moore_to_mealy_takes_target_output() {
        let moore = Moore::new(
            vec![
                MooreState::new(state("S1"), symbol("w1")),
                MooreState::new(state("S2"), symbol("w2")),
            ],
            vec![
                MooreTransition::new(state("S1"), state("S2"), symbol("a")),
                MooreTransition::new(state("S2"), state("S1"), symbol("b")),
            ],
        )
        .unwrap();

        let mealy = moore_to_mealy(&moore);

        assert_eq!(mealy.states(), &[state("S1"), state("S2")]);
        assert_eq!(
            mealy.transitions(),
            &[
                mealy_transition("S1", "S2", "a", "w2"),
                mealy_transition("S2", "S1", "b", "w1"),
            ],
        );
    }

    #[test]
    fn test_round_trip_preserves_output_behavior() {
        // Outputs agree along every path, so the pairing construction keeps
        // the reachable run structure intact.
        let machine = Mealy::new(
            vec![state("A"), state("B"), state("C")],
            vec![
                mealy_transition("A", "B", "x", "w"),
                mealy_transition("B", "C", "y", "w"),
                mealy_transition("C", "A", "x", "w"),
                mealy_transition("A", "A", "y", "w"),
            ],
        );

        let round = moore_to_mealy(&mealy_to_moore(&machine));

        // State names differ, the (input, output) sequences do not: drive
        // both machines along the same input word from their initial states.
        let run = |m: &Mealy, inputs: &[&str]| -> Vec<Symbol> {
            let mut current = m.initial_state().unwrap().clone();
            let mut outputs = Vec::new();
            for input in inputs {
                let t = m
                    .transitions()
                    .iter()
                    .find(|t| t.from() == &current && t.input() == &symbol(input))
                    .unwrap();
                outputs.push(t.output().clone());
                current = t.to().clone();
            }
            outputs
        };

        let word = ["x", "y", "x", "y", "y", "x"];
        assert_eq!(run(&machine, &word), run(&round, &word));
    }
}
