use crate::automaton::{Nfa, NfaTransition, State, StateNamer, Symbol};
use crate::regex::RegexAst;

fn epsilon(from: State, to: State) -> NfaTransition {
    NfaTransition::new(from, to, None)
}

fn build_char(c: char, namer: &mut StateNamer) -> Nfa {
    let start = namer.fresh();
    let accept = namer.fresh();

    Nfa::from_parts(
        vec![start.clone(), accept.clone()],
        start.clone(),
        vec![accept.clone()],
        vec![NfaTransition::new(
            start,
            accept,
            Some(Symbol::new(c.to_string())),
        )],
    )
}

fn build_concat(first: Nfa, second: Nfa) -> Nfa {
    let mut transitions = first.transitions().to_vec();
    transitions.extend_from_slice(second.transitions());

    /* Join every accept of the first fragment to the second's start. */
    for accept in first.accept_states() {
        transitions.push(epsilon(accept.clone(), second.start_state().clone()));
    }

    let mut states = first.states().to_vec();
    states.extend_from_slice(second.states());

    Nfa::from_parts(
        states,
        first.start_state().clone(),
        second.accept_states().to_vec(),
        transitions,
    )
}

fn build_union(left: Nfa, right: Nfa, namer: &mut StateNamer) -> Nfa {
    let start = namer.fresh();
    let accept = namer.fresh();

    let mut transitions = left.transitions().to_vec();
    transitions.extend_from_slice(right.transitions());

    transitions.push(epsilon(start.clone(), left.start_state().clone()));
    transitions.push(epsilon(start.clone(), right.start_state().clone()));

    for fragment_accept in left.accept_states().iter().chain(right.accept_states()) {
        transitions.push(epsilon(fragment_accept.clone(), accept.clone()));
    }

    let mut states = vec![start.clone(), accept.clone()];
    states.extend_from_slice(left.states());
    states.extend_from_slice(right.states());

    Nfa::from_parts(states, start, vec![accept], transitions)
}

/// A star whose body is a single symbol needs no epsilon machinery: one
/// state with a self-loop accepts the same language.
fn build_star_simple(c: char, namer: &mut StateNamer) -> Nfa {
    let state = namer.fresh();

    Nfa::from_parts(
        vec![state.clone()],
        state.clone(),
        vec![state.clone()],
        vec![NfaTransition::new(
            state.clone(),
            state,
            Some(Symbol::new(c.to_string())),
        )],
    )
}

fn build_star(body: Nfa, namer: &mut StateNamer) -> Nfa {
    let start = namer.fresh();
    let accept = namer.fresh();

    let mut transitions = body.transitions().to_vec();

    // Into the body, back around for the loop, and straight through for
    // zero repetitions.
    transitions.push(epsilon(start.clone(), body.start_state().clone()));
    for body_accept in body.accept_states() {
        transitions.push(epsilon(body_accept.clone(), start.clone()));
    }
    transitions.push(epsilon(start.clone(), accept.clone()));

    let mut states = vec![start.clone(), accept.clone()];
    states.extend_from_slice(body.states());

    Nfa::from_parts(states, start, vec![accept], transitions)
}

fn build(node: &RegexAst, namer: &mut StateNamer) -> Nfa {
    match node {
        RegexAst::Char(c) => build_char(*c, namer),
        RegexAst::Concat(left, right) => {
            let first = build(left, namer);
            let second = build(right, namer);
            build_concat(first, second)
        },
        RegexAst::Union(left, right) => {
            let first = build(left, namer);
            let second = build(right, namer);
            build_union(first, second, namer)
        },
        RegexAst::Star(body) => match body.as_ref() {
            RegexAst::Char(c) => build_star_simple(*c, namer),
            other => {
                let fragment = build(other, namer);
                build_star(fragment, namer)
            },
        },
    }
}

/// Construct an NFA with epsilon transitions from a regex AST via the
/// Thompson construction, with a fresh namer so the states are `q0`, `q1`,
/// ...
pub fn to_nfa(ast: &RegexAst) -> Nfa {
    let mut namer = StateNamer::new();
    to_nfa_with(ast, &mut namer)
}

/// Like [`to_nfa`] but threading an external [`StateNamer`], so several
/// constructions can share one name space.
pub fn to_nfa_with(ast: &RegexAst, namer: &mut StateNamer) -> Nfa {
    build(ast, namer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::regex::parse;

    fn accepts(nfa: &Nfa, word: &str) -> bool {
        use crate::automaton::{determinize_nfa, Dfa};

        fn run(dfa: &Dfa, word: &str) -> bool {
            let mut current = dfa.start_state().clone();
            for c in word.chars() {
                let next = dfa.transitions().iter().find(|t| {
                    t.from() == &current && t.symbol() == &Symbol::new(c.to_string())
                });
                match next {
                    Some(t) => current = t.to().clone(),
                    None => return false,
                }
            }
            dfa.accept_states().contains(&current)
        }

        run(&determinize_nfa(nfa), word)
    }

    #[test]
    fn test_char_yields_two_states() {
        let nfa = to_nfa(&parse("a").unwrap());
        assert_eq!(nfa.states().len(), 2);
        assert_eq!(nfa.transitions().len(), 1);
        assert_eq!(nfa.transitions()[0].symbol(), Some(&Symbol::new("a")));
    }

    #[test]
    fn test_star_over_symbol_is_a_self_loop() {
        let nfa = to_nfa(&parse("a*").unwrap());
        assert_eq!(nfa.states().len(), 1);
        assert_eq!(nfa.transitions().len(), 1);
        assert_eq!(nfa.start_state(), &State::new("q0"));
        assert_eq!(nfa.accept_states(), &[State::new("q0")]);
    }

    #[test]
    fn test_union_language() {
        let nfa = to_nfa(&parse("a|b").unwrap());
        assert!(accepts(&nfa, "a"));
        assert!(accepts(&nfa, "b"));
        assert!(!accepts(&nfa, ""));
        assert!(!accepts(&nfa, "ab"));
    }

    #[test]
    fn test_concat_and_star_language() {
        let nfa = to_nfa(&parse("ad(b|c)*").unwrap());
        assert!(accepts(&nfa, "ad"));
        assert!(accepts(&nfa, "adbcbcbc"));
        assert!(!accepts(&nfa, "a"));
        assert!(!accepts(&nfa, "adba"));
        assert!(!accepts(&nfa, "adbcca"));
    }

    #[test]
    fn test_compound_star_accepts_zero_repetitions() {
        let nfa = to_nfa(&parse("(ab)*").unwrap());
        assert!(accepts(&nfa, ""));
        assert!(accepts(&nfa, "ab"));
        assert!(accepts(&nfa, "abab"));
        assert!(!accepts(&nfa, "aba"));
    }

    #[test]
    fn test_namer_is_threaded_not_global() {
        let mut namer = StateNamer::new();
        let first = to_nfa_with(&parse("a").unwrap(), &mut namer);
        let second = to_nfa_with(&parse("b").unwrap(), &mut namer);

        // Both fragments draw from the same counter, so no state collides.
        assert!(first.states().iter().all(|s| !second.states().contains(s)));
    }
}
