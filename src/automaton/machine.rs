use std::fmt::{Display, Formatter, Result as FmtResult};

use crate::error::SemanticError;

/// An opaque state identifier. States are compared by name only and carry no
/// meaning beyond debugging output.
#[derive(Debug, Clone, Eq, Hash, PartialEq, Ord, PartialOrd)]
pub struct State(String);

impl State {
    /// Create a state from its name.
    pub fn new<S: Into<String>>(s: S) -> Self {
        Self(s.into())
    }

    /// The name of this state.
    pub fn name(&self) -> &str {
        &self.0
    }
}

impl Display for State {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}", self.0)
    }
}

/// An atomic input or output label, compared by equality.
#[derive(Debug, Clone, Eq, Hash, PartialEq, Ord, PartialOrd)]
pub struct Symbol(String);

impl Symbol {
    /// Create a symbol from its textual form.
    pub fn new<S: Into<String>>(s: S) -> Self {
        Self(s.into())
    }

    /// The textual form of this symbol.
    pub fn text(&self) -> &str {
        &self.0
    }
}

impl Display for Symbol {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}", self.0)
    }
}

/// Mints fresh state names `q0`, `q1`, ...
///
/// The counter is an explicit value threaded through constructions instead of
/// ambient global state, so every construction is reentrant and testable in
/// isolation.
#[derive(Debug, Default)]
pub struct StateNamer {
    next: usize,
}

impl StateNamer {
    /// Create a namer starting at `q0`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Mint the next unused state.
    pub fn fresh(&mut self) -> State {
        let state = State::new(format!("q{}", self.next));
        self.next += 1;
        state
    }
}

/// A transition of a nondeterministic automaton. `symbol` is `None` for an
/// epsilon transition.
#[derive(Debug, Clone, Eq, Hash, PartialEq)]
pub struct NfaTransition {
    from: State,
    to: State,
    symbol: Option<Symbol>,
}

impl NfaTransition {
    /// Create a transition. Pass `None` as `symbol` for an epsilon transition.
    pub fn new(from: State, to: State, symbol: Option<Symbol>) -> Self {
        Self { from, to, symbol }
    }

    /// Source state.
    pub fn from(&self) -> &State {
        &self.from
    }

    /// Target state.
    pub fn to(&self) -> &State {
        &self.to
    }

    /// Consumed symbol, `None` for epsilon.
    pub fn symbol(&self) -> Option<&Symbol> {
        self.symbol.as_ref()
    }
}

/// A nondeterministic finite automaton with epsilon transitions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Nfa {
    states: Vec<State>,
    start: State,
    accepts: Vec<State>,
    transitions: Vec<NfaTransition>,
}

impl Nfa {
    /// Create an NFA, checking that the start state, the accept states and
    /// every transition endpoint are members of the state list.
    pub fn new(
        states: Vec<State>,
        start: State,
        accepts: Vec<State>,
        transitions: Vec<NfaTransition>,
    ) -> Result<Self, SemanticError> {
        let undeclared = |state: &State| SemanticError::UndeclaredState {
            state: state.name().to_string(),
        };

        if !states.contains(&start) {
            return Err(undeclared(&start));
        }

        for accept in &accepts {
            if !states.contains(accept) {
                return Err(undeclared(accept));
            }
        }

        for transition in &transitions {
            if !states.contains(transition.from()) {
                return Err(undeclared(transition.from()));
            }
            if !states.contains(transition.to()) {
                return Err(undeclared(transition.to()));
            }
        }

        Ok(Self::from_parts(states, start, accepts, transitions))
    }

    pub(crate) fn from_parts(
        states: Vec<State>,
        start: State,
        accepts: Vec<State>,
        transitions: Vec<NfaTransition>,
    ) -> Self {
        Self {
            states,
            start,
            accepts,
            transitions,
        }
    }

    /// All states in declaration order.
    pub fn states(&self) -> &[State] {
        &self.states
    }

    /// The start state.
    pub fn start_state(&self) -> &State {
        &self.start
    }

    /// The accept states.
    pub fn accept_states(&self) -> &[State] {
        &self.accepts
    }

    /// All transitions.
    pub fn transitions(&self) -> &[NfaTransition] {
        &self.transitions
    }
}

/// A transition of a deterministic automaton.
#[derive(Debug, Clone, Eq, Hash, PartialEq)]
pub struct DfaTransition {
    from: State,
    to: State,
    symbol: Symbol,
}

impl DfaTransition {
    /// Create a transition.
    pub fn new(from: State, to: State, symbol: Symbol) -> Self {
        Self { from, to, symbol }
    }

    /// Source state.
    pub fn from(&self) -> &State {
        &self.from
    }

    /// Target state.
    pub fn to(&self) -> &State {
        &self.to
    }

    /// Consumed symbol.
    pub fn symbol(&self) -> &Symbol {
        &self.symbol
    }
}

/// A deterministic finite automaton: at most one transition per
/// (state, symbol) pair and no epsilon transitions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dfa {
    states: Vec<State>,
    start: State,
    accepts: Vec<State>,
    transitions: Vec<DfaTransition>,
}

impl Dfa {
    /// Create a DFA, checking membership of all referenced states and that no
    /// (state, symbol) pair has more than one outgoing transition.
    pub fn new(
        states: Vec<State>,
        start: State,
        accepts: Vec<State>,
        transitions: Vec<DfaTransition>,
    ) -> Result<Self, SemanticError> {
        let undeclared = |state: &State| SemanticError::UndeclaredState {
            state: state.name().to_string(),
        };

        if !states.contains(&start) {
            return Err(undeclared(&start));
        }

        for accept in &accepts {
            if !states.contains(accept) {
                return Err(undeclared(accept));
            }
        }

        let mut seen = ahash::AHashSet::new();
        for transition in &transitions {
            if !states.contains(transition.from()) {
                return Err(undeclared(transition.from()));
            }
            if !states.contains(transition.to()) {
                return Err(undeclared(transition.to()));
            }
            if !seen.insert((transition.from().clone(), transition.symbol().clone())) {
                return Err(SemanticError::NotDeterministic {
                    state: transition.from().name().to_string(),
                    symbol: transition.symbol().text().to_string(),
                });
            }
        }

        Ok(Self::from_parts(states, start, accepts, transitions))
    }

    pub(crate) fn from_parts(
        states: Vec<State>,
        start: State,
        accepts: Vec<State>,
        transitions: Vec<DfaTransition>,
    ) -> Self {
        Self {
            states,
            start,
            accepts,
            transitions,
        }
    }

    /// All states in declaration order.
    pub fn states(&self) -> &[State] {
        &self.states
    }

    /// The start state.
    pub fn start_state(&self) -> &State {
        &self.start
    }

    /// The accept states.
    pub fn accept_states(&self) -> &[State] {
        &self.accepts
    }

    /// All transitions.
    pub fn transitions(&self) -> &[DfaTransition] {
        &self.transitions
    }

    /// Whether `state` is an accept state.
    pub fn is_accepting(&self, state: &State) -> bool {
        self.accepts.contains(state)
    }
}

/// A transition of a Mealy machine: the output is attached to the transition.
#[derive(Debug, Clone, Eq, Hash, PartialEq)]
pub struct MealyTransition {
    from: State,
    to: State,
    input: Symbol,
    output: Symbol,
}

impl MealyTransition {
    /// Create a transition.
    pub fn new(from: State, to: State, input: Symbol, output: Symbol) -> Self {
        Self {
            from,
            to,
            input,
            output,
        }
    }

    /// Source state.
    pub fn from(&self) -> &State {
        &self.from
    }

    /// Target state.
    pub fn to(&self) -> &State {
        &self.to
    }

    /// Consumed input symbol.
    pub fn input(&self) -> &Symbol {
        &self.input
    }

    /// Emitted output symbol.
    pub fn output(&self) -> &Symbol {
        &self.output
    }
}

/// A Mealy machine. The first listed state is the designated initial state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mealy {
    states: Vec<State>,
    transitions: Vec<MealyTransition>,
}

impl Mealy {
    /// Create a Mealy machine.
    pub fn new(states: Vec<State>, transitions: Vec<MealyTransition>) -> Self {
        Self {
            states,
            transitions,
        }
    }

    /// All states in declaration order.
    pub fn states(&self) -> &[State] {
        &self.states
    }

    /// All transitions.
    pub fn transitions(&self) -> &[MealyTransition] {
        &self.transitions
    }

    /// The designated initial state, if any state is declared.
    pub fn initial_state(&self) -> Option<&State> {
        self.states.first()
    }

    /// Whether at most one transition leaves each state per input symbol.
    pub fn is_deterministic(&self) -> bool {
        let mut seen = ahash::AHashSet::new();

        for transition in &self.transitions {
            if !seen.insert((transition.from(), transition.input())) {
                return false;
            }
        }

        true
    }
}

/// A state of a Moore machine carrying its output label.
#[derive(Debug, Clone, Eq, Hash, PartialEq)]
pub struct MooreState {
    name: State,
    output: Symbol,
}

impl MooreState {
    /// Create a state with its output.
    pub fn new(name: State, output: Symbol) -> Self {
        Self { name, output }
    }

    /// The state identifier.
    pub fn name(&self) -> &State {
        &self.name
    }

    /// The output emitted upon entering this state.
    pub fn output(&self) -> &Symbol {
        &self.output
    }
}

/// A transition of a Moore machine: only the input label travels on the edge.
#[derive(Debug, Clone, Eq, Hash, PartialEq)]
pub struct MooreTransition {
    from: State,
    to: State,
    input: Symbol,
}

impl MooreTransition {
    /// Create a transition.
    pub fn new(from: State, to: State, input: Symbol) -> Self {
        Self { from, to, input }
    }

    /// Source state.
    pub fn from(&self) -> &State {
        &self.from
    }

    /// Target state.
    pub fn to(&self) -> &State {
        &self.to
    }

    /// Consumed input symbol.
    pub fn input(&self) -> &Symbol {
        &self.input
    }
}

/// A Moore machine: outputs are attached to states.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Moore {
    states: Vec<MooreState>,
    transitions: Vec<MooreTransition>,
}

impl Moore {
    /// Create a Moore machine, checking that every transition endpoint
    /// references a declared state.
    pub fn new(
        states: Vec<MooreState>,
        transitions: Vec<MooreTransition>,
    ) -> Result<Self, SemanticError> {
        let declared = |state: &State| states.iter().any(|s| s.name() == state);

        for transition in &transitions {
            for endpoint in [transition.from(), transition.to()] {
                if !declared(endpoint) {
                    return Err(SemanticError::UndeclaredState {
                        state: endpoint.name().to_string(),
                    });
                }
            }
        }

        Ok(Self::from_parts(states, transitions))
    }

    pub(crate) fn from_parts(states: Vec<MooreState>, transitions: Vec<MooreTransition>) -> Self {
        Self {
            states,
            transitions,
        }
    }

    /// All states in declaration order.
    pub fn states(&self) -> &[MooreState] {
        &self.states
    }

    /// All transitions.
    pub fn transitions(&self) -> &[MooreTransition] {
        &self.transitions
    }

    /// The output of the state named `state`.
    pub fn output_of(&self, state: &State) -> Option<&Symbol> {
        self.states
            .iter()
            .find(|s| s.name() == state)
            .map(|s| s.output())
    }
}
