use crate::automaton::{
    Dfa, Mealy, MealyTransition, Moore, MooreState, MooreTransition, Nfa, State, Symbol,
};
use crate::error::SyntaxError;

struct DotNode {
    id: String,
    label: Option<String>,
}

struct DotEdge {
    from: String,
    to: String,
    label: Option<String>,
}

struct DotGraph {
    nodes: Vec<DotNode>,
    edges: Vec<DotEdge>,
}

/// A state machine parsed from graph notation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Machine {
    /// The edge labels carried `input/output` pairs
    Mealy(Mealy),
    /// The node labels carried `name / output` pairs
    Moore(Moore),
}

fn parse_label(rest: &str) -> Option<String> {
    let idx = rest.find("label")?;
    let after = rest[idx + "label".len()..].trim_start();
    let after = after.strip_prefix('=')?;
    let start = after.find('"')? + 1;
    let end = start + after[start..].find('"')?;
    Some(after[start..end].to_string())
}

fn identifier(line: &str) -> (String, &str) {
    let end = line
        .find(|c: char| !(c.is_alphanumeric() || c == '_'))
        .unwrap_or(line.len());
    (line[..end].to_string(), &line[end..])
}

fn parse_dot(text: &str) -> Result<DotGraph, SyntaxError> {
    let mut lines = text.lines().map(str::trim).filter(|line| !line.is_empty());

    let header = lines.next().unwrap_or("");
    let valid_header = (header.starts_with("digraph") || header.starts_with("graph"))
        && header.ends_with('{');
    if !valid_header {
        return Err(SyntaxError::InvalidHeader {
            line: header.to_string(),
        });
    }

    let mut nodes = Vec::new();
    let mut edges = Vec::new();

    for line in lines {
        if line.starts_with("//") || line.starts_with('}') {
            continue;
        }

        let (first, rest) = identifier(line);
        if first.is_empty() {
            continue;
        }

        if let Some(after_arrow) = rest.trim_start().strip_prefix("->") {
            let (second, attributes) = identifier(after_arrow.trim_start());
            if second.is_empty() {
                continue;
            }
            edges.push(DotEdge {
                from: first,
                to: second,
                label: parse_label(attributes),
            });
        } else if let Some(label) = parse_label(rest) {
            /* Unlabeled node lines (shape-only declarations and the start
             * marker) carry no machine content and are skipped. */
            nodes.push(DotNode {
                id: first,
                label: Some(label),
            });
        }
    }

    Ok(DotGraph { nodes, edges })
}

fn label_has_slash(label: &Option<String>) -> bool {
    label.as_deref().is_some_and(|l| l.contains('/'))
}

fn mealy_from(graph: &DotGraph) -> Mealy {
    let states: Vec<State> = graph
        .nodes
        .iter()
        .map(|n| State::new(n.id.as_str()))
        .collect();

    let transitions: Vec<MealyTransition> = graph
        .edges
        .iter()
        .filter_map(|edge| {
            let label = edge.label.as_deref()?;
            let (input, output) = label.split_once('/')?;
            Some(MealyTransition::new(
                State::new(edge.from.as_str()),
                State::new(edge.to.as_str()),
                Symbol::new(input.trim()),
                Symbol::new(output.trim()),
            ))
        })
        .collect();

    Mealy::new(states, transitions)
}

fn moore_from(graph: &DotGraph) -> Moore {
    let mut states: Vec<MooreState> = graph
        .nodes
        .iter()
        .map(|node| match node.label.as_deref().and_then(|l| l.split_once('/')) {
            Some((name, output)) => {
                MooreState::new(State::new(name.trim()), Symbol::new(output.trim()))
            },
            None => MooreState::new(State::new(node.id.as_str()), Symbol::new("")),
        })
        .collect();

    let transitions: Vec<MooreTransition> = graph
        .edges
        .iter()
        .map(|edge| {
            MooreTransition::new(
                State::new(edge.from.as_str()),
                State::new(edge.to.as_str()),
                Symbol::new(edge.label.as_deref().unwrap_or("")),
            )
        })
        .collect();

    /* Endpoints that never got a node line are declared with an empty
     * output, so the machine invariant holds for sloppy inputs. */
    for transition in &transitions {
        for endpoint in [transition.from(), transition.to()] {
            if !states.iter().any(|s| s.name() == endpoint) {
                states.push(MooreState::new(endpoint.clone(), Symbol::new("")));
            }
        }
    }

    Moore::from_parts(states, transitions)
}

/// Parse a machine from graph notation, detecting its kind: a `/` in any
/// edge label means Mealy, otherwise a `/` in any node label means Moore,
/// and a machine without outputs defaults to Mealy.
pub fn parse_machine(text: &str) -> Result<Machine, SyntaxError> {
    let graph = parse_dot(text)?;

    if graph.edges.iter().any(|e| label_has_slash(&e.label)) {
        Ok(Machine::Mealy(mealy_from(&graph)))
    } else if graph.nodes.iter().any(|n| label_has_slash(&n.label)) {
        Ok(Machine::Moore(moore_from(&graph)))
    } else {
        Ok(Machine::Mealy(mealy_from(&graph)))
    }
}

/// Render a Mealy machine in graph notation with `input/output` edge labels.
pub fn render_mealy(machine: &Mealy) -> String {
    let mut dot = String::from("digraph MealyMachine {\n");

    for state in machine.states() {
        dot.push_str(&format!("  {} [label=\"{}\"];\n", state, state));
    }

    dot.push('\n');

    for t in machine.transitions() {
        dot.push_str(&format!(
            "  {} -> {} [label=\"{}/{}\"];\n",
            t.from(),
            t.to(),
            t.input(),
            t.output(),
        ));
    }

    dot.push('}');
    dot
}

/// Render a Moore machine in graph notation with `name / output` node
/// labels.
pub fn render_moore(machine: &Moore) -> String {
    let mut dot = String::from("digraph MooreMachine {\n");

    for state in machine.states() {
        dot.push_str(&format!(
            "  {} [label=\"{} / {}\"];\n",
            state.name(),
            state.name(),
            state.output(),
        ));
    }

    dot.push('\n');

    for t in machine.transitions() {
        dot.push_str(&format!(
            "  {} -> {} [label=\"{}\"];\n",
            t.from(),
            t.to(),
            t.input(),
        ));
    }

    dot.push('}');
    dot
}

/// Render an NFA in graph notation; epsilon transitions are labeled `e`.
pub fn render_nfa(nfa: &Nfa) -> String {
    let mut dot = String::from("digraph NFA {\n  rankdir=LR;\n  node [shape=circle];\n");

    dot.push_str(&format!(
        "  start [shape=point];\n  start -> {};\n",
        nfa.start_state(),
    ));

    for accept in nfa.accept_states() {
        dot.push_str(&format!("  {} [shape=doublecircle];\n", accept));
    }

    for t in nfa.transitions() {
        let label = match t.symbol() {
            Some(symbol) => symbol.text(),
            None => "e",
        };
        dot.push_str(&format!("  {} -> {} [label=\"{}\"];\n", t.from(), t.to(), label));
    }

    dot.push_str("}\n");
    dot
}

/// Render a DFA in graph notation.
pub fn render_dfa(dfa: &Dfa) -> String {
    let mut dot = String::from("digraph DFA {\n  rankdir=LR;\n  node [shape=circle];\n");

    dot.push_str(&format!(
        "  start [shape=point];\n  start -> {};\n",
        dfa.start_state(),
    ));

    for accept in dfa.accept_states() {
        dot.push_str(&format!("  {} [shape=doublecircle];\n", accept));
    }

    for t in dfa.transitions() {
        dot.push_str(&format!(
            "  {} -> {} [label=\"{}\"];\n",
            t.from(),
            t.to(),
            t.symbol(),
        ));
    }

    dot.push_str("}\n");
    dot
}
