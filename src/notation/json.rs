use indexmap::IndexSet;
use json_comments::{CommentSettings, StripComments};
use serde::ser::Serialize;
use serde_json::{json, ser::PrettyFormatter, Serializer, Value};

use crate::error::SyntaxError;
use crate::grammar::{Grammar, NonTerminal, ProductionRule, Symbol, Terminal};

fn parse_non_terminal(token: &str) -> Option<&str> {
    if token.len() > 2 && token.starts_with('<') && token.ends_with('>') {
        Some(&token[1..token.len() - 1])
    } else {
        None
    }
}

fn parse_terminal(token: &str) -> &str {
    if token.len() >= 2 && token.starts_with('\'') && token.ends_with('\'') {
        &token[1..token.len() - 1]
    } else {
        token
    }
}

/// Parse a grammar from the JSON object notation: keys are `<NT>`
/// non-terminals, values are arrays of alternatives, each alternative an
/// array of symbol strings (`'quoted'` or bare terminals, `<...>`
/// non-terminal references). C-style comments are stripped before parsing.
///
/// An empty alternative denotes the epsilon production. The first key is
/// the start symbol; a referenced but undefined non-terminal is an unknown
/// symbol error.
pub fn parse_grammar_json(text: &str) -> Result<Grammar, SyntaxError> {
    let reader = StripComments::with_settings(CommentSettings::c_style(), text.as_bytes());

    let value: Value = serde_json::from_reader(reader)
        .map_err(|e| SyntaxError::InvalidJson(e.to_string()))?;

    let object = match value {
        Value::Object(object) => object,
        _ => {
            return Err(SyntaxError::InvalidJson(
                "Grammar must be an object".to_string(),
            ));
        },
    };

    if object.is_empty() {
        return Err(SyntaxError::NoRules);
    }

    /* Keys declare the non-terminals; every reference must resolve here. */
    let mut nonterminals = Vec::new();
    for key in object.keys() {
        match parse_non_terminal(key) {
            Some(name) => nonterminals.push(NonTerminal::new(name)),
            None => {
                return Err(SyntaxError::InvalidJson(format!(
                    "Key isn't a non-terminal: '{}'",
                    key,
                )));
            },
        }
    }

    let mut terminals: IndexSet<Terminal> = IndexSet::new();
    let mut rules = Vec::new();

    for (key, value) in &object {
        let lhs = NonTerminal::new(parse_non_terminal(key).unwrap());

        let alternatives = match value {
            Value::Array(alternatives) => alternatives,
            _ => {
                return Err(SyntaxError::InvalidJson(format!(
                    "Right-hand side of '{}' must be an array",
                    key,
                )));
            },
        };

        for alternative in alternatives {
            let tokens = match alternative {
                Value::Array(tokens) => tokens,
                _ => {
                    return Err(SyntaxError::InvalidJson(format!(
                        "Right-hand side of '{}' must be an array of arrays",
                        key,
                    )));
                },
            };

            let mut symbols = Vec::new();
            for token in tokens {
                let Some(token) = token.as_str() else {
                    return Err(SyntaxError::InvalidJson(format!(
                        "Right-hand side of '{}' must contain strings",
                        key,
                    )));
                };

                if let Some(name) = parse_non_terminal(token) {
                    if !nonterminals.iter().any(|nt| nt.id() == name) {
                        return Err(SyntaxError::UnknownSymbol {
                            symbol: name.to_string(),
                        });
                    }
                    symbols.push(Symbol::NonTerminal(NonTerminal::new(name)));
                } else {
                    let terminal = Terminal::new(parse_terminal(token));
                    terminals.insert(terminal.clone());
                    symbols.push(Symbol::Terminal(terminal));
                }
            }

            rules.push(ProductionRule::new(lhs.clone(), symbols));
        }
    }

    let start_symbol = nonterminals[0].clone();

    Ok(Grammar::from_parts(
        nonterminals,
        terminals.into_iter().collect(),
        rules,
        start_symbol,
    ))
}

fn enclosed_in(s: &str, start: char, end: char) -> bool {
    s.len() >= 2 && s.starts_with(start) && s.ends_with(end)
}

fn terminal_string(content: &str) -> String {
    /* Quote terminals that would otherwise read as references. */
    if enclosed_in(content, '<', '>') || enclosed_in(content, '\'', '\'') {
        return format!("'{}'", content);
    }

    content.to_string()
}

/// Render a grammar into the JSON object notation, pretty-printed. Rules
/// keep their order, so parsing the output yields the same start symbol.
pub fn render_grammar_json(grammar: &Grammar) -> String {
    let mut root = json!({});
    let object = root.as_object_mut().unwrap();

    for rule in grammar.rules() {
        let alternatives = object
            .entry(format!("<{}>", rule.lhs().id()))
            .or_insert_with(|| Value::Array(Vec::new()));
        let alternatives = alternatives.as_array_mut().unwrap();

        let mut tokens = Vec::new();
        for symbol in rule.rhs() {
            match symbol {
                Symbol::Terminal(term) => {
                    tokens.push(Value::String(terminal_string(term.content())));
                },
                Symbol::NonTerminal(nonterm) => {
                    tokens.push(Value::String(format!("<{}>", nonterm.id())));
                },
            }
        }

        alternatives.push(Value::Array(tokens));
    }

    let mut buf = Vec::new();
    let formatter = PrettyFormatter::with_indent(b"    ");
    let mut ser = Serializer::with_formatter(&mut buf, formatter);
    root.serialize(&mut ser).unwrap();

    String::from_utf8(buf).unwrap()
}
