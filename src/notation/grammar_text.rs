use indexmap::{IndexMap, IndexSet};
use itertools::Itertools;

use crate::error::SyntaxError;
use crate::grammar::{Grammar, NonTerminal, ProductionRule, Symbol, Terminal};

fn tokenize(text: &str, line: usize) -> Result<Vec<String>, SyntaxError> {
    let mut tokens = Vec::new();
    let mut chars = text.chars();

    while let Some(c) = chars.next() {
        if c.is_whitespace() {
            continue;
        }

        if c == '<' {
            let mut name = String::new();
            loop {
                match chars.next() {
                    Some('>') => break,
                    Some(inner) => name.push(inner),
                    None => return Err(SyntaxError::UnclosedAngle { line }),
                }
            }
            if name.is_empty() {
                return Err(SyntaxError::UnknownSymbol {
                    symbol: "<>".to_string(),
                });
            }
            tokens.push(name);
        } else {
            tokens.push(c.to_string());
        }
    }

    Ok(tokens)
}

fn is_single_uppercase(name: &str) -> bool {
    let mut chars = name.chars();
    matches!((chars.next(), chars.next()), (Some(c), None) if c.is_ascii_uppercase())
}

/// Parse a grammar from `LHS -> alt1 | alt2` lines.
///
/// Multi-character symbol names are written in angle brackets, the token `e`
/// (or an empty alternative) denotes the epsilon production, and whitespace
/// between symbols is insignificant. A symbol is a non-terminal if it
/// appears as some rule's left-hand side or is a single uppercase ASCII
/// letter; every other symbol is a terminal. The first rule's left-hand
/// side becomes the start symbol.
pub fn parse_grammar(text: &str) -> Result<Grammar, SyntaxError> {
    let mut raw_rules: Vec<(String, Vec<String>)> = Vec::new();
    let mut appearance: IndexSet<String> = IndexSet::new();
    let mut lhs_names: IndexSet<String> = IndexSet::new();

    for (index, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let line_no = index + 1;
        let Some((left, right)) = line.split_once("->") else {
            return Err(SyntaxError::MissingArrow { line: line_no });
        };

        let lhs_tokens = tokenize(left, line_no)?;
        if lhs_tokens.len() != 1 {
            return Err(SyntaxError::UnknownSymbol {
                symbol: left.trim().to_string(),
            });
        }
        let lhs = lhs_tokens[0].clone();
        appearance.insert(lhs.clone());
        lhs_names.insert(lhs.clone());

        for alternative in right.split('|') {
            let alternative = alternative.trim();

            if alternative == "e" || alternative.is_empty() {
                raw_rules.push((lhs.clone(), Vec::new()));
                continue;
            }

            let tokens = tokenize(alternative, line_no)?;
            for token in &tokens {
                appearance.insert(token.clone());
            }
            raw_rules.push((lhs.clone(), tokens));
        }
    }

    if raw_rules.is_empty() {
        return Err(SyntaxError::NoRules);
    }

    let is_non_terminal =
        |name: &str| lhs_names.contains(name) || is_single_uppercase(name);

    let nonterminals: Vec<NonTerminal> = appearance
        .iter()
        .filter(|name| is_non_terminal(name))
        .map(|name| NonTerminal::new(name.as_str()))
        .collect();
    let terminals: Vec<Terminal> = appearance
        .iter()
        .filter(|name| !is_non_terminal(name))
        .map(|name| Terminal::new(name.as_str()))
        .collect();

    if terminals.is_empty() {
        return Err(SyntaxError::NoTerminals);
    }

    let rules: Vec<ProductionRule> = raw_rules
        .iter()
        .map(|(lhs, rhs)| {
            let symbols = rhs
                .iter()
                .map(|name| {
                    if is_non_terminal(name) {
                        Symbol::NonTerminal(NonTerminal::new(name.as_str()))
                    } else {
                        Symbol::Terminal(Terminal::new(name.as_str()))
                    }
                })
                .collect();
            ProductionRule::new(NonTerminal::new(lhs.as_str()), symbols)
        })
        .collect();

    let start_symbol = NonTerminal::new(raw_rules[0].0.as_str());

    Ok(Grammar::from_parts(nonterminals, terminals, rules, start_symbol))
}

fn format_symbol(name: &str, bare_single: bool) -> String {
    if bare_single {
        name.to_string()
    } else {
        format!("<{}>", name)
    }
}

/// Render a grammar back into `LHS -> alt1 | alt2` lines, grouping the
/// alternatives of each non-terminal in declaration order. Single
/// uppercase non-terminals and single-character terminals are written bare,
/// everything else in angle brackets; epsilon productions render as `e`.
pub fn render_grammar(grammar: &Grammar) -> String {
    let mut by_lhs: IndexMap<&NonTerminal, Vec<String>> = IndexMap::new();

    for rule in grammar.rules() {
        let rendered = if rule.is_epsilon() {
            "e".to_string()
        } else {
            rule.rhs()
                .iter()
                .map(|symbol| match symbol {
                    Symbol::NonTerminal(nonterm) => {
                        format_symbol(nonterm.id(), is_single_uppercase(nonterm.id()))
                    },
                    Symbol::Terminal(term) => {
                        format_symbol(term.content(), term.content().chars().count() == 1)
                    },
                })
                .join("")
        };
        by_lhs.entry(rule.lhs()).or_default().push(rendered);
    }

    grammar
        .nonterminals()
        .iter()
        .filter_map(|nonterm| {
            let alternatives = by_lhs.get(nonterm)?;
            Some(format!(
                "{} -> {}",
                format_symbol(nonterm.id(), is_single_uppercase(nonterm.id())),
                alternatives.join(" | "),
            ))
        })
        .join("\n")
}
