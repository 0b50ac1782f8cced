use ahash::AHashSet;
use indexmap::{IndexMap, IndexSet};
use itertools::Itertools;

use crate::grammar::{Grammar, NonTerminal, ProductionRule, Symbol, Terminal};

/// The non-terminals that can derive the empty string, computed by least
/// fixed point: a non-terminal is nullable if it has an epsilon rule or a
/// rule whose entire right-hand side consists of nullable non-terminals.
pub fn nullable_set(grammar: &Grammar) -> IndexSet<NonTerminal> {
    let mut nullable = IndexSet::new();
    let mut changed = true;

    while changed {
        changed = false;
        for rule in grammar.rules() {
            if nullable.contains(rule.lhs()) {
                continue;
            }
            let all_nullable = rule
                .rhs()
                .iter()
                .all(|s| matches!(s.as_non_terminal(), Some(nt) if nullable.contains(nt)));
            if all_nullable {
                nullable.insert(rule.lhs().clone());
                changed = true;
            }
        }
    }

    nullable
}

fn fresh_start_symbol(grammar: &Grammar) -> NonTerminal {
    let mut name = format!("{}'", grammar.start_symbol().id());
    while grammar.nonterminals().iter().any(|nt| nt.id() == name) {
        name.push('\'');
    }
    NonTerminal::new(name)
}

/// Remove epsilon productions.
///
/// For every rule, all subsets of its nullable positions are enumerated and
/// dropped, one new rule per subset; this is deliberately the exponential
/// 2^k enumeration, acceptable at the small rule arities this toolkit
/// targets. The fully-empty result is discarded and the emitted rules are
/// deduplicated by (lhs, rhs) identity. If the start symbol is nullable, a
/// fresh start symbol is introduced with the rules `S' -> S` and `S' -> e`;
/// epsilon survives only there.
pub fn eliminate_epsilon_rules(grammar: &Grammar) -> Grammar {
    let nullable = nullable_set(grammar);

    let mut rules = Vec::new();
    let mut seen: AHashSet<(NonTerminal, Vec<Symbol>)> = AHashSet::new();

    for rule in grammar.rules() {
        if rule.is_epsilon() {
            continue;
        }

        let positions: Vec<usize> = rule
            .rhs()
            .iter()
            .enumerate()
            .filter(|(_, s)| matches!(s.as_non_terminal(), Some(nt) if nullable.contains(nt)))
            .map(|(i, _)| i)
            .collect();

        for dropped in positions.iter().copied().powerset() {
            let rhs: Vec<Symbol> = rule
                .rhs()
                .iter()
                .enumerate()
                .filter(|(i, _)| !dropped.contains(i))
                .map(|(_, s)| s.clone())
                .collect();

            if rhs.is_empty() {
                continue;
            }
            if seen.insert((rule.lhs().clone(), rhs.clone())) {
                rules.push(ProductionRule::new(rule.lhs().clone(), rhs));
            }
        }
    }

    if !nullable.contains(grammar.start_symbol()) {
        return Grammar::from_parts(
            grammar.nonterminals().to_vec(),
            grammar.terminals().to_vec(),
            rules,
            grammar.start_symbol().clone(),
        );
    }

    let fresh_start = fresh_start_symbol(grammar);

    let mut nonterminals = vec![fresh_start.clone()];
    nonterminals.extend_from_slice(grammar.nonterminals());

    let mut all_rules = vec![
        ProductionRule::new(
            fresh_start.clone(),
            vec![Symbol::NonTerminal(grammar.start_symbol().clone())],
        ),
        ProductionRule::epsilon(fresh_start.clone()),
    ];
    all_rules.extend(rules);

    Grammar::from_parts(
        nonterminals,
        grammar.terminals().to_vec(),
        all_rules,
        fresh_start,
    )
}

/// Remove unit rules (a single non-terminal on the right-hand side).
///
/// Builds the reflexive derives-closure over chains of unit rules, drops the
/// unit rules themselves and re-heads a copy of every remaining rule of B
/// onto each A that derives B.
pub fn eliminate_unit_rules(grammar: &Grammar) -> Grammar {
    /* derived_by[B] = every A reaching B through unit rules, B included. */
    let mut derived_by: IndexMap<NonTerminal, IndexSet<NonTerminal>> = grammar
        .nonterminals()
        .iter()
        .map(|nt| (nt.clone(), IndexSet::from([nt.clone()])))
        .collect();

    let mut changed = true;
    while changed {
        changed = false;
        for rule in grammar.rules() {
            if !rule.is_unit() {
                continue;
            }
            let target = rule.rhs()[0].as_non_terminal().unwrap().clone();
            let sources = derived_by.get(rule.lhs()).cloned().unwrap_or_default();
            let set = derived_by.entry(target).or_default();
            for source in sources {
                if set.insert(source) {
                    changed = true;
                }
            }
        }
    }

    let mut rules = Vec::new();
    for rule in grammar.rules() {
        if rule.is_unit() {
            continue;
        }
        if let Some(heads) = derived_by.get(rule.lhs()) {
            for head in heads {
                rules.push(ProductionRule::new(head.clone(), rule.rhs().to_vec()));
            }
        }
    }

    Grammar::from_parts(
        grammar.nonterminals().to_vec(),
        grammar.terminals().to_vec(),
        rules,
        grammar.start_symbol().clone(),
    )
}

/// The non-terminals that can derive some terminal string, by least fixed
/// point. An epsilon rule makes its head productive.
pub fn productive_set(grammar: &Grammar) -> IndexSet<NonTerminal> {
    let mut productive = IndexSet::new();
    let mut changed = true;

    while changed {
        changed = false;
        for rule in grammar.rules() {
            if productive.contains(rule.lhs()) {
                continue;
            }
            let all = rule.rhs().iter().all(|s| match s {
                Symbol::Terminal(_) => true,
                Symbol::NonTerminal(nt) => productive.contains(nt),
            });
            if all {
                productive.insert(rule.lhs().clone());
                changed = true;
            }
        }
    }

    productive
}

/// The non-terminals derivable from the start symbol, by forward traversal
/// of the rules.
pub fn reachable_set(grammar: &Grammar) -> IndexSet<NonTerminal> {
    let mut reachable = IndexSet::from([grammar.start_symbol().clone()]);
    let mut changed = true;

    while changed {
        changed = false;
        for rule in grammar.rules() {
            if !reachable.contains(rule.lhs()) {
                continue;
            }
            for symbol in rule.rhs() {
                if let Some(nonterm) = symbol.as_non_terminal() {
                    if reachable.insert(nonterm.clone()) {
                        changed = true;
                    }
                }
            }
        }
    }

    reachable
}

fn used_terminals(grammar: &Grammar, rules: &[ProductionRule]) -> Vec<Terminal> {
    let used: AHashSet<Terminal> = rules
        .iter()
        .flat_map(|r| r.rhs().iter().filter_map(Symbol::as_terminal))
        .cloned()
        .collect();

    grammar
        .terminals()
        .iter()
        .filter(|t| used.contains(*t))
        .cloned()
        .collect()
}

/// Drop every rule and non-terminal not reachable from the start symbol,
/// along with terminals that no longer occur in any rule.
pub fn eliminate_unreachable_symbols(grammar: &Grammar) -> Grammar {
    let reachable = reachable_set(grammar);

    let rules: Vec<ProductionRule> = grammar
        .rules()
        .iter()
        .filter(|r| reachable.contains(r.lhs()))
        .cloned()
        .collect();
    let terminals = used_terminals(grammar, &rules);
    let nonterminals = grammar
        .nonterminals()
        .iter()
        .filter(|nt| reachable.contains(*nt))
        .cloned()
        .collect();

    Grammar::from_parts(
        nonterminals,
        terminals,
        rules,
        grammar.start_symbol().clone(),
    )
}

/// Drop unproductive symbols, then unreachable ones.
///
/// Productivity filtering must run first: removing unproductive rules can
/// change what is reachable.
pub fn eliminate_useless_symbols(grammar: &Grammar) -> Grammar {
    let productive = productive_set(grammar);

    let productive_rules: Vec<ProductionRule> = grammar
        .rules()
        .iter()
        .filter(|r| {
            productive.contains(r.lhs())
                && r.rhs().iter().all(|s| match s {
                    Symbol::Terminal(_) => true,
                    Symbol::NonTerminal(nt) => productive.contains(nt),
                })
        })
        .cloned()
        .collect();

    let filtered = Grammar::from_parts(
        grammar
            .nonterminals()
            .iter()
            .filter(|nt| productive.contains(*nt))
            .cloned()
            .collect(),
        grammar.terminals().to_vec(),
        productive_rules,
        grammar.start_symbol().clone(),
    );

    let reachable = reachable_set(&filtered);

    let rules: Vec<ProductionRule> = filtered
        .rules()
        .iter()
        .filter(|r| reachable.contains(r.lhs()))
        .cloned()
        .collect();
    let terminals = used_terminals(grammar, &rules);
    let nonterminals = grammar
        .nonterminals()
        .iter()
        .filter(|nt| productive.contains(*nt) && reachable.contains(*nt))
        .cloned()
        .collect();

    Grammar::from_parts(
        nonterminals,
        terminals,
        rules,
        grammar.start_symbol().clone(),
    )
}

/// Mints fresh chain non-terminals `_N0`, `_N1`, ... skipping any name that
/// is already declared. The counter travels as a value through the
/// binarization instead of living in global state.
#[derive(Debug, Default)]
struct FreshNonTerminals {
    next: usize,
}

impl FreshNonTerminals {
    fn fresh(&mut self, declared: &[NonTerminal]) -> NonTerminal {
        loop {
            let name = format!("_N{}", self.next);
            self.next += 1;
            if !declared.iter().any(|nt| nt.id() == name) {
                return NonTerminal::new(name);
            }
        }
    }
}

/// Split long right-hand sides into chains of binary rules.
///
/// Rules of length at most one pass through unchanged, including a start
/// epsilon rule. In longer rules every terminal is replaced by a dedicated
/// proxy non-terminal `_T<t>` with one `proxy -> t` rule, created once per
/// terminal and reused; the remaining all-non-terminal sequence is chained
/// through fresh `_N<i>` names, one new rule each.
pub fn to_binary_rules(grammar: &Grammar) -> Grammar {
    let mut rules: Vec<ProductionRule> = Vec::new();
    let mut nonterminals = grammar.nonterminals().to_vec();
    let mut proxies: IndexMap<Terminal, NonTerminal> = IndexMap::new();
    let mut namer = FreshNonTerminals::default();

    for rule in grammar.rules() {
        if rule.rhs().len() <= 1 {
            rules.push(rule.clone());
            continue;
        }

        let rhs: Vec<NonTerminal> = rule
            .rhs()
            .iter()
            .map(|symbol| match symbol {
                Symbol::NonTerminal(nonterm) => nonterm.clone(),
                Symbol::Terminal(term) => proxies
                    .entry(term.clone())
                    .or_insert_with(|| {
                        let mut name = format!("_T{}", term.content());
                        while nonterminals.iter().any(|nt| nt.id() == name) {
                            name.push('\'');
                        }
                        let proxy = NonTerminal::new(name);
                        nonterminals.push(proxy.clone());
                        rules.push(ProductionRule::new(
                            proxy.clone(),
                            vec![Symbol::Terminal(term.clone())],
                        ));
                        proxy
                    })
                    .clone(),
            })
            .collect();

        let mut left = rule.lhs().clone();
        for part in &rhs[..rhs.len() - 2] {
            let fresh = namer.fresh(&nonterminals);
            nonterminals.push(fresh.clone());
            rules.push(ProductionRule::new(
                left,
                vec![
                    Symbol::NonTerminal(part.clone()),
                    Symbol::NonTerminal(fresh.clone()),
                ],
            ));
            left = fresh;
        }
        rules.push(ProductionRule::new(
            left,
            vec![
                Symbol::NonTerminal(rhs[rhs.len() - 2].clone()),
                Symbol::NonTerminal(rhs[rhs.len() - 1].clone()),
            ],
        ));
    }

    Grammar::from_parts(
        nonterminals,
        grammar.terminals().to_vec(),
        rules,
        grammar.start_symbol().clone(),
    )
}

/// Normalize a grammar to Chomsky Normal Form.
///
/// Composes epsilon elimination, unit-rule elimination, useless-symbol
/// elimination and binarization, in that fixed order. Afterwards every rule
/// is a single terminal or exactly two non-terminals, except at most one
/// epsilon rule on the start symbol.
pub fn to_chomsky_normal_form(grammar: &Grammar) -> Grammar {
    let grammar = eliminate_epsilon_rules(grammar);
    let grammar = eliminate_unit_rules(&grammar);
    let grammar = eliminate_useless_symbols(&grammar);
    to_binary_rules(&grammar)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grammar(text: &str) -> Grammar {
        crate::notation::parse_grammar(text).unwrap()
    }

    fn has_rule(grammar: &Grammar, lhs: &str, rhs: &[&str]) -> bool {
        grammar.rules().iter().any(|r| {
            r.lhs().id() == lhs
                && r.rhs().len() == rhs.len()
                && r.rhs().iter().zip(rhs).all(|(s, expected)| s.text() == *expected)
        })
    }

    #[test]
    fn test_epsilon_elimination_expands_variants() {
        let g = grammar("S -> A B\nA -> a | e\nB -> b | e");
        let out = eliminate_epsilon_rules(&g);

        let epsilon_rules = out.rules().iter().filter(|r| r.is_epsilon()).count();
        assert!(epsilon_rules <= 1);
        assert!(has_rule(&out, "S", &["A", "B"]));
        assert!(has_rule(&out, "S", &["A"]));
        assert!(has_rule(&out, "S", &["B"]));
    }

    #[test]
    fn test_nullable_start_gets_fresh_start() {
        let g = grammar("S -> A | e\nA -> a");
        let out = eliminate_epsilon_rules(&g);

        assert_eq!(out.start_symbol().id(), "S'");
        let epsilon_rules: Vec<_> = out.rules().iter().filter(|r| r.is_epsilon()).collect();
        assert_eq!(epsilon_rules.len(), 1);
        assert_eq!(epsilon_rules[0].lhs().id(), "S'");
    }

    #[test]
    fn test_unit_rules_are_copied_down() {
        let g = grammar("S -> A\nA -> a B | a\nB -> b");
        let out = eliminate_unit_rules(&g);

        assert!(out.rules().iter().all(|r| !r.is_unit()));
        assert!(has_rule(&out, "S", &["a", "B"]));
        assert!(has_rule(&out, "S", &["a"]));
        assert!(has_rule(&out, "A", &["a", "B"]));
    }

    #[test]
    fn test_useless_symbols_productivity_before_reachability() {
        // U never derives a terminal string; C becomes unreachable once the
        // rule S -> U C dies with it.
        let g = grammar("S -> a | U C\nU -> U b\nC -> c");
        let out = eliminate_useless_symbols(&g);

        assert!(!out.nonterminals().iter().any(|nt| nt.id() == "U"));
        assert!(!out.nonterminals().iter().any(|nt| nt.id() == "C"));
        assert!(!out.terminals().iter().any(|t| t.content() == "c"));
        assert!(has_rule(&out, "S", &["a"]));
        assert_eq!(out.rules().len(), 1);
    }

    #[test]
    fn test_unreachable_cleanup_keeps_productive_orphans() {
        let g = grammar("S -> a A\nA -> b\nX -> c");
        let out = eliminate_unreachable_symbols(&g);

        assert!(!out.nonterminals().iter().any(|nt| nt.id() == "X"));
        assert!(has_rule(&out, "S", &["a", "A"]));
        assert!(has_rule(&out, "A", &["b"]));
        assert_eq!(out.rules().len(), 2);
    }

    #[test]
    fn test_binarization_introduces_proxies_and_chains() {
        let g = grammar("S -> a S b | a b");
        let out = to_binary_rules(&g);

        assert!(has_rule(&out, "_Ta", &["a"]));
        assert!(has_rule(&out, "_Tb", &["b"]));
        assert!(has_rule(&out, "S", &["_Ta", "_N0"]));
        assert!(has_rule(&out, "_N0", &["S", "_Tb"]));
        assert!(has_rule(&out, "S", &["_Ta", "_Tb"]));
        // One proxy per terminal, reused across rules.
        assert_eq!(
            out.rules().iter().filter(|r| r.lhs().id() == "_Ta").count(),
            1,
        );
    }

    #[test]
    fn test_cnf_shape() {
        let g = grammar("S -> A B\nA -> a\nB -> b");
        let cnf = to_chomsky_normal_form(&g);
        assert!(cnf.is_in_cnf());
    }

    #[test]
    fn test_cnf_long_rule_becomes_chain() {
        let g = grammar("S -> A B C\nA -> a\nB -> b\nC -> c");
        let cnf = to_chomsky_normal_form(&g);

        assert!(cnf.is_in_cnf());
        let s_rules: Vec<_> = cnf.rules().iter().filter(|r| r.lhs().id() == "S").collect();
        assert_eq!(s_rules.len(), 1);
        assert_eq!(s_rules[0].rhs().len(), 2);
        assert!(cnf.nonterminals().len() > 4);
    }

    #[test]
    fn test_cnf_keeps_start_epsilon_rule() {
        let g = grammar("S -> A B | e\nA -> a\nB -> b");
        let cnf = to_chomsky_normal_form(&g);

        assert!(cnf.is_in_cnf());
        let epsilon_rules: Vec<_> = cnf.rules().iter().filter(|r| r.is_epsilon()).collect();
        assert_eq!(epsilon_rules.len(), 1);
        assert_eq!(epsilon_rules[0].lhs(), cnf.start_symbol());
    }

    #[test]
    fn test_cnf_of_epsilon_only_language() {
        let g = grammar("S -> a | e");
        let cnf = to_chomsky_normal_form(&g);

        assert!(cnf.is_in_cnf());
        assert_eq!(cnf.start_symbol().id(), "S'");
        assert!(cnf.rules().iter().any(|r| r.is_epsilon()));
        assert!(has_rule(&cnf, "S'", &["a"]));
    }
}
