use crate::grammar::{
    cyk, eliminate_unreachable_symbols, regular_grammar_to_dfa, to_chomsky_normal_form,
};
use crate::notation::{
    parse_grammar, parse_grammar_json, render_cyk_table, render_grammar, render_grammar_json,
};

#[test]
fn test_text_to_cnf_to_cyk() {
    let grammar = parse_grammar("S -> A B\nA -> a\nB -> b").unwrap();
    let cnf = to_chomsky_normal_form(&grammar);

    assert!(cnf.is_in_cnf());

    let result = cyk(&cnf, "ab");
    assert!(result.belongs());
    assert!(!cyk(&cnf, "ba").belongs());
    assert!(!cyk(&cnf, "").belongs());

    let table = render_cyk_table(&cnf, "ab", &result);
    assert!(table.contains("S ✓"));
}

#[test]
fn test_nullable_grammar_keeps_empty_word() {
    let cnf = to_chomsky_normal_form(&parse_grammar("S -> A B | e\nA -> a\nB -> b").unwrap());

    assert!(cnf.is_in_cnf());
    assert!(cyk(&cnf, "").belongs());
    assert!(cyk(&cnf, "ab").belongs());
    assert!(!cyk(&cnf, "a").belongs());
}

#[test]
fn test_normalization_pipeline_via_rendering() {
    let grammar = parse_grammar("S -> a A\nA -> b\nX -> c").unwrap();
    let cleaned = eliminate_unreachable_symbols(&grammar);

    let rendered = render_grammar(&cleaned);
    assert_eq!(rendered, "S -> aA\nA -> b");
}

#[test]
fn test_regular_grammar_dfa_accepts_its_language() {
    let grammar = parse_grammar("S -> aS | b").unwrap();
    let dfa = regular_grammar_to_dfa(&grammar).unwrap();

    assert!(!dfa.states().is_empty());
    assert!(!dfa.transitions().is_empty());

    // Every terminal drives at least one transition.
    for terminal in grammar.terminals() {
        assert!(dfa
            .transitions()
            .iter()
            .any(|t| t.symbol().text() == terminal.content()));
    }
}

#[test]
fn test_non_regular_grammar_is_rejected() {
    let grammar = parse_grammar("S -> aAb\nA -> aA | b").unwrap();
    assert!(regular_grammar_to_dfa(&grammar).is_err());
}

#[test]
fn test_json_and_text_notations_agree() {
    let text = parse_grammar("S -> a S | b").unwrap();
    let json = parse_grammar_json(r#"{"<S>": [["a", "<S>"], ["b"]]}"#).unwrap();

    assert_eq!(text, json);

    let rendered = render_grammar_json(&text);
    assert_eq!(parse_grammar_json(&rendered).unwrap(), text);
}
