use std::fmt::{Display, Formatter, Result as FmtResult};

use crate::error::SemanticError;

/// A non-terminal symbol, identified by name.
#[derive(Debug, Clone, Eq, Hash, PartialEq, Ord, PartialOrd)]
pub struct NonTerminal(String);

impl NonTerminal {
    /// Create a non-terminal from its name.
    pub fn new<S: Into<String>>(s: S) -> Self {
        Self(s.into())
    }

    /// The name of this non-terminal.
    pub fn id(&self) -> &str {
        &self.0
    }
}

impl Display for NonTerminal {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}", self.0)
    }
}

/// A terminal symbol.
#[derive(Debug, Clone, Eq, Hash, PartialEq, Ord, PartialOrd)]
pub struct Terminal(String);

impl Terminal {
    /// Create a terminal from its textual content.
    pub fn new<S: Into<String>>(s: S) -> Self {
        Self(s.into())
    }

    /// The textual content of this terminal.
    pub fn content(&self) -> &str {
        &self.0
    }
}

impl Display for Terminal {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}", self.0)
    }
}

/// A symbol on the right-hand side of a production rule.
#[derive(Debug, Clone, Eq, Hash, PartialEq, Ord, PartialOrd)]
pub enum Symbol {
    /// A terminal symbol
    Terminal(Terminal),
    /// A non-terminal symbol
    NonTerminal(NonTerminal),
}

impl Symbol {
    /// Whether this symbol is a non-terminal.
    pub fn is_non_terminal(&self) -> bool {
        matches!(self, Symbol::NonTerminal(_))
    }

    /// The textual form of the symbol, regardless of its kind.
    pub fn text(&self) -> &str {
        match self {
            Symbol::Terminal(term) => term.content(),
            Symbol::NonTerminal(nonterm) => nonterm.id(),
        }
    }

    /// The non-terminal inside, if this symbol is one.
    pub fn as_non_terminal(&self) -> Option<&NonTerminal> {
        match self {
            Symbol::NonTerminal(nonterm) => Some(nonterm),
            Symbol::Terminal(_) => None,
        }
    }

    /// The terminal inside, if this symbol is one.
    pub fn as_terminal(&self) -> Option<&Terminal> {
        match self {
            Symbol::Terminal(term) => Some(term),
            Symbol::NonTerminal(_) => None,
        }
    }
}

impl Display for Symbol {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}", self.text())
    }
}

/// A single production rule. An empty right-hand side denotes the epsilon
/// production.
#[derive(Debug, Clone, Eq, Hash, PartialEq)]
pub struct ProductionRule {
    lhs: NonTerminal,
    rhs: Vec<Symbol>,
}

impl ProductionRule {
    /// Create a production rule.
    pub fn new(lhs: NonTerminal, rhs: Vec<Symbol>) -> Self {
        Self { lhs, rhs }
    }

    /// Create the epsilon production for `lhs`.
    pub fn epsilon(lhs: NonTerminal) -> Self {
        Self::new(lhs, Vec::new())
    }

    /// The left-hand side.
    pub fn lhs(&self) -> &NonTerminal {
        &self.lhs
    }

    /// The right-hand side; empty for the epsilon production.
    pub fn rhs(&self) -> &[Symbol] {
        &self.rhs
    }

    /// Whether this is an epsilon production.
    pub fn is_epsilon(&self) -> bool {
        self.rhs.is_empty()
    }

    /// Whether the right-hand side is a single non-terminal.
    pub fn is_unit(&self) -> bool {
        self.rhs.len() == 1 && self.rhs[0].is_non_terminal()
    }
}

impl Display for ProductionRule {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{} ->", self.lhs)?;

        if self.is_epsilon() {
            write!(f, " e")?;
        } else {
            for symbol in &self.rhs {
                write!(f, " {}", symbol)?;
            }
        }

        Ok(())
    }
}

/// A context-free grammar: ordered non-terminal and terminal declarations, a
/// list of production rules and a start symbol.
///
/// A grammar is immutable once constructed; every normalization stage
/// produces a fresh grammar instead of mutating its input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grammar {
    nonterminals: Vec<NonTerminal>,
    terminals: Vec<Terminal>,
    rules: Vec<ProductionRule>,
    start_symbol: NonTerminal,
}

impl Grammar {
    /// Create a grammar, checking that the start symbol and every symbol
    /// appearing in a rule are declared.
    pub fn new(
        nonterminals: Vec<NonTerminal>,
        terminals: Vec<Terminal>,
        rules: Vec<ProductionRule>,
        start_symbol: NonTerminal,
    ) -> Result<Self, SemanticError> {
        if !nonterminals.contains(&start_symbol) {
            return Err(SemanticError::UndeclaredStart(start_symbol.id().to_string()));
        }

        for rule in &rules {
            if !nonterminals.contains(rule.lhs()) {
                return Err(SemanticError::UndeclaredSymbol {
                    symbol: rule.lhs().id().to_string(),
                    rule: rule.to_string(),
                });
            }

            for symbol in rule.rhs() {
                let declared = match symbol {
                    Symbol::Terminal(term) => terminals.contains(term),
                    Symbol::NonTerminal(nonterm) => nonterminals.contains(nonterm),
                };
                if !declared {
                    return Err(SemanticError::UndeclaredSymbol {
                        symbol: symbol.text().to_string(),
                        rule: rule.to_string(),
                    });
                }
            }
        }

        Ok(Self::from_parts(nonterminals, terminals, rules, start_symbol))
    }

    pub(crate) fn from_parts(
        nonterminals: Vec<NonTerminal>,
        terminals: Vec<Terminal>,
        rules: Vec<ProductionRule>,
        start_symbol: NonTerminal,
    ) -> Self {
        Self {
            nonterminals,
            terminals,
            rules,
            start_symbol,
        }
    }

    /// Declared non-terminals in order.
    pub fn nonterminals(&self) -> &[NonTerminal] {
        &self.nonterminals
    }

    /// Declared terminals in order.
    pub fn terminals(&self) -> &[Terminal] {
        &self.terminals
    }

    /// All production rules.
    pub fn rules(&self) -> &[ProductionRule] {
        &self.rules
    }

    /// The start symbol.
    pub fn start_symbol(&self) -> &NonTerminal {
        &self.start_symbol
    }

    /// Whether every rule is in Chomsky Normal Form: a single terminal or
    /// exactly two non-terminals, except at most one epsilon rule on the
    /// start symbol.
    pub fn is_in_cnf(&self) -> bool {
        let mut epsilon_rules = 0;

        for rule in &self.rules {
            match rule.rhs() {
                [] => {
                    epsilon_rules += 1;
                    if rule.lhs() != &self.start_symbol || epsilon_rules > 1 {
                        return false;
                    }
                },
                [Symbol::Terminal(_)] => {},
                [Symbol::NonTerminal(_), Symbol::NonTerminal(_)] => {},
                _ => return false,
            }
        }

        true
    }
}

impl Display for Grammar {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        writeln!(f, "Start symbol: {}", self.start_symbol)?;
        writeln!(f, "Rules:")?;

        for rule in &self.rules {
            writeln!(f, "  {}", rule)?;
        }

        Ok(())
    }
}
