//! The two error kinds of the toolkit: malformed text and well-formed but
//! ill-shaped input.

use thiserror::Error;

/// Errors raised while parsing the textual notations: regular expressions,
/// grammars and graph descriptions.
///
/// A syntax error aborts the requested transform immediately, no partial
/// output is produced.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SyntaxError {
    /// A character that cannot start the expected construct
    #[error("Unexpected character '{found}' at position {pos}")]
    UnexpectedChar {
        /// The offending character
        found: char,
        /// Character position in the input
        pos: usize,
    },

    /// The input ended in the middle of an expression
    #[error("Unexpected end of expression at position {pos}")]
    UnexpectedEnd {
        /// Position where more input was expected
        pos: usize,
    },

    /// A group was opened but never closed
    #[error("Expected a closing parenthesis at position {pos}")]
    UnbalancedGroup {
        /// Position where the closing parenthesis was expected
        pos: usize,
    },

    /// An alternative of a union carries no expression at all
    #[error("Empty alternative at position {pos}")]
    EmptyAlternative {
        /// Position of the empty alternative
        pos: usize,
    },

    /// The expression was parsed completely but input remains
    #[error("Trailing input at position {pos}")]
    TrailingInput {
        /// Position of the first unconsumed character
        pos: usize,
    },

    /// A non-empty grammar line does not contain an arrow
    #[error("Line {line} is missing an arrow")]
    MissingArrow {
        /// 1-based line number
        line: usize,
    },

    /// An angle-bracketed symbol name was opened but never closed
    #[error("Unclosed angle bracket on line {line}")]
    UnclosedAngle {
        /// 1-based line number
        line: usize,
    },

    /// A symbol token that is neither a terminal nor a non-terminal
    #[error("Unknown symbol token '{symbol}'")]
    UnknownSymbol {
        /// The offending token
        symbol: String,
    },

    /// The grammar text contains no rules
    #[error("The grammar does not contain any rules")]
    NoRules,

    /// The grammar text declares no terminal symbols
    #[error("The grammar does not contain any terminal symbols")]
    NoTerminals,

    /// The first line of a graph description is not a valid header
    #[error("Invalid graph header: '{line}'")]
    InvalidHeader {
        /// The offending line
        line: String,
    },

    /// The JSON grammar file is malformed
    #[error("Invalid JSON grammar: {0}")]
    InvalidJson(String),
}

/// Errors raised when a well-formed input is ill-shaped for the requested
/// transform.
///
/// Semantic errors are non-recoverable: every transform is pure and
/// deterministic, so retrying cannot change the outcome, and no silent
/// repair is attempted.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SemanticError {
    /// A rule outside the shapes A -> aB, A -> a, A -> e
    #[error("Rule '{rule}' is not in regular form")]
    NotRegular {
        /// Rendering of the offending rule
        rule: String,
    },

    /// A rule references a symbol that is not declared in the grammar
    #[error("Symbol '{symbol}' in rule '{rule}' is not declared")]
    UndeclaredSymbol {
        /// The offending symbol
        symbol: String,
        /// Rendering of the offending rule
        rule: String,
    },

    /// The start symbol is not a declared non-terminal
    #[error("Start symbol '{0}' is not declared")]
    UndeclaredStart(String),

    /// A transition endpoint or start state is not a declared state
    #[error("State '{state}' is not declared")]
    UndeclaredState {
        /// Name of the offending state
        state: String,
    },

    /// Two transitions leave the same state on the same symbol
    #[error("Duplicate transition from '{state}' on '{symbol}'")]
    NotDeterministic {
        /// The offending source state
        state: String,
        /// The offending input symbol
        symbol: String,
    },
}
