//! This library converts finite-state machine descriptions and context-free
//! grammars between equivalent canonical forms and decides language
//! membership questions.
//!
//! It consists of
//! - __automaton__: typed NFA, DFA, Mealy and Moore values with
//!   determinization, generic partition-refinement minimization and
//!   Mealy⇄Moore interconversion.
//! - __regex__: a parser for union/concatenation/star expressions and the
//!   Thompson construction into an NFA.
//! - __grammar__: context-free grammar values, normalization to Chomsky
//!   Normal Form, CYK membership and a DFA construction for right-linear
//!   grammars.
//! - __notation__: the textual boundary, parsing and rendering the graph,
//!   grammar and JSON notations.
//!
//! ## Getting started
//! Parse a value at the boundary, transform it in the core, render the
//! result back out:
//! ```
//! use starling::automaton::{determinize_nfa, minimize_dfa};
//! use starling::{notation, regex};
//!
//! let ast = regex::parse("a(b|c)*").unwrap();
//! let dfa = minimize_dfa(&determinize_nfa(&regex::to_nfa(&ast)));
//! let rendered = notation::render_dfa(&dfa);
//! assert!(rendered.starts_with("digraph DFA"));
//! ```
//!
//! Every value is immutable after construction and every transform is a
//! pure function, so independent invocations need no coordination.

#![deny(missing_docs)]

pub mod automaton;
pub mod error;
pub mod grammar;
pub mod notation;
pub mod regex;

#[cfg(test)]
mod tests;
