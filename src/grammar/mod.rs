//! Context-free grammar values and the transforms over them: normalization
//! to Chomsky Normal Form, CYK membership and the regular-grammar-to-DFA
//! construction.
//!
//! A grammar is a set of production rules over declared terminals and
//! non-terminals plus a start symbol:
//! ```
//! use starling::grammar::{cyk, to_chomsky_normal_form};
//! use starling::notation::parse_grammar;
//!
//! let grammar = parse_grammar("S -> A B\nA -> a\nB -> b").unwrap();
//! let cnf = to_chomsky_normal_form(&grammar);
//! assert!(cyk(&cnf, "ab").belongs());
//! assert!(!cyk(&cnf, "ba").belongs());
//! ```

mod cfg;
mod cyk;
mod normalize;
mod regular;

pub use cfg::*;
pub use cyk::*;
pub use normalize::*;
pub use regular::*;
