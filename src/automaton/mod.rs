//! Typed finite-state machine values and the transforms between them.
//!
//! Four machine shapes live here: [`Nfa`], [`Dfa`], [`Mealy`] and [`Moore`].
//! All of them are immutable after construction and every transform returns
//! a fresh machine, so intermediate values can be retained and compared
//! freely.
//!
//! ```
//! use starling::automaton::{determinize_nfa, minimize_dfa};
//! use starling::regex;
//!
//! let ast = regex::parse("a|b").unwrap();
//! let nfa = regex::to_nfa(&ast);
//! let dfa = minimize_dfa(&determinize_nfa(&nfa));
//! assert_eq!(dfa.states().len(), 2);
//! ```

mod convert;
mod determinize;
mod machine;
mod minimize;

pub use convert::*;
pub use determinize::*;
pub use machine::*;
pub use minimize::*;
