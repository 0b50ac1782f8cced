//! Cross-module pipeline tests: notation in, several transforms, notation
//! out.

mod grammar;
