//! This crate generates Turing machine descriptions in a small line-oriented text format.
//! Its centerpiece is the "copy left" machine generator. It also includes modules for
//! encoding and parsing descriptions, checking them for undeclared names, chaining two
//! machines together, and loading and saving description files.

pub mod analyzer;
pub mod chain;
pub mod encoder;
pub mod generator;
pub mod loader;
pub mod parser;
pub mod types;

/// Re-exports the `Rule` enum from the parser module, used by the `pest` grammar.
pub use crate::parser::Rule;
/// Re-exports the `analyze` function and `AnalysisError` enum from the analyzer module.
pub use analyzer::{analyze, AnalysisError};
/// Re-exports the `chain` function from the chain module.
pub use chain::chain;
/// Re-exports the encoding function from the encoder module.
pub use encoder::encode;
/// Re-exports the copy-left generator from the generator module.
pub use generator::{alphabet, copy_left, generate, reads_back_verbatim, tokenize, StateNaming};
/// Re-exports the `DescriptionLoader` struct from the loader module.
pub use loader::DescriptionLoader;
/// Re-exports the `parse` function from the parser module.
pub use parser::parse;
/// Re-exports the description types from the types module.
pub use types::{Description, Direction, Next, Read, Transition, TuringMachineError, Write};
