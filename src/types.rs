//! This module defines the core data structures used throughout the crate: machine
//! descriptions, transitions, head directions, and the error type shared by the parser,
//! analyzer, and loader.

use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::Rule;

/// The blank symbol, always the first entry of a generated alphabet.
pub const BLANK_SYMBOL: &str = "_";
/// Matches any tape symbol in the read position of a transition.
pub const WILDCARD: &str = "*";
/// In the write position, leaves the symbol under the head untouched.
pub const NO_WRITE: &str = ".";
/// In the next-state position, keeps the machine in its current state.
pub const NO_STATE_CHANGE: &str = ".";
/// Name of the initial state of generated machines.
pub const INITIAL_STATE: &str = "init";
/// Name of the final state. It is referenced by transitions but never declared.
pub const HALT_STATE: &str = "HALT";
/// Largest number of symbols a single numeric range in `syms` may expand to.
pub const MAX_RANGE_LEN: u64 = 65_536;

/// A complete machine description in the line-oriented `states`/`syms`/`table` format.
///
/// Descriptions are built once (by the generator, the parser, or [`crate::chain`]) and then
/// serialized with [`crate::encode`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Description {
    /// Free-form text printed as a `#` line at the top of the description.
    pub comment: Option<String>,
    /// Declared state names, in declaration order. Final states are usually not listed.
    pub states: Vec<String>,
    /// Declared tape symbols, in declaration order.
    pub symbols: Vec<String>,
    /// Explicit blank symbol. When absent, consumers assume [`BLANK_SYMBOL`].
    pub blank: Option<String>,
    /// The state the machine starts in.
    pub initial_state: String,
    /// States in which a halted machine accepts.
    pub final_states: Vec<String>,
    /// Transition rules, in table order. Earlier rules take precedence.
    pub table: Vec<Transition>,
}

impl Description {
    /// Returns the blank symbol of this description, falling back to [`BLANK_SYMBOL`].
    pub fn blank_symbol(&self) -> &str {
        self.blank.as_deref().unwrap_or(BLANK_SYMBOL)
    }

    /// Checks whether `state` is declared or is one of the (implicitly declared) final states.
    pub fn knows_state(&self, state: &str) -> bool {
        self.states.iter().any(|s| s == state) || self.is_final(state)
    }

    pub fn is_final(&self, state: &str) -> bool {
        self.final_states.iter().any(|s| s == state)
    }

    pub fn knows_symbol(&self, symbol: &str) -> bool {
        self.symbols.iter().any(|s| s == symbol)
    }

    /// Returns the rule that fires in `state` when reading `symbol`.
    ///
    /// The first matching rule of the table wins; later rules for the same pair are shadowed.
    pub fn rule_for(&self, state: &str, symbol: &str) -> Option<&Transition> {
        self.table
            .iter()
            .find(|t| t.state == state && t.read.matches(symbol))
    }
}

/// A single rule of the transition table.
///
/// Reads as: in `state`, reading `read`, go to `next`, write `write`, and move the head
/// in `direction`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    pub state: String,
    pub read: Read,
    pub next: Next,
    pub write: Write,
    pub direction: Direction,
}

/// What a transition matches under the head.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Read {
    /// Matches exactly this symbol.
    Symbol(String),
    /// Matches any symbol (`*`).
    Any,
}

/// The state a transition moves to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Next {
    /// Moves to the named state.
    State(String),
    /// Stays in the current state (`.`).
    Same,
}

/// What a transition writes under the head.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Write {
    /// Writes this symbol.
    Symbol(String),
    /// Writes back whatever was read (`.`).
    Keep,
}

/// Represents the possible directions the head can move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Move the head one position to the left.
    Left,
    /// Move the head one position to the right.
    Right,
    /// Keep the head in the same position.
    Stay,
}

impl Read {
    pub fn symbol(&self) -> Option<&str> {
        match self {
            Read::Symbol(symbol) => Some(symbol),
            Read::Any => None,
        }
    }

    pub fn matches(&self, symbol: &str) -> bool {
        match self {
            Read::Symbol(expected) => expected == symbol,
            Read::Any => true,
        }
    }
}

impl Next {
    pub fn state(&self) -> Option<&str> {
        match self {
            Next::State(state) => Some(state),
            Next::Same => None,
        }
    }
}

impl Write {
    pub fn symbol(&self) -> Option<&str> {
        match self {
            Write::Symbol(symbol) => Some(symbol),
            Write::Keep => None,
        }
    }
}

impl From<&str> for Read {
    fn from(token: &str) -> Self {
        match token {
            WILDCARD => Read::Any,
            symbol => Read::Symbol(symbol.to_string()),
        }
    }
}

impl From<&str> for Next {
    fn from(token: &str) -> Self {
        match token {
            NO_STATE_CHANGE => Next::Same,
            state => Next::State(state.to_string()),
        }
    }
}

impl From<&str> for Write {
    fn from(token: &str) -> Self {
        match token {
            NO_WRITE => Write::Keep,
            symbol => Write::Symbol(symbol.to_string()),
        }
    }
}

impl fmt::Display for Read {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol().unwrap_or(WILDCARD))
    }
}

impl fmt::Display for Next {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.state().unwrap_or(NO_STATE_CHANGE))
    }
}

impl fmt::Display for Write {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol().unwrap_or(NO_WRITE))
    }
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Left => "L",
            Direction::Right => "R",
            Direction::Stay => "S",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Direction {
    type Err = String;

    /// Accepts `L`/`R`/`S` and `left`/`right`/`stay`, ignoring case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "l" | "left" => Ok(Direction::Left),
            "r" | "right" => Ok(Direction::Right),
            "s" | "stay" => Ok(Direction::Stay),
            _ => Err(format!("Unsupported direction: {s}")),
        }
    }
}

/// Represents the errors that can occur while reading, checking, or storing descriptions.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TuringMachineError {
    /// Indicates a syntax error in a machine description.
    #[error("Description parsing error: {0}")]
    ParseError(#[from] Box<pest::error::Error<Rule>>),
    /// Indicates a description that is well-formed but inconsistent.
    #[error("Description validation error: {0}")]
    ValidationError(String),
    /// Indicates an error reading or writing a description file.
    #[error("File error: {0}")]
    FileError(String),
}
