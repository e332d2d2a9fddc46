//! This module builds the "copy left" machine: a machine that remembers the symbol under
//! the head, steps left, writes the remembered symbol there, and halts one cell to the right.
//!
//! The machine is derived from a list of symbol tokens. The blank symbol is always
//! prepended, and every symbol of the resulting alphabet gets a dedicated state and exactly
//! two transitions.

use crate::encoder::encode;
use crate::parser::numeric_range;
use crate::types::{
    Description, Direction, Next, Read, Transition, Write, BLANK_SYMBOL, HALT_STATE,
    INITIAL_STATE, NO_WRITE, WILDCARD,
};
use std::fmt;
use std::str::FromStr;
use tracing::{debug, warn};

/// Comment emitted at the top of every generated description.
pub const COPY_LEFT_COMMENT: &str = "copies the current symbol and moves it to the left";

/// How the dedicated per-symbol state is named.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum StateNaming {
    /// `q<i>`, where `i` is the symbol's position in the alphabet (the blank is `q0`).
    #[default]
    Index,
    /// `q<symbol>`, e.g. `q_` for the blank. Duplicate symbols yield duplicate state names.
    Symbol,
}

impl StateNaming {
    /// Returns the name of the state that remembers `symbol`, found at `index` in the alphabet.
    pub fn state_name(&self, index: usize, symbol: &str) -> String {
        match self {
            StateNaming::Index => format!("q{index}"),
            StateNaming::Symbol => format!("q{symbol}"),
        }
    }
}

impl fmt::Display for StateNaming {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StateNaming::Index => f.write_str("index"),
            StateNaming::Symbol => f.write_str("symbol"),
        }
    }
}

impl FromStr for StateNaming {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "index" => Ok(StateNaming::Index),
            "symbol" => Ok(StateNaming::Symbol),
            _ => Err(format!(
                "Unknown state naming '{s}', expected 'index' or 'symbol'"
            )),
        }
    }
}

/// Splits an input line into symbol tokens.
///
/// Only the space character separates tokens, and a trailing line terminator is ignored.
/// Tokens are otherwise taken verbatim, tabs and other whitespace included. Empty tokens are
/// dropped, so an empty line (or a line of spaces) yields no tokens at all.
pub fn tokenize(line: &str) -> Vec<String> {
    line.trim_end_matches(['\r', '\n'])
        .split(' ')
        .filter(|token| !token.is_empty())
        .map(str::to_string)
        .collect()
}

/// Checks whether `symbol` survives being written out and parsed back unchanged.
///
/// `*` and `.` read back as the wildcard and the keep placeholder, a numeric range such as
/// `0-9` expands in `syms`, and tabs or line breaks split the line.
pub fn reads_back_verbatim(symbol: &str) -> bool {
    symbol != WILDCARD
        && symbol != NO_WRITE
        && !symbol.contains(['\t', '\r', '\n'])
        && numeric_range(symbol).is_none()
}

/// Returns the alphabet derived from `tokens`: the blank symbol followed by every token in order.
pub fn alphabet<S: AsRef<str>>(tokens: &[S]) -> Vec<String> {
    std::iter::once(BLANK_SYMBOL.to_string())
        .chain(tokens.iter().map(|token| token.as_ref().to_string()))
        .collect()
}

/// Builds the copy-left machine for `tokens`.
///
/// For every symbol `s` of the alphabet, with `q` its dedicated state, the table contains:
///
/// * `init s q . L` (remember `s`, leave the tape alone, step left)
/// * `q * HALT s R` (write `s` whatever is there, step back right, halt)
pub fn copy_left<S: AsRef<str>>(tokens: &[S], naming: StateNaming) -> Description {
    let symbols = alphabet(tokens);
    let mut states = Vec::with_capacity(symbols.len() + 1);
    let mut table = Vec::with_capacity(symbols.len() * 2);

    states.push(INITIAL_STATE.to_string());

    for (index, symbol) in symbols.iter().enumerate() {
        let state = naming.state_name(index, symbol);

        if !reads_back_verbatim(symbol) {
            warn!(
                %symbol,
                "Symbol has a special meaning in descriptions and will not read back as written"
            );
        }

        table.push(Transition {
            state: INITIAL_STATE.to_string(),
            read: Read::Symbol(symbol.clone()),
            next: Next::State(state.clone()),
            write: Write::Keep,
            direction: Direction::Left,
        });
        table.push(Transition {
            state: state.clone(),
            read: Read::Any,
            next: Next::State(HALT_STATE.to_string()),
            write: Write::Symbol(symbol.clone()),
            direction: Direction::Right,
        });

        states.push(state);
    }

    debug!(
        symbols = symbols.len(),
        states = states.len(),
        transitions = table.len(),
        %naming,
        "Derived copy-left machine"
    );

    Description {
        comment: Some(COPY_LEFT_COMMENT.to_string()),
        states,
        symbols,
        blank: None,
        initial_state: INITIAL_STATE.to_string(),
        final_states: vec![HALT_STATE.to_string()],
        table,
    }
}

/// Reads symbols from `line` and returns the encoded copy-left machine.
pub fn generate(line: &str, naming: StateNaming) -> String {
    encode(&copy_left(&tokenize(line), naming))
}
