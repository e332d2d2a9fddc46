//! This module checks machine descriptions for references to undeclared states and symbols.
//!
//! Final states are treated as implicitly declared, since the format conventionally lists
//! `HALT` under `finalstates` only. Duplicate declarations are tolerated: the generator
//! produces them on purpose when symbol-named states collide.

use crate::types::{Description, TuringMachineError};
use std::collections::HashSet;
use tracing::debug;

/// Represents the problems that can be found while analyzing a description.
#[derive(Debug, PartialEq, Eq, Clone)]
pub enum AnalysisError {
    /// The initial state is neither declared nor final.
    InvalidInitialState(String),
    /// Transitions start from states that are not declared.
    UndefinedSourceStates(Vec<String>),
    /// Transitions lead to states that are not declared.
    UndefinedNextStates(Vec<String>),
    /// Transitions read or write symbols that are not declared.
    UndefinedSymbols(Vec<String>),
    /// The explicit blank symbol is not among the declared symbols.
    InvalidBlank(String),
}

impl From<AnalysisError> for TuringMachineError {
    /// Converts an `AnalysisError` into a `TuringMachineError::ValidationError`.
    fn from(error: AnalysisError) -> Self {
        match error {
            AnalysisError::InvalidInitialState(state) => {
                TuringMachineError::ValidationError(format!("Invalid initial state: {}", state))
            }
            AnalysisError::UndefinedSourceStates(states) => TuringMachineError::ValidationError(
                format!("Transitions start from undefined states: {:?}", states),
            ),
            AnalysisError::UndefinedNextStates(states) => TuringMachineError::ValidationError(
                format!("Transitions reference undefined states: {:?}", states),
            ),
            AnalysisError::UndefinedSymbols(symbols) => TuringMachineError::ValidationError(
                format!("Transitions use undefined symbols: {:?}", symbols),
            ),
            AnalysisError::InvalidBlank(blank) => TuringMachineError::ValidationError(format!(
                "Blank symbol is not declared: {}",
                blank
            )),
        }
    }
}

/// Analyzes a `Description`, returning the first problem found.
///
/// # Returns
///
/// * `Ok(())` if every referenced state and symbol is declared.
/// * `Err(TuringMachineError::ValidationError)` otherwise.
pub fn analyze(description: &Description) -> Result<(), TuringMachineError> {
    report_duplicates("state", &description.states);
    report_duplicates("symbol", &description.symbols);

    let errors = [
        check_initial_state,
        check_source_states,
        check_next_states,
        check_symbols,
        check_blank,
    ]
    .iter()
    .filter_map(|f| f(description).err())
    .collect::<Vec<_>>();

    match errors.into_iter().next() {
        Some(first_error) => Err(first_error.into()),
        None => Ok(()),
    }
}

fn check_initial_state(description: &Description) -> Result<(), AnalysisError> {
    if !description.knows_state(&description.initial_state) {
        return Err(AnalysisError::InvalidInitialState(
            description.initial_state.clone(),
        ));
    }

    Ok(())
}

fn check_source_states(description: &Description) -> Result<(), AnalysisError> {
    let undefined = collect_unknown(
        description.table.iter().map(|t| t.state.as_str()),
        |state| description.knows_state(state),
    );

    if !undefined.is_empty() {
        return Err(AnalysisError::UndefinedSourceStates(undefined));
    }

    Ok(())
}

fn check_next_states(description: &Description) -> Result<(), AnalysisError> {
    let undefined = collect_unknown(
        description.table.iter().filter_map(|t| t.next.state()),
        |state| description.knows_state(state),
    );

    if !undefined.is_empty() {
        return Err(AnalysisError::UndefinedNextStates(undefined));
    }

    Ok(())
}

/// Checks the read and write fields. Wildcard reads and `.` writes carry no symbol.
fn check_symbols(description: &Description) -> Result<(), AnalysisError> {
    let used = description
        .table
        .iter()
        .flat_map(|t| t.read.symbol().into_iter().chain(t.write.symbol()));
    let undefined = collect_unknown(used, |symbol| description.knows_symbol(symbol));

    if !undefined.is_empty() {
        return Err(AnalysisError::UndefinedSymbols(undefined));
    }

    Ok(())
}

fn check_blank(description: &Description) -> Result<(), AnalysisError> {
    match &description.blank {
        Some(blank) if !description.knows_symbol(blank) => {
            Err(AnalysisError::InvalidBlank(blank.clone()))
        }
        _ => Ok(()),
    }
}

/// Returns the names rejected by `is_known`, deduplicated, in order of first use.
fn collect_unknown<'a>(
    names: impl Iterator<Item = &'a str>,
    is_known: impl Fn(&str) -> bool,
) -> Vec<String> {
    let mut seen = HashSet::new();

    names
        .filter(|name| !is_known(name) && seen.insert(*name))
        .map(str::to_string)
        .collect()
}

fn report_duplicates(kind: &str, names: &[String]) {
    let mut seen = HashSet::new();
    for name in names {
        if !seen.insert(name) {
            debug!(kind, name = %name, "Duplicate declaration");
        }
    }
}
