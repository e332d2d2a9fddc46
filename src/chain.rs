//! This module combines two machine descriptions into one that runs the first machine,
//! rewinds the head to the start of the input, and then runs the second machine.

use crate::types::{Description, Direction, Next, Read, Transition, Write};
use std::collections::{HashMap, HashSet};
use tracing::info;

/// Name of the state that rewinds the head between the two machines.
pub const RETURN_STATE: &str = "RETURN";

/// Chains `first` and `second` into a single description.
///
/// States of `second` that clash with names already in use are renamed by prepending
/// `<prefix>::` until they are unique. Transitions of `first` into one of its final states
/// are redirected to a `RETURN` state, which walks left until it reads a blank, steps back
/// right, and enters the initial state of `second`. The final states of the result are those
/// of `second`.
///
/// # Arguments
///
/// * `first` - The machine that runs first. Its initial state becomes the initial state.
/// * `second` - The machine that runs after the head has been rewound.
/// * `prefix` - Prepended to clashing names, conventionally the second machine's file stem.
pub fn chain(first: &Description, second: &Description, prefix: &str) -> Description {
    let mut used: HashSet<String> = first.states.iter().cloned().collect();
    let mut states = first.states.clone();
    let mut renames: HashMap<&str, String> = HashMap::new();

    for state in &second.states {
        if renames.contains_key(state.as_str()) {
            continue;
        }
        let name = unique_name(state, prefix, &used);
        used.insert(name.clone());
        renames.insert(state, name.clone());
        states.push(name);
    }

    let rename = |state: &str| {
        renames
            .get(state)
            .cloned()
            .unwrap_or_else(|| state.to_string())
    };

    let final_states: Vec<String> = second.final_states.iter().map(|s| rename(s)).collect();
    used.extend(final_states.iter().cloned());

    let return_state = unique_name(RETURN_STATE, prefix, &used);
    states.push(return_state.clone());

    let mut symbols = first.symbols.clone();
    for symbol in &second.symbols {
        if !symbols.contains(symbol) {
            symbols.push(symbol.clone());
        }
    }

    let blank = first.blank.clone().or_else(|| second.blank.clone());

    let mut table = Vec::with_capacity(first.table.len() + second.table.len() + 2);

    table.extend(first.table.iter().map(|t| {
        let mut transition = t.clone();
        if matches!(&t.next, Next::State(next) if first.is_final(next)) {
            transition.next = Next::State(return_state.clone());
        }
        transition
    }));

    table.push(Transition {
        state: return_state.clone(),
        read: Read::Symbol(first.blank_symbol().to_string()),
        next: Next::State(rename(&second.initial_state)),
        write: Write::Keep,
        direction: Direction::Right,
    });
    table.push(Transition {
        state: return_state.clone(),
        read: Read::Any,
        next: Next::Same,
        write: Write::Keep,
        direction: Direction::Left,
    });

    table.extend(second.table.iter().map(|t| Transition {
        state: rename(&t.state),
        next: match &t.next {
            Next::State(next) => Next::State(rename(next)),
            Next::Same => Next::Same,
        },
        ..t.clone()
    }));

    info!(
        states = states.len(),
        symbols = symbols.len(),
        transitions = table.len(),
        return_state = %return_state,
        "Chained descriptions"
    );

    Description {
        comment: None,
        states,
        symbols,
        blank,
        initial_state: first.initial_state.clone(),
        final_states,
        table,
    }
}

/// Prepends `<prefix>::` to `name` until it is not in `used`.
fn unique_name(name: &str, prefix: &str, used: &HashSet<String>) -> String {
    let mut name = name.to_string();
    while used.contains(&name) {
        name = format!("{prefix}::{name}");
    }
    name
}
