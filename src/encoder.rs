//! This module renders machine descriptions into the line-oriented text format:
//!
//! ```text
//! # comment
//! states init q0
//! syms _
//! initstate init
//! finalstates HALT
//! table
//! init _ q0 . L
//! q0 * HALT _ R
//! ```

use crate::types::{Description, Transition};
use std::fmt;

/// Encodes a description into its textual form.
///
/// Every line, including the last transition, is newline-terminated. The output depends
/// only on the description, so encoding the same description twice yields identical bytes.
pub fn encode(description: &Description) -> String {
    description.to_string()
}

impl fmt::Display for Description {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(comment) = &self.comment {
            writeln!(f, "# {comment}")?;
        }
        write_list(f, "states", &self.states)?;
        write_list(f, "syms", &self.symbols)?;
        if let Some(blank) = &self.blank {
            writeln!(f, "blank {blank}")?;
        }
        writeln!(f, "initstate {}", self.initial_state)?;
        write_list(f, "finalstates", &self.final_states)?;
        writeln!(f, "table")?;
        for transition in &self.table {
            writeln!(f, "{transition}")?;
        }
        Ok(())
    }
}

impl fmt::Display for Transition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} {} {}",
            self.state, self.read, self.next, self.write, self.direction
        )
    }
}

/// Writes `keyword` followed by the space-separated items. An empty list leaves the keyword alone.
fn write_list(f: &mut fmt::Formatter<'_>, keyword: &str, items: &[String]) -> fmt::Result {
    f.write_str(keyword)?;
    for item in items {
        write!(f, " {item}")?;
    }
    writeln!(f)
}
