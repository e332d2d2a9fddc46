//! This module provides the `DescriptionLoader` struct, responsible for reading machine
//! descriptions from files and strings and for writing them back to disk.

use crate::encoder::encode;
use crate::parser::parse;
use crate::types::{Description, TuringMachineError};
use std::fs;
use std::path::Path;
use tracing::info;

/// `DescriptionLoader` is a utility struct for loading and saving machine descriptions.
pub struct DescriptionLoader;

impl DescriptionLoader {
    /// Loads a single machine description from the specified file path.
    ///
    /// # Arguments
    ///
    /// * `path` - A reference to the `Path` of the description file to load.
    ///
    /// # Returns
    ///
    /// * `Ok(Description)` if the file is successfully read and parsed.
    /// * `Err(TuringMachineError::FileError)` if the file cannot be read.
    /// * `Err(TuringMachineError::ParseError)` if the file content is not a valid description.
    pub fn load_description(path: &Path) -> Result<Description, TuringMachineError> {
        let content = fs::read_to_string(path).map_err(|e| {
            TuringMachineError::FileError(format!("Failed to read file {}: {}", path.display(), e))
        })?;

        parse(&content)
    }

    /// Loads a single machine description from the provided string content.
    pub fn load_description_from_string(content: &str) -> Result<Description, TuringMachineError> {
        parse(content)
    }

    /// Encodes `description` and writes it to `path`, replacing any existing file.
    ///
    /// # Returns
    ///
    /// * `Ok(())` if the file was written.
    /// * `Err(TuringMachineError::FileError)` if the file cannot be written.
    pub fn save_description(
        description: &Description,
        path: &Path,
    ) -> Result<(), TuringMachineError> {
        fs::write(path, encode(description)).map_err(|e| {
            TuringMachineError::FileError(format!(
                "Failed to write file {}: {}",
                path.display(),
                e
            ))
        })?;

        info!(path = %path.display(), "Saved description");

        Ok(())
    }

    /// Returns the machine name for a description file: its file stem, e.g. `copy` for
    /// `machines/copy.tu`.
    pub fn machine_name(path: &Path) -> String {
        path.file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_else(|| "machine".to_string())
    }
}
