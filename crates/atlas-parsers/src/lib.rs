//! Shared parsing utilities for atlas.
//!
//! Used by atlas-helm to run and parse the `helm` binary, and by atlas-state
//! to read Kubernetes resource quantities and render ages.

pub mod command;
pub mod quantity;
pub mod time;

pub use command::{CommandError, run_command, run_command_status};
pub use quantity::{QuantityError, parse_quantity, quantity_value};
pub use time::short_human_duration;

/// Filter helper for optional string fields.
/// Returns None if the string is empty or a placeholder value.
pub fn non_empty_string(s: &str) -> Option<String> {
    let trimmed = s.trim();
    if trimmed.is_empty() || trimmed == "-" || trimmed == "N/A" || trimmed == "<none>" {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Split a whitespace-aligned table line into columns.
///
/// Returns an error if fewer than `min_fields` columns are present.
pub fn split_columns(line: &str, min_fields: usize) -> Result<Vec<&str>, String> {
    let fields: Vec<&str> = line.split_whitespace().collect();
    if fields.len() < min_fields {
        return Err(format!(
            "Expected {} columns, got {}: {}",
            min_fields,
            fields.len(),
            line
        ));
    }
    Ok(fields)
}
