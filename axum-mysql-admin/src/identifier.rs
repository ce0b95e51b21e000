//! Identifier validation
//!
//! Table and column names cannot be bound as query parameters, so they are
//! checked here before being quoted into SQL text.

use crate::Error;

/// Check that `identifier` can be embedded between `delimiter` quotes
///
/// Rejects empty names, names longer than `max_length` characters,
/// control characters and the delimiter itself.
pub fn validate(identifier: &str, delimiter: char, max_length: usize) -> Result<(), Error> {
    if identifier.is_empty() {
        return Err(Error::InvalidIdentifier("identifier is empty".to_string()));
    }

    if identifier.chars().count() > max_length {
        return Err(Error::InvalidIdentifier(format!(
            "identifier exceeds {} characters",
            max_length
        )));
    }

    if identifier.chars().any(|c| c == delimiter || c.is_control()) {
        return Err(Error::InvalidIdentifier(identifier.escape_debug().to_string()));
    }

    Ok(())
}

/// Wrap an already validated identifier in `delimiter` quotes
pub fn quote(identifier: &str, delimiter: char) -> String {
    format!("{delimiter}{identifier}{delimiter}")
}

/// Find `table` among the tables the database reported
pub fn ensure_table<'a>(table: &str, known: &'a [String]) -> Result<&'a str, Error> {
    known
        .iter()
        .find(|name| name.as_str() == table)
        .map(String::as_str)
        .ok_or_else(|| Error::TableNotFound(table.to_string()))
}

/// Find `column` among a table's columns, ignoring ASCII case
///
/// Returns the name as the database spells it.
pub fn ensure_column<'a, I>(column: &str, known: I) -> Result<&'a str, Error>
where
    I: IntoIterator<Item = &'a str>,
{
    known
        .into_iter()
        .find(|name| name.eq_ignore_ascii_case(column))
        .ok_or_else(|| Error::InvalidColumn(column.to_string()))
}
