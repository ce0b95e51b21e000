//! Database abstraction layer
//!
//! This module provides a backend-agnostic interface for catalog reads,
//! content browsing and raw statement execution over one connection.

pub mod traits;

#[cfg(feature = "mysql")]
pub mod mysql;

#[cfg(feature = "sqlite")]
pub mod sqlite;

// Re-export the main trait
pub use traits::{DatabaseError, DatabaseProvider};

use base64::Engine;

/// Bytes of a binary value rendered in previews
const BLOB_PREVIEW_BYTES: usize = 64;

/// Render binary data as a short, JSON-friendly preview
pub(crate) fn blob_preview(data: &[u8]) -> String {
    let shown = &data[..data.len().min(BLOB_PREVIEW_BYTES)];
    let mut encoded = base64::engine::general_purpose::STANDARD.encode(shown);
    if data.len() > BLOB_PREVIEW_BYTES {
        encoded.push_str("...");
    }
    format!("[BLOB: {} bytes, base64: {}]", data.len(), encoded)
}

/// Leading keyword of a statement, skipping whitespace, comments and parentheses
pub(crate) fn leading_keyword(sql: &str) -> String {
    let mut rest = sql;
    loop {
        rest = rest.trim_start_matches(|c: char| c.is_whitespace() || c == '(' || c == ';');
        if let Some(comment) = rest.strip_prefix("--").or_else(|| rest.strip_prefix('#')) {
            rest = comment.split_once('\n').map_or("", |(_, tail)| tail);
        } else if let Some(comment) = rest.strip_prefix("/*") {
            rest = comment.split_once("*/").map_or("", |(_, tail)| tail);
        } else {
            break;
        }
    }

    rest.chars()
        .take_while(|c| c.is_ascii_alphabetic())
        .collect::<String>()
        .to_ascii_uppercase()
}

/// Guess from the leading keyword whether a statement returns a result set
///
/// Only consulted when the statement cannot be prepared for its column metadata.
pub(crate) fn returns_rows(sql: &str) -> bool {
    matches!(
        leading_keyword(sql).as_str(),
        "SELECT" | "SHOW" | "DESCRIBE" | "DESC" | "EXPLAIN" | "WITH" | "VALUES" | "TABLE" | "PRAGMA"
    )
}
