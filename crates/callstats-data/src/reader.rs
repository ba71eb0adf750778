//! Call-log export loading.

use std::path::Path;

use callstats_core::error::{CallStatsError, Result};
use tracing::debug;

const UTF8_BOM: char = '\u{feff}';

/// Read an export file into memory as UTF-8 text.
///
/// A leading byte-order mark is removed so it cannot end up in the first
/// header name.
pub fn read_export(path: &Path) -> Result<String> {
    let text = std::fs::read_to_string(path).map_err(|source| CallStatsError::FileRead {
        path: path.to_path_buf(),
        source,
    })?;

    debug!("Read {} bytes from {}", text.len(), path.display());

    Ok(strip_bom(text))
}

fn strip_bom(text: String) -> String {
    match text.strip_prefix(UTF8_BOM) {
        Some(rest) => rest.to_string(),
        None => text,
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
