//! JSON import and export of the catalog
//!
//! Export produces a pretty-printed array of `{text, category}` objects.
//! Import only checks the envelope (valid JSON, top-level array) and hands
//! the entries to the quote store, which validates and deduplicates them.

use crate::error::{Error, Result};
use crate::quote::{Catalog, Quote};
use std::path::Path;

/// File name offered for downloads and used when no output path is given
pub const EXPORT_FILE_NAME: &str = "quotes.json";

/// Serialize the catalog as pretty-printed JSON
pub fn export_catalog(catalog: &Catalog) -> Result<Vec<u8>> {
    Ok(serde_json::to_vec_pretty(catalog)?)
}

/// Parse an import payload into raw candidates.
///
/// Array elements that are not objects are skipped; objects missing a
/// field come through with that field empty and are rejected at merge.
pub fn import_catalog(bytes: &[u8]) -> Result<Vec<Quote>> {
    let value: serde_json::Value = serde_json::from_slice(bytes)
        .map_err(|e| Error::Import(format!("invalid JSON: {}", e)))?;

    let items = match value {
        serde_json::Value::Array(items) => items,
        other => {
            return Err(Error::Import(format!(
                "expected a JSON array, found {}",
                json_kind(&other)
            )))
        }
    };

    let total = items.len();
    let candidates: Vec<Quote> = items
        .into_iter()
        .filter_map(|item| serde_json::from_value(item).ok())
        .collect();

    if candidates.len() < total {
        tracing::debug!(
            skipped = total - candidates.len(),
            "Skipped non-object import entries"
        );
    }
    Ok(candidates)
}

/// Reject anything that does not end in `.json`
pub fn check_extension(path: &Path) -> Result<()> {
    let is_json = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    if is_json {
        Ok(())
    } else {
        Err(Error::Format(format!(
            "{} is not a .json file",
            path.display()
        )))
    }
}

/// Check the extension, read the file as UTF-8 and parse it
pub async fn read_import_file(path: &Path) -> Result<Vec<Quote>> {
    check_extension(path)?;
    let bytes = tokio::fs::read(path).await?;
    let text = String::from_utf8(bytes)
        .map_err(|_| Error::Import(format!("{} is not valid UTF-8", path.display())))?;
    import_catalog(text.as_bytes())
}

/// Write the export to `path`
pub async fn write_export_file(path: &Path, catalog: &Catalog) -> Result<()> {
    let bytes = export_catalog(catalog)?;
    tokio::fs::write(path, bytes).await?;
    Ok(())
}

fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "an array",
        serde_json::Value::Object(_) => "an object",
    }
}
