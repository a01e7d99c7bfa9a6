use anyhow::{bail, Context, Result};
use serde::Serialize;
use serde_json::Value;
use std::fs;
use std::path::Path;
use tracing::debug;

use crate::domain::snapshot::SchemaSnapshot;

/// Serialize `document` (a snapshot or a comparison result) as pretty JSON
/// and write it to `path`, creating parent directories as needed.
///
/// An existing file is truncated: the destination always holds exactly one
/// JSON document.
pub fn save<T: Serialize>(document: &T, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    let content = serde_json::to_string_pretty(document)
        .with_context(|| format!("Failed to encode JSON for {}", path.display()))?;

    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create directory {}", dir.display()))?;
    }
    fs::write(path, content).with_context(|| format!("Failed to write {}", path.display()))?;

    debug!(path = %path.display(), "document saved");
    Ok(())
}

/// Load a snapshot document previously written by [`save`].
pub fn load_snapshot(path: impl AsRef<Path>) -> Result<SchemaSnapshot> {
    let path = path.as_ref();
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read snapshot file: {}", path.display()))?;
    parse_snapshot(&content)
        .with_context(|| format!("Failed to load snapshot file: {}", path.display()))
}

/// Parse a snapshot document. Field and index keys are lower-cased.
///
/// Fails if the text is not JSON, is an empty/falsy value (`null`, `false`,
/// `0`, `""`, `[]`, `{}`), or does not have the snapshot shape.
pub fn parse_snapshot(content: &str) -> Result<SchemaSnapshot> {
    let value: Value = serde_json::from_str(content).context("Document is not valid JSON")?;
    if is_falsy(&value) {
        bail!("Document is empty");
    }
    let snapshot: SchemaSnapshot =
        serde_json::from_value(value).context("Document is not a schema snapshot")?;
    Ok(snapshot.normalize_keys())
}

fn is_falsy(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty() || s == "0",
        Value::Array(a) => a.is_empty(),
        Value::Object(o) => o.is_empty(),
    }
}
