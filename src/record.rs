use serde_json::{Map, Number, Value};
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;

use crate::error::SyncError;

/// One element of a table's response array.
pub type Record = Map<String, Value>;

pub const FRONT_MATTER_DELIMITER: &str = "---";
pub const OUTPUT_EXTENSION: &str = "md";

// Placeholder name for records without a usable id.
const NIL_ID: &str = "<nil>";

/// Render the record's `id` field the way it appears in the output file name.
pub fn record_id(record: &Record) -> String {
    match record.get("id") {
        None | Some(Value::Null) => NIL_ID.to_string(),
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => number_id(n),
        Some(other) => other.to_string(),
    }
}

// Whole floats drop the fraction (`1.0` names `1.md`) up to where exponent notation
// would take over.
fn number_id(n: &Number) -> String {
    match n.as_f64() {
        Some(f) if n.is_f64() && f.fract() == 0.0 && f.abs() < 1e21 => format!("{f:.0}"),
        _ => n.to_string(),
    }
}

/// `<id>.md`, or an error when the id would escape the table directory.
pub fn file_name(table: &str, record: &Record) -> Result<String, SyncError> {
    let id = record_id(record);
    // An empty id still lands inside the directory as `.md`.
    let escapes = id == "." || id == ".." || id.contains(['/', '\\', '\0']);
    if escapes {
        return Err(SyncError::InvalidRecordId {
            table: table.to_string(),
            id,
        });
    }
    Ok(format!("{id}.{OUTPUT_EXTENSION}"))
}

/// The full file body: the record as YAML between two `---` lines.
pub fn render_front_matter(table: &str, record: &Record) -> Result<String, SyncError> {
    let yaml = serde_yaml::to_string(record).map_err(|source| SyncError::Render {
        table: table.to_string(),
        source,
    })?;
    let mut out = String::with_capacity(yaml.len() + 2 * (FRONT_MATTER_DELIMITER.len() + 1));
    out.push_str(FRONT_MATTER_DELIMITER);
    out.push('\n');
    out.push_str(&yaml);
    out.push_str(FRONT_MATTER_DELIMITER);
    out.push('\n');
    Ok(out)
}

/// Write `record` to `<directory>/<id>.md`, creating the directory and truncating
/// any previous file. Returns the written path.
pub async fn write_record(
    directory: &Path,
    table: &str,
    record: &Record,
) -> Result<PathBuf, SyncError> {
    let path = directory.join(file_name(table, record)?);
    let body = render_front_matter(table, record)?;

    // Empty directory means the working directory; create_dir_all("") fails.
    if !directory.as_os_str().is_empty() {
        tokio::fs::create_dir_all(directory)
            .await
            .map_err(|source| SyncError::Write {
                path: directory.to_path_buf(),
                source,
            })?;
    }

    let write = async {
        let mut file = tokio::fs::File::create(&path).await?;
        file.write_all(body.as_bytes()).await?;
        file.flush().await
    };
    write.await.map_err(|source| SyncError::Write {
        path: path.clone(),
        source,
    })?;
    Ok(path)
}
