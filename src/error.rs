use std::path::PathBuf;
use thiserror::Error;

/// Failures while pulling a table.
///
/// Transport errors only cost the affected table. Everything else aborts the whole
/// run, see [`SyncError::is_fatal`].
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("{table}: request failed: {source}")]
    Transport {
        table: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{table}: response is not a JSON array of objects: {source}")]
    Decode {
        table: String,
        #[source]
        source: DecodeError,
    },

    #[error("{table}: failed to render record as YAML: {source}")]
    Render {
        table: String,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("{table}: record id {id:?} cannot be used as a file name")]
    InvalidRecordId { table: String, id: String },

    #[error("error writing {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Either the body could not be read or it did not parse.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("reading body: {0}")]
    Body(#[from] reqwest::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl SyncError {
    pub fn is_fatal(&self) -> bool {
        !matches!(self, SyncError::Transport { .. })
    }
}
