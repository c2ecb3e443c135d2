pub mod config;
pub mod error;
pub mod record;
pub mod settings;
pub mod sync;

// --- Library API for embedding ---

/// Convenience re-exports for embedders.
pub mod prelude {
    pub use crate::config::ServerConfig;
    pub use crate::error::SyncError;
    pub use crate::record::Record;
    pub use crate::settings::{Settings, Table};
    pub use crate::sync::{SyncReport, Syncer, TableOutcome};
}

/// Reported by the `version` subcommand.
pub const VERSION: &str = "1.0.0";

/// Settings file read from the working directory.
pub const SETTINGS_FILE: &str = "strapi-settings.yaml";
