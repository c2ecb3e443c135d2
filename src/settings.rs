use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::warn;

const RULE: &str = "-------------------------------------";

/// Root of the settings file: the list of tables to pull.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub tables: Vec<Table>,
}

/// One remote resource and where its records land on disk.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Table {
    /// Path segment appended to the server URL; also used in log lines.
    #[serde(default)]
    pub id: String,
    /// Output folder, created on demand.
    #[serde(default)]
    pub directory: String,
    // Accepted for compatibility with existing settings files; records are always written as `.md`.
    #[serde(default, rename = "fileExtension")]
    pub file_extension: String,
    #[serde(default, rename = "mainContent")]
    pub main_content: String,
}

impl Settings {
    /// Load settings from `path`.
    ///
    /// A missing or unreadable file is logged and yields empty settings, so the run
    /// simply processes zero tables. A file that is present but not valid settings
    /// YAML is an error.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = match fs::read(path) {
            Ok(c) => c,
            Err(e) => {
                warn!("settings file {} could not be read: {}", path.display(), e);
                warn!("\n{RULE}\n   YAML settings file error...\n{RULE}\n");
                return Ok(Self::default());
            }
        };
        Self::from_yaml_slice(&content)
            .with_context(|| format!("invalid settings file: {}", path.display()))
    }

    pub fn from_yaml_str(content: &str) -> Result<Self> {
        Self::from_yaml_slice(content.as_bytes())
    }

    /// Parse raw file contents; bytes that are not UTF-8 are a parse error.
    pub fn from_yaml_slice(content: &[u8]) -> Result<Self> {
        // serde_yaml rejects an empty document; an empty file means "no tables".
        if content.iter().all(u8::is_ascii_whitespace) {
            return Ok(Self::default());
        }
        serde_yaml::from_slice(content).context("failed to parse settings YAML")
    }
}

fn null_as_empty<'de, D>(deserializer: D) -> std::result::Result<Vec<Table>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::<Vec<Table>>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_all_table_fields() {
        let yaml = r#"
tables:
  - id: posts
    directory: content/posts/
    fileExtension: md
    mainContent: body
  - id: authors
    directory: content/authors
"#;
        let settings = Settings::from_yaml_str(yaml).unwrap();
        assert_eq!(settings.tables.len(), 2);
        assert_eq!(
            settings.tables[0],
            Table {
                id: "posts".into(),
                directory: "content/posts/".into(),
                file_extension: "md".into(),
                main_content: "body".into(),
            }
        );
        assert_eq!(settings.tables[1].id, "authors");
        assert_eq!(settings.tables[1].file_extension, "");
        assert_eq!(settings.tables[1].main_content, "");
    }

    #[test]
    fn missing_or_null_tables_is_empty() {
        assert!(Settings::from_yaml_str("other: 1\n").unwrap().tables.is_empty());
        assert!(Settings::from_yaml_str("tables:\n").unwrap().tables.is_empty());
        assert!(Settings::from_yaml_str("tables: []\n").unwrap().tables.is_empty());
    }

    #[test]
    fn empty_document_is_empty_settings() {
        assert_eq!(Settings::from_yaml_str("").unwrap(), Settings::default());
        assert_eq!(Settings::from_yaml_str("  \n\n").unwrap(), Settings::default());
    }

    #[test]
    fn malformed_yaml_is_an_error() {
        assert!(Settings::from_yaml_str("tables: [ { id: posts").is_err());
        assert!(Settings::from_yaml_str("tables: 42\n").is_err());
    }

    #[test]
    fn missing_file_yields_no_tables() {
        let tmp = tempfile::tempdir().unwrap();
        let settings = Settings::load(tmp.path().join("strapi-settings.yaml")).unwrap();
        assert!(settings.tables.is_empty());
    }

    #[test]
    fn load_reads_file_from_disk() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("strapi-settings.yaml");
        fs::write(&path, "tables:\n  - id: pages\n    directory: content/pages\n").unwrap();
        let settings = Settings::load(&path).unwrap();
        assert_eq!(settings.tables.len(), 1);
        assert_eq!(settings.tables[0].directory, "content/pages");
    }

    #[test]
    fn non_utf8_file_is_malformed_not_missing() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("strapi-settings.yaml");
        fs::write(&path, b"tables:\n  - id: \xff\xfe\n").unwrap();
        let err = Settings::load(&path).unwrap_err();
        assert!(err.to_string().contains("invalid settings file"));
    }

    #[test]
    fn load_reports_malformed_file() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("strapi-settings.yaml");
        fs::write(&path, "tables: {{{").unwrap();
        let err = Settings::load(&path).unwrap_err();
        assert!(err.to_string().contains("invalid settings file"));
    }
}
