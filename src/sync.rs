use reqwest::StatusCode;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::{self, JoinSet};
use tracing::{debug, error, info};

use crate::config::ServerConfig;
use crate::error::{DecodeError, SyncError};
use crate::record::{self, Record};
use crate::settings::Table;

/// What happened to a single table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableOutcome {
    /// 200 response; one file per record.
    Written { count: usize },
    /// Any other status. Nothing is written and the run carries on.
    Skipped { status: u16 },
    /// Table-scoped failure, already logged.
    Failed { error: String },
}

impl TableOutcome {
    pub fn records_written(&self) -> usize {
        match self {
            TableOutcome::Written { count } => *count,
            _ => 0,
        }
    }

    pub fn summary(&self) -> String {
        match self {
            TableOutcome::Written { count } => format!("{} {}", count, item_label(*count)),
            TableOutcome::Skipped { status } => format!("StatusCode: {}", status),
            TableOutcome::Failed { error } => format!("Error: {}", error),
        }
    }
}

pub fn item_label(count: usize) -> &'static str {
    if count == 1 { "item" } else { "items" }
}

/// Per-table outcomes in completion order.
#[derive(Debug, Clone, Default)]
pub struct SyncReport {
    pub tables: Vec<(String, TableOutcome)>,
}

impl SyncReport {
    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    pub fn records_written(&self) -> usize {
        self.tables.iter().map(|(_, o)| o.records_written()).sum()
    }

    pub fn failed(&self) -> usize {
        self.tables
            .iter()
            .filter(|(_, o)| matches!(o, TableOutcome::Failed { .. }))
            .count()
    }

    pub fn outcome(&self, table_id: &str) -> Option<&TableOutcome> {
        self.tables.iter().find(|(id, _)| id == table_id).map(|(_, o)| o)
    }
}

/// Pulls tables from one API host and writes their records to disk.
///
/// Cloning is cheap: the HTTP client is reference counted, so each spawned worker
/// gets its own handle.
#[derive(Clone)]
pub struct Syncer {
    client: reqwest::Client,
    base_url: Arc<str>,
    max_concurrency: Option<usize>,
}

impl Syncer {
    pub fn new(config: &ServerConfig) -> Self {
        Self::with_client(reqwest::Client::new(), config)
    }

    pub fn with_client(client: reqwest::Client, config: &ServerConfig) -> Self {
        Self {
            client,
            base_url: Arc::from(config.base_url.as_str()),
            max_concurrency: config.max_concurrency,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn table_url(&self, table: &Table) -> String {
        format!("{}/{}", self.base_url, table.id)
    }

    /// Fetch one table and write every record it returns.
    pub async fn sync_table(&self, table: &Table) -> Result<TableOutcome, SyncError> {
        let url = self.table_url(table);
        debug!("GET {}", url);
        let res = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|source| SyncError::Transport {
                table: table.id.clone(),
                source,
            })?;

        let status = res.status();
        if status != StatusCode::OK {
            info!("   {} - StatusCode: {}", table.id, status.as_u16());
            return Ok(TableOutcome::Skipped {
                status: status.as_u16(),
            });
        }

        let records = decode_records(res).await.map_err(|source| SyncError::Decode {
            table: table.id.clone(),
            source,
        })?;

        let directory = Path::new(&table.directory);
        for r in &records {
            let path = record::write_record(directory, &table.id, r).await?;
            debug!("   {} - wrote {}", table.id, path.display());
        }

        let outcome = TableOutcome::Written {
            count: records.len(),
        };
        info!("   {} - {}", table.id, outcome.summary());
        Ok(outcome)
    }

    /// Sync every table concurrently and wait for all of them.
    ///
    /// Table-scoped failures are logged and recorded in the report. The first fatal
    /// error aborts the workers still running and is returned.
    pub async fn sync_all(&self, tables: &[Table]) -> Result<SyncReport, SyncError> {
        if tables.is_empty() {
            return Ok(SyncReport::default());
        }

        let limiter = self.max_concurrency.map(|n| Arc::new(Semaphore::new(n)));
        let mut set = JoinSet::new();
        let mut names = HashMap::with_capacity(tables.len());
        for table in tables.iter().cloned() {
            let syncer = self.clone();
            let limiter = limiter.clone();
            let id = table.id.clone();
            let handle = set.spawn(async move {
                // The semaphore is never closed, so acquire only fails if it was.
                let _permit = match limiter {
                    Some(sem) => sem.acquire_owned().await.ok(),
                    None => None,
                };
                syncer.sync_table(&table).await
            });
            names.insert(handle.id(), id);
        }

        join_tables(set, names).await
    }
}

/// Wait for every worker in `set`, naming each result through `names`.
async fn join_tables(
    mut set: JoinSet<Result<TableOutcome, SyncError>>,
    mut names: HashMap<task::Id, String>,
) -> Result<SyncReport, SyncError> {
    let mut report = SyncReport::default();
    while let Some(joined) = set.join_next_with_id().await {
        match joined {
            Ok((task_id, Ok(outcome))) => {
                let id = names.remove(&task_id).unwrap_or_default();
                report.tables.push((id, outcome));
            }
            Ok((_, Err(e))) if e.is_fatal() => {
                // Dropping the set aborts the remaining workers.
                set.abort_all();
                return Err(e);
            }
            Ok((task_id, Err(e))) => {
                error!("Error: {}", e);
                let id = names.remove(&task_id).unwrap_or_default();
                let outcome = TableOutcome::Failed {
                    error: e.to_string(),
                };
                report.tables.push((id, outcome));
            }
            Err(join_err) => {
                let id = names.remove(&join_err.id()).unwrap_or_default();
                error!("Error: {}: table worker panicked: {}", id, join_err);
                let outcome = TableOutcome::Failed {
                    error: join_err.to_string(),
                };
                report.tables.push((id, outcome));
            }
        }
    }
    Ok(report)
}

/// A `null` body reads as no records and a `null` element as an empty record.
async fn decode_records(res: reqwest::Response) -> Result<Vec<Record>, DecodeError> {
    let body = res.bytes().await?;
    let records: Option<Vec<Option<Record>>> = serde_json::from_slice(&body)?;
    Ok(records.unwrap_or_default().into_iter().map(Option::unwrap_or_default).collect())
}
