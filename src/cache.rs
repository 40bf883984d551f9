use std::fmt;
use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use crate::domain::ticket::IssuePayload;
use crate::error::{AppError, AppResult};
use crate::services::IssueTrackerService;

const CACHE_FILE_PREFIX: &str = "issue_";
const CACHE_FILE_EXTENSION: &str = "json";
const TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";
const MAX_SAME_SECOND_ENTRIES: u32 = 1000;

#[derive(Serialize, Deserialize)]
struct CacheRecord {
    tracker_type: String,
    ticket_data: Value,
    timestamp: String,
}

/// Location of one cached attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheHandle(PathBuf);

impl CacheHandle {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self(path.into())
    }

    pub fn path(&self) -> &Path {
        &self.0
    }
}

impl fmt::Display for CacheHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.display())
    }
}

#[derive(Debug, Clone)]
pub struct CachedAttempt {
    pub tracker_type: String,
    pub ticket_data: Value,
    pub timestamp: String,
    pub handle: CacheHandle,
}

impl CachedAttempt {
    pub fn title(&self) -> &str {
        self.ticket_data
            .get("title")
            .and_then(Value::as_str)
            .unwrap_or("Untitled")
    }
}

#[derive(Debug, Clone)]
pub struct RetryOutcome {
    pub handle: CacheHandle,
    /// Issue URL on success, the tracker's error text otherwise.
    pub result: Result<String, String>,
}

impl RetryOutcome {
    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }
}

/// Directory of issue submissions that failed and are waiting to be retried.
#[derive(Debug, Clone)]
pub struct FailureCache {
    dir: PathBuf,
}

impl FailureCache {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Persists a failed attempt and returns its handle once the file is synced.
    pub fn store(&self, tracker_type: &str, ticket_data: &Value) -> AppResult<CacheHandle> {
        self.store_at(tracker_type, ticket_data, Local::now())
    }

    fn store_at(
        &self,
        tracker_type: &str,
        ticket_data: &Value,
        now: DateTime<Local>,
    ) -> AppResult<CacheHandle> {
        fs::create_dir_all(&self.dir)?;

        let timestamp = now.format(TIMESTAMP_FORMAT).to_string();
        let record = CacheRecord {
            tracker_type: tracker_type.to_string(),
            ticket_data: ticket_data.clone(),
            timestamp: timestamp.clone(),
        };
        let data = serde_json::to_vec_pretty(&record)?;

        for sequence in 0..MAX_SAME_SECOND_ENTRIES {
            let path = self.dir.join(file_name(&timestamp, sequence));
            let mut file = match OpenOptions::new().write(true).create_new(true).open(&path) {
                Ok(file) => file,
                Err(err) if err.kind() == ErrorKind::AlreadyExists => continue,
                Err(err) => return Err(AppError::Io(err)),
            };
            file.write_all(&data)?;
            file.sync_all()?;
            debug!("cached failed {tracker_type} submission at {}", path.display());
            return Ok(CacheHandle(path));
        }

        Err(AppError::Cache(format!(
            "too many cache entries for timestamp {timestamp}"
        )))
    }

    /// All cached attempts, newest first. Unreadable entries are skipped.
    pub fn list(&self) -> AppResult<Vec<CachedAttempt>> {
        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => return Err(AppError::Io(err)),
        };

        let mut attempts = Vec::new();
        for entry in entries {
            let path = match entry {
                Ok(entry) => entry.path(),
                Err(err) => {
                    warn!("failed to read cache directory entry: {err}");
                    continue;
                }
            };
            if !is_cache_file(&path) {
                continue;
            }
            match self.load(&CacheHandle(path.clone())) {
                Ok(attempt) => attempts.push(attempt),
                Err(err) => warn!("failed to read cache file {}: {err}", path.display()),
            }
        }

        attempts.sort_by(|a, b| {
            (b.timestamp.as_str(), sequence_of(b.handle.path()))
                .cmp(&(a.timestamp.as_str(), sequence_of(a.handle.path())))
        });
        Ok(attempts)
    }

    pub fn load(&self, handle: &CacheHandle) -> AppResult<CachedAttempt> {
        let contents = fs::read_to_string(handle.path())?;
        let record: CacheRecord = serde_json::from_str(&contents)
            .map_err(|err| AppError::Cache(format!("invalid cache record: {err}")))?;
        Ok(CachedAttempt {
            tracker_type: record.tracker_type,
            ticket_data: record.ticket_data,
            timestamp: record.timestamp,
            handle: handle.clone(),
        })
    }

    /// Deletes a cached attempt; failures are only logged.
    pub fn remove(&self, handle: &CacheHandle) {
        if let Err(err) = fs::remove_file(handle.path()) {
            warn!("failed to remove cache file {handle}: {err}");
        }
    }

    /// Replays one cached attempt. The entry is removed only after the tracker
    /// reports success.
    pub async fn retry(
        &self,
        handle: &CacheHandle,
        tracker: &dyn IssueTrackerService,
    ) -> RetryOutcome {
        let result = self.submit_cached(handle, tracker).await;
        if result.is_ok() {
            self.remove(handle);
        }
        RetryOutcome {
            handle: handle.clone(),
            result: result.map_err(|err| err.detail()),
        }
    }

    async fn submit_cached(
        &self,
        handle: &CacheHandle,
        tracker: &dyn IssueTrackerService,
    ) -> AppResult<String> {
        let attempt = self.load(handle)?;
        let payload: IssuePayload = serde_json::from_value(attempt.ticket_data)
            .map_err(|err| AppError::Cache(format!("cached ticket data is incomplete: {err}")))?;
        tracker.create_issue(&payload).await
    }

    /// Retries every entry recorded for this tracker. One failure does not stop
    /// the rest.
    pub async fn retry_all(
        &self,
        tracker: &dyn IssueTrackerService,
    ) -> AppResult<Vec<RetryOutcome>> {
        let mut outcomes = Vec::new();
        for attempt in self.list()? {
            if attempt.tracker_type != tracker.kind() {
                continue;
            }
            outcomes.push(self.retry(&attempt.handle, tracker).await);
        }
        Ok(outcomes)
    }
}

fn file_name(timestamp: &str, sequence: u32) -> String {
    if sequence == 0 {
        format!("{CACHE_FILE_PREFIX}{timestamp}.{CACHE_FILE_EXTENSION}")
    } else {
        format!("{CACHE_FILE_PREFIX}{timestamp}_{sequence}.{CACHE_FILE_EXTENSION}")
    }
}

fn is_cache_file(path: &Path) -> bool {
    let name_matches = path
        .file_name()
        .and_then(|name| name.to_str())
        .is_some_and(|name| name.starts_with(CACHE_FILE_PREFIX));
    name_matches && path.extension().and_then(|ext| ext.to_str()) == Some(CACHE_FILE_EXTENSION)
}

/// Same-second disambiguator: `issue_<date>_<time>_<n>.json` -> n.
fn sequence_of(path: &Path) -> u32 {
    path.file_stem()
        .and_then(|stem| stem.to_str())
        .and_then(|stem| stem.strip_prefix(CACHE_FILE_PREFIX))
        .and_then(|rest| rest.splitn(3, '_').nth(2))
        .and_then(|sequence| sequence.parse().ok())
        .unwrap_or(0)
}
