//! Append-only activity log
//!
//! Every dispatched update produces exactly one [`ActivityEvent`], stored as one JSON
//! object per line. Writers share a single file handle behind an async mutex, so two
//! events never interleave, and each append is flushed to the OS before returning.

use std::collections::{BTreeMap, HashSet};
use std::io::SeekFrom;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::fs::{self, File, OpenOptions};
use tokio::io::{AsyncReadExt, AsyncSeekExt, AsyncWriteExt};
use tokio::sync::Mutex;

use crate::core::error::{AppError, AppResult};

/// One record of "this update was handled this way".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityEvent {
    pub timestamp: DateTime<Utc>,
    pub user_id: i64,
    pub username: String,
    pub action: String,
}

impl ActivityEvent {
    /// Creates an event stamped with the current time.
    pub fn now(user_id: i64, username: impl Into<String>, action: impl Into<String>) -> Self {
        Self {
            timestamp: Utc::now(),
            user_id,
            username: username.into(),
            action: action.into(),
        }
    }

    /// Serializes the event as a single line, without the trailing newline.
    ///
    /// JSON escapes control characters, so user text can never split a record.
    pub fn to_line(&self) -> AppResult<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_line(line: &str) -> AppResult<Self> {
        Ok(serde_json::from_str(line)?)
    }
}

/// File handle plus whether the file may currently end in the middle of a line.
struct LogWriter {
    file: File,
    /// Set when the file has a partial tail (crash, failed write); the next record
    /// starts with a newline so it never gets glued onto that tail.
    needs_newline: bool,
}

/// Shared append-only sink. Cloning is cheap and clones write to the same file.
#[derive(Clone)]
pub struct ActivityLog {
    path: PathBuf,
    writer: Arc<Mutex<LogWriter>>,
}

impl ActivityLog {
    /// Opens (or creates) the log in append mode, creating parent directories.
    pub async fn open(path: impl Into<PathBuf>) -> AppResult<Self> {
        let path = path.into();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).await?;
            }
        }

        let file = OpenOptions::new().create(true).append(true).open(&path).await?;
        let needs_newline = ends_mid_line(&path).await?;
        if needs_newline {
            log::warn!("Activity log {} ends with a partial line", path.display());
        }
        log::debug!("Activity log opened at {}", path.display());

        Ok(Self {
            path,
            writer: Arc::new(Mutex::new(LogWriter { file, needs_newline })),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Appends one event as one line.
    ///
    /// The whole line goes out in a single `write_all` while the lock is held, then the
    /// handle is flushed. Errors are returned to the caller; nothing here panics.
    pub async fn append(&self, event: &ActivityEvent) -> AppResult<()> {
        let record = event.to_line()?;

        let mut writer = self.writer.lock().await;
        let mut line = String::with_capacity(record.len() + 2);
        if writer.needs_newline {
            line.push('\n');
        }
        line.push_str(&record);
        line.push('\n');

        // A failed write may have left part of the line behind.
        writer.needs_newline = true;
        writer.file.write_all(line.as_bytes()).await?;
        writer.file.flush().await?;
        writer.needs_newline = false;
        Ok(())
    }
}

/// Whether a regular, non-empty file lacks a trailing newline.
async fn ends_mid_line(path: &Path) -> AppResult<bool> {
    let metadata = fs::metadata(path).await?;
    if !metadata.is_file() || metadata.len() == 0 {
        return Ok(false);
    }

    let mut file = File::open(path).await?;
    file.seek(SeekFrom::End(-1)).await?;
    let mut last = [0u8; 1];
    file.read_exact(&mut last).await?;
    Ok(last[0] != b'\n')
}

/// Reads every event back from a log file.
///
/// Blank lines are skipped; the first malformed line fails the read with its 1-based
/// line number.
pub async fn read_events(path: impl AsRef<Path>) -> AppResult<Vec<ActivityEvent>> {
    let content = fs::read_to_string(path.as_ref()).await?;
    parse_events(&content)
}

/// Parses JSON-lines content into events.
pub fn parse_events(content: &str) -> AppResult<Vec<ActivityEvent>> {
    content
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(idx, line)| {
            ActivityEvent::from_line(line).map_err(|e| AppError::CorruptLog {
                line: idx + 1,
                reason: e.to_string(),
            })
        })
        .collect()
}

/// Reads every well-formed event, skipping lines that do not parse.
///
/// Returns the events and the 1-based numbers of the skipped lines. Fragments left by a
/// crash mid-append end up in the second list instead of failing the whole read.
pub async fn read_events_lossy(path: impl AsRef<Path>) -> AppResult<(Vec<ActivityEvent>, Vec<usize>)> {
    let content = fs::read_to_string(path.as_ref()).await?;
    Ok(parse_events_lossy(&content))
}

pub fn parse_events_lossy(content: &str) -> (Vec<ActivityEvent>, Vec<usize>) {
    let mut events = Vec::new();
    let mut skipped = Vec::new();
    for (idx, line) in content.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        match ActivityEvent::from_line(line) {
            Ok(event) => events.push(event),
            Err(_) => skipped.push(idx + 1),
        }
    }
    (events, skipped)
}

/// Counts derived from the log on demand instead of kept in memory.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActivitySummary {
    pub total_events: usize,
    pub unique_users: usize,
    pub errors: usize,
    pub unhandled: usize,
    /// Events per action kind (`start`, `message`, `callback`, `error`, ...)
    pub by_kind: BTreeMap<String, usize>,
    pub first_seen: Option<DateTime<Utc>>,
    pub last_seen: Option<DateTime<Utc>>,
}

impl ActivitySummary {
    pub fn from_events(events: &[ActivityEvent]) -> Self {
        let mut summary = Self::default();
        let mut users = HashSet::new();

        for event in events {
            summary.total_events += 1;
            users.insert(event.user_id);

            let kind = action_kind(&event.action);
            match kind {
                "error" => summary.errors += 1,
                "unhandled" => summary.unhandled += 1,
                _ => {}
            }
            *summary.by_kind.entry(kind.to_string()).or_insert(0) += 1;

            summary.first_seen = Some(summary.first_seen.map_or(event.timestamp, |t| t.min(event.timestamp)));
            summary.last_seen = Some(summary.last_seen.map_or(event.timestamp, |t| t.max(event.timestamp)));
        }

        summary.unique_users = users.len();
        summary
    }
}

/// The part of an action before the first `:` (the whole action if there is none).
pub fn action_kind(action: &str) -> &str {
    action.split_once(':').map_or(action, |(kind, _)| kind)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;

    fn event_at(secs: i64, user_id: i64, action: &str) -> ActivityEvent {
        ActivityEvent {
            timestamp: Utc.timestamp_opt(secs, 0).unwrap(),
            user_id,
            username: format!("user{}", user_id),
            action: action.to_string(),
        }
    }

    #[test]
    fn test_event_round_trip_with_awkward_text() {
        let event = ActivityEvent::now(7, "Ann \"the\" tester", "message:line one\nline two\u{0}");
        let line = event.to_line().unwrap();
        assert!(!line.contains('\n'));
        assert_eq!(ActivityEvent::from_line(&line).unwrap(), event);
    }

    #[test]
    fn test_line_has_expected_fields() {
        let event = event_at(0, 1, "start");
        let value: serde_json::Value = serde_json::from_str(&event.to_line().unwrap()).unwrap();
        assert_eq!(value["user_id"], 1);
        assert_eq!(value["username"], "user1");
        assert_eq!(value["action"], "start");
        assert!(value["timestamp"].as_str().unwrap().starts_with("1970-01-01T00:00:00"));
    }

    #[test]
    fn test_parse_events_reports_line_number() {
        let good = event_at(1, 1, "start").to_line().unwrap();
        let content = format!("{}\n\n{{not json\n", good);
        match parse_events(&content) {
            Err(AppError::CorruptLog { line, .. }) => assert_eq!(line, 3),
            other => panic!("expected corrupt log error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_append_then_read_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("bot_log.json");
        let log = ActivityLog::open(&path).await.unwrap();

        let first = event_at(10, 1, "start");
        let second = event_at(20, 2, "unhandled:hello");
        log.append(&first).await.unwrap();
        log.append(&second).await.unwrap();

        let events = read_events(&path).await.unwrap();
        assert_eq!(events, vec![first, second]);
    }

    #[tokio::test]
    async fn test_reopen_appends_instead_of_truncating() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bot_log.json");

        ActivityLog::open(&path).await.unwrap().append(&event_at(1, 1, "start")).await.unwrap();
        ActivityLog::open(&path).await.unwrap().append(&event_at(2, 1, "help")).await.unwrap();

        assert_eq!(read_events(&path).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_append_after_partial_tail_starts_new_line() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bot_log.json");
        let good = event_at(1, 1, "start").to_line().unwrap();
        fs::write(&path, format!("{}\n{{\"timestamp", good)).await.unwrap();

        let log = ActivityLog::open(&path).await.unwrap();
        let bob = event_at(2, 2, "help");
        log.append(&bob).await.unwrap();
        log.append(&event_at(3, 2, "about")).await.unwrap();

        let content = fs::read_to_string(&path).await.unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[1], "{\"timestamp");
        assert_eq!(ActivityEvent::from_line(lines[2]).unwrap(), bob);
        assert_eq!(ActivityEvent::from_line(lines[3]).unwrap().action, "about");

        let (events, skipped) = read_events_lossy(&path).await.unwrap();
        let actions: Vec<&str> = events.iter().map(|e| e.action.as_str()).collect();
        assert_eq!(actions, vec!["start", "help", "about"]);
        assert_eq!(skipped, vec![2]);
    }

    #[tokio::test]
    async fn test_append_after_failed_write_starts_new_line() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bot_log.json");
        let log = ActivityLog::open(&path).await.unwrap();
        log.append(&event_at(1, 1, "start")).await.unwrap();

        // What a write cut short leaves behind
        {
            let mut writer = log.writer.lock().await;
            writer.file.write_all(b"{\"timestamp\":\"19").await.unwrap();
            writer.needs_newline = true;
        }
        log.append(&event_at(2, 2, "help")).await.unwrap();

        let content = fs::read_to_string(&path).await.unwrap();
        let actions: Vec<String> = content
            .lines()
            .filter_map(|line| ActivityEvent::from_line(line).ok())
            .map(|e| e.action)
            .collect();
        assert_eq!(actions, vec!["start", "help"]);
        assert_eq!(content.lines().count(), 3);
    }

    #[tokio::test]
    async fn test_clean_log_is_not_padded() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bot_log.json");
        ActivityLog::open(&path).await.unwrap().append(&event_at(1, 1, "start")).await.unwrap();
        ActivityLog::open(&path).await.unwrap().append(&event_at(2, 1, "help")).await.unwrap();

        let content = fs::read_to_string(&path).await.unwrap();
        assert!(!content.contains("\n\n"));
        assert!(!content.starts_with('\n'));
    }

    #[test]
    fn test_summary_counts() {
        let events = vec![
            event_at(30, 1, "start"),
            event_at(10, 2, "message:hi"),
            event_at(20, 1, "error:about"),
            event_at(40, 3, "unhandled:/nope"),
            event_at(50, 2, "message:again"),
        ];
        let summary = ActivitySummary::from_events(&events);

        assert_eq!(summary.total_events, 5);
        assert_eq!(summary.unique_users, 3);
        assert_eq!(summary.errors, 1);
        assert_eq!(summary.unhandled, 1);
        assert_eq!(summary.by_kind.get("message"), Some(&2));
        assert_eq!(summary.first_seen, Some(Utc.timestamp_opt(10, 0).unwrap()));
        assert_eq!(summary.last_seen, Some(Utc.timestamp_opt(50, 0).unwrap()));
    }

    #[test]
    fn test_action_kind() {
        assert_eq!(action_kind("start"), "start");
        assert_eq!(action_kind("callback:about"), "callback");
        assert_eq!(action_kind("unhandled:a:b"), "unhandled");
    }
}
