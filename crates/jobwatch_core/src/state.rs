use chrono::{DateTime, Utc};

use crate::job::{JobRecord, JobStage};
use crate::job_store::{JobSnapshot, JobStore, UpsertError, UpsertOutcome};
use crate::log_buffer::{LogBuffer, LogLevel};
use crate::run_status::{RunStatus, RunStatusTracker};
use crate::view_model::{AppViewModel, JobRowView};

/// Identifier of one connection attempt; a larger id supersedes every smaller one.
pub type SessionId = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectionState {
    Connected,
    #[default]
    Disconnected,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BackendStatus {
    #[default]
    Unknown,
    Reachable,
    Unreachable,
}

/// Short user-facing message, shown once by the view layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub title: String,
    pub message: String,
}

impl Notice {
    pub fn new(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            message: message.into(),
        }
    }
}

/// Session context: everything the console observes about one backend.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AppState {
    jobs: JobStore,
    logs: LogBuffer,
    run: RunStatusTracker,
    connection: ConnectionState,
    backend: BackendStatus,
    latest_session: SessionId,
    last_event: Option<String>,
    notice: Option<Notice>,
    dirty: bool,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn view(&self) -> AppViewModel {
        AppViewModel {
            connection: self.connection,
            run_status: self.run.status(),
            backend: self.backend,
            job_count: self.jobs.len(),
            log_count: self.logs.appended_since_clear(),
            jobs: self.jobs.iter().rev().map(JobRowView::from_stored).collect(),
            logs: self.logs.all(),
            last_event: self.last_event.clone(),
            dirty: self.dirty,
        }
    }

    pub fn jobs(&self) -> &JobStore {
        &self.jobs
    }

    pub fn logs(&self) -> &LogBuffer {
        &self.logs
    }

    pub fn run_status(&self) -> RunStatus {
        self.run.status()
    }

    pub fn connection(&self) -> ConnectionState {
        self.connection
    }

    pub fn backend(&self) -> BackendStatus {
        self.backend
    }

    pub fn latest_session(&self) -> SessionId {
        self.latest_session
    }

    pub fn last_event(&self) -> Option<&str> {
        self.last_event.as_deref()
    }

    pub fn snapshot_jobs(&self) -> JobSnapshot {
        self.jobs.snapshot()
    }

    /// Returns whether state changed since the last call, and resets the flag.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    /// Hands the pending notice to the view layer, at most once.
    pub fn take_notice(&mut self) -> Option<Notice> {
        self.notice.take()
    }

    pub(crate) fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub(crate) fn log(&mut self, at: DateTime<Utc>, level: LogLevel, message: impl Into<String>) {
        self.logs.push(at, level, message);
        self.mark_dirty();
    }

    pub(crate) fn upsert_job(
        &mut self,
        record: JobRecord,
        stage: JobStage,
    ) -> Result<UpsertOutcome, UpsertError> {
        let outcome = self.jobs.upsert(record, stage)?;
        self.mark_dirty();
        Ok(outcome)
    }

    pub(crate) fn observe_status(&mut self, text: &str) {
        if self.run.observe(text) {
            self.mark_dirty();
        }
    }

    pub(crate) fn set_last_event(&mut self, label: impl Into<String>) {
        self.last_event = Some(label.into());
        self.mark_dirty();
    }

    pub(crate) fn set_connection(&mut self, connection: ConnectionState) {
        self.connection = connection;
        self.mark_dirty();
    }

    pub(crate) fn set_backend(&mut self, backend: BackendStatus) {
        self.backend = backend;
        self.mark_dirty();
    }

    pub(crate) fn set_notice(&mut self, notice: Notice) {
        self.notice = Some(notice);
        self.mark_dirty();
    }

    /// Accepts `session` unless an attempt newer than it has already been seen.
    pub(crate) fn accept_session(&mut self, session: SessionId) -> bool {
        if session < self.latest_session {
            return false;
        }
        self.latest_session = session;
        true
    }

    pub(crate) fn clear(&mut self) {
        self.jobs.clear();
        self.logs.clear();
        self.last_event = None;
        self.notice = None;
        self.mark_dirty();
    }
}
