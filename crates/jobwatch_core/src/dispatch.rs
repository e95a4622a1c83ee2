//! Inbound frame parsing and routing.
//!
//! A frame is a JSON envelope `{ "type": ..., "payload": ... }`. Nothing in here
//! propagates an error: every per-frame failure becomes a log line so the next
//! frame is processed normally.

use chrono::{DateTime, Utc};
use jobwatch_logging::{watch_debug, watch_warn};
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

use crate::job::{JobRecord, JobStage};
use crate::log_buffer::LogLevel;
use crate::state::AppState;

/// Longest slice of a malformed frame echoed into the activity log.
pub const MAX_ECHOED_FRAME: usize = 2048;

/// A frame classified by its `type`.
#[derive(Debug, Clone, PartialEq)]
pub enum StreamEvent {
    Log { level: LogLevel, message: String },
    JobFound(JobRecord),
    JobAnalyzed(JobRecord),
    Status(String),
    Unknown { kind: String },
}

#[derive(Debug, Error)]
pub enum FrameError {
    #[error("not a JSON envelope: {0}")]
    Envelope(#[source] serde_json::Error),
    #[error("invalid {kind} payload: {source}")]
    Payload {
        kind: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Deserialize)]
struct RawEnvelope {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    payload: Value,
}

pub fn parse_frame(raw: &str) -> Result<StreamEvent, FrameError> {
    let envelope: RawEnvelope = serde_json::from_str(raw).map_err(FrameError::Envelope)?;
    let payload = envelope.payload;

    let event = match envelope.kind.as_str() {
        "log" => StreamEvent::Log {
            level: payload
                .get("level")
                .and_then(Value::as_str)
                .map(LogLevel::parse)
                .unwrap_or_default(),
            message: payload
                .get("msg")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string(),
        },
        "job_found" => StreamEvent::JobFound(job_payload("job_found", payload)?),
        "job_analyzed" => StreamEvent::JobAnalyzed(job_payload("job_analyzed", payload)?),
        "status" => StreamEvent::Status(status_text(payload)),
        other => StreamEvent::Unknown {
            kind: other.to_string(),
        },
    };
    Ok(event)
}

fn job_payload(kind: &'static str, payload: Value) -> Result<JobRecord, FrameError> {
    JobRecord::from_payload(payload).map_err(|source| FrameError::Payload { kind, source })
}

/// Strings pass through; `null` is empty; anything else is its JSON text.
fn status_text(payload: Value) -> String {
    match payload {
        Value::String(text) => text,
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Parses one raw frame and applies it to the session context.
pub(crate) fn dispatch_frame(state: &mut AppState, raw: &str, at: DateTime<Utc>) {
    let event = match parse_frame(raw) {
        Ok(event) => event,
        Err(FrameError::Envelope(err)) => {
            watch_warn!("Dropping malformed frame: {}", err);
            state.log(
                at,
                LogLevel::Warn,
                format!("Malformed frame ignored: {}", echo(raw)),
            );
            return;
        }
        Err(err @ FrameError::Payload { .. }) => {
            watch_warn!("Dropping frame: {}", err);
            state.log(at, LogLevel::Error, format!("Event dropped: {err}"));
            return;
        }
    };

    match event {
        StreamEvent::Log { level, message } => state.log(at, level, message),
        StreamEvent::JobFound(record) => upsert(state, record, JobStage::Found, "job_found", at),
        StreamEvent::JobAnalyzed(record) => {
            upsert(state, record, JobStage::Analyzed, "job_analyzed", at)
        }
        StreamEvent::Status(text) => {
            state.log(at, LogLevel::Info, format!("Status: {text}"));
            state.observe_status(&text);
        }
        StreamEvent::Unknown { kind } => {
            watch_debug!("Unrecognized event type {:?}", kind);
            state.log(at, LogLevel::Info, format!("Unrecognized event type: {kind}"));
        }
    }
}

fn upsert(
    state: &mut AppState,
    record: JobRecord,
    stage: JobStage,
    kind: &str,
    at: DateTime<Utc>,
) {
    match state.upsert_job(record, stage) {
        Ok(outcome) => {
            watch_debug!("{} applied: {:?}", kind, outcome);
            state.set_last_event(kind);
        }
        Err(err) => {
            state.log(at, LogLevel::Warn, format!("{kind} ignored: {err}"));
        }
    }
}

fn echo(raw: &str) -> &str {
    if raw.len() <= MAX_ECHOED_FRAME {
        return raw;
    }
    let mut end = MAX_ECHOED_FRAME;
    while end > 0 && !raw.is_char_boundary(end) {
        end -= 1;
    }
    &raw[..end]
}
