use chrono::{DateTime, Utc};

use crate::SessionId;

/// Where an export ended up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportReceipt {
    pub path: String,
    pub rows: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// Start-up: open the first session.
    ConnectRequested,
    /// User asked to reconnect the stream now.
    ReconnectClicked { at: DateTime<Utc> },
    /// Transport established a session.
    SessionOpened { session: SessionId, at: DateTime<Utc> },
    /// Transport lost a session, or failed to establish it; a retry is already scheduled.
    SessionClosed {
        session: SessionId,
        reason: String,
        at: DateTime<Utc>,
    },
    /// One raw inbound frame, verbatim.
    FrameReceived {
        session: SessionId,
        text: String,
        at: DateTime<Utc>,
    },
    /// User asked for a CSV export of the collected jobs.
    ExportClicked { at: DateTime<Utc> },
    /// The export artifact was written, or failed to be.
    ExportFinished {
        result: Result<ExportReceipt, String>,
        at: DateTime<Utc>,
    },
    /// User asked for a backend health check.
    PingClicked,
    /// Health check outcome.
    BackendProbed { reachable: bool, at: DateTime<Utc> },
    /// User cleared jobs and logs.
    ClearClicked,
    /// Fallback for input that maps to nothing.
    NoOp,
}
