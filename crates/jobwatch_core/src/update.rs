use jobwatch_logging::watch_debug;

use crate::dispatch::dispatch_frame;
use crate::export::{render_csv, ExportError};
use crate::log_buffer::LogLevel;
use crate::{AppState, BackendStatus, ConnectionState, Effect, Msg, Notice};

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: AppState, msg: Msg) -> (AppState, Vec<Effect>) {
    let effects = match msg {
        Msg::ConnectRequested => vec![Effect::Connect],
        Msg::ReconnectClicked { at } => {
            state.log(at, LogLevel::Info, "Reconnecting stream...");
            vec![Effect::Connect]
        }
        Msg::SessionOpened { session, at } => {
            if state.accept_session(session) {
                state.set_connection(ConnectionState::Connected);
                state.set_last_event("stream connected");
                state.log(at, LogLevel::Info, "Stream connected.");
            } else {
                watch_debug!("Ignoring open of stale session {}", session);
            }
            Vec::new()
        }
        Msg::SessionClosed {
            session,
            reason,
            at,
        } => {
            if state.accept_session(session) {
                state.set_connection(ConnectionState::Disconnected);
                state.set_last_event("stream disconnected");
                state.log(
                    at,
                    LogLevel::Warn,
                    format!("Stream disconnected ({reason}). Retrying..."),
                );
            } else {
                watch_debug!("Ignoring close of stale session {}", session);
            }
            Vec::new()
        }
        Msg::FrameReceived { session, text, at } => {
            if session < state.latest_session() {
                watch_debug!("Ignoring frame from stale session {}", session);
            } else {
                dispatch_frame(&mut state, &text, at);
            }
            Vec::new()
        }
        Msg::ExportClicked { at } => match render_csv(&state.snapshot_jobs()) {
            Ok(csv) => {
                let rows = state.jobs().len();
                state.log(at, LogLevel::Info, format!("Exporting {rows} jobs..."));
                vec![Effect::WriteExport { csv, rows }]
            }
            Err(ExportError::NoData) => {
                state.set_notice(Notice::new("Export", "No data to export."));
                Vec::new()
            }
        },
        Msg::ExportFinished { result, at } => {
            match result {
                Ok(receipt) => {
                    let message = format!("Exported {} jobs to {}", receipt.rows, receipt.path);
                    state.log(at, LogLevel::Success, message.clone());
                    state.set_notice(Notice::new("Export", message));
                }
                Err(reason) => {
                    state.log(at, LogLevel::Error, format!("Export failed: {reason}"));
                }
            }
            Vec::new()
        }
        Msg::PingClicked => vec![Effect::PingBackend],
        Msg::BackendProbed { reachable, at } => {
            if reachable {
                state.set_backend(BackendStatus::Reachable);
                state.log(at, LogLevel::Success, "Backend connection established.");
            } else {
                state.set_backend(BackendStatus::Unreachable);
            }
            Vec::new()
        }
        Msg::ClearClicked => {
            state.clear();
            Vec::new()
        }
        Msg::NoOp => Vec::new(),
    };

    (state, effects)
}
