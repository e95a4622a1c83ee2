//! Jobwatch core: pure session state machine, stream dispatcher and view-model helpers.
mod dispatch;
mod effect;
mod export;
mod job;
mod job_store;
mod log_buffer;
mod msg;
mod run_status;
mod state;
mod update;
mod view_model;

pub use dispatch::{parse_frame, FrameError, StreamEvent, MAX_ECHOED_FRAME};
pub use effect::Effect;
pub use export::{export_filename, render_csv, ExportError, CSV_HEADER, DEFAULT_EXPORT_PREFIX};
pub use job::{Company, CompanyProfile, JobKey, JobRecord, JobStage, SalaryRange, SkillsGap};
pub use job_store::{JobSnapshot, JobStore, StoredJob, UpsertError, UpsertOutcome};
pub use log_buffer::{LogBuffer, LogEntry, LogLevel, LOG_CAPACITY};
pub use msg::{ExportReceipt, Msg};
pub use run_status::{classify_status, RunSignal, RunStatus, RunStatusTracker};
pub use state::{AppState, BackendStatus, ConnectionState, Notice, SessionId};
pub use update::update;
pub use view_model::{AppViewModel, JobRowView, ScoreBand, MAX_REASONS_SHOWN};
