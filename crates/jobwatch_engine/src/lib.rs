//! Jobwatch engine: stream sessions, health probing and export writes.
mod connection;
mod endpoint;
mod engine;
mod health;
mod persist;
mod types;

pub use connection::{
    ConnectionCommand, ConnectionSettings, ConnectionSink, ConnectionSupervisor, Connector,
    FrameStream, WsConnector, DEFAULT_CONNECT_TIMEOUT, DEFAULT_RECONNECT_DELAY,
};
pub use endpoint::{health_endpoint, stream_endpoint, EndpointError, HEALTH_PATH, STREAM_PATH};
pub use engine::{
    EngineCommand, EngineConfig, EngineEvent, EngineEvents, EngineHandle, DEFAULT_PROBE_TIMEOUT,
};
pub use health::{HealthProbe, ProbeError};
pub use persist::{ensure_output_dir, ExportWriter, PersistError};
pub use types::{ConnectionEvent, ConnectionEventKind, SessionToken, TransportError};
