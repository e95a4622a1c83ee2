use std::path::PathBuf;
use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;

use jobwatch_logging::{watch_error, watch_info, watch_warn};
use tokio::sync::mpsc as async_mpsc;
use url::Url;

use crate::connection::{
    ConnectionCommand, ConnectionSettings, ConnectionSink, ConnectionSupervisor, Connector,
    WsConnector,
};
use crate::endpoint::{health_endpoint, stream_endpoint, EndpointError};
use crate::health::{HealthProbe, ProbeError};
use crate::persist::{ExportWriter, PersistError};
use crate::ConnectionEvent;

pub const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_secs(5);
const SHUTDOWN_GRACE: Duration = Duration::from_millis(500);

#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub connection: ConnectionSettings,
    pub health_url: Url,
    pub probe_timeout: Duration,
    pub export_dir: PathBuf,
}

impl EngineConfig {
    /// Derives the stream and health endpoints from one backend origin.
    pub fn from_origin(origin: &str, export_dir: PathBuf) -> Result<Self, EndpointError> {
        Ok(Self {
            connection: ConnectionSettings::new(stream_endpoint(origin)?),
            health_url: health_endpoint(origin)?,
            probe_timeout: DEFAULT_PROBE_TIMEOUT,
            export_dir,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineCommand {
    Connect,
    PingBackend,
    WriteExport {
        filename: String,
        contents: String,
        rows: usize,
    },
    Shutdown,
}

#[derive(Debug)]
pub enum EngineEvent {
    Connection(ConnectionEvent),
    /// `Ok` carries the 2xx status code.
    BackendProbed(Result<u16, ProbeError>),
    ExportWritten {
        rows: usize,
        result: Result<PathBuf, PersistError>,
    },
}

struct ChannelConnectionSink {
    tx: mpsc::Sender<EngineEvent>,
}

impl ConnectionSink for ChannelConnectionSink {
    fn emit(&self, event: ConnectionEvent) {
        let _ = self.tx.send(EngineEvent::Connection(event));
    }
}

/// Sends commands to the engine thread. Cheap to clone.
#[derive(Clone)]
pub struct EngineHandle {
    cmd_tx: mpsc::Sender<EngineCommand>,
}

/// Receiving end of the engine's event channel.
pub struct EngineEvents {
    event_rx: mpsc::Receiver<EngineEvent>,
}

impl EngineHandle {
    pub fn new(config: EngineConfig) -> (Self, EngineEvents) {
        Self::with_connector(config, Arc::new(WsConnector))
    }

    pub fn with_connector(
        config: EngineConfig,
        connector: Arc<dyn Connector>,
    ) -> (Self, EngineEvents) {
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (event_tx, event_rx) = mpsc::channel();

        thread::spawn(move || run_engine(config, connector, cmd_rx, event_tx));

        (Self { cmd_tx }, EngineEvents { event_rx })
    }

    pub fn send(&self, command: EngineCommand) {
        if self.cmd_tx.send(command).is_err() {
            watch_warn!("Engine thread is gone; command dropped");
        }
    }

    pub fn connect(&self) {
        self.send(EngineCommand::Connect);
    }

    pub fn ping_backend(&self) {
        self.send(EngineCommand::PingBackend);
    }

    pub fn write_export(&self, filename: impl Into<String>, contents: String, rows: usize) {
        self.send(EngineCommand::WriteExport {
            filename: filename.into(),
            contents,
            rows,
        });
    }

    pub fn shutdown(&self) {
        self.send(EngineCommand::Shutdown);
    }
}

impl EngineEvents {
    /// Blocks until the next event; `None` once the engine has stopped.
    pub fn recv(&self) -> Option<EngineEvent> {
        self.event_rx.recv().ok()
    }

    pub fn recv_timeout(&self, timeout: Duration) -> Option<EngineEvent> {
        self.event_rx.recv_timeout(timeout).ok()
    }

    pub fn try_recv(&self) -> Option<EngineEvent> {
        self.event_rx.try_recv().ok()
    }
}

fn run_engine(
    config: EngineConfig,
    connector: Arc<dyn Connector>,
    cmd_rx: mpsc::Receiver<EngineCommand>,
    event_tx: mpsc::Sender<EngineEvent>,
) {
    let runtime = match tokio::runtime::Runtime::new() {
        Ok(runtime) => runtime,
        Err(err) => {
            watch_error!("Failed to start engine runtime: {}", err);
            return;
        }
    };

    let (conn_tx, conn_rx) = async_mpsc::unbounded_channel();
    let sink: Arc<dyn ConnectionSink> = Arc::new(ChannelConnectionSink {
        tx: event_tx.clone(),
    });
    let supervisor = ConnectionSupervisor::new(connector, config.connection.clone(), sink);
    runtime.spawn(supervisor.run(conn_rx));

    let probe = HealthProbe::new(config.health_url.clone(), config.probe_timeout);
    let writer = ExportWriter::new(config.export_dir.clone());
    watch_info!(
        "Engine started: stream {} health {} exports {}",
        config.connection.endpoint,
        config.health_url,
        config.export_dir.display()
    );

    while let Ok(command) = cmd_rx.recv() {
        match command {
            EngineCommand::Connect => {
                let _ = conn_tx.send(ConnectionCommand::Connect);
            }
            EngineCommand::PingBackend => {
                let event_tx = event_tx.clone();
                match &probe {
                    Ok(probe) => {
                        let probe = probe.clone();
                        runtime.spawn(async move {
                            let result = probe.check().await;
                            let _ = event_tx.send(EngineEvent::BackendProbed(result));
                        });
                    }
                    Err(err) => {
                        let _ = event_tx.send(EngineEvent::BackendProbed(Err(err.clone())));
                    }
                }
            }
            EngineCommand::WriteExport {
                filename,
                contents,
                rows,
            } => {
                let writer = writer.clone();
                let event_tx = event_tx.clone();
                runtime.spawn_blocking(move || {
                    let result = writer.write(&filename, &contents);
                    let _ = event_tx.send(EngineEvent::ExportWritten { rows, result });
                });
            }
            EngineCommand::Shutdown => break,
        }
    }

    let _ = conn_tx.send(ConnectionCommand::Shutdown);
    runtime.shutdown_timeout(SHUTDOWN_GRACE);
    watch_info!("Engine stopped");
}
