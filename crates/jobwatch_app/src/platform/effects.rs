use std::sync::mpsc;
use std::thread;

use chrono::Utc;
use jobwatch_core::{export_filename, Effect, ExportReceipt, Msg};
use jobwatch_engine::{
    ConnectionEvent, ConnectionEventKind, EngineConfig, EngineEvent, EngineEvents, EngineHandle,
};
use jobwatch_logging::{watch_info, watch_warn};

use super::app::AppEvent;

pub struct EffectRunner {
    engine: EngineHandle,
    export_prefix: String,
}

impl EffectRunner {
    pub fn new(
        config: EngineConfig,
        export_prefix: String,
        event_tx: mpsc::Sender<AppEvent>,
    ) -> Self {
        let (engine, events) = EngineHandle::new(config);
        spawn_event_loop(events, event_tx);
        Self {
            engine,
            export_prefix,
        }
    }

    pub fn enqueue(&self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::Connect => self.engine.connect(),
                Effect::PingBackend => self.engine.ping_backend(),
                Effect::WriteExport { csv, rows } => {
                    let filename = export_filename(&self.export_prefix, Utc::now().date_naive());
                    watch_info!("WriteExport rows={} file={}", rows, filename);
                    self.engine.write_export(filename, csv, rows);
                }
            }
        }
    }

    pub fn shutdown(&self) {
        self.engine.shutdown();
    }
}

fn spawn_event_loop(events: EngineEvents, event_tx: mpsc::Sender<AppEvent>) {
    thread::spawn(move || {
        while let Some(event) = events.recv() {
            if event_tx.send(AppEvent::Core(map_event(event))).is_err() {
                break;
            }
        }
    });
}

fn map_event(event: EngineEvent) -> Msg {
    let at = Utc::now();
    match event {
        EngineEvent::Connection(ConnectionEvent { session, kind }) => {
            let session = session.value();
            match kind {
                ConnectionEventKind::Opened => Msg::SessionOpened { session, at },
                ConnectionEventKind::Closed { reason } => Msg::SessionClosed {
                    session,
                    reason,
                    at,
                },
                ConnectionEventKind::Frame(text) => Msg::FrameReceived { session, text, at },
            }
        }
        EngineEvent::BackendProbed(result) => {
            if let Err(err) = &result {
                watch_warn!("Backend probe failed: {}", err);
            }
            Msg::BackendProbed {
                reachable: result.is_ok(),
                at,
            }
        }
        EngineEvent::ExportWritten { rows, result } => Msg::ExportFinished {
            result: result
                .map(|path| ExportReceipt {
                    path: path.display().to_string(),
                    rows,
                })
                .map_err(|err| err.to_string()),
            at,
        },
    }
}
