#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use futures_util::stream::{self, StreamExt};
use jobwatch_engine::{
    ConnectionEvent, ConnectionEventKind, ConnectionSink, Connector, FrameStream, SessionToken,
    TransportError,
};
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};
use url::Url;

pub type FrameSender = UnboundedSender<Result<String, TransportError>>;

/// Scripted outcome of one connect attempt; attempts beyond the script succeed.
#[derive(Debug, Clone)]
pub enum Attempt {
    Accept,
    Refuse(String),
    /// Never completes; only a timeout or a newer command ends it.
    Hang,
}

/// In-memory transport. Every accepted session is fed by a sender the test controls;
/// dropping that sender ends the session.
#[derive(Default)]
pub struct ScriptedConnector {
    attempts: AtomicUsize,
    script: Mutex<VecDeque<Attempt>>,
    sessions: Mutex<Vec<Option<FrameSender>>>,
}

impl ScriptedConnector {
    pub fn scripted(attempts: impl IntoIterator<Item = Attempt>) -> Arc<Self> {
        let connector = Self::default();
        connector
            .script
            .lock()
            .unwrap()
            .extend(attempts);
        Arc::new(connector)
    }

    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }

    /// Sender feeding the `index`-th accepted session.
    pub fn session(&self, index: usize) -> FrameSender {
        self.sessions.lock().unwrap()[index]
            .clone()
            .expect("session sender still held")
    }

    pub fn end_session(&self, index: usize) {
        self.sessions.lock().unwrap()[index] = None;
    }

    pub fn accepted(&self) -> usize {
        self.sessions.lock().unwrap().len()
    }
}

#[async_trait::async_trait]
impl Connector for ScriptedConnector {
    async fn connect(&self, _endpoint: &Url) -> Result<FrameStream, TransportError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        let next = self.script.lock().unwrap().pop_front();
        match next {
            Some(Attempt::Refuse(reason)) => return Err(TransportError::Connect(reason)),
            Some(Attempt::Hang) => std::future::pending::<()>().await,
            Some(Attempt::Accept) | None => {}
        }
        let (tx, rx) = unbounded_channel();
        self.sessions.lock().unwrap().push(Some(tx));
        let frames = stream::unfold(rx, |mut rx| async move {
            rx.recv().await.map(|frame| (frame, rx))
        });
        Ok(frames.boxed())
    }
}

pub struct RecordingSink {
    tx: UnboundedSender<ConnectionEvent>,
}

impl RecordingSink {
    pub fn new() -> (Arc<Self>, UnboundedReceiver<ConnectionEvent>) {
        let (tx, rx) = unbounded_channel();
        (Arc::new(Self { tx }), rx)
    }
}

impl ConnectionSink for RecordingSink {
    fn emit(&self, event: ConnectionEvent) {
        let _ = self.tx.send(event);
    }
}

pub fn opened(session: u64) -> ConnectionEvent {
    ConnectionEvent {
        session: SessionToken::new(session),
        kind: ConnectionEventKind::Opened,
    }
}

pub fn frame(session: u64, text: &str) -> ConnectionEvent {
    ConnectionEvent {
        session: SessionToken::new(session),
        kind: ConnectionEventKind::Frame(text.to_string()),
    }
}

pub fn closed(session: u64, reason: &str) -> ConnectionEvent {
    ConnectionEvent {
        session: SessionToken::new(session),
        kind: ConnectionEventKind::Closed {
            reason: reason.to_string(),
        },
    }
}
