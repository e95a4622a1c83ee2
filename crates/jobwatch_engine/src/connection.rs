//! Stream session supervision.
//!
//! One supervisor task owns at most one live session and at most one pending
//! retry timer. A `Connect` command always tears both down before opening a
//! new session, so a manual reconnect can never race an automatic one.

use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use futures_util::stream::{BoxStream, StreamExt};
use jobwatch_logging::{watch_debug, watch_info, watch_warn};
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::time::{sleep, timeout, Sleep};
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::{Error as WsError, Message};
use url::Url;

use crate::{ConnectionEvent, ConnectionEventKind, SessionToken, TransportError};

pub const DEFAULT_RECONNECT_DELAY: Duration = Duration::from_millis(1200);
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Text frames of one session, in arrival order. The stream ends when the session does.
pub type FrameStream = BoxStream<'static, Result<String, TransportError>>;

#[derive(Debug, Clone)]
pub struct ConnectionSettings {
    pub endpoint: Url,
    /// Fixed delay before the single retry armed after a session loss.
    pub reconnect_delay: Duration,
    pub connect_timeout: Duration,
}

impl ConnectionSettings {
    pub fn new(endpoint: Url) -> Self {
        Self {
            endpoint,
            reconnect_delay: DEFAULT_RECONNECT_DELAY,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
        }
    }
}

#[async_trait::async_trait]
pub trait Connector: Send + Sync {
    async fn connect(&self, endpoint: &Url) -> Result<FrameStream, TransportError>;
}

pub trait ConnectionSink: Send + Sync {
    fn emit(&self, event: ConnectionEvent);
}

/// WebSocket transport.
#[derive(Debug, Clone, Copy, Default)]
pub struct WsConnector;

#[async_trait::async_trait]
impl Connector for WsConnector {
    async fn connect(&self, endpoint: &Url) -> Result<FrameStream, TransportError> {
        let (stream, _response) = connect_async(endpoint.as_str())
            .await
            .map_err(|err| TransportError::Connect(err.to_string()))?;
        let frames = stream
            .filter_map(|message| futures_util::future::ready(frame_from_message(message)));
        Ok(frames.boxed())
    }
}

fn frame_from_message(
    message: Result<Message, WsError>,
) -> Option<Result<String, TransportError>> {
    match message {
        Ok(Message::Text(text)) => Some(Ok(text)),
        Ok(Message::Binary(bytes)) => Some(Ok(String::from_utf8_lossy(&bytes).into_owned())),
        Ok(Message::Ping(_) | Message::Pong(_) | Message::Close(_) | Message::Frame(_)) => None,
        Err(WsError::ConnectionClosed | WsError::AlreadyClosed) => None,
        Err(err) => Some(Err(TransportError::Stream(err.to_string()))),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionCommand {
    /// Open a session now, superseding any live session and pending retry.
    Connect,
    Shutdown,
}

struct LiveSession {
    token: SessionToken,
    frames: FrameStream,
}

pub struct ConnectionSupervisor {
    connector: Arc<dyn Connector>,
    settings: ConnectionSettings,
    sink: Arc<dyn ConnectionSink>,
    last_token: SessionToken,
    session: Option<LiveSession>,
    retry: Option<Pin<Box<Sleep>>>,
}

impl ConnectionSupervisor {
    pub fn new(
        connector: Arc<dyn Connector>,
        settings: ConnectionSettings,
        sink: Arc<dyn ConnectionSink>,
    ) -> Self {
        Self {
            connector,
            settings,
            sink,
            last_token: SessionToken::default(),
            session: None,
            retry: None,
        }
    }

    /// Runs until `Shutdown` arrives or every command sender is dropped.
    pub async fn run(mut self, mut commands: UnboundedReceiver<ConnectionCommand>) {
        loop {
            tokio::select! {
                command = commands.recv() => match command {
                    Some(ConnectionCommand::Connect) => {
                        if !self.connect(&mut commands).await {
                            break;
                        }
                    }
                    Some(ConnectionCommand::Shutdown) | None => break,
                },
                frame = next_frame(&mut self.session) => self.on_frame(frame),
                () = retry_elapsed(&mut self.retry) => {
                    self.retry = None;
                    if !self.connect(&mut commands).await {
                        break;
                    }
                }
            }
        }
        if let Some(live) = self.session.take() {
            watch_info!("Closing session {} on shutdown", live.token);
        }
    }

    /// Opens a new session. Commands arriving while the attempt is in flight are
    /// served immediately: `Connect` abandons the attempt for a fresh one, `Shutdown`
    /// abandons it and returns `false`.
    async fn connect(&mut self, commands: &mut UnboundedReceiver<ConnectionCommand>) -> bool {
        loop {
            self.retry = None;
            if let Some(previous) = self.session.take() {
                watch_info!("Dropping session {} for a new connection", previous.token);
            }

            let token = self.last_token.next();
            self.last_token = token;
            watch_info!("Opening session {} to {}", token, self.settings.endpoint);

            let connector = Arc::clone(&self.connector);
            let endpoint = self.settings.endpoint.clone();
            let attempt = timeout(self.settings.connect_timeout, async move {
                connector.connect(&endpoint).await
            });

            tokio::select! {
                outcome = attempt => {
                    match outcome {
                        Ok(Ok(frames)) => {
                            self.session = Some(LiveSession { token, frames });
                            self.emit(token, ConnectionEventKind::Opened);
                        }
                        Ok(Err(err)) => self.lose(token, err),
                        Err(_) => self.lose(token, TransportError::ConnectTimeout),
                    }
                    return true;
                }
                command = commands.recv() => match command {
                    Some(ConnectionCommand::Connect) => {
                        watch_info!("Abandoning attempt {} for a newer connect", token);
                    }
                    Some(ConnectionCommand::Shutdown) | None => {
                        watch_info!("Abandoning attempt {} on shutdown", token);
                        return false;
                    }
                },
            }
        }
    }

    fn on_frame(&mut self, frame: Option<Result<String, TransportError>>) {
        let Some(token) = self.session.as_ref().map(|live| live.token) else {
            return;
        };
        match frame {
            Some(Ok(text)) => {
                watch_debug!("Session {} frame of {} bytes", token, text.len());
                self.emit(token, ConnectionEventKind::Frame(text));
            }
            Some(Err(err)) => self.lose(token, err),
            None => self.lose(token, TransportError::Closed),
        }
    }

    fn lose(&mut self, token: SessionToken, err: TransportError) {
        watch_warn!(
            "Session {} lost: {}; retrying in {:?}",
            token,
            err,
            self.settings.reconnect_delay
        );
        self.session = None;
        self.emit(
            token,
            ConnectionEventKind::Closed {
                reason: err.to_string(),
            },
        );
        self.retry = Some(Box::pin(sleep(self.settings.reconnect_delay)));
    }

    fn emit(&self, session: SessionToken, kind: ConnectionEventKind) {
        self.sink.emit(ConnectionEvent { session, kind });
    }
}

async fn next_frame(session: &mut Option<LiveSession>) -> Option<Result<String, TransportError>> {
    match session {
        Some(live) => live.frames.next().await,
        None => std::future::pending().await,
    }
}

async fn retry_elapsed(retry: &mut Option<Pin<Box<Sleep>>>) {
    match retry {
        Some(timer) => timer.as_mut().await,
        None => std::future::pending().await,
    }
}
