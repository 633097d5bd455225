//! Agent transport client
//!
//! One persistent, lazily (re)connected stream to the decision agent is
//! shared by KPI publishing, recommendation round trips and unsolicited
//! control commands. The connection lock only guards writes: every
//! connection has its own reader task, so a slow or silent agent never
//! holds up a publish.
//!
//! # Connection lifecycle
//!
//! A connection is created on first use, checked for liveness before each
//! reuse, and dropped on any I/O or framing failure. The next operation
//! reconnects transparently.
//!
//! # Inbound routing
//!
//! The reader task classifies each frame. Frames of type `"control"` go to
//! the installed handler; legacy config pushes are logged; anything else is
//! the reply to the oldest outstanding recommendation request (the agent
//! answers in request order) or, with none outstanding, dropped.
//!
//! # Listener
//!
//! The listener task keeps a connection open while a control handler is
//! wanted. While disconnected it retries once every
//! `reconnect_every_polls` polls.

use std::collections::VecDeque;
use std::io;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex as StdMutex, MutexGuard, PoisonError, RwLock};
use std::time::Duration;

use async_trait::async_trait;
use ricbridge_common::{log_agent_frame, read_frame, write_frame, AgentSettings, Direction, FramingError};
use thiserror::Error;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpStream;
use tokio::sync::{oneshot, watch, Mutex};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, trace, warn};

use crate::message::{classify_inbound, interpret_reply, InboundMessage, OutboundMessage};

/// Agent transport errors.
#[derive(Debug, Error)]
pub enum AgentError {
    #[error("Framing error: {0}")]
    Framing(#[from] FramingError),

    #[error("Failed to connect to agent at {peer}: {source}")]
    Connect {
        peer: String,
        #[source]
        source: io::Error,
    },

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Failed to encode message: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("Not connected to agent")]
    NotConnected,

    #[error("Connection closed before the agent replied")]
    ReplyLost,

    #[error("Agent did not reply in time")]
    Timeout,
}

/// Opens streams to the agent, already split into read and write halves.
#[async_trait]
pub trait Connector: Send + Sync + 'static {
    type Reader: AsyncRead + Unpin + Send + 'static;
    type Writer: AsyncWrite + Unpin + Send + 'static;

    /// Opens a fresh stream.
    async fn connect(&self) -> io::Result<(Self::Reader, Self::Writer)>;

    /// Liveness check performed before a stream is reused.
    fn is_alive(&self, _writer: &Self::Writer) -> bool {
        true
    }

    /// Peer description used in log lines.
    fn peer(&self) -> String;
}

/// TCP connector for `host:port`.
#[derive(Debug, Clone)]
pub struct TcpConnector {
    peer: String,
    connect_timeout: Duration,
}

impl TcpConnector {
    pub fn new(settings: &AgentSettings) -> Self {
        Self {
            peer: settings.peer(),
            connect_timeout: settings.connect_timeout(),
        }
    }
}

#[async_trait]
impl Connector for TcpConnector {
    type Reader = OwnedReadHalf;
    type Writer = OwnedWriteHalf;

    async fn connect(&self) -> io::Result<(OwnedReadHalf, OwnedWriteHalf)> {
        let stream = tokio::time::timeout(self.connect_timeout, TcpStream::connect(&self.peer))
            .await
            .map_err(|_| io::Error::new(io::ErrorKind::TimedOut, "connect timed out"))??;
        stream.set_nodelay(true)?;
        Ok(stream.into_split())
    }

    /// A pending socket error (`SO_ERROR`) marks the stream broken.
    fn is_alive(&self, writer: &OwnedWriteHalf) -> bool {
        let stream: &TcpStream = writer.as_ref();
        matches!(stream.take_error(), Ok(None))
    }

    fn peer(&self) -> String {
        self.peer.clone()
    }
}

/// Receives control commands pushed by the agent.
#[async_trait]
pub trait ControlCommandHandler: Send + Sync {
    /// Handles one command for `meid`; returns whether it was accepted.
    async fn on_control_command(&self, meid: &str, cmd: &str) -> bool;
}

#[async_trait]
impl<F> ControlCommandHandler for F
where
    F: Fn(&str, &str) -> bool + Send + Sync,
{
    async fn on_control_command(&self, meid: &str, cmd: &str) -> bool {
        self(meid, cmd)
    }
}

type HandlerSlot = Arc<RwLock<Option<Arc<dyn ControlCommandHandler>>>>;

/// Reply slots of the outstanding recommendation requests, oldest first.
type PendingReplies = Arc<StdMutex<VecDeque<oneshot::Sender<String>>>>;

fn lock_pending(pending: &PendingReplies) -> MutexGuard<'_, VecDeque<oneshot::Sender<String>>> {
    pending.lock().unwrap_or_else(PoisonError::into_inner)
}

fn current_handler(slot: &HandlerSlot) -> Option<Arc<dyn ControlCommandHandler>> {
    slot.read().unwrap_or_else(PoisonError::into_inner).clone()
}

async fn deliver_control(slot: &HandlerSlot, meid: &str, cmd: &str) {
    match current_handler(slot) {
        Some(handler) => {
            if !handler.on_control_command(meid, cmd).await {
                warn!(meid, "Control handler rejected command: {}", cmd);
            }
        }
        None => debug!(meid, "No control handler installed, dropping command"),
    }
}

/// An open connection: the write half plus the task reading the other half.
struct Connection<W> {
    writer: W,
    pending: PendingReplies,
    reader: JoinHandle<()>,
}

impl<W> Connection<W> {
    fn is_open(&self) -> bool {
        !self.reader.is_finished()
    }
}

impl<W> Drop for Connection<W> {
    fn drop(&mut self) {
        self.reader.abort();
        // Waiting requests see their reply slot closed.
        lock_pending(&self.pending).clear();
    }
}

struct Inner<C: Connector> {
    connector: C,
    peer: String,
    conn: Mutex<Option<Connection<C::Writer>>>,
    handler: HandlerSlot,
    poll_interval: Duration,
    reconnect_every_polls: u32,
    recommendation_timeout: Option<Duration>,
    connects: AtomicU64,
}

struct ListenerHandle {
    shutdown: watch::Sender<bool>,
    task: JoinHandle<()>,
}

/// Client for the external decision agent.
pub struct AgentClient<C: Connector = TcpConnector> {
    inner: Arc<Inner<C>>,
    listener: StdMutex<Option<ListenerHandle>>,
}

impl AgentClient<TcpConnector> {
    /// Creates a TCP client for the configured agent. No connection is
    /// made until first use.
    pub fn new(settings: &AgentSettings) -> Self {
        Self::with_connector(TcpConnector::new(settings), settings)
    }
}

impl<C: Connector> AgentClient<C> {
    pub fn with_connector(connector: C, settings: &AgentSettings) -> Self {
        let peer = connector.peer();
        Self {
            inner: Arc::new(Inner {
                connector,
                peer,
                conn: Mutex::new(None),
                handler: HandlerSlot::default(),
                poll_interval: settings.poll_interval(),
                reconnect_every_polls: settings.reconnect_every_polls.max(1),
                recommendation_timeout: settings.recommendation_timeout(),
                connects: AtomicU64::new(0),
            }),
            listener: StdMutex::new(None),
        }
    }

    pub fn peer(&self) -> &str {
        &self.inner.peer
    }

    /// Number of connections opened so far.
    pub fn connect_count(&self) -> u64 {
        self.inner.connects.load(Ordering::Relaxed)
    }

    pub async fn is_connected(&self) -> bool {
        self.inner
            .conn
            .lock()
            .await
            .as_ref()
            .map_or(false, Connection::is_open)
    }

    /// Publishes a KPI document. Best effort: never retried.
    ///
    /// Returns false, and drops the connection, on any failure.
    pub async fn send_kpi(&self, meid: &str, kpi_json: &str) -> bool {
        match self.inner.send(OutboundMessage::kpi(meid, kpi_json)).await {
            Ok(()) => true,
            Err(e) => {
                warn!(peer = %self.inner.peer, meid, "Failed to send KPI: {}", e);
                false
            }
        }
    }

    /// Requests a recommendation and waits for the reply.
    ///
    /// Returns the trimmed reply body as the command to relay, or `None`
    /// for a "no action" reply or any failure. Other traffic on the
    /// connection, KPI publishes included, carries on while the reply is
    /// pending. A reply that arrives after the timeout is discarded.
    pub async fn get_recommendation(&self, meid: &str, kpi_json: &str) -> Option<String> {
        let request = OutboundMessage::recommendation_request(meid, kpi_json);
        match self.inner.request_recommendation(&request).await {
            Ok(reply) => {
                let cmd = interpret_reply(&reply);
                match &cmd {
                    Some(cmd) => info!(meid, "Agent recommended command: {}", cmd),
                    None => debug!(meid, "Agent recommended no action"),
                }
                cmd
            }
            Err(e) => {
                warn!(peer = %self.inner.peer, meid, "Recommendation request failed: {}", e);
                None
            }
        }
    }

    /// Installs `handler` for pushed control commands and makes sure the
    /// listener task runs.
    ///
    /// Calling this again replaces the handler; there is never more than
    /// one listener. A connection is attempted right away so commands can
    /// arrive before any KPI is sent.
    pub async fn start_control_command_listener(&self, handler: Arc<dyn ControlCommandHandler>) {
        *self
            .inner
            .handler
            .write()
            .unwrap_or_else(PoisonError::into_inner) = Some(handler);

        {
            let mut conn = self.inner.conn.lock().await;
            if let Err(e) = self.inner.ensure_connected(&mut conn).await {
                warn!("Control listener will retry connecting: {}", e);
            }
        }

        let mut listener = self.listener.lock().unwrap_or_else(PoisonError::into_inner);
        if listener.is_none() {
            let (shutdown, shutdown_rx) = watch::channel(false);
            let task = tokio::spawn(run_listener(Arc::clone(&self.inner), shutdown_rx));
            *listener = Some(ListenerHandle { shutdown, task });
            info!(peer = %self.inner.peer, "Control command listener started");
        }
    }

    /// Clears the control handler.
    ///
    /// The listener task keeps the connection up for legacy config pushes;
    /// control frames received afterwards are dropped. Use
    /// [`AgentClient::shutdown`] to stop it.
    pub fn stop_control_command_listener(&self) {
        *self
            .inner
            .handler
            .write()
            .unwrap_or_else(PoisonError::into_inner) = None;
        info!("Control command handler cleared");
    }

    pub fn is_listening(&self) -> bool {
        self.listener
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    /// Stops the listener task, waits for it and closes the connection.
    pub async fn shutdown(&self) {
        let handle = self
            .listener
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(handle) = handle {
            let _ = handle.shutdown.send(true);
            if let Err(e) = handle.task.await {
                error!("Control listener task failed: {}", e);
            }
            info!("Control command listener stopped");
        }
        self.inner.reset().await;
    }
}

impl<C: Connector> Drop for AgentClient<C> {
    fn drop(&mut self) {
        let handle = self
            .listener
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(handle) = handle {
            handle.task.abort();
        }
    }
}

impl<C: Connector> Inner<C> {
    /// Returns the live connection in `conn`, connecting first if needed.
    async fn ensure_connected<'a>(
        &self,
        conn: &'a mut Option<Connection<C::Writer>>,
    ) -> Result<&'a mut Connection<C::Writer>, AgentError> {
        let broken = conn
            .as_ref()
            .map_or(false, |c| !c.is_open() || !self.connector.is_alive(&c.writer));
        if broken {
            warn!(peer = %self.peer, "Agent connection is broken, reconnecting");
            *conn = None;
        }

        if conn.is_none() {
            let (reader, writer) = self
                .connector
                .connect()
                .await
                .map_err(|source| AgentError::Connect {
                    peer: self.peer.clone(),
                    source,
                })?;
            self.connects.fetch_add(1, Ordering::Relaxed);
            info!(peer = %self.peer, "Connected to agent");

            let pending = PendingReplies::default();
            let reader = tokio::spawn(read_loop(
                reader,
                Arc::clone(&pending),
                Arc::clone(&self.handler),
                self.peer.clone(),
            ));
            *conn = Some(Connection {
                writer,
                pending,
                reader,
            });
        }

        conn.as_mut().ok_or(AgentError::NotConnected)
    }

    async fn reset(&self) {
        if self.conn.lock().await.take().is_some() {
            debug!(peer = %self.peer, "Agent connection closed");
        }
    }

    async fn send(&self, message: OutboundMessage<'_>) -> Result<(), AgentError> {
        let body = message.to_bytes()?;
        let mut conn = self.conn.lock().await;
        let connection = self.ensure_connected(&mut conn).await?;
        if let Err(e) = write_frame(&mut connection.writer, &body).await {
            *conn = None;
            return Err(e.into());
        }
        log_agent_frame(Direction::Tx, message.kind(), &body);
        Ok(())
    }

    /// Writes the request under the connection lock, then waits for the
    /// reader task to hand over the reply with the lock released.
    async fn request_recommendation(&self, request: &OutboundMessage<'_>) -> Result<String, AgentError> {
        let body = request.to_bytes()?;
        let reply = {
            let mut conn = self.conn.lock().await;
            let connection = self.ensure_connected(&mut conn).await?;
            // Queued before the write so slots stay in request order.
            let (tx, rx) = oneshot::channel();
            lock_pending(&connection.pending).push_back(tx);
            if let Err(e) = write_frame(&mut connection.writer, &body).await {
                *conn = None;
                return Err(e.into());
            }
            log_agent_frame(Direction::Tx, request.kind(), &body);
            rx
        };

        let outcome = match self.recommendation_timeout {
            Some(limit) => tokio::time::timeout(limit, reply)
                .await
                .map_err(|_| AgentError::Timeout)?,
            None => reply.await,
        };
        outcome.map_err(|_| AgentError::ReplyLost)
    }

    #[cfg(test)]
    fn current_handler(&self) -> Option<Arc<dyn ControlCommandHandler>> {
        current_handler(&self.handler)
    }
}

/// Reads frames until the connection fails, routing each one.
async fn read_loop<R>(mut reader: R, pending: PendingReplies, handler: HandlerSlot, peer: String)
where
    R: AsyncRead + Unpin,
{
    loop {
        let body = match read_frame(&mut reader).await {
            Ok(body) => body,
            Err(FramingError::Closed) => {
                info!(peer = %peer, "Agent closed the connection");
                break;
            }
            Err(e) => {
                warn!(peer = %peer, "Agent read failed: {}", e);
                break;
            }
        };
        log_agent_frame(Direction::Rx, "inbound", &body);

        let text = String::from_utf8_lossy(&body).into_owned();
        match classify_inbound(&text) {
            InboundMessage::Control { meid, cmd } => {
                info!(meid = %meid, "Received control command from agent");
                deliver_control(&handler, &meid, &cmd).await;
            }
            InboundMessage::InvalidControl { reason } => {
                warn!("Ignoring control frame: {}", reason);
            }
            InboundMessage::LegacyConfig { kind } => {
                info!(kind = %kind, "Legacy config push received on agent channel, ignoring");
            }
            InboundMessage::Unclassified => {
                let waiter = lock_pending(&pending).pop_front();
                match waiter {
                    Some(waiter) => {
                        if waiter.send(text).is_err() {
                            debug!("Discarding reply to an abandoned recommendation request");
                        }
                    }
                    None => trace!(len = body.len(), "Dropping unsolicited frame"),
                }
            }
        }
    }
    lock_pending(&pending).clear();
}

/// Keeps a connection open for pushed commands until shutdown.
async fn run_listener<C: Connector>(inner: Arc<Inner<C>>, mut shutdown: watch::Receiver<bool>) {
    let mut idle_polls: u32 = 0;

    loop {
        tokio::select! {
            _ = tokio::time::sleep(inner.poll_interval) => {}
            _ = shutdown.changed() => break,
        }

        let mut conn = inner.conn.lock().await;
        if conn.as_ref().map_or(false, Connection::is_open) {
            idle_polls = 0;
            continue;
        }

        idle_polls += 1;
        if idle_polls >= inner.reconnect_every_polls {
            idle_polls = 0;
            if let Err(e) = inner.ensure_connected(&mut conn).await {
                debug!("Listener reconnect failed: {}", e);
            }
        }
    }
    debug!("Control listener exiting");
}
