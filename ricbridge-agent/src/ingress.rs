//! Config ingress server
//!
//! Legacy path: the agent connects, pushes one framed JSON document and
//! disconnects. Connections are served one at a time by a single accept
//! loop; each body is handed to a [`ConfigHandler`].

use std::net::{Ipv4Addr, SocketAddr};
use std::sync::Arc;
use std::time::Duration;

use ricbridge_common::{log_agent_frame, read_frame, Direction, IngressSettings};
use thiserror::Error;
use tokio::net::{TcpListener, TcpSocket, TcpStream};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

/// Upper bound on how long one pushing peer may take to deliver its frame.
pub const CONNECTION_READ_TIMEOUT: Duration = Duration::from_secs(5);

/// Ingress server errors.
#[derive(Debug, Error)]
pub enum IngressError {
    #[error("Failed to bind {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Server already running")]
    AlreadyRunning,
}

/// Consumes one pushed config document.
pub trait ConfigHandler: Send + Sync {
    fn handle_config(&self, json: &str) -> bool;
}

impl<F> ConfigHandler for F
where
    F: Fn(&str) -> bool + Send + Sync,
{
    fn handle_config(&self, json: &str) -> bool {
        self(json)
    }
}

struct Running {
    local_addr: SocketAddr,
    shutdown: watch::Sender<bool>,
    task: JoinHandle<()>,
}

/// One-shot framed JSON ingress.
pub struct ConfigIngressServer {
    bind_addr: SocketAddr,
    backlog: u32,
    handler: Arc<dyn ConfigHandler>,
    running: Option<Running>,
}

impl ConfigIngressServer {
    pub fn new(bind_addr: SocketAddr, backlog: u32, handler: Arc<dyn ConfigHandler>) -> Self {
        Self {
            bind_addr,
            backlog,
            handler,
            running: None,
        }
    }

    /// Listens on all interfaces at the configured port.
    pub fn from_settings(settings: &IngressSettings, handler: Arc<dyn ConfigHandler>) -> Self {
        Self::new(
            SocketAddr::from((Ipv4Addr::UNSPECIFIED, settings.port)),
            settings.backlog,
            handler,
        )
    }

    /// Binds, listens and spawns the accept loop.
    ///
    /// Returns the bound address (useful with port 0).
    pub async fn start(&mut self) -> Result<SocketAddr, IngressError> {
        if self.running.is_some() {
            return Err(IngressError::AlreadyRunning);
        }

        let listener = self.bind()?;
        let local_addr = listener.local_addr()?;
        let (shutdown, shutdown_rx) = watch::channel(false);
        let task = tokio::spawn(accept_loop(listener, Arc::clone(&self.handler), shutdown_rx));

        info!(addr = %local_addr, "Config ingress server listening");
        self.running = Some(Running {
            local_addr,
            shutdown,
            task,
        });
        Ok(local_addr)
    }

    fn bind(&self) -> Result<TcpListener, IngressError> {
        let bind_err = |source| IngressError::Bind {
            addr: self.bind_addr,
            source,
        };
        let socket = match self.bind_addr {
            SocketAddr::V4(_) => TcpSocket::new_v4(),
            SocketAddr::V6(_) => TcpSocket::new_v6(),
        }
        .map_err(bind_err)?;
        socket.set_reuseaddr(true).map_err(bind_err)?;
        socket.bind(self.bind_addr).map_err(bind_err)?;
        socket.listen(self.backlog).map_err(bind_err)
    }

    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.running.as_ref().map(|running| running.local_addr)
    }

    pub fn is_running(&self) -> bool {
        self.running.is_some()
    }

    /// Closes the listening socket and waits for the accept loop.
    pub async fn stop(&mut self) {
        let Some(running) = self.running.take() else {
            return;
        };
        let _ = running.shutdown.send(true);
        if let Err(e) = running.task.await {
            error!("Config ingress task failed: {}", e);
        }
        info!(addr = %running.local_addr, "Config ingress server stopped");
    }
}

impl Drop for ConfigIngressServer {
    fn drop(&mut self) {
        if let Some(running) = self.running.take() {
            running.task.abort();
        }
    }
}

async fn accept_loop(
    listener: TcpListener,
    handler: Arc<dyn ConfigHandler>,
    mut shutdown: watch::Receiver<bool>,
) {
    loop {
        let accepted = tokio::select! {
            accepted = listener.accept() => accepted,
            _ = shutdown.changed() => break,
        };
        match accepted {
            Ok((stream, peer)) => {
                debug!(peer = %peer, "Config connection accepted");
                serve_connection(stream, peer, handler.as_ref()).await;
            }
            Err(e) => {
                warn!("Config ingress accept failed: {}", e);
                tokio::time::sleep(Duration::from_millis(50)).await;
            }
        }
    }
}

/// Reads one frame, hands it to the handler and closes the connection.
async fn serve_connection(mut stream: TcpStream, peer: SocketAddr, handler: &dyn ConfigHandler) {
    let body = match tokio::time::timeout(CONNECTION_READ_TIMEOUT, read_frame(&mut stream)).await {
        Ok(Ok(body)) => body,
        Ok(Err(e)) => {
            warn!(peer = %peer, "Failed to read config frame: {}", e);
            return;
        }
        Err(_) => {
            warn!(peer = %peer, "Timed out waiting for config frame");
            return;
        }
    };
    log_agent_frame(Direction::Rx, "config", &body);

    let json = String::from_utf8_lossy(&body);
    if json.trim().is_empty() {
        warn!(peer = %peer, "Empty config body");
        return;
    }
    if handler.handle_config(&json) {
        info!(peer = %peer, len = body.len(), "Config push applied");
    } else {
        warn!(peer = %peer, "Config push rejected by handler");
    }
}
