//! Mock decision agent for integration testing
//!
//! A framed TCP server speaking the agent protocol: it records every frame
//! the bridge sends, answers `recommendation_request` frames with a
//! scripted reply, and can push frames (e.g. control commands) to every
//! connected client.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use ricbridge_common::{read_frame, write_frame};
use serde_json::Value;
use thiserror::Error;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;
use tracing::{debug, info};

/// Mock agent errors
#[derive(Debug, Error)]
pub enum MockAgentError {
    #[error("Failed to bind mock agent: {0}")]
    Bind(#[from] std::io::Error),
}

/// Reply used until a test scripts another one
pub const DEFAULT_REPLY: &str = r#"{"type":"recommendation","action":"no_action"}"#;

#[derive(Default)]
struct State {
    frames: Mutex<Vec<String>>,
    reply: Mutex<String>,
    connections: AtomicUsize,
}

/// Framed TCP agent bound to an ephemeral local port.
pub struct MockAgent {
    addr: SocketAddr,
    state: Arc<State>,
    pushes: broadcast::Sender<Vec<u8>>,
    task: JoinHandle<()>,
}

impl MockAgent {
    /// Binds `127.0.0.1:0` and starts accepting connections.
    pub async fn start() -> Result<Self, MockAgentError> {
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let state = Arc::new(State {
            reply: Mutex::new(DEFAULT_REPLY.to_string()),
            ..State::default()
        });
        let (pushes, _) = broadcast::channel(64);

        let task = tokio::spawn(accept_loop(listener, Arc::clone(&state), pushes.clone()));
        info!(%addr, "Mock agent listening");
        Ok(Self {
            addr,
            state,
            pushes,
            task,
        })
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    pub fn port(&self) -> u16 {
        self.addr.port()
    }

    /// Connections accepted so far.
    pub fn connection_count(&self) -> usize {
        self.state.connections.load(Ordering::SeqCst)
    }

    /// Every frame body received, in arrival order.
    pub fn frames(&self) -> Vec<String> {
        self.state.frames.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    /// Received frames whose `type` is `kind`, parsed.
    pub fn frames_of_type(&self, kind: &str) -> Vec<Value> {
        self.frames()
            .iter()
            .filter_map(|body| serde_json::from_str::<Value>(body).ok())
            .filter(|frame| frame["type"] == kind)
            .collect()
    }

    /// Sets the body sent in answer to each recommendation request.
    pub fn set_recommendation_reply(&self, reply: &str) {
        *self.state.reply.lock().unwrap_or_else(PoisonError::into_inner) = reply.to_string();
    }

    /// Sends `body` as a frame to every connected client. Returns how many
    /// connections it was queued for.
    pub fn push(&self, body: &str) -> usize {
        self.pushes.send(body.as_bytes().to_vec()).unwrap_or(0)
    }
}

impl Drop for MockAgent {
    fn drop(&mut self) {
        self.task.abort();
    }
}

async fn accept_loop(listener: TcpListener, state: Arc<State>, pushes: broadcast::Sender<Vec<u8>>) {
    while let Ok((stream, peer)) = listener.accept().await {
        let subscription = pushes.subscribe();
        state.connections.fetch_add(1, Ordering::SeqCst);
        debug!(%peer, "Mock agent accepted connection");
        tokio::spawn(serve_connection(stream, Arc::clone(&state), subscription));
    }
}

async fn serve_connection(
    stream: TcpStream,
    state: Arc<State>,
    mut pushes: broadcast::Receiver<Vec<u8>>,
) {
    let (mut reader, mut writer) = stream.into_split();
    let (replies_tx, mut replies) = mpsc::unbounded_channel::<Vec<u8>>();

    // Writes replies and pushes; both receivers are cancel safe.
    let writer_task = tokio::spawn(async move {
        loop {
            let body = tokio::select! {
                reply = replies.recv() => match reply {
                    Some(reply) => reply,
                    None => break,
                },
                push = pushes.recv() => match push {
                    Ok(push) => push,
                    Err(broadcast::error::RecvError::Lagged(_)) => continue,
                    Err(broadcast::error::RecvError::Closed) => break,
                },
            };
            if write_frame(&mut writer, &body).await.is_err() {
                break;
            }
        }
    });

    while let Ok(body) = read_frame(&mut reader).await {
        let text = String::from_utf8_lossy(&body).into_owned();
        let is_request = serde_json::from_str::<Value>(&text)
            .map(|frame| frame["type"] == "recommendation_request")
            .unwrap_or(false);
        state
            .frames
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(text);

        if is_request {
            let reply = state
                .reply
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .clone();
            if replies_tx.send(reply.into_bytes()).is_err() {
                break;
            }
        }
    }

    drop(replies_tx);
    writer_task.abort();
    debug!("Mock agent connection closed");
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_records_frames_and_answers_requests() {
        let agent = MockAgent::start().await.unwrap();
        agent.set_recommendation_reply(r#"{"cmd":"stop"}"#);

        let mut stream = TcpStream::connect(agent.addr()).await.unwrap();
        write_frame(&mut stream, br#"{"type":"kpi","meid":"gnb:1","kpi":{}}"#)
            .await
            .unwrap();
        write_frame(
            &mut stream,
            br#"{"type":"recommendation_request","meid":"gnb:1","kpi":{}}"#,
        )
        .await
        .unwrap();

        let reply = tokio::time::timeout(Duration::from_secs(2), read_frame(&mut stream))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(reply, br#"{"cmd":"stop"}"#);
        assert_eq!(agent.frames().len(), 2);
        assert_eq!(agent.frames_of_type("kpi").len(), 1);
        assert_eq!(agent.connection_count(), 1);
    }

    #[tokio::test]
    async fn test_push_reaches_connected_client() {
        let agent = MockAgent::start().await.unwrap();
        let mut stream = TcpStream::connect(agent.addr()).await.unwrap();

        crate::test_utils::wait_for_condition(
            || async { agent.connection_count() == 1 },
            Duration::from_secs(2),
            Duration::from_millis(10),
        )
        .await
        .unwrap();
        assert_eq!(agent.push(r#"{"type":"control","cmd":"stop"}"#), 1);

        let frame = tokio::time::timeout(Duration::from_secs(2), read_frame(&mut stream))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(frame, br#"{"type":"control","cmd":"stop"}"#);
    }
}
