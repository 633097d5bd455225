//! xApp receive loop

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::dispatcher::MessageDispatcher;
use crate::rmr::RmrTransport;

/// Pause after a failed receive before polling the transport again.
const RECEIVE_RETRY_DELAY: Duration = Duration::from_millis(50);

/// Counters reported when the loop ends.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReceiverStats {
    pub received: u64,
    pub replied: u64,
    pub errors: u64,
}

/// Pulls messages from RMR and dispatches them one at a time.
pub struct XappReceiver {
    transport: Arc<dyn RmrTransport>,
    dispatcher: Arc<MessageDispatcher>,
}

impl XappReceiver {
    pub fn new(transport: Arc<dyn RmrTransport>, dispatcher: Arc<MessageDispatcher>) -> Self {
        Self {
            transport,
            dispatcher,
        }
    }

    /// Runs until `shutdown` flips to true or the transport closes.
    ///
    /// Messages the dispatcher rewrote into replies are returned to their
    /// sender.
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) -> ReceiverStats {
        let mut stats = ReceiverStats::default();
        info!("xApp receive loop started");

        loop {
            if *shutdown.borrow() {
                break;
            }
            let received = tokio::select! {
                received = self.transport.receive() => received,
                _ = shutdown.changed() => break,
            };

            let mut message = match received {
                Ok(Some(message)) => message,
                Ok(None) => {
                    info!("RMR transport closed");
                    break;
                }
                Err(e) => {
                    stats.errors += 1;
                    warn!("RMR receive failed: {}", e);
                    tokio::select! {
                        _ = tokio::time::sleep(RECEIVE_RETRY_DELAY) => continue,
                        _ = shutdown.changed() => break,
                    }
                }
            };
            stats.received += 1;

            if self.dispatcher.dispatch(&mut message).await {
                let mtype = message.mtype;
                match self.transport.return_to_sender(message).await {
                    Ok(()) => {
                        stats.replied += 1;
                        debug!(mtype, "Reply returned to sender");
                    }
                    Err(e) => {
                        stats.errors += 1;
                        warn!(mtype, "Failed to return reply: {}", e);
                    }
                }
            }
        }

        info!(
            received = stats.received,
            replied = stats.replied,
            errors = stats.errors,
            "xApp receive loop stopped"
        );
        stats
    }
}
