//! Mock RMR transport
//!
//! Feeds scripted messages to the receive loop and records everything the
//! xApp sends or returns.

use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use ricbridge_xapp::{RicMessage, RmrError, RmrTransport};
use tokio::sync::mpsc;

/// In-memory [`RmrTransport`].
pub struct MockRmr {
    inbound: tokio::sync::Mutex<mpsc::UnboundedReceiver<RicMessage>>,
    sent: Mutex<Vec<RicMessage>>,
    returned: Mutex<Vec<RicMessage>>,
}

/// Handle used by a test to inject messages.
#[derive(Clone)]
pub struct MockRmrInjector {
    tx: mpsc::UnboundedSender<RicMessage>,
}

impl MockRmrInjector {
    /// Queues `message` for the receive loop. Returns false once the
    /// transport is gone.
    pub fn inject(&self, message: RicMessage) -> bool {
        self.tx.send(message).is_ok()
    }
}

impl MockRmr {
    /// Creates a transport; dropping every injector closes it.
    pub fn new() -> (Self, MockRmrInjector) {
        let (tx, rx) = mpsc::unbounded_channel();
        (
            Self {
                inbound: tokio::sync::Mutex::new(rx),
                sent: Mutex::new(Vec::new()),
                returned: Mutex::new(Vec::new()),
            },
            MockRmrInjector { tx },
        )
    }

    /// Messages sent with [`RmrTransport::send`].
    pub fn sent(&self) -> Vec<RicMessage> {
        self.sent.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    /// Replies sent with [`RmrTransport::return_to_sender`].
    pub fn returned(&self) -> Vec<RicMessage> {
        self.returned.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }
}

#[async_trait]
impl RmrTransport for MockRmr {
    async fn receive(&self) -> Result<Option<RicMessage>, RmrError> {
        Ok(self.inbound.lock().await.recv().await)
    }

    async fn send(&self, message: RicMessage) -> Result<(), RmrError> {
        self.sent
            .lock()
            .map_err(|_| RmrError::Send("mock poisoned".to_string()))?
            .push(message);
        Ok(())
    }

    async fn return_to_sender(&self, message: RicMessage) -> Result<(), RmrError> {
        self.returned
            .lock()
            .map_err(|_| RmrError::Send("mock poisoned".to_string()))?
            .push(message);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ricbridge_xapp::RIC_HEALTH_CHECK_REQ;

    #[tokio::test]
    async fn test_injected_messages_are_received_in_order() {
        let (rmr, injector) = MockRmr::new();
        assert!(injector.inject(RicMessage::new(RIC_HEALTH_CHECK_REQ, &b"a"[..])));
        assert!(injector.inject(RicMessage::new(RIC_HEALTH_CHECK_REQ, &b"b"[..])));
        drop(injector);

        assert_eq!(&rmr.receive().await.unwrap().unwrap().payload[..], b"a");
        assert_eq!(&rmr.receive().await.unwrap().unwrap().payload[..], b"b");
        assert!(rmr.receive().await.unwrap().is_none());
    }
}
