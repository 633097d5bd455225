//! String command gateway
//!
//! Lets a scenario plug its own handler for control text received from the
//! RIC. The handler always runs on the simulation loop.

use std::sync::{Arc, PoisonError, RwLock};

use tracing::{debug, warn};

use crate::ran::RanModel;
use crate::scheduler::RunNowScheduler;

/// Scenario callback for a control string.
pub type GatewayHandler = Arc<dyn Fn(&str, &mut dyn RanModel) + Send + Sync>;

/// Routes control text to a registered handler via the run-now queue.
pub struct ControlGateway {
    scheduler: RunNowScheduler,
    handler: Arc<RwLock<Option<GatewayHandler>>>,
}

impl ControlGateway {
    pub fn new(scheduler: RunNowScheduler) -> Self {
        Self {
            scheduler,
            handler: Arc::new(RwLock::new(None)),
        }
    }

    /// Installs `handler`, replacing any previous one.
    pub fn register<F>(&self, handler: F)
    where
        F: Fn(&str, &mut dyn RanModel) + Send + Sync + 'static,
    {
        *self.handler.write().unwrap_or_else(PoisonError::into_inner) = Some(Arc::new(handler));
    }

    pub fn clear(&self) {
        *self.handler.write().unwrap_or_else(PoisonError::into_inner) = None;
    }

    pub fn has_handler(&self) -> bool {
        self.handler
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    /// Schedules the handler for `text`. Returns false when no handler is
    /// registered or the simulation loop is gone.
    ///
    /// The handler is looked up again when the task runs, so one cleared in
    /// between is not called.
    pub fn handle(&self, text: &str) -> bool {
        if !self.has_handler() {
            warn!("No control gateway handler registered");
            return false;
        }

        let text = text.to_owned();
        let handler = Arc::clone(&self.handler);
        let scheduled = self.scheduler.schedule_now(move |ran: &mut dyn RanModel| {
            let current = handler.read().unwrap_or_else(PoisonError::into_inner).clone();
            match current {
                Some(handler) => handler(text.as_str(), ran),
                None => debug!("Control gateway handler cleared before run"),
            }
        });
        match scheduled {
            Ok(()) => true,
            Err(e) => {
                warn!("Control gateway dropped command: {}", e);
                false
            }
        }
    }
}
