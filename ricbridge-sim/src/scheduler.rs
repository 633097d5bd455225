//! Run-now task queue
//!
//! The only way into the simulation from other tasks. Producers enqueue
//! closures with [`RunNowScheduler::schedule_now`]; the simulation loop
//! drains them in submission order and is the only code that touches the
//! [`RanModel`].

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use thiserror::Error;
use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::ran::RanModel;

/// A mutation to run on the simulation loop.
pub type SimTask = Box<dyn FnOnce(&mut dyn RanModel) + Send + 'static>;

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error("Simulation loop has stopped")]
pub struct SchedulerClosed;

/// Creates a connected scheduler/loop pair.
pub fn run_now_queue() -> (RunNowScheduler, SimulationLoop) {
    let (tx, rx) = mpsc::unbounded_channel();
    let scheduled = Arc::new(AtomicU64::new(0));
    (
        RunNowScheduler {
            tx,
            scheduled: Arc::clone(&scheduled),
        },
        SimulationLoop {
            rx,
            scheduled,
            executed: 0,
        },
    )
}

/// Producer side of the run-now queue. Cheap to clone.
#[derive(Clone)]
pub struct RunNowScheduler {
    tx: mpsc::UnboundedSender<SimTask>,
    scheduled: Arc<AtomicU64>,
}

impl RunNowScheduler {
    /// Queues `task` to run on the next pass of the simulation loop.
    pub fn schedule_now<F>(&self, task: F) -> Result<(), SchedulerClosed>
    where
        F: FnOnce(&mut dyn RanModel) + Send + 'static,
    {
        self.tx.send(Box::new(task)).map_err(|_| SchedulerClosed)?;
        self.scheduled.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    /// Number of tasks queued so far.
    pub fn scheduled(&self) -> u64 {
        self.scheduled.load(Ordering::Relaxed)
    }

    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

/// Consumer side of the run-now queue, owned by the simulation.
pub struct SimulationLoop {
    rx: mpsc::UnboundedReceiver<SimTask>,
    scheduled: Arc<AtomicU64>,
    executed: u64,
}

impl SimulationLoop {
    /// Runs every task queued so far, in order. Returns how many ran.
    pub fn run_pending(&mut self, ran: &mut dyn RanModel) -> usize {
        let mut ran_tasks = 0;
        while let Ok(task) = self.rx.try_recv() {
            task(ran);
            ran_tasks += 1;
        }
        self.executed += ran_tasks as u64;
        if ran_tasks > 0 {
            debug!(tasks = ran_tasks, "Ran scheduled simulation tasks");
        }
        ran_tasks
    }

    /// Applies tasks as they arrive until the simulation stops or every
    /// scheduler is dropped.
    pub async fn run(&mut self, ran: &mut (dyn RanModel + Send)) {
        info!("Simulation loop started");
        while !ran.is_stopped() {
            let Some(task) = self.rx.recv().await else {
                break;
            };
            task(ran);
            self.executed += 1;
        }
        info!(executed = self.executed, "Simulation loop stopped");
    }

    pub fn executed(&self) -> u64 {
        self.executed
    }

    /// Tasks queued but not yet run.
    pub fn pending(&self) -> u64 {
        self.scheduled.load(Ordering::Relaxed).saturating_sub(self.executed)
    }
}
