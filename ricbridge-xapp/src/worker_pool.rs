//! Recommendation worker pool
//!
//! Indications hand their KPI document to a fixed set of workers that
//! perform the (possibly slow) recommendation round trip and relay any
//! resulting command. The queue is bounded; when it is full the newest job
//! is dropped so the receive path never waits.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::control_sender::ControlSender;
use crate::link::AgentLink;

/// One pending recommendation request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecommendationJob {
    pub meid: String,
    pub kpi_json: String,
}

/// Pool counters.
#[derive(Debug, Default)]
pub struct PoolStats {
    pub submitted: AtomicU64,
    pub dropped: AtomicU64,
    pub completed: AtomicU64,
    pub commands_sent: AtomicU64,
}

/// Bounded pool of recommendation workers.
pub struct RecommendationPool {
    queue: Option<mpsc::Sender<RecommendationJob>>,
    workers: Vec<JoinHandle<()>>,
    stats: Arc<PoolStats>,
}

impl RecommendationPool {
    /// Spawns `workers` tasks sharing a queue of `capacity` jobs.
    pub fn new(
        workers: usize,
        capacity: usize,
        agent: Arc<dyn AgentLink>,
        sender: Arc<dyn ControlSender>,
    ) -> Self {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        let rx = Arc::new(Mutex::new(rx));
        let stats = Arc::new(PoolStats::default());

        let workers = (0..workers.max(1))
            .map(|id| {
                tokio::spawn(worker_loop(
                    id,
                    Arc::clone(&rx),
                    Arc::clone(&agent),
                    Arc::clone(&sender),
                    Arc::clone(&stats),
                ))
            })
            .collect::<Vec<_>>();
        info!(workers = workers.len(), capacity, "Recommendation pool started");

        Self {
            queue: Some(tx),
            workers,
            stats,
        }
    }

    /// Queues a job without waiting. Returns false if it was dropped.
    pub fn submit(&self, meid: &str, kpi_json: &str) -> bool {
        let Some(queue) = &self.queue else {
            return false;
        };
        let job = RecommendationJob {
            meid: meid.to_string(),
            kpi_json: kpi_json.to_string(),
        };
        match queue.try_send(job) {
            Ok(()) => {
                self.stats.submitted.fetch_add(1, Ordering::Relaxed);
                true
            }
            Err(mpsc::error::TrySendError::Full(job)) => {
                self.stats.dropped.fetch_add(1, Ordering::Relaxed);
                warn!(meid = %job.meid, "Recommendation queue full, dropping request");
                false
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                warn!(meid, "Recommendation pool is shut down");
                false
            }
        }
    }

    pub fn stats(&self) -> &PoolStats {
        &self.stats
    }

    pub fn worker_count(&self) -> usize {
        self.workers.len()
    }

    /// Closes the queue, lets the workers drain it and waits for them.
    pub async fn shutdown(&mut self) {
        self.queue.take();
        for worker in self.workers.drain(..) {
            if let Err(e) = worker.await {
                error!("Recommendation worker failed: {}", e);
            }
        }
        debug!("Recommendation pool stopped");
    }
}

impl Drop for RecommendationPool {
    fn drop(&mut self) {
        for worker in &self.workers {
            worker.abort();
        }
    }
}

async fn worker_loop(
    id: usize,
    queue: Arc<Mutex<mpsc::Receiver<RecommendationJob>>>,
    agent: Arc<dyn AgentLink>,
    sender: Arc<dyn ControlSender>,
    stats: Arc<PoolStats>,
) {
    loop {
        let job = queue.lock().await.recv().await;
        let Some(job) = job else {
            break;
        };

        debug!(worker = id, meid = %job.meid, "Requesting recommendation");
        if let Some(cmd) = agent.get_recommendation(&job.meid, &job.kpi_json).await {
            if sender.send_control(&cmd, &job.meid).await {
                stats.commands_sent.fetch_add(1, Ordering::Relaxed);
            }
        }
        stats.completed.fetch_add(1, Ordering::Relaxed);
    }
}
