//! Simulator-side RIC control executor
//!
//! Receives RIC CONTROL REQUESTs, turns their JSON control message into a
//! validated [`ControlCommand`] and hands the resulting mutation to the
//! simulation through the run-now queue:
//!
//! ```
//! use ricbridge_sim::{run_now_queue, ControlGateway, InMemoryRan, RanModel};
//!
//! let (scheduler, mut sim) = run_now_queue();
//! let gateway = ControlGateway::new(scheduler);
//! gateway.register(|text: &str, ran: &mut dyn RanModel| {
//!     if text == "stop" {
//!         ran.stop();
//!     }
//! });
//!
//! assert!(gateway.handle("stop"));
//! let mut ran = InMemoryRan::default();
//! sim.run_pending(&mut ran);
//! assert!(ran.is_stopped());
//! ```

pub mod command;
pub mod executor;
pub mod gateway;
pub mod ran;
pub mod scheduler;

pub use command::{CommandError, ControlCommand};
pub use executor::{apply, ControlExecutor, ControlRequestError};
pub use gateway::{ControlGateway, GatewayHandler};
pub use ran::{EnbState, InMemoryRan, McsSetting, NodeId, Position, RanError, RanModel, SimNode, MAX_MCS};
pub use scheduler::{run_now_queue, RunNowScheduler, SchedulerClosed, SimTask, SimulationLoop};
