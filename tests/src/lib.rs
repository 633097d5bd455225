//! Integration test framework for the RIC bridge
#![allow(missing_docs)]
//!
//! This crate provides mock peers and fixtures for testing the bridge crates
//! together.
//!
//! # Components
//!
//! - [`mock_agent`] - Framed TCP decision agent that records frames and
//!   scripts replies and pushes
//! - [`mock_rmr`] - In-memory RMR transport
//! - [`json_e2ap`] - E2AP codec over JSON-encoded PDUs
//! - [`test_fixtures`] - Synthetic E2SM indications
//! - [`test_utils`] - Logging setup and polling helpers
//! - `agent_bridge`, `control_loop` - the scenario tests below
//!
//! # Test Categories
//!
//! 1. **Agent Bridge Tests** - KPI publishing, recommendations and pushed
//!    commands against the mock agent
//! 2. **Control Loop Tests** - indication in, RIC CONTROL REQUEST out, and
//!    the simulator applying it

pub mod json_e2ap;
pub mod mock_agent;
pub mod mock_rmr;
pub mod test_fixtures;
pub mod test_utils;

#[cfg(test)]
mod agent_bridge;
#[cfg(test)]
mod control_loop;

pub use json_e2ap::JsonE2apCodec;
pub use mock_agent::{MockAgent, MockAgentError, DEFAULT_REPLY};
pub use mock_rmr::{MockRmr, MockRmrInjector};
pub use test_fixtures::{
    hello_world_payload, kpm_format1, kpm_payload, ric_indication, rrc_measurement, GNB_MEID,
};
pub use test_utils::{
    agent_settings, init_test_logging, wait_for_condition, TestResult, DEFAULT_POLL_INTERVAL,
    DEFAULT_TEST_TIMEOUT,
};
