//! Simulated RAN seam
//!
//! The simulator owns its node graph and mutates it only from its own
//! loop. Control commands reach it through [`RanModel`], always from a
//! task drained by [`crate::scheduler::SimulationLoop`].

use thiserror::Error;

/// Index of a node in the simulation.
pub type NodeId = u32;

/// Largest fixed MCS index.
pub const MAX_MCS: u8 = 28;

/// Errors raised by the simulation while applying a mutation.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum RanError {
    #[error("Node {0} does not exist")]
    NoSuchNode(NodeId),

    #[error("Node {0} has no eNB device")]
    NoEnbDevice(NodeId),

    #[error("No node with a mobility model")]
    NoMobility,

    #[error("No eNB device in the simulation")]
    NoEnb,

    #[error("No OnOff application in the simulation")]
    NoApplication,
}

/// Cartesian position in meters.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Position {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Position {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    pub fn offset(self, dx: f64, dy: f64, dz: f64) -> Self {
        Self::new(self.x + dx, self.y + dy, self.z + dz)
    }
}

/// Link adaptation mode for one direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum McsSetting {
    Fixed(u8),
    Adaptive,
}

/// Mutable view of the simulated RAN.
pub trait RanModel {
    fn node_count(&self) -> u32;

    /// Position of `node`, or `None` if it has no mobility model.
    fn position(&self, node: NodeId) -> Option<Position>;

    fn set_position(&mut self, node: NodeId, position: Position) -> Result<(), RanError>;

    fn has_enb(&self, node: NodeId) -> bool;

    /// Sets the MCS policy of an eNB; `None` leaves a direction unchanged.
    fn set_mcs(
        &mut self,
        node: NodeId,
        dl: Option<McsSetting>,
        ul: Option<McsSetting>,
    ) -> Result<(), RanError>;

    /// Sets the bandwidth of an eNB in resource blocks.
    fn set_bandwidth(&mut self, node: NodeId, bandwidth: u8) -> Result<(), RanError>;

    /// Sets the rate of an OnOff application, searching elsewhere when the
    /// requested one does not exist. Returns where the rate was applied.
    fn set_flow_rate(
        &mut self,
        node: Option<NodeId>,
        app: u32,
        rate_mbps: f64,
    ) -> Result<(NodeId, u32), RanError>;

    fn set_tx_power(&mut self, node: NodeId, dbm: f64) -> Result<(), RanError>;

    /// Target BLER of adaptive modulation and coding.
    fn set_target_bler(&mut self, bler: f64);

    fn stop(&mut self);

    fn is_stopped(&self) -> bool;

    fn first_mobile_node(&self) -> Option<NodeId> {
        (0..self.node_count()).find(|&node| self.position(node).is_some())
    }

    fn enb_nodes(&self) -> Vec<NodeId> {
        (0..self.node_count()).filter(|&node| self.has_enb(node)).collect()
    }
}

/// One simulated node.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SimNode {
    pub position: Option<Position>,
    pub enb: Option<EnbState>,
    /// Data rate of each OnOff application in Mbps
    pub apps: Vec<f64>,
}

/// eNB device state.
#[derive(Debug, Clone, PartialEq)]
pub struct EnbState {
    pub dl_mcs: McsSetting,
    pub ul_mcs: McsSetting,
    pub bandwidth: u8,
    pub tx_power_dbm: f64,
}

impl Default for EnbState {
    fn default() -> Self {
        Self {
            dl_mcs: McsSetting::Adaptive,
            ul_mcs: McsSetting::Adaptive,
            bandwidth: 100,
            tx_power_dbm: 30.0,
        }
    }
}

/// Plain in-memory [`RanModel`].
#[derive(Debug, Clone, PartialEq, Default)]
pub struct InMemoryRan {
    pub nodes: Vec<SimNode>,
    pub target_bler: Option<f64>,
    pub stopped: bool,
}

impl InMemoryRan {
    pub fn new(nodes: Vec<SimNode>) -> Self {
        Self {
            nodes,
            ..Self::default()
        }
    }

    pub fn node(&self, node: NodeId) -> Option<&SimNode> {
        self.nodes.get(node as usize)
    }

    fn enb_mut(&mut self, node: NodeId) -> Result<&mut EnbState, RanError> {
        self.nodes
            .get_mut(node as usize)
            .ok_or(RanError::NoSuchNode(node))?
            .enb
            .as_mut()
            .ok_or(RanError::NoEnbDevice(node))
    }
}

impl RanModel for InMemoryRan {
    fn node_count(&self) -> u32 {
        u32::try_from(self.nodes.len()).unwrap_or(u32::MAX)
    }

    fn position(&self, node: NodeId) -> Option<Position> {
        self.node(node)?.position
    }

    fn set_position(&mut self, node: NodeId, position: Position) -> Result<(), RanError> {
        let slot = self
            .nodes
            .get_mut(node as usize)
            .ok_or(RanError::NoSuchNode(node))?;
        match slot.position.as_mut() {
            Some(current) => {
                *current = position;
                Ok(())
            }
            None => Err(RanError::NoMobility),
        }
    }

    fn has_enb(&self, node: NodeId) -> bool {
        self.node(node).map_or(false, |n| n.enb.is_some())
    }

    fn set_mcs(
        &mut self,
        node: NodeId,
        dl: Option<McsSetting>,
        ul: Option<McsSetting>,
    ) -> Result<(), RanError> {
        let enb = self.enb_mut(node)?;
        if let Some(dl) = dl {
            enb.dl_mcs = dl;
        }
        if let Some(ul) = ul {
            enb.ul_mcs = ul;
        }
        Ok(())
    }

    fn set_bandwidth(&mut self, node: NodeId, bandwidth: u8) -> Result<(), RanError> {
        self.enb_mut(node)?.bandwidth = bandwidth;
        Ok(())
    }

    fn set_flow_rate(
        &mut self,
        node: Option<NodeId>,
        app: u32,
        rate_mbps: f64,
    ) -> Result<(NodeId, u32), RanError> {
        let preferred = node
            .and_then(|n| self.node(n).map(|sim| (n, sim)))
            .and_then(|(n, sim)| {
                if (app as usize) < sim.apps.len() {
                    Some((n, app))
                } else if !sim.apps.is_empty() {
                    Some((n, 0))
                } else {
                    None
                }
            });
        let target = preferred.or_else(|| {
            self.nodes
                .iter()
                .position(|sim| !sim.apps.is_empty())
                .map(|n| (n as NodeId, 0))
        });

        let (n, a) = target.ok_or(RanError::NoApplication)?;
        self.nodes[n as usize].apps[a as usize] = rate_mbps;
        Ok((n, a))
    }

    fn set_tx_power(&mut self, node: NodeId, dbm: f64) -> Result<(), RanError> {
        self.enb_mut(node)?.tx_power_dbm = dbm;
        Ok(())
    }

    fn set_target_bler(&mut self, bler: f64) {
        self.target_bler = Some(bler);
    }

    fn stop(&mut self) {
        self.stopped = true;
    }

    fn is_stopped(&self) -> bool {
        self.stopped
    }
}
