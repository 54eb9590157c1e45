//! Squad coordination: shared threat, alert propagation, formations

pub mod cluster;
pub mod coordinator;
pub mod formation;
pub mod threat;

pub use cluster::cluster_agents;
pub use coordinator::{SquadCoordinator, SquadMember};
pub use formation::{slot_position, FormationGroup, FormationType, SlotRoll};
pub use threat::{PlayerAction, ThreatTracker};
