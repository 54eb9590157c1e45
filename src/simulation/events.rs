//! Events emitted by the arena tick

use glam::Vec3;
use serde::Serialize;

use crate::core::types::{AgentId, Tick};
use crate::tactics::intent::Intent;

/// Something an agent did this tick that the host game acts on
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AgentEvent {
    /// Melee swing at the player
    Attack { agent: AgentId, tick: Tick, damage: f32 },
    /// Ranged shot aimed at the predicted player position
    FireProjectile {
        agent: AgentId,
        tick: Tick,
        origin: Vec3,
        aim: Vec3,
        damage: f32,
    },
    /// Exploder went off (at most once per agent)
    Detonated {
        agent: AgentId,
        tick: Tick,
        position: Vec3,
        radius: f32,
        damage: f32,
    },
    /// A sighting was broadcast to nearby agents
    AlertRaised {
        source: AgentId,
        tick: Tick,
        alerted: Vec<AgentId>,
    },
    IntentChanged {
        agent: AgentId,
        tick: Tick,
        from: Intent,
        to: Intent,
    },
    /// Agent skipped this tick after an internal failure
    AgentFault { agent: AgentId, tick: Tick, reason: String },
}

impl AgentEvent {
    pub fn agent(&self) -> AgentId {
        match self {
            AgentEvent::Attack { agent, .. }
            | AgentEvent::FireProjectile { agent, .. }
            | AgentEvent::Detonated { agent, .. }
            | AgentEvent::IntentChanged { agent, .. }
            | AgentEvent::AgentFault { agent, .. } => *agent,
            AgentEvent::AlertRaised { source, .. } => *source,
        }
    }
}
