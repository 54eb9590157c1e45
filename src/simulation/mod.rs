//! Arena session and per-tick orchestration

pub mod agent;
pub mod arena;
pub mod events;
pub mod tick;

pub use agent::Agent;
pub use arena::{Arena, DamageOutcome};
pub use events::AgentEvent;
pub use tick::{run_arena_tick, update_agent, AgentUpdate, TickContext};
