pub mod config;
pub mod error;
pub mod types;

pub use config::{load_config, AiConfig, ClusterMode, PathStrategy};
pub use error::{ArenaError, Result};
pub use types::{AgentId, FormationId, SimClock, SimTime, Tick};
