use thiserror::Error;

use crate::core::types::AgentId;

#[derive(Error, Debug)]
pub enum ArenaError {
    #[error("Agent not found: {0}")]
    AgentNotFound(AgentId),

    #[error("Invalid state for {agent}: {reason}")]
    InvalidAgentState { agent: AgentId, reason: String },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
}

pub type Result<T> = std::result::Result<T, ArenaError>;
