pub mod agent;
pub mod config;
pub mod error;
pub mod llm_client;
pub mod schema;
pub mod session;
pub mod structured;
pub mod tool_registry;
pub mod tools;
pub mod types;
pub mod utils;

#[cfg(test)]
mod mocks;
#[cfg(test)]
mod tests;

pub use agent::{Agent, AgentOptions, LlmClientTrait, RoundTrip};
pub use config::{Config, ConfigError};
pub use error::ChatError;
pub use llm_client::LlmClient;
pub use session::Transcript;
pub use tool_registry::ToolRegistry;
