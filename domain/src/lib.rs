//! Relay logic behind the oracle chat: the fixed context document, the model
//! provider gateway and the error tree `web` turns into HTTP responses.

pub mod error;
pub mod gateway;
pub mod knowledge;
pub mod oracle;

pub use gateway::anthropic::{MessageParam, Role};
