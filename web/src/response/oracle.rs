//! JSON bodies returned by the oracle relay.

use serde::Serialize;
use utoipa::ToSchema;

/// Successful relay: the model's reply text.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub(crate) struct AskResponse {
    pub response: String,
}

/// Any failure, with a message meant for the chat user.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub(crate) struct ErrorResponse {
    pub error: String,
}
