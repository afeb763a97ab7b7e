use domain::oracle::Question;
use domain::MessageParam;
use serde::Deserialize;
use utoipa::ToSchema;

/// Body of a chat message relayed to the oracle.
#[derive(Debug, Deserialize, ToSchema)]
pub(crate) struct AskParams {
    /// The user's new message. Required and non-empty.
    pub message: Option<String>,
    /// Previous turns, oldest first, each `{role: "user" | "assistant", content}`.
    #[schema(value_type = Option<Vec<Object>>)]
    pub history: Option<Vec<MessageParam>>,
    /// The caller's own model provider API key. Required.
    #[serde(rename = "apiKey")]
    pub api_key: Option<String>,
}

impl From<AskParams> for Question {
    fn from(params: AskParams) -> Self {
        Question {
            message: params.message,
            history: params.history.unwrap_or_default(),
            api_key: params.api_key,
        }
    }
}
