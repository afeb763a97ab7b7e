//! Relay of one chat message to the model provider.

use crate::error::Error;
use crate::gateway::anthropic::{AnthropicClient, CreateMessageRequest, MessageParam, Role};
use log::*;
use service::config::Config;

pub const MISSING_API_KEY: &str = "API key necessaria.";
pub const EMPTY_MESSAGE: &str = "Mensagem vazia.";

/// A user's question as received from the chat client.
#[derive(Debug, Clone, Default)]
pub struct Question {
    pub message: Option<String>,
    pub history: Vec<MessageParam>,
    pub api_key: Option<String>,
}

/// Sends `question` to the model behind `system_prompt` and returns the reply text.
///
/// The API key is checked before the message. History is cut to the most recent
/// `relay_history_limit` turns, never opening on an assistant turn, and the new
/// message is appended as a user turn.
/// One upstream call, no retries.
pub async fn ask(config: &Config, system_prompt: &str, question: Question) -> Result<String, Error> {
    let api_key = question
        .api_key
        .filter(|key| !key.is_empty())
        .ok_or_else(|| Error::invalid(MISSING_API_KEY))?;
    let message = question
        .message
        .filter(|message| !message.is_empty())
        .ok_or_else(|| Error::invalid(EMPTY_MESSAGE))?;

    let mut messages = recent_history(question.history, config.relay_history_limit);
    messages.push(MessageParam {
        role: Role::User,
        content: message,
    });

    let request = CreateMessageRequest {
        model: config.anthropic_model().to_string(),
        max_tokens: config.anthropic_max_tokens,
        system: system_prompt.to_string(),
        messages,
    };

    debug!("Relaying message with {} turns of context", request.messages.len() - 1);

    let client = AnthropicClient::new(config, &api_key)?;
    let response = client.create_message(&request).await?;

    Ok(response.first_text())
}

/// The last `limit` turns, starting at a user turn.
fn recent_history(mut history: Vec<MessageParam>, limit: usize) -> Vec<MessageParam> {
    if history.len() > limit {
        history.drain(..history.len() - limit);
    }
    let leading_replies = history
        .iter()
        .take_while(|turn| turn.role == Role::Assistant)
        .count();
    history.drain(..leading_replies);
    history
}
