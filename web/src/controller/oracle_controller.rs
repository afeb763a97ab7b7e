//! Controller for the oracle chat relay.

use crate::params::oracle::AskParams;
use crate::response::oracle::{AskResponse, ErrorResponse};
use crate::{AppState, Error};

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;

use domain::error::Error as DomainError;
use domain::oracle as OracleApi;
use log::*;

/// POST /api/oracle
///
/// Relays one chat message, with its recent history, to the model behind the
/// oracle persona. One upstream call per request.
#[utoipa::path(
    post,
    path = "/api/oracle",
    request_body = AskParams,
    responses(
        (status = 200, description = "The model's reply", body = AskResponse),
        (status = 400, description = "Missing API key or message, or malformed body", body = ErrorResponse),
        (status = 401, description = "The model provider rejected the API key", body = ErrorResponse),
        (status = 500, description = "Any other failure, with the provider's message", body = ErrorResponse),
    )
)]
pub async fn ask(
    State(app_state): State<AppState>,
    payload: Result<Json<AskParams>, JsonRejection>,
) -> Result<impl IntoResponse, Error> {
    let Json(params) = payload.map_err(|rejection| {
        warn!("Malformed oracle request: {rejection}");
        DomainError::invalid(rejection.body_text())
    })?;

    debug!(
        "POST oracle message with {} history turns",
        params.history.as_ref().map_or(0, Vec::len)
    );

    let response =
        OracleApi::ask(&app_state.config, app_state.system_prompt(), params.into()).await?;

    Ok(Json(AskResponse { response }))
}
