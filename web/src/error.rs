use std::error::Error as StdError;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use log::*;

use domain::error::{DomainErrorKind, Error as DomainError, ExternalErrorKind, InternalErrorKind};

use crate::response::oracle::ErrorResponse;

/// Shown when the model provider rejects the caller's API key.
pub(crate) const INVALID_API_KEY: &str = "Chave API invalida.";

pub type Result<T> = core::result::Result<T, Error>;

#[derive(Debug)]
pub struct Error(DomainError);

impl StdError for Error {}

impl std::fmt::Display for Error {
    fn fmt(&self, fmt: &mut std::fmt::Formatter) -> core::result::Result<(), std::fmt::Error> {
        write!(fmt, "{self:?}")
    }
}

impl Error {
    fn status_and_message(&self) -> (StatusCode, String) {
        match &self.0.error_kind {
            DomainErrorKind::Internal(InternalErrorKind::Invalid(message)) => {
                (StatusCode::BAD_REQUEST, message.clone())
            }
            DomainErrorKind::External(ExternalErrorKind::Unauthenticated) => {
                (StatusCode::UNAUTHORIZED, INVALID_API_KEY.to_string())
            }
            // Everything else is surfaced as-is so the chat shows what the provider said
            DomainErrorKind::Internal(_) | DomainErrorKind::External(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, self.0.message())
            }
        }
    }
}

// List of possible StatusCode variants https://docs.rs/http/latest/http/status/struct.StatusCode.html
impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let (status, message) = self.status_and_message();
        if status.is_server_error() {
            error!("Relay failed: {:?}", self.0);
        } else {
            warn!("Relay rejected request ({status}): {message}");
        }

        (status, Json(ErrorResponse { error: message })).into_response()
    }
}

impl<E> From<E> for Error
where
    E: Into<DomainError>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_input_maps_to_bad_request_with_its_message() {
        let err = Error::from(DomainError::invalid("Mensagem vazia."));
        assert_eq!(
            err.status_and_message(),
            (StatusCode::BAD_REQUEST, "Mensagem vazia.".to_string())
        );
    }

    #[test]
    fn test_unauthenticated_maps_to_401() {
        let err = Error::from(DomainError {
            source: None,
            error_kind: DomainErrorKind::External(ExternalErrorKind::Unauthenticated),
        });
        assert_eq!(
            err.status_and_message(),
            (StatusCode::UNAUTHORIZED, INVALID_API_KEY.to_string())
        );
    }

    #[test]
    fn test_provider_failure_maps_to_500_with_provider_message() {
        let err = Error::from(DomainError {
            source: None,
            error_kind: DomainErrorKind::External(ExternalErrorKind::Provider(
                "529 overloaded_error".to_string(),
            )),
        });
        assert_eq!(
            err.status_and_message(),
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "529 overloaded_error".to_string()
            )
        );
    }
}
