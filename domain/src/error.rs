//! Error types for the `domain` layer.
use std::error::Error as StdError;
use std::fmt;

/// Top-level domain error type.
/// Errors in the Domain layer are modeled as a tree structure
/// with `domain::error::Error` as the root type holding a tree of `error_kind`
/// enums that represent the kinds of errors that can occur in the domain layer or
/// in the gateways it calls. The `source` field is used to hold the original error that
/// caused the domain error. `web` only looks at the `error_kind`s to pick an HTTP status
/// and message for the client and never depends on `reqwest` directly.
#[derive(Debug)]
pub struct Error {
    pub source: Option<Box<dyn StdError + Send + Sync>>,
    pub error_kind: DomainErrorKind,
}

/// Enum representing the major categories of errors that can occur in the `domain` layer.
#[derive(Debug, PartialEq)]
pub enum DomainErrorKind {
    Internal(InternalErrorKind),
    External(ExternalErrorKind),
}

/// Enum representing the various kinds of internal errors that can occur in the `domain` layer.
#[derive(Debug, PartialEq)]
pub enum InternalErrorKind {
    /// The caller's input was rejected before anything was sent upstream.
    /// Carries the message shown to the user.
    Invalid(String),
    Config,
    Other(String),
}

/// Enum representing the various kinds of external errors that can occur in the `domain` layer.
#[derive(Debug, PartialEq)]
pub enum ExternalErrorKind {
    /// The model provider rejected the caller's credentials.
    Unauthenticated,
    Network,
    /// The model provider failed; carries the provider's own message.
    Provider(String),
    Other(String),
}

impl Error {
    pub fn invalid(message: impl Into<String>) -> Self {
        Error {
            source: None,
            error_kind: DomainErrorKind::Internal(InternalErrorKind::Invalid(message.into())),
        }
    }

    /// Human readable description suitable for passing through to the client.
    pub fn message(&self) -> String {
        match &self.error_kind {
            DomainErrorKind::Internal(InternalErrorKind::Invalid(msg))
            | DomainErrorKind::Internal(InternalErrorKind::Other(msg))
            | DomainErrorKind::External(ExternalErrorKind::Provider(msg))
            | DomainErrorKind::External(ExternalErrorKind::Other(msg)) => msg.clone(),
            _ => match &self.source {
                Some(source) => source.to_string(),
                None => format!("{:?}", self.error_kind),
            },
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Domain Error: {self:?}")
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn StdError + 'static))
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        // Errors that result from issues building the reqwest::Client instance. This
        // type of error will occur prior to any network calls being made.
        if err.is_builder() {
            Error {
                source: Some(Box::new(err)),
                error_kind: DomainErrorKind::Internal(InternalErrorKind::Other(
                    "Failed to build reqwest client".to_string(),
                )),
            }
        // Errors that result from issues with the network call itself.
        } else {
            Error {
                source: Some(Box::new(err)),
                error_kind: DomainErrorKind::External(ExternalErrorKind::Network),
            }
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error {
            source: Some(Box::new(err)),
            error_kind: DomainErrorKind::Internal(InternalErrorKind::Config),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_passes_through_carried_text() {
        assert_eq!(Error::invalid("Mensagem vazia.").message(), "Mensagem vazia.");

        let provider = Error {
            source: None,
            error_kind: DomainErrorKind::External(ExternalErrorKind::Provider(
                "529 overloaded_error".to_string(),
            )),
        };
        assert_eq!(provider.message(), "529 overloaded_error");
    }

    #[test]
    fn test_message_falls_back_to_source() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "prompt.md missing");
        let err: Error = io.into();

        assert_eq!(
            err.error_kind,
            DomainErrorKind::Internal(InternalErrorKind::Config)
        );
        assert_eq!(err.message(), "prompt.md missing");
    }
}
