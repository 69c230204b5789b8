//! Turning raised values into [`HttpError`]s.
use bytes::Bytes;
use http::StatusCode;
use serde::Deserialize;
use std::sync::Arc;

use crate::raised::error_status;
use crate::response::{emit, ResponseSink};
use crate::{HttpError, Raised, GENERIC_MESSAGE};

/// Which native error messages are replaced by the generic message. Messages of
/// [`Raised::Rich`] errors are never replaced.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Redaction {
    /// Only status 500 hides the message.
    #[default]
    InternalServerError,
    /// Every 5xx status hides the message.
    ServerErrors,
    /// Messages are always preserved.
    Never,
}

impl Redaction {
    /// Returns whether a native error with `status_code` has its message hidden.
    pub fn applies_to(self, status_code: StatusCode) -> bool {
        match self {
            Redaction::InternalServerError => status_code == StatusCode::INTERNAL_SERVER_ERROR,
            Redaction::ServerErrors => status_code.is_server_error(),
            Redaction::Never => false,
        }
    }
}

/// Configuration of a [`Normalizer`].
///
/// ```rust
/// use crashpad::{NormalizerConfig, Redaction};
///
/// let config: NormalizerConfig =
///     serde_json::from_str(r#"{ "redaction": "server_errors" }"#).unwrap();
/// assert_eq!(config.redaction, Redaction::ServerErrors);
/// assert_eq!(config.generic_message, crashpad::GENERIC_MESSAGE);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct NormalizerConfig {
    /// Replaces the message of non-error values and redacted native errors.
    pub generic_message: String,
    pub redaction: Redaction,
}

impl Default for NormalizerConfig {
    fn default() -> Self {
        Self {
            generic_message: GENERIC_MESSAGE.to_owned(),
            redaction: Redaction::default(),
        }
    }
}

/// Classifies raised values and canonicalizes them into [`HttpError`]s.
///
/// The normalizer is immutable and can be shared between any number of concurrent requests.
#[derive(Debug, Clone, Default)]
pub struct Normalizer {
    config: NormalizerConfig,
}

impl Normalizer {
    /// Creates a normalizer from `config`.
    pub fn new(config: NormalizerConfig) -> Self {
        Self { config }
    }

    /// Returns the configuration.
    pub fn config(&self) -> &NormalizerConfig {
        &self.config
    }

    /// Canonicalizes a raised value:
    ///
    /// 1. non-error values become a 500 with the generic message,
    /// 2. rich errors pass through untouched,
    /// 3. native errors take their own status if it lies in `400..=599` (500 otherwise) and keep
    ///    their message unless [`Redaction`] applies to that status.
    pub fn normalize(&self, raised: impl Into<Raised>) -> HttpError {
        match raised.into() {
            Raised::NonError(value) => {
                tracing::error!(%value, "non-error value raised during request handling");
                HttpError::new()
                    .with_message(self.config.generic_message.clone())
                    .with_source_err(anyhow::anyhow!("non-error value raised: {value}"))
            }
            Raised::Rich(http_error) => {
                tracing::debug!(status = %http_error.status_code(), "passing through http error");
                http_error
            }
            Raised::Native { error, status } => {
                let status_code = match status {
                    Some(raw) => error_status(raw).unwrap_or_else(|| {
                        tracing::debug!(status = raw, "ignoring status outside of the error range");
                        StatusCode::INTERNAL_SERVER_ERROR
                    }),
                    None => StatusCode::INTERNAL_SERVER_ERROR,
                };

                let message = if self.config.redaction.applies_to(status_code) {
                    tracing::error!(status = %status_code, error = ?error, "request failed");
                    self.config.generic_message.clone()
                } else {
                    error.to_string()
                };

                HttpError::from_status_code(status_code)
                    .with_message(message)
                    .with_source_err(error)
            }
        }
    }

    /// Normalizes `raised` and emits the result into `sink`.
    pub fn handle<S>(&self, raised: impl Into<Raised>, sink: &mut S)
    where
        S: ResponseSink + ?Sized,
    {
        emit(&self.normalize(raised), sink);
    }

    /// Normalizes `raised` into a complete [`http::Response`]. The normalized error is kept in the
    /// response extensions as `Arc<HttpError>`.
    pub fn respond<B>(&self, raised: impl Into<Raised>) -> http::Response<B>
    where
        B: From<Bytes>,
    {
        let http_error = self.normalize(raised);
        let mut resp = http::Response::new(B::from(Bytes::new()));
        emit(&http_error, &mut resp);
        resp.extensions_mut().insert(Arc::new(http_error));
        resp
    }
}

/// Normalizes `raised` with the default configuration.
pub fn normalize(raised: impl Into<Raised>) -> HttpError {
    Normalizer::default().normalize(raised)
}
