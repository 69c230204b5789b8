use std::borrow::Cow;
use std::error::Error as StdError;
use std::fmt;

use http::StatusCode;

use crate::HttpError;

/// A value raised while handling a request, classified by what it is.
///
/// Any error converts into [`Raised`] through [`From`], so handlers returning
/// `Result<T, Raised>` can use `?` on every fallible call:
///
/// ```rust
/// use crashpad::{HttpError, Raised, StatusError};
///
/// let raised: Raised = anyhow::anyhow!("boom").into();
/// assert!(matches!(raised, Raised::Native { status: None, .. }));
///
/// let raised: Raised = StatusError::new(404, "no such user").into();
/// assert!(matches!(raised, Raised::Native { status: Some(404), .. }));
///
/// let raised: Raised = HttpError::bad_request("invalid cucumber").into();
/// assert!(matches!(raised, Raised::Rich(_)));
///
/// let raised = Raised::value("poorly implemented error");
/// assert!(matches!(raised, Raised::NonError(_)));
/// ```
#[derive(Debug)]
pub enum Raised {
    /// Something that is not an error at all: a string, a number, `null`, ...
    NonError(serde_json::Value),
    /// A plain error, optionally carrying a raw status code of its own.
    Native {
        /// The error itself, kept as the source of the normalized error.
        error: anyhow::Error,
        /// The raw status the error carries, unvalidated.
        status: Option<u16>,
    },
    /// An error that is already in its final HTTP shape.
    Rich(HttpError),
}

impl Raised {
    /// Classifies a generic error. [`HttpError`]s become [`Raised::Rich`], a [`StatusError`]
    /// anywhere in the error's context lends its status to [`Raised::Native`].
    pub fn from_err<E>(err: E) -> Self
    where
        E: Into<anyhow::Error>,
    {
        match err.into().downcast::<HttpError>() {
            Ok(http_error) => Self::Rich(http_error),
            Err(error) => {
                let status = error.downcast_ref::<StatusError>().map(StatusError::status);
                Self::Native { error, status }
            }
        }
    }

    /// Wraps a non-error value.
    pub fn value<V: Into<serde_json::Value>>(value: V) -> Self {
        Self::NonError(value.into())
    }

    /// A native error with an explicit raw status. Statuses outside `400..=599` are treated as
    /// absent during normalization.
    pub fn with_status<E>(err: E, status: u16) -> Self
    where
        E: Into<anyhow::Error>,
    {
        Self::Native {
            error: err.into(),
            status: Some(status),
        }
    }
}

impl<E> From<E> for Raised
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Raised::from_err(err)
    }
}

/// A plain error carrying a raw status code, for code that wants a status without building a full
/// [`HttpError`]. The status is not validated here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusError {
    status: u16,
    message: Cow<'static, str>,
}

impl StatusError {
    /// Creates an error with a raw status and a client-facing message.
    pub fn new<S: Into<Cow<'static, str>>>(status: u16, message: S) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    /// Returns the raw status code.
    pub fn status(&self) -> u16 {
        self.status
    }

    /// Returns the message.
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for StatusError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl StdError for StatusError {}

/// Returns `raw` as a status code if it is a client or server error.
pub(crate) fn error_status(raw: u16) -> Option<StatusCode> {
    if !(400..=599).contains(&raw) {
        return None;
    }
    StatusCode::from_u16(raw).ok()
}
