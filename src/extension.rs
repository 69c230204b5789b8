use http::StatusCode;
use std::{borrow::Cow, result::Result as StdResult};

use crate::HttpError;

/// Extension trait to map the error variant of a [`Result`] to a [`HttpError`].
pub trait ResultExt {
    type Item;

    /// Maps a `Result<T, E>` to `Result<T, HttpError>` by creating a [`HttpError`] with the
    /// specified status code wrapping the error contained [`Err`]. The wrapped error only becomes
    /// the source, the client sees the status label as message.
    ///
    /// # Example
    ///
    /// ```
    /// use http::StatusCode;
    /// use crashpad::{http_error, HttpError, ResultExt};
    ///
    /// let s: Result<i32, HttpError> = "nan"
    ///     .parse::<i32>()
    ///     .map_status(StatusCode::BAD_REQUEST);
    /// assert_eq!(s, Err(http_error!(BAD_REQUEST)));
    /// ```
    fn map_status(self, status_code: StatusCode) -> StdResult<Self::Item, HttpError>;

    /// Maps a `Result<T, E>` to `Result<T, HttpError>` by creating a [`HttpError`] with the
    /// specified status code and message wrapping the error contained [`Err`].
    ///
    /// # Example
    ///
    /// ```
    /// use http::StatusCode;
    /// use crashpad::{http_error, HttpError, ResultExt};
    ///
    /// let s: Result<i32, HttpError> = "nan"
    ///     .parse::<i32>()
    ///     .map_http_error(StatusCode::BAD_REQUEST, "invalid number");
    /// assert_eq!(s, Err(http_error!(BAD_REQUEST, "invalid number")));
    /// ```
    fn map_http_error<S>(
        self,
        status_code: StatusCode,
        message: S,
    ) -> StdResult<Self::Item, HttpError>
    where
        S: Into<Cow<'static, str>>;
}

impl<E, T> ResultExt for StdResult<T, E>
where
    E: Into<anyhow::Error>,
{
    type Item = T;

    fn map_status(self, status_code: StatusCode) -> StdResult<T, HttpError> {
        self.map_err(|e| HttpError::from_err(e).with_status_code(status_code))
    }

    fn map_http_error<S>(self, status_code: StatusCode, message: S) -> StdResult<T, HttpError>
    where
        S: Into<Cow<'static, str>>,
    {
        self.map_err(|e| {
            HttpError::from_err(e)
                .with_status_code(status_code)
                .with_message(message)
        })
    }
}

/// Extension trait to transform an [`Option`] to a [`HttpError`].
pub trait OptionExt {
    type Item;

    /// Transforms the `Option<T>` into a `Result<T, HttpError>`, mapping `Some(v)` to
    /// `Ok(v)` and `None` to `Err(HttpError)` with status code.
    ///
    /// # Examples
    ///
    /// ```
    /// use http::StatusCode;
    /// use crashpad::{http_error, HttpError, OptionExt};
    ///
    /// let x: Result<_, HttpError> = None::<()>.ok_or_status(StatusCode::NOT_FOUND);
    /// assert_eq!(x, Err(http_error!(NOT_FOUND)));
    /// ```
    fn ok_or_status(self, status_code: StatusCode) -> StdResult<Self::Item, HttpError>;

    /// Like [`OptionExt::ok_or_status`] with a client-facing message.
    fn ok_or_http_error<S>(
        self,
        status_code: StatusCode,
        message: S,
    ) -> StdResult<Self::Item, HttpError>
    where
        S: Into<Cow<'static, str>>;
}

impl<T> OptionExt for Option<T> {
    type Item = T;

    fn ok_or_status(self, status_code: StatusCode) -> StdResult<T, HttpError> {
        self.ok_or_else(|| HttpError::from_status_code(status_code))
    }

    fn ok_or_http_error<S>(self, status_code: StatusCode, message: S) -> StdResult<T, HttpError>
    where
        S: Into<Cow<'static, str>>,
    {
        self.ok_or_else(|| HttpError::from_status_code(status_code).with_message(message))
    }
}
