use core::fmt;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::borrow::Cow;
use std::error::Error as StdError;
use std::ops::Deref;

use http::header::{HeaderName, InvalidHeaderValue, ALLOW, WWW_AUTHENTICATE};
use http::{HeaderMap, HeaderValue, Method, StatusCode};

use crate::challenge::Challenge;
use crate::raised::{error_status, StatusError};

/// The message substituted for server errors whose own message must not reach the client.
pub const GENERIC_MESSAGE: &str = "An internal server error occurred";

/// [`HttpError`] is the canonical error representation emitted by this crate: a status code, a
/// client-facing message, protocol headers and an optional JSON payload.
///
/// The error label (`"Bad Request"`, `"Unauthorized"`, ...) is not stored. It is derived from the
/// status code whenever the error is reformatted, see [`HttpError::reformat`].
#[derive(Debug)]
pub struct HttpError {
    pub(crate) status_code: StatusCode,
    pub(crate) message: Cow<'static, str>,
    pub(crate) headers: HeaderMap,
    pub(crate) data: Option<serde_json::Value>,
    pub(crate) source: Option<anyhow::Error>,
}

impl fmt::Display for HttpError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.message.is_empty(), &self.source) {
            (true, None) => write!(f, "http error {}", self.status_code),
            (true, Some(s)) => write!(f, "http error {}, source: {s}", self.status_code),
            (false, None) => write!(f, "http error {}: {}", self.status_code, self.message),
            (false, Some(s)) => write!(
                f,
                "http error {}: {}, source: {s}",
                self.status_code, self.message
            ),
        }
    }
}

impl StdError for HttpError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.deref() as &(dyn StdError + 'static))
    }
}

impl Default for HttpError {
    fn default() -> Self {
        Self::new()
    }
}

impl PartialEq for HttpError {
    fn eq(&self, other: &Self) -> bool {
        self.status_code == other.status_code
            && self.message == other.message
            && self.headers == other.headers
            && self.data == other.data
    }
}

macro_rules! status_constructors {
    ($($(#[$doc:meta])* $name:ident => $status:ident;)*) => {
        $(
            $(#[$doc])*
            pub fn $name<S: Into<Cow<'static, str>>>(message: S) -> Self {
                Self::from_status_code(StatusCode::$status).with_message(message)
            }
        )*
    };
}

impl HttpError {
    /// Creates an empty [`HttpError`] with status 500.
    pub fn new() -> Self {
        Self {
            status_code: StatusCode::INTERNAL_SERVER_ERROR,
            message: Cow::Borrowed(""),
            headers: HeaderMap::new(),
            data: None,
            source: None,
        }
    }

    /// Creates a [`HttpError`] from a status code.
    pub fn from_status_code(status_code: StatusCode) -> Self {
        Self {
            status_code,
            ..Self::new()
        }
    }

    /// Creates a [`HttpError`] from a generic error. It attempts to downcast to an underlying
    /// [`HttpError`]. A [`StatusError`] lends its status if it lies in `400..=599`, and its
    /// message unless that status is 500. Otherwise the error becomes the source of an empty 500.
    pub fn from_err<E>(err: E) -> Self
    where
        E: Into<anyhow::Error>,
    {
        let err = match err.into().downcast::<HttpError>() {
            Ok(http_error) => return http_error,
            Err(err) => err,
        };
        let status = err
            .downcast_ref::<StatusError>()
            .and_then(|e| Some((error_status(e.status())?, e.message().to_owned())));
        match status {
            Some((status_code, _)) if status_code == StatusCode::INTERNAL_SERVER_ERROR => {
                Self::from_status_code(status_code).with_source_err(err)
            }
            Some((status_code, message)) => Self::from_status_code(status_code)
                .with_message(message)
                .with_source_err(err),
            None => Self::new().with_source_err(err),
        }
    }

    status_constructors! {
        /// 400 Bad Request.
        bad_request => BAD_REQUEST;
        /// 402 Payment Required.
        payment_required => PAYMENT_REQUIRED;
        /// 403 Forbidden.
        forbidden => FORBIDDEN;
        /// 404 Not Found.
        not_found => NOT_FOUND;
        /// 406 Not Acceptable.
        not_acceptable => NOT_ACCEPTABLE;
        /// 408 Request Timeout.
        request_timeout => REQUEST_TIMEOUT;
        /// 409 Conflict.
        conflict => CONFLICT;
        /// 410 Gone.
        gone => GONE;
        /// 412 Precondition Failed.
        precondition_failed => PRECONDITION_FAILED;
        /// 413 Payload Too Large.
        payload_too_large => PAYLOAD_TOO_LARGE;
        /// 415 Unsupported Media Type.
        unsupported_media_type => UNSUPPORTED_MEDIA_TYPE;
        /// 422 Unprocessable Entity.
        unprocessable_entity => UNPROCESSABLE_ENTITY;
        /// 429 Too Many Requests.
        too_many_requests => TOO_MANY_REQUESTS;
        /// 500 Internal Server Error. The message is sent to the client as is, so keep it free
        /// of internals.
        internal => INTERNAL_SERVER_ERROR;
        /// 501 Not Implemented.
        not_implemented => NOT_IMPLEMENTED;
        /// 502 Bad Gateway.
        bad_gateway => BAD_GATEWAY;
        /// 503 Service Unavailable.
        service_unavailable => SERVICE_UNAVAILABLE;
        /// 504 Gateway Timeout.
        gateway_timeout => GATEWAY_TIMEOUT;
    }

    /// 401 Unauthorized with a `WWW-Authenticate` header rendered from `challenge`. The message
    /// becomes the `error` attribute of the challenge.
    ///
    /// ```rust
    /// use crashpad::{Challenge, HttpError};
    ///
    /// let err = HttpError::unauthorized(
    ///     "get off my lawn!",
    ///     Challenge::new("sample").attribute("ttl", 0),
    /// )
    /// .unwrap();
    /// assert_eq!(
    ///     err.headers()["www-authenticate"],
    ///     r#"sample ttl="0", error="get off my lawn!""#
    /// );
    /// ```
    pub fn unauthorized<S: Into<Cow<'static, str>>>(
        message: S,
        challenge: Challenge,
    ) -> Result<Self, InvalidHeaderValue> {
        let message = message.into();
        let header = challenge.header_value(&message)?;
        Ok(Self::from_status_code(StatusCode::UNAUTHORIZED)
            .with_message(message)
            .with_header(WWW_AUTHENTICATE, header))
    }

    /// 405 Method Not Allowed with an `Allow` header listing `allowed`.
    pub fn method_not_allowed<S, I>(message: S, allowed: I) -> Self
    where
        S: Into<Cow<'static, str>>,
        I: IntoIterator<Item = Method>,
    {
        let allow = allowed
            .into_iter()
            .map(|m| m.as_str().to_owned())
            .collect::<Vec<_>>()
            .join(", ");
        let err = Self::from_status_code(StatusCode::METHOD_NOT_ALLOWED).with_message(message);
        match HeaderValue::from_str(&allow) {
            Ok(value) if !allow.is_empty() => err.with_header(ALLOW, value),
            _ => err,
        }
    }

    /// Sets the status code.
    pub fn with_status_code(mut self, status_code: StatusCode) -> Self {
        self.status_code = status_code;
        self
    }

    /// Replaces the status code in place. The label and payload follow on the next reformat.
    pub fn set_status_code(&mut self, status_code: StatusCode) {
        self.status_code = status_code;
    }

    /// Sets the client-facing message.
    pub fn with_message<S: Into<Cow<'static, str>>>(mut self, message: S) -> Self {
        self.message = message.into();
        self
    }

    /// Inserts a header, replacing previous values of the same name.
    pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    /// Attaches a payload that is emitted verbatim as `data`.
    ///
    /// ```rust
    /// use crashpad::HttpError;
    ///
    /// let err = HttpError::bad_request("invalid cucumber")
    ///     .with_data(serde_json::json!({ "skinToughness": "high" }));
    /// assert_eq!(err.data().unwrap()["skinToughness"], "high");
    /// ```
    pub fn with_data<V: Into<serde_json::Value>>(mut self, data: V) -> Self {
        self.data = Some(data.into());
        self
    }

    /// Set the source error from a generic error. The source is never emitted.
    pub fn with_source_err<E>(mut self, err: E) -> Self
    where
        E: Into<anyhow::Error>,
    {
        self.source = Some(err.into());
        self
    }

    /// Adds a key-value pair to the data object, creating it if necessary. A non-object payload
    /// is replaced.
    pub fn add<K, V>(&mut self, key: K, value: V) -> serde_json::Result<()>
    where
        K: Into<String>,
        V: Serialize,
    {
        let value = serde_json::to_value(value)?;
        match &mut self.data {
            Some(serde_json::Value::Object(map)) => {
                map.insert(key.into(), value);
            }
            data => {
                let mut map = serde_json::Map::new();
                map.insert(key.into(), value);
                *data = Some(serde_json::Value::Object(map));
            }
        }
        Ok(())
    }

    /// Retrieves a value from the data object.
    pub fn get<V>(&self, key: impl AsRef<str>) -> Option<V>
    where
        V: DeserializeOwned,
    {
        self.data
            .as_ref()
            .and_then(|d| d.get(key.as_ref()))
            .and_then(|v| serde_json::from_value(v.clone()).ok())
    }

    /// Returns the status code.
    pub fn status_code(&self) -> StatusCode {
        self.status_code
    }

    /// Returns the client-facing message.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns the headers attached to the error.
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Returns the attached payload if any.
    pub fn data(&self) -> Option<&serde_json::Value> {
        self.data.as_ref()
    }

    /// Returns the source error if any.
    pub fn source_err(&self) -> Option<&anyhow::Error> {
        self.source.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use anyhow::anyhow;
    use serde_json::json;

    use super::*;

    #[test]
    fn http_error_display() {
        let e = HttpError::default();
        assert_eq!(e.to_string(), "http error 500 Internal Server Error");

        let e = HttpError::default().with_message("message");
        assert_eq!(
            e.to_string(),
            "http error 500 Internal Server Error: message"
        );

        let e = HttpError::default().with_source_err(anyhow!("error"));
        assert_eq!(
            e.to_string(),
            "http error 500 Internal Server Error, source: error"
        );

        let e = HttpError::default()
            .with_message("message")
            .with_source_err(anyhow!("error"));
        assert_eq!(
            e.to_string(),
            "http error 500 Internal Server Error: message, source: error"
        );
    }

    #[test]
    fn http_error_default() {
        let e = HttpError::default();
        assert_eq!(e.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(e.message().is_empty());
        assert!(e.headers().is_empty());
        assert!(e.data().is_none());
    }

    #[test]
    fn http_error_from_status_code() {
        let e = HttpError::from_status_code(StatusCode::BAD_REQUEST);
        assert_eq!(e.status_code(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn http_error_from_err() {
        let e = HttpError::from_err(anyhow!("error"));
        assert_eq!(e.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(e.source_err().unwrap().to_string(), "error");
        assert!(e.message().is_empty());

        let e = HttpError::from_err(fmt::Error);
        assert_eq!(e.source_err().unwrap().to_string(), fmt::Error.to_string());
    }

    #[test]
    fn http_error_from_err_downcasts() {
        let inner: anyhow::Error = HttpError::conflict("taken").into();
        let e = HttpError::from_err(inner);
        assert_eq!(e.status_code(), StatusCode::CONFLICT);
        assert_eq!(e.message(), "taken");
    }

    #[test]
    fn http_error_from_err_status_error() {
        let e = HttpError::from_err(StatusError::new(404, "no such user"));
        assert_eq!(e.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(e.message(), "no such user");
        assert_eq!(e.source_err().unwrap().to_string(), "no such user");

        let normalized = crate::normalize(e);
        assert_eq!(normalized.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(normalized.reformat().payload.error, "Not Found");

        let e = HttpError::from_err(StatusError::new(500, "secret internals"));
        assert_eq!(e.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(e.message().is_empty());
        assert_eq!(e.reformat().payload.message, "Internal Server Error");

        let e = HttpError::from_err(StatusError::new(302, "moved"));
        assert_eq!(e.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(e.message().is_empty());
    }

    #[test]
    fn http_error_named_constructors() {
        let e = HttpError::bad_request("invalid cucumber");
        assert_eq!(e.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(e.message(), "invalid cucumber");

        assert_eq!(HttpError::not_found("").status_code(), StatusCode::NOT_FOUND);
        assert_eq!(
            HttpError::too_many_requests("slow down").status_code(),
            StatusCode::TOO_MANY_REQUESTS
        );
        assert_eq!(
            HttpError::gateway_timeout("upstream").status_code(),
            StatusCode::GATEWAY_TIMEOUT
        );
    }

    #[test]
    fn http_error_unauthorized() {
        let e = HttpError::unauthorized(
            "get off my lawn!",
            Challenge::new("sample")
                .attribute("ttl", 0)
                .empty_attribute("cache")
                .attribute("foo", "bar"),
        )
        .unwrap();
        assert_eq!(e.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(e.message(), "get off my lawn!");
        assert_eq!(
            e.headers()[WWW_AUTHENTICATE],
            r#"sample ttl="0", cache="", foo="bar", error="get off my lawn!""#
        );
    }

    #[test]
    fn http_error_unauthorized_rejects_invalid_header() {
        let res = HttpError::unauthorized("line\nbreak", Challenge::new("Bearer"));
        assert!(res.is_err());
    }

    #[test]
    fn http_error_method_not_allowed() {
        let e = HttpError::method_not_allowed("nope", [Method::GET, Method::POST]);
        assert_eq!(e.status_code(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(e.headers()[ALLOW], "GET, POST");

        let e = HttpError::method_not_allowed("nope", []);
        assert!(e.headers().get(ALLOW).is_none());
    }

    #[test]
    fn http_error_set_status_code() {
        let mut e = HttpError::bad_request("oops");
        e.set_status_code(StatusCode::CONFLICT);
        assert_eq!(e.status_code(), StatusCode::CONFLICT);
        assert_eq!(e.message(), "oops");
    }

    #[test]
    fn http_error_with_header() {
        let e = HttpError::default().with_header(
            HeaderName::from_static("x-custom-header"),
            HeaderValue::from(42),
        );
        assert_eq!(e.headers()["x-custom-header"], "42");
    }

    #[test]
    fn http_error_with_source_error() {
        let e = HttpError::default().with_source_err(fmt::Error);
        assert_eq!(e.source_err().unwrap().to_string(), fmt::Error.to_string());
        assert!(StdError::source(&e).is_some());
    }

    #[test]
    fn http_error_data() {
        let mut e = HttpError::default();
        e.add("key", 1234).unwrap();
        assert_eq!(e.get::<i32>("key"), Some(1234));
        assert_eq!(e.get::<String>("key"), None);
    }

    #[test]
    fn http_error_add_replaces_non_object_data() {
        let mut e = HttpError::default().with_data(json!([1, 2, 3]));
        e.add("key", "value").unwrap();
        assert_eq!(e.data(), Some(&json!({ "key": "value" })));
    }

    #[test]
    fn http_error_with_data() {
        let e = HttpError::default().with_data(json!({ "key1": 1234, "key2": [5678] }));
        assert_eq!(e.get::<i32>("key1"), Some(1234));
        assert_eq!(e.get::<Vec<i32>>("key2"), Some(vec![5678]));
    }

    #[test]
    fn http_error_into_anyhow() {
        let err: anyhow::Error = HttpError::default()
            .with_source_err(anyhow!("an error"))
            .into();
        assert_eq!(err.to_string(), "http error 500 Internal Server Error, source: an error");
        assert_eq!(
            err.source().map(|e| e.to_string()),
            Some("an error".into())
        );
    }
}
