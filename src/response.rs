//! Creating responses from [`HttpError`].
use bytes::BufMut;
use bytes::Bytes;
use bytes::BytesMut;
use http::header::{HeaderName, CONTENT_TYPE};
use http::{HeaderMap, HeaderValue, StatusCode};
use serde::Serialize;

use crate::http_error::HttpError;

/// The shape of an [`HttpError`] on the wire, derived from its current status code.
#[derive(Debug, Clone, PartialEq)]
pub struct Output<'a> {
    pub status: StatusCode,
    pub headers: &'a HeaderMap,
    pub payload: Payload<'a>,
}

/// JSON body of an error response.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Payload<'a> {
    pub status_code: u16,
    pub error: &'static str,
    pub message: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<&'a serde_json::Value>,
}

impl Payload<'_> {
    /// Serializes the payload as Json.
    pub fn to_bytes(&self) -> serde_json::Result<Bytes> {
        let mut buf = BytesMut::with_capacity(128).writer();
        serde_json::to_writer(&mut buf, self)?;
        Ok(buf.into_inner().freeze())
    }
}

/// The standard reason phrase of `status`, `"Unknown"` for unregistered codes.
pub fn label(status: StatusCode) -> &'static str {
    status.canonical_reason().unwrap_or("Unknown")
}

impl HttpError {
    /// Derives the response shape from the current state of the error. Nothing is cached, so
    /// status changes made after construction show up in the label and body.
    ///
    /// ```rust
    /// use crashpad::HttpError;
    /// use http::StatusCode;
    ///
    /// let mut err = HttpError::bad_request("invalid cucumber");
    /// err.set_status_code(StatusCode::CONFLICT);
    /// assert_eq!(err.reformat().payload.error, "Conflict");
    /// ```
    pub fn reformat(&self) -> Output<'_> {
        let error = label(self.status_code);
        let message = if self.message.is_empty() {
            error
        } else {
            &*self.message
        };
        Output {
            status: self.status_code,
            headers: &self.headers,
            payload: Payload {
                status_code: self.status_code.as_u16(),
                error,
                message,
                data: self.data.as_ref(),
            },
        }
    }
}

/// The receiving end of an emitted error: whatever the surrounding framework uses to build its
/// response.
pub trait ResponseSink {
    /// Sets `name` to `value`, replacing earlier values.
    fn set_header(&mut self, name: HeaderName, value: HeaderValue);

    /// Adds another value for `name`. Sinks that cannot hold repeated headers keep the last one.
    fn append_header(&mut self, name: HeaderName, value: HeaderValue) {
        self.set_header(name, value);
    }

    /// Sets the status line.
    fn set_status(&mut self, status: StatusCode);

    /// Writes a serialized Json body.
    fn write_json(&mut self, body: Bytes);
}

impl<B> ResponseSink for http::Response<B>
where
    B: From<Bytes>,
{
    fn set_header(&mut self, name: HeaderName, value: HeaderValue) {
        self.headers_mut().insert(name, value);
    }

    fn append_header(&mut self, name: HeaderName, value: HeaderValue) {
        self.headers_mut().append(name, value);
    }

    fn set_status(&mut self, status: StatusCode) {
        *self.status_mut() = status;
    }

    fn write_json(&mut self, body: Bytes) {
        if let Ok(content_type) = HeaderValue::from_str(mime::APPLICATION_JSON.as_ref()) {
            self.headers_mut().insert(CONTENT_TYPE, content_type);
        }
        *self.body_mut() = B::from(body);
    }
}

/// Writes `http_error` into `sink`: headers first, then the status line, then the Json body.
/// This is the last step of error handling, nothing runs after it.
pub fn emit<S>(http_error: &HttpError, sink: &mut S)
where
    S: ResponseSink + ?Sized,
{
    let output = http_error.reformat();

    for name in output.headers.keys() {
        let mut values = output.headers.get_all(name).iter();
        if let Some(first) = values.next() {
            sink.set_header(name.clone(), first.clone());
        }
        for value in values {
            sink.append_header(name.clone(), value.clone());
        }
    }

    sink.set_status(output.status);

    let body = match output.payload.to_bytes() {
        Ok(body) => body,
        Err(err) => {
            tracing::error!(%err, "failed to serialize error data, dropping it");
            Payload {
                data: None,
                ..output.payload
            }
            .to_bytes()
            .unwrap_or_default()
        }
    };
    sink.write_json(body);
}

#[cfg(feature = "axum")]
#[cfg_attr(docsrs, doc(cfg(feature = "axum")))]
impl axum::response::IntoResponse for HttpError {
    fn into_response(self) -> axum::response::Response {
        crate::Normalizer::default().respond(self)
    }
}

#[cfg(feature = "axum")]
#[cfg_attr(docsrs, doc(cfg(feature = "axum")))]
impl axum::response::IntoResponse for crate::Raised {
    fn into_response(self) -> axum::response::Response {
        crate::Normalizer::default().respond(self)
    }
}
