//! `crashpad` turns whatever a request handler failed with into a consistent JSON error response.
//!
//! A raised value is classified into a [`Raised`] variant, canonicalized into an [`HttpError`] by
//! a [`Normalizer`] and finally emitted into a [`ResponseSink`](response::ResponseSink) as status
//! line, headers and a body of the form
//!
//! ```json
//! { "statusCode": 400, "error": "Bad Request", "message": "invalid cucumber", "data": { "skinToughness": "high" } }
//! ```
//!
//! Plain errors and non-error values answer with a generic 500 so their text never reaches the
//! client. Errors carrying their own status through [`StatusError`] keep their message unless the
//! status is 500. [`HttpError`]s are sent exactly as built.
//!
//! # Example with `axum`
//!
//! ```rust,no_run
//! # #[cfg(feature = "axum")]
//! # mod example {
//! use axum::{routing::get, Router};
//! use crashpad::{Challenge, HttpError, Raised, StatusError};
//!
//! async fn serve() {
//!     let app = Router::new()
//!         .route("/lawn", get(lawn))
//!         .route("/users", get(users));
//!
//!     let listener = tokio::net::TcpListener::bind("127.0.0.1:3000")
//!         .await
//!         .unwrap();
//!     axum::serve(listener, app).await.unwrap();
//! }
//!
//! async fn lawn() -> Result<(), Raised> {
//!     Err(HttpError::unauthorized("get off my lawn!", Challenge::new("sample"))?.into())
//! }
//!
//! async fn users() -> Result<String, Raised> {
//!     Err(StatusError::new(404, "no such user"))?
//! }
//! # }
//! # fn main() {}
//! ```

mod challenge;
mod extension;
mod http_error;
mod normalizer;
mod raised;

pub use challenge::*;
pub use extension::*;
pub use http_error::*;
pub use normalizer::*;
pub use raised::*;

#[doc(hidden)]
pub mod macros;

pub mod response;

pub use http;
