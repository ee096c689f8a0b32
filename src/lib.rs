//! Thin client for a subset of the exchange REST API, plus the response
//! checks used by the behavior tests.
//!
//! The client composes public (unsigned) and private (signed) requests and
//! hands back raw HTTP responses; interpreting them is the caller's job.
//! Private requests are authenticated with an HMAC-SHA512 signature over the
//! request path and parameters, see [`sign`].

pub mod checks;
pub mod client;
pub mod config;
pub mod error;
pub mod sign;
pub mod transport;

pub use client::{ApiClient, Params};
pub use config::ApiConfig;
pub use error::{ApiError, ApiResult};
pub use transport::{HttpResponse, HttpTransport, ReqwestTransport};
