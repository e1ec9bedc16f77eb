//! `hrms-http` is a resilient async HTTP client for an HR/payroll backend.
//!
//! [`ResilientClient::execute`] sends a [`RequestSpec`] relative to a fixed
//! base endpoint, retries only on timeout up to a fixed ceiling, and returns
//! either the [`Response`] (whatever its status code) or a
//! [`ClassifiedFailure`].
//!
//! The [`hr`] module builds the attendance and payroll calls on top of it.

mod client;
mod error;
mod observer;
mod options;
mod request;
mod response;
mod retry;

pub mod hr;

pub use client::ResilientClient;
pub use error::{ClassifiedFailure, FailureCategory, Notice};
pub use observer::FailureObserver;
pub use options::ClientOptions;
pub use request::RequestSpec;
pub use response::Response;
pub use retry::RetryState;

pub use reqwest::{Method, StatusCode};
pub use tokio_util::sync::CancellationToken;

pub type Result<T> = std::result::Result<T, ClassifiedFailure>;
