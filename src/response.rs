use reqwest::{header::HeaderMap, StatusCode};
use serde::de::DeserializeOwned;

use crate::{ClassifiedFailure, FailureCategory};

/// A complete HTTP response, returned whatever its status code.
#[derive(Clone, Debug)]
pub struct Response {
    status: StatusCode,
    headers: HeaderMap,
    body: Vec<u8>,
    attempts: u32,
}

impl Response {
    pub(crate) fn new(status: StatusCode, headers: HeaderMap, body: Vec<u8>, attempts: u32) -> Self {
        Self {
            status,
            headers,
            body,
            attempts,
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// Attempts issued to obtain this response, including the successful one.
    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    /// Body as UTF-8 text, replacing invalid sequences.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// Decodes the body as JSON.
    pub fn json<T: DeserializeOwned>(&self) -> serde_json::Result<T> {
        serde_json::from_slice(&self.body)
    }

    /// Turns error statuses into a [`ClassifiedFailure`].
    ///
    /// 404 maps to `NotFound`, 500 to `ServerError`, any other 4xx or 5xx
    /// to `Unexpected`. Everything else is returned unchanged.
    pub fn error_for_status(self) -> Result<Self, ClassifiedFailure> {
        let category = match self.status {
            StatusCode::NOT_FOUND => FailureCategory::NotFound,
            StatusCode::INTERNAL_SERVER_ERROR => FailureCategory::ServerError,
            status if status.is_client_error() || status.is_server_error() => {
                FailureCategory::Unexpected
            }
            _ => return Ok(self),
        };
        Err(
            ClassifiedFailure::new(category, format!("http error {}: {}", self.status, self.text()))
                .with_status(self.status.as_u16())
                .with_attempts(self.attempts),
        )
    }
}
