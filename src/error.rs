use std::fmt;

/// Why a request did not produce a usable response.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum FailureCategory {
    /// Every attempt ran past the configured timeout.
    Timeout,
    /// No response was received: connection refused, DNS failure, offline.
    NetworkUnreachable,
    /// The server answered 404. Only produced by status interpretation.
    NotFound,
    /// The server answered 5xx. Only produced by status interpretation.
    ServerError,
    /// Any other failure.
    Unexpected,
    /// The caller cancelled the request.
    Cancelled,
}

impl fmt::Display for FailureCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Timeout => "timeout",
            Self::NetworkUnreachable => "network unreachable",
            Self::NotFound => "not found",
            Self::ServerError => "server error",
            Self::Unexpected => "unexpected error",
            Self::Cancelled => "cancelled",
        };
        f.write_str(name)
    }
}

/// User-facing text for a failure. Rendering it is up to the caller.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Notice {
    pub title: &'static str,
    pub message: &'static str,
}

/// Terminal, categorized failure returned to the caller.
#[derive(Debug, thiserror::Error)]
#[error("{category}: {message}")]
pub struct ClassifiedFailure {
    category: FailureCategory,
    http_status: Option<u16>,
    message: String,
    attempts: u32,
    #[source]
    source: Option<reqwest::Error>,
}

impl ClassifiedFailure {
    pub(crate) fn new(category: FailureCategory, message: impl Into<String>) -> Self {
        Self {
            category,
            http_status: None,
            message: message.into(),
            attempts: 0,
            source: None,
        }
    }

    pub(crate) fn with_status(mut self, status: u16) -> Self {
        self.http_status = Some(status);
        self
    }

    pub(crate) fn with_attempts(mut self, attempts: u32) -> Self {
        self.attempts = attempts;
        self
    }

    pub(crate) fn with_source(mut self, source: reqwest::Error) -> Self {
        self.source = Some(source);
        self
    }

    /// Classifies a transport error from `reqwest`.
    ///
    /// Status is taken from the error when the status line had already
    /// arrived (e.g. the body broke off).
    pub(crate) fn from_transport(err: reqwest::Error) -> Self {
        let category = if err.is_timeout() {
            FailureCategory::Timeout
        } else if err.is_connect() || (err.is_request() && err.status().is_none()) {
            FailureCategory::NetworkUnreachable
        } else {
            FailureCategory::Unexpected
        };
        let failure = Self::new(category, err.to_string());
        let failure = match err.status() {
            Some(status) => failure.with_status(status.as_u16()),
            None => failure,
        };
        failure.with_source(err)
    }

    pub fn category(&self) -> FailureCategory {
        self.category
    }

    /// HTTP status, when one was received before the failure.
    pub fn http_status(&self) -> Option<u16> {
        self.http_status
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Attempts issued before the failure settled. Zero when nothing was sent.
    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    /// Underlying transport error, if any.
    pub fn transport_error(&self) -> Option<&reqwest::Error> {
        self.source.as_ref()
    }

    pub fn is_timeout(&self) -> bool {
        self.category == FailureCategory::Timeout
    }

    /// Distinct user-facing text per category.
    pub fn notice(&self) -> Notice {
        let (title, message) = match self.category {
            FailureCategory::Timeout => (
                "Connection Timeout",
                "The server is taking too long to respond. Please check your internet connection and try again.",
            ),
            FailureCategory::NetworkUnreachable => (
                "Network Error",
                "Unable to connect to the server. Please check your internet connection and try again.",
            ),
            FailureCategory::NotFound => ("Error", "The requested resource was not found."),
            FailureCategory::ServerError => (
                "Server Error",
                "Something went wrong on our servers. Please try again later.",
            ),
            FailureCategory::Unexpected => {
                ("Error", "An unexpected error occurred. Please try again.")
            }
            FailureCategory::Cancelled => ("Cancelled", "The request was cancelled."),
        };
        Notice { title, message }
    }
}
