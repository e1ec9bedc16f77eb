use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue, AUTHORIZATION};
use tokio_util::sync::CancellationToken;

use crate::{
    request::join_url, ClassifiedFailure, ClientOptions, FailureCategory, FailureObserver,
    RequestSpec, Response, Result, RetryState,
};

#[derive(Clone)]
/// HTTP client for the HR backend with bounded retry on timeout.
///
/// Cloning is cheap; clones share the connection pool and observers.
pub struct ResilientClient {
    http: reqwest::Client,
    base_url: String,
    options: ClientOptions,
    observers: Vec<Arc<dyn FailureObserver>>,
}

impl fmt::Debug for ResilientClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let headers: Vec<(&str, &str)> = self
            .options
            .default_headers
            .iter()
            .map(|(name, value)| {
                if name.eq_ignore_ascii_case(AUTHORIZATION.as_str()) {
                    (name.as_str(), "<redacted>")
                } else {
                    (name.as_str(), value.as_str())
                }
            })
            .collect();
        f.debug_struct("ResilientClient")
            .field("base_url", &self.base_url)
            .field("timeout_ms", &self.options.timeout_ms)
            .field("max_retries", &self.options.max_retries)
            .field("default_headers", &headers)
            .field("observers", &self.observers.len())
            .finish()
    }
}

impl ResilientClient {
    /// Creates a client for `base_url` with default options.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
            options: ClientOptions::default(),
            observers: Vec::new(),
        }
    }

    /// Creates a client from environment variables.
    ///
    /// Reads:
    /// - `HRMS_API_BASE_URL`: backend base URL (required)
    /// - `HRMS_API_TIMEOUT_MS`: per-attempt timeout (optional)
    /// - `HRMS_API_MAX_RETRIES`: retry ceiling for timeouts (optional)
    ///
    /// Returns an error if the base URL is missing or empty, or if an
    /// optional variable is set but does not parse.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use hrms_http::ResilientClient;
    ///
    /// let client = ResilientClient::from_env().expect("missing HRMS_API_BASE_URL");
    /// ```
    pub fn from_env() -> std::result::Result<Self, String> {
        let base_url = std::env::var("HRMS_API_BASE_URL")
            .map_err(|_| "missing HRMS_API_BASE_URL environment variable".to_owned())?;
        if base_url.trim().is_empty() {
            return Err("HRMS_API_BASE_URL is set but empty".to_owned());
        }

        let mut options = ClientOptions::default();
        if let Some(timeout_ms) = env_number("HRMS_API_TIMEOUT_MS")? {
            options.timeout_ms = timeout_ms;
        }
        if let Some(max_retries) = env_number("HRMS_API_MAX_RETRIES")? {
            options.max_retries = max_retries;
        }
        Ok(Self::new(base_url.trim()).with_options(options))
    }

    /// Applies client options such as timeout, retry ceiling and default headers.
    pub fn with_options(mut self, opts: ClientOptions) -> Self {
        self.options = opts;
        self
    }

    /// Registers an observer notified of every terminal failure.
    pub fn with_observer(mut self, observer: impl FailureObserver + 'static) -> Self {
        self.observers.push(Arc::new(observer));
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn options(&self) -> &ClientOptions {
        &self.options
    }

    /// Sends a request, retrying only on timeout.
    ///
    /// Any HTTP response is returned as-is, whatever its status code. Use
    /// [`Response::error_for_status`] to turn error statuses into failures.
    pub async fn execute(&self, spec: RequestSpec) -> Result<Response> {
        self.run(&spec, None).await
    }

    /// Like [`ResilientClient::execute`], but stops as soon as `cancel` fires.
    ///
    /// The in-flight attempt is dropped and no further retries are issued.
    pub async fn execute_with_cancel(
        &self,
        spec: RequestSpec,
        cancel: &CancellationToken,
    ) -> Result<Response> {
        self.run(&spec, Some(cancel)).await
    }

    async fn run(&self, spec: &RequestSpec, cancel: Option<&CancellationToken>) -> Result<Response> {
        let result = self.send_with_retry(spec, cancel).await;
        if let Err(failure) = &result {
            #[cfg(feature = "tracing")]
            tracing::warn!(
                method = %spec.method,
                path = %spec.path,
                category = %failure.category(),
                attempts = failure.attempts(),
                "request failed: {}",
                failure.message()
            );
            self.notify(failure);
        }
        result
    }

    /// Hands a terminal failure to every registered observer.
    pub(crate) fn notify(&self, failure: &ClassifiedFailure) {
        for observer in &self.observers {
            observer.on_failure(failure);
        }
    }

    async fn send_with_retry(
        &self,
        spec: &RequestSpec,
        cancel: Option<&CancellationToken>,
    ) -> Result<Response> {
        // Built once and cloned per attempt so retries are byte-identical.
        let request = self.build_request(spec)?;
        let mut state = RetryState::initial();

        loop {
            if cancel.is_some_and(CancellationToken::is_cancelled) {
                return Err(cancelled(state.attempt()));
            }

            let attempt = request.try_clone().ok_or_else(|| {
                ClassifiedFailure::new(
                    FailureCategory::Unexpected,
                    "request body cannot be replayed",
                )
                .with_attempts(state.attempt())
            })?;

            let outcome = match cancel {
                Some(token) => {
                    tokio::select! {
                        biased;
                        () = token.cancelled() => return Err(cancelled(state.attempts_made())),
                        outcome = self.send_once(attempt, state) => outcome,
                    }
                }
                None => self.send_once(attempt, state).await,
            };

            match outcome {
                Ok(response) => return Ok(response),
                Err(failure) if failure.is_timeout() => match state.next(self.options.max_retries) {
                    Some(next) => {
                        #[cfg(feature = "tracing")]
                        tracing::debug!(
                            "request to {} timed out after {} ms, retry {} of {}",
                            spec.path,
                            self.options.timeout_ms,
                            next.attempt(),
                            self.options.max_retries
                        );
                        state = next;
                    }
                    None => return Err(failure),
                },
                Err(failure) => return Err(failure),
            }
        }
    }

    async fn send_once(&self, request: reqwest::Request, state: RetryState) -> Result<Response> {
        let attempts = state.attempts_made();
        let response = self
            .http
            .execute(request)
            .await
            .map_err(|err| ClassifiedFailure::from_transport(err).with_attempts(attempts))?;

        let status = response.status();
        let headers = response.headers().clone();
        let body = response.bytes().await.map_err(|err| {
            ClassifiedFailure::from_transport(err)
                .with_status(status.as_u16())
                .with_attempts(attempts)
        })?;

        Ok(Response::new(status, headers, body.to_vec(), attempts))
    }

    fn build_request(&self, spec: &RequestSpec) -> Result<reqwest::Request> {
        let url = join_url(&self.base_url, &spec.path);
        let headers = merge_headers(&self.options.default_headers, &spec.headers)?;

        let mut builder = self
            .http
            .request(spec.method.clone(), url)
            .headers(headers)
            .timeout(Duration::from_millis(self.options.timeout_ms));

        if let Some(body) = &spec.body {
            let bytes = serde_json::to_vec(body).map_err(|err| {
                ClassifiedFailure::new(
                    FailureCategory::Unexpected,
                    format!("request body could not be encoded: {err}"),
                )
            })?;
            builder = builder.body(bytes);
        }

        builder.build().map_err(ClassifiedFailure::from_transport)
    }
}

/// Defaults first, then request headers; later names replace earlier ones.
fn merge_headers(
    defaults: &[(String, String)],
    overrides: &[(String, String)],
) -> Result<HeaderMap> {
    let mut headers = HeaderMap::new();
    for (name, value) in defaults.iter().chain(overrides) {
        let header_name = HeaderName::from_bytes(name.as_bytes()).map_err(|err| {
            ClassifiedFailure::new(
                FailureCategory::Unexpected,
                format!("invalid header name '{name}': {err}"),
            )
        })?;
        let header_value = HeaderValue::from_str(value).map_err(|err| {
            ClassifiedFailure::new(
                FailureCategory::Unexpected,
                format!("invalid value for header '{name}': {err}"),
            )
        })?;
        headers.insert(header_name, header_value);
    }
    Ok(headers)
}

fn cancelled(attempts: u32) -> ClassifiedFailure {
    ClassifiedFailure::new(FailureCategory::Cancelled, "request cancelled by caller")
        .with_attempts(attempts)
}

fn env_number<T: std::str::FromStr>(key: &str) -> std::result::Result<Option<T>, String> {
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| format!("{key} must be a non-negative integer, got '{raw}'")),
        Err(_) => Ok(None),
    }
}
