/// Configures HTTP timeout, retry and default header behavior.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ClientOptions {
    /// Per-attempt timeout in milliseconds.
    pub timeout_ms: u64,
    /// Maximum number of retries after the initial attempt.
    ///
    /// Only timeouts are retried.
    pub max_retries: u32,
    /// Headers sent with every request. Request-level headers with the same
    /// name replace these.
    pub default_headers: Vec<(String, String)>,
}

impl ClientOptions {
    /// Adds or replaces a default header.
    pub fn with_default_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        let name = name.into();
        self.default_headers
            .retain(|(existing, _)| !existing.eq_ignore_ascii_case(&name));
        self.default_headers.push((name, value.into()));
        self
    }
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            timeout_ms: 10_000,
            max_retries: 3,
            default_headers: vec![("Content-Type".to_owned(), "application/json".to_owned())],
        }
    }
}
