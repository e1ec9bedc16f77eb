/// Attempt counter for a single logical request.
///
/// A value is created per `execute` call and replaced, never mutated, when a
/// timeout is retried.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct RetryState {
    attempt: u32,
}

impl RetryState {
    /// State for the first attempt.
    pub fn initial() -> Self {
        Self::default()
    }

    /// Number of retries already issued (0 for the first attempt).
    pub fn attempt(self) -> u32 {
        self.attempt
    }

    /// Total attempts issued so far, including the current one.
    pub fn attempts_made(self) -> u32 {
        self.attempt + 1
    }

    /// State for the next attempt, or `None` when the retry budget is spent.
    pub fn next(self, max_retries: u32) -> Option<Self> {
        if self.attempt < max_retries {
            Some(Self {
                attempt: self.attempt + 1,
            })
        } else {
            None
        }
    }
}
