use crate::ClassifiedFailure;

/// Receives every terminal failure produced by a client.
///
/// Observers run before the failure is returned to the caller. They are the
/// place to surface [`ClassifiedFailure::notice`] to a user.
pub trait FailureObserver: Send + Sync {
    fn on_failure(&self, failure: &ClassifiedFailure);
}

impl<F> FailureObserver for F
where
    F: Fn(&ClassifiedFailure) + Send + Sync,
{
    fn on_failure(&self, failure: &ClassifiedFailure) {
        self(failure)
    }
}
