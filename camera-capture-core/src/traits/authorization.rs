/// Camera authorization as reported by the platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AuthorizationStatus {
    NotDetermined,
    Restricted,
    Denied,
    Authorized,
}

/// Completion for an authorization request; `true` means access was granted.
pub type AuthorizationCallback = Box<dyn FnOnce(bool) + Send + 'static>;

/// Platform capability for querying and requesting camera access.
pub trait AuthorizationProvider: Send + Sync {
    /// Current authorization without prompting.
    fn status(&self) -> AuthorizationStatus;

    /// Prompt for access and invoke `completion` exactly once with the answer.
    ///
    /// The completion may run on any thread, including synchronously inside
    /// this call. Dropping it without calling it counts as a denial.
    fn request_access(&self, completion: AuthorizationCallback);
}
