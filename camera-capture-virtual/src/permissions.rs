//! Simulated camera permission.
//!
//! Behaves like a platform consent prompt: an undetermined status prompts on
//! a separate thread, answers after a delay, and remembers the answer.

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use parking_lot::Mutex;

use camera_capture_core::traits::authorization::{AuthorizationCallback, AuthorizationProvider, AuthorizationStatus};

pub struct VirtualAuthorization {
    status: Arc<Mutex<AuthorizationStatus>>,
    answer: bool,
    delay: Duration,
}

impl VirtualAuthorization {
    /// Access already granted; no prompt is shown.
    pub fn granted() -> Self {
        Self::with_status(AuthorizationStatus::Authorized, true)
    }

    /// Access already denied; no prompt is shown.
    pub fn denied() -> Self {
        Self::with_status(AuthorizationStatus::Denied, false)
    }

    /// Not yet determined; the prompt answers `answer` after `delay`.
    pub fn prompting(answer: bool, delay: Duration) -> Self {
        Self {
            status: Arc::new(Mutex::new(AuthorizationStatus::NotDetermined)),
            answer,
            delay,
        }
    }

    fn with_status(status: AuthorizationStatus, answer: bool) -> Self {
        Self {
            status: Arc::new(Mutex::new(status)),
            answer,
            delay: Duration::ZERO,
        }
    }
}

impl AuthorizationProvider for VirtualAuthorization {
    fn status(&self) -> AuthorizationStatus {
        *self.status.lock()
    }

    fn request_access(&self, completion: AuthorizationCallback) {
        let status = Arc::clone(&self.status);
        let answer = self.answer;
        let delay = self.delay;

        let spawned = thread::Builder::new()
            .name("virtual-authorization-prompt".into())
            .spawn(move || {
                thread::sleep(delay);
                *status.lock() = if answer {
                    AuthorizationStatus::Authorized
                } else {
                    AuthorizationStatus::Denied
                };
                log::info!("virtual camera access {}", if answer { "granted" } else { "denied" });
                completion(answer);
            });

        // The completion went down with the closure; the caller sees a denial.
        if let Err(e) = spawned {
            log::error!("failed to spawn authorization prompt: {}", e);
        }
    }
}
