use std::sync::Arc;

use parking_lot::RwLock;

use crate::models::state::AuthorizationState;
use crate::session::queue::SuspendGate;
use crate::traits::authorization::{AuthorizationProvider, AuthorizationStatus};

/// Resolves camera authorization once and remembers the answer.
///
/// While a prompt is outstanding the configuration queue is suspended, so no
/// configuration attempt can race the request. If the platform never answers,
/// the queue stays suspended; callers that cannot accept that must put their
/// own timeout around the operation that triggered the request.
pub struct PermissionGate {
    provider: Arc<dyn AuthorizationProvider>,
    queue_gate: Arc<SuspendGate>,
    state: Arc<RwLock<AuthorizationState>>,
}

impl PermissionGate {
    pub fn new(provider: Arc<dyn AuthorizationProvider>, queue_gate: Arc<SuspendGate>) -> Self {
        Self {
            provider,
            queue_gate,
            state: Arc::new(RwLock::new(AuthorizationState::Unknown)),
        }
    }

    pub fn state(&self) -> AuthorizationState {
        *self.state.read()
    }

    /// Shared read access for observers off the configuration thread.
    pub fn state_handle(&self) -> Arc<RwLock<AuthorizationState>> {
        Arc::clone(&self.state)
    }

    /// Return the resolved authorization, prompting the first time it is
    /// still undetermined.
    pub fn check_or_request(&mut self) -> AuthorizationState {
        let current = self.state();
        if current.is_resolved() {
            return current;
        }

        match self.provider.status() {
            AuthorizationStatus::Authorized => return self.resolve(true),
            AuthorizationStatus::Denied | AuthorizationStatus::Restricted => return self.resolve(false),
            AuthorizationStatus::NotDetermined => {}
        }

        *self.state.write() = AuthorizationState::Requesting;
        log::info!("requesting camera authorization");

        let (answer_tx, answer_rx) = crossbeam_channel::bounded(1);
        let suspension = self.queue_gate.hold();
        self.provider.request_access(Box::new(move |granted| {
            let _suspension = suspension;
            let _ = answer_tx.send(granted);
        }));

        let granted = answer_rx.recv().unwrap_or_else(|_| {
            log::warn!("authorization request dropped without an answer");
            false
        });
        self.resolve(granted)
    }

    fn resolve(&mut self, granted: bool) -> AuthorizationState {
        let resolved = if granted {
            AuthorizationState::Granted
        } else {
            AuthorizationState::Denied
        };
        *self.state.write() = resolved;
        log::info!("camera authorization resolved: {:?}", resolved);
        resolved
    }
}
