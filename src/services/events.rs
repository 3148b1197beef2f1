use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::debug;

use crate::api::AuthUser;

/// Auth-state change delivered to the UI loop
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthEvent {
    Changed(Option<AuthUser>),
}

/// Handle to the forwarding task; dropping it leaves the task running
pub struct AuthSubscription {
    handle: JoinHandle<()>,
}

impl AuthSubscription {
    /// Stop forwarding. Safe to call more than once.
    pub fn unregister(&self) {
        self.handle.abort();
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

/// Spawn the auth listener task
///
/// The current value is sent immediately, then one event per change. The task
/// ends when the provider is dropped or the UI side hangs up.
pub fn spawn_auth_listener(
    mut auth_rx: watch::Receiver<Option<AuthUser>>,
    event_tx: mpsc::UnboundedSender<AuthEvent>,
) -> AuthSubscription {
    let handle = tokio::spawn(async move {
        let initial = auth_rx.borrow_and_update().clone();
        if event_tx.send(AuthEvent::Changed(initial)).is_err() {
            return;
        }

        while auth_rx.changed().await.is_ok() {
            let user = auth_rx.borrow_and_update().clone();
            debug!(
                "auth state changed: {}",
                user.as_ref().map(|u| u.uid.as_str()).unwrap_or("signed out")
            );
            if event_tx.send(AuthEvent::Changed(user)).is_err() {
                break;
            }
        }
    });

    AuthSubscription { handle }
}
