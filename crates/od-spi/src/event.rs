//! Identity provider event stream types.

use uuid::Uuid;

/// A bare remote session handle delivered by the identity provider.
///
/// This carries only what the provider needs to resolve the session into a
/// full [`od_model::Identity`] via
/// [`IdentityProvider::fetch_identity_details`](crate::IdentityProvider::fetch_identity_details);
/// it is never treated as an identity itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionDetails {
    /// Subject identifier of the session owner.
    pub subject: Uuid,

    /// Opaque access token for the remote session.
    pub access_token: String,
}

impl SessionDetails {
    /// Creates new session details.
    #[must_use]
    pub fn new(subject: Uuid, access_token: impl Into<String>) -> Self {
        Self {
            subject,
            access_token: access_token.into(),
        }
    }
}

/// An asynchronous notification from the identity provider's event stream.
#[derive(Debug, Clone)]
pub enum ProviderEvent {
    /// A remote session was established (login, auto sign-in on
    /// registration, or a session restored elsewhere).
    SignedIn(SessionDetails),

    /// The remote session ended (logout, token expiry, or revocation).
    SignedOut,
}

impl ProviderEvent {
    /// Checks if this is a signed-in event.
    #[must_use]
    pub const fn is_signed_in(&self) -> bool {
        matches!(self, Self::SignedIn(_))
    }

    /// Checks if this is a signed-out event.
    #[must_use]
    pub const fn is_signed_out(&self) -> bool {
        matches!(self, Self::SignedOut)
    }
}

/// Callback invoked for each provider event.
///
/// Listeners must be fast and non-blocking; they are called synchronously
/// from the provider's delivery path.
pub type EventListener = Box<dyn Fn(ProviderEvent) + Send + Sync>;

/// Handle for an active event stream subscription.
///
/// Dropping the guard detaches the listener; no events are delivered after
/// that point.
pub struct SubscriptionGuard {
    cancel: Option<Box<dyn FnOnce() + Send>>,
}

impl SubscriptionGuard {
    /// Creates a guard that runs `cancel` when dropped.
    #[must_use]
    pub fn new(cancel: impl FnOnce() + Send + 'static) -> Self {
        Self {
            cancel: Some(Box::new(cancel)),
        }
    }
}

impl Drop for SubscriptionGuard {
    fn drop(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl std::fmt::Debug for SubscriptionGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SubscriptionGuard").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    use super::*;

    #[test]
    fn event_kind_checks() {
        let details = SessionDetails::new(Uuid::now_v7(), "tok");
        assert!(ProviderEvent::SignedIn(details).is_signed_in());
        assert!(ProviderEvent::SignedOut.is_signed_out());
    }

    #[test]
    fn guard_cancels_on_drop() {
        let cancelled = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&cancelled);
        let guard = SubscriptionGuard::new(move || flag.store(true, Ordering::SeqCst));

        assert!(!cancelled.load(Ordering::SeqCst));
        drop(guard);
        assert!(cancelled.load(Ordering::SeqCst));
    }
}
