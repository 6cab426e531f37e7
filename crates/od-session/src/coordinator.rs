//! Session coordinator.
//!
//! Reconciles the locally persisted session record with the identity
//! provider's event stream and serializes every state-changing operation
//! against the resulting [`Session`].

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use od_model::{Identity, RegistrationProfile};
use od_spi::{
    AuthError, AuthResult, IdentityProvider, PersistenceSlot, ProviderEvent, SessionDetails,
    SubscriptionGuard,
};
use tokio::sync::{mpsc, watch, Mutex};

use crate::record::{PersistedSessionRecord, SLOT_KEY};
use crate::session::{Session, SessionStatus};

/// A provider event together with the commit generation that was current
/// when the provider delivered it.
struct QueuedEvent {
    observed_generation: u64,
    event: ProviderEvent,
}

/// Single source of truth for "who is signed in, with what roles and
/// permissions".
///
/// Construct one per process at the composition root with
/// [`SessionCoordinator::start`] and share it by reference; consumers read
/// the current [`Session`] through [`current_session`](Self::current_session)
/// or observe transitions through [`watch`](Self::watch).
///
/// ## Startup
///
/// `start` publishes [`SessionStatus::Authenticating`], optimistically
/// restores the persisted session record if one decodes, subscribes to the
/// provider's event stream, and then asks the provider for its active
/// session. The provider's answer is authoritative: a conflicting or
/// absent remote session overrides and clears the cached record. If the
/// provider is unreachable, an optimistically restored session is kept
/// until the event stream corrects it.
///
/// ## Ordering
///
/// Every mutation - `login`, `logout`, `register`, `refresh`, and each
/// inbound provider event - commits under one internal mutex. Events are
/// stamped with the commit generation current at delivery; an event whose
/// stamp predates the generation at processing time describes a state that
/// a local operation has since replaced, and is dropped. This is what
/// keeps a signed-out notification raced against an in-flight login from
/// tearing the published session.
pub struct SessionCoordinator {
    inner: Arc<Inner>,
    _subscription: SubscriptionGuard,
}

struct Inner {
    provider: Arc<dyn IdentityProvider>,
    slot: Arc<dyn PersistenceSlot>,
    mutation: Mutex<()>,
    generation: AtomicU64,
    session_tx: watch::Sender<Session>,
}

impl SessionCoordinator {
    /// Starts the coordinator and runs the initialization protocol.
    ///
    /// Must be called from within a Tokio runtime; the coordinator spawns
    /// a task that applies provider events for as long as it lives.
    pub async fn start(
        provider: Arc<dyn IdentityProvider>,
        slot: Arc<dyn PersistenceSlot>,
    ) -> Self {
        let (session_tx, _) = watch::channel(Session::unauthenticated());
        let inner = Arc::new(Inner {
            provider,
            slot,
            mutation: Mutex::new(()),
            generation: AtomicU64::new(0),
            session_tx,
        });

        {
            let _guard = inner.mutation.lock().await;
            inner.commit(Session::authenticating());
            if let Some(identity) = inner.read_cached_identity() {
                // Optimistic restore: published for immediate display, but
                // the slot is left untouched until the provider confirms.
                inner.publish(Session::authenticated(identity));
            }
        }

        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let subscription = {
            let observer = Arc::clone(&inner);
            inner.provider.subscribe(Box::new(move |event| {
                let queued = QueuedEvent {
                    observed_generation: observer.generation.load(Ordering::SeqCst),
                    event,
                };
                // The coordinator (and with it the receiver) may already
                // be gone; nothing to deliver to in that case.
                let _ = event_tx.send(queued);
            }))
        };
        // Detached; it exits when the subscription guard is dropped and
        // the event queue closes.
        let _events_task = tokio::spawn(Inner::drain_events(Arc::clone(&inner), event_rx));

        {
            let _guard = inner.mutation.lock().await;
            inner.confirm_initial().await;
        }

        Self {
            inner,
            _subscription: subscription,
        }
    }

    /// Validates credentials with the identity provider and, on success,
    /// commits the authenticated session and persists it.
    ///
    /// Re-entrant login while already authenticated is allowed and simply
    /// re-validates. On failure the previous session is left untouched.
    /// Concurrent calls are serialized; a second call waits for the first
    /// to commit.
    pub async fn login(&self, email_address: &str, secret: &str) -> AuthResult<()> {
        let _guard = self.inner.mutation.lock().await;
        let previous = self.inner.snapshot();

        if !previous.is_authenticated() {
            self.inner.publish(Session::authenticating());
        }

        match self.inner.provider.sign_in(email_address, secret).await {
            Ok(identity) => {
                self.inner.commit(Session::authenticated(identity));
                Ok(())
            }
            Err(err) => {
                self.inner.publish(previous);
                Err(err)
            }
        }
    }

    /// Signs out.
    ///
    /// The local lockout always completes: if the provider cannot be
    /// reached to invalidate the remote session, the failure is logged and
    /// the local session is still cleared, because a user-initiated
    /// logout must never leave the application showing an authenticated
    /// state. Calling this while already signed out is a no-op.
    pub async fn logout(&self) -> AuthResult<()> {
        let _guard = self.inner.mutation.lock().await;

        if self.inner.snapshot().status() == SessionStatus::Unauthenticated {
            return Ok(());
        }

        if let Err(err) = self.inner.provider.sign_out().await {
            tracing::warn!(error = %err, "remote sign-out failed; completing local lockout");
        }

        self.inner.commit(Session::unauthenticated());
        Ok(())
    }

    /// Registers a new identity with the provider.
    ///
    /// Registration never authenticates directly: even when the provider's
    /// policy is auto sign-in, the authenticated identity is resolved
    /// through the same session-confirmation path used at startup and by
    /// the event stream, never taken from the registration response.
    pub async fn register(&self, profile: &RegistrationProfile) -> AuthResult<()> {
        let _guard = self.inner.mutation.lock().await;
        let previous = self.inner.snapshot();

        if !previous.is_authenticated() {
            self.inner.publish(Session::authenticating());
        }

        let result = match self.inner.provider.sign_up(profile).await {
            Ok(Some(_)) => {
                // Auto sign-in policy: confirm through the provider, not
                // from the registration response.
                match self.inner.provider.active_session().await {
                    Ok(Some(details)) => self.inner.resolve_and_commit(&details).await,
                    Ok(None) => {}
                    Err(err) => {
                        tracing::warn!(error = %err, "could not confirm session after registration");
                    }
                }
                Ok(())
            }
            Ok(None) => Ok(()),
            Err(err) => Err(err),
        };

        if self.inner.snapshot().status() == SessionStatus::Authenticating {
            self.inner.publish(previous);
        }
        result
    }

    /// Re-validates the authenticated session, refreshing roles and
    /// permissions without a status change.
    ///
    /// Returns [`AuthError::SessionExpired`] (after transitioning to
    /// unauthenticated and clearing the persisted record) if the provider
    /// reports no active session. No-op when not authenticated.
    pub async fn refresh(&self) -> AuthResult<()> {
        let _guard = self.inner.mutation.lock().await;

        if !self.inner.snapshot().is_authenticated() {
            return Ok(());
        }

        match self.inner.provider.active_session().await {
            Ok(Some(details)) => {
                self.inner.resolve_and_commit(&details).await;
                Ok(())
            }
            Ok(None) => {
                self.inner.commit(Session::unauthenticated());
                Err(AuthError::SessionExpired)
            }
            Err(err) => Err(err),
        }
    }

    /// Requests a password reset email. Does not affect the session.
    pub async fn request_password_reset(&self, email_address: &str) -> AuthResult<()> {
        self.inner.provider.request_password_reset(email_address).await
    }

    /// Replaces the signed-in account's secret. Does not affect the
    /// session.
    pub async fn reset_secret(&self, new_secret: &str) -> AuthResult<()> {
        self.inner.provider.reset_secret(new_secret).await
    }

    /// Returns a snapshot of the current session. Never blocks.
    #[must_use]
    pub fn current_session(&self) -> Session {
        self.inner.snapshot()
    }

    /// Checks whether the signed-in identity carries the given role.
    /// `false` when no user is signed in.
    #[must_use]
    pub fn has_role(&self, role_label: &str) -> bool {
        self.inner.snapshot().has_role(role_label)
    }

    /// Checks whether the signed-in identity carries the given permission.
    /// `false` when no user is signed in.
    #[must_use]
    pub fn has_permission(&self, permission_label: &str) -> bool {
        self.inner.snapshot().has_permission(permission_label)
    }

    /// Returns a receiver that observes committed session transitions.
    ///
    /// Each successful transition is published exactly once; no-op commits
    /// do not wake watchers.
    #[must_use]
    pub fn watch(&self) -> watch::Receiver<Session> {
        self.inner.session_tx.subscribe()
    }
}

impl Inner {
    fn snapshot(&self) -> Session {
        self.session_tx.borrow().clone()
    }

    /// Publishes a session value without touching the persistence slot.
    ///
    /// Used for transient states (authenticating), for restoring a
    /// snapshot after a failed operation, and for the optimistic restore
    /// at startup. Bumps the commit generation only when the value
    /// actually changed, so watchers wake exactly once per transition.
    fn publish(&self, next: Session) {
        let changed = self.session_tx.send_if_modified(|current| {
            if *current == next {
                false
            } else {
                *current = next;
                true
            }
        });
        if changed {
            self.generation.fetch_add(1, Ordering::SeqCst);
        }
    }

    /// Commits a session value and synchronizes the persistence slot with
    /// it, so the in-memory state and the durable record never diverge.
    fn commit(&self, next: Session) {
        match next.status() {
            SessionStatus::Authenticated => {
                if let Some(identity) = next.identity() {
                    match PersistedSessionRecord::new(identity.clone()).encode() {
                        Ok(raw) => self.slot.write(SLOT_KEY, &raw),
                        Err(err) => {
                            tracing::warn!(error = %err, "failed to encode session record");
                        }
                    }
                }
            }
            SessionStatus::Unauthenticated => self.slot.remove(SLOT_KEY),
            SessionStatus::Authenticating => {}
        }
        self.publish(next);
    }

    fn read_cached_identity(&self) -> Option<Identity> {
        let raw = self.slot.read(SLOT_KEY)?;
        match PersistedSessionRecord::decode(&raw) {
            Ok(record) => Some(record.identity),
            Err(err) => {
                // MalformedCache is recovered here and never surfaced.
                tracing::debug!(error = %err, "discarding malformed persisted session record");
                self.slot.remove(SLOT_KEY);
                None
            }
        }
    }

    /// Finalizes the optimistic startup state against the provider.
    async fn confirm_initial(&self) {
        match self.provider.active_session().await {
            Ok(Some(details)) => self.resolve_and_commit(&details).await,
            Ok(None) => {
                // The cache was a hint; the provider says there is no
                // session, so the hint is cleared along with the commit.
                self.commit(Session::unauthenticated());
            }
            Err(err) if err.is_network() => {
                if self.snapshot().is_authenticated() {
                    tracing::warn!(error = %err, "identity provider unreachable; keeping optimistic session");
                } else {
                    self.commit(Session::unauthenticated());
                }
            }
            Err(err) => {
                tracing::warn!(error = %err, "initial session check failed");
                self.commit(Session::unauthenticated());
            }
        }
    }

    /// Resolves session details into a full identity and commits it.
    ///
    /// This is the single confirmation path shared by startup, the event
    /// stream, and registration auto sign-in. A connectivity failure
    /// leaves the session unchanged; any other resolution failure is a
    /// denial and signs out locally.
    async fn resolve_and_commit(&self, details: &SessionDetails) {
        match self.provider.fetch_identity_details(details).await {
            Ok(identity) => self.commit(Session::authenticated(identity)),
            Err(err) if err.is_network() => {
                tracing::warn!(error = %err, "could not resolve identity details; leaving session unchanged");
            }
            Err(err) => {
                tracing::warn!(error = %err, "identity resolution denied; signing out locally");
                self.commit(Session::unauthenticated());
            }
        }
    }

    async fn drain_events(inner: Arc<Self>, mut events: mpsc::UnboundedReceiver<QueuedEvent>) {
        while let Some(queued) = events.recv().await {
            inner.apply_event(queued).await;
        }
    }

    async fn apply_event(&self, queued: QueuedEvent) {
        let _guard = self.mutation.lock().await;

        if queued.observed_generation < self.generation.load(Ordering::SeqCst) {
            // A local operation committed after this event was observed;
            // the event describes a state that no longer exists.
            tracing::debug!(
                signed_in = queued.event.is_signed_in(),
                "dropping stale identity provider event"
            );
            return;
        }

        match queued.event {
            ProviderEvent::SignedOut => {
                if self.snapshot().status() != SessionStatus::Unauthenticated {
                    tracing::info!("remote session ended; signing out locally");
                    self.commit(Session::unauthenticated());
                }
            }
            ProviderEvent::SignedIn(details) => self.resolve_and_commit(&details).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex as StdMutex;

    use async_trait::async_trait;
    use od_model::roles;
    use od_provider_memory::InMemoryPersistenceSlot;
    use od_spi::EventListener;
    use uuid::Uuid;

    use super::*;

    /// A provider whose event stream delivers a signed-out notification
    /// while a sign-in call is still in flight, so the notification is
    /// observed before the login commits.
    struct StaleSignOutProvider {
        identity: Identity,
        listeners: StdMutex<Vec<EventListener>>,
    }

    impl StaleSignOutProvider {
        fn new(identity: Identity) -> Self {
            Self {
                identity,
                listeners: StdMutex::new(Vec::new()),
            }
        }

        fn emit(&self, event: ProviderEvent) {
            for listener in self.listeners.lock().unwrap().iter() {
                listener(event.clone());
            }
        }
    }

    #[async_trait]
    impl IdentityProvider for StaleSignOutProvider {
        async fn sign_in(&self, _email_address: &str, _secret: &str) -> AuthResult<Identity> {
            // A revocation of the previous remote session lands mid-call.
            self.emit(ProviderEvent::SignedOut);
            Ok(self.identity.clone())
        }

        async fn sign_out(&self) -> AuthResult<()> {
            Ok(())
        }

        async fn sign_up(&self, _profile: &RegistrationProfile) -> AuthResult<Option<Identity>> {
            Ok(None)
        }

        async fn active_session(&self) -> AuthResult<Option<SessionDetails>> {
            Ok(None)
        }

        async fn fetch_identity_details(&self, _details: &SessionDetails) -> AuthResult<Identity> {
            Ok(self.identity.clone())
        }

        fn subscribe(&self, listener: EventListener) -> SubscriptionGuard {
            self.listeners.lock().unwrap().push(listener);
            SubscriptionGuard::new(|| {})
        }

        async fn request_password_reset(&self, _email_address: &str) -> AuthResult<()> {
            Ok(())
        }

        async fn reset_secret(&self, _new_secret: &str) -> AuthResult<()> {
            Ok(())
        }
    }

    async fn settle() {
        for _ in 0..8 {
            tokio::task::yield_now().await;
        }
    }

    #[tokio::test]
    async fn stale_sign_out_does_not_undo_login() {
        let identity = Identity::new(Uuid::now_v7(), "Dana Reyes", "dana@example.com", roles::HR);
        let provider = Arc::new(StaleSignOutProvider::new(identity));
        let slot = Arc::new(InMemoryPersistenceSlot::new());

        let coordinator = SessionCoordinator::start(provider, slot).await;
        coordinator.login("dana@example.com", "secret").await.unwrap();
        assert!(coordinator.current_session().is_authenticated());

        // Let the event task process the queued stale notification.
        settle().await;
        assert!(coordinator.current_session().is_authenticated());
        assert!(coordinator.has_role(roles::HR));
    }
}
