//! In-memory identity provider.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;
use od_model::{Identity, RegistrationProfile};
use od_spi::{
    AuthError, AuthResult, EventListener, IdentityProvider, ProviderEvent, SessionDetails,
    SubscriptionGuard,
};
use parking_lot::RwLock;
use uuid::Uuid;

#[derive(Debug, Clone)]
struct AccountRecord {
    secret: String,
    identity: Identity,
}

/// An [`IdentityProvider`] holding accounts and sessions in memory.
///
/// Accounts are seeded with [`register_identity`](Self::register_identity)
/// or created through [`sign_up`](IdentityProvider::sign_up). The provider
/// can simulate degraded conditions:
///
/// - [`set_offline`](Self::set_offline) makes every remote call fail with
///   [`AuthError::NetworkUnavailable`]
/// - [`set_reject_sign_out`](Self::set_reject_sign_out) fails only
///   `sign_out`, leaving the remote session in place
/// - [`end_remote_session`](Self::end_remote_session) revokes the active
///   session and emits a signed-out event, as a token expiry would
pub struct InMemoryIdentityProvider {
    accounts: RwLock<HashMap<String, AccountRecord>>,
    active: RwLock<Option<SessionDetails>>,
    listeners: Arc<DashMap<u64, EventListener>>,
    next_listener_id: AtomicU64,
    reset_requests: RwLock<Vec<String>>,
    auto_sign_in_on_register: bool,
    offline: AtomicBool,
    reject_sign_out: AtomicBool,
}

impl InMemoryIdentityProvider {
    /// Creates a provider whose registration policy requires a separate
    /// verification step (`sign_up` returns no identity).
    #[must_use]
    pub fn new() -> Self {
        Self {
            accounts: RwLock::new(HashMap::new()),
            active: RwLock::new(None),
            listeners: Arc::new(DashMap::new()),
            next_listener_id: AtomicU64::new(0),
            reset_requests: RwLock::new(Vec::new()),
            auto_sign_in_on_register: false,
            offline: AtomicBool::new(false),
            reject_sign_out: AtomicBool::new(false),
        }
    }

    /// Creates a provider that signs accounts in immediately on
    /// registration.
    #[must_use]
    pub fn with_auto_sign_in() -> Self {
        Self {
            auto_sign_in_on_register: true,
            ..Self::new()
        }
    }

    /// Seeds an account that can subsequently sign in with `secret`.
    pub fn register_identity(&self, identity: Identity, secret: impl Into<String>) {
        self.accounts.write().insert(
            identity.email_address.clone(),
            AccountRecord {
                secret: secret.into(),
                identity,
            },
        );
    }

    /// Simulates losing (or regaining) connectivity to the provider.
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// Makes `sign_out` fail with a network error while leaving every
    /// other operation working.
    pub fn set_reject_sign_out(&self, reject: bool) {
        self.reject_sign_out.store(reject, Ordering::SeqCst);
    }

    /// Revokes the active remote session and notifies subscribers.
    pub fn end_remote_session(&self) {
        let ended = self.active.write().take();
        if ended.is_some() {
            self.emit(ProviderEvent::SignedOut);
        }
    }

    /// Returns the email addresses password resets were requested for.
    #[must_use]
    pub fn password_reset_requests(&self) -> Vec<String> {
        self.reset_requests.read().clone()
    }

    fn ensure_online(&self) -> AuthResult<()> {
        if self.offline.load(Ordering::SeqCst) {
            Err(AuthError::NetworkUnavailable(
                "identity provider offline".to_string(),
            ))
        } else {
            Ok(())
        }
    }

    fn emit(&self, event: ProviderEvent) {
        for listener in self.listeners.iter() {
            listener.value()(event.clone());
        }
    }

    fn open_session(&self, identity: &Identity) -> SessionDetails {
        let details = SessionDetails::new(identity.id, Uuid::now_v7().to_string());
        *self.active.write() = Some(details.clone());
        details
    }
}

impl Default for InMemoryIdentityProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl IdentityProvider for InMemoryIdentityProvider {
    async fn sign_in(&self, email_address: &str, secret: &str) -> AuthResult<Identity> {
        self.ensure_online()?;

        let identity = {
            let accounts = self.accounts.read();
            let account = accounts
                .get(email_address)
                .ok_or(AuthError::InvalidCredentials)?;
            if account.secret != secret {
                return Err(AuthError::InvalidCredentials);
            }
            account.identity.clone()
        };

        let details = self.open_session(&identity);
        self.emit(ProviderEvent::SignedIn(details));
        Ok(identity)
    }

    async fn sign_out(&self) -> AuthResult<()> {
        if self.reject_sign_out.load(Ordering::SeqCst) {
            return Err(AuthError::NetworkUnavailable(
                "sign-out request failed".to_string(),
            ));
        }
        self.ensure_online()?;

        let ended = self.active.write().take();
        if ended.is_some() {
            self.emit(ProviderEvent::SignedOut);
        }
        Ok(())
    }

    async fn sign_up(&self, profile: &RegistrationProfile) -> AuthResult<Option<Identity>> {
        self.ensure_online()?;

        let identity = Identity::new(
            Uuid::now_v7(),
            profile.display_name.clone(),
            profile.email_address.clone(),
            profile.role_label.clone(),
        );

        {
            let mut accounts = self.accounts.write();
            if accounts.contains_key(&profile.email_address) {
                return Err(AuthError::Unknown(format!(
                    "account already exists: {}",
                    profile.email_address
                )));
            }
            accounts.insert(
                profile.email_address.clone(),
                AccountRecord {
                    secret: profile.secret.clone(),
                    identity: identity.clone(),
                },
            );
        }

        if self.auto_sign_in_on_register {
            let details = self.open_session(&identity);
            self.emit(ProviderEvent::SignedIn(details));
            Ok(Some(identity))
        } else {
            Ok(None)
        }
    }

    async fn active_session(&self) -> AuthResult<Option<SessionDetails>> {
        self.ensure_online()?;
        Ok(self.active.read().clone())
    }

    async fn fetch_identity_details(&self, details: &SessionDetails) -> AuthResult<Identity> {
        self.ensure_online()?;

        let accounts = self.accounts.read();
        accounts
            .values()
            .find(|account| account.identity.id == details.subject)
            .map(|account| account.identity.clone())
            .ok_or_else(|| {
                AuthError::Unknown(format!("no identity for subject {}", details.subject))
            })
    }

    fn subscribe(&self, listener: EventListener) -> SubscriptionGuard {
        let id = self.next_listener_id.fetch_add(1, Ordering::SeqCst);
        self.listeners.insert(id, listener);

        let listeners = Arc::clone(&self.listeners);
        SubscriptionGuard::new(move || {
            listeners.remove(&id);
        })
    }

    async fn request_password_reset(&self, email_address: &str) -> AuthResult<()> {
        self.ensure_online()?;
        // Whether the account exists is not revealed to the caller.
        self.reset_requests.write().push(email_address.to_string());
        Ok(())
    }

    async fn reset_secret(&self, new_secret: &str) -> AuthResult<()> {
        self.ensure_online()?;

        let subject = self
            .active
            .read()
            .as_ref()
            .map(|details| details.subject)
            .ok_or(AuthError::SessionExpired)?;

        let mut accounts = self.accounts.write();
        for account in accounts.values_mut() {
            if account.identity.id == subject {
                account.secret = new_secret.to_string();
                return Ok(());
            }
        }
        Err(AuthError::SessionExpired)
    }
}
