//! Identity provider trait.

use async_trait::async_trait;
use od_model::{Identity, RegistrationProfile};

use crate::error::AuthResult;
use crate::event::{EventListener, SessionDetails, SubscriptionGuard};

/// The remote authentication service.
///
/// Implementations wrap the hosted backend's auth API. Every method that
/// returns an [`Identity`] is responsible for normalizing the remote data
/// shape (including the role lookup join) into the single [`Identity`]
/// form; callers never see the raw representation.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Validates credentials and establishes a remote session.
    ///
    /// Returns the normalized identity on success.
    async fn sign_in(&self, email_address: &str, secret: &str) -> AuthResult<Identity>;

    /// Invalidates the current remote session.
    async fn sign_out(&self) -> AuthResult<()>;

    /// Creates a new identity.
    ///
    /// Returns `None` when the provider requires a verification step
    /// before the account can sign in. A provider with an auto sign-in
    /// policy returns the identity and additionally emits a
    /// [`ProviderEvent::SignedIn`](crate::ProviderEvent::SignedIn) on the
    /// event stream.
    async fn sign_up(&self, profile: &RegistrationProfile) -> AuthResult<Option<Identity>>;

    /// Fetches the currently active remote session, if any.
    async fn active_session(&self) -> AuthResult<Option<SessionDetails>>;

    /// Resolves a bare session handle into a full identity, including
    /// role and permission data.
    async fn fetch_identity_details(&self, details: &SessionDetails) -> AuthResult<Identity>;

    /// Subscribes to the provider's event stream.
    ///
    /// The subscription stays active until the returned guard is dropped.
    fn subscribe(&self, listener: EventListener) -> SubscriptionGuard;

    /// Requests a password reset email for the given address.
    async fn request_password_reset(&self, email_address: &str) -> AuthResult<()>;

    /// Replaces the secret of the currently signed-in account.
    async fn reset_secret(&self, new_secret: &str) -> AuthResult<()>;
}
