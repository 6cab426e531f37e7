//! Session state model.

use od_model::Identity;

/// Authentication status of the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionStatus {
    /// No user is signed in.
    #[default]
    Unauthenticated,
    /// A sign-in, registration, or initial session check is in flight.
    Authenticating,
    /// A user is signed in.
    Authenticated,
}

/// The authoritative authentication state visible to the application.
///
/// The invariant *identity is present if and only if the status is
/// [`SessionStatus::Authenticated`]* holds by construction: the fields are
/// private and every constructor produces a consistent pair.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Session {
    status: SessionStatus,
    identity: Option<Identity>,
}

impl Session {
    /// Creates an unauthenticated session.
    #[must_use]
    pub const fn unauthenticated() -> Self {
        Self {
            status: SessionStatus::Unauthenticated,
            identity: None,
        }
    }

    /// Creates a session with an authentication attempt in flight.
    #[must_use]
    pub const fn authenticating() -> Self {
        Self {
            status: SessionStatus::Authenticating,
            identity: None,
        }
    }

    /// Creates an authenticated session for `identity`.
    #[must_use]
    pub const fn authenticated(identity: Identity) -> Self {
        Self {
            status: SessionStatus::Authenticated,
            identity: Some(identity),
        }
    }

    /// Returns the current status.
    #[must_use]
    pub const fn status(&self) -> SessionStatus {
        self.status
    }

    /// Returns the signed-in identity, if any.
    #[must_use]
    pub const fn identity(&self) -> Option<&Identity> {
        self.identity.as_ref()
    }

    /// Checks if a user is signed in.
    #[must_use]
    pub const fn is_authenticated(&self) -> bool {
        matches!(self.status, SessionStatus::Authenticated)
    }

    /// Checks whether the signed-in identity carries the given role,
    /// either as its primary or a secondary role.
    ///
    /// Always `false` when no user is signed in.
    #[must_use]
    pub fn has_role(&self, role_label: &str) -> bool {
        self.identity
            .as_ref()
            .is_some_and(|identity| identity.has_role(role_label))
    }

    /// Checks whether the signed-in identity carries the given permission.
    ///
    /// Always `false` when no user is signed in.
    #[must_use]
    pub fn has_permission(&self, permission_label: &str) -> bool {
        self.identity
            .as_ref()
            .is_some_and(|identity| identity.has_permission(permission_label))
    }
}

#[cfg(test)]
mod tests {
    use od_model::roles;
    use uuid::Uuid;

    use super::*;

    fn identity() -> Identity {
        Identity::new(Uuid::now_v7(), "Dana Reyes", "dana@example.com", roles::HR)
            .with_secondary_role(roles::MARKETING)
            .with_permission("payroll.read")
    }

    #[test]
    fn identity_present_iff_authenticated() {
        assert!(Session::unauthenticated().identity().is_none());
        assert!(Session::authenticating().identity().is_none());
        assert!(Session::authenticated(identity()).identity().is_some());
    }

    #[test]
    fn role_checks_require_authentication() {
        assert!(!Session::unauthenticated().has_role(roles::HR));
        assert!(!Session::authenticating().has_role(roles::HR));

        let session = Session::authenticated(identity());
        assert!(session.has_role(roles::HR));
        assert!(session.has_role(roles::MARKETING));
        assert!(!session.has_role(roles::ADMIN));
    }

    #[test]
    fn permission_checks_require_authentication() {
        assert!(!Session::unauthenticated().has_permission("payroll.read"));

        let session = Session::authenticated(identity());
        assert!(session.has_permission("payroll.read"));
        assert!(!session.has_permission("payroll.write"));
    }

    #[test]
    fn default_is_unauthenticated() {
        assert_eq!(Session::default(), Session::unauthenticated());
    }
}
