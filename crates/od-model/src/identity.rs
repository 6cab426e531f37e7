//! Normalized identity model.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// An authenticated user's profile as known to the session layer.
///
/// This is the only identity shape downstream code may consume. The
/// identity provider resolves its raw session data (including the role
/// lookup join) into this form; no consumer branches on the remote
/// representation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    /// Stable subject identifier issued by the identity provider.
    pub id: Uuid,

    /// Human-readable display name.
    pub display_name: String,

    /// Email address the account is registered under.
    pub email_address: String,

    /// Primary role label (see [`roles`] for the well-known labels).
    pub role_label: String,

    /// Additional role labels granted beyond the primary role.
    #[serde(default)]
    pub secondary_roles: BTreeSet<String>,

    /// Fine-grained permission labels granted to this identity.
    #[serde(default)]
    pub permission_set: BTreeSet<String>,

    /// Client record this identity is linked to, for client-role users.
    #[serde(default)]
    pub linked_client_id: Option<i64>,
}

impl Identity {
    /// Creates a new identity with the given primary role.
    #[must_use]
    pub fn new(
        id: Uuid,
        display_name: impl Into<String>,
        email_address: impl Into<String>,
        role_label: impl Into<String>,
    ) -> Self {
        Self {
            id,
            display_name: display_name.into(),
            email_address: email_address.into(),
            role_label: role_label.into(),
            secondary_roles: BTreeSet::new(),
            permission_set: BTreeSet::new(),
            linked_client_id: None,
        }
    }

    /// Adds a secondary role label.
    #[must_use]
    pub fn with_secondary_role(mut self, role_label: impl Into<String>) -> Self {
        self.secondary_roles.insert(role_label.into());
        self
    }

    /// Adds a permission label.
    #[must_use]
    pub fn with_permission(mut self, permission_label: impl Into<String>) -> Self {
        self.permission_set.insert(permission_label.into());
        self
    }

    /// Links this identity to a client record.
    #[must_use]
    pub const fn with_linked_client(mut self, client_id: i64) -> Self {
        self.linked_client_id = Some(client_id);
        self
    }

    /// Checks whether this identity carries the given role, either as its
    /// primary role or as a secondary role.
    #[must_use]
    pub fn has_role(&self, role_label: &str) -> bool {
        self.role_label == role_label || self.secondary_roles.contains(role_label)
    }

    /// Checks whether this identity carries the given permission.
    #[must_use]
    pub fn has_permission(&self, permission_label: &str) -> bool {
        self.permission_set.contains(permission_label)
    }
}

/// Well-known role labels used by the dashboard.
pub mod roles {
    /// Full administrative access.
    pub const ADMIN: &str = "admin";
    /// Internal employee.
    pub const EMPLOYEE: &str = "employee";
    /// External client user.
    pub const CLIENT: &str = "client";
    /// Marketing team member.
    pub const MARKETING: &str = "marketing";
    /// Human resources team member.
    pub const HR: &str = "hr";
    /// Finance team member.
    pub const FINANCE: &str = "finance";
}
