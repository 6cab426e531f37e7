//! Registration profile submitted when creating a new account.

use serde::{Deserialize, Serialize};

use crate::identity::roles;

/// Data required to register a new identity with the identity provider.
///
/// Registration does not authenticate: whether the provider signs the new
/// account in immediately or requires a verification step is provider
/// policy, and the session layer learns the outcome through its normal
/// confirmation path either way.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistrationProfile {
    /// Human-readable display name.
    pub display_name: String,

    /// Email address to register under.
    pub email_address: String,

    /// Initial secret (password) for the account.
    pub secret: String,

    /// Requested primary role label.
    pub role_label: String,
}

impl RegistrationProfile {
    /// Creates a profile with the default `employee` role.
    #[must_use]
    pub fn new(
        display_name: impl Into<String>,
        email_address: impl Into<String>,
        secret: impl Into<String>,
    ) -> Self {
        Self {
            display_name: display_name.into(),
            email_address: email_address.into(),
            secret: secret.into(),
            role_label: roles::EMPLOYEE.to_string(),
        }
    }

    /// Sets the requested primary role.
    #[must_use]
    pub fn with_role_label(mut self, role_label: impl Into<String>) -> Self {
        self.role_label = role_label.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_employee_role() {
        let profile = RegistrationProfile::new("Sam Ortiz", "sam@example.com", "hunter2");
        assert_eq!(profile.role_label, roles::EMPLOYEE);
    }

    #[test]
    fn role_override() {
        let profile = RegistrationProfile::new("Sam Ortiz", "sam@example.com", "hunter2")
            .with_role_label(roles::FINANCE);
        assert_eq!(profile.role_label, roles::FINANCE);
    }
}
