//! Persisted session record.

use chrono::{DateTime, Utc};
use od_model::Identity;
use od_spi::{AuthError, AuthResult};
use serde::{Deserialize, Serialize};

/// The persistence slot key owned by the session coordinator.
///
/// No other component reads or writes this key.
pub const SLOT_KEY: &str = "opsdesk.session";

/// Wire format version for [`PersistedSessionRecord`].
const RECORD_VERSION: u32 = 1;

/// A durable cache of the last known authenticated session.
///
/// Written on every successful transition to authenticated, cleared on
/// sign-out, and read once at coordinator startup to present an optimistic
/// state before the identity provider confirms. It is a hint, not ground
/// truth: the provider's answer always overrides it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistedSessionRecord {
    /// Wire format version.
    pub version: u32,

    /// The identity that was signed in when the record was written.
    pub identity: Identity,

    /// When the record was written.
    pub saved_at: DateTime<Utc>,
}

impl PersistedSessionRecord {
    /// Creates a record for the given identity, stamped with the current
    /// time.
    #[must_use]
    pub fn new(identity: Identity) -> Self {
        Self {
            version: RECORD_VERSION,
            identity,
            saved_at: Utc::now(),
        }
    }

    /// Encodes the record for storage.
    pub fn encode(&self) -> AuthResult<String> {
        serde_json::to_string(self).map_err(|err| AuthError::Unknown(err.to_string()))
    }

    /// Decodes a stored record.
    ///
    /// Any structural problem - invalid JSON, missing fields, an
    /// unsupported version - yields [`AuthError::MalformedCache`], which
    /// callers recover by treating the record as absent.
    pub fn decode(raw: &str) -> AuthResult<Self> {
        let record: Self =
            serde_json::from_str(raw).map_err(|err| AuthError::MalformedCache(err.to_string()))?;
        if record.version != RECORD_VERSION {
            return Err(AuthError::MalformedCache(format!(
                "unsupported record version {}",
                record.version
            )));
        }
        Ok(record)
    }
}
