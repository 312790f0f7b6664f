//! Remote access credential kept in the local key/value store.

use std::fmt;

use garden::config::CREDENTIAL_STORAGE_KEY;

use crate::kv_store::KeyValueStore;
use crate::save_error::SaveError;

/// An opaque access token. `Debug` never prints the secret.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(<redacted>)")
    }
}

/// Reads the stored credential. Absent or blank tokens are
/// `MissingCredential`; the caller must ask the user for one.
pub fn load_credential(store: &dyn KeyValueStore) -> Result<Credential, SaveError> {
    match store.get(CREDENTIAL_STORAGE_KEY)? {
        Some(token) if !token.trim().is_empty() => Ok(Credential(token.trim().to_string())),
        _ => Err(SaveError::MissingCredential),
    }
}

pub fn store_credential(store: &dyn KeyValueStore, token: &str) -> Result<(), SaveError> {
    let token = token.trim();
    if token.is_empty() {
        return Err(SaveError::MissingCredential);
    }
    store.set(CREDENTIAL_STORAGE_KEY, token)
}
