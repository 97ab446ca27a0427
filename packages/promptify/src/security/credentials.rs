//! Credential handling with secure memory.
//!
//! Uses the `secrecy` crate to prevent accidental logging of sensitive values.
//! The controller only ever reads credentials, immediately before each remote
//! call, so a key changed mid-session applies to the next request.

use secrecy::{ExposeSecret, SecretBox};
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, RwLock};

/// A secret string that won't be logged or displayed.
pub struct SecretString(SecretBox<str>);

impl SecretString {
    /// Create a new secret string.
    pub fn new(value: impl Into<String>) -> Self {
        Self(SecretBox::new(Box::from(value.into().as_str())))
    }

    /// Expose the secret value for use.
    ///
    /// Only call this when actually using the secret (e.g., in an API request).
    pub fn expose(&self) -> &str {
        self.0.expose_secret()
    }
}

impl Clone for SecretString {
    fn clone(&self) -> Self {
        Self::new(self.expose().to_string())
    }
}

impl fmt::Debug for SecretString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[REDACTED]")
    }
}

impl fmt::Display for SecretString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[REDACTED]")
    }
}

impl From<String> for SecretString {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl From<&str> for SecretString {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// Read-only key-value source of credentials.
pub trait CredentialSource: Send + Sync {
    /// Current value for `key`. Blank values count as absent.
    fn read(&self, key: &str) -> Option<SecretString>;
}

impl<T: CredentialSource + ?Sized> CredentialSource for Arc<T> {
    fn read(&self, key: &str) -> Option<SecretString> {
        (**self).read(key)
    }
}

/// No credentials; every request uses the service default.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoCredentials;

impl CredentialSource for NoCredentials {
    fn read(&self, _key: &str) -> Option<SecretString> {
        None
    }
}

/// Credentials held in process memory.
///
/// The owner (a settings dialog, a test) writes through `set`; the
/// controller only reads.
#[derive(Default)]
pub struct MemoryCredentialStore {
    values: RwLock<HashMap<String, SecretString>>,
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.set(key, value);
        self
    }

    pub fn set(&self, key: impl Into<String>, value: impl Into<String>) {
        self.values
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .insert(key.into(), SecretString::new(value));
    }

    pub fn clear(&self, key: &str) {
        self.values
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .remove(key);
    }
}

impl fmt::Debug for MemoryCredentialStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let keys: Vec<String> = self
            .values
            .read()
            .map(|v| v.keys().cloned().collect())
            .unwrap_or_default();
        f.debug_struct("MemoryCredentialStore")
            .field("keys", &keys)
            .finish()
    }
}

impl CredentialSource for MemoryCredentialStore {
    fn read(&self, key: &str) -> Option<SecretString> {
        self.values
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(key)
            .filter(|v| !v.expose().trim().is_empty())
            .cloned()
    }
}

/// Credentials read from environment variables.
///
/// Key `promptify-api-key` maps to `PROMPTIFY_API_KEY`.
#[derive(Debug, Default, Clone, Copy)]
pub struct EnvCredentialStore;

impl EnvCredentialStore {
    /// Environment variable name for a credential key.
    pub fn var_name(key: &str) -> String {
        key.chars()
            .map(|c| if c.is_ascii_alphanumeric() { c.to_ascii_uppercase() } else { '_' })
            .collect()
    }
}

impl CredentialSource for EnvCredentialStore {
    fn read(&self, key: &str) -> Option<SecretString> {
        std::env::var(Self::var_name(key))
            .ok()
            .filter(|v| !v.trim().is_empty())
            .map(SecretString::new)
    }
}
