//! Credential handling.

pub mod credentials;

pub use credentials::{
    CredentialSource, EnvCredentialStore, MemoryCredentialStore, NoCredentials, SecretString,
};
