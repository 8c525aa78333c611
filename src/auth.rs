//! Credential storage, assertion minting, and bearer-token lifecycle management.

pub mod assertion;
pub mod credentials;
pub mod token;

pub use credentials::{CredentialSet, CredentialSetBuilder};
pub use token::{BearerToken, CachedToken, TokenCache};
