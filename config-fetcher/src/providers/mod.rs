//! Secret provider implementations

pub mod gcp;

pub use gcp::GcpSecretManagerProvider;

use crate::{Result, SecretRef};

/// Access to a remote secret store.
///
/// Implementations make a single attempt per call and surface remote
/// failures as [`crate::FetchError::RemoteService`].
pub trait SecretProvider {
    /// Provider name
    fn name(&self) -> &str;

    /// Fetch the payload of one secret version
    fn access_secret_version(&self, secret: &SecretRef) -> Result<Vec<u8>>;
}
