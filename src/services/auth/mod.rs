pub mod claims;
pub mod error;
pub mod factory;
pub mod gate;
pub mod identity;
pub mod janitor;
pub mod local_cache;
pub mod revocation;
pub mod verifier;

#[cfg(test)]
pub(crate) mod test_support;

pub use claims::{Claims, Role};
pub use error::AuthError;
pub use factory::build_auth_gate;
pub use gate::{AuthGate, RevocationSettings};
pub use identity::AuthenticatedIdentity;
pub use local_cache::LocalValidationCache;
