//! Identity derivation for the session guard: credential claims, the closed
//! role set, and the static role-to-capability policy.
//! Keep the public surface thin and split implementation across sub-modules.

mod claims;
mod principal;
mod authorizer;

pub use claims::{decode_claims, Claims, Credential, DecodeError};
pub use principal::{Identity, Role};
pub use authorizer::{can, capabilities_for, Capability};
