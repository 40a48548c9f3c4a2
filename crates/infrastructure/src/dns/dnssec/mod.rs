pub mod anchor;
pub mod checker;
pub mod crypto;
pub mod nsec3;
pub mod types;

pub use anchor::{load_pinned_key, parse_dnskey};
pub use checker::{KeyResolver, NetworkKeyResolver, SignatureChecker};
pub use crypto::SignatureVerifier;
pub use nsec3::{check_denial, DenialCheck};
pub use types::{DnskeyRecord, KeyReference, RrsigRecord};
