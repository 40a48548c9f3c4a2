mod dnskey;
mod rrsig;

pub use dnskey::DnskeyRecord;
pub use rrsig::RrsigRecord;

use std::sync::Arc;

/// Which key a signature is checked against.
#[derive(Debug, Clone)]
pub enum KeyReference {
    /// Loaded from disk once; every signature is checked against it.
    Pinned(Arc<DnskeyRecord>),
    /// Looked up on the queried server for each signature.
    Network,
}

impl KeyReference {
    pub fn is_pinned(&self) -> bool {
        matches!(self, KeyReference::Pinned(_))
    }
}
