use std::fmt;
use std::sync::Arc;

use thiserror::Error;

use crate::dns_record::RecordType;

/// Where the key used for a verdict came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeySource {
    /// Pinned by the operator and loaded once at startup.
    Disk,
    /// Fetched from the queried server for this signature.
    Net,
}

impl fmt::Display for KeySource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeySource::Disk => f.write_str("disk"),
            KeySource::Net => f.write_str("net"),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BogusReason {
    #[error("key tag {key} does not match signature key tag {signature}")]
    KeyTagMismatch { signature: u16, key: u16 },

    #[error("key algorithm {key} does not match signature algorithm {signature}")]
    AlgorithmMismatch { signature: u8, key: u8 },

    #[error("signer {signer} is not the key owner {key_owner}")]
    SignerMismatch { signer: String, key_owner: String },

    #[error("unsupported algorithm {0}")]
    UnsupportedAlgorithm(u8),

    #[error("malformed key: {0}")]
    MalformedKey(String),

    #[error("signature does not verify")]
    CryptoFailure,
}

/// Signature being judged: owner name and covered type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedSet {
    pub owner: Arc<str>,
    pub type_covered: RecordType,
}

impl fmt::Display for SignedSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} RRSIG({})", self.owner, self.type_covered)
    }
}

/// Key a verdict was reached with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifyingKey {
    pub owner: Arc<str>,
    pub key_tag: u16,
    pub source: KeySource,
}

impl fmt::Display for VerifyingKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DNSKEY {}/{}/{}", self.owner, self.key_tag, self.source)
    }
}

/// Outcome for one signature record. None of these is an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignatureVerdict {
    Secure {
        signed: SignedSet,
        key: VerifyingKey,
    },
    Bogus {
        signed: SignedSet,
        key: VerifyingKey,
        reason: BogusReason,
    },
    KeyNotFound {
        signer: Arc<str>,
        key_tag: u16,
    },
}

impl SignatureVerdict {
    pub fn is_secure(&self) -> bool {
        matches!(self, SignatureVerdict::Secure { .. })
    }

    pub fn is_bogus(&self) -> bool {
        matches!(self, SignatureVerdict::Bogus { .. })
    }

    pub fn key_source(&self) -> Option<KeySource> {
        match self {
            SignatureVerdict::Secure { key, .. } | SignatureVerdict::Bogus { key, .. } => {
                Some(key.source)
            }
            SignatureVerdict::KeyNotFound { .. } => None,
        }
    }
}

impl fmt::Display for SignatureVerdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SignatureVerdict::Secure { signed, key } => {
                write!(f, ";+ Secure signature, {} validates ({})", signed, key)
            }
            SignatureVerdict::Bogus {
                signed,
                key,
                reason,
            } => write!(
                f,
                ";- Bogus signature, {} does not validate ({}) [{}]",
                signed, key, reason
            ),
            SignatureVerdict::KeyNotFound { signer, key_tag } => {
                write!(f, ";? DNSKEY {}/{} not found", signer, key_tag)
            }
        }
    }
}
