//! TSIG request signing and response verification (RFC 8945).
//!
//! hickory-proto lays out the TSIG record and the to-be-signed data; the MAC
//! itself is computed here because hickory's HMACs stop at SHA-256/384/512
//! and keys in the wild are still HMAC-MD5 or HMAC-SHA1.

use super::response::DnsResponse;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use ferrous_q_domain::{DomainError, TsigAlgorithm, TsigKey};
use hickory_proto::dnssec::rdata::tsig::{
    make_tsig_record, message_tbs, signed_bitmessage_to_buf, TsigAlgorithm as WireAlgorithm,
    TSIG,
};
use hickory_proto::dnssec::rdata::DNSSECRData;
use hickory_proto::op::Message;
use hickory_proto::rr::Name;
use hmac::digest::KeyInit;
use hmac::{Hmac, Mac};
use std::collections::HashMap;
use std::str::FromStr;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::debug;

pub const FUDGE_SECONDS: u16 = 300;

/// Holds one decoded secret and signs or checks messages with it.
#[derive(Clone)]
pub struct TsigSigner {
    algorithm: TsigAlgorithm,
    key_name: Name,
    secret: Vec<u8>,
}

impl TsigSigner {
    /// Decodes the key's base64 secret. An empty or undecodable secret is
    /// rejected here, before anything is sent.
    pub fn new(key: &TsigKey) -> Result<Self, DomainError> {
        let secret = BASE64
            .decode(key.secret.as_bytes())
            .map_err(|e| DomainError::InvalidTsigKey(format!("secret is not base64: {}", e)))?;

        if secret.is_empty() {
            return Err(DomainError::InvalidTsigKey("secret is empty".to_string()));
        }

        let key_name = Name::from_str(&key.name).map_err(|e| {
            DomainError::InvalidTsigKey(format!("bad key name {}: {}", key.name, e))
        })?;

        Ok(Self {
            algorithm: key.algorithm,
            key_name,
            secret,
        })
    }

    fn wire_algorithm(&self) -> WireAlgorithm {
        match self.algorithm {
            TsigAlgorithm::HmacMd5 => WireAlgorithm::HmacMd5,
            TsigAlgorithm::HmacSha1 => WireAlgorithm::HmacSha1,
            TsigAlgorithm::HmacSha256 => WireAlgorithm::HmacSha256,
        }
    }

    /// Signs `message` and attaches the TSIG record as its signature.
    /// Returns the MAC, which is needed again to check the response.
    ///
    /// Nothing may be added to `message` afterwards.
    pub fn sign(&self, message: &mut Message, time_signed: u64) -> Result<Vec<u8>, DomainError> {
        let pre_tsig = TSIG::new(
            self.wire_algorithm(),
            time_signed,
            FUDGE_SECONDS,
            Vec::new(),
            message.id(),
            0,
            Vec::new(),
        );

        let tbs = message_tbs(&*message, &pre_tsig, &self.key_name)
            .map_err(|e| DomainError::TsigSigning(e.to_string()))?;
        let mac = self.compute(&[&tbs])?;

        message.add_tsig(make_tsig_record(
            self.key_name.clone(),
            pre_tsig.set_mac(mac.clone()),
        ));

        debug!(key = %self.key_name, algorithm = %self.algorithm, "Query signed with TSIG");

        Ok(mac)
    }

    /// Checks the TSIG on a response to a request whose MAC was `request_mac`.
    ///
    /// Returns `Ok(false)` when the response carries no TSIG at all.
    pub fn verify(&self, response: &DnsResponse, request_mac: &[u8]) -> Result<bool, DomainError> {
        if !response.signed {
            return Ok(false);
        }

        let fail = |msg: String| DomainError::TsigVerification(msg);

        let (tbv, record) = signed_bitmessage_to_buf(&response.bytes, Some(request_mac), true)
            .map_err(|e| fail(e.to_string()))?;
        let tsig = record
            .data()
            .as_dnssec()
            .and_then(DNSSECRData::as_tsig)
            .ok_or_else(|| fail("TSIG record carries no TSIG data".to_string()))?;

        if record.name() != &self.key_name {
            return Err(fail(format!("unexpected key {}", record.name())));
        }
        if tsig.algorithm().to_name() != self.wire_algorithm().to_name() {
            let received = tsig.algorithm().to_name();
            return Err(fail(format!("unexpected algorithm {}", received)));
        }

        let now = unix_now();
        if now.abs_diff(tsig.time()) > u64::from(tsig.fudge()) {
            return Err(fail("time signed outside fudge window".to_string()));
        }

        self.check(&[&tbv], tsig.mac())?;

        debug!(key = %self.key_name, "Response TSIG verified");
        Ok(true)
    }

    fn compute(&self, parts: &[&[u8]]) -> Result<Vec<u8>, DomainError> {
        match self.algorithm {
            TsigAlgorithm::HmacMd5 => compute_mac::<Hmac<md5::Md5>>(&self.secret, parts),
            TsigAlgorithm::HmacSha1 => compute_mac::<Hmac<sha1::Sha1>>(&self.secret, parts),
            TsigAlgorithm::HmacSha256 => compute_mac::<Hmac<sha2::Sha256>>(&self.secret, parts),
        }
    }

    fn check(&self, parts: &[&[u8]], expected: &[u8]) -> Result<(), DomainError> {
        match self.algorithm {
            TsigAlgorithm::HmacMd5 => verify_mac::<Hmac<md5::Md5>>(&self.secret, parts, expected),
            TsigAlgorithm::HmacSha1 => {
                verify_mac::<Hmac<sha1::Sha1>>(&self.secret, parts, expected)
            }
            TsigAlgorithm::HmacSha256 => {
                verify_mac::<Hmac<sha2::Sha256>>(&self.secret, parts, expected)
            }
        }
    }
}

fn compute_mac<M: Mac + KeyInit>(secret: &[u8], parts: &[&[u8]]) -> Result<Vec<u8>, DomainError> {
    let mut mac = <M as Mac>::new_from_slice(secret)
        .map_err(|e| DomainError::TsigSigning(e.to_string()))?;
    for part in parts {
        mac.update(part);
    }
    Ok(mac.finalize().into_bytes().to_vec())
}

fn verify_mac<M: Mac + KeyInit>(
    secret: &[u8],
    parts: &[&[u8]],
    expected: &[u8],
) -> Result<(), DomainError> {
    let mut mac = <M as Mac>::new_from_slice(secret)
        .map_err(|e| DomainError::TsigVerification(e.to_string()))?;
    for part in parts {
        mac.update(part);
    }
    mac.verify_slice(expected)
        .map_err(|_| DomainError::TsigVerification("MAC does not match".to_string()))
}

pub(crate) fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

/// Secrets by key name, filled before the first exchange and read-only after.
#[derive(Clone, Default)]
pub struct TsigKeyring {
    signers: HashMap<Arc<str>, TsigSigner>,
}

impl TsigKeyring {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_key(key: &TsigKey) -> Result<Self, DomainError> {
        let mut keyring = Self::new();
        keyring.insert(key)?;
        Ok(keyring)
    }

    pub fn insert(&mut self, key: &TsigKey) -> Result<(), DomainError> {
        let signer = TsigSigner::new(key)?;
        self.signers.insert(key.name.clone(), signer);
        Ok(())
    }

    pub fn signer(&self, name: &str) -> Option<&TsigSigner> {
        self.signers.get(name)
    }
}
