use hickory_proto::dnssec::rdata::DNSKEY;
use hickory_proto::dnssec::PublicKey;
use std::fmt;
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DnskeyRecord {
    /// Zone the key belongs to, fully qualified.
    pub owner: Arc<str>,
    pub flags: u16,
    pub protocol: u8,
    pub algorithm: u8,
    pub public_key: Vec<u8>,
}

impl DnskeyRecord {
    pub fn new(owner: &str, flags: u16, protocol: u8, algorithm: u8, public_key: Vec<u8>) -> Self {
        Self {
            owner: Arc::from(ferrous_q_domain::dns_protocol::fqdn(owner)),
            flags,
            protocol,
            algorithm,
            public_key,
        }
    }

    pub fn from_hickory(owner: &str, dnskey: &DNSKEY) -> Self {
        let pk = dnskey.public_key();
        Self::new(
            owner,
            dnskey.flags(),
            3,
            u8::from(<dyn PublicKey>::algorithm(pk)),
            <dyn PublicKey>::public_bytes(pk).to_vec(),
        )
    }

    /// RFC 4034 appendix B key tag.
    pub fn calculate_key_tag(&self) -> u16 {
        let mut wire = Vec::with_capacity(4 + self.public_key.len());
        wire.extend_from_slice(&self.flags.to_be_bytes());
        wire.push(self.protocol);
        wire.push(self.algorithm);
        wire.extend_from_slice(&self.public_key);

        let mut accumulator: u32 = 0;

        for chunk in wire.chunks(2) {
            if chunk.len() == 2 {
                accumulator += u32::from(u16::from_be_bytes([chunk[0], chunk[1]]));
            } else {
                accumulator += u32::from(chunk[0]) << 8;
            }
        }

        accumulator += accumulator >> 16;
        (accumulator & 0xFFFF) as u16
    }

    pub fn algorithm_name(&self) -> &'static str {
        algorithm_name(self.algorithm)
    }
}

pub(crate) fn algorithm_name(algorithm: u8) -> &'static str {
    match algorithm {
        5 => "RSA/SHA-1",
        7 => "RSA/SHA-1 NSEC3",
        8 => "RSA/SHA-256",
        10 => "RSA/SHA-512",
        13 => "ECDSA P-256/SHA-256",
        14 => "ECDSA P-384/SHA-384",
        15 => "Ed25519",
        16 => "Ed448",
        _ => "Unknown",
    }
}

impl fmt::Display for DnskeyRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "DNSKEY({}, flags={}, algo={}, tag={}, {})",
            self.owner,
            self.flags,
            self.algorithm_name(),
            self.calculate_key_tag(),
            if self.flags & 0x0001 != 0 { "KSK" } else { "ZSK" }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_tag_of_root_ksk_2017() {
        use base64::{engine::general_purpose::STANDARD, Engine};

        let public_key = STANDARD
            .decode(concat!(
                "AwEAAaz/tAm8yTn4Mfeh5eyI96WSVexTBAvkMgJzkKTOiW1vkIbzxeF3",
                "+/4RgWOq7HrxRixHlFlExOLAJr5emLvN7SWXgnLh4+B5xQlNVz8Og8kv",
                "ArMtNROxVQuCaSnIDdD5LKyWbRd2n9WGe2R8PzgCmr3EgVLrjyBxWezF",
                "0jLHwVN8efS3rCj/EWgvIWgb9tarpVUDK/b58Da+sqqls3eNbuv7pr+e",
                "oZG+SrDK6nWeL3c6H5Apxz7LjVc1uTIdsIXxuOLYA4/ilBmSVIzuDWfd",
                "RUfhHdY6+cn8HFRm+2hM8AnXGXws9555KrUB5qihylGa8subX2Nn6UwN",
                "R1AkUTV74bU="
            ))
            .unwrap();

        let key = DnskeyRecord::new(".", 257, 3, 8, public_key);

        assert_eq!(key.calculate_key_tag(), 20326);
        assert!(key.to_string().ends_with("tag=20326, KSK)"));
        assert_eq!(&*key.owner, ".");
    }
}
