use super::types::{DnskeyRecord, RrsigRecord};
use ferrous_q_domain::BogusReason;
use hickory_proto::dnssec::rdata::sig::SigInput;
use hickory_proto::dnssec::tbs::TBS;
use hickory_proto::dnssec::Algorithm;
use hickory_proto::rr::{Name, Record, RecordType as HickoryRecordType, SerialNumber};
use ring::signature;
use std::str::FromStr;
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::debug;

pub struct SignatureVerifier;

impl SignatureVerifier {
    /// Checks `rrsig` over `rrset` with `dnskey`.
    ///
    /// `rrset` must hold exactly the covered records; it is canonicalised
    /// here, so order and name case do not matter. The validity window is
    /// only reported against `now`, a signature outside it still verifies.
    pub fn verify_rrsig(
        &self,
        rrsig: &RrsigRecord,
        dnskey: &DnskeyRecord,
        rrset: &[Record],
        now: u32,
    ) -> Result<(), BogusReason> {
        if !names_equal(&rrsig.signer_name, &dnskey.owner) {
            return Err(BogusReason::SignerMismatch {
                signer: rrsig.signer_name.clone(),
                key_owner: dnskey.owner.to_string(),
            });
        }

        let key_tag = dnskey.calculate_key_tag();
        if key_tag != rrsig.key_tag {
            return Err(BogusReason::KeyTagMismatch {
                signature: rrsig.key_tag,
                key: key_tag,
            });
        }

        if dnskey.algorithm != rrsig.algorithm {
            return Err(BogusReason::AlgorithmMismatch {
                signature: rrsig.algorithm,
                key: dnskey.algorithm,
            });
        }

        if !rrsig.is_within_window(now) {
            debug!(
                signer = %rrsig.signer_name,
                key_tag = rrsig.key_tag,
                inception = rrsig.signature_inception,
                expiration = rrsig.signature_expiration,
                now,
                "RRSIG outside its validity window"
            );
        }

        let data = Self::signed_data(rrsig, rrset)?;
        let sig = rrsig.signature.as_slice();

        let valid = match rrsig.algorithm {
            5 | 7 => self.verify_rsa(
                &signature::RSA_PKCS1_2048_8192_SHA1_FOR_LEGACY_USE_ONLY,
                &data,
                sig,
                dnskey,
            )?,
            8 => self.verify_rsa(&signature::RSA_PKCS1_2048_8192_SHA256, &data, sig, dnskey)?,
            10 => self.verify_rsa(&signature::RSA_PKCS1_2048_8192_SHA512, &data, sig, dnskey)?,
            13 => self.verify_ecdsa(&signature::ECDSA_P256_SHA256_FIXED, 64, &data, sig, dnskey)?,
            14 => self.verify_ecdsa(&signature::ECDSA_P384_SHA384_FIXED, 96, &data, sig, dnskey)?,
            15 => self.verify_ed25519(&data, sig, dnskey)?,
            other => return Err(BogusReason::UnsupportedAlgorithm(other)),
        };

        if valid {
            Ok(())
        } else {
            Err(BogusReason::CryptoFailure)
        }
    }

    fn signed_data(rrsig: &RrsigRecord, rrset: &[Record]) -> Result<Vec<u8>, BogusReason> {
        let first = rrset.first().ok_or(BogusReason::CryptoFailure)?;
        let malformed = |e: String| BogusReason::MalformedKey(e);

        let signer_name = Name::from_str(&rrsig.signer_name).map_err(|e| malformed(e.to_string()))?;

        let sig_input = SigInput {
            type_covered: HickoryRecordType::from(rrsig.type_covered.to_u16()),
            algorithm: Algorithm::from_u8(rrsig.algorithm),
            num_labels: rrsig.labels,
            original_ttl: rrsig.original_ttl,
            sig_expiration: SerialNumber::from(rrsig.signature_expiration),
            sig_inception: SerialNumber::from(rrsig.signature_inception),
            key_tag: rrsig.key_tag,
            signer_name,
        };

        let tbs = TBS::from_input(first.name(), first.dns_class(), &sig_input, rrset.iter())
            .map_err(|_| BogusReason::CryptoFailure)?;

        Ok(tbs.as_ref().to_vec())
    }

    fn verify_rsa(
        &self,
        params: &'static signature::RsaParameters,
        data: &[u8],
        sig: &[u8],
        dnskey: &DnskeyRecord,
    ) -> Result<bool, BogusReason> {
        let (exponent, modulus) = self.parse_rsa_key(&dnskey.public_key)?;
        let public_key = signature::RsaPublicKeyComponents {
            n: &modulus,
            e: &exponent,
        };

        Ok(public_key.verify(params, data, sig).is_ok())
    }

    fn verify_ecdsa(
        &self,
        params: &'static signature::EcdsaVerificationAlgorithm,
        len: usize,
        data: &[u8],
        sig: &[u8],
        dnskey: &DnskeyRecord,
    ) -> Result<bool, BogusReason> {
        if dnskey.public_key.len() != len {
            return Err(BogusReason::MalformedKey(format!(
                "ECDSA public key is {} bytes, expected {}",
                dnskey.public_key.len(),
                len
            )));
        }

        if sig.len() != len {
            return Ok(false);
        }

        let mut pk = Vec::with_capacity(len + 1);
        pk.push(0x04);
        pk.extend_from_slice(&dnskey.public_key);

        let public_key = signature::UnparsedPublicKey::new(params, &pk);
        Ok(public_key.verify(data, sig).is_ok())
    }

    fn verify_ed25519(
        &self,
        data: &[u8],
        sig: &[u8],
        dnskey: &DnskeyRecord,
    ) -> Result<bool, BogusReason> {
        if dnskey.public_key.len() != 32 {
            return Err(BogusReason::MalformedKey(
                "Ed25519 public key must be 32 bytes".into(),
            ));
        }

        if sig.len() != 64 {
            return Ok(false);
        }

        let public_key = signature::UnparsedPublicKey::new(&signature::ED25519, &dnskey.public_key);
        Ok(public_key.verify(data, sig).is_ok())
    }

    fn parse_rsa_key(&self, key_data: &[u8]) -> Result<(Vec<u8>, Vec<u8>), BogusReason> {
        let malformed = |msg: &str| BogusReason::MalformedKey(msg.to_string());

        let Some(&first_byte) = key_data.first() else {
            return Err(malformed("empty RSA public key"));
        };

        let (exp_len, exp_start) = if first_byte == 0 {
            if key_data.len() < 3 {
                return Err(malformed("RSA key too short for long form"));
            }
            let exp_len = u16::from_be_bytes([key_data[1], key_data[2]]) as usize;
            (exp_len, 3)
        } else {
            (first_byte as usize, 1)
        };

        let exp_end = exp_start + exp_len;
        if exp_end > key_data.len() {
            return Err(malformed("RSA exponent extends beyond key data"));
        }

        let exponent = key_data[exp_start..exp_end].to_vec();
        let modulus = key_data[exp_end..].to_vec();

        if modulus.is_empty() {
            return Err(malformed("RSA modulus is empty"));
        }

        Ok((exponent, modulus))
    }
}

/// Seconds since the epoch, truncated to the 32-bit RRSIG time field.
pub fn now_u32() -> u32 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as u32)
        .unwrap_or(0)
}

fn names_equal(a: &str, b: &str) -> bool {
    a.trim_end_matches('.')
        .eq_ignore_ascii_case(b.trim_end_matches('.'))
}
