//! Shortens the cryptographic payloads of DNSSEC records for display.

use super::format::PresentedRecord;
use hickory_proto::dnssec::rdata::sig::SigInput;
use hickory_proto::dnssec::rdata::{DNSSECRData, DNSKEY, DS, NSEC3};
use hickory_proto::dnssec::PublicKey;
use hickory_proto::rr::Record;

pub const PLACEHOLDER: &str = "...";

/// NSEC3 type lists longer than this get cut back to `NSEC3_TYPES_KEPT`.
const NSEC3_TYPES_LIMIT: usize = 5;
const NSEC3_TYPES_KEPT: usize = 4;

/// Presentation form of `record`, with the digest, key, signature or salt
/// replaced when it carries one.
pub fn redact_record(record: &Record) -> PresentedRecord {
    let mut presented = PresentedRecord::from_record(record);
    if let Some(rdata) = record.data().as_dnssec().and_then(shortened) {
        presented.rdata = rdata;
    }
    presented
}

fn shortened(rdata: &DNSSECRData) -> Option<String> {
    match rdata {
        DNSSECRData::DS(ds) => Some(ds_without_digest(ds)),
        DNSSECRData::DNSKEY(key) => Some(dnskey_without_key(key)),
        DNSSECRData::RRSIG(rrsig) => Some(rrsig_without_signature(rrsig.input())),
        DNSSECRData::NSEC3(nsec3) => Some(nsec3_without_salt(nsec3)),
        _ => None,
    }
}

fn ds_without_digest(ds: &DS) -> String {
    format!(
        "{} {} {} {}",
        ds.key_tag(),
        u8::from(ds.algorithm()),
        u8::from(ds.digest_type()),
        PLACEHOLDER
    )
}

fn dnskey_without_key(key: &DNSKEY) -> String {
    format!(
        "{} 3 {} {}",
        key.flags(),
        u8::from(key.public_key().algorithm()),
        PLACEHOLDER
    )
}

fn rrsig_without_signature(input: &SigInput) -> String {
    format!(
        "{} {} {} {} {} {} {} {} {}",
        input.type_covered,
        input.algorithm,
        input.num_labels,
        input.original_ttl,
        input.sig_expiration.get(),
        input.sig_inception.get(),
        input.key_tag,
        input.signer_name,
        PLACEHOLDER
    )
}

/// Salt becomes `-`; a long type list keeps only its head.
fn nsec3_without_salt(nsec3: &NSEC3) -> String {
    let next_owner = nsec3
        .next_hashed_owner_name_base32()
        .map(ToString::to_string)
        .unwrap_or_default();

    let mut fields = vec![
        u8::from(nsec3.hash_algorithm()).to_string(),
        nsec3.flags().to_string(),
        nsec3.iterations().to_string(),
        "-".to_string(),
        next_owner,
    ];

    let mut types: Vec<String> = nsec3.type_bit_maps().map(|t| t.to_string()).collect();
    if types.len() > NSEC3_TYPES_LIMIT {
        types.truncate(NSEC3_TYPES_KEPT);
    }
    fields.extend(types);

    fields.join(" ")
}
