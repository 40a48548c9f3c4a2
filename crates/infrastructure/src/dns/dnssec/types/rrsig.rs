use ferrous_q_domain::RecordType;
use hickory_proto::dnssec::rdata::RRSIG;

/// The fields of an RRSIG the checker needs, lifted out of hickory's type.
#[derive(Debug, Clone)]
pub struct RrsigRecord {
    pub type_covered: RecordType,
    pub algorithm: u8,
    pub labels: u8,
    pub original_ttl: u32,
    pub signature_expiration: u32,
    pub signature_inception: u32,
    pub key_tag: u16,
    pub signer_name: String,
    pub signature: Vec<u8>,
}

impl RrsigRecord {
    pub fn from_hickory(rrsig: &RRSIG) -> Self {
        let input = rrsig.input();
        Self {
            type_covered: RecordType::from_u16(u16::from(input.type_covered)),
            algorithm: u8::from(input.algorithm),
            labels: input.num_labels,
            original_ttl: input.original_ttl,
            signature_expiration: input.sig_expiration.get(),
            signature_inception: input.sig_inception.get(),
            key_tag: input.key_tag,
            signer_name: input.signer_name.to_string(),
            signature: rrsig.sig().to_vec(),
        }
    }

    pub fn is_within_window(&self, now: u32) -> bool {
        (self.signature_inception..=self.signature_expiration).contains(&now)
    }
}
