use super::crypto::{now_u32, SignatureVerifier};
use super::types::{DnskeyRecord, KeyReference, RrsigRecord};
use crate::dns::exchange::Exchanger;
use crate::dns::message_builder::MessageBuilder;
use crate::dns::response::{DnsResponse, ResponseParser};
use async_trait::async_trait;
use ferrous_q_domain::{
    DnsQuery, DomainError, EdnsOptions, KeySource, Net, RecordType, SignatureVerdict, SignedSet,
    VerifyingKey,
};
use hickory_proto::dnssec::rdata::DNSSECRData;
use hickory_proto::rr::{RData, Record};
use std::sync::Arc;
use tracing::{debug, warn};

/// Finds the key a signature claims to be made with.
#[async_trait]
pub trait KeyResolver: Send + Sync {
    async fn resolve(&self, signer: &str, key_tag: u16) -> Option<DnskeyRecord>;
}

/// Asks the queried server for the signer's DNSKEY set. Nothing is cached.
pub struct NetworkKeyResolver {
    exchanger: Arc<dyn Exchanger>,
    net: Net,
    udp_payload_size: u16,
}

impl NetworkKeyResolver {
    pub fn new(exchanger: Arc<dyn Exchanger>, net: Net, udp_payload_size: u16) -> Self {
        Self {
            exchanger,
            net,
            udp_payload_size,
        }
    }

    async fn fetch(&self, signer: &str) -> Result<Vec<DnskeyRecord>, DomainError> {
        let query = DnsQuery::new(signer, RecordType::DNSKEY).with_edns(EdnsOptions::for_request(
            true,
            false,
            None,
            self.udp_payload_size,
        ));

        let id = MessageBuilder::new_id();
        let request = MessageBuilder::build_unsigned(&query, id)?;
        let exchanged = self.exchanger.exchange(&request, self.net).await?;
        let response = ResponseParser::parse(exchanged.bytes)?;

        if response.id() != id {
            return Err(DomainError::IdMismatch {
                expected: id,
                received: response.id(),
            });
        }

        let keys = response
            .answers()
            .iter()
            .filter_map(|record| match record.data() {
                RData::DNSSEC(DNSSECRData::DNSKEY(dnskey)) => Some(DnskeyRecord::from_hickory(
                    &record.name().to_string(),
                    dnskey,
                )),
                _ => None,
            })
            .collect();

        Ok(keys)
    }
}

#[async_trait]
impl KeyResolver for NetworkKeyResolver {
    async fn resolve(&self, signer: &str, key_tag: u16) -> Option<DnskeyRecord> {
        match self.fetch(signer).await {
            Ok(keys) => {
                debug!(signer = %signer, keys = keys.len(), "DNSKEY set fetched");
                keys.into_iter()
                    .find(|key| key.calculate_key_tag() == key_tag)
            }
            Err(e) => {
                warn!(signer = %signer, error = %e, "DNSKEY query failed");
                None
            }
        }
    }
}

/// Checks every RRSIG in a response against the key it names.
pub struct SignatureChecker {
    key: KeyReference,
    resolver: Arc<dyn KeyResolver>,
    verifier: SignatureVerifier,
}

impl SignatureChecker {
    pub fn new(key: KeyReference, resolver: Arc<dyn KeyResolver>) -> Self {
        Self {
            key,
            resolver,
            verifier: SignatureVerifier,
        }
    }

    /// One verdict per RRSIG, sections in wire order.
    pub async fn check(&self, response: &DnsResponse) -> Vec<SignatureVerdict> {
        self.check_sections([response.answers(), response.authority(), response.additional()])
            .await
    }

    /// Each RRSIG is matched only against records of its own section.
    pub async fn check_sections(&self, sections: [&[Record]; 3]) -> Vec<SignatureVerdict> {
        let now = now_u32();
        let mut verdicts = Vec::new();

        for section in sections {
            for record in section {
                let RData::DNSSEC(DNSSECRData::RRSIG(rrsig)) = record.data() else {
                    continue;
                };
                let rrsig = RrsigRecord::from_hickory(rrsig);
                let owner = record.name().to_string();
                let rrset = rrset_for(section, &owner, rrsig.type_covered);

                verdicts.push(self.check_one(&owner, &rrsig, &rrset, now).await);
            }
        }

        verdicts
    }

    async fn check_one(
        &self,
        owner: &str,
        rrsig: &RrsigRecord,
        rrset: &[Record],
        now: u32,
    ) -> SignatureVerdict {
        let resolved = match &self.key {
            KeyReference::Pinned(key) => Some((key.as_ref().clone(), KeySource::Disk)),
            KeyReference::Network => self
                .resolver
                .resolve(&rrsig.signer_name, rrsig.key_tag)
                .await
                .map(|key| (key, KeySource::Net)),
        };

        let Some((key, source)) = resolved else {
            return SignatureVerdict::KeyNotFound {
                signer: Arc::from(rrsig.signer_name.as_str()),
                key_tag: rrsig.key_tag,
            };
        };

        let signed = SignedSet {
            owner: Arc::from(owner),
            type_covered: rrsig.type_covered,
        };
        let verifying_key = VerifyingKey {
            owner: key.owner.clone(),
            key_tag: key.calculate_key_tag(),
            source,
        };

        match self.verifier.verify_rrsig(rrsig, &key, rrset, now) {
            Ok(()) => SignatureVerdict::Secure {
                signed,
                key: verifying_key,
            },
            Err(reason) => {
                debug!(owner = %owner, reason = %reason, "Signature does not validate");
                SignatureVerdict::Bogus {
                    signed,
                    key: verifying_key,
                    reason,
                }
            }
        }
    }
}

/// Records of `section` with exactly this owner (any case) and type.
pub fn rrset_for(section: &[Record], owner: &str, record_type: RecordType) -> Vec<Record> {
    section
        .iter()
        .filter(|r| {
            u16::from(r.record_type()) == record_type.to_u16()
                && r.name().to_string().eq_ignore_ascii_case(owner)
        })
        .cloned()
        .collect()
}
