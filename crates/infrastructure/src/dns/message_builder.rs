//! DNS Message Builder
//!
//! Turns a [`DnsQuery`] into a `hickory-proto` message: the single question,
//! an optional IXFR SOA in the authority section, the EDNS0 OPT record and
//! finally the TSIG signature, which has to stay last.

use super::tsig::{unix_now, TsigKeyring};
use ferrous_q_domain::{DnsQuery, DomainError, EdnsOptions};
use hickory_proto::op::{Edns, Message, MessageType, OpCode, Query};
use hickory_proto::rr::rdata::opt::{ClientSubnet, EdnsCode, EdnsOption};
use hickory_proto::rr::rdata::SOA;
use hickory_proto::rr::{DNSClass, Name, RData, Record, RecordType};
use std::str::FromStr;

/// A query ready for the wire.
#[derive(Debug, Clone)]
pub struct EncodedQuery {
    pub id: u16,
    pub bytes: Vec<u8>,
    /// MAC of the TSIG record, present when the query was signed.
    pub tsig_mac: Option<Vec<u8>>,
}

pub struct MessageBuilder;

impl MessageBuilder {
    pub fn new_id() -> u16 {
        fastrand::u16(..)
    }

    /// Encodes and, when the query names a TSIG key, signs it.
    pub fn build(
        query: &DnsQuery,
        id: u16,
        keyring: &TsigKeyring,
    ) -> Result<EncodedQuery, DomainError> {
        let mut message = Self::message(query, id)?;

        let tsig_mac = match &query.tsig {
            Some(key) => {
                let signer = keyring.signer(&key.name).ok_or_else(|| {
                    DomainError::TsigSigning(format!("no secret for key {}", key.name))
                })?;
                Some(signer.sign(&mut message, unix_now())?)
            }
            None => None,
        };

        Ok(EncodedQuery {
            id,
            bytes: Self::serialize_message(&message)?,
            tsig_mac,
        })
    }

    pub fn build_unsigned(query: &DnsQuery, id: u16) -> Result<Vec<u8>, DomainError> {
        Self::serialize_message(&Self::message(query, id)?)
    }

    fn message(query: &DnsQuery, id: u16) -> Result<Message, DomainError> {
        let name = Name::from_str(&query.name).map_err(|e| {
            DomainError::InvalidDomainName(format!("Invalid domain '{}': {}", query.name, e))
        })?;
        let class = DNSClass::from(query.record_class.to_u16());
        let record_type = RecordType::from(query.record_type.to_u16());

        let mut question = Query::query(name.clone(), record_type);
        question.set_query_class(class);

        let mut message = Message::new(id, MessageType::Query, OpCode::Query);
        message
            .set_authoritative(query.flags.authoritative)
            .set_recursion_desired(query.flags.recursion_desired)
            .set_authentic_data(query.flags.authenticated_data)
            .set_checking_disabled(query.flags.checking_disabled)
            .add_query(question);

        if let Some(serial) = query.ixfr_serial {
            message.add_name_server(Self::ixfr_soa(name, class, serial));
        }

        if let Some(edns) = &query.edns {
            message.set_edns(Self::edns(edns));
        }

        Ok(message)
    }

    /// Authority SOA of an IXFR request; only the serial is meaningful.
    fn ixfr_soa(name: Name, class: DNSClass, serial: u32) -> Record {
        let soa = SOA::new(Name::root(), Name::root(), serial, 0, 0, 0, 0);
        let mut record = Record::from_rdata(name, 0, RData::SOA(soa));
        record.set_dns_class(class);
        record
    }

    fn edns(options: &EdnsOptions) -> Edns {
        let mut edns = Edns::new();
        edns.set_max_payload(options.udp_payload_size)
            .set_dnssec_ok(options.dnssec_ok);

        if options.nsid {
            edns.options_mut()
                .insert(EdnsOption::Unknown(u16::from(EdnsCode::NSID), Vec::new()));
        }

        if let Some(subnet) = &options.client_subnet {
            edns.options_mut().insert(EdnsOption::Subnet(ClientSubnet::new(
                subnet.address,
                subnet.source_netmask,
                subnet.scope_netmask,
            )));
        }

        edns
    }

    fn serialize_message(message: &Message) -> Result<Vec<u8>, DomainError> {
        message.to_vec().map_err(|e| {
            DomainError::InvalidDomainName(format!("Failed to serialize DNS message: {}", e))
        })
    }
}
