#![allow(dead_code)]
use hickory_proto::dnssec::rdata::{DNSSECRData, DNSKEY};
use hickory_proto::dnssec::{Algorithm, PublicKeyBuf};
use hickory_proto::op::{Message, MessageType, ResponseCode};
use hickory_proto::rr::rdata::{A, SOA};
use hickory_proto::rr::{Name, RData, Record};
use std::net::Ipv4Addr;
use std::str::FromStr;

/// Response messages built on top of the request they answer.
pub struct ResponseBuilder {
    message: Message,
}

impl ResponseBuilder {
    /// Echoes the ID, RD bit and question of `request`.
    pub fn reply_to(request: &[u8]) -> Self {
        let request = Message::from_vec(request).unwrap();

        let mut message = Message::new(request.id(), MessageType::Response, request.op_code());
        message
            .set_recursion_desired(request.recursion_desired())
            .set_recursion_available(true)
            .add_queries(request.queries().iter().cloned());

        Self { message }
    }

    pub fn with_id(mut self, id: u16) -> Self {
        let mut header = *self.message.header();
        header.set_id(id);
        self.message.set_header(header);
        self
    }

    pub fn truncated(mut self) -> Self {
        self.message.set_truncated(true);
        self
    }

    pub fn rcode(mut self, rcode: u8) -> Self {
        self.message.set_response_code(ResponseCode::from_low(rcode));
        self
    }

    pub fn record(mut self, record: Record) -> Self {
        self.message.add_answer(record);
        self
    }

    pub fn a(self, name: &str, ip: [u8; 4]) -> Self {
        self.record(Record::from_rdata(
            name_of(name),
            300,
            RData::A(A(Ipv4Addr::from(ip))),
        ))
    }

    pub fn soa(self, name: &str, serial: u32) -> Self {
        let soa = SOA::new(
            name_of("ns1.example.com."),
            name_of("hostmaster.example.com."),
            serial,
            7200,
            3600,
            1_209_600,
            300,
        );
        self.record(Record::from_rdata(name_of(name), 3600, RData::SOA(soa)))
    }

    /// An Ed25519 zone key.
    pub fn dnskey(self, name: &str, flags: u16, public_key: &[u8]) -> Self {
        let key = DNSKEY::with_flags(
            flags,
            PublicKeyBuf::new(public_key.to_vec(), Algorithm::ED25519),
        );
        self.record(Record::from_rdata(
            name_of(name),
            3600,
            RData::DNSSEC(DNSSECRData::DNSKEY(key)),
        ))
    }

    pub fn build(self) -> Vec<u8> {
        self.message.to_vec().unwrap()
    }
}

fn name_of(name: &str) -> Name {
    Name::from_str(name).unwrap()
}
