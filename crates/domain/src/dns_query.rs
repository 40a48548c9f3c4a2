use std::sync::Arc;

use crate::client_subnet::ClientSubnet;
use crate::dns_protocol::fqdn;
use crate::dns_record::{RecordClass, RecordType};
use crate::tsig::TsigKey;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeaderFlags {
    pub authoritative: bool,
    pub authenticated_data: bool,
    pub checking_disabled: bool,
    pub recursion_desired: bool,
}

impl Default for HeaderFlags {
    fn default() -> Self {
        Self {
            authoritative: false,
            authenticated_data: false,
            checking_disabled: false,
            recursion_desired: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EdnsOptions {
    pub udp_payload_size: u16,
    pub dnssec_ok: bool,
    pub nsid: bool,
    pub client_subnet: Option<ClientSubnet>,
}

impl EdnsOptions {
    /// Buffer size advertised whenever EDNS0 gets attached.
    pub const DEFAULT_PAYLOAD: u16 = 4096;

    pub fn with_payload(udp_payload_size: u16) -> Self {
        Self {
            udp_payload_size,
            dnssec_ok: false,
            nsid: false,
            client_subnet: None,
        }
    }

    /// Builds the OPT options for the operator's request, or `None` when
    /// nothing asks for EDNS0. Every one of the three widens the buffer.
    pub fn for_request(
        dnssec: bool,
        nsid: bool,
        client_subnet: Option<ClientSubnet>,
        udp_payload_size: u16,
    ) -> Option<Self> {
        if !dnssec && !nsid && client_subnet.is_none() {
            return None;
        }

        Some(Self {
            udp_payload_size,
            dnssec_ok: dnssec,
            nsid,
            client_subnet,
        })
    }
}

/// One question plus everything that shapes how it is asked.
#[derive(Debug, Clone)]
pub struct DnsQuery {
    pub name: Arc<str>,
    pub record_type: RecordType,
    pub record_class: RecordClass,
    pub flags: HeaderFlags,
    pub edns: Option<EdnsOptions>,
    pub tsig: Option<Arc<TsigKey>>,
    /// Serial placed in the authority SOA of an IXFR request.
    pub ixfr_serial: Option<u32>,
}

impl DnsQuery {
    pub fn new(name: &str, record_type: RecordType) -> Self {
        Self {
            name: fqdn(name).into(),
            record_type,
            record_class: RecordClass::IN,
            flags: HeaderFlags::default(),
            edns: None,
            tsig: None,
            ixfr_serial: None,
        }
    }

    pub fn with_class(mut self, record_class: RecordClass) -> Self {
        self.record_class = record_class;
        self
    }

    pub fn with_flags(mut self, flags: HeaderFlags) -> Self {
        self.flags = flags;
        self
    }

    pub fn with_edns(mut self, edns: Option<EdnsOptions>) -> Self {
        self.edns = edns;
        self
    }

    pub fn with_tsig(mut self, tsig: Option<Arc<TsigKey>>) -> Self {
        self.tsig = tsig;
        self
    }

    pub fn with_ixfr_serial(mut self, serial: Option<u32>) -> Self {
        self.ixfr_serial = serial;
        self
    }

    pub fn has_edns(&self) -> bool {
        self.edns.is_some()
    }

    /// Attaches a bare EDNS0 record if none is present. Returns whether one
    /// was added.
    pub fn attach_edns(&mut self, udp_payload_size: u16) -> bool {
        if self.edns.is_some() {
            return false;
        }
        self.edns = Some(EdnsOptions::with_payload(udp_payload_size));
        true
    }

    pub fn dnssec_ok(&self) -> bool {
        self.edns.as_ref().is_some_and(|e| e.dnssec_ok)
    }

    pub fn is_zone_transfer(&self) -> bool {
        self.record_type.is_zone_transfer()
    }
}
