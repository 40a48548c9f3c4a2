//! Ferrous Q Domain Layer
pub mod client_subnet;
pub mod config;
pub mod dns_protocol;
pub mod dns_query;
pub mod dns_record;
pub mod errors;
pub mod tsig;
pub mod verification;

pub use client_subnet::ClientSubnet;
pub use config::Config;
pub use dns_protocol::{AddressFamily, Endpoint, EndpointHost, Net, TransportKind};
pub use dns_query::{DnsQuery, EdnsOptions, HeaderFlags};
pub use dns_record::{RecordClass, RecordType};
pub use errors::DomainError;
pub use tsig::{TsigAlgorithm, TsigKey};
pub use verification::{BogusReason, KeySource, SignatureVerdict, SignedSet, VerifyingKey};
