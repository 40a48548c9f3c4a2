use std::net::IpAddr;
use std::str::FromStr;

use crate::errors::DomainError;

/// Address carried in an EDNS0 client-subnet option.
///
/// The source netmask always covers the whole address: 32 bits for IPv4,
/// 128 bits for IPv6. The scope netmask sent in a query is 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ClientSubnet {
    pub address: IpAddr,
    pub source_netmask: u8,
    pub scope_netmask: u8,
}

impl ClientSubnet {
    pub fn new(address: IpAddr) -> Self {
        let source_netmask = match address {
            IpAddr::V4(_) => 32,
            IpAddr::V6(_) => 128,
        };
        Self {
            address,
            source_netmask,
            scope_netmask: 0,
        }
    }

    pub fn parse(literal: &str) -> Result<Self, DomainError> {
        literal
            .trim()
            .parse::<IpAddr>()
            .map(Self::new)
            .map_err(|_| DomainError::InvalidIpAddress(literal.to_string()))
    }
}

impl FromStr for ClientSubnet {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
