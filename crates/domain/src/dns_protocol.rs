use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransportKind {
    Udp,
    Tcp,
}

/// Restricts which address family a hostname endpoint may resolve to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum AddressFamily {
    #[default]
    Any,
    V4,
    V6,
}

impl AddressFamily {
    pub fn admits(&self, ip: &IpAddr) -> bool {
        match self {
            AddressFamily::Any => true,
            AddressFamily::V4 => ip.is_ipv4(),
            AddressFamily::V6 => ip.is_ipv6(),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            AddressFamily::Any => "IP",
            AddressFamily::V4 => "IPv4",
            AddressFamily::V6 => "IPv6",
        }
    }
}

/// Transport kind plus family, named the way `udp`, `udp4`, `tcp6` ... are.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Net {
    pub kind: TransportKind,
    pub family: AddressFamily,
}

impl Net {
    pub fn new(kind: TransportKind, family: AddressFamily) -> Self {
        Self { kind, family }
    }

    pub fn udp() -> Self {
        Self::new(TransportKind::Udp, AddressFamily::Any)
    }

    pub fn tcp() -> Self {
        Self::new(TransportKind::Tcp, AddressFamily::Any)
    }

    /// Same family, different transport.
    pub fn with_kind(self, kind: TransportKind) -> Self {
        Self { kind, ..self }
    }

    pub fn is_tcp(&self) -> bool {
        self.kind == TransportKind::Tcp
    }

    pub fn name(&self) -> &'static str {
        match (self.kind, self.family) {
            (TransportKind::Udp, AddressFamily::Any) => "udp",
            (TransportKind::Udp, AddressFamily::V4) => "udp4",
            (TransportKind::Udp, AddressFamily::V6) => "udp6",
            (TransportKind::Tcp, AddressFamily::Any) => "tcp",
            (TransportKind::Tcp, AddressFamily::V4) => "tcp4",
            (TransportKind::Tcp, AddressFamily::V6) => "tcp6",
        }
    }
}

impl fmt::Display for Net {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Net {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (kind, family) = match s.to_ascii_lowercase().as_str() {
            "udp" => (TransportKind::Udp, AddressFamily::Any),
            "udp4" => (TransportKind::Udp, AddressFamily::V4),
            "udp6" => (TransportKind::Udp, AddressFamily::V6),
            "tcp" => (TransportKind::Tcp, AddressFamily::Any),
            "tcp4" => (TransportKind::Tcp, AddressFamily::V4),
            "tcp6" => (TransportKind::Tcp, AddressFamily::V6),
            _ => return Err(format!("Unknown transport '{}'", s)),
        };
        Ok(Self::new(kind, family))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum EndpointHost {
    Ip(IpAddr),
    /// Fully qualified, resolved only when the exchange is made.
    Name(Arc<str>),
}

/// A nameserver as the operator named it, normalized to something a
/// transport can connect to.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Endpoint {
    pub host: EndpointHost,
    pub port: u16,
}

impl Endpoint {
    /// Normalizes a server token.
    ///
    /// IP literals keep their address; a bracketed IPv6 literal loses its
    /// brackets before parsing. A token that already carries a port
    /// (`192.0.2.1:5353`, `[2001:db8::1]:5353`, `localhost:5353`) keeps that
    /// port. Anything else is a hostname and gets fully qualified. Nothing
    /// here touches the network.
    pub fn parse(token: &str, port: u16) -> Self {
        let token = token.strip_prefix('@').unwrap_or(token);

        if let Ok(addr) = token.parse::<SocketAddr>() {
            return Self {
                host: EndpointHost::Ip(addr.ip()),
                port: addr.port(),
            };
        }

        let bare = token
            .strip_prefix('[')
            .and_then(|t| t.strip_suffix(']'))
            .unwrap_or(token);

        if let Ok(ip) = bare.parse::<IpAddr>() {
            return Self {
                host: EndpointHost::Ip(ip),
                port,
            };
        }

        let (host, port) = split_host_port(bare).unwrap_or((bare, port));
        Self {
            host: EndpointHost::Name(fqdn(host).into()),
            port,
        }
    }

    pub fn socket_addr(&self) -> Option<SocketAddr> {
        match &self.host {
            EndpointHost::Ip(ip) => Some(SocketAddr::new(*ip, self.port)),
            EndpointHost::Name(_) => None,
        }
    }

    pub fn hostname(&self) -> Option<&str> {
        match &self.host {
            EndpointHost::Ip(_) => None,
            EndpointHost::Name(name) => Some(name),
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.host {
            EndpointHost::Ip(IpAddr::V4(ip)) => write!(f, "{}:{}", ip, self.port),
            EndpointHost::Ip(IpAddr::V6(ip)) => write!(f, "[{}]:{}", ip, self.port),
            EndpointHost::Name(name) => write!(f, "{}:{}", name, self.port),
        }
    }
}

/// `host:5353` as host and port. Only a single colon followed by digits
/// counts, so nothing that looks like an IPv6 address is split.
fn split_host_port(token: &str) -> Option<(&str, u16)> {
    let (host, port) = token.rsplit_once(':')?;
    if host.is_empty() || host.contains(':') || !port.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    port.parse().ok().map(|port| (host, port))
}

/// Appends the root label unless it is already there.
pub fn fqdn(name: &str) -> String {
    if name.ends_with('.') {
        name.to_string()
    } else {
        format!("{}.", name)
    }
}
