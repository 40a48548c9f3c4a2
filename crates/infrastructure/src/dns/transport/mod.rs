pub mod resolver;
pub mod tcp;
pub mod udp;

use async_trait::async_trait;
use bytes::Bytes;
use ferrous_q_domain::{DomainError, Endpoint, Net, TransportKind};
use std::future::Future;
use std::net::SocketAddr;
use std::time::Duration;

#[derive(Debug)]
pub struct TransportResponse {
    pub bytes: Bytes,

    pub server: SocketAddr,

    pub protocol_used: &'static str,
}

#[async_trait]
pub trait DnsTransport: Send + Sync {
    async fn send(
        &self,
        message_bytes: &[u8],
        timeout: Option<Duration>,
    ) -> Result<TransportResponse, DomainError>;

    fn protocol_name(&self) -> &'static str;
}

pub enum Transport {
    Udp(udp::UdpTransport),
    Tcp(tcp::TcpTransport),
}

impl Transport {
    pub async fn send(
        &self,
        message_bytes: &[u8],
        timeout: Option<Duration>,
    ) -> Result<TransportResponse, DomainError> {
        match self {
            Self::Udp(t) => DnsTransport::send(t, message_bytes, timeout).await,
            Self::Tcp(t) => DnsTransport::send(t, message_bytes, timeout).await,
        }
    }
}

/// Resolves `endpoint` for `net`'s address family and picks the transport.
pub async fn create_transport(
    endpoint: &Endpoint,
    net: Net,
    timeout: Option<Duration>,
) -> Result<Transport, DomainError> {
    let server_addr = resolver::resolve_endpoint(endpoint, net.family, timeout).await?;

    Ok(match net.kind {
        TransportKind::Udp => Transport::Udp(udp::UdpTransport::new(server_addr)),
        TransportKind::Tcp => Transport::Tcp(tcp::TcpTransport::new(server_addr)),
    })
}

/// Runs `fut` under `timeout`, or unbounded when there is none.
pub(crate) async fn with_timeout<F, T>(
    timeout: Option<Duration>,
    server: SocketAddr,
    fut: F,
) -> Result<T, DomainError>
where
    F: Future<Output = Result<T, DomainError>>,
{
    match timeout {
        Some(limit) => tokio::time::timeout(limit, fut)
            .await
            .map_err(|_| DomainError::TransportTimeout {
                server: server.to_string(),
            })?,
        None => fut.await,
    }
}
