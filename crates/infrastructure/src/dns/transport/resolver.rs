use ferrous_q_domain::{AddressFamily, DomainError, Endpoint, EndpointHost};
use std::net::SocketAddr;
use std::time::Duration;
use tracing::debug;

/// Turns an endpoint into one socket address of the wanted family.
///
/// Literals are checked against the family; hostnames go through the system
/// resolver.
pub async fn resolve_endpoint(
    endpoint: &Endpoint,
    family: AddressFamily,
    timeout: Option<Duration>,
) -> Result<SocketAddr, DomainError> {
    match &endpoint.host {
        EndpointHost::Ip(ip) if family.admits(ip) => Ok(SocketAddr::new(*ip, endpoint.port)),
        EndpointHost::Ip(ip) => Err(DomainError::NoAddress {
            host: ip.to_string(),
            family: family.label(),
        }),
        EndpointHost::Name(name) => {
            let addrs = resolve_all(name, endpoint.port, timeout).await?;
            let picked = addrs
                .into_iter()
                .find(|addr| family.admits(&addr.ip()))
                .ok_or_else(|| DomainError::NoAddress {
                    host: name.to_string(),
                    family: family.label(),
                })?;

            debug!(host = %name, resolved = %picked, "Nameserver resolved");
            Ok(picked)
        }
    }
}

/// Resolves a hostname to all its IP addresses (IPv4 + IPv6).
pub async fn resolve_all(
    hostname: &str,
    port: u16,
    timeout: Option<Duration>,
) -> Result<Vec<SocketAddr>, DomainError> {
    let target = format!("{}:{}", hostname.trim_end_matches('.'), port);

    let lookup = tokio::net::lookup_host(&target);
    let addrs_iter = match timeout {
        Some(limit) => tokio::time::timeout(limit, lookup)
            .await
            .map_err(|_| DomainError::TransportTimeout {
                server: target.clone(),
            })?,
        None => lookup.await,
    }
    .map_err(|e| DomainError::IoError(format!("Resolution failed for {}: {}", target, e)))?;

    let addrs: Vec<SocketAddr> = addrs_iter.collect();

    if addrs.is_empty() {
        return Err(DomainError::NoAddress {
            host: hostname.to_string(),
            family: AddressFamily::Any.label(),
        });
    }

    Ok(addrs)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_literal_of_wrong_family_is_rejected() {
        let endpoint = Endpoint::parse("2001:db8::1", 53);

        let result = resolve_endpoint(&endpoint, AddressFamily::V4, None).await;

        assert!(matches!(result, Err(DomainError::NoAddress { .. })));
    }

    #[tokio::test]
    async fn test_literal_of_matching_family_needs_no_lookup() {
        let endpoint = Endpoint::parse("192.0.2.1", 5353);

        let addr = resolve_endpoint(&endpoint, AddressFamily::V4, None)
            .await
            .unwrap();

        assert_eq!(addr, "192.0.2.1:5353".parse().unwrap());
    }
}
