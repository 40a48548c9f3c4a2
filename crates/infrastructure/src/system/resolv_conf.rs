use ferrous_q_domain::DomainError;
use std::net::IpAddr;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, warn};

pub const DEFAULT_RESOLV_CONF: &str = "/etc/resolv.conf";

/// Reads the `nameserver` lines of a resolv.conf file.
pub struct ResolvConfReader {
    path: PathBuf,
}

impl ResolvConfReader {
    pub fn new() -> Self {
        Self::with_path(DEFAULT_RESOLV_CONF)
    }

    pub fn with_path(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub async fn nameservers(&self) -> Result<Vec<IpAddr>, DomainError> {
        let content = fs::read_to_string(&self.path).await.map_err(|e| {
            DomainError::IoError(format!("Failed to read {}: {}", self.path.display(), e))
        })?;

        let servers = parse_nameservers(&content);
        debug!(path = %self.path.display(), servers = servers.len(), "resolv.conf parsed");
        Ok(servers)
    }
}

impl Default for ResolvConfReader {
    fn default() -> Self {
        Self::new()
    }
}

pub fn parse_nameservers(content: &str) -> Vec<IpAddr> {
    let mut servers = Vec::new();

    for line in content.lines() {
        let line = line.trim();
        if line.starts_with('#') || line.starts_with(';') {
            continue;
        }

        let mut fields = line.split_whitespace();
        if fields.next() != Some("nameserver") {
            continue;
        }
        let Some(value) = fields.next() else {
            continue;
        };

        // Link-local IPv6 entries may carry a zone: fe80::1%eth0
        let address = value.split('%').next().unwrap_or(value);
        match address.parse::<IpAddr>() {
            Ok(ip) => servers.push(ip),
            Err(e) => warn!(error = %e, value = value, "Invalid nameserver in resolv.conf"),
        }
    }

    servers
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_parse_nameservers() {
        let content = "# generated by NetworkManager\nsearch lan\nnameserver 192.0.2.53\nnameserver   2001:db8::53\n; nameserver 198.51.100.1\nnameserver not-an-ip\nnameserver fe80::1%eth0\noptions edns0\n";

        let servers = parse_nameservers(content);

        assert_eq!(
            servers,
            vec![
                "192.0.2.53".parse::<IpAddr>().unwrap(),
                "2001:db8::53".parse::<IpAddr>().unwrap(),
                "fe80::1".parse::<IpAddr>().unwrap(),
            ]
        );
    }

    #[tokio::test]
    async fn test_reader_uses_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(b"nameserver 127.0.0.53\n").unwrap();
        temp_file.flush().unwrap();

        let reader = ResolvConfReader::with_path(temp_file.path());
        let servers = reader.nameservers().await.unwrap();

        assert_eq!(servers, vec!["127.0.0.53".parse::<IpAddr>().unwrap()]);
    }

    #[tokio::test]
    async fn test_missing_file_is_an_error() {
        let reader = ResolvConfReader::with_path("/nonexistent/resolv.conf");
        assert!(reader.nameservers().await.is_err());
    }
}
