use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use crate::dns_protocol::fqdn;
use crate::errors::DomainError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TsigAlgorithm {
    #[default]
    HmacMd5,
    HmacSha1,
    HmacSha256,
}

impl TsigAlgorithm {
    pub fn as_str(&self) -> &'static str {
        match self {
            TsigAlgorithm::HmacMd5 => "hmac-md5",
            TsigAlgorithm::HmacSha1 => "hmac-sha1",
            TsigAlgorithm::HmacSha256 => "hmac-sha256",
        }
    }
}

impl fmt::Display for TsigAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TsigAlgorithm {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "hmac-md5" => Ok(TsigAlgorithm::HmacMd5),
            "hmac-sha1" => Ok(TsigAlgorithm::HmacSha1),
            "hmac-sha256" => Ok(TsigAlgorithm::HmacSha256),
            other => Err(DomainError::InvalidTsigKey(format!(
                "unknown algorithm '{}'",
                other
            ))),
        }
    }
}

/// Shared-secret key named on the command line as `[algorithm:]name:secret`.
///
/// The secret stays in its base64 text form here; decoding it is the
/// signer's job.
#[derive(Clone, PartialEq, Eq)]
pub struct TsigKey {
    pub algorithm: TsigAlgorithm,
    pub name: Arc<str>,
    pub secret: Arc<str>,
}

impl TsigKey {
    pub fn parse(spec: &str) -> Result<Self, DomainError> {
        let parts: Vec<&str> = spec.splitn(3, ':').collect();

        let (algorithm, name, secret) = match parts.as_slice() {
            [name, secret] => (TsigAlgorithm::HmacMd5, *name, *secret),
            [algorithm, name, secret] => (algorithm.parse()?, *name, *secret),
            _ => {
                return Err(DomainError::InvalidTsigKey(
                    "expected [hmac:]name:secret".to_string(),
                ))
            }
        };

        if name.is_empty() {
            return Err(DomainError::InvalidTsigKey("empty key name".to_string()));
        }
        if secret.is_empty() {
            return Err(DomainError::InvalidTsigKey("empty secret".to_string()));
        }

        Ok(Self {
            algorithm,
            name: fqdn(&name.to_ascii_lowercase()).into(),
            secret: secret.into(),
        })
    }
}

impl fmt::Debug for TsigKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TsigKey")
            .field("algorithm", &self.algorithm)
            .field("name", &self.name)
            .field("secret", &"<redacted>")
            .finish()
    }
}

impl FromStr for TsigKey {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
