use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("Invalid domain name: {0}")]
    InvalidDomainName(String),

    #[error("Failure to parse IP address: {0}")]
    InvalidIpAddress(String),

    #[error("TSIG key data error: {0}")]
    InvalidTsigKey(String),

    #[error("TSIG signing failed: {0}")]
    TsigSigning(String),

    #[error("TSIG verification failed: {0}")]
    TsigVerification(String),

    #[error("Invalid DNS response: {0}")]
    InvalidDnsResponse(String),

    #[error("Id mismatch")]
    IdMismatch { expected: u16, received: u16 },

    #[error("Unknown record type: {0}")]
    UnknownRecordType(String),

    #[error("Pinned key error: {0}")]
    PinnedKey(String),

    #[error("Transfer failed: {0}")]
    TransferFailed(String),

    #[error("I/O error: {0}")]
    IoError(String),

    #[error("Transport timeout talking to {server}")]
    TransportTimeout { server: String },

    #[error("Transport connection refused by {server}")]
    TransportConnectionRefused { server: String },

    #[error("No {family} address found for {host}")]
    NoAddress { host: String, family: &'static str },

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl DomainError {
    /// Errors that end one exchange without touching the rest of the batch.
    pub fn is_transport_error(&self) -> bool {
        matches!(
            self,
            DomainError::IoError(_)
                | DomainError::TransportTimeout { .. }
                | DomainError::TransportConnectionRefused { .. }
                | DomainError::NoAddress { .. }
        )
    }
}
