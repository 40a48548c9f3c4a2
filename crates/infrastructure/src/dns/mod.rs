pub mod dnssec;
pub mod exchange;
pub mod format;
pub mod message_builder;
pub mod redact;
pub mod response;
pub mod transfer;
pub mod transport;
pub mod tsig;

pub use exchange::{
    ExchangeEngine, ExchangeFailure, ExchangeOutcome, Exchanger, NetworkExchanger, Notice,
};
pub use format::{PresentedMessage, PresentedRecord};
pub use message_builder::{EncodedQuery, MessageBuilder};
pub use redact::redact_record;
pub use response::{DnsResponse, ResponseParser};
pub use transfer::{TransferClient, TransferEvent};
pub use tsig::{TsigKeyring, TsigSigner};
