//! AXFR/IXFR as a lazy stream of record batches.
//!
//! Each response message read from the server becomes one event; the first
//! error ends the stream. Transfer responses are not TSIG-checked.

use super::message_builder::MessageBuilder;
use super::response::ResponseParser;
use super::transport::tcp::{read_with_length_prefix, TcpTransport};
use super::transport::{create_transport, resolver, with_timeout};
use super::tsig::TsigKeyring;
use futures::stream::{self, BoxStream, StreamExt};
use ferrous_q_domain::{DnsQuery, DomainError, Endpoint, Net, RecordType, TransportKind};
use hickory_proto::op::ResponseCode;
use hickory_proto::rr::{RData, Record};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpStream;
use tracing::{debug, info};

pub type TransferEvent = Result<Vec<Record>, DomainError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TransferMode {
    Undecided,
    Full,
    /// Counts SOAs after the opening one; odd ones start a deletion block.
    Incremental { soas: usize },
}

/// Decides when a transfer is complete from the SOA records seen.
#[derive(Debug)]
pub(crate) struct TransferTracker {
    incremental_request: bool,
    newest: Option<u32>,
    seen: usize,
    mode: TransferMode,
    complete: bool,
}

impl TransferTracker {
    pub(crate) fn new(record_type: RecordType) -> Self {
        let incremental_request = record_type == RecordType::IXFR;
        Self {
            incremental_request,
            newest: None,
            seen: 0,
            mode: if incremental_request {
                TransferMode::Undecided
            } else {
                TransferMode::Full
            },
            complete: false,
        }
    }

    pub(crate) fn is_complete(&self) -> bool {
        self.complete
    }

    /// Feeds one record; `soa_serial` is set when the record is an SOA.
    pub(crate) fn observe(&mut self, soa_serial: Option<u32>) -> Result<(), DomainError> {
        if self.complete {
            return Ok(());
        }
        self.seen += 1;

        let Some(newest) = self.newest else {
            let serial = soa_serial.ok_or_else(|| {
                DomainError::TransferFailed("first record is not an SOA".into())
            })?;
            self.newest = Some(serial);
            return Ok(());
        };

        if self.mode == TransferMode::Undecided {
            match soa_serial {
                Some(serial) if serial != newest => {
                    self.mode = TransferMode::Incremental { soas: 1 };
                    return Ok(());
                }
                _ => self.mode = TransferMode::Full,
            }
        }

        match (self.mode, soa_serial) {
            (TransferMode::Incremental { soas }, Some(serial)) => {
                let soas = soas + 1;
                self.mode = TransferMode::Incremental { soas };
                if soas % 2 == 1 && serial == newest {
                    self.complete = true;
                }
            }
            (TransferMode::Full, Some(serial)) if serial == newest => {
                self.complete = true;
            }
            _ => {}
        }

        Ok(())
    }

    /// Called after each message. An IXFR answered by a lone SOA is done.
    pub(crate) fn end_of_message(&mut self) {
        if self.incremental_request && self.seen == 1 {
            self.complete = true;
        }
    }
}

fn soa_serial(record: &Record) -> Option<u32> {
    match record.data() {
        RData::SOA(soa) => Some(soa.serial()),
        _ => None,
    }
}

pub struct TransferClient {
    endpoint: Endpoint,
    timeout: Option<Duration>,
    keyring: Arc<TsigKeyring>,
}

impl TransferClient {
    pub fn new(endpoint: Endpoint, timeout: Option<Duration>, keyring: Arc<TsigKeyring>) -> Self {
        Self {
            endpoint,
            timeout,
            keyring,
        }
    }

    /// Starts a transfer. Nothing touches the network until the stream is
    /// polled. AXFR always goes over TCP; IXFR uses `net` as given.
    pub fn stream(&self, query: &DnsQuery, net: Net) -> BoxStream<'static, TransferEvent> {
        let id = MessageBuilder::new_id();
        let encoded = match MessageBuilder::build(query, id, &self.keyring) {
            Ok(encoded) => encoded,
            Err(e) => return stream::once(async move { Err(e) }).boxed(),
        };

        let net = if query.record_type == RecordType::AXFR {
            net.with_kind(TransportKind::Tcp)
        } else {
            net
        };

        info!(
            zone = %query.name,
            record_type = %query.record_type,
            net = %net,
            "Starting zone transfer"
        );

        let transfer = Transfer {
            request: encoded.bytes,
            id,
            endpoint: self.endpoint.clone(),
            net,
            timeout: self.timeout,
            connection: None,
            tracker: TransferTracker::new(query.record_type),
            finished: false,
        };

        stream::unfold(transfer, |mut transfer| async move {
            transfer.next_event().await.map(|event| (event, transfer))
        })
        .boxed()
    }
}

struct Transfer {
    request: Vec<u8>,
    id: u16,
    endpoint: Endpoint,
    net: Net,
    timeout: Option<Duration>,
    connection: Option<(TcpStream, SocketAddr)>,
    tracker: TransferTracker,
    finished: bool,
}

impl Transfer {
    async fn next_event(&mut self) -> Option<TransferEvent> {
        if self.finished {
            return None;
        }

        let event = if self.net.is_tcp() {
            self.read_tcp().await
        } else {
            self.read_udp().await
        };

        if event.is_err() || self.tracker.is_complete() || !self.net.is_tcp() {
            self.finished = true;
        }
        Some(event)
    }

    async fn read_udp(&mut self) -> TransferEvent {
        let transport = create_transport(&self.endpoint, self.net, self.timeout).await?;
        let response = transport.send(&self.request, self.timeout).await?;
        self.accept(response.bytes.to_vec())
    }

    async fn read_tcp(&mut self) -> TransferEvent {
        if self.connection.is_none() {
            let server =
                resolver::resolve_endpoint(&self.endpoint, self.net.family, self.timeout).await?;
            let stream = TcpTransport::new(server)
                .open(&self.request, self.timeout)
                .await?;
            self.connection = Some((stream, server));
        }
        let (stream, server) = self
            .connection
            .as_mut()
            .ok_or_else(|| DomainError::TransferFailed("no connection".into()))?;
        let server = *server;

        let bytes = with_timeout(self.timeout, server, read_with_length_prefix(stream))
            .await
            .map_err(|e| match e {
                DomainError::IoError(msg) => DomainError::TransferFailed(format!(
                    "connection closed before the end of the transfer: {}",
                    msg
                )),
                other => other,
            })?;

        debug!(server = %server, bytes_received = bytes.len(), "Transfer message received");
        self.accept(bytes)
    }

    fn accept(&mut self, bytes: Vec<u8>) -> TransferEvent {
        let response = ResponseParser::parse(bytes)?;

        if response.id() != self.id {
            return Err(DomainError::IdMismatch {
                expected: self.id,
                received: response.id(),
            });
        }

        let rcode = response.rcode();
        if rcode != ResponseCode::NoError {
            return Err(DomainError::TransferFailed(format!("server responded {}", rcode)));
        }

        let records = response.answers().to_vec();
        for record in &records {
            self.tracker.observe(soa_serial(record))?;
        }
        self.tracker.end_of_message();

        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn feed(tracker: &mut TransferTracker, serials: &[Option<u32>]) -> Result<(), DomainError> {
        for serial in serials {
            tracker.observe(*serial)?;
        }
        Ok(())
    }

    #[test]
    fn test_axfr_completes_on_repeated_soa() {
        let mut tracker = TransferTracker::new(RecordType::AXFR);
        feed(&mut tracker, &[Some(7), None, None]).unwrap();
        assert!(!tracker.is_complete());
        feed(&mut tracker, &[None, Some(7)]).unwrap();
        assert!(tracker.is_complete());
    }

    #[test]
    fn test_axfr_must_open_with_soa() {
        let mut tracker = TransferTracker::new(RecordType::AXFR);
        assert!(matches!(
            tracker.observe(None),
            Err(DomainError::TransferFailed(_))
        ));
    }

    #[test]
    fn test_ixfr_single_soa_is_up_to_date() {
        let mut tracker = TransferTracker::new(RecordType::IXFR);
        tracker.observe(Some(10)).unwrap();
        tracker.end_of_message();
        assert!(tracker.is_complete());
    }

    #[test]
    fn test_ixfr_incremental_sequence() {
        let mut tracker = TransferTracker::new(RecordType::IXFR);
        // newest 3; delete@1, add@2, delete@2, add@3, closing SOA 3
        feed(
            &mut tracker,
            &[Some(3), Some(1), None, Some(2), None, Some(2), None, Some(3), None],
        )
        .unwrap();
        tracker.end_of_message();
        assert!(!tracker.is_complete());

        tracker.observe(Some(3)).unwrap();
        assert!(tracker.is_complete());
    }

    #[test]
    fn test_ixfr_addition_soa_with_newest_serial_does_not_end_stream() {
        let mut tracker = TransferTracker::new(RecordType::IXFR);
        feed(&mut tracker, &[Some(2), Some(1), Some(2)]).unwrap();
        assert!(!tracker.is_complete());
    }

    #[test]
    fn test_ixfr_falls_back_to_full_form() {
        let mut tracker = TransferTracker::new(RecordType::IXFR);
        feed(&mut tracker, &[Some(5), None, None]).unwrap();
        tracker.end_of_message();
        assert!(!tracker.is_complete());
        tracker.observe(Some(5)).unwrap();
        assert!(tracker.is_complete());
    }
}
