//! One logical query, start to finish.
//!
//! The engine walks an explicit state machine: a query is `Sent`, its reply
//! `Received`, and a truncated reply may send it round again, first with an
//! EDNS0 buffer and then over TCP, before it ends `Done` or `Failed`.

use super::message_builder::MessageBuilder;
use super::response::{DnsResponse, ResponseParser};
use super::transport::create_transport;
use super::tsig::TsigKeyring;
use async_trait::async_trait;
use ferrous_q_domain::{DnsQuery, DomainError, Endpoint, Net, TransportKind};
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// Raw reply bytes and how long the round trip took.
#[derive(Debug, Clone)]
pub struct Exchanged {
    pub bytes: Vec<u8>,
    pub rtt: Duration,
}

/// One request/response round trip.
#[async_trait]
pub trait Exchanger: Send + Sync {
    async fn exchange(&self, request: &[u8], net: Net) -> Result<Exchanged, DomainError>;
}

/// Talks to a real server over UDP or TCP.
pub struct NetworkExchanger {
    endpoint: Endpoint,
    timeout: Option<Duration>,
}

impl NetworkExchanger {
    pub fn new(endpoint: Endpoint, timeout: Option<Duration>) -> Self {
        Self { endpoint, timeout }
    }
}

#[async_trait]
impl Exchanger for NetworkExchanger {
    async fn exchange(&self, request: &[u8], net: Net) -> Result<Exchanged, DomainError> {
        let transport = create_transport(&self.endpoint, net, self.timeout).await?;

        let start = Instant::now();
        let response = transport.send(request, self.timeout).await?;
        let rtt = start.elapsed();

        debug!(
            server = %response.server,
            protocol = response.protocol_used,
            rtt_us = rtt.as_micros() as u64,
            "Exchange complete"
        );

        Ok(Exchanged {
            bytes: response.bytes.to_vec(),
            rtt,
        })
    }
}

/// Informational lines emitted while walking the fallback ladder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Notice {
    RetryingWithEdns(u16),
    RetryingWithTcp,
    Truncated,
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Notice::RetryingWithEdns(size) => {
                write!(f, ";; Truncated, trying {} bytes bufsize", size)
            }
            Notice::RetryingWithTcp => write!(f, ";; Truncated, trying TCP"),
            Notice::Truncated => write!(f, ";; Truncated"),
        }
    }
}

#[derive(Debug)]
pub struct ExchangeOutcome {
    pub response: DnsResponse,
    /// Transport of the last attempt.
    pub net: Net,
    /// Round trip of the last attempt.
    pub rtt: Duration,
    pub notices: Vec<Notice>,
}

#[derive(Debug)]
pub struct ExchangeFailure {
    pub error: DomainError,
    pub notices: Vec<Notice>,
}

impl ExchangeFailure {
    pub fn is_id_mismatch(&self) -> bool {
        matches!(self.error, DomainError::IdMismatch { .. })
    }
}

enum State {
    Sent {
        net: Net,
    },
    Received {
        response: DnsResponse,
        net: Net,
        rtt: Duration,
    },
    Done {
        response: DnsResponse,
        net: Net,
        rtt: Duration,
    },
    Failed(DomainError),
}

pub struct ExchangeEngine {
    exchanger: Arc<dyn Exchanger>,
    keyring: Arc<TsigKeyring>,
    fallback: bool,
    udp_payload_size: u16,
}

impl ExchangeEngine {
    pub fn new(
        exchanger: Arc<dyn Exchanger>,
        keyring: Arc<TsigKeyring>,
        fallback: bool,
        udp_payload_size: u16,
    ) -> Self {
        Self {
            exchanger,
            keyring,
            fallback,
            udp_payload_size,
        }
    }

    /// Runs `query` to completion. One wire ID is used for every attempt;
    /// a signed query is re-signed each time it is re-issued.
    pub async fn run(&self, query: DnsQuery, net: Net) -> Result<ExchangeOutcome, ExchangeFailure> {
        self.run_with_id(query, net, MessageBuilder::new_id()).await
    }

    /// As [`run`](Self::run), with a caller-chosen wire ID.
    pub async fn run_with_id(
        &self,
        mut query: DnsQuery,
        net: Net,
        id: u16,
    ) -> Result<ExchangeOutcome, ExchangeFailure> {
        let mut notices = Vec::new();
        let mut state = State::Sent { net };

        loop {
            state = match state {
                State::Sent { net } => match self.attempt(&query, id, net).await {
                    Ok((response, rtt)) => State::Received { response, net, rtt },
                    Err(error) => State::Failed(error),
                },

                State::Received { response, net, rtt } => {
                    if !response.truncated() {
                        State::Done { response, net, rtt }
                    } else if self.fallback && !net.is_tcp() {
                        if query.attach_edns(self.udp_payload_size) {
                            notices.push(Notice::RetryingWithEdns(self.udp_payload_size));
                            State::Sent { net }
                        } else {
                            notices.push(Notice::RetryingWithTcp);
                            State::Sent {
                                net: net.with_kind(TransportKind::Tcp),
                            }
                        }
                    } else {
                        notices.push(Notice::Truncated);
                        State::Done { response, net, rtt }
                    }
                }

                State::Done { response, net, rtt } => {
                    return Ok(ExchangeOutcome {
                        response,
                        net,
                        rtt,
                        notices,
                    });
                }

                State::Failed(error) => {
                    return Err(ExchangeFailure { error, notices });
                }
            };
        }
    }

    async fn attempt(
        &self,
        query: &DnsQuery,
        id: u16,
        net: Net,
    ) -> Result<(DnsResponse, Duration), DomainError> {
        let encoded = MessageBuilder::build(query, id, &self.keyring)?;

        debug!(
            name = %query.name,
            record_type = %query.record_type,
            net = %net,
            id = id,
            edns = query.has_edns(),
            "Sending query"
        );

        let exchanged = self.exchanger.exchange(&encoded.bytes, net).await?;
        let response = ResponseParser::parse(exchanged.bytes)?;

        if response.id() != id {
            warn!(expected = id, received = response.id(), "Response ID mismatch");
            return Err(DomainError::IdMismatch {
                expected: id,
                received: response.id(),
            });
        }

        if let (Some(mac), Some(key)) = (&encoded.tsig_mac, &query.tsig) {
            let signer = self.keyring.signer(&key.name).ok_or_else(|| {
                DomainError::TsigVerification(format!("no secret for key {}", key.name))
            })?;
            signer.verify(&response, mac)?;
        }

        Ok((response, exchanged.rtt))
    }
}
