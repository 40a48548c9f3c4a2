use crate::args::Targets;
use crate::output::Report;
use anyhow::Context;
use ferrous_q_domain::{DnsQuery, EdnsOptions, Endpoint, HeaderFlags, Net, RecordType, TsigKey};
use ferrous_q_infrastructure::dns::dnssec::{
    check_denial, DenialCheck, KeyReference, NetworkKeyResolver, SignatureChecker,
};
use ferrous_q_infrastructure::dns::format::{query_time_line, question_size_line};
use ferrous_q_infrastructure::dns::{
    redact_record, ExchangeEngine, Exchanger, MessageBuilder, NetworkExchanger,
    PresentedMessage, PresentedRecord, ResponseParser, TransferClient, TsigKeyring,
};
use futures::StreamExt;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinSet;
use tracing::{debug, error, info};

/// Everything decided before the first query goes out.
pub struct Settings {
    pub targets: Targets,
    pub endpoint: Endpoint,
    pub net: Net,
    pub flags: HeaderFlags,
    pub edns: Option<EdnsOptions>,
    pub tsig: Option<Arc<TsigKey>>,
    pub ixfr_serial: Option<u32>,
    pub key: KeyReference,
    pub timeout: Option<Duration>,
    pub fallback: bool,
    pub udp_payload_size: u16,
    pub show_question: bool,
    pub check: bool,
    pub short: bool,
}

impl Settings {
    fn query_for(&self, name: &str) -> DnsQuery {
        let ixfr_serial = match self.targets.record_type {
            RecordType::IXFR => self.ixfr_serial,
            _ => None,
        };

        DnsQuery::new(name, self.targets.record_type)
            .with_class(self.targets.record_class)
            .with_flags(self.flags)
            .with_edns(self.edns.clone())
            .with_tsig(self.tsig.clone())
            .with_ixfr_serial(ixfr_serial)
    }
}

/// Shared, read-only state for every query in the batch.
struct Runner {
    settings: Settings,
    engine: ExchangeEngine,
    checker: SignatureChecker,
    transfers: TransferClient,
}

/// Sends every query in the batch and returns once all of them finished.
///
/// Fails only on input that is rejected before anything is sent.
pub async fn run(settings: Settings) -> anyhow::Result<()> {
    let keyring = Arc::new(match &settings.tsig {
        Some(key) => TsigKeyring::with_key(key)?,
        None => TsigKeyring::new(),
    });

    let exchanger: Arc<dyn Exchanger> = Arc::new(NetworkExchanger::new(
        settings.endpoint.clone(),
        settings.timeout,
    ));
    let engine = ExchangeEngine::new(
        exchanger.clone(),
        keyring.clone(),
        settings.fallback,
        settings.udp_payload_size,
    );
    let resolver = Arc::new(NetworkKeyResolver::new(
        exchanger,
        settings.net,
        EdnsOptions::DEFAULT_PAYLOAD,
    ));
    let checker = SignatureChecker::new(settings.key.clone(), resolver);
    let transfers = TransferClient::new(settings.endpoint.clone(), settings.timeout, keyring);

    let runner = Arc::new(Runner {
        settings,
        engine,
        checker,
        transfers,
    });

    let mut tasks = JoinSet::new();

    for name in &runner.settings.targets.names {
        let query = runner.settings.query_for(name);
        let id = MessageBuilder::new_id();

        if runner.settings.show_question {
            echo_question(&query, id)?.flush();
        }

        if query.is_zone_transfer() {
            runner.transfer(&query).await;
            continue;
        }

        let runner = runner.clone();
        tasks.spawn(async move { runner.exchange(query, id).await });
    }

    debug!(pending = tasks.len(), "All queries dispatched");

    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok(report) => report.flush(),
            Err(e) => error!(error = %e, "Query task failed"),
        }
    }

    Ok(())
}

/// The outgoing message as it would be sent, before any TSIG is added.
fn echo_question(query: &DnsQuery, id: u16) -> anyhow::Result<Report> {
    let bytes = MessageBuilder::build_unsigned(query, id)?;
    let size = bytes.len();
    let parsed = ResponseParser::parse(bytes).context("encoded query does not parse back")?;

    let mut report = Report::default();
    report.text(PresentedMessage::from_response(&parsed));
    report.line("");
    report.line(question_size_line(size));
    report.line("");
    Ok(report)
}

impl Runner {
    async fn exchange(&self, query: DnsQuery, id: u16) -> Report {
        let mut report = Report::default();

        let outcome = match self.engine.run_with_id(query, self.settings.net, id).await {
            Ok(outcome) => outcome,
            Err(failure) => {
                for notice in &failure.notices {
                    report.line(notice);
                }
                if failure.is_id_mismatch() {
                    report.error_line(&failure.error);
                } else {
                    report.line(format_args!(";; {}", failure.error));
                }
                return report;
            }
        };

        for notice in &outcome.notices {
            report.line(notice);
        }

        if self.settings.check {
            for verdict in self.checker.check(&outcome.response).await {
                report.line(verdict);
            }
            match check_denial(&outcome.response) {
                DenialCheck::NoNsec3 => {}
                DenialCheck::NotImplemented { records } => {
                    info!(records, "NSEC3 denial of existence is not verified");
                }
            }
        }

        let presented = if self.settings.short {
            PresentedMessage::redacted(&outcome.response)
        } else {
            PresentedMessage::from_response(&outcome.response)
        };

        report.text(presented);
        report.line("");
        report.line(query_time_line(
            outcome.rtt,
            &self.settings.endpoint,
            outcome.net,
            outcome.response.size(),
        ));
        report
    }

    /// Prints each batch as it arrives; stops at the first error.
    async fn transfer(&self, query: &DnsQuery) {
        let mut stream = self.transfers.stream(query, self.settings.net);

        while let Some(event) = stream.next().await {
            match event {
                Ok(records) => {
                    let mut report = Report::default();
                    for record in &records {
                        if self.settings.short {
                            report.line(redact_record(record));
                        } else {
                            report.line(PresentedRecord::from_record(record));
                        }
                    }
                    report.flush();
                }
                Err(e) => {
                    eprintln!("Failure to read XFR: {}", e);
                    return;
                }
            }
        }
    }
}
