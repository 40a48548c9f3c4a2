//! dig-like text rendering of messages and records.

use super::redact::redact_record;
use super::response::DnsResponse;
use ferrous_q_domain::{Endpoint, Net, RecordClass, RecordType};
use hickory_proto::op::{Edns, Header, MessageType, Query, ResponseCode};
use hickory_proto::rr::rdata::opt::{EdnsCode, EdnsOption};
use hickory_proto::rr::Record;
use std::fmt;
use std::time::Duration;

/// One resource record in presentation form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PresentedRecord {
    pub owner: String,
    pub ttl: u32,
    pub class: String,
    pub record_type: RecordType,
    pub rdata: String,
}

impl PresentedRecord {
    pub fn from_record(record: &Record) -> Self {
        Self {
            owner: record.name().to_string(),
            ttl: record.ttl(),
            class: record.dns_class().to_string(),
            record_type: RecordType::from_u16(u16::from(record.record_type())),
            rdata: record.data().to_string(),
        }
    }
}

impl fmt::Display for PresentedRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}\t{}\t{}\t{}\t{}",
            self.owner, self.ttl, self.class, self.record_type, self.rdata
        )
    }
}

#[derive(Debug, Clone)]
pub struct PresentedQuestion {
    pub name: String,
    pub record_type: RecordType,
    pub record_class: RecordClass,
}

impl PresentedQuestion {
    fn from_query(query: &Query) -> Self {
        Self {
            name: query.name().to_string(),
            record_type: RecordType::from_u16(u16::from(query.query_type())),
            record_class: RecordClass::from_u16(u16::from(query.query_class())),
        }
    }
}

impl fmt::Display for PresentedQuestion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, ";{}\t{}\t {}", self.name, self.record_class, self.record_type)
    }
}

/// A whole message ready to print.
#[derive(Debug, Clone)]
pub struct PresentedMessage {
    pub header: Header,
    pub rcode: ResponseCode,
    pub edns: Option<Edns>,
    pub question: Vec<PresentedQuestion>,
    pub answer: Vec<PresentedRecord>,
    pub authority: Vec<PresentedRecord>,
    pub additional: Vec<PresentedRecord>,
}

impl PresentedMessage {
    pub fn from_response(response: &DnsResponse) -> Self {
        Self::present_with(response, PresentedRecord::from_record)
    }

    /// As [`from_response`](Self::from_response), with DNSSEC payloads
    /// shortened in every section.
    pub fn redacted(response: &DnsResponse) -> Self {
        Self::present_with(response, redact_record)
    }

    fn present_with(response: &DnsResponse, record: fn(&Record) -> PresentedRecord) -> Self {
        let present = |records: &[Record]| -> Vec<PresentedRecord> {
            records.iter().map(record).collect()
        };

        Self {
            header: *response.message.header(),
            rcode: response.rcode(),
            edns: response.edns().cloned(),
            question: response
                .message
                .queries()
                .iter()
                .map(PresentedQuestion::from_query)
                .collect(),
            answer: present(response.answers()),
            authority: present(response.authority()),
            additional: present(response.additional()),
        }
    }

    /// Flag mnemonics in the order dig prints them.
    fn flag_names(&self) -> Vec<&'static str> {
        let header = &self.header;
        [
            (header.message_type() == MessageType::Response, "qr"),
            (header.authoritative(), "aa"),
            (header.truncated(), "tc"),
            (header.recursion_desired(), "rd"),
            (header.recursion_available(), "ra"),
            (header.authentic_data(), "ad"),
            (header.checking_disabled(), "cd"),
        ]
        .into_iter()
        .filter_map(|(set, name)| set.then_some(name))
        .collect()
    }
}

impl fmt::Display for PresentedMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            ";; opcode: {}, status: {}, id: {}",
            self.header.op_code(),
            self.rcode,
            self.header.id()
        )?;
        writeln!(
            f,
            ";; flags: {}; QUERY: {}, ANSWER: {}, AUTHORITY: {}, ADDITIONAL: {}",
            self.flag_names().join(" "),
            self.header.query_count(),
            self.header.answer_count(),
            self.header.name_server_count(),
            self.header.additional_count()
        )?;

        if let Some(edns) = &self.edns {
            writeln!(f)?;
            writeln!(f, ";; OPT PSEUDOSECTION:")?;
            write_opt(f, edns)?;
        }

        if !self.question.is_empty() {
            writeln!(f)?;
            writeln!(f, ";; QUESTION SECTION:")?;
            for q in &self.question {
                writeln!(f, "{}", q)?;
            }
        }

        write_section(f, "ANSWER", &self.answer)?;
        write_section(f, "AUTHORITY", &self.authority)?;
        write_section(f, "ADDITIONAL", &self.additional)
    }
}

fn write_section(
    f: &mut fmt::Formatter<'_>,
    title: &str,
    records: &[PresentedRecord],
) -> fmt::Result {
    if records.is_empty() {
        return Ok(());
    }
    writeln!(f)?;
    writeln!(f, ";; {} SECTION:", title)?;
    for record in records {
        writeln!(f, "{}", record)?;
    }
    Ok(())
}

fn write_opt(f: &mut fmt::Formatter<'_>, edns: &Edns) -> fmt::Result {
    let flags = if edns.flags().dnssec_ok { " do" } else { "" };
    writeln!(
        f,
        "; EDNS: version {}; flags:{}; udp: {}",
        edns.version(),
        flags,
        edns.max_payload()
    )?;

    if let Some(EdnsOption::Unknown(_, nsid)) = edns.option(EdnsCode::NSID) {
        let hex: String = nsid.iter().map(|b| format!("{:02x}", b)).collect();
        let text: String = nsid
            .iter()
            .map(|&b| if b.is_ascii_graphic() || b == b' ' { b as char } else { '.' })
            .collect();
        writeln!(f, "; NSID: {} ({})", hex, text)?;
    }

    if let Some(EdnsOption::Subnet(subnet)) = edns.option(EdnsCode::Subnet) {
        writeln!(
            f,
            "; CLIENT-SUBNET: {}/{}/{}",
            subnet.addr(),
            subnet.source_prefix(),
            subnet.scope_prefix()
        )?;
    }

    Ok(())
}

/// Trailing statistics line printed after each answer.
pub fn query_time_line(rtt: Duration, server: &Endpoint, net: Net, size: usize) -> String {
    format!(
        ";; query time: {:03} µs, server: {}({}), size: {} bytes",
        rtt.as_micros(),
        server,
        net,
        size
    )
}

/// Line printed for `--question` before the query goes out.
pub fn question_size_line(size: usize) -> String {
    format!(";; size: {} bytes", size)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dns::response::ResponseParser;
    use ferrous_q_domain::TransportKind;
    use hickory_proto::op::{Message, OpCode};
    use hickory_proto::rr::rdata::opt::ClientSubnet;
    use hickory_proto::rr::rdata::A;
    use hickory_proto::rr::{Name, RData, RecordType as WireType};
    use std::net::{IpAddr, Ipv4Addr};
    use std::str::FromStr;

    fn response_bytes() -> Vec<u8> {
        let name = Name::from_str("example.com.").unwrap();
        let mut message = Message::new(0x1234, MessageType::Response, OpCode::Query);
        message
            .set_recursion_desired(true)
            .set_recursion_available(true)
            .add_query(Query::query(name.clone(), WireType::A))
            .add_answer(Record::from_rdata(
                name,
                300,
                RData::A(A(Ipv4Addr::new(192, 0, 2, 1))),
            ));

        let mut edns = Edns::new();
        edns.set_max_payload(4096).set_dnssec_ok(true);
        edns.options_mut()
            .insert(EdnsOption::Unknown(u16::from(EdnsCode::NSID), b"ns".to_vec()));
        edns.options_mut().insert(EdnsOption::Subnet(ClientSubnet::new(
            IpAddr::V4(Ipv4Addr::new(192, 0, 2, 0)),
            24,
            16,
        )));
        message.set_edns(edns);
        message.to_vec().unwrap()
    }

    #[test]
    fn test_message_rendering() {
        let response = ResponseParser::parse(response_bytes()).unwrap();
        let text = PresentedMessage::from_response(&response).to_string();

        assert!(text.starts_with(";; opcode: QUERY, status: No Error, id: 4660\n"));
        assert!(text.contains(";; flags: qr rd ra; QUERY: 1, ANSWER: 1, AUTHORITY: 0, ADDITIONAL: 1"));
        assert!(text.contains("; EDNS: version 0; flags: do; udp: 4096"));
        assert!(text.contains("; NSID: 6e73 (ns)"));
        assert!(text.contains("; CLIENT-SUBNET: 192.0.2.0/24/16"));
        assert!(text.contains(";; QUESTION SECTION:\n;example.com.\tIN\t A"));
        assert!(text.contains(";; ANSWER SECTION:\nexample.com.\t300\tIN\tA\t192.0.2.1"));
        assert!(!text.contains("AUTHORITY SECTION"));
    }

    #[test]
    fn test_query_time_line() {
        let server = Endpoint::parse("192.0.2.53", 53);
        let line = query_time_line(
            Duration::from_micros(42),
            &server,
            Net::new(TransportKind::Udp, Default::default()),
            512,
        );
        assert_eq!(line, ";; query time: 042 µs, server: 192.0.2.53:53(udp), size: 512 bytes");
    }

    #[test]
    fn test_record_line_is_tab_separated() {
        let record = PresentedRecord {
            owner: "example.com.".into(),
            ttl: 60,
            class: "IN".into(),
            record_type: RecordType::A,
            rdata: IpAddr::V4(Ipv4Addr::LOCALHOST).to_string(),
        };
        assert_eq!(record.to_string(), "example.com.\t60\tIN\tA\t127.0.0.1");
    }
}
