use ferrous_q_domain::DomainError;
use hickory_proto::op::{Edns, Message, MessageSignature, ResponseCode};
use hickory_proto::rr::Record;
use tracing::debug;

/// A parsed response, keeping the raw bytes alongside hickory's view.
#[derive(Debug, Clone)]
pub struct DnsResponse {
    pub message: Message,
    /// True when the last additional record is a TSIG.
    pub signed: bool,
    pub bytes: Vec<u8>,
}

impl DnsResponse {
    pub fn id(&self) -> u16 {
        self.message.id()
    }

    pub fn truncated(&self) -> bool {
        self.message.truncated()
    }

    /// Full RCODE, including the upper bits carried in OPT.
    pub fn rcode(&self) -> ResponseCode {
        self.message.response_code()
    }

    pub fn edns(&self) -> Option<&Edns> {
        self.message.extensions().as_ref()
    }

    pub fn size(&self) -> usize {
        self.bytes.len()
    }

    pub fn answers(&self) -> &[Record] {
        self.message.answers()
    }

    pub fn authority(&self) -> &[Record] {
        self.message.name_servers()
    }

    pub fn additional(&self) -> &[Record] {
        self.message.additionals()
    }
}

pub struct ResponseParser;

impl ResponseParser {
    pub fn parse(response_bytes: Vec<u8>) -> Result<DnsResponse, DomainError> {
        let message = Message::from_vec(&response_bytes).map_err(|e| {
            DomainError::InvalidDnsResponse(format!("Failed to parse DNS response: {}", e))
        })?;

        let signed = matches!(message.signature(), MessageSignature::Tsig(_));

        debug!(
            id = message.id(),
            rcode = %message.response_code(),
            truncated = message.truncated(),
            answers = message.answers().len(),
            edns = message.extensions().is_some(),
            "DNS response parsed"
        );

        Ok(DnsResponse {
            message,
            signed,
            bytes: response_bytes,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hickory_proto::op::{MessageType, OpCode};

    fn response_with_edns(rcode: ResponseCode) -> Vec<u8> {
        let mut message = Message::new(9, MessageType::Response, OpCode::Query);
        message.set_response_code(rcode);
        let mut edns = Edns::new();
        edns.set_max_payload(1232).set_dnssec_ok(true);
        message.set_edns(edns);
        message.to_vec().unwrap()
    }

    #[test]
    fn test_opt_is_read_from_extensions() {
        let response = ResponseParser::parse(response_with_edns(ResponseCode::NoError)).unwrap();

        let edns = response.edns().unwrap();
        assert_eq!(edns.max_payload(), 1232);
        assert!(edns.flags().dnssec_ok);
        assert!(response.additional().is_empty());
        assert!(!response.signed);
    }

    #[test]
    fn test_extended_rcode_is_merged() {
        let response = ResponseParser::parse(response_with_edns(ResponseCode::BADCOOKIE)).unwrap();

        assert_eq!(response.rcode(), ResponseCode::BADCOOKIE);
    }

    #[test]
    fn test_garbage_is_an_error() {
        assert!(matches!(
            ResponseParser::parse(vec![0x12, 0x34, 0x81]),
            Err(DomainError::InvalidDnsResponse(_))
        ));
    }
}
