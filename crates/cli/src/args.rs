use ferrous_q_domain::{RecordClass, RecordType};

/// What the positional arguments ask for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Targets {
    pub server: Option<String>,
    pub names: Vec<String>,
    pub record_type: RecordType,
    pub record_class: RecordClass,
}

/// Sorts positional tokens into server, type, class and names.
///
/// A token is tried as a type before a class, so `NS` and `ANY` are always
/// types. When no name is given the root zone's NS set is asked for, even if a
/// type was named.
pub fn parse_targets<S: AsRef<str>>(tokens: &[S]) -> Targets {
    let mut server = None;
    let mut names = Vec::new();
    let mut record_type = None;
    let mut record_class = None;

    for token in tokens {
        let token = token.as_ref();

        if let Some(host) = token.strip_prefix('@') {
            server = Some(host.to_string());
        } else if let Some(rtype) = RecordType::from_token(token) {
            record_type = Some(rtype);
        } else if let Some(rclass) = RecordClass::from_token(token) {
            record_class = Some(rclass);
        } else {
            names.push(token.to_string());
        }
    }

    if names.is_empty() {
        names.push(".".to_string());
        record_type = Some(RecordType::NS);
    }

    Targets {
        server,
        names,
        record_type: record_type.unwrap_or(RecordType::A),
        record_class: record_class.unwrap_or(RecordClass::IN),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_arguments_asks_for_root_ns() {
        let targets = parse_targets::<&str>(&[]);
        assert_eq!(targets.names, vec!["."]);
        assert_eq!(targets.record_type, RecordType::NS);
        assert_eq!(targets.record_class, RecordClass::IN);
        assert!(targets.server.is_none());
    }

    #[test]
    fn test_name_defaults_to_a_in() {
        let targets = parse_targets(&["example.com"]);
        assert_eq!(targets.names, vec!["example.com"]);
        assert_eq!(targets.record_type, RecordType::A);
        assert_eq!(targets.record_class, RecordClass::IN);
    }

    #[test]
    fn test_tokens_in_any_order() {
        let targets = parse_targets(&["mx", "example.org", "@192.0.2.53", "CH", "example.net"]);
        assert_eq!(targets.server.as_deref(), Some("192.0.2.53"));
        assert_eq!(targets.names, vec!["example.org", "example.net"]);
        assert_eq!(targets.record_type, RecordType::MX);
        assert_eq!(targets.record_class, RecordClass::CH);
    }

    #[test]
    fn test_type_wins_over_class() {
        let targets = parse_targets(&["ANY", "example.com"]);
        assert_eq!(targets.record_type, RecordType::ANY);
        assert_eq!(targets.record_class, RecordClass::IN);
    }

    #[test]
    fn test_numeric_type_token() {
        let targets = parse_targets(&["TYPE65", "example.com"]);
        assert_eq!(targets.record_type, RecordType::HTTPS);

        let targets = parse_targets(&["type65280", "example.com"]);
        assert_eq!(targets.record_type, RecordType::Unknown(65280));
    }

    #[test]
    fn test_later_type_overrides_earlier() {
        let targets = parse_targets(&["A", "AAAA", "example.com"]);
        assert_eq!(targets.record_type, RecordType::AAAA);
    }

    #[test]
    fn test_no_name_always_asks_for_root_ns() {
        let targets = parse_targets(&["SOA"]);
        assert_eq!(targets.names, vec!["."]);
        assert_eq!(targets.record_type, RecordType::NS);
    }

    #[test]
    fn test_server_with_port() {
        let targets = parse_targets(&["@[2001:db8::1]:5353", "example.com"]);
        assert_eq!(targets.server.as_deref(), Some("[2001:db8::1]:5353"));
    }
}
