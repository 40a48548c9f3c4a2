//! Pinned DNSKEY loaded from a zone-file fragment.

use super::types::DnskeyRecord;
use base64::{engine::general_purpose::STANDARD, Engine};
use ferrous_q_domain::{DomainError, RecordClass};
use std::path::Path;
use std::sync::Arc;
use tracing::info;

pub async fn load_pinned_key(path: &Path) -> Result<Arc<DnskeyRecord>, DomainError> {
    let text = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| DomainError::PinnedKey(format!("{}: {}", path.display(), e)))?;

    let key = parse_dnskey(&text)?;

    info!(
        path = %path.display(),
        owner = %key.owner,
        key_tag = key.calculate_key_tag(),
        "Pinned DNSKEY loaded"
    );

    Ok(Arc::new(key))
}

/// Parses the first DNSKEY record in `text`:
/// `owner [ttl] [class] DNSKEY flags protocol algorithm base64...`.
pub fn parse_dnskey(text: &str) -> Result<DnskeyRecord, DomainError> {
    let fail = |msg: &str| DomainError::PinnedKey(msg.to_string());

    let record = first_logical_record(text).ok_or_else(|| fail("no DNSKEY record found"))?;
    let mut fields = record.iter().map(String::as_str);

    let owner = fields.next().ok_or_else(|| fail("missing owner name"))?;

    let mut token = fields.next().ok_or_else(|| fail("missing record type"))?;
    // TTL and class are both optional and may come in either order.
    for _ in 0..2 {
        if token.parse::<u32>().is_ok() || token.parse::<RecordClass>().is_ok() {
            token = fields.next().ok_or_else(|| fail("missing record type"))?;
        }
    }
    if !token.eq_ignore_ascii_case("DNSKEY") {
        return Err(DomainError::PinnedKey(format!(
            "expected a DNSKEY record, found {}",
            token
        )));
    }

    let flags = fields
        .next()
        .and_then(|f| f.parse::<u16>().ok())
        .ok_or_else(|| fail("invalid DNSKEY flags"))?;
    let protocol = fields
        .next()
        .and_then(|p| p.parse::<u8>().ok())
        .ok_or_else(|| fail("invalid DNSKEY protocol"))?;
    let algorithm = fields
        .next()
        .and_then(algorithm_number)
        .ok_or_else(|| fail("invalid DNSKEY algorithm"))?;

    let encoded: String = fields.collect();
    if encoded.is_empty() {
        return Err(fail("missing public key"));
    }
    let public_key = STANDARD
        .decode(encoded.as_bytes())
        .map_err(|e| DomainError::PinnedKey(format!("bad base64 public key: {}", e)))?;

    Ok(DnskeyRecord::new(owner, flags, protocol, algorithm, public_key))
}

fn algorithm_number(token: &str) -> Option<u8> {
    if let Ok(n) = token.parse::<u8>() {
        return Some(n);
    }
    let n = match token.to_ascii_uppercase().as_str() {
        "RSAMD5" => 1,
        "DH" => 2,
        "DSA" => 3,
        "RSASHA1" => 5,
        "DSA-NSEC3-SHA1" => 6,
        "RSASHA1-NSEC3-SHA1" => 7,
        "RSASHA256" => 8,
        "RSASHA512" => 10,
        "ECC-GOST" => 12,
        "ECDSAP256SHA256" => 13,
        "ECDSAP384SHA384" => 14,
        "ED25519" => 15,
        "ED448" => 16,
        _ => return None,
    };
    Some(n)
}

/// Fields of the first record, with comments dropped and parentheses
/// joining continuation lines.
fn first_logical_record(text: &str) -> Option<Vec<String>> {
    let mut fields = Vec::new();
    let mut depth = 0usize;

    for line in text.lines() {
        let line = line.split(';').next().unwrap_or("");

        for raw in line.split_whitespace() {
            let mut token = String::with_capacity(raw.len());
            for c in raw.chars() {
                match c {
                    '(' => depth += 1,
                    ')' => depth = depth.saturating_sub(1),
                    c => token.push(c),
                }
            }
            if !token.is_empty() {
                fields.push(token);
            }
        }

        if depth == 0 && !fields.is_empty() {
            return Some(fields);
        }
    }

    (!fields.is_empty()).then_some(fields)
}
