//! Hook for NSEC3 denial-of-existence checks.
//!
//! Only the scan is done: proving non-existence from the hashed chain is
//! not implemented, and callers are told so rather than shown a verdict.

use crate::dns::response::DnsResponse;
use hickory_proto::rr::RecordType;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DenialCheck {
    /// The response carries no NSEC3 records.
    NoNsec3,
    /// NSEC3 records are present but proving denial is not implemented.
    NotImplemented { records: usize },
}

pub fn check_denial(response: &DnsResponse) -> DenialCheck {
    let records = [response.answers(), response.authority(), response.additional()]
        .into_iter()
        .flatten()
        .filter(|r| r.record_type() == RecordType::NSEC3)
        .count();

    if records == 0 {
        DenialCheck::NoNsec3
    } else {
        tracing::debug!(records, "NSEC3 denial check requested but not implemented");
        DenialCheck::NotImplemented { records }
    }
}
