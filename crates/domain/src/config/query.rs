use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct QueryConfig {
    #[serde(default = "default_port")]
    pub port: u16,

    /// Per-exchange timeout in milliseconds. `0` waits forever.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    #[serde(default)]
    pub fallback: bool,

    #[serde(default)]
    pub tcp: bool,

    #[serde(default = "default_true")]
    pub recursion_desired: bool,

    #[serde(default = "default_udp_payload_size")]
    pub udp_payload_size: u16,

    #[serde(default = "default_resolv_conf")]
    pub resolv_conf: String,
}

impl QueryConfig {
    pub fn timeout(&self) -> Option<Duration> {
        match self.timeout_ms {
            0 => None,
            ms => Some(Duration::from_millis(ms)),
        }
    }
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            timeout_ms: default_timeout_ms(),
            fallback: false,
            tcp: false,
            recursion_desired: true,
            udp_payload_size: default_udp_payload_size(),
            resolv_conf: default_resolv_conf(),
        }
    }
}

fn default_port() -> u16 {
    53
}

fn default_timeout_ms() -> u64 {
    5000
}

fn default_true() -> bool {
    true
}

fn default_udp_payload_size() -> u16 {
    4096
}

fn default_resolv_conf() -> String {
    "/etc/resolv.conf".to_string()
}
