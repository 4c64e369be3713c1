use serde::{Deserialize, Serialize};

/// Authoritative records served by the master resolver.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ZoneConfig {
    /// Domain appended to records that do not name their own
    #[serde(default)]
    pub default_domain: Option<String>,

    #[serde(default)]
    pub records: Vec<LocalDnsRecord>,
}

impl ZoneConfig {
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LocalDnsRecord {
    pub hostname: String,

    #[serde(default)]
    pub domain: Option<String>,

    pub ip: String,

    pub record_type: String,

    #[serde(default)]
    pub ttl: Option<u32>,
}

impl LocalDnsRecord {
    pub fn fqdn(&self, default_domain: &Option<String>) -> String {
        if let Some(ref domain) = self.domain {
            format!("{}.{}", self.hostname, domain)
        } else if let Some(ref default) = default_domain {
            format!("{}.{}", self.hostname, default)
        } else {
            self.hostname.clone()
        }
    }

    pub fn ttl_or_default(&self) -> u32 {
        self.ttl.unwrap_or(300)
    }
}
