use async_trait::async_trait;
use hickory_proto::op::{Message, MessageType, ResponseCode};
use hickory_proto::rr::rdata::{A, AAAA};
use hickory_proto::rr::{RData, Record, RecordType};
use rivet_dns_application::ports::DnsResolver;
use rivet_dns_domain::config::{ConfigError, LocalDnsRecord, ZoneConfig};
use rivet_dns_domain::{DnsRequest, DnsResponse, DomainError};
use std::collections::HashMap;
use std::net::IpAddr;
use tracing::{debug, info};

type ZoneKey = (String, RecordType);

/// Authoritative resolver over an in-memory zone.
///
/// Unknown names get an empty NOERROR answer rather than NXDOMAIN, so a
/// fallback chain moves on to the next resolver.
#[derive(Debug, Default)]
pub struct MasterResolver {
    records: HashMap<ZoneKey, Vec<(RData, u32)>>,
}

impl MasterResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(zone: &ZoneConfig) -> Result<Self, ConfigError> {
        let mut resolver = Self::new();
        for record in &zone.records {
            resolver.add_local_record(record, &zone.default_domain)?;
        }
        info!(records = resolver.len(), "Master zone loaded");
        Ok(resolver)
    }

    /// Adds an A or AAAA record; the type follows the address family.
    pub fn add_address(&mut self, name: &str, ip: IpAddr, ttl: u32) {
        let (record_type, rdata) = match ip {
            IpAddr::V4(v4) => (RecordType::A, RData::A(A(v4))),
            IpAddr::V6(v6) => (RecordType::AAAA, RData::AAAA(AAAA(v6))),
        };
        self.records
            .entry((normalize_domain(name), record_type))
            .or_default()
            .push((rdata, ttl));
    }

    fn add_local_record(
        &mut self,
        record: &LocalDnsRecord,
        default_domain: &Option<String>,
    ) -> Result<(), ConfigError> {
        let fqdn = record.fqdn(default_domain);
        let ip: IpAddr = record.ip.parse().map_err(|_| {
            ConfigError::Validation(format!("Invalid IP '{}' for {}", record.ip, fqdn))
        })?;

        match (record.record_type.to_ascii_uppercase().as_str(), ip) {
            ("A", IpAddr::V4(_)) | ("AAAA", IpAddr::V6(_)) => {
                self.add_address(&fqdn, ip, record.ttl_or_default());
                Ok(())
            }
            ("A", _) | ("AAAA", _) => Err(ConfigError::Validation(format!(
                "Record type {} does not match address {} for {}",
                record.record_type, record.ip, fqdn
            ))),
            (other, _) => Err(ConfigError::Validation(format!(
                "Unsupported local record type '{}' for {}",
                other, fqdn
            ))),
        }
    }

    pub fn len(&self) -> usize {
        self.records.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[async_trait]
impl DnsResolver for MasterResolver {
    async fn resolve(&self, request: &DnsRequest) -> Result<DnsResponse, DomainError> {
        let query = request.message();
        let mut message = Message::new(query.id(), MessageType::Response, query.op_code());
        message.set_authoritative(true);
        message.set_recursion_desired(query.recursion_desired());
        message.set_response_code(ResponseCode::NoError);

        for q in query.queries() {
            message.add_query(q.clone());

            let key = (normalize_domain(&q.name().to_utf8()), q.query_type());
            if let Some(entries) = self.records.get(&key) {
                for (rdata, ttl) in entries {
                    message.add_answer(Record::from_rdata(q.name().clone(), *ttl, rdata.clone()));
                }
            }
        }

        debug!(
            query = %request.summary(),
            answers = message.answers().len(),
            "Master zone lookup"
        );

        Ok(DnsResponse::new(message))
    }

    fn name(&self) -> &str {
        "master"
    }
}

fn normalize_domain(domain: &str) -> String {
    domain.trim_end_matches('.').to_ascii_lowercase()
}
