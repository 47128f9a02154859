use crate::dns_message::ResponseStatus;
use crate::dns_record::{RecordData, RecordType, ResourceRecord};
use crate::domain_name::DomainName;
use crate::errors::DomainError;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;
use std::time::Duration;

pub const DELEGATION_QUERY_LABEL: &str = "AuthorityServers";

/// Which server a lookup talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NameserverChoice {
    /// Iterative resolution starting at the root hints.
    #[default]
    Default,

    /// One server from the configured recursive pool.
    RandomFromPool,

    /// This server only.
    Address(SocketAddr),
}

impl FromStr for NameserverChoice {
    type Err = DomainError;

    /// Accepts `default`, `random`, `IP` (port 53) or `IP:PORT`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "default" | "" => return Ok(Self::Default),
            "random" => return Ok(Self::RandomFromPool),
            _ => {}
        }
        if let Ok(addr) = s.parse::<SocketAddr>() {
            return Ok(Self::Address(addr));
        }
        s.parse::<IpAddr>()
            .map(|ip| Self::Address(SocketAddr::new(ip, 53)))
            .map_err(|_| DomainError::InvalidDomain(format!("invalid nameserver address '{}'", s)))
    }
}

#[derive(Debug, Clone, Default)]
pub struct LookupOptions {
    pub nameserver: NameserverChoice,
    /// Per round-trip deadline; the configured timeout when unset.
    pub timeout: Option<Duration>,
    pub trace: bool,
}

impl LookupOptions {
    pub fn with_nameserver(mut self, nameserver: NameserverChoice) -> Self {
        self.nameserver = nameserver;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn with_trace(mut self, trace: bool) -> Self {
        self.trace = trace;
        self
    }
}

/// One round trip of a resolution, kept for diagnostics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TraceStep {
    pub server: String,
    pub zone: String,
    pub query: String,
    pub response: String,
}

/// What the resolver core hands back before it is shaped for callers.
#[derive(Debug, Clone)]
pub struct Resolution {
    pub status: ResponseStatus,
    /// Final answer records (or, for a delegation, the NS set).
    pub records: Vec<ResourceRecord>,
    /// Address records offered alongside the answer (glue).
    pub additional: Vec<ResourceRecord>,
    pub queried_server: Option<SocketAddr>,
    pub trace: Vec<TraceStep>,
}

impl Resolution {
    pub fn negative(status: ResponseStatus, queried_server: Option<SocketAddr>) -> Self {
        Self {
            status,
            records: Vec::new(),
            additional: Vec::new(),
            queried_server,
            trace: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MailExchange {
    pub priority: u16,
    pub ips: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SoaSummary {
    pub domain: String,
    pub primary_ns: String,
    pub responsible_email: String,
    pub serial: u32,
    pub refresh: u32,
    pub retry: u32,
    pub expire: u32,
    pub minimum: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SrvSummary {
    pub service: String,
    pub priority: u16,
    pub weight: u16,
    pub port: u16,
    pub target: String,
}

/// The `data` member of a lookup result; its shape depends on the query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ResultData {
    List(Vec<String>),
    MailExchangers(BTreeMap<String, MailExchange>),
    Soa(SoaSummary),
    Services(Vec<SrvSummary>),
    Nameservers(BTreeMap<String, Vec<String>>),
}

impl ResultData {
    pub fn empty() -> Self {
        Self::List(Vec::new())
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Self::List(items) => items.is_empty(),
            Self::MailExchangers(map) => map.is_empty(),
            Self::Soa(_) => false,
            Self::Services(items) => items.is_empty(),
            Self::Nameservers(map) => map.is_empty(),
        }
    }

    /// Shapes answer records of `record_type`; records of other types are ignored.
    pub fn from_records(
        record_type: RecordType,
        records: &[ResourceRecord],
        additional: &[ResourceRecord],
    ) -> Self {
        let matching = records.iter().filter(|r| r.is_type(record_type));

        match record_type {
            RecordType::MX => {
                let mut exchangers = BTreeMap::new();
                for record in matching {
                    if let RecordData::MX {
                        preference,
                        exchange,
                    } = &record.data
                    {
                        exchangers.insert(
                            exchange.to_string(),
                            MailExchange {
                                priority: *preference,
                                ips: addresses_of(exchange, additional),
                            },
                        );
                    }
                }
                Self::MailExchangers(exchangers)
            }
            RecordType::SOA => matching
                .filter_map(|record| match &record.data {
                    RecordData::SOA(soa) => Some(Self::Soa(SoaSummary {
                        domain: record.owner.to_string(),
                        primary_ns: soa.primary_ns.to_string(),
                        responsible_email: soa.responsible_email.to_string(),
                        serial: soa.serial,
                        refresh: soa.refresh,
                        retry: soa.retry,
                        expire: soa.expire,
                        minimum: soa.minimum,
                    })),
                    _ => None,
                })
                .next()
                .unwrap_or_else(Self::empty),
            RecordType::SRV => Self::Services(
                matching
                    .filter_map(|record| match &record.data {
                        RecordData::SRV(srv) => Some(SrvSummary {
                            service: record.owner.to_string(),
                            priority: srv.priority,
                            weight: srv.weight,
                            port: srv.port,
                            target: srv.target.to_string(),
                        }),
                        _ => None,
                    })
                    .collect(),
            ),
            RecordType::TXT => Self::List(matching.filter_map(|r| r.data.text()).collect()),
            RecordType::A | RecordType::AAAA | RecordType::CNAME | RecordType::NS => {
                Self::List(matching.map(|r| r.data.to_string()).collect())
            }
        }
    }

    /// Nameserver name to glue addresses, from an NS set and its additional section.
    pub fn from_delegation(records: &[ResourceRecord], additional: &[ResourceRecord]) -> Self {
        let mut nameservers = BTreeMap::new();
        for record in records {
            if let RecordData::NS(target) = &record.data {
                nameservers.insert(target.to_string(), addresses_of(target, additional));
            }
        }
        Self::Nameservers(nameservers)
    }
}

fn addresses_of(name: &DomainName, additional: &[ResourceRecord]) -> Vec<String> {
    additional
        .iter()
        .filter(|r| &r.owner == name)
        .filter_map(|r| match &r.data {
            RecordData::A(addr) => Some(addr.to_string()),
            RecordData::AAAA(addr) => Some(addr.to_string()),
            _ => None,
        })
        .collect()
}

/// The public result shape: `{status, data, query, nameserver, trace?}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LookupResult {
    pub status: ResponseStatus,
    pub data: ResultData,
    pub query: String,
    pub nameserver: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trace: Option<Vec<TraceStep>>,
}

impl LookupResult {
    pub fn from_resolution(query: String, data: ResultData, resolution: Resolution, trace: bool) -> Self {
        let data = if resolution.status.is_success() {
            data
        } else {
            ResultData::empty()
        };
        Self {
            status: resolution.status,
            data,
            query,
            nameserver: resolution
                .queried_server
                .map(|addr| display_server(&addr))
                .unwrap_or_default(),
            trace: trace.then_some(resolution.trace),
        }
    }
}

/// `8.8.8.8` for port 53, `127.0.0.1:5353` otherwise.
pub fn display_server(addr: &SocketAddr) -> String {
    if addr.port() == 53 {
        addr.ip().to_string()
    } else {
        addr.to_string()
    }
}

impl fmt::Display for LookupResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} @{} ({} entries)",
            self.query,
            self.status,
            self.nameserver,
            match &self.data {
                ResultData::List(items) => items.len(),
                ResultData::MailExchangers(map) => map.len(),
                ResultData::Soa(_) => 1,
                ResultData::Services(items) => items.len(),
                ResultData::Nameservers(map) => map.len(),
            }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dns_record::{SoaData, SrvData};
    use std::net::Ipv4Addr;

    fn name(s: &str) -> DomainName {
        DomainName::from_wire_labels(s.split('.').map(|l| l.as_bytes().to_vec()).collect())
            .unwrap()
    }

    #[test]
    fn test_address_list() {
        let records = vec![
            ResourceRecord::new(name("example.com"), 300, RecordData::A(Ipv4Addr::new(93, 184, 216, 34))),
            ResourceRecord::new(name("example.com"), 300, RecordData::CNAME(name("other.example"))),
        ];
        let data = ResultData::from_records(RecordType::A, &records, &[]);
        assert_eq!(data, ResultData::List(vec!["93.184.216.34".to_string()]));
    }

    #[test]
    fn test_mx_map_with_glue() {
        let records = vec![ResourceRecord::new(
            name("example.com"),
            300,
            RecordData::MX {
                preference: 10,
                exchange: name("mail.example.com"),
            },
        )];
        let additional = vec![ResourceRecord::new(
            name("mail.example.com"),
            300,
            RecordData::A(Ipv4Addr::new(192, 0, 2, 25)),
        )];
        let data = ResultData::from_records(RecordType::MX, &records, &additional);
        let json = serde_json::to_value(&data).unwrap();
        assert_eq!(json["mail.example.com"]["priority"], 10);
        assert_eq!(json["mail.example.com"]["ips"][0], "192.0.2.25");
    }

    #[test]
    fn test_soa_object() {
        let records = vec![ResourceRecord::new(
            name("example.com"),
            3600,
            RecordData::SOA(SoaData {
                primary_ns: name("ns1.example.com"),
                responsible_email: name("hostmaster.example.com"),
                serial: 2024010101,
                refresh: 7200,
                retry: 3600,
                expire: 1209600,
                minimum: 300,
            }),
        )];
        let json = serde_json::to_value(ResultData::from_records(RecordType::SOA, &records, &[])).unwrap();
        assert_eq!(json["domain"], "example.com");
        assert_eq!(json["primary_ns"], "ns1.example.com");
        assert_eq!(json["serial"], 2024010101u32);
        assert_eq!(json["minimum"], 300);
    }

    #[test]
    fn test_srv_list() {
        let records = vec![ResourceRecord::new(
            name("_sip._tcp.example.com"),
            60,
            RecordData::SRV(SrvData {
                priority: 10,
                weight: 60,
                port: 5060,
                target: name("sip.example.com"),
            }),
        )];
        let json = serde_json::to_value(ResultData::from_records(RecordType::SRV, &records, &[])).unwrap();
        assert_eq!(json[0]["service"], "_sip._tcp.example.com");
        assert_eq!(json[0]["port"], 5060);
        assert_eq!(json[0]["target"], "sip.example.com");
    }

    #[test]
    fn test_negative_status_clears_data() {
        let resolution = Resolution::negative(ResponseStatus::NxDomain, Some("192.0.2.53:53".parse().unwrap()));
        let result = LookupResult::from_resolution(
            "A".to_string(),
            ResultData::List(vec!["ignored".into()]),
            resolution,
            false,
        );
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["status"], "NXDOMAIN");
        assert_eq!(json["data"], serde_json::json!([]));
        assert_eq!(json["nameserver"], "192.0.2.53");
        assert!(json.get("trace").is_none());
    }

    #[test]
    fn test_nameserver_choice_parsing() {
        assert_eq!("default".parse::<NameserverChoice>().unwrap(), NameserverChoice::Default);
        assert_eq!("random".parse::<NameserverChoice>().unwrap(), NameserverChoice::RandomFromPool);
        assert_eq!(
            "8.8.8.8".parse::<NameserverChoice>().unwrap(),
            NameserverChoice::Address("8.8.8.8:53".parse().unwrap())
        );
        assert_eq!(
            "127.0.0.1:5353".parse::<NameserverChoice>().unwrap(),
            NameserverChoice::Address("127.0.0.1:5353".parse().unwrap())
        );
        assert!("not-an-ip".parse::<NameserverChoice>().is_err());
    }
}
