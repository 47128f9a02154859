use super::record_type::{RecordType, CLASS_IN};
use crate::domain_name::DomainName;
use std::fmt;
use std::net::{Ipv4Addr, Ipv6Addr};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SoaData {
    pub primary_ns: DomainName,
    pub responsible_email: DomainName,
    pub serial: u32,
    pub refresh: u32,
    pub retry: u32,
    pub expire: u32,
    pub minimum: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SrvData {
    pub priority: u16,
    pub weight: u16,
    pub port: u16,
    pub target: DomainName,
}

/// Typed RDATA. Types outside the supported set are kept as opaque bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordData {
    A(Ipv4Addr),
    AAAA(Ipv6Addr),
    CNAME(DomainName),
    NS(DomainName),
    MX { preference: u16, exchange: DomainName },
    SOA(SoaData),
    SRV(SrvData),
    TXT(Vec<Vec<u8>>),
    Unknown { rtype: u16, bytes: Vec<u8> },
}

impl RecordData {
    pub fn rtype(&self) -> u16 {
        match self {
            RecordData::A(_) => RecordType::A.to_u16(),
            RecordData::AAAA(_) => RecordType::AAAA.to_u16(),
            RecordData::CNAME(_) => RecordType::CNAME.to_u16(),
            RecordData::NS(_) => RecordType::NS.to_u16(),
            RecordData::MX { .. } => RecordType::MX.to_u16(),
            RecordData::SOA(_) => RecordType::SOA.to_u16(),
            RecordData::SRV(_) => RecordType::SRV.to_u16(),
            RecordData::TXT(_) => RecordType::TXT.to_u16(),
            RecordData::Unknown { rtype, .. } => *rtype,
        }
    }

    /// TXT character-strings concatenated, lossily decoded as UTF-8.
    pub fn text(&self) -> Option<String> {
        match self {
            RecordData::TXT(strings) => Some(
                strings
                    .iter()
                    .map(|s| String::from_utf8_lossy(s))
                    .collect::<String>(),
            ),
            _ => None,
        }
    }
}

impl fmt::Display for RecordData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordData::A(addr) => write!(f, "{}", addr),
            RecordData::AAAA(addr) => write!(f, "{}", addr),
            RecordData::CNAME(target) | RecordData::NS(target) => write!(f, "{}", target),
            RecordData::MX {
                preference,
                exchange,
            } => write!(f, "{} {}", preference, exchange),
            RecordData::SOA(soa) => write!(
                f,
                "{} {} {} {} {} {} {}",
                soa.primary_ns,
                soa.responsible_email,
                soa.serial,
                soa.refresh,
                soa.retry,
                soa.expire,
                soa.minimum
            ),
            RecordData::SRV(srv) => write!(
                f,
                "{} {} {} {}",
                srv.priority, srv.weight, srv.port, srv.target
            ),
            RecordData::TXT(_) => write!(f, "\"{}\"", self.text().unwrap_or_default()),
            RecordData::Unknown { rtype, bytes } => {
                write!(f, "TYPE{} \\# {}", rtype, bytes.len())
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceRecord {
    pub owner: DomainName,
    pub class: u16,
    pub ttl: u32,
    pub data: RecordData,
}

impl ResourceRecord {
    pub fn new(owner: DomainName, ttl: u32, data: RecordData) -> Self {
        Self {
            owner,
            class: CLASS_IN,
            ttl,
            data,
        }
    }

    pub fn rtype(&self) -> u16 {
        self.data.rtype()
    }

    pub fn record_type(&self) -> Option<RecordType> {
        RecordType::from_u16(self.rtype())
    }

    pub fn is_type(&self, record_type: RecordType) -> bool {
        self.rtype() == record_type.to_u16()
    }
}

impl fmt::Display for ResourceRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let type_name = self
            .record_type()
            .map(|rt| rt.as_str().to_string())
            .unwrap_or_else(|| format!("TYPE{}", self.rtype()));
        write!(f, "{} {} IN {} {}", self.owner, self.ttl, type_name, self.data)
    }
}
