use crate::dns_query::Query;
use crate::dns_record::ResourceRecord;
use crate::domain_name::DomainName;
use serde::{Serialize, Serializer};
use std::fmt;

pub const HEADER_LEN: usize = 12;

const FLAG_QR: u16 = 0x8000;
const FLAG_AA: u16 = 0x0400;
const FLAG_TC: u16 = 0x0200;
const FLAG_RD: u16 = 0x0100;
const FLAG_RA: u16 = 0x0080;

/// The fixed 12-byte message header, minus the section counts
/// (those are derived from the sections when encoding).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Header {
    pub id: u16,
    pub response: bool,
    pub opcode: u8,
    pub authoritative: bool,
    pub truncated: bool,
    pub recursion_desired: bool,
    pub recursion_available: bool,
    pub rcode: u8,
}

impl Header {
    /// Standard query header with RD set.
    pub fn query(id: u16) -> Self {
        Self {
            id,
            recursion_desired: true,
            ..Self::default()
        }
    }

    pub fn from_flags(id: u16, flags: u16) -> Self {
        Self {
            id,
            response: flags & FLAG_QR != 0,
            opcode: ((flags >> 11) & 0x0F) as u8,
            authoritative: flags & FLAG_AA != 0,
            truncated: flags & FLAG_TC != 0,
            recursion_desired: flags & FLAG_RD != 0,
            recursion_available: flags & FLAG_RA != 0,
            rcode: (flags & 0x000F) as u8,
        }
    }

    pub fn flags(&self) -> u16 {
        let mut flags = ((self.opcode as u16) & 0x0F) << 11 | (self.rcode as u16 & 0x0F);
        if self.response {
            flags |= FLAG_QR;
        }
        if self.authoritative {
            flags |= FLAG_AA;
        }
        if self.truncated {
            flags |= FLAG_TC;
        }
        if self.recursion_desired {
            flags |= FLAG_RD;
        }
        if self.recursion_available {
            flags |= FLAG_RA;
        }
        flags
    }
}

/// Header RCODE, surfaced verbatim in lookup results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResponseStatus {
    NoError,
    FormErr,
    ServFail,
    NxDomain,
    NotImp,
    Refused,
    YxDomain,
    YxRrSet,
    NxRrSet,
    NotAuth,
    NotZone,
    Other(u8),
}

impl ResponseStatus {
    pub fn from_rcode(rcode: u8) -> Self {
        match rcode {
            0 => Self::NoError,
            1 => Self::FormErr,
            2 => Self::ServFail,
            3 => Self::NxDomain,
            4 => Self::NotImp,
            5 => Self::Refused,
            6 => Self::YxDomain,
            7 => Self::YxRrSet,
            8 => Self::NxRrSet,
            9 => Self::NotAuth,
            10 => Self::NotZone,
            other => Self::Other(other),
        }
    }

    pub fn rcode(&self) -> u8 {
        match self {
            Self::NoError => 0,
            Self::FormErr => 1,
            Self::ServFail => 2,
            Self::NxDomain => 3,
            Self::NotImp => 4,
            Self::Refused => 5,
            Self::YxDomain => 6,
            Self::YxRrSet => 7,
            Self::NxRrSet => 8,
            Self::NotAuth => 9,
            Self::NotZone => 10,
            Self::Other(code) => *code,
        }
    }

    pub fn is_success(&self) -> bool {
        *self == Self::NoError
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NoError => "NOERROR",
            Self::FormErr => "FORMERR",
            Self::ServFail => "SERVFAIL",
            Self::NxDomain => "NXDOMAIN",
            Self::NotImp => "NOTIMP",
            Self::Refused => "REFUSED",
            Self::YxDomain => "YXDOMAIN",
            Self::YxRrSet => "YXRRSET",
            Self::NxRrSet => "NXRRSET",
            Self::NotAuth => "NOTAUTH",
            Self::NotZone => "NOTZONE",
            Self::Other(_) => "UNKNOWN",
        }
    }
}

impl fmt::Display for ResponseStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Other(code) => write!(f, "RCODE{}", code),
            _ => f.write_str(self.as_str()),
        }
    }
}

impl Serialize for ResponseStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// A question as it appears on the wire; the type may be one we never ask for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question {
    pub name: DomainName,
    pub qtype: u16,
    pub qclass: u16,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Message {
    pub header: Header,
    pub questions: Vec<Question>,
    pub answers: Vec<ResourceRecord>,
    pub authority: Vec<ResourceRecord>,
    pub additional: Vec<ResourceRecord>,
}

impl Message {
    pub fn query(id: u16, query: &Query) -> Self {
        Self {
            header: Header::query(id),
            questions: vec![query.to_question()],
            ..Self::default()
        }
    }

    pub fn id(&self) -> u16 {
        self.header.id
    }

    pub fn status(&self) -> ResponseStatus {
        ResponseStatus::from_rcode(self.header.rcode)
    }

    pub fn is_truncated(&self) -> bool {
        self.header.truncated
    }

    pub fn is_authoritative(&self) -> bool {
        self.header.authoritative
    }

    pub fn question(&self) -> Option<&Question> {
        self.questions.first()
    }

    pub fn record_count(&self) -> usize {
        self.answers.len() + self.authority.len() + self.additional.len()
    }

    /// One-line summary used in diagnostic traces.
    pub fn summary(&self) -> String {
        format!(
            "{}{} answers={} authority={} additional={}",
            self.status(),
            if self.is_authoritative() { " aa" } else { "" },
            self.answers.len(),
            self.authority.len(),
            self.additional.len()
        )
    }
}
