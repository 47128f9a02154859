use getdns_domain::{
    display_server, DomainError, DomainName, Message, RecordData, ResourceRecord, TraceStep,
};
use std::collections::HashSet;
use std::fmt;
use std::net::{IpAddr, SocketAddr};

/// A server the resolver may ask; `name` is unknown for root hints given as
/// bare addresses and for user-supplied servers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Nameserver {
    pub name: Option<DomainName>,
    pub addr: SocketAddr,
}

impl fmt::Display for Nameserver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.name {
            Some(name) => write!(f, "{} ({})", name, display_server(&self.addr)),
            None => f.write_str(&display_server(&self.addr)),
        }
    }
}

/// Where a resolution is while it walks down the tree.
#[derive(Debug)]
pub struct DelegationState {
    pub zone: DomainName,
    pub servers: Vec<Nameserver>,
    visited_zones: HashSet<DomainName>,
}

impl DelegationState {
    pub fn new(zone: DomainName, servers: Vec<Nameserver>) -> Self {
        let mut visited_zones = HashSet::new();
        visited_zones.insert(zone.clone());
        Self {
            zone,
            servers,
            visited_zones,
        }
    }

    /// Moves to `zone`. A zone seen before, or one that is not strictly below
    /// the current zone, means the servers are sending us in circles.
    pub fn descend(&mut self, zone: DomainName, servers: Vec<Nameserver>) -> Result<(), DomainError> {
        self.check_descent(&zone)?;
        self.visited_zones.insert(zone.clone());
        self.zone = zone;
        self.servers = servers;
        Ok(())
    }

    pub fn check_descent(&self, zone: &DomainName) -> Result<(), DomainError> {
        let more_specific = zone.is_subdomain_of(&self.zone) && *zone != self.zone;
        if !more_specific || self.visited_zones.contains(zone) {
            return Err(DomainError::DelegationLoop(zone.to_string()));
        }
        Ok(())
    }
}

/// Shared by a resolution and every nested resolution it starts.
#[derive(Debug)]
pub struct Budget {
    max_hops: usize,
    hops: usize,
}

impl Budget {
    pub fn new(max_hops: usize) -> Self {
        Self { max_hops, hops: 0 }
    }

    pub fn take_hop(&mut self) -> Result<(), DomainError> {
        self.hops += 1;
        if self.hops > self.max_hops {
            return Err(DomainError::HopLimitExceeded(self.max_hops));
        }
        Ok(())
    }

    pub fn hops(&self) -> usize {
        self.hops
    }
}

/// Per-call context threaded through one resolution.
#[derive(Debug)]
pub struct Context {
    pub timeout: std::time::Duration,
    pub budget: Budget,
    trace_enabled: bool,
    trace: Vec<TraceStep>,
}

impl Context {
    pub fn new(timeout: std::time::Duration, max_hops: usize, trace_enabled: bool) -> Self {
        Self {
            timeout,
            budget: Budget::new(max_hops),
            trace_enabled,
            trace: Vec::new(),
        }
    }

    pub fn record(&mut self, server: SocketAddr, zone: &DomainName, query: String, response: String) {
        if self.trace_enabled {
            self.trace.push(TraceStep {
                server: display_server(&server),
                zone: zone.to_string(),
                query,
                response,
            });
        }
    }

    pub fn take_trace(&mut self) -> Vec<TraceStep> {
        std::mem::take(&mut self.trace)
    }
}

/// NS set pointing one level closer to the target.
///
/// `glue` holds every address record of the additional section as the
/// server sent it. Only the part inside `bailiwick`, the zone the sender
/// speaks for, is trusted when choosing where to go next.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Referral {
    pub zone: DomainName,
    pub ns_records: Vec<ResourceRecord>,
    pub glue: Vec<ResourceRecord>,
    pub bailiwick: DomainName,
}

impl Referral {
    pub fn ns_names(&self) -> impl Iterator<Item = &DomainName> {
        self.ns_records.iter().filter_map(|r| match &r.data {
            RecordData::NS(target) => Some(target),
            _ => None,
        })
    }

    /// Servers reachable through glue. IPv4 is preferred when present.
    pub fn glued_servers(&self, port: u16) -> Vec<Nameserver> {
        let trusted = self.trusted_glue();
        let mut v4 = Vec::new();
        let mut v6 = Vec::new();
        for name in self.ns_names() {
            for addr in glue_addresses(name, &trusted) {
                let server = Nameserver {
                    name: Some(name.clone()),
                    addr: SocketAddr::new(addr, port),
                };
                if addr.is_ipv4() {
                    v4.push(server);
                } else {
                    v6.push(server);
                }
            }
        }
        if v4.is_empty() {
            v6
        } else {
            v4
        }
    }

    /// NS names without any trusted glue address.
    pub fn glueless(&self) -> Vec<DomainName> {
        let trusted = self.trusted_glue();
        self.ns_names()
            .filter(|name| glue_addresses(name, &trusted).next().is_none())
            .cloned()
            .collect()
    }

    fn trusted_glue(&self) -> Vec<ResourceRecord> {
        self.glue
            .iter()
            .filter(|r| r.owner.is_subdomain_of(&self.bailiwick))
            .cloned()
            .collect()
    }
}

fn glue_addresses<'a>(
    name: &'a DomainName,
    glue: &'a [ResourceRecord],
) -> impl Iterator<Item = IpAddr> + 'a {
    glue.iter()
        .filter(move |r| &r.owner == name)
        .filter_map(|r| match &r.data {
            RecordData::A(addr) => Some(IpAddr::V4(*addr)),
            RecordData::AAAA(addr) => Some(IpAddr::V6(*addr)),
            _ => None,
        })
}

/// Extracts a referral for `target` from a response sent by a server for
/// `current_zone`.
///
/// A referral is a non-authoritative response with no answers whose
/// authority section holds NS records for a zone enclosing `target`. All
/// address records are kept as glue; `current_zone` becomes the bailiwick
/// that decides which of them are followed.
pub fn find_referral(
    message: &Message,
    target: &DomainName,
    current_zone: &DomainName,
) -> Option<Referral> {
    if message.is_authoritative() || !message.answers.is_empty() {
        return None;
    }

    let zone = message
        .authority
        .iter()
        .filter(|r| matches!(r.data, RecordData::NS(_)) && target.is_subdomain_of(&r.owner))
        .map(|r| r.owner.clone())
        .max_by_key(DomainName::label_count)?;

    let ns_records: Vec<ResourceRecord> = message
        .authority
        .iter()
        .filter(|r| r.owner == zone && matches!(r.data, RecordData::NS(_)))
        .cloned()
        .collect();

    let glue = message
        .additional
        .iter()
        .filter(|r| matches!(r.data, RecordData::A(_) | RecordData::AAAA(_)))
        .cloned()
        .collect();

    Some(Referral {
        zone,
        ns_records,
        glue,
        bailiwick: current_zone.clone(),
    })
}
