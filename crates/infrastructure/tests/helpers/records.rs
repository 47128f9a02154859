#![allow(dead_code)]
use getdns_domain::{
    DomainName, Message, Query, RecordData, ResourceRecord, ResponseStatus, SoaData,
};
use std::net::{Ipv4Addr, Ipv6Addr, SocketAddr};

pub fn name(s: &str) -> DomainName {
    DomainName::from_wire_labels(s.split('.').map(|l| l.as_bytes().to_vec()).collect()).unwrap()
}

pub fn addr(s: &str) -> SocketAddr {
    format!("{}:53", s).parse().unwrap()
}

pub fn a(owner: &str, ip: &str) -> ResourceRecord {
    ResourceRecord::new(name(owner), 300, RecordData::A(ip.parse::<Ipv4Addr>().unwrap()))
}

pub fn aaaa(owner: &str, ip: &str) -> ResourceRecord {
    ResourceRecord::new(name(owner), 300, RecordData::AAAA(ip.parse::<Ipv6Addr>().unwrap()))
}

pub fn cname(owner: &str, target: &str) -> ResourceRecord {
    ResourceRecord::new(name(owner), 300, RecordData::CNAME(name(target)))
}

pub fn ns(owner: &str, target: &str) -> ResourceRecord {
    ResourceRecord::new(name(owner), 172800, RecordData::NS(name(target)))
}

pub fn soa(zone: &str) -> ResourceRecord {
    ResourceRecord::new(
        name(zone),
        3600,
        RecordData::SOA(SoaData {
            primary_ns: name(&format!("ns1.{}", zone)),
            responsible_email: name(&format!("hostmaster.{}", zone)),
            serial: 1,
            refresh: 7200,
            retry: 3600,
            expire: 1209600,
            minimum: 300,
        }),
    )
}

/// Empty response to `query` as an authoritative server would send it.
pub fn response(query: &Query) -> Message {
    let mut message = Message::query(0, query);
    message.header.response = true;
    message.header.recursion_desired = false;
    message
}

/// Referral to `zone`; servers with an empty address get no glue.
pub fn referral(query: &Query, zone: &str, servers: &[(&str, &str)]) -> Message {
    let mut message = response(query);
    for (ns_name, ip) in servers {
        message.authority.push(ns(zone, ns_name));
        if !ip.is_empty() {
            message.additional.push(a(ns_name, ip));
        }
    }
    message
}

pub fn authoritative(query: &Query, answers: Vec<ResourceRecord>) -> Message {
    let mut message = response(query);
    message.header.authoritative = true;
    message.answers = answers;
    message
}

pub fn nodata(query: &Query, zone: &str) -> Message {
    let mut message = response(query);
    message.header.authoritative = true;
    message.authority.push(soa(zone));
    message
}

pub fn with_status(query: &Query, status: ResponseStatus) -> Message {
    let mut message = response(query);
    message.header.rcode = status.rcode();
    message
}
