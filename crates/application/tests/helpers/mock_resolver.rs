#![allow(dead_code)]

use async_trait::async_trait;
use getdns_application::ports::DnsResolver;
use getdns_domain::{
    DomainError, DomainName, LookupOptions, Query, RecordData, ResourceRecord, Resolution,
    ResponseStatus,
};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;

/// Answers from a table keyed by the query string (`"example.com IN A"`) or,
/// for delegations, by the bare name.
pub struct MockDnsResolver {
    responses: Arc<RwLock<HashMap<String, Result<Resolution, DomainError>>>>,
    calls: AtomicUsize,
}

impl MockDnsResolver {
    pub fn new() -> Self {
        Self {
            responses: Arc::new(RwLock::new(HashMap::new())),
            calls: AtomicUsize::new(0),
        }
    }

    pub async fn set_response(&self, key: &str, resolution: Resolution) {
        self.responses
            .write()
            .await
            .insert(key.to_string(), Ok(resolution));
    }

    pub async fn set_error(&self, key: &str, error: DomainError) {
        self.responses
            .write()
            .await
            .insert(key.to_string(), Err(error));
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    async fn lookup(&self, key: String) -> Result<Resolution, DomainError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.responses
            .read()
            .await
            .get(&key)
            .cloned()
            .unwrap_or_else(|| Ok(Resolution::negative(ResponseStatus::NxDomain, Some(server()))))
    }
}

impl Default for MockDnsResolver {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DnsResolver for MockDnsResolver {
    async fn resolve(
        &self,
        query: &Query,
        _options: &LookupOptions,
    ) -> Result<Resolution, DomainError> {
        self.lookup(query.to_string()).await
    }

    async fn delegation(
        &self,
        name: &DomainName,
        _options: &LookupOptions,
    ) -> Result<Resolution, DomainError> {
        self.lookup(name.to_string()).await
    }
}

pub fn server() -> SocketAddr {
    "192.0.2.53:53".parse().unwrap()
}

/// Helpers for building resolutions.
pub mod records {
    use super::*;

    pub fn name(s: &str) -> DomainName {
        DomainName::from_wire_labels(s.split('.').map(|l| l.as_bytes().to_vec()).collect())
            .unwrap()
    }

    pub fn record(owner: &str, data: RecordData) -> ResourceRecord {
        ResourceRecord::new(name(owner), 300, data)
    }

    pub fn answer(records: Vec<ResourceRecord>, additional: Vec<ResourceRecord>) -> Resolution {
        Resolution {
            status: ResponseStatus::NoError,
            records,
            additional,
            queried_server: Some(server()),
            trace: Vec::new(),
        }
    }
}
