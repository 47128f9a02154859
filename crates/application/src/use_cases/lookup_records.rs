use crate::ports::DnsResolver;
use getdns_domain::{
    DomainError, DomainName, LookupOptions, LookupResult, Query, RecordType, ResultData,
};
use std::sync::Arc;
use tracing::{debug, info};

/// `Resolve(domain, type, options)`.
pub struct LookupRecordsUseCase {
    resolver: Arc<dyn DnsResolver>,
}

impl LookupRecordsUseCase {
    pub fn new(resolver: Arc<dyn DnsResolver>) -> Self {
        Self { resolver }
    }

    /// Validates `domain` and `record_type` before any network I/O, then
    /// shapes the resolver's answer into the public result.
    pub async fn execute(
        &self,
        domain: &str,
        record_type: &str,
        options: &LookupOptions,
    ) -> Result<LookupResult, DomainError> {
        let record_type: RecordType = record_type.parse()?;
        let name = match record_type {
            RecordType::SRV => DomainName::parse_service(domain)?,
            _ => DomainName::parse(domain)?,
        };
        let query = Query::new(name, record_type);

        debug!(query = %query, nameserver = ?options.nameserver, "Resolving");
        let resolution = self.resolver.resolve(&query, options).await?;

        let data = ResultData::from_records(record_type, &resolution.records, &resolution.additional);
        let result = LookupResult::from_resolution(
            record_type.as_str().to_string(),
            data,
            resolution,
            options.trace,
        );

        info!(
            domain = %query.name(),
            record_type = %record_type,
            status = %result.status,
            nameserver = %result.nameserver,
            "Lookup complete"
        );
        Ok(result)
    }
}
