use crate::ports::DnsResolver;
use getdns_domain::{
    DomainError, DomainName, LookupOptions, LookupResult, ResultData, DELEGATION_QUERY_LABEL,
};
use std::sync::Arc;
use tracing::info;

/// `Delegation(domain, options)`: who is authoritative for a name.
pub struct LookupDelegationUseCase {
    resolver: Arc<dyn DnsResolver>,
}

impl LookupDelegationUseCase {
    pub fn new(resolver: Arc<dyn DnsResolver>) -> Self {
        Self { resolver }
    }

    pub async fn execute(
        &self,
        domain: &str,
        options: &LookupOptions,
    ) -> Result<LookupResult, DomainError> {
        let name = DomainName::parse(domain)?;
        let resolution = self.resolver.delegation(&name, options).await?;

        let data = ResultData::from_delegation(&resolution.records, &resolution.additional);
        if resolution.status.is_success() && data.is_empty() {
            return Err(DomainError::EmptyResponse);
        }

        let result = LookupResult::from_resolution(
            DELEGATION_QUERY_LABEL.to_string(),
            data,
            resolution,
            options.trace,
        );

        info!(
            domain = %name,
            status = %result.status,
            nameserver = %result.nameserver,
            "Delegation lookup complete"
        );
        Ok(result)
    }
}
