use async_trait::async_trait;
use getdns_domain::{DomainError, DomainName, LookupOptions, Query, Resolution};

#[async_trait]
pub trait DnsResolver: Send + Sync {
    /// Resolve `query`, following referrals and CNAMEs as needed.
    ///
    /// DNS-level negative answers come back as `Ok` with that status.
    async fn resolve(
        &self,
        query: &Query,
        options: &LookupOptions,
    ) -> Result<Resolution, DomainError>;

    /// Walk referrals towards `name` and return the NS set of the closest
    /// delegation, with glue in `additional`.
    async fn delegation(
        &self,
        name: &DomainName,
        options: &LookupOptions,
    ) -> Result<Resolution, DomainError>;
}
