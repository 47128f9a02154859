use getdns_application::use_cases::{LookupDelegationUseCase, LookupRecordsUseCase};
use getdns_domain::Config;
use getdns_infrastructure::dns::ResolverBuilder;
use std::sync::Arc;
use tracing::info;

pub struct UseCases {
    pub lookup_records: Arc<LookupRecordsUseCase>,
    pub lookup_delegation: Arc<LookupDelegationUseCase>,
}

impl UseCases {
    pub fn new(config: &Config) -> Self {
        info!(
            nameservers = config.resolver.nameservers.len(),
            timeout_ms = config.resolver.timeout_ms,
            "Initializing resolver"
        );
        let resolver = ResolverBuilder::new(config.resolver.clone()).build();

        Self {
            lookup_records: Arc::new(LookupRecordsUseCase::new(resolver.clone())),
            lookup_delegation: Arc::new(LookupDelegationUseCase::new(resolver)),
        }
    }
}
