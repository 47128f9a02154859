mod dns_resolver;

pub use dns_resolver::DnsResolver;

// Re-export for convenience
pub use getdns_domain::{LookupOptions, Query, Resolution};
