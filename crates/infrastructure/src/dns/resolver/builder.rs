use super::core::IterativeResolver;
use super::state::Nameserver;
use crate::dns::selection::{create_selector, ServerSelector};
use crate::dns::transport::{DnsExchange, NetworkExchange};
use getdns_application::ports::DnsResolver;
use getdns_domain::{DomainName, ResolverConfig, ROOT_HINTS};
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use tracing::info;

pub struct ResolverBuilder {
    config: ResolverConfig,
    exchange: Option<Arc<dyn DnsExchange>>,
    selector: Option<Arc<dyn ServerSelector>>,
    roots: Option<Vec<SocketAddr>>,
}

impl ResolverBuilder {
    pub fn new(config: ResolverConfig) -> Self {
        Self {
            config,
            exchange: None,
            selector: None,
            roots: None,
        }
    }

    /// Replaces the network; tests plug in scripted servers here.
    pub fn with_exchange(mut self, exchange: Arc<dyn DnsExchange>) -> Self {
        self.exchange = Some(exchange);
        self
    }

    /// Overrides the strategy named in the config.
    pub fn with_selector(mut self, selector: Arc<dyn ServerSelector>) -> Self {
        self.selector = Some(selector);
        self
    }

    /// Starts iterative resolution at these servers instead of the IANA roots.
    pub fn with_root_servers(mut self, roots: Vec<SocketAddr>) -> Self {
        self.roots = Some(roots);
        self
    }

    pub fn build(self) -> Arc<dyn DnsResolver> {
        Arc::new(self.build_iterative())
    }

    pub fn build_iterative(self) -> IterativeResolver {
        let roots = match self.roots {
            Some(addrs) => addrs
                .into_iter()
                .map(|addr| Nameserver { name: None, addr })
                .collect(),
            None => builtin_roots(self.config.port),
        };

        let selector = self
            .selector
            .unwrap_or_else(|| create_selector(self.config.selection, self.config.selection_seed));
        let exchange = self
            .exchange
            .unwrap_or_else(|| Arc::new(NetworkExchange::new()));

        info!(
            selection = selector.name(),
            seeded = self.config.selection_seed.is_some(),
            servfail_policy = ?self.config.servfail_policy,
            "Building DNS resolver"
        );

        IterativeResolver::new(exchange, selector, self.config, roots)
    }
}

/// IPv4 addresses of the thirteen root servers.
fn builtin_roots(port: u16) -> Vec<Nameserver> {
    ROOT_HINTS
        .iter()
        .map(|hint| Nameserver {
            name: DomainName::parse(hint.name).ok(),
            addr: SocketAddr::new(IpAddr::V4(hint.ipv4), port),
        })
        .collect()
}
