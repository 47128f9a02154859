use super::answer::{follow_answer_chain, AnswerChain};
use super::state::{find_referral, Context, DelegationState, Nameserver, Referral};
use crate::dns::selection::ServerSelector;
use crate::dns::transport::{DnsExchange, Exchange};
use async_trait::async_trait;
use futures::future::{BoxFuture, FutureExt};
use getdns_application::ports::DnsResolver;
use getdns_domain::{
    DomainError, DomainName, LookupOptions, NameserverChoice, Query, RecordData, RecordType,
    Resolution, ResolverConfig, ResourceRecord, ResponseStatus, ServfailPolicy,
};
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Where one step of a resolution leaves us.
enum Step {
    Done(Resolution),
    Follow(DomainName),
}

/// Walks the DNS tree from the root hints down to the authoritative servers
/// for a name, then asks them the real question.
pub struct IterativeResolver {
    exchange: Arc<dyn DnsExchange>,
    selector: Arc<dyn ServerSelector>,
    config: ResolverConfig,
    roots: Vec<Nameserver>,
}

impl IterativeResolver {
    pub fn new(
        exchange: Arc<dyn DnsExchange>,
        selector: Arc<dyn ServerSelector>,
        config: ResolverConfig,
        roots: Vec<Nameserver>,
    ) -> Self {
        info!(
            roots = roots.len(),
            selection = selector.name(),
            timeout_ms = config.timeout_ms,
            max_delegation_hops = config.max_delegation_hops,
            "Iterative resolver created"
        );
        Self {
            exchange,
            selector,
            config,
            roots,
        }
    }

    fn context(&self, options: &LookupOptions) -> Context {
        Context::new(
            options.timeout.unwrap_or_else(|| self.config.timeout()),
            self.config.max_delegation_hops,
            options.trace,
        )
    }

    /// The recursive pool, or the default nameserver when the pool is empty.
    fn pool(&self) -> Vec<Nameserver> {
        let addresses: Vec<IpAddr> = if self.config.nameservers.is_empty() {
            vec![self.config.default_nameserver]
        } else {
            self.config.nameservers.clone()
        };
        addresses
            .into_iter()
            .map(|ip| Nameserver {
                name: None,
                addr: SocketAddr::new(ip, self.config.port),
            })
            .collect()
    }

    /// Sends `query` to `servers` one at a time, in selector order, until one
    /// gives a usable response.
    async fn ask(
        &self,
        servers: &[Nameserver],
        zone: &DomainName,
        query: &Query,
        recursion_desired: bool,
        ctx: &mut Context,
    ) -> Result<Exchange, DomainError> {
        let mut last_error = None;
        let mut servfail = None;

        for index in self.selector.order(servers.len()) {
            let server = &servers[index];
            debug!(server = %server, zone = %zone, query = %query, "Querying nameserver");

            match self
                .exchange
                .exchange(server.addr, query, recursion_desired, ctx.timeout)
                .await
            {
                Ok(reply) => {
                    debug!(
                        server = %server,
                        protocol = reply.protocol,
                        status = %reply.message.status(),
                        "Response received"
                    );
                    ctx.record(server.addr, zone, query.to_string(), reply.message.summary());
                    if reply.message.status() == ResponseStatus::ServFail
                        && self.config.servfail_policy == ServfailPolicy::TryAlternate
                    {
                        warn!(server = %server, query = %query, "SERVFAIL, trying next server");
                        servfail = Some(reply);
                        continue;
                    }
                    return Ok(reply);
                }
                Err(e) if e.is_transport_error() => {
                    ctx.record(server.addr, zone, query.to_string(), e.to_string());
                    warn!(server = %server, error = %e, "Server failed, trying next");
                    last_error = Some(e);
                }
                Err(e) => return Err(e),
            }
        }

        match servfail {
            Some(reply) => Ok(reply),
            None => Err(last_error.unwrap_or_else(|| DomainError::NoNameservers(zone.to_string()))),
        }
    }

    fn root_state(&self) -> DelegationState {
        DelegationState::new(DomainName::root(), self.roots.clone())
    }

    /// Full iterative resolution, CNAMEs included.
    ///
    /// Boxed because resolving a glueless nameserver starts a nested
    /// resolution from inside the delegation walk.
    fn resolve_iterative<'a>(
        &'a self,
        query: Query,
        ctx: &'a mut Context,
    ) -> BoxFuture<'a, Result<Resolution, DomainError>> {
        async move {
            let mut current = query.clone();
            let mut cname_hops = 0;
            let mut chain = Vec::new();

            loop {
                let reply = self.query_authority(&current, ctx).await?;
                match self.settle(&current, &reply, &mut cname_hops, &mut chain)? {
                    Step::Done(resolution) => return Ok(resolution),
                    Step::Follow(target) => {
                        debug!(from = %current.name(), to = %target, hops = cname_hops, "Following CNAME");
                        current = Query::new(target, query.record_type());
                    }
                }
            }
        }
        .boxed()
    }

    /// QueryingDelegation then QueryingAuthoritative for one name.
    ///
    /// Each step sends an NS query for the target; a referral moves one zone
    /// down, anything else means the current servers are the authority.
    async fn query_authority(&self, query: &Query, ctx: &mut Context) -> Result<Exchange, DomainError> {
        let mut state = self.root_state();
        let probe = Query::new(query.name().clone(), RecordType::NS);

        loop {
            let reply = self.ask(&state.servers, &state.zone, &probe, false, ctx).await?;
            if !reply.message.status().is_success() {
                return Ok(reply);
            }

            let Some(referral) = find_referral(&reply.message, query.name(), &state.zone) else {
                if query.record_type() == RecordType::NS {
                    return Ok(reply);
                }
                break;
            };

            ctx.budget.take_hop()?;
            state.check_descent(&referral.zone)?;
            debug!(
                from = %state.zone,
                to = %referral.zone,
                hops = ctx.budget.hops(),
                "Following referral"
            );
            let servers = self.nameservers_for(&referral, ctx).await?;
            state.descend(referral.zone, servers)?;
        }

        debug!(zone = %state.zone, query = %query, "Querying authoritative servers");
        self.ask(&state.servers, &state.zone, query, false, ctx).await
    }

    /// Addresses for a referral's nameservers: glue first, otherwise nested
    /// resolution of each glueless name until one yields an address.
    async fn nameservers_for(
        &self,
        referral: &Referral,
        ctx: &mut Context,
    ) -> Result<Vec<Nameserver>, DomainError> {
        let servers = referral.glued_servers(self.config.port);
        if !servers.is_empty() {
            return Ok(servers);
        }

        for ns_name in referral.glueless() {
            // Inside the delegated zone its address can only come from glue.
            if ns_name.is_subdomain_of(&referral.zone) {
                debug!(ns = %ns_name, zone = %referral.zone, "Lame delegation, no glue");
                continue;
            }

            // IPv4 first; AAAA only when the name has no A records.
            for rtype in [RecordType::A, RecordType::AAAA] {
                debug!(ns = %ns_name, rtype = %rtype, "Resolving nameserver address (no glue)");
                let lookup = Query::new(ns_name.clone(), rtype);
                match self.resolve_iterative(lookup, ctx).await {
                    Ok(resolution) => {
                        let servers = self.addresses_of(&ns_name, &resolution.records);
                        if !servers.is_empty() {
                            return Ok(servers);
                        }
                    }
                    Err(e @ DomainError::HopLimitExceeded(_)) => return Err(e),
                    Err(e) => {
                        warn!(ns = %ns_name, rtype = %rtype, error = %e, "Could not resolve nameserver");
                    }
                }
            }
        }

        Err(DomainError::NoNameservers(referral.zone.to_string()))
    }

    fn addresses_of(&self, ns_name: &DomainName, records: &[ResourceRecord]) -> Vec<Nameserver> {
        records
            .iter()
            .filter_map(|r| match &r.data {
                RecordData::A(addr) => Some(IpAddr::V4(*addr)),
                RecordData::AAAA(addr) => Some(IpAddr::V6(*addr)),
                _ => None,
            })
            .map(|ip| Nameserver {
                name: Some(ns_name.clone()),
                addr: SocketAddr::new(ip, self.config.port),
            })
            .collect()
    }

    /// Asks `servers` directly with RD set, chasing CNAMEs the server did
    /// not expand on the server that answered.
    async fn resolve_direct(
        &self,
        query: &Query,
        mut servers: Vec<Nameserver>,
        ctx: &mut Context,
    ) -> Result<Resolution, DomainError> {
        let zone = DomainName::root();
        let mut current = query.clone();
        let mut cname_hops = 0;
        let mut chain = Vec::new();

        loop {
            let reply = self.ask(&servers, &zone, &current, true, ctx).await?;
            servers = vec![Nameserver {
                name: None,
                addr: reply.server,
            }];
            match self.settle(&current, &reply, &mut cname_hops, &mut chain)? {
                Step::Done(resolution) => return Ok(resolution),
                Step::Follow(target) => {
                    debug!(from = %current.name(), to = %target, server = %reply.server, "Following CNAME");
                    current = Query::new(target, query.record_type());
                }
            }
        }
    }

    /// Turns a final response into a resolution or the next CNAME to chase.
    fn settle(
        &self,
        query: &Query,
        reply: &Exchange,
        cname_hops: &mut usize,
        chain: &mut Vec<ResourceRecord>,
    ) -> Result<Step, DomainError> {
        let status = reply.message.status();
        if !status.is_success() {
            return Ok(Step::Done(Resolution::negative(status, Some(reply.server))));
        }
        if reply.message.record_count() == 0 {
            return Err(DomainError::EmptyResponse);
        }

        let answered = |records: Vec<ResourceRecord>| Resolution {
            status,
            records,
            additional: reply.message.additional.clone(),
            queried_server: Some(reply.server),
            trace: Vec::new(),
        };

        match follow_answer_chain(
            &reply.message.answers,
            query.name(),
            query.record_type(),
            cname_hops,
            self.config.max_cname_hops,
        )? {
            AnswerChain::Answered { cnames, records } => {
                chain.extend(cnames);
                chain.extend(records);
                Ok(Step::Done(answered(std::mem::take(chain))))
            }
            AnswerChain::Follow { cnames, target } => {
                chain.extend(cnames);
                Ok(Step::Follow(target))
            }
            AnswerChain::NoData => Ok(Step::Done(answered(std::mem::take(chain)))),
        }
    }

    /// Walks referrals towards `name` and returns the NS set of the closest
    /// delegation seen.
    async fn delegation_walk(
        &self,
        name: &DomainName,
        mut state: DelegationState,
        ctx: &mut Context,
    ) -> Result<Resolution, DomainError> {
        let probe = Query::new(name.clone(), RecordType::NS);
        let mut closest: Option<(Referral, SocketAddr)> = None;

        loop {
            let reply = self.ask(&state.servers, &state.zone, &probe, false, ctx).await?;
            let status = reply.message.status();
            if !status.is_success() {
                return Ok(Resolution::negative(status, Some(reply.server)));
            }

            let Some(referral) = find_referral(&reply.message, name, &state.zone) else {
                // Parent and child served by the same servers: the NS set
                // arrives as an answer instead of a referral.
                let ns_records = ns_answers(&reply.message.answers, name);
                if !ns_records.is_empty() {
                    return Ok(Resolution {
                        status,
                        records: ns_records,
                        additional: reply.message.additional.clone(),
                        queried_server: Some(reply.server),
                        trace: Vec::new(),
                    });
                }
                break;
            };

            ctx.budget.take_hop()?;
            state.check_descent(&referral.zone)?;
            let reached = referral.zone == *name;
            let zone = referral.zone.clone();
            let servers = if reached {
                Vec::new()
            } else {
                self.nameservers_for(&referral, ctx).await?
            };
            closest = Some((referral, reply.server));
            if reached {
                break;
            }
            state.descend(zone, servers)?;
        }

        match closest {
            Some((referral, server)) => Ok(Resolution {
                status: ResponseStatus::NoError,
                records: referral.ns_records,
                additional: referral.glue,
                queried_server: Some(server),
                trace: Vec::new(),
            }),
            None => Err(DomainError::EmptyResponse),
        }
    }

    /// Asks recursive servers for the NS set directly.
    async fn delegation_direct(
        &self,
        name: &DomainName,
        servers: Vec<Nameserver>,
        ctx: &mut Context,
    ) -> Result<Resolution, DomainError> {
        let probe = Query::new(name.clone(), RecordType::NS);
        let reply = self
            .ask(&servers, &DomainName::root(), &probe, true, ctx)
            .await?;
        let status = reply.message.status();
        if !status.is_success() {
            return Ok(Resolution::negative(status, Some(reply.server)));
        }

        let mut records = ns_answers(&reply.message.answers, name);
        if records.is_empty() {
            records = ns_answers(&reply.message.authority, name);
        }
        if records.is_empty() {
            return Err(DomainError::EmptyResponse);
        }
        Ok(Resolution {
            status,
            records,
            additional: reply.message.additional.clone(),
            queried_server: Some(reply.server),
            trace: Vec::new(),
        })
    }
}

fn ns_answers(records: &[ResourceRecord], name: &DomainName) -> Vec<ResourceRecord> {
    records
        .iter()
        .filter(|r| &r.owner == name && r.is_type(RecordType::NS))
        .cloned()
        .collect()
}

#[async_trait]
impl DnsResolver for IterativeResolver {
    async fn resolve(
        &self,
        query: &Query,
        options: &LookupOptions,
    ) -> Result<Resolution, DomainError> {
        let mut ctx = self.context(options);
        let result = match options.nameserver {
            NameserverChoice::Default => self.resolve_iterative(query.clone(), &mut ctx).await,
            NameserverChoice::Address(addr) => {
                let server = Nameserver { name: None, addr };
                self.resolve_direct(query, vec![server], &mut ctx).await
            }
            NameserverChoice::RandomFromPool => {
                self.resolve_direct(query, self.pool(), &mut ctx).await
            }
        };

        match result {
            Ok(mut resolution) => {
                resolution.trace = ctx.take_trace();
                debug!(
                    query = %query,
                    status = %resolution.status,
                    records = resolution.records.len(),
                    hops = ctx.budget.hops(),
                    "Resolution finished"
                );
                Ok(resolution)
            }
            Err(e) => {
                warn!(query = %query, error = %e, "Resolution failed");
                Err(e)
            }
        }
    }

    async fn delegation(
        &self,
        name: &DomainName,
        options: &LookupOptions,
    ) -> Result<Resolution, DomainError> {
        let mut ctx = self.context(options);
        let result = match options.nameserver {
            NameserverChoice::Default => self.delegation_walk(name, self.root_state(), &mut ctx).await,
            NameserverChoice::Address(addr) => {
                let start = DelegationState::new(
                    DomainName::root(),
                    vec![Nameserver { name: None, addr }],
                );
                self.delegation_walk(name, start, &mut ctx).await
            }
            NameserverChoice::RandomFromPool => {
                self.delegation_direct(name, self.pool(), &mut ctx).await
            }
        };

        result.map(|mut resolution| {
            resolution.trace = ctx.take_trace();
            resolution
        })
    }
}
