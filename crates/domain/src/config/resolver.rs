use serde::{Deserialize, Serialize};
use std::net::{IpAddr, Ipv4Addr};
use std::time::Duration;

/// How candidate nameservers are ordered before they are tried in turn.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum SelectionStrategy {
    /// Shuffle, then try in order.
    #[default]
    Random,

    /// Rotate the starting candidate on every selection.
    RoundRobin,

    /// Keep the order the candidates were given in.
    Priority,
}

impl SelectionStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Random => "random",
            Self::RoundRobin => "round_robin",
            Self::Priority => "priority",
        }
    }
}

/// What to do when a server answers SERVFAIL.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum ServfailPolicy {
    /// Report SERVFAIL as the lookup status.
    #[default]
    Surface,

    /// Ask the next candidate server; SERVFAIL is reported only when every
    /// candidate returns it.
    TryAlternate,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ResolverConfig {
    /// Recursive servers used by `RandomFromPool` lookups.
    #[serde(default = "default_nameservers")]
    pub nameservers: Vec<IpAddr>,

    /// Used when the pool is empty.
    #[serde(default = "default_nameserver")]
    pub default_nameserver: IpAddr,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Deadline for one round trip (UDP attempt plus any TCP retry).
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    #[serde(default = "default_max_delegation_hops")]
    pub max_delegation_hops: usize,

    #[serde(default = "default_max_cname_hops")]
    pub max_cname_hops: usize,

    #[serde(default)]
    pub selection: SelectionStrategy,

    /// Fixes the shuffle order of `random` selection.
    #[serde(default)]
    pub selection_seed: Option<u64>,

    #[serde(default)]
    pub servfail_policy: ServfailPolicy,

    #[serde(default)]
    pub trace: bool,
}

impl ResolverConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            nameservers: default_nameservers(),
            default_nameserver: default_nameserver(),
            port: default_port(),
            timeout_ms: default_timeout_ms(),
            max_delegation_hops: default_max_delegation_hops(),
            max_cname_hops: default_max_cname_hops(),
            selection: SelectionStrategy::default(),
            selection_seed: None,
            servfail_policy: ServfailPolicy::default(),
            trace: false,
        }
    }
}

fn default_nameservers() -> Vec<IpAddr> {
    vec![
        // Cloudflare
        IpAddr::V4(Ipv4Addr::new(1, 1, 1, 1)),
        IpAddr::V4(Ipv4Addr::new(1, 0, 0, 1)),
        // Google
        IpAddr::V4(Ipv4Addr::new(8, 8, 8, 8)),
        IpAddr::V4(Ipv4Addr::new(8, 8, 4, 4)),
        // Quad9
        IpAddr::V4(Ipv4Addr::new(9, 9, 9, 9)),
        IpAddr::V4(Ipv4Addr::new(149, 112, 112, 112)),
    ]
}

fn default_nameserver() -> IpAddr {
    IpAddr::V4(Ipv4Addr::new(8, 8, 8, 8))
}

fn default_port() -> u16 {
    53
}

fn default_timeout_ms() -> u64 {
    1000
}

fn default_max_delegation_hops() -> usize {
    20
}

fn default_max_cname_hops() -> usize {
    10
}
