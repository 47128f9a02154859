pub mod resolver;
pub mod selection;
pub mod transport;
pub mod wire;

pub use resolver::{IterativeResolver, Nameserver, ResolverBuilder};
pub use selection::{create_selector, PrioritySelector, RandomSelector, RoundRobinSelector, ServerSelector};
pub use transport::{DnsExchange, Exchange, NetworkExchange};
pub use wire::{MessageBuilder, MessageParser};
