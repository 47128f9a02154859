pub mod exchange;
pub mod tcp;
pub mod udp;

use async_trait::async_trait;
use getdns_domain::DomainError;
use tokio::time::Instant;

pub use exchange::{DnsExchange, Exchange, NetworkExchange};

#[derive(Debug)]
pub struct TransportResponse {
    pub bytes: Vec<u8>,

    pub protocol_used: &'static str,
}

/// One raw request/response round trip to a single server.
///
/// `deadline` is absolute so a UDP attempt and its TCP retry share one budget.
#[async_trait]
pub trait DnsTransport: Send + Sync {
    async fn send(
        &self,
        message_bytes: &[u8],
        deadline: Instant,
    ) -> Result<TransportResponse, DomainError>;

    fn protocol_name(&self) -> &'static str;
}

pub(crate) fn io_error(server: std::net::SocketAddr, context: &str, e: std::io::Error) -> DomainError {
    DomainError::Io {
        server: server.to_string(),
        message: format!("{}: {}", context, e),
    }
}

pub(crate) fn timeout_error(server: std::net::SocketAddr) -> DomainError {
    DomainError::Timeout {
        server: server.to_string(),
    }
}
