use super::tcp::TcpTransport;
use super::udp::UdpTransport;
use super::DnsTransport;
use crate::dns::wire::{MessageBuilder, MessageParser};
use async_trait::async_trait;
use getdns_domain::{DomainError, Message, Query};
use std::net::SocketAddr;
use std::time::Duration;
use tokio::time::Instant;
use tracing::debug;

/// A validated response together with where and how it was obtained.
#[derive(Debug, Clone)]
pub struct Exchange {
    pub server: SocketAddr,
    pub message: Message,
    pub protocol: &'static str,
}

/// Sends one query to one server and returns the matching response.
///
/// Implementations never retry on timeout; choosing another server is up to
/// the caller.
#[async_trait]
pub trait DnsExchange: Send + Sync {
    async fn exchange(
        &self,
        server: SocketAddr,
        query: &Query,
        recursion_desired: bool,
        timeout: Duration,
    ) -> Result<Exchange, DomainError>;
}

/// UDP first, TCP on truncation, one deadline for both.
#[derive(Debug, Clone, Copy, Default)]
pub struct NetworkExchange;

impl NetworkExchange {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl DnsExchange for NetworkExchange {
    async fn exchange(
        &self,
        server: SocketAddr,
        query: &Query,
        recursion_desired: bool,
        timeout: Duration,
    ) -> Result<Exchange, DomainError> {
        let deadline = Instant::now() + timeout;
        let (id, query_bytes) = if recursion_desired {
            MessageBuilder::build_query(query)?
        } else {
            MessageBuilder::build_iterative_query(query)?
        };

        let udp = UdpTransport::new(server);
        let mut response = udp.send(&query_bytes, deadline).await?;

        // A truncated UDP answer may be cut mid-record; only its header is trusted.
        let header = MessageParser::parse_header(&response.bytes)?.header;
        if header.id != id {
            return Err(mismatch(server, format!("id {} != {}", header.id, id)));
        }
        if header.truncated {
            let tcp = TcpTransport::new(server);
            debug!(
                server = %server,
                query = %query,
                from = udp.protocol_name(),
                to = tcp.protocol_name(),
                "Response truncated (TC bit), retrying"
            );
            response = tcp.send(&query_bytes, deadline).await?;
        }

        let message = MessageParser::parse(&response.bytes)?;
        validate_response(&message, id, query, server)?;

        Ok(Exchange {
            server,
            message,
            protocol: response.protocol_used,
        })
    }
}

/// The response must carry our ID and echo our question. A server reporting
/// an error may omit the question section.
fn validate_response(
    message: &Message,
    id: u16,
    query: &Query,
    server: SocketAddr,
) -> Result<(), DomainError> {
    if message.id() != id {
        return Err(mismatch(server, format!("id {} != {}", message.id(), id)));
    }
    if !message.header.response {
        return Err(mismatch(server, "QR bit not set".to_string()));
    }
    match message.questions.as_slice() {
        [question] if query.matches(question) => Ok(()),
        [] if !message.status().is_success() => Ok(()),
        [question] => Err(mismatch(
            server,
            format!(
                "question {} type {} does not match {}",
                question.name, question.qtype, query
            ),
        )),
        questions => Err(mismatch(
            server,
            format!("{} questions in response", questions.len()),
        )),
    }
}

fn mismatch(server: SocketAddr, reason: String) -> DomainError {
    DomainError::ResponseMismatch {
        server: server.to_string(),
        reason,
    }
}
