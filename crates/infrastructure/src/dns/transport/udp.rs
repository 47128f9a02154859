//! One datagram out, one datagram back (RFC 1035 §4.2.1).
//!
//! Truncation is not handled here; the exchange layer looks at TC and
//! switches to TCP.

use super::{io_error, timeout_error, DnsTransport, TransportResponse};
use async_trait::async_trait;
use getdns_domain::DomainError;
use std::net::{Ipv4Addr, Ipv6Addr, SocketAddr};
use tokio::net::UdpSocket;
use tokio::time::{timeout_at, Instant};
use tracing::{debug, warn};

/// Receive buffer; responses without EDNS(0) never exceed 512 bytes.
const MAX_UDP_RESPONSE_SIZE: usize = 4096;

pub struct UdpTransport {
    server_addr: SocketAddr,
}

impl UdpTransport {
    pub fn new(server_addr: SocketAddr) -> Self {
        Self { server_addr }
    }

    pub fn server_addr(&self) -> SocketAddr {
        self.server_addr
    }

    async fn round_trip(&self, message_bytes: &[u8]) -> Result<Vec<u8>, DomainError> {
        let bind_addr = if self.server_addr.is_ipv4() {
            SocketAddr::from((Ipv4Addr::UNSPECIFIED, 0))
        } else {
            SocketAddr::from((Ipv6Addr::UNSPECIFIED, 0))
        };

        let socket = UdpSocket::bind(bind_addr)
            .await
            .map_err(|e| io_error(self.server_addr, "failed to bind UDP socket", e))?;

        let bytes_sent = socket
            .send_to(message_bytes, self.server_addr)
            .await
            .map_err(|e| io_error(self.server_addr, "failed to send UDP query", e))?;

        debug!(
            server = %self.server_addr,
            bytes_sent = bytes_sent,
            "UDP query sent"
        );

        let mut recv_buf = vec![0u8; MAX_UDP_RESPONSE_SIZE];
        loop {
            let (bytes_received, from_addr) = socket
                .recv_from(&mut recv_buf)
                .await
                .map_err(|e| io_error(self.server_addr, "failed to receive UDP response", e))?;

            // Datagrams from anyone else are dropped; keep waiting for the server.
            if from_addr != self.server_addr {
                warn!(
                    expected = %self.server_addr,
                    received_from = %from_addr,
                    "UDP response from unexpected source"
                );
                continue;
            }

            recv_buf.truncate(bytes_received);
            return Ok(recv_buf);
        }
    }
}

#[async_trait]
impl DnsTransport for UdpTransport {
    async fn send(
        &self,
        message_bytes: &[u8],
        deadline: Instant,
    ) -> Result<TransportResponse, DomainError> {
        // The socket lives inside the future, so a timeout drops and closes it.
        let bytes = timeout_at(deadline, self.round_trip(message_bytes))
            .await
            .map_err(|_| timeout_error(self.server_addr))??;

        debug!(
            server = %self.server_addr,
            bytes_received = bytes.len(),
            "UDP response received"
        );

        Ok(TransportResponse {
            bytes,
            protocol_used: "UDP",
        })
    }

    fn protocol_name(&self) -> &'static str {
        "UDP"
    }
}
