//! TCP Transport (RFC 1035 §4.2.2)
//!
//! Each message is framed by a two-byte big-endian length. One connection per
//! query; it is closed when the call returns.

use super::{io_error, timeout_error, DnsTransport, TransportResponse};
use async_trait::async_trait;
use getdns_domain::DomainError;
use std::net::SocketAddr;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::time::{timeout_at, Instant};
use tracing::debug;

pub struct TcpTransport {
    server_addr: SocketAddr,
}

impl TcpTransport {
    pub fn new(server_addr: SocketAddr) -> Self {
        Self { server_addr }
    }

    async fn round_trip(&self, message_bytes: &[u8]) -> Result<Vec<u8>, DomainError> {
        let mut stream = TcpStream::connect(self.server_addr)
            .await
            .map_err(|e| io_error(self.server_addr, "TCP connect failed", e))?;

        stream
            .set_nodelay(true)
            .map_err(|e| io_error(self.server_addr, "failed to set TCP_NODELAY", e))?;

        send_with_length_prefix(&mut stream, message_bytes)
            .await
            .map_err(|e| io_error(self.server_addr, "failed to send TCP query", e))?;

        debug!(
            server = %self.server_addr,
            message_len = message_bytes.len(),
            "TCP query sent"
        );

        read_with_length_prefix(&mut stream)
            .await
            .map_err(|e| io_error(self.server_addr, "failed to read TCP response", e))
    }
}

#[async_trait]
impl DnsTransport for TcpTransport {
    async fn send(
        &self,
        message_bytes: &[u8],
        deadline: Instant,
    ) -> Result<TransportResponse, DomainError> {
        let bytes = timeout_at(deadline, self.round_trip(message_bytes))
            .await
            .map_err(|_| timeout_error(self.server_addr))??;

        debug!(
            server = %self.server_addr,
            response_len = bytes.len(),
            "TCP response received"
        );

        Ok(TransportResponse {
            bytes,
            protocol_used: "TCP",
        })
    }

    fn protocol_name(&self) -> &'static str {
        "TCP"
    }
}

pub(crate) async fn send_with_length_prefix<S>(
    stream: &mut S,
    message_bytes: &[u8],
) -> std::io::Result<()>
where
    S: AsyncWriteExt + Unpin,
{
    let length = u16::try_from(message_bytes.len()).map_err(|_| {
        std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            format!("message of {} bytes does not fit a TCP frame", message_bytes.len()),
        )
    })?;

    stream.write_all(&length.to_be_bytes()).await?;
    stream.write_all(message_bytes).await?;
    stream.flush().await
}

pub(crate) async fn read_with_length_prefix<S>(stream: &mut S) -> std::io::Result<Vec<u8>>
where
    S: AsyncReadExt + Unpin,
{
    let mut len_buf = [0u8; 2];
    stream.read_exact(&mut len_buf).await?;

    let response_len = u16::from_be_bytes(len_buf) as usize;
    let mut response = vec![0u8; response_len];
    stream.read_exact(&mut response).await?;

    Ok(response)
}
