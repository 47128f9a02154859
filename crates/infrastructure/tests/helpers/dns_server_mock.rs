#![allow(dead_code)]
use getdns_domain::Message;
use getdns_infrastructure::dns::{MessageBuilder, MessageParser};
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream, UdpSocket};
use tokio::sync::oneshot;

/// What the mock does with one query.
pub enum MockReply {
    Answer(Message),
    /// Header-only TC response over UDP, the full message over TCP.
    Truncated(Message),
    Silent,
    Raw(Vec<u8>),
}

type Handler = Arc<dyn Fn(&Message) -> MockReply + Send + Sync>;

/// UDP and TCP DNS server on one loopback port.
pub struct MockDnsServer {
    addr: SocketAddr,
    shutdown_tx: Option<oneshot::Sender<()>>,
    udp_queries: Arc<AtomicUsize>,
    tcp_queries: Arc<AtomicUsize>,
    udp_peers: Arc<Mutex<Vec<SocketAddr>>>,
}

impl MockDnsServer {
    pub async fn start<F>(handler: F) -> Result<Self, std::io::Error>
    where
        F: Fn(&Message) -> MockReply + Send + Sync + 'static,
    {
        let socket = UdpSocket::bind("127.0.0.1:0").await?;
        let addr = socket.local_addr()?;
        let listener = TcpListener::bind(addr).await?;
        let handler: Handler = Arc::new(handler);
        let udp_queries = Arc::new(AtomicUsize::new(0));
        let tcp_queries = Arc::new(AtomicUsize::new(0));
        let udp_peers = Arc::new(Mutex::new(Vec::new()));

        let (shutdown_tx, mut shutdown_rx) = oneshot::channel();

        let udp_count = udp_queries.clone();
        let tcp_count = tcp_queries.clone();
        let peers = udp_peers.clone();
        tokio::spawn(async move {
            let mut buf = vec![0u8; 512];

            loop {
                tokio::select! {
                    _ = &mut shutdown_rx => {
                        break;
                    }
                    result = socket.recv_from(&mut buf) => {
                        if let Ok((len, peer)) = result {
                            peers.lock().unwrap().push(peer);
                            udp_count.fetch_add(1, Ordering::SeqCst);
                            if let Some(response) = respond(&handler, &buf[..len], false) {
                                let _ = socket.send_to(&response, peer).await;
                            }
                        }
                    }
                    result = listener.accept() => {
                        if let Ok((stream, _)) = result {
                            tcp_count.fetch_add(1, Ordering::SeqCst);
                            tokio::spawn(serve_tcp(stream, handler.clone()));
                        }
                    }
                }
            }
        });

        Ok(Self {
            addr,
            shutdown_tx: Some(shutdown_tx),
            udp_queries,
            tcp_queries,
            udp_peers,
        })
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    pub fn udp_queries(&self) -> usize {
        self.udp_queries.load(Ordering::SeqCst)
    }

    pub fn tcp_queries(&self) -> usize {
        self.tcp_queries.load(Ordering::SeqCst)
    }

    /// Source addresses of the UDP queries received so far.
    pub fn udp_peers(&self) -> Vec<SocketAddr> {
        self.udp_peers.lock().unwrap().clone()
    }

    pub fn shutdown(mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

impl Drop for MockDnsServer {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

async fn serve_tcp(mut stream: TcpStream, handler: Handler) {
    let mut len_buf = [0u8; 2];
    if stream.read_exact(&mut len_buf).await.is_err() {
        return;
    }
    let mut query = vec![0u8; u16::from_be_bytes(len_buf) as usize];
    if stream.read_exact(&mut query).await.is_err() {
        return;
    }
    if let Some(response) = respond(&handler, &query, true) {
        let _ = stream.write_all(&(response.len() as u16).to_be_bytes()).await;
        let _ = stream.write_all(&response).await;
    }
}

fn respond(handler: &Handler, query: &[u8], over_tcp: bool) -> Option<Vec<u8>> {
    let query = MessageParser::parse(query).ok()?;
    match handler(&query) {
        MockReply::Answer(message) => MessageBuilder::encode(&message).ok(),
        MockReply::Truncated(message) if over_tcp => MessageBuilder::encode(&message).ok(),
        MockReply::Truncated(mut message) => {
            message.answers.clear();
            message.authority.clear();
            message.additional.clear();
            message.header.truncated = true;
            MessageBuilder::encode(&message).ok()
        }
        MockReply::Silent => None,
        MockReply::Raw(bytes) => Some(bytes),
    }
}

/// Empty response echoing the query's ID and question.
pub fn reply_to(query: &Message) -> Message {
    let mut response = query.clone();
    response.header.response = true;
    response.header.recursion_available = true;
    response.answers.clear();
    response.authority.clear();
    response.additional.clear();
    response
}
