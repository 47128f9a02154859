#![allow(dead_code)]
use async_trait::async_trait;
use getdns_domain::{DomainError, Message, Query};
use getdns_infrastructure::dns::{DnsExchange, Exchange};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub enum Reply {
    Message(Message),
    Timeout,
}

impl From<Message> for Reply {
    fn from(message: Message) -> Self {
        Reply::Message(message)
    }
}

type Handler = Arc<dyn Fn(&Query) -> Reply + Send + Sync>;

/// In-memory network: each address is a handler; unknown addresses time out.
#[derive(Default)]
pub struct ScriptedExchange {
    servers: Mutex<HashMap<SocketAddr, Handler>>,
    log: Mutex<Vec<Sent>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sent {
    pub server: SocketAddr,
    pub query: String,
    pub recursion_desired: bool,
}

impl ScriptedExchange {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn serve<F>(&self, server: SocketAddr, handler: F)
    where
        F: Fn(&Query) -> Reply + Send + Sync + 'static,
    {
        self.servers.lock().unwrap().insert(server, Arc::new(handler));
    }

    pub fn log(&self) -> Vec<Sent> {
        self.log.lock().unwrap().clone()
    }

    pub fn servers_asked(&self) -> Vec<SocketAddr> {
        self.log().into_iter().map(|sent| sent.server).collect()
    }

    pub fn queries_to(&self, server: SocketAddr) -> Vec<String> {
        self.log()
            .into_iter()
            .filter(|sent| sent.server == server)
            .map(|sent| sent.query)
            .collect()
    }
}

#[async_trait]
impl DnsExchange for ScriptedExchange {
    async fn exchange(
        &self,
        server: SocketAddr,
        query: &Query,
        recursion_desired: bool,
        _timeout: Duration,
    ) -> Result<Exchange, DomainError> {
        self.log.lock().unwrap().push(Sent {
            server,
            query: query.to_string(),
            recursion_desired,
        });

        let handler = self.servers.lock().unwrap().get(&server).cloned();
        match handler.map(|handler| handler(query)) {
            Some(Reply::Message(message)) => Ok(Exchange {
                server,
                message,
                protocol: "scripted",
            }),
            Some(Reply::Timeout) | None => Err(DomainError::Timeout {
                server: server.to_string(),
            }),
        }
    }
}
