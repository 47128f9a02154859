#![allow(unused_imports)]

pub mod dns_server_mock;
pub mod records;
pub mod scripted_exchange;

pub use dns_server_mock::{reply_to, MockDnsServer, MockReply};
pub use scripted_exchange::{Reply, ScriptedExchange};
