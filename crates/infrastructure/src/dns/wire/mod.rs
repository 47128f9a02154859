//! DNS wire format (RFC 1035 §4, RFC 3596, RFC 2782)
//!
//! Encoding never compresses names. Decoding accepts compression pointers as
//! long as every pointer jumps strictly backwards, which rules out loops.

pub mod message_builder;
pub mod message_parser;
pub mod rdata;
mod reader;

pub use message_builder::MessageBuilder;
pub use message_parser::MessageParser;
pub use rdata::RecordDecoder;
