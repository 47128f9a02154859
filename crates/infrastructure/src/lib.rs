//! getdns infrastructure: wire codec, UDP/TCP transport and the iterative resolver
pub mod dns;
