//! getdns domain layer: names, records, messages and the error taxonomy
pub mod config;
pub mod dns_message;
pub mod dns_query;
pub mod dns_record;
pub mod domain_name;
pub mod errors;
pub mod lookup_result;
pub mod root_hints;

pub use config::{
    CliOverrides, Config, ConfigError, LoggingConfig, ResolverConfig, SelectionStrategy,
    ServfailPolicy,
};
pub use dns_message::{Header, Message, Question, ResponseStatus};
pub use dns_query::Query;
pub use dns_record::{RecordData, RecordType, ResourceRecord, SoaData, SrvData};
pub use domain_name::DomainName;
pub use errors::DomainError;
pub use lookup_result::{
    display_server, LookupOptions, LookupResult, MailExchange, NameserverChoice, Resolution,
    ResultData, SoaSummary, SrvSummary, TraceStep, DELEGATION_QUERY_LABEL,
};
pub use root_hints::{RootHint, ROOT_HINTS};
