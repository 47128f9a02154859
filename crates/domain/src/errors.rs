use thiserror::Error;

/// Failures surfaced by a lookup.
///
/// DNS-level negative answers (NXDOMAIN, SERVFAIL, REFUSED, ...) are not
/// errors; they come back as a [`crate::Resolution`] carrying that status.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("Invalid domain name: {0}")]
    InvalidDomain(String),

    #[error("Invalid query type: {0}")]
    InvalidQueryType(String),

    #[error("Query to {server} timed out")]
    Timeout { server: String },

    #[error("Malformed DNS message: {0}")]
    MalformedMessage(String),

    #[error("Response from {server} does not match the query: {reason}")]
    ResponseMismatch { server: String, reason: String },

    #[error("Delegation loop detected at zone {0}")]
    DelegationLoop(String),

    #[error("Delegation hop limit of {0} exceeded")]
    HopLimitExceeded(usize),

    #[error("CNAME chain longer than {0} hops")]
    CnameChainTooLong(usize),

    #[error("The server did not give any response")]
    EmptyResponse,

    #[error("No usable nameserver address for {0}")]
    NoNameservers(String),

    #[error("I/O error talking to {server}: {message}")]
    Io { server: String, message: String },
}

impl DomainError {
    /// Errors after which the next candidate server may still answer.
    pub fn is_transport_error(&self) -> bool {
        matches!(
            self,
            DomainError::Timeout { .. }
                | DomainError::ResponseMismatch { .. }
                | DomainError::MalformedMessage(_)
                | DomainError::Io { .. }
        )
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, DomainError::Timeout { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transport_errors_are_retryable() {
        assert!(DomainError::Timeout {
            server: "192.0.2.1:53".into()
        }
        .is_transport_error());
        assert!(DomainError::MalformedMessage("short".into()).is_transport_error());
        assert!(!DomainError::InvalidDomain("x".into()).is_transport_error());
        assert!(!DomainError::DelegationLoop("com".into()).is_transport_error());
        assert!(!DomainError::CnameChainTooLong(10).is_transport_error());
    }

    #[test]
    fn test_error_messages() {
        let err = DomainError::CnameChainTooLong(10);
        assert_eq!(err.to_string(), "CNAME chain longer than 10 hops");

        let err = DomainError::EmptyResponse;
        assert_eq!(err.to_string(), "The server did not give any response");
    }
}
