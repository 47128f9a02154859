use crate::errors::DomainError;
use std::fmt;
use std::str::FromStr;

pub const MAX_LABEL_LEN: usize = 63;
pub const MAX_NAME_LEN: usize = 255;

/// An absolute domain name stored as lowercase labels, root label implicit.
///
/// Two kinds of constructor:
/// - [`DomainName::parse`] / [`DomainName::parse_service`] apply the hostname
///   rules to user input before any network I/O happens.
/// - [`DomainName::from_wire_labels`] only enforces the RFC 1035 length limits,
///   since names read off the wire (`_dmarc`, `*`, ...) are not hostnames.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct DomainName {
    labels: Vec<Box<[u8]>>,
}

impl DomainName {
    pub fn root() -> Self {
        Self { labels: Vec::new() }
    }

    /// Parses a fully-qualified hostname (at least two labels).
    pub fn parse(input: &str) -> Result<Self, DomainError> {
        let labels = split_labels(input)?;
        if labels.len() < 2 {
            return Err(DomainError::InvalidDomain(format!(
                "'{}' is not a fully-qualified domain name",
                input
            )));
        }
        for label in &labels {
            if !is_hostname_label(label) {
                return Err(DomainError::InvalidDomain(format!(
                    "invalid label '{}' in '{}'",
                    label, input
                )));
            }
        }
        Self::from_str_labels(&labels, input)
    }

    /// Parses an SRV owner name: `_service._proto.` followed by a hostname.
    pub fn parse_service(input: &str) -> Result<Self, DomainError> {
        let labels = split_labels(input)?;
        if labels.len() < 4 {
            return Err(DomainError::InvalidDomain(format!(
                "invalid hostname for SRV record: '{}'",
                input
            )));
        }
        let (service, host) = labels.split_at(2);
        if !service.iter().all(|label| is_service_label(label))
            || !host.iter().all(|label| is_hostname_label(label))
        {
            return Err(DomainError::InvalidDomain(format!(
                "invalid hostname for SRV record: '{}'",
                input
            )));
        }
        Self::from_str_labels(&labels, input)
    }

    /// Builds a name from raw labels read off the wire.
    pub fn from_wire_labels(labels: Vec<Vec<u8>>) -> Result<Self, DomainError> {
        let name = Self {
            labels: labels
                .into_iter()
                .map(|mut label| {
                    label.make_ascii_lowercase();
                    label.into_boxed_slice()
                })
                .collect(),
        };
        name.check_lengths()?;
        Ok(name)
    }

    fn from_str_labels(labels: &[&str], input: &str) -> Result<Self, DomainError> {
        let name = Self {
            labels: labels
                .iter()
                .map(|label| label.to_ascii_lowercase().into_bytes().into_boxed_slice())
                .collect(),
        };
        name.check_lengths().map_err(|_| {
            DomainError::InvalidDomain(format!("'{}' exceeds {} bytes", input, MAX_NAME_LEN))
        })?;
        Ok(name)
    }

    fn check_lengths(&self) -> Result<(), DomainError> {
        for label in &self.labels {
            if label.is_empty() || label.len() > MAX_LABEL_LEN {
                return Err(DomainError::MalformedMessage(format!(
                    "label length {} out of range",
                    label.len()
                )));
            }
        }
        if self.wire_len() > MAX_NAME_LEN {
            return Err(DomainError::MalformedMessage(format!(
                "name length {} exceeds {}",
                self.wire_len(),
                MAX_NAME_LEN
            )));
        }
        Ok(())
    }

    pub fn labels(&self) -> impl Iterator<Item = &[u8]> {
        self.labels.iter().map(|label| &label[..])
    }

    pub fn label_count(&self) -> usize {
        self.labels.len()
    }

    pub fn is_root(&self) -> bool {
        self.labels.is_empty()
    }

    /// Encoded length including the terminating root label.
    pub fn wire_len(&self) -> usize {
        self.labels.iter().map(|label| label.len() + 1).sum::<usize>() + 1
    }

    /// True when `self` equals `zone` or sits below it.
    pub fn is_subdomain_of(&self, zone: &DomainName) -> bool {
        if zone.labels.len() > self.labels.len() {
            return false;
        }
        let offset = self.labels.len() - zone.labels.len();
        self.labels[offset..] == zone.labels[..]
    }
}

fn split_labels(input: &str) -> Result<Vec<&str>, DomainError> {
    let trimmed = input.trim();
    let trimmed = trimmed.strip_suffix('.').unwrap_or(trimmed);
    if trimmed.is_empty() {
        return Err(DomainError::InvalidDomain(
            "Domain name is required.".to_string(),
        ));
    }
    let labels: Vec<&str> = trimmed.split('.').collect();
    for label in &labels {
        if label.is_empty() || label.len() > MAX_LABEL_LEN {
            return Err(DomainError::InvalidDomain(format!(
                "label length {} in '{}' must be between 1 and {}",
                label.len(),
                input,
                MAX_LABEL_LEN
            )));
        }
    }
    Ok(labels)
}

/// `[a-z0-9](-*[a-z0-9])*`, case-insensitive.
fn is_hostname_label(label: &str) -> bool {
    let bytes = label.as_bytes();
    match (bytes.first(), bytes.last()) {
        (Some(first), Some(last)) => {
            first.is_ascii_alphanumeric()
                && last.is_ascii_alphanumeric()
                && bytes.iter().all(|b| b.is_ascii_alphanumeric() || *b == b'-')
        }
        _ => false,
    }
}

fn is_service_label(label: &str) -> bool {
    match label.strip_prefix('_') {
        Some(rest) => !rest.is_empty() && rest.bytes().all(|b| b.is_ascii_alphanumeric()),
        None => false,
    }
}

impl fmt::Display for DomainName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_root() {
            return f.write_str(".");
        }
        for (index, label) in self.labels.iter().enumerate() {
            if index > 0 {
                f.write_str(".")?;
            }
            for &byte in label.iter() {
                if byte.is_ascii_graphic() && byte != b'.' && byte != b'\\' {
                    write!(f, "{}", byte as char)?;
                } else {
                    write!(f, "\\{:03}", byte)?;
                }
            }
        }
        Ok(())
    }
}

impl FromStr for DomainName {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_lowercases_and_strips_root_dot() {
        let name = DomainName::parse("WWW.Example.COM.").unwrap();
        assert_eq!(name.to_string(), "www.example.com");
        assert_eq!(name.label_count(), 3);
    }

    #[test]
    fn test_label_of_63_bytes_is_accepted() {
        let label = "a".repeat(63);
        let name = DomainName::parse(&format!("{}.com", label)).unwrap();
        assert_eq!(name.label_count(), 2);
    }

    #[test]
    fn test_label_of_64_bytes_is_rejected() {
        let label = "a".repeat(64);
        let err = DomainName::parse(&format!("{}.com", label)).unwrap_err();
        assert!(matches!(err, DomainError::InvalidDomain(_)));
    }

    #[test]
    fn test_name_longer_than_255_bytes_is_rejected() {
        let label = "a".repeat(60);
        let input = vec![label.as_str(); 5].join(".");
        let err = DomainName::parse(&input).unwrap_err();
        assert!(matches!(err, DomainError::InvalidDomain(_)));
    }

    #[test]
    fn test_hyphen_rules() {
        assert!(DomainName::parse("my-host.example.com").is_ok());
        assert!(DomainName::parse("xn--bcher-kva.example").is_ok());
        assert!(DomainName::parse("-bad.example.com").is_err());
        assert!(DomainName::parse("bad-.example.com").is_err());
        assert!(DomainName::parse("under_score.example.com").is_err());
    }

    #[test]
    fn test_single_label_and_empty_are_rejected() {
        assert!(DomainName::parse("localhost").is_err());
        assert!(DomainName::parse("").is_err());
        assert!(DomainName::parse("example..com").is_err());
    }

    #[test]
    fn test_service_names() {
        let name = DomainName::parse_service("_sip._tcp.example.com").unwrap();
        assert_eq!(name.to_string(), "_sip._tcp.example.com");
        assert!(DomainName::parse_service("sip._tcp.example.com").is_err());
        assert!(DomainName::parse_service("_sip.example.com").is_err());
        assert!(DomainName::parse("_sip._tcp.example.com").is_err());
    }

    #[test]
    fn test_subdomain_of() {
        let name = DomainName::parse("a.b.example.com").unwrap();
        let zone = DomainName::parse("example.com").unwrap();
        assert!(name.is_subdomain_of(&zone));
        assert!(zone.is_subdomain_of(&zone));
        assert!(!zone.is_subdomain_of(&name));
        assert!(name.is_subdomain_of(&DomainName::root()));
    }

    #[test]
    fn test_wire_labels_are_lenient() {
        let name =
            DomainName::from_wire_labels(vec![b"_dmarc".to_vec(), b"Example".to_vec(), b"com".to_vec()])
                .unwrap();
        assert_eq!(name.to_string(), "_dmarc.example.com");
        assert_eq!(name.wire_len(), 20);
        assert_eq!(DomainName::root().to_string(), ".");
    }
}
