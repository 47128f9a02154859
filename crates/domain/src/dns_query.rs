use crate::dns_record::record_type::CLASS_IN;
use crate::dns_record::RecordType;
use crate::domain_name::DomainName;
use crate::dns_message::Question;
use std::fmt;

/// A single IN-class question. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Query {
    name: DomainName,
    record_type: RecordType,
}

impl Query {
    pub fn new(name: DomainName, record_type: RecordType) -> Self {
        Self { name, record_type }
    }

    pub fn name(&self) -> &DomainName {
        &self.name
    }

    pub fn record_type(&self) -> RecordType {
        self.record_type
    }

    pub fn to_question(&self) -> Question {
        Question {
            name: self.name.clone(),
            qtype: self.record_type.to_u16(),
            qclass: CLASS_IN,
        }
    }

    /// Whether a question echoed back by a server is this query.
    pub fn matches(&self, question: &Question) -> bool {
        question.name == self.name
            && question.qtype == self.record_type.to_u16()
            && question.qclass == CLASS_IN
    }
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} IN {}", self.name, self.record_type)
    }
}
