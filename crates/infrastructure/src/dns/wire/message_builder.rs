//! DNS Message Builder
//!
//! Serializes messages to wire format. Names are written uncompressed.

use super::rdata::{encode_name, RecordDecoder};
use getdns_domain::{DomainError, Message, Query, ResourceRecord};

/// Builds DNS messages in wire format
pub struct MessageBuilder;

impl MessageBuilder {
    /// Build a single-question query with a random ID and RD set.
    ///
    /// Returns the ID alongside the bytes for response matching.
    pub fn build_query(query: &Query) -> Result<(u16, Vec<u8>), DomainError> {
        let id = fastrand::u16(..);
        let bytes = Self::build_query_with_id(query, id)?;
        Ok((id, bytes))
    }

    pub fn build_query_with_id(query: &Query, id: u16) -> Result<Vec<u8>, DomainError> {
        Self::encode(&Message::query(id, query))
    }

    /// Same as [`build_query`](Self::build_query) but with RD cleared, for
    /// questions sent to authoritative servers.
    pub fn build_iterative_query(query: &Query) -> Result<(u16, Vec<u8>), DomainError> {
        let id = fastrand::u16(..);
        let mut message = Message::query(id, query);
        message.header.recursion_desired = false;
        Ok((id, Self::encode(&message)?))
    }

    /// Serialize a full message, every section included.
    pub fn encode(message: &Message) -> Result<Vec<u8>, DomainError> {
        let mut buf = Vec::with_capacity(512);

        buf.extend_from_slice(&message.header.id.to_be_bytes());
        buf.extend_from_slice(&message.header.flags().to_be_bytes());
        for count in [
            message.questions.len(),
            message.answers.len(),
            message.authority.len(),
            message.additional.len(),
        ] {
            buf.extend_from_slice(&section_count(count)?.to_be_bytes());
        }

        for question in &message.questions {
            encode_name(&question.name, &mut buf);
            buf.extend_from_slice(&question.qtype.to_be_bytes());
            buf.extend_from_slice(&question.qclass.to_be_bytes());
        }

        for record in message
            .answers
            .iter()
            .chain(&message.authority)
            .chain(&message.additional)
        {
            Self::encode_record(record, &mut buf)?;
        }

        Ok(buf)
    }

    fn encode_record(record: &ResourceRecord, buf: &mut Vec<u8>) -> Result<(), DomainError> {
        encode_name(&record.owner, buf);
        buf.extend_from_slice(&record.rtype().to_be_bytes());
        buf.extend_from_slice(&record.class.to_be_bytes());
        buf.extend_from_slice(&record.ttl.to_be_bytes());

        let mut rdata = Vec::new();
        RecordDecoder::encode(&record.data, &mut rdata)?;
        let rdlength = u16::try_from(rdata.len()).map_err(|_| {
            DomainError::MalformedMessage(format!("RDATA of {} bytes is too long", rdata.len()))
        })?;
        buf.extend_from_slice(&rdlength.to_be_bytes());
        buf.extend_from_slice(&rdata);
        Ok(())
    }
}

fn section_count(count: usize) -> Result<u16, DomainError> {
    u16::try_from(count)
        .map_err(|_| DomainError::MalformedMessage(format!("{} records in one section", count)))
}
