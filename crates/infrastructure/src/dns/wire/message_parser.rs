use super::rdata::RecordDecoder;
use super::reader::WireReader;
use getdns_domain::dns_message::HEADER_LEN;
use getdns_domain::{DomainError, Header, Message, Question, ResourceRecord};
use tracing::trace;

/// Header fields plus the four section counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WireHeader {
    pub header: Header,
    pub qdcount: u16,
    pub ancount: u16,
    pub nscount: u16,
    pub arcount: u16,
}

pub struct MessageParser;

/// Root name, type and class.
const MIN_QUESTION_LEN: usize = 5;

/// Root name, type, class, TTL and RDLENGTH with empty RDATA.
const MIN_RECORD_LEN: usize = 11;

/// Header counts are untrusted; never reserve more entries than the
/// remaining bytes could hold.
fn bounded_capacity(count: u16, reader: &WireReader<'_>, min_len: usize) -> usize {
    (count as usize).min(reader.remaining() / min_len)
}

impl MessageParser {
    /// Reads only the 12-byte header; enough to check ID and TC before
    /// committing to a full decode.
    pub fn parse_header(bytes: &[u8]) -> Result<WireHeader, DomainError> {
        if bytes.len() < HEADER_LEN {
            return Err(DomainError::MalformedMessage(format!(
                "message of {} bytes is shorter than the header",
                bytes.len()
            )));
        }
        let mut reader = WireReader::new(bytes);
        let id = reader.read_u16()?;
        let flags = reader.read_u16()?;
        Ok(WireHeader {
            header: Header::from_flags(id, flags),
            qdcount: reader.read_u16()?,
            ancount: reader.read_u16()?,
            nscount: reader.read_u16()?,
            arcount: reader.read_u16()?,
        })
    }

    /// Decodes a complete message. Section counts must match the records
    /// present and nothing may follow the last record.
    pub fn parse(bytes: &[u8]) -> Result<Message, DomainError> {
        let wire = Self::parse_header(bytes)?;
        let mut reader = WireReader::new(bytes);
        reader.skip(HEADER_LEN)?;

        let mut questions =
            Vec::with_capacity(bounded_capacity(wire.qdcount, &reader, MIN_QUESTION_LEN));
        for _ in 0..wire.qdcount {
            questions.push(Question {
                name: reader.read_name()?,
                qtype: reader.read_u16()?,
                qclass: reader.read_u16()?,
            });
        }

        let answers = Self::parse_section(&mut reader, wire.ancount)?;
        let authority = Self::parse_section(&mut reader, wire.nscount)?;
        let additional = Self::parse_section(&mut reader, wire.arcount)?;

        if reader.remaining() != 0 {
            return Err(DomainError::MalformedMessage(format!(
                "{} bytes after the last record",
                reader.remaining()
            )));
        }

        trace!(
            id = wire.header.id,
            answers = answers.len(),
            authority = authority.len(),
            additional = additional.len(),
            "Decoded DNS message"
        );

        Ok(Message {
            header: wire.header,
            questions,
            answers,
            authority,
            additional,
        })
    }

    fn parse_section(
        reader: &mut WireReader<'_>,
        count: u16,
    ) -> Result<Vec<ResourceRecord>, DomainError> {
        let mut records = Vec::with_capacity(bounded_capacity(count, reader, MIN_RECORD_LEN));
        for _ in 0..count {
            records.push(Self::parse_record(reader)?);
        }
        Ok(records)
    }

    fn parse_record(reader: &mut WireReader<'_>) -> Result<ResourceRecord, DomainError> {
        let owner = reader.read_name()?;
        let rtype = reader.read_u16()?;
        let class = reader.read_u16()?;
        let ttl = reader.read_u32()?;
        let rdlength = reader.read_u16()? as usize;

        let mut rdata = reader.sub_reader(rdlength)?;
        let data = RecordDecoder::decode(rtype, &mut rdata)?;
        reader.skip(rdlength)?;

        Ok(ResourceRecord {
            owner,
            class,
            ttl,
            data,
        })
    }
}
