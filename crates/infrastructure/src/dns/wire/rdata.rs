//! Record Decoder: RDATA bytes to typed [`RecordData`], and back.
//!
//! Numeric fields of MX, SRV and SOA are fixed-width big-endian integers read
//! straight from the wire.

use super::reader::WireReader;
use getdns_domain::{DomainError, DomainName, RecordData, RecordType, SoaData, SrvData};
use std::net::{Ipv4Addr, Ipv6Addr};

pub struct RecordDecoder;

impl RecordDecoder {
    /// Decodes one RDATA field. `reader` is bounded to exactly RDLENGTH bytes
    /// and must be fully consumed.
    pub(crate) fn decode(rtype: u16, reader: &mut WireReader<'_>) -> Result<RecordData, DomainError> {
        let data = match RecordType::from_u16(rtype) {
            Some(RecordType::A) => {
                let octets = fixed::<4>(reader, "A")?;
                RecordData::A(Ipv4Addr::from(octets))
            }
            Some(RecordType::AAAA) => {
                let octets = fixed::<16>(reader, "AAAA")?;
                RecordData::AAAA(Ipv6Addr::from(octets))
            }
            Some(RecordType::CNAME) => RecordData::CNAME(reader.read_name()?),
            Some(RecordType::NS) => RecordData::NS(reader.read_name()?),
            Some(RecordType::MX) => RecordData::MX {
                preference: reader.read_u16()?,
                exchange: reader.read_name()?,
            },
            Some(RecordType::SOA) => RecordData::SOA(SoaData {
                primary_ns: reader.read_name()?,
                responsible_email: reader.read_name()?,
                serial: reader.read_u32()?,
                refresh: reader.read_u32()?,
                retry: reader.read_u32()?,
                expire: reader.read_u32()?,
                minimum: reader.read_u32()?,
            }),
            Some(RecordType::SRV) => RecordData::SRV(SrvData {
                priority: reader.read_u16()?,
                weight: reader.read_u16()?,
                port: reader.read_u16()?,
                target: reader.read_name()?,
            }),
            Some(RecordType::TXT) => {
                let mut strings = Vec::new();
                while reader.remaining() > 0 {
                    let len = reader.read_u8()? as usize;
                    strings.push(reader.read_bytes(len)?.to_vec());
                }
                RecordData::TXT(strings)
            }
            None => RecordData::Unknown {
                rtype,
                bytes: reader.read_bytes(reader.remaining())?.to_vec(),
            },
        };

        if reader.remaining() != 0 {
            return Err(DomainError::MalformedMessage(format!(
                "RDATA of type {} has {} trailing bytes",
                rtype,
                reader.remaining()
            )));
        }
        Ok(data)
    }

    /// Appends the uncompressed RDATA of `data` to `out`.
    pub fn encode(data: &RecordData, out: &mut Vec<u8>) -> Result<(), DomainError> {
        match data {
            RecordData::A(addr) => out.extend_from_slice(&addr.octets()),
            RecordData::AAAA(addr) => out.extend_from_slice(&addr.octets()),
            RecordData::CNAME(target) | RecordData::NS(target) => encode_name(target, out),
            RecordData::MX {
                preference,
                exchange,
            } => {
                out.extend_from_slice(&preference.to_be_bytes());
                encode_name(exchange, out);
            }
            RecordData::SOA(soa) => {
                encode_name(&soa.primary_ns, out);
                encode_name(&soa.responsible_email, out);
                for value in [soa.serial, soa.refresh, soa.retry, soa.expire, soa.minimum] {
                    out.extend_from_slice(&value.to_be_bytes());
                }
            }
            RecordData::SRV(srv) => {
                for value in [srv.priority, srv.weight, srv.port] {
                    out.extend_from_slice(&value.to_be_bytes());
                }
                encode_name(&srv.target, out);
            }
            RecordData::TXT(strings) => {
                for string in strings {
                    let len = u8::try_from(string.len()).map_err(|_| {
                        DomainError::MalformedMessage(format!(
                            "TXT character-string of {} bytes exceeds 255",
                            string.len()
                        ))
                    })?;
                    out.push(len);
                    out.extend_from_slice(string);
                }
            }
            RecordData::Unknown { bytes, .. } => out.extend_from_slice(bytes),
        }
        Ok(())
    }
}

/// Uncompressed wire form of `name`, root label included.
pub fn encode_name(name: &DomainName, out: &mut Vec<u8>) {
    for label in name.labels() {
        out.push(label.len() as u8);
        out.extend_from_slice(label);
    }
    out.push(0);
}

fn fixed<const N: usize>(reader: &mut WireReader<'_>, kind: &str) -> Result<[u8; N], DomainError> {
    if reader.remaining() != N {
        return Err(DomainError::MalformedMessage(format!(
            "{} record RDLENGTH is {}, expected {}",
            kind,
            reader.remaining(),
            N
        )));
    }
    let mut octets = [0u8; N];
    octets.copy_from_slice(reader.read_bytes(N)?);
    Ok(octets)
}
