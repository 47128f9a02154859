use getdns_domain::dns_message::HEADER_LEN;
use getdns_domain::domain_name::MAX_NAME_LEN;
use getdns_domain::{DomainError, DomainName};

/// Upper bound on compression pointers followed while reading one name.
const MAX_POINTER_JUMPS: usize = 64;

/// Bounds-checked cursor over a whole DNS message.
///
/// `limit` restricts sequential reads (e.g. to one record's RDATA) while
/// compression pointers may still target anywhere earlier in the message.
pub(crate) struct WireReader<'a> {
    buf: &'a [u8],
    pos: usize,
    limit: usize,
}

impl<'a> WireReader<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Self {
            buf,
            pos: 0,
            limit: buf.len(),
        }
    }

    pub fn remaining(&self) -> usize {
        self.limit - self.pos
    }

    /// A reader over the next `len` bytes; `self` is not advanced.
    pub fn sub_reader(&self, len: usize) -> Result<WireReader<'a>, DomainError> {
        if len > self.remaining() {
            return Err(malformed(format!(
                "section of {} bytes at offset {} runs past the end ({} left)",
                len,
                self.pos,
                self.remaining()
            )));
        }
        Ok(WireReader {
            buf: self.buf,
            pos: self.pos,
            limit: self.pos + len,
        })
    }

    pub fn skip(&mut self, len: usize) -> Result<(), DomainError> {
        self.read_bytes(len).map(|_| ())
    }

    pub fn read_bytes(&mut self, len: usize) -> Result<&'a [u8], DomainError> {
        if len > self.remaining() {
            return Err(malformed(format!(
                "need {} bytes at offset {}, {} left",
                len,
                self.pos,
                self.remaining()
            )));
        }
        let bytes = &self.buf[self.pos..self.pos + len];
        self.pos += len;
        Ok(bytes)
    }

    pub fn read_u8(&mut self) -> Result<u8, DomainError> {
        Ok(self.read_bytes(1)?[0])
    }

    pub fn read_u16(&mut self) -> Result<u16, DomainError> {
        let bytes = self.read_bytes(2)?;
        Ok(u16::from_be_bytes([bytes[0], bytes[1]]))
    }

    pub fn read_u32(&mut self) -> Result<u32, DomainError> {
        let bytes = self.read_bytes(4)?;
        Ok(u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    /// Reads a possibly compressed name.
    ///
    /// Every pointer must target an offset inside the message body and below
    /// the start of the label run that contains it, so each jump moves
    /// strictly backwards and decoding always terminates.
    pub fn read_name(&mut self) -> Result<DomainName, DomainError> {
        let mut labels: Vec<Vec<u8>> = Vec::new();
        let mut name_len = 1usize;
        let mut cursor = self.pos;
        let mut limit = self.limit;
        let mut run_start = self.pos;
        let mut resume_at: Option<usize> = None;
        let mut jumps = 0usize;

        loop {
            if cursor >= limit {
                return Err(malformed(format!("name at offset {} runs past the end", self.pos)));
            }
            let len = self.buf[cursor];
            match len & 0xC0 {
                0x00 if len == 0 => {
                    cursor += 1;
                    break;
                }
                0x00 => {
                    let start = cursor + 1;
                    let end = start + len as usize;
                    if end > limit {
                        return Err(malformed(format!(
                            "label at offset {} runs past the end",
                            cursor
                        )));
                    }
                    name_len += len as usize + 1;
                    if name_len > MAX_NAME_LEN {
                        return Err(malformed(format!(
                            "name at offset {} is longer than {} bytes",
                            self.pos, MAX_NAME_LEN
                        )));
                    }
                    labels.push(self.buf[start..end].to_vec());
                    cursor = end;
                }
                0xC0 => {
                    if cursor + 1 >= limit {
                        return Err(malformed(format!("pointer at offset {} is cut short", cursor)));
                    }
                    let target = ((len as usize & 0x3F) << 8) | self.buf[cursor + 1] as usize;
                    if target < HEADER_LEN || target >= run_start {
                        return Err(malformed(format!(
                            "compression pointer at offset {} targets {} (must be in {}..{})",
                            cursor, target, HEADER_LEN, run_start
                        )));
                    }
                    jumps += 1;
                    if jumps > MAX_POINTER_JUMPS {
                        return Err(malformed(format!(
                            "name at offset {} follows more than {} pointers",
                            self.pos, MAX_POINTER_JUMPS
                        )));
                    }
                    if resume_at.is_none() {
                        resume_at = Some(cursor + 2);
                    }
                    cursor = target;
                    run_start = target;
                    limit = self.buf.len();
                }
                other => {
                    return Err(malformed(format!(
                        "unsupported label type 0x{:02x} at offset {}",
                        other, cursor
                    )));
                }
            }
        }

        self.pos = resume_at.unwrap_or(cursor);
        DomainName::from_wire_labels(labels)
    }
}

fn malformed(message: String) -> DomainError {
    DomainError::MalformedMessage(message)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message_with_body(body: &[u8]) -> Vec<u8> {
        let mut buf = vec![0u8; HEADER_LEN];
        buf.extend_from_slice(body);
        buf
    }

    #[test]
    fn test_plain_name() {
        let buf = message_with_body(b"\x07example\x03com\x00");
        let mut reader = WireReader::new(&buf);
        reader.skip(HEADER_LEN).unwrap();
        let name = reader.read_name().unwrap();
        assert_eq!(name.to_string(), "example.com");
        assert_eq!(reader.remaining(), 0);
    }

    #[test]
    fn test_backward_pointer() {
        // example.com at 12, www.<ptr 12> at 25
        let buf = message_with_body(b"\x07example\x03com\x00\x03www\xc0\x0c");
        let mut reader = WireReader::new(&buf);
        reader.skip(25).unwrap();
        let name = reader.read_name().unwrap();
        assert_eq!(name.to_string(), "www.example.com");
        assert_eq!(reader.remaining(), 0);
    }

    #[test]
    fn test_self_pointer_is_rejected() {
        let buf = message_with_body(b"\xc0\x0c");
        let mut reader = WireReader::new(&buf);
        reader.skip(HEADER_LEN).unwrap();
        assert!(matches!(reader.read_name(), Err(DomainError::MalformedMessage(_))));
    }

    #[test]
    fn test_pointer_into_own_label_run_is_rejected() {
        // "a" then a pointer back to "a": would loop forever
        let buf = message_with_body(b"\x01a\xc0\x0c");
        let mut reader = WireReader::new(&buf);
        reader.skip(HEADER_LEN).unwrap();
        assert!(matches!(reader.read_name(), Err(DomainError::MalformedMessage(_))));
    }

    #[test]
    fn test_forward_pointer_is_rejected() {
        let buf = message_with_body(b"\xc0\x0e\x00\x01a\x00");
        let mut reader = WireReader::new(&buf);
        reader.skip(HEADER_LEN).unwrap();
        assert!(matches!(reader.read_name(), Err(DomainError::MalformedMessage(_))));
    }

    #[test]
    fn test_pointer_into_header_is_rejected() {
        let buf = message_with_body(b"\xc0\x02");
        let mut reader = WireReader::new(&buf);
        reader.skip(HEADER_LEN).unwrap();
        assert!(matches!(reader.read_name(), Err(DomainError::MalformedMessage(_))));
    }

    #[test]
    fn test_truncated_label_is_rejected() {
        let buf = message_with_body(b"\x07exam");
        let mut reader = WireReader::new(&buf);
        reader.skip(HEADER_LEN).unwrap();
        assert!(matches!(reader.read_name(), Err(DomainError::MalformedMessage(_))));
    }

    #[test]
    fn test_sub_reader_bounds_sequential_reads() {
        let buf = message_with_body(&[0, 1, 2, 3, 4, 5]);
        let mut reader = WireReader::new(&buf);
        reader.skip(HEADER_LEN).unwrap();
        let mut sub = reader.sub_reader(2).unwrap();
        assert_eq!(sub.read_u16().unwrap(), 1);
        assert!(sub.read_u8().is_err());
        assert!(reader.sub_reader(7).is_err());
    }
}
