use getdns_domain::{DomainError, DomainName, RecordData, RecordType, ResourceRecord};

/// What an answer section says about one name and type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnswerChain {
    /// Records of the requested type for the end of the chain.
    Answered {
        cnames: Vec<ResourceRecord>,
        records: Vec<ResourceRecord>,
    },
    /// The chain leaves this response at `target`; ask again for it.
    Follow {
        cnames: Vec<ResourceRecord>,
        target: DomainName,
    },
    /// Nothing for the name (NODATA).
    NoData,
}

/// Walks CNAME records in `answers` starting at `qname`.
///
/// `hops` counts CNAMEs followed so far in the whole resolution and is
/// advanced here; passing `max_hops` fails with `CnameChainTooLong`, which
/// also ends CNAME loops.
pub fn follow_answer_chain(
    answers: &[ResourceRecord],
    qname: &DomainName,
    qtype: RecordType,
    hops: &mut usize,
    max_hops: usize,
) -> Result<AnswerChain, DomainError> {
    let mut current = qname.clone();
    let mut cnames = Vec::new();

    loop {
        let records: Vec<ResourceRecord> = answers
            .iter()
            .filter(|r| r.owner == current && r.is_type(qtype))
            .cloned()
            .collect();
        if !records.is_empty() {
            return Ok(AnswerChain::Answered { cnames, records });
        }
        if qtype == RecordType::CNAME {
            break;
        }

        let next = answers.iter().find_map(|r| match &r.data {
            RecordData::CNAME(target) if r.owner == current => Some((r, target)),
            _ => None,
        });
        let Some((record, target)) = next else {
            break;
        };

        *hops += 1;
        if *hops > max_hops {
            return Err(DomainError::CnameChainTooLong(max_hops));
        }
        cnames.push(record.clone());
        current = target.clone();
    }

    if cnames.is_empty() {
        Ok(AnswerChain::NoData)
    } else {
        Ok(AnswerChain::Follow {
            cnames,
            target: current,
        })
    }
}
