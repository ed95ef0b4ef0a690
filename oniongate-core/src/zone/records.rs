//! Typed resource records and the ordered record set

use std::collections::BTreeMap;
use std::fmt;

use hickory_proto::rr::rdata::{A, AAAA, CAA, CNAME, MX, NS, PTR, SOA, SRV, TXT};
use hickory_proto::rr::{Name, RData, RecordType};

/// DNS record kinds known to the zone engine, ordered the way they are serialized
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum RecordKind {
    Soa,
    Ns,
    Mx,
    A,
    Aaaa,
    Cname,
    Alias,
    Txt,
    Ptr,
    Srv,
    Caa,
}

impl RecordKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Soa => "SOA",
            Self::Ns => "NS",
            Self::Mx => "MX",
            Self::A => "A",
            Self::Aaaa => "AAAA",
            Self::Cname => "CNAME",
            Self::Alias => "ALIAS",
            Self::Txt => "TXT",
            Self::Ptr => "PTR",
            Self::Srv => "SRV",
            Self::Caa => "CAA",
        }
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Record data, one case per supported kind
///
/// Standard kinds carry the wire types; `Alias` is provider-specific and has no
/// registered type code, so it only holds its target.
#[derive(Debug, Clone, PartialEq)]
pub enum RecordData {
    Soa(SOA),
    Ns(NS),
    Mx(MX),
    A(A),
    Aaaa(AAAA),
    Cname(CNAME),
    Alias(Name),
    Txt(TXT),
    Ptr(PTR),
    Srv(SRV),
    Caa(CAA),
}

impl RecordData {
    #[must_use]
    pub fn kind(&self) -> RecordKind {
        match self {
            Self::Soa(_) => RecordKind::Soa,
            Self::Ns(_) => RecordKind::Ns,
            Self::Mx(_) => RecordKind::Mx,
            Self::A(_) => RecordKind::A,
            Self::Aaaa(_) => RecordKind::Aaaa,
            Self::Cname(_) => RecordKind::Cname,
            Self::Alias(_) => RecordKind::Alias,
            Self::Txt(_) => RecordKind::Txt,
            Self::Ptr(_) => RecordKind::Ptr,
            Self::Srv(_) => RecordKind::Srv,
            Self::Caa(_) => RecordKind::Caa,
        }
    }
}

impl TryFrom<RData> for RecordData {
    /// The type the zone engine does not carry
    type Error = RecordType;

    fn try_from(rdata: RData) -> Result<Self, Self::Error> {
        Ok(match rdata {
            RData::SOA(soa) => Self::Soa(soa),
            RData::NS(ns) => Self::Ns(ns),
            RData::MX(mx) => Self::Mx(mx),
            RData::A(a) => Self::A(a),
            RData::AAAA(aaaa) => Self::Aaaa(aaaa),
            RData::CNAME(cname) => Self::Cname(cname),
            RData::TXT(txt) => Self::Txt(txt),
            RData::PTR(ptr) => Self::Ptr(ptr),
            RData::SRV(srv) => Self::Srv(srv),
            RData::CAA(caa) => Self::Caa(caa),
            other => return Err(other.record_type()),
        })
    }
}

/// One resource record with an absolute owner name
#[derive(Debug, Clone, PartialEq)]
pub struct ResourceRecord {
    pub name: Name,
    pub ttl: u32,
    pub data: RecordData,
}

impl ResourceRecord {
    #[must_use]
    pub fn new(name: Name, ttl: u32, data: RecordData) -> Self {
        Self { name, ttl, data }
    }
}

/// Records grouped by kind; insertion order is kept within a kind
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordSet {
    records: BTreeMap<RecordKind, Vec<ResourceRecord>>,
}

impl RecordSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, record: ResourceRecord) {
        self.records
            .entry(record.data.kind())
            .or_default()
            .push(record);
    }

    #[must_use]
    pub fn get(&self, kind: RecordKind) -> &[ResourceRecord] {
        self.records.get(&kind).map_or(&[], Vec::as_slice)
    }

    /// All records in serialization order
    pub fn iter(&self) -> impl Iterator<Item = &ResourceRecord> {
        self.records.values().flatten()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.values().map(Vec::len).sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The single SOA record, `None` when there are zero or several
    #[must_use]
    pub fn soa(&self) -> Option<&SOA> {
        match self.get(RecordKind::Soa) {
            [ResourceRecord {
                data: RecordData::Soa(soa),
                ..
            }] => Some(soa),
            _ => None,
        }
    }

    /// Replace the serial of the single SOA record; `false` when there is not exactly one
    pub fn set_soa_serial(&mut self, serial: u32) -> bool {
        let Some(records) = self.records.get_mut(&RecordKind::Soa) else {
            return false;
        };
        let [ResourceRecord {
            data: RecordData::Soa(soa),
            ..
        }] = records.as_mut_slice()
        else {
            return false;
        };
        *soa = SOA::new(
            soa.mname().clone(),
            soa.rname().clone(),
            serial,
            soa.refresh(),
            soa.retry(),
            soa.expire(),
            soa.minimum(),
        );
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::Ipv4Addr;

    fn name(s: &str) -> Name {
        Name::from_ascii(s).unwrap()
    }

    fn soa_record(serial: u32) -> ResourceRecord {
        ResourceRecord::new(
            name("example.com."),
            3600,
            RecordData::Soa(SOA::new(
                name("ns1.example.com."),
                name("hostmaster.example.com."),
                serial,
                7200,
                3600,
                1_209_600,
                300,
            )),
        )
    }

    #[test]
    fn iteration_follows_kind_order() {
        let mut set = RecordSet::new();
        set.push(ResourceRecord::new(
            name("www.example.com."),
            300,
            RecordData::Txt(TXT::new(vec!["x".into()])),
        ));
        set.push(ResourceRecord::new(
            name("example.com."),
            300,
            RecordData::Ns(NS(name("ns1.example.com."))),
        ));
        set.push(ResourceRecord::new(
            name("proxy.example.com."),
            120,
            RecordData::A(A::from(Ipv4Addr::new(8, 8, 8, 8))),
        ));
        set.push(ResourceRecord::new(
            name("proxy.example.com."),
            120,
            RecordData::A(A::from(Ipv4Addr::new(1, 1, 1, 1))),
        ));

        let kinds: Vec<RecordKind> = set.iter().map(|r| r.data.kind()).collect();
        assert_eq!(
            kinds,
            vec![RecordKind::Ns, RecordKind::A, RecordKind::A, RecordKind::Txt]
        );
        assert_eq!(
            set.get(RecordKind::A)[0].data,
            RecordData::A(A::from(Ipv4Addr::new(8, 8, 8, 8)))
        );
        assert_eq!(set.len(), 4);
    }

    #[test]
    fn soa_serial_requires_exactly_one() {
        let mut set = RecordSet::new();
        assert!(!set.set_soa_serial(7));

        set.push(soa_record(1));
        assert!(set.set_soa_serial(7));
        let soa = set.soa().unwrap();
        assert_eq!(soa.serial(), 7);
        assert_eq!(soa.minimum(), 300);
        assert_eq!(soa.mname(), &name("ns1.example.com."));

        set.push(soa_record(2));
        assert!(!set.set_soa_serial(8));
        assert!(set.soa().is_none());
    }

    #[test]
    fn unsupported_wire_types_are_rejected() {
        let rdata = RData::CNAME(CNAME(name("target.example.com.")));
        assert!(matches!(
            RecordData::try_from(rdata),
            Ok(RecordData::Cname(_))
        ));

        let hinfo = RData::HINFO(hickory_proto::rr::rdata::HINFO::new(
            "x86".to_string(),
            "linux".to_string(),
        ));
        assert_eq!(RecordData::try_from(hinfo), Err(RecordType::HINFO));
    }
}
