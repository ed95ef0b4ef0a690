//! Canonical zone-file text output

use hickory_proto::rr::rdata::TXT;
use hickory_proto::rr::Name;

use super::records::{RecordData, RecordKind, RecordSet, ResourceRecord};

/// Longest DNS character-string, in bytes
const MAX_CHARACTER_STRING: usize = 255;

/// Owner text relative to `origin`: `@` at the apex, absolute outside the zone
fn owner(name: &Name, origin: &Name) -> String {
    let absolute = name.to_lowercase().to_ascii();
    let apex = origin.to_ascii();
    if absolute == apex {
        return "@".to_string();
    }
    absolute
        .strip_suffix(&apex)
        .and_then(|prefix| prefix.strip_suffix('.'))
        .map_or_else(|| absolute.clone(), str::to_string)
}

fn quote(bytes: &[u8]) -> String {
    let text = String::from_utf8_lossy(bytes);
    let mut quoted = String::with_capacity(text.len() + 2);
    quoted.push('"');
    for c in text.chars() {
        if c == '"' || c == '\\' {
            quoted.push('\\');
        }
        quoted.push(c);
    }
    quoted.push('"');
    quoted
}

/// Quoted character-strings, splitting any longer than 255 bytes
fn txt_strings(txt: &TXT) -> String {
    let mut pieces = Vec::new();
    for data in txt.txt_data() {
        if data.is_empty() {
            pieces.push(quote(&[]));
        }
        pieces.extend(data.chunks(MAX_CHARACTER_STRING).map(quote));
    }
    pieces.join(" ")
}

fn rdata(data: &RecordData) -> String {
    match data {
        RecordData::Soa(soa) => soa.to_string(),
        RecordData::Ns(ns) => ns.to_string(),
        RecordData::Mx(mx) => mx.to_string(),
        RecordData::A(a) => a.to_string(),
        RecordData::Aaaa(aaaa) => aaaa.to_string(),
        RecordData::Cname(cname) => cname.to_string(),
        RecordData::Alias(target) => target.to_string(),
        RecordData::Txt(txt) => txt_strings(txt),
        RecordData::Ptr(ptr) => ptr.to_string(),
        RecordData::Srv(srv) => srv.to_string(),
        RecordData::Caa(caa) => caa.to_string(),
    }
}

fn record_line(record: &ResourceRecord, origin: &Name) -> String {
    format!(
        "{}\t{}\tIN\t{}\t{}\n",
        owner(&record.name, origin),
        record.ttl,
        record.data.kind(),
        rdata(&record.data)
    )
}

/// Serialize a record set as zone-file text for `origin`.
#[must_use]
pub fn write_zone_text(set: &RecordSet, origin: &Name) -> String {
    let mut out = format!("$ORIGIN {}\n", origin.to_ascii());

    let mut current: Option<RecordKind> = None;
    for record in set.iter() {
        let kind = record.data.kind();
        if current != Some(kind) {
            out.push_str(&format!("\n; {kind} records\n"));
            current = Some(kind);
        }
        out.push_str(&record_line(record, origin));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::zone::{parse_zone_text, zone_origin};
    use hickory_proto::rr::rdata::{A, CNAME, SOA};
    use std::net::Ipv4Addr;

    fn name(s: &str) -> Name {
        Name::from_ascii(s).unwrap()
    }

    fn soa() -> ResourceRecord {
        ResourceRecord::new(
            name("example.com."),
            3600,
            RecordData::Soa(SOA::new(
                name("ns1.example.com."),
                name("hostmaster.example.net."),
                42,
                7200,
                3600,
                1_209_600,
                300,
            )),
        )
    }

    #[test]
    fn writes_groups_in_kind_order() {
        let origin = zone_origin("example.com").unwrap();
        let mut set = RecordSet::new();
        set.push(ResourceRecord::new(
            name("_onion.hello.example.com."),
            3600,
            RecordData::Txt(TXT::new(vec!["onion=abcdefghijklmnop.onion".into()])),
        ));
        set.push(ResourceRecord::new(
            name("hello.example.com."),
            120,
            RecordData::Cname(CNAME(name("proxy.oniongate.com."))),
        ));
        set.push(soa());
        set.push(ResourceRecord::new(
            name("proxy.example.com."),
            120,
            RecordData::A(A::from(Ipv4Addr::new(8, 8, 8, 8))),
        ));
        set.push(ResourceRecord::new(
            name("elsewhere.example.org."),
            60,
            RecordData::Alias(name("proxy.oniongate.com.")),
        ));

        let text = write_zone_text(&set, &origin);
        let lines: Vec<&str> = text.lines().filter(|l| !l.is_empty()).collect();
        assert_eq!(lines[0], "$ORIGIN example.com.");
        assert_eq!(lines[1], "; SOA records");
        assert!(lines[2].starts_with("@\t3600\tIN\tSOA\t"));
        assert_eq!(
            &lines[3..],
            [
                "; A records",
                "proxy\t120\tIN\tA\t8.8.8.8",
                "; CNAME records",
                "hello\t120\tIN\tCNAME\tproxy.oniongate.com.",
                "; ALIAS records",
                "elsewhere.example.org.\t60\tIN\tALIAS\tproxy.oniongate.com.",
                "; TXT records",
                "_onion.hello\t3600\tIN\tTXT\t\"onion=abcdefghijklmnop.onion\"",
            ]
        );
    }

    #[test]
    fn long_txt_is_split_and_escaped() {
        let origin = zone_origin("example.com").unwrap();
        let long = "x".repeat(300);
        let mut set = RecordSet::new();
        set.push(ResourceRecord::new(
            name("big.example.com."),
            300,
            RecordData::Txt(TXT::new(vec![long, "say \"hi\"".into()])),
        ));
        let text = write_zone_text(&set, &origin);
        assert!(text.contains(&format!("\"{}\" \"{}\"", "x".repeat(255), "x".repeat(45))));
        assert!(text.contains(r#""say \"hi\"""#));
    }

    #[test]
    fn output_parses_back() {
        let origin = zone_origin("example.com").unwrap();
        let mut set = RecordSet::new();
        set.push(soa());
        set.push(ResourceRecord::new(
            name("www.example.com."),
            300,
            RecordData::A(A::from(Ipv4Addr::new(93, 184, 216, 34))),
        ));

        let reparsed = parse_zone_text(&write_zone_text(&set, &origin), "example.com").unwrap();
        assert_eq!(reparsed.soa().unwrap().serial(), 42);
        assert_eq!(reparsed.get(RecordKind::A), set.get(RecordKind::A));
    }
}
