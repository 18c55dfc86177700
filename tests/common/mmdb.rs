//! Writes tiny MaxMind DB files for tests.
//!
//! Every file has a one-node search tree with 24-bit records: addresses whose
//! first bit is 0 (`0.0.0.0/1`, or `::/1` in an IPv6 tree) resolve to the
//! single data record, everything else is a miss. IPv6 trees keep IPv4 under
//! `::/96`, so they answer every IPv4 address.

use std::path::Path;

use camino::Utf8PathBuf;

pub const BUILD_EPOCH: u64 = 1_700_000_000;

/// First-bit-zero address, answered by every fixture.
pub const HIT_ADDR: &str = "81.2.69.160";
/// First-bit-one address, missing from IPv4 fixtures.
pub const MISS_ADDR: &str = "192.0.2.1";
/// First-bit-one address, missing from IPv6 fixtures.
pub const MISS_ADDR_V6: &str = "ff02::1";

const METADATA_MARKER: &[u8] = b"\xab\xcd\xefMaxMind.com";

#[derive(Debug, Clone)]
pub enum Value {
    Str(&'static str),
    U16(u16),
    U32(u32),
    U64(u64),
    Double(f64),
    Map(Vec<(&'static str, Value)>),
    Array(Vec<Value>),
}

fn map(pairs: &[(&'static str, Value)]) -> Value {
    Value::Map(pairs.to_vec())
}

fn names(en: &'static str) -> Value {
    map(&[("en", Value::Str(en))])
}

fn control(out: &mut Vec<u8>, kind: u8, size: usize) {
    let (first, extended) = if kind <= 7 {
        (kind << 5, None)
    } else {
        (0, Some(kind - 7))
    };
    let (low, extra): (u8, Vec<u8>) = match size {
        0..=28 => (size as u8, vec![]),
        29..=284 => (29, vec![(size - 29) as u8]),
        285..=65_820 => (30, ((size - 285) as u16).to_be_bytes().to_vec()),
        _ => (31, ((size - 65_821) as u32).to_be_bytes()[1..].to_vec()),
    };
    out.push(first | low);
    out.extend(extended);
    out.extend(extra);
}

fn uint(out: &mut Vec<u8>, kind: u8, value: u64) {
    let bytes = value.to_be_bytes();
    let skip = bytes.iter().take_while(|b| **b == 0).count();
    control(out, kind, bytes.len() - skip);
    out.extend_from_slice(&bytes[skip..]);
}

fn encode(out: &mut Vec<u8>, value: &Value) {
    match value {
        Value::Str(s) => {
            control(out, 2, s.len());
            out.extend_from_slice(s.as_bytes());
        }
        Value::Double(x) => {
            control(out, 3, 8);
            out.extend_from_slice(&x.to_be_bytes());
        }
        Value::U16(n) => uint(out, 5, u64::from(*n)),
        Value::U32(n) => uint(out, 6, u64::from(*n)),
        Value::U64(n) => uint(out, 9, *n),
        Value::Map(pairs) => {
            control(out, 7, pairs.len());
            for (key, value) in pairs {
                encode(out, &Value::Str(*key));
                encode(out, value);
            }
        }
        Value::Array(items) => {
            control(out, 11, items.len());
            for item in items {
                encode(out, item);
            }
        }
    }
}

/// Write a database of `database_type` holding `record` at the first half of
/// the address space.
pub fn write_db(
    dir: &Path,
    file: &str,
    database_type: &'static str,
    ip_version: u16,
    description: &'static str,
    record: Value,
) -> Utf8PathBuf {
    const NODE_COUNT: u32 = 1;
    // Data pointers count from the node count plus the 16-byte separator
    let record_pointer = NODE_COUNT + 16;

    let mut bytes = Vec::new();
    bytes.extend_from_slice(&record_pointer.to_be_bytes()[1..]);
    bytes.extend_from_slice(&NODE_COUNT.to_be_bytes()[1..]);
    bytes.extend_from_slice(&[0; 16]);
    encode(&mut bytes, &record);

    bytes.extend_from_slice(METADATA_MARKER);
    let metadata = map(&[
        ("binary_format_major_version", Value::U16(2)),
        ("binary_format_minor_version", Value::U16(0)),
        ("build_epoch", Value::U64(BUILD_EPOCH)),
        ("database_type", Value::Str(database_type)),
        ("description", map(&[("en", Value::Str(description))])),
        ("ip_version", Value::U16(ip_version)),
        ("languages", Value::Array(vec![Value::Str("en")])),
        ("node_count", Value::U32(NODE_COUNT)),
        ("record_size", Value::U16(24)),
    ]);
    encode(&mut bytes, &metadata);

    let path = dir.join(file);
    std::fs::write(&path, bytes).unwrap();
    Utf8PathBuf::from_path_buf(path).unwrap()
}

pub fn country_db(dir: &Path, ip_version: u16) -> Utf8PathBuf {
    let gb = map(&[
        ("iso_code", Value::Str("GB")),
        ("names", names("United Kingdom")),
    ]);
    write_db(
        dir,
        &format!("GeoLite2-Country-v{}.mmdb", ip_version),
        "GeoLite2-Country",
        ip_version,
        "Test country database",
        map(&[
            ("continent", map(&[("code", Value::Str("EU"))])),
            ("country", gb.clone()),
            ("registered_country", gb),
        ]),
    )
}

pub fn city_db(dir: &Path) -> Utf8PathBuf {
    write_db(
        dir,
        "GeoLite2-City.mmdb",
        "GeoLite2-City",
        6,
        "Test city database",
        map(&[
            ("city", map(&[("names", names("Łódź"))])),
            ("continent", map(&[("code", Value::Str("EU"))])),
            (
                "country",
                map(&[("iso_code", Value::Str("PL")), ("names", names("Poland"))]),
            ),
            (
                "location",
                map(&[
                    ("latitude", Value::Double(51.7592)),
                    ("longitude", Value::Double(19.456)),
                ]),
            ),
            ("postal", map(&[("code", Value::Str("90-001"))])),
            (
                "subdivisions",
                Value::Array(vec![map(&[("iso_code", Value::Str("10"))])]),
            ),
        ]),
    )
}

pub fn asn_db(dir: &Path) -> Utf8PathBuf {
    write_db(
        dir,
        "GeoLite2-ASN.mmdb",
        "GeoLite2-ASN",
        4,
        "Test ASN database",
        map(&[
            ("autonomous_system_number", Value::U32(64496)),
            ("autonomous_system_organization", Value::Str("Example Networks")),
        ]),
    )
}

pub fn isp_db(dir: &Path) -> Utf8PathBuf {
    write_db(
        dir,
        "GeoIP2-ISP.mmdb",
        "GeoIP2-ISP",
        4,
        "Test ISP database",
        map(&[
            ("autonomous_system_number", Value::U32(64496)),
            ("isp", Value::Str("Example Telecom")),
            ("organization", Value::Str("Example Hosting")),
        ]),
    )
}

pub fn connection_type_db(dir: &Path) -> Utf8PathBuf {
    write_db(
        dir,
        "GeoIP2-Connection-Type.mmdb",
        "GeoIP2-Connection-Type",
        4,
        "Test connection type database",
        map(&[("connection_type", Value::Str("Cable/DSL"))]),
    )
}
