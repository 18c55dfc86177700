//! The seam between the handle layer and whatever actually reads database
//! files.
//!
//! A [`Loader`] turns a [`Source`] into an opened [`GeoBackend`]; the backend
//! answers keyed lookups for one resource until it is dropped. Dropping the
//! boxed backend is the release of the resource.

use std::fmt;
use std::net::{IpAddr, Ipv4Addr, ToSocketAddrs};

use camino::Utf8PathBuf;
use serde::Serialize;

use crate::edition::Edition;
use crate::flags::{Charset, OpenFlags};

/// Where to open a database from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    /// An explicit database file.
    Path(Utf8PathBuf),
    /// The provider's default file for this edition.
    Builtin(Edition),
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Source::Path(path) => write!(f, "{}", path),
            Source::Builtin(edition) => write!(f, "<builtin {}>", edition),
        }
    }
}

/// The three accepted key representations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LookupKey<'a> {
    /// Host or domain name; literal addresses are accepted too.
    Name(&'a str),
    /// Textual IPv4 or IPv6 address.
    Addr(&'a str),
    /// IPv4 address as a host-order integer.
    Ipnum(u32),
}

impl LookupKey<'_> {
    /// Resolve the key to an address. `None` means nothing to look up.
    ///
    /// Names go through the system resolver and prefer an IPv4 answer.
    pub fn resolve(&self) -> Option<IpAddr> {
        match *self {
            LookupKey::Ipnum(num) => Some(IpAddr::V4(Ipv4Addr::from(num))),
            LookupKey::Addr(addr) => addr.trim().parse().ok(),
            LookupKey::Name(name) => {
                let name = name.trim();
                if let Ok(ip) = name.parse::<IpAddr>() {
                    return Some(ip);
                }
                if name.is_empty() {
                    return None;
                }
                let addrs: Vec<IpAddr> = (name, 0)
                    .to_socket_addrs()
                    .ok()?
                    .map(|sa| sa.ip())
                    .collect();
                addrs
                    .iter()
                    .find(|ip| ip.is_ipv4())
                    .or_else(|| addrs.first())
                    .copied()
            }
        }
    }
}

/// Failure reported by a [`Loader`].
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    /// The provider explained what went wrong.
    #[error("{0}")]
    Reported(String),
    /// The provider returned nothing and said nothing through its return
    /// value; it may have written to stderr instead.
    #[error("provider returned no resource")]
    Silent,
}

/// Opens database resources.
pub trait Loader: fmt::Debug + Send + Sync {
    fn load(&self, source: &Source, flags: OpenFlags) -> Result<Box<dyn GeoBackend>, LoadError>;
}

/// One opened database resource.
pub trait GeoBackend: fmt::Debug + Send + Sync {
    /// Edition the resource reports for itself.
    fn edition(&self) -> Edition;

    /// Free-form description of the resource.
    fn info(&self) -> String;

    fn charset(&self) -> Charset;

    fn set_charset(&mut self, charset: Charset);

    /// Country identifier for `ip`; 0 when there is no match.
    fn country_id(&self, ip: IpAddr) -> u32;

    fn city_record(&self, ip: IpAddr) -> Option<CityRecord>;

    /// Organization string (ISP name, `AS<n> <org>`, connection speed).
    fn org(&self, ip: IpAddr) -> Option<String>;
}

/// City-level record as returned by a backend.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct CityRecord {
    pub country_code: String,
    pub country_code3: String,
    pub country_name: String,
    pub region: String,
    pub city: String,
    pub postal_code: String,
    pub latitude: f64,
    pub longitude: f64,
    pub metro_code: i64,
    pub dma_code: i64,
    pub area_code: i64,
    pub charset: Charset,
    pub continent_code: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ipnum_is_host_order_ipv4() {
        assert_eq!(
            LookupKey::Ipnum(0x5DB8_D822).resolve(),
            Some("93.184.216.34".parse().unwrap())
        );
    }

    #[test]
    fn addr_parses_both_families() {
        assert_eq!(
            LookupKey::Addr("81.2.69.160").resolve(),
            Some("81.2.69.160".parse().unwrap())
        );
        assert_eq!(
            LookupKey::Addr(" 2001:db8::1 ").resolve(),
            Some("2001:db8::1".parse().unwrap())
        );
        assert_eq!(LookupKey::Addr("999.1.1.1").resolve(), None);
        assert_eq!(LookupKey::Addr("example.com").resolve(), None);
    }

    #[test]
    fn name_accepts_literals_and_localhost() {
        assert_eq!(
            LookupKey::Name("10.0.0.1").resolve(),
            Some("10.0.0.1".parse().unwrap())
        );
        assert_eq!(LookupKey::Name("").resolve(), None);
        assert_eq!(
            LookupKey::Name("localhost").resolve().map(|ip| ip.is_loopback()),
            Some(true)
        );
    }

    #[test]
    fn source_display() {
        assert_eq!(
            Source::Path("/tmp/GeoIP.dat".into()).to_string(),
            "/tmp/GeoIP.dat"
        );
        assert_eq!(
            Source::Builtin(Edition::Country).to_string(),
            "<builtin country>"
        );
    }
}
