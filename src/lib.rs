//! The geoipdb library: typed handles over IP geolocation databases.
//!
//! Five database kinds are supported: country, city, ISP, autonomous system
//! number and connection speed. Each is opened through the same protocol
//! (flag validation, provider call with stderr capture, edition check,
//! charset setup) and queried by host name, textual address or IPv4 integer.
//!
//! # Examples
//!
//! ```rust,no_run
//! use geoipdb::{country, OpenOptions};
//!
//! let db = country::open(&OpenOptions::new().path("/usr/share/GeoIP/GeoLite2-Country.mmdb"))?;
//!
//! // Every field, in schema order
//! let record = db.query_by_addr("81.2.69.160", &[])?;
//! println!("{}", serde_json::to_string(&record).unwrap());
//!
//! // Just the ones asked for, in the order asked
//! let values = db.query_by_name("example.com", &["name", "code"])?;
//! println!("{:?}", values.values());
//! # Ok::<(), geoipdb::Error>(())
//! ```
//!
//! Other database formats plug in by implementing [`Loader`] and
//! [`GeoBackend`] and opening through `open_with`.

pub mod backend;
pub mod capture;
pub mod countries;
pub mod database;
pub mod edition;
pub mod error;
pub mod flags;
pub mod handles;
pub mod input;
pub mod mmdb;
pub mod projection;
pub mod variant;

pub use crate::backend::{CityRecord, GeoBackend, LoadError, Loader, LookupKey, Source};
pub use crate::database::{Database, OpenOptions};
pub use crate::edition::Edition;
pub use crate::error::{Error, Result};
pub use crate::flags::{Charset, OpenFlags};
pub use crate::handles::{asnum, city, country, isp, netspeed};
pub use crate::handles::{AsnumDb, CityDb, CountryDb, IspDb, NetspeedDb};
pub use crate::mmdb::MmdbLoader;
pub use crate::projection::{FieldValue, QueryResult, Record};
pub use crate::variant::Variant;
