//! Typed handles, one per database kind.
//!
//! Each handle wraps a [`Database`] opened for its variant, so passing a city
//! handle where a country handle is expected is a compile error. A generic
//! [`Database`] converts into a typed handle with `TryFrom`, which checks the
//! edition it holds.

use std::fmt;

use crate::backend::{Loader, LookupKey};
use crate::database::{Database, OpenOptions};
use crate::edition::Edition;
use crate::error::{Error, Result};
use crate::flags::Charset;
use crate::mmdb::MmdbLoader;
use crate::projection::QueryResult;
use crate::variant::Variant;

const NO_FIELDS: &[&str] = &[];

macro_rules! define_handle {
    (
        $(#[$meta:meta])*
        handle: $name:ident,
        module: $module:ident,
        variant: $variant:expr,
        query: $query:tt
    ) => {
        $(#[$meta])*
        #[derive(Debug)]
        pub struct $name {
            db: Database,
        }

        impl $name {
            pub const VARIANT: Variant = $variant;

            /// Open through the default MaxMind DB loader.
            pub fn open(options: &OpenOptions) -> Result<Self> {
                Self::open_with(&MmdbLoader::default(), options)
            }

            pub fn open_with(loader: &dyn Loader, options: &OpenOptions) -> Result<Self> {
                Database::open_with(loader, Self::VARIANT, options).map(|db| Self { db })
            }

            pub fn edition(&self) -> Edition {
                self.db.edition()
            }

            pub fn is_closed(&self) -> bool {
                self.db.is_closed()
            }

            pub fn close(&mut self) {
                self.db.close()
            }

            pub fn charset(&self) -> Result<Charset> {
                self.db.charset_as(Self::VARIANT)
            }

            pub fn set_charset(&mut self, charset: Charset) -> Result<()> {
                self.db.set_charset_as(Self::VARIANT, charset)
            }

            pub fn describe(&self) -> Result<String> {
                self.db.describe_as(Self::VARIANT)
            }

            define_handle!(@query $query);
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                fmt::Display::fmt(&self.db, f)
            }
        }

        impl TryFrom<Database> for $name {
            type Error = Error;

            fn try_from(db: Database) -> Result<Self> {
                db.check_edition(Self::VARIANT)?;
                Ok(Self { db })
            }
        }

        impl From<$name> for Database {
            fn from(handle: $name) -> Database {
                handle.db
            }
        }

        pub mod $module {
            use super::*;

            /// Open through the default MaxMind DB loader.
            pub fn open(options: &OpenOptions) -> Result<$name> {
                $name::open(options)
            }
        }
    };

    (@query fields) => {
        /// Look up a host name (literal addresses work too).
        pub fn query_by_name(&self, name: &str, fields: &[&str]) -> Result<QueryResult> {
            self.db.query_as(Self::VARIANT, LookupKey::Name(name), fields)
        }

        pub fn query_by_addr(&self, addr: &str, fields: &[&str]) -> Result<QueryResult> {
            self.db.query_as(Self::VARIANT, LookupKey::Addr(addr), fields)
        }

        pub fn query_by_ipnum(&self, ipnum: u32, fields: &[&str]) -> Result<QueryResult> {
            self.db.query_as(Self::VARIANT, LookupKey::Ipnum(ipnum), fields)
        }
    };

    (@query org) => {
        /// Look up a host name (literal addresses work too).
        pub fn query_by_name(&self, name: &str) -> Result<QueryResult> {
            self.db.query_as(Self::VARIANT, LookupKey::Name(name), NO_FIELDS)
        }

        pub fn query_by_addr(&self, addr: &str) -> Result<QueryResult> {
            self.db.query_as(Self::VARIANT, LookupKey::Addr(addr), NO_FIELDS)
        }

        pub fn query_by_ipnum(&self, ipnum: u32) -> Result<QueryResult> {
            self.db.query_as(Self::VARIANT, LookupKey::Ipnum(ipnum), NO_FIELDS)
        }
    };
}

define_handle! {
    /// Country database: identifier, codes, continent and name.
    handle: CountryDb,
    module: country,
    variant: Variant::Country,
    query: fields
}

define_handle! {
    /// City database: location records.
    handle: CityDb,
    module: city,
    variant: Variant::City,
    query: fields
}

define_handle! {
    /// ISP database: the ISP name for an address.
    handle: IspDb,
    module: isp,
    variant: Variant::Isp,
    query: org
}

define_handle! {
    /// ASN database: `AS<number> <organization>`.
    handle: AsnumDb,
    module: asnum,
    variant: Variant::Asnum,
    query: org
}

define_handle! {
    /// Connection speed database.
    handle: NetspeedDb,
    module: netspeed,
    variant: Variant::Netspeed,
    query: org
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn handle_variants_match_modules() {
        assert_eq!(CountryDb::VARIANT, Variant::Country);
        assert_eq!(CityDb::VARIANT, Variant::City);
        assert_eq!(IspDb::VARIANT, Variant::Isp);
        assert_eq!(AsnumDb::VARIANT, Variant::Asnum);
        assert_eq!(NetspeedDb::VARIANT, Variant::Netspeed);
    }

    #[test]
    fn index_cache_is_refused_before_loading() {
        let options = OpenOptions::new()
            .path("/does/not/exist.mmdb")
            .flags(crate::OpenFlags::INDEX_CACHE);
        match country::open(&options) {
            Err(Error::Configuration { db, .. }) => assert_eq!(db, "country"),
            other => panic!("unexpected: {:?}", other),
        }
    }
}
