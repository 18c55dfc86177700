//! Static configuration of the five database kinds.
//!
//! Each [`Variant`] is plain data handed to the shared opener and projector:
//! the editions it accepts, the flags it opens with by default, the flags it
//! refuses, and the shape of its query results.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::backend::CityRecord;
use crate::countries::{self, Country};
use crate::edition::Edition;
use crate::error::{Error, Result};
use crate::flags::OpenFlags;
use crate::projection::{Field, FieldSchema, FieldValue};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Variant {
    Country,
    City,
    Isp,
    Asnum,
    Netspeed,
}

impl Variant {
    pub const ALL: [Variant; 5] = [
        Variant::Country,
        Variant::City,
        Variant::Isp,
        Variant::Asnum,
        Variant::Netspeed,
    ];

    pub const fn name(self) -> &'static str {
        match self {
            Variant::Country => "country",
            Variant::City => "city",
            Variant::Isp => "isp",
            Variant::Asnum => "asnum",
            Variant::Netspeed => "netspeed",
        }
    }

    pub fn config(self) -> &'static VariantConfig {
        match self {
            Variant::Country => &COUNTRY,
            Variant::City => &CITY,
            Variant::Isp => &ISP,
            Variant::Asnum => &ASNUM,
            Variant::Netspeed => &NETSPEED,
        }
    }

    pub fn accepts(self, edition: Edition) -> bool {
        self.config().allowed_editions.contains(&edition)
    }

    /// The variant whose allowed editions include `edition`, if any.
    pub fn for_edition(edition: Edition) -> Option<Variant> {
        Self::ALL.into_iter().find(|v| v.accepts(edition))
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Variant {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        Self::ALL
            .into_iter()
            .find(|v| v.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| Error::InvalidArgument(format!("unknown database kind '{}'", s)))
    }
}

/// What a variant's queries return.
#[derive(Debug)]
pub enum Shape {
    Country(&'static FieldSchema<CountryRow>),
    City(&'static FieldSchema<CityRecord>),
    /// A single organization string, reported under `field`.
    Org { field: &'static str },
}

impl Shape {
    pub fn field_names(&self) -> Vec<&'static str> {
        match self {
            Shape::Country(schema) => schema.names().collect(),
            Shape::City(schema) => schema.names().collect(),
            Shape::Org { field } => vec![*field],
        }
    }
}

#[derive(Debug)]
pub struct VariantConfig {
    pub variant: Variant,
    pub default_edition: Edition,
    pub default_flags: OpenFlags,
    pub forbidden_flags: OpenFlags,
    pub allowed_editions: &'static [Edition],
    pub shape: Shape,
}

/// A country table row paired with its identifier.
#[derive(Debug, Clone, Copy)]
pub struct CountryRow {
    pub id: u32,
    pub country: &'static Country,
}

impl CountryRow {
    /// `None` for identifier 0 or an identifier outside the table.
    pub fn from_id(id: u32) -> Option<CountryRow> {
        countries::by_id(id).map(|country| CountryRow { id, country })
    }
}

static COUNTRY_FIELDS: [Field<CountryRow>; 5] = [
    Field::new("id", "Country identifier", |r: &CountryRow| {
        FieldValue::from(r.id)
    }),
    Field::new("code", "ISO 3166 two-letter code", |r: &CountryRow| {
        FieldValue::from(r.country.code)
    }),
    Field::new("code3", "ISO 3166 three-letter code", |r: &CountryRow| {
        FieldValue::from(r.country.code3)
    }),
    Field::new("continent", "Continent code", |r: &CountryRow| {
        FieldValue::from(r.country.continent)
    }),
    Field::new("name", "Country name", |r: &CountryRow| {
        FieldValue::from(r.country.name)
    }),
];

pub static COUNTRY_SCHEMA: FieldSchema<CountryRow> = FieldSchema::new(&COUNTRY_FIELDS);

static CITY_FIELDS: [Field<CityRecord>; 13] = [
    Field::new("country_code", "ISO 3166 two-letter code", |r: &CityRecord| {
        FieldValue::from(r.country_code.as_str())
    }),
    Field::new("country_code3", "ISO 3166 three-letter code", |r: &CityRecord| {
        FieldValue::from(r.country_code3.as_str())
    }),
    Field::new("country_name", "Country name", |r: &CityRecord| {
        FieldValue::from(r.country_name.as_str())
    }),
    Field::new("region", "Region or subdivision code", |r: &CityRecord| {
        FieldValue::from(r.region.as_str())
    }),
    Field::new("city", "City name", |r: &CityRecord| {
        FieldValue::from(r.city.as_str())
    }),
    Field::new("postal_code", "Postal code", |r: &CityRecord| {
        FieldValue::from(r.postal_code.as_str())
    }),
    Field::new("latitude", "Latitude", |r: &CityRecord| {
        FieldValue::from(r.latitude)
    }),
    Field::new("longitude", "Longitude", |r: &CityRecord| {
        FieldValue::from(r.longitude)
    }),
    Field::new("metro_code", "Metro code (US only)", |r: &CityRecord| {
        FieldValue::from(r.metro_code)
    }),
    Field::new("dma_code", "DMA code (US only)", |r: &CityRecord| {
        FieldValue::from(r.dma_code)
    }),
    Field::new("area_code", "Telephone area code (US only)", |r: &CityRecord| {
        FieldValue::from(r.area_code)
    }),
    Field::new("charset", "Charset of the string fields", |r: &CityRecord| {
        FieldValue::from(i64::from(r.charset.code()))
    }),
    Field::new("continent_code", "Continent code", |r: &CityRecord| {
        FieldValue::from(r.continent_code.as_str())
    }),
];

pub static CITY_SCHEMA: FieldSchema<CityRecord> = FieldSchema::new(&CITY_FIELDS);

static COUNTRY: VariantConfig = VariantConfig {
    variant: Variant::Country,
    default_edition: Edition::Country,
    default_flags: OpenFlags::STANDARD,
    forbidden_flags: OpenFlags::INDEX_CACHE,
    allowed_editions: &[Edition::Country, Edition::CountryV6],
    shape: Shape::Country(&COUNTRY_SCHEMA),
};

static CITY: VariantConfig = VariantConfig {
    variant: Variant::City,
    default_edition: Edition::CityRev1,
    default_flags: OpenFlags::MEMORY_CACHE,
    forbidden_flags: OpenFlags::INDEX_CACHE,
    allowed_editions: &[
        Edition::CityRev0,
        Edition::CityRev1,
        Edition::CityRev0V6,
        Edition::CityRev1V6,
    ],
    shape: Shape::City(&CITY_SCHEMA),
};

static ISP: VariantConfig = VariantConfig {
    variant: Variant::Isp,
    default_edition: Edition::Isp,
    default_flags: OpenFlags::MEMORY_CACHE,
    forbidden_flags: OpenFlags::INDEX_CACHE,
    allowed_editions: &[Edition::Isp, Edition::IspV6],
    shape: Shape::Org { field: "isp_name" },
};

static ASNUM: VariantConfig = VariantConfig {
    variant: Variant::Asnum,
    default_edition: Edition::Asnum,
    default_flags: OpenFlags::MEMORY_CACHE,
    forbidden_flags: OpenFlags::INDEX_CACHE,
    allowed_editions: &[Edition::Asnum, Edition::AsnumV6],
    shape: Shape::Org { field: "asnum" },
};

static NETSPEED: VariantConfig = VariantConfig {
    variant: Variant::Netspeed,
    default_edition: Edition::NetspeedRev1,
    default_flags: OpenFlags::MEMORY_CACHE,
    forbidden_flags: OpenFlags::INDEX_CACHE,
    allowed_editions: &[
        Edition::Netspeed,
        Edition::NetspeedRev1,
        Edition::NetspeedRev1V6,
    ],
    shape: Shape::Org { field: "net_speed" },
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_variant_forbids_index_cache() {
        for variant in Variant::ALL {
            let config = variant.config();
            assert_eq!(config.variant, variant);
            assert!(config.forbidden_flags.contains(OpenFlags::INDEX_CACHE));
            assert!(!config.default_flags.intersects(config.forbidden_flags));
            assert!(variant.accepts(config.default_edition));
        }
    }

    #[test]
    fn editions_belong_to_exactly_one_variant() {
        for variant in Variant::ALL {
            for &edition in variant.config().allowed_editions {
                assert_eq!(Variant::for_edition(edition), Some(variant));
            }
        }
        assert_eq!(Variant::for_edition(Edition::Domain), None);
        assert_eq!(Variant::for_edition(Edition::Unknown), None);
    }

    #[test]
    fn country_schema_order() {
        assert_eq!(
            COUNTRY_SCHEMA.names().collect::<Vec<_>>(),
            vec!["id", "code", "code3", "continent", "name"]
        );
    }

    #[test]
    fn country_row_projection() {
        let row = CountryRow::from_id(225).unwrap();
        let result = COUNTRY_SCHEMA
            .select(&["name", "code"])
            .unwrap()
            .render(&row);
        assert_eq!(
            result.values().unwrap(),
            &[FieldValue::from("United States"), FieldValue::from("US")]
        );
        assert!(CountryRow::from_id(0).is_none());
    }

    #[test]
    fn city_schema_has_thirteen_fields() {
        assert_eq!(CITY_SCHEMA.fields().len(), 13);
        assert_eq!(CITY_SCHEMA.position("continent_code"), Some(12));
    }

    #[test]
    fn parse_variant_names() {
        assert_eq!("ASNUM".parse::<Variant>().unwrap(), Variant::Asnum);
        assert!("region".parse::<Variant>().is_err());
    }
}
