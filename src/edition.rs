use std::fmt;

use serde::Serialize;

/// Database edition reported by an opened resource.
///
/// Discriminants are the legacy GeoIP edition codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Edition {
    Country = 1,
    CityRev1 = 2,
    RegionRev1 = 3,
    Isp = 4,
    Org = 5,
    CityRev0 = 6,
    RegionRev0 = 7,
    Proxy = 8,
    Asnum = 9,
    Netspeed = 10,
    Domain = 11,
    CountryV6 = 12,
    AsnumV6 = 21,
    IspV6 = 22,
    OrgV6 = 23,
    DomainV6 = 24,
    CityRev1V6 = 30,
    CityRev0V6 = 31,
    NetspeedRev1 = 32,
    NetspeedRev1V6 = 33,
    Unknown = 0,
}

impl Edition {
    pub const fn code(self) -> u8 {
        self as u8
    }

    /// Classify an MMDB `database_type` metadata string.
    ///
    /// MMDB trees built for IPv6 also answer IPv4 queries, so `ip_version == 6`
    /// maps to the `V6` edition where one exists.
    pub fn from_database_type(database_type: &str, ip_version: u16) -> Edition {
        let v6 = ip_version == 6;
        let pick = |v4: Edition, v6_edition: Edition| if v6 { v6_edition } else { v4 };

        if database_type.contains("Connection-Type") || database_type.contains("NetSpeed") {
            pick(Edition::NetspeedRev1, Edition::NetspeedRev1V6)
        } else if database_type.contains("ISP") {
            pick(Edition::Isp, Edition::IspV6)
        } else if database_type.contains("ASN") {
            pick(Edition::Asnum, Edition::AsnumV6)
        } else if database_type.contains("City") || database_type.contains("Enterprise") {
            pick(Edition::CityRev1, Edition::CityRev1V6)
        } else if database_type.contains("Country") {
            pick(Edition::Country, Edition::CountryV6)
        } else if database_type.contains("Domain") {
            pick(Edition::Domain, Edition::DomainV6)
        } else {
            Edition::Unknown
        }
    }

    pub const fn is_v6(self) -> bool {
        matches!(
            self,
            Edition::CountryV6
                | Edition::AsnumV6
                | Edition::IspV6
                | Edition::OrgV6
                | Edition::DomainV6
                | Edition::CityRev1V6
                | Edition::CityRev0V6
                | Edition::NetspeedRev1V6
        )
    }

    /// Base name of the file the provider looks for when asked for this
    /// edition without an explicit path.
    pub const fn default_file(self) -> Option<&'static str> {
        match self {
            Edition::Country | Edition::CountryV6 => Some("GeoLite2-Country.mmdb"),
            Edition::CityRev0 | Edition::CityRev1 | Edition::CityRev0V6 | Edition::CityRev1V6 => {
                Some("GeoLite2-City.mmdb")
            }
            Edition::Isp | Edition::IspV6 => Some("GeoIP2-ISP.mmdb"),
            Edition::Asnum | Edition::AsnumV6 => Some("GeoLite2-ASN.mmdb"),
            Edition::Netspeed | Edition::NetspeedRev1 | Edition::NetspeedRev1V6 => {
                Some("GeoIP2-Connection-Type.mmdb")
            }
            Edition::Domain | Edition::DomainV6 => Some("GeoIP2-Domain.mmdb"),
            _ => None,
        }
    }
}

impl fmt::Display for Edition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Edition::Country => "country",
            Edition::CityRev1 => "city rev1",
            Edition::RegionRev1 => "region rev1",
            Edition::Isp => "isp",
            Edition::Org => "organization",
            Edition::CityRev0 => "city rev0",
            Edition::RegionRev0 => "region rev0",
            Edition::Proxy => "proxy",
            Edition::Asnum => "asnum",
            Edition::Netspeed => "netspeed",
            Edition::Domain => "domain",
            Edition::CountryV6 => "country v6",
            Edition::AsnumV6 => "asnum v6",
            Edition::IspV6 => "isp v6",
            Edition::OrgV6 => "organization v6",
            Edition::DomainV6 => "domain v6",
            Edition::CityRev1V6 => "city rev1 v6",
            Edition::CityRev0V6 => "city rev0 v6",
            Edition::NetspeedRev1 => "netspeed rev1",
            Edition::NetspeedRev1V6 => "netspeed rev1 v6",
            Edition::Unknown => "unknown",
        };
        f.write_str(name)
    }
}
