//! Static country table indexed by the legacy GeoIP country identifier.
//!
//! Identifier 0 is the "unknown" row and never corresponds to a real match.
//! Rows after `ZW` are late additions kept at the end so that existing
//! identifiers stay stable; `O1` appears twice and the first row wins when
//! looking up by code.

use rustc_hash::FxHashMap;
use std::sync::OnceLock;

/// One row of the country table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Country {
    pub code: &'static str,
    pub code3: &'static str,
    pub continent: &'static str,
    pub name: &'static str,
}

impl Country {
    const fn new(
        code: &'static str,
        code3: &'static str,
        continent: &'static str,
        name: &'static str,
    ) -> Self {
        Self {
            code,
            code3,
            continent,
            name,
        }
    }
}

static COUNTRIES: [Country; 256] = [
    Country::new("--", "--", "--", "N/A"),
    Country::new("AP", "AP", "AS", "Asia/Pacific Region"),
    Country::new("EU", "EU", "EU", "Europe"),
    Country::new("AD", "AND", "EU", "Andorra"),
    Country::new("AE", "ARE", "AS", "United Arab Emirates"),
    Country::new("AF", "AFG", "AS", "Afghanistan"),
    Country::new("AG", "ATG", "NA", "Antigua and Barbuda"),
    Country::new("AI", "AIA", "NA", "Anguilla"),
    Country::new("AL", "ALB", "EU", "Albania"),
    Country::new("AM", "ARM", "AS", "Armenia"),
    Country::new("CW", "CUW", "NA", "Curacao"),
    Country::new("AO", "AGO", "AF", "Angola"),
    Country::new("AQ", "ATA", "AN", "Antarctica"),
    Country::new("AR", "ARG", "SA", "Argentina"),
    Country::new("AS", "ASM", "OC", "American Samoa"),
    Country::new("AT", "AUT", "EU", "Austria"),
    Country::new("AU", "AUS", "OC", "Australia"),
    Country::new("AW", "ABW", "NA", "Aruba"),
    Country::new("AZ", "AZE", "AS", "Azerbaijan"),
    Country::new("BA", "BIH", "EU", "Bosnia and Herzegovina"),
    Country::new("BB", "BRB", "NA", "Barbados"),
    Country::new("BD", "BGD", "AS", "Bangladesh"),
    Country::new("BE", "BEL", "EU", "Belgium"),
    Country::new("BF", "BFA", "AF", "Burkina Faso"),
    Country::new("BG", "BGR", "EU", "Bulgaria"),
    Country::new("BH", "BHR", "AS", "Bahrain"),
    Country::new("BI", "BDI", "AF", "Burundi"),
    Country::new("BJ", "BEN", "AF", "Benin"),
    Country::new("BM", "BMU", "NA", "Bermuda"),
    Country::new("BN", "BRN", "AS", "Brunei Darussalam"),
    Country::new("BO", "BOL", "SA", "Bolivia"),
    Country::new("BR", "BRA", "SA", "Brazil"),
    Country::new("BS", "BHS", "NA", "Bahamas"),
    Country::new("BT", "BTN", "AS", "Bhutan"),
    Country::new("BV", "BVT", "AN", "Bouvet Island"),
    Country::new("BW", "BWA", "AF", "Botswana"),
    Country::new("BY", "BLR", "EU", "Belarus"),
    Country::new("BZ", "BLZ", "NA", "Belize"),
    Country::new("CA", "CAN", "NA", "Canada"),
    Country::new("CC", "CCK", "AS", "Cocos (Keeling) Islands"),
    Country::new("CD", "COD", "AF", "Congo, The Democratic Republic of the"),
    Country::new("CF", "CAF", "AF", "Central African Republic"),
    Country::new("CG", "COG", "AF", "Congo"),
    Country::new("CH", "CHE", "EU", "Switzerland"),
    Country::new("CI", "CIV", "AF", "Cote D'Ivoire"),
    Country::new("CK", "COK", "OC", "Cook Islands"),
    Country::new("CL", "CHL", "SA", "Chile"),
    Country::new("CM", "CMR", "AF", "Cameroon"),
    Country::new("CN", "CHN", "AS", "China"),
    Country::new("CO", "COL", "SA", "Colombia"),
    Country::new("CR", "CRI", "NA", "Costa Rica"),
    Country::new("CU", "CUB", "NA", "Cuba"),
    Country::new("CV", "CPV", "AF", "Cape Verde"),
    Country::new("CX", "CXR", "AS", "Christmas Island"),
    Country::new("CY", "CYP", "AS", "Cyprus"),
    Country::new("CZ", "CZE", "EU", "Czech Republic"),
    Country::new("DE", "DEU", "EU", "Germany"),
    Country::new("DJ", "DJI", "AF", "Djibouti"),
    Country::new("DK", "DNK", "EU", "Denmark"),
    Country::new("DM", "DMA", "NA", "Dominica"),
    Country::new("DO", "DOM", "NA", "Dominican Republic"),
    Country::new("DZ", "DZA", "AF", "Algeria"),
    Country::new("EC", "ECU", "SA", "Ecuador"),
    Country::new("EE", "EST", "EU", "Estonia"),
    Country::new("EG", "EGY", "AF", "Egypt"),
    Country::new("EH", "ESH", "AF", "Western Sahara"),
    Country::new("ER", "ERI", "AF", "Eritrea"),
    Country::new("ES", "ESP", "EU", "Spain"),
    Country::new("ET", "ETH", "AF", "Ethiopia"),
    Country::new("FI", "FIN", "EU", "Finland"),
    Country::new("FJ", "FJI", "OC", "Fiji"),
    Country::new("FK", "FLK", "SA", "Falkland Islands (Malvinas)"),
    Country::new("FM", "FSM", "OC", "Micronesia, Federated States of"),
    Country::new("FO", "FRO", "EU", "Faroe Islands"),
    Country::new("FR", "FRA", "EU", "France"),
    Country::new("SX", "SXM", "NA", "Sint Maarten (Dutch part)"),
    Country::new("GA", "GAB", "AF", "Gabon"),
    Country::new("GB", "GBR", "EU", "United Kingdom"),
    Country::new("GD", "GRD", "NA", "Grenada"),
    Country::new("GE", "GEO", "AS", "Georgia"),
    Country::new("GF", "GUF", "SA", "French Guiana"),
    Country::new("GH", "GHA", "AF", "Ghana"),
    Country::new("GI", "GIB", "EU", "Gibraltar"),
    Country::new("GL", "GRL", "NA", "Greenland"),
    Country::new("GM", "GMB", "AF", "Gambia"),
    Country::new("GN", "GIN", "AF", "Guinea"),
    Country::new("GP", "GLP", "NA", "Guadeloupe"),
    Country::new("GQ", "GNQ", "AF", "Equatorial Guinea"),
    Country::new("GR", "GRC", "EU", "Greece"),
    Country::new("GS", "SGS", "AN", "South Georgia and the South Sandwich Islands"),
    Country::new("GT", "GTM", "NA", "Guatemala"),
    Country::new("GU", "GUM", "OC", "Guam"),
    Country::new("GW", "GNB", "AF", "Guinea-Bissau"),
    Country::new("GY", "GUY", "SA", "Guyana"),
    Country::new("HK", "HKG", "AS", "Hong Kong"),
    Country::new("HM", "HMD", "AN", "Heard Island and McDonald Islands"),
    Country::new("HN", "HND", "NA", "Honduras"),
    Country::new("HR", "HRV", "EU", "Croatia"),
    Country::new("HT", "HTI", "NA", "Haiti"),
    Country::new("HU", "HUN", "EU", "Hungary"),
    Country::new("ID", "IDN", "AS", "Indonesia"),
    Country::new("IE", "IRL", "EU", "Ireland"),
    Country::new("IL", "ISR", "AS", "Israel"),
    Country::new("IN", "IND", "AS", "India"),
    Country::new("IO", "IOT", "AS", "British Indian Ocean Territory"),
    Country::new("IQ", "IRQ", "AS", "Iraq"),
    Country::new("IR", "IRN", "AS", "Iran, Islamic Republic of"),
    Country::new("IS", "ISL", "EU", "Iceland"),
    Country::new("IT", "ITA", "EU", "Italy"),
    Country::new("JM", "JAM", "NA", "Jamaica"),
    Country::new("JO", "JOR", "AS", "Jordan"),
    Country::new("JP", "JPN", "AS", "Japan"),
    Country::new("KE", "KEN", "AF", "Kenya"),
    Country::new("KG", "KGZ", "AS", "Kyrgyzstan"),
    Country::new("KH", "KHM", "AS", "Cambodia"),
    Country::new("KI", "KIR", "OC", "Kiribati"),
    Country::new("KM", "COM", "AF", "Comoros"),
    Country::new("KN", "KNA", "NA", "Saint Kitts and Nevis"),
    Country::new("KP", "PRK", "AS", "Korea, Democratic People's Republic of"),
    Country::new("KR", "KOR", "AS", "Korea, Republic of"),
    Country::new("KW", "KWT", "AS", "Kuwait"),
    Country::new("KY", "CYM", "NA", "Cayman Islands"),
    Country::new("KZ", "KAZ", "AS", "Kazakhstan"),
    Country::new("LA", "LAO", "AS", "Lao People's Democratic Republic"),
    Country::new("LB", "LBN", "AS", "Lebanon"),
    Country::new("LC", "LCA", "NA", "Saint Lucia"),
    Country::new("LI", "LIE", "EU", "Liechtenstein"),
    Country::new("LK", "LKA", "AS", "Sri Lanka"),
    Country::new("LR", "LBR", "AF", "Liberia"),
    Country::new("LS", "LSO", "AF", "Lesotho"),
    Country::new("LT", "LTU", "EU", "Lithuania"),
    Country::new("LU", "LUX", "EU", "Luxembourg"),
    Country::new("LV", "LVA", "EU", "Latvia"),
    Country::new("LY", "LBY", "AF", "Libya"),
    Country::new("MA", "MAR", "AF", "Morocco"),
    Country::new("MC", "MCO", "EU", "Monaco"),
    Country::new("MD", "MDA", "EU", "Moldova, Republic of"),
    Country::new("MG", "MDG", "AF", "Madagascar"),
    Country::new("MH", "MHL", "OC", "Marshall Islands"),
    Country::new("MK", "MKD", "EU", "Macedonia"),
    Country::new("ML", "MLI", "AF", "Mali"),
    Country::new("MM", "MMR", "AS", "Myanmar"),
    Country::new("MN", "MNG", "AS", "Mongolia"),
    Country::new("MO", "MAC", "AS", "Macau"),
    Country::new("MP", "MNP", "OC", "Northern Mariana Islands"),
    Country::new("MQ", "MTQ", "NA", "Martinique"),
    Country::new("MR", "MRT", "AF", "Mauritania"),
    Country::new("MS", "MSR", "NA", "Montserrat"),
    Country::new("MT", "MLT", "EU", "Malta"),
    Country::new("MU", "MUS", "AF", "Mauritius"),
    Country::new("MV", "MDV", "AS", "Maldives"),
    Country::new("MW", "MWI", "AF", "Malawi"),
    Country::new("MX", "MEX", "NA", "Mexico"),
    Country::new("MY", "MYS", "AS", "Malaysia"),
    Country::new("MZ", "MOZ", "AF", "Mozambique"),
    Country::new("NA", "NAM", "AF", "Namibia"),
    Country::new("NC", "NCL", "OC", "New Caledonia"),
    Country::new("NE", "NER", "AF", "Niger"),
    Country::new("NF", "NFK", "OC", "Norfolk Island"),
    Country::new("NG", "NGA", "AF", "Nigeria"),
    Country::new("NI", "NIC", "NA", "Nicaragua"),
    Country::new("NL", "NLD", "EU", "Netherlands"),
    Country::new("NO", "NOR", "EU", "Norway"),
    Country::new("NP", "NPL", "AS", "Nepal"),
    Country::new("NR", "NRU", "OC", "Nauru"),
    Country::new("NU", "NIU", "OC", "Niue"),
    Country::new("NZ", "NZL", "OC", "New Zealand"),
    Country::new("OM", "OMN", "AS", "Oman"),
    Country::new("PA", "PAN", "NA", "Panama"),
    Country::new("PE", "PER", "SA", "Peru"),
    Country::new("PF", "PYF", "OC", "French Polynesia"),
    Country::new("PG", "PNG", "OC", "Papua New Guinea"),
    Country::new("PH", "PHL", "AS", "Philippines"),
    Country::new("PK", "PAK", "AS", "Pakistan"),
    Country::new("PL", "POL", "EU", "Poland"),
    Country::new("PM", "SPM", "NA", "Saint Pierre and Miquelon"),
    Country::new("PN", "PCN", "OC", "Pitcairn Islands"),
    Country::new("PR", "PRI", "NA", "Puerto Rico"),
    Country::new("PS", "PSE", "AS", "Palestinian Territory"),
    Country::new("PT", "PRT", "EU", "Portugal"),
    Country::new("PW", "PLW", "OC", "Palau"),
    Country::new("PY", "PRY", "SA", "Paraguay"),
    Country::new("QA", "QAT", "AS", "Qatar"),
    Country::new("RE", "REU", "AF", "Reunion"),
    Country::new("RO", "ROU", "EU", "Romania"),
    Country::new("RU", "RUS", "EU", "Russian Federation"),
    Country::new("RW", "RWA", "AF", "Rwanda"),
    Country::new("SA", "SAU", "AS", "Saudi Arabia"),
    Country::new("SB", "SLB", "OC", "Solomon Islands"),
    Country::new("SC", "SYC", "AF", "Seychelles"),
    Country::new("SD", "SDN", "AF", "Sudan"),
    Country::new("SE", "SWE", "EU", "Sweden"),
    Country::new("SG", "SGP", "AS", "Singapore"),
    Country::new("SH", "SHN", "AF", "Saint Helena"),
    Country::new("SI", "SVN", "EU", "Slovenia"),
    Country::new("SJ", "SJM", "EU", "Svalbard and Jan Mayen"),
    Country::new("SK", "SVK", "EU", "Slovakia"),
    Country::new("SL", "SLE", "AF", "Sierra Leone"),
    Country::new("SM", "SMR", "EU", "San Marino"),
    Country::new("SN", "SEN", "AF", "Senegal"),
    Country::new("SO", "SOM", "AF", "Somalia"),
    Country::new("SR", "SUR", "SA", "Suriname"),
    Country::new("ST", "STP", "AF", "Sao Tome and Principe"),
    Country::new("SV", "SLV", "NA", "El Salvador"),
    Country::new("SY", "SYR", "AS", "Syrian Arab Republic"),
    Country::new("SZ", "SWZ", "AF", "Swaziland"),
    Country::new("TC", "TCA", "NA", "Turks and Caicos Islands"),
    Country::new("TD", "TCD", "AF", "Chad"),
    Country::new("TF", "ATF", "AN", "French Southern Territories"),
    Country::new("TG", "TGO", "AF", "Togo"),
    Country::new("TH", "THA", "AS", "Thailand"),
    Country::new("TJ", "TJK", "AS", "Tajikistan"),
    Country::new("TK", "TKL", "OC", "Tokelau"),
    Country::new("TM", "TKM", "AS", "Turkmenistan"),
    Country::new("TN", "TUN", "AF", "Tunisia"),
    Country::new("TO", "TON", "OC", "Tonga"),
    Country::new("TL", "TLS", "AS", "Timor-Leste"),
    Country::new("TR", "TUR", "EU", "Turkey"),
    Country::new("TT", "TTO", "NA", "Trinidad and Tobago"),
    Country::new("TV", "TUV", "OC", "Tuvalu"),
    Country::new("TW", "TWN", "AS", "Taiwan"),
    Country::new("TZ", "TZA", "AF", "Tanzania, United Republic of"),
    Country::new("UA", "UKR", "EU", "Ukraine"),
    Country::new("UG", "UGA", "AF", "Uganda"),
    Country::new("UM", "UMI", "OC", "United States Minor Outlying Islands"),
    Country::new("US", "USA", "NA", "United States"),
    Country::new("UY", "URY", "SA", "Uruguay"),
    Country::new("UZ", "UZB", "AS", "Uzbekistan"),
    Country::new("VA", "VAT", "EU", "Holy See (Vatican City State)"),
    Country::new("VC", "VCT", "NA", "Saint Vincent and the Grenadines"),
    Country::new("VE", "VEN", "SA", "Venezuela"),
    Country::new("VG", "VGB", "NA", "Virgin Islands, British"),
    Country::new("VI", "VIR", "NA", "Virgin Islands, U.S."),
    Country::new("VN", "VNM", "AS", "Vietnam"),
    Country::new("VU", "VUT", "OC", "Vanuatu"),
    Country::new("WF", "WLF", "OC", "Wallis and Futuna"),
    Country::new("WS", "WSM", "OC", "Samoa"),
    Country::new("YE", "YEM", "AS", "Yemen"),
    Country::new("YT", "MYT", "AF", "Mayotte"),
    Country::new("RS", "SRB", "EU", "Serbia"),
    Country::new("ZA", "ZAF", "AF", "South Africa"),
    Country::new("ZM", "ZMB", "AF", "Zambia"),
    Country::new("ME", "MNE", "EU", "Montenegro"),
    Country::new("ZW", "ZWE", "AF", "Zimbabwe"),
    Country::new("A1", "A1", "--", "Anonymous Proxy"),
    Country::new("A2", "A2", "--", "Satellite Provider"),
    Country::new("O1", "O1", "--", "Other"),
    Country::new("AX", "ALA", "EU", "Aland Islands"),
    Country::new("GG", "GGY", "EU", "Guernsey"),
    Country::new("IM", "IMN", "EU", "Isle of Man"),
    Country::new("JE", "JEY", "EU", "Jersey"),
    Country::new("BL", "BLM", "NA", "Saint Barthelemy"),
    Country::new("MF", "MAF", "NA", "Saint Martin"),
    Country::new("BQ", "BES", "NA", "Bonaire, Saint Eustatius and Saba"),
    Country::new("SS", "SSD", "AF", "South Sudan"),
    Country::new("O1", "O1", "--", "Other"),
];

static CODE_INDEX: OnceLock<FxHashMap<&'static str, u32>> = OnceLock::new();

fn code_index() -> &'static FxHashMap<&'static str, u32> {
    CODE_INDEX.get_or_init(|| {
        let mut index = FxHashMap::with_capacity_and_hasher(COUNTRIES.len(), Default::default());
        for (id, country) in COUNTRIES.iter().enumerate().skip(1) {
            index.entry(country.code).or_insert(id as u32);
        }
        index
    })
}

/// Look up a country row by identifier. Identifier 0 is not a country.
pub fn by_id(id: u32) -> Option<&'static Country> {
    if id == 0 {
        return None;
    }
    COUNTRIES.get(id as usize)
}

/// Map a two-letter code (case-insensitive) to its identifier, 0 when unknown.
pub fn id_by_code(code: &str) -> u32 {
    let mut upper = [0u8; 2];
    let bytes = code.as_bytes();
    if bytes.len() != 2 {
        return 0;
    }
    upper[0] = bytes[0].to_ascii_uppercase();
    upper[1] = bytes[1].to_ascii_uppercase();
    std::str::from_utf8(&upper)
        .ok()
        .and_then(|code| code_index().get(code).copied())
        .unwrap_or(0)
}

/// Number of rows, including the unknown row at identifier 0.
pub fn len() -> usize {
    COUNTRIES.len()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn well_known_ids() {
        assert_eq!(id_by_code("US"), 225);
        assert_eq!(id_by_code("gb"), 77);
        assert_eq!(id_by_code("DE"), 56);

        let us = by_id(225).unwrap();
        assert_eq!(us.code3, "USA");
        assert_eq!(us.continent, "NA");
        assert_eq!(us.name, "United States");
    }

    #[test]
    fn zero_is_not_a_country() {
        assert!(by_id(0).is_none());
        assert_eq!(id_by_code("--"), 0);
    }

    #[test]
    fn unknown_codes() {
        assert_eq!(id_by_code("ZZ"), 0);
        assert_eq!(id_by_code("USA"), 0);
        assert_eq!(id_by_code(""), 0);
        assert!(by_id(len() as u32).is_none());
    }

    #[test]
    fn duplicate_code_resolves_to_first_row() {
        let id = id_by_code("O1");
        assert!(id > 0 && (id as usize) < len() - 1);
        assert_eq!(by_id(id).unwrap().name, "Other");
    }
}
