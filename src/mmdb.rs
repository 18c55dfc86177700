use std::collections::BTreeMap;
use std::net::IpAddr;

use camino::{Utf8Path, Utf8PathBuf};
use maxminddb::{Metadata, Mmap, Reader};
use serde::Deserialize;

use crate::backend::{CityRecord, GeoBackend, LoadError, Loader, Source};
use crate::countries;
use crate::edition::Edition;
use crate::flags::{Charset, OpenFlags};

/// Environment variable naming the directory that holds database files.
pub const DB_DIR_ENV: &str = "GEOIP_MMDB_DIR";
/// Older name for [`DB_DIR_ENV`], still honored.
pub const LEGACY_DB_DIR_ENV: &str = "MAXMIND_MMDB_DIR";

// Searched in order after the environment variables
const DEFAULT_DIRS: [&str; 3] = ["/usr/share/GeoIP", "/opt/homebrew/var/GeoIP", "/var/lib/GeoIP"];

/// Loads MaxMind DB files through the `maxminddb` reader.
#[derive(Debug, Clone)]
pub struct MmdbLoader {
    search_dirs: Vec<Utf8PathBuf>,
}

impl Default for MmdbLoader {
    fn default() -> Self {
        Self::from_env()
    }
}

impl MmdbLoader {
    /// A loader that looks for built-in databases only in `search_dirs`.
    pub fn new(search_dirs: Vec<Utf8PathBuf>) -> Self {
        Self { search_dirs }
    }

    /// Search `GEOIP_MMDB_DIR` (or the deprecated `MAXMIND_MMDB_DIR`), then
    /// the usual system locations.
    pub fn from_env() -> Self {
        let mut search_dirs = Vec::new();
        if let Ok(dir) = std::env::var(DB_DIR_ENV) {
            search_dirs.push(Utf8PathBuf::from(dir));
        } else if let Ok(dir) = std::env::var(LEGACY_DB_DIR_ENV) {
            tracing::warn!(
                "{} is deprecated, please use {} instead",
                LEGACY_DB_DIR_ENV,
                DB_DIR_ENV
            );
            search_dirs.push(Utf8PathBuf::from(dir));
        }
        search_dirs.extend(DEFAULT_DIRS.iter().map(|dir| Utf8PathBuf::from(*dir)));
        Self { search_dirs }
    }

    pub fn search_dirs(&self) -> &[Utf8PathBuf] {
        &self.search_dirs
    }

    /// Turn a source into the file that would be opened for it.
    pub fn resolve(&self, source: &Source) -> Result<Utf8PathBuf, LoadError> {
        let edition = match source {
            Source::Path(path) => return Ok(path.clone()),
            Source::Builtin(edition) => *edition,
        };

        let file = edition.default_file().ok_or_else(|| {
            LoadError::Reported(format!("no default database file for {} edition", edition))
        })?;

        self.search_dirs
            .iter()
            .map(|dir| dir.join(file))
            .find(|path| path.exists())
            .ok_or_else(|| {
                LoadError::Reported(format!(
                    "{} not found in any of: {}",
                    file,
                    self.search_dirs
                        .iter()
                        .map(|d| d.as_str())
                        .collect::<Vec<_>>()
                        .join(", ")
                ))
            })
    }
}

impl Loader for MmdbLoader {
    fn load(&self, source: &Source, flags: OpenFlags) -> Result<Box<dyn GeoBackend>, LoadError> {
        let path = self.resolve(source)?;
        let backend = MmdbBackend::open(&path, flags)?;
        Ok(Box::new(backend))
    }
}

#[derive(Debug)]
enum Db {
    Memory(Reader<Vec<u8>>),
    Mapped(Reader<Mmap>),
}

impl Db {
    fn metadata(&self) -> &Metadata {
        match self {
            Db::Memory(reader) => &reader.metadata,
            Db::Mapped(reader) => &reader.metadata,
        }
    }

    // Any decoder error, including "address not found", is a miss here.
    fn lookup<'de, T: Deserialize<'de>>(&'de self, ip: IpAddr) -> Option<T> {
        match self {
            Db::Memory(reader) => reader.lookup(ip).ok(),
            Db::Mapped(reader) => reader.lookup(ip).ok(),
        }
    }
}

/// One opened MaxMind DB file.
#[derive(Debug)]
pub struct MmdbBackend {
    db: Db,
    path: Utf8PathBuf,
    edition: Edition,
    charset: Charset,
}

impl MmdbBackend {
    /// Open `path`. `MMAP_CACHE` maps the file; every other flag combination
    /// reads it into memory.
    pub fn open(path: &Utf8Path, flags: OpenFlags) -> Result<MmdbBackend, LoadError> {
        let db = if flags.contains(OpenFlags::MMAP_CACHE) {
            Reader::open_mmap(path).map(Db::Mapped)
        } else {
            Reader::open_readfile(path).map(Db::Memory)
        }
        .map_err(|err| LoadError::Reported(format!("failed to open {}: {}", path, err)))?;

        // Runs while stderr is captured, so nothing is logged here.
        let metadata = db.metadata();
        let edition = Edition::from_database_type(&metadata.database_type, metadata.ip_version);

        Ok(MmdbBackend {
            db,
            path: path.to_owned(),
            edition,
            charset: Charset::default(),
        })
    }

    pub fn path(&self) -> &Utf8Path {
        &self.path
    }

    fn text(&self, s: &str) -> String {
        self.charset.transcode(s)
    }

    // An IPv4-only tree would be walked with the IPv6 bits. Only mapped
    // addresses have an answer there.
    fn lookup<'de, T: Deserialize<'de>>(&'de self, ip: IpAddr) -> Option<T> {
        let ip = match ip {
            IpAddr::V6(v6) if !self.edition.is_v6() => IpAddr::V4(v6.to_ipv4_mapped()?),
            ip => ip,
        };
        self.db.lookup(ip)
    }
}

#[derive(Debug, Default, Deserialize)]
struct Place {
    code: Option<String>,
    iso_code: Option<String>,
    names: Option<BTreeMap<String, String>>,
}

impl Place {
    fn english_name(&self) -> Option<&str> {
        self.names.as_ref()?.get("en").map(String::as_str)
    }
}

#[derive(Debug, Default, Deserialize)]
struct CountryLookup {
    continent: Option<Place>,
    country: Option<Place>,
    registered_country: Option<Place>,
}

#[derive(Debug, Default, Deserialize)]
struct Location {
    latitude: Option<f64>,
    longitude: Option<f64>,
    metro_code: Option<u16>,
}

#[derive(Debug, Default, Deserialize)]
struct Postal {
    code: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct CityLookup {
    city: Option<Place>,
    continent: Option<Place>,
    country: Option<Place>,
    registered_country: Option<Place>,
    location: Option<Location>,
    postal: Option<Postal>,
    subdivisions: Option<Vec<Place>>,
}

#[derive(Debug, Default, Deserialize)]
struct OrgLookup {
    isp: Option<String>,
    organization: Option<String>,
    autonomous_system_number: Option<u32>,
    autonomous_system_organization: Option<String>,
    connection_type: Option<String>,
}

fn country_code_of<'a>(
    country: Option<&'a Place>,
    registered: Option<&'a Place>,
    continent: Option<&'a Place>,
) -> Option<&'a str> {
    let iso = |p: Option<&'a Place>| p.and_then(|p| p.iso_code.as_deref());
    iso(country).or_else(|| iso(registered)).or_else(|| {
        // Records resolved only to a continent map onto the regional rows
        match continent.and_then(|c| c.code.as_deref()) {
            Some("EU") => Some("EU"),
            Some("AS") | Some("OC") => Some("AP"),
            _ => None,
        }
    })
}

impl GeoBackend for MmdbBackend {
    fn edition(&self) -> Edition {
        self.edition
    }

    fn info(&self) -> String {
        let metadata = self.db.metadata();
        let mut info = format!("{} Build {}", metadata.database_type, metadata.build_epoch);
        if let Some(description) = metadata.description.get("en") {
            info.push(' ');
            info.push_str(description);
        }
        info
    }

    fn charset(&self) -> Charset {
        self.charset
    }

    fn set_charset(&mut self, charset: Charset) {
        self.charset = charset;
    }

    fn country_id(&self, ip: IpAddr) -> u32 {
        let Some(record) = self.lookup::<CountryLookup>(ip) else {
            return 0;
        };
        country_code_of(
            record.country.as_ref(),
            record.registered_country.as_ref(),
            record.continent.as_ref(),
        )
        .map(countries::id_by_code)
        .unwrap_or(0)
    }

    fn city_record(&self, ip: IpAddr) -> Option<CityRecord> {
        let record = self.lookup::<CityLookup>(ip)?;

        let code = country_code_of(
            record.country.as_ref(),
            record.registered_country.as_ref(),
            record.continent.as_ref(),
        );
        let row = code.and_then(|c| countries::by_id(countries::id_by_code(c)));
        let country_name = record
            .country
            .as_ref()
            .and_then(Place::english_name)
            .or(row.map(|r| r.name))
            .unwrap_or_default();
        let location = record.location.unwrap_or_default();
        let metro_code = location.metro_code.map(i64::from).unwrap_or(0);

        Some(CityRecord {
            country_code: code.unwrap_or_default().to_string(),
            country_code3: row.map(|r| r.code3).unwrap_or_default().to_string(),
            country_name: self.text(country_name),
            region: record
                .subdivisions
                .as_ref()
                .and_then(|subs| subs.first())
                .and_then(|s| s.iso_code.as_deref())
                .unwrap_or_default()
                .to_string(),
            city: self.text(
                record
                    .city
                    .as_ref()
                    .and_then(Place::english_name)
                    .unwrap_or_default(),
            ),
            postal_code: record
                .postal
                .and_then(|p| p.code)
                .unwrap_or_default(),
            latitude: location.latitude.unwrap_or(0.0),
            longitude: location.longitude.unwrap_or(0.0),
            metro_code,
            dma_code: metro_code,
            area_code: 0,
            charset: self.charset,
            continent_code: record
                .continent
                .and_then(|c| c.code)
                .unwrap_or_else(|| "--".to_string()),
        })
    }

    fn org(&self, ip: IpAddr) -> Option<String> {
        let record = self.lookup::<OrgLookup>(ip)?;
        let org = match self.edition {
            Edition::Asnum | Edition::AsnumV6 => {
                let number = record.autonomous_system_number?;
                match record.autonomous_system_organization {
                    Some(name) => format!("AS{} {}", number, name),
                    None => format!("AS{}", number),
                }
            }
            Edition::Netspeed | Edition::NetspeedRev1 | Edition::NetspeedRev1V6 => {
                record.connection_type?
            }
            _ => record.isp.or(record.organization)?,
        };
        Some(self.text(&org))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn utf8_dir(dir: &tempfile::TempDir) -> Utf8PathBuf {
        Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).unwrap()
    }

    #[test]
    fn explicit_path_is_used_verbatim() {
        let loader = MmdbLoader::new(vec![]);
        let path = Utf8PathBuf::from("/nowhere/custom.mmdb");
        assert_eq!(loader.resolve(&Source::Path(path.clone())).unwrap(), path);
    }

    #[test]
    fn builtin_source_searches_directories_in_order() {
        let first = tempfile::tempdir().unwrap();
        let second = tempfile::tempdir().unwrap();
        fs::write(second.path().join("GeoLite2-Country.mmdb"), b"x").unwrap();

        let loader = MmdbLoader::new(vec![utf8_dir(&first), utf8_dir(&second)]);
        let resolved = loader.resolve(&Source::Builtin(Edition::Country)).unwrap();
        assert_eq!(resolved, utf8_dir(&second).join("GeoLite2-Country.mmdb"));

        fs::write(first.path().join("GeoLite2-Country.mmdb"), b"x").unwrap();
        let resolved = loader.resolve(&Source::Builtin(Edition::CountryV6)).unwrap();
        assert_eq!(resolved, utf8_dir(&first).join("GeoLite2-Country.mmdb"));
    }

    #[test]
    fn builtin_source_missing_file_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let loader = MmdbLoader::new(vec![utf8_dir(&dir)]);
        match loader.resolve(&Source::Builtin(Edition::Asnum)) {
            Err(LoadError::Reported(msg)) => assert!(msg.contains("GeoLite2-ASN.mmdb"), "{}", msg),
            other => panic!("unexpected: {:?}", other),
        }
        assert!(matches!(
            loader.resolve(&Source::Builtin(Edition::Unknown)),
            Err(LoadError::Reported(_))
        ));
    }

    #[test]
    fn garbage_file_fails_with_reader_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = utf8_dir(&dir).join("bogus.mmdb");
        fs::write(&path, b"this is not a MaxMind DB").unwrap();

        for flags in [OpenFlags::STANDARD, OpenFlags::MMAP_CACHE] {
            match MmdbBackend::open(&path, flags) {
                Err(LoadError::Reported(msg)) => {
                    assert!(msg.contains("bogus.mmdb"), "{}", msg)
                }
                other => panic!("unexpected: {:?}", other),
            }
        }
    }

    #[test]
    fn missing_file_fails_through_loader() {
        let loader = MmdbLoader::new(vec![]);
        let source = Source::Path("/definitely/not/here.mmdb".into());
        assert!(matches!(
            loader.load(&source, OpenFlags::MEMORY_CACHE),
            Err(LoadError::Reported(_))
        ));
    }

    #[test]
    fn continent_only_records_map_to_regions() {
        let eu = Place {
            code: Some("EU".into()),
            ..Place::default()
        };
        assert_eq!(country_code_of(None, None, Some(&eu)), Some("EU"));

        let gb = Place {
            iso_code: Some("GB".into()),
            ..Place::default()
        };
        assert_eq!(country_code_of(None, Some(&gb), Some(&eu)), Some("GB"));
        assert_eq!(country_code_of(None, None, None), None);
    }
}
