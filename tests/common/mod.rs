//! A scripted provider for exercising the open protocol and handle
//! lifecycle without real database files.

#![allow(dead_code)]

pub mod mmdb;

use std::io::Write;
use std::net::IpAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use geoipdb::{CityRecord, Charset, Edition, GeoBackend, LoadError, Loader, OpenFlags, Source};

/// What the fake provider does when asked to open.
#[derive(Debug, Clone)]
pub enum Behavior {
    Open,
    /// Fail with a structured message.
    Report(String),
    /// Write to stderr, then fail without a message.
    Complain(String),
    /// Fail with neither.
    Silent,
}

#[derive(Debug, Default)]
pub struct Counters {
    pub loads: AtomicUsize,
    pub drops: AtomicUsize,
    pub lookups: AtomicUsize,
}

impl Counters {
    pub fn loads(&self) -> usize {
        self.loads.load(Ordering::SeqCst)
    }

    pub fn drops(&self) -> usize {
        self.drops.load(Ordering::SeqCst)
    }

    pub fn lookups(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }
}

#[derive(Debug)]
pub struct FakeLoader {
    pub edition: Edition,
    pub behavior: Behavior,
    pub counters: Arc<Counters>,
    pub last_source: std::sync::Mutex<Option<(Source, OpenFlags)>>,
}

impl FakeLoader {
    pub fn new(edition: Edition) -> Self {
        Self::with_behavior(edition, Behavior::Open)
    }

    pub fn with_behavior(edition: Edition, behavior: Behavior) -> Self {
        FakeLoader {
            edition,
            behavior,
            counters: Arc::new(Counters::default()),
            last_source: std::sync::Mutex::new(None),
        }
    }

    pub fn last_source(&self) -> Option<(Source, OpenFlags)> {
        self.last_source.lock().unwrap().clone()
    }
}

impl Loader for FakeLoader {
    fn load(&self, source: &Source, flags: OpenFlags) -> Result<Box<dyn GeoBackend>, LoadError> {
        self.counters.loads.fetch_add(1, Ordering::SeqCst);
        *self.last_source.lock().unwrap() = Some((source.clone(), flags));

        match &self.behavior {
            Behavior::Open => Ok(Box::new(FakeBackend {
                edition: self.edition,
                charset: Charset::Iso8859_1,
                counters: Arc::clone(&self.counters),
            })),
            Behavior::Report(msg) => Err(LoadError::Reported(msg.clone())),
            Behavior::Complain(text) => {
                // Bypass libtest's print capture so the text reaches fd 2
                std::io::stderr().write_all(text.as_bytes()).unwrap();
                Err(LoadError::Silent)
            }
            Behavior::Silent => Err(LoadError::Silent),
        }
    }
}

/// Answers for a handful of documentation addresses.
#[derive(Debug)]
pub struct FakeBackend {
    edition: Edition,
    charset: Charset,
    counters: Arc<Counters>,
}

impl FakeBackend {
    fn hit(&self) {
        self.counters.lookups.fetch_add(1, Ordering::SeqCst);
    }
}

impl Drop for FakeBackend {
    fn drop(&mut self) {
        self.counters.drops.fetch_add(1, Ordering::SeqCst);
    }
}

pub const US_ADDR: &str = "192.0.2.1";
pub const MISS_ADDR: &str = "198.51.100.7";

impl GeoBackend for FakeBackend {
    fn edition(&self) -> Edition {
        self.edition
    }

    fn info(&self) -> String {
        format!("FAKE {} 20240101 Build 1", self.edition)
    }

    fn charset(&self) -> Charset {
        self.charset
    }

    fn set_charset(&mut self, charset: Charset) {
        self.charset = charset;
    }

    fn country_id(&self, ip: IpAddr) -> u32 {
        self.hit();
        if ip.to_string() == US_ADDR {
            225
        } else {
            0
        }
    }

    fn city_record(&self, ip: IpAddr) -> Option<CityRecord> {
        self.hit();
        (ip.to_string() == US_ADDR).then(|| CityRecord {
            country_code: "US".into(),
            country_code3: "USA".into(),
            country_name: "United States".into(),
            region: "CA".into(),
            city: self.charset.transcode("San José"),
            postal_code: "95141".into(),
            latitude: 37.1835,
            longitude: -121.7714,
            metro_code: 807,
            dma_code: 807,
            area_code: 408,
            charset: self.charset,
            continent_code: "NA".into(),
        })
    }

    fn org(&self, ip: IpAddr) -> Option<String> {
        self.hit();
        if ip.to_string() != US_ADDR {
            return None;
        }
        let org = match self.edition {
            Edition::Asnum | Edition::AsnumV6 => "AS64496 Example Networks",
            Edition::Netspeed | Edition::NetspeedRev1 | Edition::NetspeedRev1V6 => "Cable/DSL",
            _ => "Example Telecom",
        };
        Some(self.charset.transcode(org))
    }
}
