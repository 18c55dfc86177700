use std::fmt;
use std::ops::{BitOr, BitOrAssign};
use std::str::FromStr;

use serde::Serialize;

use crate::error::{Error, Result};

/// Open flags passed through to the lookup provider.
///
/// The numeric values match the legacy GeoIP C API so that values coming
/// from configuration files written for that library keep their meaning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct OpenFlags(u32);

impl OpenFlags {
    pub const STANDARD: OpenFlags = OpenFlags(0);
    pub const MEMORY_CACHE: OpenFlags = OpenFlags(1);
    pub const CHECK_CACHE: OpenFlags = OpenFlags(2);
    pub const INDEX_CACHE: OpenFlags = OpenFlags(4);
    pub const MMAP_CACHE: OpenFlags = OpenFlags(8);

    const NAMED: [(&'static str, OpenFlags); 4] = [
        ("memory-cache", OpenFlags::MEMORY_CACHE),
        ("check-cache", OpenFlags::CHECK_CACHE),
        ("index-cache", OpenFlags::INDEX_CACHE),
        ("mmap-cache", OpenFlags::MMAP_CACHE),
    ];

    pub const fn from_bits(bits: u32) -> Self {
        OpenFlags(bits)
    }

    pub const fn bits(self) -> u32 {
        self.0
    }

    pub const fn is_standard(self) -> bool {
        self.0 == 0
    }

    pub const fn contains(self, other: OpenFlags) -> bool {
        self.0 & other.0 == other.0
    }

    pub const fn intersects(self, other: OpenFlags) -> bool {
        self.0 & other.0 != 0
    }

    pub const fn intersection(self, other: OpenFlags) -> OpenFlags {
        OpenFlags(self.0 & other.0)
    }
}

impl BitOr for OpenFlags {
    type Output = OpenFlags;

    fn bitor(self, rhs: OpenFlags) -> OpenFlags {
        OpenFlags(self.0 | rhs.0)
    }
}

impl BitOrAssign for OpenFlags {
    fn bitor_assign(&mut self, rhs: OpenFlags) {
        self.0 |= rhs.0;
    }
}

impl fmt::Display for OpenFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_standard() {
            return f.write_str("standard");
        }
        let mut first = true;
        let mut rest = self.0;
        for (name, flag) in Self::NAMED {
            if self.contains(flag) {
                if !first {
                    f.write_str("|")?;
                }
                f.write_str(name)?;
                first = false;
                rest &= !flag.0;
            }
        }
        if rest != 0 {
            if !first {
                f.write_str("|")?;
            }
            write!(f, "{:#x}", rest)?;
        }
        Ok(())
    }
}

impl FromStr for OpenFlags {
    type Err = Error;

    /// Parses `standard`, a single flag name, or names joined with `|` or `,`.
    /// A bare integer is taken as the raw bitmask.
    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        if let Ok(bits) = s.parse::<u32>() {
            return Ok(OpenFlags(bits));
        }

        let mut flags = OpenFlags::STANDARD;
        for token in s.split(['|', ',']).map(str::trim) {
            let token = token.to_ascii_lowercase().replace('_', "-");
            if token == "standard" {
                continue;
            }
            match Self::NAMED.iter().find(|(name, _)| *name == token) {
                Some((_, flag)) => flags |= *flag,
                None => {
                    return Err(Error::InvalidArgument(format!(
                        "unknown open flag '{}'",
                        token
                    )))
                }
            }
        }
        Ok(flags)
    }
}

/// Character set used for strings returned by lookups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Charset {
    Iso8859_1 = 0,
    #[default]
    Utf8 = 1,
}

impl Charset {
    pub const ALL: [Charset; 2] = [Charset::Iso8859_1, Charset::Utf8];

    pub const fn code(self) -> i32 {
        self as i32
    }

    /// Transcode provider text (always UTF-8) into this charset's repertoire.
    ///
    /// Latin-1 cannot hold code points above U+00FF; those become `?`.
    pub fn transcode(self, text: &str) -> String {
        match self {
            Charset::Utf8 => text.to_string(),
            Charset::Iso8859_1 => text
                .chars()
                .map(|c| if (c as u32) <= 0xff { c } else { '?' })
                .collect(),
        }
    }
}

impl TryFrom<i32> for Charset {
    type Error = Error;

    fn try_from(value: i32) -> Result<Self> {
        match value {
            0 => Ok(Charset::Iso8859_1),
            1 => Ok(Charset::Utf8),
            other => Err(Error::InvalidArgument(format!(
                "unknown charset {}",
                other
            ))),
        }
    }
}

impl fmt::Display for Charset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Charset::Iso8859_1 => f.write_str("iso-8859-1"),
            Charset::Utf8 => f.write_str("utf-8"),
        }
    }
}

impl FromStr for Charset {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "utf8" | "utf-8" => Ok(Charset::Utf8),
            "iso-8859-1" | "iso8859-1" | "latin1" | "latin-1" => Ok(Charset::Iso8859_1),
            other => other
                .parse::<i32>()
                .map_err(|_| Error::InvalidArgument(format!("unknown charset '{}'", other)))
                .and_then(Charset::try_from),
        }
    }
}
