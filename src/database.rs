//! Opening databases and the lifecycle of an opened handle.

use std::fmt;

use camino::Utf8PathBuf;

use crate::backend::{GeoBackend, LoadError, Loader, LookupKey, Source};
use crate::capture::{capture_stderr, Captured};
use crate::edition::Edition;
use crate::error::{Error, Result};
use crate::flags::{Charset, OpenFlags};
use crate::mmdb::MmdbLoader;
use crate::projection::{FieldValue, QueryResult};
use crate::variant::{CountryRow, Shape, Variant};

/// Diagnostic used when the provider failed without saying why.
pub const OPEN_FALLBACK_MESSAGE: &str = "failed to open database file";

// Name used in messages when no variant has been chosen yet
const ANY_DB: &str = "geoip";

/// How to open a database.
///
/// Without a path the provider's default file for the variant's default
/// edition is used. Unset flags and charset fall back to the variant's
/// default flags and UTF-8.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OpenOptions {
    path: Option<Utf8PathBuf>,
    flags: Option<OpenFlags>,
    charset: Option<Charset>,
}

impl OpenOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn path(mut self, path: impl Into<Utf8PathBuf>) -> Self {
        self.path = Some(path.into());
        self
    }

    pub fn flags(mut self, flags: OpenFlags) -> Self {
        self.flags = Some(flags);
        self
    }

    pub fn charset(mut self, charset: Charset) -> Self {
        self.charset = Some(charset);
        self
    }

    fn source(&self, default_edition: Edition) -> Source {
        match &self.path {
            Some(path) => Source::Path(path.clone()),
            None => Source::Builtin(default_edition),
        }
    }
}

/// An opened database of one [`Variant`].
///
/// The underlying resource is released by the first of [`Database::close`]
/// or drop. Query-bearing calls on a closed handle fail with
/// [`Error::UseAfterClose`].
pub struct Database {
    variant: Variant,
    edition: Edition,
    backend: Option<Box<dyn GeoBackend>>,
}

impl Database {
    /// Open a `variant` database through the default MaxMind DB loader.
    pub fn open(variant: Variant, options: &OpenOptions) -> Result<Database> {
        Self::open_with(&MmdbLoader::default(), variant, options)
    }

    /// Open a `variant` database through `loader`.
    pub fn open_with(
        loader: &dyn Loader,
        variant: Variant,
        options: &OpenOptions,
    ) -> Result<Database> {
        let config = variant.config();
        let db = variant.name();

        let flags = options.flags.unwrap_or(config.default_flags);
        if flags.intersects(config.forbidden_flags) {
            return Err(Error::Configuration { db, flags });
        }

        let source = options.source(config.default_edition);
        tracing::debug!(%source, %flags, "opening {} db", variant);
        let mut backend = load(loader, db, &source, flags)?;

        let edition = backend.edition();
        if !variant.accepts(edition) {
            let info = backend.info();
            drop(backend);
            tracing::debug!(%source, %edition, "rejected {} db with wrong edition", variant);
            return Err(Error::TypeMismatch { db, info });
        }

        backend.set_charset(options.charset.unwrap_or_default());
        Ok(Database {
            variant,
            edition,
            backend: Some(backend),
        })
    }

    /// Open a database file without naming its variant; the variant is taken
    /// from the edition the file reports.
    pub fn open_any(options: &OpenOptions) -> Result<Database> {
        Self::open_any_with(&MmdbLoader::default(), options)
    }

    pub fn open_any_with(loader: &dyn Loader, options: &OpenOptions) -> Result<Database> {
        let path = options.path.clone().ok_or_else(|| {
            Error::InvalidArgument("a database path is required when the kind is not given".into())
        })?;

        let flags = options.flags.unwrap_or(OpenFlags::STANDARD);
        let forbidden = Variant::ALL
            .iter()
            .fold(OpenFlags::STANDARD, |acc, v| acc | v.config().forbidden_flags);
        if flags.intersects(forbidden) {
            return Err(Error::Configuration { db: ANY_DB, flags });
        }

        let source = Source::Path(path);
        let mut backend = load(loader, ANY_DB, &source, flags)?;

        let edition = backend.edition();
        let Some(variant) = Variant::for_edition(edition) else {
            let info = backend.info();
            drop(backend);
            return Err(Error::TypeMismatch { db: ANY_DB, info });
        };
        tracing::debug!(%source, %edition, "detected {} db", variant);

        backend.set_charset(options.charset.unwrap_or_default());
        Ok(Database {
            variant,
            edition,
            backend: Some(backend),
        })
    }

    pub fn variant(&self) -> Variant {
        self.variant
    }

    pub fn edition(&self) -> Edition {
        self.edition
    }

    pub fn is_closed(&self) -> bool {
        self.backend.is_none()
    }

    /// Release the resource. Calling this again is a no-op.
    pub fn close(&mut self) {
        if self.backend.take().is_some() {
            tracing::debug!(variant = %self.variant, "closed db");
        }
    }

    /// Look up `key` and project the named fields. No names returns the
    /// whole record (or the bare organization string).
    pub fn query<S: AsRef<str>>(
        &self,
        key: LookupKey<'_>,
        fields: &[S],
    ) -> Result<QueryResult> {
        self.query_as(self.variant, key, fields)
    }

    pub fn charset(&self) -> Result<Charset> {
        self.charset_as(self.variant)
    }

    pub fn set_charset(&mut self, charset: Charset) -> Result<()> {
        self.set_charset_as(self.variant, charset)
    }

    /// The resource's own description string.
    pub fn describe(&self) -> Result<String> {
        self.describe_as(self.variant)
    }

    fn backend(&self, expected: Variant) -> Result<&dyn GeoBackend> {
        let backend = self
            .backend
            .as_deref()
            .ok_or(Error::UseAfterClose { variant: expected })?;
        self.check_edition(expected)?;
        Ok(backend)
    }

    fn backend_mut(&mut self, expected: Variant) -> Result<&mut (dyn GeoBackend + 'static)> {
        if self.backend.is_none() {
            return Err(Error::UseAfterClose { variant: expected });
        }
        self.check_edition(expected)?;
        self.backend
            .as_deref_mut()
            .ok_or(Error::UseAfterClose { variant: expected })
    }

    pub(crate) fn check_edition(&self, expected: Variant) -> Result<()> {
        if expected.accepts(self.edition) {
            Ok(())
        } else {
            Err(Error::WrongHandleType {
                expected,
                edition: self.edition,
            })
        }
    }

    pub(crate) fn query_as<S: AsRef<str>>(
        &self,
        expected: Variant,
        key: LookupKey<'_>,
        fields: &[S],
    ) -> Result<QueryResult> {
        let backend = self.backend(expected)?;

        match &expected.config().shape {
            Shape::Country(schema) => {
                let selection = schema.select(fields)?;
                let row = key
                    .resolve()
                    .and_then(|ip| CountryRow::from_id(backend.country_id(ip)));
                Ok(row.map_or(QueryResult::NotFound, |row| selection.render(&row)))
            }
            Shape::City(schema) => {
                let selection = schema.select(fields)?;
                let record = key.resolve().and_then(|ip| backend.city_record(ip));
                Ok(record.map_or(QueryResult::NotFound, |r| selection.render(&r)))
            }
            Shape::Org { field } => {
                for (i, name) in fields.iter().enumerate() {
                    if name.as_ref() != *field {
                        return Err(Error::InvalidArgument(format!(
                            "unknown field '{}' at position {} (expected one of: {})",
                            name.as_ref(),
                            i + 1,
                            field
                        )));
                    }
                }
                let Some(org) = key.resolve().and_then(|ip| backend.org(ip)) else {
                    return Ok(QueryResult::NotFound);
                };
                if fields.is_empty() {
                    Ok(QueryResult::Org(org))
                } else {
                    Ok(QueryResult::Values(vec![FieldValue::from(org); fields.len()]))
                }
            }
        }
    }

    pub(crate) fn charset_as(&self, expected: Variant) -> Result<Charset> {
        Ok(self.backend(expected)?.charset())
    }

    pub(crate) fn set_charset_as(&mut self, expected: Variant, charset: Charset) -> Result<()> {
        self.backend_mut(expected)?.set_charset(charset);
        Ok(())
    }

    pub(crate) fn describe_as(&self, expected: Variant) -> Result<String> {
        Ok(self.backend(expected)?.info())
    }
}

fn load(
    loader: &dyn Loader,
    db: &'static str,
    source: &Source,
    flags: OpenFlags,
) -> Result<Box<dyn GeoBackend>> {
    let Captured { value, diagnostic } = capture_stderr(|| loader.load(source, flags));
    let captured = diagnostic.trim();

    match value {
        Ok(backend) => {
            if !captured.is_empty() {
                tracing::debug!(%source, diagnostic = captured, "provider wrote to stderr");
            }
            tracing::debug!(%source, %flags, edition = %backend.edition(), "opened {} db", db);
            Ok(backend)
        }
        Err(err) => {
            let diagnostic = match err {
                LoadError::Reported(msg) if !msg.trim().is_empty() => msg,
                _ if !captured.is_empty() => captured.to_string(),
                _ => OPEN_FALLBACK_MESSAGE.to_string(),
            };
            tracing::debug!(%source, %diagnostic, "failed to open {} db", db);
            Err(Error::OpenFailure { db, diagnostic })
        }
    }
}

impl Drop for Database {
    fn drop(&mut self) {
        self.close();
    }
}

impl fmt::Debug for Database {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Database")
            .field("variant", &self.variant)
            .field("edition", &self.edition)
            .field("closed", &self.is_closed())
            .finish()
    }
}

impl fmt::Display for Database {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.backend {
            Some(backend) => write!(f, "{} db ({})", self.variant, backend.info()),
            None => write!(f, "closed {} db", self.variant),
        }
    }
}
