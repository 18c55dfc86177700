use crate::edition::Edition;
use crate::flags::OpenFlags;
use crate::variant::Variant;

/// Error types for the geoipdb library.
///
/// A lookup that finds nothing is not an error; see
/// [`QueryResult::NotFound`](crate::QueryResult::NotFound).
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Open flags the database kind cannot be opened with. Raised before the
    /// provider is touched.
    #[error("{db} error: can't open db with these flags ({flags})")]
    Configuration { db: &'static str, flags: OpenFlags },

    /// The provider returned no resource.
    #[error("{db} error: {diagnostic}")]
    OpenFailure { db: &'static str, diagnostic: String },

    /// The file opened but holds a different edition. `info` is the
    /// resource's own description.
    #[error("{db} error: unexpected db type in that file ({info})")]
    TypeMismatch { db: &'static str, info: String },

    /// Unknown field name, out-of-range charset, malformed flag string.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The handle was closed before this call.
    #[error("attempted to use closed {variant} db")]
    UseAfterClose { variant: Variant },

    /// The handle holds an edition the caller's variant does not accept.
    #[error("object is not a {expected} db (edition: {edition})")]
    WrongHandleType { expected: Variant, edition: Edition },
}

/// Convenience type alias for Results using the library error.
pub type Result<T> = std::result::Result<T, Error>;
