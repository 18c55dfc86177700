use anyhow::{Context, Error, Result};
use camino::Utf8PathBuf;
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::io::{self, Write};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

use geoipdb::input::FileOrStdin;
use geoipdb::variant::Shape;
use geoipdb::{Charset, Database, LookupKey, MmdbLoader, OpenFlags, OpenOptions, Variant};

/// Check if the error chain contains a broken pipe error.
#[inline(always)]
fn is_broken_pipe(err: &Error) -> bool {
    for cause in err.chain() {
        if let Some(io_err) = cause.downcast_ref::<io::Error>() {
            if io_err.kind() == io::ErrorKind::BrokenPipe {
                return true;
            }
        }
    }
    false
}

#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
struct Cli {
    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Look up country identifiers, codes and names
    Country(QueryArgs),
    /// Look up city-level location records
    City(QueryArgs),
    /// Look up ISP names
    Isp(QueryArgs),
    /// Look up autonomous system numbers
    Asnum(QueryArgs),
    /// Look up connection speeds
    Netspeed(QueryArgs),
    /// Detect the kind of a database file and print its description
    Info(InfoArgs),
    /// List the field names a database kind can project
    Fields {
        #[clap(value_enum)]
        kind: Kind,
    },
}

#[derive(Args, Debug)]
struct OpenArgs {
    /// Open flags, by name ("memory-cache", "mmap-cache|check-cache") or number
    #[clap(long, value_name = "FLAGS")]
    flags: Option<OpenFlags>,

    /// Charset of returned strings: utf-8 or iso-8859-1
    #[clap(long, value_name = "CHARSET")]
    charset: Option<Charset>,

    /// Directory searched first for the default database files
    #[clap(
        short = 'I',
        value_name = "DIR",
        value_hint = clap::ValueHint::DirPath,
        env = "GEOIP_MMDB_DIR"
    )]
    include: Option<Utf8PathBuf>,
}

#[derive(Args, Debug)]
struct QueryArgs {
    /// Database file to open instead of the default one for this kind
    #[clap(long, value_name = "PATH", value_hint = clap::ValueHint::FilePath)]
    db: Option<Utf8PathBuf>,

    #[clap(flatten)]
    open: OpenArgs,

    /// Field to output; repeat for several. Without any, the whole record is printed
    #[clap(short, long = "field", value_name = "NAME")]
    fields: Vec<String>,

    /// How keys are interpreted
    #[clap(long, value_enum, default_value_t = KeyKind::Name)]
    by: KeyKind,

    /// Read keys from this file ("-" for stdin) when none are given
    #[clap(long, value_name = "FILE", default_value = "-")]
    keys_from: Utf8PathBuf,

    /// Host names, addresses or IPv4 integers to look up
    #[clap(value_name = "KEY")]
    keys: Vec<String>,
}

#[derive(Args, Debug)]
struct InfoArgs {
    /// Database file to inspect
    #[clap(long, value_name = "PATH", value_hint = clap::ValueHint::FilePath)]
    db: Utf8PathBuf,

    #[clap(flatten)]
    open: OpenArgs,
}

#[derive(Copy, Clone, PartialEq, Eq, Debug, ValueEnum)]
enum KeyKind {
    Name,
    Addr,
    Ipnum,
}

#[derive(Copy, Clone, PartialEq, Eq, Debug, ValueEnum)]
enum Kind {
    Country,
    City,
    Isp,
    Asnum,
    Netspeed,
}

impl From<Kind> for Variant {
    fn from(kind: Kind) -> Variant {
        match kind {
            Kind::Country => Variant::Country,
            Kind::City => Variant::City,
            Kind::Isp => Variant::Isp,
            Kind::Asnum => Variant::Asnum,
            Kind::Netspeed => Variant::Netspeed,
        }
    }
}

impl OpenArgs {
    fn loader(&self) -> MmdbLoader {
        let defaults = MmdbLoader::from_env();
        let mut dirs: Vec<Utf8PathBuf> = self.include.iter().cloned().collect();
        dirs.extend(
            defaults
                .search_dirs()
                .iter()
                .filter(|d| Some(*d) != self.include.as_ref())
                .cloned(),
        );
        MmdbLoader::new(dirs)
    }

    fn options(&self, db: Option<&Utf8PathBuf>) -> OpenOptions {
        let mut options = OpenOptions::new();
        if let Some(path) = db {
            options = options.path(path.clone());
        }
        if let Some(flags) = self.flags {
            options = options.flags(flags);
        }
        if let Some(charset) = self.charset {
            options = options.charset(charset);
        }
        options
    }
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_ansi(false)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let err = match run_main() {
        Ok(code) => return code,
        Err(err) => err,
    };

    if is_broken_pipe(&err) {
        return ExitCode::SUCCESS;
    }

    if std::env::var("RUST_BACKTRACE").is_ok_and(|v| v == "1")
        && std::env::var("RUST_LIB_BACKTRACE").map_or(true, |v| v == "1")
    {
        let _ = writeln!(&mut io::stderr(), "{:?}", err);
    } else {
        let _ = writeln!(&mut io::stderr(), "{:#}", err);
    }

    ExitCode::FAILURE
}

fn run_main() -> Result<ExitCode> {
    let cli = Cli::parse();

    match cli.command {
        Command::Country(args) => query(Variant::Country, args)?,
        Command::City(args) => query(Variant::City, args)?,
        Command::Isp(args) => query(Variant::Isp, args)?,
        Command::Asnum(args) => query(Variant::Asnum, args)?,
        Command::Netspeed(args) => query(Variant::Netspeed, args)?,
        Command::Info(args) => info(args)?,
        Command::Fields { kind } => fields(kind.into())?,
    }

    Ok(ExitCode::SUCCESS)
}

fn query(variant: Variant, args: QueryArgs) -> Result<()> {
    let loader = args.open.loader();
    let options = args.open.options(args.db.as_ref());
    let db = Database::open_with(&loader, variant, &options)?;

    let mut out = io::BufWriter::with_capacity(65536, io::stdout().lock());
    let mut lookup = |key: &str| -> Result<bool> {
        let key = match args.by {
            KeyKind::Name => LookupKey::Name(key),
            KeyKind::Addr => LookupKey::Addr(key),
            KeyKind::Ipnum => LookupKey::Ipnum(
                key.parse()
                    .with_context(|| format!("invalid IPv4 integer: {}", key))?,
            ),
        };
        let result = db.query(key, &args.fields)?;
        serde_json::to_writer(&mut out, &result)?;
        out.write_all(b"\n")?;
        Ok(true)
    };

    if args.keys.is_empty() {
        let source = FileOrStdin::from_path(args.keys_from.clone());
        source
            .reader()?
            .for_each_key(&mut lookup)
            .with_context(|| format!("failed to look up keys from {}", source))?;
    } else {
        for key in &args.keys {
            lookup(key.as_str())?;
        }
    }

    out.flush()?;
    Ok(())
}

fn info(args: InfoArgs) -> Result<()> {
    let loader = args.open.loader();
    let options = args.open.options(Some(&args.db));
    let db = Database::open_any_with(&loader, &options)?;

    let summary = serde_json::json!({
        "variant": db.variant(),
        "edition": db.edition().to_string(),
        "description": db.describe()?,
        "charset": db.charset()?,
    });
    let mut out = io::stdout().lock();
    serde_json::to_writer_pretty(&mut out, &summary)?;
    out.write_all(b"\n")?;
    out.flush()?;
    Ok(())
}

fn fields(variant: Variant) -> Result<()> {
    let mut out = io::stdout().lock();
    writeln!(out, "Fields for {} databases:", variant)?;
    match &variant.config().shape {
        Shape::Country(schema) => {
            for field in schema.fields() {
                writeln!(out, "{}\t{}", field.name, field.description)?;
            }
        }
        Shape::City(schema) => {
            for field in schema.fields() {
                writeln!(out, "{}\t{}", field.name, field.description)?;
            }
        }
        Shape::Org { field } => writeln!(out, "{}\t{} string", field, variant)?,
    }
    out.flush()?;
    Ok(())
}
