use anyhow::{Context, Result};
use camino::Utf8PathBuf;
use std::fmt;
use std::fs::File;
use std::io::{self, BufRead, BufReader};

/// Where lookup keys are read from when they are not given as arguments.
#[derive(Default, Clone, Debug, PartialEq, Eq)]
pub enum FileOrStdin {
    /// Keys from a file, one per line.
    File(Utf8PathBuf),
    /// Keys from stdin, one per line.
    #[default]
    Stdin,
}

impl fmt::Display for FileOrStdin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FileOrStdin::File(path) => write!(f, "{}", path),
            FileOrStdin::Stdin => write!(f, "<stdin>"),
        }
    }
}

impl FileOrStdin {
    /// "-" means stdin.
    pub fn from_path(path: Utf8PathBuf) -> Self {
        if path.as_str() == "-" {
            FileOrStdin::Stdin
        } else {
            FileOrStdin::File(path)
        }
    }

    pub fn reader(&self) -> Result<KeyReader> {
        match self {
            FileOrStdin::File(path) => {
                let file =
                    File::open(path).with_context(|| format!("failed to open file: {}", path))?;
                Ok(KeyReader::File(BufReader::new(file)))
            }
            FileOrStdin::Stdin => Ok(KeyReader::Stdin(BufReader::new(io::stdin()))),
        }
    }
}

/// Line reader over a key source.
pub enum KeyReader {
    File(BufReader<File>),
    Stdin(BufReader<io::Stdin>),
}

impl KeyReader {
    /// Call `f` with each non-blank line, trimmed. Lines starting with `#`
    /// are skipped. Stops early when `f` returns `Ok(false)`.
    pub fn for_each_key<F>(&mut self, mut f: F) -> Result<()>
    where
        F: FnMut(&str) -> Result<bool>,
    {
        let mut buf = String::with_capacity(256);
        loop {
            buf.clear();
            let n = match self {
                KeyReader::File(ref mut rdr) => rdr.read_line(&mut buf),
                KeyReader::Stdin(ref mut rdr) => rdr.read_line(&mut buf),
            };
            let n = n.context("failed to read line")?;
            if n == 0 {
                break;
            }
            let key = buf.trim();
            if key.is_empty() || key.starts_with('#') {
                continue;
            }
            if !f(key)? {
                break;
            }
        }
        Ok(())
    }
}
