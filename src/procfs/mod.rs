//! Readers for the files from the /proc filesystem that checks care about
//!
//! Each file gets a struct to represent its data. Parsing always works on a
//! `&str` so it can be tested without a live /proc, and reading goes through
//! a [`ProcSource`](struct.ProcSource.html) that keeps its file open between
//! reads.

use std::fmt;
use std::fs::File;
use std::io::{self, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};
use std::result::Result as StdResult;

use derive_more::From;

pub mod meminfo;
pub mod mounts;
pub mod table;

pub use self::meminfo::{MemInfo, MemoryProbe, MemorySnapshot, PagingCounters, VmStat};
pub use self::mounts::{MountEntry, MountFilter};
pub use self::table::{Counter, FieldTable, Separator};

/// ProcFs errors
///
/// Every error from in this module can be converted into a `ProcFsError`
#[derive(Debug, From)]
pub enum ProcFsError {
    /// A source could not be opened or read
    Io(SourceError),
    /// Error pulling all required data out of procfs
    InsufficientData(String),
}

impl fmt::Display for ProcFsError {
    fn fmt(&self, f: &mut fmt::Formatter) -> StdResult<(), fmt::Error> {
        match *self {
            ProcFsError::Io(ref e) => write!(f, "{}", e),
            ProcFsError::InsufficientData(ref e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for ProcFsError {}

/// An IO error together with the file it happened on
#[derive(Debug)]
pub struct SourceError {
    pub path: PathBuf,
    pub error: io::Error,
}

impl fmt::Display for SourceError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "unable to read {}: {}", self.path.display(), self.error)
    }
}

/// All the results are results with `ProcFsError`s
pub type Result<T> = StdResult<T, ProcFsError>;

/// A proc-style file that is opened once and re-read from the start on
/// every `read`
///
/// Kernel pseudo-files regenerate their content on each read from offset
/// 0, so keeping the handle and seeking back is all that is needed to see
/// current values.
#[derive(Debug)]
pub struct ProcSource {
    path: PathBuf,
    file: Option<File>,
}

impl ProcSource {
    pub fn new<P: Into<PathBuf>>(path: P) -> ProcSource {
        ProcSource {
            path: path.into(),
            file: None,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the entire current content of the file
    pub fn read(&mut self) -> Result<String> {
        let path = &self.path;
        let wrap = |error| SourceError {
            path: path.clone(),
            error,
        };

        let file = match self.file.take() {
            Some(file) => file,
            None => {
                log::debug!("opening {}", path.display());
                File::open(path).map_err(wrap)?
            }
        };
        let file = self.file.get_or_insert(file);
        file.seek(SeekFrom::Start(0)).map_err(wrap)?;
        let mut contents = String::new();
        file.read_to_string(&mut contents).map_err(wrap)?;
        Ok(contents)
    }
}
