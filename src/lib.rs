//! Probe Plugins: host health checks for Nagios-compatible monitoring
//!
//! Each check lives in `src/bin` and prints a single status line, optionally
//! followed by `|` and machine-parsable performance data, then exits with
//! the conventional status code. See the [`scripts`](scripts/index.html)
//! module for the `--help` of every check.
//!
//! The library side holds the pieces that are shared between checks:
//!
//! * [`thresholds`](thresholds/index.html): the `-w`/`-c` range language
//!   and the evaluation of a value against a warning/critical pair
//! * [`procfs`](procfs/index.html): readers for the `/proc` files the checks
//!   care about, built on a table-driven `key: value` scanner
//! * [`perfdata`](perfdata/index.html): status and perfdata formatting

use std::fmt;
use std::process;
use std::str::FromStr;

use serde::Deserialize;

pub mod cli;
pub mod perfdata;
pub mod procfs;
pub mod scripts;
pub mod thresholds;

/// All possible exit statuses for a check
///
/// Statuses are ordered by severity, so `max` of two statuses is the one
/// that should be reported.
#[must_use]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Ok,
    Warning,
    Critical,
    Unknown,
}

impl Status {
    /// The process exit code monitoring systems expect for this status
    pub fn code(self) -> i32 {
        match self {
            Status::Ok => 0,
            Status::Warning => 1,
            Status::Critical => 2,
            Status::Unknown => 3,
        }
    }

    #[cfg_attr(test, allow(dead_code))]
    pub fn exit(self) -> ! {
        process::exit(self.code())
    }

    pub fn str_values() -> [&'static str; 4] {
        ["ok", "warning", "critical", "unknown"]
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let s = match *self {
            Status::Ok => "OK",
            Status::Warning => "WARNING",
            Status::Critical => "CRITICAL",
            Status::Unknown => "UNKNOWN",
        };
        f.write_str(s)
    }
}

#[derive(Debug, PartialEq)]
pub struct InvalidStatus(String);

impl fmt::Display for InvalidStatus {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "Invalid status '{}', expected one of: {}",
            self.0,
            Status::str_values().join(", ")
        )
    }
}

impl FromStr for Status {
    type Err = InvalidStatus;

    fn from_str(s: &str) -> Result<Status, InvalidStatus> {
        match s {
            "ok" => Ok(Status::Ok),
            "warning" | "warn" => Ok(Status::Warning),
            "critical" => Ok(Status::Critical),
            "unknown" => Ok(Status::Unknown),
            _ => Err(InvalidStatus(s.to_owned())),
        }
    }
}
