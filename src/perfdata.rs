//! Formatting for the plugin output line
//!
//! Monitoring systems split plugin output on `|`: the part before is shown
//! to humans, the part after is parsed as `key=value<unit>` pairs.

use std::fmt;

use serde::Deserialize;

use crate::procfs::Counter;
use crate::Status;

/// The unit perfdata values are scaled to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Unit {
    Bytes,
    Kilobytes,
    Megabytes,
    Gigabytes,
}

impl Default for Unit {
    fn default() -> Unit {
        Unit::Kilobytes
    }
}

impl Unit {
    /// Pick the unit from the `-b/-k/-m/-g` flags, the largest one winning
    pub fn from_flags(bytes: bool, kilobytes: bool, megabytes: bool, gigabytes: bool) -> Unit {
        if gigabytes {
            Unit::Gigabytes
        } else if megabytes {
            Unit::Megabytes
        } else if kilobytes {
            Unit::Kilobytes
        } else if bytes {
            Unit::Bytes
        } else {
            Unit::default()
        }
    }

    pub fn shift(self) -> u32 {
        match self {
            Unit::Bytes => 0,
            Unit::Kilobytes => 10,
            Unit::Megabytes => 20,
            Unit::Gigabytes => 30,
        }
    }

    pub fn suffix(self) -> &'static str {
        match self {
            Unit::Bytes => "B",
            Unit::Kilobytes => "kB",
            Unit::Megabytes => "MB",
            Unit::Gigabytes => "GB",
        }
    }

    /// Rescale a kB counter
    pub fn scale_kb(self, kb: Counter) -> u64 {
        (u64::from(kb) << 10) >> self.shift()
    }
}

/// An ordered list of perfdata values, all in the same unit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Perfdata {
    unit: Unit,
    values: Vec<(&'static str, u64)>,
}

impl Perfdata {
    pub fn new(unit: Unit) -> Perfdata {
        Perfdata {
            unit,
            values: Vec::new(),
        }
    }

    /// Add a value that is measured in kB
    pub fn kb(mut self, key: &'static str, kb: Counter) -> Perfdata {
        self.values.push((key, self.unit.scale_kb(kb)));
        self
    }

    pub fn keys(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.values.iter().map(|v| v.0)
    }
}

impl fmt::Display for Perfdata {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let suffix = self.unit.suffix();
        for (i, &(key, value)) in self.values.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}={}{}", key, value, suffix)?;
        }
        Ok(())
    }
}

/// `WARNING: 85.20% (872448 kB) used`
pub fn status_line(status: Status, percent_used: f64, used_kb: Counter) -> String {
    format!("{}: {:.2}% ({} kB) used", status, percent_used, used_kb)
}
