//! The `-w`/`-c` threshold range language
//!
//! A range looks like `[@][START:]END`:
//!
//! * `10` alerts when the value is outside of `0..=10`
//! * `10:20` alerts outside of `10..=20`
//! * `~:10` has no lower bound, so it alerts only above 10
//! * `10:` has no upper bound, so it alerts only below 10
//! * `@10:20` inverts the check: it alerts when the value is *inside*
//!   `10..=20`
//!
//! Bounds may carry a trailing `%`, so `-w 80%` reads the way people write
//! it in their check definitions.

use std::fmt;
use std::str::FromStr;

use crate::Status;

/// A parsed range expression
///
/// Closed bounds always satisfy `start <= end`, anything else is rejected
/// at parse time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RangeSpec {
    pub start: f64,
    /// The range has no lower bound
    pub start_is_open: bool,
    pub end: f64,
    /// The range has no upper bound
    pub end_is_open: bool,
    /// Alert when inside the range instead of outside of it
    pub invert: bool,
}

impl RangeSpec {
    /// Whether `value` is within the bounds, ignoring `invert`
    pub fn contains(&self, value: f64) -> bool {
        (self.start_is_open || self.start <= value) && (self.end_is_open || value <= self.end)
    }

    /// Should `value` raise an alert for this range?
    ///
    /// A range with both bounds open contains everything, so it never fires
    /// unless it is inverted, in which case it always does.
    pub fn triggers(&self, value: f64) -> bool {
        let inside = self.contains(value);
        if self.invert {
            inside
        } else {
            !inside
        }
    }
}

impl FromStr for RangeSpec {
    type Err = RangeParseError;

    fn from_str(raw: &str) -> Result<RangeSpec, RangeParseError> {
        let err = |kind| RangeParseError {
            input: raw.to_owned(),
            kind,
        };

        let (invert, body) = match raw.strip_prefix('@') {
            Some(rest) => (true, rest),
            None => (false, raw),
        };

        let (start, start_is_open, end_str) = match body.find(':') {
            Some(idx) => {
                let start_str = &body[..idx];
                let end_str = &body[idx + 1..];
                if start_str.starts_with('~') {
                    (0.0, true, end_str)
                } else if start_str.trim().is_empty() {
                    return Err(err(RangeErrorKind::MissingStart));
                } else {
                    let start = parse_bound(start_str)
                        .ok_or_else(|| err(RangeErrorKind::InvalidStart(start_str.to_owned())))?;
                    (start, false, end_str)
                }
            }
            None => (0.0, false, body),
        };

        let (end, end_is_open) = if end_str.trim().is_empty() {
            (0.0, true)
        } else {
            let end = parse_bound(end_str)
                .ok_or_else(|| err(RangeErrorKind::InvalidEnd(end_str.to_owned())))?;
            (end, false)
        };

        // NaN never compares <=, so it lands here too
        if !start_is_open && !end_is_open && !(start <= end) {
            return Err(err(RangeErrorKind::StartAfterEnd { start, end }));
        }

        Ok(RangeSpec {
            start,
            start_is_open,
            end,
            end_is_open,
            invert,
        })
    }
}

/// Parse one side of a range: a float, optionally followed by `%`
fn parse_bound(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    let number = trimmed.strip_suffix('%').unwrap_or(trimmed).trim_end();
    number.parse().ok()
}

impl fmt::Display for RangeSpec {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.invert {
            f.write_str("@")?;
        }
        if self.start_is_open {
            f.write_str("~:")?;
        } else if self.start != 0.0 {
            write!(f, "{}:", self.start)?;
        }
        if !self.end_is_open {
            write!(f, "{}", self.end)?;
        } else if !self.start_is_open && self.start == 0.0 {
            f.write_str("0:")?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum RangeErrorKind {
    /// Something other than `~` or a number before the `:`
    InvalidStart(String),
    InvalidEnd(String),
    /// A `:` with nothing in front of it
    MissingStart,
    StartAfterEnd { start: f64, end: f64 },
}

/// A range expression that cannot be turned into a `RangeSpec`
#[derive(Debug, Clone, PartialEq)]
pub struct RangeParseError {
    pub input: String,
    pub kind: RangeErrorKind,
}

impl fmt::Display for RangeParseError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "unparseable range '{}': ", self.input)?;
        match self.kind {
            RangeErrorKind::InvalidStart(ref s) => write!(f, "invalid start value '{}'", s),
            RangeErrorKind::InvalidEnd(ref s) => write!(f, "invalid end value '{}'", s),
            RangeErrorKind::MissingStart => {
                write!(f, "missing start value before ':' (use '~' for no lower bound)")
            }
            RangeErrorKind::StartAfterEnd { start, end } => {
                write!(f, "start {} is greater than end {}", start, end)
            }
        }
    }
}

impl std::error::Error for RangeParseError {}

/// A warning range and a critical range, either of which may be absent
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ThresholdSet {
    pub warning: Option<RangeSpec>,
    pub critical: Option<RangeSpec>,
}

impl ThresholdSet {
    /// Build a set from the raw `-w` and `-c` strings
    pub fn parse(
        warning: Option<&str>,
        critical: Option<&str>,
    ) -> Result<ThresholdSet, RangeParseError> {
        Ok(ThresholdSet {
            warning: warning.map(str::parse::<RangeSpec>).transpose()?,
            critical: critical.map(str::parse::<RangeSpec>).transpose()?,
        })
    }

    /// The status for `value`
    ///
    /// The critical range is always checked first: if it fires the result is
    /// `Critical` no matter what the warning range says, even when the
    /// warning range is the "stricter" of the two.
    pub fn evaluate(&self, value: f64) -> Status {
        if let Some(ref critical) = self.critical {
            if critical.triggers(value) {
                return Status::Critical;
            }
        }
        if let Some(ref warning) = self.warning {
            if warning.triggers(value) {
                return Status::Warning;
            }
        }
        Status::Ok
    }
}

#[cfg(test)]
mod unit {
    use super::*;

    fn range(s: &str) -> RangeSpec {
        s.parse().unwrap()
    }

    #[test]
    fn bare_end() {
        assert_eq!(
            range("10"),
            RangeSpec {
                start: 0.0,
                start_is_open: false,
                end: 10.0,
                end_is_open: false,
                invert: false,
            }
        );
    }

    #[test]
    fn start_and_end() {
        let r = range("10:20");
        assert_eq!((r.start, r.end), (10.0, 20.0));
        assert!(!r.start_is_open && !r.end_is_open && !r.invert);

        let r = range("-5.5:1e2");
        assert_eq!((r.start, r.end), (-5.5, 100.0));
    }

    #[test]
    fn equal_bounds_are_fine() {
        let r = range("7:7");
        assert!(!r.triggers(7.0));
        assert!(r.triggers(7.1));
    }

    #[test]
    fn start_after_end_is_rejected() {
        let err = "20:10".parse::<RangeSpec>().unwrap_err();
        assert_eq!(
            err.kind,
            RangeErrorKind::StartAfterEnd {
                start: 20.0,
                end: 10.0
            }
        );
        assert!("-1".parse::<RangeSpec>().is_err());
        assert!("@30:3".parse::<RangeSpec>().is_err());
    }

    #[test]
    fn open_start() {
        let r = range("~:10");
        assert!(r.start_is_open);
        assert_eq!(r.end, 10.0);
        assert!(!r.triggers(-1000.0));
        assert!(r.triggers(11.0));
    }

    #[test]
    fn open_end() {
        let r = range("10:");
        assert!(r.end_is_open);
        assert_eq!(r.start, 10.0);
        assert!(r.triggers(9.0));
        assert!(!r.triggers(100.0));
    }

    #[test]
    fn inverted() {
        let r = range("@10:20");
        assert!(r.invert);
        assert_eq!((r.start, r.end), (10.0, 20.0));
        assert!(r.triggers(15.0));
        assert!(!r.triggers(5.0));
        assert!(r.triggers(10.0));
        assert!(r.triggers(20.0));
    }

    #[test]
    fn fully_open_never_alerts_unless_inverted() {
        let r = range("~:");
        assert!(r.start_is_open && r.end_is_open);
        assert!(!r.triggers(-1e300));
        assert!(!r.triggers(1e300));

        let r = range("@~:");
        assert!(r.triggers(0.0));
        assert!(r.triggers(42.0));
    }

    #[test]
    fn empty_means_zero_to_infinity() {
        let r = range("");
        assert!(!r.start_is_open && r.end_is_open);
        assert!(r.triggers(-0.5));
        assert!(!r.triggers(0.0));
    }

    #[test]
    fn percent_suffix_is_ignored() {
        assert_eq!(range("80%"), range("80"));
        assert_eq!(range("10%:20%"), range("10:20"));
        assert_eq!(range(" 90 "), range("90"));
    }

    #[test]
    fn garbage_is_rejected() {
        assert!(matches!(
            "abc".parse::<RangeSpec>().unwrap_err().kind,
            RangeErrorKind::InvalidEnd(_)
        ));
        assert!(matches!(
            "x:10".parse::<RangeSpec>().unwrap_err().kind,
            RangeErrorKind::InvalidStart(_)
        ));
        assert_eq!(
            ":10".parse::<RangeSpec>().unwrap_err().kind,
            RangeErrorKind::MissingStart
        );
        assert!("10:2x".parse::<RangeSpec>().is_err());
        assert!("~".parse::<RangeSpec>().is_err());
        assert!("NaN".parse::<RangeSpec>().is_err());
    }

    #[test]
    fn parsing_is_idempotent() {
        for s in &["10", "10:20", "~:10", "10:", "@10:20", "@~:"] {
            let (a, b) = (range(s), range(s));
            assert_eq!(a, b);
            for v in &[-1.0, 0.0, 10.0, 15.0, 25.0] {
                assert_eq!(a.triggers(*v), b.triggers(*v));
            }
        }
    }

    #[test]
    fn display_round_trips() {
        for s in &["10", "10:20", "~:10", "10:", "@10:20", "~:", "0:"] {
            assert_eq!(range(&range(s).to_string()), range(s), "{}", s);
        }
    }

    #[test]
    fn threshold_precedence() {
        let set = ThresholdSet::parse(Some("80"), Some("90")).unwrap();
        assert_eq!(set.evaluate(95.0), Status::Critical);
        assert_eq!(set.evaluate(85.0), Status::Warning);
        assert_eq!(set.evaluate(50.0), Status::Ok);
    }

    #[test]
    fn critical_is_checked_first_even_when_wider() {
        // warning alerts above 90, critical alerts for anything outside 0..50
        let set = ThresholdSet::parse(Some("90"), Some("50")).unwrap();
        assert_eq!(set.evaluate(60.0), Status::Critical);
        assert_eq!(set.evaluate(95.0), Status::Critical);
        assert_eq!(set.evaluate(40.0), Status::Ok);
    }

    #[test]
    fn absent_ranges_never_trigger() {
        let set = ThresholdSet::parse(None, None).unwrap();
        assert_eq!(set.evaluate(1e9), Status::Ok);

        let set = ThresholdSet::parse(Some("10"), None).unwrap();
        assert_eq!(set.evaluate(11.0), Status::Warning);
        assert_eq!(set.critical, None);
    }

    #[test]
    fn any_bad_range_fails_the_set() {
        assert!(ThresholdSet::parse(Some("80"), Some("9:1")).is_err());
        assert!(ThresholdSet::parse(Some("oops"), Some("90")).is_err());
    }
}
