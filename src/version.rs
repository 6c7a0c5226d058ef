//! Date based versions (`YYYY.MM.DD` with an optional same-day suffix) and the
//! rule that moves one to the next.

use chrono::NaiveDate;
use log::{debug, warn};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

const DATE_FORMAT: &str = "%Y.%m.%d";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseVersionError {
    #[error("Invalid date version {input:?}: {reason}")]
    Malformed { input: String, reason: &'static str },
    #[error("The suffix of version {0:?} is too large to increment")]
    SuffixOverflow(String),
}

impl ParseVersionError {
    fn malformed(input: &str, reason: &'static str) -> Self {
        Self::Malformed { input: input.to_string(), reason }
    }
}

/// A version of the form `YYYY.MM.DD` or `YYYY.MM.DD.N`.
///
/// Ordering is by date, then by suffix, with a bare date sorting before any
/// suffixed release of the same day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DateVersion {
    pub date: NaiveDate,
    pub suffix: Option<u64>,
}

impl DateVersion {
    /// First version for `today`.
    pub fn today(today: NaiveDate, force_suffix: bool) -> Self {
        Self { date: today, suffix: force_suffix.then_some(1) }
    }

    /// The version that follows `self` when released on `today`.
    ///
    /// A bare version from today becomes `.1`, or `.2` under `force_suffix` since the bare
    /// release already stood in for `.1`.
    pub fn next(&self, today: NaiveDate, force_suffix: bool) -> Result<Self, ParseVersionError> {
        if self.date == today {
            let suffix = match self.suffix {
                Some(n) => n.checked_add(1).ok_or_else(|| ParseVersionError::SuffixOverflow(self.to_string()))?,
                None if force_suffix => 2,
                None => 1,
            };
            return Ok(Self { date: today, suffix: Some(suffix) });
        }
        if self.date > today {
            warn!("Current version date {} is later than today ({}) - resetting to today", self.date, today);
        }
        Ok(Self::today(today, force_suffix))
    }
}

impl fmt::Display for DateVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.date.format(DATE_FORMAT))?;
        if let Some(suffix) = self.suffix {
            write!(f, ".{suffix}")?;
        }
        Ok(())
    }
}

impl FromStr for DateVersion {
    type Err = ParseVersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let input = s.trim();
        // YYYY.MM.DD is always 10 bytes; anything after it is the suffix.
        let (date_part, rest) = match input.get(..10) {
            Some(date_part) => (date_part, &input[10..]),
            None => return Err(ParseVersionError::malformed(s, "expected a YYYY.MM.DD date prefix")),
        };
        if !date_part.bytes().enumerate().all(|(i, b)| match i {
            4 | 7 => b == b'.',
            _ => b.is_ascii_digit(),
        }) {
            return Err(ParseVersionError::malformed(s, "expected a YYYY.MM.DD date prefix"));
        }
        let date = NaiveDate::parse_from_str(date_part, DATE_FORMAT)
            .map_err(|_| ParseVersionError::malformed(s, "date is not a valid calendar day"))?;

        let suffix = if rest.is_empty() {
            None
        } else {
            let digits = rest
                .strip_prefix('.')
                .or_else(|| rest.strip_prefix('-'))
                .ok_or_else(|| ParseVersionError::malformed(s, "suffix must follow a '.'"))?;
            if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
                return Err(ParseVersionError::malformed(s, "suffix must be a positive integer"));
            }
            // All digits, so the only way parsing fails is overflow.
            let n: u64 = digits
                .parse()
                .map_err(|_| ParseVersionError::SuffixOverflow(input.to_string()))?;
            if n == 0 {
                return Err(ParseVersionError::malformed(s, "suffix must be a positive integer"));
            }
            Some(n)
        };

        Ok(Self { date, suffix })
    }
}

/// Computes the version that should replace `current` on `today`.
///
/// A missing or malformed `current` is treated as if no version existed yet. A suffix too large
/// to increment is an error, since any replacement would not sort after it.
pub fn next_version(current: Option<&str>, today: NaiveDate, force_suffix: bool) -> Result<String, ParseVersionError> {
    let parsed = match current.map(str::parse::<DateVersion>) {
        None => None,
        Some(Ok(version)) => Some(version),
        Some(Err(e @ ParseVersionError::SuffixOverflow(_))) => return Err(e),
        Some(Err(e)) => {
            warn!("{e} - treating it as if no version was set");
            None
        }
    };

    let next = match parsed {
        Some(version) => version.next(today, force_suffix)?,
        None => DateVersion::today(today, force_suffix),
    };
    debug!("Next version for {:?} on {}: {}", current, today, next);
    Ok(next.to_string())
}
