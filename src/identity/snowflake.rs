//! Snowflake identifier decoding
//!
//! Discord identifiers are 64-bit unsigned integers that pack a millisecond
//! timestamp into their high bits:
//!
//! ```text
//!  Bit Index:  63             22 21             12 11             0
//!              +----------------+-----------------+---------------+
//!  Field:      | timestamp (42) | worker/process  | sequence (12) |
//!              +----------------+-----------------+---------------+
//! ```
//!
//! All arithmetic stays in `u64`; identifiers routinely exceed the range a
//! double can represent exactly.

use chrono::{DateTime, Local, TimeZone, Utc};
use serde::{Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Milliseconds between the Unix epoch and the first second of 2015 (UTC).
pub const DISCORD_EPOCH_MS: u64 = 1_420_070_400_000;

/// Number of low bits holding worker, process and sequence fields.
pub const TIMESTAMP_SHIFT: u32 = 22;

/// A validated Discord identifier.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Snowflake(u64);

/// Rejection reasons for identifier strings
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SnowflakeParseError {
    #[error("identifier is empty")]
    Empty,
    #[error("identifier contains non-digit characters")]
    NotDigits,
    #[error("identifier does not fit in 64 bits")]
    Overflow,
}

impl Snowflake {
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Milliseconds since [`DISCORD_EPOCH_MS`].
    pub const fn timestamp(self) -> u64 {
        self.0 >> TIMESTAMP_SHIFT
    }

    /// Milliseconds since the Unix epoch at which the identifier was minted.
    pub const fn unix_millis(self) -> u64 {
        self.timestamp() + DISCORD_EPOCH_MS
    }
}

impl FromStr for Snowflake {
    type Err = SnowflakeParseError;

    /// Accepts exactly the strings matching `^[0-9]+$` whose value fits in
    /// a `u64`. Signs and whitespace are rejected even though `u64::from_str`
    /// would take a leading `+`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            return Err(SnowflakeParseError::Empty);
        }
        if !s.bytes().all(|b| b.is_ascii_digit()) {
            return Err(SnowflakeParseError::NotDigits);
        }
        s.parse::<u64>()
            .map(Self)
            .map_err(|_| SnowflakeParseError::Overflow)
    }
}

impl fmt::Display for Snowflake {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Serialize for Snowflake {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Decode the creation moment embedded in `id`.
pub fn creation_instant(id: Snowflake) -> DateTime<Utc> {
    // At most (2^42 - 1) + epoch, well inside both i64 and chrono's range.
    i64::try_from(id.unix_millis())
        .ok()
        .and_then(DateTime::from_timestamp_millis)
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}

/// Render an instant the way a US-English browser locale prints dates,
/// e.g. `4/30/2016, 11:18:25 AM`.
pub fn format_locale<Tz>(instant: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: fmt::Display,
{
    instant.format("%-m/%-d/%Y, %-I:%M:%S %p").to_string()
}

/// Creation date of `id` in the server's local time zone.
pub fn creation_date(id: Snowflake) -> String {
    format_locale(&creation_instant(id).with_timezone(&Local))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_accepts_digits_only() {
        assert_eq!("0".parse::<Snowflake>(), Ok(Snowflake::new(0)));
        assert_eq!(
            "175928847299117063".parse::<Snowflake>(),
            Ok(Snowflake::new(175_928_847_299_117_063))
        );
        assert_eq!("".parse::<Snowflake>(), Err(SnowflakeParseError::Empty));
        assert_eq!("+12".parse::<Snowflake>(), Err(SnowflakeParseError::NotDigits));
        assert_eq!("-1".parse::<Snowflake>(), Err(SnowflakeParseError::NotDigits));
        assert_eq!("12a".parse::<Snowflake>(), Err(SnowflakeParseError::NotDigits));
        assert_eq!(" 12".parse::<Snowflake>(), Err(SnowflakeParseError::NotDigits));
        assert_eq!("١٢".parse::<Snowflake>(), Err(SnowflakeParseError::NotDigits));
    }

    #[test]
    fn test_parse_overflow() {
        assert_eq!(
            "18446744073709551615".parse::<Snowflake>(),
            Ok(Snowflake::new(u64::MAX))
        );
        assert_eq!(
            "18446744073709551616".parse::<Snowflake>(),
            Err(SnowflakeParseError::Overflow)
        );
    }

    #[test]
    fn test_known_decode() {
        let id: Snowflake = "175928847299117063".parse().unwrap();
        assert_eq!(id.timestamp(), 41_944_705_796);
        assert_eq!(id.unix_millis(), 1_462_015_105_796);
        assert_eq!(creation_instant(id).timestamp_millis(), 1_462_015_105_796);
    }

    #[test]
    fn test_boundaries_keep_precision() {
        let zero = Snowflake::new(0);
        assert_eq!(creation_instant(zero).timestamp_millis(), 1_420_070_400_000);

        let max = Snowflake::new(u64::MAX);
        assert_eq!(max.timestamp(), (1 << 42) - 1);
        assert_eq!(creation_instant(max).timestamp_millis(), 5_818_116_911_103);

        // 19 digits; a float round-trip would lose the low bits here
        let big = Snowflake::new(1_234_567_890_123_456_789);
        assert_eq!(big.unix_millis(), 1_714_414_322_167);
    }

    #[test]
    fn test_format_locale() {
        let instant = creation_instant(Snowflake::new(175_928_847_299_117_063));
        assert_eq!(format_locale(&instant), "4/30/2016, 11:18:25 AM");
        assert_eq!(
            format_locale(&creation_instant(Snowflake::new(0))),
            "1/1/2015, 12:00:00 AM"
        );
    }

    #[test]
    fn test_serializes_as_string() {
        let json = serde_json::to_string(&Snowflake::new(u64::MAX)).unwrap();
        assert_eq!(json, "\"18446744073709551615\"");
    }

    #[test]
    fn test_idempotent() {
        let id = Snowflake::new(80_351_110_224_678_912);
        assert_eq!(creation_instant(id), creation_instant(id));
        assert_eq!(creation_date(id), creation_date(id));
    }
}
