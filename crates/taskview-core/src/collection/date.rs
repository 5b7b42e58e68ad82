//! Filter value dates: Unix epoch seconds or RFC3339.
//!
//! Older clients send epoch integers, newer ones send RFC3339 strings; both
//! name the same instant and must compile to the same predicate.

use chrono::{DateTime, NaiveDateTime, Utc};

/// Error returned when a filter value is neither an epoch nor a timestamp.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("'{raw}' is neither unix epoch seconds nor an RFC3339 timestamp")]
pub struct DateParseError {
    pub raw: String,
}

const NAIVE_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

/// Parse a raw filter value into an absolute instant.
///
/// Integers are epoch seconds. Otherwise RFC3339 is tried, then the same
/// layout without an offset (read as UTC). A space in place of the offset's
/// `+` (left behind by form decoding) is tolerated.
///
/// # Errors
///
/// Returns [`DateParseError`] if every format fails.
pub fn parse_date(raw: &str) -> Result<DateTime<Utc>, DateParseError> {
    let trimmed = raw.trim();
    let err = || DateParseError {
        raw: raw.to_string(),
    };

    if let Ok(secs) = trimmed.parse::<i64>() {
        return DateTime::from_timestamp(secs, 0).ok_or_else(err);
    }

    if let Ok(ts) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(ts.with_timezone(&Utc));
    }

    if let Some(repaired) = repair_decoded_offset(trimmed) {
        if let Ok(ts) = DateTime::parse_from_rfc3339(&repaired) {
            return Ok(ts.with_timezone(&Utc));
        }
    }

    NAIVE_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(trimmed, format).ok())
        .map(|naive| naive.and_utc())
        .ok_or_else(err)
}

/// `2018-12-11T03:46:40 00:00` → `2018-12-11T03:46:40+00:00`.
fn repair_decoded_offset(raw: &str) -> Option<String> {
    let (head, offset) = raw.rsplit_once(' ')?;
    if head.contains('T') && offset.len() == 5 && offset.as_bytes()[2] == b':' {
        Some(format!("{head}+{offset}"))
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn epoch_and_rfc3339_name_the_same_instant() {
        let from_epoch = parse_date("1544500000").expect("epoch");
        let from_rfc = parse_date("2018-12-11T03:46:40+00:00").expect("rfc3339");
        assert_eq!(from_epoch, from_rfc);
    }

    #[test]
    fn offsets_are_normalized_to_utc() {
        let shifted = parse_date("2018-12-11T05:46:40+02:00").expect("offset");
        assert_eq!(shifted.timestamp(), 1_544_500_000);
        let zulu = parse_date("2018-12-11T03:46:40Z").expect("zulu");
        assert_eq!(zulu.timestamp(), 1_544_500_000);
    }

    #[test]
    fn missing_offset_is_read_as_utc() {
        let naive = parse_date("2018-12-11T03:46:40").expect("naive");
        assert_eq!(naive.timestamp(), 1_544_500_000);
        let spaced = parse_date("2018-12-11 03:46:40").expect("space separated");
        assert_eq!(spaced.timestamp(), 1_544_500_000);
    }

    #[test]
    fn form_decoded_plus_is_repaired() {
        let repaired = parse_date("2018-12-13T11:20:01 00:00").expect("decoded plus");
        assert_eq!(repaired.timestamp(), 1_544_700_001);
    }

    #[test]
    fn negative_epoch_is_before_1970() {
        let ts = parse_date("-86400").expect("negative epoch");
        assert_eq!(ts.to_rfc3339(), "1969-12-31T00:00:00+00:00");
    }

    #[test]
    fn garbage_is_rejected() {
        for raw in ["invalid", "", "2018-13-45T00:00:00Z", "12.5", "tomorrow"] {
            let err = parse_date(raw).expect_err("should not parse");
            assert_eq!(err.raw, raw);
        }
    }
}
