//! Legacy hit export parsing
//!
//! One row per document:
//!
//! ```text
//! legacy_id,past_hits,recent_hits,start,end,interval
//! m1,5,3,1380600000,1381723200,604800
//! ```
//!
//! `start` and `end` are epoch seconds, `interval` is the length of the
//! "recent" period in seconds, ending at `end`.

use chrono::{DateTime, Duration, TimeZone, Utc};

use super::errors::{HitCountError, HitCountResult};

const FIELD_COUNT: usize = 6;

/// One row of the legacy hit export
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HitRow {
    pub legacy_id: String,
    /// Hits over the whole period, recent ones included
    pub past_hits: u64,
    /// Hits during the last `interval`
    pub recent_hits: u64,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub interval: Duration,
}

/// Parses the legacy export. Blank lines are ignored.
pub fn parse_hits(input: &str) -> HitCountResult<Vec<HitRow>> {
    input
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(index, line)| parse_row(index + 1, line))
        .collect()
}

fn parse_row(line_no: usize, line: &str) -> HitCountResult<HitRow> {
    let fields: Vec<&str> = line.split(',').map(clean_field).collect();
    if fields.len() != FIELD_COUNT {
        return Err(HitCountError::parse(
            line_no,
            format!("expected {} fields, found {}", FIELD_COUNT, fields.len()),
        ));
    }
    if fields[0].is_empty() {
        return Err(HitCountError::parse(line_no, "empty legacy id"));
    }

    let number = |index: usize, name: &str| -> HitCountResult<i64> {
        fields[index].parse::<i64>().map_err(|e| {
            HitCountError::parse(line_no, format!("invalid {} '{}': {}", name, fields[index], e))
        })
    };
    let count = |index: usize, name: &str| -> HitCountResult<u64> {
        let value = number(index, name)?;
        u64::try_from(value)
            .map_err(|_| HitCountError::parse(line_no, format!("negative {}: {}", name, value)))
    };
    let timestamp = |index: usize, name: &str| -> HitCountResult<DateTime<Utc>> {
        let seconds = number(index, name)?;
        Utc.timestamp_opt(seconds, 0).single().ok_or_else(|| {
            HitCountError::parse(line_no, format!("{} out of range: {}", name, seconds))
        })
    };

    let seconds = number(5, "interval")?;
    if seconds < 0 {
        return Err(HitCountError::parse(
            line_no,
            format!("negative interval: {}", seconds),
        ));
    }
    let interval = Duration::try_seconds(seconds).ok_or_else(|| {
        HitCountError::parse(line_no, format!("interval out of range: {}", seconds))
    })?;

    let end = timestamp(4, "end")?;
    if end.checked_sub_signed(interval).is_none() {
        return Err(HitCountError::parse(
            line_no,
            format!("interval {} reaches before the earliest date", seconds),
        ));
    }

    Ok(HitRow {
        legacy_id: fields[0].to_string(),
        past_hits: count(1, "past_hits")?,
        recent_hits: count(2, "recent_hits")?,
        start: timestamp(3, "start")?,
        end,
        interval,
    })
}

fn clean_field(field: &str) -> &str {
    let field = field.trim();
    field
        .strip_prefix('"')
        .and_then(|f| f.strip_suffix('"'))
        .unwrap_or(field)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_row() {
        let rows = parse_hits("m1,5,3,1380600000,1381723200,604800\n").unwrap();
        assert_eq!(rows.len(), 1);

        let row = &rows[0];
        assert_eq!(row.legacy_id, "m1");
        assert_eq!(row.past_hits, 5);
        assert_eq!(row.recent_hits, 3);
        assert_eq!(row.start.timestamp(), 1380600000);
        assert_eq!(row.end.timestamp(), 1381723200);
        assert_eq!(row.interval, Duration::days(7));
    }

    #[test]
    fn test_quotes_and_blank_lines() {
        let input = "\n\"m1\", 5, 3, 0, 100, 10\n\nm2,1,1,0,100,10\n";
        let rows = parse_hits(input).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].legacy_id, "m1");
        assert_eq!(rows[1].legacy_id, "m2");
    }

    #[test]
    fn test_wrong_field_count_names_line() {
        let err = parse_hits("m1,5,3,0,100,10\nm2,5,3\n").unwrap_err();
        assert!(matches!(err, HitCountError::Parse { line: 2, .. }));
    }

    #[test]
    fn test_non_numeric_field() {
        let err = parse_hits("m1,five,3,0,100,10").unwrap_err();
        assert!(err.to_string().contains("past_hits"));
    }

    #[test]
    fn test_negative_counts_rejected() {
        assert!(parse_hits("m1,5,-3,0,100,10").is_err());
        assert!(parse_hits("m1,5,3,0,100,-10").is_err());
    }

    #[test]
    fn test_interval_too_large_for_duration() {
        let err = parse_hits("m1,5,3,0,100,9223372036854775807").unwrap_err();
        assert!(matches!(err, HitCountError::Parse { line: 1, .. }));
        assert!(err.to_string().contains("interval"));
    }

    #[test]
    fn test_interval_before_earliest_date() {
        let err = parse_hits("m1,5,3,0,100,10\nm2,5,3,0,100,9000000000000").unwrap_err();
        assert!(matches!(err, HitCountError::Parse { line: 2, .. }));
    }

    #[test]
    fn test_empty_input() {
        assert!(parse_hits("").unwrap().is_empty());
    }
}
