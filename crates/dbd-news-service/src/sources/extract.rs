//! Ordered fallback extraction shared by the adapters.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

/// One way of pulling a field out of a parsed document.
pub type Strategy<T> = fn(&T) -> Option<String>;

/// Evaluate `strategies` in order; the first non-blank result wins.
pub fn first_non_empty<T>(input: &T, strategies: &[Strategy<T>]) -> Option<String> {
    strategies.iter().find_map(|strategy| {
        strategy(input)
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
    })
}

/// Evaluate `strategies` in order; the first value `parse` accepts wins.
/// Values that fail to parse fall through to the next strategy.
pub fn first_parsed<T, V>(
    input: &T,
    strategies: &[Strategy<T>],
    parse: impl Fn(&str) -> Option<V>,
) -> Option<V> {
    strategies
        .iter()
        .filter_map(|strategy| strategy(input))
        .find_map(|value| parse(value.trim()))
}

/// Long-form dates as written in article bylines, e.g. "October 3, 2024".
const LONG_DATE_FORMATS: &[&str] = &["%B %d, %Y", "%B %d %Y", "%d %B %Y", "%Y/%m/%d", "%m/%d/%Y"];

/// Parse the timestamp formats seen across feeds and article metadata.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S") {
        return Some(dt.and_utc());
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S") {
        return Some(dt.and_utc());
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(raw, "%B %d, %Y %H:%M:%S") {
        return Some(dt.and_utc());
    }
    std::iter::once("%Y-%m-%d")
        .chain(LONG_DATE_FORMATS.iter().copied())
        .find_map(|format| NaiveDate::parse_from_str(raw, format).ok())
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    struct Doc {
        a: Option<&'static str>,
        b: Option<&'static str>,
    }

    #[test]
    fn test_first_non_empty_skips_blank_values() {
        let strategies: &[Strategy<Doc>] = &[
            |d| d.a.map(str::to_string),
            |d| d.b.map(str::to_string),
        ];

        let doc = Doc {
            a: Some("   "),
            b: Some(" second "),
        };
        assert_eq!(first_non_empty(&doc, strategies).as_deref(), Some("second"));

        let doc = Doc { a: None, b: None };
        assert_eq!(first_non_empty(&doc, strategies), None);
    }

    #[test]
    fn test_parse_timestamp_formats() {
        let expected = Utc.with_ymd_and_hms(2025, 10, 21, 14, 30, 0).unwrap();
        assert_eq!(parse_timestamp("2025-10-21T14:30:00Z"), Some(expected));
        assert_eq!(parse_timestamp("2025-10-21T10:30:00-04:00"), Some(expected));
        assert_eq!(
            parse_timestamp("Tue, 21 Oct 2025 14:30:00 +0000"),
            Some(expected)
        );
        assert_eq!(parse_timestamp("2025-10-21T14:30:00"), Some(expected));
        assert_eq!(
            parse_timestamp("2025-10-21"),
            Some(Utc.with_ymd_and_hms(2025, 10, 21, 0, 0, 0).unwrap())
        );
        assert_eq!(parse_timestamp("yesterday"), None);
    }

    #[test]
    fn test_parse_timestamp_long_form_dates() {
        let expected = Utc.with_ymd_and_hms(2024, 10, 3, 0, 0, 0).unwrap();
        assert_eq!(parse_timestamp("October 3, 2024"), Some(expected));
        assert_eq!(parse_timestamp("Oct 3, 2024"), Some(expected));
        assert_eq!(parse_timestamp("3 October 2024"), Some(expected));
        assert_eq!(parse_timestamp("2024/10/03"), Some(expected));
        assert_eq!(
            parse_timestamp("October 3, 2024 18:15:00"),
            Some(Utc.with_ymd_and_hms(2024, 10, 3, 18, 15, 0).unwrap())
        );
    }

    #[test]
    fn test_first_parsed_skips_unparseable_values() {
        let strategies: &[Strategy<Doc>] = &[
            |d| d.a.map(str::to_string),
            |d| d.b.map(str::to_string),
        ];

        let doc = Doc {
            a: Some("sometime last fall"),
            b: Some(" 2024-10-03T00:00:00Z "),
        };
        assert_eq!(
            first_parsed(&doc, strategies, parse_timestamp),
            Some(Utc.with_ymd_and_hms(2024, 10, 3, 0, 0, 0).unwrap())
        );

        let doc = Doc {
            a: Some("never"),
            b: None,
        };
        assert_eq!(first_parsed(&doc, strategies, parse_timestamp), None);
    }
}
