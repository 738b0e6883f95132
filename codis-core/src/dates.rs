use chrono::NaiveDate;
use thiserror::Error;

/// Accepted date layouts, tried in order. chrono's numeric fields also accept
/// unpadded digits, so `2023-1-5` and `2023/1/5` match these as well.
const LAYOUTS: [&str; 2] = ["%Y-%m-%d", "%Y/%m/%d"];

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unrecognized date '{input}'; expected YYYY-MM-DD or YYYY/MM/DD")]
pub struct DateParseError {
    pub input: String,
}

/// Parse a human-entered calendar date. No timezone interpretation happens
/// here; downstream code anchors dates at local midnight.
pub fn parse_flexible(text: &str) -> Result<NaiveDate, DateParseError> {
    let trimmed = text.trim();
    LAYOUTS
        .iter()
        .find_map(|layout| NaiveDate::parse_from_str(trimmed, layout).ok())
        .ok_or_else(|| DateParseError { input: text.to_string() })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_four_spellings_agree() {
        let expected = NaiveDate::from_ymd_opt(2023, 1, 5).unwrap();
        for input in ["2023-01-05", "2023/01/05", "2023-1-5", "2023/1/5"] {
            assert_eq!(parse_flexible(input), Ok(expected), "input {input:?}");
        }
    }

    #[test]
    fn surrounding_whitespace_is_tolerated() {
        let expected = NaiveDate::from_ymd_opt(2020, 12, 31).unwrap();
        assert_eq!(parse_flexible(" 2020-12-31 "), Ok(expected));
    }

    #[test]
    fn rejects_other_layouts() {
        for input in ["05-01-2023", "2023.01.05", "20230105", "yesterday", ""] {
            let err = parse_flexible(input).unwrap_err();
            assert_eq!(err.input, input);
        }
    }

    #[test]
    fn rejects_impossible_dates() {
        assert!(parse_flexible("2023-02-30").is_err());
        assert!(parse_flexible("2023-13-01").is_err());
    }

    #[test]
    fn leap_day_parses_in_leap_years_only() {
        assert!(parse_flexible("2024-02-29").is_ok());
        assert!(parse_flexible("2023-02-29").is_err());
    }
}
