#[cfg(test)]
mod tests {
    use crate::mapper::fields::{parse_date, parse_flag, parse_number, truncate};
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    #[test]
    fn test_truncate() {
        assert_eq!(truncate(None, 10), None);
        assert_eq!(truncate(Some(""), 10), None);
        assert_eq!(truncate(Some("   "), 10), None);
        assert_eq!(truncate(Some("abcdef"), 3), Some("abc".to_string()));
        assert_eq!(truncate(Some("abc"), 10), Some("abc".to_string()));
        assert_eq!(truncate(Some("  abc  "), 10), Some("abc".to_string()));
        //character count, not bytes
        assert_eq!(truncate(Some("ñandú"), 4), Some("ñand".to_string()));
    }

    #[test]
    fn test_parse_number() {
        assert_eq!(parse_number(Some("$1,234.56")), Some(dec!(1234.56)));
        assert_eq!(parse_number(Some("1000")), Some(dec!(1000)));
        assert_eq!(parse_number(Some(" $ 12 ")), Some(dec!(12)));
        assert_eq!(parse_number(Some("-55.5")), Some(dec!(-55.5)));
        assert_eq!(parse_number(None), None);
        assert_eq!(parse_number(Some("")), None);
        assert_eq!(parse_number(Some("abc")), None);
        //trailing garbage is not a number
        assert_eq!(parse_number(Some("12abc")), None);
    }

    #[test]
    fn test_parse_date_slash_format() {
        assert_eq!(
            parse_date(Some("31/01/2020")),
            NaiveDate::from_ymd_opt(2020, 1, 31)
        );
        assert_eq!(
            parse_date(Some("1/2/2021")),
            NaiveDate::from_ymd_opt(2021, 2, 1)
        );
        //impossible calendar date
        assert_eq!(parse_date(Some("31/02/2020")), None);
        assert_eq!(parse_date(Some("aa/bb/cccc")), None);
    }

    #[test]
    fn test_parse_date_iso_formats() {
        assert_eq!(
            parse_date(Some("2020-01-31")),
            NaiveDate::from_ymd_opt(2020, 1, 31)
        );
        assert_eq!(
            parse_date(Some("2020-01-31 10:30:00")),
            NaiveDate::from_ymd_opt(2020, 1, 31)
        );
        assert_eq!(
            parse_date(Some("2020-01-31T10:30:00.000")),
            NaiveDate::from_ymd_opt(2020, 1, 31)
        );
        assert_eq!(
            parse_date(Some("2020-01-31T10:30:00Z")),
            NaiveDate::from_ymd_opt(2020, 1, 31)
        );
        assert_eq!(parse_date(Some("not a date")), None);
        assert_eq!(parse_date(Some("")), None);
        assert_eq!(parse_date(None), None);
    }

    #[test]
    fn test_parse_flag() {
        assert!(parse_flag(Some("Sí")));
        assert!(parse_flag(Some("si")));
        assert!(parse_flag(Some(" SI ")));
        assert!(parse_flag(Some("true")));
        assert!(parse_flag(Some("1")));
        assert!(parse_flag(Some("yes")));
        assert!(!parse_flag(Some("no")));
        assert!(!parse_flag(Some("0")));
        assert!(!parse_flag(Some("")));
        assert!(!parse_flag(None));
    }
}
