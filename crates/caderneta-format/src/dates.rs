use chrono::NaiveDate;

use crate::only_digits;

/// Progressive `dd/mm/yyyy` mask: takes the digits-only prefix (max 8)
/// and inserts the separators as the groups fill up. A separator is
/// never emitted before the next group has at least one digit.
pub fn mask_date_input(input: &str) -> String {
    let digits = only_digits(input);
    let digits = &digits[..digits.len().min(8)];
    let mut out = String::from(&digits[..digits.len().min(2)]);
    if digits.len() > 2 {
        out.push('/');
        out.push_str(&digits[2..digits.len().min(4)]);
    }
    if digits.len() > 4 {
        out.push('/');
        out.push_str(&digits[4..]);
    }
    out
}

/// Parse `dd/mm/yyyy` input into the storage representation. Requires
/// exactly 8 digits after stripping separators; anything else, and any
/// calendar-impossible combination, is `None`.
pub fn parse_date_input(input: &str) -> Option<NaiveDate> {
    let digits = only_digits(input);
    if digits.len() != 8 {
        return None;
    }
    let day = digits[0..2].parse().ok()?;
    let month = digits[2..4].parse().ok()?;
    let year = digits[4..8].parse().ok()?;
    NaiveDate::from_ymd_opt(year, month, day)
}

/// Display convention for stored dates.
pub fn display_date(date: NaiveDate) -> String {
    date.format("%d/%m/%Y").to_string()
}

/// Placeholder dash for absent dates.
pub fn display_date_or_placeholder(date: Option<NaiveDate>) -> String {
    match date {
        Some(date) => display_date(date),
        None => "-".to_string(),
    }
}

/// Reorder a raw stored `yyyy-mm-dd` string to `dd/mm/yyyy`. The input
/// must match the storage pattern exactly; anything else yields an
/// empty string.
pub fn storage_date_to_display(stored: &str) -> String {
    let bytes = stored.as_bytes();
    if bytes.len() != 10 {
        return String::new();
    }
    let matches = bytes.iter().enumerate().all(|(i, b)| match i {
        4 | 7 => *b == b'-',
        _ => b.is_ascii_digit(),
    });
    if !matches {
        return String::new();
    }
    format!("{}/{}/{}", &stored[8..10], &stored[5..7], &stored[0..4])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mask_date_input_progressive() {
        assert_eq!(mask_date_input(""), "");
        assert_eq!(mask_date_input("2"), "2");
        assert_eq!(mask_date_input("25"), "25");
        assert_eq!(mask_date_input("251"), "25/1");
        assert_eq!(mask_date_input("2512"), "25/12");
        assert_eq!(mask_date_input("25122"), "25/12/2");
        assert_eq!(mask_date_input("25122024"), "25/12/2024");
    }

    #[test]
    fn test_mask_date_input_strips_and_truncates() {
        assert_eq!(mask_date_input("25/12/2024"), "25/12/2024");
        assert_eq!(mask_date_input("2512202499"), "25/12/2024");
        assert_eq!(mask_date_input("a2b5"), "25");
    }

    #[test]
    fn test_parse_date_input() {
        assert_eq!(
            parse_date_input("25/12/2024"),
            NaiveDate::from_ymd_opt(2024, 12, 25)
        );
        assert_eq!(
            parse_date_input("25122024"),
            NaiveDate::from_ymd_opt(2024, 12, 25)
        );
        assert_eq!(parse_date_input(""), None);
        assert_eq!(parse_date_input("2512224"), None);
        assert_eq!(parse_date_input("251220249"), None);
        // Eight digits, but not a date.
        assert_eq!(parse_date_input("31/02/2024"), None);
        assert_eq!(parse_date_input("00/01/2024"), None);
    }

    #[test]
    fn test_display_date() {
        let date = NaiveDate::from_ymd_opt(2024, 12, 25).unwrap();
        assert_eq!(display_date(date), "25/12/2024");
        assert_eq!(display_date_or_placeholder(Some(date)), "25/12/2024");
        assert_eq!(display_date_or_placeholder(None), "-");
    }

    #[test]
    fn test_parse_display_round_trip() {
        for input in ["25/12/2024", "01/01/1900", "29/02/2024"] {
            let date = parse_date_input(input).unwrap();
            assert_eq!(display_date(date), input);
        }
    }

    #[test]
    fn test_storage_date_to_display() {
        assert_eq!(storage_date_to_display("2024-12-25"), "25/12/2024");
        assert_eq!(storage_date_to_display("2024-1-25"), "");
        assert_eq!(storage_date_to_display("2024/12/25"), "");
        assert_eq!(storage_date_to_display("25/12/2024"), "");
        assert_eq!(storage_date_to_display(""), "");
    }

    #[test]
    fn test_storage_display_round_trip() {
        let date = parse_date_input("25/12/2024").unwrap();
        assert_eq!(storage_date_to_display(&date.to_string()), "25/12/2024");
    }
}
