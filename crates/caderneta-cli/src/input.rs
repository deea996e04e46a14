use chrono::NaiveDate;

use caderneta_format::{parse_currency, parse_date_input};

/// Currency arguments follow the input mask conventions: `1.234,56`,
/// `1234,56` and `123456` all mean 1234.56.
pub fn parse_brl_arg(input: &str) -> Result<f64, String> {
    Ok(parse_currency(input))
}

/// Date arguments use the dd/mm/yyyy display convention.
pub fn parse_date_arg(input: &str) -> Result<NaiveDate, String> {
    parse_date_input(input)
        .ok_or_else(|| format!("invalid date '{}', expected dd/mm/yyyy", input))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_brl_arg() {
        assert_eq!(parse_brl_arg("1.234,56"), Ok(1234.56));
        assert_eq!(parse_brl_arg("123456"), Ok(1234.56));
        assert_eq!(parse_brl_arg(""), Ok(0.0));
    }

    #[test]
    fn test_parse_date_arg() {
        assert_eq!(
            parse_date_arg("25/12/2024"),
            Ok(NaiveDate::from_ymd_opt(2024, 12, 25).unwrap())
        );
        assert!(parse_date_arg("2024-12-25").is_err());
        assert!(parse_date_arg("25/12/24").is_err());
    }
}
