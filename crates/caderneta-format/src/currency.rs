use crate::only_digits;

/// Read the digit sequence of the input as centavos and render it as
/// `R$ <grouped integer>,<2-digit cents>`. The rightmost two digits are
/// the cents, leading zeros are dropped from the integer part and the
/// integer part is grouped with `.`. Empty or all-zero input renders as
/// `R$ 0,00`.
pub fn mask_currency(input: &str) -> String {
    let digits = only_digits(input);
    let digits = digits.trim_start_matches('0');
    let cents = format!("{:0>3}", digits);
    let (int_part, dec_part) = cents.split_at(cents.len() - 2);
    format!("R$ {},{}", group_thousands(int_part), dec_part)
}

/// Inverse of the mask: digits divided by 100. Empty input is 0.
pub fn parse_currency(input: &str) -> f64 {
    let digits = only_digits(input);
    if digits.is_empty() {
        return 0.0;
    }
    digits.parse::<f64>().unwrap_or(0.0) / 100.0
}

/// Render a stored amount with the pt-BR grouping and decimal
/// conventions. The sign is preserved.
pub fn format_currency(value: f64) -> String {
    let cents = (value.abs() * 100.0).round();
    let cents = if cents.is_finite() { cents as u64 } else { 0 };
    let masked = mask_currency(&cents.to_string());
    if value < 0.0 {
        format!("-{}", masked)
    } else {
        masked
    }
}

/// Absent amounts render as zero.
pub fn format_currency_or_zero(value: Option<f64>) -> String {
    format_currency(value.unwrap_or(0.0))
}

fn group_thousands(digits: &str) -> String {
    let bytes = digits.as_bytes();
    let mut out = String::with_capacity(bytes.len() + bytes.len() / 3);
    for (i, b) in bytes.iter().enumerate() {
        if i > 0 && (bytes.len() - i) % 3 == 0 {
            out.push('.');
        }
        out.push(*b as char);
    }
    out
}
