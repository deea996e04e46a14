use crate::only_digits;

/// CEP mask: digits-only prefix (max 8), hyphen after the fifth digit
/// once there is a sixth.
pub fn mask_postal_code(input: &str) -> String {
    let digits = only_digits(input);
    let digits = &digits[..digits.len().min(8)];
    if digits.len() <= 5 {
        digits.to_string()
    } else {
        format!("{}-{}", &digits[..5], &digits[5..])
    }
}
