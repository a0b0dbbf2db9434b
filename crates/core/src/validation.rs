//! Submission-time checks for masked fields.
//!
//! Masking keeps a field well-formed while typing; these validators decide
//! whether the digits are acceptable when the form is submitted. Both return
//! the bare digits to send to the backend.

use crate::error::{CoreError, CoreResult};
use crate::masking::strip_digits;

/// Validate a CPF (formatted or not) and return its 11 digits.
///
/// Rejects wrong lengths, repeated-digit sequences such as
/// `111.111.111-11`, and wrong check digits.
///
/// # Examples
///
/// ```
/// use clinica_core::validation::validate_cpf;
/// assert_eq!(validate_cpf("123.456.789-09").unwrap(), "12345678909");
/// assert!(validate_cpf("123.456.789-00").is_err());
/// ```
pub fn validate_cpf(raw: &str) -> CoreResult<String> {
    let digits = strip_digits(raw);
    if digits.len() != 11 {
        return Err(CoreError::Validation(format!(
            "CPF must have 11 digits, got {}",
            digits.len()
        )));
    }

    let values: Vec<u32> = digits.chars().filter_map(|c| c.to_digit(10)).collect();
    if values.iter().all(|&d| d == values[0]) {
        return Err(CoreError::Validation(
            "CPF cannot be a repeated digit sequence".to_string(),
        ));
    }

    let first = check_digit(&values[..9]);
    let second = check_digit(&values[..10]);
    if values[9] != first || values[10] != second {
        return Err(CoreError::Validation("CPF check digits do not match".to_string()));
    }

    Ok(digits)
}

/// Mod-11 check digit over `prefix`, weights counting down from
/// `prefix.len() + 1`.
fn check_digit(prefix: &[u32]) -> u32 {
    let weight_start = prefix.len() as u32 + 1;
    let sum: u32 = prefix
        .iter()
        .enumerate()
        .map(|(i, d)| d * (weight_start - i as u32))
        .sum();
    let rest = (sum * 10) % 11;
    if rest == 10 {
        0
    } else {
        rest
    }
}

/// Validate a phone number (formatted or not) and return its digits.
///
/// Accepts 10-digit landlines and 11-digit mobiles. The area code cannot
/// start with `0`, and an 11-digit number must be a mobile (`9` after the
/// area code).
pub fn validate_phone(raw: &str) -> CoreResult<String> {
    let digits = strip_digits(raw);
    if digits.len() != 10 && digits.len() != 11 {
        return Err(CoreError::Validation(format!(
            "phone must have 10 or 11 digits, got {}",
            digits.len()
        )));
    }
    if digits.starts_with('0') {
        return Err(CoreError::Validation(
            "area code cannot start with 0".to_string(),
        ));
    }
    if digits.len() == 11 && digits.chars().nth(2) != Some('9') {
        return Err(CoreError::Validation(
            "11-digit numbers must be mobile numbers starting with 9".to_string(),
        ));
    }
    Ok(digits)
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    // -- validate_cpf --------------------------------------------------------

    #[test]
    fn cpf_valid_formatted_and_bare() {
        assert_eq!(validate_cpf("123.456.789-09").unwrap(), "12345678909");
        assert_eq!(validate_cpf("52998224725").unwrap(), "52998224725");
    }

    #[test]
    fn cpf_wrong_check_digits() {
        assert_matches!(validate_cpf("123.456.789-00"), Err(CoreError::Validation(_)));
        assert_matches!(validate_cpf("52998224724"), Err(CoreError::Validation(_)));
    }

    #[test]
    fn cpf_repeated_digits_rejected() {
        assert_matches!(validate_cpf("111.111.111-11"), Err(CoreError::Validation(_)));
        assert_matches!(validate_cpf("00000000000"), Err(CoreError::Validation(_)));
    }

    #[test]
    fn cpf_wrong_length_rejected() {
        assert_matches!(validate_cpf(""), Err(CoreError::Validation(_)));
        assert_matches!(validate_cpf("123.456.789"), Err(CoreError::Validation(_)));
    }

    // -- validate_phone ------------------------------------------------------

    #[test]
    fn phone_accepts_landline_and_mobile() {
        assert_eq!(validate_phone("(11) 3333-4444").unwrap(), "1133334444");
        assert_eq!(validate_phone("(11) 99999-8888").unwrap(), "11999998888");
    }

    #[test]
    fn phone_rejects_bad_lengths() {
        assert_matches!(validate_phone("(11) 9999"), Err(CoreError::Validation(_)));
        assert_matches!(validate_phone("119999988881"), Err(CoreError::Validation(_)));
    }

    #[test]
    fn phone_rejects_zero_area_code() {
        assert_matches!(validate_phone("0133334444"), Err(CoreError::Validation(_)));
    }

    #[test]
    fn phone_rejects_eleven_digit_landline() {
        assert_matches!(validate_phone("11333334444"), Err(CoreError::Validation(_)));
    }
}
