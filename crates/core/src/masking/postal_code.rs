//! CEP (postal code) mask used on patient addresses.

use super::{apply_template, MaskRule};

/// Digits in a CEP.
pub const CEP_DIGITS: usize = 8;

/// CEP mask: `DDDDD-DDD`.
#[derive(Debug, Clone, Copy, Default)]
pub struct PostalCodeMask;

impl MaskRule for PostalCodeMask {
    fn name(&self) -> &'static str {
        "postal_code"
    }

    fn max_digits(&self) -> usize {
        CEP_DIGITS
    }

    fn format_digits(&self, digits: &str) -> String {
        apply_template("DDDDD-DDD", digits)
    }
}
