//! Brazilian phone numbers: two-digit area code (DDD) plus an 8-digit
//! landline or 9-digit mobile subscriber number.

use super::{apply_template, MaskRule};

/// Digits in a mobile number including the area code.
pub const MOBILE_DIGITS: usize = 11;

/// Digits in a landline number including the area code.
pub const LANDLINE_DIGITS: usize = 10;

const MOBILE_TEMPLATE: &str = "(DD) DDDDD-DDDD";
const LANDLINE_TEMPLATE: &str = "(DD) DDDD-DDDD";

/// Phone mask: `(DD) DDDD-DDDD` for landlines, `(DD) DDDDD-DDDD` for mobiles.
///
/// The two lengths are separate template variants. Anything shorter than a
/// mobile number is laid out on the landline template, so the hyphen moves
/// one slot to the right when the eleventh digit arrives.
#[derive(Debug, Clone, Copy, Default)]
pub struct PhoneMask;

impl MaskRule for PhoneMask {
    fn name(&self) -> &'static str {
        "phone"
    }

    fn max_digits(&self) -> usize {
        MOBILE_DIGITS
    }

    fn min_complete_digits(&self) -> usize {
        LANDLINE_DIGITS
    }

    fn format_digits(&self, digits: &str) -> String {
        let template = if digits.len() >= MOBILE_DIGITS {
            MOBILE_TEMPLATE
        } else {
            LANDLINE_TEMPLATE
        };
        apply_template(template, digits)
    }
}
