//! Input masking engine for form fields.
//!
//! Every mask is a [`MaskRule`]: it strips the raw field content down to
//! ASCII digits, drops anything beyond the rule's digit capacity, and lays
//! the survivors out on a fixed template. Rules are stateless, so running a
//! rule over its own output yields the same string, and stripping the
//! output gives back the digits that were kept.
//!
//! Masking never fails. Junk is removed, excess digits are dropped, and an
//! empty input produces an empty output.

mod phone;
mod postal_code;
mod tax_id;

use std::str::FromStr;

use serde::{Deserialize, Serialize};

pub use phone::PhoneMask;
pub use postal_code::PostalCodeMask;
pub use tax_id::TaxIdMask;

/// Placeholder character used in mask templates for "one digit goes here".
pub const DIGIT_SLOT: char = 'D';

/// A formatting rule applied to a text field on every keystroke.
pub trait MaskRule: Send + Sync {
    /// Stable identifier of the rule (used in logs and form metadata).
    fn name(&self) -> &'static str;

    /// Maximum number of digits the rule keeps; extra digits are dropped.
    fn max_digits(&self) -> usize;

    /// Minimum digit count at which the value is considered complete.
    fn min_complete_digits(&self) -> usize {
        self.max_digits()
    }

    /// Lay out already-stripped digits (at most [`max_digits`](Self::max_digits)).
    fn format_digits(&self, digits: &str) -> String;

    /// Mask a raw field value.
    fn apply(&self, raw: &str) -> String {
        self.format_digits(&take_digits(raw, self.max_digits()))
    }

    /// Whether the raw value carries enough digits to be submitted.
    fn is_complete(&self, raw: &str) -> bool {
        let count = take_digits(raw, self.max_digits()).len();
        count >= self.min_complete_digits()
    }
}

/// Remove every character that is not an ASCII digit.
///
/// # Examples
///
/// ```
/// use clinica_core::masking::strip_digits;
/// assert_eq!(strip_digits("(11) 99999-8888"), "11999998888");
/// assert_eq!(strip_digits("abc"), "");
/// ```
pub fn strip_digits(raw: &str) -> String {
    raw.chars().filter(char::is_ascii_digit).collect()
}

/// Strip non-digits and keep at most `max` digits, in their original order.
pub fn take_digits(raw: &str, max: usize) -> String {
    raw.chars().filter(char::is_ascii_digit).take(max).collect()
}

/// Lay `digits` out on `template`, replacing each [`DIGIT_SLOT`] in turn.
///
/// Literal template characters are emitted only when a digit follows them,
/// so a partial input stops at the last digit instead of trailing
/// punctuation. Digits beyond the template's slots are ignored.
pub fn apply_template(template: &str, digits: &str) -> String {
    let mut remaining = digits.chars().peekable();
    let mut out = String::with_capacity(template.len());
    let mut pending = String::new();

    for slot in template.chars() {
        if remaining.peek().is_none() {
            break;
        }
        if slot == DIGIT_SLOT {
            out.push_str(&pending);
            pending.clear();
            if let Some(digit) = remaining.next() {
                out.push(digit);
            }
        } else {
            pending.push(slot);
        }
    }

    out
}

// ---------------------------------------------------------------------------
// Mask kinds
// ---------------------------------------------------------------------------

/// The mask kinds available to form fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MaskKind {
    Phone,
    TaxId,
    PostalCode,
}

static PHONE: PhoneMask = PhoneMask;
static TAX_ID: TaxIdMask = TaxIdMask;
static POSTAL_CODE: PostalCodeMask = PostalCodeMask;

impl MaskKind {
    /// All known mask kinds.
    pub const ALL: [MaskKind; 3] = [MaskKind::Phone, MaskKind::TaxId, MaskKind::PostalCode];

    /// The rule implementing this kind.
    pub fn rule(self) -> &'static dyn MaskRule {
        match self {
            MaskKind::Phone => &PHONE,
            MaskKind::TaxId => &TAX_ID,
            MaskKind::PostalCode => &POSTAL_CODE,
        }
    }

    pub fn as_str(self) -> &'static str {
        self.rule().name()
    }
}

impl FromStr for MaskKind {
    type Err = crate::error::CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        MaskKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| {
                crate::error::CoreError::InvalidArgument(format!("unknown mask kind '{s}'"))
            })
    }
}

/// What a masked field shows and what it submits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaskedValue {
    /// Formatted string rendered in the input.
    pub display: String,
    /// Digits kept by the rule, sent to the backend.
    pub digits: String,
    /// Whether `digits` has reached the rule's complete length.
    pub complete: bool,
}

impl MaskedValue {
    /// Run `rule` over `raw` and capture both representations.
    pub fn new(rule: &dyn MaskRule, raw: &str) -> Self {
        let digits = take_digits(raw, rule.max_digits());
        Self {
            display: rule.format_digits(&digits),
            complete: digits.len() >= rule.min_complete_digits(),
            digits,
        }
    }
}

/// Mask `raw` with the rule for `kind`.
///
/// # Examples
///
/// ```
/// use clinica_core::masking::{mask, MaskKind};
/// let value = mask(MaskKind::Phone, "11999998888");
/// assert_eq!(value.display, "(11) 99999-8888");
/// assert_eq!(value.digits, "11999998888");
/// ```
pub fn mask(kind: MaskKind, raw: &str) -> MaskedValue {
    MaskedValue::new(kind.rule(), raw)
}
