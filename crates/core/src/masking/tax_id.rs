//! CPF (individual taxpayer identifier) mask.

use super::{apply_template, MaskRule};

/// Digits in a CPF.
pub const CPF_DIGITS: usize = 11;

const CPF_TEMPLATE: &str = "DDD.DDD.DDD-DD";

/// CPF mask: `DDD.DDD.DDD-DD`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TaxIdMask;

impl MaskRule for TaxIdMask {
    fn name(&self) -> &'static str {
        "tax_id"
    }

    fn max_digits(&self) -> usize {
        CPF_DIGITS
    }

    fn format_digits(&self, digits: &str) -> String {
        apply_template(CPF_TEMPLATE, digits)
    }
}
