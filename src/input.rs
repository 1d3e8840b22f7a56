//! Form field handling for a calculator front end.
//!
//! Fields are free text with a unit suffix (`"100,000,000 원"`, `"5 %"`,
//! `"12 개월"`). The parsers ignore everything but the numeric characters, and
//! the `format_*_field` functions rebuild the canonical text as the user types.

use anyhow::{Context, Result, bail};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::display::format_currency;
use crate::{AmortizationResult, LoanInput, RepaymentMethod, compute};

pub const AMOUNT_UNIT: &str = "원";
pub const RATE_UNIT: &str = "%";
pub const MONTHS_UNIT: &str = "개월";

fn digits(text: &str) -> String {
    text.chars().filter(char::is_ascii_digit).collect()
}

fn rate_chars(text: &str) -> String {
    text.chars()
        .filter(|c| c.is_ascii_digit() || *c == '.')
        .collect()
}

/// Parses a loan amount, ignoring separators and the currency suffix.
pub fn parse_amount(text: &str) -> Result<Decimal> {
    let digits = digits(text);
    if digits.is_empty() {
        bail!("no digits in amount `{text}`");
    }
    digits
        .parse::<Decimal>()
        .with_context(|| format!("amount `{text}` is out of range"))
}

/// Parses an annual rate in percent.
///
/// Only digits and dots are kept; the longest leading number wins, so
/// `"5.2.1 %"` reads as `5.2`.
pub fn parse_rate(text: &str) -> Result<Decimal> {
    let kept = rate_chars(text);
    let number = match kept.match_indices('.').nth(1) {
        Some((second_dot, _)) => &kept[..second_dot],
        None => kept.as_str(),
    };
    let number = number.trim_end_matches('.');
    if !number.chars().any(|c| c.is_ascii_digit()) {
        bail!("no number in rate `{text}`");
    }

    let normalized = if number.starts_with('.') {
        format!("0{number}")
    } else {
        number.to_string()
    };
    normalized
        .parse::<Decimal>()
        .with_context(|| format!("rate `{text}` is out of range"))
}

/// Parses a term in months, ignoring the unit suffix.
///
/// Terms above [`crate::MAX_TERM_MONTHS`] parse here but are rejected by
/// [`LoanInput::validate`].
pub fn parse_months(text: &str) -> Result<u32> {
    let digits = digits(text);
    if digits.is_empty() {
        bail!("no digits in term `{text}`");
    }
    digits
        .parse::<u32>()
        .with_context(|| format!("term `{text}` is out of range"))
}

/// `"100000000"` becomes `"100,000,000 원"`. Text without digits clears the field.
pub fn format_amount_field(text: &str) -> String {
    match parse_amount(text) {
        Ok(amount) => format_amount(amount),
        Err(_) => String::new(),
    }
}

/// `"5"` becomes `"5 %"`.
pub fn format_rate_field(text: &str) -> String {
    let kept = rate_chars(text);
    if kept.is_empty() {
        return String::new();
    }
    format!("{kept} {RATE_UNIT}")
}

/// `"12"` becomes `"12 개월"`.
pub fn format_months_field(text: &str) -> String {
    let digits = digits(text);
    if digits.is_empty() {
        return String::new();
    }
    format!("{digits} {MONTHS_UNIT}")
}

/// Adds a quick-amount increment to the amount field. An unreadable field
/// counts as zero.
pub fn add_to_amount_field(text: &str, increment: Decimal) -> String {
    let current = parse_amount(text).unwrap_or_default();
    format_amount(current + increment)
}

fn format_amount(amount: Decimal) -> String {
    format!("{} {AMOUNT_UNIT}", format_currency(amount))
}

/// Raw text of the calculator form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoanForm {
    pub amount: String,
    pub rate: String,
    pub term: String,
    pub method: String,
}

impl LoanForm {
    /// Parses and validates every field.
    pub fn to_input(&self) -> Result<LoanInput> {
        let principal = parse_amount(&self.amount).context("invalid loan amount")?;
        let annual_rate_percent = parse_rate(&self.rate).context("invalid interest rate")?;
        let term_months = parse_months(&self.term).context("invalid loan term")?;
        let method = self
            .method
            .parse::<RepaymentMethod>()
            .context("invalid repayment method")?;

        let input = LoanInput {
            principal,
            annual_rate_percent,
            term_months,
            method,
        };
        input.validate().context("loan input rejected")?;
        Ok(input)
    }
}

/// Runs the engine on a form, or returns `None` when the form is not valid.
///
/// This is called on every edit, so an incomplete form is expected and only
/// logged at debug level.
pub fn evaluate(form: &LoanForm) -> Option<AmortizationResult> {
    let outcome = form
        .to_input()
        .and_then(|input| compute(&input).context("calculation failed"));

    match outcome {
        Ok(result) => Some(result),
        Err(err) => {
            debug!("Skipping calculation: {err:#}");
            None
        }
    }
}
