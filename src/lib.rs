//! `loan_amortization` computes loan repayment schedules.
//!
//! Three repayment methods are supported:
//! - **Equal installment** (annuity): the total payment is fixed, the interest share
//!   shrinks and the principal share grows every month.
//! - **Equal principal**: the principal share is fixed, so the total payment
//!   decreases as the outstanding balance shrinks.
//! - **Bullet**: interest only until maturity, the whole principal is repaid with
//!   the final payment.
//!
//! All arithmetic is done in [`Decimal`] at full precision. Rounding to whole
//! currency units only happens in [`display`].
//!
//! ## Usage
//!
//! ```rust
//! use loan_amortization::{compute, LoanInput, RepaymentMethod};
//! use rust_decimal_macros::dec;
//!
//! let input = LoanInput {
//!     principal: dec!(100_000_000),
//!     annual_rate_percent: dec!(5),
//!     term_months: 12,
//!     method: RepaymentMethod::EqualInstallment,
//! };
//!
//! let result = compute(&input).unwrap();
//! assert_eq!(result.schedule.len(), 12);
//! assert_eq!(result.monthly_payment.round(), dec!(8_560_748));
//! ```

use std::fmt;
use std::str::FromStr;

use rust_decimal::{Decimal, MathematicalOps};
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use tracing::debug;

pub mod display;
mod error;
pub mod input;

pub use error::AmortizationError;

/// Longest accepted term, 100 years of monthly payments.
pub const MAX_TERM_MONTHS: u32 = 1_200;

/// How the principal is paid back over the term.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RepaymentMethod {
    /// Constant total payment (annuity).
    EqualInstallment,
    /// Constant principal portion.
    EqualPrincipal,
    /// Interest only, principal repaid at maturity.
    Bullet,
}

impl RepaymentMethod {
    pub const ALL: [RepaymentMethod; 3] = [
        RepaymentMethod::EqualInstallment,
        RepaymentMethod::EqualPrincipal,
        RepaymentMethod::Bullet,
    ];

    /// Builds the schedule for this method from an already derived monthly rate.
    pub fn schedule(
        self,
        principal: Decimal,
        monthly_rate: Decimal,
        term_months: u32,
    ) -> Result<AmortizationResult, AmortizationError> {
        match self {
            RepaymentMethod::EqualInstallment => {
                calculate_equal_installment(principal, monthly_rate, term_months)
            }
            RepaymentMethod::EqualPrincipal => {
                calculate_equal_principal(principal, monthly_rate, term_months)
            }
            RepaymentMethod::Bullet => calculate_bullet(principal, monthly_rate, term_months),
        }
    }
}

impl fmt::Display for RepaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RepaymentMethod::EqualInstallment => "equal_installment",
            RepaymentMethod::EqualPrincipal => "equal_principal",
            RepaymentMethod::Bullet => "bullet",
        };
        f.write_str(name)
    }
}

impl FromStr for RepaymentMethod {
    type Err = AmortizationError;

    /// Accepts the snake_case names as well as the short form values
    /// `equal`, `principal` and `bullet`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "equal" | "equal_installment" => Ok(RepaymentMethod::EqualInstallment),
            "principal" | "equal_principal" => Ok(RepaymentMethod::EqualPrincipal),
            "bullet" => Ok(RepaymentMethod::Bullet),
            other => Err(AmortizationError::invalid(
                "method",
                format!("unknown repayment method `{other}`"),
            )),
        }
    }
}

/// Input parameters for a schedule calculation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanInput {
    /// The borrowed amount.
    pub principal: Decimal,
    /// The annual interest rate as a percentage (e.g., 5 for 5%).
    pub annual_rate_percent: Decimal,
    /// The number of monthly periods.
    pub term_months: u32,
    pub method: RepaymentMethod,
}

impl LoanInput {
    /// Reads an input from its JSON representation.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Checks that every field is strictly positive and the term is at most
    /// [`MAX_TERM_MONTHS`].
    pub fn validate(&self) -> Result<(), AmortizationError> {
        if self.principal <= dec!(0) {
            return Err(AmortizationError::invalid(
                "principal",
                format!("must be positive, got {}", self.principal),
            ));
        }
        if self.annual_rate_percent <= dec!(0) {
            return Err(AmortizationError::invalid(
                "annual_rate_percent",
                format!("must be positive, got {}", self.annual_rate_percent),
            ));
        }
        check_term(self.term_months)
    }

    pub fn monthly_rate(&self) -> Decimal {
        monthly_rate(self.annual_rate_percent)
    }
}

/// One row of an amortization schedule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeriodEntry {
    /// 1-based month number.
    pub month: u32,
    /// Total paid this month, `principal + interest`.
    pub payment: Decimal,
    /// The portion of the payment that reduces the balance.
    pub principal: Decimal,
    /// The portion of the payment that covers interest.
    pub interest: Decimal,
    /// Outstanding balance after this month's payment, never negative.
    pub remaining_balance: Decimal,
}

/// The outcome of a schedule calculation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AmortizationResult {
    pub method: RepaymentMethod,
    /// The original borrowed amount.
    pub principal: Decimal,
    /// The first month's payment. Constant for equal installment, informational
    /// for the other methods.
    pub monthly_payment: Decimal,
    pub total_interest: Decimal,
    pub total_payment: Decimal,
    /// One entry per month, in order.
    pub schedule: Vec<PeriodEntry>,
}

/// Converts an annual percentage rate into a simple monthly decimal rate.
///
/// `5` (percent per year) becomes `0.05 / 12`.
pub fn monthly_rate(annual_rate_percent: Decimal) -> Decimal {
    annual_rate_percent / dec!(100) / dec!(12)
}

/// Computes the repayment schedule for a loan.
///
/// This is the main entry point of the library. The input is validated first;
/// non-positive values are rejected with [`AmortizationError::InvalidInput`].
pub fn compute(input: &LoanInput) -> Result<AmortizationResult, AmortizationError> {
    input.validate()?;

    let result = input
        .method
        .schedule(input.principal, input.monthly_rate(), input.term_months)?;

    debug!(
        method = %input.method,
        principal = %input.principal,
        annual_rate_percent = %input.annual_rate_percent,
        term_months = input.term_months,
        monthly_payment = %result.monthly_payment,
        total_interest = %result.total_interest,
        "Amortization schedule computed"
    );

    Ok(result)
}

/// Calculates an equal installment (annuity) schedule.
///
/// The payment is `P * [r(1 + r)^n] / [(1 + r)^n – 1]`. A zero monthly rate
/// falls back to `P / n`.
///
/// # Errors
///
/// Returns an error if `term_months` is zero, `principal` is not positive,
/// `monthly_rate` is negative, or the annuity factor overflows.
pub fn calculate_equal_installment(
    principal: Decimal,
    monthly_rate: Decimal,
    term_months: u32,
) -> Result<AmortizationResult, AmortizationError> {
    check_terms(principal, monthly_rate, term_months)?;

    let monthly_payment = annuity_payment(principal, monthly_rate, term_months)?;
    let total_payment = monthly_payment
        .checked_mul(Decimal::from(term_months))
        .ok_or(AmortizationError::Overflow {
            context: "total payment",
        })?;

    let schedule = build_schedule(principal, monthly_rate, term_months, |_, _, interest| {
        monthly_payment - interest
    })?;
    let total_interest = sum_interest(&schedule)?;

    Ok(AmortizationResult {
        method: RepaymentMethod::EqualInstallment,
        principal,
        monthly_payment,
        total_interest,
        total_payment,
        schedule,
    })
}

/// Calculates an equal principal schedule.
///
/// The principal portion is `P / n` every month; interest is charged on the
/// outstanding balance, so payments decrease over time.
pub fn calculate_equal_principal(
    principal: Decimal,
    monthly_rate: Decimal,
    term_months: u32,
) -> Result<AmortizationResult, AmortizationError> {
    check_terms(principal, monthly_rate, term_months)?;

    let monthly_principal = principal / Decimal::from(term_months);
    let schedule = build_schedule(principal, monthly_rate, term_months, |_, _, _| {
        monthly_principal
    })?;

    summarize(RepaymentMethod::EqualPrincipal, principal, schedule)
}

/// Calculates a bullet schedule: interest only, principal at maturity.
pub fn calculate_bullet(
    principal: Decimal,
    monthly_rate: Decimal,
    term_months: u32,
) -> Result<AmortizationResult, AmortizationError> {
    check_terms(principal, monthly_rate, term_months)?;

    let schedule = build_schedule(principal, monthly_rate, term_months, |month, balance, _| {
        if month == term_months {
            balance
        } else {
            dec!(0)
        }
    })?;

    summarize(RepaymentMethod::Bullet, principal, schedule)
}

fn check_terms(
    principal: Decimal,
    monthly_rate: Decimal,
    term_months: u32,
) -> Result<(), AmortizationError> {
    check_term(term_months)?;
    if principal <= dec!(0) {
        return Err(AmortizationError::invalid(
            "principal",
            format!("must be positive, got {principal}"),
        ));
    }
    if monthly_rate < dec!(0) {
        return Err(AmortizationError::invalid(
            "monthly_rate",
            format!("must not be negative, got {monthly_rate}"),
        ));
    }
    Ok(())
}

fn check_term(term_months: u32) -> Result<(), AmortizationError> {
    if term_months == 0 {
        return Err(AmortizationError::invalid(
            "term_months",
            "must be at least one month",
        ));
    }
    if term_months > MAX_TERM_MONTHS {
        return Err(AmortizationError::invalid(
            "term_months",
            format!("must not exceed {MAX_TERM_MONTHS} months, got {term_months}"),
        ));
    }
    Ok(())
}

fn annuity_payment(
    principal: Decimal,
    monthly_rate: Decimal,
    term_months: u32,
) -> Result<Decimal, AmortizationError> {
    let months = Decimal::from(term_months);
    if monthly_rate.is_zero() {
        return Ok(principal / months);
    }

    let overflow = AmortizationError::Overflow {
        context: "annuity payment",
    };
    let growth = (dec!(1) + monthly_rate)
        .checked_powu(u64::from(term_months))
        .ok_or(AmortizationError::Overflow {
            context: "annuity growth factor",
        })?;
    let denominator = growth - dec!(1);
    // Rates too small to register at decimal precision behave like zero.
    if denominator.is_zero() {
        return Ok(principal / months);
    }

    monthly_rate
        .checked_mul(growth)
        .and_then(|factor| principal.checked_mul(factor))
        .and_then(|numerator| numerator.checked_div(denominator))
        .ok_or(overflow)
}

/// Folds month by month over the running balance.
///
/// `principal_for(month, balance, interest)` returns the principal repaid in
/// `month`, given the balance at the start of the month and its interest.
fn build_schedule<F>(
    principal: Decimal,
    monthly_rate: Decimal,
    term_months: u32,
    principal_for: F,
) -> Result<Vec<PeriodEntry>, AmortizationError>
where
    F: Fn(u32, Decimal, Decimal) -> Decimal,
{
    let initial = (principal, Vec::with_capacity(term_months as usize));
    let (_, schedule) = (1..=term_months).try_fold(initial, |(balance, mut schedule), month| {
        let interest = balance
            .checked_mul(monthly_rate)
            .ok_or(AmortizationError::Overflow {
                context: "period interest",
            })?;
        let repaid = principal_for(month, balance, interest);
        let payment = repaid
            .checked_add(interest)
            .ok_or(AmortizationError::Overflow {
                context: "period payment",
            })?;
        let balance = balance
            .checked_sub(repaid)
            .ok_or(AmortizationError::Overflow {
                context: "remaining balance",
            })?;

        // The last payment clears whatever residual the division left.
        let remaining_balance = if month == term_months {
            dec!(0)
        } else {
            balance.max(dec!(0))
        };

        schedule.push(PeriodEntry {
            month,
            payment,
            principal: repaid,
            interest,
            remaining_balance,
        });
        Ok((balance, schedule))
    })?;
    Ok(schedule)
}

fn sum_interest(schedule: &[PeriodEntry]) -> Result<Decimal, AmortizationError> {
    schedule
        .iter()
        .try_fold(dec!(0), |total, entry| total.checked_add(entry.interest))
        .ok_or(AmortizationError::Overflow {
            context: "total interest",
        })
}

fn summarize(
    method: RepaymentMethod,
    principal: Decimal,
    schedule: Vec<PeriodEntry>,
) -> Result<AmortizationResult, AmortizationError> {
    let total_interest = sum_interest(&schedule)?;
    let total_payment = principal
        .checked_add(total_interest)
        .ok_or(AmortizationError::Overflow {
            context: "total payment",
        })?;
    let monthly_payment = schedule
        .first()
        .map(|entry| entry.payment)
        .unwrap_or_default();

    Ok(AmortizationResult {
        method,
        principal,
        monthly_payment,
        total_interest,
        total_payment,
        schedule,
    })
}
