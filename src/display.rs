//! Presentation helpers: integer currency formatting, the truncated schedule
//! view and its total row.
//!
//! Nothing here feeds back into the engine. Values are rounded only when they
//! are turned into strings.

use std::fmt;

use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::{AmortizationResult, PeriodEntry};

/// Periods shown verbatim at each end of a long schedule.
pub const EDGE_ROWS: usize = 12;

/// Placeholder for a missing value.
pub const EMPTY_CELL: &str = "-";

const ELIDED_MONTH: &str = "...";

/// Rounds to a whole currency unit and groups thousands with commas.
///
/// `8560748.1788` becomes `"8,560,748"`.
pub fn format_currency(amount: Decimal) -> String {
    let rounded = amount.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero);
    let digits = rounded.abs().trunc().to_string();

    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if rounded < dec!(0) {
        grouped.push('-');
    }
    for (index, digit) in digits.chars().enumerate() {
        if index > 0 && (digits.len() - index) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }
    grouped
}

/// A row of the displayed schedule.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ScheduleRow<'a> {
    Period(&'a PeriodEntry),
    /// Stands in for the hidden middle of a long schedule.
    Elided,
}

/// Selects the rows to display.
///
/// Up to `2 * EDGE_ROWS` periods are all shown. Longer schedules show the first
/// and last `EDGE_ROWS` periods with a single [`ScheduleRow::Elided`] between.
pub fn visible_rows(schedule: &[PeriodEntry]) -> Vec<ScheduleRow<'_>> {
    if schedule.len() <= 2 * EDGE_ROWS {
        return schedule.iter().map(ScheduleRow::Period).collect();
    }

    let head = schedule[..EDGE_ROWS].iter().map(ScheduleRow::Period);
    let tail = schedule[schedule.len() - EDGE_ROWS..]
        .iter()
        .map(ScheduleRow::Period);
    head.chain(std::iter::once(ScheduleRow::Elided))
        .chain(tail)
        .collect()
}

/// Column sums over the full schedule, hidden rows included.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ScheduleTotals {
    pub payment: Decimal,
    pub principal: Decimal,
    pub interest: Decimal,
}

impl ScheduleTotals {
    pub fn from_schedule(schedule: &[PeriodEntry]) -> Self {
        schedule
            .iter()
            .fold(ScheduleTotals::default(), |totals, entry| ScheduleTotals {
                payment: totals.payment + entry.payment,
                principal: totals.principal + entry.principal,
                interest: totals.interest + entry.interest,
            })
    }
}

/// The formatted summary fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Summary {
    pub monthly_payment: String,
    pub total_interest: String,
    pub total_payment: String,
    pub loan_amount: String,
}

impl Summary {
    /// The cleared state, shown when there is nothing to compute.
    pub fn empty() -> Self {
        Summary {
            monthly_payment: EMPTY_CELL.to_string(),
            total_interest: EMPTY_CELL.to_string(),
            total_payment: EMPTY_CELL.to_string(),
            loan_amount: EMPTY_CELL.to_string(),
        }
    }

    pub fn from_result(result: &AmortizationResult) -> Self {
        Summary {
            monthly_payment: format_currency(result.monthly_payment),
            total_interest: format_currency(result.total_interest),
            total_payment: format_currency(result.total_payment),
            loan_amount: format_currency(result.principal),
        }
    }
}

impl From<Option<&AmortizationResult>> for Summary {
    fn from(result: Option<&AmortizationResult>) -> Self {
        result.map_or_else(Summary::empty, Summary::from_result)
    }
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Monthly payment: {}", self.monthly_payment)?;
        writeln!(f, "Total interest:  {}", self.total_interest)?;
        writeln!(f, "Total payment:   {}", self.total_payment)?;
        write!(f, "Loan amount:     {}", self.loan_amount)
    }
}

/// Plain-text rendering of the visible schedule rows plus a total row.
pub struct ScheduleTable<'a> {
    rows: Vec<ScheduleRow<'a>>,
    totals: ScheduleTotals,
}

impl<'a> ScheduleTable<'a> {
    pub fn new(schedule: &'a [PeriodEntry]) -> Self {
        ScheduleTable {
            rows: visible_rows(schedule),
            totals: ScheduleTotals::from_schedule(schedule),
        }
    }

    pub fn rows(&self) -> &[ScheduleRow<'a>] {
        &self.rows
    }

    pub fn totals(&self) -> ScheduleTotals {
        self.totals
    }

    /// Formatted cells, one `[month, payment, principal, interest, balance]`
    /// array per visible row.
    pub fn cells(&self) -> Vec<[String; 5]> {
        self.rows
            .iter()
            .map(|row| match row {
                ScheduleRow::Period(entry) => [
                    entry.month.to_string(),
                    format_currency(entry.payment),
                    format_currency(entry.principal),
                    format_currency(entry.interest),
                    format_currency(entry.remaining_balance),
                ],
                ScheduleRow::Elided => [
                    ELIDED_MONTH.to_string(),
                    EMPTY_CELL.to_string(),
                    EMPTY_CELL.to_string(),
                    EMPTY_CELL.to_string(),
                    EMPTY_CELL.to_string(),
                ],
            })
            .collect()
    }

    pub fn total_cells(&self) -> [String; 5] {
        [
            "Total".to_string(),
            format_currency(self.totals.payment),
            format_currency(self.totals.principal),
            format_currency(self.totals.interest),
            EMPTY_CELL.to_string(),
        ]
    }
}

impl fmt::Display for ScheduleTable<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let header = ["Month", "Payment", "Principal", "Interest", "Balance"].map(String::from);
        let body = self.cells();
        let total = self.total_cells();

        let mut widths = [0usize; 5];
        for line in std::iter::once(&header).chain(&body).chain(std::iter::once(&total)) {
            for (width, cell) in widths.iter_mut().zip(line) {
                *width = (*width).max(cell.chars().count());
            }
        }

        let write_line = |f: &mut fmt::Formatter<'_>, line: &[String; 5]| -> fmt::Result {
            for (column, (cell, width)) in line.iter().zip(widths).enumerate() {
                if column > 0 {
                    f.write_str("  ")?;
                }
                write!(f, "{cell:>width$}")?;
            }
            writeln!(f)
        };

        write_line(f, &header)?;
        for line in &body {
            write_line(f, line)?;
        }
        write_line(f, &total)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{LoanInput, RepaymentMethod, compute};
    use rstest::rstest;

    fn result_for(months: u32, method: RepaymentMethod) -> AmortizationResult {
        compute(&LoanInput {
            principal: dec!(100_000_000),
            annual_rate_percent: dec!(5),
            term_months: months,
            method,
        })
        .unwrap()
    }

    #[rstest]
    #[case(dec!(0), "0")]
    #[case(dec!(999.4), "999")]
    #[case(dec!(999.5), "1,000")]
    #[case(dec!(8560748.1788), "8,560,748")]
    #[case(dec!(102728978.146), "102,728,978")]
    #[case(dec!(-1234567.5), "-1,234,568")]
    fn test_format_currency(#[case] amount: Decimal, #[case] expected: &str) {
        assert_eq!(format_currency(amount), expected);
    }

    #[rstest]
    #[case(1, 1)]
    #[case(12, 12)]
    #[case(20, 20)]
    #[case(24, 24)]
    fn test_short_schedules_are_not_truncated(#[case] months: u32, #[case] expected_rows: usize) {
        let result = result_for(months, RepaymentMethod::EqualPrincipal);
        let rows = visible_rows(&result.schedule);

        assert_eq!(rows.len(), expected_rows);
        assert!(!rows.contains(&ScheduleRow::Elided));
        for (row, entry) in rows.iter().zip(&result.schedule) {
            assert_eq!(*row, ScheduleRow::Period(entry));
        }
    }

    #[rstest]
    #[case(25)]
    #[case(360)]
    fn test_long_schedules_elide_the_middle(#[case] months: u32) {
        let result = result_for(months, RepaymentMethod::EqualInstallment);
        let rows = visible_rows(&result.schedule);

        assert_eq!(rows.len(), 2 * EDGE_ROWS + 1);
        assert_eq!(rows[EDGE_ROWS], ScheduleRow::Elided);
        assert_eq!(rows[0], ScheduleRow::Period(&result.schedule[0]));
        assert_eq!(rows[EDGE_ROWS - 1], ScheduleRow::Period(&result.schedule[11]));
        assert_eq!(
            rows[EDGE_ROWS + 1],
            ScheduleRow::Period(&result.schedule[months as usize - EDGE_ROWS])
        );
        assert_eq!(
            rows.last(),
            Some(&ScheduleRow::Period(result.schedule.last().unwrap()))
        );
    }

    #[rstest]
    #[case(RepaymentMethod::EqualInstallment)]
    #[case(RepaymentMethod::EqualPrincipal)]
    #[case(RepaymentMethod::Bullet)]
    fn test_total_row_matches_summary(#[case] method: RepaymentMethod) {
        let result = result_for(360, method);
        let table = ScheduleTable::new(&result.schedule);
        let summary = Summary::from_result(&result);
        let total = table.total_cells();

        assert_eq!(total[1], summary.total_payment);
        assert_eq!(total[2], summary.loan_amount);
        assert_eq!(total[3], summary.total_interest);
        assert_eq!(total[4], EMPTY_CELL);
    }

    #[test]
    fn test_totals_cover_hidden_rows() {
        let result = result_for(60, RepaymentMethod::EqualPrincipal);
        let table = ScheduleTable::new(&result.schedule);

        let visible_interest: Decimal = table
            .rows()
            .iter()
            .filter_map(|row| match row {
                ScheduleRow::Period(entry) => Some(entry.interest),
                ScheduleRow::Elided => None,
            })
            .sum();
        assert!(table.totals().interest > visible_interest);
        assert_eq!(table.totals().interest, result.total_interest);
    }

    #[test]
    fn test_elided_row_cells() {
        let result = result_for(36, RepaymentMethod::Bullet);
        let table = ScheduleTable::new(&result.schedule);
        let cells = table.cells();

        assert_eq!(cells[EDGE_ROWS][0], "...");
        assert!(cells[EDGE_ROWS][1..].iter().all(|cell| cell == EMPTY_CELL));
        assert_eq!(cells[EDGE_ROWS + 1][0], "25");
    }

    #[test]
    fn test_rendered_table() {
        let result = result_for(12, RepaymentMethod::EqualPrincipal);
        let rendered = ScheduleTable::new(&result.schedule).to_string();
        let lines: Vec<&str> = rendered.lines().collect();

        assert_eq!(lines.len(), 14);
        assert!(lines[0].trim_start().starts_with("Month"));
        assert!(lines[1].contains("8,333,333"));
        assert!(lines[13].trim_start().starts_with("Total"));
        assert!(lines[13].contains("100,000,000"));
    }

    #[test]
    fn test_empty_summary() {
        let summary = Summary::from(None::<&AmortizationResult>);
        assert_eq!(summary, Summary::empty());
        assert_eq!(summary.monthly_payment, "-");
        assert_eq!(summary.loan_amount, "-");
    }

    #[test]
    fn test_summary_from_result() {
        let result = result_for(12, RepaymentMethod::EqualInstallment);
        let summary = Summary::from(Some(&result));

        assert_eq!(summary.monthly_payment, "8,560,748");
        assert_eq!(summary.total_interest, "2,728,978");
        assert_eq!(summary.total_payment, "102,728,978");
        assert_eq!(summary.loan_amount, "100,000,000");
    }
}
