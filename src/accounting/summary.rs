use std::collections::btree_map::{BTreeMap, Iter};
use std::fmt;

use chrono::{Datelike, NaiveDate};
use rust_decimal::{Decimal, RoundingStrategy};

use super::transactions::{Transaction, TransactionKind};
use super::LedgerError;

const REPORT_PRECISION: u32 = 2;
const RULE: &str = "-----------------------------------------------";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MonthKey {
    year: i32,
    month: u32,
}

impl MonthKey {
    pub fn new(year: i32, month: u32) -> MonthKey {
        MonthKey { year, month }
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }
}

impl From<NaiveDate> for MonthKey {
    fn from(date: NaiveDate) -> Self {
        MonthKey::new(date.year(), date.month())
    }
}

impl fmt::Display for MonthKey {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}-{:02}", self.year, self.month)
    }
}

/// Category totals of one month, split by kind.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct MonthTotals {
    kinds: BTreeMap<TransactionKind, BTreeMap<String, Decimal>>,
    totals: BTreeMap<TransactionKind, Decimal>,
    net_balance: Decimal,
}

impl MonthTotals {
    /// `None` when the category total leaves the `Decimal` range.
    fn accumulate(&mut self, transaction: &Transaction) -> Option<()> {
        let total = self
            .kinds
            .entry(transaction.kind())
            .or_default()
            .entry(transaction.category().clone())
            .or_insert(Decimal::ZERO);
        *total = total.checked_add(transaction.amount())?;

        Some(())
    }

    /// Derives the per-kind totals and the net balance once all entries are in.
    fn settle(&mut self) -> Option<()> {
        for (kind, categories) in &self.kinds {
            let total = categories
                .values()
                .try_fold(Decimal::ZERO, |sum, amount| sum.checked_add(*amount))?;
            self.totals.insert(*kind, total);
        }

        self.net_balance = self
            .total(TransactionKind::Income)
            .checked_sub(self.total(TransactionKind::Expense))?;

        Some(())
    }

    pub fn categories(&self, kind: TransactionKind) -> Option<&BTreeMap<String, Decimal>> {
        self.kinds.get(&kind)
    }

    /// Zero when the month has no entry of this kind.
    pub fn total(&self, kind: TransactionKind) -> Decimal {
        self.totals.get(&kind).copied().unwrap_or(Decimal::ZERO)
    }

    pub fn net_balance(&self) -> Decimal {
        self.net_balance
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SummaryRow<'a> {
    pub month: MonthKey,
    pub kind: TransactionKind,
    pub category: &'a str,
    pub total: Decimal,
}

/// Ledger totals grouped by month, kind and category. Months iterate in ascending order.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct MonthlySummary {
    months: BTreeMap<MonthKey, MonthTotals>,
}

impl MonthlySummary {
    pub fn month(&self, key: MonthKey) -> Option<&MonthTotals> {
        self.months.get(&key)
    }

    pub fn months(&self) -> Iter<MonthKey, MonthTotals> {
        self.months.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.months.is_empty()
    }

    pub fn rows(&self) -> impl Iterator<Item = SummaryRow<'_>> {
        self.months.iter().flat_map(|(month, totals)| {
            totals.kinds.iter().flat_map(move |(kind, categories)| {
                categories.iter().map(move |(category, total)| SummaryRow {
                    month: *month,
                    kind: *kind,
                    category: category.as_str(),
                    total: *total,
                })
            })
        })
    }
}

impl fmt::Display for MonthlySummary {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for (month, totals) in self.months() {
            write_month(f, month, totals)?;
        }

        Ok(())
    }
}

/// Fails with `LedgerError::Overflow` when a total of some month leaves the `Decimal` range.
pub fn compute_summary(transactions: &[Transaction]) -> Result<MonthlySummary, LedgerError> {
    let mut summary = MonthlySummary::default();

    for transaction in transactions {
        let month = MonthKey::from(transaction.date());
        summary
            .months
            .entry(month)
            .or_default()
            .accumulate(transaction)
            .ok_or(LedgerError::Overflow { month })?;
    }

    for (month, totals) in summary.months.iter_mut() {
        totals.settle().ok_or(LedgerError::Overflow { month: *month })?;
    }

    Ok(summary)
}

pub fn render_report(summary: &MonthlySummary) -> String {
    summary.to_string()
}

fn write_month(out: &mut fmt::Formatter, month: &MonthKey, totals: &MonthTotals) -> fmt::Result {
    writeln!(out, "Month: {}", month)?;
    writeln!(out, "{}", RULE)?;
    writeln!(out, "| {:<8} | {:<10} | {:<20} |", "Type", "Category", "Amount")?;
    writeln!(out, "{}", RULE)?;

    for kind in [TransactionKind::Income, TransactionKind::Expense] {
        if let Some(categories) = totals.categories(kind) {
            for (category, amount) in categories {
                writeln!(out, "| {:<8} | {:<10} | {:<20} |", kind.label(), category, money(*amount))?;
            }
            writeln!(out, "| {:<8} | {:<10} | {:<20} |", "", "Total", money(totals.total(kind)))?;
            writeln!(out, "{}", RULE)?;
        }
    }

    writeln!(out, "| {:<22} | {:<20} |", "Net Balance", money(totals.net_balance()))?;
    writeln!(out, "{}", RULE)?;
    writeln!(out)
}

fn money(amount: Decimal) -> String {
    let rounded = amount.round_dp_with_strategy(REPORT_PRECISION, RoundingStrategy::MidpointAwayFromZero);
    format!("{:.2}", rounded)
}
