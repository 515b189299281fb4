use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use getset::{CopyGetters, Getters};
use rust_decimal::Decimal;

use crate::data::FormatError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TransactionKind {
    Income,
    Expense,
}

impl TransactionKind {
    /// Canonical record token.
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionKind::Income => "INCOME",
            TransactionKind::Expense => "EXPENSE",
        }
    }

    /// Label used in the summary report.
    pub fn label(&self) -> &'static str {
        match self {
            TransactionKind::Income => "Income",
            TransactionKind::Expense => "Expense",
        }
    }
}

impl fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransactionKind {
    type Err = FormatError;

    fn from_str(token: &str) -> Result<Self, Self::Err> {
        match token.to_uppercase().as_str() {
            "INCOME" => Ok(TransactionKind::Income),
            "EXPENSE" => Ok(TransactionKind::Expense),
            _ => Err(FormatError::UnknownKind(token.to_owned())),
        }
    }
}

/// A single ledger entry. The amount is kept as entered, its sign is not checked.
#[derive(Debug, Clone, PartialEq, Eq, Getters, CopyGetters)]
pub struct Transaction {
    #[getset(get_copy = "pub")]
    kind: TransactionKind,
    #[getset(get = "pub")]
    category: String,
    #[getset(get_copy = "pub")]
    amount: Decimal,
    #[getset(get_copy = "pub")]
    date: NaiveDate,
}

impl Transaction {
    pub fn new(kind: TransactionKind, category: impl Into<String>, amount: Decimal, date: NaiveDate) -> Transaction {
        Transaction {
            kind,
            category: category.into(),
            amount,
            date,
        }
    }

    pub fn income(category: impl Into<String>, amount: Decimal, date: NaiveDate) -> Transaction {
        Transaction::new(TransactionKind::Income, category, amount, date)
    }

    pub fn expense(category: impl Into<String>, amount: Decimal, date: NaiveDate) -> Transaction {
        Transaction::new(TransactionKind::Expense, category, amount, date)
    }
}
