use std::io;

use thiserror::Error;

use crate::data::FormatError;
use summary::MonthKey;

pub mod ledger;
pub mod summary;
pub mod transactions;


#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("{0}")]
    Io(#[from] io::Error),
    #[error("line {line}: {source}")]
    Format { line: u64, source: FormatError },
    /// The in-memory ledger was updated, the master file was not.
    #[error("failed to write master file: {0}")]
    MasterFile(#[source] io::Error),
    #[error("totals for {month} exceed the supported amount range")]
    Overflow { month: MonthKey },
}
