use std::path::{Path, PathBuf};

use log::{debug, error, info, warn};

use super::summary::{compute_summary, MonthlySummary};
use super::transactions::Transaction;
use super::LedgerError;
use crate::data;

/// Ordered, append-only list of transactions. Every entry that reaches the ledger
/// is also appended to the master file.
pub struct Ledger {
    transactions: Vec<Transaction>,
    master_file: PathBuf,
}

impl Ledger {
    pub fn new(master_file: impl Into<PathBuf>) -> Ledger {
        Ledger {
            transactions: Vec::new(),
            master_file: master_file.into(),
        }
    }

    /// The transaction stays in memory even when the master file cannot be written.
    pub fn add(&mut self, transaction: Transaction) -> Result<(), LedgerError> {
        debug!("adding transaction, record={}", data::encode(&transaction));
        self.transactions.push(transaction);

        let start = self.transactions.len() - 1;
        self.append_to_master(start)
    }

    /// Appends every record of `path` in file order. The first malformed line stops the
    /// import; lines before it stay in memory but are not written to the master file.
    pub fn import_from(&mut self, path: impl AsRef<Path>) -> Result<usize, LedgerError> {
        let path = path.as_ref();
        let mut reader = data::open_records(path).map_err(|err| {
            error!("failed to open import file, path={}, err={}", path.display(), err);
            err
        })?;

        let start = self.transactions.len();
        for record in reader.records() {
            let record = record.map_err(std::io::Error::from)?;
            let line = record.position().map_or(0, |pos| pos.line());

            match data::decode_record(&record) {
                Ok(transaction) => self.transactions.push(transaction),
                Err(source) => {
                    error!("aborting import, path={}, line={}, err={}", path.display(), line, source);
                    return Err(LedgerError::Format { line, source });
                },
            }
        }

        let imported = self.transactions.len() - start;
        info!("imported transactions, path={}, count={}", path.display(), imported);

        self.append_to_master(start)?;

        Ok(imported)
    }

    /// Overwrites `path` with the whole ledger. The master file is left alone.
    pub fn export_to(&self, path: impl AsRef<Path>) -> Result<usize, LedgerError> {
        let path = path.as_ref();
        let written = data::write_records(path, &self.transactions).map_err(|err| {
            error!("failed to export, path={}, err={}", path.display(), err);
            err
        })?;

        info!("exported transactions, path={}, count={}", path.display(), written);

        Ok(written)
    }

    pub fn summary(&self) -> Result<MonthlySummary, LedgerError> {
        compute_summary(&self.transactions)
    }

    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    pub fn len(&self) -> usize {
        self.transactions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }

    pub fn master_file(&self) -> &Path {
        &self.master_file
    }

    fn append_to_master(&self, start: usize) -> Result<(), LedgerError> {
        if let Err(err) = data::append_records(&self.master_file, &self.transactions[start..]) {
            warn!(
                "failed to append to master file, path={}, err={}",
                self.master_file.display(),
                err
            );
            return Err(LedgerError::MasterFile(err));
        }

        Ok(())
    }
}
