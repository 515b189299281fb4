use std::io::{BufRead, Write};
use std::path::Path;

use anyhow::Result;
use log::debug;

use crate::accounting::ledger::Ledger;
use crate::accounting::summary::render_report;
use crate::accounting::transactions::{Transaction, TransactionKind};
use crate::accounting::LedgerError;
use crate::data;

/// Menu driven session over a ledger. Failed operations are reported and the menu resumes.
pub struct Session<R, W> {
    ledger: Ledger,
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> Session<R, W> {
    pub fn new(ledger: Ledger, input: R, output: W) -> Session<R, W> {
        Session { ledger, input, output }
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    pub fn into_ledger(self) -> Ledger {
        self.ledger
    }

    /// Runs until the user exits or the input ends.
    pub fn run(&mut self, import_file: Option<&Path>) -> Result<()> {
        writeln!(self.output, "=== POCKET LEDGER ===")?;

        match import_file {
            Some(path) => self.import(path)?,
            None => {
                let answer = self.prompt("Do you want to import transactions from a file? (yes/no): ")?;
                if answer.is_some_and(|answer| answer.trim().eq_ignore_ascii_case("yes")) {
                    if let Some(path) = self.prompt("Enter full file path: ")? {
                        self.import(Path::new(path.trim()))?;
                    }
                }
            },
        }

        loop {
            writeln!(self.output)?;
            writeln!(self.output, "1. Add Income")?;
            writeln!(self.output, "2. Add Expense")?;
            writeln!(self.output, "3. View Monthly Summary")?;
            writeln!(self.output, "4. Export to File")?;
            writeln!(self.output, "5. Exit")?;

            let Some(option) = self.prompt("Choose an option: ")? else {
                break;
            };

            match option.trim() {
                "1" => self.add_transaction(TransactionKind::Income)?,
                "2" => self.add_transaction(TransactionKind::Expense)?,
                "3" => self.view_summary()?,
                "4" => {
                    if let Some(path) = self.prompt("Enter full file path to export: ")? {
                        self.export(Path::new(path.trim()))?;
                    }
                },
                "5" => break,
                _ => writeln!(self.output, "Invalid option. Try again.")?,
            }
        }

        writeln!(self.output, "Goodbye!")?;

        Ok(())
    }

    fn add_transaction(&mut self, kind: TransactionKind) -> Result<()> {
        let hint = match kind {
            TransactionKind::Income => "Salary, Business",
            TransactionKind::Expense => "Food, Rent, Travel",
        };

        let Some(category) = self.prompt(&format!("Enter sub-category ({}): ", hint))? else {
            return Ok(());
        };
        if category.contains(',') {
            writeln!(self.output, "Category cannot contain a comma.")?;
            return Ok(());
        }

        let Some(amount) = self.prompt("Enter amount: ")? else {
            return Ok(());
        };
        let amount = match data::parse_amount(&amount) {
            Ok(amount) => amount,
            Err(err) => {
                writeln!(self.output, "Error: {}", err)?;
                return Ok(());
            },
        };

        let Some(date) = self.prompt("Enter date in format yyyy-MM-dd (e.g., 2025-05-21): ")? else {
            return Ok(());
        };
        let date = match data::parse_date(date.trim()) {
            Ok(date) => date,
            Err(err) => {
                writeln!(self.output, "Error: {}", err)?;
                return Ok(());
            },
        };

        match self.ledger.add(Transaction::new(kind, category, amount, date)) {
            Ok(()) => writeln!(self.output, "Transaction added successfully.")?,
            Err(err) => writeln!(self.output, "Transaction added, but it was not saved: {}", err)?,
        }

        Ok(())
    }

    fn view_summary(&mut self) -> Result<()> {
        if self.ledger.is_empty() {
            writeln!(self.output, "No transactions recorded.")?;
            return Ok(());
        }

        match self.ledger.summary() {
            Ok(summary) => write!(self.output, "{}", render_report(&summary))?,
            Err(err) => writeln!(self.output, "Error: {}", err)?,
        }

        Ok(())
    }

    fn import(&mut self, path: &Path) -> Result<()> {
        match self.ledger.import_from(path) {
            Ok(count) => writeln!(
                self.output,
                "Imported {} transactions and saved them to the master file.",
                count
            )?,
            Err(err @ LedgerError::MasterFile(_)) => {
                writeln!(self.output, "Transactions imported, but not saved: {}", err)?
            },
            Err(err) => writeln!(self.output, "Error importing {}: {}", path.display(), err)?,
        }

        Ok(())
    }

    fn export(&mut self, path: &Path) -> Result<()> {
        match self.ledger.export_to(path) {
            Ok(count) => writeln!(self.output, "Exported {} transactions to: {}", count, path.display())?,
            Err(err) => writeln!(self.output, "Error saving {}: {}", path.display(), err)?,
        }

        Ok(())
    }

    /// `None` once the input is exhausted.
    fn prompt(&mut self, text: &str) -> Result<Option<String>> {
        write!(self.output, "{}", text)?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            debug!("input closed");
            return Ok(None);
        }

        Ok(Some(line.trim_end_matches(&['\r', '\n'][..]).to_owned()))
    }
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::io::Cursor;

    use anyhow::Result;
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    fn run_session(ledger: Ledger, input: &str, import_file: Option<&Path>) -> Result<(Ledger, String)> {
        let mut output = Vec::new();
        let mut session = Session::new(ledger, Cursor::new(input.as_bytes()), &mut output);
        session.run(import_file)?;
        let ledger = session.into_ledger();

        Ok((ledger, String::from_utf8(output)?))
    }

    #[test]
    fn test_add_and_view_summary() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let ledger = Ledger::new(dir.path().join("transactions.txt"));
        let input = "no\n1\nSalary\n1000.0\n2025-05-01\n2\nRent\n500\n2025-05-03\n3\n5\n";

        let (ledger, output) = run_session(ledger, input, None)?;

        assert_eq!(ledger.len(), 2);
        assert_eq!(ledger.transactions()[1].kind(), TransactionKind::Expense);
        assert_eq!(ledger.transactions()[1].amount(), dec!(500));
        assert!(output.contains("Transaction added successfully."));
        assert!(output.contains("| Net Balance            | 500.00               |"), "{}", output);
        assert_eq!(fs::read_to_string(ledger.master_file())?.lines().count(), 2);

        Ok(())
    }

    #[test]
    fn test_invalid_input_keeps_session_running() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let ledger = Ledger::new(dir.path().join("transactions.txt"));
        let input = "no\n9\n2\nFood\nabc\n2\nFood, drinks\n2\nFood\n12\n21/05/2025\n3\n";

        let (ledger, output) = run_session(ledger, input, None)?;

        assert_eq!(ledger.is_empty(), true);
        assert!(output.contains("Invalid option. Try again."));
        assert!(output.contains("Error: invalid amount 'abc'"));
        assert!(output.contains("Category cannot contain a comma."));
        assert!(output.contains("Error: invalid date '21/05/2025', expected yyyy-MM-dd"));
        assert!(output.contains("No transactions recorded."));
        assert!(output.ends_with("Goodbye!\n"));

        Ok(())
    }

    #[test]
    fn test_import_prompt_and_export() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let input_path = dir.path().join("input.txt");
        let export_path = dir.path().join("export.txt");
        fs::write(&input_path, "INCOME,Salary,1000.0,2025-05-01\nEXPENSE,Food,50.5,2025-06-01\n")?;

        let ledger = Ledger::new(dir.path().join("transactions.txt"));
        let input = format!("YES\n{}\n4\n{}\n5\n", input_path.display(), export_path.display());

        let (ledger, output) = run_session(ledger, &input, None)?;

        assert_eq!(ledger.len(), 2);
        assert!(output.contains("Imported 2 transactions"));
        assert_eq!(fs::read_to_string(&export_path)?, fs::read_to_string(&input_path)?);

        Ok(())
    }

    #[test]
    fn test_configured_import_reports_errors() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let input_path = dir.path().join("input.txt");
        fs::write(&input_path, "BOGUS,Food,10,2025-01-01\n")?;

        let ledger = Ledger::new(dir.path().join("transactions.txt"));
        let (ledger, output) = run_session(ledger, "5\n", Some(&input_path))?;

        assert_eq!(ledger.is_empty(), true);
        assert!(output.contains("line 1: unknown transaction type 'BOGUS'"), "{}", output);
        assert!(!output.contains("Do you want to import"));

        Ok(())
    }

    #[test]
    fn test_summary_overflow_is_reported() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let input_path = dir.path().join("input.txt");
        fs::write(
            &input_path,
            "INCOME,Salary,50000000000000000000000000000,2025-01-01\nINCOME,Salary,50000000000000000000000000000,2025-01-02\n",
        )?;

        let ledger = Ledger::new(dir.path().join("transactions.txt"));
        let (ledger, output) = run_session(ledger, "3\n5\n", Some(&input_path))?;

        assert_eq!(ledger.len(), 2);
        assert!(
            output.contains("Error: totals for 2025-01 exceed the supported amount range"),
            "{}",
            output
        );
        assert!(output.ends_with("Goodbye!\n"));

        Ok(())
    }
}
