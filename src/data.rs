use std::fs::{File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::Path;
use std::str::FromStr;

use chrono::NaiveDate;
use csv::StringRecord;
use log::debug;
use rust_decimal::Decimal;
use serde::Deserialize;
use thiserror::Error;

use crate::accounting::transactions::{Transaction, TransactionKind};

pub const DATE_FORMAT: &str = "%Y-%m-%d";
const FIELD_COUNT: usize = 4;

#[cfg(windows)]
const LINE_ENDING: &str = "\r\n";
#[cfg(not(windows))]
const LINE_ENDING: &str = "\n";

#[derive(Debug, PartialEq, Error)]
pub enum FormatError {
    #[error("expected 4 comma separated fields, found {found}")]
    FieldCount { found: usize },
    #[error("unknown transaction type '{0}'")]
    UnknownKind(String),
    #[error("invalid amount '{0}'")]
    InvalidAmount(String),
    #[error("invalid date '{0}', expected yyyy-MM-dd")]
    InvalidDate(String),
    #[error("expected a single record line")]
    MultipleRecords,
}

/// Raw fields of one record line, in file order.
#[derive(Debug, Deserialize)]
struct TransactionRecord<'a> {
    kind: &'a str,
    category: &'a str,
    amount: &'a str,
    date: &'a str,
}

impl TryFrom<TransactionRecord<'_>> for Transaction {
    type Error = FormatError;

    fn try_from(record: TransactionRecord<'_>) -> Result<Self, Self::Error> {
        let kind = record.kind.parse::<TransactionKind>()?;
        let amount = parse_amount(record.amount)?;
        let date = parse_date(record.date)?;

        Ok(Transaction::new(kind, record.category, amount, date))
    }
}

pub fn parse_amount(text: &str) -> Result<Decimal, FormatError> {
    let trimmed = text.trim();
    if trimmed.contains('_') {
        return Err(FormatError::InvalidAmount(text.to_owned()));
    }

    Decimal::from_str(trimmed)
        .or_else(|_| Decimal::from_scientific(trimmed))
        .map_err(|_| FormatError::InvalidAmount(text.to_owned()))
}

/// Only the exact `yyyy-MM-dd` shape is accepted: no sign, padding or short fields.
pub fn parse_date(text: &str) -> Result<NaiveDate, FormatError> {
    if !is_iso_date(text) {
        return Err(FormatError::InvalidDate(text.to_owned()));
    }

    NaiveDate::parse_from_str(text, DATE_FORMAT).map_err(|_| FormatError::InvalidDate(text.to_owned()))
}

fn is_iso_date(text: &str) -> bool {
    let bytes = text.as_bytes();
    bytes.len() == 10
        && bytes.iter().enumerate().all(|(index, byte)| match index {
            4 | 7 => *byte == b'-',
            _ => byte.is_ascii_digit(),
        })
}

/// Renders `KIND,category,amount,yyyy-MM-dd`. Commas inside the category are written as is,
/// such a record will not decode again.
pub fn encode(transaction: &Transaction) -> String {
    format!(
        "{},{},{},{}",
        transaction.kind(),
        transaction.category(),
        transaction.amount(),
        transaction.date().format(DATE_FORMAT)
    )
}

pub fn decode(line: &str) -> Result<Transaction, FormatError> {
    let mut reader = reader_builder().from_reader(line.as_bytes());
    let mut records = reader.records();
    let record = match records.next() {
        Some(Ok(record)) => record,
        Some(Err(_)) | None => StringRecord::new(),
    };

    if records.next().is_some() {
        return Err(FormatError::MultipleRecords);
    }

    decode_record(&record)
}

pub fn decode_record(record: &StringRecord) -> Result<Transaction, FormatError> {
    if record.len() != FIELD_COUNT {
        return Err(FormatError::FieldCount { found: record.len() });
    }

    let raw: TransactionRecord = record
        .deserialize(None)
        .map_err(|_| FormatError::FieldCount { found: record.len() })?;

    raw.try_into()
}

/// Record reader over a file. Blank lines yield no record.
pub fn open_records(path: &Path) -> io::Result<csv::Reader<File>> {
    let file = File::open(path)?;
    Ok(reader_builder().from_reader(file))
}

/// Appends one line per transaction, creating the file when missing.
pub fn append_records<'a>(path: &Path, transactions: impl IntoIterator<Item = &'a Transaction>) -> io::Result<usize> {
    let file = OpenOptions::new().create(true).append(true).open(path)?;
    write_lines(file, transactions)
}

/// Replaces the content of the file with one line per transaction.
pub fn write_records<'a>(path: &Path, transactions: impl IntoIterator<Item = &'a Transaction>) -> io::Result<usize> {
    let file = File::create(path)?;
    write_lines(file, transactions)
}

fn write_lines<'a, W: Write>(target: W, transactions: impl IntoIterator<Item = &'a Transaction>) -> io::Result<usize> {
    let mut writer = BufWriter::new(target);
    let mut written = 0;

    for transaction in transactions {
        let line = encode(transaction);
        debug!("writing record, line={}", line);
        writer.write_all(line.as_bytes())?;
        writer.write_all(LINE_ENDING.as_bytes())?;
        written += 1;
    }

    writer.flush()?;

    Ok(written)
}

// No quoting or escaping: a comma always separates fields.
fn reader_builder() -> csv::ReaderBuilder {
    let mut builder = csv::ReaderBuilder::new();
    builder.has_headers(false).quoting(false).flexible(true);
    builder
}
