//! Bulk lead import from a spreadsheet.
//!
//! The first worksheet is read; its first row is a header. Columns 0
//! to 4 are contact number, first name, city, model name and lead
//! source. Imported leads are not written to the modification log.

use std::io::Cursor;

use calamine::{Data, Reader, open_workbook_auto_from_rs};
use chrono::Utc;
use leadflow_core::models::lead::{CreateLead, NewLead};
use leadflow_core::repository::LeadRepository;
use serde::Serialize;
use tracing::{info, warn};

/// A spreadsheet cell reduced to the kinds the importer understands.
#[derive(Debug, Clone, PartialEq)]
pub enum SheetCell {
    Text(String),
    Number(f64),
    Bool(bool),
    /// A formula, carrying its cached result.
    Formula(Box<SheetCell>),
    Empty,
}

impl From<&Data> for SheetCell {
    fn from(cell: &Data) -> Self {
        match cell {
            Data::String(s) | Data::DateTimeIso(s) | Data::DurationIso(s) => {
                SheetCell::Text(s.clone())
            }
            Data::Float(f) => SheetCell::Number(*f),
            Data::Int(i) => SheetCell::Number(*i as f64),
            Data::Bool(b) => SheetCell::Bool(*b),
            Data::DateTime(dt) => SheetCell::Number(dt.as_f64()),
            Data::Error(_) | Data::Empty => SheetCell::Empty,
        }
    }
}

impl SheetCell {
    /// Render the cell as text: trimmed strings, integral numbers
    /// without a decimal point, booleans as `true`/`false`, formulas
    /// through their cached value.
    pub fn coerce(&self) -> String {
        match self {
            SheetCell::Text(s) => s.trim().to_string(),
            SheetCell::Number(n) if n.is_finite() && n.fract() == 0.0 && n.abs() < 9.0e15 => {
                format!("{}", *n as i64)
            }
            SheetCell::Number(n) => n.to_string(),
            SheetCell::Bool(b) => b.to_string(),
            SheetCell::Formula(cached) => cached.coerce(),
            SheetCell::Empty => String::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ImportReport {
    pub success: bool,
    pub message: String,
    pub total_records: u64,
    pub successful_records: u64,
    pub failed_records: u64,
}

impl ImportReport {
    fn unreadable(reason: impl std::fmt::Display) -> Self {
        Self {
            success: false,
            message: format!("File processing failed: {reason}"),
            total_records: 0,
            successful_records: 0,
            failed_records: 0,
        }
    }
}

fn column(row: &[SheetCell], index: usize) -> String {
    row.get(index).map(SheetCell::coerce).unwrap_or_default()
}

fn optional(value: String) -> Option<String> {
    if value.is_empty() { None } else { Some(value) }
}

/// Cells of the first worksheet, row by row.
fn read_first_sheet(bytes: Vec<u8>) -> Result<Vec<Vec<SheetCell>>, String> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes)).map_err(|e| e.to_string())?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| "workbook has no worksheets".to_string())?
        .map_err(|e| e.to_string())?;

    Ok(range
        .rows()
        .map(|row| row.iter().map(SheetCell::from).collect())
        .collect())
}

pub struct LeadImporter<L: LeadRepository> {
    leads: L,
}

impl<L: LeadRepository> LeadImporter<L> {
    pub fn new(leads: L) -> Self {
        Self { leads }
    }

    /// Import a workbook (xlsx, xls, xlsb or ods). A file that cannot
    /// be read yields a failed report with every counter at zero.
    pub async fn import_bytes(&self, bytes: Vec<u8>) -> ImportReport {
        match read_first_sheet(bytes) {
            Ok(rows) => self.import_rows(rows).await,
            Err(reason) => {
                warn!(%reason, "Rejected unreadable upload");
                ImportReport::unreadable(reason)
            }
        }
    }

    /// Import already-parsed rows; the first row is the header.
    ///
    /// A row fails when its contact number or first name is blank or
    /// when the store rejects it; failures never stop the batch. Only
    /// rows without a single cell are ignored, so a row of blank cells
    /// counts as a failure.
    pub async fn import_rows<I>(&self, rows: I) -> ImportReport
    where
        I: IntoIterator<Item = Vec<SheetCell>>,
    {
        let mut total = 0u64;
        let mut succeeded = 0u64;

        for (index, row) in rows.into_iter().enumerate().skip(1) {
            if row.is_empty() {
                continue;
            }
            total += 1;

            let input = CreateLead {
                contact_number: column(&row, 0),
                first_name: column(&row, 1),
                city: optional(column(&row, 2)),
                model_name: optional(column(&row, 3)),
                lead_source: optional(column(&row, 4)),
                ..CreateLead::default()
            };

            let stored = match NewLead::from_input(input, Utc::now()) {
                Ok(new) => self.leads.create(new).await.map(|_| ()),
                Err(e) => Err(e),
            };
            match stored {
                Ok(()) => succeeded += 1,
                Err(e) => warn!(row = index + 1, error = %e, "Skipped import row"),
            }
        }

        let failed = total - succeeded;
        info!(total, succeeded, failed, "Lead import finished");

        ImportReport {
            success: failed == 0,
            message: format!("File uploaded successfully. {total} records processed."),
            total_records: total,
            successful_records: succeeded,
            failed_records: failed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integral_numbers_have_no_decimal_point() {
        assert_eq!(SheetCell::Number(9876543210.0).coerce(), "9876543210");
        assert_eq!(SheetCell::Number(-4.0).coerce(), "-4");
    }

    #[test]
    fn fractional_numbers_keep_their_value() {
        assert_eq!(SheetCell::Number(12.5).coerce(), "12.5");
    }

    #[test]
    fn text_is_trimmed_and_booleans_are_literal() {
        assert_eq!(SheetCell::Text("  Pune ".into()).coerce(), "Pune");
        assert_eq!(SheetCell::Bool(true).coerce(), "true");
        assert_eq!(SheetCell::Bool(false).coerce(), "false");
        assert_eq!(SheetCell::Empty.coerce(), "");
    }

    #[test]
    fn formulas_use_their_cached_result() {
        let cell = SheetCell::Formula(Box::new(SheetCell::Number(42.0)));
        assert_eq!(cell.coerce(), "42");
    }

    #[test]
    fn calamine_cells_convert() {
        assert_eq!(SheetCell::from(&Data::Int(7)), SheetCell::Number(7.0));
        assert_eq!(
            SheetCell::from(&Data::String("x".into())),
            SheetCell::Text("x".into())
        );
        assert_eq!(SheetCell::from(&Data::Empty), SheetCell::Empty);
    }
}
