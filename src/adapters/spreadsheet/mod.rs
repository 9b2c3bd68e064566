// Spreadsheet adapter - Landscape model tables from Excel workbooks or CSV

use std::path::Path;

use async_trait::async_trait;
use calamine::{open_workbook_auto, Data, Range, Reader};
use tracing::{debug, info};

use crate::domain::errors::*;
use crate::domain::model::*;
use crate::ports::*;

/// Reads the CASiMiR landscape table (`.xlsx`, `.xls`, `.ods` or `.csv`)
#[derive(Debug, Default)]
pub struct SpreadsheetAdapter;

impl SpreadsheetAdapter {
    /// Create new spreadsheet adapter
    pub fn new() -> Result<Self, DomainError> {
        Ok(Self)
    }

    /// Read header row and data rows from a workbook sheet
    fn read_workbook(
        path: &Path,
        sheet: Option<&str>,
    ) -> Result<(Vec<String>, Vec<Vec<CellValue>>), DomainError> {
        let mut workbook = open_workbook_auto(path).map_err(|e| {
            DomainError::Landscape(format!("Failed to open workbook {}: {}", path.display(), e))
        })?;

        let range: Range<Data> = match sheet {
            Some(name) => workbook.worksheet_range(name).map_err(|e| {
                DomainError::Landscape(format!("Failed to read sheet '{}': {}", name, e))
            })?,
            None => workbook
                .worksheet_range_at(0)
                .ok_or_else(|| DomainError::Landscape("workbook has no sheets".to_string()))?
                .map_err(|e| DomainError::Landscape(format!("Failed to read first sheet: {}", e)))?,
        };

        let mut rows = range.rows();
        let headers = rows
            .next()
            .ok_or_else(|| DomainError::Landscape("sheet is empty".to_string()))?
            .iter()
            .map(|cell| match cell_value(cell) {
                CellValue::Empty => String::new(),
                other => other.to_string(),
            })
            .collect();
        let data = rows
            .map(|row| row.iter().map(cell_value).collect())
            .collect();

        Ok((headers, data))
    }

    /// Read header row and data rows from a CSV file
    fn read_csv(path: &Path) -> Result<(Vec<String>, Vec<Vec<CellValue>>), DomainError> {
        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .trim(csv::Trim::All)
            .from_path(path)
            .map_err(|e| {
                DomainError::Landscape(format!("Failed to open {}: {}", path.display(), e))
            })?;

        let headers = reader
            .headers()
            .map_err(|e| DomainError::Landscape(format!("Failed to read CSV header: {}", e)))?
            .iter()
            .map(str::to_string)
            .collect();

        let mut data = Vec::new();
        for record in reader.records() {
            let record = record
                .map_err(|e| DomainError::Landscape(format!("Failed to read CSV row: {}", e)))?;
            data.push(record.iter().map(text_value).collect());
        }

        Ok((headers, data))
    }
}

fn cell_value(cell: &Data) -> CellValue {
    match cell {
        Data::Int(v) => CellValue::Number(*v as f64),
        Data::Float(v) => CellValue::Number(*v),
        Data::Bool(b) => CellValue::Number(if *b { 1.0 } else { 0.0 }),
        Data::String(s) => text_value(s),
        Data::Empty => CellValue::Empty,
        other => CellValue::Text(other.to_string()),
    }
}

fn text_value(text: &str) -> CellValue {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        CellValue::Empty
    } else {
        match trimmed.parse::<f64>() {
            Ok(v) => CellValue::Number(v),
            Err(_) => CellValue::Text(trimmed.to_string()),
        }
    }
}

#[async_trait]
impl LandscapePort for SpreadsheetAdapter {
    async fn read_landscape(
        &self,
        path: &Path,
        sheet: Option<&str>,
    ) -> Result<LandscapeTable, DomainError> {
        if !tokio::fs::try_exists(path).await.unwrap_or(false) {
            return Err(DomainError::FileNotFound(path.display().to_string()));
        }

        let is_csv = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.eq_ignore_ascii_case("csv"))
            .unwrap_or(false);
        let owned_path = path.to_path_buf();
        let sheet = sheet.map(str::to_string);

        let table = tokio::task::spawn_blocking(move || {
            let (headers, rows) = if is_csv {
                Self::read_csv(&owned_path)?
            } else {
                Self::read_workbook(&owned_path, sheet.as_deref())?
            };
            debug!(columns = ?headers, rows = rows.len(), "landscape sheet read");
            LandscapeTable::from_records(&headers, &rows)
        })
        .await
        .map_err(|e| DomainError::Internal(format!("landscape reader task failed: {}", e)))??;

        info!(
            path = %path.display(),
            codes = table.len(),
            manning_n = table.has_manning_n(),
            "landscape table loaded"
        );
        Ok(table)
    }
}
