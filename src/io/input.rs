// src/io/input.rs - Reading the name column out of a CSV file

use anyhow::{anyhow, Context, Result};
use csv::{ReaderBuilder, StringRecord};
use log::{debug, info};
use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::models::record::InputRow;

/// Cell values treated as a missing name.
const NULL_MARKERS: [&str; 8] = ["", "NaN", "nan", "NA", "N/A", "NULL", "null", "None"];

/// The chosen column and its rows numbered in file order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameColumn {
    pub column: String,
    pub rows: Vec<InputRow>,
}

pub fn read_names(path: &Path, column: Option<&str>) -> Result<NameColumn> {
    let file = File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
    let names = read_names_from_reader(file, column)
        .with_context(|| format!("Failed to read names from {}", path.display()))?;
    info!(
        "📄 Loaded {} rows from column '{}' of {}",
        names.rows.len(),
        names.column,
        path.display()
    );
    Ok(names)
}

/// Read a headed CSV and pick the name column, either by header or as the
/// first column holding any non-empty, non-numeric value.
pub fn read_names_from_reader<R: Read>(reader: R, column: Option<&str>) -> Result<NameColumn> {
    let mut rdr = ReaderBuilder::new().flexible(true).from_reader(reader);
    let headers = rdr.headers().context("Failed to read CSV header")?.clone();
    let records: Vec<StringRecord> = rdr
        .records()
        .collect::<Result<_, _>>()
        .context("Failed to parse CSV row")?;

    let index = match column {
        Some(name) => headers
            .iter()
            .position(|h| h.trim() == name.trim())
            .ok_or_else(|| anyhow!("Column '{}' not found (available: {:?})", name, headers))?,
        None => detect_name_column(&headers, &records)?,
    };
    let column_name = headers.get(index).unwrap_or_default().trim().to_string();
    debug!("Using column {} ('{}') for names", index, column_name);

    let rows = records
        .iter()
        .enumerate()
        .map(|(row_order, record)| InputRow::new(row_order, record.get(index).and_then(cell_value)))
        .collect();

    Ok(NameColumn {
        column: column_name,
        rows,
    })
}

fn detect_name_column(headers: &StringRecord, records: &[StringRecord]) -> Result<usize> {
    (0..headers.len())
        .find(|&idx| {
            records
                .iter()
                .filter_map(|record| record.get(idx).and_then(cell_value))
                .any(|value| value.parse::<f64>().is_err())
        })
        .ok_or_else(|| anyhow!("No text column found; pass the name column explicitly"))
}

fn cell_value(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if NULL_MARKERS.contains(&trimmed) {
        None
    } else {
        Some(raw.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_detects_first_text_column() {
        let data = "id,score,company,city\n1,0.5,IBM India,Pune\n2,0.7,,Delhi\n3,NaN,TCS,\n";
        let names = read_names_from_reader(data.as_bytes(), None).unwrap();
        assert_eq!(names.column, "company");
        assert_eq!(
            names.rows,
            vec![
                InputRow::new(0, Some("IBM India".into())),
                InputRow::new(1, None),
                InputRow::new(2, Some("TCS".into())),
            ]
        );
    }

    #[test]
    fn test_named_column_and_null_markers() {
        let data = "company,vendor\nIBM,N/A\nTCS,Infosys Ltd\nHDFC,null\n";
        let names = read_names_from_reader(data.as_bytes(), Some("vendor")).unwrap();
        assert_eq!(names.column, "vendor");
        let values: Vec<Option<&str>> = names.rows.iter().map(|r| r.name.as_deref()).collect();
        assert_eq!(values, vec![None, Some("Infosys Ltd"), None]);
    }

    #[test]
    fn test_missing_or_undetectable_column() {
        let data = "company\nIBM\n";
        assert!(read_names_from_reader(data.as_bytes(), Some("vendor")).is_err());

        let numeric = "a,b\n1,2\n3,4.5\n";
        assert!(read_names_from_reader(numeric.as_bytes(), None).is_err());
    }

    #[test]
    fn test_short_rows_yield_missing_names() {
        let data = "id,company\n1,Acme\n2\n";
        let names = read_names_from_reader(data.as_bytes(), Some("company")).unwrap();
        assert_eq!(names.rows[1], InputRow::new(1, None));
    }

    #[test]
    fn test_read_names_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "Company Name").unwrap();
        writeln!(file, "\"Tata Consultancy Services, Limited\"").unwrap();
        writeln!(file, "Google").unwrap();
        let names = read_names(file.path(), None).unwrap();
        assert_eq!(names.column, "Company Name");
        assert_eq!(names.rows.len(), 2);
        assert_eq!(
            names.rows[0].name.as_deref(),
            Some("Tata Consultancy Services, Limited")
        );
    }
}
