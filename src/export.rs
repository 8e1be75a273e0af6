// CSV serialization of the on-screen report table.
//
// The export reproduces the report exactly as rendered: it receives the
// already filtered, searched and sorted rows and writes them in the fixed
// column order of the active tab. Values are raw except the percentage
// column, which is rendered with one decimal.
use crate::types::{CollectionRecord, SalesRecord};
use csv::{QuoteStyle, WriterBuilder};
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("csv serialization failed: {0}")]
    Csv(#[from] csv::Error),
    #[error("csv buffer was not valid utf-8")]
    Encoding,
    #[error("failed to write {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: io::Error,
    },
}

/// The report tab being exported; fixes headers, column order and filename.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportTab {
    Sales,
    Collection,
}

impl ReportTab {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReportTab::Sales => "sales",
            ReportTab::Collection => "collection",
        }
    }

    pub fn headers(&self) -> &'static [&'static str] {
        match self {
            ReportTab::Sales => &[
                "Region",
                "Division",
                "Target",
                "Gross Sales",
                "Return",
                "Net Sales",
                "Achievement %",
            ],
            ReportTab::Collection => &[
                "Region",
                "Target",
                "Total Collection",
                "Achievement %",
                "Cash",
                "Credit",
                "Seed",
            ],
        }
    }
}

/// A rendered export: the suggested filename and the text/csv content.
/// Writing it anywhere is a separate boundary concern (`save_export`).
#[derive(Debug, Clone, PartialEq)]
pub struct CsvExport {
    pub filename: String,
    pub content: String,
}

/// Serialize the sales tab. Returns `None` for an empty row set: exporting
/// nothing is a no-op, not an error.
pub fn export_sales_csv(
    rows: &[SalesRecord],
    month: u32,
    year: i32,
) -> Result<Option<CsvExport>, ExportError> {
    if rows.is_empty() {
        return Ok(None);
    }
    let records = rows.iter().map(|r| {
        vec![
            r.area_name.clone(),
            r.division.clone(),
            raw_number(r.sales_target),
            raw_number(r.gross_sales),
            raw_number(r.sales_return),
            raw_number(r.net_sales),
            format!("{:.1}", r.sales_ach_pct),
        ]
    });
    let content = write_rows(ReportTab::Sales.headers(), records)?;
    Ok(Some(CsvExport {
        filename: export_filename(ReportTab::Sales, month, year),
        content,
    }))
}

/// Serialize the collection tab; same contract as the sales export.
pub fn export_collection_csv(
    rows: &[CollectionRecord],
    month: u32,
    year: i32,
) -> Result<Option<CsvExport>, ExportError> {
    if rows.is_empty() {
        return Ok(None);
    }
    let records = rows.iter().map(|r| {
        vec![
            r.area_name.clone(),
            raw_number(r.coll_target),
            raw_number(r.total_coll),
            format!("{:.1}", r.coll_ach_pct),
            raw_number(r.cash_coll),
            raw_number(r.credit_coll),
            raw_number(r.seed_coll),
        ]
    });
    let content = write_rows(ReportTab::Collection.headers(), records)?;
    Ok(Some(CsvExport {
        filename: export_filename(ReportTab::Collection, month, year),
        content,
    }))
}

pub fn export_filename(tab: ReportTab, month: u32, year: i32) -> String {
    format!("{}_report_{}_{}.csv", tab.as_str(), month, year)
}

/// Write the export blob next to the given directory. This is the only
/// side-effectful piece of the exporter.
pub fn save_export(dir: &Path, export: &CsvExport) -> Result<PathBuf, ExportError> {
    let path = dir.join(&export.filename);
    std::fs::write(&path, &export.content).map_err(|source| ExportError::Io {
        path: path.display().to_string(),
        source,
    })?;
    Ok(path)
}

// Comma-delimited with no quoting or escaping of embedded delimiters; a
// field containing a comma produces a shifted row. Known limitation carried
// over from the upstream export format.
fn write_rows<I>(headers: &[&str], rows: I) -> Result<String, ExportError>
where
    I: IntoIterator<Item = Vec<String>>,
{
    let mut wtr = WriterBuilder::new()
        .quote_style(QuoteStyle::Never)
        .from_writer(Vec::new());
    wtr.write_record(headers)?;
    for row in rows {
        wtr.write_record(&row)?;
    }
    let buf = wtr.into_inner().map_err(|e| ExportError::Io {
        path: "<csv buffer>".to_string(),
        source: e.into_error(),
    })?;
    String::from_utf8(buf).map_err(|_| ExportError::Encoding)
}

// Raw numeric cell: whole values print without a decimal point, fractional
// values print with their shortest representation. No grouping, no symbol.
fn raw_number(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 && value.abs() < 9.0e15 {
        format!("{}", value as i64)
    } else {
        format!("{}", value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sale(area: &str, division: &str) -> SalesRecord {
        SalesRecord {
            region_id: 1,
            month: 11,
            year: 2025,
            area_name: area.to_string(),
            division: division.to_string(),
            sales_target: 100_000.0,
            gross_sales: 125_000.0,
            sales_return: 5_000.0,
            net_sales: 120_000.0,
            sales_ach_pct: 120.0,
        }
    }

    #[test]
    fn two_row_sales_export_shape() {
        let rows = vec![sale("Dhaka", "Dhaka"), sale("Bogura", "Rajshahi")];
        let export = export_sales_csv(&rows, 11, 2025).unwrap().unwrap();
        assert_eq!(export.filename, "sales_report_11_2025.csv");
        let lines: Vec<&str> = export.content.lines().collect();
        assert_eq!(lines.len(), 3);
        for line in &lines {
            assert_eq!(line.split(',').count(), 7);
        }
        assert_eq!(
            lines[0],
            "Region,Division,Target,Gross Sales,Return,Net Sales,Achievement %"
        );
        assert_eq!(lines[1], "Dhaka,Dhaka,100000,125000,5000,120000,120.0");
    }

    #[test]
    fn collection_export_column_order() {
        let rows = vec![CollectionRecord {
            region_id: 1,
            month: 6,
            year: 2024,
            area_name: "Sylhet".into(),
            coll_target: 80_000.0,
            total_coll: 60_000.0,
            cash_coll: 30_000.0,
            credit_coll: 20_000.0,
            seed_coll: 10_000.0,
            coll_ach_pct: 75.0,
            outstanding: 0.0,
        }];
        let export = export_collection_csv(&rows, 6, 2024).unwrap().unwrap();
        assert_eq!(export.filename, "collection_report_6_2024.csv");
        let lines: Vec<&str> = export.content.lines().collect();
        assert_eq!(
            lines[0],
            "Region,Target,Total Collection,Achievement %,Cash,Credit,Seed"
        );
        assert_eq!(lines[1], "Sylhet,80000,60000,75.0,30000,20000,10000");
    }

    #[test]
    fn empty_set_is_a_noop() {
        assert!(export_sales_csv(&[], 11, 2025).unwrap().is_none());
        assert!(export_collection_csv(&[], 11, 2025).unwrap().is_none());
    }

    #[test]
    fn embedded_commas_are_not_escaped() {
        let rows = vec![sale("Dhaka, Metro", "Dhaka")];
        let export = export_sales_csv(&rows, 1, 2025).unwrap().unwrap();
        let line = export.content.lines().nth(1).unwrap();
        assert!(line.starts_with("Dhaka, Metro,Dhaka,"));
        assert!(!line.contains('"'));
    }

    #[test]
    fn raw_numbers_drop_trailing_zero_decimals() {
        assert_eq!(raw_number(100000.0), "100000");
        assert_eq!(raw_number(120.5), "120.5");
        assert_eq!(raw_number(0.0), "0");
    }
}
