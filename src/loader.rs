use crate::error::{ReportError, Result};
use crate::types::{RawJapanRow, RawKoreaRow, RawTourismRow, TourismRecord};
use crate::util::{format_int, parse_f64_safe, parse_i32_safe};
use csv::{ReaderBuilder, Trim};
use std::path::Path;

fn open(path: &Path) -> Result<csv::Reader<std::fs::File>> {
    ReaderBuilder::new()
        .flexible(true)
        .trim(Trim::Headers)
        .from_path(path)
        .map_err(|e| ReportError::read(path.display(), e))
}

/// Load a UN Tourism export. Rows without a reporter, year or indicator code
/// are skipped and counted; non-numeric `value` cells load as `None`.
pub fn load_tourism(path: &Path) -> Result<Vec<TourismRecord>> {
    let mut rdr = open(path)?;
    // A file without a usable header row is corrupt, not merely sparse.
    let headers = rdr
        .headers()
        .map_err(|e| ReportError::read(path.display(), e))?;
    for required in ["reporter_area_label", "year", "indicator_code", "value"] {
        if !headers.iter().any(|h| h == required) {
            return Err(ReportError::read(
                path.display(),
                format!("missing column `{}`", required),
            ));
        }
    }

    let (mut total_rows, mut parse_errors, mut missing_values) = (0usize, 0usize, 0usize);
    let mut records = Vec::new();
    for result in rdr.deserialize::<RawTourismRow>() {
        total_rows += 1;
        let row = match result {
            Ok(r) => r,
            Err(_) => {
                parse_errors += 1;
                continue;
            }
        };
        let (Some(reporter), Some(year), Some(indicator_code)) = (
            row.reporter.as_deref().map(str::trim).filter(|s| !s.is_empty()),
            parse_i32_safe(row.year.as_deref()),
            row.indicator_code.as_deref().map(str::trim).filter(|s| !s.is_empty()),
        ) else {
            parse_errors += 1;
            continue;
        };
        let value = parse_f64_safe(row.value.as_deref());
        if value.is_none() {
            missing_values += 1;
        }
        records.push(TourismRecord {
            reporter: reporter.to_string(),
            partner: row.partner.unwrap_or_default().trim().to_string(),
            year,
            indicator_code: indicator_code.to_string(),
            value,
            indicator_label: row.indicator_label.unwrap_or_default().trim().to_string(),
            unit: row.unit.unwrap_or_default().trim().to_string(),
        });
    }

    tracing::info!(
        path = %path.display(),
        rows = %format_int(total_rows),
        loaded = %format_int(records.len()),
        skipped = parse_errors,
        non_numeric = missing_values,
        "dataset loaded"
    );
    Ok(records)
}

/// `(Monthly, Grand Total)` cells of the Japan export, in file order.
pub fn load_japan_rows(path: &Path) -> Result<Vec<(String, Option<f64>)>> {
    let mut rdr = open(path)?;
    let mut rows = Vec::new();
    let mut parse_errors = 0usize;
    for result in rdr.deserialize::<RawJapanRow>() {
        match result {
            Ok(r) => rows.push((
                r.monthly.unwrap_or_default(),
                parse_f64_safe(r.grand_total.as_deref()),
            )),
            Err(_) => parse_errors += 1,
        }
    }
    tracing::info!(path = %path.display(), rows = rows.len(), skipped = parse_errors, "monthly file loaded");
    Ok(rows)
}

/// `(date, nation, visitor)` cells of the Korea export, in file order.
pub fn load_korea_rows(path: &Path) -> Result<Vec<(String, String, Option<f64>)>> {
    let mut rdr = open(path)?;
    let mut rows = Vec::new();
    let mut parse_errors = 0usize;
    for result in rdr.deserialize::<RawKoreaRow>() {
        match result {
            Ok(r) => rows.push((
                r.date.unwrap_or_default(),
                r.nation.unwrap_or_default(),
                parse_f64_safe(r.visitor.as_deref()),
            )),
            Err(_) => parse_errors += 1,
        }
    }
    tracing::info!(path = %path.display(), rows = rows.len(), skipped = parse_errors, "monthly file loaded");
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_csv(dir: &tempfile::TempDir, name: &str, body: &str) -> std::path::PathBuf {
        let path = dir.path().join(name);
        let mut f = std::fs::File::create(&path).unwrap();
        f.write_all(body.as_bytes()).unwrap();
        path
    }

    #[test]
    fn bad_cells_load_as_missing() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_csv(
            &dir,
            "arrivals.csv",
            "reporter_area_code,reporter_area_label,partner_area_label,year,indicator_code,indicator_label,value,unit\n\
             156,China,World,2019,INBD_TRIP_AREA_TOTL_TOUR,Total,65000,Thousand trips\n\
             392,Japan,World,2019,INBD_TRIP_AREA_TOTL_TOUR,Total,..,Thousand trips\n\
             ,,World,2019,INBD_TRIP_AREA_TOTL_TOUR,Total,1,Thousand trips\n\
             250,France,World,2019,INBD_TRIP_AREA_TOTL_TOUR,Total,8.9E+04,Thousand trips\n",
        );
        let records = load_tourism(&path).unwrap();
        assert_eq!(records.len(), 3);
        assert_eq!(records[0].value, Some(65000.0));
        assert_eq!(records[0].partner, "World");
        assert_eq!(records[0].unit, "Thousand trips");
        assert_eq!(records[1].value, None);
        assert_eq!(records[2].value, Some(89_000.0));
    }

    #[test]
    fn missing_file_is_read_error() {
        let err = load_tourism(Path::new("/nonexistent/arrivals.csv")).unwrap_err();
        assert!(matches!(err, ReportError::Read { .. }));
    }

    #[test]
    fn missing_columns_is_read_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_csv(&dir, "junk.csv", "a,b\n1,2\n");
        let err = load_tourism(&path).unwrap_err();
        assert!(err.to_string().contains("indicator_code") || err.to_string().contains("reporter_area_label"));
    }

    #[test]
    fn japan_headers_are_trimmed() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_csv(
            &dir,
            "japan.csv",
            "Monthly ,Grand Total,%Change\n1997 Jan.,\"300,000\",\nFeb.,\"280,000\",\n",
        );
        let rows = load_japan_rows(&path).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0], ("1997 Jan.".to_string(), Some(300_000.0)));
    }
}
