//! Usage dataset loader for CSV files and spreadsheets.

use anyhow::{Context, Result};
use calamine::{Data, Reader, open_workbook_auto};
use csv::{ReaderBuilder, Trim};
use std::collections::BTreeSet;
use std::fs::File;
use std::path::Path;
use tracing::debug;

use crate::analyzers::types::{
    FEATURE_COLUMN, MetricColumn, REQUIRED_COLUMNS, UsageRecord, UsageTable,
};
use crate::error::EngagementError;

/// File formats the loader understands, chosen by extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputFormat {
    Csv,
    Workbook,
}

impl InputFormat {
    pub fn from_path(path: &Path) -> Result<Self, EngagementError> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);

        match ext.as_deref() {
            Some("csv") => Ok(InputFormat::Csv),
            Some("xlsx" | "xlsm" | "xlsb" | "xls" | "ods") => Ok(InputFormat::Workbook),
            _ => Err(EngagementError::UnsupportedFormat(
                path.display().to_string(),
            )),
        }
    }
}

/// Reads a usage dataset into memory.
///
/// `sheet` selects a worksheet by name for spreadsheet inputs; the first
/// worksheet is used when it is `None`. It is ignored for CSV.
///
/// # Errors
///
/// Fails if the file cannot be opened or parsed, if a required column is
/// missing from the header, or if a metric cell is not numeric.
#[tracing::instrument(skip(path), fields(path = %path.display()))]
pub fn load_usage(path: &Path, sheet: Option<&str>) -> Result<UsageTable> {
    let records = match InputFormat::from_path(path)? {
        InputFormat::Csv => {
            if sheet.is_some() {
                debug!("Sheet name ignored for CSV input");
            }
            read_csv(path)?
        }
        InputFormat::Workbook => read_workbook(path, sheet)?,
    };

    debug!(rows = records.len(), "Usage data loaded");

    Ok(UsageTable {
        source: path.display().to_string(),
        records,
    })
}

/// Checks that every required column appears among `headers`.
pub fn require_columns<'a>(
    headers: impl IntoIterator<Item = &'a str>,
) -> Result<(), EngagementError> {
    let present: BTreeSet<&str> = headers.into_iter().map(str::trim).collect();

    match REQUIRED_COLUMNS.iter().find(|c| !present.contains(*c)) {
        Some(missing) => Err(EngagementError::MissingColumn(missing.to_string())),
        None => Ok(()),
    }
}

fn read_csv(path: &Path) -> Result<Vec<UsageRecord>> {
    let file =
        File::open(path).with_context(|| format!("failed to open {}", path.display()))?;
    // Short rows leave their trailing cells blank, as in a spreadsheet.
    let mut rdr = ReaderBuilder::new()
        .trim(Trim::All)
        .flexible(true)
        .from_reader(file);

    require_columns(rdr.headers()?.iter())?;

    let mut records = Vec::new();
    for result in rdr.deserialize() {
        let record: UsageRecord =
            result.with_context(|| format!("failed to parse {}", path.display()))?;
        records.push(record);
    }

    Ok(records)
}

fn read_workbook(path: &Path, sheet: Option<&str>) -> Result<Vec<UsageRecord>> {
    let mut workbook = open_workbook_auto(path)
        .with_context(|| format!("failed to open {}", path.display()))?;

    let range = match sheet {
        Some(name) => {
            if !workbook.sheet_names().iter().any(|s| s == name) {
                return Err(EngagementError::SheetNotFound(name.to_string()).into());
            }
            workbook.worksheet_range(name)?
        }
        None => workbook
            .worksheet_range_at(0)
            .ok_or_else(|| EngagementError::EmptyWorkbook(path.display().to_string()))??,
    };

    let mut rows = range.rows();
    let headers: Vec<String> = rows
        .next()
        .map(|row| row.iter().map(|c| cell_text(c).unwrap_or_default()).collect())
        .unwrap_or_default();
    require_columns(headers.iter().map(String::as_str))?;

    let position = |name: &str| headers.iter().position(|h| h == name);
    let feature_idx = position(FEATURE_COLUMN);
    let user_idx = position("user_id");
    let metric_idx: Vec<(MetricColumn, Option<usize>)> = MetricColumn::ALL
        .into_iter()
        .map(|c| (c, position(c.name())))
        .collect();

    let mut records = Vec::new();
    // Row 1 is the header.
    for (offset, row) in rows.enumerate() {
        let row_number = offset + 2;
        let cell = |idx: Option<usize>| idx.and_then(|i| row.get(i));

        let mut record = UsageRecord {
            user_id: cell(user_idx).and_then(cell_text),
            feature_name: cell(feature_idx).and_then(cell_text),
            ..Default::default()
        };

        for (column, idx) in &metric_idx {
            let value = match cell(*idx) {
                Some(c) => cell_number(c, row_number, *column)?,
                None => None,
            };
            match column {
                MetricColumn::Sessions => record.sessions = value,
                MetricColumn::AvgDurationMins => record.avg_duration_mins = value,
                MetricColumn::SatisfactionScore => record.satisfaction_score = value,
            }
        }

        records.push(record);
    }

    Ok(records)
}

/// Text rendering of a cell, `None` for blanks.
fn cell_text(cell: &Data) -> Option<String> {
    match cell {
        Data::Empty => None,
        Data::String(s) => {
            let s = s.trim();
            (!s.is_empty()).then(|| s.to_string())
        }
        other => Some(other.to_string()),
    }
}

fn cell_number(
    cell: &Data,
    row: usize,
    column: MetricColumn,
) -> Result<Option<f64>, EngagementError> {
    let invalid = |value: String| EngagementError::InvalidCell {
        row,
        column: column.name().to_string(),
        value,
    };

    match cell {
        Data::Empty => Ok(None),
        Data::Float(f) => Ok(Some(*f)),
        Data::Int(i) => Ok(Some(*i as f64)),
        Data::String(s) if s.trim().is_empty() => Ok(None),
        Data::String(s) => s
            .trim()
            .parse::<f64>()
            .map(Some)
            .map_err(|_| invalid(s.clone())),
        other => Err(invalid(other.to_string())),
    }
}

/// Shape of a loaded dataset, reported by the `inspect` command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableProfile {
    pub rows: usize,
    pub features: usize,
    pub unnamed_rows: usize,
    pub blank_cells: Vec<(MetricColumn, usize)>,
}

pub fn profile(table: &UsageTable) -> TableProfile {
    let features: BTreeSet<&str> = table
        .records
        .iter()
        .filter_map(|r| r.feature_name.as_deref())
        .collect();

    TableProfile {
        rows: table.len(),
        features: features.len(),
        unnamed_rows: table
            .records
            .iter()
            .filter(|r| r.feature_name.is_none())
            .count(),
        blank_cells: MetricColumn::ALL
            .into_iter()
            .map(|c| {
                let blanks = table.records.iter().filter(|r| r.metric(c).is_none()).count();
                (c, blanks)
            })
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::fs;
    use std::path::PathBuf;

    fn temp_csv(name: &str, content: &str) -> PathBuf {
        let path = env::temp_dir().join(name);
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_format_from_extension() {
        assert_eq!(
            InputFormat::from_path(Path::new("usage.CSV")).unwrap(),
            InputFormat::Csv
        );
        assert_eq!(
            InputFormat::from_path(Path::new("/data/Watson_usage_data.xlsx")).unwrap(),
            InputFormat::Workbook
        );
        assert!(matches!(
            InputFormat::from_path(Path::new("usage.parquet")),
            Err(EngagementError::UnsupportedFormat(_))
        ));
        assert!(InputFormat::from_path(Path::new("no_extension")).is_err());
    }

    #[test]
    fn test_require_columns() {
        assert!(
            require_columns([
                "user_id",
                "feature_name",
                "sessions",
                " avg_duration_mins ",
                "satisfaction_score"
            ])
            .is_ok()
        );

        let err = require_columns(["feature_name", "sessions", "avg_duration_mins"]).unwrap_err();
        assert!(matches!(err, EngagementError::MissingColumn(ref c) if c == "satisfaction_score"));
    }

    #[test]
    fn test_load_csv() {
        let path = temp_csv(
            "feature_engagement_load.csv",
            "user_id,feature_name,sessions,avg_duration_mins,satisfaction_score\n\
             u1,A,10,5,4\n\
             u2,A,20,7,4\n\
             u3,B,30,6.0,5\n",
        );

        let table = load_usage(&path, None).unwrap();

        assert_eq!(table.len(), 3);
        assert_eq!(
            table.records[2],
            UsageRecord {
                user_id: Some("u3".to_string()),
                feature_name: Some("B".to_string()),
                sessions: Some(30.0),
                avg_duration_mins: Some(6.0),
                satisfaction_score: Some(5.0),
            }
        );

        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_load_csv_blank_cells_and_extra_columns() {
        let path = temp_csv(
            "feature_engagement_blanks.csv",
            "feature_name,region,sessions,avg_duration_mins,satisfaction_score\n\
             A,eu,,5,\n\
             ,us,3,1,1\n",
        );

        let table = load_usage(&path, None).unwrap();

        assert_eq!(table.records[0].user_id, None);
        assert_eq!(table.records[0].sessions, None);
        assert_eq!(table.records[0].avg_duration_mins, Some(5.0));
        assert_eq!(table.records[0].satisfaction_score, None);
        assert_eq!(table.records[1].feature_name, None);

        let p = profile(&table);
        assert_eq!(p.rows, 2);
        assert_eq!(p.features, 1);
        assert_eq!(p.unnamed_rows, 1);
        assert_eq!(p.blank_cells[0], (MetricColumn::Sessions, 1));
        assert_eq!(p.blank_cells[2], (MetricColumn::SatisfactionScore, 1));

        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_load_csv_short_rows_read_as_blank() {
        let path = temp_csv(
            "feature_engagement_short_rows.csv",
            "feature_name,sessions,avg_duration_mins,satisfaction_score\n\
             A,1,2,3\n\
             C,4\n",
        );

        let table = load_usage(&path, None).unwrap();

        assert_eq!(table.len(), 2);
        assert_eq!(table.records[1].feature_name.as_deref(), Some("C"));
        assert_eq!(table.records[1].sessions, Some(4.0));
        assert_eq!(table.records[1].avg_duration_mins, None);
        assert_eq!(table.records[1].satisfaction_score, None);

        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_load_csv_header_only_is_empty() {
        let path = temp_csv(
            "feature_engagement_header_only.csv",
            "user_id,feature_name,sessions,avg_duration_mins,satisfaction_score\n",
        );

        let table = load_usage(&path, None).unwrap();
        assert!(table.is_empty());
        assert_eq!(profile(&table).features, 0);

        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_load_csv_missing_column() {
        let path = temp_csv(
            "feature_engagement_missing.csv",
            "feature_name,sessions,avg_duration_mins\nA,1,2\n",
        );

        let err = load_usage(&path, None).unwrap_err();
        let kind = err.downcast_ref::<EngagementError>();
        assert!(matches!(kind, Some(EngagementError::MissingColumn(c)) if c == "satisfaction_score"));

        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_load_csv_non_numeric_metric_fails() {
        let path = temp_csv(
            "feature_engagement_bad_number.csv",
            "feature_name,sessions,avg_duration_mins,satisfaction_score\nA,many,2,3\n",
        );

        assert!(load_usage(&path, None).is_err());

        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_load_missing_file_fails() {
        let path = env::temp_dir().join("feature_engagement_does_not_exist.xlsx");
        assert!(load_usage(&path, None).is_err());

        let path = env::temp_dir().join("feature_engagement_does_not_exist.csv");
        assert!(load_usage(&path, None).is_err());
    }

    #[test]
    fn test_cell_conversions() {
        assert_eq!(cell_text(&Data::Empty), None);
        assert_eq!(cell_text(&Data::String("  chat ".into())), Some("chat".to_string()));
        assert_eq!(cell_text(&Data::Int(42)), Some("42".to_string()));

        let col = MetricColumn::Sessions;
        assert_eq!(cell_number(&Data::Float(2.5), 2, col).unwrap(), Some(2.5));
        assert_eq!(cell_number(&Data::Int(3), 2, col).unwrap(), Some(3.0));
        assert_eq!(cell_number(&Data::String(" 12 ".into()), 2, col).unwrap(), Some(12.0));
        assert_eq!(cell_number(&Data::String("".into()), 2, col).unwrap(), None);
        assert_eq!(cell_number(&Data::Empty, 2, col).unwrap(), None);

        let err = cell_number(&Data::String("lots".into()), 7, col).unwrap_err();
        assert!(matches!(err, EngagementError::InvalidCell { row: 7, .. }));
    }
}
