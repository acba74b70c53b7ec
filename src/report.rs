//! Report sinks for a finished [`AggregationTable`]. The engine knows nothing about these.

use anyhow::{anyhow, Context, Result};
use chrono::Local;
use json::JsonValue;
use log::info;
use std::{
    fs::{self, File},
    io::{BufWriter, Write},
    path::{Path, PathBuf},
    str::FromStr,
};

use crate::{AggregationTable, Aggregator, Signature};

pub const SIGNATURE_HEADER: &str = "Exception";
pub const COUNT_HEADER: &str = "Count";

/// Somewhere a finished table can be written to.
pub trait ReportSink {
    fn write_table(&mut self, table: &AggregationTable) -> Result<()>;
}

/// Two-column CSV, one row per signature in table order.
pub struct CsvReport<W: Write> {
    writer: csv::Writer<W>,
}

impl<W: Write> CsvReport<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer: csv::Writer::from_writer(writer),
        }
    }

    pub fn into_inner(self) -> Result<W> {
        self.writer.into_inner().map_err(|e| anyhow!("failed to flush csv report: {}", e.error()))
    }
}

impl<W: Write> ReportSink for CsvReport<W> {
    fn write_table(&mut self, table: &AggregationTable) -> Result<()> {
        self.writer.write_record(&[SIGNATURE_HEADER, COUNT_HEADER])?;
        for (signature, count) in table.iter() {
            self.writer.write_record(&[signature.as_str(), count.to_string().as_str()])?;
        }
        self.writer.flush()?;
        Ok(())
    }
}

/// Pretty-printed JSON array of `{"exception": ..., "count": ...}` objects in table order.
pub struct JsonReport<W: Write> {
    writer: W,
}

impl<W: Write> JsonReport<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> ReportSink for JsonReport<W> {
    fn write_table(&mut self, table: &AggregationTable) -> Result<()> {
        let mut rows = JsonValue::new_array();
        for (signature, count) in table.iter() {
            let mut row = JsonValue::new_object();
            row.insert("exception", signature.as_str())?;
            row.insert("count", count)?;
            rows.push(row)?;
        }
        writeln!(self.writer, "{}", rows.pretty(2))?;
        self.writer.flush()?;
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportFormat {
    Csv,
    Json,
}

impl ReportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            ReportFormat::Csv => "csv",
            ReportFormat::Json => "json",
        }
    }

    /// A sink of this format over `writer`.
    pub fn sink<'a, W: Write + 'a>(self, writer: W) -> Box<dyn ReportSink + 'a> {
        match self {
            ReportFormat::Csv => Box::new(CsvReport::new(writer)),
            ReportFormat::Json => Box::new(JsonReport::new(writer)),
        }
    }
}

impl Default for ReportFormat {
    fn default() -> Self {
        ReportFormat::Csv
    }
}

impl FromStr for ReportFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "csv" => Ok(ReportFormat::Csv),
            "json" => Ok(ReportFormat::Json),
            other => Err(format!("unknown report format '{}' (expected csv or json)", other)),
        }
    }
}

/// `$HOME/Desktop/logs`, or `./logs` when there is no home directory.
pub fn default_output_dir() -> PathBuf {
    dirs::home_dir().map(|home| home.join("Desktop").join("logs")).unwrap_or_else(|| PathBuf::from("logs"))
}

/// `ExceptionReport_<YYYYmmddHHMMSS>.<ext>`, stamped with local time.
pub fn report_file_name(format: ReportFormat) -> String {
    format!("ExceptionReport_{}.{}", Local::now().format("%Y%m%d%H%M%S"), format.extension())
}

/// Write `table` to a new timestamped file in `dir`, creating the directory if needed.
pub fn write_report(dir: impl AsRef<Path>, format: ReportFormat, table: &AggregationTable) -> Result<PathBuf> {
    let dir = dir.as_ref();
    fs::create_dir_all(dir).with_context(|| format!("failed to create output directory {}", dir.display()))?;
    let path = dir.join(report_file_name(format));
    let file = File::create(&path).with_context(|| format!("failed to create report {}", path.display()))?;
    format
        .sink(BufWriter::new(file))
        .write_table(table)
        .with_context(|| format!("failed to write report {}", path.display()))?;
    info!("Wrote {} signatures to {}", table.len(), path.display());
    Ok(path)
}

/// Read a CSV report back, adding its counts into `aggregator`.
pub fn read_csv_report(path: impl AsRef<Path>, aggregator: &mut Aggregator) -> Result<()> {
    let path = path.as_ref();
    let mut reader = csv::Reader::from_path(path).with_context(|| format!("failed to open {}", path.display()))?;
    for (row, record) in reader.records().enumerate() {
        let record = record?;
        let (signature, count) = match (record.get(0), record.get(1)) {
            (Some(signature), Some(count)) => (signature, count),
            _ => return Err(anyhow!("{}: row {} has fewer than two columns", path.display(), row + 1)),
        };
        let count: u64 = count
            .trim()
            .parse()
            .with_context(|| format!("{}: row {} has a bad count '{}'", path.display(), row + 1, count))?;
        aggregator.record_n(Signature::from(signature), count);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_table() -> AggregationTable {
        let mut aggregator = Aggregator::new();
        aggregator.record(Signature::from("ERROR boom\n\tat foo.bar()"));
        aggregator.record(Signature::from("ERROR \"quoted\", with comma"));
        aggregator.record(Signature::from("ERROR boom\n\tat foo.bar()"));
        aggregator.into_table()
    }

    #[test]
    fn test_csv_report() {
        let mut report = CsvReport::new(Vec::new());
        report.write_table(&sample_table()).unwrap();
        let output = String::from_utf8(report.into_inner().unwrap()).unwrap();
        assert_eq!(
            output,
            "Exception,Count\n\"ERROR boom\n\tat foo.bar()\",2\n\"ERROR \"\"quoted\"\", with comma\",1\n"
        );
    }

    #[test]
    fn test_json_report() {
        let mut report = JsonReport::new(Vec::new());
        report.write_table(&sample_table()).unwrap();
        let parsed = json::parse(&String::from_utf8(report.into_inner()).unwrap()).unwrap();
        assert_eq!(parsed.len(), 2);
        assert_eq!(parsed[0]["exception"], "ERROR boom\n\tat foo.bar()");
        assert_eq!(parsed[0]["count"], 2);
        assert_eq!(parsed[1]["count"], 1);
    }

    #[test]
    fn test_write_and_read_back() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("nested").join("logs");
        let path = write_report(&out, ReportFormat::Csv, &sample_table()).unwrap();
        let name = path.file_name().unwrap().to_str().unwrap();
        assert!(name.starts_with("ExceptionReport_"));
        assert!(name.ends_with(".csv"));

        let mut aggregator = Aggregator::new();
        read_csv_report(&path, &mut aggregator).unwrap();
        read_csv_report(&path, &mut aggregator).unwrap();
        assert_eq!(aggregator.into_table().get("ERROR boom\n\tat foo.bar()"), Some(4));
    }

    #[test]
    fn test_format_from_str() {
        assert_eq!("JSON".parse::<ReportFormat>(), Ok(ReportFormat::Json));
        assert_eq!("csv".parse::<ReportFormat>(), Ok(ReportFormat::Csv));
        assert!("xlsx".parse::<ReportFormat>().is_err());
    }
}
