use std::fs::File;
use std::io::Write;
use std::path::Path;

use csv::{Writer, WriterBuilder};

use ccda_model::{REPORT_HEADER, ReportRow, Totals};

use crate::error::{ReportError, Result};

/// Name of the report inside the output directory.
pub const REPORT_FILE_NAME: &str = "results.csv";

/// Row-at-a-time CSV report.
pub struct ReportWriter<W: Write> {
    writer: Writer<W>,
}

impl ReportWriter<File> {
    /// Creates (or truncates) the report file and writes the header.
    pub fn create(path: &Path) -> Result<Self> {
        let writer = builder()
            .from_path(path)
            .map_err(|source| ReportError::Create {
                path: path.to_path_buf(),
                source,
            })?;
        let mut report = Self { writer };
        report.write_header()?;
        Ok(report)
    }
}

impl<W: Write> ReportWriter<W> {
    /// Wraps any writer, e.g. a `Vec<u8>` in tests.
    pub fn from_writer(inner: W) -> Result<Self> {
        let mut report = Self {
            writer: builder().from_writer(inner),
        };
        report.write_header()?;
        Ok(report)
    }

    pub fn write_row(&mut self, row: &ReportRow) -> Result<()> {
        self.serialize(row)
    }

    /// Appends the `Total` row, flushes and returns the underlying writer.
    pub fn finish(mut self, totals: &Totals) -> Result<W> {
        let row = ReportRow::total(totals)?;
        self.serialize(&row)?;
        self.writer
            .into_inner()
            .map_err(|err| ReportError::Flush(err.into_error()))
    }

    fn write_header(&mut self) -> Result<()> {
        self.writer
            .write_record(REPORT_HEADER)
            .map_err(|source| ReportError::Write {
                filename: "header".to_string(),
                source,
            })?;
        self.writer.flush()?;
        Ok(())
    }

    fn serialize(&mut self, row: &ReportRow) -> Result<()> {
        self.writer
            .serialize(row)
            .map_err(|source| ReportError::Write {
                filename: row.filename.clone(),
                source,
            })?;
        self.writer.flush()?;
        Ok(())
    }
}

fn builder() -> WriterBuilder {
    let mut builder = WriterBuilder::new();
    builder.has_headers(false);
    builder
}

#[cfg(test)]
mod tests {
    use super::*;
    use ccda_model::{CategoryCount, FileCounts, FileOutcome};

    fn report_text(rows: &[ReportRow], totals: &Totals) -> String {
        let mut report = ReportWriter::from_writer(Vec::new()).unwrap();
        for row in rows {
            report.write_row(row).unwrap();
        }
        String::from_utf8(report.finish(totals).unwrap()).unwrap()
    }

    #[test]
    fn empty_report_has_header_and_zero_total() {
        assert_eq!(
            report_text(&[], &Totals::new()),
            "Filename,labs,vitals,labs_w_loinc,vitals_w_loinc\nTotal,0,0,0,0\n"
        );
    }

    #[test]
    fn failed_row_is_written_with_sentinels() {
        let mut totals = Totals::new();
        totals.record(&FileOutcome::Failed);
        assert_eq!(
            report_text(&[ReportRow::failed("bad.xml")], &totals),
            "Filename,labs,vitals,labs_w_loinc,vitals_w_loinc\n\
             bad.xml,-1,-1,-1,-1\n\
             Total,0,0,0,0\n"
        );
    }

    #[test]
    fn filenames_needing_quotes_are_escaped() {
        let outcome = FileOutcome::Counted(FileCounts::new(
            CategoryCount::new(1, 1),
            CategoryCount::default(),
        ));
        let row = ReportRow::from_outcome("smith, john.xml", &outcome).unwrap();
        let mut totals = Totals::new();
        totals.record(&outcome);
        let text = report_text(&[row], &totals);
        assert!(text.contains("\"smith, john.xml\",1,0,1,0\n"));
    }
}
