//! File-backed report tests.

use std::error::Error as _;

use ccda_model::{CategoryCount, FileCounts, FileOutcome, ReportRow, Totals};
use ccda_report::{REPORT_FILE_NAME, ReportError, ReportWriter};
use tempfile::TempDir;

#[test]
fn rows_are_on_disk_before_the_report_is_finished() {
    let dir = TempDir::new().expect("temp dir");
    let path = dir.path().join(REPORT_FILE_NAME);
    let mut report = ReportWriter::create(&path).expect("create report");

    let outcome = FileOutcome::Counted(FileCounts::new(
        CategoryCount::new(3, 2),
        CategoryCount::new(1, 0),
    ));
    report
        .write_row(&ReportRow::from_outcome("patient.xml", &outcome).unwrap())
        .expect("write row");

    let partial = std::fs::read_to_string(&path).expect("read partial");
    assert_eq!(
        partial,
        "Filename,labs,vitals,labs_w_loinc,vitals_w_loinc\npatient.xml,3,1,2,0\n"
    );

    let mut totals = Totals::new();
    totals.record(&outcome);
    report.finish(&totals).expect("finish");

    let text = std::fs::read_to_string(&path).expect("read report");
    insta::assert_snapshot!(text.trim_end(), @r"
    Filename,labs,vitals,labs_w_loinc,vitals_w_loinc
    patient.xml,3,1,2,0
    Total,3,1,2,0
    ");
}

#[test]
fn create_fails_for_missing_directory() {
    let dir = TempDir::new().expect("temp dir");
    let path = dir.path().join("missing").join(REPORT_FILE_NAME);
    let err = ReportWriter::create(&path).err().expect("create should fail");
    assert!(matches!(err, ReportError::Create { .. }));
    assert_eq!(
        err.to_string(),
        format!("failed to create report {}", path.display())
    );
    assert!(err.source().is_some());
}
