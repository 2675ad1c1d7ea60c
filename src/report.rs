// THEORY:
// The report is an append-only CSV file with a fixed header. Each finding is
// one row, written in the order it was produced. A task that is not completed
// gets a single row with every column past `task_completed` left empty.

use crate::checks::Verdict;
use crate::error::ReportError;
use serde::Serialize;
use std::fs::File;
use std::io::Write;
use std::path::Path;

pub const HEADER: [&str; 5] = [
    "task_id",
    "task_completed",
    "bounding_box_uuid",
    "status",
    "description",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    /// An affirmative result. `Verdict` has no counterpart, so only callers
    /// building a `Finding` directly produce it.
    Ok,
    Warn,
    Error,
}

impl Status {
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Ok => "OK",
            Status::Warn => "WARN",
            Status::Error => "ERROR",
        }
    }
}

/// One reported validation result. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Finding {
    pub task_id: String,
    /// Absent for task-level findings.
    pub annotation_uuid: Option<String>,
    pub status: Status,
    pub description: String,
}

impl Finding {
    /// Turns a verdict into a finding; `Pass` has nothing to report.
    pub fn from_verdict(
        task_id: &str,
        annotation_uuid: Option<&str>,
        verdict: Verdict,
    ) -> Option<Self> {
        let (status, description) = match verdict {
            Verdict::Pass => return None,
            Verdict::Warning(description) => (Status::Warn, description),
            Verdict::Error(description) => (Status::Error, description),
        };
        Some(Self {
            task_id: task_id.to_string(),
            annotation_uuid: annotation_uuid.map(str::to_string),
            status,
            description,
        })
    }
}

#[derive(Serialize)]
struct ReportRow<'a> {
    task_id: &'a str,
    task_completed: &'a str,
    bounding_box_uuid: &'a str,
    status: &'a str,
    description: &'a str,
}

/// Append-only CSV sink. Rows are written in the order they are appended.
///
/// The underlying `csv::Writer` flushes its buffer when dropped, so rows
/// written before an early return still reach the file; call [`finish`]
/// to observe flush errors.
///
/// [`finish`]: ReportWriter::finish
pub struct ReportWriter<W: Write> {
    writer: csv::Writer<W>,
    rows: usize,
}

impl ReportWriter<File> {
    /// Creates (or truncates) the report file and writes the header.
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self, ReportError> {
        Self::new(File::create(path)?)
    }
}

impl<W: Write> ReportWriter<W> {
    pub fn new(inner: W) -> Result<Self, ReportError> {
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(inner);
        writer.write_record(HEADER)?;
        Ok(Self { writer, rows: 0 })
    }

    pub fn write_finding(&mut self, finding: &Finding) -> Result<(), ReportError> {
        self.write_row(ReportRow {
            task_id: &finding.task_id,
            task_completed: "Yes",
            bounding_box_uuid: finding.annotation_uuid.as_deref().unwrap_or(""),
            status: finding.status.as_str(),
            description: &finding.description,
        })
    }

    /// Marks a task that was not audited because it is not completed.
    pub fn write_incomplete_task(&mut self, task_id: &str) -> Result<(), ReportError> {
        self.write_row(ReportRow {
            task_id,
            task_completed: "No",
            bounding_box_uuid: "",
            status: "",
            description: "",
        })
    }

    /// Number of rows written, header excluded.
    pub fn rows_written(&self) -> usize {
        self.rows
    }

    pub fn flush(&mut self) -> Result<(), ReportError> {
        Ok(self.writer.flush()?)
    }

    /// Flushes and hands back the underlying writer.
    pub fn finish(self) -> Result<W, ReportError> {
        self.writer
            .into_inner()
            .map_err(|error| ReportError::Io(error.into_error()))
    }

    fn write_row(&mut self, row: ReportRow<'_>) -> Result<(), ReportError> {
        self.writer.serialize(row)?;
        self.rows += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn written(build: impl FnOnce(&mut ReportWriter<Vec<u8>>)) -> String {
        let mut writer = ReportWriter::new(Vec::new()).expect("header written");
        build(&mut writer);
        String::from_utf8(writer.finish().expect("flushed")).expect("utf-8 csv")
    }

    #[test]
    fn empty_report_has_only_the_header() {
        let csv = written(|_| {});

        assert_eq!(csv, "task_id,task_completed,bounding_box_uuid,status,description\n");
    }

    #[test]
    fn ok_finding_is_written_with_ok_status() {
        let finding = Finding {
            task_id: "T3".into(),
            annotation_uuid: Some("b3".into()),
            status: Status::Ok,
            description: "Reviewed.".into(),
        };
        let csv = written(|writer| writer.write_finding(&finding).expect("row written"));

        assert_eq!(csv.lines().nth(1), Some("T3,Yes,b3,OK,Reviewed."));
    }

    #[test]
    fn incomplete_task_row_leaves_other_fields_empty() {
        let csv = written(|writer| writer.write_incomplete_task("T1").expect("row written"));

        assert_eq!(csv.lines().nth(1), Some("T1,No,,,"));
    }

    #[test]
    fn findings_keep_append_order_and_quote_commas() {
        let csv = written(|writer| {
            let first = Finding::from_verdict("T2", Some("b1"), Verdict::Error("too big, clearly".into()))
                .expect("error is reported");
            let second = Finding::from_verdict("T2", Some("b2"), Verdict::Warning("maybe".into()))
                .expect("warning is reported");
            writer.write_finding(&first).expect("row written");
            writer.write_finding(&second).expect("row written");
            assert_eq!(writer.rows_written(), 2);
        });

        let rows: Vec<&str> = csv.lines().skip(1).collect();
        assert_eq!(rows, vec!["T2,Yes,b1,ERROR,\"too big, clearly\"", "T2,Yes,b2,WARN,maybe"]);
    }

    #[test]
    fn pass_produces_no_finding() {
        assert_eq!(Finding::from_verdict("T3", Some("b1"), Verdict::Pass), None);
    }

    #[test]
    fn task_level_finding_has_an_empty_uuid_column() {
        let csv = written(|writer| {
            let finding = Finding::from_verdict("T4", None, Verdict::Error("bad".into()))
                .expect("error is reported");
            writer.write_finding(&finding).expect("row written");
        });

        assert_eq!(csv.lines().nth(1), Some("T4,Yes,,ERROR,bad"));
    }
}
