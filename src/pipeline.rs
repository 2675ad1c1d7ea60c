// THEORY:
// The `pipeline` module is the top-level API of the audit. It ties the stages
// together into a single, sequential pass:
//
//   task source -> (per task) image fetch -> (per annotation) checks -> report
//
// Key architectural principles:
// 1.  **Failure Isolation**: Each scope catches its own failures. An annotation
//     whose geometry is unusable becomes an ERROR finding; a task whose image
//     cannot be fetched or decoded is skipped with a warning. Neither stops the
//     batch. Only the task source and the report sink can end a run early.
// 2.  **Pluggable Checks**: The pipeline does not know what a check does. It owns
//     an ordered list of `AnnotationCheck`s and runs each one on every annotation.
// 3.  **Sequential by Construction**: Tasks are handled one at a time, and each
//     image is fetched once and dropped before the next task.

use crate::checks::{AnnotationCheck, Verdict, default_checks};
use crate::core_modules::image_fetcher::ImageFetcher;
use crate::error::{AuditError, ImageFetchError};
use crate::report::{Finding, ReportWriter};
use crate::source::TaskSource;
use crate::task::Task;
use image::RgbImage;
use std::io::Write;

/// The outcome of auditing one task.
#[derive(Debug)]
pub enum TaskReport {
    /// The task is not completed; nothing was checked.
    Incomplete,
    /// The image could not be fetched or decoded; nothing was checked.
    Skipped(ImageFetchError),
    /// Every annotation was checked. `findings` holds the non-passing verdicts.
    Checked {
        annotations: usize,
        findings: Vec<Finding>,
    },
}

/// Counters for a whole run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuditSummary {
    pub tasks_seen: usize,
    pub tasks_incomplete: usize,
    pub tasks_skipped: usize,
    pub annotations_checked: usize,
    pub findings: usize,
}

/// The main, top-level struct for the audit.
pub struct AuditPipeline {
    checks: Vec<Box<dyn AnnotationCheck>>,
}

impl AuditPipeline {
    pub fn new(checks: Vec<Box<dyn AnnotationCheck>>) -> Self {
        Self { checks }
    }

    /// A pipeline running the box-area and background-color checks.
    pub fn with_default_checks() -> Self {
        Self::new(default_checks())
    }

    pub fn checks(&self) -> &[Box<dyn AnnotationCheck>] {
        &self.checks
    }

    /// Runs every check on every annotation of `task` against its decoded image.
    /// Check failures become ERROR findings for that annotation.
    pub fn check_annotations(&self, task: &Task, image: &RgbImage) -> Vec<Finding> {
        let mut findings = Vec::new();
        for annotation in &task.annotations {
            for check in &self.checks {
                let verdict = match check.check(image, annotation) {
                    Ok(verdict) => verdict,
                    Err(error) => Verdict::Error(format!("{} check failed: {error}", check.name())),
                };
                tracing::debug!(
                    task_id = %task.id,
                    annotation = %annotation.uuid,
                    check = check.name(),
                    ?verdict,
                    "checked annotation"
                );
                findings.extend(Finding::from_verdict(&task.id, Some(&annotation.uuid), verdict));
            }
        }
        findings
    }

    /// Audits a single task: fetches its image once and checks its annotations.
    pub async fn audit_task<F>(&self, task: &Task, fetcher: &F) -> TaskReport
    where
        F: ImageFetcher + ?Sized,
    {
        if !task.is_completed() {
            return TaskReport::Incomplete;
        }

        let image = match fetcher.fetch_and_decode(&task.image_url).await {
            Ok(image) => image,
            Err(error) => return TaskReport::Skipped(error),
        };

        TaskReport::Checked {
            annotations: task.annotations.len(),
            findings: self.check_annotations(task, &image),
        }
    }

    /// Audits every task of `project`, appending rows to `report` as it goes.
    pub async fn run<S, F, W>(
        &self,
        source: &S,
        project: &str,
        fetcher: &F,
        report: &mut ReportWriter<W>,
    ) -> Result<AuditSummary, AuditError>
    where
        S: TaskSource + ?Sized,
        F: ImageFetcher + ?Sized,
        W: Write,
    {
        let tasks = source.list_tasks(project).await?;
        tracing::info!(project, tasks = tasks.len(), "auditing tasks");

        let mut summary = AuditSummary::default();
        for task in &tasks {
            summary.tasks_seen += 1;

            match self.audit_task(task, fetcher).await {
                TaskReport::Incomplete => {
                    tracing::info!(task_id = %task.id, status = ?task.status, "task not completed");
                    summary.tasks_incomplete += 1;
                    report.write_incomplete_task(&task.id)?;
                }
                TaskReport::Skipped(error) => {
                    tracing::warn!(task_id = %task.id, %error, "skipping task");
                    summary.tasks_skipped += 1;
                }
                TaskReport::Checked {
                    annotations,
                    findings,
                } => {
                    tracing::info!(
                        task_id = %task.id,
                        annotations,
                        findings = findings.len(),
                        "task checked"
                    );
                    summary.annotations_checked += annotations;
                    summary.findings += findings.len();
                    for finding in &findings {
                        report.write_finding(finding)?;
                    }
                }
            }
        }

        report.flush()?;
        Ok(summary)
    }
}

impl Default for AuditPipeline {
    fn default() -> Self {
        Self::with_default_checks()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CheckError;
    use crate::report::Status;
    use crate::task::{Annotation, Attributes, TaskStatus};

    struct AlwaysFails;

    impl AnnotationCheck for AlwaysFails {
        fn name(&self) -> &'static str {
            "always_fails"
        }

        fn check(&self, _: &RgbImage, _: &Annotation) -> Result<Verdict, CheckError> {
            Err(CheckError::InvalidGeometry("nope".into()))
        }
    }

    struct AlwaysWarns;

    impl AnnotationCheck for AlwaysWarns {
        fn name(&self) -> &'static str {
            "always_warns"
        }

        fn check(&self, _: &RgbImage, annotation: &Annotation) -> Result<Verdict, CheckError> {
            Ok(Verdict::Warning(format!("look at {}", annotation.uuid)))
        }
    }

    fn task(uuids: &[&str]) -> Task {
        Task {
            id: "T1".into(),
            status: TaskStatus::Completed,
            image_url: "memory://t1".into(),
            annotations: uuids
                .iter()
                .map(|uuid| Annotation {
                    uuid: uuid.to_string(),
                    label: "stop_sign".into(),
                    left: 0.0,
                    top: 0.0,
                    width: 2.0,
                    height: 2.0,
                    attributes: Attributes::default(),
                })
                .collect(),
        }
    }

    #[test]
    fn check_errors_become_error_findings() {
        let pipeline = AuditPipeline::new(vec![Box::new(AlwaysFails)]);
        let findings = pipeline.check_annotations(&task(&["a"]), &RgbImage::new(4, 4));

        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].status, Status::Error);
        assert_eq!(findings[0].annotation_uuid.as_deref(), Some("a"));
        assert!(findings[0].description.contains("always_fails"));
        assert!(findings[0].description.contains("nope"));
    }

    #[test]
    fn findings_follow_annotation_then_check_order() {
        let pipeline = AuditPipeline::new(vec![Box::new(AlwaysWarns), Box::new(AlwaysFails)]);
        let findings = pipeline.check_annotations(&task(&["a", "b"]), &RgbImage::new(4, 4));

        let order: Vec<(&str, Status)> = findings
            .iter()
            .map(|f| (f.annotation_uuid.as_deref().unwrap_or(""), f.status))
            .collect();
        assert_eq!(
            order,
            vec![
                ("a", Status::Warn),
                ("a", Status::Error),
                ("b", Status::Warn),
                ("b", Status::Error),
            ]
        );
    }

    #[test]
    fn default_pipeline_registers_area_and_color_checks() {
        let names: Vec<&str> = AuditPipeline::default().checks().iter().map(|c| c.name()).collect();

        assert_eq!(names, vec!["bounding_box_area", "background_color"]);
    }
}
