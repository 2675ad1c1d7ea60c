// THEORY:
// Each check inspects one annotation against its task's decoded image and
// returns a `Verdict`. Checks are independent and pure: they share no state and
// never see each other's results. The pipeline holds a registered list of them
// and runs every check against every annotation, so a new heuristic (box
// overlap, position in frame, aspect ratio) is one more `AnnotationCheck`
// implementation added to that list.

pub mod color;
pub mod geometry;

use crate::error::CheckError;
use crate::task::Annotation;
use image::RgbImage;

pub use color::{BackgroundColorCheck, check_background_color};
pub use geometry::{BoundingBoxAreaCheck, check_bounding_box_area};

/// The outcome of one check on one annotation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    /// Nothing to report.
    Pass,
    /// Suspicious, but possibly correct.
    Warning(String),
    /// Almost certainly wrong.
    Error(String),
}

/// A validation heuristic applied to each annotation of a completed task.
pub trait AnnotationCheck: Send + Sync {
    /// Short identifier used in logs.
    fn name(&self) -> &'static str;

    fn check(&self, image: &RgbImage, annotation: &Annotation) -> Result<Verdict, CheckError>;
}

/// The checks run when no explicit list is given: box area, then background color.
pub fn default_checks() -> Vec<Box<dyn AnnotationCheck>> {
    vec![
        Box::new(BoundingBoxAreaCheck::default()),
        Box::new(BackgroundColorCheck::default()),
    ]
}
