// THEORY:
// A traffic sign photographed from a car rarely fills a large share of the
// frame, so a box covering most of the image is likely drawn wrong. Coverage
// above `WARN_COVERAGE` is suspicious; above `ERROR_COVERAGE` it is an error.
// Tiny boxes are not flagged.

use super::{AnnotationCheck, Verdict};
use crate::core_modules::region::BoundingBox;
use crate::error::CheckError;
use crate::task::Annotation;
use image::RgbImage;

/// Coverage above this fraction of the image is reported as an error.
pub const ERROR_COVERAGE: f64 = 0.50;
/// Coverage above this fraction of the image is reported as a warning.
pub const WARN_COVERAGE: f64 = 0.25;

pub const TOO_BIG: &str = "Bounding box is too big to be correct.";
pub const MAYBE_TOO_BIG: &str = "Bounding box may be too big to be correct.";

/// Grades a box by the fraction of the image it covers.
pub fn check_bounding_box_area(
    image_area: u64,
    box_width: u32,
    box_height: u32,
) -> Result<Verdict, CheckError> {
    if image_area == 0 {
        return Err(CheckError::InvalidGeometry("image area is zero".into()));
    }

    let box_area = box_width as u64 * box_height as u64;
    let coverage = box_area as f64 / image_area as f64;

    let verdict = if coverage > ERROR_COVERAGE {
        Verdict::Error(TOO_BIG.to_string())
    } else if coverage > WARN_COVERAGE {
        Verdict::Warning(MAYBE_TOO_BIG.to_string())
    } else {
        Verdict::Pass
    };
    Ok(verdict)
}

#[derive(Debug, Clone, Copy, Default)]
pub struct BoundingBoxAreaCheck;

impl AnnotationCheck for BoundingBoxAreaCheck {
    fn name(&self) -> &'static str {
        "bounding_box_area"
    }

    fn check(&self, image: &RgbImage, annotation: &Annotation) -> Result<Verdict, CheckError> {
        let bounding_box = BoundingBox::from_annotation(annotation)?;
        let (width, height) = image.dimensions();
        check_bounding_box_area(
            width as u64 * height as u64,
            bounding_box.width,
            bounding_box.height,
        )
    }
}
