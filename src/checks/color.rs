// THEORY:
// The background-color check compares what the labeler claimed about a sign's
// background with what the pixels inside the box actually show.
//
// 1.  Crop the box out of the image (fails on out-of-bounds geometry).
// 2.  Split the crop into two color clusters and take the centroid of the larger
//     one as the region's dominant color.
// 3.  Snap the dominant color to the nearest palette entry.
// 4.  Report a warning when the claimed color disagrees with the detected one,
//     or when a label with a known background color (a construction sign is
//     orange) is claimed to have some other color.
//
// Disagreements are warnings, never errors. The check flags a discrepancy
// without deciding which side is wrong, and all discrepancies for one box are
// merged into one verdict.

use super::{AnnotationCheck, Verdict};
use crate::core_modules::clustering::k_means;
use crate::core_modules::color_palette::{ColorLabel, ColorPalette};
use crate::core_modules::pixel::{Color, Pixel};
use crate::core_modules::region::{BoundingBox, Region};
use crate::error::CheckError;
use crate::task::Annotation;
use image::RgbImage;

/// Sign face vs. border/background noise.
pub const CLUSTER_COUNT: usize = 2;

/// Labels whose background color is fixed by convention.
pub const EXPECTED_BACKGROUNDS: &[(&str, ColorLabel)] = &[
    ("construction_sign", ColorLabel::Orange),
    // The back of a sign.
    ("non_visible_face", ColorLabel::Grey),
];

/// The centroid of the largest color cluster inside `bounding_box`.
pub fn dominant_color(image: &RgbImage, bounding_box: &BoundingBox) -> Result<Color, CheckError> {
    let region = Region::crop(image, bounding_box)?;
    let points: Vec<Color> = region.pixels.iter().map(Pixel::computed).collect();
    let clustering = k_means(&points, CLUSTER_COUNT)?;
    Ok(clustering.dominant().centroid)
}

/// Checks the labeled background color of one box against its pixels and
/// against the conventions in `expected_backgrounds`.
pub fn check_background_color(
    image: &RgbImage,
    bounding_box: &BoundingBox,
    asserted_color: Option<&str>,
    label: &str,
    palette: &ColorPalette,
    expected_backgrounds: &[(&str, ColorLabel)],
) -> Result<Verdict, CheckError> {
    let dominant = dominant_color(image, bounding_box)?;
    let (detected, distance) = palette.nearest(&dominant);
    tracing::debug!(
        label,
        detected = %detected,
        distance,
        asserted = asserted_color.unwrap_or(""),
        "matched dominant color"
    );

    let asserted = asserted_color.and_then(|color| color.parse::<ColorLabel>().ok());
    let mut discrepancies = Vec::new();

    if let Some(asserted) = asserted {
        if asserted != detected {
            discrepancies.push(format!(
                "Background color is labeled {asserted} but the dominant color inside the box is {detected}."
            ));
        }
    }

    if let Some((_, expected)) = expected_backgrounds.iter().find(|(name, _)| *name == label) {
        if asserted != Some(*expected) {
            discrepancies.push(format!(
                "A {label} background is usually {expected}, but this box is labeled {}.",
                asserted_color.unwrap_or("without a background color")
            ));
        }
    }

    if discrepancies.is_empty() {
        Ok(Verdict::Pass)
    } else {
        Ok(Verdict::Warning(discrepancies.join(" ")))
    }
}

/// Registered form of [`check_background_color`].
#[derive(Debug, Clone)]
pub struct BackgroundColorCheck {
    palette: ColorPalette,
    expected_backgrounds: &'static [(&'static str, ColorLabel)],
}

impl BackgroundColorCheck {
    pub fn new(
        palette: ColorPalette,
        expected_backgrounds: &'static [(&'static str, ColorLabel)],
    ) -> Self {
        Self {
            palette,
            expected_backgrounds,
        }
    }
}

impl Default for BackgroundColorCheck {
    fn default() -> Self {
        Self::new(ColorPalette::traffic_signs(), EXPECTED_BACKGROUNDS)
    }
}

impl AnnotationCheck for BackgroundColorCheck {
    fn name(&self) -> &'static str {
        "background_color"
    }

    fn check(&self, image: &RgbImage, annotation: &Annotation) -> Result<Verdict, CheckError> {
        let bounding_box = BoundingBox::from_annotation(annotation)?;
        check_background_color(
            image,
            &bounding_box,
            annotation.attributes.background_color.as_deref(),
            &annotation.label,
            &self.palette,
            self.expected_backgrounds,
        )
    }
}
