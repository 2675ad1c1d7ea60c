// THEORY:
// The `Region` module bridges a labeler's bounding box and the pixels it covers.
//
// 1.  **BoundingBox**: whole-pixel box geometry derived from an `Annotation`.
//     Fractional offsets from the service are truncated toward zero. A box must
//     have a positive width and height; its offsets may still be negative or run
//     past the image, which only matters once we try to crop.
// 2.  **Region**: like a `Chunk`, a "dumb" data container holding a rectangular
//     block of pixels in row-major order. Cropping is the only way to build one,
//     and cropping refuses any box that does not lie fully inside the image.

use crate::core_modules::pixel::Pixel;
use crate::error::CheckError;
use crate::task::Annotation;
use image::RgbImage;

/// Whole-pixel box geometry, origin top-left.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoundingBox {
    pub left: i64,
    pub top: i64,
    pub width: u32,
    pub height: u32,
}

impl BoundingBox {
    pub fn new(left: i64, top: i64, width: u32, height: u32) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    /// Builds the box from an annotation's offsets, failing on a non-positive
    /// or non-finite size.
    pub fn from_annotation(annotation: &Annotation) -> Result<Self, CheckError> {
        let whole = |value: f64, what: &str| -> Result<i64, CheckError> {
            if value.is_finite() {
                Ok(value.trunc() as i64)
            } else {
                Err(CheckError::InvalidGeometry(format!(
                    "bounding box {what} is not a finite number"
                )))
            }
        };

        let left = whole(annotation.left, "left")?;
        let top = whole(annotation.top, "top")?;
        let width = whole(annotation.width, "width")?;
        let height = whole(annotation.height, "height")?;

        if width <= 0 || height <= 0 {
            return Err(CheckError::InvalidGeometry(format!(
                "bounding box size {width}x{height} is not positive"
            )));
        }
        let size = |value: i64| {
            u32::try_from(value).map_err(|_| {
                CheckError::InvalidGeometry(format!("bounding box dimension {value} is too large"))
            })
        };

        Ok(Self::new(left, top, size(width)?, size(height)?))
    }

    pub fn area(&self) -> u64 {
        self.width as u64 * self.height as u64
    }

    /// Whether the box lies fully inside an image of the given dimensions.
    pub fn fits_within(&self, image_width: u32, image_height: u32) -> bool {
        let fits = |offset: i64, size: u32, limit: u32| {
            offset >= 0
                && offset
                    .checked_add(size as i64)
                    .is_some_and(|end| end <= limit as i64)
        };
        fits(self.left, self.width, image_width) && fits(self.top, self.height, image_height)
    }
}

/// A rectangular block of pixels cut out of an image.
#[derive(Debug)]
pub struct Region {
    /// The width of the region in pixels.
    pub width: u32,
    /// The height of the region in pixels.
    pub height: u32,
    /// The region's pixels, flattened row by row.
    pub pixels: Vec<Pixel>,
}

impl Region {
    /// Crops `[top, top + height) x [left, left + width)` out of `image`.
    pub fn crop(image: &RgbImage, bounding_box: &BoundingBox) -> Result<Self, CheckError> {
        let (image_width, image_height) = image.dimensions();
        if !bounding_box.fits_within(image_width, image_height) {
            return Err(CheckError::InvalidGeometry(format!(
                "bounding box (left {}, top {}, {}x{}) exceeds image bounds {}x{}",
                bounding_box.left,
                bounding_box.top,
                bounding_box.width,
                bounding_box.height,
                image_width,
                image_height,
            )));
        }

        // In bounds, so both offsets are non-negative and fit in u32.
        let left = bounding_box.left as u32;
        let top = bounding_box.top as u32;

        let mut pixels = Vec::with_capacity(bounding_box.area() as usize);
        for y in top..top + bounding_box.height {
            for x in left..left + bounding_box.width {
                pixels.push(Pixel::from(*image.get_pixel(x, y)));
            }
        }

        Ok(Self {
            width: bounding_box.width,
            height: bounding_box.height,
            pixels,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::Attributes;
    use assert_matches::assert_matches;

    fn annotation(left: f64, top: f64, width: f64, height: f64) -> Annotation {
        Annotation {
            uuid: "box".into(),
            label: "stop_sign".into(),
            left,
            top,
            width,
            height,
            attributes: Attributes::default(),
        }
    }

    #[test]
    fn fractional_offsets_are_truncated() {
        let bounding_box =
            BoundingBox::from_annotation(&annotation(10.9, 4.2, 20.7, 8.0)).expect("valid box");

        assert_eq!(bounding_box, BoundingBox::new(10, 4, 20, 8));
        assert_eq!(bounding_box.area(), 160);
    }

    #[test]
    fn non_positive_size_is_invalid_geometry() {
        assert_matches!(
            BoundingBox::from_annotation(&annotation(0.0, 0.0, 0.0, 10.0)),
            Err(CheckError::InvalidGeometry(_))
        );
        assert_matches!(
            BoundingBox::from_annotation(&annotation(0.0, 0.0, 10.0, -3.0)),
            Err(CheckError::InvalidGeometry(_))
        );
        assert_matches!(
            BoundingBox::from_annotation(&annotation(f64::NAN, 0.0, 10.0, 10.0)),
            Err(CheckError::InvalidGeometry(_))
        );
    }

    #[test]
    fn crop_reads_rows_in_order() {
        let image = RgbImage::from_fn(4, 3, |x, y| image::Rgb([x as u8, y as u8, 0]));
        let region = Region::crop(&image, &BoundingBox::new(1, 1, 2, 2)).expect("in bounds");

        assert_eq!(region.width, 2);
        assert_eq!(region.height, 2);
        assert_eq!(
            region.pixels,
            vec![
                Pixel::new(1, 1, 0),
                Pixel::new(2, 1, 0),
                Pixel::new(1, 2, 0),
                Pixel::new(2, 2, 0),
            ]
        );
    }

    #[test]
    fn crop_touching_the_far_edge_is_allowed() {
        let image = RgbImage::new(10, 10);
        let region = Region::crop(&image, &BoundingBox::new(5, 5, 5, 5)).expect("in bounds");

        assert_eq!(region.pixels.len(), 25);
    }

    #[test]
    fn crop_outside_image_is_invalid_geometry() {
        let image = RgbImage::new(10, 10);

        assert_matches!(
            Region::crop(&image, &BoundingBox::new(6, 0, 5, 5)),
            Err(CheckError::InvalidGeometry(_))
        );
        assert_matches!(
            Region::crop(&image, &BoundingBox::new(-1, 0, 5, 5)),
            Err(CheckError::InvalidGeometry(_))
        );
    }

    #[test]
    fn huge_offsets_are_invalid_geometry() {
        let image = RgbImage::new(100, 100);
        let bounding_box =
            BoundingBox::from_annotation(&annotation(1e19, 0.0, 10.0, 10.0)).expect("valid size");

        assert_eq!(bounding_box.left, i64::MAX);
        assert!(!bounding_box.fits_within(100, 100));
        assert_matches!(
            Region::crop(&image, &bounding_box),
            Err(CheckError::InvalidGeometry(_))
        );
        assert_matches!(
            Region::crop(&image, &BoundingBox::new(0, i64::MAX - 5, 10, 10)),
            Err(CheckError::InvalidGeometry(_))
        );
    }
}
