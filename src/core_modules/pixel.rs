// THEORY:
// The `Pixel` module is the most fundamental unit of the audit's color analysis.
// It holds two representations of color:
//
// 1.  **Pixel**: a "dumb" container for one decoded RGB sample, byte channels
//     exactly as they came out of the image decoder.
// 2.  **Color**: a point in continuous RGB space. Cluster centroids and palette
//     entries are `Color`s, because averaging pixels leaves the byte grid.
//
// The only geometry the audit needs between colors is Euclidean distance in RGB
// space. Comparisons use the squared distance to avoid a `sqrt` per pixel per
// iteration; `distance` is there for reporting.

pub type Channel = u8;
pub type ComputedChannel = f64;
pub type Distance = f64;

/// A single decoded RGB pixel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Pixel {
    /// The red channel value (0-255).
    pub red: Channel,
    /// The green channel value (0-255).
    pub green: Channel,
    /// The blue channel value (0-255).
    pub blue: Channel,
}

impl Pixel {
    pub fn new(red: Channel, green: Channel, blue: Channel) -> Self {
        Pixel { red, green, blue }
    }

    /// The pixel as a point in continuous RGB space (0.0-255.0 per channel).
    pub fn computed(&self) -> Color {
        Color::new(
            self.red as ComputedChannel,
            self.green as ComputedChannel,
            self.blue as ComputedChannel,
        )
    }
}

impl From<image::Rgb<u8>> for Pixel {
    fn from(rgb: image::Rgb<u8>) -> Self {
        let [red, green, blue] = rgb.0;
        Pixel::new(red, green, blue)
    }
}

/// A color in continuous RGB space.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Color {
    pub red: ComputedChannel,
    pub green: ComputedChannel,
    pub blue: ComputedChannel,
}

impl Color {
    pub const fn new(red: ComputedChannel, green: ComputedChannel, blue: ComputedChannel) -> Self {
        Color { red, green, blue }
    }

    pub fn distance_squared(&self, other: &Color) -> Distance {
        let dr = self.red - other.red;
        let dg = self.green - other.green;
        let db = self.blue - other.blue;
        dr * dr + dg * dg + db * db
    }

    /// Euclidean distance in RGB space.
    pub fn distance(&self, other: &Color) -> Distance {
        self.distance_squared(other).sqrt()
    }

    /// The mean of a set of colors, or `None` for an empty set.
    pub fn mean<'a, I>(colors: I) -> Option<Color>
    where
        I: IntoIterator<Item = &'a Color>,
    {
        let mut count = 0usize;
        let mut sum = Color::default();
        for color in colors {
            sum.red += color.red;
            sum.green += color.green;
            sum.blue += color.blue;
            count += 1;
        }
        if count == 0 {
            return None;
        }
        let n = count as ComputedChannel;
        Some(Color::new(sum.red / n, sum.green / n, sum.blue / n))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn distance_is_euclidean() {
        let a = Color::new(0.0, 0.0, 0.0);
        let b = Color::new(3.0, 4.0, 12.0);

        assert_eq!(a.distance_squared(&b), 169.0);
        assert_eq!(a.distance(&b), 13.0);
        assert_eq!(b.distance(&a), 13.0);
    }

    #[test]
    fn pixel_converts_from_decoded_rgb() {
        let pixel = Pixel::from(image::Rgb([255u8, 150, 0]));

        assert_eq!(pixel, Pixel::new(255, 150, 0));
        assert_eq!(pixel.computed(), Color::new(255.0, 150.0, 0.0));
    }

    #[test]
    fn mean_of_empty_set_is_none() {
        assert_eq!(Color::mean(&[] as &[Color]), None);
        let colors = [Color::new(0.0, 10.0, 20.0), Color::new(10.0, 20.0, 40.0)];
        assert_eq!(Color::mean(&colors), Some(Color::new(5.0, 15.0, 30.0)));
    }
}
