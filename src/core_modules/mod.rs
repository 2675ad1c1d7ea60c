pub mod clustering;
pub mod color_palette;
pub mod image_fetcher;
pub mod pixel;
pub mod region;
