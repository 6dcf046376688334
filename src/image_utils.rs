use image::{DynamicImage, GrayImage, ImageBuffer, Luma, Rgb, RgbImage};

/// 16-bit single channel image buffer
pub type Gray16Image = ImageBuffer<Luma<u16>, Vec<u16>>;

/// Sample depth of a grayscale source image
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BitDepth {
    Eight,
    Sixteen,
}

impl BitDepth {
    pub fn bits(self) -> u32 {
        match self {
            BitDepth::Eight => 8,
            BitDepth::Sixteen => 16,
        }
    }
}

/// A grayscale image with its native bit depth preserved
#[derive(Debug, Clone, PartialEq)]
pub enum SourceImage {
    Gray8(GrayImage),
    Gray16(Gray16Image),
}

impl SourceImage {
    /// Convert a decoded image, keeping 16-bit precision when the source has it.
    /// Colour inputs are reduced to luma explicitly here.
    pub fn from_dynamic(image: DynamicImage) -> Self {
        match image {
            DynamicImage::ImageLuma8(gray) => SourceImage::Gray8(gray),
            DynamicImage::ImageLuma16(gray) => SourceImage::Gray16(gray),
            DynamicImage::ImageLumaA8(_)
            | DynamicImage::ImageRgb8(_)
            | DynamicImage::ImageRgba8(_) => SourceImage::Gray8(image.to_luma8()),
            other => SourceImage::Gray16(other.to_luma16()),
        }
    }

    pub fn dimensions(&self) -> (u32, u32) {
        match self {
            SourceImage::Gray8(img) => img.dimensions(),
            SourceImage::Gray16(img) => img.dimensions(),
        }
    }

    pub fn bit_depth(&self) -> BitDepth {
        match self {
            SourceImage::Gray8(_) => BitDepth::Eight,
            SourceImage::Gray16(_) => BitDepth::Sixteen,
        }
    }

    /// Samples widened to u16 in row-major order
    pub fn samples(&self) -> Vec<u16> {
        match self {
            SourceImage::Gray8(img) => img.as_raw().iter().map(|&v| v as u16).collect(),
            SourceImage::Gray16(img) => img.as_raw().clone(),
        }
    }
}

/// Convert an 8-bit grayscale image into a 3-channel copy for drawing
pub fn gray_to_rgb(image: &GrayImage) -> RgbImage {
    let (width, height) = image.dimensions();
    RgbImage::from_fn(width, height, |x, y| {
        let v = image.get_pixel(x, y)[0];
        Rgb([v, v, v])
    })
}

/// True when every pixel has the same value (or the image is empty)
pub fn is_uniform(image: &GrayImage) -> bool {
    let raw = image.as_raw();
    match raw.first() {
        Some(&first) => raw.iter().all(|&v| v == first),
        None => true,
    }
}

/// Check if a point is inside the image bounds
#[inline]
pub fn in_bounds(x: i32, y: i32, width: u32, height: u32) -> bool {
    x >= 0 && y >= 0 && (x as u32) < width && (y as u32) < height
}
