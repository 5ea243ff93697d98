use std::num::NonZeroU32;

use image::GrayImage;
use poster_finder_common::{crop_resize_buf, Crop};

/// A rectangle of a grayscale image. Hashing a region never copies the full frame.
#[derive(Clone, Copy, Debug)]
pub struct Region<'a> {
    gray: &'a GrayImage,
    crop: Crop,
}

impl<'a> Region<'a> {
    /// `None` if the crop was built for a different resolution.
    pub fn new(gray: &'a GrayImage, crop: Crop) -> Option<Self> {
        (crop.orig_res == gray.dimensions()).then_some(Self { gray, crop })
    }

    /// The entire image. `None` for images with a zero dimension.
    pub fn whole(gray: &'a GrayImage) -> Option<Self> {
        Crop::full(gray.dimensions()).map(|crop| Self { gray, crop })
    }

    pub fn crop(&self) -> Crop {
        self.crop
    }

    pub fn with_crop(&self, crop: Crop) -> Option<Self> {
        Self::new(self.gray, crop)
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.crop.dimensions()
    }

    pub fn aspect_ratio(&self) -> f64 {
        self.crop.aspect_ratio()
    }

    pub fn resized(&self, width: NonZeroU32, height: NonZeroU32) -> GrayImage {
        crop_resize_buf(self.gray, width, height, self.crop)
    }
}
