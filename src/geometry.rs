use poster_finder_common::Crop;

use crate::{definitions::*, GeometryError};

/// Shape bucket of a large candidate image. Picks the matching strategy used on it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Geometry {
    /// Already poster shaped and big enough to use as is.
    PortraitHighQuality,
    /// Close to 4:3. Usually a video frame with black bars at the top and bottom.
    FourThreeLetterboxed,
    /// Two poster panels side by side.
    Wide,
    Standard,
}

pub fn classify(width: u32, height: u32) -> Result<Geometry, GeometryError> {
    if width == 0 || height == 0 {
        return Err(GeometryError::Ambiguous { width, height });
    }

    let ratio = f64::from(width) / f64::from(height);
    let geometry = if is_portrait_high_quality(width, height) {
        Geometry::PortraitHighQuality
    } else if (ratio - FOUR_THREE_RATIO).abs() < FOUR_THREE_TOLERANCE {
        Geometry::FourThreeLetterboxed
    } else if ratio >= WIDE_MIN_RATIO {
        Geometry::Wide
    } else {
        Geometry::Standard
    };

    Ok(geometry)
}

pub fn is_portrait_high_quality(width: u32, height: u32) -> bool {
    width > 0
        && height >= PORTRAIT_MIN_HEIGHT
        && f64::from(height) / f64::from(width) >= PORTRAIT_MIN_RATIO
}

/// DMM package images: the poster is always the rightmost 380 columns.
pub fn is_vendor_strip(width: u32, height: u32) -> bool {
    width == VENDOR_STRIP_WIDTH
        && (VENDOR_STRIP_MIN_HEIGHT..=VENDOR_STRIP_MAX_HEIGHT).contains(&height)
}

pub fn vendor_strip_crop(width: u32, height: u32) -> Option<Crop> {
    if !is_vendor_strip(width, height) {
        return None;
    }
    Crop::full((width, height))?.rightmost(VENDOR_STRIP_POSTER_WIDTH)
}

/// The frame with the letterbox bars removed.
pub fn letterbox_content(crop: &Crop) -> Option<Crop> {
    crop.without_letterbox(LETTERBOX_FRACTION)
}
