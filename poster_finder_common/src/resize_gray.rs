use std::num::NonZeroU32;

use image::{imageops, imageops::FilterType, GrayImage};

use crate::Crop;

/// Cut `crop` out of `src_frame` and resample it to `new_width` x `new_height`.
///
/// The crop must have been built for this frame's resolution.
#[must_use]
pub fn crop_resize_buf(
    src_frame: &GrayImage,
    new_width: NonZeroU32,
    new_height: NonZeroU32,
    crop: Crop,
) -> GrayImage {
    debug_assert_eq!(src_frame.dimensions(), crop.orig_res);

    let (left, top, width, height) = crop.as_view_args();
    let cropped = imageops::crop_imm(src_frame, left, top, width, height).to_image();

    imageops::resize(
        &cropped,
        new_width.get(),
        new_height.get(),
        FilterType::Lanczos3,
    )
}
