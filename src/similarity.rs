//! Deciding whether a small reference image shows the same picture as a larger
//! candidate, and which part of the candidate it was cut from.

use log::trace;
use poster_finder_common::{Crop, CropSide};

use crate::{
    definitions::*,
    hashing::{average_hash, difference_hash, perceptual_hash, Region},
    ImageHandle,
};

/// Where in a large image a reference was found.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CropMatch {
    pub side: CropSide,
    /// The matching rectangle, in the large image's coordinates.
    pub crop: Crop,
    /// Average-hash plus perceptual-hash distance.
    pub score: u32,
}

/// Cheap "same picture" test for two regions of roughly the same shape.
///
/// Regions whose aspect ratios differ by more than 0.1 are never similar. Otherwise the
/// difference-hash distance decides, with the perceptual hash breaking ties in the
/// uncertain middle band.
pub fn quick_similar_regions(small: &Region, large: &Region) -> bool {
    let aspect_gap = (small.aspect_ratio() - large.aspect_ratio()).abs();
    if aspect_gap > QUICK_ASPECT_TOLERANCE {
        trace!("quick_similar: aspect ratios differ by {aspect_gap:.3}");
        return false;
    }

    let d = difference_hash(small).distance(&difference_hash(large));
    if d >= DHASH_REJECT_DISTANCE {
        trace!("quick_similar: dhash distance {d}, rejected");
        return false;
    }
    if d <= DHASH_ACCEPT_DISTANCE {
        trace!("quick_similar: dhash distance {d}, accepted");
        return true;
    }

    let p = perceptual_hash(small).distance(&perceptual_hash(large));
    trace!("quick_similar: dhash distance {d}, phash distance {p}");
    d + p < DHASH_PHASH_LIMIT
}

pub fn quick_similar(small: &ImageHandle, large: &ImageHandle) -> bool {
    let small_gray = small.luma();
    let large_gray = large.luma();
    match (Region::whole(&small_gray), Region::whole(&large_gray)) {
        (Some(small), Some(large)) => quick_similar_regions(&small, &large),
        _ => false,
    }
}

/// Searches `large` for the part that `small` was cut from.
///
/// `large` is cropped to the aspect ratio of `small`, anchored right, then left, then
/// centred. The first anchor whose average-hash plus perceptual-hash distance is below
/// the match limit is returned, even if a later anchor would score better.
pub fn find_crop_region_in(small: &Region, large: &Region) -> Option<CropMatch> {
    let (small_w, small_h) = small.dimensions();
    let (large_w, large_h) = large.dimensions();
    if small_w > large_w || small_h > large_h {
        trace!("find_crop_region: {small_w}x{small_h} does not fit in {large_w}x{large_h}");
        return None;
    }

    let small_ahash = average_hash(small);
    let small_phash = perceptual_hash(small);
    let aspect = small.aspect_ratio();

    CropSide::TRIAL_ORDER.into_iter().find_map(|side| {
        let crop = large.crop().anchored_to_aspect(aspect, side)?;
        let candidate = large.with_crop(crop)?;

        let a = small_ahash.distance(&average_hash(&candidate));
        let p = small_phash.distance(&perceptual_hash(&candidate));
        let score = a + p;
        trace!("find_crop_region: {side:?} ahash {a} + phash {p} = {score}");

        (score < CROP_MATCH_LIMIT).then_some(CropMatch { side, crop, score })
    })
}

pub fn find_crop_region(small: &ImageHandle, large: &ImageHandle) -> Option<CropMatch> {
    let small_gray = small.luma();
    let large_gray = large.luma();
    let small = Region::whole(&small_gray)?;
    let large = Region::whole(&large_gray)?;
    find_crop_region_in(&small, &large)
}
