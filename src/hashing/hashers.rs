use std::num::NonZeroU32;

use image::Luma;

use super::{
    dct_ops::{dct_2d, top_left_window},
    ImageHash, Region,
};
use crate::definitions::{HASH_SIZE, PHASH_RESIZE};

const fn nonzero(v: u32) -> NonZeroU32 {
    match NonZeroU32::new(v) {
        Some(v) => v,
        None => panic!("zero hash dimension"),
    }
}

const SIDE: NonZeroU32 = nonzero(HASH_SIZE);
const DHASH_WIDTH: NonZeroU32 = nonzero(HASH_SIZE + 1);
const PHASH_SIDE: NonZeroU32 = nonzero(PHASH_RESIZE);

/// Each bit is set when the cell is brighter than the mean of all cells.
pub fn average_hash(region: &Region) -> ImageHash {
    let small = region.resized(SIDE, SIDE);
    let values = small.pixels().map(|Luma([l])| f64::from(*l)).collect::<Vec<_>>();
    let mean = values.iter().sum::<f64>() / values.len() as f64;

    ImageHash::from_bits(values.iter().map(|v| *v > mean))
}

/// Each bit is set when a cell is darker than its right-hand neighbour.
pub fn difference_hash(region: &Region) -> ImageHash {
    let small = region.resized(DHASH_WIDTH, SIDE);

    let bits = small.rows().flat_map(|row| {
        let row = row.map(|Luma([l])| *l).collect::<Vec<_>>();
        row.windows(2).map(|pair| pair[1] > pair[0]).collect::<Vec<_>>()
    });

    ImageHash::from_bits(bits)
}

/// DCT of a 32x32 thumbnail. Each bit of the low-frequency 8x8 corner is set when the
/// coefficient exceeds the corner's median.
pub fn perceptual_hash(region: &Region) -> ImageHash {
    let dimension = PHASH_RESIZE as usize;
    let window = HASH_SIZE as usize;

    let small = region.resized(PHASH_SIDE, PHASH_SIDE);
    let mut values = small.pixels().map(|Luma([l])| f64::from(*l)).collect::<Vec<_>>();
    dct_2d(&mut values, dimension);

    let low_freqs = top_left_window(&values, dimension, window);
    let median = median(&low_freqs);

    ImageHash::from_bits(low_freqs.iter().map(|v| *v > median))
}

fn median(values: &[f64]) -> f64 {
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}

#[cfg(test)]
mod test {
    use image::GrayImage;
    use rand::{rngs::StdRng, Rng, SeedableRng};

    use super::*;

    fn random_blocks(width: u32, height: u32, block: u32, seed: u64) -> GrayImage {
        let mut rng = StdRng::seed_from_u64(seed);
        let cols = width.div_ceil(block);
        let rows = height.div_ceil(block);
        let cells = (0..cols * rows).map(|_| rng.gen::<u8>()).collect::<Vec<_>>();
        GrayImage::from_fn(width, height, |x, y| Luma([cells[((y / block) * cols + x / block) as usize]]))
    }

    fn hashes(img: &GrayImage) -> [ImageHash; 3] {
        let region = Region::whole(img).unwrap();
        [average_hash(&region), difference_hash(&region), perceptual_hash(&region)]
    }

    #[test]
    fn test_horizontal_gradient_dhash_is_all_ones() {
        let img = GrayImage::from_fn(90, 80, |x, _y| Luma([(x * 2) as u8]));
        let region = Region::whole(&img).unwrap();
        assert_eq!(difference_hash(&region).bits(), u64::MAX);
    }

    #[test]
    fn test_top_half_bright_ahash() {
        let img = GrayImage::from_fn(64, 64, |_x, y| if y < 32 { Luma([250]) } else { Luma([5]) });
        let region = Region::whole(&img).unwrap();
        assert_eq!(average_hash(&region).to_hex(), "ffffffff00000000");
    }

    #[test]
    fn test_rescaled_copy_hashes_close() {
        let img = random_blocks(400, 400, 50, 7);
        let smaller = image::imageops::resize(&img, 100, 100, image::imageops::FilterType::Lanczos3);

        for (a, b) in hashes(&img).iter().zip(hashes(&smaller).iter()) {
            assert!(a.distance(b) <= 6, "{a} vs {b}");
        }
    }

    #[test]
    fn test_unrelated_images_hash_far_apart() {
        let a = hashes(&random_blocks(200, 200, 25, 1));
        let b = hashes(&random_blocks(200, 200, 25, 2));

        let total: u32 = a.iter().zip(b.iter()).map(|(a, b)| a.distance(b)).sum();
        assert!(total > 40, "total distance {total}");
    }

    #[test]
    fn test_region_hash_matches_cropped_copy() {
        let img = random_blocks(300, 100, 20, 3);
        let crop = poster_finder_common::Crop::from_topleft_and_dims((300, 100), 200, 0, 100, 100);
        let region = Region::new(&img, crop).unwrap();

        let copy = image::imageops::crop_imm(&img, 200, 0, 100, 100).to_image();
        let whole = Region::whole(&copy).unwrap();

        assert_eq!(perceptual_hash(&region), perceptual_hash(&whole));
        assert_eq!(average_hash(&region), average_hash(&whole));
    }

    #[test]
    fn test_median_even_len() {
        assert_eq!(median(&[4.0, 1.0, 3.0, 2.0]), 2.5);
    }
}
