// Changing any of these changes which poster gets picked.

// Hash definitions
pub const HASH_SIZE: u32 = 8;
pub const PHASH_RESIZE: u32 = HASH_SIZE * 4;

// quick_similar
pub const QUICK_ASPECT_TOLERANCE: f64 = 0.1;
pub const DHASH_REJECT_DISTANCE: u32 = 14;
pub const DHASH_ACCEPT_DISTANCE: u32 = 6;
pub const DHASH_PHASH_LIMIT: u32 = 24;

// find_crop_region: ahash + phash distance must be strictly below this.
pub const CROP_MATCH_LIMIT: u32 = 20;

// Geometry buckets
pub const PORTRAIT_MIN_HEIGHT: u32 = 600;
pub const PORTRAIT_MIN_RATIO: f64 = 1.2;
pub const FOUR_THREE_RATIO: f64 = 4.0 / 3.0;
pub const FOUR_THREE_TOLERANCE: f64 = 0.05;
pub const LETTERBOX_FRACTION: f64 = 0.0533;
pub const WIDE_MIN_RATIO: f64 = 1.8;

// DMM package images: 800 wide, 436..=446 high, poster is the rightmost 380 columns.
pub const VENDOR_STRIP_WIDTH: u32 = 800;
pub const VENDOR_STRIP_MIN_HEIGHT: u32 = 436;
pub const VENDOR_STRIP_MAX_HEIGHT: u32 = 446;
pub const VENDOR_STRIP_POSTER_WIDTH: u32 = 380;

/// Width / height of a retail package front cover. Used when a poster has to be cut
/// from a landscape image without a reference thumbnail to copy the framing from.
pub const STANDARD_POSTER_ASPECT: f64 = 379.0 / 538.0;

/// Quality of JPEG files written for pre-processed posters.
pub const JPEG_QUALITY: u8 = 95;

/// Fan-art cap used when no rule configures one.
pub const DEFAULT_MAX_FANART: usize = 20;
