mod dct_ops;
mod hashers;
mod image_hash;
mod region;

pub use hashers::{average_hash, difference_hash, perceptual_hash};
pub use image_hash::ImageHash;
pub use region::Region;
