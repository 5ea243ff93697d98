#![allow(clippy::let_and_return)]
#![deny(clippy::print_stdout)]
#![deny(clippy::print_stderr)]
#![deny(clippy::dbg_macro)]

// #![warn(clippy::cast_possible_truncation)]
// #![warn(clippy::cast_sign_loss)]

mod crop;
mod resize_gray;

pub use crop::{Crop, CropSide};
pub use resize_gray::crop_resize_buf;
