mod fetch;
mod handle;
mod source;

pub use fetch::{Fetcher, HttpFetcher, HttpFetcherCfg, MemoryFetcher};
pub use handle::{encode_jpeg, ImageHandle, ImageInput, ImageOpener};
pub(crate) use handle::{decode_image, probe_dimensions_of};
pub use source::ImageSource;
