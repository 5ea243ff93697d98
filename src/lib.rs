#![allow(clippy::len_without_is_empty)]
#![allow(clippy::module_name_repetitions)]

//! # Overview
//! poster_finder_lib picks the poster, landscape and fan-art images for a title from
//! the image URLs a metadata source published for it.
//!
//! Sources publish their images inconsistently. Some give a small "confirmed" thumbnail
//! and a large package image that contains the poster somewhere inside it. Others give
//! only sample stills. This library compares candidates against the thumbnail with
//! perceptual hashes to find out which large image holds the poster and which part of
//! it to keep.
//!
//! # How it works
//! * Candidates are bucketed by shape: poster shaped, letterboxed 4:3 frames, dual
//!   panel package images and everything else.
//! * The thumbnail is looked for in each candidate with average, difference and
//!   [perceptual](http://hackerfactor.com/blog/index.php%3F/archives/432-Looks-Like-It.html)
//!   hashes, trying the right edge first, then the left edge, then the centre.
//! * Per-site override rules can force a crop side or force the thumbnail itself to be
//!   the poster.
//! * When nothing matches, the thumbnail is used. A title with a thumbnail always gets
//!   a poster.
//!
//! # High Level API
//! ```rust,no_run
//! use poster_finder_lib::*;
//!
//! let fetcher = HttpFetcher::new(&HttpFetcherCfg::default()).unwrap();
//! let sources = RawImageSources {
//!     small_reference: Some(ImageSource::parse("https://example.com/abp123ps.jpg")),
//!     landscape_candidate: Some(ImageSource::parse("https://example.com/abp123pl.jpg")),
//!     ..Default::default()
//! };
//!
//! let resolver = Resolver::new(&fetcher, std::env::temp_dir());
//! let decision = resolver.resolve_images(
//!     &sources,
//!     &OverrideRules::default(),
//!     "ABP",
//!     &SiteProfile::for_site("javbus"),
//! );
//!
//! let mode = DeliveryMode::Proxy(ProxyCfg {
//!     base_url: "http://127.0.0.1:8080/image".to_string(),
//!     site: "javbus".to_string(),
//!     system_dir: std::env::temp_dir(),
//! });
//! let images = Finalizer::new(&fetcher).finalize(decision, &mode, &IdentifierContext::new("ABP", "123"));
//! println!("{:?}", images.poster);
//! ```
//!
//! # Failures
//! Unreachable or undecodable images are skipped with a logged warning, never raised.
//! Only malformed configuration ([`OverrideRules::parse`], [`PathTemplate::parse`])
//! returns an error.

pub(crate) mod definitions;

mod cache;
mod error;
mod finalize;
pub mod geometry;
pub mod hashing;
mod image_handle;
mod resolver;
mod rules;
pub mod similarity;

pub use cache::ReferenceCache;
pub use error::{
    CacheError, FetchError, FinalizeError, GeometryError, ImageOpenError, MaterializeError,
    RulesError,
};
pub use finalize::{
    check_user_override_exists, DeliveryMode, FinalImages, Finalizer, HostingBackend,
    HttpHostingBackend, IdentifierContext, ImageServerCfg, PathTemplate, ProxyCfg,
    LANDSCAPE_FILE, LANDSCAPE_OVERRIDE_FILE, POSTER_FILE, POSTER_OVERRIDE_FILE,
};
pub use image_handle::{
    encode_jpeg, Fetcher, HttpFetcher, HttpFetcherCfg, ImageHandle, ImageInput, ImageOpener,
    ImageSource, MemoryFetcher,
};
pub use poster_finder_common::{Crop, CropSide};
pub use resolver::{
    ImageDecision, MaterializedPoster, Poster, PosterMode, RawImageSources, Recipe, Resolver,
    SiteProfile,
};
pub use rules::OverrideRules;
