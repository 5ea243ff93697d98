use serde::{Deserialize, Serialize};

use crate::ImageSource;

/// Image locations scraped from a source site, in discovery order. Every field may be empty.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawImageSources {
    /// Low-resolution thumbnail known to show the right poster.
    pub small_reference: Option<ImageSource>,
    pub landscape_candidate: Option<ImageSource>,
    /// Full-size images the page itself suggests as the poster.
    pub specific_poster_candidates: Vec<ImageSource>,
    pub other_arts: Vec<ImageSource>,
}

impl RawImageSources {
    pub fn is_empty(&self) -> bool {
        self.small_reference.is_none()
            && self.landscape_candidate.is_none()
            && self.specific_poster_candidates.is_empty()
            && self.other_arts.is_empty()
    }
}
