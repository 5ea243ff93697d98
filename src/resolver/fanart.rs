use itertools::Itertools;

use super::{Poster, RawImageSources};
use crate::ImageSource;

/// Landscape and other arts in discovery order, without the chosen poster and landscape
/// and without repeats, capped at `max_fanart`.
pub(crate) fn assemble(
    sources: &RawImageSources,
    landscape: Option<&ImageSource>,
    poster: Option<&Poster>,
    max_fanart: usize,
) -> Vec<ImageSource> {
    let excluded = landscape
        .into_iter()
        .chain(poster.map(Poster::origin))
        .map(ImageSource::normalized_key)
        .collect::<Vec<_>>();

    sources
        .landscape_candidate
        .iter()
        .chain(sources.other_arts.iter())
        .filter(|source| !excluded.contains(&source.normalized_key()))
        .unique_by(|source| source.normalized_key())
        .take(max_fanart)
        .cloned()
        .collect()
}
