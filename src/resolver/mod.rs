mod decision;
mod fanart;
mod materialize;
mod raw_sources;
mod site;
mod steps;

use std::path::PathBuf;

use log::debug;

pub use decision::{ImageDecision, MaterializedPoster, Poster, PosterMode, Recipe};
pub use raw_sources::RawImageSources;
pub use site::SiteProfile;

use steps::ResolveRun;

use crate::{Fetcher, ImageOpener, ImageSource, OverrideRules, ReferenceCache};

/// Picks poster, landscape and fan-art for one title.
///
/// Candidates are fetched one at a time, strictly in the documented order, and the
/// search stops at the first success. Within one call each source is downloaded at
/// most once.
pub struct Resolver<'a> {
    opener: ImageOpener<'a>,
    temp_dir: PathBuf,
    reference_cache: Option<(&'a ReferenceCache, String)>,
}

impl<'a> Resolver<'a> {
    /// Pre-processed posters are written into `temp_dir`, which is created on demand.
    pub fn new(fetcher: &'a dyn Fetcher, temp_dir: impl Into<PathBuf>) -> Self {
        Self {
            opener: ImageOpener::new(fetcher),
            temp_dir: temp_dir.into(),
            reference_cache: None,
        }
    }

    /// Look up and record reference thumbnails for `identifier` in `cache`.
    #[must_use]
    pub fn with_reference_cache(mut self, cache: &'a ReferenceCache, identifier: &str) -> Self {
        self.reference_cache = Some((cache, identifier.to_string()));
        self
    }

    /// Never fails: an unusable candidate is skipped and an absent poster is a valid result.
    pub fn resolve_images(
        &self,
        sources: &RawImageSources,
        rules: &OverrideRules,
        label: &str,
        site: &SiteProfile,
    ) -> ImageDecision {
        let reference = self.effective_reference(sources);
        let reference_less_flow = !site.publishes_reference || reference.is_none();

        let run = ResolveRun::new(self.opener, &self.temp_dir);
        let poster = run
            .reference_as_poster(rules, label, reference.as_ref())
            .or_else(|| run.forced_crop(rules, label, sources))
            .or_else(|| site.vendor_strip.then(|| run.vendor_strip(sources)).flatten())
            .or_else(|| reference_less_flow.then(|| run.referenceless(sources)).flatten())
            .or_else(|| {
                reference
                    .as_ref()
                    .and_then(|reference| run.reference_present(sources, reference))
            });

        match &poster {
            Some(poster) => debug!("{label}: poster {} ({})", poster.origin(), poster.mode()),
            None => debug!("{label}: no poster found"),
        }

        let landscape = sources.landscape_candidate.clone();
        let fanart = fanart::assemble(
            sources,
            landscape.as_ref(),
            poster.as_ref(),
            rules.max_fanart_count(),
        );

        ImageDecision {
            poster,
            landscape,
            fanart,
        }
    }

    fn effective_reference(&self, sources: &RawImageSources) -> Option<ImageSource> {
        let (cache, identifier) = match &self.reference_cache {
            Some((cache, identifier)) => (*cache, identifier.as_str()),
            None => return sources.small_reference.clone(),
        };

        match &sources.small_reference {
            Some(reference) => {
                cache.remember(identifier, reference.clone());
                Some(reference.clone())
            }
            None => {
                let cached = cache.get(identifier);
                if let Some(cached) = &cached {
                    debug!("{identifier}: using cached reference {cached}");
                }
                cached
            }
        }
    }
}
