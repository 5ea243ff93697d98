//! The poster search, one function per decision step. Every step either produces a
//! poster or hands over to the next one.

use std::{cell::RefCell, collections::HashMap, path::Path, rc::Rc};

use image::GrayImage;
use itertools::Itertools;
use log::{debug, trace, warn};
use poster_finder_common::{Crop, CropSide};

use super::{materialize::materialize, Poster, RawImageSources, Recipe};
use crate::{
    definitions::STANDARD_POSTER_ASPECT,
    geometry::{self, Geometry},
    hashing::Region,
    image_handle::{decode_image, probe_dimensions_of},
    similarity::{find_crop_region_in, quick_similar_regions, CropMatch},
    ImageHandle, ImageOpener, ImageSource, OverrideRules,
};

/// State for a single resolution. Every source is fetched at most once, keyed by its
/// normalized form; a failed fetch is remembered as `None`.
pub(super) struct ResolveRun<'r> {
    opener: ImageOpener<'r>,
    temp_dir: &'r Path,
    fetched: RefCell<HashMap<String, Option<Rc<[u8]>>>>,
}

impl<'r> ResolveRun<'r> {
    pub(super) fn new(opener: ImageOpener<'r>, temp_dir: &'r Path) -> Self {
        Self {
            opener,
            temp_dir,
            fetched: RefCell::new(HashMap::new()),
        }
    }

    pub(super) fn reference_as_poster(
        &self,
        rules: &OverrideRules,
        label: &str,
        reference: Option<&ImageSource>,
    ) -> Option<Poster> {
        if !rules.forces_reference(label) {
            return None;
        }
        let reference = reference?;
        debug!("{label}: reference forced as poster");
        Some(Poster::Verbatim(reference.clone()))
    }

    pub(super) fn forced_crop(
        &self,
        rules: &OverrideRules,
        label: &str,
        sources: &RawImageSources,
    ) -> Option<Poster> {
        let side = rules.forced_crop(label)?;
        let landscape = sources.landscape_candidate.as_ref()?;
        debug!("{label}: crop {side:?} forced on {landscape}");
        Some(Poster::Cropped {
            source: landscape.clone(),
            side,
            aspect: STANDARD_POSTER_ASPECT,
        })
    }

    pub(super) fn vendor_strip(&self, sources: &RawImageSources) -> Option<Poster> {
        let landscape = sources.landscape_candidate.as_ref()?;
        let (width, height) = self.probe_or_skip(landscape)?;
        let crop = geometry::vendor_strip_crop(width, height)?;

        debug!("{landscape}: vendor package image, using the rightmost strip");
        let handle = self.open_or_skip(landscape)?;
        self.materialize_or_skip(&handle, crop, Recipe::VendorStrip)
    }

    /// For sites without a reference thumbnail: trust poster-shaped candidates, otherwise
    /// derive a poster from the landscape image by its shape alone.
    pub(super) fn referenceless(&self, sources: &RawImageSources) -> Option<Poster> {
        let portrait = sources.specific_poster_candidates.iter().find(|candidate| {
            self.probe_or_skip(candidate)
                .is_some_and(|(w, h)| geometry::is_portrait_high_quality(w, h))
        });

        if let Some(portrait) = portrait {
            debug!("{portrait}: portrait candidate used without comparison");
            return Some(Poster::Verbatim(portrait.clone()));
        }

        let landscape = sources.landscape_candidate.as_ref()?;
        let handle = self.open_or_skip(landscape)?;
        let (width, height) = handle.dimensions();
        let full = Crop::full((width, height))?;

        match self.classify_or_skip(landscape, width, height)? {
            Geometry::PortraitHighQuality => Some(Poster::Verbatim(landscape.clone())),

            Geometry::FourThreeLetterboxed => {
                let crop = geometry::letterbox_content(&full)?
                    .anchored_to_aspect(STANDARD_POSTER_ASPECT, CropSide::Right)?;
                let recipe = Recipe::DeLetterbox {
                    side: CropSide::Right,
                };
                self.materialize_or_skip(&handle, crop, recipe)
            }

            Geometry::Wide => {
                let crop = full
                    .half(CropSide::Right)?
                    .anchored_to_aspect(STANDARD_POSTER_ASPECT, CropSide::Center)?;
                let recipe = Recipe::Half {
                    half: CropSide::Right,
                };
                self.materialize_or_skip(&handle, crop, recipe)
            }

            Geometry::Standard => Some(Poster::Cropped {
                source: landscape.clone(),
                side: CropSide::Right,
                aspect: STANDARD_POSTER_ASPECT,
            }),
        }
    }

    /// Compares candidates against the reference. Falls back to the reference itself, so
    /// this step always produces a poster.
    pub(super) fn reference_present(
        &self,
        sources: &RawImageSources,
        reference: &ImageSource,
    ) -> Option<Poster> {
        let matched = self.open_or_skip(reference).and_then(|reference_handle| {
            let reference_gray = reference_handle.luma();
            let reference_region = Region::whole(&reference_gray)?;

            self.similar_portrait(sources, &reference_region)
                .or_else(|| self.crop_of_candidate(sources, &reference_region))
        });

        matched.or_else(|| {
            debug!("no candidate matched, falling back to reference {reference}");
            Some(Poster::Verbatim(reference.clone()))
        })
    }

    fn similar_portrait(&self, sources: &RawImageSources, reference: &Region) -> Option<Poster> {
        let candidates = sources
            .specific_poster_candidates
            .iter()
            .chain(sources.landscape_candidate.iter())
            .unique_by(|source| source.normalized_key());

        for candidate in candidates {
            let Some((width, height)) = self.probe_or_skip(candidate) else {
                continue;
            };
            if !geometry::is_portrait_high_quality(width, height) {
                continue;
            }

            let Some(handle) = self.open_or_skip(candidate) else {
                continue;
            };
            let gray = handle.luma();
            let similar = Region::whole(&gray)
                .is_some_and(|region| quick_similar_regions(reference, &region));

            if similar {
                debug!("{candidate}: portrait candidate matches reference");
                return Some(Poster::Verbatim(candidate.clone()));
            }
        }

        None
    }

    fn crop_of_candidate(&self, sources: &RawImageSources, reference: &Region) -> Option<Poster> {
        let candidates = sources
            .landscape_candidate
            .iter()
            .chain(sources.other_arts.iter())
            .unique_by(|source| source.normalized_key());

        for candidate in candidates {
            let Some(handle) = self.open_or_skip(candidate) else {
                continue;
            };
            let (width, height) = handle.dimensions();
            let Some(geometry) = self.classify_or_skip(candidate, width, height) else {
                continue;
            };
            let gray = handle.luma();
            let Some(full) = Region::whole(&gray) else {
                continue;
            };

            trace!("{candidate}: {width}x{height} classified {geometry:?}");
            let poster = match geometry {
                Geometry::PortraitHighQuality => quick_similar_regions(reference, &full)
                    .then(|| Poster::Verbatim(candidate.clone())),
                Geometry::Standard => find_crop_region_in(reference, &full)
                    .map(|found| cropped_poster(candidate, found, reference)),
                Geometry::FourThreeLetterboxed => {
                    self.letterboxed_match(&handle, &gray, reference)
                }
                Geometry::Wide => self.dual_panel_match(&handle, &gray, reference),
            };

            if let Some(poster) = poster {
                debug!("{candidate}: matched reference as {}", poster.mode());
                return Some(poster);
            }
        }

        None
    }

    //Full frame first, then the frame without its letterbox bars.
    fn letterboxed_match(
        &self,
        handle: &ImageHandle,
        gray: &GrayImage,
        reference: &Region,
    ) -> Option<Poster> {
        let full = Region::whole(gray)?;
        if let Some(found) = find_crop_region_in(reference, &full) {
            return Some(cropped_poster(handle.source(), found, reference));
        }

        let content = full.with_crop(geometry::letterbox_content(&full.crop())?)?;
        let found = find_crop_region_in(reference, &content)?;
        let recipe = Recipe::DeLetterbox { side: found.side };
        self.materialize_or_skip(handle, found.crop, recipe)
    }

    //Full frame first, then each panel on its own, right before left.
    fn dual_panel_match(
        &self,
        handle: &ImageHandle,
        gray: &GrayImage,
        reference: &Region,
    ) -> Option<Poster> {
        let full = Region::whole(gray)?;
        if let Some(found) = find_crop_region_in(reference, &full) {
            return Some(cropped_poster(handle.source(), found, reference));
        }

        [CropSide::Right, CropSide::Left].into_iter().find_map(|half| {
            let crop = full
                .crop()
                .half(half)?
                .anchored_to_aspect(reference.aspect_ratio(), CropSide::Center)?;
            let panel = full.with_crop(crop)?;

            if !quick_similar_regions(reference, &panel) {
                trace!("{}: {half:?} panel does not match", handle.source());
                return None;
            }
            self.materialize_or_skip(handle, crop, Recipe::Half { half })
        })
    }

    fn bytes_or_skip(&self, source: &ImageSource) -> Option<Rc<[u8]>> {
        let key = source.normalized_key();
        if let Some(known) = self.fetched.borrow().get(&key) {
            return known.clone();
        }

        let bytes: Option<Rc<[u8]>> = self
            .opener
            .fetch(source)
            .map(Rc::from)
            .map_err(|e| warn!("skipping candidate: {e}"))
            .ok();
        self.fetched.borrow_mut().insert(key, bytes.clone());
        bytes
    }

    fn open_or_skip(&self, source: &ImageSource) -> Option<ImageHandle> {
        let bytes = self.bytes_or_skip(source)?;
        decode_image(source.clone(), &bytes)
            .map_err(|e| warn!("skipping candidate: {e}"))
            .ok()
    }

    fn probe_or_skip(&self, source: &ImageSource) -> Option<(u32, u32)> {
        let bytes = self.bytes_or_skip(source)?;
        probe_dimensions_of(source, &bytes)
            .map_err(|e| warn!("skipping candidate: {e}"))
            .ok()
    }

    fn classify_or_skip(&self, source: &ImageSource, width: u32, height: u32) -> Option<Geometry> {
        geometry::classify(width, height)
            .map_err(|e| warn!("skipping candidate {source}: {e}"))
            .ok()
    }

    fn materialize_or_skip(
        &self,
        handle: &ImageHandle,
        crop: Crop,
        recipe: Recipe,
    ) -> Option<Poster> {
        materialize(handle, crop, recipe, self.temp_dir)
            .map(Poster::LocalFile)
            .map_err(|e| warn!("could not pre-process poster from {}: {e}", handle.source()))
            .ok()
    }
}

//A crop covering the whole candidate needs no processing.
fn cropped_poster(source: &ImageSource, found: CropMatch, reference: &Region) -> Poster {
    if found.crop.is_uncropped() {
        Poster::Verbatim(source.clone())
    } else {
        Poster::Cropped {
            source: source.clone(),
            side: found.side,
            aspect: reference.aspect_ratio(),
        }
    }
}
