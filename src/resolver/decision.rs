use std::{fmt, path::Path};

use poster_finder_common::{Crop, CropSide};
use serde::{Deserialize, Serialize};
use tempfile::TempPath;

use crate::ImageSource;

/// How the poster has to be processed before it can be shown.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PosterMode {
    None,
    CropLeft,
    CropRight,
    CropCenter,
    LocalFile,
}

impl PosterMode {
    pub fn from_side(side: CropSide) -> Self {
        match side {
            CropSide::Left => Self::CropLeft,
            CropSide::Right => Self::CropRight,
            CropSide::Center => Self::CropCenter,
        }
    }

    pub fn crop_side(self) -> Option<CropSide> {
        match self {
            Self::CropLeft => Some(CropSide::Left),
            Self::CropRight => Some(CropSide::Right),
            Self::CropCenter => Some(CropSide::Center),
            Self::None | Self::LocalFile => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::CropLeft => "crop-left",
            Self::CropRight => "crop-right",
            Self::CropCenter => "crop-center",
            Self::LocalFile => "local-file",
        }
    }
}

impl fmt::Display for PosterMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The pre-processing that produced a materialized poster.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Recipe {
    /// Letterbox bars removed, then cropped towards `side`.
    DeLetterbox { side: CropSide },
    /// One panel of a dual-panel image, centre-cropped to poster shape.
    Half { half: CropSide },
    /// Fixed rightmost strip of a vendor package image.
    VendorStrip,
}

/// A poster written to a temporary JPEG file. The file is deleted when this value drops.
#[derive(Debug)]
pub struct MaterializedPoster {
    path: TempPath,
    origin: ImageSource,
    recipe: Recipe,
    crop: Crop,
}

impl MaterializedPoster {
    pub(crate) fn new(path: TempPath, origin: ImageSource, recipe: Recipe, crop: Crop) -> Self {
        Self {
            path,
            origin,
            recipe,
            crop,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The image the poster was cut from.
    pub fn origin(&self) -> &ImageSource {
        &self.origin
    }

    pub fn recipe(&self) -> Recipe {
        self.recipe
    }

    pub fn crop(&self) -> Crop {
        self.crop
    }

    /// Deletes the file now, reporting failure instead of ignoring it.
    pub fn remove(self) -> std::io::Result<()> {
        self.path.close()
    }
}

//Equality ignores the random temporary file name.
impl PartialEq for MaterializedPoster {
    fn eq(&self, other: &Self) -> bool {
        self.origin == other.origin && self.recipe == other.recipe && self.crop == other.crop
    }
}

#[derive(Debug, PartialEq)]
pub enum Poster {
    /// Use the image exactly as published.
    Verbatim(ImageSource),
    /// Crop `source` to `aspect` (width / height), anchored at `side`, when delivering.
    Cropped {
        source: ImageSource,
        side: CropSide,
        aspect: f64,
    },
    LocalFile(MaterializedPoster),
}

impl Poster {
    pub fn mode(&self) -> PosterMode {
        match self {
            Self::Verbatim(_) => PosterMode::None,
            Self::Cropped { side, .. } => PosterMode::from_side(*side),
            Self::LocalFile(_) => PosterMode::LocalFile,
        }
    }

    /// The published image this poster derives from.
    pub fn origin(&self) -> &ImageSource {
        match self {
            Self::Verbatim(source) | Self::Cropped { source, .. } => source,
            Self::LocalFile(materialized) => materialized.origin(),
        }
    }
}

/// Outcome of [`Resolver::resolve_images`](crate::Resolver::resolve_images).
///
/// Any field may be empty; partial coverage is a normal result.
#[derive(Debug, Default, PartialEq)]
pub struct ImageDecision {
    pub poster: Option<Poster>,
    pub landscape: Option<ImageSource>,
    pub fanart: Vec<ImageSource>,
}

impl ImageDecision {
    pub fn poster_mode(&self) -> PosterMode {
        self.poster.as_ref().map_or(PosterMode::None, Poster::mode)
    }

    /// Where the poster's pixels are: the published image, or the temporary file.
    pub fn poster_source(&self) -> Option<ImageSource> {
        self.poster.as_ref().map(|poster| match poster {
            Poster::Verbatim(source) | Poster::Cropped { source, .. } => source.clone(),
            Poster::LocalFile(materialized) => ImageSource::Path(materialized.path().to_path_buf()),
        })
    }

    /// Set exactly when the poster mode is `local-file`.
    pub fn temporary_file_path(&self) -> Option<&Path> {
        match &self.poster {
            Some(Poster::LocalFile(materialized)) => Some(materialized.path()),
            _ => None,
        }
    }

    /// Deletes the temporary poster file, if any.
    pub fn release(self) -> std::io::Result<()> {
        match self.poster {
            Some(Poster::LocalFile(materialized)) => materialized.remove(),
            _ => Ok(()),
        }
    }
}
