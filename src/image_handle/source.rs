use std::{
    fmt,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};
use url::{Position, Url};

/// Where an image lives: a remote URL or a local filesystem path.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ImageSource {
    Url(String),
    Path(PathBuf),
}

impl ImageSource {
    /// `http://` and `https://` prefixes (any case) make a URL, anything else is a path.
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        let lower = trimmed.get(..8).unwrap_or(trimmed).to_ascii_lowercase();
        if lower.starts_with("http://") || lower.starts_with("https://") {
            Self::Url(trimmed.to_owned())
        } else {
            Self::Path(PathBuf::from(trimmed))
        }
    }

    pub fn is_remote(&self) -> bool {
        matches!(self, Self::Url(_))
    }

    pub fn as_url(&self) -> Option<&str> {
        match self {
            Self::Url(url) => Some(url),
            Self::Path(_) => None,
        }
    }

    pub fn as_path(&self) -> Option<&Path> {
        match self {
            Self::Url(_) => None,
            Self::Path(path) => Some(path),
        }
    }

    /// Key under which two sources count as the same image: scheme and fragment are
    /// ignored and the host is lower-cased.
    pub fn normalized_key(&self) -> String {
        match self {
            Self::Url(raw) => match Url::parse(raw.trim()) {
                Ok(mut url) => {
                    url.set_fragment(None);
                    url[Position::BeforeHost..].to_owned()
                }
                Err(_) => raw.trim().to_owned(),
            },
            Self::Path(path) => path.to_string_lossy().into_owned(),
        }
    }

    pub fn same_image(&self, other: &Self) -> bool {
        self.normalized_key() == other.normalized_key()
    }
}

impl fmt::Display for ImageSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Url(url) => f.write_str(url),
            Self::Path(path) => write!(f, "{}", path.display()),
        }
    }
}

impl From<String> for ImageSource {
    fn from(raw: String) -> Self {
        Self::parse(&raw)
    }
}

impl From<&str> for ImageSource {
    fn from(raw: &str) -> Self {
        Self::parse(raw)
    }
}

impl From<PathBuf> for ImageSource {
    fn from(path: PathBuf) -> Self {
        Self::Path(path)
    }
}

impl From<ImageSource> for String {
    fn from(source: ImageSource) -> Self {
        source.to_string()
    }
}
