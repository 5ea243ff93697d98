use std::{
    io::Write,
    path::{Component, Path, PathBuf},
};

use log::info;
use serde::{Deserialize, Serialize};

use super::{keep_or_log, FinalImages, Finalizer};
use crate::{FinalizeError, ImageDecision};

pub const POSTER_FILE: &str = "poster.jpg";
pub const LANDSCAPE_FILE: &str = "landscape.jpg";
pub const POSTER_OVERRIDE_FILE: &str = "poster.user.jpg";
pub const LANDSCAPE_OVERRIDE_FILE: &str = "landscape.user.jpg";

/// A title's canonical identifier, already normalized: `label` is the catalog prefix
/// and `code` the number after it.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IdentifierContext {
    pub label: String,
    pub code: String,
}

impl IdentifierContext {
    pub fn new(label: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            code: code.into(),
        }
    }

    /// `LABEL-code`.
    pub fn id(&self) -> String {
        format!("{}-{}", self.label.to_ascii_uppercase(), self.code)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Field {
    Label,
    LabelUpper,
    Code,
    Id,
    IdUpper,
    IdLower,
}

impl Field {
    fn from_name(name: &str) -> Option<Self> {
        match name {
            "label" => Some(Self::Label),
            "LABEL" => Some(Self::LabelUpper),
            "code" => Some(Self::Code),
            "id" => Some(Self::Id),
            "ID" => Some(Self::IdUpper),
            "id_lower" => Some(Self::IdLower),
            _ => None,
        }
    }

    fn value(self, ctx: &IdentifierContext) -> String {
        match self {
            Self::Label => ctx.label.clone(),
            Self::LabelUpper => ctx.label.to_ascii_uppercase(),
            Self::Code => ctx.code.clone(),
            Self::Id => format!("{}-{}", ctx.label, ctx.code),
            Self::IdUpper => ctx.id().to_ascii_uppercase(),
            Self::IdLower => ctx.id().to_ascii_lowercase(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Field(Field),
}

/// Relative directory layout for a title, such as `{LABEL}/{ID}`.
///
/// Placeholders: `{label}`, `{LABEL}`, `{code}`, `{id}`, `{ID}`, `{id_lower}`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PathTemplate {
    raw: String,
    segments: Vec<Segment>,
}

impl PathTemplate {
    pub fn parse(template: &str) -> Result<Self, FinalizeError> {
        let err = |reason: &str| FinalizeError::PathTemplate {
            template: template.to_string(),
            reason: reason.to_string(),
        };

        if template.trim().is_empty() {
            return Err(err("template is empty"));
        }
        let as_path = Path::new(template);
        if as_path.is_absolute()
            || as_path
                .components()
                .any(|c| matches!(c, Component::ParentDir | Component::Prefix(_)))
        {
            return Err(err("template must be a relative path inside the root"));
        }

        let mut segments = vec![];
        let mut rest = template;
        while !rest.is_empty() {
            match rest.find(['{', '}']) {
                None => {
                    segments.push(Segment::Literal(rest.to_string()));
                    rest = "";
                }
                Some(i) if rest[i..].starts_with('}') => return Err(err("unmatched '}'")),
                Some(i) => {
                    if i > 0 {
                        segments.push(Segment::Literal(rest[..i].to_string()));
                    }
                    let close = rest[i..].find('}').ok_or_else(|| err("unclosed '{'"))? + i;
                    let name = &rest[i + 1..close];
                    let field = Field::from_name(name)
                        .ok_or_else(|| err(&format!("unknown placeholder {{{name}}}")))?;
                    segments.push(Segment::Field(field));
                    rest = &rest[close + 1..];
                }
            }
        }

        Ok(Self {
            raw: template.to_string(),
            segments,
        })
    }

    /// Placeholder values cannot introduce path separators or parent references.
    pub fn render(&self, ctx: &IdentifierContext) -> PathBuf {
        let rendered = self
            .segments
            .iter()
            .map(|segment| match segment {
                Segment::Literal(text) => text.clone(),
                Segment::Field(field) => sanitize(&field.value(ctx)),
            })
            .collect::<String>();
        PathBuf::from(rendered)
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }
}

impl Default for PathTemplate {
    fn default() -> Self {
        Self {
            raw: "{LABEL}/{ID}".to_string(),
            segments: vec![
                Segment::Field(Field::LabelUpper),
                Segment::Literal("/".to_string()),
                Segment::Field(Field::IdUpper),
            ],
        }
    }
}

impl TryFrom<String> for PathTemplate {
    type Error = FinalizeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<PathTemplate> for String {
    fn from(template: PathTemplate) -> Self {
        template.raw
    }
}

fn sanitize(value: &str) -> String {
    let cleaned = value.replace(['/', '\\'], "_");
    if cleaned.is_empty() || cleaned.chars().all(|c| c == '.') {
        "_".to_string()
    } else {
        cleaned
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageServerCfg {
    pub root: PathBuf,
    pub template: PathTemplate,
    /// Replace files that already exist instead of reusing them.
    pub rewrite: bool,
}

impl ImageServerCfg {
    pub fn title_dir(&self, ctx: &IdentifierContext) -> PathBuf {
        self.root.join(self.template.render(ctx))
    }
}

/// True when the operator has put their own poster in place. Callers check this before
/// resolving anything, so such titles skip the pipeline entirely.
pub fn check_user_override_exists(cfg: &ImageServerCfg, ctx: &IdentifierContext) -> bool {
    cfg.title_dir(ctx).join(POSTER_OVERRIDE_FILE).is_file()
}

pub(super) fn deliver(
    finalizer: &Finalizer,
    cfg: &ImageServerCfg,
    decision: &ImageDecision,
    ctx: &IdentifierContext,
) -> FinalImages {
    let dir = cfg.title_dir(ctx);

    let poster_override = dir.join(POSTER_OVERRIDE_FILE);
    let poster = if poster_override.is_file() {
        Some(path_string(&poster_override))
    } else {
        decision.poster.as_ref().and_then(|poster| {
            let saved = save(&dir.join(POSTER_FILE), cfg.rewrite, ctx, || {
                finalizer.poster_bytes(poster)
            });
            keep_or_log("poster", ctx, saved)
        })
    };

    let landscape_override = dir.join(LANDSCAPE_OVERRIDE_FILE);
    let landscape = if landscape_override.is_file() {
        Some(path_string(&landscape_override))
    } else {
        decision.landscape.as_ref().and_then(|source| {
            let saved = save(&dir.join(LANDSCAPE_FILE), cfg.rewrite, ctx, || {
                finalizer.jpeg_bytes(source)
            });
            keep_or_log("landscape", ctx, saved)
        })
    };

    let fanart = decision
        .fanart
        .iter()
        .zip(1..)
        .filter_map(|(source, n)| {
            let saved = save(&dir.join(format!("fanart-{n}.jpg")), cfg.rewrite, ctx, || {
                finalizer.jpeg_bytes(source)
            });
            keep_or_log("fanart", ctx, saved)
        })
        .collect();

    FinalImages {
        poster,
        landscape,
        fanart,
    }
}

//Existing files are reused without fetching anything, unless `rewrite` is set.
fn save(
    path: &Path,
    rewrite: bool,
    ctx: &IdentifierContext,
    bytes: impl FnOnce() -> Result<Vec<u8>, FinalizeError>,
) -> Result<String, FinalizeError> {
    if path.is_file() && !rewrite {
        info!("{}: keeping existing {}", ctx.id(), path.display());
        return Ok(path_string(path));
    }

    let bytes = bytes()?;
    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    let io_err = |src| FinalizeError::Io {
        path: path.to_path_buf(),
        src,
    };

    std::fs::create_dir_all(dir).map_err(io_err)?;
    let mut staged = tempfile::NamedTempFile::new_in(dir).map_err(io_err)?;
    staged.write_all(&bytes).map_err(io_err)?;
    staged.persist(path).map_err(|e| io_err(e.error))?;

    info!("{}: wrote {}", ctx.id(), path.display());
    Ok(path_string(path))
}

fn path_string(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}
