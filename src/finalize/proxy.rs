use std::{
    fs::File,
    path::{Path, PathBuf},
};

use log::info;
use poster_finder_common::CropSide;
use serde::{Deserialize, Serialize};
use url::Url;

use super::{keep_or_log, FinalImages, IdentifierContext};
use crate::{FinalizeError, ImageDecision, ImageSource, Poster};

/// Links are `base_url?url=<source>&site=<site>[&crop=l|r|c]`. Local files are copied
/// into `system_dir` and linked as `base_url?path=<file>&site=system`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProxyCfg {
    pub base_url: String,
    pub site: String,
    pub system_dir: PathBuf,
}

const SYSTEM_SITE: &str = "system";

pub(super) fn deliver(cfg: &ProxyCfg, decision: &ImageDecision, ctx: &IdentifierContext) -> FinalImages {
    let poster = decision.poster.as_ref().and_then(|poster| {
        let link = match poster {
            Poster::Verbatim(source) => link(cfg, source, None, ctx, "poster"),
            Poster::Cropped { source, side, .. } => link(cfg, source, Some(*side), ctx, "poster"),
            Poster::LocalFile(materialized) => copy_into_system_dir(cfg, materialized.path(), ctx, "poster")
                .and_then(|path| system_link(cfg, &path, None)),
        };
        keep_or_log("poster", ctx, link)
    });

    let landscape = decision.landscape.as_ref().and_then(|source| {
        keep_or_log("landscape", ctx, link(cfg, source, None, ctx, "landscape"))
    });

    let fanart = decision
        .fanart
        .iter()
        .filter_map(|source| keep_or_log("fanart", ctx, link(cfg, source, None, ctx, "fanart")))
        .collect();

    FinalImages {
        poster,
        landscape,
        fanart,
    }
}

fn link(
    cfg: &ProxyCfg,
    source: &ImageSource,
    crop: Option<CropSide>,
    ctx: &IdentifierContext,
    role: &str,
) -> Result<String, FinalizeError> {
    match source {
        ImageSource::Url(url) => {
            let mut link = base_url(cfg)?;
            link.query_pairs_mut()
                .append_pair("url", url)
                .append_pair("site", &cfg.site);
            if let Some(side) = crop {
                link.query_pairs_mut().append_pair("crop", &side.code().to_string());
            }
            Ok(link.into())
        }
        ImageSource::Path(path) => {
            let copied = copy_into_system_dir(cfg, path, ctx, role)?;
            system_link(cfg, &copied, crop)
        }
    }
}

fn system_link(cfg: &ProxyCfg, path: &Path, crop: Option<CropSide>) -> Result<String, FinalizeError> {
    let mut link = base_url(cfg)?;
    link.query_pairs_mut()
        .append_pair("path", &path.to_string_lossy())
        .append_pair("site", SYSTEM_SITE);
    if let Some(side) = crop {
        link.query_pairs_mut().append_pair("crop", &side.code().to_string());
    }
    Ok(link.into())
}

fn base_url(cfg: &ProxyCfg) -> Result<Url, FinalizeError> {
    Url::parse(&cfg.base_url).map_err(|e| FinalizeError::ProxyUrl {
        url: cfg.base_url.clone(),
        reason: e.to_string(),
    })
}

/// The proxy only serves local files from `system_dir`, and the resolver's temporary
/// files disappear after finalization, so local images get a persistent copy there.
fn copy_into_system_dir(
    cfg: &ProxyCfg,
    file: &Path,
    ctx: &IdentifierContext,
    role: &str,
) -> Result<PathBuf, FinalizeError> {
    let dir_err = |src| FinalizeError::Io {
        path: cfg.system_dir.clone(),
        src,
    };

    std::fs::create_dir_all(&cfg.system_dir).map_err(dir_err)?;

    let extension = file
        .extension()
        .and_then(|ext| ext.to_str())
        .unwrap_or("jpg");
    let mut target = tempfile::Builder::new()
        .prefix(&format!("{}-{role}-", ctx.id()))
        .suffix(&format!(".{extension}"))
        .tempfile_in(&cfg.system_dir)
        .map_err(dir_err)?;

    let mut source = File::open(file).map_err(|src| FinalizeError::Io {
        path: file.to_path_buf(),
        src,
    })?;
    std::io::copy(&mut source, target.as_file_mut()).map_err(dir_err)?;

    let (_, path) = target.keep().map_err(|e| dir_err(e.error))?;
    info!("{}: copied {} to {}", ctx.id(), file.display(), path.display());
    Ok(path)
}
