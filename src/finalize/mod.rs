//! Turning an [`ImageDecision`] into the concrete strings stored on a metadata record.

mod image_server;
mod proxy;
mod rehost;

use std::io::Cursor;

use image::ImageFormat;
use log::warn;
use poster_finder_common::Crop;
use serde::{Deserialize, Serialize};

pub use image_server::{
    check_user_override_exists, IdentifierContext, ImageServerCfg, PathTemplate,
    LANDSCAPE_FILE, LANDSCAPE_OVERRIDE_FILE, POSTER_FILE, POSTER_OVERRIDE_FILE,
};
pub use proxy::ProxyCfg;
pub use rehost::{HostingBackend, HttpHostingBackend};

use crate::{encode_jpeg, Fetcher, FinalizeError, ImageDecision, ImageOpener, ImageSource, Poster};

/// Where delivered images end up. Chosen by the operator.
pub enum DeliveryMode<'a> {
    /// Links through this system's image proxy.
    Proxy(ProxyCfg),
    /// Copies uploaded to a file host.
    Rehost(&'a dyn HostingBackend),
    /// Files saved under a local image-server root.
    ImageServer(ImageServerCfg),
}

/// Image fields of a metadata record: URLs or filesystem paths.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinalImages {
    pub poster: Option<String>,
    pub landscape: Option<String>,
    pub fanart: Vec<String>,
}

pub struct Finalizer<'a> {
    opener: ImageOpener<'a>,
}

impl<'a> Finalizer<'a> {
    pub fn new(fetcher: &'a dyn Fetcher) -> Self {
        Self {
            opener: ImageOpener::new(fetcher),
        }
    }

    /// Delivers every image of `decision`. A failed image is logged and left out, it
    /// never fails the whole record.
    ///
    /// The decision's temporary poster file is deleted before this returns.
    pub fn finalize(
        &self,
        decision: ImageDecision,
        mode: &DeliveryMode,
        ctx: &IdentifierContext,
    ) -> FinalImages {
        let images = match mode {
            DeliveryMode::Proxy(cfg) => proxy::deliver(cfg, &decision, ctx),
            DeliveryMode::Rehost(backend) => rehost::deliver(self, *backend, &decision, ctx),
            DeliveryMode::ImageServer(cfg) => image_server::deliver(self, cfg, &decision, ctx),
        };

        if let Err(e) = decision.release() {
            warn!("{}: could not delete temporary poster: {e}", ctx.id());
        }

        images
    }

    /// The poster's final pixels as JPEG bytes, with any crop applied.
    fn poster_bytes(&self, poster: &Poster) -> Result<Vec<u8>, FinalizeError> {
        match poster {
            Poster::Verbatim(source) => self.jpeg_bytes(source),

            Poster::Cropped {
                source,
                side,
                aspect,
            } => {
                let handle = self.opener.open(source)?;
                let crop = Crop::full(handle.dimensions())
                    .and_then(|full| full.anchored_to_aspect(*aspect, *side))
                    .ok_or_else(|| FinalizeError::Encode {
                        image: source.clone(),
                        reason: format!("cannot crop to aspect {aspect:.3}"),
                    })?;

                let (x, y, w, h) = crop.as_view_args();
                encode(source, &handle.image().crop_imm(x, y, w, h))
            }

            Poster::LocalFile(materialized) => {
                std::fs::read(materialized.path()).map_err(|src| FinalizeError::Io {
                    path: materialized.path().to_path_buf(),
                    src,
                })
            }
        }
    }

    /// The source's bytes, re-encoded only when they are not JPEG already.
    fn jpeg_bytes(&self, source: &ImageSource) -> Result<Vec<u8>, FinalizeError> {
        let bytes = self.opener.read_bytes(source)?;
        if image::guess_format(&bytes).ok() == Some(ImageFormat::Jpeg) {
            return Ok(bytes);
        }

        let decoded = image::load_from_memory(&bytes).map_err(|e| FinalizeError::Encode {
            image: source.clone(),
            reason: e.to_string(),
        })?;
        encode(source, &decoded)
    }
}

fn encode(source: &ImageSource, image: &image::DynamicImage) -> Result<Vec<u8>, FinalizeError> {
    let mut buf = Cursor::new(vec![]);
    encode_jpeg(image, &mut buf).map_err(|e| FinalizeError::Encode {
        image: source.clone(),
        reason: e.to_string(),
    })?;
    Ok(buf.into_inner())
}

/// Logs a failed image and drops it from the output.
fn keep_or_log(what: &str, ctx: &IdentifierContext, result: Result<String, FinalizeError>) -> Option<String> {
    match result {
        Ok(value) => Some(value),
        Err(e) => {
            warn!("{}: omitting {what}: {e}", ctx.id());
            None
        }
    }
}
