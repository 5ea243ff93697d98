use std::{
    io::{BufWriter, Write},
    path::Path,
    time::{SystemTime, UNIX_EPOCH},
};

use log::debug;
use poster_finder_common::Crop;

use super::{MaterializedPoster, Recipe};
use crate::{encode_jpeg, ImageHandle, MaterializeError};

/// Cuts `crop` out of `handle` and writes it as a JPEG into `temp_dir`.
///
/// File names combine a millisecond timestamp with a random suffix, so concurrent
/// requests sharing `temp_dir` never collide.
pub(crate) fn materialize(
    handle: &ImageHandle,
    crop: Crop,
    recipe: Recipe,
    temp_dir: &Path,
) -> Result<MaterializedPoster, MaterializeError> {
    let (width, height) = handle.dimensions();
    if crop.orig_res != (width, height) {
        return Err(MaterializeError::BadCrop { width, height });
    }

    let io_err = |src| MaterializeError::Io {
        dir: temp_dir.to_path_buf(),
        src,
    };

    std::fs::create_dir_all(temp_dir).map_err(io_err)?;

    let millis = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or_default();

    let mut file = tempfile::Builder::new()
        .prefix(&format!("poster-{millis}-"))
        .suffix(".jpg")
        .tempfile_in(temp_dir)
        .map_err(io_err)?;

    let (x, y, w, h) = crop.as_view_args();
    let cropped = handle.image().crop_imm(x, y, w, h);

    {
        let mut writer = BufWriter::new(file.as_file_mut());
        encode_jpeg(&cropped, &mut writer)?;
        writer.flush().map_err(io_err)?;
    }

    let path = file.into_temp_path();
    debug!(
        "materialized {:?} of {} as {}",
        recipe,
        handle.source(),
        path.display()
    );

    Ok(MaterializedPoster::new(
        path,
        handle.source().clone(),
        recipe,
        crop,
    ))
}
