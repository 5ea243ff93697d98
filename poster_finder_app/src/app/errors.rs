use std::path::PathBuf;

use poster_finder_lib::*;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    /////////////////////////////////
    //inputs
    #[error("Failed to read image sources from {path}: {src}")]
    SourcesRead { path: PathBuf, src: std::io::Error },

    #[error("Image sources in {path} are not valid JSON: {src}")]
    SourcesParse {
        path: PathBuf,
        src: serde_json::Error,
    },

    /////////////////////////////////
    //configuration
    #[error(transparent)]
    Rules(#[from] RulesError),

    #[error("Failed to build the HTTP client: {0}")]
    Fetcher(#[from] FetchError),

    /////////////////////////////////
    //reference cache
    #[error(transparent)]
    Cache(#[from] CacheError),
}

pub fn print_error_and_quit(e: eyre::Report) -> ! {
    #[allow(clippy::print_stderr)]
    let () = eprintln!("{:?}", e);
    std::process::exit(1);
}
