mod app_cfg;
mod app_fns;
mod arg_parse;
mod errors;
mod run_output;

pub(crate) use app_cfg::*;
pub(crate) use errors::*;

use run_output::RunOutput;

pub use app_fns::run_app;
