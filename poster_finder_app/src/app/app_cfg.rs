use std::path::PathBuf;

use poster_finder_lib::{ImageServerCfg, RawImageSources};

#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ReportVerbosity {
    Quiet,
    Default,
    Verbose,
}

#[derive(clap::ValueEnum, Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum OutputFormat {
    Normal,
    Json,
}

#[derive(clap::ValueEnum, Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub(super) enum DeliveryModeArg {
    None,
    Proxy,
    Rehost,
    ImageServer,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourcesCfg {
    File(PathBuf),
    Inline(RawImageSources),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TitleCfg {
    pub label: String,
    pub code: String,
    pub site: String,
    pub no_reference_site: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RulesCfg {
    pub crop_rules: Vec<String>,
    pub force_reference: Vec<String>,
    pub max_fanart: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliveryCfg {
    //only print the decision.
    None,
    Proxy {
        base_url: String,
        system_dir: PathBuf,
    },
    Rehost {
        endpoint: String,
        token: Option<String>,
    },
    ImageServer(ImageServerCfg),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchCfg {
    pub temp_dir: PathBuf,
    pub http_proxy: Option<String>,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone)]
pub struct AppCfg {
    pub sources: SourcesCfg,
    pub title: TitleCfg,
    pub rules: RulesCfg,
    pub delivery: DeliveryCfg,
    pub fetch: FetchCfg,

    pub reference_cache: Option<PathBuf>,

    pub output_format: OutputFormat,
    pub verbosity: ReportVerbosity,
}
