use std::path::{Path, PathBuf};

use clap::{value_parser, ArgAction::*};
use poster_finder_lib::*;

use crate::app::*;

// image sources
const SOURCES_FILE: &str = "Sources file";
const REFERENCE: &str = "Reference thumbnail";
const LANDSCAPE: &str = "Landscape candidate";
const POSTER_CANDIDATES: &str = "Poster candidates";
const ARTS: &str = "Other arts";

// title
const LABEL: &str = "Label";
const CODE: &str = "Code";
const SITE: &str = "Site";
const NO_REFERENCE_SITE: &str = "Site publishes no reference";

// override rules
const CROP_RULES: &str = "Crop rules";
const FORCE_REFERENCE: &str = "Force reference labels";
const MAX_FANART: &str = "Maximum fan-art";

// delivery
const MODE: &str = "Delivery mode";
const PROXY_BASE: &str = "Proxy base url";
const SYSTEM_DIR: &str = "Proxy system directory";
const UPLOAD_ENDPOINT: &str = "Upload endpoint";
const UPLOAD_TOKEN: &str = "Upload token";
const IMAGE_ROOT: &str = "Image server root";
const PATH_TEMPLATE: &str = "Path template";
const REWRITE: &str = "Rewrite";

// fetching
const TEMP_DIR: &str = "Temporary directory";
const HTTP_PROXY: &str = "HTTP proxy";
const TIMEOUT: &str = "Timeout";
const REFERENCE_CACHE: &str = "Reference cache file";

// output
const OUTPUT_FORMAT: &str = "Format";

// Arg specification
const ARGS_FILE: &str = "Args file";

//Verbosity
const VERBOSITY_QUIET: &str = "Quiet";
const VERBOSITY_VERBOSE: &str = "Verbose";

const DISPLAY_ORDERING: [&str; 28] = [
    //
    //image sources
    SOURCES_FILE,
    REFERENCE,
    LANDSCAPE,
    POSTER_CANDIDATES,
    ARTS,
    //
    //title
    LABEL,
    CODE,
    SITE,
    NO_REFERENCE_SITE,
    //
    //override rules
    CROP_RULES,
    FORCE_REFERENCE,
    MAX_FANART,
    //
    //delivery
    MODE,
    PROXY_BASE,
    SYSTEM_DIR,
    UPLOAD_ENDPOINT,
    UPLOAD_TOKEN,
    IMAGE_ROOT,
    PATH_TEMPLATE,
    REWRITE,
    //
    //fetching
    TEMP_DIR,
    HTTP_PROXY,
    TIMEOUT,
    REFERENCE_CACHE,
    //
    //outputs
    OUTPUT_FORMAT,
    //
    //verbosity
    VERBOSITY_QUIET,
    VERBOSITY_VERBOSE,
    //argument replacement
    ARGS_FILE,
];

fn build_app() -> clap::Command {
    let get_ordering = |arg_name: &str| -> usize {
        match DISPLAY_ORDERING.iter().position(|x| *x == arg_name) {
            Some(idx) => idx,
            None => {
                panic!("argument not assigned a display order: {arg_name:?}");
            }
        }
    };

    //args are not added through method chaining because rustfmt struggles with very long expressions.
    let mut clap_app = clap::Command::new("Poster finder")
        .version(clap::crate_version!())
        .about("Pick poster, landscape and fan-art images for a title");

    clap_app = clap_app.arg(
        clap::Arg::new(SOURCES_FILE)
            .long("sources")
            .value_parser(value_parser!(PathBuf))
            .num_args(1)
            .conflicts_with_all([REFERENCE, LANDSCAPE, POSTER_CANDIDATES, ARTS])
            .help("A JSON file with the fields small_reference, landscape_candidate, specific_poster_candidates and other_arts")
            .display_order(get_ordering(SOURCES_FILE)),
    );

    clap_app = clap_app.arg(
        clap::Arg::new(REFERENCE)
            .long("reference")
            .num_args(1)
            .help("URL or path of the small thumbnail known to show the right poster")
            .display_order(get_ordering(REFERENCE)),
    );

    clap_app = clap_app.arg(
        clap::Arg::new(LANDSCAPE)
            .long("landscape")
            .num_args(1)
            .help("URL or path of the large landscape image")
            .display_order(get_ordering(LANDSCAPE)),
    );

    clap_app = clap_app.arg(
        clap::Arg::new(POSTER_CANDIDATES)
            .long("poster-candidate")
            .num_args(1..)
            .action(Append)
            .help("Full-size images suggested as the poster, in order of preference")
            .display_order(get_ordering(POSTER_CANDIDATES)),
    );

    clap_app = clap_app.arg(
        clap::Arg::new(ARTS)
            .long("art")
            .num_args(1..)
            .action(Append)
            .help("Any other images published for the title. These become fan-art")
            .display_order(get_ordering(ARTS)),
    );

    clap_app = clap_app.arg(
        clap::Arg::new(LABEL)
            .long("label")
            .required_unless_present(ARGS_FILE)
            .num_args(1)
            .help("Catalog label of the title, such as ABP")
            .display_order(get_ordering(LABEL)),
    );

    clap_app = clap_app.arg(
        clap::Arg::new(CODE)
            .long("code")
            .required_unless_present(ARGS_FILE)
            .num_args(1)
            .help("Catalog number of the title, such as 123")
            .display_order(get_ordering(CODE)),
    );

    clap_app = clap_app.arg(
        clap::Arg::new(SITE)
            .long("site")
            .num_args(1)
            .default_value("generic")
            .help("Identifier of the site the sources were scraped from")
            .display_order(get_ordering(SITE)),
    );

    clap_app = clap_app.arg(
        clap::Arg::new(NO_REFERENCE_SITE)
            .long("no-reference-site")
            .help("The site never publishes a reference thumbnail, so poster-shaped candidates are trusted as-is")
            .action(SetTrue)
            .display_order(get_ordering(NO_REFERENCE_SITE)),
    );

    clap_app = clap_app.arg(
        clap::Arg::new(CROP_RULES)
            .long("crop-rule")
            .num_args(1..)
            .action(Append)
            .help("Always crop titles of a label from one side, written LABEL:l, LABEL:r or LABEL:c")
            .display_order(get_ordering(CROP_RULES)),
    );

    clap_app = clap_app.arg(
        clap::Arg::new(FORCE_REFERENCE)
            .long("force-reference")
            .num_args(1..)
            .value_delimiter(',')
            .action(Append)
            .help("Labels whose reference thumbnail is always used as the poster. Comma separated, e.g '--force-reference FC2,HEYZO'")
            .display_order(get_ordering(FORCE_REFERENCE)),
    );

    clap_app = clap_app.arg(
        clap::Arg::new(MAX_FANART)
            .long("max-fanart")
            .num_args(1)
            .value_parser(value_parser!(usize))
            .default_value("20")
            .display_order(get_ordering(MAX_FANART)),
    );

    clap_app = clap_app.arg(
        clap::Arg::new(MODE)
            .long("mode")
            .help("How the chosen images are delivered. 'none' only prints the decision")
            .value_parser(value_parser!(DeliveryModeArg))
            .default_value("none")
            .num_args(1)
            .display_order(get_ordering(MODE)),
    );

    clap_app = clap_app.arg(
        clap::Arg::new(PROXY_BASE)
            .long("proxy-base")
            .required_if_eq(MODE, "proxy")
            .num_args(1)
            .help("Base URL of the image proxy, e.g http://127.0.0.1:8080/image")
            .display_order(get_ordering(PROXY_BASE)),
    );

    clap_app = clap_app.arg(
        clap::Arg::new(SYSTEM_DIR)
            .long("system-dir")
            .value_parser(value_parser!(PathBuf))
            .num_args(1)
            .help("Directory the image proxy serves local files from")
            .display_order(get_ordering(SYSTEM_DIR)),
    );

    clap_app = clap_app.arg(
        clap::Arg::new(UPLOAD_ENDPOINT)
            .long("upload-endpoint")
            .required_if_eq(MODE, "rehost")
            .num_args(1)
            .help("Files are uploaded with PUT <endpoint>/<file name>")
            .display_order(get_ordering(UPLOAD_ENDPOINT)),
    );

    clap_app = clap_app.arg(
        clap::Arg::new(UPLOAD_TOKEN)
            .long("upload-token")
            .requires(UPLOAD_ENDPOINT)
            .num_args(1)
            .help("Bearer token sent with every upload")
            .display_order(get_ordering(UPLOAD_TOKEN)),
    );

    clap_app = clap_app.arg(
        clap::Arg::new(IMAGE_ROOT)
            .long("image-root")
            .required_if_eq(MODE, "image-server")
            .value_parser(value_parser!(PathBuf))
            .num_args(1)
            .help("Root directory of the local image server")
            .display_order(get_ordering(IMAGE_ROOT)),
    );

    clap_app = clap_app.arg(
        clap::Arg::new(PATH_TEMPLATE)
            .long("path-template")
            .value_parser(PathTemplate::parse)
            .num_args(1)
            .default_value("{LABEL}/{ID}")
            .help("Directory of a title under --image-root. Placeholders: {label} {LABEL} {code} {id} {ID} {id_lower}")
            .display_order(get_ordering(PATH_TEMPLATE)),
    );

    clap_app = clap_app.arg(
        clap::Arg::new(REWRITE)
            .long("rewrite")
            .help("Replace images already saved under --image-root")
            .action(SetTrue)
            .display_order(get_ordering(REWRITE)),
    );

    clap_app = clap_app.arg(
        clap::Arg::new(TEMP_DIR)
            .long("temp-dir")
            .value_parser(value_parser!(PathBuf))
            .num_args(1)
            .help("Where pre-processed posters are kept until they are delivered")
            .display_order(get_ordering(TEMP_DIR)),
    );

    clap_app = clap_app.arg(
        clap::Arg::new(HTTP_PROXY)
            .long("proxy")
            .num_args(1)
            .help("Proxy used for every image download, e.g socks5://127.0.0.1:1080")
            .display_order(get_ordering(HTTP_PROXY)),
    );

    clap_app = clap_app.arg(
        clap::Arg::new(TIMEOUT)
            .long("timeout")
            .num_args(1)
            .value_parser(value_parser!(u64))
            .default_value("20")
            .help("Network timeout in seconds")
            .display_order(get_ordering(TIMEOUT)),
    );

    clap_app = clap_app.arg(
        clap::Arg::new(REFERENCE_CACHE)
            .long("reference-cache")
            .value_parser(value_parser!(PathBuf))
            .num_args(1)
            .help("A file remembering reference thumbnails between runs, for sources that only sometimes publish one")
            .display_order(get_ordering(REFERENCE_CACHE)),
    );

    clap_app = clap_app.arg(
        clap::Arg::new(OUTPUT_FORMAT)
            .long("output-format")
            .help("Whether to output as normal text, or JSON.")
            .value_parser(value_parser!(OutputFormat))
            .default_value("normal")
            .num_args(1)
            .display_order(get_ordering(OUTPUT_FORMAT)),
    );

    clap_app = clap_app.arg(
        clap::Arg::new(ARGS_FILE)
            .long("args-file")
            .value_parser(value_parser!(PathBuf))
            .num_args(1)
            .help("Read command line arguments from a file. If this argument is used it must be the only argument")
            .display_order(get_ordering(ARGS_FILE)),
    );

    clap_app = clap_app.arg(
        clap::Arg::new(VERBOSITY_QUIET)
            .long("quiet")
            .help("Reduced verbosity")
            .conflicts_with(VERBOSITY_VERBOSE)
            .action(SetTrue)
            .display_order(get_ordering(VERBOSITY_QUIET)),
    );

    clap_app = clap_app.arg(
        clap::Arg::new(VERBOSITY_VERBOSE)
            .long("verbose")
            .help("Increased verbosity")
            .conflicts_with(VERBOSITY_QUIET)
            .action(SetTrue)
            .display_order(get_ordering(VERBOSITY_VERBOSE)),
    );

    clap_app
}

pub fn parse_args() -> AppCfg {
    //capture the cwd once, to minimize the risk of working with two values if it is changed by the OS at runtime.
    let cwd = std::env::current_dir()
        .map_err(|e| eyre::Report::msg(e).wrap_err("failed to read the current directory"))
        .unwrap_or_else(|e| print_error_and_quit(e));

    //Start by parsing the provided arguments from the commandline. If the --args-file
    //argument is provided, then we will ignore the true command line arguments and
    //take the arguments from the file instead.
    let args = get_args_from_cmdline_or_file();

    cfg_from_matches(&args, &cwd, default_temp_dir())
}

fn cfg_from_matches(args: &clap::ArgMatches, cwd: &Path, default_temp_dir: PathBuf) -> AppCfg {
    let strings = |id: &str| -> Vec<String> {
        args.get_many::<String>(id)
            .map(|values| values.cloned().collect())
            .unwrap_or_default()
    };
    let string = |id: &str| args.get_one::<String>(id).cloned();
    let path = |id: &str| args.get_one::<PathBuf>(id).map(|p| absolutify_path(cwd, p));

    let sources = match path(SOURCES_FILE) {
        Some(file) => SourcesCfg::File(file),
        None => SourcesCfg::Inline(RawImageSources {
            small_reference: string(REFERENCE).map(|s| ImageSource::parse(&s)),
            landscape_candidate: string(LANDSCAPE).map(|s| ImageSource::parse(&s)),
            specific_poster_candidates: strings(POSTER_CANDIDATES)
                .iter()
                .map(|s| ImageSource::parse(s))
                .collect(),
            other_arts: strings(ARTS).iter().map(|s| ImageSource::parse(s)).collect(),
        }),
    };

    let title = TitleCfg {
        label: string(LABEL).unwrap_or_default(),
        code: string(CODE).unwrap_or_default(),
        site: string(SITE).unwrap_or_else(|| "generic".to_string()),
        no_reference_site: args.get_flag(NO_REFERENCE_SITE),
    };

    let rules = RulesCfg {
        crop_rules: strings(CROP_RULES),
        force_reference: strings(FORCE_REFERENCE),
        max_fanart: args.get_one::<usize>(MAX_FANART).copied().unwrap_or(20),
    };

    let temp_dir = path(TEMP_DIR).unwrap_or(default_temp_dir);

    let delivery = match args
        .get_one::<DeliveryModeArg>(MODE)
        .copied()
        .unwrap_or(DeliveryModeArg::None)
    {
        DeliveryModeArg::None => DeliveryCfg::None,
        DeliveryModeArg::Proxy => DeliveryCfg::Proxy {
            base_url: string(PROXY_BASE).unwrap_or_default(),
            system_dir: path(SYSTEM_DIR).unwrap_or_else(|| temp_dir.join("system")),
        },
        DeliveryModeArg::Rehost => DeliveryCfg::Rehost {
            endpoint: string(UPLOAD_ENDPOINT).unwrap_or_default(),
            token: string(UPLOAD_TOKEN),
        },
        DeliveryModeArg::ImageServer => DeliveryCfg::ImageServer(ImageServerCfg {
            root: path(IMAGE_ROOT).unwrap_or_else(|| cwd.to_path_buf()),
            template: args
                .get_one::<PathTemplate>(PATH_TEMPLATE)
                .cloned()
                .unwrap_or_default(),
            rewrite: args.get_flag(REWRITE),
        }),
    };

    let fetch = FetchCfg {
        temp_dir,
        http_proxy: string(HTTP_PROXY),
        timeout_secs: args.get_one::<u64>(TIMEOUT).copied().unwrap_or(20),
    };

    let verbosity = if args.get_flag(VERBOSITY_QUIET) {
        ReportVerbosity::Quiet
    } else if args.get_flag(VERBOSITY_VERBOSE) {
        ReportVerbosity::Verbose
    } else {
        ReportVerbosity::Default
    };

    let ret = AppCfg {
        sources,
        title,
        rules,
        delivery,
        fetch,

        reference_cache: path(REFERENCE_CACHE),

        output_format: args
            .get_one::<OutputFormat>(OUTPUT_FORMAT)
            .copied()
            .unwrap_or(OutputFormat::Normal),
        verbosity,
    };

    ret
}

//obtain the default temporary directory at runtime.
fn default_temp_dir() -> PathBuf {
    directories_next::ProjectDirs::from("", "poster_finder", "poster_finder")
        .map(|dirs| dirs.cache_dir().join("tmp"))
        .unwrap_or_else(|| std::env::temp_dir().join("poster_finder"))
}

// Arguments are always first read from the command line, but if --args-file
// is present, then arguments are actually located in a file on disk.
// This fn obtains the args from the correct location.
fn get_args_from_cmdline_or_file() -> clap::ArgMatches {
    let cmdline_args = build_app().get_matches();

    match cmdline_args.get_one::<PathBuf>(ARGS_FILE) {
        None => cmdline_args,
        Some(args_path) => get_argsfile_args(args_path),
    }
}

fn get_argsfile_args(argsfile_path: &Path) -> clap::ArgMatches {
    let args = std::fs::read_to_string(argsfile_path)
        .map_err(eyre::Report::msg)
        .and_then(|text| split_args_file(&text))
        .map_err(|e| {
            e.wrap_err(format!(
                "Failed to parse args file at location {}",
                argsfile_path.to_string_lossy()
            ))
        })
        .unwrap_or_else(|e| print_error_and_quit(e));

    //When parsing args from file, the binary name will not be present,
    // so update the parser that we use to not expect it.
    let matches = build_app().no_binary_name(true).get_matches_from(args);
    matches
}

//comment lines are dropped, then the rest is split the way a shell would.
fn split_args_file(text: &str) -> eyre::Result<Vec<String>> {
    let contents = text
        .lines()
        .filter(|line| !line.trim_start().starts_with('#'))
        .collect::<Vec<_>>()
        .join("\n");

    shell_words::split(&contents).map_err(eyre::Report::msg)
}

fn absolutify_path(cwd: &Path, path: &Path) -> PathBuf {
    //get the absolute path if it is not absolute, by prepending the cwd.
    if path.is_relative() {
        cwd.join(path)
    } else {
        path.to_path_buf()
    }
}
