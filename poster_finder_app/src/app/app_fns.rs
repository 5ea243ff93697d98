use std::path::Path;

use poster_finder_lib::*;

use crate::app::*;

// * read cfg
// * short-circuit on a user override
// * load sources and rules
// * resolve
// * deliver
// * output results

pub fn run_app() -> i32 {
    let cfg = arg_parse::parse_args();
    configure_logs(cfg.verbosity);

    let ret = match run_app_inner(&cfg) {
        Ok(()) => 0,
        Err(fatal_error) => {
            print_fatal_err(&fatal_error, cfg.verbosity);
            1
        }
    };

    ret
}

fn run_app_inner(cfg: &AppCfg) -> eyre::Result<()> {
    let output = resolve_and_deliver(cfg)?;
    print_output(&output, cfg.output_format)
}

fn resolve_and_deliver(cfg: &AppCfg) -> eyre::Result<RunOutput> {
    let ctx = IdentifierContext::new(&cfg.title.label, &cfg.title.code);

    //a poster put in place by hand means there is nothing to resolve.
    if let DeliveryCfg::ImageServer(server_cfg) = &cfg.delivery {
        if check_user_override_exists(server_cfg, &ctx) {
            info!("{}: user poster present, skipping", ctx.id());
            let poster = server_cfg.title_dir(&ctx).join(POSTER_OVERRIDE_FILE);
            let images = FinalImages {
                poster: Some(poster.to_string_lossy().into_owned()),
                ..Default::default()
            };
            return Ok(RunOutput::Delivered(images));
        }
    }

    let sources = load_sources(&cfg.sources)?;
    let rules = OverrideRules::parse(
        &cfg.rules.crop_rules.join("\n"),
        &cfg.rules.force_reference.join(","),
        cfg.rules.max_fanart,
    )
    .map_err(AppError::from)?;

    let mut site = SiteProfile::for_site(&cfg.title.site);
    if cfg.title.no_reference_site {
        site = site.without_reference();
    }

    let fetcher = HttpFetcher::new(&HttpFetcherCfg {
        timeout_secs: cfg.fetch.timeout_secs,
        proxy: cfg.fetch.http_proxy.clone(),
        ..Default::default()
    })
    .map_err(AppError::from)?;

    let reference_cache = match &cfg.reference_cache {
        Some(path) => Some(ReferenceCache::load(path).map_err(AppError::from)?),
        None => None,
    };

    let mut resolver = Resolver::new(&fetcher, &cfg.fetch.temp_dir);
    if let Some(cache) = &reference_cache {
        resolver = resolver.with_reference_cache(cache, &ctx.id());
    }
    let decision = resolver.resolve_images(&sources, &rules, &cfg.title.label, &site);

    if let (Some(cache), Some(path)) = (&reference_cache, &cfg.reference_cache) {
        //losing the cache only costs a future lookup.
        if let Err(e) = cache.save(path) {
            warn!("{e}");
        }
    }

    let backend;
    let mode = match &cfg.delivery {
        DeliveryCfg::None => {
            let output = RunOutput::from_decision(&decision);
            //dropping the decision removes any temporary poster.
            drop(decision);
            return Ok(output);
        }
        DeliveryCfg::Proxy {
            base_url,
            system_dir,
        } => DeliveryMode::Proxy(ProxyCfg {
            base_url: base_url.clone(),
            site: site.id.clone(),
            system_dir: system_dir.clone(),
        }),
        DeliveryCfg::Rehost { endpoint, token } => {
            backend = HttpHostingBackend::new(endpoint, token.clone(), cfg.fetch.timeout_secs);
            DeliveryMode::Rehost(&backend)
        }
        DeliveryCfg::ImageServer(server_cfg) => DeliveryMode::ImageServer(server_cfg.clone()),
    };

    let images = Finalizer::new(&fetcher).finalize(decision, &mode, &ctx);
    Ok(RunOutput::Delivered(images))
}

fn load_sources(sources: &SourcesCfg) -> Result<RawImageSources, AppError> {
    let sources = match sources {
        SourcesCfg::Inline(sources) => sources.clone(),
        SourcesCfg::File(path) => read_sources_file(path)?,
    };

    if sources.is_empty() {
        info!("no image sources given, nothing to resolve");
    }
    Ok(sources)
}

fn read_sources_file(path: &Path) -> Result<RawImageSources, AppError> {
    let text = std::fs::read_to_string(path).map_err(|src| AppError::SourcesRead {
        path: path.to_path_buf(),
        src,
    })?;

    serde_json::from_str(&text).map_err(|src| AppError::SourcesParse {
        path: path.to_path_buf(),
        src,
    })
}

fn print_output(output: &RunOutput, format: OutputFormat) -> eyre::Result<()> {
    let rendered = output.render(format)?;

    #[allow(clippy::print_stdout)]
    let () = println!("{rendered}");
    Ok(())
}

fn print_fatal_err(e: &eyre::Report, verbosity: ReportVerbosity) {
    if verbosity == ReportVerbosity::Verbose {
        error!("{e:?}");
    } else {
        error!("{e}");
    }
}

pub fn configure_logs(verbosity: ReportVerbosity) {
    use simplelog::*;

    let mut cfg = simplelog::ConfigBuilder::new();
    cfg.add_filter_allow_str("poster_finder");

    let min_loglevel = match verbosity {
        ReportVerbosity::Quiet => LevelFilter::Warn,
        ReportVerbosity::Default => LevelFilter::Info,
        ReportVerbosity::Verbose => LevelFilter::Trace,
    };

    TermLogger::init(
        min_loglevel,
        cfg.build(),
        TerminalMode::Stderr,
        ColorChoice::Auto,
    )
    .expect("TermLogger failed to initialize");
}
