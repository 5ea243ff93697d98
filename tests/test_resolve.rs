mod common;

use common::*;
use poster_finder_lib::*;

fn javbus() -> SiteProfile {
    SiteProfile::for_site("javbus")
}

#[test]
fn test_letterboxed_landscape_becomes_local_file() {
    let fixture = letterbox_fixture(1);
    let temp = tempfile::tempdir().unwrap();
    let resolver = Resolver::new(&fixture.fetcher, temp.path());

    let decision = resolver.resolve_images(&fixture.sources, &OverrideRules::default(), "ABP", &javbus());

    assert_eq!(decision.poster_mode(), PosterMode::LocalFile);
    let poster = local_file_poster(&decision);
    assert_eq!(poster.origin(), &fixture.landscape);
    assert_eq!(
        poster.recipe(),
        Recipe::DeLetterbox {
            side: CropSide::Right
        }
    );
    assert_eq!(poster.crop().as_view_args(), (262, 31, 538, 538));

    let temp_file = decision.temporary_file_path().unwrap();
    assert!(temp_file.starts_with(temp.path()));
    let written = image::open(temp_file).unwrap();
    assert_eq!((written.width(), written.height()), (538, 538));

    //the landscape, under either scheme, never shows up again as fan-art.
    assert_eq!(decision.landscape.as_ref(), Some(&fixture.landscape));
    assert_eq!(decision.fanart, vec![fixture.extra_art.clone()]);
}

#[test]
fn test_resolution_is_idempotent() {
    let fixture = letterbox_fixture(2);
    let temp = tempfile::tempdir().unwrap();
    let resolver = Resolver::new(&fixture.fetcher, temp.path());
    let rules = OverrideRules::default();

    let first = resolver.resolve_images(&fixture.sources, &rules, "ABP", &javbus());
    let second = resolver.resolve_images(&fixture.sources, &rules, "ABP", &javbus());

    assert_eq!(first, second);
    assert_ne!(first.temporary_file_path(), second.temporary_file_path());
}

#[test]
fn test_portrait_candidate_without_reference() {
    let mut rng = rng(3);
    let fetcher = MemoryFetcher::new();
    let candidate = serve(
        &fetcher,
        "https://pics.example.com/sample-1.jpg",
        &random_blocks(650, 812, 40, &mut rng),
    );

    let sources = RawImageSources {
        specific_poster_candidates: vec![candidate.clone()],
        ..Default::default()
    };

    let temp = tempfile::tempdir().unwrap();
    let site = SiteProfile::for_site("javdb").without_reference();
    let decision = Resolver::new(&fetcher, temp.path()).resolve_images(
        &sources,
        &OverrideRules::default(),
        "SONE",
        &site,
    );

    assert_eq!(decision.poster, Some(Poster::Verbatim(candidate)));
    assert_eq!(decision.poster_mode(), PosterMode::None);
    assert_eq!(decision.landscape, None);
    assert!(decision.fanart.is_empty());
    //one dimension probe, nothing else.
    assert_eq!(fetcher.requests(), 1);
}

#[test]
fn test_skips_unreachable_candidates() {
    let mut rng = rng(4);
    let fetcher = MemoryFetcher::new();
    let good = serve(
        &fetcher,
        "https://pics.example.com/sample-2.jpg",
        &random_blocks(600, 900, 30, &mut rng),
    );

    let sources = RawImageSources {
        specific_poster_candidates: vec![src("https://pics.example.com/gone.jpg"), good.clone()],
        ..Default::default()
    };

    let temp = tempfile::tempdir().unwrap();
    let site = SiteProfile::for_site("javdb").without_reference();
    let decision = Resolver::new(&fetcher, temp.path()).resolve_images(
        &sources,
        &OverrideRules::default(),
        "SONE",
        &site,
    );

    assert_eq!(decision.poster, Some(Poster::Verbatim(good)));
}

#[test]
fn test_forced_reference_skips_search() {
    let fetcher = MemoryFetcher::new();
    let reference = src("https://pics.example.com/fc2-ps.jpg");
    let arts = (1..=5)
        .map(|n| src(&format!("https://pics.example.com/fc2-{n}.jpg")))
        .collect::<Vec<_>>();

    let sources = RawImageSources {
        small_reference: Some(reference.clone()),
        landscape_candidate: None,
        specific_poster_candidates: vec![],
        other_arts: arts.clone(),
    };

    let temp = tempfile::tempdir().unwrap();
    let resolver = Resolver::new(&fetcher, temp.path());

    let rules = OverrideRules::parse("", "FC2", 3).unwrap();
    let decision = resolver.resolve_images(&sources, &rules, "fc2", &javbus());
    assert_eq!(decision.poster, Some(Poster::Verbatim(reference.clone())));
    assert_eq!(decision.fanart, arts[..3].to_vec());

    let rules = OverrideRules::parse("", "FC2", 20).unwrap();
    let decision = resolver.resolve_images(&sources, &rules, "FC2", &javbus());
    assert_eq!(decision.fanart, arts);

    assert_eq!(fetcher.requests(), 0);
}

#[test]
fn test_empty_sources() {
    let fetcher = MemoryFetcher::new();
    let temp = tempfile::tempdir().unwrap();

    let decision = Resolver::new(&fetcher, temp.path()).resolve_images(
        &RawImageSources::default(),
        &OverrideRules::default(),
        "ABP",
        &javbus(),
    );

    assert_eq!(decision, ImageDecision::default());
    assert_eq!(decision.poster_source(), None);
}

#[test]
fn test_forced_crop_uses_landscape() {
    let fetcher = MemoryFetcher::new();
    let landscape = src("https://pics.example.com/ipx001pl.jpg");
    let sources = RawImageSources {
        landscape_candidate: Some(landscape.clone()),
        small_reference: Some(src("https://pics.example.com/ipx001ps.jpg")),
        ..Default::default()
    };

    let rules = OverrideRules::parse("IPX:l", "", 20).unwrap();
    let temp = tempfile::tempdir().unwrap();
    let decision = Resolver::new(&fetcher, temp.path()).resolve_images(&sources, &rules, "IPX", &javbus());

    assert_eq!(decision.poster_mode(), PosterMode::CropLeft);
    assert_eq!(decision.poster_source(), Some(landscape));
    assert_eq!(fetcher.requests(), 0);
}

#[test]
fn test_reference_fallback_always_gives_poster() {
    let mut rng = rng(5);
    let fetcher = MemoryFetcher::new();
    let reference = serve(
        &fetcher,
        "https://pics.example.com/ps.jpg",
        &random_blocks(100, 140, 10, &mut rng),
    );
    let unrelated = serve(
        &fetcher,
        "https://pics.example.com/pl.jpg",
        &random_blocks(800, 538, 16, &mut rng),
    );

    let sources = RawImageSources {
        small_reference: Some(reference.clone()),
        landscape_candidate: Some(unrelated),
        specific_poster_candidates: vec![src("https://pics.example.com/missing.jpg")],
        other_arts: vec![src("https://pics.example.com/missing-2.jpg")],
    };

    let temp = tempfile::tempdir().unwrap();
    let resolver = Resolver::new(&fetcher, temp.path());
    let decision = resolver.resolve_images(&sources, &OverrideRules::default(), "ABP", &javbus());
    assert_eq!(decision.poster, Some(Poster::Verbatim(reference)));

    //an unreachable reference still becomes the poster.
    let sources = RawImageSources {
        small_reference: Some(src("https://pics.example.com/ps-gone.jpg")),
        ..sources
    };
    let decision = resolver.resolve_images(&sources, &OverrideRules::default(), "ABP", &javbus());
    assert_eq!(decision.poster_source(), Some(src("https://pics.example.com/ps-gone.jpg")));
}

#[test]
fn test_similar_portrait_candidate_used_verbatim() {
    let mut rng = rng(6);
    let fetcher = MemoryFetcher::new();
    let portrait_img = random_blocks(650, 812, 40, &mut rng);
    let reference_img = image::imageops::resize(
        &portrait_img,
        100,
        125,
        image::imageops::FilterType::Lanczos3,
    );

    let reference = serve(&fetcher, "https://pics.example.com/ps.jpg", &reference_img);
    let impostor = serve(
        &fetcher,
        "https://pics.example.com/sample-1.jpg",
        &random_blocks(650, 812, 40, &mut rng),
    );
    let portrait = serve(&fetcher, "https://pics.example.com/sample-9.jpg", &portrait_img);

    let sources = RawImageSources {
        small_reference: Some(reference),
        specific_poster_candidates: vec![impostor, portrait.clone()],
        ..Default::default()
    };

    let temp = tempfile::tempdir().unwrap();
    let decision = Resolver::new(&fetcher, temp.path()).resolve_images(
        &sources,
        &OverrideRules::default(),
        "ABP",
        &javbus(),
    );
    assert_eq!(decision.poster, Some(Poster::Verbatim(portrait)));
    //reference, impostor and portrait, each downloaded once.
    assert_eq!(fetcher.requests(), 3);
}

#[test]
fn test_each_source_fetched_once_on_vendor_site() {
    let mut rng = rng(13);
    let fetcher = MemoryFetcher::new();
    let landscape_img = random_blocks(700, 500, 25, &mut rng);
    let reference_img = crop_resize(&landscape_img, 343, 0, 357, 500, 100, 140);

    let reference = serve(&fetcher, "https://pics.dmm.example.com/ps.jpg", &reference_img);
    let landscape = serve(&fetcher, "https://pics.dmm.example.com/pl.jpg", &landscape_img);
    let sources = RawImageSources {
        small_reference: Some(reference),
        landscape_candidate: Some(landscape.clone()),
        ..Default::default()
    };

    let temp = tempfile::tempdir().unwrap();
    let decision = Resolver::new(&fetcher, temp.path()).resolve_images(
        &sources,
        &OverrideRules::default(),
        "SSIS",
        &SiteProfile::for_site("dmm"),
    );

    //the vendor probe, the portrait check and the crop search share one download.
    assert!(matches!(
        decision.poster,
        Some(Poster::Cropped { ref source, side: CropSide::Right, .. }) if *source == landscape
    ));
    assert_eq!(fetcher.requests(), 2);
}

#[test]
fn test_crop_found_in_other_art_and_fanart_exclusive() {
    let mut rng = rng(7);
    let fetcher = MemoryFetcher::new();

    let art_img = random_blocks(300, 200, 20, &mut rng);
    //right-anchored 143x200 window, shrunk to thumbnail size.
    let reference_img = crop_resize(&art_img, 157, 0, 143, 200, 100, 140);

    let reference = serve(&fetcher, "https://pics.example.com/ps.jpg", &reference_img);
    let landscape = serve(
        &fetcher,
        "https://pics.example.com/pl.jpg",
        &random_blocks(800, 600, 16, &mut rng),
    );
    let filler = serve(
        &fetcher,
        "https://pics.example.com/2.jpg",
        &random_blocks(300, 200, 20, &mut rng),
    );
    let art = serve(&fetcher, "https://pics.example.com/3.jpg", &art_img);

    let sources = RawImageSources {
        small_reference: Some(reference),
        landscape_candidate: Some(landscape.clone()),
        specific_poster_candidates: vec![],
        other_arts: vec![
            filler.clone(),
            src("http://pics.example.com/pl.jpg"),
            art.clone(),
            src("https://PICS.example.com/3.jpg#again"),
            src("https://pics.example.com/4.jpg"),
        ],
    };

    let temp = tempfile::tempdir().unwrap();
    let decision = Resolver::new(&fetcher, temp.path()).resolve_images(
        &sources,
        &OverrideRules::default(),
        "ABP",
        &javbus(),
    );

    assert_eq!(decision.poster_mode(), PosterMode::CropRight);
    assert_eq!(decision.poster_source(), Some(art.clone()));
    assert_eq!(
        decision.fanart,
        vec![filler, src("https://pics.example.com/4.jpg")]
    );

    for fanart in &decision.fanart {
        assert!(!fanart.same_image(&art));
        assert!(!fanart.same_image(&landscape));
    }
}

#[test]
fn test_repeated_panels_pick_right_edge() {
    let mut rng = rng(8);
    let fetcher = MemoryFetcher::new();
    let panel = random_blocks(100, 100, 20, &mut rng);
    let triptych = side_by_side(&[&panel, &panel, &panel]);

    let sources = RawImageSources {
        small_reference: Some(serve(&fetcher, "https://pics.example.com/ps.jpg", &panel)),
        other_arts: vec![serve(&fetcher, "https://pics.example.com/1.jpg", &triptych)],
        ..Default::default()
    };

    let temp = tempfile::tempdir().unwrap();
    let decision = Resolver::new(&fetcher, temp.path()).resolve_images(
        &sources,
        &OverrideRules::default(),
        "ABP",
        &javbus(),
    );

    assert_eq!(decision.poster_mode(), PosterMode::CropRight);
}

#[test]
fn test_dual_panel_right_half() {
    let mut rng = rng(9);
    let fetcher = MemoryFetcher::new();
    let package = random_blocks(800, 400, 20, &mut rng);
    //right half is x=400..800; its centred 280x400 window starts at x=460.
    let reference_img = crop_resize(&package, 460, 0, 280, 400, 70, 100);

    let landscape = serve(&fetcher, "https://pics.example.com/pl.jpg", &package);
    let sources = RawImageSources {
        small_reference: Some(serve(&fetcher, "https://pics.example.com/ps.jpg", &reference_img)),
        landscape_candidate: Some(landscape.clone()),
        ..Default::default()
    };

    let temp = tempfile::tempdir().unwrap();
    let decision = Resolver::new(&fetcher, temp.path()).resolve_images(
        &sources,
        &OverrideRules::default(),
        "ABP",
        &javbus(),
    );

    let poster = local_file_poster(&decision);
    assert_eq!(poster.origin(), &landscape);
    assert_eq!(
        poster.recipe(),
        Recipe::Half {
            half: CropSide::Right
        }
    );
    assert_eq!(poster.crop().as_view_args(), (460, 0, 280, 400));
}

#[test]
fn test_vendor_strip_only_for_vendor_sites() {
    let mut rng = rng(10);
    let fetcher = MemoryFetcher::new();
    let landscape = serve(
        &fetcher,
        "https://pics.dmm.example.com/pl.jpg",
        &random_blocks(800, 438, 16, &mut rng),
    );
    let sources = RawImageSources {
        landscape_candidate: Some(landscape.clone()),
        ..Default::default()
    };

    let temp = tempfile::tempdir().unwrap();
    let resolver = Resolver::new(&fetcher, temp.path());

    let decision = resolver.resolve_images(
        &sources,
        &OverrideRules::default(),
        "SSIS",
        &SiteProfile::for_site("dmm"),
    );
    let poster = local_file_poster(&decision);
    assert_eq!(poster.recipe(), Recipe::VendorStrip);
    assert_eq!(poster.crop().as_view_args(), (420, 0, 380, 438));
    let written = image::open(poster.path()).unwrap();
    assert_eq!((written.width(), written.height()), (380, 438));

    //elsewhere the same image is just a wide landscape.
    let decision = resolver.resolve_images(&sources, &OverrideRules::default(), "SSIS", &javbus());
    let poster = local_file_poster(&decision);
    assert_eq!(
        poster.recipe(),
        Recipe::Half {
            half: CropSide::Right
        }
    );
}

#[test]
fn test_landscape_shapes_without_reference() {
    let mut rng = rng(11);
    let fetcher = MemoryFetcher::new();
    let temp = tempfile::tempdir().unwrap();
    let resolver = Resolver::new(&fetcher, temp.path());
    let site = SiteProfile::for_site("javdb").without_reference();

    let resolve = |url: &str, width: u32, height: u32, rng: &mut rand::rngs::StdRng| {
        let landscape = serve(&fetcher, url, &random_blocks(width, height, 16, rng));
        let sources = RawImageSources {
            landscape_candidate: Some(landscape),
            ..Default::default()
        };
        resolver.resolve_images(&sources, &OverrideRules::default(), "ABW", &site)
    };

    let four_three = resolve("https://pics.example.com/a.jpg", 800, 600, &mut rng);
    assert_eq!(
        local_file_poster(&four_three).recipe(),
        Recipe::DeLetterbox {
            side: CropSide::Right
        }
    );

    let wide = resolve("https://pics.example.com/b.jpg", 800, 400, &mut rng);
    assert_eq!(
        local_file_poster(&wide).recipe(),
        Recipe::Half {
            half: CropSide::Right
        }
    );

    let standard = resolve("https://pics.example.com/c.jpg", 700, 500, &mut rng);
    assert_eq!(standard.poster_mode(), PosterMode::CropRight);
    assert_eq!(standard.temporary_file_path(), None);
}

#[test]
fn test_reference_cache_fills_missing_reference() {
    let mut rng = rng(12);
    let fetcher = MemoryFetcher::new();
    let reference = serve(
        &fetcher,
        "https://pics.example.com/ps.jpg",
        &random_blocks(100, 140, 10, &mut rng),
    );

    let cache = ReferenceCache::new();
    let temp = tempfile::tempdir().unwrap();

    let with_reference = RawImageSources {
        small_reference: Some(reference.clone()),
        ..Default::default()
    };
    Resolver::new(&fetcher, temp.path())
        .with_reference_cache(&cache, "abp-123")
        .resolve_images(&with_reference, &OverrideRules::default(), "ABP", &javbus());
    assert_eq!(cache.get("ABP-123"), Some(reference.clone()));

    let decision = Resolver::new(&fetcher, temp.path())
        .with_reference_cache(&cache, "ABP-123")
        .resolve_images(&RawImageSources::default(), &OverrideRules::default(), "ABP", &javbus());
    assert_eq!(decision.poster, Some(Poster::Verbatim(reference)));

    //a miss is not an error, just nothing to go on.
    let decision = Resolver::new(&fetcher, temp.path())
        .with_reference_cache(&cache, "IPX-999")
        .resolve_images(&RawImageSources::default(), &OverrideRules::default(), "IPX", &javbus());
    assert_eq!(decision.poster, None);
}
