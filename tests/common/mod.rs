#![allow(dead_code)]

use std::io::Cursor;

use image::{imageops, imageops::FilterType, DynamicImage, ImageFormat, Rgb, RgbImage};
use poster_finder_lib::*;
use rand::prelude::*;

pub fn rng(seed: u64) -> StdRng {
    StdRng::seed_from_u64(seed)
}

/// Gray noise made of `block` x `block` squares.
pub fn random_blocks(width: u32, height: u32, block: u32, rng: &mut StdRng) -> RgbImage {
    let cols = width.div_ceil(block);
    let rows = height.div_ceil(block);
    let cells = (0..cols * rows).map(|_| rng.gen::<u8>()).collect::<Vec<_>>();
    RgbImage::from_fn(width, height, |x, y| {
        let v = cells[((y / block) * cols + x / block) as usize];
        Rgb([v, v, v])
    })
}

/// Noise with `bar` black rows at the top and at the bottom.
pub fn letterboxed(width: u32, height: u32, bar: u32, block: u32, rng: &mut StdRng) -> RgbImage {
    let mut img = random_blocks(width, height, block, rng);
    for (_x, y, px) in img.enumerate_pixels_mut() {
        if y < bar || y >= height - bar {
            *px = Rgb([0, 0, 0]);
        }
    }
    img
}

/// Panels pasted left to right.
pub fn side_by_side(panels: &[&RgbImage]) -> RgbImage {
    let width = panels.iter().map(|p| p.width()).sum();
    let height = panels.iter().map(|p| p.height()).max().unwrap_or(0);
    let mut out = RgbImage::new(width, height);
    let mut x = 0;
    for panel in panels {
        imageops::replace(&mut out, *panel, i64::from(x), 0);
        x += panel.width();
    }
    out
}

#[allow(clippy::too_many_arguments)]
pub fn crop_resize(img: &RgbImage, x: u32, y: u32, w: u32, h: u32, new_w: u32, new_h: u32) -> RgbImage {
    let cropped = imageops::crop_imm(img, x, y, w, h).to_image();
    imageops::resize(&cropped, new_w, new_h, FilterType::Lanczos3)
}

pub fn png(img: &RgbImage) -> Vec<u8> {
    let mut buf = Cursor::new(vec![]);
    DynamicImage::ImageRgb8(img.clone())
        .write_to(&mut buf, ImageFormat::Png)
        .unwrap();
    buf.into_inner()
}

pub fn serve(fetcher: &MemoryFetcher, url: &str, img: &RgbImage) -> ImageSource {
    fetcher.insert(url, png(img));
    ImageSource::parse(url)
}

pub fn src(raw: &str) -> ImageSource {
    ImageSource::parse(raw)
}

pub fn local_file_poster(decision: &ImageDecision) -> &MaterializedPoster {
    match &decision.poster {
        Some(Poster::LocalFile(materialized)) => materialized,
        other => panic!("expected a local-file poster, got {other:?}"),
    }
}

pub struct LetterboxFixture {
    pub fetcher: MemoryFetcher,
    pub sources: RawImageSources,
    pub landscape: ImageSource,
    pub extra_art: ImageSource,
}

/// A 100x100 reference cut from the right of a letterboxed 800x600 still, after its
/// 31-row bars were removed.
pub fn letterbox_fixture(seed: u64) -> LetterboxFixture {
    let mut rng = rng(seed);
    let fetcher = MemoryFetcher::new();

    let still = letterboxed(800, 600, 31, 16, &mut rng);
    let reference_img = crop_resize(&still, 262, 31, 538, 538, 100, 100);
    let extra_img = random_blocks(640, 360, 16, &mut rng);

    let reference = serve(&fetcher, "https://pics.example.com/abp123ps.jpg", &reference_img);
    let landscape = serve(&fetcher, "https://pics.example.com/abp123pl.jpg", &still);
    let extra_art = serve(&fetcher, "https://pics.example.com/abp123-1.jpg", &extra_img);

    let sources = RawImageSources {
        small_reference: Some(reference),
        landscape_candidate: Some(landscape.clone()),
        specific_poster_candidates: vec![],
        other_arts: vec![src("http://pics.example.com/abp123pl.jpg"), extra_art.clone()],
    };

    LetterboxFixture {
        fetcher,
        sources,
        landscape,
        extra_art,
    }
}
