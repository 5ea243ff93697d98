use std::{fmt, io::Cursor, io::Write};

use image::{codecs::jpeg::JpegEncoder, DynamicImage, GrayImage, ImageReader};
use log::trace;

use crate::{definitions::JPEG_QUALITY, FetchError, Fetcher, ImageOpenError, ImageSource};

/// A decoded image together with the source it came from.
///
/// Handles are never cached: open one, use it, and let it drop.
pub struct ImageHandle {
    source: ImageSource,
    image: DynamicImage,
}

impl ImageHandle {
    pub fn from_image(source: ImageSource, image: DynamicImage) -> Self {
        Self { source, image }
    }

    pub fn source(&self) -> &ImageSource {
        &self.source
    }

    pub fn image(&self) -> &DynamicImage {
        &self.image
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.image.width(), self.image.height())
    }

    pub fn luma(&self) -> GrayImage {
        self.image.to_luma8()
    }
}

impl fmt::Debug for ImageHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (width, height) = self.dimensions();
        f.debug_struct("ImageHandle")
            .field("source", &self.source)
            .field("width", &width)
            .field("height", &height)
            .finish()
    }
}

/// Anything [`ImageOpener::open`] accepts. An already open handle passes straight through.
#[derive(Debug)]
pub enum ImageInput {
    Source(ImageSource),
    Handle(ImageHandle),
}

impl From<ImageSource> for ImageInput {
    fn from(source: ImageSource) -> Self {
        Self::Source(source)
    }
}

impl From<&ImageSource> for ImageInput {
    fn from(source: &ImageSource) -> Self {
        Self::Source(source.clone())
    }
}

impl From<ImageHandle> for ImageInput {
    fn from(handle: ImageHandle) -> Self {
        Self::Handle(handle)
    }
}

/// Turns [`ImageSource`]s into decoded [`ImageHandle`]s, so callers never care whether
/// an image is remote or local.
#[derive(Clone, Copy)]
pub struct ImageOpener<'f> {
    fetcher: &'f dyn Fetcher,
}

impl<'f> ImageOpener<'f> {
    pub fn new(fetcher: &'f dyn Fetcher) -> Self {
        Self { fetcher }
    }

    pub fn fetcher(&self) -> &'f dyn Fetcher {
        self.fetcher
    }

    pub fn read_bytes(&self, source: &ImageSource) -> Result<Vec<u8>, FetchError> {
        match source {
            ImageSource::Url(url) => self.fetcher.fetch_bytes(url),
            ImageSource::Path(path) => self.fetcher.open_local_file(path),
        }
    }

    pub fn open(&self, input: impl Into<ImageInput>) -> Result<ImageHandle, ImageOpenError> {
        let source = match input.into() {
            ImageInput::Handle(handle) => return Ok(handle),
            ImageInput::Source(source) => source,
        };

        let bytes = self.fetch(&source)?;
        decode_image(source, &bytes)
    }

    /// Learns the size of an image from its header, without decoding any pixels. The
    /// whole body is still fetched.
    pub fn probe_dimensions(&self, source: &ImageSource) -> Result<(u32, u32), ImageOpenError> {
        let bytes = self.fetch(source)?;
        probe_dimensions_of(source, &bytes)
    }

    pub(crate) fn fetch(&self, source: &ImageSource) -> Result<Vec<u8>, ImageOpenError> {
        self.read_bytes(source)
            .map_err(|error| ImageOpenError::Fetch {
                image: source.clone(),
                error,
            })
    }
}

/// Decodes bytes already fetched for `source`.
pub(crate) fn decode_image(source: ImageSource, bytes: &[u8]) -> Result<ImageHandle, ImageOpenError> {
    let image = guess_format(&source, bytes)?
        .decode()
        .map_err(|e| ImageOpenError::Decode {
            image: source.clone(),
            reason: e.to_string(),
        })?;

    trace!("opened {source} ({}x{})", image.width(), image.height());
    Ok(ImageHandle::from_image(source, image))
}

pub(crate) fn probe_dimensions_of(
    source: &ImageSource,
    bytes: &[u8],
) -> Result<(u32, u32), ImageOpenError> {
    let dims = guess_format(source, bytes)?
        .into_dimensions()
        .map_err(|e| ImageOpenError::Decode {
            image: source.clone(),
            reason: e.to_string(),
        })?;

    trace!("probed {source}: {}x{}", dims.0, dims.1);
    Ok(dims)
}

fn guess_format<'b>(
    source: &ImageSource,
    bytes: &'b [u8],
) -> Result<ImageReader<Cursor<&'b [u8]>>, ImageOpenError> {
    let reader = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| ImageOpenError::Decode {
            image: source.clone(),
            reason: e.to_string(),
        })?;

    if reader.format().is_none() {
        return Err(ImageOpenError::UnknownFormat {
            image: source.clone(),
        });
    }

    Ok(reader)
}

/// Writes `image` as a JPEG. Alpha is dropped.
pub fn encode_jpeg(image: &DynamicImage, writer: impl Write) -> image::ImageResult<()> {
    let encoder = JpegEncoder::new_with_quality(writer, JPEG_QUALITY);
    DynamicImage::ImageRgb8(image.to_rgb8()).write_with_encoder(encoder)
}

#[cfg(test)]
mod test {
    use image::{ImageFormat, RgbImage};

    use super::*;
    use crate::MemoryFetcher;

    fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let img = DynamicImage::ImageRgb8(RgbImage::new(width, height));
        let mut buf = Cursor::new(vec![]);
        img.write_to(&mut buf, ImageFormat::Png).unwrap();
        buf.into_inner()
    }

    #[test]
    fn test_open_and_probe() {
        let fetcher = MemoryFetcher::new();
        fetcher.insert("https://img.example.com/a.png", png_bytes(12, 7));
        let opener = ImageOpener::new(&fetcher);
        let source = ImageSource::parse("https://img.example.com/a.png");

        assert_eq!(opener.probe_dimensions(&source).unwrap(), (12, 7));
        let handle = opener.open(&source).unwrap();
        assert_eq!(handle.dimensions(), (12, 7));
        assert_eq!(handle.source(), &source);
    }

    #[test]
    fn test_open_passes_handles_through() {
        let fetcher = MemoryFetcher::new();
        let opener = ImageOpener::new(&fetcher);
        let handle = ImageHandle::from_image(
            ImageSource::parse("https://img.example.com/b.png"),
            DynamicImage::ImageRgb8(RgbImage::new(3, 4)),
        );

        let reopened = opener.open(handle).unwrap();
        assert_eq!(reopened.dimensions(), (3, 4));
        assert_eq!(fetcher.requests(), 0);
    }

    #[test]
    fn test_open_failures_are_typed() {
        let fetcher = MemoryFetcher::new();
        fetcher.insert("https://img.example.com/junk", b"definitely not an image".to_vec());
        let opener = ImageOpener::new(&fetcher);

        let missing = opener.open(ImageSource::parse("https://img.example.com/missing.jpg"));
        assert!(matches!(missing, Err(ImageOpenError::Fetch { .. })));

        let junk = opener.open(ImageSource::parse("https://img.example.com/junk"));
        assert!(matches!(junk, Err(ImageOpenError::UnknownFormat { .. })));
    }

    #[test]
    fn test_encode_jpeg_roundtrips_dimensions() {
        let img = DynamicImage::ImageRgb8(RgbImage::new(30, 20));
        let mut buf = vec![];
        encode_jpeg(&img, &mut buf).unwrap();
        let decoded = image::load_from_memory(&buf).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (30, 20));
    }
}
