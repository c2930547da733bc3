//! EXIF, XMP, and IPTC metadata reading and removal.
//!
//! The binary-format work sits behind the [`MetadataEngine`] trait, which has
//! exactly two capabilities: list the EXIF entries of an image and produce a
//! copy of the image with its metadata segments removed. The file-level
//! functions in this module add path handling, error tagging and atomic
//! output on top of an engine:
//!
//! - [`read_metadata`] — report every EXIF entry of a file
//! - [`strip_and_save`] — write a metadata-free copy of a file to a destination
//!
//! [`ImageMetadataEngine`] is the default engine. JPEG, PNG and WebP are
//! cleaned at the container level, so pixel data is never re-encoded; every
//! other format the `image` crate can decode is re-encoded in its own format.

mod reader;
mod writer;

use std::fs;
use std::path::Path;

use crate::error::{Error, Result};

pub use reader::{MetadataEntry, MetadataReport};
pub use writer::StripSummary;

/// Failure reported by a [`MetadataEngine`], before any path context is attached.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// The input could not be parsed as a supported image.
    #[error("{0}")]
    Unreadable(String),
    /// The cleaned image could not be produced.
    #[error("{0}")]
    Encode(String),
}

/// The two metadata capabilities the rest of the crate relies on.
pub trait MetadataEngine {
    /// List the EXIF entries found in `bytes`. A valid image without EXIF yields an empty list.
    fn extract(&self, bytes: &[u8]) -> std::result::Result<Vec<MetadataEntry>, EngineError>;

    /// Return `bytes` re-packaged with EXIF, XMP and IPTC removed, keeping pixels and format.
    fn strip(&self, bytes: &[u8]) -> std::result::Result<Vec<u8>, EngineError>;
}

/// Default engine built on `nom-exif`, `img-parts` and `image`.
#[derive(Debug, Default, Clone, Copy)]
pub struct ImageMetadataEngine;

impl MetadataEngine for ImageMetadataEngine {
    fn extract(&self, bytes: &[u8]) -> std::result::Result<Vec<MetadataEntry>, EngineError> {
        reader::extract_entries(bytes)
    }

    fn strip(&self, bytes: &[u8]) -> std::result::Result<Vec<u8>, EngineError> {
        writer::strip_bytes(bytes)
    }
}

/// Read the EXIF report of `path` with the default engine.
pub fn read_metadata(path: &Path) -> Result<MetadataReport> {
    read_metadata_with(&ImageMetadataEngine, path)
}

/// Read the EXIF report of `path` with `engine`.
pub fn read_metadata_with(engine: &dyn MetadataEngine, path: &Path) -> Result<MetadataReport> {
    let bytes = fs::read(path).map_err(|e| Error::read_io(e, path))?;
    let entries = engine.extract(&bytes).map_err(|e| match e {
        EngineError::Unreadable(msg) | EngineError::Encode(msg) => Error::read(path, msg),
    })?;
    log::debug!("{} EXIF entries in {}", entries.len(), path.display());
    Ok(MetadataReport {
        path: path.to_path_buf(),
        entries,
    })
}

/// Strip metadata from `source` and write the result to `dest` with the default engine.
pub fn strip_and_save(source: &Path, dest: &Path) -> Result<StripSummary> {
    strip_and_save_with(&ImageMetadataEngine, source, dest)
}

/// Strip metadata from `source` and write the result to `dest` with `engine`.
///
/// `dest` is created or replaced only once the whole cleaned image is ready,
/// so a failure never leaves a partial file behind.
pub fn strip_and_save_with(
    engine: &dyn MetadataEngine,
    source: &Path,
    dest: &Path,
) -> Result<StripSummary> {
    let bytes = fs::read(source).map_err(|e| Error::read_io(e, source))?;
    let permissions = fs::metadata(source).ok().map(|m| m.permissions());

    let cleaned = engine.strip(&bytes).map_err(|e| match e {
        EngineError::Unreadable(msg) => Error::read(source, msg),
        EngineError::Encode(msg) => Error::write(source, msg),
    })?;

    writer::write_atomic(dest, &cleaned, permissions).map_err(|e| Error::write_io(e, dest))?;
    log::debug!(
        "Wrote {} ({} -> {} bytes)",
        dest.display(),
        bytes.len(),
        cleaned.len()
    );

    Ok(StripSummary {
        original_size: bytes.len(),
        stripped_size: cleaned.len(),
    })
}

#[cfg(test)]
pub(crate) mod fixtures {
    use img_parts::jpeg::{Jpeg, JpegSegment};
    use img_parts::png::{Png, PngChunk};
    use img_parts::riff::{RiffChunk, RiffContent};
    use img_parts::webp::WebP;
    use img_parts::{Bytes, ImageEXIF};
    use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
    use std::io::Cursor;

    /// Little-endian TIFF block with a single IFD0 `Make = "Canon"` entry.
    pub fn tiff_block() -> Vec<u8> {
        let mut t = Vec::new();
        t.extend_from_slice(b"II*\0");
        t.extend_from_slice(&8u32.to_le_bytes());
        t.extend_from_slice(&1u16.to_le_bytes());
        t.extend_from_slice(&0x010Fu16.to_le_bytes());
        t.extend_from_slice(&2u16.to_le_bytes());
        t.extend_from_slice(&6u32.to_le_bytes());
        t.extend_from_slice(&26u32.to_le_bytes());
        t.extend_from_slice(&0u32.to_le_bytes());
        t.extend_from_slice(b"Canon\0");
        t
    }

    pub fn encode(format: ImageFormat, width: u32, height: u32) -> Vec<u8> {
        let img = RgbImage::from_pixel(width, height, Rgb([200, 40, 10]));
        let mut buf = Cursor::new(Vec::new());
        DynamicImage::ImageRgb8(img).write_to(&mut buf, format).unwrap();
        buf.into_inner()
    }

    pub fn jpeg_with_metadata(width: u32, height: u32) -> Vec<u8> {
        let plain = encode(ImageFormat::Jpeg, width, height);
        let mut jpeg = Jpeg::from_bytes(Bytes::from(plain)).unwrap();
        jpeg.set_exif(Some(Bytes::from(tiff_block())));

        let mut xmp = b"http://ns.adobe.com/xap/1.0/\0".to_vec();
        xmp.extend_from_slice(b"<x:xmpmeta xmlns:x=\"adobe:ns:meta/\"></x:xmpmeta>");
        let mut iptc = b"Photoshop 3.0\0".to_vec();
        iptc.extend_from_slice(b"8BIM\x04\x04\0\0\0\0\0\0");

        let segments = jpeg.segments_mut();
        let pos = segments.len().min(2);
        segments.insert(pos, JpegSegment::new_with_contents(0xE1, Bytes::from(xmp)));
        segments.insert(pos, JpegSegment::new_with_contents(0xED, Bytes::from(iptc)));
        jpeg.encoder().bytes().to_vec()
    }

    pub fn png_with_metadata(width: u32, height: u32) -> Vec<u8> {
        let plain = encode(ImageFormat::Png, width, height);
        let mut png = Png::from_bytes(Bytes::from(plain)).unwrap();
        png.set_exif(Some(Bytes::from(tiff_block())));
        png.chunks_mut().insert(
            1,
            PngChunk::new(*b"tEXt", Bytes::from_static(b"Author\0Jane Doe")),
        );
        png.encoder().bytes().to_vec()
    }

    /// Lossless WebP with an `EXIF` chunk and an `XMP ` chunk, flagged in VP8X when present.
    pub fn webp_with_metadata(width: u32, height: u32) -> Vec<u8> {
        let plain = encode(ImageFormat::WebP, width, height);
        let mut webp = WebP::from_bytes(Bytes::from(plain)).unwrap();
        webp.set_exif(Some(Bytes::from(tiff_block())));
        webp.chunks_mut().push(RiffChunk::new(
            *b"XMP ",
            RiffContent::Data(Bytes::from_static(b"<x:xmpmeta xmlns:x=\"adobe:ns:meta/\"/>")),
        ));
        let mut out = webp.encoder().bytes().to_vec();
        if &out[12..16] == b"VP8X" {
            out[20] |= 0x08 | 0x04;
        }
        out
    }

    /// Uncompressed RGB TIFF whose IFD0 also carries `Make = "Canon"`.
    pub fn tiff_with_make(width: u16, height: u16) -> Vec<u8> {
        const SHORT: u16 = 3;
        const LONG: u16 = 4;
        const ASCII: u16 = 2;
        let entries = 10u32;
        let bits_at = 8 + 2 + entries * 12 + 4;
        let make_at = bits_at + 6;
        let pixels_at = make_at + 6;
        let pixel_len = u32::from(width) * u32::from(height) * 3;

        let mut t = Vec::new();
        t.extend_from_slice(b"II*\0");
        t.extend_from_slice(&8u32.to_le_bytes());
        t.extend_from_slice(&(entries as u16).to_le_bytes());
        let mut entry = |tag: u16, kind: u16, count: u32, value: u32| {
            t.extend_from_slice(&tag.to_le_bytes());
            t.extend_from_slice(&kind.to_le_bytes());
            t.extend_from_slice(&count.to_le_bytes());
            t.extend_from_slice(&value.to_le_bytes());
        };
        entry(0x0100, SHORT, 1, u32::from(width));
        entry(0x0101, SHORT, 1, u32::from(height));
        entry(0x0102, SHORT, 3, bits_at);
        entry(0x0103, SHORT, 1, 1);
        entry(0x0106, SHORT, 1, 2);
        entry(0x010F, ASCII, 6, make_at);
        entry(0x0111, LONG, 1, pixels_at);
        entry(0x0115, SHORT, 1, 3);
        entry(0x0116, SHORT, 1, u32::from(height));
        entry(0x0117, LONG, 1, pixel_len);
        t.extend_from_slice(&0u32.to_le_bytes());
        for _ in 0..3 {
            t.extend_from_slice(&8u16.to_le_bytes());
        }
        t.extend_from_slice(b"Canon\0");
        for i in 0..pixel_len {
            t.push((i % 251) as u8);
        }
        t
    }

    pub fn contains(haystack: &[u8], needle: &[u8]) -> bool {
        haystack.windows(needle.len()).any(|w| w == needle)
    }
}
