use image::{ImageFormat, ImageReader};
use img_parts::jpeg::{Jpeg, JpegSegment};
use img_parts::png::{Png, PngChunk};
use img_parts::webp::WebP;
use img_parts::{Bytes, ImageEXIF};
use serde::Serialize;
use std::fs::{self, Permissions};
use std::io::{self, Cursor, Write};
use std::path::Path;
use tempfile::NamedTempFile;

use super::EngineError;

const JPEG_APP1: u8 = 0xE1;
const JPEG_APP13: u8 = 0xED;
pub(super) const EXIF_PREFIX: &[u8] = b"Exif\0\0";
const XMP_HEADER: &[u8] = b"http://ns.adobe.com/xap/1.0/\0";
const XMP_EXTENSION_HEADER: &[u8] = b"http://ns.adobe.com/xmp/extension/\0";
const IPTC_HEADER: &[u8] = b"Photoshop 3.0\0";

// eXIf carries EXIF; iTXt/tEXt/zTXt carry XMP and free-form text such as Author.
const PNG_METADATA_CHUNKS: &[[u8; 4]] = &[*b"eXIf", *b"iTXt", *b"tEXt", *b"zTXt"];

const WEBP_XMP_CHUNK: [u8; 4] = *b"XMP ";
const WEBP_VP8X: &[u8] = b"VP8X";
// VP8X header flag bits announcing EXIF (0x08) and XMP (0x04) chunks.
const VP8X_METADATA_FLAGS: u8 = 0x08 | 0x04;

/// Sizes before and after a successful strip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StripSummary {
    pub original_size: usize,
    pub stripped_size: usize,
}

impl StripSummary {
    /// Number of bytes of metadata that were dropped.
    pub fn removed(&self) -> usize {
        self.original_size.saturating_sub(self.stripped_size)
    }
}

/// Pixel dimensions of an encoded image, read from its header.
pub(super) fn dimensions(bytes: &[u8]) -> Result<(u32, u32), String> {
    ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| e.to_string())?
        .into_dimensions()
        .map_err(|e| e.to_string())
}

/// Remove metadata from an encoded image, keeping its format and pixel dimensions.
pub(super) fn strip_bytes(bytes: &[u8]) -> Result<Vec<u8>, EngineError> {
    let format = image::guess_format(bytes)
        .map_err(|e| EngineError::Unreadable(format!("unknown image format ({e})")))?;
    let before = dimensions(bytes).map_err(EngineError::Unreadable)?;

    let cleaned = match format {
        ImageFormat::Jpeg => strip_jpeg(bytes)?,
        ImageFormat::Png => strip_png(bytes)?,
        ImageFormat::WebP => strip_webp(bytes)?,
        other => reencode(bytes, other)?,
    };

    let after = dimensions(&cleaned)
        .map_err(|e| EngineError::Encode(format!("cleaned image is not readable: {e}")))?;
    if before != after {
        return Err(EngineError::Encode(format!(
            "dimensions changed from {}x{} to {}x{}",
            before.0, before.1, after.0, after.1
        )));
    }

    Ok(cleaned)
}

fn is_metadata_segment(segment: &JpegSegment) -> bool {
    let contents = segment.contents();
    match segment.marker() {
        JPEG_APP1 => {
            contents.starts_with(EXIF_PREFIX)
                || contents.starts_with(XMP_HEADER)
                || contents.starts_with(XMP_EXTENSION_HEADER)
        }
        JPEG_APP13 => contents.starts_with(IPTC_HEADER),
        _ => false,
    }
}

fn strip_jpeg(bytes: &[u8]) -> Result<Vec<u8>, EngineError> {
    let mut jpeg = Jpeg::from_bytes(Bytes::copy_from_slice(bytes))
        .map_err(|e| EngineError::Unreadable(format!("Failed to parse JPEG: {e}")))?;

    let segments = jpeg.segments_mut();
    let before = segments.len();
    segments.retain(|s| !is_metadata_segment(s));
    log::debug!("Dropped {} JPEG metadata segment(s)", before - segments.len());

    Ok(jpeg.encoder().bytes().to_vec())
}

fn is_metadata_chunk(chunk: &PngChunk) -> bool {
    PNG_METADATA_CHUNKS.contains(&chunk.kind())
}

fn strip_png(bytes: &[u8]) -> Result<Vec<u8>, EngineError> {
    let mut png = Png::from_bytes(Bytes::copy_from_slice(bytes))
        .map_err(|e| EngineError::Unreadable(format!("Failed to parse PNG: {e}")))?;

    let chunks = png.chunks_mut();
    let before = chunks.len();
    chunks.retain(|c| !is_metadata_chunk(c));
    log::debug!("Dropped {} PNG metadata chunk(s)", before - chunks.len());

    Ok(png.encoder().bytes().to_vec())
}

fn strip_webp(bytes: &[u8]) -> Result<Vec<u8>, EngineError> {
    let mut webp = WebP::from_bytes(Bytes::copy_from_slice(bytes))
        .map_err(|e| EngineError::Unreadable(format!("Failed to parse WebP: {e}")))?;

    webp.set_exif(None);
    webp.remove_chunks_by_id(WEBP_XMP_CHUNK);

    let mut out = webp.encoder().bytes().to_vec();
    clear_vp8x_metadata_flags(&mut out);
    Ok(out)
}

/// Unset the EXIF and XMP bits of the VP8X header, which is always the first chunk.
fn clear_vp8x_metadata_flags(webp: &mut [u8]) {
    if webp.len() > 20 && &webp[12..16] == WEBP_VP8X {
        webp[20] &= !VP8X_METADATA_FLAGS;
    }
}

/// Decode and re-encode in the same format; the `image` encoders write no EXIF.
fn reencode(bytes: &[u8], format: ImageFormat) -> Result<Vec<u8>, EngineError> {
    let img = image::load_from_memory_with_format(bytes, format)
        .map_err(|e| EngineError::Unreadable(format!("Failed to decode {format:?}: {e}")))?;

    let mut out = Cursor::new(Vec::new());
    img.write_to(&mut out, format)
        .map_err(|e| EngineError::Encode(format!("Failed to encode {format:?}: {e}")))?;
    log::debug!("Re-encoded {format:?} image without metadata");

    Ok(out.into_inner())
}

/// Write `data` to `dest` through a temporary file in the same folder, then rename it into place.
pub(super) fn write_atomic(
    dest: &Path,
    data: &[u8],
    permissions: Option<Permissions>,
) -> io::Result<()> {
    let dir = dest
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));

    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(data)?;
    tmp.flush()?;
    if let Some(permissions) = permissions {
        fs::set_permissions(tmp.path(), permissions)?;
    }
    tmp.persist(dest).map_err(|e| e.error)?;
    Ok(())
}
