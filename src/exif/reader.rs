use image::ImageFormat;
use img_parts::png::Png;
use img_parts::webp::WebP;
use img_parts::{Bytes, ImageEXIF};
use nom_exif::{ExifIter, MediaParser, MediaSource};
use serde::Serialize;
use std::fmt;
use std::io::Cursor;
use std::path::PathBuf;

use super::EngineError;
use super::writer::{EXIF_PREFIX, dimensions};

/// One EXIF entry as shown to the user.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetadataEntry {
    /// Index of the IFD the entry was found in (0 = main image, 1 = thumbnail).
    pub ifd: usize,
    /// Tag name, or its hex code when the tag is not known.
    pub tag: String,
    pub value: String,
}

/// Human-readable EXIF report for a single file.
#[derive(Debug, Clone, Serialize)]
pub struct MetadataReport {
    pub path: PathBuf,
    pub entries: Vec<MetadataEntry>,
}

impl MetadataReport {
    /// `true` when the image carries no EXIF data.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl fmt::Display for MetadataReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.entries.is_empty() {
            return write!(f, "No EXIF data found in {}", self.path.display());
        }

        writeln!(f, "EXIF data of {}", self.path.display())?;
        let width = self.entries.iter().map(|e| e.tag.len()).max().unwrap_or(0);
        for (i, entry) in self.entries.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(
                f,
                "  [IFD{}] {:<width$} : {}",
                entry.ifd, entry.tag, entry.value
            )?;
        }
        Ok(())
    }
}

/// Parse every EXIF entry in `bytes`.
///
/// Input that is not a decodable image is an error; an image without an EXIF
/// segment yields no entries.
pub(super) fn extract_entries(bytes: &[u8]) -> Result<Vec<MetadataEntry>, EngineError> {
    dimensions(bytes).map_err(EngineError::Unreadable)?;

    // nom-exif does not read PNG or WebP containers, so their EXIF chunk is
    // handed over as a bare TIFF block.
    match image::guess_format(bytes) {
        Ok(ImageFormat::Png) => {
            let png = Png::from_bytes(Bytes::copy_from_slice(bytes))
                .map_err(|e| EngineError::Unreadable(format!("Failed to parse PNG: {e}")))?;
            parse_exif_chunk(png.exif())
        }
        Ok(ImageFormat::WebP) => {
            let webp = WebP::from_bytes(Bytes::copy_from_slice(bytes))
                .map_err(|e| EngineError::Unreadable(format!("Failed to parse WebP: {e}")))?;
            parse_exif_chunk(webp.exif())
        }
        _ => Ok(parse_media(bytes.to_vec())),
    }
}

fn parse_exif_chunk(chunk: Option<Bytes>) -> Result<Vec<MetadataEntry>, EngineError> {
    let Some(chunk) = chunk else {
        return Ok(Vec::new());
    };
    // Some writers keep the JPEG-style prefix inside the chunk.
    let tiff = chunk.strip_prefix(EXIF_PREFIX).unwrap_or(&chunk[..]);
    Ok(parse_media(tiff.to_vec()))
}

/// Run nom-exif over a JPEG, TIFF, HEIF or RAW buffer. Anything it cannot parse has no entries.
fn parse_media(data: Vec<u8>) -> Vec<MetadataEntry> {
    let ms = match MediaSource::seekable(Cursor::new(data)) {
        Ok(ms) => ms,
        Err(e) => {
            log::debug!("Container not handled by the EXIF parser: {e}");
            return Vec::new();
        }
    };
    if !ms.has_exif() {
        return Vec::new();
    }

    let mut parser = MediaParser::new();
    let iter: ExifIter = match parser.parse(ms) {
        Ok(iter) => iter,
        Err(e) => {
            log::debug!("No EXIF data found: {e}");
            return Vec::new();
        }
    };

    iter.filter_map(|entry| {
        let value = entry.get_value()?;
        let tag = entry
            .tag()
            .map(|t| format!("{t:?}"))
            .unwrap_or_else(|| format!("0x{:04x}", entry.tag_code()));
        Some(MetadataEntry {
            ifd: entry.ifd_index(),
            tag,
            value: clean_value(&value.to_string()),
        })
    })
    .collect()
}

/// Trim surrounding whitespace, quotes and trailing NULs from a rendered value.
fn clean_value(s: &str) -> String {
    s.trim().trim_matches('"').trim_end_matches('\0').to_string()
}
