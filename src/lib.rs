//! # exif-remover
//!
//! Strip EXIF, XMP and IPTC metadata from a single image or from every image
//! directly inside a folder.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use exif_remover::config::Config;
//! use exif_remover::exif::{ImageMetadataEngine, read_metadata};
//! use exif_remover::paths::{classify, resolve_destination};
//! use exif_remover::pipeline::run_batch;
//! use std::path::Path;
//!
//! fn main() -> anyhow::Result<()> {
//!     let config = Config::default();
//!
//!     // Show what a photo carries
//!     println!("{}", read_metadata(Path::new("photo.jpg"))?);
//!
//!     // Clean a folder; without a destination the results land in photos/temp
//!     let source = classify(Path::new("./photos"))?;
//!     let dest = resolve_destination(&source, None, &config)?;
//!     let result = run_batch(&ImageMetadataEngine, source.path(), &dest.path, |outcome| {
//!         println!("{}: {:?}", outcome.path.display(), outcome.status);
//!     })?;
//!     println!("{} cleaned, {} failed", result.succeeded(), result.failed());
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Supported Formats
//!
//! | Format | Strategy |
//! |--------|----------|
//! | JPEG | Drop APP1 EXIF/XMP and APP13 IPTC segments |
//! | PNG | Drop `eXIf`, `iTXt`, `tEXt` and `zTXt` chunks |
//! | WebP | Drop `EXIF` and `XMP ` chunks |
//! | TIFF, GIF, BMP, ... | Decode and re-encode in the same format |
//!
//! ## Modules
//!
//! - [`config`] — Immutable settings (banner, usage, reserved temp folder)
//! - [`error`] — Error type tagged with an [`ErrorKind`]
//! - [`exif`] — Metadata reading and stripping behind the [`exif::MetadataEngine`] trait
//! - [`paths`] — Source classification and destination resolution
//! - [`pipeline`] — Folder batch processing with per-file outcomes

pub mod config;
pub mod error;
pub mod exif;
pub mod paths;
pub mod pipeline;

pub use error::{Error, ErrorKind, Result};
