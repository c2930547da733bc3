#![allow(dead_code)]

use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use img_parts::jpeg::Jpeg;
use img_parts::png::Png;
use img_parts::{Bytes, ImageEXIF};
use std::io::Cursor;
use std::path::Path;
use std::process::{Command, Output};

/// Big-endian TIFF block whose IFD0 holds the given ASCII tags, sorted by tag.
fn ascii_ifd0(tags: &[(u16, &str)]) -> Vec<u8> {
    let ifd_len = 2 + tags.len() * 12 + 4;
    let mut values = Vec::new();
    let mut t = Vec::new();
    t.extend_from_slice(b"MM\0*");
    t.extend_from_slice(&8u32.to_be_bytes());
    t.extend_from_slice(&(tags.len() as u16).to_be_bytes());
    for (tag, text) in tags {
        let mut value = text.as_bytes().to_vec();
        value.push(0);
        t.extend_from_slice(&tag.to_be_bytes());
        t.extend_from_slice(&2u16.to_be_bytes());
        t.extend_from_slice(&(value.len() as u32).to_be_bytes());
        t.extend_from_slice(&((8 + ifd_len + values.len()) as u32).to_be_bytes());
        values.extend_from_slice(&value);
    }
    t.extend_from_slice(&0u32.to_be_bytes());
    t.extend_from_slice(&values);
    t
}

pub fn jpeg_with_exif(width: u32, height: u32) -> Vec<u8> {
    let img = RgbImage::from_pixel(width, height, Rgb([30, 120, 220]));
    let mut buf = Cursor::new(Vec::new());
    DynamicImage::ImageRgb8(img)
        .write_to(&mut buf, ImageFormat::Jpeg)
        .unwrap();
    let mut jpeg = Jpeg::from_bytes(Bytes::from(buf.into_inner())).unwrap();
    let exif = ascii_ifd0(&[(0x010F, "Canon"), (0x0110, "EOS 5D Mark IV")]);
    jpeg.set_exif(Some(Bytes::from(exif)));
    jpeg.encoder().bytes().to_vec()
}

pub fn png_with_exif(width: u32, height: u32) -> Vec<u8> {
    let img = RgbImage::from_pixel(width, height, Rgb([90, 90, 90]));
    let mut buf = Cursor::new(Vec::new());
    DynamicImage::ImageRgb8(img)
        .write_to(&mut buf, ImageFormat::Png)
        .unwrap();
    let mut png = Png::from_bytes(Bytes::from(buf.into_inner())).unwrap();
    png.set_exif(Some(Bytes::from(ascii_ifd0(&[(0x010F, "Canon")]))));
    png.encoder().bytes().to_vec()
}

pub fn has_exif(path: &Path) -> bool {
    let bytes = std::fs::read(path).unwrap();
    Jpeg::from_bytes(Bytes::from(bytes)).unwrap().exif().is_some()
}

pub fn run(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_exifremover"))
        .args(args)
        .output()
        .expect("failed to run exifremover")
}

pub fn stdout(out: &Output) -> String {
    String::from_utf8_lossy(&out.stdout).into_owned()
}

pub fn stderr(out: &Output) -> String {
    String::from_utf8_lossy(&out.stderr).into_owned()
}
