//! PNG export of the surface.

use crate::surface::RasterSurface;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// File name used for exported whiteboards.
pub const EXPORT_FILE_NAME: &str = "whiteboard.png";

/// Export errors.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("PNG encoding failed: {0}")]
    Encoding(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<png::EncodingError> for ExportError {
    fn from(err: png::EncodingError) -> Self {
        ExportError::Encoding(err.to_string())
    }
}

/// Encode the surface as an RGBA8 PNG.
pub fn encode_png(surface: &RasterSurface) -> Result<Vec<u8>, ExportError> {
    let mut png_data = Vec::new();
    {
        let mut encoder = png::Encoder::new(&mut png_data, surface.width(), surface.height());
        encoder.set_color(png::ColorType::Rgba);
        encoder.set_depth(png::BitDepth::Eight);
        let mut writer = encoder.write_header()?;
        writer.write_image_data(surface.pixels())?;
        writer.finish()?;
    }
    Ok(png_data)
}

/// Encode the surface and write it as `whiteboard.png` inside `dir`.
///
/// Creates the directory if it doesn't exist. Returns the written path.
pub fn write_png(surface: &RasterSurface, dir: &Path) -> Result<PathBuf, ExportError> {
    let png_data = encode_png(surface)?;
    if !dir.exists() {
        fs::create_dir_all(dir)?;
    }
    let path = dir.join(EXPORT_FILE_NAME);
    fs::write(&path, png_data)?;
    log::info!("Exported PNG to: {:?}", path);
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::style::RgbColor;
    use kurbo::Point;
    use tempfile::tempdir;

    fn decode(bytes: &[u8]) -> (png::OutputInfo, Vec<u8>) {
        let decoder = png::Decoder::new(bytes);
        let mut reader = decoder.read_info().unwrap();
        let mut buf = vec![0; reader.output_buffer_size()];
        let info = reader.next_frame(&mut buf).unwrap();
        buf.truncate(info.buffer_size());
        (info, buf)
    }

    #[test]
    fn test_encode_round_trips_pixels() {
        let mut surface = RasterSurface::new(20, 10, RgbColor::white()).unwrap();
        surface.stroke_segment(
            Point::new(2.0, 5.0),
            Point::new(18.0, 5.0),
            RgbColor::new(0, 0, 255).into(),
            2.0,
        );

        let bytes = encode_png(&surface).unwrap();
        assert_eq!(&bytes[..8], b"\x89PNG\r\n\x1a\n");

        let (info, pixels) = decode(&bytes);
        assert_eq!((info.width, info.height), (20, 10));
        assert_eq!(info.color_type, png::ColorType::Rgba);
        assert_eq!(pixels, surface.pixels());
    }

    #[test]
    fn test_write_png_uses_whiteboard_name() {
        let dir = tempdir().unwrap();
        let out = dir.path().join("exports");
        let surface = RasterSurface::new(4, 4, RgbColor::white()).unwrap();

        let path = write_png(&surface, &out).unwrap();
        assert_eq!(path, out.join("whiteboard.png"));
        assert_eq!(fs::read(&path).unwrap(), encode_png(&surface).unwrap());
    }

    #[test]
    fn test_write_png_io_failure() {
        let dir = tempdir().unwrap();
        // A regular file where the output directory should be.
        let blocker = dir.path().join("taken");
        fs::write(&blocker, b"x").unwrap();
        let surface = RasterSurface::new(4, 4, RgbColor::white()).unwrap();

        let err = write_png(&surface, &blocker).unwrap_err();
        assert!(matches!(err, ExportError::Io(_)));
    }
}
