//! Raw buffer files.
//!
//! No container formats: an image file is exactly `width * height * 4` RGBA
//! bytes and a mask file is exactly `width * height` intensity bytes, both
//! row-major. Size comes from the caller because raw files carry no header.

use std::fs;
use std::path::Path;

use tracing::debug;

use crate::error::Result;
use crate::image::RgbaImage;
use crate::mask::Mask;

/// Reads a raw RGBA8 image.
///
/// # Errors
///
/// [`Error::Io`](crate::Error::Io) on filesystem failure,
/// [`Error::InvalidDimensions`](crate::Error::InvalidDimensions) if the file
/// length does not match `width * height * 4`.
pub fn read_rgba(path: impl AsRef<Path>, width: u32, height: u32) -> Result<RgbaImage> {
    let path = path.as_ref();
    let bytes = fs::read(path)?;
    debug!(path = %path.display(), len = bytes.len(), width, height, "read rgba");
    RgbaImage::from_data(width, height, bytes)
}

/// Writes an image as raw RGBA8 bytes.
pub fn write_rgba(path: impl AsRef<Path>, image: &RgbaImage) -> Result<()> {
    let path = path.as_ref();
    debug!(path = %path.display(), width = image.width(), height = image.height(), "write rgba");
    fs::write(path, image.data())?;
    Ok(())
}

/// Reads a raw 8-bit mask.
pub fn read_mask(path: impl AsRef<Path>, width: u32, height: u32) -> Result<Mask> {
    let path = path.as_ref();
    let bytes = fs::read(path)?;
    debug!(path = %path.display(), len = bytes.len(), width, height, "read mask");
    Mask::from_data(width, height, bytes)
}

/// Writes a mask as raw 8-bit intensities.
pub fn write_mask(path: impl AsRef<Path>, mask: &Mask) -> Result<()> {
    let path = path.as_ref();
    debug!(path = %path.display(), width = mask.width(), height = mask.height(), "write mask");
    fs::write(path, mask.data())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;
    use tempfile::tempdir;

    #[test]
    fn test_rgba_file_length_is_checked() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("short.rgba");
        std::fs::write(&path, [0u8; 10]).unwrap();
        let err = read_rgba(&path, 2, 2).unwrap_err();
        assert!(matches!(err, Error::InvalidDimensions { .. }));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let dir = tempdir().unwrap();
        let err = read_mask(dir.path().join("nope.mask"), 1, 1).unwrap_err();
        assert!(err.is_io_error());
    }

    #[test]
    fn test_mask_written_bytes_are_raw() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("m.mask");
        let mask = Mask::from_fn(3, 1, |x, _| x == 1);
        write_mask(&path, &mask).unwrap();
        assert_eq!(std::fs::read(&path).unwrap(), vec![0, 255, 0]);
    }
}
