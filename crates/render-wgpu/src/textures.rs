use std::path::Path;
use stilllife_render::TextureError;

/// RGBA8 pixels ready for upload, bottom row first.
#[derive(Debug, Clone)]
pub struct DecodedImage {
    pub width: u32,
    pub height: u32,
    pub rgba: Vec<u8>,
}

impl DecodedImage {
    /// Refuse images the device cannot hold in a single 2D texture.
    pub fn ensure_fits(&self, path: &Path, max_dimension: u32) -> Result<(), TextureError> {
        if self.width > max_dimension || self.height > max_dimension {
            return Err(TextureError::TooLarge {
                path: path.to_path_buf(),
                width: self.width,
                height: self.height,
                max: max_dimension,
            });
        }
        Ok(())
    }
}

/// Read and decode an image file.
///
/// Only RGB and RGBA sources are accepted. Rows are flipped so that UV
/// `(0, 0)` addresses the bottom-left corner of the image.
pub fn decode_rgba(path: &Path) -> Result<DecodedImage, TextureError> {
    let bytes = std::fs::read(path).map_err(|source| TextureError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let image = image::load_from_memory(&bytes).map_err(|e| TextureError::Decode {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;

    let channels = image.color().channel_count();
    if channels != 3 && channels != 4 {
        return Err(TextureError::UnsupportedChannels {
            path: path.to_path_buf(),
            channels,
        });
    }

    let rgba = image.flipv().into_rgba8();
    let (width, height) = rgba.dimensions();
    tracing::debug!(path = %path.display(), width, height, channels, "decoded texture");
    Ok(DecodedImage {
        width,
        height,
        rgba: rgba.into_raw(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayImage, Luma, Rgb, RgbImage};

    #[test]
    fn rgb_is_expanded_and_flipped() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stripes.png");
        let mut img = RgbImage::new(2, 2);
        for x in 0..2 {
            img.put_pixel(x, 0, Rgb([255, 0, 0]));
            img.put_pixel(x, 1, Rgb([0, 0, 255]));
        }
        img.save(&path).unwrap();

        let decoded = decode_rgba(&path).unwrap();
        assert_eq!((decoded.width, decoded.height), (2, 2));
        assert_eq!(decoded.rgba.len(), 16);
        // Former bottom row (blue) comes first.
        assert_eq!(&decoded.rgba[..4], &[0, 0, 255, 255]);
        assert_eq!(&decoded.rgba[8..12], &[255, 0, 0, 255]);
    }

    #[test]
    fn oversized_image_is_refused() {
        let image = DecodedImage {
            width: 10_000,
            height: 16,
            rgba: Vec::new(),
        };
        let path = Path::new("huge.jpg");
        match image.ensure_fits(path, 8192) {
            Err(TextureError::TooLarge { width, max, .. }) => {
                assert_eq!((width, max), (10_000, 8192));
            }
            other => panic!("expected size rejection, got {other:?}"),
        }

        let edge = DecodedImage {
            width: 2048,
            height: 2048,
            rgba: Vec::new(),
        };
        assert!(edge.ensure_fits(path, 2048).is_ok());
    }

    #[test]
    fn grayscale_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gray.png");
        GrayImage::from_pixel(4, 4, Luma([128])).save(&path).unwrap();

        match decode_rgba(&path) {
            Err(TextureError::UnsupportedChannels { channels, .. }) => assert_eq!(channels, 1),
            other => panic!("expected channel rejection, got {other:?}"),
        }
    }

    #[test]
    fn missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = decode_rgba(&dir.path().join("absent.jpg")).unwrap_err();
        assert!(matches!(err, TextureError::Io { .. }));
        assert!(err.path().ends_with("absent.jpg"));
    }

    #[test]
    fn garbage_is_decode_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("noise.png");
        std::fs::write(&path, b"definitely not an image").unwrap();
        assert!(matches!(decode_rgba(&path), Err(TextureError::Decode { .. })));
    }
}
