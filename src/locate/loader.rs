//! Image loading for the locate pipeline
//!
//! The main image is decoded in full and then converted to grayscale so the
//! color data stays available to callers (annotation draws on it); the sub
//! image is only ever needed as intensities.

use super::error::{ImageRole, LocateError, LocateResult};
use image::{DynamicImage, GrayImage};
use std::path::Path;

/// A decoded main image: the original pixels plus its intensity matrix.
#[derive(Debug, Clone)]
pub struct LoadedImage {
    pub color: DynamicImage,
    pub gray: GrayImage,
}

impl LoadedImage {
    pub fn from_dynamic(color: DynamicImage) -> Self {
        let gray = color.to_luma8();
        Self { color, gray }
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.gray.dimensions()
    }
}

pub struct ImageLoader;

impl ImageLoader {
    /// Load the main image, keeping color, and derive its grayscale matrix.
    pub fn load_main(path: &Path) -> LocateResult<LoadedImage> {
        let color = Self::decode(path, ImageRole::Main)?;
        let loaded = LoadedImage::from_dynamic(color);
        let (w, h) = loaded.dimensions();
        log::debug!("🖼️ Loaded main image {} ({}x{})", path.display(), w, h);
        Ok(loaded)
    }

    /// Load the sub image straight to grayscale.
    pub fn load_sub(path: &Path) -> LocateResult<GrayImage> {
        let gray = Self::decode(path, ImageRole::Sub)?.into_luma8();
        log::debug!(
            "🧩 Loaded sub image {} ({}x{})",
            path.display(),
            gray.width(),
            gray.height()
        );
        Ok(gray)
    }

    /// Decode PNG/JPEG bytes, e.g. a screenshot that never touched disk.
    pub fn load_main_from_memory(bytes: &[u8]) -> LocateResult<LoadedImage> {
        let color = image::load_from_memory(bytes).map_err(|source| LocateError::ImageDecode {
            which: ImageRole::Main,
            path: "<memory>".into(),
            source,
        })?;
        Self::ensure_non_empty(&color, ImageRole::Main)?;
        Ok(LoadedImage::from_dynamic(color))
    }

    fn decode(path: &Path, which: ImageRole) -> LocateResult<DynamicImage> {
        if !path.exists() {
            return Err(LocateError::PathNotFound {
                which,
                path: path.to_path_buf(),
            });
        }
        let img = image::open(path).map_err(|source| LocateError::ImageDecode {
            which,
            path: path.to_path_buf(),
            source,
        })?;
        Self::ensure_non_empty(&img, which)?;
        Ok(img)
    }

    fn ensure_non_empty(img: &DynamicImage, which: ImageRole) -> LocateResult<()> {
        if img.width() == 0 || img.height() == 0 {
            return Err(LocateError::EmptyImage { which });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;

    #[test]
    fn test_missing_path() {
        let err = ImageLoader::load_sub(Path::new("definitely/not/here.png")).unwrap_err();
        assert!(matches!(
            err,
            LocateError::PathNotFound {
                which: ImageRole::Sub,
                ..
            }
        ));
    }

    #[test]
    fn test_corrupt_file_is_decode_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.png");
        std::fs::write(&path, b"not a png at all").unwrap();

        let err = ImageLoader::load_main(&path).unwrap_err();
        assert!(matches!(
            err,
            LocateError::ImageDecode {
                which: ImageRole::Main,
                ..
            }
        ));
    }

    #[test]
    fn test_main_keeps_color_and_gray() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("main.png");
        let rgb = image::RgbImage::from_pixel(6, 4, image::Rgb([200, 200, 200]));
        rgb.save(&path).unwrap();

        let loaded = ImageLoader::load_main(&path).unwrap();
        assert_eq!(loaded.dimensions(), (6, 4));
        assert!(loaded.color.as_rgb8().is_some());
        assert_eq!(loaded.gray.get_pixel(0, 0), &Luma([200]));
    }

    #[test]
    fn test_load_from_memory() {
        let gray = GrayImage::from_pixel(3, 3, Luma([7]));
        let mut bytes = Vec::new();
        DynamicImage::ImageLuma8(gray)
            .write_to(&mut std::io::Cursor::new(&mut bytes), image::ImageFormat::Png)
            .unwrap();

        let loaded = ImageLoader::load_main_from_memory(&bytes).unwrap();
        assert_eq!(loaded.dimensions(), (3, 3));
    }
}
