//! Avatar upload processing: auto-crop, cover-resize to a square, store
//! under the public avatars directory.

use std::{
    path::{Path, PathBuf},
    time::{SystemTime, UNIX_EPOCH},
};

use image::{imageops::FilterType, DynamicImage, ImageFormat};
use rand::Rng;
use thiserror::Error;
use tokio::fs;
use tracing::{info, instrument};

/// Side length of stored avatars, in pixels.
pub const AVATAR_SIZE: u32 = 250;
/// URL prefix the avatars directory is served under.
pub const AVATAR_URL_PREFIX: &str = "/avatars";

#[derive(Debug, Error)]
pub enum AvatarError {
    #[error("Unsupported image")]
    Unsupported(String),
    #[error("avatar io error: {0}")]
    Io(String),
    #[error("avatar task failed: {0}")]
    Task(String),
}

#[derive(Clone, Debug)]
pub struct AvatarProcessor {
    tmp_dir: PathBuf,
    avatars_dir: PathBuf,
    size: u32,
}

impl AvatarProcessor {
    pub fn new(tmp_dir: impl Into<PathBuf>, avatars_dir: impl Into<PathBuf>) -> Self {
        Self { tmp_dir: tmp_dir.into(), avatars_dir: avatars_dir.into(), size: AVATAR_SIZE }
    }

    pub fn avatars_dir(&self) -> &Path {
        &self.avatars_dir
    }

    /// Process an uploaded image and return its public URL (`/avatars/<file>`).
    ///
    /// The upload is staged in the tmp dir and removed once processed.
    #[instrument(skip(self, bytes), fields(len = bytes.len()))]
    pub async fn store(&self, original_name: Option<&str>, bytes: Vec<u8>) -> Result<String, AvatarError> {
        let format = detect_format(original_name, &bytes)?;
        let file_name = unique_file_name(format);
        fs::create_dir_all(&self.tmp_dir).await.map_err(|e| AvatarError::Io(e.to_string()))?;
        fs::create_dir_all(&self.avatars_dir).await.map_err(|e| AvatarError::Io(e.to_string()))?;

        let staged = self.tmp_dir.join(&file_name);
        fs::write(&staged, &bytes).await.map_err(|e| AvatarError::Io(e.to_string()))?;

        let target = self.avatars_dir.join(&file_name);
        let size = self.size;
        let src = staged.clone();
        let result = tokio::task::spawn_blocking(move || -> Result<(), AvatarError> {
            let data = std::fs::read(&src).map_err(|e| AvatarError::Io(e.to_string()))?;
            let img = image::load_from_memory_with_format(&data, format)
                .map_err(|e| AvatarError::Unsupported(e.to_string()))?;
            let out = fit_avatar(img, size);
            let out = if format == ImageFormat::Jpeg { DynamicImage::ImageRgb8(out.to_rgb8()) } else { out };
            out.save_with_format(&target, format).map_err(|e| AvatarError::Io(e.to_string()))
        })
        .await
        .map_err(|e| AvatarError::Task(e.to_string()));

        let _ = fs::remove_file(&staged).await;
        result??;
        info!(file = %file_name, "avatar_stored");
        Ok(format!("{AVATAR_URL_PREFIX}/{file_name}"))
    }
}

/// Sniff the bytes first; the file extension is only a fallback.
fn detect_format(original_name: Option<&str>, bytes: &[u8]) -> Result<ImageFormat, AvatarError> {
    image::guess_format(bytes)
        .ok()
        .filter(is_supported)
        .or_else(|| {
            original_name
                .and_then(|n| Path::new(n).extension())
                .and_then(ImageFormat::from_extension)
                .filter(is_supported)
        })
        .ok_or_else(|| AvatarError::Unsupported("unrecognized image format".into()))
}

fn is_supported(f: &ImageFormat) -> bool {
    matches!(f, ImageFormat::Png | ImageFormat::Jpeg | ImageFormat::Gif | ImageFormat::WebP | ImageFormat::Bmp)
}

/// `<unix millis>-<random below 1e9>.<ext>`
pub fn unique_file_name(format: ImageFormat) -> String {
    let millis = SystemTime::now().duration_since(UNIX_EPOCH).map(|d| d.as_millis()).unwrap_or_default();
    let suffix: u32 = rand::thread_rng().gen_range(0..1_000_000_000);
    let ext = format.extensions_str().first().copied().unwrap_or("img");
    format!("{millis}-{suffix}.{ext}")
}

/// Auto-crop then cover-resize to `size`×`size`, centred.
pub fn fit_avatar(img: DynamicImage, size: u32) -> DynamicImage {
    autocrop(img).resize_to_fill(size, size, FilterType::Lanczos3)
}

/// Trim a uniform border whose colour matches the top-left pixel.
pub fn autocrop(img: DynamicImage) -> DynamicImage {
    let rgba = img.to_rgba8();
    let (w, h) = rgba.dimensions();
    if w == 0 || h == 0 {
        return img;
    }
    let bg = *rgba.get_pixel(0, 0);
    let mut bounds: Option<(u32, u32, u32, u32)> = None;
    for (x, y, p) in rgba.enumerate_pixels() {
        if *p == bg {
            continue;
        }
        bounds = Some(match bounds {
            None => (x, y, x, y),
            Some((x0, y0, x1, y1)) => (x0.min(x), y0.min(y), x1.max(x), y1.max(y)),
        });
    }
    match bounds {
        Some((x0, y0, x1, y1)) if (x0, y0, x1, y1) != (0, 0, w - 1, h - 1) => {
            img.crop_imm(x0, y0, x1 - x0 + 1, y1 - y0 + 1)
        }
        _ => img,
    }
}
