use image::{imageops::FilterType, ImageFormat, ImageReader};
use std::path::{Path, PathBuf};

use crate::utils::error::AppError;
use crate::utils::upload::StoredFile;

/// Profile pictures are shrunk to fit inside this box, never enlarged.
pub const MAX_DIMENSION: u32 = 800;

const SIZE_UNITS: &[&str] = &["Bytes", "KB", "MB", "GB", "TB", "PB", "EB", "ZB", "YB"];

#[derive(Debug, Clone, PartialEq)]
pub struct SizeReduction {
    pub original_size: u64,
    pub processed_size: u64,
}

impl SizeReduction {
    pub fn reduction(&self) -> i64 {
        self.original_size as i64 - self.processed_size as i64
    }

    pub fn percent(&self) -> f64 {
        if self.original_size == 0 {
            return 0.0;
        }
        self.reduction() as f64 / self.original_size as f64 * 100.0
    }
}

/// `1536` -> `1.5 KB`, `0` -> `0 Bytes`.
pub fn format_bytes(bytes: i64) -> String {
    if bytes == 0 {
        return "0 Bytes".to_string();
    }

    let sign = if bytes < 0 { "-" } else { "" };
    let magnitude = bytes.unsigned_abs() as f64;
    let exp = ((magnitude.ln() / 1024f64.ln()).floor() as usize).min(SIZE_UNITS.len() - 1);
    let value = magnitude / 1024f64.powi(exp as i32);

    let rounded = format!("{:.2}", value);
    let trimmed = rounded.trim_end_matches('0').trim_end_matches('.');
    format!("{}{} {}", sign, trimmed, SIZE_UNITS[exp])
}

fn is_raster(content_type: &str) -> bool {
    content_type.starts_with("image/") && content_type != "image/svg+xml"
}

/// `1700_me.jpg` -> `resized-1700_me.png`
fn resized_name(file_name: &str) -> String {
    let stem = Path::new(file_name)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(file_name);
    format!("resized-{}.png", stem)
}

/// Decodes `source`, fits it inside `MAX_DIMENSION` and writes it as PNG to `target`.
pub fn resize_to_png(source: &Path, target: &Path) -> Result<(), AppError> {
    let img = ImageReader::open(source)?
        .with_guessed_format()?
        .decode()
        .map_err(|e| AppError::Internal(format!("Failed to decode image: {}", e)))?;

    let img = if img.width() > MAX_DIMENSION || img.height() > MAX_DIMENSION {
        img.resize(MAX_DIMENSION, MAX_DIMENSION, FilterType::Lanczos3)
    } else {
        img
    };

    img.save_with_format(target, ImageFormat::Png)
        .map_err(|e| AppError::Internal(format!("Failed to write image: {}", e)))
}

/// Best-effort removal; a file that is already gone is fine.
fn discard(path: &Path) {
    match std::fs::remove_file(path) {
        Ok(()) => {}
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => log::warn!("⚠️  Could not remove {}: {}", path.display(), e),
    }
}

/// Deletes the uploaded original once `resized` is written. If that fails the
/// resized copy goes instead, so only one of the two stays on disk.
fn replace_original(original: &Path, resized: &Path) -> Result<(), AppError> {
    if let Err(e) = std::fs::remove_file(original) {
        log::warn!("⚠️  Could not remove original {}: {}", original.display(), e);
        discard(resized);
        return Err(e.into());
    }
    Ok(())
}

fn process_blocking(stored: &StoredFile) -> Result<(StoredFile, SizeReduction), AppError> {
    let original_size = std::fs::metadata(&stored.path)?.len();

    let file_name = resized_name(&stored.file_name);
    let target: PathBuf = stored
        .path
        .parent()
        .map(|dir| dir.join(&file_name))
        .unwrap_or_else(|| PathBuf::from(&file_name));

    if let Err(e) = resize_to_png(&stored.path, &target) {
        // never leave a half-written resized file behind
        discard(&target);
        return Err(e);
    }

    let processed_size = match std::fs::metadata(&target) {
        Ok(meta) => meta.len(),
        Err(e) => {
            discard(&target);
            return Err(e.into());
        }
    };
    replace_original(&stored.path, &target)?;

    let processed = StoredFile {
        original_name: stored.original_name.clone(),
        file_name,
        path: target,
        size: processed_size,
        content_type: "image/png".to_string(),
    };

    Ok((
        processed,
        SizeReduction {
            original_size,
            processed_size,
        },
    ))
}

/// Resizes an uploaded profile picture on the blocking pool.
///
/// Anything that cannot be decoded (SVG, AVIF, corrupt files) is kept as uploaded.
pub async fn process_profile_picture(stored: StoredFile) -> StoredFile {
    if !is_raster(&stored.content_type) {
        return stored;
    }

    let input = stored.clone();
    let result = tokio::task::spawn_blocking(move || process_blocking(&input)).await;

    match result {
        Ok(Ok((processed, sizes))) => {
            log::info!("🖼️  File: {}", processed.file_name);
            log::info!("   Original size: {}", format_bytes(sizes.original_size as i64));
            log::info!("   Processed size: {}", format_bytes(sizes.processed_size as i64));
            log::info!(
                "   Reduction: {} ({:.2}%)",
                format_bytes(sizes.reduction()),
                sizes.percent()
            );
            processed
        }
        Ok(Err(e)) => {
            log::error!("❌ Error processing file {}: {}", stored.file_name, e);
            stored
        }
        Err(e) => {
            log::error!("❌ Image task failed for {}: {}", stored.file_name, e);
            stored
        }
    }
}
