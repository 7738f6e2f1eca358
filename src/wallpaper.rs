// Wallpaper file intake for the settings page: type and size checks, then
// encoding into the data URI the preference store keeps.

use base64::Engine as _;
use std::path::Path;

/// Default upper bound on wallpaper files (5 MiB).
pub const MAX_WALLPAPER_BYTES: u64 = 5 * 1024 * 1024;

#[derive(Debug, thiserror::Error)]
pub enum WallpaperError {
    #[error("please choose an image file (got {0})")]
    UnsupportedType(String),
    #[error("image is too large ({size} bytes, limit {limit})")]
    TooLarge { size: u64, limit: u64 },
    #[error("could not read image: {0}")]
    Io(#[from] std::io::Error),
}

/// MIME type from the file extension; `None` when unrecognized.
pub fn guess_mime(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    let mime = match ext.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "bmp" => "image/bmp",
        "svg" => "image/svg+xml",
        "avif" => "image/avif",
        "heic" => "image/heic",
        _ => return None,
    };
    Some(mime)
}

pub fn validate(mime: &str, size: u64, limit: u64) -> Result<(), WallpaperError> {
    if !mime.starts_with("image/") {
        return Err(WallpaperError::UnsupportedType(mime.to_string()));
    }
    if size > limit {
        return Err(WallpaperError::TooLarge { size, limit });
    }
    Ok(())
}

pub fn to_data_uri(mime: &str, bytes: &[u8]) -> String {
    let encoded = base64::engine::general_purpose::STANDARD.encode(bytes);
    format!("data:{mime};base64,{encoded}")
}

/// Validate and encode the file at `path`. Nothing is read past the
/// metadata when validation fails.
pub fn load_data_uri(path: &Path, limit: u64) -> Result<String, WallpaperError> {
    let mime = guess_mime(path).unwrap_or("application/octet-stream");
    let size = std::fs::metadata(path)?.len();
    validate(mime, size, limit)?;
    let bytes = std::fs::read(path)?;
    Ok(to_data_uri(mime, &bytes))
}
