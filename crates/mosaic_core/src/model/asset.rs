//! Filename rules for uploaded images referenced by settings.
//!
//! The upload layer stores the bytes; core only sees the resolved filename.

/// Extensions accepted for logo uploads.
pub const LOGO_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "svg"];
/// Extensions accepted for symbol uploads.
pub const SYMBOL_EXTENSIONS: &[&str] = &["png"];

/// Returns whether `filename` ends with one of `allowed` (case-insensitive).
pub fn has_allowed_extension(filename: &str, allowed: &[&str]) -> bool {
    match filename.rsplit_once('.') {
        Some((stem, extension)) if !stem.is_empty() => {
            let extension = extension.to_ascii_lowercase();
            allowed.contains(&extension.as_str())
        }
        _ => false,
    }
}

/// Returns whether `filename` names a file directly inside the asset folder.
pub fn is_bare_filename(filename: &str) -> bool {
    !filename.is_empty()
        && filename == filename.trim()
        && !filename.contains(['/', '\\'])
        && filename != "."
        && filename != ".."
}
