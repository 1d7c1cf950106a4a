//! Best-effort resolution of optional assets.
//!
//! Every resolver returns `Option`: `None` selects the fallback (builtin
//! Helvetica, no background). Problems are logged and recorded as
//! [`AssetWarning`]s; none of them abort rendering.

use std::fs;
use std::path::{Path, PathBuf};

use printpdf::RawImage;

use crate::error::AssetWarning;
use crate::fonts::{CustomFonts, FontData};

/// File names of the custom family inside the fonts directory.
pub const REGULAR_FONT_FILE: &str = "HelveticaNeueLight.ttf";
pub const BOLD_FONT_FILE: &str = "HelveticaNeueBold.ttf";
pub const ITALIC_FONT_FILE: &str = "HelveticaNeueItalic.ttf";

/// Accepted background file names, in lookup order.
pub const BACKGROUND_FILES: [&str; 2] = ["base.jpg", "base.png"];

/// A decoded background image.
pub struct Background {
    pub path: PathBuf,
    pub image: RawImage,
    pub px_width: u32,
    pub px_height: u32,
}

/// Load the custom family from `fonts_dir`.
///
/// A missing directory quietly selects the builtin family. A missing or
/// broken file inside an existing directory is reported, and the whole
/// family falls back so faces are never mixed.
pub fn resolve_custom_fonts(
    fonts_dir: &Path,
    warnings: &mut Vec<AssetWarning>,
) -> Option<CustomFonts> {
    if !fonts_dir.is_dir() {
        log::debug!(
            "No fonts directory at '{}', using builtin Helvetica",
            fonts_dir.display()
        );
        return None;
    }

    let regular = load_font(&fonts_dir.join(REGULAR_FONT_FILE), warnings)?;
    let bold = load_font(&fonts_dir.join(BOLD_FONT_FILE), warnings)?;
    let italic = load_font(&fonts_dir.join(ITALIC_FONT_FILE), warnings)?;

    log::debug!("Using custom fonts from '{}'", fonts_dir.display());
    Some(CustomFonts {
        regular,
        bold,
        italic,
    })
}

fn load_font(path: &Path, warnings: &mut Vec<AssetWarning>) -> Option<FontData> {
    if !path.is_file() {
        warn(warnings, AssetWarning::MissingFont(path.to_path_buf()));
        return None;
    }
    let loaded = fs::read(path)
        .map_err(|e| e.to_string())
        .and_then(FontData::from_bytes);
    match loaded {
        Ok(data) => Some(data),
        Err(reason) => {
            warn(
                warnings,
                AssetWarning::UnreadableFont {
                    path: path.to_path_buf(),
                    reason,
                },
            );
            None
        }
    }
}

/// Load the first existing candidate. Only that file is tried: if it cannot
/// be decoded the invoice is drawn without a background.
pub fn resolve_background(
    candidates: &[PathBuf],
    warnings: &mut Vec<AssetWarning>,
) -> Option<Background> {
    let path = candidates.iter().find(|p| p.is_file())?;

    match load_background(path) {
        Ok(background) => {
            log::debug!(
                "Using background '{}' ({}x{} px)",
                path.display(),
                background.px_width,
                background.px_height
            );
            Some(background)
        }
        Err(reason) => {
            warn(
                warnings,
                AssetWarning::UnreadableBackground {
                    path: path.clone(),
                    reason,
                },
            );
            None
        }
    }
}

fn load_background(path: &Path) -> Result<Background, String> {
    let bytes = fs::read(path).map_err(|e| e.to_string())?;

    // Decode with the `image` crate to validate and obtain pixel dimensions.
    let decoded = ::image::load_from_memory(&bytes).map_err(|e| format!("decode error: {e}"))?;
    let (px_width, px_height) = (decoded.width(), decoded.height());
    if px_width == 0 || px_height == 0 {
        return Err("image has no pixels".to_string());
    }

    let image = RawImage::decode_from_bytes(&bytes, &mut Vec::new())
        .map_err(|e| format!("PDF encode error: {e}"))?;

    Ok(Background {
        path: path.to_path_buf(),
        image,
        px_width,
        px_height,
    })
}

fn warn(warnings: &mut Vec<AssetWarning>, warning: AssetWarning) {
    log::warn!("{warning}");
    warnings.push(warning);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fonts_dir_is_silent() {
        let dir = tempfile::tempdir().unwrap();
        let mut warnings = Vec::new();
        let fonts = resolve_custom_fonts(&dir.path().join("fonts"), &mut warnings);
        assert!(fonts.is_none());
        assert!(warnings.is_empty());
    }

    #[test]
    fn incomplete_fonts_dir_warns_and_falls_back() {
        let dir = tempfile::tempdir().unwrap();
        let fonts_dir = dir.path().join("fonts");
        fs::create_dir(&fonts_dir).unwrap();
        fs::write(fonts_dir.join(REGULAR_FONT_FILE), b"not a font").unwrap();

        let mut warnings = Vec::new();
        assert!(resolve_custom_fonts(&fonts_dir, &mut warnings).is_none());
        assert_eq!(warnings.len(), 1);
        assert!(matches!(warnings[0], AssetWarning::UnreadableFont { .. }));
    }

    #[test]
    fn empty_fonts_dir_reports_missing_regular() {
        let dir = tempfile::tempdir().unwrap();
        let mut warnings = Vec::new();
        assert!(resolve_custom_fonts(dir.path(), &mut warnings).is_none());
        assert_eq!(
            warnings,
            vec![AssetWarning::MissingFont(dir.path().join(REGULAR_FONT_FILE))]
        );
    }

    #[test]
    fn no_background_candidates_exist() {
        let dir = tempfile::tempdir().unwrap();
        let candidates: Vec<PathBuf> = BACKGROUND_FILES.iter().map(|f| dir.path().join(f)).collect();
        let mut warnings = Vec::new();
        assert!(resolve_background(&candidates, &mut warnings).is_none());
        assert!(warnings.is_empty());
    }

    #[test]
    fn corrupt_background_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("base.jpg"), b"\xFF\xD8 truncated").unwrap();
        let candidates: Vec<PathBuf> = BACKGROUND_FILES.iter().map(|f| dir.path().join(f)).collect();
        let mut warnings = Vec::new();
        assert!(resolve_background(&candidates, &mut warnings).is_none());
        assert!(matches!(
            warnings.as_slice(),
            [AssetWarning::UnreadableBackground { .. }]
        ));
    }
}
