use ab_glyph::FontArc;
use anyhow::{Context, Result};

/// Candidate locations for a usable interface font, checked in order after
/// the `GONOGO_FONT` override.
const FONT_SEARCH_PATHS: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/liberation/LiberationSans-Regular.ttf",
    "/Library/Fonts/Arial.ttf",
    "C:\\Windows\\Fonts\\arial.ttf",
];

/// Find a font for the on-screen text. `GONOGO_FONT` wins when set; any
/// parse failure there is an error rather than a silent fallback.
pub fn load_interface_font() -> Result<FontArc> {
    if let Ok(path) = std::env::var("GONOGO_FONT") {
        let bytes =
            std::fs::read(&path).with_context(|| format!("reading font override {path}"))?;
        return FontArc::try_from_vec(bytes)
            .with_context(|| format!("parsing font override {path}"));
    }

    for path in FONT_SEARCH_PATHS {
        if let Ok(bytes) = std::fs::read(path) {
            if let Ok(font) = FontArc::try_from_vec(bytes) {
                return Ok(font);
            }
        }
    }

    anyhow::bail!("no usable interface font found; set GONOGO_FONT to a .ttf path")
}
