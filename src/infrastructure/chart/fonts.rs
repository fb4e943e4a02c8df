//! Font registration for chart text.
//!
//! plotters draws text through `ab_glyph`, which needs a TrueType font registered
//! under the family name used by the renderer. Registration is process-wide and
//! happens at most once.

use plotters::style::{FontStyle, register_font};
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use tracing::{info, warn};

pub const CHART_FONT_FAMILY: &str = "sans-serif";

// Cyrillic coverage is required for the axis labels
const SYSTEM_FONT_CANDIDATES: [&str; 7] = [
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu-sans-fonts/DejaVuSans.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
    "/System/Library/Fonts/Supplemental/Arial.ttf",
    "C:\\Windows\\Fonts\\arial.ttf",
];

static INSTALLED_FONT: OnceLock<Option<PathBuf>> = OnceLock::new();

/// Registers the chart font and reports whether text can be drawn.
///
/// `preferred` is tried first, then well-known system locations. Only the first call
/// performs registration; later calls return the cached outcome.
pub fn install_chart_font(preferred: Option<&Path>) -> bool {
    INSTALLED_FONT
        .get_or_init(|| {
            let candidates = preferred
                .map(Path::to_path_buf)
                .into_iter()
                .chain(SYSTEM_FONT_CANDIDATES.iter().map(PathBuf::from));

            for path in candidates {
                if try_register(&path) {
                    info!("Chart font registered from {}", path.display());
                    return Some(path);
                }
            }

            warn!("No usable chart font found; charts will be rendered without text");
            None
        })
        .is_some()
}

fn try_register(path: &Path) -> bool {
    let bytes = match std::fs::read(path) {
        Ok(bytes) => bytes,
        Err(_) => return false,
    };

    // plotters keeps a 'static reference for the lifetime of the process
    let bytes: &'static [u8] = Box::leak(bytes.into_boxed_slice());
    match register_font(CHART_FONT_FAMILY, FontStyle::Normal, bytes) {
        Ok(()) => true,
        Err(_) => {
            warn!("Ignoring chart font {}: invalid font data", path.display());
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_font_file_is_skipped() {
        assert!(!try_register(Path::new("/nonexistent/chart-font.ttf")));
    }

    #[test]
    fn test_non_font_file_is_rejected() {
        let path = std::env::temp_dir().join(format!("not_a_font_{}.ttf", uuid::Uuid::new_v4()));
        std::fs::write(&path, b"plain text, no glyph tables").unwrap();

        let registered = try_register(&path);
        let _ = std::fs::remove_file(&path);

        assert!(!registered);
    }
}
