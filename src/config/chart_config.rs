//! Chart rendering configuration parsing from environment variables.

use super::{EnvLookup, parse_or};
use anyhow::Result;
use std::path::PathBuf;

/// Largest accepted image side in pixels
pub const MAX_CHART_DIMENSION: u32 = 8000;

/// Chart image environment configuration
#[derive(Debug, Clone)]
pub struct ChartEnvConfig {
    pub width: u32,
    pub height: u32,
    /// Directory for request-scoped PNG files
    pub output_dir: PathBuf,
    /// TrueType font for titles and axis labels; system locations are probed when unset
    pub font_path: Option<PathBuf>,
}

impl Default for ChartEnvConfig {
    fn default() -> Self {
        // 12x8 inches at 150 dpi
        Self {
            width: 1800,
            height: 1200,
            output_dir: std::env::temp_dir(),
            font_path: None,
        }
    }
}

impl ChartEnvConfig {
    pub fn from_lookup(lookup: EnvLookup<'_>) -> Result<Self> {
        let defaults = Self::default();

        let width = parse_or(lookup, "CHART_WIDTH", defaults.width)?;
        let height = parse_or(lookup, "CHART_HEIGHT", defaults.height)?;
        if width < 320 || height < 240 {
            anyhow::bail!(
                "Chart size {}x{} is too small (minimum 320x240)",
                width,
                height
            );
        }
        if width > MAX_CHART_DIMENSION || height > MAX_CHART_DIMENSION {
            anyhow::bail!(
                "Chart size {}x{} is too large (maximum {}x{})",
                width,
                height,
                MAX_CHART_DIMENSION,
                MAX_CHART_DIMENSION
            );
        }

        Ok(Self {
            width,
            height,
            output_dir: lookup("CHART_OUTPUT_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.output_dir),
            font_path: lookup("CHART_FONT_PATH")
                .filter(|p| !p.trim().is_empty())
                .map(PathBuf::from),
        })
    }
}
