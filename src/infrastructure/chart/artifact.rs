use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use uuid::Uuid;

const CHART_FILE_PREFIX: &str = "btc_analysis";

/// RAII guard for a request-scoped chart image.
///
/// Every allocation gets a unique name, so overlapping requests never share a file.
/// The file (if it was ever written) is removed when the guard drops, on success and
/// error paths alike.
#[derive(Debug)]
pub struct ChartFile {
    path: PathBuf,
}

impl ChartFile {
    pub fn allocate(dir: &Path) -> Self {
        Self {
            path: dir.join(format!("{}_{}.png", CHART_FILE_PREFIX, Uuid::new_v4().simple())),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for ChartFile {
    fn drop(&mut self) {
        match std::fs::remove_file(&self.path) {
            Ok(()) => debug!("ChartFile: removed {}", self.path.display()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => warn!("ChartFile: failed to remove {}: {}", self.path.display(), e),
        }
    }
}
