use crate::error::{PortalError, PortalResult};
use std::path::{Component, Path, PathBuf};
use tokio::fs;
use tracing::{info, warn};

/// Pre-rendered chart images served from a folder on disk.
pub struct ChartStore {
    folder: PathBuf,
}

impl ChartStore {
    pub fn new(folder: impl Into<PathBuf>) -> Self {
        Self {
            folder: folder.into(),
        }
    }

    /// First candidate folder that exists, else the first candidate.
    pub fn resolve(candidates: &[PathBuf]) -> PathBuf {
        candidates
            .iter()
            .find(|p| p.is_dir())
            .or_else(|| candidates.first())
            .cloned()
            .unwrap_or_else(|| PathBuf::from("charts"))
    }

    pub fn folder(&self) -> &Path {
        &self.folder
    }

    pub fn folder_exists(&self) -> bool {
        self.folder.is_dir()
    }

    pub async fn ensure_folder(&self) -> PortalResult<()> {
        if !self.folder_exists() {
            warn!("Charts folder does not exist, creating {}", self.folder.display());
            fs::create_dir_all(&self.folder).await?;
        } else {
            let charts = self.available().await;
            info!("Found {} chart files: {:?}", charts.len(), charts);
        }
        Ok(())
    }

    /// Sorted `.png` file names in the folder.
    pub async fn available(&self) -> Vec<String> {
        let mut charts = Vec::new();

        if let Ok(mut entries) = fs::read_dir(&self.folder).await {
            while let Ok(Some(entry)) = entries.next_entry().await {
                let name = entry.file_name().to_string_lossy().to_string();
                if name.ends_with(".png") {
                    charts.push(name);
                }
            }
        }

        charts.sort();
        charts
    }

    /// Reads a chart by name, `None` when no such file exists.
    pub async fn read(&self, name: &str) -> PortalResult<Option<Vec<u8>>> {
        if !is_plain_file_name(name) {
            return Err(PortalError::Validation(format!("Invalid chart name: {}", name)));
        }

        let path = self.folder.join(name);
        match fs::read(&path).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

/// A single normal path component: no separators, no `.` or `..`.
pub fn is_plain_file_name(name: &str) -> bool {
    if name.contains(|c: char| c == '/' || c == '\\') {
        return false;
    }
    let mut components = Path::new(name).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    )
}

/// Accepts `state` as well as `state.png`.
pub fn chart_file_name(name: &str) -> String {
    if name.ends_with(".png") {
        name.to_string()
    } else {
        format!("{}.png", name)
    }
}
