use crate::error::{PortalError, PortalResult};
use crate::models::report::{Report, ReportForm, ReportStatus};
use chrono::Local;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::sync::Mutex;
use tracing::info;

/// Crime reports persisted as a pretty-printed JSON array.
pub struct ReportStore {
    path: PathBuf,
    file_lock: Mutex<()>,
}

impl ReportStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            file_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub async fn list(&self) -> PortalResult<Vec<Report>> {
        let _guard = self.file_lock.lock().await;
        self.load().await
    }

    pub async fn create(&self, form: ReportForm) -> PortalResult<Report> {
        if let Some(field) = form.missing_field() {
            return Err(PortalError::Validation(format!(
                "Missing required field: {}",
                field
            )));
        }

        let _guard = self.file_lock.lock().await;
        let mut reports = self.load().await?;

        // Highest id plus one, so ids are never reused after a delete
        let id = reports.iter().map(|r| r.id).max().unwrap_or(0) + 1;
        let report = Report {
            id,
            timestamp: Local::now()
                .naive_local()
                .format("%Y-%m-%dT%H:%M:%S%.6f")
                .to_string(),
            name: form.name,
            email: form.email,
            phone: form.phone,
            location: form.location,
            crime_type: form.crime_type,
            description: form.description,
            date: form.date,
            status: ReportStatus::Pending,
        };

        reports.push(report.clone());
        self.save(&reports).await?;

        info!("New report submitted: ID {}", id);
        Ok(report)
    }

    pub async fn delete(&self, id: u64) -> PortalResult<()> {
        let _guard = self.file_lock.lock().await;
        let mut reports = self.load().await?;

        let before = reports.len();
        reports.retain(|r| r.id != id);
        if reports.len() == before {
            return Err(PortalError::NotFound("Report not found".to_string()));
        }

        self.save(&reports).await?;
        info!("Deleted report: ID {}", id);
        Ok(())
    }

    pub async fn delete_all(&self) -> PortalResult<()> {
        let _guard = self.file_lock.lock().await;
        self.save(&[]).await?;
        info!("Deleted all reports");
        Ok(())
    }

    /// All reports as CSV with a header row.
    pub async fn export_csv(&self) -> PortalResult<String> {
        let reports = self.list().await?;
        if reports.is_empty() {
            return Err(PortalError::NotFound("No reports to export".to_string()));
        }

        let mut writer = csv::Writer::from_writer(Vec::new());
        for report in &reports {
            writer.serialize(report)?;
        }
        let bytes = writer
            .into_inner()
            .map_err(|e| PortalError::Internal(e.to_string()))?;

        info!("Exported {} reports to CSV", reports.len());
        String::from_utf8(bytes).map_err(|e| PortalError::Internal(e.to_string()))
    }

    async fn load(&self) -> PortalResult<Vec<Report>> {
        match fs::read_to_string(&self.path).await {
            Ok(content) if content.trim().is_empty() => Ok(Vec::new()),
            Ok(content) => Ok(serde_json::from_str(&content)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Vec::new()),
            Err(e) => Err(e.into()),
        }
    }

    async fn save(&self, reports: &[Report]) -> PortalResult<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).await?;
        }

        // Atomic write: write to temp file then rename
        let mut temp = self.path.clone().into_os_string();
        temp.push(".tmp");
        fs::write(&temp, serde_json::to_string_pretty(reports)?).await?;
        fs::rename(&temp, &self.path).await?;

        Ok(())
    }
}
