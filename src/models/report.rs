use serde::{Deserialize, Serialize};
use std::fmt;

/// A submitted crime report as stored by the backend and listed to admins.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    pub id: u64,
    pub timestamp: String,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub location: String,
    pub crime_type: String,
    pub description: String,
    pub date: String,
    #[serde(default)]
    pub status: ReportStatus,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportStatus {
    #[default]
    Pending,
    Reviewed,
    Resolved,
    #[serde(other)]
    Unknown,
}

impl ReportStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReportStatus::Pending => "pending",
            ReportStatus::Reviewed => "reviewed",
            ReportStatus::Resolved => "resolved",
            ReportStatus::Unknown => "unknown",
        }
    }
}

impl fmt::Display for ReportStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The seven fields of the public report form, also the submit-report body.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReportForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub crime_type: String,
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub description: String,
}

impl ReportForm {
    /// Field names in the order the backend validates them.
    pub const REQUIRED_FIELDS: [&'static str; 7] = [
        "name",
        "email",
        "phone",
        "location",
        "crime_type",
        "description",
        "date",
    ];

    pub fn field(&self, name: &str) -> Option<&str> {
        let value = match name {
            "name" => &self.name,
            "email" => &self.email,
            "phone" => &self.phone,
            "location" => &self.location,
            "crime_type" => &self.crime_type,
            "date" => &self.date,
            "description" => &self.description,
            _ => return None,
        };
        Some(value.as_str())
    }

    /// First required field that is empty, if any. Whitespace counts as a value.
    pub fn missing_field(&self) -> Option<&'static str> {
        Self::REQUIRED_FIELDS
            .into_iter()
            .find(|name| self.field(name).map_or(true, str::is_empty))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SubmitResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub report_id: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Body of `GET /api/reports`: either the list or an `error` key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ReportsResponse {
    Rejected {
        error: String,
    },
    Listed {
        reports: Vec<Report>,
        #[serde(default)]
        count: usize,
    },
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ActionResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ActionResponse {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: Some(message.into()),
            error: None,
        }
    }
}
