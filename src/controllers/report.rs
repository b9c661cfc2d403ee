//! Public crime report form and the password-gated admin panel.

use crate::models::report::{Report, ReportForm, ReportsResponse};
use crate::services::api_client::PortalApi;
use crate::ui::{escape_html, Toast};
use chrono::NaiveDateTime;
use std::sync::Arc;
use tracing::{error, info};

pub const EXPORT_FILE_NAME: &str = "crime_reports.csv";

pub const CRIME_TYPES: &[(&str, &str)] = &[
    ("theft", "Theft"),
    ("burglary", "Burglary"),
    ("assault", "Assault"),
    ("fraud", "Fraud"),
    ("cybercrime", "Cybercrime"),
    ("vandalism", "Vandalism"),
    ("harassment", "Harassment"),
    ("other", "Other"),
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReportSection {
    Form,
    Success { report_id: Option<u64> },
}

impl ReportSection {
    /// A success answer without an id still confirms the submission.
    pub fn report_id_text(&self) -> String {
        match self {
            ReportSection::Success {
                report_id: Some(id),
            } => format!("Report ID: {}", id),
            _ => "Report ID: unknown".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdminView {
    Login,
    Reports,
}

/// The admin password as typed, resent with every privileged request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AdminSession {
    pub password: String,
    pub logged_in: bool,
}

impl AdminSession {
    pub fn clear(&mut self) {
        self.password.clear();
        self.logged_in = false;
    }

    pub fn is_active(&self) -> bool {
        self.logged_in && !self.password.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PendingConfirmation {
    DeleteReport(u64),
    DeleteAll,
}

impl PendingConfirmation {
    pub fn prompt(&self) -> String {
        match self {
            PendingConfirmation::DeleteReport(id) => {
                format!("Are you sure you want to delete Report #{}?", id)
            }
            PendingConfirmation::DeleteAll => {
                "Are you sure you want to delete ALL reports? This action cannot be undone!"
                    .to_string()
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportLink {
    pub href: String,
    pub filename: &'static str,
}

#[derive(Debug, Clone)]
pub struct ReportState {
    pub section: ReportSection,
    /// Field values echoed back into the form.
    pub form: ReportForm,
    pub admin_panel_open: bool,
    pub admin_view: AdminView,
    pub admin: AdminSession,
    pub reports: Vec<Report>,
    pub pending_confirmation: Option<PendingConfirmation>,
    pub download: Option<ExportLink>,
    pub toast: Option<Toast>,
}

impl Default for ReportState {
    fn default() -> Self {
        Self {
            section: ReportSection::Form,
            form: ReportForm::default(),
            admin_panel_open: false,
            admin_view: AdminView::Login,
            admin: AdminSession::default(),
            reports: Vec::new(),
            pending_confirmation: None,
            download: None,
            toast: None,
        }
    }
}

pub struct ReportController {
    api: Arc<dyn PortalApi>,
}

impl ReportController {
    pub fn new(api: Arc<dyn PortalApi>) -> Self {
        Self { api }
    }

    pub async fn handle_form_submit(&self, state: &mut ReportState, form: ReportForm) {
        state.form = form;

        let result = self.api.submit_report(&state.form).await;
        match result {
            Ok(response) if response.success => {
                info!("Report submitted, id {:?}", response.report_id);
                state.section = ReportSection::Success {
                    report_id: response.report_id,
                };
                state.form = ReportForm::default();
                state.toast = Some(Toast::success("Report submitted successfully!"));
            }
            Ok(response) => {
                let reason = response.error.unwrap_or_else(|| "Unknown error".to_string());
                state.toast = Some(Toast::error(format!("Error: {}", reason)));
            }
            Err(e) => {
                error!("Report submission failed: {}", e);
                state.toast = Some(Toast::error("Failed to submit report. Please try again."));
            }
        }
    }

    pub fn new_report(&self, state: &mut ReportState) {
        state.section = ReportSection::Form;
        state.form = ReportForm::default();
    }

    pub fn open_admin_panel(&self, state: &mut ReportState) {
        state.admin_panel_open = true;
        state.admin_view = AdminView::Login;
    }

    pub fn close_admin_panel(&self, state: &mut ReportState) {
        state.admin_panel_open = false;
        state.admin.clear();
        state.reports.clear();
        state.pending_confirmation = None;
    }

    pub async fn handle_admin_login(&self, state: &mut ReportState, password: &str) {
        if password.is_empty() {
            state.toast = Some(Toast::error("Please enter a password"));
            return;
        }

        state.admin.password = password.to_string();

        match self.api.list_reports(password).await {
            Ok(ReportsResponse::Rejected { error }) => {
                info!("Admin login rejected: {}", error);
                state.admin.clear();
                state.toast = Some(Toast::error("Incorrect password"));
            }
            Ok(ReportsResponse::Listed { reports, .. }) => {
                state.admin.logged_in = true;
                state.admin_view = AdminView::Reports;
                self.display_reports(state, reports);
            }
            Err(e) => {
                error!("Loading reports failed: {}", e);
                state.admin.clear();
                state.toast = Some(Toast::error("Failed to load reports"));
            }
        }
    }

    pub fn handle_admin_logout(&self, state: &mut ReportState) {
        state.admin.clear();
        state.admin_view = AdminView::Login;
        state.reports.clear();
        state.pending_confirmation = None;
    }

    pub async fn handle_refresh_reports(&self, state: &mut ReportState) {
        if !state.admin.is_active() {
            state.toast = Some(Toast::error("Please login first"));
            return;
        }

        let result = self.api.list_reports(&state.admin.password).await;
        match result {
            Ok(ReportsResponse::Listed { reports, .. }) => {
                self.display_reports(state, reports);
                state.toast = Some(Toast::success("Reports refreshed"));
            }
            Ok(ReportsResponse::Rejected { error }) => {
                error!("Refreshing reports rejected: {}", error);
                state.toast = Some(Toast::error("Failed to refresh reports"));
            }
            Err(e) => {
                error!("Refreshing reports failed: {}", e);
                state.toast = Some(Toast::error("Failed to refresh reports"));
            }
        }
    }

    /// Asks before deleting. Only the backend checks the password here.
    pub async fn handle_delete_report<F>(&self, state: &mut ReportState, id: u64, confirm: F)
    where
        F: FnOnce(&str) -> bool + Send,
    {
        if !confirm(&PendingConfirmation::DeleteReport(id).prompt()) {
            return;
        }

        let result = self.api.delete_report(id, &state.admin.password).await;
        match result {
            Ok(response) if response.success => {
                state.toast = Some(Toast::success("Report deleted successfully"));
                self.handle_refresh_reports(state).await;
            }
            Ok(response) => {
                let reason = response.error.unwrap_or_else(|| "Unknown error".to_string());
                state.toast = Some(Toast::error(format!("Error: {}", reason)));
            }
            Err(e) => {
                error!("Deleting report {} failed: {}", id, e);
                state.toast = Some(Toast::error("Failed to delete report"));
            }
        }
    }

    pub async fn handle_delete_all_reports<F>(&self, state: &mut ReportState, confirm: F)
    where
        F: FnOnce(&str) -> bool + Send,
    {
        if !state.admin.is_active() {
            state.toast = Some(Toast::error("Please login first"));
            return;
        }

        if !confirm(&PendingConfirmation::DeleteAll.prompt()) {
            return;
        }

        let result = self.api.delete_all_reports(&state.admin.password).await;
        match result {
            Ok(response) if response.success => {
                state.toast = Some(Toast::success("All reports deleted successfully"));
                self.handle_refresh_reports(state).await;
            }
            Ok(response) => {
                let reason = response.error.unwrap_or_else(|| "Unknown error".to_string());
                state.toast = Some(Toast::error(format!("Error: {}", reason)));
            }
            Err(e) => {
                error!("Deleting all reports failed: {}", e);
                state.toast = Some(Toast::error("Failed to delete all reports"));
            }
        }
    }

    /// Records a destructive action and waits for the user's answer.
    /// Delete-all is refused up front without an admin session.
    pub fn request_confirmation(&self, state: &mut ReportState, action: PendingConfirmation) {
        if action == PendingConfirmation::DeleteAll && !state.admin.is_active() {
            state.toast = Some(Toast::error("Please login first"));
            return;
        }
        state.pending_confirmation = Some(action);
    }

    pub async fn resolve_confirmation(&self, state: &mut ReportState, accepted: bool) {
        let Some(action) = state.pending_confirmation.take() else {
            return;
        };

        match action {
            PendingConfirmation::DeleteReport(id) => {
                self.handle_delete_report(state, id, |_| accepted).await
            }
            PendingConfirmation::DeleteAll => {
                self.handle_delete_all_reports(state, |_| accepted).await
            }
        }
    }

    pub fn handle_export_reports(&self, state: &mut ReportState) {
        if !state.admin.is_active() {
            state.toast = Some(Toast::error("Please login first"));
            return;
        }

        state.download = Some(ExportLink {
            href: self.api.export_url(&state.admin.password),
            filename: EXPORT_FILE_NAME,
        });
        state.toast = Some(Toast::success("Exporting reports to CSV..."));
    }

    pub fn display_reports(&self, state: &mut ReportState, reports: Vec<Report>) {
        state.reports = reports;
    }
}

pub fn report_count(reports: &[Report]) -> String {
    format!("Total Reports: {}", reports.len())
}

/// Markup for the admin report list. User-supplied text is escaped.
pub fn render_reports(reports: &[Report]) -> String {
    if reports.is_empty() {
        return r#"<p class="no-reports">No reports submitted yet.</p>"#.to_string();
    }

    reports
        .iter()
        .map(|report| {
            format!(
                r#"
        <div class="report-item">
            <div class="report-header">
                <h3>Report #{id} - {crime_type}</h3>
                <span class="report-status {status}">{status}</span>
            </div>
            <div class="report-details">
                <p><strong>Name:</strong> {name}</p>
                <p><strong>Email:</strong> {email}</p>
                <p><strong>Phone:</strong> {phone}</p>
                <p><strong>Location:</strong> {location}</p>
                <p><strong>Date:</strong> {date}</p>
                <p><strong>Description:</strong></p>
                <p class="report-description">{description}</p>
                <p class="report-submitted">Submitted: {submitted}</p>
            </div>
            <div class="report-actions">
                <form method="post" action="/report/admin/reports/{id}/delete">
                    <button class="btn-delete" type="submit">Delete Report</button>
                </form>
            </div>
        </div>"#,
                id = report.id,
                crime_type = escape_html(&report.crime_type),
                status = report.status,
                name = escape_html(&report.name),
                email = escape_html(&report.email),
                phone = escape_html(&report.phone),
                location = escape_html(&report.location),
                date = escape_html(&report.date),
                description = escape_html(&report.description),
                submitted = escape_html(&format_timestamp(&report.timestamp)),
            )
        })
        .collect()
}

fn format_timestamp(timestamp: &str) -> String {
    NaiveDateTime::parse_from_str(timestamp, "%Y-%m-%dT%H:%M:%S%.f")
        .map(|t| t.format("%d/%m/%Y, %H:%M:%S").to_string())
        .unwrap_or_else(|_| timestamp.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ApiError;
    use crate::models::report::{ActionResponse, ReportStatus, SubmitResponse};
    use crate::services::api_client::MockPortalApi;
    use mockall::predicate::{always, eq};

    fn report(id: u64, name: &str) -> Report {
        Report {
            id,
            timestamp: "2024-05-02T14:03:11.120000".to_string(),
            name: name.to_string(),
            email: "asha@example.com".to_string(),
            phone: "9876543210".to_string(),
            location: "MG Road, Bengaluru".to_string(),
            crime_type: "theft".to_string(),
            description: "Wallet stolen on the bus".to_string(),
            date: "2024-05-01".to_string(),
            status: ReportStatus::Pending,
        }
    }

    fn filled_form() -> ReportForm {
        ReportForm {
            name: "Asha".into(),
            email: "asha@example.com".into(),
            phone: "9876543210".into(),
            location: "MG Road".into(),
            crime_type: "theft".into(),
            date: "2024-05-01".into(),
            description: "Wallet stolen".into(),
        }
    }

    fn logged_in_state() -> ReportState {
        let mut state = ReportState::default();
        state.admin = AdminSession {
            password: "admin123".into(),
            logged_in: true,
        };
        state.admin_view = AdminView::Reports;
        state
    }

    fn controller(api: MockPortalApi) -> ReportController {
        ReportController::new(Arc::new(api))
    }

    #[tokio::test]
    async fn successful_submit_shows_id_and_resets_form() {
        let mut api = MockPortalApi::new();
        api.expect_submit_report()
            .with(eq(filled_form()))
            .times(1)
            .returning(|_| {
                Ok(SubmitResponse {
                    success: true,
                    report_id: Some(17),
                    message: Some("Report submitted successfully".into()),
                    error: None,
                })
            });

        let mut state = ReportState::default();
        controller(api).handle_form_submit(&mut state, filled_form()).await;

        assert_eq!(
            state.section,
            ReportSection::Success {
                report_id: Some(17)
            }
        );
        assert_eq!(state.section.report_id_text(), "Report ID: 17");
        assert_eq!(state.form, ReportForm::default());
        assert_eq!(
            state.toast.unwrap().message,
            "Report submitted successfully!"
        );
    }

    #[tokio::test]
    async fn success_without_id_still_confirms() {
        let mut api = MockPortalApi::new();
        api.expect_submit_report().times(1).returning(|_| {
            Ok(SubmitResponse {
                success: true,
                ..SubmitResponse::default()
            })
        });

        let mut state = ReportState::default();
        controller(api).handle_form_submit(&mut state, filled_form()).await;

        assert_eq!(state.section, ReportSection::Success { report_id: None });
        assert_eq!(state.section.report_id_text(), "Report ID: unknown");
    }

    #[tokio::test]
    async fn rejected_submit_keeps_the_form() {
        let mut api = MockPortalApi::new();
        api.expect_submit_report().returning(|_| {
            Ok(SubmitResponse {
                success: false,
                error: Some("Missing required field: phone".into()),
                ..SubmitResponse::default()
            })
        });

        let mut state = ReportState::default();
        controller(api).handle_form_submit(&mut state, filled_form()).await;

        assert_eq!(state.section, ReportSection::Form);
        assert_eq!(state.form, filled_form());
        assert_eq!(
            state.toast.unwrap().message,
            "Error: Missing required field: phone"
        );
    }

    #[tokio::test]
    async fn network_failure_asks_to_retry() {
        let mut api = MockPortalApi::new();
        api.expect_submit_report()
            .returning(|_| Err(ApiError::Decode("expected value".into())));

        let mut state = ReportState::default();
        controller(api).handle_form_submit(&mut state, filled_form()).await;
        assert_eq!(
            state.toast.unwrap().message,
            "Failed to submit report. Please try again."
        );
    }

    #[tokio::test]
    async fn rejected_admin_login_clears_password() {
        let mut api = MockPortalApi::new();
        api.expect_list_reports()
            .with(eq("wrong"))
            .times(1)
            .returning(|_| {
                Ok(ReportsResponse::Rejected {
                    error: "Unauthorized".into(),
                })
            });

        let mut state = ReportState::default();
        let controller = controller(api);
        controller.open_admin_panel(&mut state);
        controller.handle_admin_login(&mut state, "wrong").await;

        assert!(!state.admin.logged_in);
        assert!(state.admin.password.is_empty());
        assert_eq!(state.admin_view, AdminView::Login);
        assert_eq!(state.toast.unwrap().message, "Incorrect password");
    }

    #[tokio::test]
    async fn admin_login_displays_exact_list() {
        let listed = vec![report(1, "Asha"), report(2, "Ravi")];
        let returned = listed.clone();
        let mut api = MockPortalApi::new();
        api.expect_list_reports()
            .with(eq("admin123"))
            .times(1)
            .returning(move |_| {
                Ok(ReportsResponse::Listed {
                    reports: returned.clone(),
                    count: 2,
                })
            });

        let mut state = ReportState::default();
        controller(api).handle_admin_login(&mut state, "admin123").await;

        assert!(state.admin.logged_in);
        assert_eq!(state.admin.password, "admin123");
        assert_eq!(state.admin_view, AdminView::Reports);
        assert_eq!(state.reports, listed);
        assert_eq!(report_count(&state.reports), "Total Reports: 2");
    }

    #[tokio::test]
    async fn empty_password_sends_nothing() {
        let api = MockPortalApi::new();
        let mut state = ReportState::default();
        controller(api).handle_admin_login(&mut state, "").await;
        assert_eq!(state.toast.unwrap().message, "Please enter a password");
    }

    #[tokio::test]
    async fn refresh_and_export_require_login() {
        let api = MockPortalApi::new();
        let controller = controller(api);
        let mut state = ReportState::default();

        controller.handle_refresh_reports(&mut state).await;
        assert_eq!(state.toast.as_ref().unwrap().message, "Please login first");

        state.toast = None;
        controller.handle_export_reports(&mut state);
        assert_eq!(state.toast.as_ref().unwrap().message, "Please login first");
        assert!(state.download.is_none());
    }

    #[tokio::test]
    async fn declined_delete_issues_no_request() {
        // No expectations: any backend call would panic.
        let api = MockPortalApi::new();
        let controller = controller(api);
        let mut state = logged_in_state();

        let mut asked = String::new();
        controller
            .handle_delete_report(&mut state, 4, |prompt| {
                asked = prompt.to_string();
                false
            })
            .await;
        assert_eq!(asked, "Are you sure you want to delete Report #4?");

        controller.request_confirmation(&mut state, PendingConfirmation::DeleteAll);
        controller.resolve_confirmation(&mut state, false).await;
        assert!(state.pending_confirmation.is_none());
        assert!(state.toast.is_none());
    }

    #[tokio::test]
    async fn confirmed_delete_refreshes_the_list() {
        let mut api = MockPortalApi::new();
        api.expect_delete_report()
            .with(eq(4), eq("admin123"))
            .times(1)
            .returning(|_, _| Ok(ActionResponse::ok("Report deleted successfully")));
        api.expect_list_reports()
            .with(always())
            .times(1)
            .returning(|_| {
                Ok(ReportsResponse::Listed {
                    reports: vec![report(1, "Asha")],
                    count: 1,
                })
            });

        let controller = controller(api);
        let mut state = logged_in_state();
        controller.request_confirmation(&mut state, PendingConfirmation::DeleteReport(4));
        controller.resolve_confirmation(&mut state, true).await;

        assert_eq!(state.reports.len(), 1);
        assert_eq!(state.toast.unwrap().message, "Reports refreshed");
    }

    #[tokio::test]
    async fn delete_does_not_check_local_login() {
        let mut api = MockPortalApi::new();
        api.expect_delete_report()
            .with(eq(9), eq(""))
            .times(1)
            .returning(|_, _| {
                Ok(ActionResponse {
                    success: false,
                    message: None,
                    error: Some("Unauthorized".into()),
                })
            });

        let mut state = ReportState::default();
        controller(api)
            .handle_delete_report(&mut state, 9, |_| true)
            .await;
        assert_eq!(state.toast.unwrap().message, "Error: Unauthorized");
    }

    #[tokio::test]
    async fn delete_all_failure_is_reported() {
        let mut api = MockPortalApi::new();
        api.expect_delete_all_reports()
            .times(1)
            .returning(|_| Err(ApiError::Decode("eof".into())));

        let mut state = logged_in_state();
        controller(api)
            .handle_delete_all_reports(&mut state, |_| true)
            .await;
        assert_eq!(state.toast.unwrap().message, "Failed to delete all reports");
    }

    #[tokio::test]
    async fn delete_all_requires_login() {
        // No expectations: any backend call would panic.
        let controller = controller(MockPortalApi::new());
        let mut state = ReportState::default();

        let mut asked = false;
        controller
            .handle_delete_all_reports(&mut state, |_| {
                asked = true;
                true
            })
            .await;
        assert!(!asked);
        assert_eq!(state.toast.as_ref().unwrap().message, "Please login first");

        state.toast = None;
        controller.request_confirmation(&mut state, PendingConfirmation::DeleteAll);
        assert!(state.pending_confirmation.is_none());
        assert_eq!(state.toast.unwrap().message, "Please login first");
    }

    #[test]
    fn export_builds_download_link() {
        let mut api = MockPortalApi::new();
        api.expect_export_url()
            .with(eq("admin123"))
            .returning(|_| "/api/reports/export?password=admin123".to_string());

        let mut state = logged_in_state();
        controller(api).handle_export_reports(&mut state);

        assert_eq!(
            state.download,
            Some(ExportLink {
                href: "/api/reports/export?password=admin123".into(),
                filename: "crime_reports.csv",
            })
        );
        assert_eq!(state.toast.unwrap().message, "Exporting reports to CSV...");
    }

    #[test]
    fn closing_the_panel_forgets_the_password() {
        let controller = controller(MockPortalApi::new());
        let mut state = logged_in_state();
        state.reports = vec![report(1, "Asha")];

        controller.close_admin_panel(&mut state);
        assert!(!state.admin_panel_open);
        assert_eq!(state.admin, AdminSession::default());
        assert!(state.reports.is_empty());
    }

    #[test]
    fn report_fields_are_escaped() {
        let mut hostile = report(3, "<script>alert(1)</script>");
        hostile.email = "<script>".into();
        hostile.location = "<img src=x onerror=alert(1)>".into();
        hostile.description = "<script>steal()</script>".into();

        let html = render_reports(&[hostile]);
        assert!(!html.contains("<script>"));
        assert!(!html.contains("<img"));
        assert!(html.contains("&lt;script&gt;alert(1)&lt;/script&gt;"));
        assert!(html.contains("<p><strong>Email:</strong> &lt;script&gt;</p>"));
    }

    #[test]
    fn empty_list_has_placeholder() {
        assert_eq!(report_count(&[]), "Total Reports: 0");
        assert!(render_reports(&[]).contains("No reports submitted yet."));
    }

    #[test]
    fn submitted_time_is_readable() {
        let html = render_reports(&[report(1, "Asha")]);
        assert!(html.contains("Submitted: 02/05/2024, 14:03:11"));
        assert!(html.contains(r#"<span class="report-status pending">pending</span>"#));
    }
}
