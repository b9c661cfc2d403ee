use crate::controllers::dashboard::DashboardController;
use crate::controllers::report::ReportController;
use crate::models::config::AppConfig;
use crate::services::api_client::PortalApi;
use crate::services::auth::AdminAuth;
use crate::services::charts::ChartStore;
use crate::services::report_store::ReportStore;
use anyhow::Result;
use axum::{
    routing::{delete, get, post},
    Router,
};
use std::sync::Arc;
use tower_cookies::CookieManagerLayer;
use tower_http::{
    compression::CompressionLayer, cors::CorsLayer, services::ServeDir, trace::TraceLayer,
};

pub mod api;
pub mod pages;
pub mod session;

use session::SessionStore;

// State
#[derive(Clone)]
pub struct AppState {
    pub reports: Arc<ReportStore>,
    pub charts: Arc<ChartStore>,
    pub auth: Arc<AdminAuth>,
    pub api: Arc<dyn PortalApi>,
    pub sessions: Arc<SessionStore>,
    pub dashboard: Arc<DashboardController>,
    pub reports_page: Arc<ReportController>,
    pub config: AppConfig,
}

impl AppState {
    pub fn new(config: AppConfig, api: Arc<dyn PortalApi>) -> Result<Self> {
        let charts_folder = ChartStore::resolve(&config.storage.charts_dirs);

        Ok(Self {
            reports: Arc::new(ReportStore::new(&config.storage.reports_file)),
            charts: Arc::new(ChartStore::new(charts_folder)),
            auth: Arc::new(AdminAuth::from_config(&config.admin)?),
            reports_page: Arc::new(ReportController::new(Arc::clone(&api))),
            api,
            sessions: Arc::new(SessionStore::new()),
            dashboard: Arc::new(DashboardController::default()),
            config,
        })
    }
}

pub fn create_app(state: AppState) -> Router {
    let static_dir = state.config.storage.static_dir.clone();

    Router::new()
        // Dashboard
        .route("/", get(pages::dashboard_page))
        .route("/navigate/:page", get(pages::navigate))
        .route("/charts", get(pages::back_to_charts))
        .route("/charts/:chart_id", get(pages::load_chart))
        .route("/charts/:chart_id/image", get(pages::chart_image))
        .route("/tabs/:year", get(pages::switch_tab))
        .route("/login", get(pages::open_login).post(pages::login))
        .route("/login/close", get(pages::close_login))
        .route("/mode/:mode", post(pages::set_mode))
        .route("/logout", post(pages::logout))
        .route("/datasets/download", post(pages::download_dataset))
        .route("/hero-title/stream", get(pages::hero_title_stream))
        // Report page
        .route("/report", get(pages::report_page).post(pages::submit_report))
        .route("/report/new", post(pages::new_report))
        .route("/report/admin/open", post(pages::open_admin))
        .route("/report/admin/close", post(pages::close_admin))
        .route("/report/admin/login", post(pages::admin_login))
        .route("/report/admin/logout", post(pages::admin_logout))
        .route("/report/admin/refresh", post(pages::refresh_reports))
        .route("/report/admin/reports/:id/delete", post(pages::delete_report))
        .route("/report/admin/delete-all", post(pages::delete_all_reports))
        .route("/report/admin/confirm", post(pages::confirm))
        .route("/report/admin/export", post(pages::export_reports))
        // Backend API
        .route("/api/health", get(api::health))
        .route("/api/charts/:chart_name", get(api::get_chart))
        .route("/api/submit-report", post(api::submit_report))
        .route("/api/reports", get(api::list_reports))
        .route("/api/reports/export", get(api::export_reports))
        .route("/api/reports/delete-all", delete(api::delete_all_reports))
        .route("/api/reports/:id", delete(api::delete_report))
        .nest_service("/static", ServeDir::new(static_dir))
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(CookieManagerLayer::new())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
