//! Server-rendered dashboard and report pages. Every action mutates the
//! caller's session state through a controller and redirects back.

use super::AppState;
use crate::controllers::dashboard::{
    render_chart_error, render_chart_grid, render_tab_content, ChartStatus, DashboardState,
};
use crate::controllers::report::{
    render_reports, report_count, AdminView, PendingConfirmation, ReportSection, CRIME_TYPES,
};
use crate::models::auth::{AdminLoginRequest, LoginRequest, UserType};
use crate::models::catalog::{DATASET_YEARS, HERO_TITLE};
use crate::models::report::ReportForm;
use crate::ui::decrypt::{self, INITIAL_DELAY_MS};
use crate::ui::Toast;
use askama::Template;
use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{
        sse::{Event, Sse},
        Html, IntoResponse, Redirect, Response,
    },
    Form,
};
use chrono::Utc;
use futures::{stream, Stream, StreamExt};
use serde::Deserialize;
use std::convert::Infallible;
use std::time::Duration;
use tower_cookies::Cookies;

const MAX_HERO_DELAY_MS: u64 = 5_000;

// Templates
#[derive(Template)]
#[template(path = "dashboard.html")]
struct DashboardTemplate {
    active_page: &'static str,
    chart_grid: String,
    chart: Option<ChartPanel>,
    tabs: Vec<TabLink>,
    tab_content: String,
    user_label: Option<&'static str>,
    login_modal_open: bool,
    admin_mode: bool,
    hero_title: &'static str,
    hero_delay_ms: Option<u64>,
    toast: Option<ToastView>,
}

#[derive(Template)]
#[template(path = "report.html")]
struct ReportTemplate {
    show_success: bool,
    report_id_text: String,
    form: ReportForm,
    crime_types: Vec<CrimeTypeOption>,
    admin_panel_open: bool,
    show_reports: bool,
    report_count: String,
    reports_html: String,
    confirmation: Option<String>,
    toast: Option<ToastView>,
}

struct ChartPanel {
    title: String,
    image_src: Option<String>,
    error_html: Option<String>,
}

struct TabLink {
    key: &'static str,
    label: String,
    active: bool,
}

struct CrimeTypeOption {
    value: &'static str,
    label: &'static str,
    selected: bool,
}

struct ToastView {
    class: String,
    message: String,
    remaining_ms: i64,
}

fn render<T: Template>(template: T) -> Response {
    Html(template.render().unwrap_or_else(|_| "Template error".to_string())).into_response()
}

fn toast_view(toast: &Option<Toast>, ttl_secs: i64) -> Option<ToastView> {
    let now = Utc::now();
    toast
        .as_ref()
        .filter(|t| t.is_visible(now, ttl_secs))
        .map(|t| ToastView {
            class: t.css_class(),
            message: t.message.clone(),
            remaining_ms: t.remaining_ms(now, ttl_secs),
        })
}

fn dashboard_redirect(dashboard: &mut DashboardState) -> Redirect {
    dashboard.after_action = true;
    Redirect::to("/")
}

fn tab_label(key: &str) -> String {
    match key {
        "historical" => "Historical".to_string(),
        year => year.to_string(),
    }
}

// Dashboard
pub async fn dashboard_page(State(state): State<AppState>, cookies: Cookies) -> Response {
    let session = state.sessions.get_or_create(&cookies);
    let mut client = session.lock().await;
    let dashboard = &mut client.dashboard;

    let chart = dashboard.chart_view.as_ref().map(|view| match &view.status {
        ChartStatus::Loaded(_) => ChartPanel {
            title: view.title.clone(),
            image_src: Some(format!("/charts/{}/image", view.chart_id)),
            error_html: None,
        },
        ChartStatus::Failed { message } => ChartPanel {
            title: view.title.clone(),
            image_src: None,
            error_html: Some(render_chart_error(view, message)),
        },
    });

    let tabs = DATASET_YEARS
        .iter()
        .map(|&key| TabLink {
            key,
            label: tab_label(key),
            active: dashboard.current_tab == key,
        })
        .collect();

    let template = DashboardTemplate {
        active_page: dashboard.active_page.map_or("", |p| p.as_str()),
        chart_grid: render_chart_grid(),
        chart,
        tabs,
        tab_content: render_tab_content(&dashboard.current_tab),
        user_label: dashboard.current_user.map(|u| u.user_type.label()),
        login_modal_open: dashboard.login_modal_open,
        admin_mode: dashboard.mode == UserType::Admin,
        hero_title: HERO_TITLE,
        hero_delay_ms: state.dashboard.hero_animation_for_render(dashboard),
        toast: toast_view(&dashboard.toast, state.config.ui.toast_secs),
    };

    render(template)
}

pub async fn navigate(
    State(state): State<AppState>,
    cookies: Cookies,
    Path(page): Path<String>,
) -> Redirect {
    let session = state.sessions.get_or_create(&cookies);
    let mut client = session.lock().await;
    state.dashboard.navigate_to(&mut client.dashboard, &page);
    dashboard_redirect(&mut client.dashboard)
}

pub async fn back_to_charts(State(state): State<AppState>, cookies: Cookies) -> Redirect {
    let session = state.sessions.get_or_create(&cookies);
    let mut client = session.lock().await;
    state.dashboard.back_to_charts(&mut client.dashboard);
    dashboard_redirect(&mut client.dashboard)
}

pub async fn load_chart(
    State(state): State<AppState>,
    cookies: Cookies,
    Path(chart_id): Path<String>,
) -> Redirect {
    let session = state.sessions.get_or_create(&cookies);
    let mut client = session.lock().await;
    state
        .dashboard
        .load_chart(&mut client.dashboard, state.api.as_ref(), &chart_id)
        .await;
    dashboard_redirect(&mut client.dashboard)
}

/// The image bytes fetched by the last `load_chart` of this session.
pub async fn chart_image(
    State(state): State<AppState>,
    cookies: Cookies,
    Path(chart_id): Path<String>,
) -> Response {
    let session = state.sessions.get_or_create(&cookies);
    let client = session.lock().await;

    match client.dashboard.chart_view.as_ref() {
        Some(view) if view.chart_id == chart_id => match &view.status {
            ChartStatus::Loaded(bytes) => {
                ([(header::CONTENT_TYPE, "image/png")], bytes.clone()).into_response()
            }
            ChartStatus::Failed { .. } => StatusCode::NOT_FOUND.into_response(),
        },
        _ => StatusCode::NOT_FOUND.into_response(),
    }
}

pub async fn switch_tab(
    State(state): State<AppState>,
    cookies: Cookies,
    Path(year): Path<String>,
) -> Redirect {
    let session = state.sessions.get_or_create(&cookies);
    let mut client = session.lock().await;
    state.dashboard.switch_tab(&mut client.dashboard, &year);
    dashboard_redirect(&mut client.dashboard)
}

pub async fn open_login(State(state): State<AppState>, cookies: Cookies) -> Redirect {
    let session = state.sessions.get_or_create(&cookies);
    let mut client = session.lock().await;
    state.dashboard.open_login_modal(&mut client.dashboard);
    dashboard_redirect(&mut client.dashboard)
}

pub async fn close_login(State(state): State<AppState>, cookies: Cookies) -> Redirect {
    let session = state.sessions.get_or_create(&cookies);
    let mut client = session.lock().await;
    state.dashboard.close_login_modal(&mut client.dashboard);
    dashboard_redirect(&mut client.dashboard)
}

pub async fn set_mode(
    State(state): State<AppState>,
    cookies: Cookies,
    Path(mode): Path<String>,
) -> Redirect {
    let session = state.sessions.get_or_create(&cookies);
    let mut client = session.lock().await;
    if let Some(mode) = UserType::parse(&mode) {
        state.dashboard.set_mode(&mut client.dashboard, mode);
    }
    dashboard_redirect(&mut client.dashboard)
}

pub async fn login(
    State(state): State<AppState>,
    cookies: Cookies,
    Form(request): Form<LoginRequest>,
) -> Redirect {
    let session = state.sessions.get_or_create(&cookies);
    let mut client = session.lock().await;
    state.dashboard.handle_login(&mut client.dashboard, &request);
    dashboard_redirect(&mut client.dashboard)
}

pub async fn logout(State(state): State<AppState>, cookies: Cookies) -> Redirect {
    let session = state.sessions.get_or_create(&cookies);
    let mut client = session.lock().await;
    state.dashboard.handle_logout(&mut client.dashboard);
    dashboard_redirect(&mut client.dashboard)
}

#[derive(Deserialize)]
pub struct DownloadRequest {
    title: String,
}

pub async fn download_dataset(
    State(state): State<AppState>,
    cookies: Cookies,
    Form(request): Form<DownloadRequest>,
) -> Redirect {
    let session = state.sessions.get_or_create(&cookies);
    let mut client = session.lock().await;
    state
        .dashboard
        .download_dataset(&mut client.dashboard, &request.title);
    dashboard_redirect(&mut client.dashboard)
}

#[derive(Deserialize)]
pub struct HeroQuery {
    delay_ms: Option<u64>,
}

/// Frames of the hero title animation, then a `done` event.
pub async fn hero_title_stream(
    State(state): State<AppState>,
    Query(query): Query<HeroQuery>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let delay = query
        .delay_ms
        .unwrap_or(INITIAL_DELAY_MS)
        .min(MAX_HERO_DELAY_MS);
    let tick = Duration::from_millis(state.config.ui.decrypt_tick_ms);

    let frames = decrypt::frames(HERO_TITLE, Duration::from_millis(delay), tick)
        .map(|frame| Ok::<_, Infallible>(Event::default().data(frame)));
    let done = stream::once(async { Ok::<_, Infallible>(Event::default().event("done").data(HERO_TITLE)) });

    Sse::new(frames.chain(done))
}

// Report page
pub async fn report_page(State(state): State<AppState>, cookies: Cookies) -> Response {
    let session = state.sessions.get_or_create(&cookies);
    let client = session.lock().await;
    let report = &client.report;

    let crime_types = CRIME_TYPES
        .iter()
        .map(|&(value, label)| CrimeTypeOption {
            value,
            label,
            selected: report.form.crime_type == value,
        })
        .collect();

    let template = ReportTemplate {
        show_success: matches!(report.section, ReportSection::Success { .. }),
        report_id_text: report.section.report_id_text(),
        form: report.form.clone(),
        crime_types,
        admin_panel_open: report.admin_panel_open,
        show_reports: report.admin_view == AdminView::Reports,
        report_count: report_count(&report.reports),
        reports_html: render_reports(&report.reports),
        confirmation: report.pending_confirmation.map(|p| p.prompt()),
        toast: toast_view(&report.toast, state.config.ui.toast_secs),
    };

    render(template)
}

pub async fn submit_report(
    State(state): State<AppState>,
    cookies: Cookies,
    Form(form): Form<ReportForm>,
) -> Redirect {
    let session = state.sessions.get_or_create(&cookies);
    let mut client = session.lock().await;
    state
        .reports_page
        .handle_form_submit(&mut client.report, form)
        .await;
    Redirect::to("/report")
}

pub async fn new_report(State(state): State<AppState>, cookies: Cookies) -> Redirect {
    let session = state.sessions.get_or_create(&cookies);
    let mut client = session.lock().await;
    state.reports_page.new_report(&mut client.report);
    Redirect::to("/report")
}

pub async fn open_admin(State(state): State<AppState>, cookies: Cookies) -> Redirect {
    let session = state.sessions.get_or_create(&cookies);
    let mut client = session.lock().await;
    state.reports_page.open_admin_panel(&mut client.report);
    Redirect::to("/report")
}

pub async fn close_admin(State(state): State<AppState>, cookies: Cookies) -> Redirect {
    let session = state.sessions.get_or_create(&cookies);
    let mut client = session.lock().await;
    state.reports_page.close_admin_panel(&mut client.report);
    Redirect::to("/report")
}

pub async fn admin_login(
    State(state): State<AppState>,
    cookies: Cookies,
    Form(request): Form<AdminLoginRequest>,
) -> Redirect {
    let session = state.sessions.get_or_create(&cookies);
    let mut client = session.lock().await;
    state
        .reports_page
        .handle_admin_login(&mut client.report, &request.password)
        .await;
    Redirect::to("/report")
}

pub async fn admin_logout(State(state): State<AppState>, cookies: Cookies) -> Redirect {
    let session = state.sessions.get_or_create(&cookies);
    let mut client = session.lock().await;
    state.reports_page.handle_admin_logout(&mut client.report);
    Redirect::to("/report")
}

pub async fn refresh_reports(State(state): State<AppState>, cookies: Cookies) -> Redirect {
    let session = state.sessions.get_or_create(&cookies);
    let mut client = session.lock().await;
    state
        .reports_page
        .handle_refresh_reports(&mut client.report)
        .await;
    Redirect::to("/report")
}

pub async fn delete_report(
    State(state): State<AppState>,
    cookies: Cookies,
    Path(report_id): Path<u64>,
) -> Redirect {
    let session = state.sessions.get_or_create(&cookies);
    let mut client = session.lock().await;
    state.reports_page.request_confirmation(
        &mut client.report,
        PendingConfirmation::DeleteReport(report_id),
    );
    Redirect::to("/report")
}

pub async fn delete_all_reports(State(state): State<AppState>, cookies: Cookies) -> Redirect {
    let session = state.sessions.get_or_create(&cookies);
    let mut client = session.lock().await;
    state
        .reports_page
        .request_confirmation(&mut client.report, PendingConfirmation::DeleteAll);
    Redirect::to("/report")
}

#[derive(Deserialize)]
pub struct ConfirmRequest {
    #[serde(default)]
    accept: bool,
}

pub async fn confirm(
    State(state): State<AppState>,
    cookies: Cookies,
    Form(request): Form<ConfirmRequest>,
) -> Redirect {
    let session = state.sessions.get_or_create(&cookies);
    let mut client = session.lock().await;
    state
        .reports_page
        .resolve_confirmation(&mut client.report, request.accept)
        .await;
    Redirect::to("/report")
}

/// Sends the browser to the CSV download when the admin session allows it.
pub async fn export_reports(State(state): State<AppState>, cookies: Cookies) -> Redirect {
    let session = state.sessions.get_or_create(&cookies);
    let mut client = session.lock().await;
    state.reports_page.handle_export_reports(&mut client.report);

    match client.report.download.take() {
        Some(link) => Redirect::to(&link.href),
        None => Redirect::to("/report"),
    }
}
