//! Dashboard page: static chart and dataset catalogs, page switching and the
//! cosmetic user/admin login.
//!
//! All state lives in [`DashboardState`], one per browser session. The
//! controller itself only holds the post-navigation hooks.

use crate::error::ApiError;
use crate::models::auth::{CurrentUser, LoginRequest, UserType};
use crate::models::catalog::{datasets_for, find_chart, CHART_OPTIONS, DEFAULT_TAB};
use crate::services::api_client::{chart_path, PortalApi};
use crate::services::charts::is_plain_file_name;
use crate::ui::decrypt::{INITIAL_DELAY_MS, REPLAY_DELAY_MS};
use crate::ui::{escape_html, Toast};
use tracing::{error, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Page {
    Home,
    Visualizations,
    DataDownload,
}

impl Page {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "home" => Some(Page::Home),
            "visualizations" => Some(Page::Visualizations),
            "data-download" => Some(Page::DataDownload),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Page::Home => "home",
            Page::Visualizations => "visualizations",
            Page::DataDownload => "data-download",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ChartStatus {
    Loaded(Vec<u8>),
    Failed { message: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChartView {
    pub chart_id: String,
    pub title: String,
    pub image_url: String,
    pub status: ChartStatus,
}

#[derive(Debug, Clone)]
pub struct DashboardState {
    /// `None` after navigating to an unknown page: nothing is shown.
    pub active_page: Option<Page>,
    /// `None` while the chart selection grid is shown.
    pub chart_view: Option<ChartView>,
    pub current_tab: String,
    pub mode: UserType,
    pub current_user: Option<CurrentUser>,
    pub login_modal_open: bool,
    /// Queued replay of the hero title animation, in ms before it starts.
    pub hero_animation: Option<u64>,
    /// Set by actions that redirect back to the page.
    pub after_action: bool,
    pub toast: Option<Toast>,
}

impl Default for DashboardState {
    fn default() -> Self {
        Self {
            active_page: Some(Page::Home),
            chart_view: None,
            current_tab: DEFAULT_TAB.to_string(),
            mode: UserType::User,
            current_user: None,
            login_modal_open: false,
            hero_animation: None,
            after_action: false,
            toast: None,
        }
    }
}

/// Runs after every navigation with the requested page identifier.
pub type NavigationHook = Box<dyn Fn(&str, &mut DashboardState) + Send + Sync>;

pub struct DashboardController {
    hooks: Vec<NavigationHook>,
}

impl Default for DashboardController {
    fn default() -> Self {
        let mut controller = Self::without_hooks();
        controller.on_navigate(Box::new(replay_hero_title));
        controller
    }
}

impl DashboardController {
    pub fn without_hooks() -> Self {
        Self { hooks: Vec::new() }
    }

    pub fn on_navigate(&mut self, hook: NavigationHook) {
        self.hooks.push(hook);
    }

    pub fn navigate_to(&self, state: &mut DashboardState, page: &str) {
        state.active_page = Page::parse(page);

        if state.active_page == Some(Page::Visualizations) {
            state.chart_view = None;
        }

        for hook in &self.hooks {
            hook(page, state);
        }
    }

    /// Delay for the title animation on this render. A fresh page load always
    /// plays it; the redirect after an action only plays a queued replay.
    pub fn hero_animation_for_render(&self, state: &mut DashboardState) -> Option<u64> {
        if std::mem::take(&mut state.after_action) {
            state.hero_animation.take()
        } else {
            state.hero_animation = None;
            Some(INITIAL_DELAY_MS)
        }
    }

    pub fn back_to_charts(&self, state: &mut DashboardState) {
        state.chart_view = None;
    }

    /// Loads a chart image with a single request. On failure the response's
    /// error message is kept for the diagnostic panel.
    pub async fn load_chart(&self, state: &mut DashboardState, api: &dyn PortalApi, chart_id: &str) {
        let title = find_chart(chart_id).map_or("Chart", |c| c.title);
        let image_url = chart_url(chart_id);
        let file_name = format!("{}.png", chart_id);

        if !is_plain_file_name(&file_name) {
            warn!("Refusing to load chart with invalid id {:?}", chart_id);
            state.chart_view = Some(ChartView {
                chart_id: chart_id.to_string(),
                title: title.to_string(),
                image_url,
                status: ChartStatus::Failed {
                    message: format!("Invalid chart id: {}", chart_id),
                },
            });
            return;
        }

        info!("Loading chart {} from {}", chart_id, image_url);

        let status = match api.fetch_chart(&file_name).await {
            Ok(bytes) => {
                info!("Chart {} received, {} bytes", chart_id, bytes.len());
                ChartStatus::Loaded(bytes)
            }
            Err(e) => {
                error!("Failed to load chart from {}: {}", image_url, e);
                let message = match e {
                    ApiError::Status { message, .. } => message,
                    other => other.to_string(),
                };
                ChartStatus::Failed { message }
            }
        };

        state.chart_view = Some(ChartView {
            chart_id: chart_id.to_string(),
            title: title.to_string(),
            image_url,
            status,
        });
    }

    pub fn switch_tab(&self, state: &mut DashboardState, year: &str) {
        state.current_tab = year.to_string();
    }

    pub fn open_login_modal(&self, state: &mut DashboardState) {
        state.login_modal_open = true;
    }

    pub fn close_login_modal(&self, state: &mut DashboardState) {
        state.login_modal_open = false;
    }

    pub fn set_mode(&self, state: &mut DashboardState, mode: UserType) {
        state.mode = mode;
    }

    /// Any non-empty admin id and password succeed; nothing is verified.
    pub fn handle_login(&self, state: &mut DashboardState, request: &LoginRequest) {
        if state.mode == UserType::Admin
            && (request.admin_id.is_empty() || request.password.is_empty())
        {
            state.toast = Some(Toast::error("Please enter Admin ID and Password"));
            return;
        }

        state.current_user = Some(CurrentUser {
            user_type: state.mode,
        });
        state.toast = Some(Toast::success(format!(
            "Logged in as {}",
            state.mode.label()
        )));
        state.login_modal_open = false;
    }

    pub fn handle_logout(&self, state: &mut DashboardState) {
        state.current_user = None;
        state.toast = Some(Toast::success("Logged out successfully"));
    }

    pub fn download_dataset(&self, state: &mut DashboardState, title: &str) {
        state.toast = Some(Toast::success(format!("Download started: {}", title)));
    }
}

fn replay_hero_title(page: &str, state: &mut DashboardState) {
    if page == "home" {
        state.hero_animation = Some(REPLAY_DELAY_MS);
    }
}

pub fn chart_url(chart_id: &str) -> String {
    chart_path(&format!("{}.png", chart_id))
}

pub fn render_chart_grid() -> String {
    CHART_OPTIONS
        .iter()
        .map(|option| {
            format!(
                r#"
        <a class="chart-card" href="/charts/{id}">
            <div class="chart-card-icon">{icon}</div>
            <h3>{title}</h3>
            <p>{description}</p>
            <span class="btn btn-outline">View Chart</span>
        </a>"#,
                id = escape_html(option.id),
                icon = option.icon,
                title = escape_html(option.title),
                description = escape_html(option.description),
            )
        })
        .collect()
}

/// Dataset cards for a tab; unknown tabs render nothing.
pub fn render_tab_content(year: &str) -> String {
    datasets_for(year)
        .iter()
        .map(|dataset| {
            format!(
                r#"
        <div class="dataset-card">
            <h3>{title}</h3>
            <p>{description}</p>
            <div class="dataset-info"><span>Size:</span><span>{size}</span></div>
            <div class="dataset-info"><span>Format:</span><span>{format}</span></div>
            <div class="dataset-info"><span>Source:</span><span>{source}</span></div>
            <form method="post" action="/datasets/download">
                <input type="hidden" name="title" value="{title}">
                <input type="hidden" name="year" value="{year}">
                <button class="btn btn-primary" type="submit">Download Dataset</button>
            </form>
        </div>"#,
                title = escape_html(dataset.title),
                description = escape_html(dataset.description),
                size = escape_html(dataset.size),
                format = escape_html(dataset.format),
                source = escape_html(dataset.source),
                year = escape_html(year),
            )
        })
        .collect()
}

/// Shown in place of the image when a chart could not be loaded.
pub fn render_chart_error(view: &ChartView, message: &str) -> String {
    format!(
        r#"<div class="chart-error">
            <p><strong>Error Loading Chart</strong></p>
            <p>Chart: {id}</p>
            <p>URL: {url}</p>
            <p>Error: {message}</p>
            <p class="chart-error-hint">Check the server logs for more details.</p>
        </div>"#,
        id = escape_html(&view.chart_id),
        url = escape_html(&view.image_url),
        message = escape_html(message),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::api_client::MockPortalApi;
    use mockall::predicate::eq;

    fn controller() -> DashboardController {
        DashboardController::default()
    }

    #[test]
    fn navigation_activates_one_page() {
        let controller = controller();
        let mut state = DashboardState::default();

        controller.navigate_to(&mut state, "data-download");
        assert_eq!(state.active_page, Some(Page::DataDownload));

        controller.navigate_to(&mut state, "reports");
        assert_eq!(state.active_page, None);
    }

    #[test]
    fn visualizations_resets_to_selection_grid() {
        let controller = controller();
        let mut state = DashboardState {
            chart_view: Some(ChartView {
                chart_id: "state".into(),
                title: "Crime by State".into(),
                image_url: chart_url("state"),
                status: ChartStatus::Loaded(vec![1]),
            }),
            ..DashboardState::default()
        };

        controller.navigate_to(&mut state, "visualizations");
        assert!(state.chart_view.is_none());
    }

    #[test]
    fn returning_home_replays_the_title() {
        let controller = controller();
        let mut state = DashboardState::default();
        state.hero_animation = None;

        controller.navigate_to(&mut state, "visualizations");
        assert_eq!(state.hero_animation, None);

        controller.navigate_to(&mut state, "home");
        assert_eq!(state.hero_animation, Some(REPLAY_DELAY_MS));
    }

    #[test]
    fn every_page_load_plays_the_title() {
        let controller = controller();
        let mut state = DashboardState::default();

        assert_eq!(
            controller.hero_animation_for_render(&mut state),
            Some(INITIAL_DELAY_MS)
        );
        // reload
        assert_eq!(
            controller.hero_animation_for_render(&mut state),
            Some(INITIAL_DELAY_MS)
        );

        state.after_action = true;
        assert_eq!(controller.hero_animation_for_render(&mut state), None);

        controller.navigate_to(&mut state, "home");
        state.after_action = true;
        assert_eq!(
            controller.hero_animation_for_render(&mut state),
            Some(REPLAY_DELAY_MS)
        );
        assert!(!state.after_action);
        assert_eq!(state.hero_animation, None);
    }

    #[test]
    fn custom_hooks_run_in_order() {
        let mut controller = DashboardController::without_hooks();
        controller.on_navigate(Box::new(|page, state| {
            state.toast = Some(Toast::success(format!("visited {}", page)));
        }));
        let mut state = DashboardState::default();
        controller.navigate_to(&mut state, "data-download");
        assert_eq!(state.toast.unwrap().message, "visited data-download");
    }

    #[tokio::test]
    async fn unknown_chart_falls_back_to_generic_title() {
        let mut api = MockPortalApi::new();
        api.expect_fetch_chart()
            .with(eq("burglary.png"))
            .times(1)
            .returning(|_| {
                Err(ApiError::Status {
                    status: 404,
                    message: "Chart not found: burglary.png".to_string(),
                })
            });

        let mut state = DashboardState::default();
        controller().load_chart(&mut state, &api, "burglary").await;

        let view = state.chart_view.unwrap();
        assert_eq!(view.title, "Chart");
        assert_eq!(view.image_url, "/api/charts/burglary.png");
        assert_eq!(
            view.status,
            ChartStatus::Failed {
                message: "Chart not found: burglary.png".to_string()
            }
        );
    }

    #[tokio::test]
    async fn known_chart_keeps_its_bytes() {
        let mut api = MockPortalApi::new();
        api.expect_fetch_chart()
            .with(eq("trend.png"))
            .times(1)
            .returning(|_| Ok(vec![0x89, b'P', b'N', b'G']));

        let mut state = DashboardState::default();
        controller().load_chart(&mut state, &api, "trend").await;

        let view = state.chart_view.unwrap();
        assert_eq!(view.title, "Year-wise Crime Trends");
        assert_eq!(view.status, ChartStatus::Loaded(vec![0x89, b'P', b'N', b'G']));
    }

    #[tokio::test]
    async fn traversal_id_never_reaches_the_backend() {
        // No expectations: any backend call would panic.
        let api = MockPortalApi::new();
        let mut state = DashboardState::default();

        for id in ["../reports/export?password=guess#", "sub/../state", "a/b", "a\\b"] {
            controller().load_chart(&mut state, &api, id).await;
            let view = state.chart_view.take().unwrap();
            assert_eq!(
                view.status,
                ChartStatus::Failed {
                    message: format!("Invalid chart id: {}", id)
                }
            );
            assert!(!view.image_url.contains('?') && !view.image_url.contains('#'));
        }
    }

    #[test]
    fn unknown_year_renders_empty_list() {
        let controller = controller();
        let mut state = DashboardState::default();
        controller.switch_tab(&mut state, "1947");
        assert_eq!(state.current_tab, "1947");
        assert_eq!(render_tab_content(&state.current_tab), "");
    }

    #[test]
    fn tab_content_lists_each_dataset() {
        let html = render_tab_content("2022");
        assert_eq!(html.matches("dataset-card").count(), 4);
        assert!(html.contains("Monthly Crime Trends 2022"));
        assert!(html.contains("890 KB"));
    }

    #[test]
    fn chart_grid_links_every_chart() {
        let html = render_chart_grid();
        for option in CHART_OPTIONS {
            assert!(html.contains(&format!("href=\"/charts/{}\"", option.id)));
        }
    }

    #[test]
    fn admin_login_requires_both_fields() {
        let controller = controller();
        let mut state = DashboardState::default();
        controller.set_mode(&mut state, UserType::Admin);
        controller.open_login_modal(&mut state);

        controller.handle_login(
            &mut state,
            &LoginRequest {
                admin_id: "officer7".into(),
                password: String::new(),
            },
        );
        assert!(state.current_user.is_none());
        assert!(state.login_modal_open);
        assert_eq!(
            state.toast.as_ref().unwrap().message,
            "Please enter Admin ID and Password"
        );

        controller.handle_login(
            &mut state,
            &LoginRequest {
                admin_id: "officer7".into(),
                password: "anything".into(),
            },
        );
        assert_eq!(
            state.current_user,
            Some(CurrentUser {
                user_type: UserType::Admin
            })
        );
        assert!(!state.login_modal_open);
        assert_eq!(state.toast.as_ref().unwrap().message, "Logged in as Admin");
    }

    #[test]
    fn user_login_and_logout() {
        let controller = controller();
        let mut state = DashboardState::default();

        controller.handle_login(&mut state, &LoginRequest::default());
        assert_eq!(state.toast.as_ref().unwrap().message, "Logged in as User");

        controller.handle_logout(&mut state);
        assert!(state.current_user.is_none());
        assert_eq!(state.toast.unwrap().message, "Logged out successfully");
    }

    #[test]
    fn chart_error_panel_escapes_message() {
        let view = ChartView {
            chart_id: "map".into(),
            title: "India Choropleth Map".into(),
            image_url: chart_url("map"),
            status: ChartStatus::Failed {
                message: "<b>oops</b>".into(),
            },
        };
        let html = render_chart_error(&view, "<b>oops</b>");
        assert!(html.contains("Error: &lt;b&gt;oops&lt;/b&gt;"));
        assert!(html.contains("URL: /api/charts/map.png"));
    }
}
