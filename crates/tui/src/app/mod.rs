use std::{
    sync::Arc,
    time::{Duration, Instant},
};

use api_types::{
    alert::Alert,
    analytics::{ChartData, Summary},
    auth::User,
    budget::Budget,
};
use chrono::{DateTime, Local};
use client::{AlertSnapshot, ClientError, Generation, MonitorHandle, RequestGeneration};
use crossterm::event::{self, Event, KeyEvent, KeyEventKind};
use engine::Period;
use tokio::sync::mpsc;

use crate::{
    commands::Services,
    error::{AppError, Result},
    ui::{
        self,
        keymap::{AppAction, map_key},
    },
};

const TOAST_TTL: Duration = Duration::from_secs(3);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Login,
    Dashboard,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    Budgets,
    Alerts,
    Summary,
}

impl Section {
    pub const ALL: [Section; 3] = [Section::Budgets, Section::Alerts, Section::Summary];

    pub fn label(self) -> &'static str {
        match self {
            Self::Budgets => "Budgets",
            Self::Alerts => "Alerts",
            Self::Summary => "Summary",
        }
    }

    fn next(self) -> Self {
        match self {
            Self::Budgets => Self::Alerts,
            Self::Alerts => Self::Summary,
            Self::Summary => Self::Budgets,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginField {
    Username,
    Password,
}

#[derive(Debug)]
pub struct LoginState {
    pub username: String,
    pub password: String,
    pub focus: LoginField,
    pub message: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastLevel {
    Info,
    Success,
    Error,
}

#[derive(Debug, Clone)]
pub struct ToastState {
    pub message: String,
    pub level: ToastLevel,
    shown_at: Instant,
}

/// Everything the renderer reads. Fetched data is replaced wholesale.
#[derive(Debug)]
pub struct AppState {
    pub screen: Screen,
    pub section: Section,
    pub login: LoginState,
    pub user: Option<User>,
    pub period: Period,
    pub budgets: Vec<Budget>,
    pub summary: Option<Summary>,
    pub charts: Option<ChartData>,
    pub load_error: Option<String>,
    pub loading: bool,
    pub alerts: Arc<AlertSnapshot>,
    pub selected_alert: usize,
    /// First budget row shown.
    pub budget_offset: usize,
    pub last_refresh: Option<DateTime<Local>>,
    pub toast: Option<ToastState>,
}

impl AppState {
    pub(crate) fn new() -> Self {
        Self {
            screen: Screen::Login,
            section: Section::Budgets,
            login: LoginState {
                username: String::new(),
                password: String::new(),
                focus: LoginField::Username,
                message: None,
            },
            user: None,
            period: Period::Month,
            budgets: Vec::new(),
            summary: None,
            charts: None,
            load_error: None,
            loading: false,
            alerts: Arc::default(),
            selected_alert: 0,
            budget_offset: 0,
            last_refresh: None,
            toast: None,
        }
    }

    /// Alerts in display order: exceeded first, then warnings.
    pub fn alerts_in_display_order(&self) -> Vec<&Alert> {
        let groups = engine::group_by_type(&self.alerts.alerts);
        groups.exceeded.into_iter().chain(groups.warning).collect()
    }

    fn selected_alert(&self) -> Option<&Alert> {
        self.alerts_in_display_order()
            .get(self.selected_alert)
            .copied()
    }

    fn select_next(&mut self) {
        let len = self.alerts.alerts.len();
        if len == 0 {
            return;
        }
        self.selected_alert = (self.selected_alert + 1).min(len - 1);
    }

    fn select_prev(&mut self) {
        self.selected_alert = self.selected_alert.saturating_sub(1);
    }

    fn move_up(&mut self) {
        match self.section {
            Section::Budgets => self.budget_offset = self.budget_offset.saturating_sub(1),
            Section::Alerts => self.select_prev(),
            Section::Summary => {}
        }
    }

    fn move_down(&mut self) {
        match self.section {
            Section::Budgets => {
                let last = self.budgets.len().saturating_sub(1);
                self.budget_offset = (self.budget_offset + 1).min(last);
            }
            Section::Alerts => self.select_next(),
            Section::Summary => {}
        }
    }

    /// Adopts the shared alert snapshot if it was replaced since the last
    /// frame, whoever fetched it.
    fn sync_alerts(&mut self, snapshot: Arc<AlertSnapshot>) -> bool {
        if Arc::ptr_eq(&self.alerts, &snapshot) {
            return false;
        }
        self.set_alerts(snapshot);
        true
    }

    fn set_alerts(&mut self, snapshot: Arc<AlertSnapshot>) {
        let len = snapshot.alerts.len();
        self.alerts = snapshot;
        self.selected_alert = self.selected_alert.min(len.saturating_sub(1));
    }

    fn toast(&mut self, level: ToastLevel, message: impl Into<String>) {
        self.toast = Some(ToastState {
            message: message.into(),
            level,
            shown_at: Instant::now(),
        });
    }

    fn expire_toast(&mut self) {
        if self
            .toast
            .as_ref()
            .is_some_and(|toast| toast.shown_at.elapsed() >= TOAST_TTL)
        {
            self.toast = None;
        }
    }

    /// Applies a finished reload unless a newer one was started meanwhile.
    fn apply(&mut self, loaded: Loaded, generations: &RequestGeneration) -> bool {
        if !generations.is_current(loaded.generation) {
            tracing::debug!("dropping stale dashboard reload");
            return false;
        }

        self.loading = false;
        let mut errors = Vec::new();
        match loaded.budgets {
            Ok(budgets) => {
                self.budget_offset = self.budget_offset.min(budgets.len().saturating_sub(1));
                self.budgets = budgets;
            }
            Err(err) => errors.push(err),
        }
        match loaded.summary {
            Ok(summary) => self.summary = Some(summary),
            Err(err) => errors.push(err),
        }
        match loaded.charts {
            Ok(charts) => self.charts = Some(charts),
            Err(err) => errors.push(err),
        }

        if let Some(err) = errors.first() {
            tracing::warn!("dashboard reload failed: {err}");
            self.load_error = Some(err.user_message());
        } else {
            self.load_error = None;
            self.last_refresh = Some(Local::now());
        }
        true
    }
}

/// Result of one background reload, tagged with the generation that
/// started it.
#[derive(Debug)]
struct Loaded {
    generation: Generation,
    budgets: std::result::Result<Vec<Budget>, ClientError>,
    summary: std::result::Result<Summary, ClientError>,
    charts: std::result::Result<ChartData, ClientError>,
}

pub struct App {
    services: Services,
    poll_interval: Duration,
    pub state: AppState,
    monitor: Option<MonitorHandle>,
    reloads: RequestGeneration,
    loaded_tx: mpsc::UnboundedSender<Loaded>,
    loaded_rx: mpsc::UnboundedReceiver<Loaded>,
    should_quit: bool,
}

impl App {
    pub async fn new(services: Services, poll_interval: Duration) -> Self {
        let (loaded_tx, loaded_rx) = mpsc::unbounded_channel();
        let mut app = Self {
            services,
            poll_interval,
            state: AppState::new(),
            monitor: None,
            reloads: RequestGeneration::new(),
            loaded_tx,
            loaded_rx,
            should_quit: false,
        };

        if let Some(user) = app.services.auth.session().user().await {
            app.enter_dashboard(user);
        }
        app
    }

    pub async fn run(&mut self) -> Result<()> {
        let mut terminal = ui::setup_terminal()?;
        let result = self.event_loop(&mut terminal).await;
        self.stop_monitor().await;
        ui::restore_terminal(&mut terminal)?;
        result
    }

    async fn event_loop(&mut self, terminal: &mut ui::Terminal) -> Result<()> {
        let tick_rate = Duration::from_millis(200);

        while !self.should_quit {
            self.drain_background().await;
            self.state.expire_toast();

            terminal
                .draw(|frame| ui::render(frame, &self.state))
                .map_err(|err| AppError::Terminal(err.to_string()))?;

            if event::poll(tick_rate)?
                && let Event::Key(key) = event::read()?
                && key.kind != KeyEventKind::Release
            {
                self.handle_key(key).await;
            }
        }

        Ok(())
    }

    /// Picks up finished reloads and alert refreshes, from the monitor or
    /// from a manual refresh.
    async fn drain_background(&mut self) {
        while let Ok(loaded) = self.loaded_rx.try_recv() {
            self.state.apply(loaded, &self.reloads);
        }

        if self.state.screen == Screen::Dashboard {
            let snapshot = self.services.alerts.snapshot().await;
            self.state.sync_alerts(snapshot);
        }

        if self.state.screen == Screen::Dashboard
            && !self.services.auth.session().is_authenticated().await
        {
            self.leave_dashboard(Some("Session expired, please log in again.".to_string()))
                .await;
        }
    }

    async fn handle_key(&mut self, key: KeyEvent) {
        let typing = self.state.screen == Screen::Login;
        match map_key(key, typing) {
            AppAction::Quit => self.should_quit = true,
            AppAction::NextField => match self.state.screen {
                Screen::Login => self.advance_focus(),
                Screen::Dashboard => self.state.section = self.state.section.next(),
            },
            AppAction::Submit => match self.state.screen {
                Screen::Login => self.attempt_login().await,
                Screen::Dashboard => {
                    if self.state.section == Section::Alerts {
                        self.mark_selected_read().await;
                    }
                }
            },
            AppAction::Backspace => {
                if typing {
                    self.active_field_mut().pop();
                }
            }
            AppAction::Up => self.state.move_up(),
            AppAction::Down => self.state.move_down(),
            AppAction::Input(ch) => {
                if typing {
                    self.active_field_mut().push(ch);
                } else {
                    self.handle_dashboard_key(ch).await;
                }
            }
            AppAction::Cancel => {
                if typing {
                    self.state.login.message = None;
                }
            }
            AppAction::None => {}
        }
    }

    async fn handle_dashboard_key(&mut self, ch: char) {
        match ch {
            'r' | 'R' => {
                self.reload();
                self.state.toast(ToastLevel::Info, "Refreshing");
                let alerts = self.services.alerts.clone();
                tokio::spawn(async move {
                    alerts.refresh().await;
                });
            }
            'p' | 'P' => {
                self.state.period = self.state.period.next();
                self.reload();
            }
            'm' | 'M' => self.mark_selected_read().await,
            'b' | 'B' => self.state.section = Section::Budgets,
            'a' | 'A' => self.state.section = Section::Alerts,
            's' | 'S' => self.state.section = Section::Summary,
            'l' | 'L' => {
                self.services.auth.logout().await;
                self.leave_dashboard(None).await;
            }
            _ => {}
        }
    }

    fn advance_focus(&mut self) {
        self.state.login.focus = match self.state.login.focus {
            LoginField::Username => LoginField::Password,
            LoginField::Password => LoginField::Username,
        };
    }

    fn active_field_mut(&mut self) -> &mut String {
        match self.state.login.focus {
            LoginField::Username => &mut self.state.login.username,
            LoginField::Password => &mut self.state.login.password,
        }
    }

    async fn attempt_login(&mut self) {
        let login = &self.state.login;
        let result = self
            .services
            .auth
            .login(&login.username, &login.password)
            .await;
        match result {
            Ok(user) => {
                self.state.login.password.clear();
                self.state.login.message = None;
                self.enter_dashboard(user);
            }
            Err(err) => {
                self.state.login.password.clear();
                self.state.login.message = Some(err.user_message());
            }
        }
    }

    fn enter_dashboard(&mut self, user: User) {
        self.monitor = Some(client::AlertMonitor::start(
            self.services.alerts.clone(),
            self.poll_interval,
        ));

        self.state.login.username = user.username.clone();
        self.state.user = Some(user);
        self.state.screen = Screen::Dashboard;
        self.reload();
    }

    async fn leave_dashboard(&mut self, message: Option<String>) {
        self.stop_monitor().await;
        // Outstanding reloads belong to the old session.
        self.reloads.begin();

        let username = std::mem::take(&mut self.state.login.username);
        self.state = AppState::new();
        self.state.login.username = username;
        self.state.login.message = message;
    }

    async fn stop_monitor(&mut self) {
        if let Some(handle) = self.monitor.take() {
            handle.cancel().await;
        }
    }

    /// Starts a background reload of budgets and analytics for the current
    /// period. Only the newest reload is applied.
    fn reload(&mut self) {
        let generation = self.reloads.begin();
        self.state.loading = true;

        let api = self.services.api.clone();
        let period = self.state.period;
        let tx = self.loaded_tx.clone();
        tokio::spawn(async move {
            let (budgets, summary, charts) =
                tokio::join!(api.budgets(), api.summary(period), api.charts(period));
            let _ = tx.send(Loaded {
                generation,
                budgets,
                summary,
                charts,
            });
        });
    }

    async fn mark_selected_read(&mut self) {
        let Some(alert) = self.state.selected_alert() else {
            return;
        };
        if alert.is_read {
            return;
        }
        let id = alert.id;

        match self.services.alerts.mark_read(id).await {
            Ok(()) => {
                let snapshot = self.services.alerts.snapshot().await;
                self.state.set_alerts(snapshot);
                self.state.toast(ToastLevel::Success, "Alert marked as read");
            }
            Err(err) => {
                self.state.toast(ToastLevel::Error, err.user_message());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use api_types::{analytics::Summary, budget::BudgetPeriod};
    use chrono::NaiveDate;
    use uuid::Uuid;

    fn summary(total: f64) -> Summary {
        Summary {
            total_expenses: total,
            total_income: 0.0,
            balance: -total,
            category_breakdown: Default::default(),
            transaction_count: 1,
            period: "month".to_string(),
            start_date: None,
            end_date: None,
        }
    }

    fn budget() -> Budget {
        Budget {
            id: Uuid::new_v4(),
            category: "Food".to_string(),
            limit_amount: 100.0,
            current_spent: 85.0,
            period: BudgetPeriod::Monthly,
            start_date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2024, 3, 31).unwrap(),
            is_active: true,
            created_at: None,
        }
    }

    fn loaded(generation: Generation, total: f64) -> Loaded {
        Loaded {
            generation,
            budgets: Ok(vec![budget()]),
            summary: Ok(summary(total)),
            charts: Err(ClientError::Decode("no charts".to_string())),
        }
    }

    #[test]
    fn stale_reload_is_not_applied() {
        let generations = RequestGeneration::new();
        let mut state = AppState::new();

        let first = generations.begin();
        let second = generations.begin();

        assert!(state.apply(loaded(second, 20.0), &generations));
        assert!(!state.apply(loaded(first, 10.0), &generations));
        assert_eq!(state.summary.as_ref().map(|s| s.total_expenses), Some(20.0));
    }

    #[test]
    fn partial_failure_keeps_what_loaded() {
        let generations = RequestGeneration::new();
        let mut state = AppState::new();
        let generation = generations.begin();

        state.apply(loaded(generation, 5.0), &generations);
        assert_eq!(state.budgets.len(), 1);
        assert!(state.summary.is_some());
        assert_eq!(
            state.load_error.as_deref(),
            Some("The server sent an unexpected response.")
        );
        assert!(!state.loading);
    }

    #[test]
    fn alert_selection_stays_in_bounds() {
        let mut state = AppState::new();
        state.select_next();
        state.select_prev();
        assert_eq!(state.selected_alert, 0);
        assert!(state.selected_alert().is_none());
    }

    fn snapshot(unread: usize) -> Arc<AlertSnapshot> {
        Arc::new(AlertSnapshot {
            unread,
            ..AlertSnapshot::default()
        })
    }

    #[test]
    fn refreshed_alerts_reach_the_view_without_a_poll() {
        let mut state = AppState::new();
        let polled = snapshot(1);
        assert!(state.sync_alerts(polled.clone()));
        assert_eq!(state.alerts.unread, 1);

        // Same snapshot on the next frame: nothing to do.
        assert!(!state.sync_alerts(polled));

        // A manual refresh swapped the shared snapshot.
        assert!(state.sync_alerts(snapshot(2)));
        assert_eq!(state.alerts.unread, 2);
    }

    #[test]
    fn budget_scroll_is_clamped() {
        let mut state = AppState::new();
        state.budgets = vec![budget(), budget(), budget()];
        for _ in 0..5 {
            state.move_down();
        }
        assert_eq!(state.budget_offset, 2);

        state.move_up();
        assert_eq!(state.budget_offset, 1);

        let generations = RequestGeneration::new();
        let generation = generations.begin();
        state.apply(loaded(generation, 1.0), &generations);
        assert_eq!(state.budgets.len(), 1);
        assert_eq!(state.budget_offset, 0);
    }

    #[test]
    fn sections_cycle() {
        let mut section = Section::Budgets;
        for _ in 0..Section::ALL.len() {
            section = section.next();
        }
        assert_eq!(section, Section::Budgets);
    }
}
