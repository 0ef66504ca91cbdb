use std::time::{Duration, Instant};

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::core::{parse_command, Action, Command, Context, Module, NotifyLevel, View, ViewController};
use crate::domain::{
    ApiError, AttendanceRecord, Group, SessionGate, StalePolicy, StatsFetchError, StatsOutcome,
};
use crate::infrastructure::{RuntimeCommand, RuntimeEvent};
use crate::modules::{AttendanceForm, Dashboard, GroupList};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Command,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusLevel {
    Info,
    Warn,
    Error,
}

impl From<NotifyLevel> for StatusLevel {
    fn from(level: NotifyLevel) -> Self {
        match level {
            NotifyLevel::Info => StatusLevel::Info,
            NotifyLevel::Warn => StatusLevel::Warn,
            NotifyLevel::Error => StatusLevel::Error,
        }
    }
}

/// Where the app goes once the dashboard is torn down
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Destination {
    Quit,
    SignedOut { warning: Option<String> },
}

#[derive(Debug, Default, Clone)]
pub struct CommandBar {
    pub input: String,
    pub last: Option<String>,
}

#[derive(Debug, Clone)]
pub struct StatusMessage {
    pub text: String,
    pub level: StatusLevel,
    pub since: Instant,
}

#[derive(Debug)]
pub struct App {
    /// Shared context for modules
    pub ctx: Context,
    pub views: ViewController,
    pub session: SessionGate,
    pub dashboard: Dashboard,
    pub groups: GroupList,
    pub attendance: AttendanceForm,
    pub input_mode: InputMode,
    pub command: CommandBar,
    pub status: Option<StatusMessage>,
    pub help_open: bool,
    pub exit: Option<Destination>,
    pending_groups_request: bool,
    pending_roster_request: Option<String>,
    pending_attendance_submit: Option<AttendanceRecord>,
}

impl App {
    pub fn new(session: SessionGate, policy: StalePolicy) -> Self {
        let mut app = Self {
            ctx: Context::new(),
            views: ViewController::new(policy),
            session,
            dashboard: Dashboard::new(),
            groups: GroupList::new(),
            attendance: AttendanceForm::new(),
            input_mode: InputMode::Normal,
            command: CommandBar::default(),
            status: None,
            help_open: false,
            exit: None,
            pending_groups_request: false,
            pending_roster_request: None,
            pending_attendance_submit: None,
        };
        app.sync_context();
        app
    }

    /// Sync context with app state
    pub fn sync_context(&mut self) {
        let stats = self.views.stats();
        self.ctx.user_name = self.session.current_user().display_name.clone();
        self.ctx.statistics = *stats.current();
        self.ctx.stats_loading = stats.is_loading();
        self.ctx.stats_updated = stats
            .updated_at()
            .map(|at| at.format("%H:%M:%S").to_string());
    }

    pub fn current_view(&self) -> View {
        self.views.current_view()
    }

    pub fn should_exit(&self) -> bool {
        self.exit.is_some()
    }

    // === Navigation ===

    pub fn navigate(&mut self, view: View) {
        if self.views.navigate_to(view) {
            self.after_transition();
        }
    }

    pub fn begin_attendance(&mut self, group: Group) {
        if self.views.begin_attendance(group) {
            self.after_transition();
        }
    }

    pub fn return_from_attendance(&mut self) {
        if self.views.return_from_attendance() {
            self.after_transition();
        }
    }

    /// Sign out, then leave once the auth collaborator answered
    pub fn logout(&mut self) {
        if self.session.sign_out() {
            self.set_status("Signing out…", StatusLevel::Info);
        }
    }

    /// Reload whatever the current view shows
    pub fn refresh(&mut self) {
        match self.current_view() {
            View::Summary => {
                self.views.refresh_stats();
            }
            View::GroupList => self.apply_action(Action::LoadGroups),
            View::TakingAttendance => {
                let action = match self.attendance.group() {
                    Some(group) => Action::LoadRoster(group.id.clone()),
                    None => Action::LoadGroups,
                };
                self.apply_action(action);
            }
        }
    }

    fn after_transition(&mut self) {
        let action = match self.current_view() {
            View::Summary => Action::None,
            View::GroupList => self.groups.on_enter(),
            View::TakingAttendance => {
                let group = self.views.selected_group().cloned();
                self.attendance.enter(group, &self.ctx)
            }
        };
        self.apply_action(action);
    }

    // === Status line ===

    pub fn set_status(&mut self, text: impl Into<String>, level: StatusLevel) {
        self.status = Some(StatusMessage {
            text: text.into(),
            level,
            since: Instant::now(),
        });
    }

    pub fn status_text(&self) -> Option<(&str, StatusLevel)> {
        self.status
            .as_ref()
            .map(|status| (status.text.as_str(), status.level))
    }

    pub fn on_tick(&mut self) {
        if let Some(status) = self.status.as_ref() {
            if status.since.elapsed() > Duration::from_secs(3) {
                self.status = None;
            }
        }
    }

    // === Command bar ===

    pub fn enter_command(&mut self) {
        self.input_mode = InputMode::Command;
        self.command.input.clear();
    }

    pub fn exit_command(&mut self) {
        self.input_mode = InputMode::Normal;
        self.command.input.clear();
    }

    pub fn apply_command(&mut self) {
        let input = self.command.input.trim().to_string();
        self.exit_command();
        if input.is_empty() {
            return;
        }
        self.command.last = Some(input.clone());
        let cmd = parse_command(&input);
        let action = self.execute_command(&cmd);
        self.apply_action(action);
    }

    /// Execute a parsed command
    pub fn execute_command(&mut self, cmd: &Command) -> Action {
        match cmd {
            Command::Dashboard => Action::Navigate(View::Summary),
            Command::Groups => Action::Navigate(View::GroupList),
            Command::Attendance(None) => Action::Navigate(View::TakingAttendance),
            Command::Attendance(Some(id)) => {
                let group = self
                    .ctx
                    .group(id)
                    .cloned()
                    .unwrap_or_else(|| Group::new(id.clone(), ""));
                Action::BeginAttendance(group)
            }
            Command::Refresh => {
                self.refresh();
                Action::None
            }
            Command::Logout => Action::Logout,
            Command::Quit => Action::Quit,
            Command::Unknown(s) => {
                Action::Notify(format!("Unknown command: {}", s), NotifyLevel::Warn)
            }
        }
    }

    /// Apply an action returned by a command or module
    pub fn apply_action(&mut self, action: Action) {
        match action {
            Action::None => {}
            Action::Navigate(view) => self.navigate(view),
            Action::BeginAttendance(group) => self.begin_attendance(group),
            Action::ReturnFromAttendance => self.return_from_attendance(),
            Action::LoadGroups => {
                self.ctx.groups_loading = true;
                self.pending_groups_request = true;
            }
            Action::LoadRoster(group_id) => self.pending_roster_request = Some(group_id),
            Action::SubmitAttendance(record) => {
                self.set_status("Submitting attendance…", StatusLevel::Info);
                self.pending_attendance_submit = Some(record);
            }
            Action::Notify(msg, level) => self.set_status(msg, level.into()),
            Action::Logout => self.logout(),
            Action::Quit => self.exit = Some(Destination::Quit),
        }
    }

    // === Keyboard ===

    pub fn handle_key(&mut self, key: KeyEvent) {
        if key.kind != KeyEventKind::Press {
            return;
        }

        if self.help_open {
            if matches!(key.code, KeyCode::Char('?') | KeyCode::Esc) {
                self.help_open = false;
            }
            return;
        }

        match self.input_mode {
            InputMode::Normal => self.handle_normal_mode(key),
            InputMode::Command => self.handle_command_mode(key),
        }
    }

    fn handle_normal_mode(&mut self, key: KeyEvent) {
        match (key.code, key.modifiers) {
            (KeyCode::Char('c'), mods) if mods.contains(KeyModifiers::CONTROL) => {
                self.exit = Some(Destination::Quit);
            }
            (KeyCode::Char('q'), _) => self.exit = Some(Destination::Quit),
            (KeyCode::Char('?'), _) => self.help_open = true,
            (KeyCode::Char(':'), _) | (KeyCode::Char('/'), _) => self.enter_command(),
            (KeyCode::Char('r'), _) => self.refresh(),
            (KeyCode::Char('L'), _) => self.logout(),
            (KeyCode::Char(c), _) if View::ALL.iter().any(|view| view.shortcut() == c) => {
                if let Some(view) = View::ALL.iter().find(|view| view.shortcut() == c) {
                    self.navigate(*view);
                }
            }
            _ => {
                let action = match self.current_view() {
                    View::Summary => self.dashboard.handle_key(key, &mut self.ctx),
                    View::GroupList => self.groups.handle_key(key, &mut self.ctx),
                    View::TakingAttendance => self.attendance.handle_key(key, &mut self.ctx),
                };
                self.apply_action(action);
            }
        }
    }

    fn handle_command_mode(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => self.exit_command(),
            KeyCode::Enter => self.apply_command(),
            KeyCode::Backspace => {
                self.command.input.pop();
            }
            KeyCode::Up => {
                if let Some(last) = self.command.last.clone() {
                    self.command.input = last;
                }
            }
            KeyCode::Char(c) => self.command.input.push(c),
            _ => {}
        }
    }

    // === Runtime plumbing ===

    /// Requests queued since the last call, in the order they go out
    pub fn drain_commands(&mut self) -> Vec<RuntimeCommand> {
        let mut commands: Vec<RuntimeCommand> = self
            .views
            .take_stats_requests()
            .into_iter()
            .map(|generation| RuntimeCommand::FetchStatistics { generation })
            .collect();
        if std::mem::take(&mut self.pending_groups_request) {
            commands.push(RuntimeCommand::FetchGroups);
        }
        if let Some(group_id) = self.pending_roster_request.take() {
            commands.push(RuntimeCommand::FetchRoster { group_id });
        }
        if let Some(record) = self.pending_attendance_submit.take() {
            commands.push(RuntimeCommand::SubmitAttendance { record });
        }
        if let Some(session) = self.session.take_sign_out_request() {
            commands.push(RuntimeCommand::SignOut { session });
        }
        commands
    }

    /// Settle a request that never reached the worker. Sign-out still
    /// completes locally so the app can exit.
    pub fn command_failed(&mut self, cmd: RuntimeCommand, reason: String) {
        let event = match cmd {
            RuntimeCommand::FetchStatistics { generation } => RuntimeEvent::StatisticsLoaded {
                generation,
                result: Err(StatsFetchError::Transport(reason)),
            },
            RuntimeCommand::FetchGroups => RuntimeEvent::GroupsLoaded {
                result: Err(ApiError::Transport(reason)),
            },
            RuntimeCommand::FetchRoster { group_id } => RuntimeEvent::RosterLoaded {
                group_id,
                result: Err(ApiError::Transport(reason)),
            },
            RuntimeCommand::SubmitAttendance { record } => RuntimeEvent::AttendanceSubmitted {
                group_id: record.group_id,
                result: Err(ApiError::Transport(reason)),
            },
            RuntimeCommand::SignOut { .. } => RuntimeEvent::SignedOut {
                error: Some(format!("remote sign-out not sent: {reason}")),
            },
            RuntimeCommand::Shutdown => return,
        };
        self.apply_event(event);
    }

    pub fn apply_event(&mut self, event: RuntimeEvent) {
        match event {
            RuntimeEvent::StatisticsLoaded { generation, result } => {
                if let StatsOutcome::Retained(err) = self.views.apply_stats(generation, result) {
                    self.set_status(
                        format!("Could not load statistics: {err}"),
                        StatusLevel::Warn,
                    );
                }
            }
            RuntimeEvent::GroupsLoaded { result } => {
                self.ctx.groups_loading = false;
                match result {
                    Ok(groups) => {
                        self.groups.clamp(groups.len());
                        self.ctx.groups = groups;
                    }
                    Err(err) => {
                        tracing::warn!(error = %err, "failed to load groups");
                        self.set_status(format!("Could not load groups: {err}"), StatusLevel::Error);
                    }
                }
            }
            RuntimeEvent::RosterLoaded { group_id, result } => {
                let action = self.attendance.apply_roster(&group_id, result);
                self.apply_action(action);
            }
            RuntimeEvent::AttendanceSubmitted { group_id, result } => {
                self.attendance.finish_submit();
                match result {
                    Ok(()) => {
                        tracing::info!(group = %group_id, "attendance submitted");
                        self.set_status("Attendance saved", StatusLevel::Info);
                        if self.current_view() == View::TakingAttendance {
                            self.return_from_attendance();
                        }
                    }
                    Err(err) => {
                        tracing::warn!(group = %group_id, error = %err, "attendance submit failed");
                        self.set_status(
                            format!("Could not save attendance: {err}"),
                            StatusLevel::Error,
                        );
                    }
                }
            }
            RuntimeEvent::SignedOut { error } => {
                let mut warning = error;
                if let Err(err) = self.session.complete_sign_out() {
                    tracing::warn!(error = %err, "local session cleanup failed");
                    warning = Some(err.to_string());
                }
                self.exit = Some(Destination::SignedOut { warning });
            }
            RuntimeEvent::Error { message } => self.set_status(message, StatusLevel::Error),
        }
    }
}
