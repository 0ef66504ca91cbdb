//! Which sub-view the dashboard shows, and the transitions between them

use crate::domain::{Group, StalePolicy, Statistics, StatsFetchError, StatsLoader, StatsOutcome};

/// Payload-free view tag, used for navigation requests and tab highlighting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Summary,
    TakingAttendance,
    GroupList,
}

impl View {
    pub const ALL: [View; 3] = [View::Summary, View::TakingAttendance, View::GroupList];

    pub fn title(&self) -> &'static str {
        match self {
            View::Summary => "Dashboard",
            View::TakingAttendance => "Attendance",
            View::GroupList => "My Groups",
        }
    }

    pub fn shortcut(&self) -> char {
        match self {
            View::Summary => '1',
            View::TakingAttendance => '2',
            View::GroupList => '3',
        }
    }
}

/// The active view. Only attendance-taking carries a preselected group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewState {
    Summary,
    TakingAttendance { group: Option<Group> },
    GroupList,
}

impl ViewState {
    pub fn view(&self) -> View {
        match self {
            ViewState::Summary => View::Summary,
            ViewState::TakingAttendance { .. } => View::TakingAttendance,
            ViewState::GroupList => View::GroupList,
        }
    }
}

#[derive(Debug)]
pub struct ViewController {
    current: ViewState,
    stats: StatsLoader,
}

impl ViewController {
    /// Starts on Summary, which counts as entering it
    pub fn new(policy: StalePolicy) -> Self {
        let mut controller = Self {
            current: ViewState::Summary,
            stats: StatsLoader::new(policy),
        };
        controller.on_enter();
        controller
    }

    pub fn current(&self) -> &ViewState {
        &self.current
    }

    pub fn current_view(&self) -> View {
        self.current.view()
    }

    pub fn selected_group(&self) -> Option<&Group> {
        match &self.current {
            ViewState::TakingAttendance { group } => group.as_ref(),
            _ => None,
        }
    }

    /// Returns false when `view` is already showing; nothing is re-entered then
    pub fn navigate_to(&mut self, view: View) -> bool {
        let next = match view {
            View::Summary => ViewState::Summary,
            View::TakingAttendance => ViewState::TakingAttendance { group: None },
            View::GroupList => ViewState::GroupList,
        };
        self.enter(next)
    }

    pub fn begin_attendance(&mut self, group: Group) -> bool {
        self.enter(ViewState::TakingAttendance { group: Some(group) })
    }

    pub fn return_from_attendance(&mut self) -> bool {
        self.navigate_to(View::GroupList)
    }

    /// Explicit reload, independent of any transition
    pub fn refresh_stats(&mut self) -> u64 {
        self.stats.refresh()
    }

    pub fn stats(&self) -> &StatsLoader {
        &self.stats
    }

    pub fn statistics(&self) -> &Statistics {
        self.stats.current()
    }

    pub fn take_stats_requests(&mut self) -> Vec<u64> {
        self.stats.take_requests()
    }

    pub fn apply_stats(
        &mut self,
        generation: u64,
        result: Result<Statistics, StatsFetchError>,
    ) -> StatsOutcome {
        let summary_active = self.current_view() == View::Summary;
        self.stats.apply(generation, result, summary_active)
    }

    fn enter(&mut self, next: ViewState) -> bool {
        if self.current == next {
            return false;
        }
        tracing::debug!(from = ?self.current.view(), to = ?next.view(), "view transition");
        self.current = next;
        self.on_enter();
        true
    }

    fn on_enter(&mut self) {
        match self.current {
            ViewState::Summary => {
                self.stats.refresh();
            }
            ViewState::TakingAttendance { .. } | ViewState::GroupList => {}
        }
    }
}
