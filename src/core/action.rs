//! Actions that modules can return to communicate with the app

use crate::core::View;
use crate::domain::{AttendanceRecord, Group};

/// Actions returned by modules to communicate state changes
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// No action needed
    None,

    /// Switch the dashboard to another view
    Navigate(View),

    /// Open the attendance form for a specific group
    BeginAttendance(Group),

    /// Attendance form finished or was cancelled
    ReturnFromAttendance,

    /// Fetch the instructor's groups
    LoadGroups,

    /// Fetch the roster of a group
    LoadRoster(String),

    /// Send a completed attendance record
    SubmitAttendance(AttendanceRecord),

    /// Show notification in status bar
    Notify(String, NotifyLevel),

    /// Sign out and leave the dashboard
    Logout,

    /// Request quit
    Quit,
}

/// Notification levels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotifyLevel {
    Info,
    Warn,
    Error,
}
