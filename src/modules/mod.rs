//! UI Modules
//!
//! Each module implements the Module trait and handles its own:
//! - Key input processing
//! - Rendering
//!
//! Modules:
//! - dashboard: Statistics cards and quick actions (Summary view)
//! - groups: The instructor's groups (GroupList view)
//! - attendance: Roster marking and submission (TakingAttendance view)

pub mod attendance;
pub mod dashboard;
pub mod groups;

pub use attendance::AttendanceForm;
pub use dashboard::Dashboard;
pub use groups::GroupList;
