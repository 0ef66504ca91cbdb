//! Domain layer - attendance data and dashboard state that does not touch I/O

pub mod group;
pub mod session;
pub mod stats;

pub use group::{ApiError, AttendanceMark, AttendanceRecord, Group, Student};
pub use session::{AuthError, Session, SessionGate, SignOutState, User};
pub use stats::{StalePolicy, Statistics, StatsFetchError, StatsLoader, StatsOutcome};
